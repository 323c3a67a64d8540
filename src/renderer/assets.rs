//! Texture lookup with procedural fallback
//!
//! Asset loading is best effort. Whatever the host could not load is drawn as
//! a flat colored square with crack marks proportional to the damage taken.

use std::collections::BTreeMap;

use crate::sim::{Block, BlockType, ToolTier};

/// Opaque handle into the host's texture store
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TextureId(pub u32);

/// Supplies textures for blocks and pickaxes
pub trait AssetProvider {
    /// Texture for a block type at a damage threshold (100, 80, ... 0)
    fn block_texture(&self, kind: BlockType, threshold: u8) -> Option<TextureId>;

    fn tool_texture(&self, _tier: ToolTier) -> Option<TextureId> {
        None
    }
}

/// Provider with nothing loaded; everything falls back
pub struct NoAssets;

impl AssetProvider for NoAssets {
    fn block_texture(&self, _kind: BlockType, _threshold: u8) -> Option<TextureId> {
        None
    }
}

/// In-memory texture registry filled by the host as assets load
#[derive(Debug, Clone, Default)]
pub struct TextureTable {
    blocks: BTreeMap<(BlockType, u8), TextureId>,
    tools: BTreeMap<u8, TextureId>,
}

impl TextureTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_block(&mut self, kind: BlockType, threshold: u8, id: TextureId) {
        self.blocks.insert((kind, threshold), id);
    }

    pub fn insert_tool(&mut self, tier: ToolTier, id: TextureId) {
        self.tools.insert(tier as u8, id);
    }
}

impl AssetProvider for TextureTable {
    fn block_texture(&self, kind: BlockType, threshold: u8) -> Option<TextureId> {
        self.blocks.get(&(kind, threshold)).copied()
    }

    fn tool_texture(&self, tier: ToolTier) -> Option<TextureId> {
        self.tools.get(&(tier as u8)).copied()
    }
}

/// How a block should be drawn
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Appearance {
    Texture(TextureId),
    /// Flat color with `cracks` damage marks (0 = intact)
    Procedural { color: [u8; 3], cracks: u8 },
}

/// Number of crack marks for a health percentage
pub fn crack_count(health_percent: f32) -> u8 {
    ((100.0 - health_percent.clamp(0.0, 100.0)) / 20.0) as u8
}

/// Resolve a block's appearance, falling back to a procedural square
pub fn block_appearance(assets: &dyn AssetProvider, block: &Block) -> Appearance {
    match assets.block_texture(block.kind, block.damage_threshold()) {
        Some(id) => Appearance::Texture(id),
        None => Appearance::Procedural {
            color: block.kind.color(),
            cracks: crack_count(block.health_percent()),
        },
    }
}

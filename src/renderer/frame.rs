//! Per-frame render extraction
//!
//! Flattens the game state into plain instance data a GPU backend can upload
//! directly, plus the HUD values.

use bytemuck::{Pod, Zeroable};

use super::assets::{Appearance, AssetProvider, block_appearance};
use super::colors;
use crate::rgb_to_f32;
use crate::sim::{GameState, ResourceKind};

/// Marks an instance without a texture (draw procedurally)
pub const NO_TEXTURE: u32 = u32::MAX;

// ============================================================================
// GPU DATA STRUCTURES
// ============================================================================

#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct BlockInstance {
    /// Screen rectangle: x, y, w, h
    pub rect: [f32; 4],
    pub color: [f32; 4],
    pub texture: u32,
    pub cracks: u32,
    pub health: u32,
    _pad: u32,
}

#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct ToolInstance {
    /// Screen-space center
    pub center: [f32; 2],
    /// Unrotated box size
    pub size: [f32; 2],
    pub angle: f32,
    pub texture: u32,
    /// 1 while touching a block
    pub in_contact: u32,
    _pad: u32,
    pub color: [f32; 4],
}

/// Everything needed to draw one frame
#[derive(Debug, Clone)]
pub struct RenderFrame {
    pub scroll_offset: f32,
    pub blocks: Vec<BlockInstance>,
    pub tool: Option<ToolInstance>,
    pub ledger: Vec<(ResourceKind, u32)>,
    pub in_contact: bool,
    /// Depth readout for the HUD
    pub y_level: Option<i32>,
}

impl RenderFrame {
    pub fn extract(state: &GameState, assets: &dyn AssetProvider) -> Self {
        let viewport = state.viewport_height();

        let blocks = state
            .grid
            .iter()
            .filter(|b| b.screen_rect.bottom() > 0.0 && b.screen_rect.top() < viewport)
            .map(|b| {
                let (texture, cracks) = match block_appearance(assets, b) {
                    Appearance::Texture(id) => (id.0, 0),
                    Appearance::Procedural { cracks, .. } => (NO_TEXTURE, cracks as u32),
                };
                let r = b.screen_rect;
                BlockInstance {
                    rect: [r.x, r.y, r.w, r.h],
                    color: rgb_to_f32(b.kind.color()),
                    texture,
                    cracks,
                    health: b.health().max(0) as u32,
                    _pad: 0,
                }
            })
            .collect();

        let tool = state
            .tool
            .body()
            .and_then(|h| state.world.body(h))
            .filter(|_| state.tool.is_active())
            .map(|body| {
                let center = body.position - glam::Vec2::new(0.0, state.camera.offset);
                ToolInstance {
                    center: center.to_array(),
                    size: body.size().to_array(),
                    angle: state.tool.render_angle(),
                    texture: assets
                        .tool_texture(state.tool.tier())
                        .map_or(NO_TEXTURE, |id| id.0),
                    in_contact: state.tool.in_contact() as u32,
                    _pad: 0,
                    color: rgb_to_f32(state.tool.tier().color()),
                }
            });

        Self {
            scroll_offset: state.camera.offset,
            blocks,
            tool,
            ledger: state.ledger.snapshot(),
            in_contact: state.tool.in_contact(),
            y_level: state.y_level(),
        }
    }

    /// Color of the contact indicator dot drawn on the pickaxe
    pub fn contact_color(&self) -> [f32; 4] {
        if self.in_contact {
            colors::CONTACT_ON
        } else {
            colors::CONTACT_OFF
        }
    }

    /// Raw bytes of the block instances, ready for a vertex buffer
    pub fn block_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.blocks)
    }
}

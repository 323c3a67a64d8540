//! Game state and core simulation types
//!
//! Everything the per-frame tick mutates lives in [`GameState`].

use std::collections::BTreeMap;

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::blocks::BlockGrid;
use super::camera::Camera;
use super::catalog::{ResourceKind, ToolSize, ToolTier};
use super::physics::{CollisionType, PhysicsWorld};
use super::tool::Tool;
use crate::tuning::Tuning;

/// Resource counts gathered this run. Counts only ever grow.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceLedger {
    counts: BTreeMap<ResourceKind, u32>,
}

impl ResourceLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn credit(&mut self, kind: ResourceKind, amount: u32) {
        let count = self.counts.entry(kind).or_insert(0);
        *count = count.saturating_add(amount);
    }

    pub fn get(&self, kind: ResourceKind) -> u32 {
        self.counts.get(&kind).copied().unwrap_or(0)
    }

    pub fn total(&self) -> u64 {
        self.counts.values().map(|&c| c as u64).sum()
    }

    /// Every kind with its count (zeros included), in HUD order
    pub fn snapshot(&self) -> Vec<(ResourceKind, u32)> {
        ResourceKind::ALL.iter().map(|&k| (k, self.get(k))).collect()
    }
}

/// Notifications for presentation layers (particles, sounds)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    /// A block broke; `position` is its top-left world corner
    BlockDestroyed { position: Vec2, color: [u8; 3] },
}

/// Complete game state
pub struct GameState {
    /// Run seed for reproducibility
    pub seed: u64,
    pub tuning: Tuning,
    pub world: PhysicsWorld,
    pub grid: BlockGrid,
    pub tool: Tool,
    pub camera: Camera,
    pub ledger: ResourceLedger,
    /// Events produced since the last drain
    pub events: Vec<GameEvent>,
    pub rng: Pcg32,
    /// Simulation tick counter
    pub time_ticks: u64,
    /// Unconsumed frame time (seconds)
    pub(crate) accumulator: f32,
}

impl GameState {
    /// New game with default tuning
    pub fn new(seed: u64) -> Self {
        Self::with_tuning(seed, Tuning::default())
    }

    /// New game: seeds the block field and drops an active wooden pickaxe
    pub fn with_tuning(seed: u64, tuning: Tuning) -> Self {
        let mut world = PhysicsWorld::from_tuning(&tuning.physics);
        world.on_collision(CollisionType::Tool, CollisionType::Block);

        let mut rng = Pcg32::seed_from_u64(seed);
        let mut grid = BlockGrid::new(&tuning.grid);
        let viewport = tuning.grid.viewport_height();
        grid.seed_initial(&mut world, &mut rng, 0.0, viewport);
        grid.project(&mut world, 0.0);

        let mut tool = Tool::new(&tuning.tool, &tuning.grid);
        tool.activate(&mut world, ToolTier::default(), ToolSize::default());

        Self {
            seed,
            tuning,
            world,
            grid,
            tool,
            camera: Camera::default(),
            ledger: ResourceLedger::new(),
            events: Vec::new(),
            rng,
            time_ticks: 0,
            accumulator: 0.0,
        }
    }

    pub fn viewport_height(&self) -> f32 {
        self.tuning.grid.viewport_height()
    }

    /// Pickaxe world position, if it has a body
    pub fn tool_position(&self) -> Option<Vec2> {
        self.tool.position(&self.world)
    }

    /// HUD depth readout: rows below the surface, counted downward as
    /// negative levels
    pub fn y_level(&self) -> Option<i32> {
        self.tool_position()
            .map(|p| -((p.y / self.tuning.grid.block_size).floor() as i32))
    }

    /// Take all pending events
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }
}

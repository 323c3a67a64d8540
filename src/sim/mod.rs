//! Simulation module
//!
//! All gameplay logic lives here:
//! - Fixed timestep physics, seeded RNG
//! - Stable iteration order (by handle / block id)
//! - No rendering or platform dependencies

pub mod blocks;
pub mod camera;
pub mod catalog;
pub mod collision;
pub mod damage;
pub mod physics;
pub mod shape;
pub mod state;
pub mod tick;
pub mod tool;

pub use blocks::{Block, BlockGrid, BlockId, DamageOutcome, choose_weighted};
pub use camera::Camera;
pub use catalog::{BlockType, ResourceKind, ToolSize, ToolTier, Yield};
pub use collision::{CollisionResult, box_box_collision};
pub use damage::DamageProtocol;
pub use physics::{
    AcceptAll, Arbiter, Body, BodyHandle, BodyKind, CollisionHandler, CollisionType, ContactPair,
    PhysicsWorld, ShapeFilter,
};
pub use shape::{Obb, Rect};
pub use state::{GameEvent, GameState, ResourceLedger};
pub use tick::{TickInput, advance, tick};
pub use tool::Tool;

//! Render extraction
//!
//! The drawing backend lives outside this crate. This module turns game state
//! into instance buffers and HUD values, resolving textures through an
//! [`AssetProvider`] with a procedural fallback.

pub mod assets;
pub mod frame;

pub use assets::{Appearance, AssetProvider, NoAssets, TextureId, TextureTable, block_appearance};
pub use frame::{BlockInstance, NO_TEXTURE, RenderFrame, ToolInstance};

/// Colors for fixed scene elements
pub mod colors {
    pub const CONTACT_ON: [f32; 4] = [1.0, 0.0, 0.0, 1.0];
    pub const CONTACT_OFF: [f32; 4] = [0.0, 1.0, 0.0, 1.0];
}

//! Cave Miner - a falling-pickaxe mining arcade game
//!
//! Core modules:
//! - `sim`: Simulation (physics world, block grid, pickaxe, damage, camera)
//! - `renderer`: Render extraction for an external drawing backend
//! - `input`: Debug chat command parsing
//! - `tuning`: Data-driven game balance

pub mod input;
pub mod renderer;
pub mod sim;
pub mod tuning;

pub use tuning::Tuning;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (60 Hz)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// Playfield layout
    pub const BLOCK_SIZE: f32 = 64.0;
    pub const BORDER_WIDTH: f32 = 32.0;
    pub const GRID_COLS: usize = 7;
    pub const GRID_VISIBLE_ROWS: usize = 13;
    pub const SCREEN_WIDTH: f32 = GRID_COLS as f32 * BLOCK_SIZE + 2.0 * BORDER_WIDTH;
    pub const SCREEN_HEIGHT: f32 = GRID_VISIBLE_ROWS as f32 * BLOCK_SIZE;

    /// First row is generated this far below the scroll offset
    pub const INITIAL_OFFSET: f32 = 5.0 * BLOCK_SIZE;

    /// Gravity (pixels/s², y grows downward)
    pub const GRAVITY: f32 = 1200.0;
    /// Hard cap on body speed (pixels/s)
    pub const MAX_BODY_SPEED: f32 = 1000.0;

    /// Block health per point of hardness
    pub const HP_PER_HARDNESS: i32 = 5;
    /// Health-percent tiers used to pick damage textures (descending)
    pub const BLOCK_HP_THRESHOLDS: [u8; 6] = [100, 80, 60, 40, 20, 0];

    /// Minimum wall-clock time between two damaging strikes
    pub const STRIKE_COOLDOWN_MS: f64 = 200.0;
}

/// Convert an 8-bit RGB triple to a normalized RGBA color
#[inline]
pub fn rgb_to_f32(rgb: [u8; 3]) -> [f32; 4] {
    [
        rgb[0] as f32 / 255.0,
        rgb[1] as f32 / 255.0,
        rgb[2] as f32 / 255.0,
        1.0,
    ]
}

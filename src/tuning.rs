//! Data-driven game balance
//!
//! Every designer-tunable number lives here. Defaults reproduce the feel of
//! the shipped game; a JSON file may override any subset of fields.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::*;

/// Errors raised while loading a tuning file
#[derive(Debug, Error)]
pub enum TuningError {
    #[error("failed to read tuning file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse tuning: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid tuning: {0}")]
    Invalid(&'static str),
}

/// Physics world parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsTuning {
    /// Downward acceleration (pixels/s²)
    pub gravity: f32,
    /// Fixed step length (seconds)
    pub step: f32,
    /// Substep cap per rendered frame
    pub max_substeps: u32,
    /// Speed clamp applied to every body after integration
    pub max_body_speed: f32,
}

impl Default for PhysicsTuning {
    fn default() -> Self {
        Self {
            gravity: GRAVITY,
            step: SIM_DT,
            max_substeps: MAX_SUBSTEPS,
            max_body_speed: MAX_BODY_SPEED,
        }
    }
}

/// Playfield and block generation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridTuning {
    pub cols: usize,
    pub block_size: f32,
    pub border_width: f32,
    /// Viewport height in rows
    pub visible_rows: usize,
    /// Distance below the scroll offset at which an empty field is reseeded
    pub initial_offset: f32,
    pub block_friction: f32,
    pub block_elasticity: f32,
}

impl Default for GridTuning {
    fn default() -> Self {
        Self {
            cols: GRID_COLS,
            block_size: BLOCK_SIZE,
            border_width: BORDER_WIDTH,
            visible_rows: GRID_VISIBLE_ROWS,
            initial_offset: INITIAL_OFFSET,
            block_friction: 0.95,
            block_elasticity: 0.0,
        }
    }
}

impl GridTuning {
    /// Total screen width including both borders
    pub fn screen_width(&self) -> f32 {
        self.cols as f32 * self.block_size + 2.0 * self.border_width
    }

    /// Viewport height in pixels
    pub fn viewport_height(&self) -> f32 {
        self.visible_rows as f32 * self.block_size
    }
}

/// Pickaxe handling
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolTuning {
    pub mass: f32,
    /// Horizontal velocity added per move command (pixels/s)
    pub move_impulse: f32,
    pub strike_cooldown_ms: f64,
    /// Per-frame multiplier on angular velocity
    pub rotation_damping: f32,
    /// Per-frame multiplier on horizontal velocity
    pub friction_factor: f32,
    /// Fraction of horizontal speed kept (and reversed) on a wall bounce
    pub bounce_restitution: f32,
    /// Speeds below this snap to zero after friction or a bounce
    pub bounce_stop: f32,
    /// Size multiplier of the large size class
    pub large_scale: f32,
    pub shape_friction: f32,
    pub shape_elasticity: f32,
    /// Spawn point as fractions of screen width / viewport height
    pub spawn_x_fraction: f32,
    pub spawn_y_fraction: f32,
}

impl Default for ToolTuning {
    fn default() -> Self {
        Self {
            mass: 2.0,
            move_impulse: 200.0,
            strike_cooldown_ms: STRIKE_COOLDOWN_MS,
            rotation_damping: 0.985,
            friction_factor: 0.992,
            bounce_restitution: 0.15,
            bounce_stop: 25.0,
            large_scale: 1.5,
            shape_friction: 0.8,
            shape_elasticity: 0.1,
            spawn_x_fraction: 0.5,
            spawn_y_fraction: 0.25,
        }
    }
}

/// Contact response and yields
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CollisionTuning {
    /// Fraction of the normal velocity kept (reversed) on block contact
    pub restitution: f32,
    /// Angular velocity gained per unit of (normal × velocity)
    pub spin_factor: f32,
    /// Inclusive yield range for rare ores
    pub rare_yield_min: u32,
    pub rare_yield_max: u32,
}

impl Default for CollisionTuning {
    fn default() -> Self {
        Self {
            restitution: 0.2,
            spin_factor: 0.001,
            rare_yield_min: 1,
            rare_yield_max: 5,
        }
    }
}

/// Camera follow
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraTuning {
    /// Where the pickaxe sits in the viewport (0 = top, 1 = bottom)
    pub anchor: f32,
    /// Fraction of the remaining distance covered per frame
    pub smoothing: f32,
    /// Largest offset change per frame (pixels)
    pub max_step: f32,
    /// Allow the camera to scroll back up
    pub allow_rewind: bool,
    /// How far above the start the camera may go when rewinding
    pub negative_slack: f32,
}

impl Default for CameraTuning {
    fn default() -> Self {
        Self {
            anchor: 0.6,
            smoothing: 0.15,
            max_step: 48.0,
            allow_rewind: false,
            negative_slack: 32.0,
        }
    }
}

/// Complete tuning set
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub physics: PhysicsTuning,
    pub grid: GridTuning,
    pub tool: ToolTuning,
    pub collision: CollisionTuning,
    pub camera: CameraTuning,
}

impl Tuning {
    /// Parse and validate a JSON document (missing fields keep defaults)
    pub fn from_json_str(json: &str) -> Result<Self, TuningError> {
        let tuning: Tuning = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Load from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, TuningError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| TuningError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    /// Load from a JSON file, falling back to defaults on any error
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        match Self::load(path) {
            Ok(tuning) => {
                log::info!("Loaded tuning overrides");
                tuning
            }
            Err(e) => {
                log::warn!("{e}; using default tuning");
                Self::default()
            }
        }
    }

    pub fn to_json(&self) -> Result<String, TuningError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<(), TuningError> {
        if !(self.physics.step > 0.0) {
            return Err(TuningError::Invalid("physics.step must be positive"));
        }
        if self.physics.max_substeps == 0 {
            return Err(TuningError::Invalid("physics.max_substeps must be at least 1"));
        }
        if self.grid.cols == 0 {
            return Err(TuningError::Invalid("grid.cols must be at least 1"));
        }
        if !(self.grid.block_size > 0.0) {
            return Err(TuningError::Invalid("grid.block_size must be positive"));
        }
        if self.grid.visible_rows == 0 {
            return Err(TuningError::Invalid("grid.visible_rows must be at least 1"));
        }
        if !(self.tool.mass > 0.0) || !(self.tool.large_scale > 0.0) {
            return Err(TuningError::Invalid("tool mass and scale must be positive"));
        }
        if self.tool.strike_cooldown_ms < 0.0 {
            return Err(TuningError::Invalid("tool.strike_cooldown_ms must not be negative"));
        }
        if self.collision.rare_yield_min > self.collision.rare_yield_max {
            return Err(TuningError::Invalid("collision rare yield range is empty"));
        }
        if !(self.camera.smoothing > 0.0 && self.camera.smoothing <= 1.0) {
            return Err(TuningError::Invalid("camera.smoothing must be in (0, 1]"));
        }
        if !(self.camera.max_step > 0.0) {
            return Err(TuningError::Invalid("camera.max_step must be positive"));
        }
        Ok(())
    }
}

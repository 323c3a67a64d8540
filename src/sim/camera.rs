//! Vertical scroll controller
//!
//! The camera eases toward keeping the pickaxe at a fixed height in the
//! viewport. Per-frame movement is bounded so teleports never cause a jump.

use serde::{Deserialize, Serialize};

use crate::tuning::CameraTuning;

/// Scroll state (single vertical offset, world pixels)
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Camera {
    pub offset: f32,
}

impl Camera {
    pub fn new(offset: f32) -> Self {
        Self { offset }
    }

    /// Offset that places `tool_y` at the anchor height
    pub fn target(tool_y: f32, viewport_height: f32, tuning: &CameraTuning) -> f32 {
        tool_y - tuning.anchor * viewport_height
    }

    /// Advance one frame toward the target and return the new offset
    pub fn follow(&mut self, tool_y: f32, viewport_height: f32, tuning: &CameraTuning) -> f32 {
        let target = Self::target(tool_y, viewport_height, tuning);
        if !target.is_finite() {
            return self.offset;
        }

        let step = ((target - self.offset) * tuning.smoothing)
            .clamp(-tuning.max_step, tuning.max_step);
        let next = self.offset + step;

        self.offset = if tuning.allow_rewind {
            next.max(-tuning.negative_slack)
        } else {
            next.max(self.offset)
        };
        self.offset
    }
}

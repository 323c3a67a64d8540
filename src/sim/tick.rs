//! Fixed timestep simulation tick
//!
//! One frame is: input → physics step(s) with the damage protocol → camera →
//! pickaxe housekeeping → block projection, culling and generation.

use super::catalog::{ToolSize, ToolTier};
use super::damage::DamageProtocol;
use super::state::GameState;
use crate::input::Command;

/// Input commands for a single frame
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Nudge the pickaxe left
    pub move_left: bool,
    /// Nudge the pickaxe right
    pub move_right: bool,
    /// Re-activate an inactive pickaxe with its current tier and size
    pub activate: bool,
    /// 0-based tier index (out-of-range values are ignored)
    pub select_tier: Option<usize>,
    pub select_size: Option<ToolSize>,
    /// Chat line, e.g. `!diamond`
    pub chat: Option<String>,
}

/// Advance the game by one frame containing exactly one physics step
pub fn tick(state: &mut GameState, input: &TickInput, dt: f32, now_ms: f64) {
    apply_input(state, input);
    step_physics(state, dt, now_ms);
    finish_frame(state);
}

/// Advance the game by a variable-length frame
///
/// Frame time is accumulated and consumed in fixed steps. When the substep
/// cap is hit the leftover time is dropped. Returns the number of physics
/// steps taken.
pub fn advance(state: &mut GameState, input: &TickInput, frame_dt: f32, now_ms: f64) -> u32 {
    let step = state.tuning.physics.step;
    let max_substeps = state.tuning.physics.max_substeps;

    if frame_dt.is_finite() && frame_dt > 0.0 {
        state.accumulator += frame_dt;
    }

    apply_input(state, input);

    let mut steps = 0;
    while state.accumulator >= step && steps < max_substeps {
        step_physics(state, step, now_ms);
        state.accumulator -= step;
        steps += 1;
    }
    if steps == max_substeps && state.accumulator >= step {
        log::debug!(
            "Dropping {:.3}s of simulation after {} substeps",
            state.accumulator,
            steps
        );
        state.accumulator = 0.0;
    }

    finish_frame(state);
    steps
}

fn apply_input(state: &mut GameState, input: &TickInput) {
    if let Some(command) = input.chat.as_deref().and_then(Command::parse) {
        match command {
            Command::Tier(tier) => state.tool.set_tier(&mut state.world, tier),
            Command::Size(size) => state.tool.set_size(&mut state.world, size),
        }
    }

    if let Some(index) = input.select_tier {
        match ToolTier::from_index(index) {
            Some(tier) => state.tool.set_tier(&mut state.world, tier),
            None => log::debug!("Ignoring tier selection {index}"),
        }
    }
    if let Some(size) = input.select_size {
        state.tool.set_size(&mut state.world, size);
    }

    if input.activate && !state.tool.is_active() {
        let (tier, size) = (state.tool.tier(), state.tool.size());
        state.tool.activate(&mut state.world, tier, size);
    }

    if input.move_left {
        state.tool.move_left(&mut state.world);
    }
    if input.move_right {
        state.tool.move_right(&mut state.world);
    }
}

fn step_physics(state: &mut GameState, dt: f32, now_ms: f64) {
    let mut protocol = DamageProtocol {
        grid: &mut state.grid,
        tool: &mut state.tool,
        ledger: &mut state.ledger,
        events: &mut state.events,
        rng: &mut state.rng,
        tuning: &state.tuning.collision,
        now_ms,
    };
    state.world.step(dt, &mut protocol);
    state.time_ticks += 1;
}

fn finish_frame(state: &mut GameState) {
    let viewport = state.viewport_height();

    if let Some(pos) = state.tool_position() {
        state.camera.follow(pos.y, viewport, &state.tuning.camera);
    }
    let scroll = state.camera.offset;

    state.tool.update(&mut state.world, scroll);
    state.grid.project(&mut state.world, scroll);
    state.grid.retire_offscreen(&mut state.world, scroll, viewport);
    state.grid.ensure_coverage(&mut state.world, &mut state.rng, scroll, viewport);
}

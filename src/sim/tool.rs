//! The pickaxe
//!
//! A single dynamic body steered by horizontal impulses. The tool keeps its
//! own damage cooldown and contact bookkeeping; the physics world owns the
//! body itself.

use glam::Vec2;

use super::blocks::BlockId;
use super::catalog::{ToolSize, ToolTier};
use super::physics::{Body, BodyHandle, CollisionType, PhysicsWorld};
use super::shape::{Rect, rotated_extent};
use crate::tuning::{GridTuning, ToolTuning};

/// Player-controlled pickaxe
pub struct Tool {
    tier: ToolTier,
    size: ToolSize,
    active: bool,
    body: Option<BodyHandle>,
    /// Wall-clock time of the last damaging strike
    last_strike_ms: Option<f64>,
    in_contact: bool,
    contact_block: Option<BlockId>,
    /// Orientation for drawing (radians)
    render_angle: f32,
    screen_rect: Rect,
    scroll_offset: f32,
    tuning: ToolTuning,
    block_size: f32,
    border_width: f32,
    screen_width: f32,
    viewport_height: f32,
}

impl Tool {
    /// An inactive tool with no body
    pub fn new(tuning: &ToolTuning, grid: &GridTuning) -> Self {
        Self {
            tier: ToolTier::default(),
            size: ToolSize::default(),
            active: false,
            body: None,
            last_strike_ms: None,
            in_contact: false,
            contact_block: None,
            render_angle: 0.0,
            screen_rect: Rect::default(),
            scroll_offset: 0.0,
            tuning: tuning.clone(),
            block_size: grid.block_size,
            border_width: grid.border_width,
            screen_width: grid.screen_width(),
            viewport_height: grid.viewport_height(),
        }
    }

    pub fn tier(&self) -> ToolTier {
        self.tier
    }

    pub fn size(&self) -> ToolSize {
        self.size
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn body(&self) -> Option<BodyHandle> {
        self.body
    }

    pub fn in_contact(&self) -> bool {
        self.in_contact
    }

    pub fn contact_block(&self) -> Option<BlockId> {
        self.contact_block
    }

    pub fn render_angle(&self) -> f32 {
        self.render_angle
    }

    pub fn screen_rect(&self) -> Rect {
        self.screen_rect
    }

    /// Damage dealt per strike
    pub fn strike_power(&self) -> i32 {
        self.tier.strike_power()
    }

    /// Edge length of the tool box
    pub fn edge_length(&self) -> f32 {
        self.block_size * self.size.scale(self.tuning.large_scale)
    }

    /// World position of the body, if any
    pub fn position(&self, world: &PhysicsWorld) -> Option<Vec2> {
        self.body.and_then(|h| world.body(h)).map(|b| b.position)
    }

    /// Fixed world spawn point: horizontally centered, a quarter down the
    /// first screen
    pub fn spawn_point(&self) -> Vec2 {
        Vec2::new(
            self.screen_width * self.tuning.spawn_x_fraction,
            self.viewport_height * self.tuning.spawn_y_fraction,
        )
    }

    /// (Re)build the body with the given tier and size and mark the tool active
    pub fn activate(&mut self, world: &mut PhysicsWorld, tier: ToolTier, size: ToolSize) {
        self.tier = tier;
        self.size = size;
        self.rebuild(world);
        log::info!("Pickaxe activated: {} ({:?})", self.tier.as_str(), self.size);
    }

    pub fn set_tier(&mut self, world: &mut PhysicsWorld, tier: ToolTier) {
        self.activate(world, tier, self.size);
    }

    pub fn set_size(&mut self, world: &mut PhysicsWorld, size: ToolSize) {
        self.activate(world, self.tier, size);
    }

    /// Park the tool: its body leaves the world until the next activation
    pub fn deactivate(&mut self, world: &mut PhysicsWorld) {
        if let Some(handle) = self.body.take() {
            world.remove_body(handle);
        }
        self.active = false;
        self.in_contact = false;
        self.contact_block = None;
    }

    fn rebuild(&mut self, world: &mut PhysicsWorld) {
        if let Some(handle) = self.body.take() {
            world.remove_body(handle);
        }

        let size = Vec2::splat(self.edge_length());
        let spawn = self.spawn_point();
        let handle = world.add_body(
            Body::dynamic(self.tuning.mass, size)
                .with_position(spawn)
                .with_material(self.tuning.shape_friction, self.tuning.shape_elasticity)
                .with_collision_type(CollisionType::Tool),
        );

        self.body = Some(handle);
        self.active = true;
        // The old body's contacts were dropped with it
        self.in_contact = false;
        self.contact_block = None;
        self.render_angle = 0.0;
        self.screen_rect = Rect::from_center(spawn - Vec2::new(0.0, self.scroll_offset), size);
    }

    fn nudge(&self, world: &mut PhysicsWorld, dvx: f32) {
        if !self.active {
            return;
        }
        if let Some(body) = self.body.and_then(|h| world.body_mut(h)) {
            body.velocity.x += dvx;
        }
    }

    pub fn move_left(&self, world: &mut PhysicsWorld) {
        self.nudge(world, -self.tuning.move_impulse);
    }

    pub fn move_right(&self, world: &mut PhysicsWorld) {
        self.nudge(world, self.tuning.move_impulse);
    }

    /// Gate damage on wall-clock time
    ///
    /// Returns true at most once per cooldown window; a true result opens a
    /// new window. `now_ms` must come from a monotonic clock.
    pub fn can_strike_now(&mut self, now_ms: f64) -> bool {
        match self.last_strike_ms {
            Some(last) if now_ms - last < self.tuning.strike_cooldown_ms => false,
            _ => {
                self.last_strike_ms = Some(now_ms);
                true
            }
        }
    }

    /// Per-frame housekeeping after the physics step
    pub fn update(&mut self, world: &mut PhysicsWorld, scroll_offset: f32) {
        self.scroll_offset = scroll_offset;
        if !self.active {
            return;
        }
        let Some(body) = self.body.and_then(|h| world.body_mut(h)) else {
            return;
        };

        let t = &self.tuning;
        let half_width = body.size().x / 2.0;
        let min_x = self.border_width + half_width;
        let max_x = self.screen_width - self.border_width - half_width;

        let mut bounced = false;
        if body.position.x < min_x {
            body.position.x = min_x;
            bounced = true;
        } else if body.position.x > max_x {
            body.position.x = max_x;
            bounced = true;
        }

        if bounced {
            body.velocity.x = -body.velocity.x * t.bounce_restitution;
        } else {
            body.velocity.x *= t.friction_factor;
        }
        if body.velocity.x.abs() < t.bounce_stop {
            body.velocity.x = 0.0;
        }

        body.angular_velocity *= t.rotation_damping;
        self.render_angle = body.angle;

        let screen_center = body.position - Vec2::new(0.0, scroll_offset);
        let extent = rotated_extent(body.size(), body.angle);
        self.screen_rect = Rect::from_center(screen_center, extent);
    }

    pub fn begin_contact(&mut self, block: BlockId) {
        self.in_contact = true;
        self.contact_block = Some(block);
    }

    pub fn end_contact(&mut self) {
        self.in_contact = false;
        self.contact_block = None;
    }
}

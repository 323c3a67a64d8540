//! Narrow-phase collision and velocity response for boxes
//!
//! The pickaxe is an oriented box, blocks are axis-aligned boxes. Overlap is
//! found with a separating-axis test over the four face normals.

use glam::Vec2;

use super::shape::Obb;

/// Result of a collision check
#[derive(Debug, Clone)]
pub struct CollisionResult {
    /// Whether a collision occurred
    pub hit: bool,
    /// Approximate contact point (deepest point of the first box)
    pub point: Vec2,
    /// Axis of least penetration, pointing from the second box toward the first
    pub normal: Vec2,
    /// Penetration depth along `normal`
    pub penetration: f32,
}

impl CollisionResult {
    pub fn miss() -> Self {
        Self {
            hit: false,
            point: Vec2::ZERO,
            normal: Vec2::ZERO,
            penetration: 0.0,
        }
    }
}

/// Separating-axis test between two oriented boxes
///
/// Touching boxes (zero overlap) do not collide. The returned normal pushes
/// `a` out of `b` when `a` is moved by `normal * penetration`.
pub fn box_box_collision(a: &Obb, b: &Obb) -> CollisionResult {
    let [ax, ay] = a.axes();
    let [bx, by] = b.axes();
    let d = a.center - b.center;

    let mut best_pen = f32::MAX;
    let mut best_axis = Vec2::ZERO;

    for axis in [ax, ay, bx, by] {
        let dist = d.dot(axis);
        let overlap = a.project_radius(axis) + b.project_radius(axis) - dist.abs();
        if overlap <= 0.0 {
            return CollisionResult::miss();
        }
        if overlap < best_pen {
            best_pen = overlap;
            best_axis = if dist < 0.0 { -axis } else { axis };
        }
    }

    CollisionResult {
        hit: true,
        point: a.support(-best_axis),
        normal: best_axis,
        penetration: best_pen,
    }
}

/// Split velocity into normal and tangential parts and reverse only the
/// normal part, scaled by `restitution`
///
/// `restitution = 1` is an elastic bounce, `0` a pure slide.
#[inline]
pub fn reflect_with_restitution(velocity: Vec2, normal: Vec2, restitution: f32) -> Vec2 {
    let vn = velocity.dot(normal) * normal;
    let vt = velocity - vn;
    vt - vn * restitution
}

/// Angular velocity gained from a strike along `normal` at `velocity`
#[inline]
pub fn spin_kick(normal: Vec2, velocity: Vec2, factor: f32) -> f32 {
    normal.perp_dot(velocity) * factor
}

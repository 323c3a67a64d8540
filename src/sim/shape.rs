//! Box geometry for blocks and the pickaxe
//!
//! Blocks are axis-aligned squares; the pickaxe is a box that rotates with its
//! body. Both are described as an oriented box (center, half extents, angle).

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle in screen or world space (top-left origin, y down)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    pub fn from_center(center: Vec2, size: Vec2) -> Self {
        Self {
            x: center.x - size.x / 2.0,
            y: center.y - size.y / 2.0,
            w: size.x,
            h: size.y,
        }
    }

    #[inline]
    pub fn top(&self) -> f32 {
        self.y
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.y + self.h
    }

    #[inline]
    pub fn left(&self) -> f32 {
        self.x
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.x + self.w
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x + self.w / 2.0, self.y + self.h / 2.0)
    }

    pub fn size(&self) -> Vec2 {
        Vec2::new(self.w, self.h)
    }

    pub fn overlaps(&self, other: &Rect) -> bool {
        self.left() < other.right()
            && other.left() < self.right()
            && self.top() < other.bottom()
            && other.top() < self.bottom()
    }
}

/// An oriented box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Obb {
    pub center: Vec2,
    pub half: Vec2,
    /// Rotation in radians (positive = clockwise on a y-down screen)
    pub angle: f32,
}

impl Obb {
    pub fn new(center: Vec2, half: Vec2, angle: f32) -> Self {
        Self {
            center,
            half,
            angle,
        }
    }

    /// Local x and y axes in world space
    pub fn axes(&self) -> [Vec2; 2] {
        let ux = Vec2::from_angle(self.angle);
        [ux, ux.perp()]
    }

    /// Half-length of the box's shadow on `axis` (unit vector)
    pub fn project_radius(&self, axis: Vec2) -> f32 {
        let [ux, uy] = self.axes();
        axis.dot(ux).abs() * self.half.x + axis.dot(uy).abs() * self.half.y
    }

    /// The four corners, counter-clockwise from local (-x, -y)
    pub fn corners(&self) -> [Vec2; 4] {
        let [ux, uy] = self.axes();
        let ex = ux * self.half.x;
        let ey = uy * self.half.y;
        [
            self.center - ex - ey,
            self.center + ex - ey,
            self.center + ex + ey,
            self.center - ex + ey,
        ]
    }

    /// Corner that lies furthest along `dir`
    pub fn support(&self, dir: Vec2) -> Vec2 {
        let corners = self.corners();
        let mut best = corners[0];
        let mut best_d = best.dot(dir);
        for c in &corners[1..] {
            let d = c.dot(dir);
            if d > best_d {
                best = *c;
                best_d = d;
            }
        }
        best
    }

    /// Axis-aligned bounds of the rotated box
    pub fn bounds(&self) -> Rect {
        let size = rotated_extent(self.half * 2.0, self.angle);
        Rect::from_center(self.center, size)
    }
}

/// Width and height of the bounding box of a `size` box rotated by `angle`
pub fn rotated_extent(size: Vec2, angle: f32) -> Vec2 {
    let (s, c) = angle.sin_cos();
    let (s, c) = (s.abs(), c.abs());
    Vec2::new(c * size.x + s * size.y, s * size.x + c * size.y)
}

/// Moment of inertia of a solid box about its center
pub fn moment_for_box(mass: f32, size: Vec2) -> f32 {
    mass * (size.x * size.x + size.y * size.y) / 12.0
}

//! Rigid-body world
//!
//! A small 2D simulation tailored to the game: dynamic boxes fall under
//! gravity and are pushed out of kinematic boxes. Contacts between collision
//! types registered with [`PhysicsWorld::on_collision`] are routed through a
//! [`CollisionHandler`] (begin / pre-solve / separate), mirroring the callback
//! protocol of classic 2D engines.
//!
//! The world is the sole owner of bodies. Everything else holds a
//! [`BodyHandle`] and goes through [`PhysicsWorld::remove_body`]. Removals
//! requested from inside a callback are applied at the end of the step.

use std::collections::BTreeMap;

use glam::Vec2;

use super::collision::box_box_collision;
use super::shape::{Obb, moment_for_box};
use crate::tuning::PhysicsTuning;

/// Overlap left in place after position correction so resting contacts persist
const CONTACT_SLOP: f32 = 0.5;

/// Stable body identifier (never reused within a world)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BodyHandle(u32);

impl BodyHandle {
    pub fn raw(self) -> u32 {
        self.0
    }
}

/// How a body moves
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyKind {
    /// Driven by gravity and contacts
    Dynamic,
    /// Moved only by direct assignment (or its own velocity), infinite mass
    Kinematic,
}

/// Collision tag used to route contacts to a handler
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CollisionType {
    Default,
    Tool,
    Block,
}

/// Bodies sharing a non-zero group never collide with each other
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ShapeFilter {
    pub group: u32,
}

impl ShapeFilter {
    pub const NONE: Self = Self { group: 0 };

    pub fn group(group: u32) -> Self {
        Self { group }
    }

    pub fn rejects(&self, other: &ShapeFilter) -> bool {
        self.group != 0 && self.group == other.group
    }
}

/// A box-shaped rigid body
#[derive(Debug, Clone)]
pub struct Body {
    pub kind: BodyKind,
    pub position: Vec2,
    pub velocity: Vec2,
    /// Rotation in radians
    pub angle: f32,
    pub angular_velocity: f32,
    mass: f32,
    moment: f32,
    half_extents: Vec2,
    pub friction: f32,
    pub elasticity: f32,
    pub collision_type: CollisionType,
    pub filter: ShapeFilter,
    /// Opaque value carried for collision handlers (e.g. an entity id)
    pub user_data: u64,
}

impl Body {
    /// A dynamic box with the given mass and full size
    pub fn dynamic(mass: f32, size: Vec2) -> Self {
        Self::new(BodyKind::Dynamic, mass, moment_for_box(mass, size), size)
    }

    /// A kinematic box with the given full size
    pub fn kinematic(size: Vec2) -> Self {
        Self::new(BodyKind::Kinematic, f32::INFINITY, f32::INFINITY, size)
    }

    fn new(kind: BodyKind, mass: f32, moment: f32, size: Vec2) -> Self {
        Self {
            kind,
            position: Vec2::ZERO,
            velocity: Vec2::ZERO,
            angle: 0.0,
            angular_velocity: 0.0,
            mass,
            moment,
            half_extents: size / 2.0,
            friction: 0.0,
            elasticity: 0.0,
            collision_type: CollisionType::Default,
            filter: ShapeFilter::NONE,
            user_data: 0,
        }
    }

    pub fn with_position(mut self, position: Vec2) -> Self {
        self.position = position;
        self
    }

    pub fn with_material(mut self, friction: f32, elasticity: f32) -> Self {
        self.friction = friction;
        self.elasticity = elasticity;
        self
    }

    pub fn with_collision_type(mut self, collision_type: CollisionType) -> Self {
        self.collision_type = collision_type;
        self
    }

    pub fn with_filter(mut self, filter: ShapeFilter) -> Self {
        self.filter = filter;
        self
    }

    pub fn with_user_data(mut self, user_data: u64) -> Self {
        self.user_data = user_data;
        self
    }

    pub fn mass(&self) -> f32 {
        self.mass
    }

    pub fn moment(&self) -> f32 {
        self.moment
    }

    pub fn size(&self) -> Vec2 {
        self.half_extents * 2.0
    }

    pub fn is_dynamic(&self) -> bool {
        self.kind == BodyKind::Dynamic
    }

    /// Collision shape in world space
    pub fn obb(&self) -> Obb {
        Obb::new(self.position, self.half_extents, self.angle)
    }
}

/// Identity of a contact, kept after the other body is gone
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContactPair {
    pub dynamic: BodyHandle,
    pub other: BodyHandle,
    pub dynamic_type: CollisionType,
    pub other_type: CollisionType,
    pub other_user_data: u64,
}

/// Read-only view of the non-dynamic side of a contact
#[derive(Debug, Clone, Copy)]
struct Snapshot {
    handle: BodyHandle,
    obb: Obb,
    velocity: Vec2,
    friction: f32,
    elasticity: f32,
    collision_type: CollisionType,
    filter: ShapeFilter,
    user_data: u64,
}

/// Contact being processed, handed to [`CollisionHandler`] callbacks
pub struct Arbiter<'a> {
    pair: ContactPair,
    body: &'a mut Body,
    other_position: Vec2,
    normal: Vec2,
    penetration: f32,
    point: Vec2,
    removals: &'a mut Vec<BodyHandle>,
}

impl Arbiter<'_> {
    pub fn pair(&self) -> ContactPair {
        self.pair
    }

    /// The dynamic body of the pair
    pub fn body(&self) -> &Body {
        self.body
    }

    pub fn body_mut(&mut self) -> &mut Body {
        self.body
    }

    pub fn other_position(&self) -> Vec2 {
        self.other_position
    }

    pub fn other_user_data(&self) -> u64 {
        self.pair.other_user_data
    }

    /// Separating axis, pointing from the other body toward the dynamic body
    pub fn normal(&self) -> Vec2 {
        self.normal
    }

    pub fn penetration(&self) -> f32 {
        self.penetration
    }

    pub fn point(&self) -> Vec2 {
        self.point
    }

    /// Remove the other body once the step finishes
    pub fn remove_other(&mut self) {
        if !self.removals.contains(&self.pair.other) {
            self.removals.push(self.pair.other);
        }
    }
}

/// Contact callbacks for a registered pair of collision types
pub trait CollisionHandler {
    /// First tick of a new contact. Returning false ignores the pair until it
    /// separates.
    fn begin(&mut self, _arbiter: &mut Arbiter<'_>) -> bool {
        true
    }

    /// Every tick the pair overlaps. Returning false skips the physical
    /// response for this tick.
    fn pre_solve(&mut self, _arbiter: &mut Arbiter<'_>) -> bool {
        true
    }

    /// The pair stopped touching, or one of its bodies was removed
    fn separate(&mut self, _pair: &ContactPair) {}
}

/// Handler that accepts every contact
pub struct AcceptAll;

impl CollisionHandler for AcceptAll {}

#[derive(Debug, Clone, Copy)]
struct ContactState {
    pair: ContactPair,
    ignored: bool,
}

/// The simulation
pub struct PhysicsWorld {
    gravity: Vec2,
    max_speed: f32,
    bodies: BTreeMap<BodyHandle, Body>,
    next_handle: u32,
    handled: Option<(CollisionType, CollisionType)>,
    contacts: BTreeMap<(BodyHandle, BodyHandle), ContactState>,
    pending_removals: Vec<BodyHandle>,
}

impl PhysicsWorld {
    /// Gravity points down the screen (+y)
    pub fn new(gravity: f32) -> Self {
        Self {
            gravity: Vec2::new(0.0, gravity),
            max_speed: f32::INFINITY,
            bodies: BTreeMap::new(),
            next_handle: 1,
            handled: None,
            contacts: BTreeMap::new(),
            pending_removals: Vec::new(),
        }
    }

    pub fn from_tuning(tuning: &PhysicsTuning) -> Self {
        let mut world = Self::new(tuning.gravity);
        world.max_speed = tuning.max_body_speed;
        world
    }

    pub fn gravity(&self) -> Vec2 {
        self.gravity
    }

    pub fn set_gravity(&mut self, gravity: f32) {
        self.gravity = Vec2::new(0.0, gravity);
    }

    /// Route contacts between these two collision types to the step handler
    pub fn on_collision(&mut self, a: CollisionType, b: CollisionType) {
        self.handled = Some((a, b));
    }

    pub fn add_body(&mut self, body: Body) -> BodyHandle {
        let handle = BodyHandle(self.next_handle);
        self.next_handle += 1;
        self.bodies.insert(handle, body);
        handle
    }

    /// Remove a body; unknown handles are ignored
    pub fn remove_body(&mut self, handle: BodyHandle) -> Option<Body> {
        let body = self.bodies.remove(&handle);
        if body.is_some() {
            self.contacts.retain(|&(a, b), _| a != handle && b != handle);
        }
        body
    }

    pub fn contains(&self, handle: BodyHandle) -> bool {
        self.bodies.contains_key(&handle)
    }

    pub fn body(&self, handle: BodyHandle) -> Option<&Body> {
        self.bodies.get(&handle)
    }

    pub fn body_mut(&mut self, handle: BodyHandle) -> Option<&mut Body> {
        self.bodies.get_mut(&handle)
    }

    /// All bodies in handle order
    pub fn bodies(&self) -> impl Iterator<Item = (BodyHandle, &Body)> {
        self.bodies.iter().map(|(h, b)| (*h, b))
    }

    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    /// Number of pairs currently in contact
    pub fn contact_count(&self) -> usize {
        self.contacts.len()
    }

    fn is_handled(&self, a: CollisionType, b: CollisionType) -> bool {
        match self.handled {
            Some((x, y)) => (x == a && y == b) || (x == b && y == a),
            None => false,
        }
    }

    /// Advance the simulation by one fixed step
    ///
    /// Only dynamic-vs-kinematic pairs are tested; kinematic bodies never
    /// collide with each other. Non-positive `dt` is a no-op.
    pub fn step<H: CollisionHandler>(&mut self, dt: f32, handler: &mut H) {
        if !(dt > 0.0) {
            return;
        }

        self.integrate(dt);

        let dynamic: Vec<BodyHandle> = self
            .bodies
            .iter()
            .filter(|(_, b)| b.is_dynamic())
            .map(|(h, _)| *h)
            .collect();
        let kinematic: Vec<Snapshot> = self
            .bodies
            .iter()
            .filter(|(_, b)| !b.is_dynamic())
            .map(|(h, b)| Snapshot {
                handle: *h,
                obb: b.obb(),
                velocity: b.velocity,
                friction: b.friction,
                elasticity: b.elasticity,
                collision_type: b.collision_type,
                filter: b.filter,
                user_data: b.user_data,
            })
            .collect();

        let mut touched: BTreeMap<(BodyHandle, BodyHandle), ContactState> = BTreeMap::new();

        for handle in dynamic {
            let Some(mut body) = self.bodies.remove(&handle) else {
                continue;
            };

            for other in &kinematic {
                if self.pending_removals.contains(&other.handle)
                    || body.filter.rejects(&other.filter)
                {
                    continue;
                }

                // Broad phase
                if !body.obb().bounds().overlaps(&other.obb.bounds()) {
                    continue;
                }

                // Narrow phase
                let result = box_box_collision(&body.obb(), &other.obb);
                if !result.hit {
                    continue;
                }

                let key = (handle, other.handle);
                let pair = ContactPair {
                    dynamic: handle,
                    other: other.handle,
                    dynamic_type: body.collision_type,
                    other_type: other.collision_type,
                    other_user_data: other.user_data,
                };
                let previous = self.contacts.get(&key).copied();
                let mut state = previous.unwrap_or(ContactState {
                    pair,
                    ignored: false,
                });

                let accepted = if self.is_handled(body.collision_type, other.collision_type) {
                    let mut arbiter = Arbiter {
                        pair,
                        body: &mut body,
                        other_position: other.obb.center,
                        normal: result.normal,
                        penetration: result.penetration,
                        point: result.point,
                        removals: &mut self.pending_removals,
                    };
                    if previous.is_none() {
                        state.ignored = !handler.begin(&mut arbiter);
                    }
                    !state.ignored && handler.pre_solve(&mut arbiter)
                } else {
                    true
                };

                if accepted {
                    resolve_contact(&mut body, other, result.normal, result.penetration);
                }
                touched.insert(key, state);
            }

            self.bodies.insert(handle, body);
        }

        // Post-step removals
        let removals = std::mem::take(&mut self.pending_removals);
        for handle in &removals {
            self.bodies.remove(handle);
        }

        let previous = std::mem::take(&mut self.contacts);
        let mut ended: BTreeMap<(BodyHandle, BodyHandle), ContactState> = previous
            .into_iter()
            .filter(|(key, _)| !touched.contains_key(key))
            .collect();
        for (key, state) in touched {
            if removals.contains(&key.0) || removals.contains(&key.1) {
                ended.insert(key, state);
            } else {
                self.contacts.insert(key, state);
            }
        }

        for state in ended.values() {
            if self.is_handled(state.pair.dynamic_type, state.pair.other_type) {
                handler.separate(&state.pair);
            }
        }
    }

    fn integrate(&mut self, dt: f32) {
        let gravity = self.gravity;
        let max_speed = self.max_speed;
        for body in self.bodies.values_mut() {
            if body.is_dynamic() {
                body.velocity += gravity * dt;
                body.velocity = body.velocity.clamp_length_max(max_speed);
            }
            body.position += body.velocity * dt;
            body.angle += body.angular_velocity * dt;
        }
    }
}

/// Push a dynamic body out of a kinematic one and remove the approaching
/// part of its velocity
fn resolve_contact(body: &mut Body, other: &Snapshot, normal: Vec2, penetration: f32) {
    let correction = (penetration - CONTACT_SLOP).max(0.0);
    body.position += normal * correction;

    let relative = body.velocity - other.velocity;
    let vn = relative.dot(normal);
    if vn >= 0.0 {
        return;
    }

    let elasticity = body.elasticity * other.elasticity;
    let friction = body.friction * other.friction;

    let dv_n = -(1.0 + elasticity) * vn;
    body.velocity += normal * dv_n;

    // Coulomb friction on the tangential part
    let relative = body.velocity - other.velocity;
    let vt = relative - relative.dot(normal) * normal;
    let vt_len = vt.length();
    if vt_len > 0.0 {
        let drop = (friction * dv_n).min(vt_len);
        body.velocity -= vt / vt_len * drop;
    }
}

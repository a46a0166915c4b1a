//! Sphere-based spatial queries.
//!
//! Every world object is approximated by a sphere. Objects that respond with
//! [`CollisionResponse::Overlap`] only generate overlap events; objects that
//! respond with [`CollisionResponse::Block`] also stop swept movers such as
//! projectiles.

use glam::Vec3;
use proving_common::EntityId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// How a collider reacts to other colliders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CollisionResponse {
    /// Reports overlaps, never blocks
    Overlap,
    /// Blocks swept movers and reports overlaps
    Block,
}

/// Sphere collider.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Collider {
    /// Sphere center
    pub center: Vec3,
    /// Sphere radius
    pub radius: f32,
    /// Collision response
    pub response: CollisionResponse,
}

impl Collider {
    /// Creates an overlap-only collider.
    #[must_use]
    pub const fn overlap(center: Vec3, radius: f32) -> Self {
        Self {
            center,
            radius,
            response: CollisionResponse::Overlap,
        }
    }

    /// Creates a blocking collider.
    #[must_use]
    pub const fn block(center: Vec3, radius: f32) -> Self {
        Self {
            center,
            radius,
            response: CollisionResponse::Block,
        }
    }

    /// Checks if this collider touches another.
    #[must_use]
    pub fn touches(&self, other: &Collider) -> bool {
        let reach = self.radius + other.radius;
        self.center.distance_squared(other.center) <= reach * reach
    }
}

/// Result of a swept-sphere query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SweepHit {
    /// Object that was hit
    pub entity: EntityId,
    /// Fraction of the sweep travelled before contact (0.0 to 1.0)
    pub time: f32,
    /// Position of the swept sphere's center at contact
    pub point: Vec3,
}

/// Spatial query interface.
///
/// This trait abstracts the host's overlap and collision detection.
pub trait SpatialQuery {
    /// Returns every object currently touching `id`, in id order.
    fn overlapping(&self, id: EntityId) -> Vec<EntityId>;

    /// Sweeps a sphere from `from` to `to` and returns the first blocking hit.
    fn sweep(&self, from: Vec3, to: Vec3, radius: f32, ignore: &[EntityId]) -> Option<SweepHit>;
}

/// Brute-force sphere space.
#[derive(Debug, Default)]
pub struct SphereSpace {
    colliders: BTreeMap<EntityId, Collider>,
}

impl SphereSpace {
    /// Creates an empty space.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of colliders.
    #[must_use]
    pub fn len(&self) -> usize {
        self.colliders.len()
    }

    /// Returns true if the space is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.colliders.is_empty()
    }

    /// Inserts or replaces the collider for `id`.
    pub fn insert(&mut self, id: EntityId, collider: Collider) {
        let _ = self.colliders.insert(id, collider);
    }

    /// Removes the collider for `id`.
    pub fn remove(&mut self, id: EntityId) -> Option<Collider> {
        self.colliders.remove(&id)
    }

    /// Returns the collider for `id`.
    #[must_use]
    pub fn get(&self, id: EntityId) -> Option<&Collider> {
        self.colliders.get(&id)
    }

    /// Moves a collider. Returns false if `id` has none.
    pub fn set_center(&mut self, id: EntityId, center: Vec3) -> bool {
        match self.colliders.get_mut(&id) {
            Some(collider) => {
                collider.center = center;
                true
            },
            None => false,
        }
    }
}

impl SpatialQuery for SphereSpace {
    fn overlapping(&self, id: EntityId) -> Vec<EntityId> {
        let Some(subject) = self.colliders.get(&id) else {
            return Vec::new();
        };
        self.colliders
            .iter()
            .filter(|(other, collider)| **other != id && subject.touches(collider))
            .map(|(other, _)| *other)
            .collect()
    }

    fn sweep(&self, from: Vec3, to: Vec3, radius: f32, ignore: &[EntityId]) -> Option<SweepHit> {
        let delta = to - from;
        let mut best: Option<SweepHit> = None;

        for (id, collider) in &self.colliders {
            if collider.response != CollisionResponse::Block || ignore.contains(id) {
                continue;
            }
            let Some(time) = sphere_sweep_time(from, delta, collider.center, radius + collider.radius)
            else {
                continue;
            };
            if best.map_or(true, |hit| time < hit.time) {
                best = Some(SweepHit {
                    entity: *id,
                    time,
                    point: from + delta * time,
                });
            }
        }

        best
    }
}

/// Earliest `t` in `[0, 1]` at which `from + delta * t` is within `reach` of `center`.
fn sphere_sweep_time(from: Vec3, delta: Vec3, center: Vec3, reach: f32) -> Option<f32> {
    let m = from - center;
    let c = m.length_squared() - reach * reach;
    if c <= 0.0 {
        return Some(0.0);
    }

    let a = delta.length_squared();
    if a <= f32::EPSILON {
        return None;
    }
    let b = m.dot(delta);
    if b >= 0.0 {
        // moving away
        return None;
    }

    let disc = b * b - a * c;
    if disc < 0.0 {
        return None;
    }
    let t = (-b - disc.sqrt()) / a;
    (0.0..=1.0).contains(&t).then_some(t)
}

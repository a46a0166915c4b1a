//! Straight-flying projectiles.
//!
//! A projectile's direction is fixed at launch. It moves without gravity at
//! a constant speed, damages the first blocking object it touches and is then
//! removed. Projectiles that hit nothing are removed when their life span
//! runs out.

use glam::Vec3;
use proving_common::{ConfigError, ConfigResult, EntityId};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use crate::host::{DamageSink, Lifetime};
use crate::spatial::Collider;
use crate::timer::{checked_duration, Scheduler, TimerHandle};

/// Projectile tuning.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectileConfig {
    /// Initial speed in units per second
    pub speed: f32,
    /// Damage delivered on hit
    pub damage: f32,
    /// Seconds before self-destruction
    pub life_span: f32,
    /// Collision radius
    pub radius: f32,
}

impl Default for ProjectileConfig {
    fn default() -> Self {
        Self {
            speed: 2000.0,
            damage: 30.0,
            life_span: 5.0,
            radius: 10.0,
        }
    }
}

impl ProjectileConfig {
    /// Checks every field against its minimum.
    pub fn validate(&self) -> ConfigResult<()> {
        let fields = [
            ("speed", self.speed, 0.1),
            ("damage", self.damage, 0.0),
            ("life_span", self.life_span, 0.1),
            ("radius", self.radius, 0.0),
        ];
        for (field, value, min) in fields {
            if !(value >= min && value.is_finite()) {
                return Err(ConfigError::OutOfRange { field, value, min });
            }
        }
        let _ = checked_duration("life_span", self.life_span)?;
        Ok(())
    }

    /// Validates the tuning and converts it for launching.
    pub fn launch_params(&self) -> ConfigResult<LaunchParams> {
        self.validate()?;
        Ok(LaunchParams {
            speed: self.speed,
            damage: self.damage,
            life_span: checked_duration("life_span", self.life_span)?,
            radius: self.radius,
        })
    }
}

/// Checked projectile tuning used at launch.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LaunchParams {
    speed: f32,
    damage: f32,
    life_span: Duration,
    radius: f32,
}

impl Default for LaunchParams {
    fn default() -> Self {
        Self {
            speed: 2000.0,
            damage: 30.0,
            life_span: Duration::from_secs(5),
            radius: 10.0,
        }
    }
}

impl LaunchParams {
    /// Time before self-destruction.
    #[must_use]
    pub const fn life_span(&self) -> Duration {
        self.life_span
    }
}

/// Flight state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProjectileState {
    /// In flight
    Flying,
    /// Hit something or expired, awaiting removal
    Stopped,
}

/// A projectile in flight.
#[derive(Debug, Clone)]
pub struct Projectile {
    id: EntityId,
    owner: Option<EntityId>,
    position: Vec3,
    velocity: Vec3,
    damage: f32,
    radius: f32,
    state: ProjectileState,
    /// Simulation time the position was last integrated to
    last_update: Duration,
    life_span_timer: Option<TimerHandle>,
}

impl Projectile {
    /// Launches a projectile from `origin` along `direction`.
    ///
    /// A zero direction launches a stationary projectile that still expires.
    pub fn launch<S: Scheduler>(
        owner: Option<EntityId>,
        origin: Vec3,
        direction: Vec3,
        params: &LaunchParams,
        scheduler: &mut S,
    ) -> Self {
        Self {
            id: EntityId::new(),
            owner,
            position: origin,
            velocity: direction.normalize_or_zero() * params.speed,
            damage: params.damage,
            radius: params.radius,
            state: ProjectileState::Flying,
            last_update: scheduler.now(),
            life_span_timer: Some(scheduler.schedule_once(params.life_span)),
        }
    }

    /// Returns the projectile's unique ID.
    #[must_use]
    pub const fn id(&self) -> EntityId {
        self.id
    }

    /// Returns the object that fired this projectile.
    #[must_use]
    pub const fn owner(&self) -> Option<EntityId> {
        self.owner
    }

    /// Returns the current position.
    #[must_use]
    pub const fn position(&self) -> Vec3 {
        self.position
    }

    /// Returns the current velocity.
    #[must_use]
    pub const fn velocity(&self) -> Vec3 {
        self.velocity
    }

    /// Returns the damage delivered on hit.
    #[must_use]
    pub const fn damage(&self) -> f32 {
        self.damage
    }

    /// Returns the collision radius.
    #[must_use]
    pub const fn radius(&self) -> f32 {
        self.radius
    }

    /// Returns the flight state.
    #[must_use]
    pub const fn state(&self) -> ProjectileState {
        self.state
    }

    /// Returns true while in flight.
    #[must_use]
    pub fn is_flying(&self) -> bool {
        self.state == ProjectileState::Flying
    }

    /// Pending life span timer.
    #[must_use]
    pub const fn life_span_timer(&self) -> Option<TimerHandle> {
        self.life_span_timer
    }

    /// Overlap sphere at the current position.
    #[must_use]
    pub fn collider(&self) -> Collider {
        Collider::overlap(self.position, self.radius)
    }

    /// Segment the projectile would cover between its last update and `now`.
    #[must_use]
    pub fn travel(&self, now: Duration) -> (Vec3, Vec3) {
        if !self.is_flying() {
            return (self.position, self.position);
        }
        let dt = now.saturating_sub(self.last_update).as_secs_f32();
        (self.position, self.position + self.velocity * dt)
    }

    /// Commits movement up to `now`.
    pub fn move_to(&mut self, position: Vec3, now: Duration) {
        if self.is_flying() {
            self.position = position;
            self.last_update = self.last_update.max(now);
        }
    }

    /// Handles the first blocking contact.
    ///
    /// Stops the projectile at `point`, damages `other` and requests removal.
    /// Returns false if the projectile had already stopped.
    pub fn on_hit<H, S>(&mut self, other: EntityId, point: Vec3, host: &mut H, scheduler: &mut S) -> bool
    where
        H: DamageSink + Lifetime,
        S: Scheduler,
    {
        if !self.is_flying() {
            return false;
        }

        self.stop(scheduler);
        self.position = point;
        host.apply_damage(other, self.damage, Some(self.id));
        let _ = host.destroy(self.id);
        debug!("Projectile {} hit {} for {}", self.id, other, self.damage);
        true
    }

    /// Handles the life span timer.
    pub fn on_life_span_expired<L: Lifetime + ?Sized>(&mut self, lifetime: &mut L) {
        self.state = ProjectileState::Stopped;
        self.velocity = Vec3::ZERO;
        self.life_span_timer = None;
        let _ = lifetime.destroy(self.id);
    }

    fn stop<S: Scheduler>(&mut self, scheduler: &mut S) {
        self.state = ProjectileState::Stopped;
        self.velocity = Vec3::ZERO;
        if let Some(timer) = self.life_span_timer.take() {
            let _ = scheduler.cancel(timer);
        }
    }
}

//! Timed-fire turret.
//!
//! ```text
//! Idle --activate--> Firing --last round--> Depleted
//! ```
//!
//! Once activated the turret fires every interval, starting one interval
//! after activation. Each firing produces a [`ShotRequest`] along the
//! turret's current forward direction and spends one round. The fire timer is
//! cancelled exactly once, when the last round is spent.

use glam::Vec3;
use proving_common::{ConfigError, ConfigResult, EntityId, Transform};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{info, warn};

use crate::spatial::Collider;
use crate::timer::{Scheduler, TimerHandle};

/// Radius of a turret's collision sphere.
pub const TURRET_RADIUS: f32 = 50.0;

/// Validated turret parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurretConfig {
    ammo_count: u32,
    fire_interval: Duration,
}

impl Default for TurretConfig {
    fn default() -> Self {
        Self {
            ammo_count: 10,
            fire_interval: Duration::from_secs(1),
        }
    }
}

impl TurretConfig {
    /// Creates a config from raw values. Ammo and interval must be positive.
    pub fn new(ammo_count: i64, fire_frequency: f32) -> ConfigResult<Self> {
        let ammo = u32::try_from(ammo_count)
            .ok()
            .filter(|ammo| *ammo > 0)
            .ok_or(ConfigError::InvalidAmmo { ammo: ammo_count })?;
        let fire_interval = Duration::try_from_secs_f32(fire_frequency)
            .ok()
            .filter(|interval| !interval.is_zero())
            .ok_or(ConfigError::InvalidFireInterval {
                seconds: fire_frequency,
            })?;
        Ok(Self {
            ammo_count: ammo,
            fire_interval,
        })
    }

    /// Rounds loaded at activation.
    #[must_use]
    pub const fn ammo_count(&self) -> u32 {
        self.ammo_count
    }

    /// Time between shots.
    #[must_use]
    pub const fn fire_interval(&self) -> Duration {
        self.fire_interval
    }
}

/// Turret lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurretState {
    /// Not yet activated
    Idle,
    /// Firing on a repeating timer
    Firing {
        /// The fire timer
        timer: TimerHandle,
    },
    /// Out of ammo; terminal
    Depleted,
}

/// A projectile the turret wants spawned.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShotRequest {
    /// Turret that fired
    pub turret: EntityId,
    /// Muzzle position
    pub origin: Vec3,
    /// Unit shot direction
    pub direction: Vec3,
}

/// A turret in the sandbox.
#[derive(Debug, Clone)]
pub struct Turret {
    id: EntityId,
    transform: Transform,
    config: TurretConfig,
    ammo: u32,
    shots_fired: u32,
    state: TurretState,
}

impl Turret {
    /// Creates an idle turret.
    #[must_use]
    pub fn new(transform: Transform, config: TurretConfig) -> Self {
        Self {
            id: EntityId::new(),
            transform,
            config,
            ammo: config.ammo_count,
            shots_fired: 0,
            state: TurretState::Idle,
        }
    }

    /// Returns the turret's unique ID.
    #[must_use]
    pub const fn id(&self) -> EntityId {
        self.id
    }

    /// Returns the turret's transform.
    #[must_use]
    pub const fn transform(&self) -> &Transform {
        &self.transform
    }

    /// Re-aims the turret. Later shots use the new forward direction.
    pub fn set_transform(&mut self, transform: Transform) {
        self.transform = transform;
    }

    /// Returns the active config.
    #[must_use]
    pub const fn config(&self) -> &TurretConfig {
        &self.config
    }

    /// Rounds left.
    #[must_use]
    pub const fn ammo(&self) -> u32 {
        self.ammo
    }

    /// Shots fired so far.
    #[must_use]
    pub const fn shots_fired(&self) -> u32 {
        self.shots_fired
    }

    /// Returns the lifecycle state.
    #[must_use]
    pub const fn state(&self) -> TurretState {
        self.state
    }

    /// Returns the fire timer while firing.
    #[must_use]
    pub const fn fire_timer(&self) -> Option<TimerHandle> {
        match self.state {
            TurretState::Firing { timer } => Some(timer),
            _ => None,
        }
    }

    /// Returns true once out of ammo.
    #[must_use]
    pub fn is_depleted(&self) -> bool {
        self.state == TurretState::Depleted
    }

    /// Blocking collision sphere at the turret's position.
    #[must_use]
    pub fn collider(&self) -> Collider {
        Collider::block(self.transform.position, TURRET_RADIUS)
    }

    /// Reconfigures ammo and interval. Only an idle turret accepts new data.
    ///
    /// Returns Ok(false) if the turret is already running.
    pub fn set_turret_data(&mut self, ammo_count: i64, fire_frequency: f32) -> ConfigResult<bool> {
        let config = TurretConfig::new(ammo_count, fire_frequency)?;
        if self.state != TurretState::Idle {
            warn!("Turret {} is running, ignoring new turret data", self.id);
            return Ok(false);
        }
        self.config = config;
        self.ammo = config.ammo_count;
        Ok(true)
    }

    /// Starts the fire loop. Returns false unless the turret was idle.
    pub fn activate<S: Scheduler>(&mut self, scheduler: &mut S) -> bool {
        if self.state != TurretState::Idle {
            return false;
        }
        let interval = self.config.fire_interval;
        let timer = scheduler.schedule_repeating(interval, interval);
        self.state = TurretState::Firing { timer };
        info!(
            "Turret {} firing {} rounds every {:?}",
            self.id, self.ammo, interval
        );
        true
    }

    /// Handles a fire timer tick.
    ///
    /// Returns the shot to spawn, or None if the turret is not firing.
    pub fn on_fire<S: Scheduler>(&mut self, scheduler: &mut S) -> Option<ShotRequest> {
        let TurretState::Firing { timer } = self.state else {
            return None;
        };

        let shot = ShotRequest {
            turret: self.id,
            origin: self.transform.position,
            direction: self.transform.forward(),
        };

        self.ammo = self.ammo.saturating_sub(1);
        self.shots_fired += 1;
        if self.ammo == 0 {
            let _ = scheduler.cancel(timer);
            self.state = TurretState::Depleted;
            info!("Turret {} depleted after {} shots", self.id, self.shots_fired);
        }

        Some(shot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timer::TimerManager;

    fn secs(s: f32) -> Duration {
        Duration::from_secs_f32(s)
    }

    #[test]
    fn test_fires_ammo_count_times_then_stops() {
        let mut timers = TimerManager::new();
        let config = TurretConfig::new(3, 2.0).expect("valid config");
        let mut turret = Turret::new(Transform::IDENTITY, config);
        assert!(turret.activate(&mut timers));

        let mut fire_times = Vec::new();
        while let Some(fired) = timers.pop_due(secs(20.0)) {
            assert_eq!(turret.fire_timer(), Some(fired.handle));
            if turret.on_fire(&mut timers).is_some() {
                fire_times.push(fired.at);
            }
        }

        assert_eq!(fire_times, vec![secs(2.0), secs(4.0), secs(6.0)]);
        assert!(turret.is_depleted());
        assert_eq!(turret.ammo(), 0);
        assert_eq!(turret.shots_fired(), 3);
        assert_eq!(timers.active_count(), 0);
        assert!(turret.on_fire(&mut timers).is_none());
    }

    #[test]
    fn test_shot_follows_current_forward() {
        let mut timers = TimerManager::new();
        let mut turret = Turret::new(Transform::IDENTITY, TurretConfig::default());
        assert!(turret.activate(&mut timers));

        let first = turret.on_fire(&mut timers).expect("shot");
        assert!(first.direction.abs_diff_eq(Vec3::X, 1e-6));

        turret.set_transform(Transform::looking_along(Vec3::ZERO, Vec3::Y));
        let second = turret.on_fire(&mut timers).expect("shot");
        assert!(second.direction.abs_diff_eq(Vec3::Y, 1e-5));
    }

    #[test]
    fn test_idle_turret_does_not_fire() {
        let mut timers = TimerManager::new();
        let mut turret = Turret::new(Transform::IDENTITY, TurretConfig::default());
        assert!(turret.on_fire(&mut timers).is_none());
        assert_eq!(turret.ammo(), 10);
    }

    #[test]
    fn test_set_turret_data() {
        let cases = [(45, 2.0), (15, 3.0), (5, 5.0)];
        for (ammo, freq) in cases {
            let mut turret = Turret::new(Transform::IDENTITY, TurretConfig::default());
            assert_eq!(turret.set_turret_data(ammo, freq), Ok(true));
            assert_eq!(i64::from(turret.ammo()), ammo);
            assert_eq!(turret.config().fire_interval(), secs(freq));
        }
    }

    #[test]
    fn test_running_turret_keeps_data() {
        let mut timers = TimerManager::new();
        let mut turret = Turret::new(Transform::IDENTITY, TurretConfig::default());
        assert!(turret.activate(&mut timers));
        assert!(!turret.activate(&mut timers));
        assert_eq!(turret.set_turret_data(3, 0.5), Ok(false));
        assert_eq!(turret.ammo(), 10);
    }

    #[test]
    fn test_invalid_config() {
        assert_eq!(
            TurretConfig::new(0, 1.0),
            Err(ConfigError::InvalidAmmo { ammo: 0 })
        );
        assert_eq!(
            TurretConfig::new(-4, 1.0),
            Err(ConfigError::InvalidAmmo { ammo: -4 })
        );
        assert!(matches!(
            TurretConfig::new(3, 0.0),
            Err(ConfigError::InvalidFireInterval { .. })
        ));
        assert!(TurretConfig::new(3, f32::NAN).is_err());
    }
}

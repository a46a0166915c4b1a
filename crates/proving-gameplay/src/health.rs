//! Health with timed regeneration.
//!
//! Damage starts a repeating heal timer that restores a fixed amount per tick
//! until health is full again. Lethal damage stops healing and schedules the
//! owner's removal after its life span.

use proving_common::{ConfigError, ConfigResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use tracing::debug;

use crate::timer::{checked_duration, Scheduler, TimerHandle};

/// Tunable health parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HealthData {
    /// Maximum health (at least 1)
    pub max_health: f32,
    /// Health restored per heal tick (at least 0.1)
    pub heal_modifier: f32,
    /// Seconds between heal ticks (at least 0.1)
    pub heal_rate: f32,
    /// Seconds a dead body stays in the world (at least 0.1)
    pub life_span: f32,
}

impl Default for HealthData {
    fn default() -> Self {
        Self {
            max_health: 100.0,
            heal_modifier: 10.0,
            heal_rate: 0.5,
            life_span: 5.0,
        }
    }
}

impl HealthData {
    /// Checks every field against its minimum.
    pub fn validate(&self) -> ConfigResult<()> {
        check_min("max_health", self.max_health, 1.0)?;
        check_min("heal_modifier", self.heal_modifier, 0.1)?;
        check_min("heal_rate", self.heal_rate, 0.1)?;
        check_min("life_span", self.life_span, 0.1)?;
        let _ = self.durations()?;
        Ok(())
    }

    /// Heal tick interval and removal delay.
    fn durations(&self) -> ConfigResult<(Duration, Duration)> {
        Ok((
            checked_duration("heal_rate", self.heal_rate)?,
            checked_duration("life_span", self.life_span)?,
        ))
    }
}

impl fmt::Display for HealthData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "(MaxHealth={:.6},HealModifier={:.6},HealRate={:.6},LifeSpan={:.6})",
            self.max_health, self.heal_modifier, self.heal_rate, self.life_span
        )
    }
}

fn check_min(field: &'static str, value: f32, min: f32) -> ConfigResult<()> {
    // NaN fails the comparison and is rejected too
    if value >= min && value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange { field, value, min })
    }
}

/// Result of a damage attempt.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DamageOutcome {
    /// Damage was not applied (non-positive amount or already dead)
    Ignored,
    /// Health dropped but is still positive
    Damaged {
        /// Health after the hit
        health: f32,
    },
    /// Health reached zero
    Killed,
}

/// Health component.
#[derive(Debug, Clone)]
pub struct Health {
    data: HealthData,
    current: f32,
    heal_interval: Duration,
    /// How long a dead body stays before removal
    removal_delay: Duration,
    heal_timer: Option<TimerHandle>,
    removal_timer: Option<TimerHandle>,
}

impl Health {
    /// Creates full health from validated parameters.
    pub fn new(data: HealthData) -> ConfigResult<Self> {
        data.validate()?;
        let (heal_interval, removal_delay) = data.durations()?;
        Ok(Self {
            data,
            current: data.max_health,
            heal_interval,
            removal_delay,
            heal_timer: None,
            removal_timer: None,
        })
    }

    /// Returns the parameters.
    #[must_use]
    pub const fn data(&self) -> &HealthData {
        &self.data
    }

    /// Returns current health.
    #[must_use]
    pub const fn current(&self) -> f32 {
        self.current
    }

    /// Returns maximum health.
    #[must_use]
    pub const fn max(&self) -> f32 {
        self.data.max_health
    }

    /// Returns health as a fraction of maximum.
    #[must_use]
    pub fn percent(&self) -> f32 {
        self.current / self.data.max_health
    }

    /// Checks if dead.
    #[must_use]
    pub fn is_dead(&self) -> bool {
        self.current <= 0.0
    }

    /// Checks if health is at maximum.
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.current >= self.data.max_health
    }

    /// Time until regeneration brings health back to maximum.
    #[must_use]
    pub fn time_to_full(&self) -> Duration {
        if self.is_dead() {
            return Duration::ZERO;
        }
        let missing = (self.data.max_health - self.current).max(0.0);
        let ticks = (missing / self.data.heal_modifier).ceil() as u32;
        self.heal_interval.saturating_mul(ticks)
    }

    /// Pending heal timer, if regenerating.
    #[must_use]
    pub const fn heal_timer(&self) -> Option<TimerHandle> {
        self.heal_timer
    }

    /// Pending removal timer, if dead.
    #[must_use]
    pub const fn removal_timer(&self) -> Option<TimerHandle> {
        self.removal_timer
    }

    /// Applies damage.
    ///
    /// A surviving hit (re)starts the heal timer; a lethal hit cancels it
    /// and schedules removal after the life span.
    pub fn take_damage<S: Scheduler>(&mut self, amount: f32, scheduler: &mut S) -> DamageOutcome {
        if amount <= 0.0 || amount.is_nan() || self.is_dead() {
            return DamageOutcome::Ignored;
        }

        self.current = (self.current - amount).clamp(0.0, self.data.max_health);
        if let Some(timer) = self.heal_timer.take() {
            let _ = scheduler.cancel(timer);
        }

        if self.is_dead() {
            self.removal_timer = Some(scheduler.schedule_once(self.removal_delay));
            debug!("Health depleted, removal in {}s", self.data.life_span);
            return DamageOutcome::Killed;
        }

        let interval = self.heal_interval;
        self.heal_timer = Some(scheduler.schedule_repeating(interval, interval));
        DamageOutcome::Damaged {
            health: self.current,
        }
    }

    /// Handles a heal timer tick. Returns true once health is full.
    pub fn on_heal_tick<S: Scheduler>(&mut self, scheduler: &mut S) -> bool {
        if self.is_dead() {
            return false;
        }

        self.current = (self.current + self.data.heal_modifier).min(self.data.max_health);
        if self.is_full() {
            if let Some(timer) = self.heal_timer.take() {
                let _ = scheduler.cancel(timer);
            }
            return true;
        }
        false
    }
}

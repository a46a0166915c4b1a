//! Timer scheduling.
//!
//! Gameplay objects never own a clock. They receive a [`Scheduler`] and hold
//! on to the [`TimerHandle`]s it hands out; whoever drives the simulation asks
//! the [`TimerManager`] which timers are due and routes each firing back to
//! the owning object.
//!
//! Firings are delivered one at a time, so a timer cancelled while another
//! firing is being handled never fires afterwards.

use proving_common::{ConfigError, ConfigResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

/// Shortest accepted repeat interval.
pub const MIN_TIMER_INTERVAL: Duration = Duration::from_millis(1);

/// Converts a configured number of seconds for `field` into a [`Duration`].
///
/// Negative, NaN and overflowing values are rejected.
pub fn checked_duration(field: &'static str, value: f32) -> ConfigResult<Duration> {
    Duration::try_from_secs_f32(value).map_err(|_| ConfigError::InvalidDuration {
        field,
        seconds: value,
    })
}

/// Handle to a scheduled timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TimerHandle(u64);

impl TimerHandle {
    /// Returns the raw handle value.
    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for TimerHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "timer#{}", self.0)
    }
}

/// Timer scheduling interface.
///
/// This trait abstracts the host's timer service.
pub trait Scheduler {
    /// Current simulation time.
    fn now(&self) -> Duration;

    /// Schedules a timer that first fires after `first_delay` and then every `interval`.
    fn schedule_repeating(&mut self, interval: Duration, first_delay: Duration) -> TimerHandle;

    /// Schedules a timer that fires once after `delay`.
    fn schedule_once(&mut self, delay: Duration) -> TimerHandle;

    /// Cancels a timer. Returns false if it was not active.
    fn cancel(&mut self, handle: TimerHandle) -> bool;

    /// Checks whether a timer is still pending.
    fn is_active(&self, handle: TimerHandle) -> bool;
}

/// A timer that came due.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FiredTimer {
    /// Handle of the timer
    pub handle: TimerHandle,
    /// Simulation time the timer was due at
    pub at: Duration,
}

#[derive(Debug, Clone, Copy)]
struct TimerEntry {
    due: Duration,
    interval: Option<Duration>,
}

/// Deterministic timer wheel driven by simulation time.
#[derive(Debug, Default)]
pub struct TimerManager {
    /// Current simulation time
    now: Duration,
    /// Next handle value
    next_handle: u64,
    /// Pending timers
    timers: BTreeMap<TimerHandle, TimerEntry>,
}

impl TimerManager {
    /// Creates an empty timer manager at time zero.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of pending timers.
    #[must_use]
    pub fn active_count(&self) -> usize {
        self.timers.len()
    }

    /// Returns the earliest due time of any pending timer.
    #[must_use]
    pub fn next_due(&self) -> Option<Duration> {
        self.timers.values().map(|entry| entry.due).min()
    }

    /// Pops the earliest timer due at or before `deadline`.
    ///
    /// The clock moves to the timer's due time. Repeating timers are
    /// rescheduled, one-shot timers are removed. Ties are broken by
    /// creation order.
    pub fn pop_due(&mut self, deadline: Duration) -> Option<FiredTimer> {
        let (handle, due) = self
            .timers
            .iter()
            .filter(|(_, entry)| entry.due <= deadline)
            .min_by_key(|(handle, entry)| (entry.due, **handle))
            .map(|(handle, entry)| (*handle, entry.due))?;

        self.now = self.now.max(due);

        let reschedule = self.timers.get(&handle).and_then(|entry| entry.interval);
        match reschedule {
            Some(interval) => {
                if let Some(entry) = self.timers.get_mut(&handle) {
                    entry.due = due.saturating_add(interval);
                }
            },
            None => {
                let _ = self.timers.remove(&handle);
            },
        }

        Some(FiredTimer { handle, at: due })
    }

    /// Moves the clock forward to `deadline` without firing anything.
    ///
    /// Call after [`Self::pop_due`] has drained every timer due by `deadline`.
    pub fn advance_to(&mut self, deadline: Duration) {
        self.now = self.now.max(deadline);
    }

    fn allocate(&mut self, due: Duration, interval: Option<Duration>) -> TimerHandle {
        self.next_handle += 1;
        let handle = TimerHandle(self.next_handle);
        let _ = self.timers.insert(handle, TimerEntry { due, interval });
        handle
    }
}

impl Scheduler for TimerManager {
    fn now(&self) -> Duration {
        self.now
    }

    fn schedule_repeating(&mut self, interval: Duration, first_delay: Duration) -> TimerHandle {
        let interval = interval.max(MIN_TIMER_INTERVAL);
        self.allocate(self.now.saturating_add(first_delay), Some(interval))
    }

    fn schedule_once(&mut self, delay: Duration) -> TimerHandle {
        self.allocate(self.now.saturating_add(delay), None)
    }

    fn cancel(&mut self, handle: TimerHandle) -> bool {
        self.timers.remove(&handle).is_some()
    }

    fn is_active(&self, handle: TimerHandle) -> bool {
        self.timers.contains_key(&handle)
    }
}

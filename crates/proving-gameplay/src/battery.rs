//! Rechargeable battery item.

use proving_common::Color;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// Charge gained or lost per charge/discharge step.
pub const CHARGE_STEP: f32 = 0.1;

/// A battery with a charge level in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Battery {
    percent: f32,
}

impl Default for Battery {
    fn default() -> Self {
        Self { percent: 1.0 }
    }
}

impl Battery {
    /// Creates a battery at `percent`, clamped to `[0, 1]`.
    #[must_use]
    pub fn new(percent: f32) -> Self {
        let mut battery = Self::default();
        battery.set_percent(percent);
        battery
    }

    /// Adds one charge step.
    pub fn charge(&mut self) {
        self.set_percent(self.percent + CHARGE_STEP);
    }

    /// Removes one charge step.
    pub fn discharge(&mut self) {
        self.set_percent(self.percent - CHARGE_STEP);
    }

    /// Returns the charge level.
    #[must_use]
    pub const fn percent(&self) -> f32 {
        self.percent
    }

    /// Indicator color for the charge level.
    #[must_use]
    pub fn color(&self) -> Color {
        if self.percent > 0.8 {
            Color::GREEN
        } else if self.percent > 0.3 {
            Color::YELLOW
        } else {
            Color::RED
        }
    }

    fn set_percent(&mut self, percent: f32) {
        self.percent = if percent.is_nan() { 0.0 } else { percent.clamp(0.0, 1.0) };
    }
}

impl fmt::Display for Battery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", (self.percent * 100.0).round() as i32)
    }
}

impl PartialOrd for Battery {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.percent.partial_cmp(&other.percent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nearly_equal(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-4
    }

    #[test]
    fn test_default_battery() {
        let battery = Battery::default();
        assert!(nearly_equal(battery.percent(), 1.0));
        assert_eq!(battery.color(), Color::GREEN);
        assert_eq!(battery.to_string(), "100%");
    }

    #[test]
    fn test_custom_battery() {
        let cases = [
            (1.0, Color::GREEN, "100%"),
            (0.46, Color::YELLOW, "46%"),
            (0.16, Color::RED, "16%"),
            (0.0, Color::RED, "0%"),
            (3000.16, Color::GREEN, "100%"),
            (-3000.16, Color::RED, "0%"),
        ];
        for (percent, color, text) in cases {
            let battery = Battery::new(percent);
            assert!(nearly_equal(battery.percent(), percent.clamp(0.0, 1.0)));
            assert_eq!(battery.color(), color, "color for {percent}");
            assert_eq!(battery.to_string(), text);
        }
    }

    #[test]
    fn test_charge_discharge() {
        let mut battery = Battery::new(0.6);
        battery.discharge();
        assert!(nearly_equal(battery.percent(), 0.5));
        battery.charge();
        assert!(nearly_equal(battery.percent(), 0.6));
    }

    #[test]
    fn test_charge_discharge_corner_cases() {
        let mut battery = Battery::new(0.6);
        for _ in 0..100 {
            battery.discharge();
        }
        assert!(nearly_equal(battery.percent(), 0.0));
        for _ in 0..100 {
            battery.charge();
        }
        assert!(nearly_equal(battery.percent(), 1.0));
    }

    #[test]
    fn test_comparison() {
        let low = Battery::new(0.3);
        let high = Battery::new(0.9);
        assert!(high >= low);
        assert!(low < high);
    }
}

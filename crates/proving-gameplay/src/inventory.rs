//! Capacity-limited inventory.
//!
//! Each [`ItemKind`] accumulates a score up to a fixed limit. Additions that
//! are negative or that would push a total past its limit are rejected and
//! leave the inventory untouched.

use proving_common::{ConfigError, ConfigResult};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::item::{InventoryData, ItemKind, PerKind};

/// Inventory error types.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InventoryError {
    /// Negative contributions are never accepted
    #[error("Negative amount {amount} for {kind}")]
    NegativeAmount {
        /// Item kind
        kind: ItemKind,
        /// Rejected amount
        amount: i32,
    },
    /// The addition would exceed the kind's limit
    #[error("{kind} over limit: {current} + {amount} > {limit}")]
    OverLimit {
        /// Item kind
        kind: ItemKind,
        /// Total before the attempt
        current: u32,
        /// Rejected amount
        amount: u32,
        /// Configured limit
        limit: u32,
    },
}

/// Result type for inventory operations.
pub type InventoryResult<T> = Result<T, InventoryError>;

/// Per-kind upper bounds for an inventory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct InventoryLimits(PerKind<u32>);

impl InventoryLimits {
    /// Creates limits from a complete per-kind table.
    #[must_use]
    pub const fn new(limits: PerKind<u32>) -> Self {
        Self(limits)
    }

    /// Same limit for every kind.
    #[must_use]
    pub const fn uniform(limit: u32) -> Self {
        Self(PerKind::splat(limit))
    }

    /// Builds limits from keyed entries, as read from a config file.
    ///
    /// Every kind must be present with a limit in `0..=u32::MAX`. Later entries
    /// for the same kind replace earlier ones.
    pub fn from_entries<I>(entries: I) -> ConfigResult<Self>
    where
        I: IntoIterator<Item = (ItemKind, i64)>,
    {
        let mut table: PerKind<Option<i64>> = PerKind::default();
        for (kind, limit) in entries {
            table[kind] = Some(limit);
        }

        let mut limits = PerKind::splat(0u32);
        for (kind, limit) in table.iter() {
            let limit = limit.ok_or_else(|| ConfigError::MissingLimit {
                kind: kind.to_string(),
            })?;
            if limit < 0 {
                return Err(ConfigError::NegativeLimit {
                    kind: kind.to_string(),
                    limit,
                });
            }
            limits[kind] = u32::try_from(limit).map_err(|_| ConfigError::LimitTooLarge {
                kind: kind.to_string(),
                limit,
            })?;
        }
        Ok(Self(limits))
    }

    /// Returns the limit for `kind`.
    #[must_use]
    pub fn limit(&self, kind: ItemKind) -> u32 {
        self.0[kind]
    }
}

/// An inventory container.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Inventory {
    /// Accumulated score per kind
    amounts: PerKind<u32>,
    /// Upper bound per kind
    limits: InventoryLimits,
}

impl Inventory {
    /// Creates an empty inventory with the given limits.
    #[must_use]
    pub fn new(limits: InventoryLimits) -> Self {
        Self {
            amounts: PerKind::default(),
            limits,
        }
    }

    /// Returns the configured limits.
    #[must_use]
    pub const fn limits(&self) -> &InventoryLimits {
        &self.limits
    }

    /// Returns the accumulated score for `kind` (zero if untouched).
    #[must_use]
    pub fn amount_for(&self, kind: ItemKind) -> u32 {
        self.amounts[kind]
    }

    /// Returns how much more of `kind` fits.
    #[must_use]
    pub fn remaining(&self, kind: ItemKind) -> u32 {
        self.limits.limit(kind).saturating_sub(self.amounts[kind])
    }

    /// Adds `amount` of `kind`, returning the new total.
    ///
    /// On error nothing changes.
    pub fn try_add(&mut self, kind: ItemKind, amount: i32) -> InventoryResult<u32> {
        let Ok(amount) = u32::try_from(amount) else {
            debug!("Rejected negative amount {amount} for {kind}");
            return Err(InventoryError::NegativeAmount { kind, amount });
        };

        let current = self.amounts[kind];
        let limit = self.limits.limit(kind);
        let next = u64::from(current) + u64::from(amount);
        if next > u64::from(limit) {
            debug!("Rejected {amount} {kind}: {current}/{limit}");
            return Err(InventoryError::OverLimit {
                kind,
                current,
                amount,
                limit,
            });
        }

        // next <= limit, so it fits in u32
        let next = next as u32;
        self.amounts[kind] = next;
        debug!("Added {amount} {kind}: {next}/{limit}");
        Ok(next)
    }

    /// Adds the contents of a pickup.
    pub fn try_add_item(&mut self, data: &InventoryData) -> InventoryResult<u32> {
        self.try_add(data.kind, data.score)
    }

    /// Returns an iterator over all accumulated amounts.
    pub fn iter(&self) -> impl Iterator<Item = (ItemKind, u32)> + '_ {
        self.amounts.iter().map(|(kind, &amount)| (kind, amount))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn kind_strategy() -> impl Strategy<Value = ItemKind> {
        (0..ItemKind::COUNT).prop_map(|i| ItemKind::ALL[i])
    }

    #[test]
    fn test_scores_zero_by_default() {
        let inv = Inventory::default();
        for kind in ItemKind::ALL {
            assert_eq!(inv.amount_for(kind), 0);
        }
    }

    #[test]
    fn test_negative_score_rejected() {
        let mut inv = Inventory::default();
        for kind in ItemKind::ALL {
            assert_eq!(
                inv.try_add(kind, -10),
                Err(InventoryError::NegativeAmount { kind, amount: -10 })
            );
            assert_eq!(inv.amount_for(kind), 0);
        }
    }

    #[test]
    fn test_positive_score_added() {
        let mut inv = Inventory::new(InventoryLimits::uniform(300));
        for kind in ItemKind::ALL {
            assert_eq!(inv.try_add(kind, 10), Ok(10));
            assert_eq!(inv.amount_for(kind), 10);
        }
    }

    #[test]
    fn test_score_more_than_limit() {
        let mut inv = Inventory::new(InventoryLimits::uniform(300));

        assert!(inv.try_add(ItemKind::Cone, 10).is_ok());
        assert_eq!(inv.amount_for(ItemKind::Cone), 10);

        assert_eq!(
            inv.try_add(ItemKind::Cone, 300),
            Err(InventoryError::OverLimit {
                kind: ItemKind::Cone,
                current: 10,
                amount: 300,
                limit: 300,
            })
        );
        assert_eq!(inv.amount_for(ItemKind::Cone), 10);

        assert!(inv.try_add(ItemKind::Cone, -10).is_err());
        assert_eq!(inv.amount_for(ItemKind::Cone), 10);
        assert_eq!(inv.remaining(ItemKind::Cone), 290);
    }

    #[test]
    fn test_exact_limit_accepted() {
        let mut inv = Inventory::new(InventoryLimits::uniform(50));
        assert_eq!(inv.try_add(ItemKind::Cube, 50), Ok(50));
        assert!(inv.try_add(ItemKind::Cube, 1).is_err());
        assert_eq!(inv.try_add(ItemKind::Cube, 0), Ok(50));
    }

    #[test]
    fn test_default_limits_reject_positive() {
        let mut inv = Inventory::default();
        assert!(inv.try_add(ItemKind::Sphere, 1).is_err());
        assert_eq!(inv.try_add(ItemKind::Sphere, 0), Ok(0));
    }

    #[test]
    fn test_limits_from_entries() {
        let limits = InventoryLimits::from_entries([
            (ItemKind::Sphere, 10),
            (ItemKind::Cube, 20),
            (ItemKind::Cylinder, 30),
            (ItemKind::Cone, 40),
        ])
        .expect("complete limits");
        assert_eq!(limits.limit(ItemKind::Cylinder), 30);
    }

    #[test]
    fn test_limits_missing_kind() {
        let err = InventoryLimits::from_entries([
            (ItemKind::Sphere, 10),
            (ItemKind::Cube, 20),
            (ItemKind::Cone, 40),
        ])
        .expect_err("cylinder is missing");
        assert_eq!(
            err,
            ConfigError::MissingLimit {
                kind: "Cylinder".to_string()
            }
        );
    }

    #[test]
    fn test_limits_negative() {
        let err = InventoryLimits::from_entries(ItemKind::ALL.map(|kind| {
            if kind == ItemKind::Cube {
                (kind, -1)
            } else {
                (kind, 5)
            }
        }))
        .expect_err("cube is negative");
        assert!(matches!(err, ConfigError::NegativeLimit { limit: -1, .. }));
    }

    #[test]
    fn test_limits_too_large() {
        let too_large = i64::from(u32::MAX) + 1;
        let err = InventoryLimits::from_entries(ItemKind::ALL.map(|kind| {
            if kind == ItemKind::Sphere {
                (kind, too_large)
            } else {
                (kind, 5)
            }
        }))
        .expect_err("sphere limit overflows");
        assert_eq!(
            err,
            ConfigError::LimitTooLarge {
                kind: "Sphere".to_string(),
                limit: too_large,
            }
        );

        let max = InventoryLimits::from_entries(ItemKind::ALL.map(|kind| (kind, i64::from(u32::MAX))))
            .expect("u32::MAX fits");
        assert_eq!(max.limit(ItemKind::Cone), u32::MAX);
    }

    proptest! {
        #[test]
        fn prop_sums_within_limit_accumulate(
            kind in kind_strategy(),
            limit in 0u32..10_000,
            amounts in prop::collection::vec(0i32..500, 0..40),
        ) {
            let mut inv = Inventory::new(InventoryLimits::uniform(limit));
            let mut expected = 0u32;
            for amount in amounts {
                let before = inv.amount_for(kind);
                let result = inv.try_add(kind, amount);
                if expected + amount as u32 <= limit {
                    expected += amount as u32;
                    prop_assert_eq!(result, Ok(expected));
                } else {
                    prop_assert!(result.is_err());
                    prop_assert_eq!(inv.amount_for(kind), before);
                }
                prop_assert!(inv.amount_for(kind) <= limit);
            }
            prop_assert_eq!(inv.amount_for(kind), expected);
        }

        #[test]
        fn prop_negative_never_mutates(
            kind in kind_strategy(),
            seed in 0i32..300,
            amount in i32::MIN..0,
        ) {
            let mut inv = Inventory::new(InventoryLimits::uniform(300));
            inv.try_add(kind, seed).expect("seed fits");
            let snapshot = inv.clone();
            prop_assert!(inv.try_add(kind, amount).is_err());
            prop_assert_eq!(inv, snapshot);
        }

        #[test]
        fn prop_other_kinds_untouched(
            kind in kind_strategy(),
            amount in 0i32..100,
        ) {
            let mut inv = Inventory::new(InventoryLimits::uniform(100));
            inv.try_add(kind, amount).expect("fits");
            for other in ItemKind::ALL.into_iter().filter(|k| *k != kind) {
                prop_assert_eq!(inv.amount_for(other), 0);
            }
        }
    }
}

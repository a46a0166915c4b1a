//! # Proving Gameplay
//!
//! Gameplay systems for the Proving Ground sandbox.
//!
//! This crate provides the simulation core:
//! - Item kinds and capacity-limited inventories
//! - Pickups that feed inventories on contact
//! - Health with timed regeneration, characters
//! - Timed-fire turrets and straight-flying projectiles
//! - A charge battery
//! - Timer scheduling and sphere spatial queries behind host traits
//! - The sandbox world and its event bus
//! - Fibonacci and factorial helpers

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

pub mod battery;
pub mod character;
pub mod events;
pub mod health;
pub mod host;
pub mod inventory;
pub mod item;
pub mod pickup;
pub mod projectile;
pub mod sandbox;
pub mod science;
pub mod spatial;
pub mod timer;
pub mod turret;

mod e2e_tests;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::battery::*;
    pub use crate::character::*;
    pub use crate::events::*;
    pub use crate::health::*;
    pub use crate::host::*;
    pub use crate::inventory::*;
    pub use crate::item::*;
    pub use crate::pickup::*;
    pub use crate::projectile::*;
    pub use crate::sandbox::*;
    pub use crate::science::*;
    pub use crate::spatial::*;
    pub use crate::timer::*;
    pub use crate::turret::*;
}

pub use prelude::*;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inventory_accumulates_to_limit() {
        let mut inv = Inventory::new(InventoryLimits::uniform(300));

        assert_eq!(inv.try_add(ItemKind::Sphere, 10), Ok(10));
        assert!(inv.try_add(ItemKind::Sphere, 300).is_err());
        assert!(inv.try_add(ItemKind::Sphere, -10).is_err());
        assert_eq!(inv.amount_for(ItemKind::Sphere), 10);
    }

    #[test]
    fn test_battery_charge_cycle() {
        let mut battery = Battery::new(0.46);
        assert_eq!(battery.to_string(), "46%");

        for _ in 0..100 {
            battery.discharge();
        }
        assert_eq!(battery.percent(), 0.0);
    }
}

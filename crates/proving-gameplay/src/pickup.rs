//! Collectible pickups.
//!
//! A pickup grants its [`InventoryData`] to the first agent whose inventory
//! accepts it and is then removed from the world. A rejected pickup stays
//! where it is and may be retried on the next overlap.

use glam::Vec3;
use proving_common::{Color, EntityId, Transform};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::character::InventoryHolder;
use crate::host::Lifetime;
use crate::inventory::InventoryError;
use crate::item::InventoryData;
use crate::spatial::Collider;

/// Radius of a pickup's overlap sphere.
pub const PICKUP_RADIUS: f32 = 30.0;

/// Result of an agent touching a pickup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PickupOutcome {
    /// The agent took the pickup
    Consumed {
        /// Agent's new total for the item kind
        total: u32,
    },
    /// The agent's inventory refused the pickup
    Rejected(InventoryError),
    /// The agent has no inventory
    NoInventory,
    /// The pickup was already taken
    AlreadyConsumed,
}

/// A pickup lying in the world.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pickup {
    id: EntityId,
    transform: Transform,
    data: InventoryData,
    color: Color,
    consumed: bool,
}

impl Pickup {
    /// Creates a white pickup.
    #[must_use]
    pub fn new(data: InventoryData, transform: Transform) -> Self {
        Self {
            id: EntityId::new(),
            transform,
            data,
            color: Color::WHITE,
            consumed: false,
        }
    }

    /// Sets the tint color.
    #[must_use]
    pub fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    /// Replaces what the pickup grants and how it looks.
    pub fn set_inventory_data(&mut self, data: InventoryData, color: Color) {
        self.data = data;
        self.color = color;
    }

    /// Returns the pickup's unique ID.
    #[must_use]
    pub const fn id(&self) -> EntityId {
        self.id
    }

    /// Returns what the pickup grants.
    #[must_use]
    pub const fn data(&self) -> &InventoryData {
        &self.data
    }

    /// Returns the tint color.
    #[must_use]
    pub const fn color(&self) -> Color {
        self.color
    }

    /// Floating label text: the score.
    #[must_use]
    pub fn label(&self) -> String {
        self.data.score.to_string()
    }

    /// Returns the pickup's position.
    #[must_use]
    pub const fn position(&self) -> Vec3 {
        self.transform.position
    }

    /// Returns whether an agent already took this pickup.
    #[must_use]
    pub const fn is_consumed(&self) -> bool {
        self.consumed
    }

    /// Overlap sphere at the current position.
    #[must_use]
    pub fn collider(&self) -> Collider {
        Collider::overlap(self.transform.position, PICKUP_RADIUS)
    }

    /// Handles an agent starting to overlap this pickup.
    pub fn on_begin_overlap<H, L>(&mut self, agent: &mut H, lifetime: &mut L) -> PickupOutcome
    where
        H: InventoryHolder + ?Sized,
        L: Lifetime + ?Sized,
    {
        if self.consumed {
            return PickupOutcome::AlreadyConsumed;
        }
        let Some(inventory) = agent.inventory_mut() else {
            return PickupOutcome::NoInventory;
        };

        match inventory.try_add_item(&self.data) {
            Ok(total) => {
                self.consumed = true;
                let _ = lifetime.destroy(self.id);
                debug!("Pickup {} taken: {}", self.id, self.data);
                PickupOutcome::Consumed { total }
            },
            Err(err) => PickupOutcome::Rejected(err),
        }
    }
}

//! Event bus for reporting what happened in the sandbox.

use crossbeam_channel::{bounded, Receiver, Sender};
use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::fmt;

use proving_common::EntityId;

use crate::item::ItemKind;

/// Kind of object living in the sandbox.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ObjectKind {
    /// Playable character
    Character,
    /// Collectible pickup
    Pickup,
    /// Timed-fire turret
    Turret,
    /// Projectile in flight
    Projectile,
}

impl fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Character => "character",
            Self::Pickup => "pickup",
            Self::Turret => "turret",
            Self::Projectile => "projectile",
        };
        f.write_str(name)
    }
}

/// Events published by the sandbox.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    /// Object spawned
    EntitySpawned {
        /// Object ID
        entity_id: EntityId,
        /// Object kind
        kind: ObjectKind,
    },
    /// Object removed from the world
    EntityDestroyed {
        /// Object ID
        entity_id: EntityId,
        /// Object kind
        kind: ObjectKind,
    },
    /// Pickup taken by an agent
    ItemPickedUp {
        /// Agent that took the pickup
        agent: EntityId,
        /// Pickup taken
        pickup: EntityId,
        /// Item kind granted
        kind: ItemKind,
        /// Amount granted
        score: i32,
        /// Agent's new total for the kind
        total: u32,
    },
    /// Agent's inventory refused a pickup
    PickupRejected {
        /// Agent that touched the pickup
        agent: EntityId,
        /// Pickup refused
        pickup: EntityId,
        /// Why it was refused
        reason: String,
    },
    /// Turret fired a projectile
    ProjectileFired {
        /// Turret that fired
        turret: EntityId,
        /// Spawned projectile
        projectile: EntityId,
        /// Muzzle position
        origin: Vec3,
        /// Rounds left after the shot
        ammo_left: u32,
    },
    /// Turret spent its last round
    TurretDepleted {
        /// Turret ID
        turret: EntityId,
        /// Shots fired in total
        shots_fired: u32,
    },
    /// Object took damage
    EntityDamaged {
        /// Object ID
        entity_id: EntityId,
        /// Damage amount
        damage: f32,
        /// Health left
        health: f32,
        /// Source object (if any)
        source: Option<EntityId>,
    },
    /// Character regenerated to full health
    CharacterHealed {
        /// Character ID
        entity_id: EntityId,
        /// Health after healing
        health: f32,
    },
    /// Character died
    CharacterDied {
        /// Character ID
        entity_id: EntityId,
        /// Object that dealt the killing blow (if any)
        killer: Option<EntityId>,
    },
}

/// Event bus for broadcasting events to the driver.
#[derive(Debug)]
pub struct EventBus {
    /// Sender for broadcasting events
    sender: Sender<GameEvent>,
    /// Receiver for collecting events
    receiver: Receiver<GameEvent>,
    /// Channel capacity
    capacity: usize,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(1024)
    }
}

impl EventBus {
    /// Creates a new event bus with the given capacity.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, receiver) = bounded(capacity);
        Self {
            sender,
            receiver,
            capacity,
        }
    }

    /// Publishes an event. Returns false if the bus was full and the event dropped.
    pub fn publish(&self, event: GameEvent) -> bool {
        self.sender.try_send(event).is_ok()
    }

    /// Drains all pending events.
    pub fn drain(&self) -> Vec<GameEvent> {
        self.receiver.try_iter().collect()
    }

    /// Returns the number of pending events.
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.receiver.len()
    }

    /// Returns the channel capacity.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Creates a new sender handle for publishing events.
    #[must_use]
    pub fn sender(&self) -> Sender<GameEvent> {
        self.sender.clone()
    }
}

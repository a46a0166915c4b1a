//! Playable character: health, optional inventory, movement state.

use glam::Vec3;
use proving_common::{ConfigResult, EntityId, Transform};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::health::{DamageOutcome, Health, HealthData};
use crate::inventory::Inventory;
use crate::spatial::Collider;
use crate::timer::Scheduler;

/// Radius of a character's collision sphere.
pub const CHARACTER_RADIUS: f32 = 42.0;

/// Character movement mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MovementMode {
    /// Normal movement
    #[default]
    Walking,
    /// Movement disabled
    None,
}

/// Anything that may carry an inventory.
pub trait InventoryHolder {
    /// Returns the holder's inventory, if it has one.
    fn inventory_mut(&mut self) -> Option<&mut Inventory>;
}

/// A character in the sandbox.
#[derive(Debug, Clone)]
pub struct Character {
    id: EntityId,
    transform: Transform,
    health: Health,
    inventory: Option<Inventory>,
    movement: MovementMode,
    ragdoll: bool,
}

impl Character {
    /// Creates a living character without an inventory.
    pub fn new(transform: Transform, health: HealthData) -> ConfigResult<Self> {
        Ok(Self {
            id: EntityId::new(),
            transform,
            health: Health::new(health)?,
            inventory: None,
            movement: MovementMode::Walking,
            ragdoll: false,
        })
    }

    /// Gives the character an inventory.
    #[must_use]
    pub fn with_inventory(mut self, inventory: Inventory) -> Self {
        self.inventory = Some(inventory);
        self
    }

    /// Returns the character's unique ID.
    #[must_use]
    pub const fn id(&self) -> EntityId {
        self.id
    }

    /// Returns the character's transform.
    #[must_use]
    pub const fn transform(&self) -> &Transform {
        &self.transform
    }

    /// Returns the character's position.
    #[must_use]
    pub const fn position(&self) -> Vec3 {
        self.transform.position
    }

    /// Sets the character's position.
    pub fn set_position(&mut self, position: Vec3) {
        self.transform.position = position;
    }

    /// Returns the health component.
    #[must_use]
    pub const fn health(&self) -> &Health {
        &self.health
    }

    /// Returns health as a fraction of maximum.
    #[must_use]
    pub fn health_percent(&self) -> f32 {
        self.health.percent()
    }

    /// Returns the inventory, if any.
    #[must_use]
    pub const fn inventory(&self) -> Option<&Inventory> {
        self.inventory.as_ref()
    }

    /// Returns the movement mode.
    #[must_use]
    pub const fn movement(&self) -> MovementMode {
        self.movement
    }

    /// Returns whether the body has gone limp.
    #[must_use]
    pub const fn is_ragdoll(&self) -> bool {
        self.ragdoll
    }

    /// Returns whether the character can move.
    #[must_use]
    pub fn can_move(&self) -> bool {
        self.movement != MovementMode::None
    }

    /// Collision sphere at the current position.
    #[must_use]
    pub fn collider(&self) -> Collider {
        Collider::block(self.transform.position, CHARACTER_RADIUS)
    }

    /// Applies damage and handles death.
    pub fn take_damage<S: Scheduler>(&mut self, amount: f32, scheduler: &mut S) -> DamageOutcome {
        let outcome = self.health.take_damage(amount, scheduler);
        if outcome == DamageOutcome::Killed {
            self.on_death();
        }
        outcome
    }

    /// Handles a heal timer tick. Returns true once health is full.
    pub fn on_heal_tick<S: Scheduler>(&mut self, scheduler: &mut S) -> bool {
        self.health.on_heal_tick(scheduler)
    }

    fn on_death(&mut self) {
        self.movement = MovementMode::None;
        self.ragdoll = true;
        info!("Character {} died", self.id);
    }
}

impl InventoryHolder for Character {
    fn inventory_mut(&mut self) -> Option<&mut Inventory> {
        self.inventory.as_mut()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inventory::InventoryLimits;
    use crate::item::ItemKind;
    use crate::timer::TimerManager;

    #[test]
    fn test_character_can_be_killed() {
        let mut timers = TimerManager::new();
        let mut character = Character::new(
            Transform::from_position(Vec3::new(0.0, 0.0, 110.0)),
            HealthData {
                max_health: 1000.0,
                life_span: 0.5,
                ..HealthData::default()
            },
        )
        .expect("valid character");

        assert!(character.can_move());
        assert_eq!(character.take_damage(1000.0, &mut timers), DamageOutcome::Killed);
        assert_eq!(character.health_percent(), 0.0);
        assert_eq!(character.movement(), MovementMode::None);
        assert!(character.is_ragdoll());
        assert!(character.health().removal_timer().is_some());
    }

    #[test]
    fn test_inventory_holder() {
        let mut bare = Character::new(Transform::IDENTITY, HealthData::default())
            .expect("valid character");
        assert!(bare.inventory_mut().is_none());

        let mut carrier = Character::new(Transform::IDENTITY, HealthData::default())
            .expect("valid character")
            .with_inventory(Inventory::new(InventoryLimits::uniform(10)));
        let inventory = carrier.inventory_mut().expect("has inventory");
        assert_eq!(inventory.try_add(ItemKind::Cube, 4), Ok(4));
        assert_eq!(
            carrier.inventory().map(|inv| inv.amount_for(ItemKind::Cube)),
            Some(4)
        );
    }
}

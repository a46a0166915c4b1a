//! Host collaborator interfaces for object lifetime and damage.
//!
//! Gameplay objects request removal and damage through these traits instead
//! of reaching into the world. [`HostCommands`] records the requests in order
//! so the world can apply them once the requesting object is no longer
//! borrowed.

use ahash::AHashSet;
use proving_common::EntityId;
use std::collections::VecDeque;

/// Object lifetime management.
pub trait Lifetime {
    /// Removes an object from the world.
    ///
    /// Returns false if removal was already requested.
    fn destroy(&mut self, id: EntityId) -> bool;
}

/// Damage delivery.
pub trait DamageSink {
    /// Delivers `amount` damage to `target`.
    fn apply_damage(&mut self, target: EntityId, amount: f32, causer: Option<EntityId>);
}

/// A deferred request made by a gameplay object.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HostCommand {
    /// Deliver damage to an object
    ApplyDamage {
        /// Object receiving damage
        target: EntityId,
        /// Damage amount
        amount: f32,
        /// Object that caused the damage
        causer: Option<EntityId>,
    },
    /// Remove an object from the world
    Destroy(EntityId),
}

/// Ordered queue of host commands.
#[derive(Debug, Default)]
pub struct HostCommands {
    queue: VecDeque<HostCommand>,
    /// Objects with a pending destroy
    doomed: AHashSet<EntityId>,
}

impl HostCommands {
    /// Creates an empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if nothing is queued.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Returns true if `id` has a pending destroy.
    #[must_use]
    pub fn is_doomed(&self, id: EntityId) -> bool {
        self.doomed.contains(&id)
    }

    /// Takes the oldest command.
    pub fn pop(&mut self) -> Option<HostCommand> {
        let command = self.queue.pop_front()?;
        if let HostCommand::Destroy(id) = command {
            let _ = self.doomed.remove(&id);
        }
        Some(command)
    }
}

impl Lifetime for HostCommands {
    fn destroy(&mut self, id: EntityId) -> bool {
        if !self.doomed.insert(id) {
            return false;
        }
        self.queue.push_back(HostCommand::Destroy(id));
        true
    }
}

impl DamageSink for HostCommands {
    fn apply_damage(&mut self, target: EntityId, amount: f32, causer: Option<EntityId>) {
        self.queue.push_back(HostCommand::ApplyDamage {
            target,
            amount,
            causer,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_destroy_is_idempotent_while_pending() {
        let mut commands = HostCommands::new();
        let id = EntityId::new();

        assert!(commands.destroy(id));
        assert!(!commands.destroy(id));
        assert!(commands.is_doomed(id));

        assert_eq!(commands.pop(), Some(HostCommand::Destroy(id)));
        assert!(commands.pop().is_none());
        assert!(!commands.is_doomed(id));
    }

    #[test]
    fn test_commands_keep_order() {
        let mut commands = HostCommands::new();
        let target = EntityId::new();
        let projectile = EntityId::new();

        commands.apply_damage(target, 30.0, Some(projectile));
        let _ = commands.destroy(projectile);

        assert_eq!(
            commands.pop(),
            Some(HostCommand::ApplyDamage {
                target,
                amount: 30.0,
                causer: Some(projectile),
            })
        );
        assert_eq!(commands.pop(), Some(HostCommand::Destroy(projectile)));
        assert!(commands.is_empty());
    }
}

//! End-to-end tests for the sandbox.
//!
//! These tests drive a [`Sandbox`] with fixed 100ms ticks, the way the
//! scenario runner does, and check what the world looks like afterwards.

#![cfg(test)]

use glam::Vec3;
use proving_common::{EntityId, Transform};
use std::time::Duration;

use crate::prelude::*;

const STEP: Duration = Duration::from_millis(100);

fn run_until(sandbox: &mut Sandbox, at: Duration) {
    while sandbox.now() < at {
        sandbox.tick(STEP);
    }
}

fn ms(millis: u64) -> Duration {
    Duration::from_millis(millis)
}

fn character_at(position: Vec3, health: HealthData, limit: Option<u32>) -> Character {
    let character =
        Character::new(Transform::from_position(position), health).expect("valid character");
    match limit {
        Some(limit) => character.with_inventory(Inventory::new(InventoryLimits::uniform(limit))),
        None => character,
    }
}

fn turret_at_origin(ammo: i64, interval: f32) -> Turret {
    let config = TurretConfig::new(ammo, interval).expect("valid turret config");
    Turret::new(Transform::looking_along(Vec3::ZERO, Vec3::X), config)
}

/// Turret fire loop
mod turret_tests {
    use super::*;

    #[test]
    fn e2e_turret_fires_ammo_count_times() {
        let mut sandbox = Sandbox::default();
        let turret = sandbox.spawn_turret(turret_at_origin(3, 2.0));
        let shots = |sandbox: &Sandbox| sandbox.turret(turret).map(Turret::shots_fired);

        run_until(&mut sandbox, ms(1900));
        assert_eq!(shots(&sandbox), Some(0));
        run_until(&mut sandbox, ms(2000));
        assert_eq!(shots(&sandbox), Some(1), "First shot at t=2");
        run_until(&mut sandbox, ms(4000));
        assert_eq!(shots(&sandbox), Some(2), "Second shot at t=4");
        run_until(&mut sandbox, ms(6000));
        assert_eq!(shots(&sandbox), Some(3), "Third shot at t=6");

        run_until(&mut sandbox, ms(20_000));
        assert_eq!(shots(&sandbox), Some(3), "No shots after depletion");
        assert!(sandbox.turret(turret).is_some_and(Turret::is_depleted));
        assert_eq!(sandbox.active_timer_count(), 0);

        let events = sandbox.drain_events();
        let fired = events
            .iter()
            .filter(|e| matches!(e, GameEvent::ProjectileFired { .. }))
            .count();
        let depleted: Vec<_> = events
            .iter()
            .filter_map(|e| match e {
                GameEvent::TurretDepleted { shots_fired, .. } => Some(*shots_fired),
                _ => None,
            })
            .collect();
        assert_eq!(fired, 3);
        assert_eq!(depleted, vec![3]);
    }

    fn last_shot_velocity(sandbox: &mut Sandbox) -> Option<Vec3> {
        let projectile = sandbox.drain_events().into_iter().rev().find_map(|e| match e {
            GameEvent::ProjectileFired { projectile, .. } => Some(projectile),
            _ => None,
        })?;
        sandbox.projectile(projectile).map(Projectile::velocity)
    }

    #[test]
    fn e2e_reaimed_turret_fires_along_new_forward() {
        let mut sandbox = Sandbox::default();
        let turret = sandbox.spawn_turret(turret_at_origin(3, 1.0));

        run_until(&mut sandbox, ms(1000));
        let first = last_shot_velocity(&mut sandbox).expect("first shot in flight");
        assert!(first.abs_diff_eq(Vec3::new(2000.0, 0.0, 0.0), 1e-2));

        sandbox
            .aim_turret(turret, Transform::looking_along(Vec3::ZERO, Vec3::Y))
            .expect("turret exists");
        assert!(sandbox
            .turret(turret)
            .is_some_and(|t| t.transform().forward().abs_diff_eq(Vec3::Y, 1e-5)));

        run_until(&mut sandbox, ms(2000));
        let second = last_shot_velocity(&mut sandbox).expect("second shot in flight");
        assert!(second.abs_diff_eq(Vec3::new(0.0, 2000.0, 0.0), 1e-2));
        assert_eq!(sandbox.turret(turret).map(Turret::ammo), Some(1));
    }

    #[test]
    fn e2e_projectile_without_target_expires() {
        let mut sandbox = Sandbox::default();
        let _ = sandbox.spawn_turret(turret_at_origin(1, 1.0));

        run_until(&mut sandbox, ms(1000));
        assert_eq!(sandbox.projectile_count(), 1);

        run_until(&mut sandbox, ms(5900));
        assert_eq!(sandbox.projectile_count(), 1, "Still flying before its life span ends");

        run_until(&mut sandbox, ms(6000));
        assert_eq!(sandbox.projectile_count(), 0, "Removed 5s after launch");
    }
}

/// Pickups and inventories
mod pickup_tests {
    use super::*;

    fn cylinder_at(position: Vec3, score: i32) -> Pickup {
        Pickup::new(
            InventoryData::new(ItemKind::Cylinder, score),
            Transform::from_position(position),
        )
    }

    fn cylinder_total(sandbox: &Sandbox, id: EntityId) -> Option<u32> {
        sandbox
            .character(id)
            .and_then(Character::inventory)
            .map(|inv| inv.amount_for(ItemKind::Cylinder))
    }

    #[test]
    fn e2e_pickup_is_taken_once() {
        let mut sandbox = Sandbox::default();
        let spot = Vec3::new(200.0, 0.0, 0.0);
        let agent = sandbox.spawn_character(character_at(Vec3::ZERO, HealthData::default(), Some(100)));
        let pickup = sandbox.spawn_pickup(cylinder_at(spot, 13));

        sandbox.move_character(agent, spot).expect("agent can move");
        assert!(!sandbox.contains(pickup), "Consumed pickup is removed");
        assert_eq!(cylinder_total(&sandbox, agent), Some(13));

        sandbox.move_character(agent, Vec3::ZERO).expect("agent can move");
        sandbox.move_character(agent, spot).expect("agent can move");
        assert_eq!(cylinder_total(&sandbox, agent), Some(13));

        let picked: Vec<_> = sandbox
            .drain_events()
            .into_iter()
            .filter(|e| matches!(e, GameEvent::ItemPickedUp { .. }))
            .collect();
        assert_eq!(
            picked,
            vec![GameEvent::ItemPickedUp {
                agent,
                pickup,
                kind: ItemKind::Cylinder,
                score: 13,
                total: 13,
            }]
        );
    }

    #[test]
    fn e2e_rejected_pickup_stays_and_is_offered_again_on_reentry() {
        let mut sandbox = Sandbox::default();
        let spot = Vec3::new(0.0, 300.0, 0.0);
        let agent = sandbox.spawn_character(character_at(Vec3::ZERO, HealthData::default(), Some(10)));
        let pickup = sandbox.spawn_pickup(cylinder_at(spot, 13));
        let rejections = |sandbox: &Sandbox| {
            sandbox
                .drain_events()
                .into_iter()
                .filter(|e| matches!(e, GameEvent::PickupRejected { .. }))
                .count()
        };

        sandbox.move_character(agent, spot).expect("agent can move");
        assert!(sandbox.contains(pickup), "Rejected pickup stays in the world");
        assert_eq!(cylinder_total(&sandbox, agent), Some(0));
        assert_eq!(rejections(&sandbox), 1);

        // Standing still is not a new overlap
        run_until(&mut sandbox, ms(1000));
        assert_eq!(rejections(&sandbox), 0);

        sandbox.move_character(agent, Vec3::ZERO).expect("agent can move");
        sandbox.move_character(agent, spot).expect("agent can move");
        assert_eq!(rejections(&sandbox), 1);
        assert!(sandbox.contains(pickup));
    }

    #[test]
    fn e2e_agent_without_inventory_is_ignored() {
        let mut sandbox = Sandbox::default();
        let spot = Vec3::new(-150.0, 0.0, 0.0);
        let bare = sandbox.spawn_character(character_at(spot, HealthData::default(), None));
        let pickup = sandbox.spawn_pickup(cylinder_at(spot, 5));
        assert!(sandbox.contains(pickup), "Agent without inventory can't take it");

        let carrier = sandbox.spawn_character(character_at(Vec3::ZERO, HealthData::default(), Some(50)));
        sandbox.move_character(carrier, spot).expect("carrier can move");
        assert!(!sandbox.contains(pickup));
        assert_eq!(cylinder_total(&sandbox, carrier), Some(5));
        assert!(sandbox.character(bare).is_some_and(|c| c.inventory().is_none()));
    }
}

/// Damage, death and healing
mod combat_tests {
    use super::*;

    #[test]
    fn e2e_projectile_hits_character() {
        let mut sandbox = Sandbox::default();
        let _ = sandbox.spawn_turret(turret_at_origin(10, 1.0));
        let target = sandbox.spawn_character(character_at(
            Vec3::new(500.0, 0.0, 0.0),
            HealthData::default(),
            None,
        ));

        run_until(&mut sandbox, ms(1500));

        let percent = sandbox.character(target).map(Character::health_percent);
        assert_eq!(percent, Some(0.7), "One hit deals 30 damage");
        assert_eq!(sandbox.projectile_count(), 0, "Projectile is removed on hit");

        let events = sandbox.drain_events();
        let fired = events.iter().find_map(|e| match e {
            GameEvent::ProjectileFired { projectile, .. } => Some(*projectile),
            _ => None,
        });
        let damage_source = events.iter().find_map(|e| match e {
            GameEvent::EntityDamaged {
                entity_id, source, ..
            } if *entity_id == target => *source,
            _ => None,
        });
        assert!(fired.is_some());
        assert_eq!(damage_source, fired);
    }

    #[test]
    fn e2e_turret_kills_character() {
        let mut sandbox = Sandbox::default();
        let _ = sandbox.spawn_turret(turret_at_origin(10, 1.0));
        let health = HealthData {
            max_health: 40.0,
            ..HealthData::default()
        };
        let target = sandbox.spawn_character(character_at(Vec3::new(500.0, 0.0, 0.0), health, None));

        run_until(&mut sandbox, ms(3000));
        let character = sandbox.character(target).expect("body still present");
        assert!(character.health().is_dead());
        assert!(character.is_ragdoll());
        assert!(!character.can_move());

        let died = sandbox
            .drain_events()
            .into_iter()
            .any(|e| matches!(e, GameEvent::CharacterDied { entity_id, killer: Some(_) } if entity_id == target));
        assert!(died);

        run_until(&mut sandbox, ms(9000));
        assert!(!sandbox.contains(target), "Body removed after its life span");
    }

    #[test]
    fn e2e_dead_character_removed_after_life_span() {
        let mut sandbox = Sandbox::default();
        let health = HealthData {
            max_health: 1000.0,
            life_span: 0.5,
            ..HealthData::default()
        };
        let id = sandbox.spawn_character(character_at(Vec3::new(0.0, 0.0, 110.0), health, None));

        let outcome = sandbox.damage_character(id, 1000.0, None).expect("character exists");
        assert_eq!(outcome, DamageOutcome::Killed);
        assert_eq!(
            sandbox.character(id).map(Character::movement),
            Some(MovementMode::None)
        );

        run_until(&mut sandbox, ms(400));
        assert!(sandbox.contains(id));
        run_until(&mut sandbox, ms(500));
        assert!(!sandbox.contains(id));
        assert_eq!(sandbox.active_timer_count(), 0);
    }

    #[test]
    fn e2e_character_heals_back_to_full() {
        let mut sandbox = Sandbox::default();
        let health = HealthData {
            max_health: 200.0,
            heal_modifier: 5.0,
            heal_rate: 0.5,
            ..HealthData::default()
        };
        let id = sandbox.spawn_character(character_at(Vec3::ZERO, health, None));

        let _ = sandbox.damage_character(id, 10.0, None).expect("character exists");
        run_until(&mut sandbox, ms(900));
        let current = sandbox.character(id).map(|c| c.health().current());
        assert_eq!(current, Some(195.0));

        run_until(&mut sandbox, ms(1000));
        assert!(sandbox.character(id).is_some_and(|c| c.health().is_full()));
        assert_eq!(sandbox.active_timer_count(), 0);

        let healed = sandbox
            .drain_events()
            .into_iter()
            .any(|e| matches!(e, GameEvent::CharacterHealed { entity_id, .. } if entity_id == id));
        assert!(healed);
    }
}

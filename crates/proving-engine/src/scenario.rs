//! Scenario runner.
//!
//! Builds a [`Sandbox`] from a [`ScenarioConfig`] and drives it with a fixed
//! timestep, moving the character along its waypoints and logging every
//! event the sandbox publishes.

use glam::Vec3;
use proving_common::{EntityId, ProvingResult, Transform};
use proving_gameplay::{
    Character, GameEvent, Inventory, InventoryData, ItemKind, Pickup, Sandbox, Turret,
    TurretConfig,
};
use serde::Serialize;
use std::collections::{BTreeMap, VecDeque};
use std::fmt;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::config::{ScenarioConfig, Waypoint};

/// Summary of a finished run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ScenarioReport {
    /// Simulated time
    pub elapsed: Duration,
    /// Projectiles fired
    pub shots_fired: u32,
    /// Damage events delivered
    pub hits: u32,
    /// Total damage delivered
    pub damage_dealt: f32,
    /// Pickups taken
    pub pickups_taken: u32,
    /// Pickups refused by a full inventory
    pub pickups_rejected: u32,
    /// Characters that died
    pub deaths: u32,
    /// Character health at the end, if still in the world
    pub character_health: Option<f32>,
    /// Character inventory at the end
    pub inventory: BTreeMap<ItemKind, u32>,
    /// Rounds left in the turret
    pub ammo_left: u32,
}

impl ScenarioReport {
    /// Accounts for one sandbox event.
    fn record(&mut self, event: &GameEvent) {
        match event {
            GameEvent::ProjectileFired { .. } => self.shots_fired += 1,
            GameEvent::EntityDamaged { damage, .. } => {
                self.hits += 1;
                self.damage_dealt += damage;
            },
            GameEvent::ItemPickedUp { .. } => self.pickups_taken += 1,
            GameEvent::PickupRejected { .. } => self.pickups_rejected += 1,
            GameEvent::CharacterDied { .. } => self.deaths += 1,
            _ => {},
        }
    }
}

impl fmt::Display for ScenarioReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "after {:.1}s: {} shots, {} hits ({} damage), {} pickups taken, {} rejected, {} deaths, {} rounds left",
            self.elapsed.as_secs_f32(),
            self.shots_fired,
            self.hits,
            self.damage_dealt,
            self.pickups_taken,
            self.pickups_rejected,
            self.deaths,
            self.ammo_left,
        )?;
        match self.character_health {
            Some(health) => write!(f, ", character health {health}")?,
            None => write!(f, ", character removed")?,
        }
        for (kind, amount) in &self.inventory {
            write!(f, ", {kind}={amount}")?;
        }
        Ok(())
    }
}

/// A sandbox run in progress.
#[derive(Debug)]
pub struct Scenario {
    sandbox: Sandbox,
    character: EntityId,
    turret: EntityId,
    waypoints: VecDeque<Waypoint>,
    step: Duration,
    run_time: Duration,
    report: ScenarioReport,
}

impl Scenario {
    /// Builds the sandbox described by `config`.
    ///
    /// Fails on any gameplay value that doesn't pass validation.
    pub fn build(config: &ScenarioConfig) -> ProvingResult<Self> {
        let mut sandbox = Sandbox::new(config.projectile)?;

        let turret_config =
            TurretConfig::new(config.turret.ammo_count, config.turret.fire_frequency)?;
        let turret = sandbox.spawn_turret(Turret::new(
            Transform::looking_along(config.turret.position, config.turret.aim),
            turret_config,
        ));

        for settings in &config.pickups {
            let pickup = Pickup::new(
                InventoryData::new(settings.kind, settings.score),
                Transform::from_position(settings.position),
            )
            .with_color(settings.color);
            let _ = sandbox.spawn_pickup(pickup);
        }

        let mut character = Character::new(
            Transform::from_position(config.character.position),
            config.character.health,
        )?;
        if config.character.inventory {
            character = character.with_inventory(Inventory::new(config.limits()?));
        }
        let character = sandbox.spawn_character(character);

        let mut waypoints: Vec<Waypoint> = config.waypoints.clone();
        waypoints.sort_by(|a, b| a.at.total_cmp(&b.at));

        info!(
            "Scenario ready: {} pickups, turret {} with {} rounds",
            sandbox.pickup_count(),
            turret,
            turret_config.ammo_count()
        );

        Ok(Self {
            sandbox,
            character,
            turret,
            waypoints: waypoints.into(),
            step: config.step(),
            run_time: config.run_time(),
            report: ScenarioReport::default(),
        })
    }

    /// Returns true once the run time has elapsed.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.sandbox.now() >= self.run_time
    }

    /// Advances one fixed step.
    pub fn step(&mut self) {
        let now = self.sandbox.now();
        while self.waypoints.front().is_some_and(|w| w.time() <= now) {
            let Some(waypoint) = self.waypoints.pop_front() else {
                break;
            };
            self.follow(waypoint.position);
        }

        self.sandbox.tick(self.step);

        for event in self.sandbox.drain_events() {
            log_event(&event);
            self.report.record(&event);
        }
    }

    /// Runs to the end and reports.
    pub fn run(mut self) -> ScenarioReport {
        while !self.is_finished() {
            self.step();
        }
        self.finish()
    }

    fn follow(&mut self, position: Vec3) {
        match self.sandbox.move_character(self.character, position) {
            Ok(()) => debug!("Character moved to {position}"),
            Err(e) => warn!("Skipping waypoint {position}: {e}"),
        }
        for event in self.sandbox.drain_events() {
            log_event(&event);
            self.report.record(&event);
        }
    }

    fn finish(mut self) -> ScenarioReport {
        let character = self.sandbox.character(self.character);
        self.report.elapsed = self.sandbox.now();
        self.report.character_health = character.map(|c| c.health().current());
        self.report.inventory = character
            .and_then(Character::inventory)
            .map(|inv| inv.iter().collect())
            .unwrap_or_default();
        self.report.ammo_left = self.sandbox.turret(self.turret).map_or(0, Turret::ammo);
        self.report
    }
}

fn log_event(event: &GameEvent) {
    match event {
        GameEvent::ItemPickedUp {
            agent,
            kind,
            score,
            total,
            ..
        } => info!("{agent} picked up {score} {kind} (total {total})"),
        GameEvent::PickupRejected { agent, reason, .. } => {
            info!("{agent} could not take pickup: {reason}");
        },
        GameEvent::TurretDepleted {
            turret,
            shots_fired,
        } => info!("Turret {turret} depleted after {shots_fired} shots"),
        GameEvent::EntityDamaged {
            entity_id,
            damage,
            health,
            ..
        } => info!("{entity_id} took {damage} damage, {health} left"),
        GameEvent::CharacterHealed { entity_id, health } => {
            info!("{entity_id} healed to {health}");
        },
        GameEvent::CharacterDied { entity_id, .. } => info!("{entity_id} died"),
        other => debug!("{other:?}"),
    }
}

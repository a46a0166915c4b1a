//! The sandbox world.
//!
//! [`Sandbox`] owns every gameplay object together with the timer manager and
//! the sphere space, and plays host to them: it routes timer firings back to
//! their owners, sweeps projectiles, detects pickup overlaps and applies the
//! damage and removal requests objects make through [`HostCommands`].
//!
//! Requests are queued while an object is borrowed and applied by `flush`
//! right after the callback returns.

use ahash::{AHashMap, AHashSet};
use glam::Vec3;
use proving_common::{ConfigResult, EntityId, Transform};
use std::collections::BTreeMap;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info};

use crate::character::Character;
use crate::events::{EventBus, GameEvent, ObjectKind};
use crate::health::DamageOutcome;
use crate::host::{DamageSink, HostCommand, HostCommands, Lifetime};
use crate::pickup::{Pickup, PickupOutcome};
use crate::projectile::{LaunchParams, Projectile, ProjectileConfig};
use crate::spatial::{SphereSpace, SpatialQuery, SweepHit};
use crate::timer::{FiredTimer, Scheduler, TimerHandle, TimerManager};
use crate::turret::{ShotRequest, Turret};

/// Sandbox error types.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SandboxError {
    /// No object with this ID
    #[error("Object {0} not found")]
    NotFound(EntityId),
    /// The object exists but has another kind
    #[error("Object {id} is a {actual}, expected a {expected}")]
    WrongKind {
        /// Object ID
        id: EntityId,
        /// Kind the operation needs
        expected: ObjectKind,
        /// Kind of the object
        actual: ObjectKind,
    },
    /// The character's movement is disabled
    #[error("Character {0} can't move")]
    MovementDisabled(EntityId),
}

/// Result type for sandbox operations.
pub type SandboxResult<T> = Result<T, SandboxError>;

/// Scheduler handed to one object; records which timers it owns.
struct OwnedScheduler<'a> {
    timers: &'a mut TimerManager,
    owners: &'a mut AHashMap<TimerHandle, EntityId>,
    owner: EntityId,
}

impl<'a> OwnedScheduler<'a> {
    fn new(
        timers: &'a mut TimerManager,
        owners: &'a mut AHashMap<TimerHandle, EntityId>,
        owner: EntityId,
    ) -> Self {
        Self {
            timers,
            owners,
            owner,
        }
    }
}

impl Scheduler for OwnedScheduler<'_> {
    fn now(&self) -> Duration {
        self.timers.now()
    }

    fn schedule_repeating(&mut self, interval: Duration, first_delay: Duration) -> TimerHandle {
        let handle = self.timers.schedule_repeating(interval, first_delay);
        let _ = self.owners.insert(handle, self.owner);
        handle
    }

    fn schedule_once(&mut self, delay: Duration) -> TimerHandle {
        let handle = self.timers.schedule_once(delay);
        let _ = self.owners.insert(handle, self.owner);
        handle
    }

    fn cancel(&mut self, handle: TimerHandle) -> bool {
        let _ = self.owners.remove(&handle);
        self.timers.cancel(handle)
    }

    fn is_active(&self, handle: TimerHandle) -> bool {
        self.timers.is_active(handle)
    }
}

/// Sandbox world hosting characters, pickups, turrets and projectiles.
#[derive(Debug)]
pub struct Sandbox {
    timers: TimerManager,
    /// Which object each pending timer belongs to
    timer_owners: AHashMap<TimerHandle, EntityId>,
    space: SphereSpace,
    commands: HostCommands,
    characters: BTreeMap<EntityId, Character>,
    pickups: BTreeMap<EntityId, Pickup>,
    turrets: BTreeMap<EntityId, Turret>,
    projectiles: BTreeMap<EntityId, Projectile>,
    /// (pickup, character) pairs touching after the last overlap pass
    overlaps: AHashSet<(EntityId, EntityId)>,
    launch_params: LaunchParams,
    events: EventBus,
}

impl Default for Sandbox {
    fn default() -> Self {
        Self::with_parts(LaunchParams::default(), EventBus::default())
    }
}

impl Sandbox {
    /// Creates an empty sandbox whose turrets launch projectiles with `projectile_config`.
    pub fn new(projectile_config: ProjectileConfig) -> ConfigResult<Self> {
        let launch_params = projectile_config.launch_params()?;
        Ok(Self::with_parts(launch_params, EventBus::default()))
    }

    /// Replaces the event bus with one of the given capacity.
    #[must_use]
    pub fn with_event_capacity(mut self, capacity: usize) -> Self {
        self.events = EventBus::new(capacity);
        self
    }

    fn with_parts(launch_params: LaunchParams, events: EventBus) -> Self {
        Self {
            timers: TimerManager::new(),
            timer_owners: AHashMap::new(),
            space: SphereSpace::new(),
            commands: HostCommands::new(),
            characters: BTreeMap::new(),
            pickups: BTreeMap::new(),
            turrets: BTreeMap::new(),
            projectiles: BTreeMap::new(),
            overlaps: AHashSet::new(),
            launch_params,
            events,
        }
    }

    // === Spawning ===

    /// Adds a character and resolves any pickups it lands on.
    pub fn spawn_character(&mut self, character: Character) -> EntityId {
        let id = character.id();
        self.space.insert(id, character.collider());
        let _ = self.characters.insert(id, character);
        self.announce_spawn(id, ObjectKind::Character);
        self.resolve_overlaps();
        self.flush();
        id
    }

    /// Adds a pickup and resolves any character already standing on it.
    pub fn spawn_pickup(&mut self, pickup: Pickup) -> EntityId {
        let id = pickup.id();
        self.space.insert(id, pickup.collider());
        let _ = self.pickups.insert(id, pickup);
        self.announce_spawn(id, ObjectKind::Pickup);
        self.resolve_overlaps();
        self.flush();
        id
    }

    /// Adds a turret and starts its fire loop.
    pub fn spawn_turret(&mut self, mut turret: Turret) -> EntityId {
        let id = turret.id();
        let mut scheduler = OwnedScheduler::new(&mut self.timers, &mut self.timer_owners, id);
        let _ = turret.activate(&mut scheduler);
        self.space.insert(id, turret.collider());
        let _ = self.turrets.insert(id, turret);
        self.announce_spawn(id, ObjectKind::Turret);
        id
    }

    fn launch_projectile(&mut self, shot: ShotRequest) -> EntityId {
        let projectile = Projectile::launch(
            Some(shot.turret),
            shot.origin,
            shot.direction,
            &self.launch_params,
            &mut self.timers,
        );
        let id = projectile.id();
        if let Some(timer) = projectile.life_span_timer() {
            let _ = self.timer_owners.insert(timer, id);
        }
        self.space.insert(id, projectile.collider());
        let _ = self.projectiles.insert(id, projectile);
        self.announce_spawn(id, ObjectKind::Projectile);
        id
    }

    fn announce_spawn(&self, entity_id: EntityId, kind: ObjectKind) {
        debug!("Spawned {} {}", kind, entity_id);
        let _ = self.events.publish(GameEvent::EntitySpawned { entity_id, kind });
    }

    // === Driving ===

    /// Teleports a character and resolves the overlaps it begins.
    pub fn move_character(&mut self, id: EntityId, position: Vec3) -> SandboxResult<()> {
        if !self.characters.contains_key(&id) {
            return Err(self.kind_error(id, ObjectKind::Character));
        }
        let Some(character) = self.characters.get_mut(&id) else {
            return Err(SandboxError::NotFound(id));
        };
        if !character.can_move() {
            return Err(SandboxError::MovementDisabled(id));
        }

        character.set_position(position);
        let _ = self.space.set_center(id, position);
        self.resolve_overlaps();
        self.flush();
        Ok(())
    }

    /// Re-aims a turret.
    pub fn aim_turret(&mut self, id: EntityId, transform: Transform) -> SandboxResult<()> {
        if !self.turrets.contains_key(&id) {
            return Err(self.kind_error(id, ObjectKind::Turret));
        }
        let Some(turret) = self.turrets.get_mut(&id) else {
            return Err(SandboxError::NotFound(id));
        };
        turret.set_transform(transform);
        let _ = self.space.set_center(id, transform.position);
        Ok(())
    }

    /// Advances simulation time by `dt`.
    ///
    /// Due timers fire in chronological order. Before each firing, projectiles
    /// are moved up to the firing time so hits and expiry stay ordered.
    pub fn tick(&mut self, dt: Duration) {
        let deadline = self.timers.now().saturating_add(dt);

        while let Some(fired) = self.timers.pop_due(deadline) {
            self.step_projectiles(fired.at);
            self.flush();
            self.dispatch_timer(fired);
            self.flush();
        }

        self.timers.advance_to(deadline);
        self.step_projectiles(deadline);
        self.flush();
        self.resolve_overlaps();
        self.flush();
    }

    /// Delivers damage to a character immediately.
    pub fn damage_character(
        &mut self,
        id: EntityId,
        amount: f32,
        causer: Option<EntityId>,
    ) -> SandboxResult<DamageOutcome> {
        if !self.characters.contains_key(&id) {
            return Err(self.kind_error(id, ObjectKind::Character));
        }
        let outcome = self.deliver_damage(id, amount, causer);
        self.flush();
        Ok(outcome)
    }

    /// Removes an object. Returns false if it doesn't exist.
    pub fn destroy(&mut self, id: EntityId) -> bool {
        let removed = self.remove(id).is_some();
        self.flush();
        removed
    }

    // === Queries ===

    /// Current simulation time.
    #[must_use]
    pub fn now(&self) -> Duration {
        self.timers.now()
    }

    /// Returns the kind of an object, if it exists.
    #[must_use]
    pub fn kind_of(&self, id: EntityId) -> Option<ObjectKind> {
        if self.characters.contains_key(&id) {
            Some(ObjectKind::Character)
        } else if self.pickups.contains_key(&id) {
            Some(ObjectKind::Pickup)
        } else if self.turrets.contains_key(&id) {
            Some(ObjectKind::Turret)
        } else if self.projectiles.contains_key(&id) {
            Some(ObjectKind::Projectile)
        } else {
            None
        }
    }

    /// Checks if an object exists.
    #[must_use]
    pub fn contains(&self, id: EntityId) -> bool {
        self.kind_of(id).is_some()
    }

    /// Returns a character.
    #[must_use]
    pub fn character(&self, id: EntityId) -> Option<&Character> {
        self.characters.get(&id)
    }

    /// Returns a pickup.
    #[must_use]
    pub fn pickup(&self, id: EntityId) -> Option<&Pickup> {
        self.pickups.get(&id)
    }

    /// Returns a turret.
    #[must_use]
    pub fn turret(&self, id: EntityId) -> Option<&Turret> {
        self.turrets.get(&id)
    }

    /// Returns a projectile.
    #[must_use]
    pub fn projectile(&self, id: EntityId) -> Option<&Projectile> {
        self.projectiles.get(&id)
    }

    /// Iterates over characters in ID order.
    pub fn characters(&self) -> impl Iterator<Item = &Character> {
        self.characters.values()
    }

    /// Iterates over turrets in ID order.
    pub fn turrets(&self) -> impl Iterator<Item = &Turret> {
        self.turrets.values()
    }

    /// Number of characters.
    #[must_use]
    pub fn character_count(&self) -> usize {
        self.characters.len()
    }

    /// Number of pickups.
    #[must_use]
    pub fn pickup_count(&self) -> usize {
        self.pickups.len()
    }

    /// Number of turrets.
    #[must_use]
    pub fn turret_count(&self) -> usize {
        self.turrets.len()
    }

    /// Number of projectiles in flight.
    #[must_use]
    pub fn projectile_count(&self) -> usize {
        self.projectiles.len()
    }

    /// Number of pending timers.
    #[must_use]
    pub fn active_timer_count(&self) -> usize {
        self.timers.active_count()
    }

    /// Returns the event bus.
    #[must_use]
    pub const fn events(&self) -> &EventBus {
        &self.events
    }

    /// Drains all pending events.
    pub fn drain_events(&self) -> Vec<GameEvent> {
        self.events.drain()
    }

    fn kind_error(&self, id: EntityId, expected: ObjectKind) -> SandboxError {
        match self.kind_of(id) {
            Some(actual) => SandboxError::WrongKind {
                id,
                expected,
                actual,
            },
            None => SandboxError::NotFound(id),
        }
    }

    // === Internals ===

    fn dispatch_timer(&mut self, fired: FiredTimer) {
        let owner = if self.timers.is_active(fired.handle) {
            self.timer_owners.get(&fired.handle).copied()
        } else {
            self.timer_owners.remove(&fired.handle)
        };
        let Some(owner) = owner else {
            return;
        };

        if let Some(turret) = self.turrets.get_mut(&owner) {
            let mut scheduler =
                OwnedScheduler::new(&mut self.timers, &mut self.timer_owners, owner);
            let Some(shot) = turret.on_fire(&mut scheduler) else {
                return;
            };
            let ammo_left = turret.ammo();
            let depleted = turret.is_depleted().then_some(turret.shots_fired());

            let projectile = self.launch_projectile(shot);
            let _ = self.events.publish(GameEvent::ProjectileFired {
                turret: owner,
                projectile,
                origin: shot.origin,
                ammo_left,
            });
            if let Some(shots_fired) = depleted {
                let _ = self.events.publish(GameEvent::TurretDepleted {
                    turret: owner,
                    shots_fired,
                });
            }
        } else if let Some(projectile) = self.projectiles.get_mut(&owner) {
            debug!("Projectile {} expired", owner);
            projectile.on_life_span_expired(&mut self.commands);
        } else if let Some(character) = self.characters.get_mut(&owner) {
            if character.health().removal_timer() == Some(fired.handle) {
                let _ = self.commands.destroy(owner);
                return;
            }
            if character.health().heal_timer() != Some(fired.handle) {
                return;
            }
            let mut scheduler =
                OwnedScheduler::new(&mut self.timers, &mut self.timer_owners, owner);
            if character.on_heal_tick(&mut scheduler) {
                let _ = self.events.publish(GameEvent::CharacterHealed {
                    entity_id: owner,
                    health: character.health().current(),
                });
            }
        }
    }

    fn step_projectiles(&mut self, now: Duration) {
        for (&id, projectile) in &mut self.projectiles {
            if !projectile.is_flying() || self.commands.is_doomed(id) {
                continue;
            }

            let (from, to) = projectile.travel(now);
            let ignore: Vec<EntityId> = std::iter::once(id).chain(projectile.owner()).collect();
            match self.space.sweep(from, to, projectile.radius(), &ignore) {
                Some(SweepHit { entity, point, .. }) => {
                    let mut scheduler =
                        OwnedScheduler::new(&mut self.timers, &mut self.timer_owners, id);
                    let _ = projectile.on_hit(entity, point, &mut self.commands, &mut scheduler);
                    let _ = self.space.set_center(id, point);
                },
                None => {
                    projectile.move_to(to, now);
                    let _ = self.space.set_center(id, to);
                },
            }
        }
    }

    /// Finds pickup/character pairs that started touching and offers each pickup.
    fn resolve_overlaps(&mut self) {
        let mut current = AHashSet::new();
        for &pickup in self.pickups.keys() {
            for other in self.space.overlapping(pickup) {
                if self.characters.contains_key(&other) {
                    let _ = current.insert((pickup, other));
                }
            }
        }

        let mut begun: Vec<(EntityId, EntityId)> =
            current.difference(&self.overlaps).copied().collect();
        begun.sort_unstable();
        self.overlaps = current;

        for (pickup, agent) in begun {
            self.begin_overlap(pickup, agent);
        }
    }

    fn begin_overlap(&mut self, pickup_id: EntityId, agent_id: EntityId) {
        if self.commands.is_doomed(pickup_id) {
            return;
        }
        let (Some(pickup), Some(agent)) = (
            self.pickups.get_mut(&pickup_id),
            self.characters.get_mut(&agent_id),
        ) else {
            return;
        };

        let data = *pickup.data();
        match pickup.on_begin_overlap(agent, &mut self.commands) {
            PickupOutcome::Consumed { total } => {
                let _ = self.events.publish(GameEvent::ItemPickedUp {
                    agent: agent_id,
                    pickup: pickup_id,
                    kind: data.kind,
                    score: data.score,
                    total,
                });
            },
            PickupOutcome::Rejected(err) => {
                debug!("Pickup {} rejected by {}: {}", pickup_id, agent_id, err);
                let _ = self.events.publish(GameEvent::PickupRejected {
                    agent: agent_id,
                    pickup: pickup_id,
                    reason: err.to_string(),
                });
            },
            PickupOutcome::NoInventory | PickupOutcome::AlreadyConsumed => {},
        }
    }

    /// Applies queued host commands in order.
    fn flush(&mut self) {
        while let Some(command) = self.commands.pop() {
            match command {
                HostCommand::ApplyDamage {
                    target,
                    amount,
                    causer,
                } => {
                    let _ = self.deliver_damage(target, amount, causer);
                },
                HostCommand::Destroy(id) => {
                    let _ = self.remove(id);
                },
            }
        }
    }

    fn deliver_damage(
        &mut self,
        target: EntityId,
        amount: f32,
        causer: Option<EntityId>,
    ) -> DamageOutcome {
        let Some(character) = self.characters.get_mut(&target) else {
            debug!("Damage to {} has no effect", target);
            return DamageOutcome::Ignored;
        };

        let mut scheduler = OwnedScheduler::new(&mut self.timers, &mut self.timer_owners, target);
        let outcome = character.take_damage(amount, &mut scheduler);
        match outcome {
            DamageOutcome::Ignored => {},
            DamageOutcome::Damaged { health } => {
                let _ = self.events.publish(GameEvent::EntityDamaged {
                    entity_id: target,
                    damage: amount,
                    health,
                    source: causer,
                });
            },
            DamageOutcome::Killed => {
                let _ = self.events.publish(GameEvent::EntityDamaged {
                    entity_id: target,
                    damage: amount,
                    health: 0.0,
                    source: causer,
                });
                let _ = self.events.publish(GameEvent::CharacterDied {
                    entity_id: target,
                    killer: causer,
                });
            },
        }
        outcome
    }

    /// Takes an object out of the world along with its timers and overlaps.
    fn remove(&mut self, id: EntityId) -> Option<ObjectKind> {
        let kind = if self.characters.remove(&id).is_some() {
            ObjectKind::Character
        } else if self.pickups.remove(&id).is_some() {
            ObjectKind::Pickup
        } else if self.turrets.remove(&id).is_some() {
            ObjectKind::Turret
        } else if self.projectiles.remove(&id).is_some() {
            ObjectKind::Projectile
        } else {
            return None;
        };

        let _ = self.space.remove(id);
        let owned: Vec<TimerHandle> = self
            .timer_owners
            .iter()
            .filter(|(_, owner)| **owner == id)
            .map(|(handle, _)| *handle)
            .collect();
        for handle in owned {
            let _ = self.timers.cancel(handle);
            let _ = self.timer_owners.remove(&handle);
        }
        self.overlaps
            .retain(|(pickup, agent)| *pickup != id && *agent != id);

        if kind != ObjectKind::Projectile {
            info!("Removed {} {}", kind, id);
        }
        let _ = self.events.publish(GameEvent::EntityDestroyed {
            entity_id: id,
            kind,
        });
        Some(kind)
    }
}

impl Lifetime for Sandbox {
    fn destroy(&mut self, id: EntityId) -> bool {
        Sandbox::destroy(self, id)
    }
}

impl DamageSink for Sandbox {
    fn apply_damage(&mut self, target: EntityId, amount: f32, causer: Option<EntityId>) {
        let _ = self.deliver_damage(target, amount, causer);
        self.flush();
    }
}

impl SpatialQuery for Sandbox {
    fn overlapping(&self, id: EntityId) -> Vec<EntityId> {
        self.space.overlapping(id)
    }

    fn sweep(&self, from: Vec3, to: Vec3, radius: f32, ignore: &[EntityId]) -> Option<SweepHit> {
        self.space.sweep(from, to, radius, ignore)
    }
}

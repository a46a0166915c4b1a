//! Scenario configuration.
//!
//! Describes the sandbox a run starts from: inventory limits, the character
//! and its path, the turret, projectile tuning and the pickups lying around.
//! Configuration can be loaded from and saved to a TOML file.

use glam::Vec3;
use proving_common::{Color, ConfigResult, ProvingError, ProvingResult};
use proving_gameplay::{HealthData, InventoryLimits, ItemKind, ProjectileConfig};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::io::{self, Write};
use std::path::Path;
use std::time::Duration;
use tracing::{info, warn};

/// Configuration file name.
pub const CONFIG_FILE: &str = "proving.toml";

/// Scenario parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScenarioConfig {
    // === Simulation Settings ===
    /// Simulation steps per second
    pub tick_rate: u32,
    /// Scenario length in seconds
    pub duration: f32,

    // === Inventory Settings ===
    /// Limit per item kind, keyed by kind name. Every kind must be listed.
    pub inventory_limits: BTreeMap<String, i64>,

    // === Actors ===
    /// The character walking through the scenario
    pub character: CharacterSettings,
    /// Where the character teleports to, and when
    pub waypoints: Vec<Waypoint>,
    /// The turret
    pub turret: TurretSettings,
    /// Projectile tuning
    pub projectile: ProjectileConfig,
    /// Pickups placed at startup
    pub pickups: Vec<PickupSettings>,
}

/// Character placement and health.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CharacterSettings {
    /// Spawn position
    pub position: Vec3,
    /// Health parameters
    pub health: HealthData,
    /// Whether the character carries an inventory
    pub inventory: bool,
}

impl Default for CharacterSettings {
    fn default() -> Self {
        Self {
            position: Vec3::new(800.0, 0.0, 0.0),
            health: HealthData::default(),
            inventory: true,
        }
    }
}

/// A scripted character move.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Waypoint {
    /// Seconds into the scenario
    pub at: f32,
    /// Target position
    pub position: Vec3,
}

impl Waypoint {
    /// Time of the move.
    #[must_use]
    pub fn time(&self) -> Duration {
        Duration::try_from_secs_f32(self.at).unwrap_or(Duration::ZERO)
    }
}

/// Turret placement and firing parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TurretSettings {
    /// Rounds to fire
    pub ammo_count: i64,
    /// Seconds between shots
    pub fire_frequency: f32,
    /// Turret position
    pub position: Vec3,
    /// Direction the turret faces
    pub aim: Vec3,
}

impl Default for TurretSettings {
    fn default() -> Self {
        Self {
            ammo_count: 10,
            fire_frequency: 1.0,
            position: Vec3::ZERO,
            aim: Vec3::X,
        }
    }
}

/// A pickup placed at startup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PickupSettings {
    /// Item kind granted
    pub kind: ItemKind,
    /// Score granted
    pub score: i32,
    /// Position
    pub position: Vec3,
    /// Tint color
    #[serde(default)]
    pub color: Color,
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        let pickup = |kind, score, position, color| PickupSettings {
            kind,
            score,
            position,
            color,
        };
        Self {
            // Simulation
            tick_rate: 10,
            duration: 15.0,

            // Inventory
            inventory_limits: ItemKind::ALL
                .into_iter()
                .map(|kind| (kind.name().to_string(), 100))
                .collect(),

            // Actors
            character: CharacterSettings::default(),
            waypoints: vec![
                Waypoint {
                    at: 3.0,
                    position: Vec3::new(800.0, 300.0, 0.0),
                },
                Waypoint {
                    at: 5.0,
                    position: Vec3::new(800.0, 600.0, 0.0),
                },
                Waypoint {
                    at: 7.0,
                    position: Vec3::new(800.0, -300.0, 0.0),
                },
            ],
            turret: TurretSettings::default(),
            projectile: ProjectileConfig::default(),
            pickups: vec![
                pickup(ItemKind::Sphere, 10, Vec3::new(800.0, 300.0, 0.0), Color::GREEN),
                pickup(ItemKind::Cube, 50, Vec3::new(800.0, 600.0, 0.0), Color::YELLOW),
                pickup(ItemKind::Cylinder, 200, Vec3::new(800.0, -300.0, 0.0), Color::RED),
            ],
        }
    }
}

impl ScenarioConfig {
    /// Load configuration from a specific path.
    /// Returns default config if the file doesn't exist; read and parse
    /// failures are errors.
    pub fn load_from<P: AsRef<Path>>(path: P) -> ProvingResult<Self> {
        let path = path.as_ref();

        if !path.exists() {
            info!("Config file not found, using defaults");
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)?;
        let config = toml::from_str(&contents).map_err(|e| ProvingError::Parse(e.to_string()))?;
        info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Save configuration to a specific path.
    pub fn save_to<P: AsRef<Path>>(&self, path: P) -> io::Result<()> {
        let path = path.as_ref();

        // Create parent directories if needed
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;

        let mut file = fs::File::create(path)?;
        file.write_all(contents.as_bytes())?;

        info!("Saved config to {}", path.display());
        Ok(())
    }

    /// Clamp simulation values to sensible ranges.
    ///
    /// Gameplay values are not clamped; they are checked when the sandbox
    /// is built.
    pub fn validate(&mut self) {
        self.tick_rate = self.tick_rate.clamp(1, 1000);
        self.duration = if self.duration.is_finite() {
            self.duration.clamp(0.0, 3600.0)
        } else {
            0.0
        };
        self.waypoints.sort_by(|a, b| a.at.total_cmp(&b.at));
    }

    /// Length of one simulation step.
    #[must_use]
    pub fn step(&self) -> Duration {
        Duration::from_secs(1) / self.tick_rate.max(1)
    }

    /// Scenario length.
    #[must_use]
    pub fn run_time(&self) -> Duration {
        Duration::try_from_secs_f32(self.duration).unwrap_or(Duration::ZERO)
    }

    /// Converts the keyed limits, rejecting missing or negative entries.
    pub fn limits(&self) -> ConfigResult<InventoryLimits> {
        let entries = self.inventory_limits.iter().filter_map(|(name, limit)| {
            let kind = ItemKind::from_name(name);
            if kind.is_none() {
                warn!("Ignoring limit for unknown item kind '{name}'");
            }
            kind.map(|kind| (kind, *limit))
        });
        InventoryLimits::from_entries(entries)
    }
}

//! # Proving Engine
//!
//! Headless runner for the Proving Ground sandbox.
//!
//! Loads a scenario from TOML, builds the sandbox, steps it at a fixed rate
//! and logs what happens:
//! - `proving [CONFIG]` runs the scenario in `CONFIG` (default `proving.toml`)
//! - `proving --init [CONFIG]` writes the default scenario to `CONFIG`

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

mod config;
mod scenario;

use anyhow::{Context, Result};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::config::{ScenarioConfig, CONFIG_FILE};
use crate::scenario::Scenario;

/// Main entry point.
fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env().add_directive("proving=info".parse()?))
        .init();

    info!("Proving Ground starting...");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    let mut args = std::env::args_os().skip(1).peekable();
    let init = args.peek().is_some_and(|arg| arg == "--init");
    if init {
        let _ = args.next();
    }
    let path = args.next().map_or_else(|| PathBuf::from(CONFIG_FILE), PathBuf::from);

    if init {
        ScenarioConfig::default()
            .save_to(&path)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        return Ok(());
    }

    let mut config = ScenarioConfig::load_from(&path)
        .with_context(|| format!("Failed to load {}", path.display()))?;
    config.validate();

    let scenario = Scenario::build(&config).context("Invalid scenario")?;
    let report = scenario.run();
    info!("Scenario finished {report}");

    info!("Proving Ground shutdown complete");
    Ok(())
}

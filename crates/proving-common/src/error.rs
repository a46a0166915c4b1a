//! Error types for Proving Ground.

use thiserror::Error;

/// Top-level error type for Proving Ground operations.
#[derive(Debug, Error)]
pub enum ProvingError {
    /// Invalid gameplay configuration
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Config file could not be parsed
    #[error("Parse error: {0}")]
    Parse(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration errors detected when gameplay objects are constructed.
///
/// These are fatal at startup: a sandbox is never built from a config that
/// produced one.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// An item kind has no configured inventory limit
    #[error("Limit for {kind} doesn't exist")]
    MissingLimit {
        /// Name of the item kind
        kind: String,
    },

    /// An item kind has a negative inventory limit
    #[error("Limit for {kind} is less than zero: {limit}")]
    NegativeLimit {
        /// Name of the item kind
        kind: String,
        /// Configured limit
        limit: i64,
    },

    /// An item kind's inventory limit doesn't fit the counter
    #[error("Limit for {kind} is too large: {limit}")]
    LimitTooLarge {
        /// Name of the item kind
        kind: String,
        /// Configured limit
        limit: i64,
    },

    /// Turret ammo must be positive
    #[error("Turret ammo must be positive, got {ammo}")]
    InvalidAmmo {
        /// Configured ammo count
        ammo: i64,
    },

    /// Turret fire interval must be positive and finite
    #[error("Turret fire interval must be positive, got {seconds}s")]
    InvalidFireInterval {
        /// Configured interval in seconds
        seconds: f32,
    },

    /// A time field can't be represented as a duration
    #[error("{field} is not a valid duration: {seconds}s")]
    InvalidDuration {
        /// Field name
        field: &'static str,
        /// Configured value in seconds
        seconds: f32,
    },

    /// A numeric field is below its minimum
    #[error("{field} must be at least {min}, got {value}")]
    OutOfRange {
        /// Field name
        field: &'static str,
        /// Configured value
        value: f32,
        /// Minimum accepted value
        min: f32,
    },
}

/// Result type alias for configuration checks.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Result type alias for Proving Ground operations.
pub type ProvingResult<T> = Result<T, ProvingError>;

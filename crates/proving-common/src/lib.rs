//! # Proving Common
//!
//! Common types, utilities, and shared abstractions for Proving Ground.
//!
//! This crate provides foundational types used across all subsystems:
//! - ID types (EntityId)
//! - Colors for item tints and charge indicators
//! - Transforms (position + rotation, forward vector)
//! - Common error types
//! - Prelude for convenient imports

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

pub mod color;
pub mod error;
pub mod ids;
pub mod transform;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::color::*;
    pub use crate::error::*;
    pub use crate::ids::*;
    pub use crate::transform::*;
}

pub use prelude::*;

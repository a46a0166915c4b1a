//! World transforms.
//!
//! Forward is +X, matching the convention of the content these objects were
//! authored against.

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

/// Position and orientation of a world object.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    /// World position
    pub position: Vec3,
    /// World rotation
    pub rotation: Quat,
}

impl Transform {
    /// Identity transform at the origin.
    pub const IDENTITY: Self = Self {
        position: Vec3::ZERO,
        rotation: Quat::IDENTITY,
    };

    /// Creates an unrotated transform at `position`.
    #[must_use]
    pub const fn from_position(position: Vec3) -> Self {
        Self {
            position,
            rotation: Quat::IDENTITY,
        }
    }

    /// Creates a transform at `position` whose forward vector points along `direction`.
    ///
    /// A zero direction keeps the identity rotation.
    #[must_use]
    pub fn looking_along(position: Vec3, direction: Vec3) -> Self {
        let rotation = direction
            .try_normalize()
            .map_or(Quat::IDENTITY, |dir| Quat::from_rotation_arc(Vec3::X, dir));
        Self { position, rotation }
    }

    /// Unit forward vector.
    #[must_use]
    pub fn forward(&self) -> Vec3 {
        self.rotation * Vec3::X
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

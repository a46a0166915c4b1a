//! Item kinds and per-kind storage.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Index, IndexMut};

/// Kind of collectible item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    /// Sphere
    Sphere = 0,
    /// Cube
    Cube = 1,
    /// Cylinder
    Cylinder = 2,
    /// Cone
    Cone = 3,
}

impl ItemKind {
    /// Number of item kinds.
    pub const COUNT: usize = 4;

    /// Every item kind, in index order.
    pub const ALL: [Self; Self::COUNT] = [Self::Sphere, Self::Cube, Self::Cylinder, Self::Cone];

    /// Dense index of this kind.
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Convert from a dense index.
    #[must_use]
    pub const fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(Self::Sphere),
            1 => Some(Self::Cube),
            2 => Some(Self::Cylinder),
            3 => Some(Self::Cone),
            _ => None,
        }
    }

    /// Display name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Sphere => "Sphere",
            Self::Cube => "Cube",
            Self::Cylinder => "Cylinder",
            Self::Cone => "Cone",
        }
    }

    /// Looks a kind up by name, ignoring case.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.name().eq_ignore_ascii_case(name.trim()))
    }
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One value per [`ItemKind`].
///
/// Backed by a fixed-size array so every kind always has an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PerKind<T>([T; ItemKind::COUNT]);

impl<T> PerKind<T> {
    /// Builds a table by evaluating `f` for each kind.
    pub fn from_fn(mut f: impl FnMut(ItemKind) -> T) -> Self {
        Self(std::array::from_fn(|i| f(ItemKind::ALL[i])))
    }

    /// Returns the value for `kind`.
    #[must_use]
    pub fn get(&self, kind: ItemKind) -> &T {
        &self.0[kind.index()]
    }

    /// Returns the value for `kind` mutably.
    pub fn get_mut(&mut self, kind: ItemKind) -> &mut T {
        &mut self.0[kind.index()]
    }

    /// Iterates `(kind, value)` pairs in index order.
    pub fn iter(&self) -> impl Iterator<Item = (ItemKind, &T)> + '_ {
        ItemKind::ALL.into_iter().zip(self.0.iter())
    }
}

impl<T: Copy> PerKind<T> {
    /// Same value for every kind.
    #[must_use]
    pub const fn splat(value: T) -> Self {
        Self([value; ItemKind::COUNT])
    }
}

impl<T: Default> Default for PerKind<T> {
    fn default() -> Self {
        Self::from_fn(|_| T::default())
    }
}

impl<T> Index<ItemKind> for PerKind<T> {
    type Output = T;

    fn index(&self, kind: ItemKind) -> &T {
        self.get(kind)
    }
}

impl<T> IndexMut<ItemKind> for PerKind<T> {
    fn index_mut(&mut self, kind: ItemKind) -> &mut T {
        self.get_mut(kind)
    }
}

/// What a pickup grants: an item kind and a score.
///
/// The score is signed so that malformed content can be represented and
/// rejected by the inventory rather than by the type system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InventoryData {
    /// Item kind
    pub kind: ItemKind,
    /// Score granted on pickup
    pub score: i32,
}

impl InventoryData {
    /// Creates inventory data.
    #[must_use]
    pub const fn new(kind: ItemKind, score: i32) -> Self {
        Self { kind, score }
    }
}

impl fmt::Display for InventoryData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(Type={},Score={})", self.kind.index(), self.score)
    }
}

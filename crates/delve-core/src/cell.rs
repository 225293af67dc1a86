//! The [`Cell`] type: one tile of a [`Grid`](crate::Grid).

use crate::terrain::Terrain;

/// A single tile.
///
/// Cells are plain values addressed by coordinate. They hold no reference to
/// their grid and no per-query state; opacity, blocking and cost are derived
/// from the terrain on every call.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Cell {
    pub terrain: Terrain,
}

impl Cell {
    /// Create a cell of the given terrain.
    #[inline]
    pub const fn new(terrain: Terrain) -> Self {
        Self { terrain }
    }

    /// Set the terrain (builder).
    #[inline]
    pub const fn with_terrain(mut self, terrain: Terrain) -> Self {
        self.terrain = terrain;
        self
    }

    #[inline]
    pub const fn opaque(self) -> bool {
        self.terrain.opaque()
    }

    #[inline]
    pub const fn blocking(self) -> bool {
        self.terrain.blocking()
    }

    /// Movement-cost multiplier, `None` if blocking.
    #[inline]
    pub const fn cost(self) -> Option<f64> {
        self.terrain.cost()
    }

    #[inline]
    pub const fn glyph(self) -> char {
        self.terrain.glyph()
    }
}

impl From<Terrain> for Cell {
    fn from(terrain: Terrain) -> Self {
        Self::new(terrain)
    }
}

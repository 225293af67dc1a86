//! Terrain kinds and their fixed movement/vision properties.

use std::fmt;

/// Closed set of terrain kinds.
///
/// The kind alone decides whether a cell blocks vision, blocks movement and
/// what it costs to enter; nothing about a query can change that.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Terrain {
    #[default]
    Floor,
    Wall,
    /// Shallow water: walkable but slow.
    Water,
    /// Dense undergrowth: walkable, hides what lies behind it.
    Vegetation,
    Tree,
    /// Outer wall of a town building.
    StructureWall,
    /// Closed door: walkable, blocks sight.
    Door,
    Road,
    Rubble,
    /// Stairs, gate or trailhead leading out of the level.
    Exit,
}

impl Terrain {
    /// Every terrain kind, in declaration order.
    pub const ALL: [Terrain; 10] = [
        Terrain::Floor,
        Terrain::Wall,
        Terrain::Water,
        Terrain::Vegetation,
        Terrain::Tree,
        Terrain::StructureWall,
        Terrain::Door,
        Terrain::Road,
        Terrain::Rubble,
        Terrain::Exit,
    ];

    /// Whether the terrain blocks movement.
    #[inline]
    pub const fn blocking(self) -> bool {
        matches!(self, Terrain::Wall | Terrain::Tree | Terrain::StructureWall)
    }

    /// Whether the terrain blocks line of sight.
    #[inline]
    pub const fn opaque(self) -> bool {
        matches!(
            self,
            Terrain::Wall
                | Terrain::Tree
                | Terrain::StructureWall
                | Terrain::Door
                | Terrain::Vegetation
        )
    }

    /// Movement-cost multiplier for entering a cell of this kind, or `None`
    /// when the terrain blocks movement.
    #[inline]
    pub const fn cost(self) -> Option<f64> {
        match self {
            Terrain::Wall | Terrain::Tree | Terrain::StructureWall => None,
            Terrain::Water => Some(3.0),
            Terrain::Vegetation | Terrain::Rubble => Some(2.0),
            Terrain::Floor | Terrain::Door | Terrain::Road | Terrain::Exit => Some(1.0),
        }
    }

    /// ASCII glyph used by text renderings of a grid.
    #[inline]
    pub const fn glyph(self) -> char {
        match self {
            Terrain::Floor => '.',
            Terrain::Wall => '#',
            Terrain::Water => '~',
            Terrain::Vegetation => '"',
            Terrain::Tree => 'T',
            Terrain::StructureWall => '=',
            Terrain::Door => '+',
            Terrain::Road => ':',
            Terrain::Rubble => '^',
            Terrain::Exit => '>',
        }
    }

    /// Inverse of [`glyph`](Self::glyph).
    pub fn from_glyph(ch: char) -> Option<Terrain> {
        Self::ALL.into_iter().find(|t| t.glyph() == ch)
    }
}

impl fmt::Display for Terrain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Terrain::Floor => "floor",
            Terrain::Wall => "wall",
            Terrain::Water => "water",
            Terrain::Vegetation => "vegetation",
            Terrain::Tree => "tree",
            Terrain::StructureWall => "structure wall",
            Terrain::Door => "door",
            Terrain::Road => "road",
            Terrain::Rubble => "rubble",
            Terrain::Exit => "exit",
        };
        f.write_str(name)
    }
}

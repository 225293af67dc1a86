//! Level generators for the dungeon, jungle and town biomes.
//!
//! Every generator fills a fresh [`Grid`] from a [`RandomStream`] seeded
//! with the caller's [`Seed`], so identical seeds and parameters always give
//! identical levels. Each produced level is fully connected: a 4-adjacent
//! flood fill from [`Level::spawn`] covers every non-blocking cell. When a
//! generator runs out of placement attempts it still returns a playable
//! level, flagged with [`Level::degraded`].

mod cellular;
pub mod connect;
mod dungeon;
mod jungle;
mod town;

use std::fmt;

use delve_core::{Grid, GridError, Point, Range, Terrain};

use crate::rng::{RandomStream, Seed};

pub use cellular::{Automaton, SolidMask};
pub use dungeon::DungeonParams;
pub use jungle::JungleParams;
pub use town::TownParams;

/// Smallest accepted width or height of a generated level.
pub const MIN_LEVEL_SIDE: i32 = 5;

/// The kind of level produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Biome {
    Dungeon,
    Jungle,
    Town,
}

impl fmt::Display for Biome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Biome::Dungeon => "dungeon",
            Biome::Jungle => "jungle",
            Biome::Town => "town",
        })
    }
}

/// Why a level came out below its requested parameters.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Degradation {
    /// Fewer rooms than `min_rooms` fitted.
    FewerRooms { placed: usize, wanted: usize },
    /// Fewer buildings than `min_buildings` fitted.
    FewerBuildings { placed: usize, wanted: usize },
    /// No cave attempt reached `min_open_fraction`; the best one was kept.
    SparseCave { open_fraction: f64 },
    /// Nothing could be placed; the level is a single corridor.
    FallbackCorridor,
}

impl fmt::Display for Degradation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Degradation::FewerRooms { placed, wanted } => {
                write!(f, "placed {placed} of at least {wanted} rooms")
            }
            Degradation::FewerBuildings { placed, wanted } => {
                write!(f, "placed {placed} of at least {wanted} buildings")
            }
            Degradation::SparseCave { open_fraction } => {
                write!(f, "cave only {:.0}% open", open_fraction * 100.0)
            }
            Degradation::FallbackCorridor => f.write_str("fell back to a single corridor"),
        }
    }
}

/// A generated level.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Level {
    pub grid: Grid,
    pub spawn: Point,
    /// Cells of terrain [`Terrain::Exit`]. Never empty.
    pub exits: Vec<Point>,
    /// Notable cells: doors for dungeons and towns.
    pub features: Vec<Point>,
    /// Floor area of each dungeon room or town building.
    pub rooms: Vec<Range>,
    pub monster_spawns: Vec<Point>,
    pub biome: Biome,
    pub seed: Seed,
    pub degraded: Option<Degradation>,
}

impl Level {
    /// Whether every non-blocking cell is reachable from the spawn.
    pub fn is_connected(&self) -> bool {
        connect::is_fully_connected(&self.grid, self.spawn)
    }
}

/// A biome generator.
pub trait LevelGenerator {
    fn generate(&self, seed: &Seed, width: i32, height: i32) -> Result<Level, GridError>;
}

/// Parameters of any biome, for dispatch through [`generate`].
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "biome", rename_all = "lowercase"))]
pub enum BiomeParams {
    Dungeon(DungeonParams),
    Jungle(JungleParams),
    Town(TownParams),
}

impl BiomeParams {
    pub fn biome(&self) -> Biome {
        match self {
            BiomeParams::Dungeon(_) => Biome::Dungeon,
            BiomeParams::Jungle(_) => Biome::Jungle,
            BiomeParams::Town(_) => Biome::Town,
        }
    }

    /// Default parameters for `biome`.
    pub fn defaults(biome: Biome) -> Self {
        match biome {
            Biome::Dungeon => BiomeParams::Dungeon(DungeonParams::default()),
            Biome::Jungle => BiomeParams::Jungle(JungleParams::default()),
            Biome::Town => BiomeParams::Town(TownParams::default()),
        }
    }
}

impl LevelGenerator for BiomeParams {
    fn generate(&self, seed: &Seed, width: i32, height: i32) -> Result<Level, GridError> {
        match self {
            BiomeParams::Dungeon(p) => p.generate(seed, width, height),
            BiomeParams::Jungle(p) => p.generate(seed, width, height),
            BiomeParams::Town(p) => p.generate(seed, width, height),
        }
    }
}

/// Generate a level of the biome selected by `params`.
pub fn generate(
    seed: impl Into<Seed>,
    width: i32,
    height: i32,
    params: &BiomeParams,
) -> Result<Level, GridError> {
    params.generate(&seed.into(), width, height)
}

// ── shared helpers ────────────────────────────────────────────────

fn check_size(width: i32, height: i32) -> Result<(), GridError> {
    if width < MIN_LEVEL_SIDE || height < MIN_LEVEL_SIDE {
        return Err(GridError::InvalidDimensions {
            width,
            height,
            min: MIN_LEVEL_SIDE,
        });
    }
    Ok(())
}

fn invalid(msg: impl Into<String>) -> GridError {
    GridError::InvalidParams(msg.into())
}

/// Log and record a degraded outcome.
fn degrade(biome: Biome, seed: &Seed, d: Degradation) -> Option<Degradation> {
    log::warn!("{biome} level for seed {seed}: {d}");
    Some(d)
}

/// A `fill` grid with one floor corridor along the middle row, spawn at the
/// west end and exit at the east end.
fn fallback_corridor(
    seed: &Seed,
    biome: Biome,
    width: i32,
    height: i32,
    fill: Terrain,
) -> Result<Level, GridError> {
    let mut grid = Grid::new(width, height, fill)?;
    let y = height / 2;
    for x in 1..width - 1 {
        grid.set(Point::new(x, y), Terrain::Floor)?;
    }
    let spawn = Point::new(1, y);
    let exit = Point::new(width - 2, y);
    grid.set(exit, Terrain::Exit)?;
    Ok(Level {
        grid,
        spawn,
        exits: vec![exit],
        features: Vec::new(),
        rooms: Vec::new(),
        monster_spawns: Vec::new(),
        biome,
        seed: seed.clone(),
        degraded: degrade(biome, seed, Degradation::FallbackCorridor),
    })
}

/// Up to `n` distinct walkable cells at least `min_dist` steps from `from`,
/// drawn from the stream. Falls back to the farthest cells when none are
/// that far.
fn pick_far_cells(
    grid: &Grid,
    from: Point,
    min_dist: i32,
    n: usize,
    rng: &mut RandomStream,
) -> Vec<Point> {
    let dm = delve_paths::bfs_map(
        grid.bounds(),
        &delve_paths::WalkablePather::new(grid),
        &[from],
        i32::MAX,
    );
    let mut pool: Vec<Point> = dm
        .nodes()
        .iter()
        .filter(|node| node.cost >= min_dist && grid.terrain(node.pos) != Some(Terrain::Exit))
        .map(|node| node.pos)
        .collect();
    if pool.is_empty() {
        pool = dm
            .nodes()
            .iter()
            .rev()
            .filter(|node| node.cost > 0 && grid.terrain(node.pos) != Some(Terrain::Exit))
            .take(n)
            .map(|node| node.pos)
            .collect();
    }
    rng.shuffle(&mut pool);
    pool.truncate(n);
    pool.sort_unstable();
    pool
}

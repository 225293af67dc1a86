//! Roguelike core for delve: seeded random stream, field of vision and
//! procedural level generation.
//!
//! ```
//! use delve_rl::{compute_visible, generate, BiomeParams, Biome};
//!
//! let level = generate("readme", 40, 30, &BiomeParams::defaults(Biome::Dungeon)).unwrap();
//! assert!(level.is_connected());
//! let seen = compute_visible(&level.grid, level.spawn, 8).unwrap();
//! assert!(seen.contains(level.spawn));
//! ```

pub mod fov;
pub mod mapgen;
pub mod rng;

pub use fov::{FovMetric, FovOptions, VisibilitySet, compute_visible, compute_visible_with};
pub use mapgen::{
    Biome, BiomeParams, Degradation, DungeonParams, JungleParams, Level, LevelGenerator,
    MIN_LEVEL_SIDE, TownParams, generate,
};
pub use rng::{RandomStream, Seed};

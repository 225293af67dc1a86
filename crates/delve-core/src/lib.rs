//! **delve-core**: the tile grid shared by level generation, visibility and
//! pathfinding.
//!
//! This crate provides geometry primitives, the closed set of terrain kinds,
//! plain-value cells, the owned [`Grid`], and the [`GridError`] taxonomy of
//! contract violations used across the *delve* crates.

pub mod cell;
pub mod error;
pub mod geom;
pub mod grid;
pub mod terrain;

pub use cell::Cell;
pub use error::GridError;
pub use geom::{Point, Range};
pub use grid::{Grid, walkable_neighbors};
pub use terrain::Terrain;

//! Pathfinding and graph-search algorithms for delve tile grids.
//!
//! - **A\*** shortest-path search, generic ([`astar`]) and over terrain
//!   ([`find_path`], [`find_path_with`])
//! - **BFS** unweighted multi-source distance maps ([`bfs_map`])
//! - **Connected components** labelling ([`components`]) and single-source
//!   flood fill ([`flood`])
//!
//! Every search allocates its arena at the start of the call and drops it on
//! return. Nothing is cached between queries, so a query always reflects the
//! grid it was given.
//!
//! # Trait hierarchy
//!
//! | Trait | Required for |
//! |---|---|
//! | [`Pather`] | BFS, connected components |
//! | [`WeightedPather`] : [`Pather`] | (edge costs) |
//! | [`AstarPather`] : [`WeightedPather`] | A* |

mod astar;
mod bfs;
mod cc;
mod distance;
mod gridpath;
mod neighbors;
mod space;
mod traits;

pub use astar::astar;
pub use bfs::{DistanceMap, bfs_map};
pub use cc::{Components, components, flood};
pub use distance::{chebyshev, euclidean_sq, manhattan, octile};
pub use gridpath::{
    MoveCost, Path, PathOptions, PathOutcome, TerrainCost, TerrainPather, WalkablePather, find_path,
    find_path_with,
};
pub use neighbors::{Connectivity, push_neighbors};
pub use space::{PathNode, UNREACHABLE};
pub use traits::{AstarPather, Pather, WeightedPather};

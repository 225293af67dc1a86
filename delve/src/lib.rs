//! **delve**: actors and the owning scene on top of the delve roguelike core.
//!
//! The player and monsters consume the visibility engine and the pathfinder
//! from `delve-rl` and `delve-paths`; the [`Scene`] holds the one
//! authoritative [`Level`](delve_rl::Level) and runs a serialized turn loop.

pub mod actor;
pub mod monster;
pub mod scene;

pub use actor::{Player, Viewer, can_step};
pub use monster::{Behavior, Decision, Mindstate, Monster};
pub use scene::{Action, Scene, SceneConfig, TurnEvent};

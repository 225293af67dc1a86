//! Contract violations shared by grids, generators, FOV and pathfinding.
//!
//! Expected negative outcomes (no path, degraded layout) are *not* errors and
//! never appear here: they are variants of the respective result types.

use thiserror::Error;

use crate::geom::Point;

/// A violated precondition of a grid, generation or query call.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GridError {
    #[error("invalid dimensions {width}x{height} (each side must be at least {min})")]
    InvalidDimensions { width: i32, height: i32, min: i32 },

    #[error("point {point} is outside the {width}x{height} grid")]
    OutOfBounds { point: Point, width: i32, height: i32 },

    #[error("radius must be positive, got {0}")]
    InvalidRadius(i32),

    #[error("origin {0} is a blocking cell")]
    BlockedOrigin(Point),

    #[error("movement cost {cost} at {point} is below 1 or not finite")]
    InvalidCost { point: Point, cost: f64 },

    #[error("invalid generator parameters: {0}")]
    InvalidParams(String),

    #[error("invalid grid layout: {0}")]
    InvalidLayout(String),
}

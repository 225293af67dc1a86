//! Pathfinding over a [`Grid`] of terrain cells.

use std::cell::Cell as Flag;
use std::f64::consts::SQRT_2;

use delve_core::{Cell, Grid, GridError, Point};

use crate::astar::astar;
use crate::distance::{manhattan, octile};
use crate::neighbors::{Connectivity, push_neighbors};
use crate::traits::{AstarPather, Pather, WeightedPather};

/// Per-cell movement cost multiplier.
///
/// `None` makes the cell impassable. Returned values must be finite and at
/// least `1.0`; anything else aborts the search with
/// [`GridError::InvalidCost`]. Blocking cells are never entered, whatever
/// the multiplier.
pub trait MoveCost {
    fn cost(&self, p: Point, cell: Cell) -> Option<f64>;
}

/// The multiplier derived from each cell's terrain.
#[derive(Debug, Clone, Copy, Default)]
pub struct TerrainCost;

impl MoveCost for TerrainCost {
    #[inline]
    fn cost(&self, _p: Point, cell: Cell) -> Option<f64> {
        cell.cost()
    }
}

impl<F> MoveCost for F
where
    F: Fn(Point, Cell) -> Option<f64>,
{
    #[inline]
    fn cost(&self, p: Point, cell: Cell) -> Option<f64> {
        self(p, cell)
    }
}

/// Search options for [`find_path_with`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PathOptions {
    pub connectivity: Connectivity,
}

/// A walk from start to goal, both inclusive, with its total cost. Never
/// empty.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "RawPath"))]
pub struct Path {
    cells: Vec<Point>,
    cost: f64,
}

#[cfg(feature = "serde")]
#[derive(serde::Deserialize)]
struct RawPath {
    cells: Vec<Point>,
    cost: f64,
}

#[cfg(feature = "serde")]
impl TryFrom<RawPath> for Path {
    type Error = GridError;

    fn try_from(raw: RawPath) -> Result<Self, GridError> {
        if raw.cells.is_empty() {
            return Err(GridError::InvalidLayout("path without cells".into()));
        }
        Ok(Self {
            cells: raw.cells,
            cost: raw.cost,
        })
    }
}

impl Path {
    /// All cells of the walk, starting with the start cell.
    pub fn cells(&self) -> &[Point] {
        &self.cells
    }

    /// Sum of the step costs.
    pub fn cost(&self) -> f64 {
        self.cost
    }

    /// Number of moves, i.e. cells minus one.
    pub fn steps(&self) -> usize {
        self.cells.len().saturating_sub(1)
    }

    pub fn start(&self) -> Point {
        self.cells.first().copied().unwrap_or_default()
    }

    pub fn goal(&self) -> Point {
        self.cells.last().copied().unwrap_or_default()
    }

    /// The cell to move to next, if the walk has any move left.
    pub fn next_step(&self) -> Option<Point> {
        self.cells.get(1).copied()
    }

    pub fn into_cells(self) -> Vec<Point> {
        self.cells
    }
}

/// Result of a path query that did not violate any precondition.
#[derive(Debug, Clone, PartialEq)]
pub enum PathOutcome {
    Found(Path),
    Unreachable,
}

impl PathOutcome {
    pub fn is_found(&self) -> bool {
        matches!(self, PathOutcome::Found(_))
    }

    pub fn path(&self) -> Option<&Path> {
        match self {
            PathOutcome::Found(p) => Some(p),
            PathOutcome::Unreachable => None,
        }
    }

    pub fn into_path(self) -> Option<Path> {
        match self {
            PathOutcome::Found(p) => Some(p),
            PathOutcome::Unreachable => None,
        }
    }
}

/// Adapts a grid and a cost function to the generic pather traits.
pub struct TerrainPather<'a, C> {
    grid: &'a Grid,
    costs: &'a C,
    conn: Connectivity,
    invalid: Flag<Option<(Point, f64)>>,
}

impl<'a, C: MoveCost> TerrainPather<'a, C> {
    pub fn new(grid: &'a Grid, costs: &'a C, conn: Connectivity) -> Self {
        Self {
            grid,
            costs,
            conn,
            invalid: Flag::new(None),
        }
    }

    /// The first out-of-contract multiplier met so far, if any.
    pub fn invalid_cost(&self) -> Option<(Point, f64)> {
        self.invalid.get()
    }

    /// Multiplier for entering `p`, or `None` if `p` cannot be entered.
    fn multiplier(&self, p: Point) -> Option<f64> {
        let cell = self.grid.at(p)?;
        if cell.blocking() {
            return None;
        }
        let m = self.costs.cost(p, cell)?;
        if !m.is_finite() || m < 1.0 {
            if self.invalid.get().is_none() {
                self.invalid.set(Some((p, m)));
            }
            return None;
        }
        Some(m)
    }
}

impl<C: MoveCost> Pather for TerrainPather<'_, C> {
    fn neighbors(&self, p: Point, buf: &mut Vec<Point>) {
        push_neighbors(buf, self.conn, p, |n| self.multiplier(n).is_some());
    }
}

impl<C: MoveCost> WeightedPather for TerrainPather<'_, C> {
    fn cost(&self, from: Point, to: Point) -> f64 {
        let m = self.multiplier(to).unwrap_or(f64::INFINITY);
        if from.x != to.x && from.y != to.y {
            SQRT_2 * m
        } else {
            m
        }
    }
}

impl<C: MoveCost> AstarPather for TerrainPather<'_, C> {
    fn estimate(&self, from: Point, to: Point) -> f64 {
        match self.conn {
            Connectivity::Four => f64::from(manhattan(from, to)),
            Connectivity::Eight => octile(from, to),
        }
    }
}

/// 4-connected pather over the non-blocking cells of a grid.
///
/// This is the adjacency under which generated levels are guaranteed to be
/// connected.
#[derive(Clone, Copy)]
pub struct WalkablePather<'a> {
    grid: &'a Grid,
}

impl<'a> WalkablePather<'a> {
    pub fn new(grid: &'a Grid) -> Self {
        Self { grid }
    }
}

impl Pather for WalkablePather<'_> {
    fn neighbors(&self, p: Point, buf: &mut Vec<Point>) {
        buf.extend(delve_core::walkable_neighbors(self.grid, p));
    }
}

/// Cheapest path from `start` to `goal` with terrain costs and default
/// options (8-connectivity, no corner cutting).
pub fn find_path(grid: &Grid, start: Point, goal: Point) -> Result<PathOutcome, GridError> {
    find_path_with(grid, start, goal, &PathOptions::default(), &TerrainCost)
}

/// Cheapest path from `start` to `goal` under `opts` and `costs`.
///
/// Out-of-bounds endpoints are errors. A blocking start or goal, or one
/// whose multiplier is `None`, yields [`PathOutcome::Unreachable`].
pub fn find_path_with<C: MoveCost>(
    grid: &Grid,
    start: Point,
    goal: Point,
    opts: &PathOptions,
    costs: &C,
) -> Result<PathOutcome, GridError> {
    grid.check(start)?;
    grid.check(goal)?;

    let pather = TerrainPather::new(grid, costs, opts.connectivity);
    let endpoints_ok = pather.multiplier(start).is_some() && pather.multiplier(goal).is_some();
    if let Some((point, cost)) = pather.invalid_cost() {
        return Err(GridError::InvalidCost { point, cost });
    }
    if !endpoints_ok {
        log::debug!("path {start} -> {goal}: endpoint not enterable");
        return Ok(PathOutcome::Unreachable);
    }

    let found = astar(grid.bounds(), &pather, start, goal);
    if let Some((point, cost)) = pather.invalid_cost() {
        return Err(GridError::InvalidCost { point, cost });
    }

    Ok(match found {
        Some((cells, cost)) => PathOutcome::Found(Path { cells, cost }),
        None => PathOutcome::Unreachable,
    })
}

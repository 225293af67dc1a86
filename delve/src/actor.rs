//! Player-side adapters over the visibility engine and the pathfinder.

use delve_core::{Grid, GridError, Point, Terrain};
use delve_paths::{PathOutcome, chebyshev, find_path};
use delve_rl::{FovOptions, VisibilitySet, compute_visible_with};

/// What an actor currently sees, plus the terrain it remembers having seen.
///
/// The cached [`VisibilitySet`] is reused until the actor moves or the grid
/// revision changes. Remembered terrain is what was visible at the time and
/// is not updated for cells out of view.
#[derive(Debug, Clone)]
pub struct Viewer {
    radius: i32,
    opts: FovOptions,
    visible: Option<VisibilitySet>,
    memory: Vec<Option<Terrain>>,
    width: i32,
}

impl Viewer {
    pub fn new(radius: i32) -> Self {
        Self::with_options(radius, FovOptions::default())
    }

    pub fn with_options(radius: i32, opts: FovOptions) -> Self {
        Self {
            radius,
            opts,
            visible: None,
            memory: Vec::new(),
            width: 0,
        }
    }

    pub fn radius(&self) -> i32 {
        self.radius
    }

    /// Drop the cached visibility so the next refresh recomputes it.
    pub fn invalidate(&mut self) {
        self.visible = None;
    }

    /// Whether a refresh from `pos` would have to recompute.
    pub fn needs_refresh(&self, grid: &Grid, pos: Point) -> bool {
        match &self.visible {
            Some(vs) => vs.origin() != pos || vs.is_stale(grid),
            None => true,
        }
    }

    /// Bring the cached view up to date for an actor standing at `pos` and
    /// record the visible terrain.
    pub fn refresh(&mut self, grid: &Grid, pos: Point) -> Result<&VisibilitySet, GridError> {
        if self.width != grid.width() || self.memory.len() != grid.bounds().len() {
            self.width = grid.width();
            self.memory = vec![None; grid.bounds().len()];
            self.visible = None;
        }
        let vs = match self.visible.take() {
            Some(vs) if vs.origin() == pos && !vs.is_stale(grid) => vs,
            _ => {
                let vs = compute_visible_with(grid, pos, self.radius, &self.opts)?;
                for p in vs.iter() {
                    let i = (p.y * self.width + p.x) as usize;
                    self.memory[i] = grid.terrain(p);
                }
                log::trace!("view from {pos}: {} cells", vs.len());
                vs
            }
        };
        Ok(self.visible.insert(vs))
    }

    /// The cached view, if any.
    pub fn visible(&self) -> Option<&VisibilitySet> {
        self.visible.as_ref()
    }

    /// Whether `p` is in the cached view.
    pub fn sees(&self, p: Point) -> bool {
        self.visible.as_ref().is_some_and(|vs| vs.contains(p))
    }

    /// Terrain last seen at `p`.
    pub fn remembered(&self, p: Point) -> Option<Terrain> {
        if p.x < 0 || p.y < 0 || p.x >= self.width {
            return None;
        }
        self.memory.get((p.y * self.width + p.x) as usize).copied().flatten()
    }

    /// Number of cells ever seen.
    pub fn explored(&self) -> usize {
        self.memory.iter().filter(|t| t.is_some()).count()
    }
}

/// Whether a single move from `from` to `to` is legal on `grid`: one cell in
/// any of the 8 directions onto walkable terrain, without cutting a corner.
pub fn can_step(grid: &Grid, from: Point, to: Point) -> bool {
    if chebyshev(from, to) != 1 || !grid.is_walkable(to) {
        return false;
    }
    if from.x != to.x && from.y != to.y {
        return grid.is_walkable(Point::new(to.x, from.y))
            && grid.is_walkable(Point::new(from.x, to.y));
    }
    true
}

/// The player: a position and what it sees.
#[derive(Debug, Clone)]
pub struct Player {
    pos: Point,
    pub viewer: Viewer,
}

impl Player {
    pub fn new(pos: Point, sight_radius: i32) -> Self {
        Self {
            pos,
            viewer: Viewer::new(sight_radius),
        }
    }

    pub fn pos(&self) -> Point {
        self.pos
    }

    /// Place the player at `p` without any legality check.
    pub fn teleport(&mut self, p: Point) {
        if p != self.pos {
            self.pos = p;
            self.viewer.invalidate();
        }
    }

    /// Step one cell in direction `dir`. Returns whether the player moved.
    pub fn try_move(&mut self, grid: &Grid, dir: Point) -> Result<bool, GridError> {
        let to = self.pos + dir;
        grid.check(to)?;
        if !can_step(grid, self.pos, to) {
            return Ok(false);
        }
        self.teleport(to);
        Ok(true)
    }

    /// First cell of a shortest path toward `goal`, or `None` when the goal
    /// is reached or unreachable.
    pub fn next_travel_step(&self, grid: &Grid, goal: Point) -> Result<Option<Point>, GridError> {
        Ok(match find_path(grid, self.pos, goal)? {
            PathOutcome::Found(path) => path.next_step(),
            PathOutcome::Unreachable => None,
        })
    }

    /// Take the first step of a shortest path toward `goal`. Returns the new
    /// position, or `None` when the goal is reached or unreachable.
    pub fn travel_step(&mut self, grid: &Grid, goal: Point) -> Result<Option<Point>, GridError> {
        let next = self.next_travel_step(grid, goal)?;
        if let Some(p) = next {
            self.teleport(p);
        }
        Ok(next)
    }
}

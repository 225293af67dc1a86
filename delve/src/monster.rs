//! Monster behaviour: hunt what it sees, wander otherwise.

use delve_core::{Cell, Grid, GridError, Point};
use delve_paths::{PathOptions, PathOutcome, find_path_with};
use delve_rl::RandomStream;

use crate::actor::{Viewer, can_step};

/// Extra cost for walking through a cell another actor stands on, so
/// monsters route around each other instead of queueing.
const CROWD_COST: f64 = 4.0;

/// Attempts at drawing a random wander destination.
const WANDER_TRIES: usize = 20;

/// What a monster is currently doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mindstate {
    #[default]
    Wandering,
    Hunting,
}

/// AI state carried between turns.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Behavior {
    pub state: Mindstate,
    /// Where the monster is heading: the last known target position while
    /// hunting, a wander destination otherwise.
    pub target: Option<Point>,
    /// Home position a wandering monster returns to, if any.
    pub guard: Option<Point>,
}

/// The action a monster chose for this turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Attack the target standing at the given cell.
    Attack(Point),
    Move(Point),
    Wait,
}

/// A monster on the level.
#[derive(Debug, Clone)]
pub struct Monster {
    pub name: String,
    pub glyph: char,
    pos: Point,
    pub viewer: Viewer,
    pub behavior: Behavior,
}

impl Monster {
    pub fn new(name: impl Into<String>, glyph: char, pos: Point, sight_radius: i32) -> Self {
        Self {
            name: name.into(),
            glyph,
            pos,
            viewer: Viewer::new(sight_radius),
            behavior: Behavior::default(),
        }
    }

    pub fn pos(&self) -> Point {
        self.pos
    }

    pub fn move_to(&mut self, p: Point) {
        if p != self.pos {
            self.pos = p;
            self.viewer.invalidate();
        }
    }

    /// Choose this turn's action against a target at `target`.
    ///
    /// The monster only learns where the target is when the target stands in
    /// its field of view. `occupied` reports cells held by other actors; the
    /// monster never decides to move onto one.
    pub fn decide(
        &mut self,
        grid: &Grid,
        target: Point,
        occupied: impl Fn(Point) -> bool,
        rng: &mut RandomStream,
    ) -> Result<Decision, GridError> {
        let sees = self.viewer.refresh(grid, self.pos)?.contains(target);
        if sees {
            if self.behavior.state != Mindstate::Hunting {
                log::debug!("{} at {} spots its target at {target}", self.name, self.pos);
            }
            self.behavior.state = Mindstate::Hunting;
            self.behavior.target = Some(target);
        }

        match self.behavior.state {
            Mindstate::Hunting => self.hunt(grid, target, sees, &occupied),
            Mindstate::Wandering => self.wander(grid, &occupied, rng),
        }
    }

    fn hunt(
        &mut self,
        grid: &Grid,
        target: Point,
        sees: bool,
        occupied: &impl Fn(Point) -> bool,
    ) -> Result<Decision, GridError> {
        if sees && can_step(grid, self.pos, target) {
            return Ok(Decision::Attack(target));
        }
        let Some(goal) = self.behavior.target else {
            self.lose_track();
            return Ok(Decision::Wait);
        };
        if goal == self.pos {
            // Reached the last known position without finding anything.
            self.lose_track();
            return Ok(Decision::Wait);
        }
        let crowded = |p: Point| p != goal && occupied(p);
        let costs = |p: Point, c: Cell| {
            c.cost()
                .map(|m| if crowded(p) { m + CROWD_COST } else { m })
        };
        match find_path_with(grid, self.pos, goal, &PathOptions::default(), &costs)? {
            PathOutcome::Found(path) => match path.next_step() {
                Some(next) if !occupied(next) => Ok(Decision::Move(next)),
                _ => Ok(Decision::Wait),
            },
            PathOutcome::Unreachable => {
                self.lose_track();
                Ok(Decision::Wait)
            }
        }
    }

    fn lose_track(&mut self) {
        log::debug!("{} at {} loses track of its target", self.name, self.pos);
        self.behavior.state = Mindstate::Wandering;
        self.behavior.target = None;
    }

    /// Drift toward the guard post, the current destination, or a fresh
    /// random one, greedily along the axes.
    fn wander(
        &mut self,
        grid: &Grid,
        occupied: &impl Fn(Point) -> bool,
        rng: &mut RandomStream,
    ) -> Result<Decision, GridError> {
        let dest = match self.behavior.guard.or(self.behavior.target) {
            Some(p) => p,
            None => match random_walkable(grid, rng) {
                Some(p) => p,
                None => return Ok(Decision::Wait),
            },
        };
        self.behavior.target = Some(dest);
        if dest == self.pos {
            self.behavior.target = None;
            return Ok(Decision::Wait);
        }

        let dx = (dest.x - self.pos.x).signum();
        let dy = (dest.y - self.pos.y).signum();
        let candidates = if rng.chance(0.5) {
            [Point::new(dx, 0), Point::new(0, dy)]
        } else {
            [Point::new(0, dy), Point::new(dx, 0)]
        };
        let step = candidates
            .into_iter()
            .filter(|d| *d != Point::new(0, 0))
            .map(|d| self.pos + d)
            .find(|&np| grid.is_walkable(np) && !occupied(np));

        match step {
            Some(np) => {
                if np == dest {
                    self.behavior.target = None;
                }
                Ok(Decision::Move(np))
            }
            None => {
                // Stuck against terrain: pick somewhere else next turn.
                self.behavior.target = None;
                Ok(Decision::Wait)
            }
        }
    }
}

fn random_walkable(grid: &Grid, rng: &mut RandomStream) -> Option<Point> {
    (0..WANDER_TRIES)
        .map(|_| {
            Point::new(
                rng.next_int(0, grid.width() - 1),
                rng.next_int(0, grid.height() - 1),
            )
        })
        .find(|&p| grid.is_walkable(p))
}

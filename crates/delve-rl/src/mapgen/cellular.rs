//! Cellular automaton used for caves and terrain overlays.

use delve_core::{Point, Range};

use crate::rng::RandomStream;

/// A boolean layer over a `width × height` area, `true` meaning solid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SolidMask {
    width: i32,
    height: i32,
    cells: Vec<bool>,
}

impl SolidMask {
    pub fn bounds(&self) -> Range {
        Range::new(0, 0, self.width, self.height)
    }

    fn idx(&self, p: Point) -> usize {
        (p.y * self.width + p.x) as usize
    }

    /// Whether `p` is solid. Outside the area everything is solid.
    pub fn at(&self, p: Point) -> bool {
        if !self.bounds().contains(p) {
            return true;
        }
        self.cells[self.idx(p)]
    }

    pub fn set(&mut self, p: Point, solid: bool) {
        if self.bounds().contains(p) {
            let i = self.idx(p);
            self.cells[i] = solid;
        }
    }

    /// Number of open cells.
    pub fn open_count(&self) -> usize {
        self.cells.iter().filter(|&&s| !s).count()
    }

    /// Force the outermost ring solid.
    pub fn solidify_border(&mut self) {
        for p in self.bounds().iter() {
            if p.x == 0 || p.y == 0 || p.x == self.width - 1 || p.y == self.height - 1 {
                let i = self.idx(p);
                self.cells[i] = true;
            }
        }
    }

    /// Solid cells among the 8 neighbours of `p`, out-of-area ones included.
    fn solid_neighbors(&self, p: Point) -> usize {
        p.neighbors_8().into_iter().filter(|&n| self.at(n)).count()
    }
}

/// Random fill followed by majority-vote smoothing passes.
///
/// A cell with more than 4 solid neighbours becomes solid, one with fewer
/// than 4 becomes open, and one with exactly 4 keeps its state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Automaton {
    /// Chance for each cell to start solid.
    pub fill: f64,
    pub passes: usize,
}

impl Automaton {
    pub fn run(&self, rng: &mut RandomStream, width: i32, height: i32) -> SolidMask {
        let w = width.max(0);
        let h = height.max(0);
        let mut mask = SolidMask {
            width: w,
            height: h,
            cells: Vec::with_capacity((w * h) as usize),
        };

        // Row-major, one draw per cell.
        for _ in 0..w * h {
            let solid = rng.chance(self.fill);
            mask.cells.push(solid);
        }

        let mut scratch = mask.cells.clone();
        for _ in 0..self.passes {
            for p in mask.bounds().iter() {
                let i = mask.idx(p);
                scratch[i] = match mask.solid_neighbors(p) {
                    n if n > 4 => true,
                    n if n < 4 => false,
                    _ => mask.cells[i],
                };
            }
            std::mem::swap(&mut mask.cells, &mut scratch);
        }

        mask
    }
}

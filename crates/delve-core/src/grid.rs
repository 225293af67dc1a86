//! The [`Grid`] type: a fixed-size 2D array of [`Cell`]s for one level.
//!
//! A grid owns its cells outright. Dimensions are fixed at construction;
//! cell contents change only through `&mut self` methods, so a query that
//! borrows `&Grid` can never observe a mutation in flight. Every mutation
//! bumps [`revision`](Grid::revision), which cached query results compare
//! against to detect staleness.

use std::fmt;
use std::hash::{Hash, Hasher};

use crate::cell::Cell;
use crate::error::GridError;
use crate::geom::{Point, Range};
use crate::terrain::Terrain;

/// A 2D grid of [`Cell`]s addressed by `(x, y)` in `[0,width) × [0,height)`.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "RawGrid"))]
pub struct Grid {
    cells: Vec<Cell>,
    width: i32,
    height: i32,
    #[cfg_attr(feature = "serde", serde(skip))]
    revision: u64,
}

impl Grid {
    /// Create a new grid of the given dimensions filled with `fill`.
    pub fn new(width: i32, height: i32, fill: Terrain) -> Result<Self, GridError> {
        if width <= 0 || height <= 0 {
            return Err(GridError::InvalidDimensions {
                width,
                height,
                min: 1,
            });
        }
        Ok(Self {
            cells: vec![Cell::new(fill); (width as usize) * (height as usize)],
            width,
            height,
            revision: 0,
        })
    }

    /// Parse a grid from rows of terrain glyphs (see [`Terrain::glyph`]).
    ///
    /// Leading/trailing whitespace of the whole string and of each line is
    /// ignored; all rows must have the same width.
    pub fn from_ascii(s: &str) -> Result<Self, GridError> {
        let rows: Vec<&str> = s
            .trim()
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .collect();
        let height = rows.len() as i32;
        let width = rows.first().map_or(0, |r| r.chars().count()) as i32;
        let mut grid = Self::new(width, height, Terrain::Floor)?;
        for (y, row) in rows.iter().enumerate() {
            if row.chars().count() as i32 != width {
                return Err(GridError::InvalidLayout(format!(
                    "row {y} has {} cells, expected {width}",
                    row.chars().count()
                )));
            }
            for (x, ch) in row.chars().enumerate() {
                let t = Terrain::from_glyph(ch).ok_or_else(|| {
                    GridError::InvalidLayout(format!("unknown glyph {ch:?} at ({x}, {y})"))
                })?;
                let i = grid.index(Point::new(x as i32, y as i32));
                grid.cells[i] = Cell::new(t);
            }
        }
        Ok(grid)
    }

    /// The bounding range `[0,width) × [0,height)`.
    #[inline]
    pub fn bounds(&self) -> Range {
        Range::new(0, 0, self.width, self.height)
    }

    /// Size of the grid as a `Point`.
    #[inline]
    pub fn size(&self) -> Point {
        Point::new(self.width, self.height)
    }

    #[inline]
    pub fn width(&self) -> i32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> i32 {
        self.height
    }

    /// Number of mutations applied since construction.
    #[inline]
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Whether `p` is inside the grid.
    #[inline]
    pub fn contains(&self, p: Point) -> bool {
        p.x >= 0 && p.y >= 0 && p.x < self.width && p.y < self.height
    }

    /// Return `Ok(())` if `p` is inside the grid, the matching
    /// [`GridError::OutOfBounds`] otherwise.
    pub fn check(&self, p: Point) -> Result<(), GridError> {
        if self.contains(p) {
            Ok(())
        } else {
            Err(GridError::OutOfBounds {
                point: p,
                width: self.width,
                height: self.height,
            })
        }
    }

    #[inline]
    fn index(&self, p: Point) -> usize {
        (p.y as usize) * (self.width as usize) + (p.x as usize)
    }

    /// Read the cell at `p`, or `None` if out of bounds.
    #[inline]
    pub fn at(&self, p: Point) -> Option<Cell> {
        if !self.contains(p) {
            return None;
        }
        Some(self.cells[self.index(p)])
    }

    /// Read the terrain at `p`, or `None` if out of bounds.
    #[inline]
    pub fn terrain(&self, p: Point) -> Option<Terrain> {
        self.at(p).map(|c| c.terrain)
    }

    /// Checked read of the cell at `p`.
    pub fn get(&self, p: Point) -> Result<Cell, GridError> {
        self.check(p)?;
        Ok(self.cells[self.index(p)])
    }

    /// Checked write of the terrain at `p`.
    pub fn set(&mut self, p: Point, terrain: Terrain) -> Result<(), GridError> {
        self.check(p)?;
        let i = self.index(p);
        self.cells[i] = Cell::new(terrain);
        self.revision += 1;
        Ok(())
    }

    /// Whether `p` blocks movement. Out-of-bounds points block.
    #[inline]
    pub fn is_blocking(&self, p: Point) -> bool {
        self.at(p).is_none_or(Cell::blocking)
    }

    /// Whether `p` blocks sight. Out-of-bounds points are opaque.
    #[inline]
    pub fn is_opaque(&self, p: Point) -> bool {
        self.at(p).is_none_or(Cell::opaque)
    }

    /// Whether `p` is inside the grid and walkable.
    #[inline]
    pub fn is_walkable(&self, p: Point) -> bool {
        !self.is_blocking(p)
    }

    /// Fill every cell with `terrain`.
    pub fn fill(&mut self, terrain: Terrain) {
        self.cells.fill(Cell::new(terrain));
        self.revision += 1;
    }

    /// Fill the part of `r` that lies inside the grid with `terrain`.
    pub fn fill_range(&mut self, r: Range, terrain: Terrain) {
        for p in r.intersect(self.bounds()).iter() {
            let i = self.index(p);
            self.cells[i] = Cell::new(terrain);
        }
        self.revision += 1;
    }

    /// Apply a transformation to every cell.
    pub fn map_cells(&mut self, mut f: impl FnMut(Point, Cell) -> Cell) {
        for p in self.bounds().iter() {
            let i = self.index(p);
            self.cells[i] = f(p, self.cells[i]);
        }
        self.revision += 1;
    }

    /// Count how many cells have the given terrain.
    pub fn count(&self, terrain: Terrain) -> usize {
        self.cells.iter().filter(|c| c.terrain == terrain).count()
    }

    /// Count how many cells satisfy a predicate.
    pub fn count_fn(&self, mut f: impl FnMut(Point, Cell) -> bool) -> usize {
        self.iter().filter(|&(p, c)| f(p, c)).count()
    }

    /// Row-major iterator over `(Point, Cell)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (Point, Cell)> + '_ {
        self.bounds().iter().map(|p| (p, self.cells[self.index(p)]))
    }

    /// Row-major iterator over the walkable points.
    pub fn walkable_points(&self) -> impl Iterator<Item = Point> + '_ {
        self.iter().filter(|(_, c)| !c.blocking()).map(|(p, _)| p)
    }

    /// Render the grid as rows of terrain glyphs.
    pub fn to_ascii(&self) -> String {
        let mut s = String::with_capacity(self.cells.len() + self.height as usize);
        for y in 0..self.height {
            for x in 0..self.width {
                s.push(self.cells[self.index(Point::new(x, y))].glyph());
            }
            s.push('\n');
        }
        s
    }
}

impl PartialEq for Grid {
    /// Grids are equal when they have the same size and cells; the
    /// revision counter is bookkeeping and does not take part.
    fn eq(&self, other: &Self) -> bool {
        self.width == other.width && self.height == other.height && self.cells == other.cells
    }
}

impl Eq for Grid {}

impl Hash for Grid {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.width.hash(state);
        self.height.hash(state);
        self.cells.hash(state);
    }
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_ascii())
    }
}

/// Unchecked wire form of a [`Grid`].
#[cfg(feature = "serde")]
#[derive(serde::Deserialize)]
struct RawGrid {
    cells: Vec<Cell>,
    width: i32,
    height: i32,
}

#[cfg(feature = "serde")]
impl TryFrom<RawGrid> for Grid {
    type Error = GridError;

    fn try_from(raw: RawGrid) -> Result<Self, GridError> {
        let (width, height) = (raw.width, raw.height);
        if width <= 0 || height <= 0 {
            return Err(GridError::InvalidDimensions {
                width,
                height,
                min: 1,
            });
        }
        if (width as usize).checked_mul(height as usize) != Some(raw.cells.len()) {
            return Err(GridError::InvalidLayout(format!(
                "{} cells for a {width}x{height} grid",
                raw.cells.len()
            )));
        }
        Ok(Self {
            cells: raw.cells,
            width,
            height,
            revision: 0,
        })
    }
}

// ---------------------------------------------------------------------------
// Adjacency
// ---------------------------------------------------------------------------

/// The walkable 4-adjacent neighbours of `p`, north first, clockwise.
pub fn walkable_neighbors(grid: &Grid, p: Point) -> impl Iterator<Item = Point> + '_ {
    p.neighbors_4().into_iter().filter(|&n| grid.is_walkable(n))
}

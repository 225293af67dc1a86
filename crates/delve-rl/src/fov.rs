//! Field of vision by symmetric shadow casting.
//!
//! Iterative SSC based on Albert Ford's algorithm: the four quadrants around
//! the origin are scanned row by row with rational slopes, so the result is
//! exact and symmetric. Opaque cells are revealed but shadow what lies
//! behind them.
//!
//! The cast runs over a square clipped to the grid, then the result is
//! trimmed to the configured [`FovMetric`]. All scratch state lives in a
//! per-call arena, so concurrent queries on a shared `&Grid` never interfere.

use delve_core::{Grid, GridError, Point, Range};

/// Distance metric bounding the visible area.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FovMetric {
    /// Disk: `dx² + dy² <= r²`.
    #[default]
    Euclidean,
    /// Square: `max(|dx|, |dy|) <= r`.
    Chebyshev,
}

/// Options for [`compute_visible_with`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct FovOptions {
    pub metric: FovMetric,
    /// Whether light slips between two diagonally touching opaque cells.
    pub diagonal_gaps: bool,
}

/// The cells visible from an origin, sorted in row-major order.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VisibilitySet {
    origin: Point,
    radius: i32,
    revision: u64,
    cells: Vec<Point>,
}

impl VisibilitySet {
    pub fn origin(&self) -> Point {
        self.origin
    }

    pub fn radius(&self) -> i32 {
        self.radius
    }

    /// Grid revision the set was computed against.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    #[inline]
    pub fn contains(&self, p: Point) -> bool {
        self.cells.binary_search(&p).is_ok()
    }

    pub fn cells(&self) -> &[Point] {
        &self.cells
    }

    pub fn iter(&self) -> impl Iterator<Item = Point> + '_ {
        self.cells.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Whether `grid` changed since this set was computed.
    pub fn is_stale(&self, grid: &Grid) -> bool {
        grid.revision() != self.revision
    }
}

/// Cells visible from `origin` within `radius` (Euclidean disk).
pub fn compute_visible(
    grid: &Grid,
    origin: Point,
    radius: i32,
) -> Result<VisibilitySet, GridError> {
    compute_visible_with(grid, origin, radius, &FovOptions::default())
}

/// Cells visible from `origin` within `radius` under `opts`.
///
/// Errors if `origin` is outside the grid, `radius` is not positive, or the
/// origin cell blocks movement.
pub fn compute_visible_with(
    grid: &Grid,
    origin: Point,
    radius: i32,
    opts: &FovOptions,
) -> Result<VisibilitySet, GridError> {
    grid.check(origin)?;
    if radius <= 0 {
        return Err(GridError::InvalidRadius(radius));
    }
    if grid.is_blocking(origin) {
        return Err(GridError::BlockedOrigin(origin));
    }

    // Nothing lies farther than the longer grid side.
    let depth = radius.min(grid.width().max(grid.height()));
    let mut caster = Caster::new(grid.bounds());
    caster.cast(origin, depth, &|p| !grid.is_opaque(p), opts.diagonal_gaps);

    let mut cells = caster.visibles;
    if opts.metric == FovMetric::Euclidean {
        let r_sq = i64::from(radius) * i64::from(radius);
        cells.retain(|&p| {
            let dx = i64::from(p.x - origin.x);
            let dy = i64::from(p.y - origin.y);
            dx * dx + dy * dy <= r_sq
        });
    }
    cells.sort_unstable();

    Ok(VisibilitySet {
        origin,
        radius,
        revision: grid.revision(),
        cells,
    })
}

// ── Shadow casting ────────────────────────────────────────────────

/// Per-call arena for one cast.
struct Caster {
    range: Range,
    seen: Vec<bool>,
    visibles: Vec<Point>,
    tiles_buf: Vec<Point>,
}

impl Caster {
    fn new(range: Range) -> Self {
        Self {
            range,
            seen: vec![false; range.len()],
            visibles: Vec::new(),
            tiles_buf: Vec::new(),
        }
    }

    fn idx(&self, p: Point) -> usize {
        let w = self.range.width();
        ((p.y - self.range.min.y) * w + (p.x - self.range.min.x)) as usize
    }

    fn cast(&mut self, src: Point, max_depth: i32, passable: &impl Fn(Point) -> bool, diags: bool) {
        self.reveal_point(src);
        for dir in 0..4 {
            self.cast_quadrant(src, max_depth, QuadDir(dir), passable, diags);
        }
    }

    fn reveal_point(&mut self, p: Point) {
        let idx = self.idx(p);
        if !self.seen[idx] {
            self.seen[idx] = true;
            self.visibles.push(p);
        }
    }

    fn cast_quadrant(
        &mut self,
        src: Point,
        max_depth: i32,
        dir: QuadDir,
        passable: &impl Fn(Point) -> bool,
        diags: bool,
    ) {
        let qt = Quadrant { dir, p: src };
        let (colmin, colmax) = qt.max_cols(self.range);
        let dmax = qt.max_depth(self.range).min(max_depth);
        if dmax <= 0 {
            return;
        }

        let open = |tile: Point| passable(qt.transform(tile));
        let unreachable = dmax + 1;
        let mut rows: Vec<SscRow> = vec![SscRow {
            depth: 1,
            slope_start: Point::new(-1, 1),
            slope_end: Point::new(1, 1),
        }];

        while let Some(mut r) = rows.pop() {
            let mut ptile = Point::new(unreachable, 0);
            self.tiles_buf.clear();
            r.tiles(&mut self.tiles_buf, colmin, colmax);
            for ti in 0..self.tiles_buf.len() {
                let tile = self.tiles_buf[ti];
                let wall = !open(tile);
                if (wall || r.is_symmetric(tile))
                    && (diags
                        || (tile.x <= 1 && tile.y == 0)
                        || (tile.x > 1 && open(tile.shift(-1, 0)))
                        || (tile.y >= 0 && open(tile.shift(0, -1)))
                        || (tile.y <= 0 && open(tile.shift(0, 1))))
                {
                    self.reveal_point(qt.transform(tile));
                }
                if ptile.x == unreachable {
                    ptile = tile;
                    continue;
                }
                let pwall = !open(ptile);
                if pwall && !wall {
                    // Wall to floor: narrow the running start slope.
                    r.slope_start = if diags {
                        slope_diamond(tile)
                    } else if tile.x < dmax && !open(tile.shift(1, 0)) {
                        slope_square(tile.shift(1, 0))
                    } else if tile.x > 1 && !open(tile.shift(-1, 0)) {
                        slope_diamond(tile.shift(-1, 1))
                    } else {
                        slope_diamond(tile)
                    };
                }
                if !pwall && wall {
                    // Floor to wall: the floor segment just passed continues
                    // one row deeper.
                    let mut nr = r.next();
                    nr.slope_end = if diags {
                        slope_diamond(tile)
                    } else if tile.x < dmax && !open(ptile.shift(1, 0)) {
                        slope_square(tile.shift(1, 0))
                    } else if ptile.x > 1 && !open(ptile.shift(-1, 0)) {
                        slope_diamond(ptile.shift(-1, 0))
                    } else {
                        slope_diamond(tile)
                    };
                    if nr.depth <= dmax {
                        rows.push(nr);
                    }
                }
                ptile = tile;
            }
            if ptile.x == unreachable {
                continue;
            }
            if open(ptile) && r.depth < dmax {
                rows.push(r.next());
            }
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct QuadDir(i32);

/// Maps quadrant-local `(depth, col)` tiles to grid points.
#[derive(Debug, Clone, Copy)]
struct Quadrant {
    dir: QuadDir,
    p: Point,
}

impl Quadrant {
    fn transform(&self, tile: Point) -> Point {
        match self.dir.0 {
            0 => Point::new(self.p.x + tile.y, self.p.y - tile.x), // north
            1 => Point::new(self.p.x + tile.x, self.p.y + tile.y), // east
            2 => Point::new(self.p.x + tile.y, self.p.y + tile.x), // south
            _ => Point::new(self.p.x - tile.x, self.p.y + tile.y), // west
        }
    }

    fn max_cols(&self, rg: Range) -> (i32, i32) {
        match self.dir.0 {
            0 | 2 => (rg.min.x - self.p.x, rg.max.x - self.p.x - 1),
            _ => (rg.min.y - self.p.y, rg.max.y - self.p.y - 1),
        }
    }

    fn max_depth(&self, rg: Range) -> i32 {
        match self.dir.0 {
            0 => self.p.y - rg.min.y,
            1 => rg.max.x - self.p.x - 1,
            2 => rg.max.y - self.p.y - 1,
            _ => self.p.x - rg.min.x,
        }
    }
}

/// One row of a quadrant scan. Slopes are fractions `(num, den)`.
#[derive(Debug, Clone, Copy)]
struct SscRow {
    depth: i32,
    slope_start: Point,
    slope_end: Point,
}

impl SscRow {
    fn tiles(&self, ts: &mut Vec<Point>, colmin: i32, colmax: i32) {
        let min = round_ties_up(self.depth * self.slope_start.x, self.slope_start.y).max(colmin);
        let max = round_ties_down(self.depth * self.slope_end.x, self.slope_end.y).min(colmax);
        for col in min..=max {
            ts.push(Point::new(self.depth, col));
        }
    }

    fn next(self) -> SscRow {
        SscRow {
            depth: self.depth + 1,
            ..self
        }
    }

    fn is_symmetric(&self, tile: Point) -> bool {
        let col = tile.y;
        col * self.slope_start.y >= self.depth * self.slope_start.x
            && col * self.slope_end.y <= self.depth * self.slope_end.x
    }
}

/// `n / d` rounded to the nearest integer, halves toward +∞. `d > 0`.
fn round_ties_up(n: i32, d: i32) -> i32 {
    let (div, rem) = (n / d, n % d);
    match rem.signum() {
        1 if 2 * rem >= d => div + 1,
        -1 if -2 * rem > d => div - 1,
        _ => div,
    }
}

/// `n / d` rounded to the nearest integer, halves toward −∞. `d > 0`.
fn round_ties_down(n: i32, d: i32) -> i32 {
    let (div, rem) = (n / d, n % d);
    match rem.signum() {
        1 if 2 * rem > d => div + 1,
        -1 if -2 * rem >= d => div - 1,
        _ => div,
    }
}

fn slope_diamond(tile: Point) -> Point {
    Point::new(2 * tile.y - 1, 2 * tile.x)
}

fn slope_square(tile: Point) -> Point {
    Point::new(2 * tile.y - 1, 2 * tile.x + 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use delve_core::Terrain;

    fn open(w: i32, h: i32) -> Grid {
        Grid::new(w, h, Terrain::Floor).unwrap()
    }

    #[test]
    fn open_field_is_euclidean_disk() {
        let g = open(21, 21);
        let origin = Point::new(10, 10);
        let vs = compute_visible(&g, origin, 5).unwrap();
        assert_eq!(vs.len(), 81);
        for p in vs.iter() {
            let d = p - origin;
            assert!(d.x * d.x + d.y * d.y <= 25);
        }
        assert!(vs.contains(Point::new(15, 10)));
        assert!(vs.contains(Point::new(13, 14)));
        assert!(!vs.contains(Point::new(14, 14)));
    }

    #[test]
    fn chebyshev_metric_is_square() {
        let g = open(21, 21);
        let opts = FovOptions {
            metric: FovMetric::Chebyshev,
            ..FovOptions::default()
        };
        let vs = compute_visible_with(&g, Point::new(10, 10), 3, &opts).unwrap();
        assert_eq!(vs.len(), 49);
        assert!(vs.contains(Point::new(13, 13)));
    }

    #[test]
    fn huge_radius_sees_whole_open_grid() {
        let g = open(9, 9);
        let vs = compute_visible(&g, Point::new(4, 4), i32::MAX).unwrap();
        assert_eq!(vs.len(), 81);
        assert_eq!(vs.radius(), i32::MAX);
    }

    #[test]
    fn origin_always_included_and_sorted() {
        let g = open(7, 7);
        let vs = compute_visible(&g, Point::new(3, 3), 1).unwrap();
        assert!(vs.contains(Point::new(3, 3)));
        assert_eq!(vs.len(), 5);
        assert!(vs.cells().windows(2).all(|w| w[0] < w[1]));
        assert_eq!(vs.origin(), Point::new(3, 3));
        assert_eq!(vs.radius(), 1);
    }

    #[test]
    fn wall_is_seen_but_shadows() {
        let mut g = open(11, 11);
        g.set(Point::new(6, 5), Terrain::Wall).unwrap();
        let vs = compute_visible(&g, Point::new(5, 5), 5).unwrap();
        assert!(vs.contains(Point::new(6, 5)));
        assert!(!vs.contains(Point::new(7, 5)));
        assert!(!vs.contains(Point::new(8, 5)));
    }

    #[test]
    fn enclosed_cell_is_invisible() {
        let g = Grid::from_ascii(
            "
            .........
            .........
            .....###.
            .....#.#.
            .....###.
            .........
            ",
        )
        .unwrap();
        let vs = compute_visible(&g, Point::new(1, 3), 8).unwrap();
        assert!(!vs.contains(Point::new(6, 3)));
        assert!(vs.contains(Point::new(5, 3)));
    }

    #[test]
    fn vegetation_blocks_sight_not_movement() {
        let g = Grid::from_ascii(
            r#"
            .......
            ..."...
            .......
            "#,
        )
        .unwrap();
        let vs = compute_visible(&g, Point::new(1, 1), 6).unwrap();
        assert!(vs.contains(Point::new(3, 1)));
        assert!(!vs.contains(Point::new(5, 1)));
    }

    #[test]
    fn symmetric_between_two_points() {
        let mut g = open(20, 20);
        g.set(Point::new(8, 10), Terrain::Wall).unwrap();
        g.set(Point::new(9, 12), Terrain::Wall).unwrap();
        let opts = FovOptions {
            diagonal_gaps: true,
            ..FovOptions::default()
        };
        let a = Point::new(10, 10);
        for b in [Point::new(6, 10), Point::new(5, 13), Point::new(7, 14), Point::new(12, 4)] {
            let a_sees_b = compute_visible_with(&g, a, 10, &opts).unwrap().contains(b);
            let b_sees_a = compute_visible_with(&g, b, 10, &opts).unwrap().contains(a);
            assert_eq!(a_sees_b, b_sees_a, "{a} vs {b}");
        }
    }

    #[test]
    fn corner_origin_stays_in_bounds() {
        let g = open(6, 4);
        let vs = compute_visible(&g, Point::new(0, 0), 10).unwrap();
        assert_eq!(vs.len(), 24);
        assert!(vs.iter().all(|p| g.contains(p)));
    }

    #[test]
    fn diagonal_gap_option() {
        // Two opaque cells touching at a corner, origin looking through it.
        let g = Grid::from_ascii(
            "
            .....
            ..#..
            .#...
            .....
            ",
        )
        .unwrap();
        let through = Point::new(2, 2);
        let closed = compute_visible(&g, Point::new(0, 0), 4).unwrap();
        assert!(!closed.contains(through));
        let opts = FovOptions {
            diagonal_gaps: true,
            ..FovOptions::default()
        };
        let gaps = compute_visible_with(&g, Point::new(0, 0), 4, &opts).unwrap();
        assert!(gaps.contains(through));
    }

    #[test]
    fn errors() {
        let mut g = open(5, 5);
        assert!(matches!(
            compute_visible(&g, Point::new(5, 0), 3),
            Err(GridError::OutOfBounds { .. })
        ));
        assert_eq!(compute_visible(&g, Point::new(1, 1), 0), Err(GridError::InvalidRadius(0)));
        g.set(Point::new(2, 2), Terrain::Tree).unwrap();
        assert_eq!(
            compute_visible(&g, Point::new(2, 2), 3),
            Err(GridError::BlockedOrigin(Point::new(2, 2)))
        );
    }

    #[test]
    fn staleness_follows_revision() {
        let mut g = open(5, 5);
        let vs = compute_visible(&g, Point::new(2, 2), 2).unwrap();
        assert!(!vs.is_stale(&g));
        g.set(Point::new(0, 0), Terrain::Wall).unwrap();
        assert!(vs.is_stale(&g));
    }
}

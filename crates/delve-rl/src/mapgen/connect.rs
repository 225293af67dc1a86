//! Connectivity checks and repair for generated grids.
//!
//! Connectivity is always 4-adjacent over non-blocking cells: that is the
//! weakest movement model, so a grid connected here is connected for every
//! pathfinder setting.

use delve_core::{Grid, GridError, Point, Range, Terrain};
use delve_paths::{Pather, UNREACHABLE, WalkablePather, bfs_map, components, flood};

/// Whether every non-blocking cell can be reached from `from`.
///
/// A blocking `from` only counts as connected on a grid without any
/// non-blocking cell.
pub fn is_fully_connected(grid: &Grid, from: Point) -> bool {
    let walkable = grid.count_fn(|_, c| !c.blocking());
    if grid.is_blocking(from) {
        return walkable == 0;
    }
    flood(grid.bounds(), &WalkablePather::new(grid), from).len() == walkable
}

/// Set every non-blocking cell unreachable from `from` to `fill`.
///
/// Returns the number of cells filled.
pub fn prune_unreachable(grid: &mut Grid, from: Point, fill: Terrain) -> Result<usize, GridError> {
    grid.check(from)?;
    if grid.is_blocking(from) {
        return Err(GridError::BlockedOrigin(from));
    }
    let reached = flood(grid.bounds(), &WalkablePather::new(grid), from);
    let mut keep = vec![false; grid.bounds().len()];
    let w = grid.width();
    for p in reached {
        keep[(p.y * w + p.x) as usize] = true;
    }
    let pruned: Vec<Point> = grid
        .iter()
        .filter(|&(p, c)| !c.blocking() && !keep[(p.y * w + p.x) as usize])
        .map(|(p, _)| p)
        .collect();
    for &p in &pruned {
        grid.set(p, fill)?;
    }
    if !pruned.is_empty() {
        log::debug!("pruned {} unreachable cells", pruned.len());
    }
    Ok(pruned.len())
}

/// Join every region of non-blocking cells to the one holding `anchor` by
/// carving shortest corridors of `carve` terrain through the interior.
///
/// The outermost ring of the grid is never carved. Returns the number of
/// corridors carved.
pub fn connect_regions(grid: &mut Grid, anchor: Point, carve: Terrain) -> Result<usize, GridError> {
    grid.check(anchor)?;
    if grid.is_blocking(anchor) {
        return Err(GridError::BlockedOrigin(anchor));
    }
    if carve.blocking() {
        return Err(GridError::InvalidParams(format!("cannot carve with {carve}")));
    }

    let cc = {
        let pather = WalkablePather::new(grid);
        components(grid.bounds(), &pather, |p| grid.is_walkable(p))
    };
    let Some(main_label) = cc.label(anchor) else {
        return Ok(0);
    };

    let interior = grid.bounds().expand(-1);
    let mut carved = 0;
    for label in 0..cc.count() {
        if label == main_label {
            continue;
        }
        let region = cc.members(label);
        // An earlier corridor may already have reached this region.
        let joined = flood(grid.bounds(), &WalkablePather::new(grid), anchor);
        if region.first().is_some_and(|p| joined.contains(p)) {
            continue;
        }
        let mut main = vec![false; grid.bounds().len()];
        let w = grid.width();
        for p in &joined {
            main[(p.y * w + p.x) as usize] = true;
        }
        if carve_corridor(grid, interior, &region, |p| main[(p.y * w + p.x) as usize], carve)? {
            carved += 1;
        }
    }
    if carved > 0 {
        log::debug!("carved {carved} corridors to join {} regions", cc.count());
    }
    Ok(carved)
}

/// 4-connected pather over every cell of a range, whatever its terrain.
struct Interior(Range);

impl Pather for Interior {
    fn neighbors(&self, p: Point, buf: &mut Vec<Point>) {
        buf.extend(p.neighbors_4().into_iter().filter(|&n| self.0.contains(n)));
    }
}

/// Carve the shortest corridor from `sources` to the nearest cell accepted
/// by `target`. Returns `false` if no such cell lies in `area`.
fn carve_corridor(
    grid: &mut Grid,
    area: Range,
    sources: &[Point],
    target: impl Fn(Point) -> bool,
    carve: Terrain,
) -> Result<bool, GridError> {
    let starts: Vec<Point> = sources.iter().copied().filter(|&p| area.contains(p)).collect();
    let dm = bfs_map(area, &Interior(area), &starts, i32::MAX);
    // Nodes come in discovery order, so the first hit is a nearest one.
    let Some(hit) = dm.nodes().iter().find(|n| target(n.pos)) else {
        return Ok(false);
    };

    // Walk back downhill to a source.
    let mut p = hit.pos;
    let mut d = hit.cost;
    while d > 0 {
        if grid.is_blocking(p) {
            grid.set(p, carve)?;
        }
        let Some(prev) = p.neighbors_4().into_iter().find(|&n| dm.at(n) == d - 1) else {
            break;
        };
        p = prev;
        d -= 1;
    }
    debug_assert!(dm.at(p) != UNREACHABLE);
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_caves() -> Grid {
        Grid::from_ascii(
            "
            #########
            #..###..#
            #..###..#
            #########
            ",
        )
        .unwrap()
    }

    #[test]
    fn detects_split() {
        let g = two_caves();
        assert!(!is_fully_connected(&g, Point::new(1, 1)));
        let one = Grid::from_ascii("#...#").unwrap();
        assert!(is_fully_connected(&one, Point::new(2, 0)));
        assert!(!is_fully_connected(&one, Point::new(0, 0)));
    }

    #[test]
    fn connect_carves_shortest_corridor() {
        let mut g = two_caves();
        let before = g.count(Terrain::Wall);
        let n = connect_regions(&mut g, Point::new(1, 1), Terrain::Floor).unwrap();
        assert_eq!(n, 1);
        assert!(is_fully_connected(&g, Point::new(1, 1)));
        assert_eq!(before - g.count(Terrain::Wall), 3);
        // Border untouched.
        assert!((0..9).all(|x| g.terrain(Point::new(x, 0)) == Some(Terrain::Wall)));
    }

    #[test]
    fn prune_fills_unreachable() {
        let mut g = two_caves();
        let n = prune_unreachable(&mut g, Point::new(1, 1), Terrain::Tree).unwrap();
        assert_eq!(n, 4);
        assert_eq!(g.count(Terrain::Tree), 4);
        assert!(is_fully_connected(&g, Point::new(1, 1)));
    }

    #[test]
    fn blocked_anchor_is_error() {
        let mut g = two_caves();
        assert_eq!(
            connect_regions(&mut g, Point::new(0, 0), Terrain::Floor),
            Err(GridError::BlockedOrigin(Point::new(0, 0)))
        );
        assert!(prune_unreachable(&mut g, Point::new(9, 0), Terrain::Tree).is_err());
    }

    #[test]
    fn three_regions_all_joined() {
        let mut g = Grid::from_ascii(
            "
            ###########
            #.##.###..#
            ###########
            #....######
            ###########
            ",
        )
        .unwrap();
        connect_regions(&mut g, Point::new(1, 1), Terrain::Rubble).unwrap();
        assert!(is_fully_connected(&g, Point::new(1, 1)));
        assert!(g.count(Terrain::Rubble) > 0);
    }
}

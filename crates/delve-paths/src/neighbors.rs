use delve_core::Point;

/// Which moves count as adjacent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Connectivity {
    /// Cardinal moves only.
    Four,
    /// Cardinal and diagonal moves. Diagonals never cut a blocked corner.
    #[default]
    Eight,
}

const CARDINALS: [Point; 4] = [
    Point::new(0, -1),
    Point::new(1, 0),
    Point::new(0, 1),
    Point::new(-1, 0),
];

const DIAGONALS: [Point; 4] = [
    Point::new(1, -1),
    Point::new(1, 1),
    Point::new(-1, 1),
    Point::new(-1, -1),
];

/// Append the neighbours of `p` under `conn` for which `keep` holds.
///
/// Cardinals come first (N, E, S, W), then diagonals clockwise from NE. A
/// diagonal is kept only if both cardinal cells it squeezes between are kept
/// too, so walks never cut a blocked corner.
pub fn push_neighbors(
    buf: &mut Vec<Point>,
    conn: Connectivity,
    p: Point,
    keep: impl Fn(Point) -> bool,
) {
    for d in CARDINALS {
        let n = p + d;
        if keep(n) {
            buf.push(n);
        }
    }
    if conn == Connectivity::Four {
        return;
    }
    for d in DIAGONALS {
        let n = p + d;
        if keep(n) && keep(p.shift(d.x, 0)) && keep(p.shift(0, d.y)) {
            buf.push(n);
        }
    }
}

//! Grid coordinates ([`Point`]) and half-open rectangles ([`Range`]).

use std::cmp::Ordering;
use std::fmt;
use std::ops::{Add, AddAssign, Mul, Neg, Sub};

/// A cell coordinate. `x` grows east, `y` grows south.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const ZERO: Self = Self::new(0, 0);
    pub const NORTH: Self = Self::new(0, -1);
    pub const EAST: Self = Self::new(1, 0);
    pub const SOUTH: Self = Self::new(0, 1);
    pub const WEST: Self = Self::new(-1, 0);

    /// Unit steps N, E, S, W.
    pub const CARDINALS: [Self; 4] = [Self::NORTH, Self::EAST, Self::SOUTH, Self::WEST];
    /// Unit steps NE, SE, SW, NW.
    pub const DIAGONALS: [Self; 4] = [
        Self::new(1, -1),
        Self::new(1, 1),
        Self::new(-1, 1),
        Self::new(-1, -1),
    ];

    #[inline]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    #[inline]
    pub const fn shift(self, dx: i32, dy: i32) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }

    /// The four orthogonal neighbours, in [`CARDINALS`](Self::CARDINALS)
    /// order.
    #[inline]
    pub fn neighbors_4(self) -> [Point; 4] {
        Self::CARDINALS.map(|d| self + d)
    }

    /// All eight neighbours: the cardinals, then the diagonals.
    pub fn neighbors_8(self) -> [Point; 8] {
        let [n, e, s, w] = self.neighbors_4();
        let [ne, se, sw, nw] = Self::DIAGONALS.map(|d| self + d);
        [n, e, s, w, ne, se, sw, nw]
    }
}

/// Row-major: `y` first, then `x`.
impl Ord for Point {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.y, self.x).cmp(&(other.y, other.x))
    }
}

impl PartialOrd for Point {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

impl Add for Point {
    type Output = Self;
    #[inline]
    fn add(self, rhs: Self) -> Self {
        self.shift(rhs.x, rhs.y)
    }
}

impl AddAssign for Point {
    #[inline]
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl Sub for Point {
    type Output = Self;
    #[inline]
    fn sub(self, rhs: Self) -> Self {
        self + -rhs
    }
}

impl Neg for Point {
    type Output = Self;
    #[inline]
    fn neg(self) -> Self {
        Self::new(-self.x, -self.y)
    }
}

impl Mul<i32> for Point {
    type Output = Self;
    #[inline]
    fn mul(self, k: i32) -> Self {
        Self::new(self.x * k, self.y * k)
    }
}

/// A half-open rectangle: `min` inclusive, `max` exclusive.
///
/// Grid bounds, rooms and building footprints are all ranges. Every
/// constructor and operation that would yield an empty rectangle yields
/// `Range::default()` instead, so empty ranges compare equal.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Range {
    pub min: Point,
    pub max: Point,
}

impl Range {
    /// Rectangle spanned by two corners, in any order.
    pub fn new(x0: i32, y0: i32, x1: i32, y1: i32) -> Self {
        Self::normalized(
            Point::new(x0.min(x1), y0.min(y1)),
            Point::new(x0.max(x1), y0.max(y1)),
        )
    }

    /// `w × h` rectangle with its top-left corner at `min`.
    pub fn with_size(min: Point, w: i32, h: i32) -> Self {
        Self::new(min.x, min.y, min.x + w, min.y + h)
    }

    fn normalized(min: Point, max: Point) -> Self {
        if min.x >= max.x || min.y >= max.y {
            Self::default()
        } else {
            Self { min, max }
        }
    }

    #[inline]
    pub fn size(self) -> Point {
        self.max - self.min
    }

    #[inline]
    pub fn width(self) -> i32 {
        self.max.x - self.min.x
    }

    #[inline]
    pub fn height(self) -> i32 {
        self.max.y - self.min.y
    }

    /// Middle cell, rounded toward `min` on even sides.
    pub fn center(self) -> Point {
        let half = |len: i32| (len - 1).max(0) / 2;
        self.min.shift(half(self.width()), half(self.height()))
    }

    /// Move the min corner by `(dx0, dy0)` and the max corner by `(dx1, dy1)`.
    pub fn shift(self, dx0: i32, dy0: i32, dx1: i32, dy1: i32) -> Self {
        Self::normalized(self.min.shift(dx0, dy0), self.max.shift(dx1, dy1))
    }

    /// Grow by `n` on every side; negative `n` shrinks.
    pub fn expand(self, n: i32) -> Self {
        self.shift(-n, -n, n, n)
    }

    pub fn len(self) -> usize {
        self.width().max(0) as usize * self.height().max(0) as usize
    }

    pub fn is_empty(self) -> bool {
        self.len() == 0
    }

    #[inline]
    pub fn contains(self, p: Point) -> bool {
        (self.min.x..self.max.x).contains(&p.x) && (self.min.y..self.max.y).contains(&p.y)
    }

    /// Whether `self` lies entirely inside `outer`. The empty range lies
    /// inside everything.
    pub fn in_range(self, outer: Range) -> bool {
        self.intersect(outer) == self
    }

    pub fn intersect(self, other: Range) -> Self {
        Self::normalized(
            Point::new(self.min.x.max(other.min.x), self.min.y.max(other.min.y)),
            Point::new(self.max.x.min(other.max.x), self.max.y.min(other.max.y)),
        )
    }

    pub fn overlaps(self, other: Range) -> bool {
        !self.intersect(other).is_empty()
    }

    /// Every cell, row by row.
    pub fn iter(self) -> Cells {
        Cells {
            range: self,
            next: 0,
            len: self.len(),
        }
    }
}

impl IntoIterator for Range {
    type Item = Point;
    type IntoIter = Cells;

    fn into_iter(self) -> Cells {
        self.iter()
    }
}

impl fmt::Display for Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{} at {}", self.width(), self.height(), self.min)
    }
}

/// Row-major iterator over the cells of a [`Range`].
#[derive(Clone, Debug)]
pub struct Cells {
    range: Range,
    next: usize,
    len: usize,
}

impl Iterator for Cells {
    type Item = Point;

    fn next(&mut self) -> Option<Point> {
        if self.next >= self.len {
            return None;
        }
        let w = self.range.width() as usize;
        let p = self
            .range
            .min
            .shift((self.next % w) as i32, (self.next / w) as i32);
        self.next += 1;
        Some(p)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.len - self.next;
        (n, Some(n))
    }
}

impl ExactSizeIterator for Cells {}

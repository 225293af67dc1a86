use std::cmp::Ordering;

use delve_core::{Point, Range};

/// A position with an associated cost, returned from BFS map queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PathNode {
    pub pos: Point,
    pub cost: i32,
}

/// Sentinel value meaning "unreachable" in BFS distance maps.
pub const UNREACHABLE: i32 = i32::MAX;

// ---------------------------------------------------------------------------
// Internal node for the A* priority-queue search
// ---------------------------------------------------------------------------

#[derive(Clone)]
pub(crate) struct Node {
    pub(crate) g: f64,
    pub(crate) parent: usize,
    pub(crate) seen: bool,
    pub(crate) closed: bool,
}

impl Default for Node {
    fn default() -> Self {
        Self {
            g: f64::INFINITY,
            parent: usize::MAX,
            seen: false,
            closed: false,
        }
    }
}

/// Frontier entry, ordered for use in a max-`BinaryHeap`.
///
/// Pops lowest `f` first; among equal `f`, lowest `h`; among equal `h`, the
/// most recently pushed entry.
#[derive(Clone, Copy)]
pub(crate) struct NodeRef {
    pub(crate) idx: usize,
    pub(crate) f: f64,
    pub(crate) h: f64,
    pub(crate) seq: u64,
}

impl PartialEq for NodeRef {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for NodeRef {}

impl Ord for NodeRef {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .f
            .total_cmp(&self.f)
            .then_with(|| other.h.total_cmp(&self.h))
            .then_with(|| self.seq.cmp(&other.seq))
    }
}

impl PartialOrd for NodeRef {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

// ---------------------------------------------------------------------------
// SearchSpace
// ---------------------------------------------------------------------------

/// Flat indexing over a grid rectangle.
///
/// Every search builds its per-node arrays from a `SearchSpace` at the start
/// of the call and drops them on return, so no visited/cost state survives
/// from one query to the next.
#[derive(Debug, Clone, Copy)]
pub(crate) struct SearchSpace {
    rng: Range,
    width: usize,
}

impl SearchSpace {
    pub(crate) fn new(rng: Range) -> Self {
        Self {
            rng,
            width: rng.width().max(0) as usize,
        }
    }

    /// Number of cells in the space.
    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.rng.len()
    }

    /// Convert a `Point` to a flat index. Returns `None` if out of range.
    #[inline]
    pub(crate) fn idx(&self, p: Point) -> Option<usize> {
        if !self.rng.contains(p) {
            return None;
        }
        let x = (p.x - self.rng.min.x) as usize;
        let y = (p.y - self.rng.min.y) as usize;
        Some(y * self.width + x)
    }

    /// Convert a flat index back to a `Point`.
    #[inline]
    pub(crate) fn point(&self, idx: usize) -> Point {
        let x = (idx % self.width) as i32 + self.rng.min.x;
        let y = (idx / self.width) as i32 + self.rng.min.y;
        Point::new(x, y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BinaryHeap;

    #[test]
    fn idx_round_trips_with_offset_origin() {
        let sp = SearchSpace::new(Range::new(5, 5, 15, 12));
        assert_eq!(sp.len(), 70);
        let p = Point::new(9, 7);
        let i = sp.idx(p).unwrap();
        assert_eq!(sp.point(i), p);
        assert_eq!(sp.idx(Point::new(15, 5)), None);
    }

    #[test]
    fn frontier_pops_low_f_then_low_h_then_newest() {
        let mut heap = BinaryHeap::new();
        heap.push(NodeRef { idx: 0, f: 5.0, h: 2.0, seq: 0 });
        heap.push(NodeRef { idx: 1, f: 4.0, h: 3.0, seq: 1 });
        heap.push(NodeRef { idx: 2, f: 4.0, h: 1.0, seq: 2 });
        heap.push(NodeRef { idx: 3, f: 4.0, h: 1.0, seq: 3 });
        let order: Vec<usize> = std::iter::from_fn(|| heap.pop().map(|n| n.idx)).collect();
        assert_eq!(order, vec![3, 2, 1, 0]);
    }
}

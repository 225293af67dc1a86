use std::collections::VecDeque;

use delve_core::{Point, Range};

use crate::space::{PathNode, SearchSpace, UNREACHABLE};
use crate::traits::Pather;

/// Result of a multi-source breadth-first search.
#[derive(Debug, Clone)]
pub struct DistanceMap {
    space: SearchSpace,
    dist: Vec<i32>,
    reached: Vec<PathNode>,
}

impl DistanceMap {
    /// Distance at `p`, or [`UNREACHABLE`] if `p` is outside the range or
    /// was not reached.
    pub fn at(&self, p: Point) -> i32 {
        match self.space.idx(p) {
            Some(i) => self.dist[i],
            None => UNREACHABLE,
        }
    }

    /// Whether `p` was reached.
    pub fn reached(&self, p: Point) -> bool {
        self.at(p) != UNREACHABLE
    }

    /// All reached nodes in the order they were discovered (non-decreasing
    /// distance).
    pub fn nodes(&self) -> &[PathNode] {
        &self.reached
    }

    /// The last node discovered, i.e. one of the farthest from the sources.
    pub fn farthest(&self) -> Option<PathNode> {
        self.reached.last().copied()
    }
}

/// Compute a multi-source breadth-first search distance map over `rng`.
///
/// Each step has cost 1. Expansion stops when the distance exceeds
/// `max_dist`.
pub fn bfs_map<P: Pather>(rng: Range, pather: &P, sources: &[Point], max_dist: i32) -> DistanceMap {
    let space = SearchSpace::new(rng);
    let mut dist = vec![UNREACHABLE; space.len()];
    let mut reached = Vec::new();
    let mut queue: VecDeque<usize> = VecDeque::new();

    for &src in sources {
        if let Some(si) = space.idx(src) {
            if dist[si] != UNREACHABLE {
                continue;
            }
            dist[si] = 0;
            queue.push_back(si);
            reached.push(PathNode { pos: src, cost: 0 });
        }
    }

    let mut nbuf: Vec<Point> = Vec::with_capacity(8);

    while let Some(ci) = queue.pop_front() {
        let current_dist = dist[ci];
        let cp = space.point(ci);

        nbuf.clear();
        pather.neighbors(cp, &mut nbuf);

        for &np in nbuf.iter() {
            let Some(ni) = space.idx(np) else {
                continue;
            };
            if dist[ni] != UNREACHABLE {
                continue;
            }
            let nd = current_dist + 1;
            if nd > max_dist {
                continue;
            }
            dist[ni] = nd;
            queue.push_back(ni);
            reached.push(PathNode { pos: np, cost: nd });
        }
    }

    DistanceMap {
        space,
        dist,
        reached,
    }
}

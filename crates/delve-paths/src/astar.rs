use std::collections::BinaryHeap;

use delve_core::{Point, Range};

use crate::space::{Node, NodeRef, SearchSpace};
use crate::traits::AstarPather;

/// Compute the cheapest path from `from` to `to` inside `rng` using A*.
///
/// Returns the full path (including both endpoints) with its total cost, or
/// `None` if no path exists within the range. Each cell is expanded at most
/// once; a cheaper route found later only re-queues the cell with its better
/// cost, and stale frontier entries are skipped when popped.
pub fn astar<P: AstarPather>(
    rng: Range,
    pather: &P,
    from: Point,
    to: Point,
) -> Option<(Vec<Point>, f64)> {
    let space = SearchSpace::new(rng);
    let start_idx = space.idx(from)?;
    let goal_idx = space.idx(to)?;

    if start_idx == goal_idx {
        return Some((vec![from], 0.0));
    }

    let mut nodes = vec![Node::default(); space.len()];
    let mut open: BinaryHeap<NodeRef> = BinaryHeap::new();
    let mut seq: u64 = 0;

    {
        let node = &mut nodes[start_idx];
        node.g = 0.0;
        node.seen = true;
    }
    let h0 = pather.estimate(from, to);
    open.push(NodeRef {
        idx: start_idx,
        f: h0,
        h: h0,
        seq,
    });

    let mut nbuf: Vec<Point> = Vec::with_capacity(8);

    let found = 'search: loop {
        let Some(current) = open.pop() else {
            break 'search false;
        };

        let ci = current.idx;

        // Skip stale entries: a cell's best entry always pops first.
        if nodes[ci].closed {
            continue;
        }

        if ci == goal_idx {
            break 'search true;
        }

        nodes[ci].closed = true;
        let current_g = nodes[ci].g;
        let current_point = space.point(ci);

        nbuf.clear();
        pather.neighbors(current_point, &mut nbuf);

        for &np in nbuf.iter() {
            let Some(ni) = space.idx(np) else {
                continue;
            };
            let tentative_g = current_g + pather.cost(current_point, np);

            let n = &mut nodes[ni];
            if n.closed || (n.seen && tentative_g >= n.g) {
                continue;
            }

            n.g = tentative_g;
            n.parent = ci;
            n.seen = true;

            let h = pather.estimate(np, to);
            seq += 1;
            open.push(NodeRef {
                idx: ni,
                f: tentative_g + h,
                h,
                seq,
            });
        }
    };

    if !found {
        return None;
    }

    // Reconstruct path.
    let mut path = Vec::new();
    let mut ci = goal_idx;
    while ci != usize::MAX {
        path.push(space.point(ci));
        ci = nodes[ci].parent;
    }
    path.reverse();
    Some((path, nodes[goal_idx].g))
}

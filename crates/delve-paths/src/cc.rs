//! Connected-component labelling.

use delve_core::{Point, Range};

use crate::space::SearchSpace;
use crate::traits::Pather;

/// Component labels for every cell of a range.
#[derive(Debug, Clone)]
pub struct Components {
    space: SearchSpace,
    labels: Vec<i32>,
    sizes: Vec<usize>,
}

impl Components {
    /// Label of the component containing `p`, or `None` if `p` is outside the
    /// range or was excluded from labelling.
    pub fn label(&self, p: Point) -> Option<usize> {
        let i = self.space.idx(p)?;
        usize::try_from(self.labels[i]).ok()
    }

    /// Number of components found.
    pub fn count(&self) -> usize {
        self.sizes.len()
    }

    /// Cell count of each component, indexed by label.
    pub fn sizes(&self) -> &[usize] {
        &self.sizes
    }

    /// Label of the biggest component. Ties go to the lowest label.
    pub fn largest(&self) -> Option<usize> {
        let mut best: Option<(usize, usize)> = None;
        for (label, &size) in self.sizes.iter().enumerate() {
            if best.is_none_or(|(_, s)| size > s) {
                best = Some((label, size));
            }
        }
        best.map(|(label, _)| label)
    }

    /// Cells carrying `label`, in row-major order.
    pub fn members(&self, label: usize) -> Vec<Point> {
        self.labels
            .iter()
            .enumerate()
            .filter(|&(_, &l)| usize::try_from(l).ok() == Some(label))
            .map(|(i, _)| self.space.point(i))
            .collect()
    }
}

/// Label every cell of `rng` for which `include` holds with a
/// connected-component ID.
///
/// Two cells share a label if there is a walk of neighbours (as defined by
/// `pather`) between them. Labels are handed out in row-major order of each
/// component's first cell.
pub fn components<P: Pather>(
    rng: Range,
    pather: &P,
    include: impl Fn(Point) -> bool,
) -> Components {
    let space = SearchSpace::new(rng);
    let len = space.len();
    let mut labels = vec![-1i32; len];
    let mut sizes = Vec::new();
    let mut stack: Vec<usize> = Vec::new();
    let mut nbuf: Vec<Point> = Vec::with_capacity(8);

    for start in 0..len {
        if labels[start] >= 0 || !include(space.point(start)) {
            continue;
        }

        let label = sizes.len() as i32;
        let mut size = 1;
        labels[start] = label;
        stack.clear();
        stack.push(start);

        // Iterative DFS from `start`.
        while let Some(ci) = stack.pop() {
            nbuf.clear();
            pather.neighbors(space.point(ci), &mut nbuf);
            for &np in nbuf.iter() {
                let Some(ni) = space.idx(np) else {
                    continue;
                };
                if labels[ni] < 0 && include(np) {
                    labels[ni] = label;
                    size += 1;
                    stack.push(ni);
                }
            }
        }

        sizes.push(size);
    }

    Components {
        space,
        labels,
        sizes,
    }
}

/// Flood-fill from `p` and return the connected cells, starting with `p`.
///
/// Returns an empty vector if `p` is outside `rng`.
pub fn flood<P: Pather>(rng: Range, pather: &P, p: Point) -> Vec<Point> {
    let space = SearchSpace::new(rng);
    let mut result = Vec::new();
    let Some(si) = space.idx(p) else {
        return result;
    };

    let mut seen = vec![false; space.len()];
    let mut stack = vec![si];
    let mut nbuf: Vec<Point> = Vec::with_capacity(8);
    seen[si] = true;
    result.push(p);

    while let Some(ci) = stack.pop() {
        nbuf.clear();
        pather.neighbors(space.point(ci), &mut nbuf);
        for &np in nbuf.iter() {
            let Some(ni) = space.idx(np) else {
                continue;
            };
            if !seen[ni] {
                seen[ni] = true;
                result.push(np);
                stack.push(ni);
            }
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 4-connected pather that refuses the column x == 3.
    struct Split(Range);

    impl Split {
        fn open(&self, p: Point) -> bool {
            self.0.contains(p) && p.x != 3
        }
    }

    impl Pather for Split {
        fn neighbors(&self, p: Point, buf: &mut Vec<Point>) {
            buf.extend(p.neighbors_4().into_iter().filter(|&n| self.open(n)));
        }
    }

    #[test]
    fn wall_column_splits_range() {
        let rng = Range::new(0, 0, 8, 4);
        let s = Split(rng);
        let cc = components(rng, &s, |p| s.open(p));
        assert_eq!(cc.count(), 2);
        assert_eq!(cc.sizes(), &[12, 16]);
        assert_eq!(cc.largest(), Some(1));
        assert_eq!(cc.label(Point::new(0, 0)), Some(0));
        assert_eq!(cc.label(Point::new(7, 3)), Some(1));
        assert_eq!(cc.label(Point::new(3, 1)), None);
        assert_eq!(cc.members(0).len(), 12);
    }

    #[test]
    fn flood_stays_on_one_side() {
        let rng = Range::new(0, 0, 8, 4);
        let s = Split(rng);
        let cells = flood(rng, &s, Point::new(5, 2));
        assert_eq!(cells[0], Point::new(5, 2));
        assert_eq!(cells.len(), 16);
        assert!(cells.iter().all(|p| p.x > 3));
        assert!(flood(rng, &s, Point::new(-1, 0)).is_empty());
    }
}

//! Exact bottleneck distance.
//!
//! Points are matched under the L-infinity metric and any point may instead
//! be sent to the diagonal at cost `(death - birth) / 2`. The bottleneck
//! distance is the smallest threshold that admits a perfect matching in the
//! bipartite graph
//!
//! ```text
//! left:  A[0..m]  ++ diag(B)[0..l]
//! right: B[0..l]  ++ diag(A)[0..m]
//! ```
//!
//! so we binary search the sorted candidate costs and test each with
//! Hopcroft-Karp.

use crate::diagram::PersistenceDiagram;
use std::collections::VecDeque;

fn linf(a: (f64, f64), b: (f64, f64)) -> f64 {
    (a.0 - b.0).abs().max((a.1 - b.1).abs())
}

fn to_diagonal(p: (f64, f64)) -> f64 {
    ((p.1 - p.0) / 2.0).max(0.0)
}

pub fn bottleneck(a: &PersistenceDiagram, b: &PersistenceDiagram) -> f64 {
    let (m, l) = (a.len(), b.len());
    if m == 0 && l == 0 {
        return 0.0;
    }

    let mut candidates = Vec::with_capacity(m * l + m + l + 1);
    candidates.push(0.0);
    candidates.extend(a.points.iter().map(|&p| to_diagonal(p)));
    candidates.extend(b.points.iter().map(|&p| to_diagonal(p)));
    for &p in &a.points {
        for &q in &b.points {
            candidates.push(linf(p, q));
        }
    }
    candidates.sort_by(f64::total_cmp);
    candidates.dedup();

    // Matching every point to the diagonal always works, so the largest
    // candidate is feasible and the search below terminates on it at worst.
    let (mut lo, mut hi) = (0, candidates.len() - 1);
    while lo < hi {
        let mid = lo + (hi - lo) / 2;
        if has_perfect_matching(a, b, candidates[mid]) {
            hi = mid;
        } else {
            lo = mid + 1;
        }
    }
    candidates[lo]
}

fn has_perfect_matching(a: &PersistenceDiagram, b: &PersistenceDiagram, threshold: f64) -> bool {
    let (m, l) = (a.len(), b.len());
    let size = m + l;
    let mut adjacency: Vec<Vec<usize>> = vec![Vec::new(); size];
    for (k, &p) in a.points.iter().enumerate() {
        for (t, &q) in b.points.iter().enumerate() {
            if linf(p, q) <= threshold {
                adjacency[k].push(t);
            }
        }
        if to_diagonal(p) <= threshold {
            adjacency[k].push(l + k);
        }
    }
    for (t, &q) in b.points.iter().enumerate() {
        let left = m + t;
        if to_diagonal(q) <= threshold {
            adjacency[left].push(t);
        }
        adjacency[left].extend(l..l + m);
    }
    HopcroftKarp::new(&adjacency, size).max_matching() == size
}

const FREE: usize = usize::MAX;

struct HopcroftKarp<'a> {
    adjacency: &'a [Vec<usize>],
    match_left: Vec<usize>,
    match_right: Vec<usize>,
    layer: Vec<usize>,
}

impl<'a> HopcroftKarp<'a> {
    fn new(adjacency: &'a [Vec<usize>], right_count: usize) -> Self {
        Self {
            adjacency,
            match_left: vec![FREE; adjacency.len()],
            match_right: vec![FREE; right_count],
            layer: vec![0; adjacency.len()],
        }
    }

    fn max_matching(&mut self) -> usize {
        let mut matched = 0;
        while self.build_layers() {
            for u in 0..self.adjacency.len() {
                if self.match_left[u] == FREE && self.augment(u) {
                    matched += 1;
                }
            }
        }
        matched
    }

    /// BFS from all free left vertices; true if some free right vertex is reachable.
    fn build_layers(&mut self) -> bool {
        let mut queue = VecDeque::new();
        for u in 0..self.adjacency.len() {
            if self.match_left[u] == FREE {
                self.layer[u] = 0;
                queue.push_back(u);
            } else {
                self.layer[u] = usize::MAX;
            }
        }
        let mut found = false;
        while let Some(u) = queue.pop_front() {
            for &v in &self.adjacency[u] {
                let w = self.match_right[v];
                if w == FREE {
                    found = true;
                } else if self.layer[w] == usize::MAX {
                    self.layer[w] = self.layer[u] + 1;
                    queue.push_back(w);
                }
            }
        }
        found
    }

    fn augment(&mut self, u: usize) -> bool {
        for index in 0..self.adjacency[u].len() {
            let v = self.adjacency[u][index];
            let w = self.match_right[v];
            if w == FREE || (self.layer[w] == self.layer[u] + 1 && self.augment(w)) {
                self.match_left[u] = v;
                self.match_right[v] = u;
                return true;
            }
        }
        self.layer[u] = usize::MAX;
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pd(points: &[(f64, f64)]) -> PersistenceDiagram {
        PersistenceDiagram::new(points.to_vec())
    }

    #[test]
    fn test_identical_diagrams() {
        let d = pd(&[(0.0, 1.0), (0.2, 0.7), (0.5, 3.0)]);
        assert_eq!(bottleneck(&d, &d), 0.0);
    }

    #[test]
    fn test_against_empty_diagram_uses_diagonal() {
        let d = pd(&[(0.0, 1.0), (0.0, 4.0)]);
        assert_eq!(bottleneck(&d, &pd(&[])), 2.0);
        assert_eq!(bottleneck(&pd(&[]), &d), 2.0);
        assert_eq!(bottleneck(&pd(&[]), &pd(&[])), 0.0);
    }

    #[test]
    fn test_point_to_point_versus_diagonal() {
        // Moving (0,10) to (1,10) costs 1, far cheaper than the diagonal.
        assert_eq!(bottleneck(&pd(&[(0.0, 10.0)]), &pd(&[(1.0, 10.0)])), 1.0);
        // Two short bars: sending both to the diagonal (0.5) beats matching (0.9).
        assert_eq!(bottleneck(&pd(&[(0.0, 1.0)]), &pd(&[(0.9, 1.9)])), 0.5);
    }

    #[test]
    fn test_needs_global_assignment() {
        // Greedy nearest matching pairs (0,4) with (0,4.1) and leaves (0,3)
        // costing at least 1.5; crossing the pairs keeps the maximum at 1.1.
        let a = pd(&[(0.0, 4.0), (0.0, 3.0)]);
        let b = pd(&[(0.0, 4.1), (0.0, 5.0)]);
        assert_eq!(bottleneck(&a, &b), 4.1 - 3.0);
    }

    #[test]
    fn test_symmetric() {
        let a = pd(&[(0.0, 1.0), (0.3, 2.0), (1.0, 1.2)]);
        let b = pd(&[(0.1, 1.5), (0.0, 0.4)]);
        assert_eq!(bottleneck(&a, &b), bottleneck(&b, &a));
    }
}

use delve_core::Point;

use crate::distance::manhattan;

/// Minimal search interface: neighbour enumeration.
pub trait Pather {
    /// Append neighbours of `p` into `buf`. The caller clears `buf` before calling.
    fn neighbors(&self, p: Point, buf: &mut Vec<Point>);
}

/// A space the best-first search can run over.
///
/// The pass-through cost of a node is `estimate + penalty + parent cost`;
/// the parent cost itself is managed by the search (see
/// [`CostWeights`](crate::CostWeights)).
pub trait SearchSpace: Pather {
    /// Local heuristic cost from `p` to `goal`.
    fn estimate(&self, p: Point, goal: Point) -> f64 {
        f64::from(manhattan(p, goal))
    }

    /// Extra cost of entering `p` when coming from `parent`. Must be >= 0.
    fn penalty(&self, _parent: Point, _p: Point) -> f64 {
        0.0
    }
}

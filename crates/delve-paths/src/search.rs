use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::fmt;

use delve_core::{Point, Range};

use crate::error::SearchError;
use crate::traits::SearchSpace;

/// Default bound on the length of a parent chain.
pub const DEFAULT_MAX_DEPTH: usize = 500;

const NONE: usize = usize::MAX;

/// Weights of the discounted parent cost.
///
/// A node's parent cost is `base + decay * (parent's parent cost - base)`,
/// with the start node at 0. With the defaults the cost of a step rises
/// from 0.5 towards 1.0 as the path grows, so long straight runs are cheap
/// early and course corrections stay affordable near the goal.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct CostWeights {
    pub base: f64,
    pub decay: f64,
}

impl Default for CostWeights {
    fn default() -> Self {
        Self {
            base: 1.0,
            decay: 0.5,
        }
    }
}

impl CostWeights {
    /// Parent cost of a node whose parent has parent cost `parent_cost`.
    #[inline]
    pub fn step(&self, parent_cost: f64) -> f64 {
        self.base + self.decay * (parent_cost - self.base)
    }
}

// ---------------------------------------------------------------------------
// Arena nodes
// ---------------------------------------------------------------------------

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum State {
    Open,
    Closed,
}

#[derive(Clone)]
struct Node {
    parent: usize,
    parent_cost: f64,
    pass_through: f64,
    generation: u32,
    state: State,
}

impl Default for Node {
    fn default() -> Self {
        Self {
            parent: NONE,
            parent_cost: 0.0,
            pass_through: 0.0,
            generation: 0,
            state: State::Closed,
        }
    }
}

/// State of one cell as left by the last search.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NodeInfo {
    pub pos: Point,
    pub parent: Option<Point>,
    pub parent_cost: f64,
    /// Pass-through cost against the last search's goal.
    pub pass_through: f64,
    pub is_start: bool,
    pub is_end: bool,
    /// Still in the open set when the search ended.
    pub open: bool,
}

/// Heap entry ordered so that `BinaryHeap` pops the cheapest node first,
/// breaking ties on the smallest `(x, y)`.
#[derive(Clone, Copy)]
struct NodeRef {
    idx: usize,
    pos: Point,
    cost: f64,
}

impl Ord for NodeRef {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .cost
            .total_cmp(&self.cost)
            .then_with(|| other.pos.x.cmp(&self.pos.x))
            .then_with(|| other.pos.y.cmp(&self.pos.y))
    }
}

impl PartialOrd for NodeRef {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for NodeRef {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for NodeRef {}

/// Cost of reaching `p` through `parent`, without touching any node state.
///
/// Returns `(parent_cost, pass_through)` for `p`.
#[inline]
fn cost_via<S: SearchSpace>(
    space: &S,
    weights: CostWeights,
    parent: Point,
    parent_parent_cost: f64,
    p: Point,
    goal: Point,
) -> (f64, f64) {
    let parent_cost = weights.step(parent_parent_cost);
    let pass_through = space.estimate(p, goal) + space.penalty(parent, p) + parent_cost;
    (parent_cost, pass_through)
}

// ---------------------------------------------------------------------------
// PathSearch
// ---------------------------------------------------------------------------

/// Best-first path search over a rectangle of cells.
///
/// `PathSearch` owns the per-cell search state in an arena indexed by cell,
/// so the grid being searched stays untouched. Every search bumps a
/// generation counter, which lazily invalidates the state left by the
/// previous one.
pub struct PathSearch {
    pub(crate) rng: Range,
    pub(crate) width: usize,
    nodes: Vec<Node>,
    generation: u32,
    weights: CostWeights,
    max_depth: usize,
    start: usize,
    goal: usize,
    open: BinaryHeap<NodeRef>,
    // connected-component caches
    pub(crate) cc_labels: Vec<i32>,
    pub(crate) cc_stack: Vec<usize>,
    // shared scratch buffer for neighbour queries
    pub(crate) nbuf: Vec<Point>,
}

impl fmt::Debug for PathSearch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PathSearch")
            .field("range", &self.rng)
            .field("weights", &self.weights)
            .field("max_depth", &self.max_depth)
            .field("generation", &self.generation)
            .finish_non_exhaustive()
    }
}

impl PathSearch {
    /// Create a new `PathSearch` for the given rectangle.
    pub fn new(rng: Range) -> Self {
        let len = rng.len();
        Self {
            rng,
            width: rng.width().max(0) as usize,
            nodes: vec![Node::default(); len],
            generation: 0,
            weights: CostWeights::default(),
            max_depth: DEFAULT_MAX_DEPTH,
            start: NONE,
            goal: NONE,
            open: BinaryHeap::new(),
            cc_labels: vec![-1; len],
            cc_stack: Vec::new(),
            nbuf: Vec::with_capacity(8),
        }
    }

    pub fn with_weights(mut self, weights: CostWeights) -> Self {
        self.weights = weights;
        self
    }

    /// Bound the parent chain; longer chains fail with
    /// [`SearchError::ParentCycle`].
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    #[inline]
    pub fn range(&self) -> Range {
        self.rng
    }

    pub fn weights(&self) -> CostWeights {
        self.weights
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Replace the underlying range. Caches are kept when the new range fits.
    pub fn set_range(&mut self, rng: Range) {
        let new_len = rng.len();
        self.rng = rng;
        self.width = rng.width().max(0) as usize;
        self.start = NONE;
        self.goal = NONE;
        if new_len <= self.nodes.len() {
            self.bump_generation();
            return;
        }
        self.nodes.clear();
        self.nodes.resize(new_len, Node::default());
        self.generation = 0;
        self.cc_labels.clear();
        self.cc_labels.resize(new_len, -1);
        self.cc_stack.clear();
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

    fn bump_generation(&mut self) {
        self.generation = self.generation.wrapping_add(1);
        if self.generation == 0 {
            // Wrapped: stale entries could alias the new generation.
            for n in self.nodes.iter_mut() {
                n.generation = 0;
            }
            self.generation = 1;
        }
    }

    /// Find a path from `start` to `goal`.
    ///
    /// The path is returned goal first and excludes `start`; use
    /// [`travel_path`](Self::travel_path) for start-to-goal order. Returns
    /// `Ok(None)` when the goal cannot be reached, and an empty path when
    /// `start == goal`.
    pub fn find_best_path<S: SearchSpace>(
        &mut self,
        space: &S,
        start: Point,
        goal: Point,
    ) -> Result<Option<Vec<Point>>, SearchError> {
        let si = self.idx(start).ok_or(SearchError::OutOfRange(start))?;
        let gi = self.idx(goal).ok_or(SearchError::OutOfRange(goal))?;

        self.bump_generation();
        self.start = si;
        self.goal = gi;
        {
            let node = &mut self.nodes[si];
            node.parent = NONE;
            node.parent_cost = 0.0;
            node.pass_through = 0.0;
            node.generation = self.generation;
            node.state = State::Closed;
        }
        if si == gi {
            return Ok(Some(Vec::new()));
        }

        self.open.clear();
        let mut nbuf = std::mem::take(&mut self.nbuf);
        let found = self.run(space, goal, &mut nbuf);
        self.nbuf = nbuf;

        if !found? {
            return Ok(None);
        }
        Ok(Some(self.walk_back(gi)))
    }

    /// Like [`find_best_path`](Self::find_best_path), but in walking order:
    /// the first step after `start` comes first and `goal` last.
    pub fn travel_path<S: SearchSpace>(
        &mut self,
        space: &S,
        start: Point,
        goal: Point,
    ) -> Result<Option<Vec<Point>>, SearchError> {
        Ok(self.find_best_path(space, start, goal)?.map(|mut path| {
            path.reverse();
            path
        }))
    }

    fn run<S: SearchSpace>(
        &mut self,
        space: &S,
        goal: Point,
        nbuf: &mut Vec<Point>,
    ) -> Result<bool, SearchError> {
        self.expand(space, self.start, goal, nbuf)?;

        while let Some(current) = self.open.pop() {
            let ci = current.idx;
            let node = &self.nodes[ci];
            // Skip entries superseded by a cheaper re-parenting.
            if node.state != State::Open || current.cost > node.pass_through {
                continue;
            }
            self.nodes[ci].state = State::Closed;
            if ci == self.goal {
                return Ok(true);
            }
            self.expand(space, ci, goal, nbuf)?;
        }
        Ok(false)
    }

    fn expand<S: SearchSpace>(
        &mut self,
        space: &S,
        ci: usize,
        goal: Point,
        nbuf: &mut Vec<Point>,
    ) -> Result<(), SearchError> {
        let cur_gen = self.generation;
        let current_point = self.point(ci);
        let current_cost = self.nodes[ci].parent_cost;

        nbuf.clear();
        space.neighbors(current_point, nbuf);

        for &np in nbuf.iter() {
            let Some(ni) = self.idx(np) else {
                continue;
            };
            if ni == self.start {
                continue;
            }
            let (parent_cost, pass_through) =
                cost_via(space, self.weights, current_point, current_cost, np, goal);

            let n = &self.nodes[ni];
            if n.generation == cur_gen && pass_through >= n.pass_through {
                continue;
            }
            if self.is_ancestor(ni, ci)? {
                continue;
            }

            let n = &mut self.nodes[ni];
            n.generation = cur_gen;
            n.parent = ci;
            n.parent_cost = parent_cost;
            n.pass_through = pass_through;
            n.state = State::Open;
            self.open.push(NodeRef {
                idx: ni,
                pos: np,
                cost: pass_through,
            });
        }
        Ok(())
    }

    /// Whether `target` is on the parent chain of `from` (inclusive).
    ///
    /// Fails once the chain is longer than the configured depth.
    fn is_ancestor(&self, target: usize, from: usize) -> Result<bool, SearchError> {
        let mut cur = from;
        let mut hops = 0;
        while cur != NONE {
            if cur == target {
                return Ok(true);
            }
            hops += 1;
            if hops > self.max_depth {
                return Err(SearchError::ParentCycle {
                    at: self.point(target),
                    depth: self.max_depth,
                });
            }
            cur = self.nodes[cur].parent;
        }
        Ok(false)
    }

    fn walk_back(&self, gi: usize) -> Vec<Point> {
        let mut path = Vec::new();
        let mut ci = gi;
        while ci != self.start && ci != NONE && path.len() <= self.max_depth {
            path.push(self.point(ci));
            ci = self.nodes[ci].parent;
        }
        path
    }

    /// State the last search left at `p`, if it touched that cell.
    pub fn node(&self, p: Point) -> Option<NodeInfo> {
        let i = self.idx(p)?;
        let n = &self.nodes[i];
        if n.generation != self.generation || self.generation == 0 {
            return None;
        }
        Some(NodeInfo {
            pos: p,
            parent: (n.parent != NONE).then(|| self.point(n.parent)),
            parent_cost: n.parent_cost,
            pass_through: n.pass_through,
            is_start: i == self.start,
            is_end: i == self.goal,
            open: n.state == State::Open,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Neighbors, Pather};

    #[test]
    fn debug_shows_settings_not_arena() {
        let search = PathSearch::new(Range::new(0, 0, 3, 2)).with_max_depth(7);
        let shown = format!("{search:?}");
        assert!(shown.starts_with("PathSearch {"));
        assert!(shown.contains("max_depth: 7"));
        assert!(!shown.contains("nodes"));
    }

    /// Open rectangle with blocked cells and optional per-cell penalties.
    struct Field {
        rng: Range,
        blocked: Vec<Point>,
        costly: Vec<(Point, f64)>,
    }

    impl Field {
        fn new(w: i32, h: i32) -> Self {
            Self {
                rng: Range::new(0, 0, w, h),
                blocked: Vec::new(),
                costly: Vec::new(),
            }
        }
    }

    impl Pather for Field {
        fn neighbors(&self, p: Point, buf: &mut Vec<Point>) {
            Neighbors::Cardinal.extend(
                p,
                |n| self.rng.contains(n) && !self.blocked.contains(&n),
                buf,
            );
        }
    }

    impl SearchSpace for Field {
        fn penalty(&self, _parent: Point, p: Point) -> f64 {
            self.costly
                .iter()
                .find(|(q, _)| *q == p)
                .map_or(0.0, |&(_, c)| c)
        }
    }

    fn is_chain(path: &[Point], start: Point) -> bool {
        let mut all = path.to_vec();
        all.push(start);
        all.windows(2)
            .all(|w| (w[0].x - w[1].x).abs() + (w[0].y - w[1].y).abs() == 1)
    }

    #[test]
    fn weights_discount_towards_base() {
        let w = CostWeights::default();
        assert_eq!(w.step(0.0), 0.5);
        assert_eq!(w.step(0.5), 0.75);
        assert_eq!(w.step(0.75), 0.875);
    }

    #[test]
    fn corridor_path_is_goal_first() {
        let field = Field::new(5, 1);
        let mut ps = PathSearch::new(field.rng);
        let path = ps
            .find_best_path(&field, Point::new(0, 0), Point::new(4, 0))
            .unwrap()
            .unwrap();
        assert_eq!(
            path,
            vec![
                Point::new(4, 0),
                Point::new(3, 0),
                Point::new(2, 0),
                Point::new(1, 0)
            ]
        );
        let travel = ps
            .travel_path(&field, Point::new(0, 0), Point::new(4, 0))
            .unwrap()
            .unwrap();
        assert_eq!(travel.first(), Some(&Point::new(1, 0)));
        assert_eq!(travel.last(), Some(&Point::new(4, 0)));
    }

    #[test]
    fn start_equals_goal_is_empty() {
        let field = Field::new(3, 3);
        let mut ps = PathSearch::new(field.rng);
        let p = Point::new(1, 1);
        assert_eq!(ps.find_best_path(&field, p, p), Ok(Some(Vec::new())));
    }

    #[test]
    fn out_of_range_endpoints_fail() {
        let field = Field::new(3, 3);
        let mut ps = PathSearch::new(field.rng);
        let outside = Point::new(3, 0);
        assert_eq!(
            ps.find_best_path(&field, Point::new(0, 0), outside),
            Err(SearchError::OutOfRange(outside))
        );
    }

    #[test]
    fn walled_off_goal_has_no_path() {
        let mut field = Field::new(5, 5);
        field.blocked = (0..5).map(|y| Point::new(2, y)).collect();
        let mut ps = PathSearch::new(field.rng);
        assert_eq!(
            ps.find_best_path(&field, Point::new(0, 2), Point::new(4, 2)),
            Ok(None)
        );
    }

    #[test]
    fn open_field_path_is_connected() {
        let mut field = Field::new(12, 9);
        field.blocked = (1..8).map(|y| Point::new(6, y)).collect();
        let mut ps = PathSearch::new(field.rng);
        let start = Point::new(1, 4);
        let goal = Point::new(10, 4);
        let path = ps.find_best_path(&field, start, goal).unwrap().unwrap();
        assert_eq!(path[0], goal);
        assert!(!path.contains(&start));
        assert!(is_chain(&path, start));
        assert!(path.iter().all(|p| !field.blocked.contains(p)));
    }

    #[test]
    fn repeated_searches_agree() {
        let mut field = Field::new(10, 10);
        field.blocked = vec![Point::new(4, 4), Point::new(4, 5), Point::new(5, 4)];
        let start = Point::new(0, 0);
        let goal = Point::new(9, 9);
        let mut ps = PathSearch::new(field.rng);
        let first = ps.find_best_path(&field, start, goal).unwrap();
        // An unrelated search in between must not leak state.
        ps.find_best_path(&field, Point::new(9, 0), Point::new(0, 9))
            .unwrap();
        let second = ps.find_best_path(&field, start, goal).unwrap();
        let fresh = PathSearch::new(field.rng)
            .find_best_path(&field, start, goal)
            .unwrap();
        assert_eq!(first, second);
        assert_eq!(first, fresh);
    }

    #[test]
    fn penalties_steer_the_path() {
        let mut field = Field::new(5, 3);
        field.costly = vec![(Point::new(2, 1), 50.0)];
        let mut ps = PathSearch::new(field.rng);
        let path = ps
            .find_best_path(&field, Point::new(0, 1), Point::new(4, 1))
            .unwrap()
            .unwrap();
        assert_eq!(path[0], Point::new(4, 1));
        assert!(!path.contains(&Point::new(2, 1)));
    }

    #[test]
    fn node_info_reflects_last_search() {
        let field = Field::new(5, 1);
        let mut ps = PathSearch::new(field.rng);
        assert_eq!(ps.node(Point::new(0, 0)), None);
        ps.find_best_path(&field, Point::new(0, 0), Point::new(4, 0))
            .unwrap();

        let start = ps.node(Point::new(0, 0)).unwrap();
        assert!(start.is_start);
        assert_eq!(start.parent, None);
        assert_eq!(start.parent_cost, 0.0);

        let first = ps.node(Point::new(1, 0)).unwrap();
        assert_eq!(first.parent, Some(Point::new(0, 0)));
        assert_eq!(first.parent_cost, 0.5);
        assert_eq!(first.pass_through, 3.5);

        let second = ps.node(Point::new(2, 0)).unwrap();
        assert_eq!(second.parent_cost, 0.75);
        assert!(ps.node(Point::new(4, 0)).unwrap().is_end);
    }

    #[test]
    fn long_parent_chain_is_rejected() {
        let field = Field::new(600, 1);
        let start = Point::new(0, 0);
        let goal = Point::new(599, 0);
        let mut ps = PathSearch::new(field.rng);
        let err = ps.find_best_path(&field, start, goal).unwrap_err();
        assert!(matches!(err, SearchError::ParentCycle { depth: 500, .. }));

        let mut deep = PathSearch::new(field.rng).with_max_depth(1000);
        let path = deep.find_best_path(&field, start, goal).unwrap().unwrap();
        assert_eq!(path.len(), 599);
    }

    #[test]
    fn set_range_reuses_capacity() {
        let mut ps = PathSearch::new(Range::new(0, 0, 20, 20));
        let cap = ps.nodes.len();
        ps.set_range(Range::new(0, 0, 5, 5));
        assert_eq!(ps.nodes.len(), cap);
        assert_eq!(ps.width, 5);

        ps.set_range(Range::new(0, 0, 30, 30));
        assert_eq!(ps.nodes.len(), 900);
    }
}

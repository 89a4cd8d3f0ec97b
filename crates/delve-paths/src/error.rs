use delve_core::Point;
use thiserror::Error;

/// Failures of a single best-first search.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SearchError {
    /// An endpoint lies outside the range the search was built for.
    #[error("point {0} is outside the search range")]
    OutOfRange(Point),
    /// Assigning a parent would close a loop, or the parent chain grew past
    /// the configured depth.
    #[error("parent chain at {at} exceeds {depth} hops or loops back on itself")]
    ParentCycle { at: Point, depth: usize },
    /// The open set emptied before the goal was reached.
    #[error("no path from {from} to {to}")]
    NoPath { from: Point, to: Point },
}

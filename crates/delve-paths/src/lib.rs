//! Best-first path search for grid-based dungeon generation.
//!
//! [`PathSearch`] runs an informed best-first search over any
//! [`SearchSpace`]: the space supplies the adjacency function, a local
//! heuristic and a per-step penalty, while the search tracks a discounted
//! parent cost in its own node arena. The same engine routes tunnels during
//! generation and walking paths afterwards.
//!
//! | Trait | Required for |
//! |---|---|
//! | [`Pather`] | connected components ([`PathSearch::cc_map`]) |
//! | [`SearchSpace`] : [`Pather`] | [`PathSearch::find_best_path`] |

mod cc;
mod distance;
mod error;
mod neighbors;
mod search;
mod traits;

pub use distance::{euclidean, manhattan};
pub use error::SearchError;
pub use neighbors::Neighbors;
pub use search::{CostWeights, DEFAULT_MAX_DEPTH, NodeInfo, PathSearch};
pub use traits::{Pather, SearchSpace};

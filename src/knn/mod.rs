//! Accumulators threaded through nearest-neighbor traversals.

mod nearest;
mod queue;

pub use nearest::NearestNeighbor;
pub use queue::{BoundedPriorityQueue, IntoIter, Iter};

//! A bucketed point-region quadtree over a square of the integer grid.

#![warn(missing_docs)]

mod index;
mod node;
mod region;

pub use index::{PRQuadTree, DEFAULT_BUCKET_SIZE};
pub use node::{Internal, Leaf, QuadNode};
pub use region::{Quadrant, Region};

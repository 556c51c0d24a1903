//! A mutable, unbalanced K-D tree over integer points.

#![warn(missing_docs)]

mod index;
mod node;
mod traversal;

pub use index::KDTree;
pub use traversal::Node;

#[cfg(test)]
mod test;

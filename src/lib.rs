#![doc = include_str!("../README.md")]

mod error;
pub mod kdtree;
pub mod knn;
mod point;
pub mod quadtree;
mod r#trait;
mod r#type;

pub use error::{PointIndexError, Result};
pub use point::Point;
pub use r#trait::SpatialIndex;
pub use r#type::IndexableNum;

use thiserror::Error;

/// Enum with all errors in this crate.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PointIndexError {
    /// A minimum or first element was requested from an empty structure.
    #[error("Structure is empty")]
    EmptyStructure,

    /// A constructor or query parameter is outside of its domain.
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// A point lies outside the region spanned by a quadtree.
    #[error("Point lies outside the indexed region")]
    OutOfBounds,

    /// A coordinate does not have the dimensionality of the index.
    #[error("Expected a coordinate with {expected} dimensions, got {actual}")]
    DimensionMismatch {
        /// Dimensions of the index.
        expected: usize,
        /// Dimensions of the offending coordinate.
        actual: usize,
    },
}

/// Crate-specific result type.
pub type Result<T> = std::result::Result<T, PointIndexError>;

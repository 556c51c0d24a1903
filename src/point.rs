//! Fixed-dimension integer points.

use geo_traits::{CoordTrait, Dimensions};

use crate::error::{PointIndexError, Result};
use crate::r#type::IndexableNum;

/// A point with `D` integer coordinates.
///
/// Points are `Copy`: every index stores and returns its own copy, so mutating a point after
/// insertion never affects the index.
///
/// ```
/// use point_index::Point;
///
/// let a = Point::new([0, 0]);
/// let b = Point::new([3, 4]);
/// assert_eq!(a.distance(&b), 5.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Point<N: IndexableNum, const D: usize> {
    coords: [N; D],
}

impl<N: IndexableNum, const D: usize> Point<N, D> {
    /// Create a new point from its coordinates.
    pub fn new(coords: [N; D]) -> Self {
        Self { coords }
    }

    /// Copy the coordinates out of any [`CoordTrait`] implementation.
    ///
    /// Fails with [`PointIndexError::DimensionMismatch`] if the coordinate does not have
    /// exactly `D` dimensions.
    pub fn try_from_coord(coord: &impl CoordTrait<T = N>) -> Result<Self> {
        let actual = coord.dim().size();
        if actual != D {
            return Err(PointIndexError::DimensionMismatch {
                expected: D,
                actual,
            });
        }
        Ok(Self::new(std::array::from_fn(|i| coord.nth_or_panic(i))))
    }

    /// The coordinates of this point.
    pub fn coords(&self) -> &[N; D] {
        &self.coords
    }

    /// The coordinate along `axis`.
    ///
    /// Panics if `axis >= D`.
    #[inline]
    pub fn coord(&self, axis: usize) -> N {
        self.coords[axis]
    }

    /// The squared Euclidean distance to `other`.
    #[inline]
    pub fn squared_distance(&self, other: &Self) -> f64 {
        self.coords
            .iter()
            .zip(other.coords.iter())
            .map(|(a, b)| {
                let d = to_f64(*a) - to_f64(*b);
                d * d
            })
            .sum()
    }

    /// The Euclidean distance to `other`.
    #[inline]
    pub fn distance(&self, other: &Self) -> f64 {
        self.squared_distance(other).sqrt()
    }

    /// Distance from this point to the axis-aligned hyperplane through `other` on `axis`.
    #[inline]
    pub(crate) fn axis_gap(&self, other: &Self, axis: usize) -> f64 {
        (to_f64(self.coords[axis]) - to_f64(other.coords[axis])).abs()
    }
}

impl<N: IndexableNum, const D: usize> From<[N; D]> for Point<N, D> {
    fn from(coords: [N; D]) -> Self {
        Self::new(coords)
    }
}

impl<N: IndexableNum, const D: usize> CoordTrait for Point<N, D> {
    type T = N;

    fn dim(&self) -> Dimensions {
        match D {
            2 => Dimensions::Xy,
            3 => Dimensions::Xyz,
            n => Dimensions::Unknown(n),
        }
    }

    fn x(&self) -> Self::T {
        self.coords[0]
    }

    fn y(&self) -> Self::T {
        self.coords[1]
    }

    fn nth_or_panic(&self, n: usize) -> Self::T {
        self.coords[n]
    }
}

#[inline]
pub(crate) fn to_f64<N: IndexableNum>(value: N) -> f64 {
    // Every supported integer type converts to f64.
    value.to_f64().unwrap_or(0.0)
}

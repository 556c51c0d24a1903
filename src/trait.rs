use geo_traits::CoordTrait;

use crate::error::Result;
use crate::point::Point;
use crate::r#type::IndexableNum;

/// Operations shared by the mutable point indexes in this crate.
///
/// Neighbor queries return neighbors *of* the anchor: stored copies of the anchor itself are
/// skipped. [`range`][Self::range] is a plain distance predicate and does include them.
pub trait SpatialIndex<N: IndexableNum, const D: usize> {
    /// Store a copy of `point`.
    fn insert(&mut self, point: Point<N, D>) -> Result<()>;

    /// Remove one stored copy of `point`. Returns `false` if `point` is not stored.
    fn delete(&mut self, point: &Point<N, D>) -> bool;

    /// Returns `true` if `point` is stored.
    fn search(&self, point: &Point<N, D>) -> bool;

    /// All stored points within Euclidean distance `radius` of `anchor`, inclusive.
    fn range(&self, anchor: &Point<N, D>, radius: f64) -> Vec<Point<N, D>>;

    /// The stored point closest to `anchor` that is not equal to it.
    fn nearest_neighbor(&self, anchor: &Point<N, D>) -> Option<Point<N, D>>;

    /// Up to `k` stored points closest to `anchor` (copies of `anchor` excluded), in
    /// non-decreasing order of distance.
    ///
    /// Fails with [`PointIndexError::InvalidConfiguration`][crate::PointIndexError] if `k` is
    /// zero.
    fn k_nearest_neighbors(&self, k: usize, anchor: &Point<N, D>) -> Result<Vec<Point<N, D>>>;

    /// The height of the tree: -1 when empty, 0 for a single leaf.
    fn height(&self) -> isize;

    /// The number of stored points.
    fn len(&self) -> usize;

    /// Returns `true` if no points are stored.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Insert every point of `points`, stopping at the first failure.
    fn insert_all(&mut self, points: impl IntoIterator<Item = Point<N, D>>) -> Result<()> {
        for point in points {
            self.insert(point)?;
        }
        Ok(())
    }

    /// Search for a coordinate given through [`CoordTrait`].
    fn search_coord(&self, coord: &impl CoordTrait<T = N>) -> Result<bool> {
        Ok(self.search(&Point::try_from_coord(coord)?))
    }

    /// Find neighbors of a coordinate given through [`CoordTrait`].
    fn k_nearest_neighbors_coord(
        &self,
        k: usize,
        coord: &impl CoordTrait<T = N>,
    ) -> Result<Vec<Point<N, D>>> {
        self.k_nearest_neighbors(k, &Point::try_from_coord(coord)?)
    }
}

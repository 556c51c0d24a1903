//! Square cells of the quadtree grid.

use geo_traits::CoordTrait;

use crate::error::{PointIndexError, Result};
use crate::point::Point;
use crate::r#type::IndexableNum;

/// One of the four quadrants of a cell, relative to its centroid.
///
/// A point is north if its y coordinate is at least the centroid's, and east if its x
/// coordinate is at least the centroid's. The discriminant is the child slot index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Quadrant {
    /// Slot 0: x below, y at or above the centroid.
    NorthWest = 0,
    /// Slot 1: x and y at or above the centroid.
    NorthEast = 1,
    /// Slot 2: x and y below the centroid.
    SouthWest = 2,
    /// Slot 3: x at or above, y below the centroid.
    SouthEast = 3,
}

impl Quadrant {
    /// All quadrants in slot order.
    pub const ALL: [Quadrant; 4] = [
        Quadrant::NorthWest,
        Quadrant::NorthEast,
        Quadrant::SouthWest,
        Quadrant::SouthEast,
    ];

    fn from_sides(north: bool, east: bool) -> Self {
        match (north, east) {
            (true, false) => Quadrant::NorthWest,
            (true, true) => Quadrant::NorthEast,
            (false, false) => Quadrant::SouthWest,
            (false, true) => Quadrant::SouthEast,
        }
    }

    /// The child slot this quadrant occupies.
    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Returns `true` for the two northern quadrants.
    pub fn is_north(self) -> bool {
        matches!(self, Quadrant::NorthWest | Quadrant::NorthEast)
    }

    /// Returns `true` for the two eastern quadrants.
    pub fn is_east(self) -> bool {
        matches!(self, Quadrant::NorthEast | Quadrant::SouthEast)
    }
}

/// A square cell with side length `2^k` around an integer centroid.
///
/// For `k >= 1` the cell spans `[c - 2^(k-1), c + 2^(k-1))` on each axis; the unit cell
/// (`k = 0`) holds the centroid alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Region<N: IndexableNum> {
    centroid: Point<N, 2>,
    k: u32,
}

impl<N: IndexableNum> Region<N> {
    /// Create a region, checking that every coordinate it spans is representable in `N`.
    pub fn try_new(centroid: Point<N, 2>, k: u32) -> Result<Self> {
        if k > N::MAX_SIDE_EXPONENT {
            return Err(PointIndexError::InvalidConfiguration(format!(
                "side length 2^{} does not fit the coordinate type",
                k
            )));
        }
        let region = Self { centroid, k };
        let half = region.half_side();
        let upper = if k == 0 { N::zero() } else { half - N::one() };
        for axis in 0..2 {
            let c = centroid.coord(axis);
            if c.checked_sub(&half).is_none() || c.checked_add(&upper).is_none() {
                return Err(PointIndexError::InvalidConfiguration(format!(
                    "region of side 2^{} around {:?} overflows the coordinate type",
                    k,
                    centroid.coords()
                )));
            }
        }
        Ok(region)
    }

    /// The splitting point of this cell.
    pub fn centroid(&self) -> Point<N, 2> {
        self.centroid
    }

    /// The side length exponent of this cell.
    pub fn k(&self) -> u32 {
        self.k
    }

    /// Half of the side length, or zero for the unit cell.
    #[inline]
    pub fn half_side(&self) -> N {
        half_side(self.k)
    }

    /// The smallest coordinates inside this cell.
    pub fn min_corner(&self) -> Point<N, 2> {
        let half = self.half_side();
        Point::new([self.centroid.x() - half, self.centroid.y() - half])
    }

    /// The largest coordinates inside this cell (inclusive).
    pub fn max_corner(&self) -> Point<N, 2> {
        if self.k == 0 {
            return self.centroid;
        }
        let upper = self.half_side() - N::one();
        Point::new([self.centroid.x() + upper, self.centroid.y() + upper])
    }

    /// Returns `true` if `point` lies inside this cell.
    pub fn contains(&self, point: &Point<N, 2>) -> bool {
        let min = self.min_corner();
        let max = self.max_corner();
        (0..2).all(|axis| min.coord(axis) <= point.coord(axis) && point.coord(axis) <= max.coord(axis))
    }

    /// The quadrant of this cell that `point` falls in.
    pub fn quadrant_of(&self, point: &Point<N, 2>) -> Quadrant {
        Quadrant::from_sides(
            point.y() >= self.centroid.y(),
            point.x() >= self.centroid.x(),
        )
    }

    /// The cell covering `quadrant` of this one, or `None` for a unit cell.
    pub fn child(&self, quadrant: Quadrant) -> Option<Self> {
        (self.k > 0).then(|| self.quadrant_region(quadrant))
    }

    /// Child cell derivation for cells with `k >= 1`.
    pub(crate) fn quadrant_region(&self, quadrant: Quadrant) -> Self {
        debug_assert!(self.k > 0, "a unit cell has no quadrants");
        let half = self.half_side();
        let min = self.min_corner();
        let child_k = self.k - 1;
        let child_half = half_side::<N>(child_k);

        let x = if quadrant.is_east() { min.x() + half } else { min.x() };
        let y = if quadrant.is_north() { min.y() + half } else { min.y() };
        Self {
            centroid: Point::new([x + child_half, y + child_half]),
            k: child_k,
        }
    }

    /// Euclidean distance from `anchor` to the closest point of this cell.
    pub fn distance_to(&self, anchor: &Point<N, 2>) -> f64 {
        let min = self.min_corner();
        let max = self.max_corner();
        let closest = Point::new([
            anchor.x().clamp(min.x(), max.x()),
            anchor.y().clamp(min.y(), max.y()),
        ]);
        anchor.distance(&closest)
    }

    /// Returns `true` if this cell overlaps the disc of `radius` around `anchor`.
    #[inline]
    pub fn intersects_circle(&self, anchor: &Point<N, 2>, radius: f64) -> bool {
        self.distance_to(anchor) <= radius
    }
}

#[inline]
fn half_side<N: IndexableNum>(k: u32) -> N {
    if k == 0 {
        N::zero()
    } else {
        N::one() << (k - 1) as usize
    }
}

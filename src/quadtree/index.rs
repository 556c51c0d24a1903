use tracing::trace;

use crate::error::{PointIndexError, Result};
use crate::knn::{BoundedPriorityQueue, NearestNeighbor};
use crate::point::Point;
use crate::quadtree::node::QuadNode;
use crate::quadtree::region::Region;
use crate::r#trait::SpatialIndex;
use crate::r#type::IndexableNum;

/// The default number of points a leaf holds before it is split.
pub const DEFAULT_BUCKET_SIZE: usize = 1;

/// A point-region quadtree over a fixed square of the integer grid.
///
/// The tree covers the `2^k` by `2^k` cell around a centroid given at construction. Leaves hold
/// up to `bucket_size` points; a leaf that overflows is split into quadrants, and an internal
/// node that drops to `bucket_size` points or fewer is merged back into a leaf. The shape of
/// the tree therefore depends only on the stored points, not on the order they arrived in.
///
/// ```
/// use point_index::quadtree::PRQuadTree;
/// use point_index::{Point, SpatialIndex};
///
/// let mut tree = PRQuadTree::new(Point::new([0, 0]), 4).unwrap();
/// tree.insert(Point::new([1, 1])).unwrap();
/// tree.insert(Point::new([-3, 2])).unwrap();
/// assert_eq!(tree.height(), 1);
///
/// assert!(tree.delete(&Point::new([1, 1])));
/// assert_eq!(tree.height(), 0);
///
/// // Outside the 16x16 square around the origin.
/// assert!(tree.insert(Point::new([8, 0])).is_err());
/// ```
#[derive(Debug, Clone)]
pub struct PRQuadTree<N: IndexableNum> {
    root: Option<QuadNode<N>>,
    region: Region<N>,
    bucket_size: usize,
    len: usize,
}

impl<N: IndexableNum> PRQuadTree<N> {
    /// Create an empty tree over the `2^k` square around `centroid`, using the default bucket
    /// size.
    pub fn new(centroid: Point<N, 2>, k: u32) -> Result<Self> {
        Self::new_with_bucket_size(centroid, k, DEFAULT_BUCKET_SIZE)
    }

    /// Create an empty tree over the `2^k` square around `centroid`.
    ///
    /// Fails with [`PointIndexError::InvalidConfiguration`] if `bucket_size` is zero or the
    /// square does not fit the coordinate type.
    pub fn new_with_bucket_size(centroid: Point<N, 2>, k: u32, bucket_size: usize) -> Result<Self> {
        if bucket_size < 1 {
            return Err(PointIndexError::InvalidConfiguration(
                "bucket size must be at least 1".to_string(),
            ));
        }
        Ok(Self {
            root: None,
            region: Region::try_new(centroid, k)?,
            bucket_size,
            len: 0,
        })
    }

    /// The square covered by this tree.
    pub fn region(&self) -> &Region<N> {
        &self.region
    }

    /// The number of points a leaf holds before it is split.
    pub fn bucket_size(&self) -> usize {
        self.bucket_size
    }

    /// Access the root node of the tree for manual traversal.
    pub fn root(&self) -> Option<&QuadNode<N>> {
        self.root.as_ref()
    }

    /// Copies of every stored point.
    pub fn points(&self) -> Vec<Point<N, 2>> {
        let mut result = Vec::with_capacity(self.len);
        if let Some(root) = &self.root {
            root.collect(&mut result);
        }
        result
    }

    /// Remove every point.
    pub fn clear(&mut self) {
        self.root = None;
        self.len = 0;
    }
}

impl<N: IndexableNum> SpatialIndex<N, 2> for PRQuadTree<N> {
    /// Fails with [`PointIndexError::OutOfBounds`] if `point` lies outside the tree's square.
    fn insert(&mut self, point: Point<N, 2>) -> Result<()> {
        if !self.region.contains(&point) {
            return Err(PointIndexError::OutOfBounds);
        }
        match &mut self.root {
            Some(root) => root.insert(point, self.bucket_size),
            None => self.root = Some(QuadNode::new_leaf(self.region, point)),
        }
        self.len += 1;
        Ok(())
    }

    fn delete(&mut self, point: &Point<N, 2>) -> bool {
        let Some(root) = &mut self.root else {
            return false;
        };
        if !root.delete(point, self.bucket_size) {
            return false;
        }
        if root.count() == 0 {
            self.root = None;
        }
        self.len -= 1;
        true
    }

    fn search(&self, point: &Point<N, 2>) -> bool {
        self.region.contains(point) && self.root.as_ref().is_some_and(|root| root.search(point))
    }

    fn range(&self, anchor: &Point<N, 2>, radius: f64) -> Vec<Point<N, 2>> {
        let mut result = vec![];
        if let Some(root) = &self.root {
            root.range(anchor, radius, &mut result);
        }
        trace!(radius, found = result.len(), "quadtree range query");
        result
    }

    fn nearest_neighbor(&self, anchor: &Point<N, 2>) -> Option<Point<N, 2>> {
        let mut nearest = NearestNeighbor::new();
        if let Some(root) = &self.root {
            root.nearest_neighbor(anchor, &mut nearest);
        }
        nearest.into_inner()
    }

    fn k_nearest_neighbors(&self, k: usize, anchor: &Point<N, 2>) -> Result<Vec<Point<N, 2>>> {
        let mut queue = BoundedPriorityQueue::new(k)?;
        if let Some(root) = &self.root {
            root.k_nearest_neighbors(anchor, &mut queue);
        }
        trace!(k, found = queue.len(), "quadtree k-nearest-neighbors query");
        Ok(queue.into_iter().collect())
    }

    fn height(&self) -> isize {
        self.root.as_ref().map_or(-1, |root| root.height() as isize)
    }

    fn len(&self) -> usize {
        self.len
    }
}

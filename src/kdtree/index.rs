use std::fmt;

use tracing::trace;

use crate::error::{PointIndexError, Result};
use crate::kdtree::node::{self, KDNode, Link};
use crate::kdtree::traversal::Node;
use crate::knn::{BoundedPriorityQueue, NearestNeighbor};
use crate::point::Point;
use crate::r#trait::SpatialIndex;
use crate::r#type::IndexableNum;

/// A mutable K-D tree over `D`-dimensional integer points.
///
/// Each level splits on the next coordinate axis in turn. Points strictly below a node on its
/// axis go left, all others (ties included) go right. The tree is never rebalanced, so its
/// height depends on insertion order.
///
/// ```
/// use point_index::kdtree::KDTree;
/// use point_index::{Point, SpatialIndex};
///
/// let mut tree = KDTree::<i32, 2>::new();
/// for coords in [[5, 5], [3, 3], [8, 8], [1, 1]] {
///     tree.insert(Point::new(coords)).unwrap();
/// }
///
/// assert!(tree.search(&Point::new([3, 3])));
/// assert!(!tree.search(&Point::new([9, 9])));
/// assert_eq!(tree.nearest_neighbor(&Point::new([5, 5])), Some(Point::new([3, 3])));
/// ```
pub struct KDTree<N: IndexableNum, const D: usize> {
    root: Link<N, D>,
    len: usize,
}

impl<N: IndexableNum, const D: usize> KDTree<N, D> {
    const NONZERO_DIMENSIONS: () = assert!(D > 0, "a KDTree needs at least one dimension");

    /// Create an empty tree.
    pub fn new() -> Self {
        #[allow(clippy::let_unit_value)]
        let () = Self::NONZERO_DIMENSIONS;
        Self { root: None, len: 0 }
    }

    /// Access the root node of the tree for manual traversal.
    pub fn root(&self) -> Option<Node<'_, N, D>> {
        self.root.as_deref().map(Node::from_root)
    }

    /// The stored point with the smallest coordinate on `axis`.
    ///
    /// Fails with [`PointIndexError::EmptyStructure`] on an empty tree.
    pub fn minimum(&self, axis: usize) -> Result<Point<N, D>> {
        if axis >= D {
            return Err(PointIndexError::InvalidConfiguration(format!(
                "axis {} out of range for {} dimensions",
                axis, D
            )));
        }
        let root = self
            .root
            .as_deref()
            .ok_or(PointIndexError::EmptyStructure)?;
        Ok(*node::minimum(root, axis, 0))
    }

    /// Copies of every stored point, in pre-order.
    pub fn points(&self) -> Vec<Point<N, D>> {
        let mut result = Vec::with_capacity(self.len);
        if let Some(root) = self.root.as_deref() {
            node::collect(root, &mut result);
        }
        result
    }

    /// Remove every point.
    pub fn clear(&mut self) {
        dismantle(self.root.take());
        self.len = 0;
    }
}

impl<N: IndexableNum, const D: usize> SpatialIndex<N, D> for KDTree<N, D> {
    fn insert(&mut self, point: Point<N, D>) -> Result<()> {
        node::insert(&mut self.root, point);
        self.len += 1;
        Ok(())
    }

    fn delete(&mut self, point: &Point<N, D>) -> bool {
        let deleted = node::delete(&mut self.root, point);
        if deleted {
            self.len -= 1;
        }
        deleted
    }

    fn search(&self, point: &Point<N, D>) -> bool {
        self.root
            .as_deref()
            .is_some_and(|root| node::search(root, point))
    }

    fn range(&self, anchor: &Point<N, D>, radius: f64) -> Vec<Point<N, D>> {
        let mut result = vec![];
        if let Some(root) = self.root.as_deref() {
            node::range(root, anchor, radius, &mut result);
        }
        trace!(radius, found = result.len(), "kdtree range query");
        result
    }

    fn nearest_neighbor(&self, anchor: &Point<N, D>) -> Option<Point<N, D>> {
        let mut nearest = NearestNeighbor::new();
        if let Some(root) = self.root.as_deref() {
            node::nearest_neighbor(root, anchor, &mut nearest);
        }
        nearest.into_inner()
    }

    fn k_nearest_neighbors(&self, k: usize, anchor: &Point<N, D>) -> Result<Vec<Point<N, D>>> {
        let mut queue = BoundedPriorityQueue::new(k)?;
        if let Some(root) = self.root.as_deref() {
            node::k_nearest_neighbors(root, anchor, &mut queue);
        }
        trace!(k, found = queue.len(), "kdtree k-nearest-neighbors query");
        Ok(queue.into_iter().collect())
    }

    fn height(&self) -> isize {
        node::link_height(&self.root)
    }

    fn len(&self) -> usize {
        self.len
    }
}

impl<N: IndexableNum, const D: usize> Drop for KDTree<N, D> {
    fn drop(&mut self) {
        dismantle(self.root.take());
    }
}

/// Free a subtree one node at a time. Dropping a degenerate tree recursively could overflow
/// the stack.
fn dismantle<N: IndexableNum, const D: usize>(root: Link<N, D>) {
    let mut stack: Vec<Box<KDNode<N, D>>> = root.into_iter().collect();
    while let Some(mut node) = stack.pop() {
        stack.extend(node.left.take());
        stack.extend(node.right.take());
    }
}

impl<N: IndexableNum, const D: usize> Clone for KDTree<N, D> {
    fn clone(&self) -> Self {
        Self {
            root: node::copy(&self.root),
            len: self.len,
        }
    }
}

impl<N: IndexableNum, const D: usize> fmt::Debug for KDTree<N, D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KDTree")
            .field("len", &self.len)
            .field("height", &self.height())
            .finish()
    }
}

impl<N: IndexableNum, const D: usize> Default for KDTree<N, D> {
    fn default() -> Self {
        Self::new()
    }
}

impl<N: IndexableNum, const D: usize> Extend<Point<N, D>> for KDTree<N, D> {
    fn extend<I: IntoIterator<Item = Point<N, D>>>(&mut self, iter: I) {
        for point in iter {
            node::insert(&mut self.root, point);
            self.len += 1;
        }
    }
}

impl<N: IndexableNum, const D: usize> FromIterator<Point<N, D>> for KDTree<N, D> {
    fn from_iter<I: IntoIterator<Item = Point<N, D>>>(iter: I) -> Self {
        let mut tree = Self::new();
        tree.extend(iter);
        tree
    }
}

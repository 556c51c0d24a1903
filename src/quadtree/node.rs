use tinyvec::ArrayVec;
use tracing::debug;

use crate::knn::{BoundedPriorityQueue, NearestNeighbor};
use crate::point::Point;
use crate::quadtree::region::{Quadrant, Region};
use crate::r#type::IndexableNum;

type Child<N> = Option<Box<QuadNode<N>>>;

/// A child and the distance from the query anchor to its region. `ArrayVec` needs a
/// `Default` item for its inline storage, hence the `Option`; pushed entries are always `Some`.
type Candidate<'a, N> = (f64, Option<&'a QuadNode<N>>);

/// A node of a [`PRQuadTree`][crate::quadtree::PRQuadTree].
#[derive(Debug, Clone)]
pub enum QuadNode<N: IndexableNum> {
    /// A bucket of points.
    Leaf(Leaf<N>),
    /// A cell split into four quadrants.
    Internal(Internal<N>),
}

/// A cell storing its points directly.
///
/// A leaf holds at most the tree's bucket size, unless it is a unit cell that cannot be split
/// any further.
#[derive(Debug, Clone)]
pub struct Leaf<N: IndexableNum> {
    region: Region<N>,
    points: Vec<Point<N, 2>>,
}

impl<N: IndexableNum> Leaf<N> {
    /// The cell covered by this leaf.
    pub fn region(&self) -> &Region<N> {
        &self.region
    }

    /// The stored points, in no particular order.
    pub fn points(&self) -> &[Point<N, 2>] {
        &self.points
    }
}

/// A cell split into quadrants, with one optional child per [`Quadrant`].
#[derive(Debug, Clone)]
pub struct Internal<N: IndexableNum> {
    region: Region<N>,
    children: [Child<N>; 4],
}

impl<N: IndexableNum> Internal<N> {
    fn new(region: Region<N>) -> Self {
        Self {
            region,
            children: [None, None, None, None],
        }
    }

    /// The cell covered by this node.
    pub fn region(&self) -> &Region<N> {
        &self.region
    }

    /// The child covering `quadrant`, if any point falls there.
    pub fn child(&self, quadrant: Quadrant) -> Option<&QuadNode<N>> {
        self.children[quadrant.index()].as_deref()
    }

    /// The non-empty children, in slot order.
    pub fn children(&self) -> impl Iterator<Item = (Quadrant, &QuadNode<N>)> {
        Quadrant::ALL
            .into_iter()
            .filter_map(|q| self.child(q).map(|child| (q, child)))
    }

    fn count(&self) -> usize {
        self.children().map(|(_, child)| child.count()).sum()
    }

    fn insert(&mut self, point: Point<N, 2>, bucket_size: usize) {
        let quadrant = self.region.quadrant_of(&point);
        let slot = &mut self.children[quadrant.index()];
        if let Some(child) = slot.as_deref_mut() {
            child.insert(point, bucket_size);
        } else {
            let region = self.region.quadrant_region(quadrant);
            *slot = Some(Box::new(QuadNode::new_leaf(region, point)));
        }
    }

    /// Children sorted by their distance from `anchor`, nearest first.
    fn children_by_distance(
        &self,
        anchor: &Point<N, 2>,
    ) -> impl Iterator<Item = (f64, &QuadNode<N>)> {
        let mut ordered: ArrayVec<[Candidate<'_, N>; 4]> = ArrayVec::new();
        for (_, child) in self.children() {
            ordered.push((child.region().distance_to(anchor), Some(child)));
        }
        ordered.sort_by(|a, b| a.0.total_cmp(&b.0));
        ordered
            .into_iter()
            .filter_map(|(distance, child)| child.map(|child| (distance, child)))
    }
}

impl<N: IndexableNum> QuadNode<N> {
    pub(crate) fn new_leaf(region: Region<N>, point: Point<N, 2>) -> Self {
        QuadNode::Leaf(Leaf {
            region,
            points: vec![point],
        })
    }

    /// The cell covered by this node.
    pub fn region(&self) -> &Region<N> {
        match self {
            QuadNode::Leaf(leaf) => &leaf.region,
            QuadNode::Internal(internal) => &internal.region,
        }
    }

    /// The points stored directly in this node. Empty for an internal node.
    pub fn points(&self) -> &[Point<N, 2>] {
        match self {
            QuadNode::Leaf(leaf) => &leaf.points,
            QuadNode::Internal(_) => &[],
        }
    }

    /// The non-empty children of this node. Empty for a leaf.
    pub fn children(&self) -> impl Iterator<Item = (Quadrant, &QuadNode<N>)> {
        let internal = match self {
            QuadNode::Leaf(_) => None,
            QuadNode::Internal(internal) => Some(internal),
        };
        internal.into_iter().flat_map(Internal::children)
    }

    /// Returns `true` if this node is a leaf.
    pub fn is_leaf(&self) -> bool {
        matches!(self, QuadNode::Leaf(_))
    }

    /// The number of points stored in this subtree.
    pub fn count(&self) -> usize {
        match self {
            QuadNode::Leaf(leaf) => leaf.points.len(),
            QuadNode::Internal(internal) => internal.count(),
        }
    }

    /// The height of this subtree; 0 for a leaf.
    pub fn height(&self) -> usize {
        match self {
            QuadNode::Leaf(_) => 0,
            QuadNode::Internal(internal) => {
                1 + internal
                    .children()
                    .map(|(_, child)| child.height())
                    .max()
                    .unwrap_or(0)
            }
        }
    }

    /// Store `point`, which must lie inside this node's region.
    pub(crate) fn insert(&mut self, point: Point<N, 2>, bucket_size: usize) {
        match self {
            QuadNode::Leaf(leaf) => {
                leaf.points.push(point);
                if leaf.points.len() > bucket_size && leaf.region.k() > 0 {
                    let region = leaf.region;
                    let points = std::mem::take(&mut leaf.points);
                    debug!(k = region.k(), points = points.len(), "subdividing quadtree leaf");

                    let mut internal = Internal::new(region);
                    for point in points {
                        internal.insert(point, bucket_size);
                    }
                    *self = QuadNode::Internal(internal);
                }
            }
            QuadNode::Internal(internal) => internal.insert(point, bucket_size),
        }
    }

    /// Remove one copy of `point`, collapsing this node into a leaf if it no longer holds more
    /// than `bucket_size` points.
    pub(crate) fn delete(&mut self, point: &Point<N, 2>, bucket_size: usize) -> bool {
        match self {
            QuadNode::Leaf(leaf) => match leaf.points.iter().position(|p| p == point) {
                Some(index) => {
                    leaf.points.swap_remove(index);
                    true
                }
                None => false,
            },
            QuadNode::Internal(internal) => {
                if !internal.region.contains(point) {
                    return false;
                }
                let slot = &mut internal.children[internal.region.quadrant_of(point).index()];
                let Some(child) = slot.as_deref_mut() else {
                    return false;
                };
                if !child.delete(point, bucket_size) {
                    return false;
                }
                if child.count() == 0 {
                    *slot = None;
                }

                if internal.count() <= bucket_size {
                    let region = internal.region;
                    let mut points = Vec::with_capacity(bucket_size);
                    for (_, child) in internal.children() {
                        child.collect(&mut points);
                    }
                    debug!(k = region.k(), points = points.len(), "collapsing quadtree node");
                    *self = QuadNode::Leaf(Leaf { region, points });
                }
                true
            }
        }
    }

    pub(crate) fn search(&self, point: &Point<N, 2>) -> bool {
        let mut node = self;
        loop {
            match node {
                QuadNode::Leaf(leaf) => return leaf.points.contains(point),
                QuadNode::Internal(internal) => {
                    match internal.child(internal.region.quadrant_of(point)) {
                        Some(child) => node = child,
                        None => return false,
                    }
                }
            }
        }
    }

    /// Push every point within `radius` of `anchor` onto `results`.
    pub(crate) fn range(&self, anchor: &Point<N, 2>, radius: f64, results: &mut Vec<Point<N, 2>>) {
        match self {
            QuadNode::Leaf(leaf) => results.extend(
                leaf.points
                    .iter()
                    .filter(|p| anchor.distance(p) <= radius),
            ),
            QuadNode::Internal(internal) => {
                for (_, child) in internal.children() {
                    if child.region().intersects_circle(anchor, radius) {
                        child.range(anchor, radius, results);
                    }
                }
            }
        }
    }

    /// Offer the closest point to `anchor` (copies of `anchor` excluded) to `nearest`.
    pub(crate) fn nearest_neighbor(
        &self,
        anchor: &Point<N, 2>,
        nearest: &mut NearestNeighbor<Point<N, 2>>,
    ) {
        match self {
            QuadNode::Leaf(leaf) => {
                for p in leaf.points.iter().filter(|p| *p != anchor) {
                    nearest.offer(*p, anchor.distance(p));
                }
            }
            QuadNode::Internal(internal) => {
                for (distance, child) in internal.children_by_distance(anchor) {
                    if nearest.may_improve(distance) {
                        child.nearest_neighbor(anchor, nearest);
                    }
                }
            }
        }
    }

    /// Offer every point that could be among the `queue.capacity()` nearest to `anchor`
    /// (copies of `anchor` excluded) to `queue`.
    pub(crate) fn k_nearest_neighbors(
        &self,
        anchor: &Point<N, 2>,
        queue: &mut BoundedPriorityQueue<Point<N, 2>>,
    ) {
        match self {
            QuadNode::Leaf(leaf) => {
                for p in leaf.points.iter().filter(|p| *p != anchor) {
                    queue.enqueue(*p, anchor.distance(p));
                }
            }
            QuadNode::Internal(internal) => {
                for (distance, child) in internal.children_by_distance(anchor) {
                    if !queue.would_reject(distance) {
                        child.k_nearest_neighbors(anchor, queue);
                    }
                }
            }
        }
    }

    /// Collect every point in the subtree, quadrants in slot order.
    pub(crate) fn collect(&self, results: &mut Vec<Point<N, 2>>) {
        match self {
            QuadNode::Leaf(leaf) => results.extend_from_slice(&leaf.points),
            QuadNode::Internal(internal) => {
                for (_, child) in internal.children() {
                    child.collect(results);
                }
            }
        }
    }
}

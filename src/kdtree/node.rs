//! Node storage and the algorithms that walk it.
//!
//! Queries run on an explicit stack so that a degenerate tree (for example one built from
//! sorted input, whose height grows linearly) cannot exhaust the call stack. Insertion is
//! iterative as well, and so are deletion and copying.

use tinyvec::TinyVec;
use tracing::debug;

use crate::knn::{BoundedPriorityQueue, NearestNeighbor};
use crate::point::Point;
use crate::r#type::IndexableNum;

pub(crate) type Link<N, const D: usize> = Option<Box<KDNode<N, D>>>;

/// A stack frame: the node to visit, its depth and a lower bound on the distance from the
/// anchor to any point below it.
type Frame<'a, N, const D: usize> = (Option<&'a KDNode<N, D>>, usize, f64);

#[derive(Debug)]
pub(crate) struct KDNode<N: IndexableNum, const D: usize> {
    pub(crate) point: Point<N, D>,
    /// Length of the longest path down to a leaf. A leaf has height 0.
    pub(crate) height: usize,
    pub(crate) left: Link<N, D>,
    pub(crate) right: Link<N, D>,
}

impl<N: IndexableNum, const D: usize> KDNode<N, D> {
    fn new(point: Point<N, D>) -> Self {
        Self {
            point,
            height: 0,
            left: None,
            right: None,
        }
    }

    #[inline]
    pub(crate) fn is_leaf(&self) -> bool {
        self.left.is_none() && self.right.is_none()
    }

    /// Points strictly below this node's coordinate on `axis` live on the left; ties go right.
    #[inline]
    fn goes_left(&self, point: &Point<N, D>, axis: usize) -> bool {
        point.coord(axis) < self.point.coord(axis)
    }

    /// The child on the side of `anchor`, then the child on the other side.
    #[inline]
    fn near_far(&self, anchor: &Point<N, D>, axis: usize) -> (Option<&Self>, Option<&Self>) {
        if self.goes_left(anchor, axis) {
            (self.left.as_deref(), self.right.as_deref())
        } else {
            (self.right.as_deref(), self.left.as_deref())
        }
    }

    fn update_height(&mut self) {
        self.height = (1 + link_height(&self.left).max(link_height(&self.right))) as usize;
    }
}

/// Height of a possibly empty subtree; an empty subtree has height -1.
#[inline]
pub(crate) fn link_height<N: IndexableNum, const D: usize>(link: &Link<N, D>) -> isize {
    link.as_ref().map_or(-1, |node| node.height as isize)
}

pub(crate) fn insert<N: IndexableNum, const D: usize>(root: &mut Link<N, D>, point: Point<N, D>) {
    // Find the depth the new node lands at, so the heights on its path can be fixed on the
    // way down.
    let mut leaf_depth = 0;
    let mut cursor = root.as_deref();
    while let Some(node) = cursor {
        cursor = if node.goes_left(&point, leaf_depth % D) {
            node.left.as_deref()
        } else {
            node.right.as_deref()
        };
        leaf_depth += 1;
    }

    let mut depth = 0;
    let mut slot = root;
    while let Some(node) = slot {
        node.height = node.height.max(leaf_depth - depth);
        slot = if node.goes_left(&point, depth % D) {
            &mut node.left
        } else {
            &mut node.right
        };
        depth += 1;
    }
    *slot = Some(Box::new(KDNode::new(point)));
}

/// Remove one node holding `target` from the tree in `root`.
///
/// A node with children is not unlinked: its point is overwritten with the minimum on its
/// cutting axis from the right subtree (after moving a lone left subtree to the right), and
/// the walk continues down the right subtree to delete that minimum in turn. The walk ends at
/// a leaf, which is unlinked. Returns `false` if `target` is absent, leaving the tree
/// untouched.
pub(crate) fn delete<N: IndexableNum, const D: usize>(
    root: &mut Link<N, D>,
    target: &Point<N, D>,
) -> bool {
    // One entry per step down: whether it went left, and the height of the child left behind.
    let mut path: Vec<(bool, isize)> = vec![];
    let mut target = *target;
    let mut slot = &mut *root;
    loop {
        if slot
            .as_deref()
            .is_some_and(|node| node.point == target && node.is_leaf())
        {
            break;
        }
        // No point has been overwritten before the first match, so bailing out is safe.
        let Some(node) = slot.as_deref_mut() else {
            return false;
        };
        let depth = path.len();
        let axis = depth % D;

        let go_left = if node.point == target {
            if node.right.is_none() {
                node.right = node.left.take();
            }
            if let Some(right) = node.right.as_deref() {
                let replacement = *minimum(right, axis, depth + 1);
                debug!(depth, axis, "replacing deleted point with subtree minimum");
                node.point = replacement;
                target = replacement;
            }
            false
        } else {
            node.goes_left(&target, axis)
        };

        if go_left {
            path.push((true, link_height(&node.right)));
            slot = &mut node.left;
        } else {
            path.push((false, link_height(&node.left)));
            slot = &mut node.right;
        }
    }
    *slot = None;

    // Heights along the path, computed bottom-up and then written top-down.
    let mut below = -1;
    let mut heights: Vec<usize> = path
        .iter()
        .rev()
        .map(|(_, sibling)| {
            below = 1 + below.max(*sibling);
            below as usize
        })
        .collect();
    heights.reverse();

    let mut cursor = root;
    for ((went_left, _), height) in path.iter().zip(heights) {
        let Some(node) = cursor.as_deref_mut() else {
            break;
        };
        node.height = height;
        cursor = if *went_left {
            &mut node.left
        } else {
            &mut node.right
        };
    }
    true
}

/// Copy a subtree node by node, children before parents.
pub(crate) fn copy<N: IndexableNum, const D: usize>(root: &Link<N, D>) -> Link<N, D> {
    // Parent, right subtree, left subtree; reversed this is a post-order.
    let mut order: Vec<&KDNode<N, D>> = Vec::new();
    let mut stack: Vec<&KDNode<N, D>> = root.as_deref().into_iter().collect();
    while let Some(node) = stack.pop() {
        order.push(node);
        stack.extend(node.left.as_deref());
        stack.extend(node.right.as_deref());
    }

    let mut built: Vec<Box<KDNode<N, D>>> = Vec::with_capacity(order.len());
    for node in order.into_iter().rev() {
        let right = if node.right.is_some() { built.pop() } else { None };
        let left = if node.left.is_some() { built.pop() } else { None };
        built.push(Box::new(KDNode {
            point: node.point,
            height: node.height,
            left,
            right,
        }));
    }
    built.pop()
}

/// The point with the smallest coordinate on `axis` in the subtree rooted at `root`, which
/// sits at `depth`.
pub(crate) fn minimum<N: IndexableNum, const D: usize>(
    root: &KDNode<N, D>,
    axis: usize,
    depth: usize,
) -> &Point<N, D> {
    let mut best = &root.point;
    let mut stack: TinyVec<[Frame<N, D>; 32]> = TinyVec::new();
    stack.push((Some(root), depth, 0.));

    while let Some((Some(node), depth, _)) = stack.pop() {
        if node.point.coord(axis) < best.coord(axis) {
            best = &node.point;
        }
        if let Some(left) = node.left.as_deref() {
            stack.push((Some(left), depth + 1, 0.));
        }
        // Nodes cutting on `axis` hold nothing smaller on their right.
        if depth % D != axis {
            if let Some(right) = node.right.as_deref() {
                stack.push((Some(right), depth + 1, 0.));
            }
        }
    }
    best
}

pub(crate) fn search<N: IndexableNum, const D: usize>(
    root: &KDNode<N, D>,
    target: &Point<N, D>,
) -> bool {
    let mut depth = 0;
    let mut cursor = Some(root);
    while let Some(node) = cursor {
        if node.point == *target {
            return true;
        }
        cursor = if node.goes_left(target, depth % D) {
            node.left.as_deref()
        } else {
            node.right.as_deref()
        };
        depth += 1;
    }
    false
}

/// Push every point within `radius` of `anchor` (inclusive) onto `results`.
pub(crate) fn range<N: IndexableNum, const D: usize>(
    root: &KDNode<N, D>,
    anchor: &Point<N, D>,
    radius: f64,
    results: &mut Vec<Point<N, D>>,
) {
    let mut stack: TinyVec<[Frame<N, D>; 32]> = TinyVec::new();
    stack.push((Some(root), 0, 0.));

    while let Some((Some(node), depth, _)) = stack.pop() {
        if anchor.distance(&node.point) <= radius {
            results.push(node.point);
        }

        let axis = depth % D;
        let (near, far) = node.near_far(anchor, axis);
        // Only cross the splitting plane if it lies within the query ball.
        if far.is_some() && anchor.axis_gap(&node.point, axis) <= radius {
            stack.push((far, depth + 1, 0.));
        }
        if near.is_some() {
            stack.push((near, depth + 1, 0.));
        }
    }
}

/// Branch-and-bound search for the point closest to `anchor`, skipping copies of `anchor`.
pub(crate) fn nearest_neighbor<N: IndexableNum, const D: usize>(
    root: &KDNode<N, D>,
    anchor: &Point<N, D>,
    nearest: &mut NearestNeighbor<Point<N, D>>,
) {
    let mut stack: TinyVec<[Frame<N, D>; 32]> = TinyVec::new();
    stack.push((Some(root), 0, 0.));

    while let Some((Some(node), depth, bound)) = stack.pop() {
        if !nearest.may_improve(bound) {
            continue;
        }
        if node.point != *anchor {
            nearest.offer(node.point, anchor.distance(&node.point));
        }

        let axis = depth % D;
        let (near, far) = node.near_far(anchor, axis);
        // The far side is pushed first so the anchor's side is explored first.
        if far.is_some() {
            let far_bound = bound.max(anchor.axis_gap(&node.point, axis));
            stack.push((far, depth + 1, far_bound));
        }
        if near.is_some() {
            stack.push((near, depth + 1, bound));
        }
    }
}

/// Offer every point that could be among the `queue.capacity()` nearest to `anchor` (copies of
/// `anchor` excluded) to `queue`.
pub(crate) fn k_nearest_neighbors<N: IndexableNum, const D: usize>(
    root: &KDNode<N, D>,
    anchor: &Point<N, D>,
    queue: &mut BoundedPriorityQueue<Point<N, D>>,
) {
    let mut stack: TinyVec<[Frame<N, D>; 32]> = TinyVec::new();
    stack.push((Some(root), 0, 0.));

    while let Some((Some(node), depth, bound)) = stack.pop() {
        if queue.would_reject(bound) {
            continue;
        }
        if node.point != *anchor {
            queue.enqueue(node.point, anchor.distance(&node.point));
        }

        let axis = depth % D;
        let (near, far) = node.near_far(anchor, axis);
        if far.is_some() {
            let far_bound = bound.max(anchor.axis_gap(&node.point, axis));
            stack.push((far, depth + 1, far_bound));
        }
        if near.is_some() {
            stack.push((near, depth + 1, bound));
        }
    }
}

/// Collect every point in the subtree, in pre-order.
pub(crate) fn collect<N: IndexableNum, const D: usize>(
    root: &KDNode<N, D>,
    results: &mut Vec<Point<N, D>>,
) {
    let mut stack: TinyVec<[Frame<N, D>; 32]> = TinyVec::new();
    stack.push((Some(root), 0, 0.));

    while let Some((Some(node), depth, _)) = stack.pop() {
        results.push(node.point);
        if node.right.is_some() {
            stack.push((node.right.as_deref(), depth + 1, 0.));
        }
        if node.left.is_some() {
            stack.push((node.left.as_deref(), depth + 1, 0.));
        }
    }
}

//! Utilities to traverse the KDTree structure.

use crate::kdtree::node::KDNode;
use crate::point::Point;
use crate::r#type::IndexableNum;

/// A read-only view of a node in a [`KDTree`][crate::kdtree::KDTree].
#[derive(Debug, Clone, Copy)]
pub struct Node<'a, N: IndexableNum, const D: usize> {
    node: &'a KDNode<N, D>,
    depth: usize,
}

impl<'a, N: IndexableNum, const D: usize> Node<'a, N, D> {
    pub(crate) fn from_root(node: &'a KDNode<N, D>) -> Self {
        Self { node, depth: 0 }
    }

    /// A copy of the point stored in this node.
    pub fn point(&self) -> Point<N, D> {
        self.node.point
    }

    /// The cached height of the subtree rooted here. Leaves have height 0.
    pub fn height(&self) -> usize {
        self.node.height
    }

    /// Depth of this node below the root.
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// The axis this node splits its children on.
    pub fn axis(&self) -> usize {
        self.depth % D
    }

    /// The child holding points strictly less than this node's point on [`axis`][Self::axis].
    pub fn left(&self) -> Option<Node<'a, N, D>> {
        self.node.left.as_deref().map(|node| self.child(node))
    }

    /// The child holding points greater than or equal to this node's point on
    /// [`axis`][Self::axis].
    pub fn right(&self) -> Option<Node<'a, N, D>> {
        self.node.right.as_deref().map(|node| self.child(node))
    }

    /// Returns `true` if this node has no children.
    #[inline]
    pub fn is_leaf(&self) -> bool {
        self.node.is_leaf()
    }

    fn child(&self, node: &'a KDNode<N, D>) -> Node<'a, N, D> {
        Self {
            node,
            depth: self.depth + 1,
        }
    }
}

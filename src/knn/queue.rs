use std::collections::{vec_deque, VecDeque};

use crate::error::{PointIndexError, Result};

#[derive(Debug, Clone, PartialEq)]
struct Entry<T> {
    item: T,
    priority: f64,
}

/// A fixed-capacity queue that keeps the `capacity` lowest-priority items it has been offered.
///
/// Entries are kept in ascending priority order. When an enqueue pushes the queue over
/// capacity, the single highest-priority entry is evicted. Equal priorities keep their
/// insertion order, so among ties the earliest offered items survive.
///
/// k-NN traversals use the distance to the anchor as the priority: the queue then holds the
/// `k` nearest candidates seen so far and [`worst_priority`][Self::worst_priority] is the
/// current pruning radius once the queue [is full][Self::is_full].
///
/// ```
/// use point_index::knn::BoundedPriorityQueue;
///
/// let mut queue = BoundedPriorityQueue::new(2).unwrap();
/// queue.enqueue("far", 10.0);
/// queue.enqueue("near", 1.0);
/// queue.enqueue("middle", 5.0);
///
/// assert_eq!(queue.len(), 2);
/// assert_eq!(queue.peek_best(), Some(&"near"));
/// assert_eq!(queue.peek_worst(), Some(&"middle"));
/// ```
///
/// Priorities must not be NaN.
#[derive(Debug, Clone)]
pub struct BoundedPriorityQueue<T> {
    entries: VecDeque<Entry<T>>,
    capacity: usize,
}

impl<T> BoundedPriorityQueue<T> {
    /// Create an empty queue retaining at most `capacity` entries.
    ///
    /// Fails with [`PointIndexError::InvalidConfiguration`] if `capacity` is zero.
    pub fn new(capacity: usize) -> Result<Self> {
        if capacity == 0 {
            return Err(PointIndexError::InvalidConfiguration(
                "queue capacity must be at least 1".to_string(),
            ));
        }
        Ok(Self {
            entries: VecDeque::with_capacity(capacity + 1),
            capacity,
        })
    }

    /// Insert `item` in priority order, evicting the worst entry if the queue overflows.
    pub fn enqueue(&mut self, item: T, priority: f64) {
        // After any existing entries with an equal priority.
        let index = self.entries.partition_point(|e| e.priority <= priority);
        if index == self.capacity {
            // Would be evicted immediately.
            return;
        }
        self.entries.insert(index, Entry { item, priority });
        if self.entries.len() > self.capacity {
            self.entries.pop_back();
        }
    }

    /// The lowest-priority (nearest) item.
    pub fn peek_best(&self) -> Option<&T> {
        self.entries.front().map(|e| &e.item)
    }

    /// The highest-priority (farthest) item.
    pub fn peek_worst(&self) -> Option<&T> {
        self.entries.back().map(|e| &e.item)
    }

    /// The priority of the best entry.
    pub fn best_priority(&self) -> Option<f64> {
        self.entries.front().map(|e| e.priority)
    }

    /// The priority of the worst entry.
    pub fn worst_priority(&self) -> Option<f64> {
        self.entries.back().map(|e| e.priority)
    }

    /// Remove and return the lowest-priority item, or `None` if the queue is empty.
    pub fn dequeue_best(&mut self) -> Option<T> {
        self.entries.pop_front().map(|e| e.item)
    }

    /// The number of entries currently held.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the queue holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The maximum number of entries retained.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns `true` once the queue holds `capacity` entries.
    pub fn is_full(&self) -> bool {
        self.entries.len() == self.capacity
    }

    /// Returns `true` if an item offered with `priority` would not be retained.
    ///
    /// A traversal can skip any subtree whose closest possible point satisfies this.
    #[inline]
    pub fn would_reject(&self, priority: f64) -> bool {
        self.is_full() && self.worst_priority().is_some_and(|worst| priority >= worst)
    }

    /// Iterate over `(item, priority)` pairs from best to worst.
    ///
    /// The iterator borrows the queue, so the queue cannot be modified while it is alive.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            inner: self.entries.iter(),
        }
    }

    /// Consume the queue into `(item, priority)` pairs from best to worst.
    pub fn into_sorted_vec(self) -> Vec<(T, f64)> {
        self.entries
            .into_iter()
            .map(|e| (e.item, e.priority))
            .collect()
    }
}

impl<T: PartialEq> BoundedPriorityQueue<T> {
    /// Returns `true` if an entry equal to `item` is held.
    pub fn contains(&self, item: &T) -> bool {
        self.entries.iter().any(|e| e.item == *item)
    }
}

/// Iterator over the entries of a [`BoundedPriorityQueue`], from best to worst.
#[derive(Debug, Clone)]
pub struct Iter<'a, T> {
    inner: vec_deque::Iter<'a, Entry<T>>,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = (&'a T, f64);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|e| (&e.item, e.priority))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<T> DoubleEndedIterator for Iter<'_, T> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back().map(|e| (&e.item, e.priority))
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {}

impl<'a, T> IntoIterator for &'a BoundedPriorityQueue<T> {
    type Item = (&'a T, f64);
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<T> IntoIterator for BoundedPriorityQueue<T> {
    type Item = T;
    type IntoIter = IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        IntoIter {
            inner: self.entries.into_iter(),
        }
    }
}

/// Owning iterator over the items of a [`BoundedPriorityQueue`], from best to worst.
#[derive(Debug)]
pub struct IntoIter<T> {
    inner: vec_deque::IntoIter<Entry<T>>,
}

impl<T> Iterator for IntoIter<T> {
    type Item = T;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|e| e.item)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<T> ExactSizeIterator for IntoIter<T> {}

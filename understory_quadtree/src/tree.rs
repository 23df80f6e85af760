// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Public `QuadTree` API.

use tracing::{debug, trace};

use crate::bounded::Bounded;
use crate::config::QuadTreeConfig;
use crate::error::BuildError;
use crate::node::Node;
use crate::types::{Aabb2D, Scalar};

/// A region quad tree over items with axis-aligned bounds.
///
/// The tree covers a fixed universe given at construction. Leaves split into
/// four quadrants once they exceed the configured capacity, and subtrees
/// collapse back into a leaf as soon as removals bring them back within
/// capacity. Items lying across a midline stay on the node they straddle.
///
/// Rectangle queries return a superset of the overlapping items: items stored
/// on any visited node are reported without being tested, so callers that need
/// exact answers filter the candidates themselves.
///
/// ## Example
///
/// ```rust
/// use understory_quadtree::{Aabb2D, QuadTree};
///
/// let mut tree = QuadTree::new(2, Aabb2D::new(0.0, 0.0, 100.0, 100.0)).unwrap();
/// tree.insert((Aabb2D::from_xywh(1.0, 1.0, 2.0, 2.0), "a"));
/// tree.insert((Aabb2D::from_xywh(90.0, 90.0, 2.0, 2.0), "b"));
/// tree.insert((Aabb2D::from_xywh(1.0, 90.0, 2.0, 2.0), "c"));
/// assert!(!tree.root().is_leaf());
///
/// let mut hits: Vec<_> = tree
///     .query_intersecting(Aabb2D::new(0.0, 0.0, 10.0, 100.0))
///     .map(|(_, name)| *name)
///     .collect();
/// hits.sort_unstable();
/// assert_eq!(hits, ["a", "c"]);
/// ```
#[derive(Clone, Debug)]
pub struct QuadTree<T, I> {
    root: Node<T, I>,
    config: QuadTreeConfig,
}

impl<T: Scalar, I: Bounded<T>> QuadTree<T, I> {
    /// Create an empty tree over `bounds` whose leaves split above `capacity` items.
    ///
    /// # Errors
    ///
    /// See [`QuadTree::with_config`].
    pub fn new(capacity: usize, bounds: Aabb2D<T>) -> Result<Self, BuildError> {
        Self::with_config(bounds, QuadTreeConfig::new(capacity))
    }

    /// Create an empty tree over `bounds` with an explicit configuration.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::ZeroCapacity`] if `config.capacity` is 0 and
    /// [`BuildError::DegenerateBounds`] if `bounds` has no area.
    pub fn with_config(bounds: Aabb2D<T>, config: QuadTreeConfig) -> Result<Self, BuildError> {
        if config.capacity == 0 {
            return Err(BuildError::ZeroCapacity);
        }
        if bounds.is_empty() {
            return Err(BuildError::DegenerateBounds);
        }
        Ok(Self {
            root: Node::new(bounds, 0, config.capacity, config.max_depth),
            config,
        })
    }

    /// Insert an item.
    ///
    /// Items whose bounds fall entirely outside the tree are dropped. Returns
    /// whether the item was stored.
    pub fn insert(&mut self, item: I) -> bool {
        let stored = self.root.insert(item);
        if !stored {
            debug!(bounds = ?self.root.bounds(), "dropped item outside quad tree bounds");
        }
        stored
    }

    /// Remove the first stored item equal to `item`.
    ///
    /// The item is located through its current bounds, which must match the
    /// bounds it had when inserted. Use [`QuadTree::remove_scan`] for items
    /// that may have moved. Returns whether an item was removed.
    pub fn remove(&mut self, item: &I) -> bool
    where
        I: PartialEq,
    {
        self.root.remove(item)
    }

    /// Remove the first stored item equal to `item`, searching the whole tree.
    ///
    /// Slower than [`QuadTree::remove`], but does not depend on the item's
    /// bounds. Returns whether an item was removed.
    pub fn remove_scan(&mut self, item: &I) -> bool
    where
        I: PartialEq,
    {
        self.root.remove_scan(item)
    }

    /// Remove all items.
    ///
    /// Whether split nodes survive depends on
    /// [`QuadTreeConfig::clear_policy`].
    pub fn clear(&mut self) {
        self.root.clear(self.config.clear_policy);
        trace!(policy = ?self.config.clear_policy, "cleared quad tree");
    }

    /// Items that might overlap `rect`; see [`Node::visit_intersecting`].
    pub fn query_intersecting(&self, rect: Aabb2D<T>) -> impl Iterator<Item = &I> + '_ {
        self.root.query_intersecting(rect)
    }

    /// Visit items that might overlap `rect` without allocating.
    pub fn visit_intersecting<'a, F: FnMut(&'a I)>(&'a self, rect: Aabb2D<T>, f: F) {
        self.root.visit_intersecting(rect, f);
    }

    /// The leaf containing the point, or `None` outside the tree bounds.
    pub fn node_at(&self, x: T, y: T) -> Option<&Node<T, I>> {
        self.root.node_at(x, y)
    }
}

impl<T: Copy, I> QuadTree<T, I> {
    /// The root node.
    #[inline]
    pub fn root(&self) -> &Node<T, I> {
        &self.root
    }

    /// The universe this tree indexes.
    #[inline]
    pub fn bounds(&self) -> Aabb2D<T> {
        self.root.bounds()
    }

    /// The configuration the tree was built with.
    #[inline]
    pub fn config(&self) -> &QuadTreeConfig {
        &self.config
    }

    /// Number of stored items. Walks the tree.
    pub fn len(&self) -> usize {
        self.root.total_item_count()
    }

    /// Whether the tree holds no items.
    pub fn is_empty(&self) -> bool {
        let mut empty = true;
        self.root.for_each_node(|n| empty &= n.items().is_empty());
        empty
    }

    /// Every stored item, each exactly once, in no particular order.
    pub fn all_items(&self) -> impl Iterator<Item = &I> + '_ {
        self.root.all_items()
    }
}

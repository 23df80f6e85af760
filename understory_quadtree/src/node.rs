// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Quad tree nodes: splitting, collapsing, and recursive queries.

use alloc::boxed::Box;
use alloc::vec::Vec;

use smallvec::SmallVec;
use tracing::trace;

use crate::bounded::Bounded;
use crate::config::ClearPolicy;
use crate::quadrant::{Quadrant, fitting_quadrant, reaches_quadrant, subdivide};
use crate::types::{Aabb2D, Scalar};

type Items<I> = SmallVec<[I; 4]>;

/// One quadrant of space at a given depth.
///
/// A node is either a leaf holding items directly, or an internal node with
/// exactly four children. An internal node only keeps the items that straddle
/// one of its midlines and so cannot be pushed into a child.
///
/// Nodes are read-only from the outside; mutation goes through
/// [`QuadTree`][crate::QuadTree].
#[derive(Clone, Debug)]
pub struct Node<T, I> {
    bounds: Aabb2D<T>,
    depth: u32,
    capacity: usize,
    max_depth: Option<u32>,
    items: Items<I>,
    /// Indexed by [`Quadrant::index`].
    children: Option<Box<[Self; 4]>>,
}

impl<T: Copy, I> Node<T, I> {
    /// The region this node covers.
    #[inline]
    pub fn bounds(&self) -> Aabb2D<T> {
        self.bounds
    }

    /// Distance from the root; the root is at depth 0.
    #[inline]
    pub fn depth(&self) -> u32 {
        self.depth
    }

    /// Item count above which a leaf splits.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Whether this node has no children.
    #[inline]
    pub fn is_leaf(&self) -> bool {
        self.children.is_none()
    }

    /// Items stored on this node only.
    ///
    /// For an internal node these are the items lying across a midline.
    #[inline]
    pub fn items(&self) -> &[I] {
        &self.items
    }

    /// All four children in [`Quadrant::ALL`] order, or `None` for a leaf.
    #[inline]
    pub fn children(&self) -> Option<&[Self; 4]> {
        self.children.as_deref()
    }

    /// The child covering `quadrant`, or `None` for a leaf.
    #[inline]
    pub fn child(&self, quadrant: Quadrant) -> Option<&Self> {
        self.children().map(|c| &c[quadrant.index()])
    }

    /// Bottom-left child, or `None` for a leaf.
    pub fn bottom_left(&self) -> Option<&Self> {
        self.child(Quadrant::BottomLeft)
    }

    /// Bottom-right child, or `None` for a leaf.
    pub fn bottom_right(&self) -> Option<&Self> {
        self.child(Quadrant::BottomRight)
    }

    /// Top-left child, or `None` for a leaf.
    pub fn top_left(&self) -> Option<&Self> {
        self.child(Quadrant::TopLeft)
    }

    /// Top-right child, or `None` for a leaf.
    pub fn top_right(&self) -> Option<&Self> {
        self.child(Quadrant::TopRight)
    }

    /// Number of items in this node and all of its descendants.
    ///
    /// This walks the subtree; it is not cached.
    pub fn total_item_count(&self) -> usize {
        let below: usize = self
            .children()
            .map_or(0, |c| c.iter().map(Self::total_item_count).sum());
        self.items.len() + below
    }

    /// Visit every item in this subtree.
    pub fn visit_all<'a, F: FnMut(&'a I)>(&'a self, mut f: F) {
        self.visit_all_inner(&mut f);
    }

    fn visit_all_inner<'a, F: FnMut(&'a I)>(&'a self, f: &mut F) {
        for item in &self.items {
            f(item);
        }
        if let Some(children) = self.children() {
            for q in Quadrant::TRAVERSAL {
                children[q.index()].visit_all_inner(f);
            }
        }
    }

    /// Every item in this subtree, each exactly once, in no particular order.
    pub fn all_items(&self) -> impl Iterator<Item = &I> + '_ {
        let mut out = Vec::new();
        self.visit_all(|i| out.push(i));
        out.into_iter()
    }

    /// Visit this node and all of its descendants in pre-order.
    ///
    /// Handy for drawing the subdivision or checking its shape.
    pub fn for_each_node<F: FnMut(&Self)>(&self, mut f: F) {
        self.for_each_node_inner(&mut f);
    }

    fn for_each_node_inner<F: FnMut(&Self)>(&self, f: &mut F) {
        f(self);
        if let Some(children) = self.children() {
            for q in Quadrant::TRAVERSAL {
                children[q.index()].for_each_node_inner(f);
            }
        }
    }
}

impl<T: Scalar, I: Bounded<T>> Node<T, I> {
    pub(crate) fn new(
        bounds: Aabb2D<T>,
        depth: u32,
        capacity: usize,
        max_depth: Option<u32>,
    ) -> Self {
        Self {
            bounds,
            depth,
            capacity,
            max_depth,
            items: SmallVec::new(),
            children: None,
        }
    }

    /// The leaf containing the point, or `None` if the point is outside this node.
    ///
    /// Children are tried in [`Quadrant::TRAVERSAL`] order, so a point on an
    /// edge shared by two children belongs to whichever comes first.
    pub fn node_at(&self, x: T, y: T) -> Option<&Self> {
        if !self.bounds.contains_point(x, y) {
            return None;
        }
        let Some(children) = self.children() else {
            return Some(self);
        };
        Quadrant::TRAVERSAL
            .iter()
            .map(|q| &children[q.index()])
            .find(|c| c.bounds.contains_point(x, y))
            .and_then(|c| c.node_at(x, y))
    }

    /// Visit every item that might overlap `rect`.
    ///
    /// Descends into each child on whose side of the midlines `rect` reaches
    /// and reports every item stored on each visited node without testing it.
    /// The result is a superset of the truly overlapping items: it can hold
    /// false positives but never misses one, including items that hang over
    /// the edge of the tree. This node is always visited.
    pub fn visit_intersecting<'a, F: FnMut(&'a I)>(&'a self, rect: Aabb2D<T>, mut f: F) {
        self.visit_intersecting_inner(&rect, &mut f);
    }

    fn visit_intersecting_inner<'a, F: FnMut(&'a I)>(&'a self, rect: &Aabb2D<T>, f: &mut F) {
        if let Some(children) = self.children() {
            let mid = self.bounds.center();
            for q in Quadrant::TRAVERSAL {
                if reaches_quadrant(q, mid, rect) {
                    children[q.index()].visit_intersecting_inner(rect, f);
                }
            }
        }
        for item in &self.items {
            f(item);
        }
    }

    /// Items that might overlap `rect`. See [`Node::visit_intersecting`].
    pub fn query_intersecting(&self, rect: Aabb2D<T>) -> impl Iterator<Item = &I> + '_ {
        let mut out = Vec::new();
        self.visit_intersecting(rect, |i| out.push(i));
        out.into_iter()
    }

    /// Insert `item` into this subtree. Items that do not overlap this node are
    /// ignored; returns whether the item was stored.
    pub(crate) fn insert(&mut self, item: I) -> bool {
        let rect = item.bounds();
        if !self.bounds.overlaps(&rect) {
            return false;
        }

        if self.is_leaf() && self.items.len() + 1 > self.capacity && self.may_split() {
            self.split();
        }

        match self.children.as_deref_mut() {
            Some(children) => match fitting_quadrant(&self.bounds, &rect) {
                Some(q) => children[q.index()].insert(item),
                None => {
                    self.items.push(item);
                    true
                }
            },
            None => {
                self.items.push(item);
                true
            }
        }
    }

    /// Remove the first item equal to `item`, looking only where its bounds
    /// would have placed it. Returns whether anything was removed.
    pub(crate) fn remove(&mut self, item: &I) -> bool
    where
        I: PartialEq,
    {
        let removed = match self.children.as_deref_mut() {
            None => return remove_first(&mut self.items, item),
            Some(children) => match fitting_quadrant(&self.bounds, &item.bounds()) {
                Some(q) => children[q.index()].remove(item),
                None => remove_first(&mut self.items, item),
            },
        };
        self.collapse_if_underfull();
        removed
    }

    /// Remove the first item equal to `item` anywhere in this subtree,
    /// ignoring its bounds.
    pub(crate) fn remove_scan(&mut self, item: &I) -> bool
    where
        I: PartialEq,
    {
        let removed = remove_first(&mut self.items, item)
            || self
                .children
                .as_deref_mut()
                .is_some_and(|c| c.iter_mut().any(|child| child.remove_scan(item)));
        if removed {
            self.collapse_if_underfull();
        }
        removed
    }

    /// Empty every item list in this subtree.
    pub(crate) fn clear(&mut self, policy: ClearPolicy) {
        self.items.clear();
        match policy {
            ClearPolicy::Collapse => self.children = None,
            ClearPolicy::RetainShape => {
                if let Some(children) = self.children.as_deref_mut() {
                    for child in children {
                        child.clear(policy);
                    }
                }
            }
        }
    }

    /// A node splits only below `max_depth` and only while both midlines fall
    /// strictly inside it; otherwise a quadrant would repeat the parent's bounds.
    fn may_split(&self) -> bool {
        let (vmid, hmid) = self.bounds.center();
        let b = &self.bounds;
        self.max_depth.is_none_or(|max| self.depth < max)
            && b.min_x < vmid
            && vmid < b.max_x
            && b.min_y < hmid
            && hmid < b.max_y
    }

    fn split(&mut self) {
        let depth = self.depth + 1;
        let (capacity, max_depth) = (self.capacity, self.max_depth);
        let mut children =
            Box::new(subdivide(&self.bounds).map(|b| Self::new(b, depth, capacity, max_depth)));

        let local = core::mem::take(&mut self.items);
        let before = local.len();
        for item in local {
            match fitting_quadrant(&self.bounds, &item.bounds()) {
                Some(q) => {
                    children[q.index()].insert(item);
                }
                None => self.items.push(item),
            }
        }
        trace!(
            depth = self.depth,
            moved = before - self.items.len(),
            kept = self.items.len(),
            "split quad tree node"
        );
        self.children = Some(children);
    }

    fn collapse_if_underfull(&mut self) {
        if !self.is_leaf() && self.total_item_count() <= self.capacity {
            self.collapse();
        }
    }

    fn collapse(&mut self) {
        let Some(children) = self.children.take() else {
            return;
        };
        let before = self.items.len();
        for child in *children {
            child.drain_into(&mut self.items);
        }
        trace!(
            depth = self.depth,
            gathered = self.items.len() - before,
            "collapsed quad tree node"
        );
    }

    fn drain_into(self, out: &mut Items<I>) {
        out.extend(self.items);
        if let Some(children) = self.children {
            for child in *children {
                child.drain_into(out);
            }
        }
    }
}

fn remove_first<I: PartialEq>(items: &mut Items<I>, item: &I) -> bool {
    match items.iter().position(|i| i == item) {
        Some(pos) => {
            items.remove(pos);
            true
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    type Rect = Aabb2D<f32>;

    fn root(capacity: usize) -> Node<f32, Rect> {
        Node::new(Rect::new(0.0, 0.0, 100.0, 100.0), 0, capacity, None)
    }

    fn xywh(x: f32, y: f32, w: f32, h: f32) -> Rect {
        Rect::from_xywh(x, y, w, h)
    }

    #[test]
    fn leaf_holds_items_up_to_capacity() {
        let mut node = root(3);
        for i in 0..3 {
            assert!(node.insert(xywh(i as f32, 1.0, 1.0, 1.0)));
        }
        assert!(node.is_leaf());
        assert_eq!(node.items().len(), 3);
        assert!(node.top_left().is_none());
    }

    #[test]
    fn insert_outside_is_dropped() {
        let mut node = root(3);
        assert!(!node.insert(xywh(200.0, 200.0, 5.0, 5.0)));
        assert_eq!(node.total_item_count(), 0);
        // Touching the boundary counts as overlap.
        assert!(node.insert(xywh(100.0, 100.0, 5.0, 5.0)));
    }

    #[test]
    fn split_sends_items_to_distinct_quadrants() {
        let mut node = root(3);
        let items = [
            xywh(1.0, 1.0, 2.0, 2.0),
            xywh(90.0, 1.0, 2.0, 2.0),
            xywh(1.0, 90.0, 2.0, 2.0),
            xywh(90.0, 90.0, 2.0, 2.0),
        ];
        for item in items {
            node.insert(item);
        }
        assert!(!node.is_leaf());
        assert!(node.items().is_empty());
        let expect = [
            (Quadrant::BottomLeft, items[0]),
            (Quadrant::BottomRight, items[1]),
            (Quadrant::TopLeft, items[2]),
            (Quadrant::TopRight, items[3]),
        ];
        for (q, item) in expect {
            let child = node.child(q).unwrap();
            assert_eq!(child.all_items().copied().collect::<Vec<_>>(), vec![item]);
            assert_eq!(child.depth(), 1);
            assert_eq!(child.capacity(), 3);
        }
    }

    #[test]
    fn split_happens_even_when_nothing_moves() {
        let mut node = root(1);
        node.insert(xywh(40.0, 0.0, 20.0, 100.0));
        node.insert(xywh(0.0, 40.0, 100.0, 20.0));
        assert!(!node.is_leaf());
        assert_eq!(node.items().len(), 2);
        assert_eq!(node.total_item_count(), 2);
    }

    #[test]
    fn split_recurses_into_crowded_child() {
        let mut node = root(1);
        node.insert(xywh(1.0, 1.0, 1.0, 1.0));
        node.insert(xywh(30.0, 30.0, 1.0, 1.0));
        let bl = node.bottom_left().unwrap();
        assert!(!bl.is_leaf(), "both items landed in the same quadrant");
        assert_eq!(bl.bottom_left().unwrap().items().len(), 1);
        assert_eq!(bl.top_right().unwrap().items().len(), 1);
        assert_eq!(node.total_item_count(), 2);
    }

    #[test]
    fn max_depth_stops_splitting() {
        let mut node: Node<f32, Rect> =
            Node::new(Rect::new(0.0, 0.0, 100.0, 100.0), 0, 1, Some(1));
        for i in 0..5 {
            node.insert(xywh(1.0 + i as f32, 1.0, 0.5, 0.5));
        }
        let bl = node.bottom_left().unwrap();
        assert!(bl.is_leaf());
        assert_eq!(bl.items().len(), 5);
    }

    #[test]
    fn unit_cells_stop_splitting() {
        let mut node: Node<i64, Aabb2D<i64>> = Node::new(Aabb2D::new(0, 0, 2, 2), 0, 1, None);
        // Points on the far corner keep fitting the top-right quadrant.
        for _ in 0..4 {
            node.insert(Aabb2D::new(2, 2, 2, 2));
        }
        let tr = node.top_right().unwrap();
        assert_eq!(tr.bounds(), Aabb2D::new(1, 1, 2, 2));
        assert!(tr.is_leaf());
        assert_eq!(tr.items().len(), 4);
    }

    #[test]
    fn remove_collapses_underfull_subtree() {
        let mut node = root(2);
        let a = xywh(1.0, 1.0, 2.0, 2.0);
        let b = xywh(90.0, 90.0, 2.0, 2.0);
        let c = xywh(1.0, 90.0, 2.0, 2.0);
        node.insert(a);
        node.insert(b);
        node.insert(c);
        assert!(!node.is_leaf());

        assert!(node.remove(&b));
        assert!(node.is_leaf());
        assert_eq!(node.items().len(), 2);
        assert!(node.items().contains(&a));
        assert!(node.items().contains(&c));
    }

    #[test]
    fn collapse_gathers_nested_descendants() {
        let mut node = root(2);
        // Three items crowd the bottom-left quadrant so it splits too.
        node.insert(xywh(1.0, 1.0, 1.0, 1.0));
        node.insert(xywh(30.0, 30.0, 1.0, 1.0));
        node.insert(xywh(1.0, 30.0, 1.0, 1.0));
        node.insert(xywh(90.0, 90.0, 1.0, 1.0));
        assert!(!node.bottom_left().unwrap().is_leaf());

        node.clear(ClearPolicy::RetainShape);
        node.insert(xywh(1.0, 1.0, 1.0, 1.0));
        node.insert(xywh(90.0, 90.0, 1.0, 1.0));
        node.insert(xywh(90.0, 1.0, 1.0, 1.0));
        assert!(node.remove(&xywh(90.0, 1.0, 1.0, 1.0)));
        assert!(node.is_leaf());
        assert_eq!(node.items().len(), 2);
    }

    #[test]
    fn remove_absent_is_noop() {
        let mut node = root(2);
        node.insert(xywh(1.0, 1.0, 2.0, 2.0));
        assert!(!node.remove(&xywh(5.0, 5.0, 2.0, 2.0)));
        assert_eq!(node.total_item_count(), 1);
    }

    #[test]
    fn remove_scan_finds_moved_items() {
        let mut node: Node<f32, (Rect, u32)> =
            Node::new(Rect::new(0.0, 0.0, 100.0, 100.0), 0, 1, None);
        node.insert((xywh(1.0, 1.0, 2.0, 2.0), 7));
        node.insert((xywh(90.0, 90.0, 2.0, 2.0), 8));

        // Same payload, stale bounds: the targeted path misses it.
        let moved = (xywh(90.0, 1.0, 2.0, 2.0), 7);
        let stored = (xywh(1.0, 1.0, 2.0, 2.0), 7);
        assert!(!node.remove(&moved));
        assert!(node.remove_scan(&stored));
        assert!(node.is_leaf());
        assert_eq!(node.total_item_count(), 1);
    }

    #[test]
    fn query_reports_straddlers_as_candidates() {
        let mut node = root(1);
        let d = xywh(40.0, 0.0, 20.0, 100.0);
        node.insert(xywh(1.0, 1.0, 2.0, 2.0));
        node.insert(d);
        // Nowhere near D, but D lives on the visited root.
        let hits: Vec<_> = node.query_intersecting(xywh(0.0, 0.0, 5.0, 5.0)).copied().collect();
        assert!(hits.contains(&d));
        assert_eq!(hits.len(), 2);
    }

    #[test]
    fn query_finds_items_overhanging_the_universe() {
        let mut node = root(1);
        let overhang = Rect::new(-20.0, 1.0, 10.0, 2.0);
        node.insert(overhang);
        node.insert(xywh(90.0, 90.0, 2.0, 2.0));
        assert!(!node.is_leaf());
        assert_eq!(node.bottom_left().unwrap().items(), &[overhang]);

        // Overlaps only the part of the item outside the root bounds.
        let hits: Vec<_> = node
            .query_intersecting(Rect::new(-15.0, 0.0, -5.0, 5.0))
            .copied()
            .collect();
        assert_eq!(hits, vec![overhang]);
    }

    #[test]
    fn node_at_prefers_traversal_order_on_shared_edges() {
        let mut node = root(1);
        node.insert(xywh(1.0, 1.0, 2.0, 2.0));
        node.insert(xywh(90.0, 90.0, 2.0, 2.0));
        let center = node.node_at(50.0, 50.0).unwrap();
        assert_eq!(center.bounds(), Rect::new(0.0, 50.0, 50.0, 100.0));
        let low = node.node_at(75.0, 10.0).unwrap();
        assert_eq!(low.bounds(), Rect::new(50.0, 0.0, 100.0, 50.0));
        assert!(node.node_at(101.0, 10.0).is_none());
    }

    #[test]
    fn for_each_node_walks_whole_shape() {
        let mut node = root(1);
        node.insert(xywh(1.0, 1.0, 2.0, 2.0));
        node.insert(xywh(90.0, 90.0, 2.0, 2.0));
        let mut count = 0;
        let mut leaves = 0;
        node.for_each_node(|n| {
            count += 1;
            if n.is_leaf() {
                leaves += 1;
            }
        });
        assert_eq!((count, leaves), (5, 4));
    }
}

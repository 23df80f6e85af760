// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tree configuration.

/// What [`QuadTree::clear`][crate::QuadTree::clear] does with split nodes.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum ClearPolicy {
    /// Empty every node but keep all child nodes allocated.
    ///
    /// Suited to clear-and-reinsert every tick, where the next frame's items
    /// land in roughly the same places. Split nodes left empty by a clear are
    /// only collapsed by a later removal beneath them.
    #[default]
    RetainShape,
    /// Drop all children so the root becomes a single empty leaf.
    Collapse,
}

/// Settings fixed when a [`QuadTree`][crate::QuadTree] is built.
///
/// Every node inherits the same `capacity` and `max_depth`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct QuadTreeConfig {
    /// How many items a leaf holds before it splits. Must be at least 1;
    /// 3 to 5 works well for most broad-phase workloads.
    pub capacity: usize,
    /// Depth at which leaves stop splitting and simply grow.
    ///
    /// Items stacked on the same point keep landing in the same quadrant, so
    /// without a limit they split a float tree down to its precision floor,
    /// which is over a thousand levels for `f64`. `None` removes the limit.
    pub max_depth: Option<u32>,
    /// Behavior of [`QuadTree::clear`][crate::QuadTree::clear].
    pub clear_policy: ClearPolicy,
}

impl QuadTreeConfig {
    /// Default leaf capacity.
    pub const DEFAULT_CAPACITY: usize = 4;

    /// Default depth limit.
    pub const DEFAULT_MAX_DEPTH: u32 = 32;

    /// Configuration with the given leaf capacity and defaults elsewhere.
    pub const fn new(capacity: usize) -> Self {
        Self {
            capacity,
            max_depth: Some(Self::DEFAULT_MAX_DEPTH),
            clear_policy: ClearPolicy::RetainShape,
        }
    }

    /// Limit how deep the tree may split.
    #[must_use]
    pub const fn with_max_depth(mut self, max_depth: u32) -> Self {
        self.max_depth = Some(max_depth);
        self
    }

    /// Let leaves split for as long as their midpoints stay distinct.
    #[must_use]
    pub const fn without_max_depth(mut self) -> Self {
        self.max_depth = None;
        self
    }

    /// Choose how [`QuadTree::clear`][crate::QuadTree::clear] treats split nodes.
    #[must_use]
    pub const fn with_clear_policy(mut self, clear_policy: ClearPolicy) -> Self {
        self.clear_policy = clear_policy;
        self
    }
}

impl Default for QuadTreeConfig {
    fn default() -> Self {
        Self::new(Self::DEFAULT_CAPACITY)
    }
}

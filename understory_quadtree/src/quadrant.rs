// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Quadrant naming, subdivision, and the fitting-child rule.

use crate::types::{Aabb2D, Scalar};

/// One of the four child slots of a split node.
///
/// The discriminant is the slot index in the node's child array.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Quadrant {
    /// Low x, low y.
    BottomLeft = 0,
    /// High x, low y.
    BottomRight = 1,
    /// Low x, high y.
    TopLeft = 2,
    /// High x, high y.
    TopRight = 3,
}

impl Quadrant {
    /// All quadrants in child-slot order.
    pub const ALL: [Self; 4] = [
        Self::BottomLeft,
        Self::BottomRight,
        Self::TopLeft,
        Self::TopRight,
    ];

    /// Order in which queries and point location visit children.
    ///
    /// Point location hands a point on a shared edge to the first child in this
    /// order that contains it.
    pub const TRAVERSAL: [Self; 4] = [
        Self::TopLeft,
        Self::TopRight,
        Self::BottomLeft,
        Self::BottomRight,
    ];

    /// Slot index of this quadrant in a node's child array.
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// The part of `parent` this quadrant covers.
    pub fn of<T: Scalar>(self, parent: &Aabb2D<T>) -> Aabb2D<T> {
        let (vmid, hmid) = parent.center();
        match self {
            Self::BottomLeft => Aabb2D::new(parent.min_x, parent.min_y, vmid, hmid),
            Self::BottomRight => Aabb2D::new(vmid, parent.min_y, parent.max_x, hmid),
            Self::TopLeft => Aabb2D::new(parent.min_x, hmid, vmid, parent.max_y),
            Self::TopRight => Aabb2D::new(vmid, hmid, parent.max_x, parent.max_y),
        }
    }
}

/// Bounds of all four quadrants of `parent`, in child-slot order.
pub(crate) fn subdivide<T: Scalar>(parent: &Aabb2D<T>) -> [Aabb2D<T>; 4] {
    Quadrant::ALL.map(|q| q.of(parent))
}

/// The quadrant of `parent` that `item` fits entirely inside, if any.
///
/// Comparisons against the midlines are strict: an item touching a midline
/// fits neither side of it and stays with the parent.
pub(crate) fn fitting_quadrant<T: Scalar>(
    parent: &Aabb2D<T>,
    item: &Aabb2D<T>,
) -> Option<Quadrant> {
    let (vmid, hmid) = parent.center();

    let top = item.min_y > hmid;
    let bottom = item.max_y < hmid;

    if item.max_x < vmid {
        if top {
            return Some(Quadrant::TopLeft);
        } else if bottom {
            return Some(Quadrant::BottomLeft);
        }
    } else if item.min_x > vmid {
        if top {
            return Some(Quadrant::TopRight);
        } else if bottom {
            return Some(Quadrant::BottomRight);
        }
    }
    None
}

/// Whether `rect` reaches the side of `parent`'s midlines that `quadrant` covers.
///
/// Only the midlines are tested, not the quadrant's outer edges: an item that
/// overhangs the tree's universe still lives in a child, and a query touching
/// just the overhang must reach it.
pub(crate) fn reaches_quadrant<T: Scalar>(
    quadrant: Quadrant,
    (vmid, hmid): (T, T),
    rect: &Aabb2D<T>,
) -> bool {
    let left = rect.min_x <= vmid;
    let right = rect.max_x >= vmid;
    let bottom = rect.min_y <= hmid;
    let top = rect.max_y >= hmid;
    match quadrant {
        Quadrant::BottomLeft => left && bottom,
        Quadrant::BottomRight => right && bottom,
        Quadrant::TopLeft => left && top,
        Quadrant::TopRight => right && top,
    }
}

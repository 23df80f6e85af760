// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The [`Bounded`] capability implemented by everything a quad tree can store.

use crate::types::Aabb2D;

/// Anything that can report an axis-aligned bounding box.
///
/// The quad tree only ever looks at an item through this trait: on insert to
/// decide which node owns it, and on removal to find that node again. An item's
/// bounds must therefore not change while it is stored, unless it is removed
/// with [`QuadTree::remove_scan`][crate::QuadTree::remove_scan].
pub trait Bounded<T> {
    /// The item's bounding box.
    fn bounds(&self) -> Aabb2D<T>;
}

impl<T: Copy> Bounded<T> for Aabb2D<T> {
    #[inline]
    fn bounds(&self) -> Aabb2D<T> {
        *self
    }
}

/// A rectangle paired with a payload, e.g. `(aabb, entity_id)`.
impl<T: Copy, P> Bounded<T> for (Aabb2D<T>, P) {
    #[inline]
    fn bounds(&self) -> Aabb2D<T> {
        self.0
    }
}

impl<T, B: Bounded<T> + ?Sized> Bounded<T> for &B {
    #[inline]
    fn bounds(&self) -> Aabb2D<T> {
        (**self).bounds()
    }
}

#[cfg(feature = "kurbo")]
impl Bounded<f64> for kurbo::Rect {
    /// Unnormalized rects (negative width or height) are normalized first.
    #[inline]
    fn bounds(&self) -> Aabb2D<f64> {
        let r = self.abs();
        Aabb2D::new(r.x0, r.y0, r.x1, r.y1)
    }
}

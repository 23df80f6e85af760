// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=understory_quadtree --heading-base-level=0

//! Understory Quadtree: a region quad tree over 2D AABBs.
//!
//! A [`QuadTree`] covers a fixed rectangular universe and stores any item that can
//! report its bounds through [`Bounded`]. It is meant as a broad phase: a
//! simulation or culling pass asks it for the items that *might* touch a region
//! and then runs exact tests on that short list.
//!
//! - Insert and remove items; leaves split once they exceed a fixed capacity and
//!   collapse again as soon as removals bring a subtree back within it.
//! - Query a rectangle for candidate items. Results may include false positives
//!   but never miss an overlapping item.
//! - Locate the leaf containing a point, and inspect the node structure.
//!
//! Like `understory_index`, it is generic over the scalar type `T` ([`f32`],
//! [`f64`] or [`i64`]) and does not depend on any geometry crate.
//!
//! ## Features
//!
//! - `std` *(default)*: enables `std` in optional dependencies.
//! - `libm`: no_std float support for optional dependencies.
//! - `kurbo`: implements [`Bounded`] for `kurbo::Rect`.
//!
//! # Example
//!
//! ```rust
//! use understory_quadtree::{Aabb2D, QuadTree};
//!
//! // Index entity ids by their bounds in a 100x100 world.
//! let mut tree = QuadTree::new(4, Aabb2D::new(0.0, 0.0, 100.0, 100.0)).unwrap();
//! tree.insert((Aabb2D::from_xywh(10.0, 10.0, 5.0, 5.0), 1_u32));
//! tree.insert((Aabb2D::from_xywh(80.0, 80.0, 5.0, 5.0), 2_u32));
//!
//! // Collect candidates near the first entity, then filter exactly.
//! let near = Aabb2D::new(0.0, 0.0, 20.0, 20.0);
//! let hits: Vec<u32> = tree
//!     .query_intersecting(near)
//!     .filter(|(aabb, _)| aabb.overlaps(&near))
//!     .map(|(_, id)| *id)
//!     .collect();
//! assert_eq!(hits, [1]);
//! ```
//!
//! ## Geometry conventions
//!
//! The y axis grows upward: `min_y` is the bottom edge of an [`Aabb2D`].
//! Rectangles that merely touch are considered overlapping. An item fits a
//! quadrant only if it lies strictly on one side of both midlines; items touching
//! a midline stay on the node being split.
//!
//! ### Float semantics
//!
//! This crate assumes no NaNs for floating-point coordinates. Construction rejects
//! NaN bounds; NaN items are never routed into a child.

#![no_std]

extern crate alloc;

mod bounded;
mod config;
mod error;
mod node;
mod quadrant;
mod tree;
mod types;

pub use bounded::Bounded;
pub use config::{ClearPolicy, QuadTreeConfig};
pub use error::BuildError;
pub use node::Node;
pub use quadrant::Quadrant;
pub use tree::QuadTree;
pub use types::{Aabb2D, Scalar};

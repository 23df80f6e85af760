// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Construction errors.

use thiserror::Error;

/// Error returned when a [`QuadTree`][crate::QuadTree] cannot be built.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Error)]
pub enum BuildError {
    /// A node must be allowed to hold at least one item before splitting.
    #[error("node capacity must be at least 1")]
    ZeroCapacity,
    /// The universe bounds are zero-area, inverted, or contain NaN.
    #[error("quad tree bounds must have a positive, finite area")]
    DegenerateBounds,
}

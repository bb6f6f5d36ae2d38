// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=understory_bounds --heading-base-level=0

//! Understory Bounds: a Kurbo-native AABB accumulator.
//!
//! Understory Bounds is the leaf geometry layer for scene bounds passes, hit testing, and culling.
//!
//! - [`Bounds`] starts *invalid* (nothing merged yet) and grows by union with frames, rects,
//!   other bounds, or point sets, each optionally transformed by an [`Affine`](kurbo::Affine).
//! - Transformed unions use the AABB of the transformed corners, so results are conservative:
//!   never smaller than the exact transformed geometry, possibly larger under rotation or shear.
//! - [`BoundsPool`] is a free list of scratch accumulators for recursive passes that want to
//!   avoid allocating per node.
//!
//! Float inputs are assumed to be finite (no NaNs).
//!
//! # Example
//!
//! ```rust
//! use understory_bounds::{Bounds, BoundsPool};
//! use kurbo::{Affine, Rect, Vec2};
//!
//! let mut bounds = Bounds::new();
//! assert!(!bounds.is_valid());
//!
//! // The first union defines the box; later unions only grow it.
//! bounds.add_rect(Rect::new(0.0, 0.0, 10.0, 10.0), None);
//! bounds.add_rect(
//!     Rect::new(0.0, 0.0, 10.0, 10.0),
//!     Some(Affine::translate(Vec2::new(5.0, 5.0))),
//! );
//! assert_eq!(bounds.rect(), Rect::new(0.0, 0.0, 15.0, 15.0));
//!
//! // Scratch accumulators come from a pool and go back to it in stack order.
//! let mut pool = BoundsPool::new();
//! pool.scoped(|_, scratch| {
//!     scratch.add_bounds(&bounds, Some(Affine::scale(2.0)));
//!     assert_eq!(scratch.width(), 30.0);
//! });
//! assert_eq!(pool.outstanding(), 0);
//! ```
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

pub mod bounds;
pub mod pool;

pub use bounds::Bounds;
pub use pool::BoundsPool;

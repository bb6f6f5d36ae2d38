// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=understory_scene --heading-base-level=0

//! Understory Scene: a Kurbo-native 2D scene graph with fast, conservative bounds.
//!
//! - Represents a hierarchy of nodes with local transforms, drawable views, explicit bounds
//!   areas, post-processing effects, and render groups.
//! - Computes global AABBs for any node by merging subtree bounds upward, crossing render-group
//!   and effect boundaries by re-projecting whole AABBs.
//! - Supports batched updates with a [`Scene::commit`] step that refreshes derived transforms
//!   and yields coarse damage regions.
//!
//! ## Fast bounds
//!
//! [`BoundsContext::compute_global_bounds`] trades precision for speed. It never reports bounds
//! smaller than the displayed, measurable content; under rotation, shear, or effects it may
//! report larger ones. Axis-aligned, effect-free subtrees are exact.
//!
//! The pass reads the graph only through [`BoundsSource`], so other containers can reuse it.
//! Scratch accumulators come from a [`BoundsPool`](understory_bounds::BoundsPool) owned by the
//! [`BoundsContext`]; there is no global state.
//!
//! ## Render groups
//!
//! A render group is a subtree that accumulates content in its own space and caches its own
//! world transform. Parentless nodes always root a group; set [`NodeFlags::RENDER_GROUP`] to
//! start a nested one. Effects see bounds in render-group world space, so margins such as
//! [`FilterPadding`] are in world units.
//!
//! ## API overview
//!
//! - [`Scene`]: container managing nodes and derived transforms; implements [`BoundsSource`].
//! - [`LocalNode`]: per-node local data (transform, view, bounds area, flags).
//! - [`NodeFlags`] / [`DisplayStatus`]: visibility, measurement, and render-group controls.
//! - [`Effect`] / [`BoundsContributor`]: effects and their optional bounds capability.
//! - [`BoundsContext`] / [`BoundsOptions`]: the bounds pass and its options.
//!
//! Key operations:
//! - [`Scene::insert`] → [`NodeId`]; [`Scene::reparent`] rejects cycles.
//! - [`Scene::commit`] → [`Damage`].
//! - [`Scene::global_bounds`], [`Scene::world_bounds`], [`Scene::intersects_viewport`],
//!   [`Scene::hit_test_point`].
//!
//! # Example
//!
//! ```rust
//! use understory_scene::{FilterPadding, LocalNode, NodeFlags, Scene};
//! use kurbo::{Affine, Rect, Vec2};
//!
//! let mut scene = Scene::new();
//!
//! // The stage roots the top-level render group.
//! let stage = scene.insert(
//!     None,
//!     LocalNode { local_transform: Affine::translate(Vec2::new(5.0, 5.0)), ..Default::default() },
//! );
//!
//! let card = scene.insert(Some(stage), LocalNode::default());
//! let _icon = scene.insert(
//!     Some(card),
//!     LocalNode { view: Some(Rect::new(0.0, 0.0, 10.0, 10.0)), ..Default::default() },
//! );
//!
//! let _ = scene.commit();
//! assert_eq!(scene.global_bounds(card), Some(Rect::new(5.0, 5.0, 15.0, 15.0)));
//!
//! // A blur-like effect widens the bounds by its padding.
//! scene.add_effect(card, Box::new(FilterPadding::new(2.0)));
//! let _ = scene.commit();
//! assert_eq!(scene.global_bounds(card), Some(Rect::new(3.0, 3.0, 17.0, 17.0)));
//!
//! // Hidden nodes contribute nothing; an empty result is a zero rectangle.
//! scene.set_flags(card, NodeFlags::MEASURABLE);
//! let _ = scene.commit();
//! assert_eq!(scene.global_bounds(card), Some(Rect::ZERO));
//! ```
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

pub mod damage;
pub mod effect;
pub mod error;
pub mod fast_bounds;
pub mod scene;
pub mod types;

pub use damage::Damage;
pub use effect::{BoundsContributor, Channels, ColorMask, Effect, FilterPadding};
pub use error::SceneError;
pub use fast_bounds::{BoundsAreaSpace, BoundsContext, BoundsOptions, BoundsSource, EffectMerge};
pub use scene::Scene;
pub use types::{DisplayStatus, LocalNode, NodeFlags, NodeId};
pub use understory_bounds::{Bounds, BoundsPool};

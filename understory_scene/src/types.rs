// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Public types for the scene: node identifiers, flags, display status, and local data.

use kurbo::{Affine, Rect};

/// Identifier for a node in the scene.
///
/// A small, copyable handle consisting of a slot index and a generation counter.
///
/// ## Semantics
///
/// - On insert, a fresh slot is allocated with generation `1`.
/// - On remove, the slot is freed; any existing `NodeId` that pointed to that slot is now stale.
/// - On reuse of a freed slot, its generation is incremented, producing a new, distinct `NodeId`.
///
/// Use [`Scene::is_alive`](crate::Scene::is_alive) to check liveness.
/// Stale `NodeId`s never alias a different live node because the generation must match.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct NodeId(pub(crate) u32, pub(crate) u32);

impl NodeId {
    pub(crate) const fn new(idx: u32, generation: u32) -> Self {
        Self(idx, generation)
    }

    pub(crate) const fn idx(self) -> usize {
        self.0 as usize
    }
}

bitflags::bitflags! {
    /// Per-node flags set by the owner of the scene.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct NodeFlags: u8 {
        /// Node is visible.
        const VISIBLE      = 0b0000_0001;
        /// Node is renderable (for example not culled by the owner).
        const RENDERABLE   = 0b0000_0010;
        /// Node participates in bounds measurement.
        const MEASURABLE   = 0b0000_0100;
        /// Node roots its own render group.
        ///
        /// Parentless nodes always root a render group regardless of this flag.
        const RENDER_GROUP = 0b0000_1000;
    }
}

impl Default for NodeFlags {
    fn default() -> Self {
        Self::VISIBLE | Self::RENDERABLE | Self::MEASURABLE
    }
}

bitflags::bitflags! {
    /// Combined display status computed on [`Scene::commit`](crate::Scene::commit).
    ///
    /// A node is drawn (and measured) only when both bits are set; see [`DisplayStatus::FULL`].
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct DisplayStatus: u8 {
        /// The node itself is [`VISIBLE`](NodeFlags::VISIBLE) and [`RENDERABLE`](NodeFlags::RENDERABLE).
        const LOCAL     = 0b01;
        /// Every ancestor is fully displayed.
        const INHERITED = 0b10;
        /// Both bits.
        const FULL      = Self::LOCAL.bits() | Self::INHERITED.bits();
    }
}

impl DisplayStatus {
    /// True when both the local and inherited bits are set.
    #[inline]
    pub fn is_displayed(self) -> bool {
        self.contains(Self::FULL)
    }
}

/// Local data for a node.
#[derive(Clone, Debug)]
pub struct LocalNode {
    /// Local transform relative to the parent's space.
    pub local_transform: Affine,
    /// Local-space bounds of the node's own drawable content, if it draws anything.
    pub view: Option<Rect>,
    /// Explicit bounds area. When set it replaces the measured content of the node and its subtree.
    pub bounds_area: Option<Rect>,
    /// Visibility, measurement, and render-group flags.
    pub flags: NodeFlags,
}

impl Default for LocalNode {
    fn default() -> Self {
        Self {
            local_transform: Affine::IDENTITY,
            view: None,
            bounds_area: None,
            flags: NodeFlags::default(),
        }
    }
}

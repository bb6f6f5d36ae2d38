// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Core scene implementation: structure, updates, derived transforms, queries.

use alloc::boxed::Box;
use alloc::vec::Vec;
use kurbo::{Affine, Point, Rect};
use understory_bounds::Bounds;

use crate::damage::Damage;
use crate::effect::Effect;
use crate::error::SceneError;
use crate::fast_bounds::{BoundsContext, BoundsOptions, BoundsSource};
use crate::types::{DisplayStatus, LocalNode, NodeFlags, NodeId};

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

/// A 2D scene graph of nodes with local transforms, views, effects, and render groups.
///
/// Edits are batched: derived data (world and group transforms, display status, world view
/// boxes) is recomputed by [`Scene::commit`]. Queries read the last committed state.
pub struct Scene {
    nodes: Vec<Option<Node>>, // slots
    generations: Vec<u32>,    // last generation per slot (persists across frees)
    free_list: Vec<usize>,
    epoch: u64,
    removed: Vec<Rect>, // world view boxes of nodes removed since the last commit
    bounds: BoundsContext,
}

impl core::fmt::Debug for Scene {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let total = self.nodes.len();
        let alive = self.nodes.iter().filter(|n| n.is_some()).count();
        let free = self.free_list.len();
        f.debug_struct("Scene")
            .field("nodes_total", &total)
            .field("nodes_alive", &alive)
            .field("free_list", &free)
            .field("epoch", &self.epoch)
            .field("bounds", &self.bounds)
            .finish_non_exhaustive()
    }
}

/// Derived per-node data, valid as of the last commit.
#[derive(Clone, Debug)]
struct WorldNode {
    world_transform: Affine,
    group_transform: Affine,
    relative_group_transform: Affine,
    group_world_transform: Affine,
    display: DisplayStatus,
    view_bounds: Option<Rect>, // world AABB of the view while displayed
}

impl Default for WorldNode {
    fn default() -> Self {
        Self {
            world_transform: Affine::IDENTITY,
            group_transform: Affine::IDENTITY,
            relative_group_transform: Affine::IDENTITY,
            group_world_transform: Affine::IDENTITY,
            display: DisplayStatus::empty(),
            view_bounds: None,
        }
    }
}

/// Parent state handed down during commit.
#[derive(Clone, Copy, Debug)]
struct ParentFrame {
    world: Affine,
    group: Affine,
    group_world: Affine,
    displayed: bool,
}

impl ParentFrame {
    const TOP: Self = Self {
        world: Affine::IDENTITY,
        group: Affine::IDENTITY,
        group_world: Affine::IDENTITY,
        displayed: true,
    };
}

#[derive(Debug)]
struct Node {
    generation: u32,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    local: LocalNode,
    effects: Vec<Box<dyn Effect>>,
    world: WorldNode,
}

impl Node {
    fn new(generation: u32, local: LocalNode) -> Self {
        Self {
            generation,
            parent: None,
            children: Vec::new(),
            local,
            effects: Vec::new(),
            world: WorldNode::default(),
        }
    }

    fn is_group_root(&self) -> bool {
        self.parent.is_none() || self.local.flags.contains(NodeFlags::RENDER_GROUP)
    }
}

impl Scene {
    /// Create a new empty scene.
    pub fn new() -> Self {
        Self::with_bounds_options(BoundsOptions::default())
    }

    /// Create a new empty scene whose bounds queries use `options`.
    pub fn with_bounds_options(options: BoundsOptions) -> Self {
        Self {
            nodes: Vec::new(),
            generations: Vec::new(),
            free_list: Vec::new(),
            epoch: 0,
            removed: Vec::new(),
            bounds: BoundsContext::with_options(options),
        }
    }

    /// Options used by [`Scene::global_bounds`] and the other bounds queries.
    pub fn bounds_options(&self) -> BoundsOptions {
        self.bounds.options()
    }

    /// Replace the options used by bounds queries.
    pub fn set_bounds_options(&mut self, options: BoundsOptions) {
        self.bounds.set_options(options);
    }

    /// Number of commits performed so far.
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Insert a new node as the last child of `parent` (or as a root if `None`).
    ///
    /// Panics if `parent` is stale.
    pub fn insert(&mut self, parent: Option<NodeId>, local: LocalNode) -> NodeId {
        let (idx, generation) = if let Some(idx) = self.free_list.pop() {
            let generation = self.generations[idx].saturating_add(1);
            self.generations[idx] = generation;
            self.nodes[idx] = Some(Node::new(generation, local));
            #[allow(
                clippy::cast_possible_truncation,
                reason = "NodeId uses 32-bit indices by design."
            )]
            (idx as u32, generation)
        } else {
            let generation = 1_u32;
            self.nodes.push(Some(Node::new(generation, local)));
            self.generations.push(generation);
            #[allow(
                clippy::cast_possible_truncation,
                reason = "NodeId uses 32-bit indices by design."
            )]
            ((self.nodes.len() - 1) as u32, generation)
        };
        let id = NodeId::new(idx, generation);
        if let Some(p) = parent {
            self.link_parent(id, p);
        }
        id
    }

    /// Remove a node and its subtree.
    pub fn remove(&mut self, id: NodeId) {
        if !self.is_alive(id) {
            return;
        }
        if let Some(parent) = self.node(id).parent {
            self.unlink_parent(id, parent);
        }
        let children = core::mem::take(&mut self.node_mut(id).children);
        for child in children {
            self.remove(child);
        }
        if let Some(r) = self.node(id).world.view_bounds {
            self.removed.push(r);
        }
        self.nodes[id.idx()] = None;
        self.free_list.push(id.idx());
    }

    /// Move `id` to the end of `new_parent`'s children (or make it a root if `None`).
    ///
    /// Fails without changing anything if either id is stale or if `new_parent` is `id` or
    /// one of its descendants.
    pub fn reparent(&mut self, id: NodeId, new_parent: Option<NodeId>) -> Result<(), SceneError> {
        if !self.is_alive(id) {
            return Err(SceneError::StaleNode(id));
        }
        if let Some(p) = new_parent {
            if !self.is_alive(p) {
                return Err(SceneError::StaleNode(p));
            }
            if self.is_ancestor_or_self(id, p) {
                tracing::debug!(node = ?id, parent = ?p, "rejected reparent: cycle");
                return Err(SceneError::Cycle {
                    node: id,
                    parent: p,
                });
            }
        }
        if let Some(parent) = self.node(id).parent {
            self.unlink_parent(id, parent);
        }
        if let Some(p) = new_parent {
            self.link_parent(id, p);
        }
        Ok(())
    }

    /// Update the local transform.
    pub fn set_local_transform(&mut self, id: NodeId, tf: Affine) {
        if let Some(n) = self.node_opt_mut(id) {
            n.local.local_transform = tf;
        }
    }

    /// Update the local-space view bounds.
    pub fn set_view(&mut self, id: NodeId, view: Option<Rect>) {
        if let Some(n) = self.node_opt_mut(id) {
            n.local.view = view;
        }
    }

    /// Update the explicit bounds area.
    pub fn set_bounds_area(&mut self, id: NodeId, area: Option<Rect>) {
        if let Some(n) = self.node_opt_mut(id) {
            n.local.bounds_area = area;
        }
    }

    /// Replace all node flags.
    pub fn set_flags(&mut self, id: NodeId, flags: NodeFlags) {
        if let Some(n) = self.node_opt_mut(id) {
            n.local.flags = flags;
        }
    }

    /// Toggle [`NodeFlags::VISIBLE`].
    pub fn set_visible(&mut self, id: NodeId, visible: bool) {
        if let Some(n) = self.node_opt_mut(id) {
            n.local.flags.set(NodeFlags::VISIBLE, visible);
        }
    }

    /// Toggle [`NodeFlags::RENDER_GROUP`].
    pub fn set_render_group(&mut self, id: NodeId, enabled: bool) {
        if let Some(n) = self.node_opt_mut(id) {
            n.local.flags.set(NodeFlags::RENDER_GROUP, enabled);
        }
    }

    /// Append an effect.
    pub fn add_effect(&mut self, id: NodeId, effect: Box<dyn Effect>) {
        if let Some(n) = self.node_opt_mut(id) {
            n.effects.push(effect);
        }
    }

    /// Remove all effects.
    pub fn clear_effects(&mut self, id: NodeId) {
        if let Some(n) = self.node_opt_mut(id) {
            n.effects.clear();
        }
    }

    /// Recompute derived data for every node and return coarse damage.
    pub fn commit(&mut self) -> Damage {
        let mut damage = Damage::default();
        for r in core::mem::take(&mut self.removed) {
            damage.record_change(Some(r), None);
        }
        let roots = self.roots();

        for root in &roots {
            self.update_world_recursive(*root, ParentFrame::TOP, &mut damage);
        }
        self.epoch += 1;

        tracing::debug!(
            epoch = self.epoch,
            roots = roots.len(),
            dirty_rects = damage.dirty_rects.len(),
            "scene committed"
        );
        damage
    }

    /// Fast global bounds of `id`, or `None` if `id` is stale.
    ///
    /// Same space and contract as [`BoundsContext::compute_global_bounds`]: world space unless
    /// `id` roots a nested render group, in which case the parent group's space.
    pub fn global_bounds(&mut self, id: NodeId) -> Option<Rect> {
        if !self.is_alive(id) {
            return None;
        }
        let mut ctx = core::mem::take(&mut self.bounds);
        let mut out = Bounds::new();
        ctx.compute_global_bounds(&*self, id, &mut out);
        self.bounds = ctx;
        Some(out.rect())
    }

    /// Fast bounds of `id` in world space, or `None` if `id` is stale.
    pub fn world_bounds(&mut self, id: NodeId) -> Option<Rect> {
        if !self.is_alive(id) {
            return None;
        }
        let mut ctx = core::mem::take(&mut self.bounds);
        let mut out = Bounds::new();
        let measured = self.fast_world_bounds(&mut ctx, id, &mut out);
        self.bounds = ctx;
        Some(if measured { out.rect() } else { Rect::ZERO })
    }

    /// Cull test: whether the fast world bounds of `id` overlap `viewport`.
    ///
    /// Stale ids and subtrees that measure nothing are culled.
    pub fn intersects_viewport(&mut self, id: NodeId, viewport: Rect) -> bool {
        if !self.is_alive(id) {
            return false;
        }
        let mut ctx = core::mem::take(&mut self.bounds);
        let mut out = Bounds::new();
        let measured = self.fast_world_bounds(&mut ctx, id, &mut out);
        self.bounds = ctx;
        measured && out.intersects_rect(viewport)
    }

    /// Topmost displayed, measurable node whose world view box contains `pt`.
    ///
    /// Later siblings are on top of earlier ones, and children on top of their parent.
    /// Root subtrees whose fast bounds exclude the point are skipped without descending.
    pub fn hit_test_point(&mut self, pt: Point) -> Option<NodeId> {
        let roots = self.roots();
        let mut ctx = core::mem::take(&mut self.bounds);
        let mut scratch = Bounds::new();
        let hit = roots.iter().rev().find_map(|root| {
            if !self.fast_world_bounds(&mut ctx, *root, &mut scratch)
                || !scratch.contains_point(pt)
            {
                return None;
            }
            self.hit_recursive(*root, pt)
        });
        self.bounds = ctx;
        hit
    }

    /// Returns true if `id` refers to a live node.
    pub fn is_alive(&self, id: NodeId) -> bool {
        self.nodes
            .get(id.idx())
            .and_then(|n| n.as_ref())
            .map(|n| n.generation == id.1)
            .unwrap_or(false)
    }

    /// Parent of a live node.
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node_opt(id)?.parent
    }

    /// Children of a live node in stored order; empty for stale ids.
    pub fn children_of(&self, id: NodeId) -> &[NodeId] {
        self.node_opt(id).map(|n| n.children.as_slice()).unwrap_or(&[])
    }

    /// Flags of a live node.
    pub fn flags(&self, id: NodeId) -> Option<NodeFlags> {
        self.node_opt(id).map(|n| n.local.flags)
    }

    /// Committed world transform of a live node.
    pub fn world_transform_of(&self, id: NodeId) -> Option<Affine> {
        self.node_opt(id).map(|n| n.world.world_transform)
    }

    /// Committed display status of a live node.
    pub fn display_status_of(&self, id: NodeId) -> Option<DisplayStatus> {
        self.node_opt(id).map(|n| n.world.display)
    }

    // --- internals ---

    /// Live parentless nodes in slot order.
    fn roots(&self) -> Vec<NodeId> {
        self.nodes
            .iter()
            .enumerate()
            .filter_map(|(i, n)| match n {
                Some(n) if n.parent.is_none() =>
                {
                    #[allow(
                        clippy::cast_possible_truncation,
                        reason = "NodeId uses 32-bit indices by design."
                    )]
                    Some(NodeId::new(i as u32, n.generation))
                }
                _ => None,
            })
            .collect()
    }

    /// Access a node; panics if `id` is stale.
    fn node(&self, id: NodeId) -> &Node {
        self.nodes[id.idx()].as_ref().expect("dangling NodeId")
    }

    /// Access a node mutably; panics if `id` is stale.
    fn node_mut(&mut self, id: NodeId) -> &mut Node {
        self.nodes[id.idx()].as_mut().expect("dangling NodeId")
    }

    fn node_opt(&self, id: NodeId) -> Option<&Node> {
        let n = self.nodes.get(id.idx())?.as_ref()?;
        (n.generation == id.1).then_some(n)
    }

    fn node_opt_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        let n = self.nodes.get_mut(id.idx())?.as_mut()?;
        if n.generation != id.1 {
            return None;
        }
        Some(n)
    }

    fn link_parent(&mut self, id: NodeId, parent: NodeId) {
        let parent_node = self.node_mut(parent);
        parent_node.children.push(id);
        self.node_mut(id).parent = Some(parent);
    }

    fn unlink_parent(&mut self, id: NodeId, parent: NodeId) {
        let p = self.node_mut(parent);
        p.children.retain(|c| *c != id);
        self.node_mut(id).parent = None;
    }

    /// True if `ancestor` is `id` or one of its ancestors.
    fn is_ancestor_or_self(&self, ancestor: NodeId, mut id: NodeId) -> bool {
        loop {
            if id == ancestor {
                return true;
            }
            match self.node(id).parent {
                Some(p) => id = p,
                None => return false,
            }
        }
    }

    fn update_world_recursive(&mut self, id: NodeId, parent: ParentFrame, damage: &mut Damage) {
        let (frame, children) = {
            let node = self.node_mut(id);
            let local_tf = node.local.local_transform;
            let world_transform = parent.world * local_tf;
            let relative_group_transform = parent.group * local_tf;
            let (group_transform, group_world_transform) = if node.is_group_root() {
                (Affine::IDENTITY, world_transform)
            } else {
                (relative_group_transform, parent.group_world)
            };

            let mut display = DisplayStatus::empty();
            if node
                .local
                .flags
                .contains(NodeFlags::VISIBLE | NodeFlags::RENDERABLE)
            {
                display |= DisplayStatus::LOCAL;
            }
            if parent.displayed {
                display |= DisplayStatus::INHERITED;
            }

            let view_bounds = node
                .local
                .view
                .filter(|_| display.is_displayed())
                .map(|v| {
                    let mut b = Bounds::new();
                    b.add_rect(v, Some(world_transform));
                    b.rect()
                });
            damage.record_change(node.world.view_bounds, view_bounds);

            node.world = WorldNode {
                world_transform,
                group_transform,
                relative_group_transform,
                group_world_transform,
                display,
                view_bounds,
            };
            let frame = ParentFrame {
                world: world_transform,
                group: group_transform,
                group_world: group_world_transform,
                displayed: display.is_displayed(),
            };
            (frame, node.children.clone())
        };

        for child in children {
            self.update_world_recursive(child, frame, damage);
        }
    }

    /// Fast bounds of `id` re-expressed in world space. Returns whether anything was measured.
    fn fast_world_bounds(&self, ctx: &mut BoundsContext, id: NodeId, out: &mut Bounds) -> bool {
        let measured = ctx.accumulate_global_bounds(self, id, out);
        let node = self.node(id);
        // A nested group root reports in its parent group's space.
        if let Some(parent) = node.parent
            && node.is_group_root()
        {
            out.apply_matrix(self.node(parent).world.group_world_transform);
        }
        measured
    }

    fn hit_recursive(&self, id: NodeId, pt: Point) -> Option<NodeId> {
        let node = self.node(id);
        // Same pruning as the bounds pass: hidden or unmeasurable subtrees are skipped whole.
        let measurable = node.local.flags.contains(NodeFlags::MEASURABLE);
        if !node.world.display.is_displayed() || !measurable {
            return None;
        }
        for child in node.children.iter().rev() {
            if let Some(hit) = self.hit_recursive(*child, pt) {
                return Some(hit);
            }
        }
        node.world
            .view_bounds
            .filter(|r| Bounds::from_rect(*r).contains_point(pt))
            .map(|_| id)
    }
}

impl BoundsSource for Scene {
    type Node = NodeId;

    fn display_status(&self, node: NodeId) -> DisplayStatus {
        self.node(node).world.display
    }

    fn is_measurable(&self, node: NodeId) -> bool {
        self.node(node).local.flags.contains(NodeFlags::MEASURABLE)
    }

    fn bounds_area(&self, node: NodeId) -> Option<Rect> {
        self.node(node).local.bounds_area
    }

    fn view_bounds(&self, node: NodeId) -> Option<Rect> {
        self.node(node).local.view
    }

    fn children(&self, node: NodeId) -> &[NodeId] {
        &self.node(node).children
    }

    fn effects(&self, node: NodeId) -> &[Box<dyn Effect>] {
        &self.node(node).effects
    }

    fn is_render_group_root(&self, node: NodeId) -> bool {
        self.node(node).is_group_root()
    }

    fn group_transform(&self, node: NodeId) -> Affine {
        self.node(node).world.group_transform
    }

    fn relative_group_transform(&self, node: NodeId) -> Affine {
        self.node(node).world.relative_group_transform
    }

    fn world_transform(&self, node: NodeId) -> Affine {
        self.node(node).world.world_transform
    }

    fn render_group_world_transform(&self, node: NodeId) -> Affine {
        self.node(node).world.group_world_transform
    }
}

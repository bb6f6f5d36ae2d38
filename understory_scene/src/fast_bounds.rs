// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Fast, conservative global bounds over a scene graph.
//!
//! The pass merges whole-subtree AABBs instead of exact transformed geometry. Results are
//! never smaller than the true bounds of the displayed, measurable content, and may be larger
//! whenever a render-group or effect boundary is crossed (each re-projection of an AABB through
//! a rotating or shearing transform can only grow it).
//!
//! ## Spaces
//!
//! Content is accumulated in *render-group space*: a node's view is merged through its
//! [`group_transform`](BoundsSource::group_transform). A node that roots a render group
//! accumulates its subtree in a scratch accumulator in its own group space and merges that
//! into its parent's group space through its
//! [`relative_group_transform`](BoundsSource::relative_group_transform).
//! Effects see bounds in render-group world space.
//!
//! The graph must be acyclic; the pass does not guard against cycles.

use alloc::boxed::Box;

use kurbo::{Affine, Rect};
use understory_bounds::{Bounds, BoundsPool};

use crate::effect::Effect;
use crate::types::DisplayStatus;

/// Read-only view of a scene graph consumed by the bounds pass.
///
/// Implemented by [`Scene`](crate::Scene); other containers can implement it to reuse the pass.
pub trait BoundsSource {
    /// Node handle.
    type Node: Copy;

    /// Combined local and inherited display bits. Nodes that are not
    /// [`FULL`](DisplayStatus::FULL) contribute nothing.
    fn display_status(&self, node: Self::Node) -> DisplayStatus;

    /// Whether the node participates in measurement at all.
    fn is_measurable(&self, node: Self::Node) -> bool;

    /// Explicit bounds area in local space, replacing measured content.
    fn bounds_area(&self, node: Self::Node) -> Option<Rect>;

    /// Local-space bounds of the node's own drawable content.
    fn view_bounds(&self, node: Self::Node) -> Option<Rect>;

    /// Children in stored order.
    fn children(&self, node: Self::Node) -> &[Self::Node];

    /// Effects in stored order.
    fn effects(&self, node: Self::Node) -> &[Box<dyn Effect>];

    /// Whether the node roots its own render group.
    fn is_render_group_root(&self, node: Self::Node) -> bool;

    /// Transform from node-local space to the space of the render group containing the node.
    ///
    /// Identity for a render-group root, whose content lives in its own group space.
    fn group_transform(&self, node: Self::Node) -> Affine;

    /// For a render-group root, the transform from node-local space to the parent render
    /// group's space. Equal to [`group_transform`](Self::group_transform) otherwise.
    fn relative_group_transform(&self, node: Self::Node) -> Affine;

    /// Full local-to-world transform.
    fn world_transform(&self, node: Self::Node) -> Affine;

    /// World transform of the render group whose space the node's content is accumulated in
    /// (the node's own group if it is a root).
    fn render_group_world_transform(&self, node: Self::Node) -> Affine;
}

/// How effect-adjusted bounds re-enter the parent accumulator.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum EffectMerge {
    /// Merge the effect-adjusted bounds once, re-projected into the parent's space.
    #[default]
    Reprojected,
    /// Merge twice when any effect ran: once through the relative group transform and once
    /// untransformed. Matches long-standing renderer behavior; covers at least as much as
    /// [`Reprojected`](Self::Reprojected) for nodes that do not root a render group.
    Legacy,
}

/// Transform used to merge a node's explicit bounds area.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum BoundsAreaSpace {
    /// Merge through the node's [`relative_group_transform`](BoundsSource::relative_group_transform),
    /// landing in the same space as the caller's accumulator.
    #[default]
    Group,
    /// Merge through the node's full [`world_transform`](BoundsSource::world_transform).
    ///
    /// Matches long-standing renderer behavior. Only correct while the containing render
    /// group's world transform is the identity; otherwise the group transform is applied twice.
    World,
}

/// Runtime options for the bounds pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BoundsOptions {
    /// Merge policy for nodes with effects.
    pub effect_merge: EffectMerge,
    /// Space in which explicit bounds areas are merged.
    pub bounds_area: BoundsAreaSpace,
}

/// Owned state for bounds queries: the scratch pool and options.
///
/// One context serves one query at a time; create one per thread or per owner.
#[derive(Debug, Default)]
pub struct BoundsContext {
    pool: BoundsPool,
    options: BoundsOptions,
}

impl BoundsContext {
    /// Create a context with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a context with the given options.
    pub fn with_options(options: BoundsOptions) -> Self {
        Self {
            pool: BoundsPool::new(),
            options,
        }
    }

    /// Current options.
    pub fn options(&self) -> BoundsOptions {
        self.options
    }

    /// Replace the options.
    pub fn set_options(&mut self, options: BoundsOptions) {
        self.options = options;
    }

    /// The scratch pool, for inspection.
    pub fn pool(&self) -> &BoundsPool {
        &self.pool
    }

    /// Compute fast global bounds of `target` and its displayed, measurable descendants.
    ///
    /// `out` is cleared first. The result is expressed in the space of `target`'s parent
    /// render group: world space for targets that do not root a group (via the containing
    /// group's world transform), and the parent group's space for a group root (world space
    /// for a top-level root). If nothing contributes, `out` is set to `(0, 0, 0, 0)`.
    pub fn compute_global_bounds<'b, S>(
        &mut self,
        source: &S,
        target: S::Node,
        out: &'b mut Bounds,
    ) -> &'b mut Bounds
    where
        S: BoundsSource + ?Sized,
    {
        if !self.accumulate_global_bounds(source, target, out) {
            out.set(0.0, 0.0, 0.0, 0.0);
        }
        out
    }

    /// Like [`compute_global_bounds`](Self::compute_global_bounds), but leaves `out` invalid
    /// when nothing contributes. Returns whether `out` is valid.
    ///
    /// Useful for culling, where "measures nothing" and "a zero box at the origin" differ.
    pub fn accumulate_global_bounds<S>(
        &mut self,
        source: &S,
        target: S::Node,
        out: &mut Bounds,
    ) -> bool
    where
        S: BoundsSource + ?Sized,
    {
        out.clear();
        visit(source, target, out, &mut self.pool, self.options);

        if !source.is_render_group_root(target) {
            out.apply_matrix(source.render_group_world_transform(target));
        }

        tracing::trace!(
            valid = out.is_valid(),
            min_x = out.min_x,
            min_y = out.min_y,
            max_x = out.max_x,
            max_y = out.max_y,
            scratch = self.pool.allocated(),
            "fast global bounds"
        );
        out.is_valid()
    }
}

fn visit<S>(
    source: &S,
    node: S::Node,
    bounds: &mut Bounds,
    pool: &mut BoundsPool,
    options: BoundsOptions,
) where
    S: BoundsSource + ?Sized,
{
    if !source.display_status(node).is_displayed() || !source.is_measurable(node) {
        return;
    }

    let effects = source.effects(node);
    let group_root = source.is_render_group_root(node);

    if effects.is_empty() && !group_root {
        // Content lands directly in the caller's accumulator.
        if !add_bounds_area(source, node, bounds, options) {
            add_content(source, node, bounds, pool, options);
        }
        return;
    }

    pool.scoped(|pool, local| {
        if !add_bounds_area(source, node, bounds, options) {
            add_content(source, node, local, pool, options);
        }

        if effects.is_empty() {
            bounds.add_bounds(local, Some(source.relative_group_transform(node)));
            return;
        }

        let advanced = apply_effects(source, node, effects, local);
        match options.effect_merge {
            EffectMerge::Reprojected => {
                let relative = group_root.then(|| source.relative_group_transform(node));
                bounds.add_bounds(local, relative);
            }
            EffectMerge::Legacy => {
                if advanced {
                    bounds.add_bounds(local, Some(source.relative_group_transform(node)));
                }
                bounds.add_bounds(local, None);
            }
        }
    });
}

/// Merge the node's bounds area, if any, and report whether it was present.
fn add_bounds_area<S>(
    source: &S,
    node: S::Node,
    bounds: &mut Bounds,
    options: BoundsOptions,
) -> bool
where
    S: BoundsSource + ?Sized,
{
    let Some(area) = source.bounds_area(node) else {
        return false;
    };
    let tf = match options.bounds_area {
        BoundsAreaSpace::Group => source.relative_group_transform(node),
        BoundsAreaSpace::World => source.world_transform(node),
    };
    bounds.add_rect(area, Some(tf));
    true
}

fn add_content<S>(
    source: &S,
    node: S::Node,
    local: &mut Bounds,
    pool: &mut BoundsPool,
    options: BoundsOptions,
) where
    S: BoundsSource + ?Sized,
{
    if let Some(view) = source.view_bounds(node) {
        local.add_rect(view, Some(source.group_transform(node)));
    }
    for &child in source.children(node) {
        visit(source, child, local, pool, options);
    }
}

/// Run every bounds-contributing effect against `local`.
///
/// `local` is moved into render-group world space before the first contributor runs and
/// moved back afterwards. Returns whether any contributor ran.
fn apply_effects<S>(
    source: &S,
    node: S::Node,
    effects: &[Box<dyn Effect>],
    local: &mut Bounds,
) -> bool
where
    S: BoundsSource + ?Sized,
{
    let mut to_world: Option<Affine> = None;
    let mut advanced = false;
    for contributor in effects.iter().filter_map(|fx| fx.bounds_contributor()) {
        if !advanced {
            advanced = true;
            let group_world = source.render_group_world_transform(node);
            // A singular group transform cannot be undone; run effects in group space.
            if group_world.determinant() != 0.0 {
                local.apply_matrix(group_world);
                to_world = Some(group_world);
            }
        }
        contributor.add_bounds(local);
    }
    if let Some(group_world) = to_world {
        local.apply_matrix(group_world.inverse());
    }
    advanced
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effect::{Channels, ColorMask, FilterPadding};
    use alloc::vec;
    use alloc::vec::Vec;
    use kurbo::Vec2;

    /// A hand-wired graph where every transform is given explicitly.
    #[derive(Default)]
    struct FlatSource {
        nodes: Vec<FlatNode>,
    }

    struct FlatNode {
        display: DisplayStatus,
        measurable: bool,
        area: Option<Rect>,
        view: Option<Rect>,
        children: Vec<usize>,
        effects: Vec<Box<dyn Effect>>,
        group_root: bool,
        group: Affine,
        relative: Affine,
        world: Affine,
        group_world: Affine,
    }

    impl Default for FlatNode {
        fn default() -> Self {
            Self {
                display: DisplayStatus::FULL,
                measurable: true,
                area: None,
                view: None,
                children: Vec::new(),
                effects: Vec::new(),
                group_root: false,
                group: Affine::IDENTITY,
                relative: Affine::IDENTITY,
                world: Affine::IDENTITY,
                group_world: Affine::IDENTITY,
            }
        }
    }

    impl FlatSource {
        fn push(&mut self, node: FlatNode) -> usize {
            self.nodes.push(node);
            self.nodes.len() - 1
        }
    }

    impl BoundsSource for FlatSource {
        type Node = usize;

        fn display_status(&self, node: usize) -> DisplayStatus {
            self.nodes[node].display
        }
        fn is_measurable(&self, node: usize) -> bool {
            self.nodes[node].measurable
        }
        fn bounds_area(&self, node: usize) -> Option<Rect> {
            self.nodes[node].area
        }
        fn view_bounds(&self, node: usize) -> Option<Rect> {
            self.nodes[node].view
        }
        fn children(&self, node: usize) -> &[usize] {
            &self.nodes[node].children
        }
        fn effects(&self, node: usize) -> &[Box<dyn Effect>] {
            &self.nodes[node].effects
        }
        fn is_render_group_root(&self, node: usize) -> bool {
            self.nodes[node].group_root
        }
        fn group_transform(&self, node: usize) -> Affine {
            self.nodes[node].group
        }
        fn relative_group_transform(&self, node: usize) -> Affine {
            self.nodes[node].relative
        }
        fn world_transform(&self, node: usize) -> Affine {
            self.nodes[node].world
        }
        fn render_group_world_transform(&self, node: usize) -> Affine {
            self.nodes[node].group_world
        }
    }

    fn query(source: &FlatSource, target: usize, ctx: &mut BoundsContext) -> Rect {
        let mut out = Bounds::new();
        ctx.compute_global_bounds(source, target, &mut out).rect()
    }

    fn translate(x: f64, y: f64) -> Affine {
        Affine::translate(Vec2::new(x, y))
    }

    #[test]
    fn root_group_world_transform_applied_once() {
        let mut src = FlatSource::default();
        let child = src.push(FlatNode {
            view: Some(Rect::new(0.0, 0.0, 10.0, 10.0)),
            group_world: translate(5.0, 5.0),
            ..Default::default()
        });
        let root = src.push(FlatNode {
            children: vec![child],
            group_world: translate(5.0, 5.0),
            ..Default::default()
        });
        let mut ctx = BoundsContext::new();
        assert_eq!(
            query(&src, root, &mut ctx),
            Rect::new(5.0, 5.0, 15.0, 15.0)
        );
    }

    #[test]
    fn empty_node_yields_zero_rect() {
        let mut src = FlatSource::default();
        let root = src.push(FlatNode {
            group_world: translate(40.0, 40.0),
            ..Default::default()
        });
        let mut out = Bounds::new();
        out.set(1.0, 2.0, 3.0, 4.0);
        BoundsContext::new().compute_global_bounds(&src, root, &mut out);
        assert!(out.is_valid(), "public result is always concrete");
        assert_eq!(out.rect(), Rect::ZERO, "dirty output must be cleared");
    }

    #[test]
    fn accumulate_keeps_empty_invalid() {
        let mut src = FlatSource::default();
        let root = src.push(FlatNode::default());
        let mut out = Bounds::new();
        let measured = BoundsContext::new().accumulate_global_bounds(&src, root, &mut out);
        assert!(!measured);
        assert!(!out.is_valid());
    }

    #[test]
    fn hidden_or_unmeasurable_nodes_are_skipped() {
        let mut src = FlatSource::default();
        let shown = src.push(FlatNode {
            view: Some(Rect::new(0.0, 0.0, 1.0, 1.0)),
            ..Default::default()
        });
        let hidden_child = src.push(FlatNode {
            view: Some(Rect::new(100.0, 100.0, 101.0, 101.0)),
            ..Default::default()
        });
        let hidden = src.push(FlatNode {
            display: DisplayStatus::LOCAL,
            view: Some(Rect::new(-50.0, -50.0, 0.0, 0.0)),
            children: vec![hidden_child],
            ..Default::default()
        });
        let unmeasured = src.push(FlatNode {
            measurable: false,
            view: Some(Rect::new(0.0, 0.0, 500.0, 500.0)),
            ..Default::default()
        });
        let root = src.push(FlatNode {
            children: vec![shown, hidden, unmeasured],
            ..Default::default()
        });
        let mut ctx = BoundsContext::new();
        assert_eq!(query(&src, root, &mut ctx), Rect::new(0.0, 0.0, 1.0, 1.0));
    }

    #[test]
    fn bounds_area_replaces_content() {
        let mut src = FlatSource::default();
        let child = src.push(FlatNode {
            view: Some(Rect::new(0.0, 0.0, 1000.0, 1000.0)),
            ..Default::default()
        });
        let root = src.push(FlatNode {
            area: Some(Rect::new(0.0, 0.0, 20.0, 10.0)),
            view: Some(Rect::new(-30.0, -30.0, 0.0, 0.0)),
            children: vec![child],
            group: translate(1.0, 2.0),
            relative: translate(1.0, 2.0),
            world: translate(1.0, 2.0),
            ..Default::default()
        });
        let mut ctx = BoundsContext::new();
        assert_eq!(query(&src, root, &mut ctx), Rect::new(1.0, 2.0, 21.0, 12.0));
    }

    #[test]
    fn bounds_area_under_translated_group_lands_once() {
        let mut src = FlatSource::default();
        let area = Rect::new(0.0, 0.0, 4.0, 4.0);
        let node = src.push(FlatNode {
            area: Some(area),
            world: translate(5.0, 5.0),
            group_world: translate(5.0, 5.0),
            ..Default::default()
        });
        let mut ctx = BoundsContext::new();
        assert_eq!(query(&src, node, &mut ctx), Rect::new(5.0, 5.0, 9.0, 9.0));

        ctx.set_options(BoundsOptions {
            bounds_area: BoundsAreaSpace::World,
            ..Default::default()
        });
        assert_eq!(
            query(&src, node, &mut ctx),
            Rect::new(10.0, 10.0, 14.0, 14.0),
            "world-space merge applies the group transform twice"
        );
    }

    #[test]
    fn zero_area_view_contributes_a_point() {
        let mut src = FlatSource::default();
        let dot = src.push(FlatNode {
            view: Some(Rect::new(3.0, 3.0, 3.0, 3.0)),
            ..Default::default()
        });
        let root = src.push(FlatNode {
            children: vec![dot],
            ..Default::default()
        });
        let mut out = Bounds::new();
        let measured = BoundsContext::new().accumulate_global_bounds(&src, root, &mut out);
        assert!(measured, "a degenerate view is still content");
        assert_eq!(out, Bounds::from_rect(Rect::new(3.0, 3.0, 3.0, 3.0)));
        assert_eq!(out.width(), 0.0);
    }

    #[test]
    fn nested_group_merges_through_relative_transform() {
        let mut src = FlatSource::default();
        let leaf = src.push(FlatNode {
            view: Some(Rect::new(0.0, 0.0, 4.0, 4.0)),
            group: translate(1.0, 1.0),
            relative: translate(1.0, 1.0),
            ..Default::default()
        });
        let group = src.push(FlatNode {
            group_root: true,
            children: vec![leaf],
            relative: translate(10.0, 0.0),
            ..Default::default()
        });
        let root = src.push(FlatNode {
            group_root: true,
            children: vec![group],
            ..Default::default()
        });
        let mut ctx = BoundsContext::new();
        assert_eq!(query(&src, root, &mut ctx), Rect::new(11.0, 1.0, 15.0, 5.0));
        assert_eq!(ctx.pool().outstanding(), 0);
        assert_eq!(ctx.pool().allocated(), 2, "one scratch per isolated level");
    }

    #[test]
    fn padding_runs_in_world_units() {
        let mut src = FlatSource::default();
        let leaf = src.push(FlatNode {
            view: Some(Rect::new(0.0, 0.0, 1.0, 1.0)),
            effects: vec![Box::new(FilterPadding::new(1.0))],
            group_world: Affine::scale(2.0),
            ..Default::default()
        });
        let mut ctx = BoundsContext::new();
        // World view (0,0,2,2) padded by one world unit on every side.
        assert_eq!(query(&src, leaf, &mut ctx), Rect::new(-1.0, -1.0, 3.0, 3.0));
    }

    #[test]
    fn inert_effects_do_not_block_later_contributors() {
        let mut src = FlatSource::default();
        let leaf = src.push(FlatNode {
            view: Some(Rect::new(0.0, 0.0, 1.0, 1.0)),
            effects: vec![
                Box::new(ColorMask {
                    channels: Channels::A,
                }),
                Box::new(FilterPadding::new(0.5)),
            ],
            ..Default::default()
        });
        let mut ctx = BoundsContext::new();
        assert_eq!(query(&src, leaf, &mut ctx), Rect::new(-0.5, -0.5, 1.5, 1.5));
    }

    #[test]
    fn singular_group_transform_runs_effects_in_group_space() {
        let mut src = FlatSource::default();
        let leaf = src.push(FlatNode {
            view: Some(Rect::new(0.0, 0.0, 1.0, 1.0)),
            effects: vec![Box::new(FilterPadding::new(1.0))],
            group_world: Affine::scale_non_uniform(1.0, 0.0),
            ..Default::default()
        });
        let mut ctx = BoundsContext::new();
        let r = query(&src, leaf, &mut ctx);
        assert!(r.x0.is_finite() && r.y1.is_finite(), "no NaN or inf leaks: {r:?}");
        assert_eq!(r, Rect::new(-1.0, 0.0, 2.0, 0.0));
    }

    #[test]
    fn legacy_merge_covers_reprojected() {
        let mut src = FlatSource::default();
        let leaf = src.push(FlatNode {
            view: Some(Rect::new(0.0, 0.0, 2.0, 2.0)),
            effects: vec![Box::new(FilterPadding::new(1.0))],
            group: translate(3.0, 0.0),
            relative: translate(3.0, 0.0),
            ..Default::default()
        });
        let root = src.push(FlatNode {
            group_root: true,
            children: vec![leaf],
            ..Default::default()
        });

        let mut ctx = BoundsContext::new();
        let reprojected = query(&src, root, &mut ctx);
        assert_eq!(reprojected, Rect::new(2.0, -1.0, 6.0, 3.0));

        ctx.set_options(BoundsOptions {
            effect_merge: EffectMerge::Legacy,
            ..Default::default()
        });
        let legacy = query(&src, root, &mut ctx);
        assert_eq!(legacy, Rect::new(2.0, -1.0, 9.0, 3.0));
        assert_eq!(legacy.union(reprojected), legacy);
    }
}

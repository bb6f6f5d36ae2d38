// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Render groups and effects.
//!
//! Put a padded, scaled subtree in its own render group and compare the two effect merge modes.
//! Then drive the bounds pass directly with a `BoundsContext`.
//!
//! Run:
//! - `cargo run -p understory_demos --example render_group_effects`

use kurbo::{Affine, Rect, Vec2};
use understory_bounds::Bounds;
use understory_scene::{
    BoundsContext, BoundsOptions, Channels, ColorMask, EffectMerge, FilterPadding, LocalNode,
    NodeFlags, Scene,
};

fn main() {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::TRACE)
        .init();

    let mut scene = Scene::new();
    let stage = scene.insert(None, LocalNode::default());
    let group = scene.insert(
        Some(stage),
        LocalNode {
            local_transform: Affine::translate(Vec2::new(40.0, 40.0)) * Affine::scale(2.0),
            flags: NodeFlags::default() | NodeFlags::RENDER_GROUP,
            ..Default::default()
        },
    );
    let glow = scene.insert(
        Some(group),
        LocalNode {
            view: Some(Rect::new(0.0, 0.0, 10.0, 10.0)),
            ..Default::default()
        },
    );
    scene.add_effect(glow, Box::new(FilterPadding::new(4.0)));
    scene.add_effect(
        glow,
        Box::new(ColorMask {
            channels: Channels::R | Channels::A,
        }),
    );
    let _ = scene.commit();

    // Padding is in world units even inside the scaled group.
    println!("glow (world): {:?}", scene.world_bounds(glow));
    println!("group (world): {:?}", scene.world_bounds(group));
    println!("stage: {:?}", scene.global_bounds(stage));

    scene.set_bounds_options(BoundsOptions {
        effect_merge: EffectMerge::Legacy,
        ..Default::default()
    });
    println!("stage (legacy merge): {:?}", scene.global_bounds(stage));

    // The bounds pass runs against anything that implements `BoundsSource`.
    let mut ctx = BoundsContext::new();
    let mut out = Bounds::new();
    ctx.compute_global_bounds(&scene, stage, &mut out);
    println!(
        "context pass: {:?} (pool allocated {})",
        out.rect(),
        ctx.pool().allocated()
    );
}

// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Scene bounds basics.
//!
//! Build a small scene, measure it, rotate a node, hide a node, and commit damage.
//!
//! Run:
//! - `cargo run -p understory_demos --example scene_bounds_basics`

use kurbo::{Affine, Point, Rect, Vec2};
use understory_scene::{LocalNode, Scene};

fn main() {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    let mut scene = Scene::new();
    let stage = scene.insert(
        None,
        LocalNode {
            local_transform: Affine::translate(Vec2::new(5.0, 5.0)),
            ..Default::default()
        },
    );
    let panel = scene.insert(
        Some(stage),
        LocalNode {
            view: Some(Rect::new(0.0, 0.0, 100.0, 60.0)),
            ..Default::default()
        },
    );
    let badge = scene.insert(
        Some(panel),
        LocalNode {
            local_transform: Affine::translate(Vec2::new(90.0, -10.0)),
            view: Some(Rect::new(0.0, 0.0, 20.0, 20.0)),
            ..Default::default()
        },
    );
    let _ = scene.commit();

    println!("panel bounds: {:?}", scene.global_bounds(panel));
    println!("badge bounds: {:?}", scene.global_bounds(badge));

    // Rotation makes the box conservative: it covers the rotated corners.
    scene.set_local_transform(
        badge,
        Affine::translate(Vec2::new(90.0, -10.0)) * Affine::rotate_about(0.5, Point::new(10.0, 10.0)),
    );
    let damage = scene.commit();
    println!("after rotate, damage rects: {:?}", damage.dirty_rects);
    println!("badge bounds: {:?}", scene.global_bounds(badge));
    println!("panel bounds: {:?}", scene.global_bounds(panel));

    // Hidden nodes stop contributing.
    scene.set_visible(badge, false);
    let damage = scene.commit();
    println!("after hide, damage union: {:?}", damage.union_rect());
    println!("panel bounds: {:?}", scene.global_bounds(panel));

    let pt = Point::new(20.0, 20.0);
    println!("hit at {pt:?}: {:?}", scene.hit_test_point(pt));
}

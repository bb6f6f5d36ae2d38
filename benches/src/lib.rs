// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Scene builders shared by the Understory benchmarks.

use kurbo::{Affine, Rect, Vec2};
use understory_scene::{FilterPadding, LocalNode, NodeFlags, NodeId, Scene};

/// Shape of a generated scene.
#[derive(Clone, Copy, Debug)]
pub enum Shape {
    /// A single chain of `n` nodes.
    Deep(usize),
    /// A root with `n` leaf children.
    Wide(usize),
    /// A `fanout`-ary tree of the given depth; every other level roots a render group and
    /// every third node carries a padding effect.
    Mixed {
        /// Children per node.
        fanout: usize,
        /// Levels below the stage.
        depth: usize,
    },
}

fn leaf(i: usize) -> LocalNode {
    let x = (i % 97) as f64;
    LocalNode {
        local_transform: Affine::translate(Vec2::new(x, 1.0)),
        view: Some(Rect::new(0.0, 0.0, 8.0, 8.0)),
        ..Default::default()
    }
}

/// Build a committed scene and return it with its stage node.
pub fn build(shape: Shape) -> (Scene, NodeId) {
    let mut scene = Scene::new();
    let stage = scene.insert(None, LocalNode::default());
    match shape {
        Shape::Deep(n) => {
            let mut parent = stage;
            for i in 0..n {
                parent = scene.insert(Some(parent), leaf(i));
            }
        }
        Shape::Wide(n) => {
            for i in 0..n {
                scene.insert(Some(stage), leaf(i));
            }
        }
        Shape::Mixed { fanout, depth } => {
            let mut level = vec![stage];
            let mut count = 0;
            for d in 0..depth {
                let mut next = Vec::with_capacity(level.len() * fanout);
                for &parent in &level {
                    for _ in 0..fanout {
                        let mut local = leaf(count);
                        if d % 2 == 1 {
                            local.flags |= NodeFlags::RENDER_GROUP;
                        }
                        let id = scene.insert(Some(parent), local);
                        if count % 3 == 0 {
                            scene.add_effect(id, Box::new(FilterPadding::new(2.0)));
                        }
                        count += 1;
                        next.push(id);
                    }
                }
                level = next;
            }
        }
    }
    let _ = scene.commit();
    (scene, stage)
}

// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Damage summary returned from commit.

use alloc::vec::Vec;
use kurbo::Rect;
use understory_bounds::Bounds;

/// World-space regions whose drawn content changed in a [`Scene::commit`](crate::Scene::commit).
///
/// For each node whose world view AABB changed, both the old and the new AABB are recorded
/// (zero-area boxes are skipped).
#[derive(Clone, Debug, Default)]
pub struct Damage {
    /// World-space rectangles that should be repainted.
    pub dirty_rects: Vec<Rect>,
}

impl Damage {
    /// True if nothing needs repainting.
    pub fn is_empty(&self) -> bool {
        self.dirty_rects.is_empty()
    }

    /// Union of all damage rects as an accumulator; invalid when there is no damage.
    pub fn union_bounds(&self) -> Bounds {
        let mut acc = Bounds::new();
        for r in &self.dirty_rects {
            acc.add_rect(*r, None);
        }
        acc
    }

    /// Union of all damage rects, or `None` when there is no damage.
    pub fn union_rect(&self) -> Option<Rect> {
        let acc = self.union_bounds();
        acc.is_valid().then(|| acc.rect())
    }

    pub(crate) fn record_change(&mut self, old: Option<Rect>, new: Option<Rect>) {
        if old == new {
            return;
        }
        for r in [old, new].into_iter().flatten() {
            if r.width() > 0.0 && r.height() > 0.0 {
                self.dirty_rects.push(r);
            }
        }
    }
}

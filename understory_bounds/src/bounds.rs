// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The [`Bounds`] accumulator.

use kurbo::{Affine, Point, Rect};

/// A mutable axis-aligned bounding box that grows by union.
///
/// A fresh accumulator is *invalid*: nothing has been merged in yet, which is
/// distinct from a valid box of zero size. The invalid state is encoded as
/// `min = +inf`, `max = -inf`, so the first union defines the box exactly and
/// every later union takes the componentwise min/max.
///
/// ## Semantics
///
/// - Union operations ([`add_frame`](Self::add_frame), [`add_rect`](Self::add_rect),
///   [`add_bounds`](Self::add_bounds), [`add_points`](Self::add_points)) never shrink the box.
/// - A transformed union merges the AABB of the transformed corners, not the parallelogram,
///   so results are conservative under rotation and shear.
/// - [`width`](Self::width) and [`height`](Self::height) are only meaningful once
///   [`is_valid`](Self::is_valid) holds, or after [`set`](Self::set).
///
/// The type is not `Copy`; scratch instances move through a
/// [`BoundsPool`](crate::BoundsPool) by value.
#[derive(Clone, Debug, PartialEq)]
pub struct Bounds {
    /// Minimum x (left).
    pub min_x: f64,
    /// Minimum y (top).
    pub min_y: f64,
    /// Maximum x (right).
    pub max_x: f64,
    /// Maximum y (bottom).
    pub max_y: f64,
}

impl Default for Bounds {
    fn default() -> Self {
        Self::new()
    }
}

impl Bounds {
    /// Create an invalid (empty) accumulator.
    pub const fn new() -> Self {
        Self {
            min_x: f64::INFINITY,
            min_y: f64::INFINITY,
            max_x: f64::NEG_INFINITY,
            max_y: f64::NEG_INFINITY,
        }
    }

    /// Create a valid accumulator covering `rect`.
    pub fn from_rect(rect: Rect) -> Self {
        let mut b = Self::new();
        b.add_rect(rect, None);
        b
    }

    /// Reset to the invalid state.
    pub fn clear(&mut self) -> &mut Self {
        *self = Self::new();
        self
    }

    /// Overwrite all four coordinates unconditionally.
    ///
    /// Use `set(0.0, 0.0, 0.0, 0.0)` to force a concrete zero-size box.
    pub fn set(&mut self, min_x: f64, min_y: f64, max_x: f64, max_y: f64) {
        self.min_x = min_x;
        self.min_y = min_y;
        self.max_x = max_x;
        self.max_y = max_y;
    }

    /// Overwrite with the state of `other`, including invalidity.
    pub fn copy_from(&mut self, other: &Self) {
        self.set(other.min_x, other.min_y, other.max_x, other.max_y);
    }

    /// True once a union has contributed a frame, or after [`set`](Self::set) with ordered values.
    #[inline]
    pub fn is_valid(&self) -> bool {
        self.min_x <= self.max_x && self.min_y <= self.max_y
    }

    /// True if the box is invalid or has zero width or height.
    pub fn is_empty(&self) -> bool {
        !self.is_valid() || self.max_x == self.min_x || self.max_y == self.min_y
    }

    /// True if the box is valid with strictly positive width and height.
    pub fn is_positive(&self) -> bool {
        self.max_x > self.min_x && self.max_y > self.min_y
    }

    /// `max_x - min_x`. Negative infinity while invalid.
    #[inline]
    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    /// `max_y - min_y`. Negative infinity while invalid.
    #[inline]
    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    /// The box as a [`Rect`], or [`Rect::ZERO`] while invalid.
    pub fn rect(&self) -> Rect {
        if self.is_valid() {
            Rect::new(self.min_x, self.min_y, self.max_x, self.max_y)
        } else {
            Rect::ZERO
        }
    }

    /// Union an axis-aligned frame, optionally transformed first.
    ///
    /// With a transform, the union uses the AABB of the four transformed corners.
    /// An identity transform takes the untransformed path.
    pub fn add_frame(
        &mut self,
        min_x: f64,
        min_y: f64,
        max_x: f64,
        max_y: f64,
        transform: Option<Affine>,
    ) {
        match transform {
            Some(tf) if tf != Affine::IDENTITY => {
                let (x0, y0, x1, y1) = transform_frame(tf, min_x, min_y, max_x, max_y);
                self.union_raw(x0, y0, x1, y1);
            }
            _ => self.union_raw(min_x, min_y, max_x, max_y),
        }
    }

    /// Union a [`Rect`], optionally transformed first.
    pub fn add_rect(&mut self, rect: Rect, transform: Option<Affine>) {
        let r = rect.abs();
        self.add_frame(r.x0, r.y0, r.x1, r.y1, transform);
    }

    /// Union another accumulator, optionally transformed first.
    ///
    /// An invalid `other` contributes nothing.
    pub fn add_bounds(&mut self, other: &Self, transform: Option<Affine>) {
        if !other.is_valid() {
            return;
        }
        self.add_frame(other.min_x, other.min_y, other.max_x, other.max_y, transform);
    }

    /// Union a set of points (for example mesh vertices), optionally transformed first.
    pub fn add_points(&mut self, points: &[Point], transform: Option<Affine>) {
        let tf = transform.filter(|tf| *tf != Affine::IDENTITY);
        for &p in points {
            let p = match tf {
                Some(tf) => tf * p,
                None => p,
            };
            self.union_raw(p.x, p.y, p.x, p.y);
        }
    }

    /// Replace the box with the AABB of its own corners under `transform`.
    ///
    /// No-op while invalid.
    pub fn apply_matrix(&mut self, transform: Affine) {
        if !self.is_valid() || transform == Affine::IDENTITY {
            return;
        }
        let (x0, y0, x1, y1) =
            transform_frame(transform, self.min_x, self.min_y, self.max_x, self.max_y);
        self.set(x0, y0, x1, y1);
    }

    /// Inclusive point containment. Always false while invalid.
    pub fn contains_point(&self, pt: Point) -> bool {
        self.is_valid()
            && self.min_x <= pt.x
            && pt.x <= self.max_x
            && self.min_y <= pt.y
            && pt.y <= self.max_y
    }

    /// True if the box overlaps `rect` (edges inclusive). Always false while invalid.
    pub fn intersects_rect(&self, rect: Rect) -> bool {
        let r = rect.abs();
        self.is_valid()
            && self.min_x <= r.x1
            && r.x0 <= self.max_x
            && self.min_y <= r.y1
            && r.y0 <= self.max_y
    }

    /// Grow every edge outward by `x` horizontally and `y` vertically.
    ///
    /// Negative amounts shrink the box; an axis shrunk past zero size collapses onto its
    /// center, so a valid box stays valid.
    pub fn pad(&mut self, x: f64, y: f64) {
        if !self.is_valid() {
            return;
        }
        (self.min_x, self.max_x) = pad_axis(self.min_x, self.max_x, x);
        (self.min_y, self.max_y) = pad_axis(self.min_y, self.max_y, y);
    }

    /// Clamp the box to `rect`.
    ///
    /// Unlike the union operations this can shrink the box, and a box fully outside
    /// `rect` collapses onto its nearest edge.
    pub fn fit(&mut self, rect: Rect) {
        if !self.is_valid() {
            return;
        }
        let r = rect.abs();
        self.min_x = self.min_x.clamp(r.x0, r.x1);
        self.max_x = self.max_x.clamp(r.x0, r.x1);
        self.min_y = self.min_y.clamp(r.y0, r.y1);
        self.max_y = self.max_y.clamp(r.y0, r.y1);
    }

    /// Round outward to integer coordinates.
    pub fn ceil(&mut self) {
        if !self.is_valid() {
            return;
        }
        let r = self.rect().expand();
        self.set(r.x0, r.y0, r.x1, r.y1);
    }

    /// Scale all four coordinates about the origin.
    ///
    /// A negative factor mirrors the box; its edges are swapped so `min <= max` holds.
    pub fn scale(&mut self, sx: f64, sy: f64) {
        if !self.is_valid() {
            return;
        }
        let (x0, x1) = (self.min_x * sx, self.max_x * sx);
        let (y0, y1) = (self.min_y * sy, self.max_y * sy);
        self.set(x0.min(x1), y0.min(y1), x0.max(x1), y0.max(y1));
    }

    #[inline]
    fn union_raw(&mut self, min_x: f64, min_y: f64, max_x: f64, max_y: f64) {
        self.min_x = self.min_x.min(min_x);
        self.min_y = self.min_y.min(min_y);
        self.max_x = self.max_x.max(max_x);
        self.max_y = self.max_y.max(max_y);
    }
}

fn pad_axis(min: f64, max: f64, amount: f64) -> (f64, f64) {
    let (lo, hi) = (min - amount, max + amount);
    if lo <= hi {
        (lo, hi)
    } else {
        let mid = 0.5 * (min + max);
        (mid, mid)
    }
}

/// AABB of the four corners of a frame under `affine`, as `(min_x, min_y, max_x, max_y)`.
#[inline]
fn transform_frame(
    affine: Affine,
    min_x: f64,
    min_y: f64,
    max_x: f64,
    max_y: f64,
) -> (f64, f64, f64, f64) {
    let [a, b, c, d, e, f] = affine.as_coeffs();
    let x0 = (a * min_x).min(a * max_x) + (c * min_y).min(c * max_y);
    let x1 = (a * min_x).max(a * max_x) + (c * min_y).max(c * max_y);
    let y0 = (b * min_x).min(b * max_x) + (d * min_y).min(d * max_y);
    let y1 = (b * min_x).max(b * max_x) + (d * min_y).max(d * max_y);
    (x0 + e, y0 + f, x1 + e, y1 + f)
}

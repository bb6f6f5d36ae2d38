// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Post-processing effects as seen by the bounds pass.
//!
//! The shading side of an effect lives elsewhere. Here an effect is only asked whether it
//! changes the extent of what it draws; effects that do expose a [`BoundsContributor`].

use core::fmt::Debug;

use understory_bounds::Bounds;

/// Capability of an effect to reshape the bounds of the node it is attached to.
pub trait BoundsContributor {
    /// Adjust `bounds` in place.
    ///
    /// `bounds` is expressed in render-group world space when called from the bounds pass,
    /// so margins are in world units. It may be invalid if the node measured nothing.
    fn add_bounds(&self, bounds: &mut Bounds);
}

/// An effect attached to a scene node.
pub trait Effect: Debug {
    /// The bounds capability of this effect, if any.
    ///
    /// The default is `None`: the effect is inert for bounds purposes.
    fn bounds_contributor(&self) -> Option<&dyn BoundsContributor> {
        None
    }
}

/// Filter padding: expands bounds by a fixed margin on every side (blur, glow, drop shadow).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FilterPadding {
    /// Margin added to every edge, in world units.
    pub padding: f64,
}

impl FilterPadding {
    /// Padding of `padding` on every side.
    pub const fn new(padding: f64) -> Self {
        Self { padding }
    }
}

impl BoundsContributor for FilterPadding {
    fn add_bounds(&self, bounds: &mut Bounds) {
        bounds.pad(self.padding, self.padding);
    }
}

impl Effect for FilterPadding {
    fn bounds_contributor(&self) -> Option<&dyn BoundsContributor> {
        Some(self)
    }
}

bitflags::bitflags! {
    /// Color channels written by a [`ColorMask`].
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct Channels: u8 {
        /// Red.
        const R = 0b0001;
        /// Green.
        const G = 0b0010;
        /// Blue.
        const B = 0b0100;
        /// Alpha.
        const A = 0b1000;
    }
}

/// Restricts which color channels are written. Does not change bounds.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ColorMask {
    /// Channels that remain writable.
    pub channels: Channels,
}

impl Effect for ColorMask {}

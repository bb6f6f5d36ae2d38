// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A free list of scratch [`Bounds`] for recursive passes.

use alloc::vec::Vec;

use crate::Bounds;

/// Reusable scratch accumulators.
///
/// Borrowing is by value: [`acquire`](Self::acquire) moves a cleared [`Bounds`] out and
/// [`release`](Self::release) moves it back, so a released instance cannot be touched by its
/// previous borrower. Recursive callers should prefer [`scoped`](Self::scoped), which keeps
/// borrows and returns in stack order and releases on every exit path of the closure.
///
/// The pool is plain owned state. Thread it through a call tree as `&mut BoundsPool`
/// (or own it in a context object); it is never shared between concurrent queries.
#[derive(Debug, Default)]
pub struct BoundsPool {
    free: Vec<Bounds>,
    outstanding: usize,
    allocated: usize,
}

impl BoundsPool {
    /// Create an empty pool.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a pool pre-warmed with `capacity` accumulators.
    pub fn with_capacity(capacity: usize) -> Self {
        let mut free = Vec::with_capacity(capacity);
        free.resize_with(capacity, Bounds::new);
        Self {
            free,
            outstanding: 0,
            allocated: capacity,
        }
    }

    /// Take a cleared accumulator, reusing a released one when available.
    pub fn acquire(&mut self) -> Bounds {
        self.outstanding += 1;
        match self.free.pop() {
            Some(mut b) => {
                b.clear();
                b
            }
            None => {
                self.allocated += 1;
                Bounds::new()
            }
        }
    }

    /// Return an accumulator obtained from [`acquire`](Self::acquire).
    pub fn release(&mut self, bounds: Bounds) {
        debug_assert!(
            self.outstanding > 0,
            "released more scratch bounds than were acquired"
        );
        self.outstanding = self.outstanding.saturating_sub(1);
        self.free.push(bounds);
    }

    /// Run `f` with a cleared scratch accumulator, releasing it afterwards.
    ///
    /// The closure also receives the pool so it can open nested scopes.
    pub fn scoped<R>(&mut self, f: impl FnOnce(&mut Self, &mut Bounds) -> R) -> R {
        let mut scratch = self.acquire();
        let out = f(self, &mut scratch);
        self.release(scratch);
        out
    }

    /// Number of idle accumulators ready for reuse.
    pub fn available(&self) -> usize {
        self.free.len()
    }

    /// Number of accumulators currently borrowed.
    pub fn outstanding(&self) -> usize {
        self.outstanding
    }

    /// Total accumulators this pool has ever created.
    pub fn allocated(&self) -> usize {
        self.allocated
    }
}

//! Per-block linear parameter ramps.
//!
//! Control values arrive once per audio block and may jump arbitrarily
//! between blocks (modulation, user gestures). [`BlockRamp`] converts each
//! new per-block target into a per-sample linear ramp that reaches the
//! target in exactly one block and then holds, so coefficients derived from
//! the ramped value never step at a block boundary.
//!
//! ## Usage
//!
//! ```rust
//! use voce_core::BlockRamp;
//!
//! let mut time = BlockRamp::new(64);
//! time.set_instant(100.0); // initialization: no one-block fade-in
//!
//! // Each block: retarget, then expand into per-sample values
//! let mut values = [0.0f32; 64];
//! time.ramp_to(150.0);
//! time.fill(&mut values);
//! assert_eq!(values[63], 150.0);
//! ```

/// A per-block linear ramp for one smoothed parameter.
///
/// Unlike a free-running smoother, the ramp length is pinned to the block
/// size: after one call to [`fill`](Self::fill) the value has converged to
/// the most recent target exactly.
#[derive(Debug, Clone)]
pub struct BlockRamp {
    /// Current smoothed value
    current: f32,
    /// Target value for this block
    target: f32,
    /// Increment per sample while ramping
    increment: f32,
    /// Samples remaining until the target is reached
    samples_remaining: u32,
    /// Block length in samples
    block_size: u32,
}

impl BlockRamp {
    /// Create a ramp for the given block size, starting at zero.
    ///
    /// # Panics
    ///
    /// Panics if `block_size` is zero.
    pub fn new(block_size: usize) -> Self {
        assert!(block_size > 0, "block size must be > 0");
        Self {
            current: 0.0,
            target: 0.0,
            increment: 0.0,
            samples_remaining: 0,
            block_size: block_size as u32,
        }
    }

    /// Set a new target; the value will ramp there over exactly one block.
    pub fn ramp_to(&mut self, target: f32) {
        self.target = target;
        if target == self.current {
            self.increment = 0.0;
            self.samples_remaining = 0;
        } else {
            self.increment = (target - self.current) / self.block_size as f32;
            self.samples_remaining = self.block_size;
        }
    }

    /// Jump to a value immediately, skipping the ramp.
    ///
    /// Used at voice initialization so a default does not fade in over the
    /// first block.
    pub fn set_instant(&mut self, value: f32) {
        self.current = value;
        self.target = value;
        self.increment = 0.0;
        self.samples_remaining = 0;
    }

    /// Advance by one sample and return the new value.
    #[inline]
    pub fn advance(&mut self) -> f32 {
        if self.samples_remaining > 0 {
            self.current += self.increment;
            self.samples_remaining -= 1;
            if self.samples_remaining == 0 {
                // Snap to the exact target so float error never accumulates
                self.current = self.target;
            }
        }
        self.current
    }

    /// Expand one block of per-sample values into `out`.
    ///
    /// `out` is typically the whole block; shorter slices advance the ramp
    /// by only that many samples.
    #[inline]
    pub fn fill(&mut self, out: &mut [f32]) {
        for v in out.iter_mut() {
            *v = self.advance();
        }
    }

    /// Current smoothed value without advancing.
    #[inline]
    pub fn get(&self) -> f32 {
        self.current
    }

    /// The target of the ramp in flight (or the held value).
    #[inline]
    pub fn target(&self) -> f32 {
        self.target
    }
}

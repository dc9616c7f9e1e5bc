//! Sinc-interpolated delay lines and the tiered storage pool behind them.
//!
//! # Types
//!
//! - [`SincDelayLine`] - circular fractional delay read through the shared
//!   12-tap windowed-sinc kernel
//! - [`DelayLinePool`] - borrow/return arena for delay-line storage, so a
//!   voice starting mid-performance never allocates
//! - [`LineTier`] - the two storage sizes the pool hands out
//!
//! # Pool discipline
//!
//! The host pre-reserves storage before real-time processing begins, then
//! acquires a line in each voice's init path and returns it at teardown.
//! Acquire and release are O(1) pops and pushes on a free list; a pool miss
//! falls back to a heap allocation, which is only acceptable outside the
//! audio thread.

#[cfg(not(feature = "std"))]
extern crate alloc;

#[cfg(feature = "std")]
extern crate std as alloc;

use alloc::sync::Arc;
use alloc::vec;
use alloc::vec::Vec;

use crate::sinc::{FIR_TAPS, SUB_STEPS, SincTable};

/// Storage size classes for pooled delay lines.
///
/// The tier is picked once per voice from the sample rate; processing never
/// branches on it again.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LineTier {
    /// 2^15 samples, enough for 250 ms at rates up to ~128 kHz.
    Short,
    /// 2^17 samples, for high sample rates.
    Long,
}

impl LineTier {
    /// Buffer length in samples. Always a power of two.
    #[must_use]
    pub const fn capacity(self) -> usize {
        match self {
            LineTier::Short => 1 << 15,
            LineTier::Long => 1 << 17,
        }
    }

    /// Tier required for a 250 ms delay at the given sample rate.
    #[must_use]
    pub fn for_sample_rate(sample_rate: f32) -> Self {
        if sample_rate * 0.1 > (1 << 14) as f32 {
            LineTier::Long
        } else {
            LineTier::Short
        }
    }
}

/// One pooled delay buffer. Opaque outside this module; obtained from
/// [`DelayLinePool::acquire`] and either wrapped in a [`SincDelayLine`] or
/// handed back via [`DelayLinePool::release`].
#[derive(Debug)]
pub struct LineStorage {
    buffer: Vec<f32>,
    tier: LineTier,
}

impl LineStorage {
    fn new(tier: LineTier) -> Self {
        Self {
            buffer: vec![0.0; tier.capacity()],
            tier,
        }
    }

    /// The tier this storage belongs to.
    #[must_use]
    pub fn tier(&self) -> LineTier {
        self.tier
    }
}

/// Free-list arena for delay-line storage, shared by all voices of an
/// instrument.
///
/// The host owns the pool and passes it to voice lifecycle methods; voice
/// init and teardown are serialized against processing, so no locking is
/// involved.
///
/// # Example
///
/// ```rust
/// use voce_core::{DelayLinePool, LineTier};
///
/// let mut pool = DelayLinePool::new();
/// pool.prereserve(LineTier::Short, 32); // before real-time starts
///
/// let line = pool.acquire(LineTier::Short); // voice init: O(1), no alloc
/// pool.release(line); // voice teardown
/// ```
#[derive(Debug, Default)]
pub struct DelayLinePool {
    short_free: Vec<LineStorage>,
    long_free: Vec<LineStorage>,
}

impl DelayLinePool {
    /// Create an empty pool.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn free_list(&mut self, tier: LineTier) -> &mut Vec<LineStorage> {
        match tier {
            LineTier::Short => &mut self.short_free,
            LineTier::Long => &mut self.long_free,
        }
    }

    /// Allocate up to `count` free lines of the given tier ahead of time.
    ///
    /// Call from a non-real-time context so later [`acquire`](Self::acquire)
    /// calls are allocation-free.
    pub fn prereserve(&mut self, tier: LineTier, count: usize) {
        let list = self.free_list(tier);
        while list.len() < count {
            list.push(LineStorage::new(tier));
        }
    }

    /// Take a cleared line from the pool, allocating on a miss.
    pub fn acquire(&mut self, tier: LineTier) -> LineStorage {
        match self.free_list(tier).pop() {
            Some(mut storage) => {
                // Returned lines may still hold the previous voice's audio
                storage.buffer.fill(0.0);
                storage
            }
            None => LineStorage::new(tier),
        }
    }

    /// Return a line to the pool for reuse.
    pub fn release(&mut self, storage: LineStorage) {
        let tier = storage.tier;
        self.free_list(tier).push(storage);
    }

    /// Number of free lines currently held for a tier.
    #[must_use]
    pub fn available(&self, tier: LineTier) -> usize {
        match tier {
            LineTier::Short => self.short_free.len(),
            LineTier::Long => self.long_free.len(),
        }
    }
}

/// Circular delay line with windowed-sinc fractional reads.
///
/// Wraps pooled [`LineStorage`] and the shared [`SincTable`]. Reads are
/// clamped to at least [`FIR_TAPS`] samples so the interpolation kernel
/// never reaches past the most recent write.
#[derive(Debug)]
pub struct SincDelayLine {
    storage: LineStorage,
    table: Arc<SincTable>,
    write_pos: usize,
}

impl SincDelayLine {
    /// Wrap pooled storage. The buffer length must be a power of two, which
    /// every [`LineTier`] guarantees.
    #[must_use]
    pub fn new(storage: LineStorage, table: Arc<SincTable>) -> Self {
        debug_assert!(storage.buffer.len().is_power_of_two());
        Self {
            storage,
            table,
            write_pos: 0,
        }
    }

    /// Push one sample and advance the write cursor.
    #[inline]
    pub fn write(&mut self, sample: f32) {
        let mask = self.storage.buffer.len() - 1;
        self.storage.buffer[self.write_pos] = sample;
        self.write_pos = (self.write_pos + 1) & mask;
    }

    /// Read `delay_samples` behind the write cursor with sinc interpolation.
    ///
    /// The delay is clamped to `[FIR_TAPS, capacity - FIR_TAPS]`: the lower
    /// bound keeps the kernel causal, the upper bound keeps its trailing
    /// taps inside the buffer.
    #[inline]
    pub fn read(&self, delay_samples: f32) -> f32 {
        let cap = self.storage.buffer.len();
        let mask = cap - 1;

        let d = delay_samples.clamp(FIR_TAPS as f32, (cap - FIR_TAPS) as f32);
        let i = d as usize;
        let frac = d - i as f32;

        // 24-bit sub-sample position: top 8 bits pick the kernel row, low 16
        // interpolate toward the next row via the offset table.
        let pos = (frac * (SUB_STEPS as f32 * 65536.0)) as u32;
        let row = (pos >> 16) as usize;
        let lipol = (pos & 0xffff) as f32;
        let base = row * FIR_TAPS;

        // The kernel's center tap sits FIR_TAPS/2 - 1 positions in, so tap k
        // reads the sample (k + i - (FIR_TAPS/2 - 1)) behind the newest one.
        let newest = self.write_pos + 2 * cap - 1;
        let start = newest + (FIR_TAPS / 2 - 1) - i;

        let mut acc = 0.0;
        for k in 0..FIR_TAPS {
            let h = self.table.at(base + k) + lipol * self.table.offset_at(base + k);
            acc += h * self.storage.buffer[(start - k) & mask];
        }
        acc
    }

    /// Zero the buffer and reset the write cursor.
    pub fn clear(&mut self) {
        self.storage.buffer.fill(0.0);
        self.write_pos = 0;
    }

    /// Buffer length in samples.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.storage.buffer.len()
    }

    /// The storage tier backing this line.
    #[must_use]
    pub fn tier(&self) -> LineTier {
        self.storage.tier
    }

    /// Unwrap the pooled storage so it can be released.
    #[must_use]
    pub fn into_storage(self) -> LineStorage {
        self.storage
    }
}

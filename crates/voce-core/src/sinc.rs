//! Shared windowed-sinc interpolation table.
//!
//! One [`SincTable`] serves every voice in the process: fractional delay-line
//! reads and bandlimited pulse-edge synthesis both convolve the same 12-tap
//! kernel, selected from 256 sub-sample positions. The table is built once
//! at startup (f64 precision, stored as f32) and never mutated afterwards,
//! so it can be shared by plain reference or `Arc` across any number of
//! voices.
//!
//! ## Layout
//!
//! Row `j` of [`SUB_STEPS`]` + 1` rows holds the [`FIR_TAPS`] kernel taps for
//! sub-sample position `j / SUB_STEPS`. A parallel offset table stores
//! `(next_row - this_row) / 65536` per entry, so a 16-bit fractional
//! position interpolates linearly between adjacent rows without a divide.

#[cfg(not(feature = "std"))]
extern crate alloc;

#[cfg(feature = "std")]
extern crate std as alloc;

use alloc::vec;
use alloc::vec::Vec;

use libm::{cos, sin};

/// Number of FIR taps in the interpolation kernel.
pub const FIR_TAPS: usize = 12;

/// Number of sub-sample positions tabulated per sample interval.
pub const SUB_STEPS: usize = 256;

/// Kernel cutoff as a fraction of Nyquist. Close to 1 so an interpolated
/// impulse keeps its amplitude; the window supplies the transition band.
const CUTOFF: f64 = 0.95;

/// Normalized sinc: `sin(pi x) / (pi x)`, 1 at x = 0.
fn sinc(x: f64) -> f64 {
    if x.abs() < 1e-9 {
        return 1.0;
    }
    let px = core::f64::consts::PI * x;
    sin(px) / px
}

/// Four-term Blackman-Harris window centered on t = 0, spanning ±taps/2.
fn blackman_harris(t: f64, taps: f64) -> f64 {
    if t.abs() > taps / 2.0 {
        return 0.0;
    }
    let x = t / taps + 0.5;
    const A0: f64 = 0.35875;
    const A1: f64 = 0.48829;
    const A2: f64 = 0.14128;
    const A3: f64 = 0.01168;
    let w = core::f64::consts::TAU * x;
    A0 - A1 * cos(w) + A2 * cos(2.0 * w) - A3 * cos(3.0 * w)
}

/// Read-only windowed-sinc kernel table shared by all voices.
///
/// Construct once and hand out references; under `std`,
/// [`SincTable::shared`] provides the process-wide instance.
#[derive(Debug)]
pub struct SincTable {
    /// Kernel taps, row-major: `(SUB_STEPS + 1) × FIR_TAPS`.
    table: Vec<f32>,
    /// Per-entry row-to-row delta scaled by 1/65536 for 16-bit interpolation.
    offset: Vec<f32>,
}

impl SincTable {
    /// Build the table. Runs once at startup; not real-time safe.
    pub fn new() -> Self {
        let rows = SUB_STEPS + 1;
        let mut table = vec![0.0f32; rows * FIR_TAPS];

        for j in 0..rows {
            for k in 0..FIR_TAPS {
                // Tap position relative to the kernel center for sub-sample
                // position j/SUB_STEPS. Row j approximates a fractional
                // delay of FIR_TAPS/2 - 1 + j/SUB_STEPS samples.
                let t = -(k as f64) + FIR_TAPS as f64 / 2.0 + j as f64 / SUB_STEPS as f64 - 1.0;
                table[j * FIR_TAPS + k] =
                    (blackman_harris(t, FIR_TAPS as f64) * CUTOFF * sinc(CUTOFF * t)) as f32;
            }
        }

        let mut offset = vec![0.0f32; rows * FIR_TAPS];
        for i in 0..(rows - 1) * FIR_TAPS {
            offset[i] = (table[i + FIR_TAPS] - table[i]) * (1.0 / 65536.0);
        }

        Self { table, offset }
    }

    /// Kernel tap at flat index `row * FIR_TAPS + k`.
    #[inline]
    pub fn at(&self, index: usize) -> f32 {
        self.table[index]
    }

    /// Row-interpolation delta for the same flat index.
    #[inline]
    pub fn offset_at(&self, index: usize) -> f32 {
        self.offset[index]
    }

    /// Interpolated kernel tap: `row` selects the sub-sample position,
    /// `lipol` is the 0..65536 position between this row and the next.
    #[inline]
    pub fn tap(&self, row: usize, k: usize, lipol: f32) -> f32 {
        let i = row * FIR_TAPS + k;
        self.table[i] + lipol * self.offset[i]
    }

    /// The process-wide shared table, built on first use.
    #[cfg(feature = "std")]
    pub fn shared() -> &'static SincTable {
        use std::sync::OnceLock;
        static TABLE: OnceLock<SincTable> = OnceLock::new();
        TABLE.get_or_init(SincTable::new)
    }
}

impl Default for SincTable {
    fn default() -> Self {
        Self::new()
    }
}

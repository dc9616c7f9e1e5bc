//! Bandlimited pulse oscillator with hard sync.
//!
//! Instead of sampling a naive square wave, every edge is rendered as a
//! windowed-sinc impulse convolved into a block-sized circular scratch
//! buffer at its exact sub-sample position, then a leaky integrator
//! reconstructs the pulse from the impulse train. Edge timing uses 64-bit
//! fixed-point phase accumulators with 2^40 counts per sample, so timing
//! error stays sub-sample even at extreme frequencies.
//!
//! Hard sync runs a second accumulator at the base pitch; when it expires
//! it forces the edge accumulator back in phase, producing the classic
//! ripped-saw sync spectrum when the edge rate is tuned above the base.

#[cfg(not(feature = "std"))]
extern crate alloc;

#[cfg(feature = "std")]
extern crate std as alloc;

use alloc::sync::Arc;
use alloc::vec;
use alloc::vec::Vec;

use voce_core::{BlockRamp, FIR_TAPS, SincTable};

/// Fixed-point phase counts per sample.
const K_LARGE: i64 = 1 << 40;

/// Conversion from a period in samples to fixed-point counts: 2^16 · 2^24.
const PHASE_SCALE: f64 = 65536.0 * 16_777_216.0;

/// Leaky integrator pole; leaks DC while keeping the pulse shape.
const INTEGRATOR_LEAK: f32 = 0.999_999_99;

/// Sinc-convolution pulse oscillator bound to one block size.
#[derive(Debug)]
pub struct PulseOsc {
    table: Arc<SincTable>,
    sample_rate: f32,

    freq: BlockRamp,
    width: BlockRamp,
    sync_freq: BlockRamp,
    level: BlockRamp,

    /// Scratch buffer the edges are convolved into; length = block size.
    buffer: Vec<f32>,
    buf_pos: usize,

    osc_state: i64,
    sync_state: i64,
    polarity: bool,
    integrator: f32,

    first_run: bool,
    primed: bool,
}

impl PulseOsc {
    /// Create an oscillator for the given block size (power of two) and
    /// sample rate, sharing the process-wide sinc table.
    #[must_use]
    pub fn new(table: Arc<SincTable>, sample_rate: f32, block_size: usize) -> Self {
        assert!(block_size.is_power_of_two());
        Self {
            table,
            sample_rate,
            freq: BlockRamp::new(block_size),
            width: BlockRamp::new(block_size),
            sync_freq: BlockRamp::new(block_size),
            level: BlockRamp::new(block_size),
            buffer: vec![0.0; block_size],
            buf_pos: 0,
            osc_state: 0,
            sync_state: 0,
            polarity: false,
            integrator: 0.0,
            first_run: true,
            primed: false,
        }
    }

    /// Set the block's parameter targets: edge frequency, pulse width
    /// (clamped away from 0 and 1 at use), sync reset frequency, and raw
    /// level (cubed at output). Targets ramp over one block after the
    /// first call.
    pub fn set_params(&mut self, freq: f32, width: f32, sync_freq: f32, level: f32) {
        if self.primed {
            self.freq.ramp_to(freq);
            self.width.ramp_to(width);
            self.sync_freq.ramp_to(sync_freq);
            self.level.ramp_to(level);
        } else {
            self.freq.set_instant(freq);
            self.width.set_instant(width);
            self.sync_freq.set_instant(sync_freq);
            self.level.set_instant(level);
            self.primed = true;
        }
    }

    /// Return to initial state, keeping the table and block size.
    pub fn reset(&mut self) {
        self.buffer.fill(0.0);
        self.buf_pos = 0;
        self.osc_state = 0;
        self.sync_state = 0;
        self.polarity = false;
        self.integrator = 0.0;
        self.first_run = true;
        self.primed = false;
    }

    /// Render one edge at the accumulator's current sub-sample position and
    /// schedule the next one.
    fn convolute(&mut self) {
        let mut ipos = (((K_LARGE + self.osc_state) >> 16) & 0xFFFF_FFFF) as u32;
        let mut sync = false;

        if self.sync_state < self.osc_state {
            ipos = (((K_LARGE + self.sync_state) >> 16) & 0xFFFF_FFFF) as u32;
            let t = f64::from((self.sample_rate / self.sync_freq.get()).max(0.5));
            let syncrate = (PHASE_SCALE * t) as i64;
            self.osc_state = self.sync_state;
            self.sync_state += syncrate;
            sync = true;
        }

        let fpol = if self.polarity { -1.0f32 } else { 1.0 };
        let row_base = ((ipos >> 16) & 0xff) as usize * FIR_TAPS;
        let lipol = (ipos & 0xffff) as f32;

        // A sync reset that lands mid-segment suppresses the falling edge;
        // the forced edge is always rising.
        if !sync || !self.polarity {
            let mask = self.buffer.len() - 1;
            for k in 0..FIR_TAPS {
                self.buffer[(self.buf_pos + k) & mask] +=
                    fpol * (self.table.at(row_base + k) + lipol * self.table.offset_at(row_base + k));
            }
        }

        if sync {
            self.polarity = false;
        }

        let mut width = 0.5 - 0.499 * self.width.get().clamp(0.01, 0.99);
        let t = f64::from((self.sample_rate / self.freq.get()).max(0.5));
        if self.polarity {
            width = 1.0 - width;
        }
        let rate = (PHASE_SCALE * t * f64::from(width)) as i64;

        self.osc_state += rate;
        self.polarity = !self.polarity;
    }

    /// Render one block.
    pub fn run(&mut self, output: &mut [f32]) {
        debug_assert_eq!(output.len(), self.buffer.len());

        if self.first_run {
            self.first_run = false;
            // Prime the integrator with a half-amplitude antipulse so the
            // first real edge lands symmetrically around zero.
            self.convolute();
            for v in self.buffer.iter_mut() {
                *v *= -0.5;
            }
            self.osc_state = 0;
            self.polarity = false;
        }

        let mask = self.buffer.len() - 1;
        for out in output.iter_mut() {
            self.osc_state -= K_LARGE;
            self.sync_state -= K_LARGE;
            while self.sync_state < 0 {
                self.convolute();
            }
            while self.osc_state < 0 {
                self.convolute();
            }

            self.integrator = self.integrator * INTEGRATOR_LEAK + self.buffer[self.buf_pos];
            let level = self.level.advance();
            *out = self.integrator * level * level * level;
            self.buffer[self.buf_pos] = 0.0;

            self.buf_pos = (self.buf_pos + 1) & mask;

            self.width.advance();
            self.sync_freq.advance();
            self.freq.advance();
        }
    }
}

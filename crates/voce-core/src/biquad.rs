//! Second-order IIR section for the delay engine's tone shaping.
//!
//! Direct Form I biquad with RBJ Audio EQ Cookbook lowpass and highpass
//! tunings at Butterworth Q. The delay engine recomputes coefficients every
//! block, so setters are cheap and stateless.

use core::f32::consts::PI;
use libm::{cosf, sinf};

/// Butterworth damping, the fixed Q of the delay's cut filters.
pub const BUTTERWORTH_Q: f32 = 0.707;

/// Direct Form I second-order filter.
///
/// ```text
/// y[n] = b0*x[n] + b1*x[n-1] + b2*x[n-2] - a1*y[n-1] - a2*y[n-2]
/// ```
///
/// Starts as a passthrough until a tuning is applied.
#[derive(Debug, Clone)]
pub struct Biquad {
    b0: f32,
    b1: f32,
    b2: f32,
    a1: f32,
    a2: f32,
    x1: f32,
    x2: f32,
    y1: f32,
    y2: f32,
}

impl Biquad {
    /// Passthrough filter with cleared state.
    #[must_use]
    pub fn new() -> Self {
        Self {
            b0: 1.0,
            b1: 0.0,
            b2: 0.0,
            a1: 0.0,
            a2: 0.0,
            x1: 0.0,
            x2: 0.0,
            y1: 0.0,
            y2: 0.0,
        }
    }

    /// Tune as an RBJ lowpass at `frequency` Hz. State is preserved so the
    /// cutoff can move between blocks without a click.
    pub fn set_lowpass(&mut self, frequency: f32, q: f32, sample_rate: f32) {
        let (sin_w, cos_w) = omega(frequency, sample_rate);
        let alpha = sin_w / (2.0 * q);
        let b1 = 1.0 - cos_w;
        self.apply(b1 * 0.5, b1, b1 * 0.5, 1.0 + alpha, -2.0 * cos_w, 1.0 - alpha);
    }

    /// Tune as an RBJ highpass at `frequency` Hz.
    pub fn set_highpass(&mut self, frequency: f32, q: f32, sample_rate: f32) {
        let (sin_w, cos_w) = omega(frequency, sample_rate);
        let alpha = sin_w / (2.0 * q);
        let b1 = -(1.0 + cos_w);
        self.apply(-b1 * 0.5, b1, -b1 * 0.5, 1.0 + alpha, -2.0 * cos_w, 1.0 - alpha);
    }

    fn apply(&mut self, b0: f32, b1: f32, b2: f32, a0: f32, a1: f32, a2: f32) {
        let inv = 1.0 / a0;
        self.b0 = b0 * inv;
        self.b1 = b1 * inv;
        self.b2 = b2 * inv;
        self.a1 = a1 * inv;
        self.a2 = a2 * inv;
    }

    /// Run one sample through the section.
    #[inline]
    pub fn process(&mut self, input: f32) -> f32 {
        let output = self.b0 * input + self.b1 * self.x1 + self.b2 * self.x2
            - self.a1 * self.y1
            - self.a2 * self.y2;

        self.x2 = self.x1;
        self.x1 = input;
        self.y2 = self.y1;
        self.y1 = crate::math::flush_denormal(output);

        self.y1
    }

    /// Zero the delay state, keeping the current tuning.
    pub fn clear(&mut self) {
        self.x1 = 0.0;
        self.x2 = 0.0;
        self.y1 = 0.0;
        self.y2 = 0.0;
    }
}

impl Default for Biquad {
    fn default() -> Self {
        Self::new()
    }
}

fn omega(frequency: f32, sample_rate: f32) -> (f32, f32) {
    let w = 2.0 * PI * frequency / sample_rate;
    (sinf(w), cosf(w))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn passthrough_by_default() {
        let mut bq = Biquad::new();
        for i in 0..10 {
            let x = i as f32 * 0.1;
            assert!((bq.process(x) - x).abs() < 1e-4);
        }
    }

    #[test]
    fn lowpass_passes_dc() {
        let mut bq = Biquad::new();
        bq.set_lowpass(1000.0, BUTTERWORTH_Q, 44100.0);
        let mut y = 0.0;
        for _ in 0..1000 {
            y = bq.process(1.0);
        }
        assert!((y - 1.0).abs() < 0.05);
    }

    #[test]
    fn highpass_blocks_dc() {
        let mut bq = Biquad::new();
        bq.set_highpass(1000.0, BUTTERWORTH_Q, 44100.0);
        let mut y = 1.0;
        for _ in 0..1000 {
            y = bq.process(1.0);
        }
        assert!(y.abs() < 0.01, "DC leaked through highpass: {y}");
    }

    #[test]
    fn highpass_attenuates_below_cutoff() {
        // 100 Hz tone through a 1 kHz highpass loses most of its level
        let mut bq = Biquad::new();
        bq.set_highpass(1000.0, BUTTERWORTH_Q, 44100.0);
        let omega = core::f32::consts::TAU * 100.0 / 44100.0;
        let mut peak: f32 = 0.0;
        for i in 0..4410 {
            let y = bq.process(sinf(i as f32 * omega));
            if i > 2000 {
                peak = peak.max(y.abs());
            }
        }
        assert!(peak < 0.1, "insufficient attenuation: peak {peak}");
    }

    #[test]
    fn clear_resets_state_only() {
        let mut bq = Biquad::new();
        bq.set_lowpass(500.0, BUTTERWORTH_Q, 48000.0);
        for _ in 0..100 {
            bq.process(1.0);
        }
        bq.clear();
        // First output after clear is just b0 * x
        let y = bq.process(0.0);
        assert_eq!(y, 0.0);
    }
}

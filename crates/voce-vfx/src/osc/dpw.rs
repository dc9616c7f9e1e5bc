//! Differentiated parabolic wave (DPW) sawtooth oscillator.
//!
//! Second-order DPW: square the naive saw into a parabola, then take the
//! first difference scaled by `1 / (4·dt·(1 - dt))`. The differentiation
//! pushes aliasing components down by the slope of the parabola's spectrum,
//! which is enough for a per-voice oscillator that typically sits behind a
//! filter.
//!
//! Frequency changes are smoothed across one block so pitch ramps (glide,
//! unison drift) do not step.

use voce_core::BlockRamp;

/// Minimum phase increment, keeping the DPW denominator well-conditioned.
const MIN_DPHASE: f32 = 1e-6;

/// Maximum phase increment; above ~half the sample rate the waveform is
/// meaningless anyway.
const MAX_DPHASE: f32 = 0.499;

/// Bandlimited-ish sawtooth via second-order DPW.
#[derive(Debug, Clone)]
pub struct DpwSawOsc {
    phase: f32,
    dphase: BlockRamp,
    prev_parabola: f32,
    primed: bool,
}

impl DpwSawOsc {
    /// Oscillator at phase zero for the given block size.
    #[must_use]
    pub fn new(block_size: usize) -> Self {
        Self {
            phase: 0.0,
            dphase: BlockRamp::new(block_size),
            // parabola of phase 0: s = -1, s^2 = 1
            prev_parabola: 1.0,
            primed: false,
        }
    }

    /// Set the frequency for the coming block; the phase increment ramps
    /// there over one block (instantly on the first call).
    pub fn set_frequency(&mut self, freq_hz: f32, sample_rate_inv: f32) {
        let dp = (freq_hz * sample_rate_inv).clamp(MIN_DPHASE, MAX_DPHASE);
        if self.primed {
            self.dphase.ramp_to(dp);
        } else {
            self.dphase.set_instant(dp);
            self.primed = true;
        }
    }

    /// Advance one sample and return the saw output in roughly [-1, 1].
    #[inline]
    pub fn step(&mut self) -> f32 {
        let dp = self.dphase.advance();
        self.phase += dp;
        if self.phase >= 1.0 {
            self.phase -= 1.0;
        }
        let s = 2.0 * self.phase - 1.0;
        let w = s * s;
        let out = (w - self.prev_parabola) / (4.0 * dp * (1.0 - dp));
        self.prev_parabola = w;
        out
    }

    /// Return to phase zero, keeping the frequency.
    pub fn reset(&mut self) {
        self.phase = 0.0;
        self.prev_parabola = 1.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_bounded() {
        let mut osc = DpwSawOsc::new(32);
        osc.set_frequency(440.0, 1.0 / 48000.0);
        for i in 0..48000 {
            let y = osc.step();
            assert!(y.is_finite() && y.abs() < 1.2, "sample {i}: {y}");
        }
    }

    #[test]
    fn period_matches_frequency() {
        // Count falling edges (wrap points) over one second
        let sr = 48000.0;
        let freq = 100.0;
        let mut osc = DpwSawOsc::new(32);
        osc.set_frequency(freq, 1.0 / sr);
        let mut last = osc.step();
        let mut wraps = 0;
        for _ in 0..sr as usize {
            let y = osc.step();
            if last - y > 1.0 {
                wraps += 1;
            }
            last = y;
        }
        assert!(
            (wraps as f32 - freq).abs() <= 1.0,
            "expected ~{freq} cycles, saw {wraps}"
        );
    }

    #[test]
    fn mean_is_near_zero() {
        let mut osc = DpwSawOsc::new(32);
        osc.set_frequency(440.0, 1.0 / 48000.0);
        // Skip the first-difference transient
        for _ in 0..100 {
            osc.step();
        }
        let n = 48000;
        let mut acc = 0.0;
        for _ in 0..n {
            acc += osc.step();
        }
        let mean = acc / n as f32;
        assert!(mean.abs() < 0.05, "DC offset {mean}");
    }

    #[test]
    fn frequency_ramp_stays_bounded() {
        let mut osc = DpwSawOsc::new(16);
        osc.set_frequency(100.0, 1.0 / 48000.0);
        for block in 0..200 {
            osc.set_frequency(100.0 + block as f32 * 20.0, 1.0 / 48000.0);
            for _ in 0..16 {
                let y = osc.step();
                assert!(y.is_finite() && y.abs() < 2.0, "block {block}: {y}");
            }
        }
    }
}

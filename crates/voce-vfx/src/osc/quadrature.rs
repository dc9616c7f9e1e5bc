//! Quadrature (rotation) sine oscillator.
//!
//! Advances a unit phasor by multiplying with a fixed rotation matrix, so
//! the per-sample cost is four multiplies and two adds with no
//! transcendental calls. The sine and cosine of the per-sample angle are
//! computed only when the rate changes.

use libm::{cosf, sinf};

/// Rotation-based sine oscillator.
///
/// The `v` component traces `sin(n·omega)`, the `u` component the matching
/// cosine. Amplitude drift from repeated rotation is far below audibility
/// over a voice lifetime.
#[derive(Debug, Clone)]
pub struct QuadratureOsc {
    u: f32,
    v: f32,
    dcos: f32,
    dsin: f32,
}

impl Default for QuadratureOsc {
    fn default() -> Self {
        Self::new()
    }
}

impl QuadratureOsc {
    /// Oscillator at phase zero with zero rate.
    #[must_use]
    pub fn new() -> Self {
        Self {
            u: 1.0,
            v: 0.0,
            dcos: 1.0,
            dsin: 0.0,
        }
    }

    /// Set the angular rate in radians per sample.
    pub fn set_rate(&mut self, omega: f32) {
        self.dcos = cosf(omega);
        self.dsin = sinf(omega);
    }

    /// Current sine output.
    #[inline]
    #[must_use]
    pub fn value(&self) -> f32 {
        self.v
    }

    /// Rotate the phasor by one sample.
    #[inline]
    pub fn step(&mut self) {
        let t = self.u * self.dcos - self.v * self.dsin;
        self.v = self.u * self.dsin + self.v * self.dcos;
        self.u = t;
    }

    /// First-order magnitude correction, pulling the phasor radius back to
    /// one. The rotation recursion drifts slowly under f32 rounding; one
    /// correction per block holds the amplitude within a few ppm.
    #[inline]
    pub fn renormalize(&mut self) {
        let g = 0.5 * (3.0 - (self.u * self.u + self.v * self.v));
        self.u *= g;
        self.v *= g;
    }

    /// Return to phase zero, keeping the rate.
    pub fn reset(&mut self) {
        self.u = 1.0;
        self.v = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn traces_a_sine() {
        let omega = core::f32::consts::TAU / 100.0;
        let mut osc = QuadratureOsc::new();
        osc.set_rate(omega);
        for n in 0..500 {
            let expected = sinf(n as f32 * omega);
            assert!(
                (osc.value() - expected).abs() < 1e-3,
                "sample {n}: got {}, expected {expected}",
                osc.value()
            );
            osc.step();
        }
    }

    #[test]
    fn amplitude_stays_near_unity() {
        // Block-style usage: renormalize once per 32 samples, as the
        // generator does, and the radius must hold over a long run
        let mut osc = QuadratureOsc::new();
        osc.set_rate(0.3);
        let mut peak: f32 = 0.0;
        for _ in 0..4000 {
            for _ in 0..32 {
                osc.step();
                peak = peak.max(osc.value().abs());
            }
            osc.renormalize();
        }
        assert!(peak <= 1.001, "amplitude drifted to {peak}");
        assert!(peak > 0.99, "amplitude decayed to {peak}");
    }

    #[test]
    fn renormalize_pulls_radius_back() {
        let mut osc = QuadratureOsc::new();
        osc.set_rate(0.3);
        // Inflate the radius past the drift the recursion can produce
        osc.u = 1.002;
        osc.v = 0.0;
        osc.renormalize();
        let r = osc.u * osc.u + osc.v * osc.v;
        assert!((r - 1.0).abs() < 1e-5, "radius^2 {r} after correction");
    }

    #[test]
    fn reset_returns_to_phase_zero() {
        let mut osc = QuadratureOsc::new();
        osc.set_rate(0.5);
        for _ in 0..37 {
            osc.step();
        }
        osc.reset();
        assert_eq!(osc.value(), 0.0);
    }
}

//! Multimode state variable filter.
//!
//! Topology-Preserving Transform (TPT) SVF with trapezoidal integrators,
//! after Zavalishin, "The Art of VA Filter Design", using Andrew Simper's
//! (Cytomic) coefficient formulation. One coefficient set serves nine
//! response shapes through an output mix `(m0, m1, m2)` over the input,
//! bandpass, and lowpass taps, so changing the mode costs nothing at
//! process time.
//!
//! The filter itself holds no parameter state; callers recompute
//! coefficients via [`MultiModeSvf::set_coeff`] whenever cutoff, resonance,
//! or shelf gain move (typically once per block).
//!
//! # Reference
//!
//! Simper, "Solving the continuous SVF equations using trapezoidal
//! integration" (cytomic.com technical papers).

use libm::{expf, tanf};

use crate::math::flush_denormal;

/// Response shape of a [`MultiModeSvf`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SvfMode {
    /// Low-pass, 12 dB/oct.
    #[default]
    Lowpass,
    /// High-pass, 12 dB/oct.
    Highpass,
    /// Band-pass, unity gain at the center frequency.
    Bandpass,
    /// Band-reject.
    Notch,
    /// Peaking response (highpass minus lowpass).
    Peak,
    /// All-pass: flat magnitude, frequency-dependent phase.
    Allpass,
    /// Parametric bell boost/cut, gain from the shelf parameter.
    Bell,
    /// Shelving boost/cut below the corner frequency.
    LowShelf,
    /// Shelving boost/cut above the corner frequency.
    HighShelf,
}

impl SvfMode {
    /// All modes, in the order integer mode parameters map to them.
    pub const ALL: [SvfMode; 9] = [
        SvfMode::Lowpass,
        SvfMode::Highpass,
        SvfMode::Bandpass,
        SvfMode::Notch,
        SvfMode::Peak,
        SvfMode::Allpass,
        SvfMode::Bell,
        SvfMode::LowShelf,
        SvfMode::HighShelf,
    ];

    /// Map an integer mode selector to a mode, clamping out-of-range values.
    #[must_use]
    pub fn from_index(index: i32) -> Self {
        let i = index.clamp(0, Self::ALL.len() as i32 - 1) as usize;
        Self::ALL[i]
    }

    /// Whether this mode uses the shelf gain parameter.
    #[must_use]
    pub fn uses_shelf(self) -> bool {
        matches!(self, SvfMode::Bell | SvfMode::LowShelf | SvfMode::HighShelf)
    }
}

/// One channel of TPT state variable filter.
///
/// Coefficients and state are separate concerns: [`set_coeff`](Self::set_coeff)
/// is called at control rate, [`process_sample`](Self::process_sample) at
/// audio rate, and [`reset`](Self::reset) clears only the integrator state.
///
/// # Example
///
/// ```rust
/// use voce_core::{MultiModeSvf, SvfMode};
///
/// let mut svf = MultiModeSvf::new();
/// svf.set_coeff(SvfMode::Lowpass, 1000.0, 0.5, 0.0, 48000.0);
/// let y = svf.process_sample(0.25);
/// assert!(y.is_finite());
/// ```
#[derive(Debug, Clone, Default)]
pub struct MultiModeSvf {
    // Integrator state
    ic1eq: f32,
    ic2eq: f32,

    // Solver coefficients
    a1: f32,
    a2: f32,
    a3: f32,

    // Output mix over (input, bandpass, lowpass)
    m0: f32,
    m1: f32,
    m2: f32,
}

impl MultiModeSvf {
    /// Filter with cleared state. Coefficients must be set before use;
    /// until then the output is zero.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Recompute coefficients.
    ///
    /// * `freq` - cutoff/center in Hz, clamped to `[10, 0.499 × sample_rate]`
    /// * `res` - resonance in `[0, 1]`; 0 is Butterworth-ish damping, 1 is
    ///   the self-oscillation limit
    /// * `shelf_db` - boost/cut for the bell and shelf modes, ignored by the
    ///   other six
    pub fn set_coeff(&mut self, mode: SvfMode, freq: f32, res: f32, shelf_db: f32, sample_rate: f32) {
        let freq = freq.clamp(10.0, sample_rate * 0.499);
        let res = res.clamp(0.0, 1.0);

        // A = 10^(dB/40), the square root of the linear shelf gain
        let a = expf(shelf_db * (core::f32::consts::LN_10 / 40.0));

        let mut g = tanf(core::f32::consts::PI * freq / sample_rate);
        let mut k = 2.0 - 2.0 * res;

        match mode {
            SvfMode::Bell => k /= a,
            SvfMode::LowShelf => g /= libm::sqrtf(a),
            SvfMode::HighShelf => g *= libm::sqrtf(a),
            _ => {}
        }

        self.a1 = 1.0 / (1.0 + g * (g + k));
        self.a2 = g * self.a1;
        self.a3 = g * self.a2;

        let (m0, m1, m2) = match mode {
            SvfMode::Lowpass => (0.0, 0.0, 1.0),
            SvfMode::Bandpass => (0.0, 1.0, 0.0),
            SvfMode::Highpass => (1.0, -k, -1.0),
            SvfMode::Notch => (1.0, -k, 0.0),
            SvfMode::Peak => (1.0, -k, -2.0),
            SvfMode::Allpass => (1.0, -2.0 * k, 0.0),
            SvfMode::Bell => (1.0, k * (a * a - 1.0), 0.0),
            SvfMode::LowShelf => (1.0, k * (a - 1.0), a * a - 1.0),
            SvfMode::HighShelf => (a * a, k * (1.0 - a) * a, 1.0 - a * a),
        };
        self.m0 = m0;
        self.m1 = m1;
        self.m2 = m2;
    }

    /// Advance one sample.
    #[inline]
    pub fn process_sample(&mut self, input: f32) -> f32 {
        let v3 = input - self.ic2eq;
        let v1 = self.a1 * self.ic1eq + self.a2 * v3;
        let v2 = self.ic2eq + self.a2 * self.ic1eq + self.a3 * v3;

        self.ic1eq = flush_denormal(2.0 * v1 - self.ic1eq);
        self.ic2eq = flush_denormal(2.0 * v2 - self.ic2eq);

        self.m0 * input + self.m1 * v1 + self.m2 * v2
    }

    /// Clear the integrator state, keeping coefficients.
    pub fn reset(&mut self) {
        self.ic1eq = 0.0;
        self.ic2eq = 0.0;
    }
}

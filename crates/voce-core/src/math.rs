//! Mathematical utility functions for per-voice DSP.
//!
//! Allocation-free, `no_std`-compatible helpers shared by the voice engines:
//!
//! - [`db_to_linear`] / [`linear_to_db`] - gain conversions
//! - [`semitones_to_hz`] - pitch position (semitones relative to A440) to Hz
//! - [`feedback_clip`] - the cubic soft clip used in delay feedback paths
//! - [`flush_denormal`] - denormal protection for recursive filters
//! - [`lerp`] - linear interpolation

use libm::{expf, exp2f, logf};

/// Convert decibels to linear gain.
///
/// # Example
/// ```rust
/// use voce_core::db_to_linear;
///
/// assert!((db_to_linear(0.0) - 1.0).abs() < 0.001);
/// assert!((db_to_linear(-6.02) - 0.5).abs() < 0.01);
/// ```
#[inline]
pub fn db_to_linear(db: f32) -> f32 {
    // 10^(dB/20) = e^(dB * ln(10)/20)
    const FACTOR: f32 = core::f32::consts::LN_10 / 20.0;
    expf(db * FACTOR)
}

/// Convert linear gain to decibels.
///
/// Input is floored at 1e-10 to keep the logarithm finite.
#[inline]
pub fn linear_to_db(linear: f32) -> f32 {
    const FACTOR: f32 = 20.0 / core::f32::consts::LN_10;
    logf(linear.max(1e-10)) * FACTOR
}

/// Convert a pitch position in semitones relative to A440 to a frequency in Hz.
///
/// Position 0 is 440 Hz, +12 is 880 Hz, -12 is 220 Hz. This is the domain
/// all frequency-like voice parameters live in, so keytracking is a plain
/// addition in semitone space before conversion.
///
/// # Example
/// ```rust
/// use voce_core::semitones_to_hz;
///
/// assert!((semitones_to_hz(0.0) - 440.0).abs() < 0.01);
/// assert!((semitones_to_hz(12.0) - 880.0).abs() < 0.01);
/// ```
#[inline]
pub fn semitones_to_hz(semitones: f32) -> f32 {
    440.0 * exp2f(semitones / 12.0)
}

/// Cubic soft clip for delay feedback paths.
///
/// Clamps the input to ±1.5 and applies `x - 4/27·x³`, which maps ±1.5 to
/// exactly ±1.0 with zero slope at the limits. Bounds feedback energy
/// without the harmonic splatter of a hard clip.
///
/// # Example
/// ```rust
/// use voce_core::feedback_clip;
///
/// assert!((feedback_clip(10.0) - 1.0).abs() < 1e-6);
/// assert!((feedback_clip(-10.0) + 1.0).abs() < 1e-6);
/// assert!(feedback_clip(0.1).abs() < 0.1);
/// ```
#[inline]
pub fn feedback_clip(x: f32) -> f32 {
    let x = x.clamp(-1.5, 1.5);
    x - 4.0 / 27.0 * x * x * x
}

/// Flush denormal numbers to zero.
///
/// Denormals make recursive filters orders of magnitude slower on some CPUs.
#[inline]
pub fn flush_denormal(x: f32) -> f32 {
    if x.abs() < 1e-20 { 0.0 } else { x }
}

/// Linear interpolation between two values.
#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn db_round_trip() {
        for db in [-60.0, -12.0, -6.0, 0.0, 6.0, 12.0] {
            let back = linear_to_db(db_to_linear(db));
            assert!((back - db).abs() < 0.01, "round trip failed for {db} dB");
        }
    }

    #[test]
    fn semitones_octaves() {
        assert!((semitones_to_hz(0.0) - 440.0).abs() < 0.01);
        assert!((semitones_to_hz(12.0) - 880.0).abs() < 0.01);
        assert!((semitones_to_hz(-12.0) - 220.0).abs() < 0.01);
        // Equal temperament semitone above A440
        assert!((semitones_to_hz(1.0) - 466.16).abs() < 0.05);
    }

    #[test]
    fn feedback_clip_bounded() {
        // Output must stay within [-1, 1] for any input
        let mut x = -100.0;
        while x < 100.0 {
            let y = feedback_clip(x);
            assert!(
                (-1.0..=1.0).contains(&y),
                "clip output {y} out of bounds for input {x}"
            );
            x += 0.37;
        }
    }

    #[test]
    fn feedback_clip_transparent_at_small_levels() {
        // Near zero the cubic term is negligible
        let y = feedback_clip(0.01);
        assert!((y - 0.01).abs() < 1e-5);
    }

    #[test]
    fn feedback_clip_endpoints() {
        // x = 1.5 maps to 1.5 - 4/27 * 3.375 = 1.0 exactly
        assert!((feedback_clip(1.5) - 1.0).abs() < 1e-6);
        assert!((feedback_clip(-1.5) + 1.0).abs() < 1e-6);
    }

    #[test]
    fn denormal_flushed() {
        assert_eq!(flush_denormal(1e-30), 0.0);
        assert_eq!(flush_denormal(0.5), 0.5);
        assert_eq!(flush_denormal(-1e-30), 0.0);
    }
}

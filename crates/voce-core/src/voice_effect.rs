//! The per-voice effect trait and processing configuration.
//!
//! [`VoiceEffect`] is the seam between a host's voice manager and the
//! engines: block-based processing in three channel shapes, pooled resource
//! lifecycle, and parameter metadata. The host owns one engine instance per
//! active voice and drives it with fixed-size blocks.
//!
//! ## Design Decisions
//!
//! - **Block processing only**: engines smooth parameters across exactly one
//!   block, so the block length is a construction-time constant
//!   ([`VoiceConfig`]) rather than a per-call argument.
//!
//! - **No allocations after init**: anything needing heap storage borrows it
//!   from the [`DelayLinePool`] in
//!   [`init_voice_effect`](VoiceEffect::init_voice_effect) and returns it in
//!   [`deinit_voice_effect`](VoiceEffect::deinit_voice_effect). The host
//!   serializes those calls against processing, so the pool is a plain
//!   `&mut` parameter.
//!
//! - **No hot-path errors**: out-of-range parameter indices are ignored on
//!   write and answered with sentinels on read; values are clamped at the
//!   point of use.

use crate::delay_line::DelayLinePool;
use crate::param::{IntParamDescriptor, ParamDescriptor};

/// Per-voice processing configuration, fixed at engine construction.
///
/// Replaces compile-time specialization: one engine type serves any sample
/// rate and block size the host picks at startup.
///
/// # Example
///
/// ```rust
/// use voce_core::VoiceConfig;
///
/// let cfg = VoiceConfig::new(48000.0, 32);
/// assert_eq!(cfg.block_size, 32);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VoiceConfig {
    /// Sample rate in Hz.
    pub sample_rate: f32,
    /// Samples per processing block. Always a power of two.
    pub block_size: usize,
}

impl VoiceConfig {
    /// Create a configuration.
    ///
    /// # Panics
    ///
    /// Panics if `sample_rate` is not positive or `block_size` is not a
    /// power of two. The pulse oscillator's circular scratch buffer masks
    /// indices with `block_size - 1`, which requires the power-of-two shape.
    #[must_use]
    pub fn new(sample_rate: f32, block_size: usize) -> Self {
        assert!(sample_rate > 0.0, "sample rate must be positive");
        assert!(
            block_size.is_power_of_two(),
            "block size must be a power of two"
        );
        Self {
            sample_rate,
            block_size,
        }
    }

    /// Reciprocal of the sample rate, for phase increments.
    #[inline]
    #[must_use]
    pub fn sample_rate_inv(&self) -> f32 {
        1.0 / self.sample_rate
    }
}

/// A block-based audio processor bound to one synthesizer voice.
///
/// Engines implement [`process_mono_to_mono`](Self::process_mono_to_mono)
/// and override the other two shapes when they have a true stereo or
/// generator path; the defaults duplicate or mirror the mono path. All
/// slices must be exactly `block_size` long.
///
/// `pitch` is the voice's note pitch in semitones relative to A440; engines
/// with keytracking add it to their frequency-like parameters.
pub trait VoiceEffect {
    /// Number of continuous parameters.
    fn param_count(&self) -> usize {
        0
    }

    /// Number of stepped parameters.
    fn int_param_count(&self) -> usize {
        0
    }

    /// Descriptor for a continuous parameter, `None` past the count.
    fn param_info(&self, index: usize) -> Option<ParamDescriptor> {
        let _ = index;
        None
    }

    /// Descriptor for a stepped parameter, `None` past the count.
    fn int_param_info(&self, index: usize) -> Option<IntParamDescriptor> {
        let _ = index;
        None
    }

    /// Like [`param_info`](Self::param_info) but total: invalid indices get
    /// the [`ParamDescriptor::unknown`] sentinel.
    fn param_at(&self, index: usize) -> ParamDescriptor {
        self.param_info(index)
            .unwrap_or_else(ParamDescriptor::unknown)
    }

    /// Like [`int_param_info`](Self::int_param_info) but total.
    fn int_param_at(&self, index: usize) -> IntParamDescriptor {
        self.int_param_info(index)
            .unwrap_or_else(IntParamDescriptor::unknown)
    }

    /// Current value of a continuous parameter, 0.0 past the count.
    fn float_param(&self, index: usize) -> f32;

    /// Set a continuous parameter. Out-of-range indices are ignored; values
    /// are clamped when the engine uses them, not here.
    fn set_float_param(&mut self, index: usize, value: f32);

    /// Current value of a stepped parameter, 0 past the count.
    fn int_param(&self, index: usize) -> i32;

    /// Set a stepped parameter. Out-of-range indices are ignored.
    fn set_int_param(&mut self, index: usize, value: i32);

    /// Assign every parameter its metadata default. Called by the host at
    /// note-on before the first block.
    fn init_voice_effect_params(&mut self) {
        for i in 0..self.param_count() {
            let d = self.param_at(i);
            self.set_float_param(i, d.default);
        }
        for i in 0..self.int_param_count() {
            let d = self.int_param_at(i);
            self.set_int_param(i, d.default);
        }
    }

    /// Borrow pooled resources and reset state for a fresh voice. Engines
    /// without pooled storage ignore the pool.
    fn init_voice_effect(&mut self, pool: &mut DelayLinePool) {
        let _ = pool;
    }

    /// Return pooled resources at voice teardown.
    fn deinit_voice_effect(&mut self, pool: &mut DelayLinePool) {
        let _ = pool;
    }

    /// Process one block, mono in, mono out.
    fn process_mono_to_mono(&mut self, input: &[f32], output: &mut [f32], pitch: f32);

    /// Process one block, mono in, stereo out. Default duplicates the mono
    /// path into both channels.
    fn process_mono_to_stereo(
        &mut self,
        input: &[f32],
        out_l: &mut [f32],
        out_r: &mut [f32],
        pitch: f32,
    ) {
        self.process_mono_to_mono(input, out_l, pitch);
        out_r.copy_from_slice(out_l);
    }

    /// Process one block, stereo in, stereo out. Default runs the mono path
    /// on the left channel and mirrors it; engines with independent channel
    /// state override this.
    fn process_stereo(
        &mut self,
        in_l: &[f32],
        in_r: &[f32],
        out_l: &mut [f32],
        out_r: &mut [f32],
        pitch: f32,
    ) {
        let _ = in_r;
        self.process_mono_to_mono(in_l, out_l, pitch);
        out_r.copy_from_slice(out_l);
    }

    /// Whether the engine wants the mono-in, stereo-out shape (e.g., a mono
    /// source through a stereo delay).
    fn mono_to_stereo_setting(&self) -> bool {
        false
    }

    /// Hook for engines whose parameter set depends on other parameters
    /// (e.g., hiding stereo-only knobs in mono). Called by the host after
    /// int parameters change; returns `true` when the parameters are
    /// consistent, which the default always is.
    fn check_parameter_consistency(&mut self) -> bool {
        true
    }

    /// Enable or disable keytracking. Returns `true` if the engine supports
    /// keytracking and the setting changed, telling the host to refresh
    /// parameter metadata.
    fn enable_keytrack(&mut self, enabled: bool) -> bool {
        let _ = enabled;
        false
    }

    /// Current keytracking state.
    fn keytrack(&self) -> bool {
        false
    }

    /// Keytracking state a fresh voice starts with.
    fn keytrack_default(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::param::ParamUnit;

    struct Gain {
        params: [f32; 1],
    }

    impl VoiceEffect for Gain {
        fn param_count(&self) -> usize {
            1
        }

        fn param_info(&self, index: usize) -> Option<ParamDescriptor> {
            match index {
                0 => Some(ParamDescriptor::percent("Level", "Level", 0.5)),
                _ => None,
            }
        }

        fn float_param(&self, index: usize) -> f32 {
            self.params.get(index).copied().unwrap_or(0.0)
        }

        fn set_float_param(&mut self, index: usize, value: f32) {
            if let Some(p) = self.params.get_mut(index) {
                *p = value;
            }
        }

        fn int_param(&self, _index: usize) -> i32 {
            0
        }

        fn set_int_param(&mut self, _index: usize, _value: i32) {}

        fn process_mono_to_mono(&mut self, input: &[f32], output: &mut [f32], _pitch: f32) {
            for (o, i) in output.iter_mut().zip(input.iter()) {
                *o = i * self.params[0];
            }
        }
    }

    #[test]
    fn params_default_from_metadata() {
        let mut g = Gain { params: [0.0] };
        g.init_voice_effect_params();
        assert_eq!(g.float_param(0), 0.5);
    }

    #[test]
    fn out_of_range_index_yields_sentinel() {
        let g = Gain { params: [0.0] };
        assert_eq!(g.param_at(7).name, "Unknown");
        assert_eq!(g.param_at(7).unit, ParamUnit::None);
        assert_eq!(g.int_param_at(0).name, "Unknown");
        assert_eq!(g.float_param(9), 0.0);
    }

    #[test]
    fn default_mono_to_stereo_duplicates() {
        let mut g = Gain { params: [2.0] };
        let input = [1.0f32, -0.5, 0.25, 0.0];
        let mut l = [0.0f32; 4];
        let mut r = [0.0f32; 4];
        g.process_mono_to_stereo(&input, &mut l, &mut r, 0.0);
        assert_eq!(l, r);
        assert_eq!(l[0], 2.0);
    }

    #[test]
    fn parameter_consistency_defaults_to_true() {
        let mut g = Gain { params: [0.0] };
        assert!(g.check_parameter_consistency());
    }

    #[test]
    fn config_rejects_bad_block_size() {
        let cfg = VoiceConfig::new(44100.0, 16);
        assert!((cfg.sample_rate_inv() - 1.0 / 44100.0).abs() < 1e-12);

        let result = std::panic::catch_unwind(|| VoiceConfig::new(44100.0, 48));
        assert!(result.is_err(), "non-power-of-two block size must panic");
    }
}

//! Multimode state-variable filter engine.
//!
//! Wraps two [`MultiModeSvf`] channels behind the [`VoiceEffect`] surface:
//! nine response modes, per-channel frequency in stereo, optional
//! keytracking (the frequency parameters become offsets added to the
//! voice pitch), and memoized coefficient updates so an unmoving filter
//! costs nothing per block beyond the comparison.

use voce_core::{
    IntParamDescriptor, MultiModeSvf, ParamDescriptor, SvfMode, VoiceConfig, VoiceEffect,
    math::semitones_to_hz,
};

const FREQ_L: usize = 0;
const FREQ_R: usize = 1;
const RESONANCE: usize = 2;
const SHELF_DB: usize = 3;
const NUM_PARAMS: usize = 4;

const INT_MODE: usize = 0;
const INT_STEREO: usize = 1;
const NUM_INT_PARAMS: usize = 2;

/// Cache poison values, outside every legal parameter range, so the first
/// block after init always computes coefficients.
const PARAM_POISON: f32 = -188_888.0;
const INT_POISON: i32 = -1;

/// Per-voice multimode SVF. See the module docs.
#[derive(Debug)]
pub struct SvfFilter {
    config: VoiceConfig,

    params: [f32; NUM_PARAMS],
    iparams: [i32; NUM_INT_PARAMS],
    keytrack: bool,

    last_params: [f32; NUM_PARAMS],
    last_iparams: [i32; NUM_INT_PARAMS],
    was_keytrack: bool,

    svf: [MultiModeSvf; 2],
    coeff_updates: u64,
}

impl SvfFilter {
    /// Create a filter engine; no pooled resources are needed.
    #[must_use]
    pub fn new(config: VoiceConfig) -> Self {
        Self {
            config,
            params: [0.0; NUM_PARAMS],
            iparams: [0; NUM_INT_PARAMS],
            keytrack: false,
            last_params: [PARAM_POISON; NUM_PARAMS],
            last_iparams: [INT_POISON; NUM_INT_PARAMS],
            was_keytrack: false,
            svf: [MultiModeSvf::new(), MultiModeSvf::new()],
            coeff_updates: 0,
        }
    }

    /// Number of coefficient recomputations so far. A parameter-stable
    /// filter should show this standing still across blocks.
    #[must_use]
    pub fn coeff_updates(&self) -> u64 {
        self.coeff_updates
    }

    fn stereo(&self) -> bool {
        self.iparams[INT_STEREO] != 0
    }

    /// Recompute coefficients if any effective parameter moved since the
    /// last block. A mode or channel-layout change also flushes the filter
    /// state, since the integrators hold a different response's history.
    fn calc_coeffs(&mut self, pitch: f32) {
        let mut effective = self.params;
        if self.keytrack {
            effective[FREQ_L] += pitch;
            effective[FREQ_R] += pitch;
        }

        let params_moved = effective
            .iter()
            .zip(self.last_params.iter())
            .any(|(a, b)| a != b);
        let ints_moved = effective_ints_moved(&self.iparams, &self.last_iparams)
            || self.keytrack != self.was_keytrack;

        if !params_moved && !ints_moved {
            return;
        }
        if ints_moved {
            self.svf[0].reset();
            self.svf[1].reset();
        }

        let mode = SvfMode::from_index(self.iparams[INT_MODE]);
        let res = effective[RESONANCE];
        let shelf = effective[SHELF_DB];
        let sr = self.config.sample_rate;

        let freq_l = semitones_to_hz(effective[FREQ_L]);
        let freq_r = if self.stereo() {
            semitones_to_hz(effective[FREQ_R])
        } else {
            freq_l
        };
        self.svf[0].set_coeff(mode, freq_l, res, shelf, sr);
        self.svf[1].set_coeff(mode, freq_r, res, shelf, sr);

        self.last_params = effective;
        self.last_iparams = self.iparams;
        self.was_keytrack = self.keytrack;
        self.coeff_updates += 1;
    }
}

fn effective_ints_moved(now: &[i32; NUM_INT_PARAMS], last: &[i32; NUM_INT_PARAMS]) -> bool {
    now.iter().zip(last.iter()).any(|(a, b)| a != b)
}

impl VoiceEffect for SvfFilter {
    fn param_count(&self) -> usize {
        NUM_PARAMS
    }

    fn int_param_count(&self) -> usize {
        NUM_INT_PARAMS
    }

    fn param_info(&self, index: usize) -> Option<ParamDescriptor> {
        let mono = !self.stereo();
        match index {
            FREQ_L => Some(if self.keytrack {
                ParamDescriptor::semitones("Offset", "Offset", -48.0, 48.0, 0.0)
            } else {
                ParamDescriptor::semitones("Cutoff", "Cutoff", -60.0, 70.0, 0.0)
            }),
            FREQ_R => Some(
                if self.keytrack {
                    ParamDescriptor::semitones("Offset R", "OffsetR", -48.0, 48.0, 0.0)
                } else {
                    ParamDescriptor::semitones("Cutoff R", "CutoffR", -60.0, 70.0, 0.0)
                }
                .with_hidden(mono),
            ),
            RESONANCE => Some(ParamDescriptor::percent("Resonance", "Res", 0.707)),
            SHELF_DB => {
                let mode = SvfMode::from_index(self.iparams[INT_MODE]);
                Some(
                    ParamDescriptor::gain_db("Shelf", "Shelf", -12.0, 12.0, 0.0)
                        .with_hidden(!mode.uses_shelf()),
                )
            }
            _ => None,
        }
    }

    fn int_param_info(&self, index: usize) -> Option<IntParamDescriptor> {
        match index {
            INT_MODE => Some(IntParamDescriptor::selector(
                "Mode",
                "Mode",
                SvfMode::ALL.len() as i32,
                0,
            )),
            INT_STEREO => Some(IntParamDescriptor::toggle("Stereo", "Stereo", true)),
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

    fn int_param(&self, index: usize) -> i32 {
        self.iparams.get(index).copied().unwrap_or(0)
    }

    fn set_int_param(&mut self, index: usize, value: i32) {
        if let Some(p) = self.iparams.get_mut(index) {
            *p = value;
        }
    }

    fn process_mono_to_mono(&mut self, input: &[f32], output: &mut [f32], pitch: f32) {
        self.calc_coeffs(pitch);
        for (out, &x) in output.iter_mut().zip(input.iter()) {
            *out = self.svf[0].process_sample(x);
        }
    }

    fn process_mono_to_stereo(
        &mut self,
        input: &[f32],
        out_l: &mut [f32],
        out_r: &mut [f32],
        pitch: f32,
    ) {
        self.calc_coeffs(pitch);
        for n in 0..input.len() {
            out_l[n] = self.svf[0].process_sample(input[n]);
            out_r[n] = self.svf[1].process_sample(input[n]);
        }
    }

    fn process_stereo(
        &mut self,
        in_l: &[f32],
        in_r: &[f32],
        out_l: &mut [f32],
        out_r: &mut [f32],
        pitch: f32,
    ) {
        self.calc_coeffs(pitch);
        for n in 0..in_l.len() {
            out_l[n] = self.svf[0].process_sample(in_l[n]);
            out_r[n] = self.svf[1].process_sample(in_r[n]);
        }
    }

    fn mono_to_stereo_setting(&self) -> bool {
        self.stereo()
    }

    fn enable_keytrack(&mut self, enabled: bool) -> bool {
        let changed = self.keytrack != enabled;
        self.keytrack = enabled;
        changed
    }

    fn keytrack(&self) -> bool {
        self.keytrack
    }
}

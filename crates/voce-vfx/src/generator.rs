//! Virtual-analog unison generator engine.
//!
//! A source rather than a processor: input blocks are ignored and up to
//! [`MAX_UNISON`] detuned oscillator voices are summed into the output.
//! Three waveforms with per-waveform anti-aliasing (rotation sine, DPW saw,
//! sinc-convolution pulse), hard sync on the pulse, and keytracking on by
//! default so the tune parameter is an offset from the voice pitch.
//!
//! Level is perceptually cubed: the 0..1 level parameter is raised to the
//! third power at the output, ramped per sample so level automation is
//! click-free.

#[cfg(not(feature = "std"))]
extern crate alloc;

#[cfg(feature = "std")]
extern crate std as alloc;

use alloc::sync::Arc;
use alloc::vec;
use alloc::vec::Vec;

use libm::sqrtf;

use voce_core::{
    BlockRamp, IntParamDescriptor, ParamDescriptor, SincTable, VoiceConfig, VoiceEffect,
    math::semitones_to_hz,
};

use crate::osc::{DpwSawOsc, PulseOsc, QuadratureOsc};
use crate::unison::{MAX_UNISON, detune_offsets};

const TUNE: usize = 0;
const LEVEL: usize = 1;
const SYNC: usize = 2;
const WIDTH: usize = 3;
const UNI_DETUNE: usize = 4;
const NUM_PARAMS: usize = 5;

const INT_STEREO: usize = 0;
const INT_WAVEFORM: usize = 1;
const INT_UNISON: usize = 2;
const NUM_INT_PARAMS: usize = 3;

/// Sine waveform selector value.
pub const WAVEFORM_SINE: i32 = 0;
/// Sawtooth waveform selector value.
pub const WAVEFORM_SAW: i32 = 1;
/// Pulse waveform selector value.
pub const WAVEFORM_PULSE: i32 = 2;
const NUM_WAVEFORMS: i32 = 3;

/// Unison oscillator source. See the module docs.
#[derive(Debug)]
pub struct VaGenerator {
    config: VoiceConfig,

    params: [f32; NUM_PARAMS],
    iparams: [i32; NUM_INT_PARAMS],
    keytrack: bool,

    level: BlockRamp,
    primed: bool,
    last_waveform: i32,
    last_unison: i32,

    sine: [QuadratureOsc; MAX_UNISON],
    saw: [DpwSawOsc; MAX_UNISON],
    pulse: Vec<PulseOsc>,
    detune: [f32; MAX_UNISON],
    tmp: Vec<f32>,
}

impl VaGenerator {
    /// Create a generator; no pooled resources are needed.
    #[must_use]
    pub fn new(config: VoiceConfig, table: Arc<SincTable>) -> Self {
        let bs = config.block_size;
        let mut pulse = Vec::with_capacity(MAX_UNISON);
        for _ in 0..MAX_UNISON {
            pulse.push(PulseOsc::new(Arc::clone(&table), config.sample_rate, bs));
        }
        Self {
            config,
            params: [0.0; NUM_PARAMS],
            iparams: [0; NUM_INT_PARAMS],
            keytrack: true,
            level: BlockRamp::new(bs),
            primed: false,
            last_waveform: WAVEFORM_SINE,
            last_unison: 1,
            sine: core::array::from_fn(|_| QuadratureOsc::new()),
            saw: core::array::from_fn(|_| DpwSawOsc::new(bs)),
            pulse,
            detune: [0.0; MAX_UNISON],
            tmp: vec![0.0; bs],
        }
    }

    fn waveform(&self) -> i32 {
        self.iparams[INT_WAVEFORM].clamp(0, NUM_WAVEFORMS - 1)
    }

    fn unison_count(&self) -> usize {
        self.iparams[INT_UNISON].clamp(1, MAX_UNISON as i32) as usize
    }

    /// Base pitch of the block in semitones relative to A440.
    fn base_pitch(&self, pitch: f32) -> f32 {
        if self.keytrack {
            pitch + self.params[TUNE]
        } else {
            self.params[TUNE]
        }
    }

    fn reset_oscillators(&mut self) {
        for o in &mut self.sine {
            o.reset();
        }
        for o in &mut self.saw {
            o.reset();
        }
        for o in &mut self.pulse {
            o.reset();
        }
    }

    fn prepare_block(&mut self, pitch: f32) {
        let waveform = self.waveform();
        let count = self.iparams[INT_UNISON].clamp(1, MAX_UNISON as i32);
        if waveform != self.last_waveform || count != self.last_unison {
            self.reset_oscillators();
            self.last_waveform = waveform;
            self.last_unison = count;
        }

        let level = self.params[LEVEL].clamp(0.0, 1.0);
        let cubed = level * level * level;
        if self.primed {
            self.level.ramp_to(cubed);
        } else {
            self.level.set_instant(cubed);
            self.primed = true;
        }

        let count = count as usize;
        let detune = self.params[UNI_DETUNE].clamp(0.0, 1.0);
        detune_offsets(count, detune, &mut self.detune);

        let base = self.base_pitch(pitch);
        let sr_inv = self.config.sample_rate_inv();
        match waveform {
            WAVEFORM_SAW => {
                for v in 0..count {
                    let freq = semitones_to_hz(base + self.detune[v]);
                    self.saw[v].set_frequency(freq, sr_inv);
                }
            }
            WAVEFORM_PULSE => {
                let sync = self.params[SYNC].clamp(0.0, 96.0);
                let width = self.params[WIDTH].clamp(0.0, 1.0);
                let level = self.params[LEVEL].clamp(0.0, 1.0);
                for v in 0..count {
                    let voice_pitch = base + self.detune[v];
                    // Edges run at the synced rate, the reset accumulator
                    // at the base rate; with sync at 0 they coincide
                    let edge = semitones_to_hz(voice_pitch + sync);
                    let reset = semitones_to_hz(voice_pitch);
                    self.pulse[v].set_params(edge, width, reset, level);
                }
            }
            _ => {
                for v in 0..count {
                    let freq = semitones_to_hz(base + self.detune[v]);
                    self.sine[v].set_rate(core::f32::consts::TAU * freq * sr_inv);
                    self.sine[v].renormalize();
                }
            }
        }
    }

    fn render(&mut self, output: &mut [f32], pitch: f32) {
        self.prepare_block(pitch);

        output.fill(0.0);

        let count = self.unison_count();
        // Detuned voices sum incoherently; equal-power normalization keeps
        // the perceived level steady as the count changes
        let norm = 1.0 / sqrtf(count as f32);
        let waveform = self.waveform();

        for v in 0..count {
            match waveform {
                WAVEFORM_SAW => {
                    let osc = &mut self.saw[v];
                    for out in output.iter_mut() {
                        *out += osc.step() * norm;
                    }
                }
                WAVEFORM_PULSE => {
                    self.pulse[v].run(&mut self.tmp);
                    for (out, &s) in output.iter_mut().zip(self.tmp.iter()) {
                        *out += s * norm;
                    }
                }
                _ => {
                    let osc = &mut self.sine[v];
                    for out in output.iter_mut() {
                        *out += osc.value() * norm;
                        osc.step();
                    }
                }
            }
        }

        // The pulse kernel applies its own cubed level; sine and saw take
        // it here
        if waveform == WAVEFORM_PULSE {
            for _ in 0..output.len() {
                self.level.advance();
            }
        } else {
            for out in output.iter_mut() {
                *out *= self.level.advance();
            }
        }
    }
}

impl VoiceEffect for VaGenerator {
    fn param_count(&self) -> usize {
        NUM_PARAMS
    }

    fn int_param_count(&self) -> usize {
        NUM_INT_PARAMS
    }

    fn param_info(&self, index: usize) -> Option<ParamDescriptor> {
        let pulse = self.waveform() == WAVEFORM_PULSE;
        match index {
            TUNE => Some(if self.keytrack {
                ParamDescriptor::semitones("Tune", "Tune", -96.0, 96.0, 0.0)
            } else {
                ParamDescriptor::semitones("Frequency", "Freq", -96.0, 96.0, 0.0)
            }),
            LEVEL => Some(ParamDescriptor::percent("Level", "Level", 0.5)),
            SYNC => Some(
                ParamDescriptor::semitones("Sync", "Sync", 0.0, 96.0, 0.0).with_hidden(!pulse),
            ),
            WIDTH => Some(ParamDescriptor::percent("Width", "Width", 0.5).with_hidden(!pulse)),
            UNI_DETUNE => Some(
                ParamDescriptor::semitones("Uni Detune", "Detune", 0.0, 1.0, 0.01)
                    .with_hidden(self.unison_count() <= 1),
            ),
            _ => None,
        }
    }

    fn int_param_info(&self, index: usize) -> Option<IntParamDescriptor> {
        match index {
            INT_STEREO => Some(IntParamDescriptor::toggle("Stereo", "Stereo", false)),
            INT_WAVEFORM => Some(IntParamDescriptor::selector(
                "Waveform", "Wave", NUM_WAVEFORMS, 0,
            )),
            INT_UNISON => Some(IntParamDescriptor {
                name: "Unison",
                short_name: "Unison",
                min: 1,
                max: MAX_UNISON as i32,
                default: 1,
                hidden: false,
            }),
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

    fn process_mono_to_mono(&mut self, _input: &[f32], output: &mut [f32], pitch: f32) {
        self.render(output, pitch);
    }

    fn process_mono_to_stereo(
        &mut self,
        _input: &[f32],
        out_l: &mut [f32],
        out_r: &mut [f32],
        pitch: f32,
    ) {
        // The generator itself is not stereo-spread; the unison sum is
        // duplicated to both channels
        self.render(out_l, pitch);
        out_r.copy_from_slice(out_l);
    }

    fn process_stereo(
        &mut self,
        _in_l: &[f32],
        _in_r: &[f32],
        out_l: &mut [f32],
        out_r: &mut [f32],
        pitch: f32,
    ) {
        self.process_mono_to_stereo(&[], out_l, out_r, pitch);
    }

    fn mono_to_stereo_setting(&self) -> bool {
        self.iparams[INT_STEREO] != 0
    }

    fn enable_keytrack(&mut self, enabled: bool) -> bool {
        let changed = self.keytrack != enabled;
        self.keytrack = enabled;
        changed
    }

    fn keytrack(&self) -> bool {
        self.keytrack
    }

    fn keytrack_default(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BLOCK: usize = 32;

    fn generator(sample_rate: f32) -> VaGenerator {
        let mut g = VaGenerator::new(
            VoiceConfig::new(sample_rate, BLOCK),
            Arc::new(SincTable::new()),
        );
        g.init_voice_effect_params();
        g
    }

    fn render_mono(g: &mut VaGenerator, samples: usize, pitch: f32) -> Vec<f32> {
        let input = [0.0f32; BLOCK];
        let mut block = [0.0f32; BLOCK];
        let mut out = Vec::with_capacity(samples);
        for _ in 0..samples / BLOCK {
            g.process_mono_to_mono(&input, &mut block, pitch);
            out.extend_from_slice(&block);
        }
        out
    }

    fn zero_crossing_rate(signal: &[f32], sample_rate: f32) -> f32 {
        let mut crossings = 0;
        for w in signal.windows(2) {
            if w[0] <= 0.0 && w[1] > 0.0 {
                crossings += 1;
            }
        }
        crossings as f32 / (signal.len() as f32 / sample_rate)
    }

    #[test]
    fn sine_tracks_the_voice_pitch() {
        let sr = 48000.0;
        let mut g = generator(sr);
        // Pitch +12 st above A440 = 880 Hz with keytrack on by default
        let out = render_mono(&mut g, 48000, 12.0);
        let rate = zero_crossing_rate(&out[4800..], sr);
        assert!(
            (rate - 880.0).abs() < 5.0,
            "measured {rate} Hz, expected 880"
        );
    }

    #[test]
    fn keytrack_off_uses_absolute_tune() {
        let sr = 48000.0;
        let mut g = generator(sr);
        g.enable_keytrack(false);
        // Tune 0 = 440 Hz regardless of the voice pitch
        let out = render_mono(&mut g, 48000, 24.0);
        let rate = zero_crossing_rate(&out[4800..], sr);
        assert!(
            (rate - 440.0).abs() < 5.0,
            "measured {rate} Hz, expected 440"
        );
    }

    #[test]
    fn keytrack_defaults_on() {
        let g = generator(48000.0);
        assert!(g.keytrack());
        assert!(g.keytrack_default());
    }

    #[test]
    fn level_scales_with_the_cube() {
        let sr = 48000.0;
        let mut g = generator(sr);
        g.set_float_param(LEVEL, 1.0);
        let full = render_mono(&mut g, 9600, 0.0);

        let mut g = generator(sr);
        g.set_float_param(LEVEL, 0.5);
        let half = render_mono(&mut g, 9600, 0.0);

        let pf = full[4800..].iter().fold(0.0f32, |m, &v| m.max(v.abs()));
        let ph = half[4800..].iter().fold(0.0f32, |m, &v| m.max(v.abs()));
        let ratio = ph / pf;
        assert!(
            (ratio - 0.125).abs() < 0.02,
            "cubed level ratio {ratio}, expected 0.125"
        );
    }

    #[test]
    fn all_waveforms_stay_bounded_with_full_unison() {
        let sr = 48000.0;
        for wave in [WAVEFORM_SINE, WAVEFORM_SAW, WAVEFORM_PULSE] {
            let mut g = generator(sr);
            g.set_int_param(INT_WAVEFORM, wave);
            g.set_int_param(INT_UNISON, 9);
            g.set_float_param(UNI_DETUNE, 0.3);
            g.set_float_param(LEVEL, 1.0);
            for (i, v) in render_mono(&mut g, 48000, 0.0).iter().enumerate() {
                assert!(
                    v.is_finite() && v.abs() < 4.0,
                    "waveform {wave}, sample {i}: {v}"
                );
            }
        }
    }

    #[test]
    fn unison_spreads_the_spectrum() {
        // With 2 voices at ±1 st the sum beats; a single voice does not.
        // Compare amplitude envelopes over windows.
        let sr = 48000.0;
        let mut g = generator(sr);
        g.set_int_param(INT_UNISON, 2);
        g.set_float_param(UNI_DETUNE, 1.0);
        let out = render_mono(&mut g, 48000, 0.0);
        let mut min_peak = f32::MAX;
        let mut max_peak = 0.0f32;
        // ~51 Hz beat between the pair; 200-sample windows resolve it
        for chunk in out[4800..].chunks(200) {
            let peak = chunk.iter().fold(0.0f32, |m, &v| m.max(v.abs()));
            min_peak = min_peak.min(peak);
            max_peak = max_peak.max(peak);
        }
        assert!(
            max_peak > 2.0 * min_peak,
            "no beating: peaks {min_peak}..{max_peak}"
        );
    }

    #[test]
    fn stereo_shapes_duplicate_the_unison_sum() {
        let sr = 48000.0;
        let mut g = generator(sr);
        g.set_int_param(INT_STEREO, 1);
        g.set_int_param(INT_UNISON, 5);
        g.set_float_param(UNI_DETUNE, 0.5);

        let (mut bl, mut br) = ([0.0f32; BLOCK], [0.0f32; BLOCK]);
        let mut energy = 0.0f32;
        for _ in 0..9600 / BLOCK {
            g.process_mono_to_stereo(&[0.0; BLOCK], &mut bl, &mut br, 0.0);
            assert_eq!(bl, br, "generator channels must be identical");
            energy += bl.iter().map(|v| v * v).sum::<f32>();
        }
        assert!(energy > 0.01, "duplicated output was silent");
        assert!(g.mono_to_stereo_setting());
    }

    #[test]
    fn pulse_metadata_hides_when_unused() {
        let mut g = generator(48000.0);
        assert!(g.param_at(SYNC).hidden);
        assert!(g.param_at(WIDTH).hidden);
        assert!(g.param_at(UNI_DETUNE).hidden, "hidden while unison is 1");
        g.set_int_param(INT_WAVEFORM, WAVEFORM_PULSE);
        g.set_int_param(INT_UNISON, 3);
        assert!(!g.param_at(SYNC).hidden);
        assert!(!g.param_at(WIDTH).hidden);
        assert!(!g.param_at(UNI_DETUNE).hidden);
    }

    #[test]
    fn waveform_switch_restarts_cleanly() {
        let mut g = generator(48000.0);
        render_mono(&mut g, 4800, 0.0);
        g.set_int_param(INT_WAVEFORM, WAVEFORM_SAW);
        for (i, v) in render_mono(&mut g, 4800, 0.0).iter().enumerate() {
            assert!(v.is_finite() && v.abs() < 2.0, "sample {i}: {v}");
        }
    }
}

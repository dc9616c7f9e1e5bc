//! Short stereo delay engine with filtered, soft-clipped feedback.
//!
//! Two pooled sinc-interpolated delay lines (up to 250 ms each), per-channel
//! feedback plus cross-channel feed, and a low-cut/high-cut filter pair in
//! the feedback loop. Delay times are ramped in samples across each block,
//! so moving a time knob glides instead of clicking.
//!
//! The engine outputs the wet signal only; the host mixes dry and wet.

#[cfg(not(feature = "std"))]
extern crate alloc;

#[cfg(feature = "std")]
extern crate std as alloc;

use alloc::sync::Arc;

use voce_core::{
    BUTTERWORTH_Q, Biquad, BlockRamp, DelayLinePool, IntParamDescriptor, LineTier,
    ParamDescriptor, SincDelayLine, SincTable, VoiceConfig, VoiceEffect,
    math::{feedback_clip, semitones_to_hz},
};

/// Longest supported delay time.
pub const MAX_MILLISECONDS: f32 = 250.0;

const TIME_L: usize = 0;
const TIME_R: usize = 1;
const FEEDBACK: usize = 2;
const CROSS_FEED: usize = 3;
const LOW_CUT: usize = 4;
const HIGH_CUT: usize = 5;
const NUM_PARAMS: usize = 6;

const INT_STEREO: usize = 0;
const NUM_INT_PARAMS: usize = 1;

/// Per-voice short delay. See the module docs for the topology.
#[derive(Debug)]
pub struct ShortDelay {
    config: VoiceConfig,
    table: Arc<SincTable>,

    params: [f32; NUM_PARAMS],
    iparams: [i32; NUM_INT_PARAMS],

    lines: [Option<SincDelayLine>; 2],
    time: [BlockRamp; 2],
    feedback: BlockRamp,
    cross_feed: BlockRamp,
    lp: [Biquad; 2],
    hp: [Biquad; 2],
}

impl ShortDelay {
    /// Create an engine with no delay lines attached; call
    /// [`init_voice_effect`](VoiceEffect::init_voice_effect) before
    /// processing.
    #[must_use]
    pub fn new(config: VoiceConfig, table: Arc<SincTable>) -> Self {
        let bs = config.block_size;
        Self {
            config,
            table,
            params: [0.0; NUM_PARAMS],
            iparams: [0; NUM_INT_PARAMS],
            lines: [None, None],
            time: [BlockRamp::new(bs), BlockRamp::new(bs)],
            feedback: BlockRamp::new(bs),
            cross_feed: BlockRamp::new(bs),
            lp: [Biquad::new(), Biquad::new()],
            hp: [Biquad::new(), Biquad::new()],
        }
    }

    fn stereo(&self) -> bool {
        self.iparams[INT_STEREO] != 0
    }

    fn time_samples(&self, index: usize) -> f32 {
        let ms = self.params[index].clamp(0.0, MAX_MILLISECONDS);
        ms * 0.001 * self.config.sample_rate
    }

    /// Retarget the ramps and feedback filters from the current parameters.
    fn prepare_block(&mut self) {
        let sr = self.config.sample_rate;

        self.time[0].ramp_to(self.time_samples(TIME_L));
        // Mono voices run on the left line and the left time
        let right = if self.stereo() { TIME_R } else { TIME_L };
        self.time[1].ramp_to(self.time_samples(right));

        self.feedback.ramp_to(self.params[FEEDBACK].clamp(0.0, 1.0));
        let cross = if self.stereo() {
            self.params[CROSS_FEED].clamp(0.0, 1.0)
        } else {
            0.0
        };
        self.cross_feed.ramp_to(cross);

        // Cutoffs live in semitone space so keytracking hosts can shift
        // them; both ends clamp below Nyquist, the metadata ranges reach
        // past it at common sample rates
        let lo = semitones_to_hz(self.params[LOW_CUT]).min(0.49 * sr);
        let hi = semitones_to_hz(self.params[HIGH_CUT]).min(0.49 * sr);
        for c in 0..2 {
            self.lp[c].set_lowpass(hi, BUTTERWORTH_Q, sr);
            self.hp[c].set_highpass(lo, BUTTERWORTH_Q, sr);
        }
    }

    fn snap_ramps(&mut self) {
        self.time[0].set_instant(self.time_samples(TIME_L));
        let right = if self.stereo() { TIME_R } else { TIME_L };
        self.time[1].set_instant(self.time_samples(right));
        self.feedback.set_instant(self.params[FEEDBACK].clamp(0.0, 1.0));
        self.cross_feed.set_instant(self.params[CROSS_FEED].clamp(0.0, 1.0));
    }
}

impl VoiceEffect for ShortDelay {
    fn param_count(&self) -> usize {
        NUM_PARAMS
    }

    fn int_param_count(&self) -> usize {
        NUM_INT_PARAMS
    }

    fn param_info(&self, index: usize) -> Option<ParamDescriptor> {
        let mono = !self.stereo();
        match index {
            TIME_L => Some(ParamDescriptor::time_ms(
                "Time L", "TimeL", 0.0, MAX_MILLISECONDS, 50.0,
            )),
            TIME_R => Some(
                ParamDescriptor::time_ms("Time R", "TimeR", 0.0, MAX_MILLISECONDS, 50.0)
                    .with_hidden(mono),
            ),
            FEEDBACK => Some(ParamDescriptor::percent("Feedback", "Feedbck", 0.0)),
            CROSS_FEED => Some(
                ParamDescriptor::percent("Cross Feed", "CrossFd", 0.0).with_hidden(mono),
            ),
            LOW_CUT => Some(ParamDescriptor::semitones(
                "Low Cut", "LowCut", -60.0, 70.0, -60.0,
            )),
            HIGH_CUT => Some(ParamDescriptor::semitones(
                "High Cut", "HighCut", -60.0, 70.0, 70.0,
            )),
            _ => None,
        }
    }

    fn int_param_info(&self, index: usize) -> Option<IntParamDescriptor> {
        match index {
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

    fn init_voice_effect(&mut self, pool: &mut DelayLinePool) {
        let tier = LineTier::for_sample_rate(self.config.sample_rate);
        for slot in &mut self.lines {
            if slot.is_none() {
                *slot = Some(SincDelayLine::new(
                    pool.acquire(tier),
                    Arc::clone(&self.table),
                ));
            }
        }
        for c in 0..2 {
            self.lp[c].clear();
            self.hp[c].clear();
        }
        self.snap_ramps();
    }

    fn deinit_voice_effect(&mut self, pool: &mut DelayLinePool) {
        for slot in &mut self.lines {
            if let Some(line) = slot.take() {
                pool.release(line.into_storage());
            }
        }
    }

    fn process_mono_to_mono(&mut self, input: &[f32], output: &mut [f32], _pitch: f32) {
        self.prepare_block();
        let Some(line) = self.lines[0].as_mut() else {
            output.fill(0.0);
            return;
        };

        for (out, &dry) in output.iter_mut().zip(input.iter()) {
            let d = self.time[0].advance();
            let fb = self.feedback.advance();
            self.cross_feed.advance();
            self.time[1].advance();

            let tap = self.hp[0].process(self.lp[0].process(line.read(d)));
            // Only the recirculating part is clipped; the dry input enters
            // the line untouched
            line.write(dry + feedback_clip(fb * tap));
            *out = tap;
        }
    }

    fn process_mono_to_stereo(
        &mut self,
        input: &[f32],
        out_l: &mut [f32],
        out_r: &mut [f32],
        pitch: f32,
    ) {
        // Same input into both lines; the time offset makes the width
        self.process_stereo_inner(input, input, out_l, out_r, pitch);
    }

    fn process_stereo(
        &mut self,
        in_l: &[f32],
        in_r: &[f32],
        out_l: &mut [f32],
        out_r: &mut [f32],
        pitch: f32,
    ) {
        self.process_stereo_inner(in_l, in_r, out_l, out_r, pitch);
    }

    fn mono_to_stereo_setting(&self) -> bool {
        self.stereo()
    }
}

impl ShortDelay {
    fn process_stereo_inner(
        &mut self,
        in_l: &[f32],
        in_r: &[f32],
        out_l: &mut [f32],
        out_r: &mut [f32],
        _pitch: f32,
    ) {
        self.prepare_block();
        let [slot_l, slot_r] = &mut self.lines;
        let (Some(line_l), Some(line_r)) = (slot_l.as_mut(), slot_r.as_mut()) else {
            out_l.fill(0.0);
            out_r.fill(0.0);
            return;
        };

        for n in 0..out_l.len() {
            let dl = self.time[0].advance();
            let dr = self.time[1].advance();
            let fb = self.feedback.advance();
            let cf = self.cross_feed.advance();

            let tap_l = self.hp[0].process(self.lp[0].process(line_l.read(dl)));
            let tap_r = self.hp[1].process(self.lp[1].process(line_r.read(dr)));

            line_l.write(in_l[n] + feedback_clip(fb * tap_l + cf * tap_r));
            line_r.write(in_r[n] + feedback_clip(fb * tap_r + cf * tap_l));

            out_l[n] = tap_l;
            out_r[n] = tap_r;
        }
    }
}

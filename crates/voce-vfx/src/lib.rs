//! Per-voice synthesizer effect engines.
//!
//! Three engines built on the [`voce_core`] primitives, all implementing
//! [`voce_core::VoiceEffect`]:
//!
//! - [`ShortDelay`] - stereo delay up to 250 ms with filtered, soft-clipped
//!   feedback and cross-channel feed
//! - [`SvfFilter`] - nine-mode state-variable filter with memoized
//!   coefficients and optional keytracking
//! - [`VaGenerator`] - unison virtual-analog oscillator source (sine, DPW
//!   saw, sinc-convolution pulse with hard sync)
//!
//! Engines are constructed once per voice, parameterized through the
//! [`VoiceEffect`](voce_core::VoiceEffect) metadata surface, and driven
//! with fixed-size blocks. Nothing here allocates or locks after voice
//! init.
//!
//! # Example
//!
//! ```rust
//! use voce_core::{DelayLinePool, SincTable, VoiceConfig, VoiceEffect};
//! use voce_vfx::ShortDelay;
//! use std::sync::Arc;
//!
//! let cfg = VoiceConfig::new(48000.0, 32);
//! let mut pool = DelayLinePool::new();
//! let mut delay = ShortDelay::new(cfg, Arc::new(SincTable::new()));
//! delay.init_voice_effect_params();
//! delay.init_voice_effect(&mut pool);
//!
//! let input = [0.0f32; 32];
//! let mut output = [0.0f32; 32];
//! delay.process_mono_to_mono(&input, &mut output, 0.0);
//!
//! delay.deinit_voice_effect(&mut pool);
//! ```

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(not(feature = "std"))]
extern crate alloc;

pub mod delay;
pub mod filter;
pub mod generator;
pub mod osc;
pub mod unison;

pub use delay::{MAX_MILLISECONDS, ShortDelay};
pub use filter::SvfFilter;
pub use generator::{VaGenerator, WAVEFORM_PULSE, WAVEFORM_SAW, WAVEFORM_SINE};
pub use osc::{DpwSawOsc, PulseOsc, QuadratureOsc};
pub use unison::{MAX_UNISON, detune_offsets};

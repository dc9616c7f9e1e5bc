//! Voce Core - DSP primitives for per-voice synthesizer effects
//!
//! This crate provides the building blocks shared by the voice effect
//! engines in `voce-vfx`, designed for real-time audio processing with zero
//! allocation in the audio path.
//!
//! # Core Abstractions
//!
//! ## Voice Effect System
//!
//! - [`VoiceEffect`] - block-based per-voice processor trait
//! - [`VoiceConfig`] - sample rate and block size, fixed at construction
//!
//! ## Parameter Smoothing
//!
//! - [`BlockRamp`] - linear ramp that converges to each block's parameter
//!   target in exactly one block, eliminating zipper noise
//!
//! ## Delay
//!
//! - [`SincTable`] - shared 12-tap windowed-sinc interpolation kernel
//! - [`SincDelayLine`] - circular delay with sinc fractional reads
//! - [`DelayLinePool`] / [`LineTier`] - borrow/return storage arena so a
//!   voice starting mid-performance never allocates
//!
//! ## Filters
//!
//! - [`MultiModeSvf`] - nine-mode TPT state variable filter core
//! - [`Biquad`] - second-order RBJ section for tone shaping
//!
//! ## Parameters & Math
//!
//! - [`ParamDescriptor`] / [`IntParamDescriptor`] - display and default
//!   metadata for engine parameters
//! - Math utilities: [`db_to_linear`], [`semitones_to_hz`],
//!   [`feedback_clip`], [`flush_denormal`]
//!
//! # no_std Support
//!
//! This crate is `no_std` compatible. Disable the default `std` feature:
//!
//! ```toml
//! [dependencies]
//! voce-core = { version = "0.1", default-features = false }
//! ```
//!
//! # Design Principles
//!
//! - **Real-time safe**: no allocations or locks in processing paths
//! - **No dependencies on std**: `libm` for math
//! - **Pitch in semitones**: frequency-like parameters live in semitones
//!   relative to A440, so keytracking is an addition

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(not(feature = "std"))]
extern crate alloc;

pub mod biquad;
pub mod block;
pub mod delay_line;
pub mod math;
pub mod param;
pub mod sinc;
pub mod svf;
pub mod voice_effect;

// Re-export main types at crate root
pub use biquad::{BUTTERWORTH_Q, Biquad};
pub use block::BlockRamp;
pub use delay_line::{DelayLinePool, LineStorage, LineTier, SincDelayLine};
pub use math::{
    db_to_linear, feedback_clip, flush_denormal, lerp, linear_to_db, semitones_to_hz,
};
pub use param::{IntParamDescriptor, ParamDescriptor, ParamUnit};
pub use sinc::{FIR_TAPS, SUB_STEPS, SincTable};
pub use svf::{MultiModeSvf, SvfMode};
pub use voice_effect::{VoiceConfig, VoiceEffect};

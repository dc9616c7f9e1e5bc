//! Oscillator kernels behind the unison generator engine.
//!
//! Three waveform sources with different anti-aliasing strategies:
//! a rotation-matrix sine ([`QuadratureOsc`]), a differentiated parabolic
//! wave saw ([`DpwSawOsc`]), and a sinc-convolution pulse with hard sync
//! ([`PulseOsc`]).

pub mod dpw;
pub mod pulse;
pub mod quadrature;

pub use dpw::DpwSawOsc;
pub use pulse::PulseOsc;
pub use quadrature::QuadratureOsc;

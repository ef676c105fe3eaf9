//! Signal primitives: the per-sample building blocks of an effect chain.
//!
//! Each primitive is parameterised once and then fed one sample at a time.
//! None of them clamp their output; the processor clamps once at the end
//! of the chain.

pub mod bitcrush;
pub mod chorus;
pub mod compressor;
pub mod delay;
pub mod distortion;
pub mod envelope;
pub mod filter;
pub mod oscillator;
pub mod reverb;
pub mod stereo;
pub mod tremolo;

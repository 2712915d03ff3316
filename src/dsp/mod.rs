//! Low-level DSP primitives used by the higher level graph nodes.
//!
//! These components do not allocate after construction, so they are safe to
//! run inside the audio callback. They stay focused on the signal-processing
//! math; the graph layer handles parameters and wiring.

/// Byte snapshots, RMS and peak measurement.
pub mod analysis;
/// Circular delay line with fractional reads.
pub mod delay;
/// Waveshaper transfer curve synthesis and lookup.
pub mod distortion;
/// Lowpass state-variable filter.
pub mod filter;
/// Summing and dry/wet blending.
pub mod mix;
/// Click-free linear parameter ramps.
pub mod ramp;
/// Pre-delayed Schroeder reverb.
pub mod reverb;

pub use distortion::{synthesize, DistortionCurve};

//! Low-level DSP primitives used by the render graph.
//!
//! These components are allocation-free once constructed and realtime-safe,
//! making them safe to embed directly inside render nodes. They stay focused
//! on the signal math; scheduling and routing live one layer up.

/// Attack/release/sustain timing for voice envelopes.
pub mod envelope;
/// Wavetable oscillator driven by a harmonic spectrum.
pub mod oscillator;
/// Scheduled parameter timelines (set, ramp, cancel).
pub mod param;
/// Partitioned FFT convolution reverb and impulse synthesis.
pub mod reverb;
/// Harmonic spectra and their normalized wavetables.
pub mod spectrum;

pub use envelope::EnvelopeTiming;
pub use param::{ParamCommand, ParamTimeline};
pub use spectrum::HarmonicSpectrum;

//! Benchmarks for low-level DSP primitives.

mod oscillator;
mod reverb;

pub use oscillator::bench_oscillator;
pub use reverb::bench_reverb;

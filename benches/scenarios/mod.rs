//! Real-world scenario benchmarks.
//!
//! These drive voices and the output chain the way the engine does.

mod voices;

pub use voices::bench_voices;

pub mod dsp;
pub mod engine;
pub mod error;
pub mod graph; // Render-side nodes driven by parameter timelines
pub mod io;
pub mod synth; // Voices, pool, waveform catalog and routing

pub use engine::{Engine, EngineConfig};
pub use error::DeviceError;
pub use synth::waveform::Waveform;

pub const MAX_BLOCK_SIZE: usize = 2048;
pub(crate) const MIN_TIME: f32 = 1.0 / 48_000.0;

/// Opaque note identity supplied by the input layer.
pub type NoteId = i32;

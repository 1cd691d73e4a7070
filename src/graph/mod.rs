//! Render-side building blocks.
//!
//! Graph nodes wrap the low-level DSP primitives with block-based rendering.
//! Nothing here decides *what* to play: every value that moves arrives on a
//! parameter lane written by the control side (`synth`). The `extensions`
//! module adds fluent helpers so the output chain reads left to right.

/// Multiply a signal by a modulator (gain stages).
pub mod amplify;
/// Sum of all voice nodes.
pub mod bus;
/// Fluent combinators (`.amplify()`, `.through()`).
pub mod extensions;
/// Core traits shared by all graph nodes.
pub mod node;
/// Spectrum oscillator with a frequency lane.
pub mod oscillator;
/// The assembled output chain handed to a device.
pub mod output;
/// Control/render parameter pairs over SPSC rings.
pub mod param;
/// Dry/wet convolution reverb send.
pub mod reverb;
/// Serial chaining of two nodes (source → effect).
pub mod through;

pub use node::{GraphNode, RenderCtx};
pub use output::OutputGraph;

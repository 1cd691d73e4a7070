use thiserror::Error;

/// Failures raised while opening or driving an output device.
///
/// None of these escape the engine: they are logged and the engine
/// carries on without sound.
#[derive(Debug, Error)]
pub enum DeviceError {
    #[error("no output device available: {0}")]
    Unavailable(String),
    #[error("unsupported output configuration: {0}")]
    Config(String),
    #[error("failed to build output stream: {0}")]
    Stream(String),
    #[error("failed to resume output: {0}")]
    Resume(String),
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown waveform `{0}` (expected sine, organ, square, saw or triangle)")]
pub struct ParseWaveformError(pub String);

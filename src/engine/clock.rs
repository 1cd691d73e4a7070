use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};

/// Shared render clock: frames rendered so far at a fixed sample rate.
///
/// The render side advances it after each block; the control side reads it
/// to stamp scheduled commands. Clones share the same counter.
#[derive(Debug, Clone)]
pub struct RenderClock {
    frames: Arc<AtomicU64>,
    sample_rate: f32,
}

impl RenderClock {
    pub fn new(sample_rate: f32) -> Self {
        Self {
            frames: Arc::new(AtomicU64::new(0)),
            sample_rate: sample_rate.max(1.0),
        }
    }

    /// Seconds of audio rendered so far.
    pub fn now(&self) -> f64 {
        self.frames() as f64 / self.sample_rate as f64
    }

    pub fn frames(&self) -> u64 {
        self.frames.load(Ordering::Acquire)
    }

    pub fn advance(&self, frames: usize) {
        self.frames.fetch_add(frames as u64, Ordering::AcqRel);
    }

    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }
}

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::synth::waveform::Waveform;

/// Tunables for an `Engine`. `Default` gives the stock instrument.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    /// Voices per pool. Clamped to at least one when the pool is built.
    pub polyphony: usize,
    /// Seconds a stolen voice takes to fade out before retriggering.
    pub steal_fade: f64,
    /// Seconds of the ramp applied when the master gain is recomputed.
    pub master_ramp: f64,
    pub dry_gain: f32,
    pub wet_gain: f32,
    /// Length of the synthetic impulse response, in seconds.
    pub reverb_duration: f32,
    /// Fixed seed for the impulse response noise; `None` draws from entropy.
    pub reverb_seed: Option<u64>,
    /// Commands buffered per parameter between control and render side.
    pub queue_capacity: usize,
    pub initial_sound: Waveform,
    pub initial_volume: f32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            polyphony: 3,
            steal_fade: 0.010,
            master_ramp: 0.015,
            dry_gain: 0.5,
            wet_gain: 0.5,
            reverb_duration: 3.0,
            reverb_seed: None,
            queue_capacity: 256,
            initial_sound: Waveform::Sine,
            initial_volume: 1.0,
        }
    }
}

impl EngineConfig {
    pub fn with_polyphony(mut self, polyphony: usize) -> Self {
        self.polyphony = polyphony;
        self
    }

    pub fn with_steal_fade(mut self, seconds: f64) -> Self {
        self.steal_fade = seconds;
        self
    }

    pub fn with_master_ramp(mut self, seconds: f64) -> Self {
        self.master_ramp = seconds;
        self
    }

    pub fn with_mix(mut self, dry: f32, wet: f32) -> Self {
        self.dry_gain = dry;
        self.wet_gain = wet;
        self
    }

    pub fn with_reverb_duration(mut self, seconds: f32) -> Self {
        self.reverb_duration = seconds;
        self
    }

    pub fn with_reverb_seed(mut self, seed: u64) -> Self {
        self.reverb_seed = Some(seed);
        self
    }

    pub fn with_queue_capacity(mut self, capacity: usize) -> Self {
        self.queue_capacity = capacity;
        self
    }

    pub fn with_initial_sound(mut self, sound: Waveform) -> Self {
        self.initial_sound = sound;
        self
    }

    pub fn with_initial_volume(mut self, volume: f32) -> Self {
        self.initial_volume = volume;
        self
    }
}

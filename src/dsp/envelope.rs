use crate::MIN_TIME;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/*
Attack / Sustain / Release Timing
=================================

Voices here use a reduced ADSR shape: there is no decay stage. The attack
ramps linearly from wherever the gain currently sits up to the sustain
level; the release ramps linearly from wherever it currently sits down to
zero. Starting both ramps from the current level (rather than snapping to
0 or to sustain first) is what keeps retriggers and early releases from
clicking.

  Level
    S   ┐     ╱‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾╲
        │    ╱                 ╲
        │   ╱                   ╲
    0.0 └──╱─────────────────────╲──→ Time
         Attack    Sustain    Release

The envelope itself is not a sample generator: the voice turns these
timings into ramp commands on its gain timeline.
*/

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnvelopeTiming {
    /// Seconds to ramp from the current level to `sustain`.
    pub attack: f32,
    /// Seconds to ramp from the current level to 0.
    pub release: f32,
    /// Level held while the note is down (0.0 - 1.0).
    pub sustain: f32,
}

impl EnvelopeTiming {
    pub fn new(attack: f32, release: f32, sustain: f32) -> Self {
        Self {
            attack: attack.max(0.0),
            release: release.max(0.0),
            sustain: sustain.clamp(0.0, 1.0),
        }
    }

    /// Attack duration, never shorter than one sample at 48 kHz.
    pub fn attack_time(&self) -> f64 {
        self.attack.max(MIN_TIME) as f64
    }

    /// Release duration, never shorter than one sample at 48 kHz.
    pub fn release_time(&self) -> f64 {
        self.release.max(MIN_TIME) as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamps_out_of_range_values() {
        let timing = EnvelopeTiming::new(-1.0, -0.5, 1.4);
        assert_eq!(timing.attack, 0.0);
        assert_eq!(timing.release, 0.0);
        assert_eq!(timing.sustain, 1.0);
    }

    #[test]
    fn zero_times_still_produce_a_ramp() {
        let timing = EnvelopeTiming::new(0.0, 0.0, 0.5);
        assert!(timing.attack_time() > 0.0);
        assert!(timing.release_time() > 0.0);
    }
}

use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{
    dsp::{envelope::EnvelopeTiming, spectrum::HarmonicSpectrum},
    error::ParseWaveformError,
};

/// The five selectable timbres.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Waveform {
    #[default]
    Sine,
    Organ,
    Square,
    Saw,
    Triangle,
}

impl Waveform {
    pub const ALL: [Waveform; 5] = [
        Waveform::Sine,
        Waveform::Organ,
        Waveform::Square,
        Waveform::Saw,
        Waveform::Triangle,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Waveform::Sine => "sine",
            Waveform::Organ => "organ",
            Waveform::Square => "square",
            Waveform::Saw => "saw",
            Waveform::Triangle => "triangle",
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Waveform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Waveform {
    type Err = ParseWaveformError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Waveform::ALL
            .iter()
            .copied()
            .find(|w| w.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ParseWaveformError(s.to_string()))
    }
}

/// A timbre: what the oscillator plays and how the envelope moves.
#[derive(Debug, Clone)]
pub struct WaveformDef {
    pub spectrum: HarmonicSpectrum,
    pub timing: EnvelopeTiming,
}

/// The fixed catalog of timbres.
///
/// Sine and saw speak almost instantly and stop almost as fast; square,
/// organ and triangle swell in and fade out.
pub struct WaveformLibrary {
    defs: [WaveformDef; 5],
}

static SHARED: OnceLock<WaveformLibrary> = OnceLock::new();

impl WaveformLibrary {
    pub fn build() -> Self {
        Self {
            defs: [sine(), organ(), square(), saw(), triangle()],
        }
    }

    /// Process-wide catalog, built on first use and never mutated.
    pub fn shared() -> &'static WaveformLibrary {
        SHARED.get_or_init(WaveformLibrary::build)
    }

    pub fn get(&self, waveform: Waveform) -> &WaveformDef {
        &self.defs[waveform.index()]
    }
}

// Spectrum of `len` slots with `amplitude(n)` at each listed harmonic.
fn spectrum(len: usize, harmonics: &[usize], amplitude: impl Fn(f32) -> f32) -> HarmonicSpectrum {
    let mut coefficients = vec![0.0; len];
    for &n in harmonics {
        coefficients[n] = amplitude(n as f32);
    }
    HarmonicSpectrum::new(coefficients)
}

fn sine() -> WaveformDef {
    WaveformDef {
        spectrum: spectrum(2, &[1], |_| 1.0),
        timing: EnvelopeTiming::new(0.005, 0.010, 0.9),
    }
}

fn organ() -> WaveformDef {
    WaveformDef {
        spectrum: spectrum(6, &[1, 2, 3, 4, 5], |_| 1.0),
        timing: EnvelopeTiming::new(0.010, 0.050, 1.0),
    }
}

fn square() -> WaveformDef {
    WaveformDef {
        spectrum: spectrum(10, &[1, 3, 5, 7, 9], |n| 1.0 / n),
        timing: EnvelopeTiming::new(0.500, 0.500, 1.0),
    }
}

fn saw() -> WaveformDef {
    WaveformDef {
        spectrum: spectrum(10, &[1, 2, 3, 4, 5, 6, 7, 8, 9], |n| 1.0 / n),
        timing: EnvelopeTiming::new(0.009, 0.010, 0.6),
    }
}

// Uniform sign: a band-limited "soft" triangle rather than the alternating
// series of an exact one.
fn triangle() -> WaveformDef {
    WaveformDef {
        spectrum: spectrum(8, &[1, 3, 5, 7], |n| 1.0 / (n * n)),
        timing: EnvelopeTiming::new(0.050, 0.050, 1.0),
    }
}

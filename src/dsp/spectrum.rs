use std::f32::consts::TAU;
use std::sync::Arc;

/// Points in one cycle of a rendered wavetable.
pub const TABLE_SIZE: usize = 2048;

/// Harmonic amplitudes plus the normalized single-cycle table they imply.
///
/// Index 0 is the DC term and is forced to zero. Coefficients are
/// sine-phase amplitudes: the cycle is `Σ aₙ·sin(2π·n·x)`. The table is
/// divided by its peak magnitude so every timbre peaks at 1.0 no matter how
/// many harmonics it stacks.
///
/// Cloning is two `Arc` bumps, so a spectrum can be handed to every voice.
#[derive(Debug, Clone)]
pub struct HarmonicSpectrum {
    harmonics: Arc<[f32]>,
    table: Arc<[f32]>,
}

impl HarmonicSpectrum {
    pub fn new(mut harmonics: Vec<f32>) -> Self {
        if let Some(dc) = harmonics.first_mut() {
            *dc = 0.0;
        }
        let table = render_table(&harmonics);
        Self {
            harmonics: harmonics.into(),
            table: table.into(),
        }
    }

    /// Amplitude of harmonic `n` (0 when out of range).
    pub fn amplitude(&self, n: usize) -> f32 {
        self.harmonics.get(n).copied().unwrap_or(0.0)
    }

    pub fn harmonics(&self) -> &[f32] {
        &self.harmonics
    }

    /// Indices of harmonics with a non-zero amplitude.
    pub fn populated(&self) -> Vec<usize> {
        self.harmonics
            .iter()
            .enumerate()
            .filter(|(_, a)| **a != 0.0)
            .map(|(n, _)| n)
            .collect()
    }

    pub fn table(&self) -> &[f32] {
        &self.table
    }

    /// True when both spectra share the same rendered table.
    pub fn same_table(&self, other: &HarmonicSpectrum) -> bool {
        Arc::ptr_eq(&self.table, &other.table)
    }
}

fn render_table(harmonics: &[f32]) -> Vec<f32> {
    let mut table: Vec<f32> = (0..TABLE_SIZE)
        .map(|i| {
            let x = i as f32 / TABLE_SIZE as f32;
            harmonics
                .iter()
                .enumerate()
                .skip(1)
                .filter(|(_, a)| **a != 0.0)
                .map(|(n, a)| a * (TAU * n as f32 * x).sin())
                .sum()
        })
        .collect();

    let peak = table.iter().fold(0.0f32, |acc, &s| acc.max(s.abs()));
    if peak > 0.0 {
        for sample in table.iter_mut() {
            *sample /= peak;
        }
    }
    table
}

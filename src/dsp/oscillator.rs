use crate::dsp::spectrum::TABLE_SIZE;

/// Phase-accumulating wavetable reader.
///
/// The oscillator keeps only its phase; the table and frequency are supplied
/// per sample so a voice can swap timbre or glide without a discontinuity.
pub struct WavetableOscillator {
    phase: f32, // 0.0 - 1.0
}

impl WavetableOscillator {
    pub fn new() -> Self {
        Self { phase: 0.0 }
    }

    /// Read the current sample from `table` and advance by `frequency`.
    ///
    /// The step is limited to Nyquist; a non-finite frequency holds the phase.
    #[inline]
    pub fn next_sample(&mut self, table: &[f32], frequency: f32, sample_rate: f32) -> f32 {
        let out = if table.len() == TABLE_SIZE {
            let pos = self.phase * TABLE_SIZE as f32;
            let idx = (pos as usize) % TABLE_SIZE;
            let next = (idx + 1) % TABLE_SIZE;
            let frac = pos - pos.floor();
            table[idx] + (table[next] - table[idx]) * frac
        } else {
            0.0
        };

        let step = frequency / sample_rate;
        if step.is_finite() {
            self.phase += step.clamp(0.0, 0.5);
            self.phase -= self.phase.floor();
        }
        out
    }

    pub fn phase(&self) -> f32 {
        self.phase
    }
}

impl Default for WavetableOscillator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dsp::spectrum::HarmonicSpectrum;
    use std::f32::consts::TAU;

    #[test]
    fn sine_table_matches_analytic_sine() {
        let sample_rate = 48_000.0;
        let frequency = 440.0;
        let spectrum = HarmonicSpectrum::new(vec![0.0, 1.0]);
        let mut osc = WavetableOscillator::new();

        let samples: Vec<f32> = (0..64)
            .map(|_| osc.next_sample(spectrum.table(), frequency, sample_rate))
            .collect();

        let n = 12;
        let expected = (TAU * frequency * n as f32 / sample_rate).sin();
        assert!(
            (samples[n] - expected).abs() < 1e-3,
            "expected {expected}, got {}",
            samples[n]
        );
    }

    #[test]
    fn phase_wraps_into_unit_interval() {
        let spectrum = HarmonicSpectrum::new(vec![0.0, 1.0]);
        let mut osc = WavetableOscillator::new();
        for _ in 0..10_000 {
            osc.next_sample(spectrum.table(), 15_000.0, 44_100.0);
            assert!((0.0..1.0).contains(&osc.phase()));
        }
    }

    #[test]
    fn out_of_range_frequency_cannot_break_the_phase() {
        let spectrum = HarmonicSpectrum::new(vec![0.0, 1.0]);
        let mut osc = WavetableOscillator::new();
        for frequency in [f32::INFINITY, f32::NAN, 1e30, -5.0] {
            let sample = osc.next_sample(spectrum.table(), frequency, 48_000.0);
            assert!(sample.is_finite(), "{frequency} Hz gave {sample}");
            assert!((0.0..1.0).contains(&osc.phase()));
        }

        // A normal pitch afterwards still produces a sine.
        let peak = (0..200)
            .map(|_| osc.next_sample(spectrum.table(), 440.0, 48_000.0))
            .fold(0.0f32, |acc, s| acc.max(s.abs()));
        assert!(peak > 0.9, "peak {peak}");
    }

    #[test]
    fn odd_sized_table_is_silent() {
        let mut osc = WavetableOscillator::new();
        assert_eq!(osc.next_sample(&[1.0, 1.0], 440.0, 48_000.0), 0.0);
    }
}

use rtrb::{Consumer, Producer, RingBuffer};
use tracing::warn;

use crate::{
    dsp::{oscillator::WavetableOscillator, spectrum::HarmonicSpectrum},
    graph::{
        node::{GraphNode, RenderCtx},
        param::{param, ParamHandle, ParamLane},
    },
    MAX_BLOCK_SIZE,
};

/*
Spectrum Oscillator
===================

An oscillator whose timbre is a harmonic spectrum rather than a fixed
shape. The spectrum is rendered once into a normalized single-cycle table
(see `dsp::spectrum`); the oscillator just reads that table at the current
frequency.

  sine      ▁▃▆█▆▃▁        1 harmonic
  organ     ▂▇▃█▂▆▁        harmonics 1-5, equal level
  square    ▇▇▇▇▁▁▁▁       odd harmonics, 1/n
  saw       ▁▂▃▄▅▆▇█       all harmonics, 1/n
  triangle  ▁▃▅▇▅▃▁        odd harmonics, 1/n²

Frequency comes from a parameter lane, so pitch changes land on the exact
sample they were scheduled for (a stolen voice changes pitch only once its
fade-out has finished). Timbre swaps arrive on a small ring of spectra and
take effect at the next block; the phase is kept so the swap is seamless.
*/

const WAVE_QUEUE_SIZE: usize = 8;

pub struct OscNode {
    osc: WavetableOscillator,
    spectrum: HarmonicSpectrum,
    frequency: ParamLane,
    waves: Consumer<HarmonicSpectrum>,
    freq_buffer: Vec<f32>,
}

/// Control-side handle for an `OscNode`.
pub struct OscHandle {
    pub frequency: ParamHandle,
    spectrum: HarmonicSpectrum,
    waves: Producer<HarmonicSpectrum>,
}

impl OscNode {
    pub fn new(
        spectrum: HarmonicSpectrum,
        frequency: f32,
        queue_capacity: usize,
    ) -> (Self, OscHandle) {
        let (freq_handle, freq_lane) = param(frequency, queue_capacity);
        let (tx, rx) = RingBuffer::<HarmonicSpectrum>::new(WAVE_QUEUE_SIZE);

        let node = Self {
            osc: WavetableOscillator::new(),
            spectrum: spectrum.clone(),
            frequency: freq_lane,
            waves: rx,
            freq_buffer: vec![0.0; MAX_BLOCK_SIZE],
        };
        let handle = OscHandle {
            frequency: freq_handle,
            spectrum,
            waves: tx,
        };
        (node, handle)
    }

    pub fn spectrum(&self) -> &HarmonicSpectrum {
        &self.spectrum
    }
}

impl OscHandle {
    /// Swap the oscillator's spectrum without touching phase or pitch.
    pub fn set_spectrum(&mut self, spectrum: HarmonicSpectrum) {
        if self.waves.push(spectrum.clone()).is_err() {
            warn!("wave queue full, spectrum change dropped by renderer");
        }
        self.spectrum = spectrum;
    }

    pub fn spectrum(&self) -> &HarmonicSpectrum {
        &self.spectrum
    }
}

impl GraphNode for OscNode {
    fn render_block(&mut self, out: &mut [f32], ctx: &RenderCtx) {
        while let Ok(spectrum) = self.waves.pop() {
            self.spectrum = spectrum;
        }

        let freqs = &mut self.freq_buffer[..out.len()];
        self.frequency.render_block(freqs, ctx);

        let table = self.spectrum.table();
        for (sample, &freq) in out.iter_mut().zip(freqs.iter()) {
            *sample = self.osc.next_sample(table, freq, ctx.sample_rate);
        }
    }
}

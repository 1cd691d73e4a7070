//! Benchmarks for wavetable playback.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use gridsynth::dsp::oscillator::WavetableOscillator;
use gridsynth::synth::waveform::{Waveform, WaveformLibrary};

use crate::BLOCK_SIZES;

pub fn bench_oscillator(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/oscillator");
    let library = WaveformLibrary::shared();

    for &size in BLOCK_SIZES {
        let mut buffer = vec![0.0f32; size];

        // Table lookups cost the same for every timbre; sine and saw bracket
        // the spectra in use.
        for waveform in [Waveform::Sine, Waveform::Saw] {
            let table = library.get(waveform).spectrum.table();
            let mut osc = WavetableOscillator::new();
            group.bench_with_input(BenchmarkId::new(waveform.name(), size), &size, |b, _| {
                b.iter(|| {
                    for sample in buffer.iter_mut() {
                        *sample = osc.next_sample(black_box(table), 440.0, 48_000.0);
                    }
                })
            });
        }
    }

    group.finish();
}

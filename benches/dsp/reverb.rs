//! Benchmarks for partitioned convolution.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use gridsynth::dsp::reverb::{impulse_response, ConvolutionReverb};
use rand::{rngs::StdRng, SeedableRng};

use crate::BLOCK_SIZES;

pub fn bench_reverb(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/reverb");
    let sample_rate = 48_000.0;
    let mut rng = StdRng::seed_from_u64(7);

    for &size in BLOCK_SIZES {
        // Impulse followed by a quiet tone
        let input: Vec<f32> = (0..size)
            .map(|i| {
                if i < 10 {
                    1.0 - (i as f32 / 10.0)
                } else {
                    (i as f32 * 0.05).sin() * 0.1
                }
            })
            .collect();

        // Short room, then the stock 3 second tail
        for (name, seconds) in [("half_second", 0.5), ("three_seconds", 3.0)] {
            let ir = impulse_response(sample_rate, seconds, &mut rng);
            let mut reverb = ConvolutionReverb::new(&ir);
            let mut buffer = input.clone();
            group.bench_with_input(BenchmarkId::new(name, size), &size, |b, _| {
                b.iter(|| {
                    buffer.copy_from_slice(&input);
                    reverb.process_block(black_box(&mut buffer));
                })
            });
        }
    }

    group.finish();
}

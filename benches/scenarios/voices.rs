//! Benchmarks for a single voice and the full engine chain.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use gridsynth::{
    graph::{GraphNode, RenderCtx},
    io::OfflineProvider,
    synth::{
        voice::Voice,
        waveform::{Waveform, WaveformLibrary},
    },
    Engine, EngineConfig,
};

use crate::BLOCK_SIZES;

pub fn bench_voices(c: &mut Criterion) {
    let mut group = c.benchmark_group("scenarios/voices");
    let ctx = RenderCtx::new(48_000.0, 0.0);
    let saw = WaveformLibrary::shared().get(Waveform::Saw);

    for &size in BLOCK_SIZES {
        let mut buffer = vec![0.0f32; size];

        // === ONE VOICE ===
        // oscillator times envelope, holding sustain
        let (mut voice, mut node) = Voice::new(saw.spectrum.clone(), 256, 0.010);
        voice.attach(57, 220.0, &saw.spectrum, &saw.timing, 0.0);
        group.bench_with_input(BenchmarkId::new("voice", size), &size, |b, _| {
            b.iter(|| {
                node.render_block(black_box(&mut buffer), black_box(&ctx));
            })
        });

        // === FULL CHORD ===
        // three voices, master, volume and the 3 second reverb
        let config = EngineConfig::default().with_reverb_seed(11);
        let mut engine = Engine::new(config, OfflineProvider::new(48_000.0));
        engine.init_voices(3);
        engine.set_sound_type(Waveform::Saw);
        for note in [57, 60, 64] {
            engine.note_on(note);
        }
        if let Some(device) = engine.device_mut() {
            group.bench_with_input(BenchmarkId::new("engine_chord", size), &size, |b, _| {
                b.iter(|| {
                    device.render(black_box(&mut buffer));
                })
            });
        }
    }

    group.finish();
}

//! Criterion benchmarks for the voice effect engines
//!
//! Run with: cargo bench
#![allow(missing_docs)]

use std::sync::Arc;

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use voce_core::{DelayLinePool, SincTable, VoiceConfig, VoiceEffect};
use voce_vfx::{ShortDelay, SvfFilter, VaGenerator, WAVEFORM_PULSE, WAVEFORM_SAW};

const SAMPLE_RATE: f32 = 48000.0;
const BLOCK_SIZES: &[usize] = &[32, 64, 128, 256];

fn generate_test_signal(size: usize) -> Vec<f32> {
    (0..size)
        .map(|i| {
            let t = i as f32 / SAMPLE_RATE;
            (2.0 * std::f32::consts::PI * 440.0 * t).sin() * 0.5
        })
        .collect()
}

fn bench_engine<F>(c: &mut Criterion, name: &str, mut build: F)
where
    F: FnMut(VoiceConfig, Arc<SincTable>) -> Box<dyn VoiceEffect>,
{
    let mut group = c.benchmark_group(name);
    let table = Arc::new(SincTable::new());

    for &block_size in BLOCK_SIZES {
        let cfg = VoiceConfig::new(SAMPLE_RATE, block_size);
        let mut pool = DelayLinePool::new();
        let mut engine = build(cfg, Arc::clone(&table));
        engine.init_voice_effect(&mut pool);

        let input = generate_test_signal(block_size);

        group.bench_with_input(
            BenchmarkId::from_parameter(block_size),
            &block_size,
            |b, _| {
                let mut output = vec![0.0; block_size];
                b.iter(|| {
                    engine.process_mono_to_mono(black_box(&input), &mut output, 0.0);
                    black_box(output[0])
                })
            },
        );

        engine.deinit_voice_effect(&mut pool);
    }

    group.finish();
}

fn bench_short_delay(c: &mut Criterion) {
    bench_engine(c, "ShortDelay", |cfg, table| {
        let mut e = ShortDelay::new(cfg, table);
        e.init_voice_effect_params();
        e.set_float_param(2, 0.5); // feedback
        e.set_float_param(3, 0.3); // cross feed
        Box::new(e)
    });
}

fn bench_svf_filter(c: &mut Criterion) {
    bench_engine(c, "SvfFilter", |cfg, _table| {
        let mut e = SvfFilter::new(cfg);
        e.init_voice_effect_params();
        e.set_float_param(2, 0.7); // resonance
        Box::new(e)
    });
}

fn bench_generator_saw_unison(c: &mut Criterion) {
    bench_engine(c, "VaGenerator/saw-unison-9", |cfg, table| {
        let mut e = VaGenerator::new(cfg, table);
        e.init_voice_effect_params();
        e.set_int_param(1, WAVEFORM_SAW);
        e.set_int_param(2, 9);
        e.set_float_param(4, 0.2); // uni detune
        Box::new(e)
    });
}

fn bench_generator_pulse(c: &mut Criterion) {
    bench_engine(c, "VaGenerator/pulse-sync", |cfg, table| {
        let mut e = VaGenerator::new(cfg, table);
        e.init_voice_effect_params();
        e.set_int_param(1, WAVEFORM_PULSE);
        e.set_float_param(2, 7.0); // sync
        Box::new(e)
    });
}

criterion_group!(
    benches,
    bench_short_delay,
    bench_svf_filter,
    bench_generator_saw_unison,
    bench_generator_pulse
);
criterion_main!(benches);

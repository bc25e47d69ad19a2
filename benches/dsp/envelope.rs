//! Benchmarks for ADSR envelope generator.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use saavy_voice::dsp::envelope::{Envelope, EnvelopeConfig};

use crate::BLOCK_SIZES;

const SAMPLE_RATE: f32 = 48_000.0;

pub fn bench_envelope(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/envelope");

    for &size in BLOCK_SIZES {
        let mut buffer = vec![0.0f32; size];

        // Attack phase (ramping up)
        let mut env = Envelope::new(EnvelopeConfig::new(100.0, 100.0, 0.7, 300.0), SAMPLE_RATE);
        env.set_trigger(true);
        group.bench_with_input(BenchmarkId::new("attack", size), &size, |b, _| {
            b.iter(|| {
                env.render(black_box(&mut buffer));
            })
        });

        // Sustain phase (holding steady)
        let mut env = Envelope::new(EnvelopeConfig::new(1.0, 1.0, 0.7, 300.0), SAMPLE_RATE);
        env.set_trigger(true);
        // Advance past attack/decay
        for _ in 0..200 {
            env.next_sample();
        }
        group.bench_with_input(BenchmarkId::new("sustain", size), &size, |b, _| {
            b.iter(|| {
                env.render(black_box(&mut buffer));
            })
        });

        // Release phase (ramping down)
        let mut env = Envelope::new(EnvelopeConfig::new(1.0, 1.0, 0.7, 100.0), SAMPLE_RATE);
        env.set_trigger(true);
        for _ in 0..200 {
            env.next_sample();
        }
        env.set_trigger(false);
        group.bench_with_input(BenchmarkId::new("release", size), &size, |b, _| {
            b.iter(|| {
                env.render(black_box(&mut buffer));
            })
        });
    }

    group.finish();
}

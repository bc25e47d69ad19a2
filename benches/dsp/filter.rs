//! Benchmarks for the windowed-sinc FIR filter.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use saavy_voice::dsp::filter::{FirFilter, DEFAULT_TAP_COUNT};

use crate::BLOCK_SIZES;

const SAMPLE_RATE: f32 = 48_000.0;

pub fn bench_filter(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/filter");

    for &size in BLOCK_SIZES {
        // Generate a test signal (sawtooth-like ramp)
        let input: Vec<f32> = (0..size)
            .map(|i| (i as f32 / size as f32) * 2.0 - 1.0)
            .collect();

        // Convolution cost grows with the tap count
        for taps in [31, DEFAULT_TAP_COUNT, 255] {
            let mut filter = FirFilter::new(taps, SAMPLE_RATE);
            filter.set_cutoff(1_000.0);
            let mut buffer = input.clone();
            let id = format!("lowpass_{taps}");
            group.bench_with_input(BenchmarkId::new(id, size), &size, |b, _| {
                b.iter(|| {
                    buffer.copy_from_slice(&input);
                    filter.render(black_box(&mut buffer));
                })
            });
        }
    }

    // Coefficient redesign, as done on every cutoff change
    let mut filter = FirFilter::new(DEFAULT_TAP_COUNT, SAMPLE_RATE);
    let mut cutoff = 200.0f32;
    group.bench_function("redesign_101", |b| {
        b.iter(|| {
            cutoff = if cutoff > 15_000.0 { 200.0 } else { cutoff * 1.1 };
            filter.set_cutoff(black_box(cutoff));
        })
    });

    group.finish();
}

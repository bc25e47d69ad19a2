//! Benchmarks for a complete voice render.

use std::{hint::black_box, sync::Arc};

use criterion::{BenchmarkId, Criterion};
use saavy_voice::{FilterMode, SynthParams, Voice, VoiceConfig, Waveform};

use crate::BLOCK_SIZES;

pub fn bench_voice(c: &mut Criterion) {
    let mut group = c.benchmark_group("scenarios/voice");

    for &size in BLOCK_SIZES {
        let mut out = vec![vec![0.0f32; size]; 2];

        // === HELD NOTE ===
        // sawtooth → 101-tap low-pass → sustain, stereo fan-out
        let params = SynthParams::shared();
        params.set_waveform(Waveform::Sawtooth);
        let mut voice = Voice::new(VoiceConfig::default(), Arc::clone(&params))
            .expect("default config is valid");
        voice.start_note(45, 0.8);

        group.bench_with_input(BenchmarkId::new("held_lowpass", size), &size, |b, _| {
            b.iter(|| {
                voice.render_next_block(black_box(&mut out), 0, size);
            })
        });

        // === SWEPT CUTOFF ===
        // Cutoff changes every block, forcing a redesign per render call
        let mut voice = Voice::new(
            VoiceConfig::default().with_filter_mode(FilterMode::BandPass),
            Arc::clone(&params),
        )
        .expect("default config is valid");
        voice.start_note(45, 0.8);
        let mut cutoff = 200.0f32;

        group.bench_with_input(BenchmarkId::new("swept_bandpass", size), &size, |b, _| {
            b.iter(|| {
                cutoff = if cutoff > 8_000.0 { 200.0 } else { cutoff * 1.05 };
                params.set_cutoff_low_hz(cutoff);
                voice.render_next_block(black_box(&mut out), 0, size);
            })
        });

        // === IDLE ===
        // Released voices must cost next to nothing
        let mut idle = Voice::new(VoiceConfig::default(), Arc::clone(&params))
            .expect("default config is valid");

        group.bench_with_input(BenchmarkId::new("idle", size), &size, |b, _| {
            b.iter(|| {
                idle.render_next_block(black_box(&mut out), 0, size);
            })
        });
    }

    group.finish();
}

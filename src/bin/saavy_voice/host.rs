//! Minimal headless host: one voice, the default output device, a scripted phrase.

use std::{sync::Arc, thread, time::Duration};

use color_eyre::eyre::{eyre, Result as EyreResult, WrapErr};
use cpal::{
    traits::{DeviceTrait, HostTrait, StreamTrait},
    SampleFormat,
};

use saavy_voice::{
    analysis::{bin_frequency, magnitude_response, to_db},
    io::AudioOutput,
    ParamSource, SynthParams, Voice, VoiceConfig, Waveform, MAX_BLOCK_SIZE,
};

/// C minor arpeggio, two octaves.
const PHRASE: [u8; 8] = [48, 51, 55, 60, 63, 67, 72, 67];
const NOTE_MS: u64 = 350;
const GAP_MS: u64 = 100;
const RESPONSE_FFT_SIZE: usize = 4_096;

pub struct DemoOptions {
    pub cutoff_hz: f32,
    pub waveform: Waveform,
}

impl Default for DemoOptions {
    fn default() -> Self {
        Self {
            cutoff_hz: 2_000.0,
            waveform: Waveform::Sawtooth,
        }
    }
}

pub fn run(options: DemoOptions) -> EyreResult<()> {
    let host = cpal::default_host();
    let device = host
        .default_output_device()
        .ok_or_else(|| eyre!("no default output device available"))?;
    let config = device
        .default_output_config()
        .wrap_err("failed to fetch default output config")?;

    if config.sample_format() != SampleFormat::F32 {
        return Err(eyre!(
            "default output uses {:?} samples, only f32 is supported",
            config.sample_format()
        ));
    }

    let sample_rate = config.sample_rate().0 as f32;
    let channels = config.channels() as usize;

    let params = SynthParams::shared();
    params.set_waveform(options.waveform);
    params.set_cutoff_low_hz(options.cutoff_hz);

    let voice_config = VoiceConfig::default().with_sample_rate(sample_rate);
    let mut voice =
        Voice::new(voice_config, Arc::clone(&params)).wrap_err("invalid voice configuration")?;
    let mut handle = voice.handle();

    println!("=== saavy-voice ===");
    println!("Sample rate: {} Hz", sample_rate);
    println!("Channels: {}", channels);
    println!("Waveform: {}", params.selected_waveform());
    println!(
        "Filter: {} taps, cutoff {:.0} Hz",
        voice.filter().tap_count(),
        voice.filter().cutoff_hz()
    );
    print_response(voice.filter().coefficients(), sample_rate);
    println!();

    let mut scratch = AudioOutput::new(channels, MAX_BLOCK_SIZE);

    let stream = device.build_output_stream(
        &config.into(),
        move |data: &mut [f32], _| {
            let total_frames = data.len() / channels;
            let mut frames_written = 0;

            while frames_written < total_frames {
                let frames = (total_frames - frames_written).min(MAX_BLOCK_SIZE);

                scratch.clear();
                voice.render_next_block(scratch.channels_mut(), 0, frames);

                let offset = frames_written * channels;
                scratch.interleave_into(&mut data[offset..offset + frames * channels], frames);

                frames_written += frames;
            }
        },
        |err| log::error!("audio stream error: {err}"),
        None,
    )?;

    stream.play()?;

    let start = Waveform::ALL
        .iter()
        .position(|&w| w == options.waveform)
        .unwrap_or(0);

    for (round, waveform) in Waveform::ALL.iter().cycle().skip(start).take(4).enumerate() {
        params.set_waveform(*waveform);
        // Open the filter a little further on every round.
        params.set_cutoff_low_hz(options.cutoff_hz * (1.0 + round as f32));
        println!("Playing {} at {:.0} Hz cutoff", waveform, params.cutoff_low_hz());

        for &note in &PHRASE {
            if !handle.start_note(note, 0.8) {
                log::warn!("note queue full, dropped note {note}");
            }
            thread::sleep(Duration::from_millis(NOTE_MS));
            handle.note_off(note, true);
            thread::sleep(Duration::from_millis(GAP_MS));
        }
    }

    // Let the last release ring out.
    thread::sleep(Duration::from_millis(500));
    Ok(())
}

fn print_response(coefficients: &[f32], sample_rate: f32) {
    let response = magnitude_response(coefficients, RESPONSE_FFT_SIZE);

    for hz in [100.0, 500.0, 1_000.0, 2_000.0, 4_000.0, 8_000.0, 16_000.0] {
        if hz >= sample_rate / 2.0 {
            break;
        }
        let bin = (hz * RESPONSE_FFT_SIZE as f32 / sample_rate).round() as usize;
        println!(
            "  {:>7.0} Hz  {:>7.1} dB",
            bin_frequency(bin, RESPONSE_FFT_SIZE, sample_rate),
            to_db(response[bin])
        );
    }
}

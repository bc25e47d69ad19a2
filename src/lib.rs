//! Realtime-safe wavetable voice: oscillator, ADSR envelope and a
//! windowed-sinc FIR low-pass, driven by lock-free parameters.

pub mod analysis; // Filter response inspection (not realtime)
pub mod dsp;
pub mod io;
pub mod synth; // Voice orchestration and note lifecycle

/// Largest block a host should hand to a voice in one call.
pub const MAX_BLOCK_SIZE: usize = 2048;

pub use dsp::{
    envelope::{Envelope, EnvelopeConfig, EnvelopeStage},
    filter::FirFilter,
    oscillator::{Oscillator, Waveform},
};
pub use synth::{
    config::{ConfigError, FilterMode, VoiceConfig},
    params::{ParamSource, SynthParams},
    sound::{Sound, SoundKind},
    voice::{Voice, VoiceState},
};

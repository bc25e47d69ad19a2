//! Low-level DSP primitives used by the voice.
//!
//! These components are allocation-free and realtime-safe once constructed,
//! making them safe to embed directly inside voice structs. They stay focused
//! on the signal-processing math; note lifecycle and parameter polling live in
//! `synth`.

/// Attack/decay/sustain/release envelope generator.
pub mod envelope;
/// Windowed-sinc FIR filter with a circular history.
pub mod filter;
/// Phase-accumulator oscillator waveforms.
pub mod oscillator;

pub use envelope::EnvelopeStage;

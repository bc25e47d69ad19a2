use std::{f32::consts::TAU, fmt, str::FromStr};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use thiserror::Error;

/*
Phase-Accumulator Oscillator
============================

Every waveform here is a function of a single number: the phase, which walks
from 0.0 up to (but never reaching) 1.0 once per cycle and then wraps.

  phase       Position inside the current cycle, in [0.0, 1.0).

  increment   How far the phase moves per sample:

                  increment = frequency / sample_rate

              At 440 Hz and 48 kHz that is 440 / 48000 ≈ 0.00917, so one
              cycle takes 48000 / 440 ≈ 109.1 samples.


The Shapes
----------

All shapes are bipolar and share the same peak (±1.0), so switching waveform
changes the timbre but not the order of magnitude of the level.

    Sine      sin(2π·phase)               pure fundamental
    Square    +1 for phase < 0.5, else -1  odd harmonics, 1/n
    Triangle  sine-aligned folded ramp     odd harmonics, 1/n²
    Sawtooth  2·phase - 1                 all harmonics, 1/n

Square and triangle are aligned with the sine so every shape starts its cycle
at 0 (or the rising edge) and has its positive half first:

    Sine      ╭─╮     Square  ┌──┐      Triangle  ╱╲       Saw  ╱│ ╱│
             ╯   ╰─╯          ┘  └──┘            ╱  ╲╱         ╱ │╱ │

These are naive (non band-limited) shapes. High notes alias; the FIR low-pass
that follows in the voice chain tames most of it.


Sample, Then Advance
--------------------

Each call returns the value at the current phase and only then advances it.
The first sample of a fresh oscillator is therefore the value at phase 0.0,
and sample n of a sine is exactly sin(2π·f·n / sample_rate).

A frequency of zero, a negative frequency or a non-finite one produces
silence and leaves the phase untouched.
*/

/// Waveform families the oscillator can generate.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Waveform {
    #[default]
    Sine,
    Square,
    Triangle,
    Sawtooth,
}

impl Waveform {
    pub const ALL: [Waveform; 4] = [
        Waveform::Sine,
        Waveform::Square,
        Waveform::Triangle,
        Waveform::Sawtooth,
    ];

    /// Stable numeric index, used to store the selection in an atomic.
    pub fn index(self) -> u8 {
        match self {
            Waveform::Sine => 0,
            Waveform::Square => 1,
            Waveform::Triangle => 2,
            Waveform::Sawtooth => 3,
        }
    }

    /// Inverse of [`Waveform::index`]. Unknown indices fall back to sine.
    pub fn from_index(index: u8) -> Self {
        match index {
            1 => Waveform::Square,
            2 => Waveform::Triangle,
            3 => Waveform::Sawtooth,
            _ => Waveform::Sine,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Waveform::Sine => "sine",
            Waveform::Square => "square",
            Waveform::Triangle => "triangle",
            Waveform::Sawtooth => "sawtooth",
        }
    }
}

impl fmt::Display for Waveform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown waveform `{0}` (expected sine, square, triangle or sawtooth)")]
pub struct ParseWaveformError(pub String);

impl FromStr for Waveform {
    type Err = ParseWaveformError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sine" | "sin" => Ok(Waveform::Sine),
            "square" | "sqr" => Ok(Waveform::Square),
            "triangle" | "tri" => Ok(Waveform::Triangle),
            "sawtooth" | "saw" => Ok(Waveform::Sawtooth),
            _ => Err(ParseWaveformError(s.to_string())),
        }
    }
}

/// Phase-accumulating oscillator. One instance per voice; never share it.
#[derive(Debug, Clone)]
pub struct Oscillator {
    phase: f32,
    sample_rate: f32,
}

impl Oscillator {
    pub fn new(sample_rate: f32) -> Self {
        debug_assert!(sample_rate > 0.0, "sample rate must be positive");
        Self {
            phase: 0.0,
            sample_rate,
        }
    }

    /// Produce one sample of `waveform` at `frequency` Hz and advance the phase.
    #[inline]
    pub fn next_sample(&mut self, waveform: Waveform, frequency: f32) -> f32 {
        if !(frequency.is_finite() && frequency > 0.0) {
            return 0.0;
        }

        let phase = self.phase;
        let value = match waveform {
            Waveform::Sine => (TAU * phase).sin(),
            Waveform::Square => {
                if phase < 0.5 {
                    1.0
                } else {
                    -1.0
                }
            }
            Waveform::Triangle => {
                let shifted = (phase + 0.25).fract();
                1.0 - 4.0 * (shifted - 0.5).abs()
            }
            Waveform::Sawtooth => 2.0 * phase - 1.0,
        };

        self.phase += frequency / self.sample_rate;
        self.phase -= self.phase.floor();

        value
    }

    pub fn sine(&mut self, frequency: f32) -> f32 {
        self.next_sample(Waveform::Sine, frequency)
    }

    pub fn square(&mut self, frequency: f32) -> f32 {
        self.next_sample(Waveform::Square, frequency)
    }

    pub fn triangle(&mut self, frequency: f32) -> f32 {
        self.next_sample(Waveform::Triangle, frequency)
    }

    pub fn sawtooth(&mut self, frequency: f32) -> f32 {
        self.next_sample(Waveform::Sawtooth, frequency)
    }

    /// Fill `out` with consecutive samples.
    pub fn render(&mut self, out: &mut [f32], waveform: Waveform, frequency: f32) {
        for sample in out.iter_mut() {
            *sample = self.next_sample(waveform, frequency);
        }
    }

    pub fn phase(&self) -> f32 {
        self.phase
    }

    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    pub fn reset(&mut self) {
        self.phase = 0.0;
    }
}

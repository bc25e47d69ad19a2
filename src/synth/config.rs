#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::dsp::{envelope::EnvelopeConfig, filter::DEFAULT_TAP_COUNT};

/// How the voice's FIR filter uses the two cutoff parameters.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FilterMode {
    /// Low-pass at the lower cutoff. The upper cutoff is ignored.
    #[default]
    LowPass,
    /// Pass the band between the lower and the upper cutoff.
    BandPass,
}

/// Errors reported when a voice configuration cannot be used.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("sample rate must be a positive finite number, got {0}")]
    InvalidSampleRate(f32),

    #[error("tap count must be odd and at least 3, got {0}")]
    InvalidTapCount(usize),

    #[error("{stage} duration must be a non-negative finite number of milliseconds, got {value}")]
    InvalidDuration { stage: &'static str, value: f32 },

    #[error("sustain level must be within 0.0..=1.0, got {0}")]
    InvalidSustain(f32),

    #[error("level scale must be a positive finite number, got {0}")]
    InvalidLevelScale(f32),
}

/// Construction-time settings of a [`Voice`](crate::synth::voice::Voice).
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VoiceConfig {
    pub sample_rate: f32,
    pub tap_count: usize,
    pub envelope: EnvelopeConfig,
    /// Note gain per unit of velocity: `level = velocity * level_scale`.
    pub level_scale: f32,
    pub filter_mode: FilterMode,
    /// Re-read the cutoffs at the start of every block, not only on note start.
    pub track_cutoff: bool,
}

impl Default for VoiceConfig {
    fn default() -> Self {
        Self {
            sample_rate: 48_000.0,
            tap_count: DEFAULT_TAP_COUNT,
            envelope: EnvelopeConfig::default(),
            level_scale: 0.15,
            filter_mode: FilterMode::LowPass,
            track_cutoff: true,
        }
    }
}

impl VoiceConfig {
    pub fn with_sample_rate(mut self, sample_rate: f32) -> Self {
        self.sample_rate = sample_rate;
        self
    }

    pub fn with_tap_count(mut self, tap_count: usize) -> Self {
        self.tap_count = tap_count;
        self
    }

    pub fn with_envelope(mut self, envelope: EnvelopeConfig) -> Self {
        self.envelope = envelope;
        self
    }

    pub fn with_filter_mode(mut self, filter_mode: FilterMode) -> Self {
        self.filter_mode = filter_mode;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.sample_rate.is_finite() && self.sample_rate > 0.0) {
            return Err(ConfigError::InvalidSampleRate(self.sample_rate));
        }

        if self.tap_count < 3 || self.tap_count % 2 == 0 {
            return Err(ConfigError::InvalidTapCount(self.tap_count));
        }

        let EnvelopeConfig {
            attack_ms,
            decay_ms,
            sustain,
            release_ms,
        } = self.envelope;

        let durations = [
            ("attack", attack_ms),
            ("decay", decay_ms),
            ("release", release_ms),
        ];
        for (stage, value) in durations {
            if !(value.is_finite() && value >= 0.0) {
                return Err(ConfigError::InvalidDuration { stage, value });
            }
        }

        if !(0.0..=1.0).contains(&sustain) {
            return Err(ConfigError::InvalidSustain(sustain));
        }

        if !(self.level_scale.is_finite() && self.level_scale > 0.0) {
            return Err(ConfigError::InvalidLevelScale(self.level_scale));
        }

        Ok(())
    }
}

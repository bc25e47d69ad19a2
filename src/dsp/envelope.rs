#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/*
ADSR Envelope Implementation
============================

A linear ADSR envelope driven by a trigger flag rather than explicit note
events. The owner flips the trigger; the envelope notices the change on its
next step and moves to the matching stage.

Vocabulary
----------

  level       The envelope's current output value (0.0 to 1.0). This multiplies
              the audio signal to control its amplitude over time.

  stage       Which phase of the envelope we're in: Idle, Attack, Decay,
              Sustain, or Release.

  trigger     true = note held (run attack/decay/sustain),
              false = note released (run release).

  ramp        The straight line a moving stage follows, from the level at
              stage entry to the stage's target, over a whole number of samples.


The Shape
---------

  Level
    1.0 ┐     ╱╲
        │    ╱  ╲___________
    S   │   ╱               ╲
        │  ╱                 ╲
    0.0 └─╱───────────────────╲──→ Time
        Attack Decay  Sustain  Release


Transitions
-----------

    trigger=1 while Idle or Release  →  Attack (from the CURRENT level)
    level reaches 1.0                →  Decay
    level reaches sustain            →  Sustain
    trigger=0 while Attack/Decay/Sus →  Release (from the CURRENT level)
    level reaches 0.0                →  Idle

Neither retrigger nor release snaps the level anywhere: both ramps start from
wherever the level is, so the output never jumps and never clicks.


Ramps
-----

Every moving stage is a straight line from a snapshot of the level taken when
the stage was entered to the stage's target, over a whole number of samples:

    level = start + (target - start) * elapsed / total

Interpolating from the snapshot (rather than adding an increment every
sample) lands exactly on 1.0, the sustain level and 0.0, with no drift.

    attack   total = (1.0 - start) * attack_samples    fixed rate, 0 → 1 takes attack_ms
    decay    total = decay_samples                     1.0 → sustain
    release  total = release_samples                   fixed time, always release_ms

Every total is at least one sample, so a zero attack jumps to 1.0 on the
first step and a zero decay lands on the sustain level on the next.
*/

/// Shape of an ADSR envelope. Durations in milliseconds, sustain as a level.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnvelopeConfig {
    pub attack_ms: f32,
    pub decay_ms: f32,
    pub sustain: f32,
    pub release_ms: f32,
}

impl EnvelopeConfig {
    pub fn new(attack_ms: f32, decay_ms: f32, sustain: f32, release_ms: f32) -> Self {
        Self {
            attack_ms,
            decay_ms,
            sustain,
            release_ms,
        }
    }
}

impl Default for EnvelopeConfig {
    fn default() -> Self {
        Self {
            attack_ms: 100.0,
            decay_ms: 500.0,
            sustain: 0.8,
            release_ms: 100.0,
        }
    }
}

/// The current stage of the envelope state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvelopeStage {
    Idle,
    Attack,
    Decay,
    Sustain,
    Release,
}

/// Convert a stage duration to a whole number of samples, never less than one.
fn stage_samples(ms: f32, sample_rate: f32) -> f32 {
    let ms = if ms.is_finite() { ms.max(0.0) } else { 0.0 };
    (ms * sample_rate / 1_000.0).round().max(1.0)
}

pub struct Envelope {
    // Shape, fixed at construction
    sustain: f32,
    attack_samples: f32,
    decay_samples: f32,
    release_samples: f32,

    // Runtime state
    trigger: bool,
    stage: EnvelopeStage,
    level: f32,

    // Ramp bookkeeping for the current stage
    ramp_start: f32,
    ramp_target: f32,
    ramp_elapsed: u32,
    ramp_total: u32,
}

impl Envelope {
    pub fn new(config: EnvelopeConfig, sample_rate: f32) -> Self {
        let durations = [config.attack_ms, config.decay_ms, config.release_ms];
        if durations.iter().any(|ms| !ms.is_finite() || *ms < 0.0) {
            log::warn!(
                "envelope durations {durations:?} ms clamped to a minimum of one sample"
            );
        }

        let sustain = if config.sustain.is_finite() {
            config.sustain.clamp(0.0, 1.0)
        } else {
            0.0
        };

        Self {
            sustain,
            attack_samples: stage_samples(config.attack_ms, sample_rate),
            decay_samples: stage_samples(config.decay_ms, sample_rate),
            release_samples: stage_samples(config.release_ms, sample_rate),

            trigger: false,
            stage: EnvelopeStage::Idle,
            level: 0.0,

            ramp_start: 0.0,
            ramp_target: 0.0,
            ramp_elapsed: 0,
            ramp_total: 1,
        }
    }

    /// Set the note-held flag. Takes effect on the next [`Envelope::next_sample`].
    pub fn set_trigger(&mut self, trigger: bool) {
        self.trigger = trigger;
    }

    pub fn trigger(&self) -> bool {
        self.trigger
    }

    /// Advance one sample and return the new level.
    #[inline]
    pub fn next_sample(&mut self) -> f32 {
        self.follow_trigger();

        match self.stage {
            EnvelopeStage::Idle => {
                self.level = 0.0;
            }

            EnvelopeStage::Attack => {
                if self.step_ramp() {
                    self.start_ramp(EnvelopeStage::Decay, self.sustain, self.decay_samples);
                }
            }

            EnvelopeStage::Decay => {
                if self.step_ramp() {
                    self.stage = EnvelopeStage::Sustain;
                }
            }

            EnvelopeStage::Sustain => {
                self.level = self.sustain;
            }

            EnvelopeStage::Release => {
                if self.step_ramp() {
                    self.stage = EnvelopeStage::Idle;
                }
            }
        }

        debug_assert!((0.0..=1.0).contains(&self.level));
        self.level
    }

    /// Advance one sample and scale `input` by the new level.
    #[inline]
    pub fn apply(&mut self, input: f32) -> f32 {
        input * self.next_sample()
    }

    /// Render a block of envelope values into the buffer.
    pub fn render(&mut self, buffer: &mut [f32]) {
        for sample in buffer.iter_mut() {
            *sample = self.next_sample();
        }
    }

    fn follow_trigger(&mut self) {
        match (self.trigger, self.stage) {
            (true, EnvelopeStage::Idle | EnvelopeStage::Release) => {
                let samples = (1.0 - self.level) * self.attack_samples;
                self.start_ramp(EnvelopeStage::Attack, 1.0, samples);
            }
            (
                false,
                EnvelopeStage::Attack | EnvelopeStage::Decay | EnvelopeStage::Sustain,
            ) => {
                if self.level > 0.0 {
                    self.start_ramp(EnvelopeStage::Release, 0.0, self.release_samples);
                } else {
                    self.stage = EnvelopeStage::Idle;
                }
            }
            _ => {}
        }
    }

    fn start_ramp(&mut self, stage: EnvelopeStage, target: f32, samples: f32) {
        self.stage = stage;
        self.ramp_start = self.level;
        self.ramp_target = target;
        self.ramp_elapsed = 0;
        self.ramp_total = samples.round().max(1.0) as u32;
    }

    /// Move one sample along the current ramp. Returns true once the target is hit.
    fn step_ramp(&mut self) -> bool {
        self.ramp_elapsed = self.ramp_elapsed.saturating_add(1);

        if self.ramp_elapsed >= self.ramp_total {
            self.level = self.ramp_target;
            return true;
        }

        let progress = self.ramp_elapsed as f32 / self.ramp_total as f32;
        self.level = (self.ramp_start + (self.ramp_target - self.ramp_start) * progress)
            .clamp(0.0, 1.0);
        false
    }

    /// Returns true if the envelope is producing output (not idle).
    pub fn is_active(&self) -> bool {
        !matches!(self.stage, EnvelopeStage::Idle)
    }

    /// Drop straight to silence and clear the trigger.
    pub fn reset(&mut self) {
        self.trigger = false;
        self.stage = EnvelopeStage::Idle;
        self.level = 0.0;
        self.ramp_elapsed = 0;
        self.ramp_total = 1;
    }

    /// Get the current envelope level (0.0 to 1.0)
    pub fn level(&self) -> f32 {
        self.level
    }

    pub fn stage(&self) -> EnvelopeStage {
        self.stage
    }

    pub fn sustain_level(&self) -> f32 {
        self.sustain
    }
}

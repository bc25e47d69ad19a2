#[cfg(feature = "rtrb")]
use rtrb::Consumer;

#[cfg(feature = "rtrb")]
use crate::synth::message::{voice_queue, VoiceHandle};
use crate::{
    dsp::{
        envelope::{Envelope, EnvelopeStage},
        filter::FirFilter,
        oscillator::Oscillator,
    },
    io::converter::midi_note_to_freq,
    synth::{
        config::{ConfigError, FilterMode, VoiceConfig},
        message::{MessageReceiver, VoiceMessage},
        params::ParamSource,
        sound::{Sound, SoundKind},
    },
};

/*
Voice Signal Path
=================

Once per sample:

    oscillator ──→ FIR filter ──→ × level ──→ × envelope ──→ × master gain ──→ += every channel

  level        velocity × level_scale, fixed for the duration of the note
  envelope     ADSR level, advanced one step per sample
  master gain  linear gain polled from the parameter source

The result is ADDED into the output buffer, never written over it, so any
number of voices can render into the same block.


Note Lifecycle
--------------

    ┌──────┐  start_note   ┌──────────┐  stop_note(tail off)  ┌───────────┐
    │ Idle │ ────────────→ │ Sounding │ ────────────────────→ │ Releasing │
    └──────┘               └──────────┘                       └───────────┘
       ↑  ↑                     │        start_note (retrigger)     │  │
       │  │                     ↑ ←─────────────────────────────────┘  │
       │  └─ stop_note(hard cut) from anywhere                         │
       └──────────────── envelope below SILENCE_THRESHOLD ─────────────┘

A hard cut (`stop_note(false)`) drops the envelope and the filter history on
the spot and frees the voice synchronously.


Parameters
----------

Waveform and gain are polled every sample. The cutoffs are applied on every
note start and, when `track_cutoff` is set, re-checked at the start of every
block; the taps are only redesigned when the relevant cutoff changed.
*/

/// Envelope level below which a released voice counts as silent.
pub const SILENCE_THRESHOLD: f32 = 1.0e-4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoiceState {
    Idle,      // Not assigned to a note, renders nothing
    Sounding,  // Note held, envelope in attack/decay/sustain
    Releasing, // Note released, envelope in release
}

/// A single synthesizer voice: oscillator, envelope and FIR filter owned
/// exclusively, parameters polled from `P`.
pub struct Voice<P: ParamSource> {
    params: P,
    oscillator: Oscillator,
    envelope: Envelope,
    filter: FirFilter,

    filter_mode: FilterMode,
    track_cutoff: bool,
    level_scale: f32,
    // Raw cutoff parameters the filter was last designed from
    applied_cutoffs: (f32, f32),

    state: VoiceState,
    note: Option<u8>,
    frequency: f32,
    level: f32,
    envelope_level: f32,

    #[cfg(feature = "rtrb")]
    rx: Option<Consumer<VoiceMessage>>,
}

impl<P: ParamSource> Voice<P> {
    /// Build a voice. All allocation happens here.
    pub fn new(config: VoiceConfig, params: P) -> Result<Self, ConfigError> {
        config.validate()?;

        log::debug!(
            "voice: {} Hz, {} taps, {:?} filter, envelope {:?}",
            config.sample_rate,
            config.tap_count,
            config.filter_mode,
            config.envelope
        );

        let mut voice = Self {
            params,
            oscillator: Oscillator::new(config.sample_rate),
            envelope: Envelope::new(config.envelope, config.sample_rate),
            filter: FirFilter::new(config.tap_count, config.sample_rate),

            filter_mode: config.filter_mode,
            track_cutoff: config.track_cutoff,
            level_scale: config.level_scale,
            applied_cutoffs: (f32::NAN, f32::NAN),

            state: VoiceState::Idle,
            note: None,
            frequency: 0.0,
            level: 0.0,
            envelope_level: 0.0,

            #[cfg(feature = "rtrb")]
            rx: None,
        };
        voice.refresh_filter(true);

        Ok(voice)
    }

    /// Whether this voice is able to play `sound`.
    pub fn can_play_sound(&self, sound: &Sound) -> bool {
        matches!(sound.kind(), SoundKind::Wavetable)
    }

    /// Start (or retrigger) a note. `velocity` is expected in 0.0..=1.0.
    pub fn start_note(&mut self, note: u8, velocity: f32) {
        let velocity = if velocity.is_finite() {
            velocity.clamp(0.0, 1.0)
        } else {
            0.0
        };

        self.note = Some(note);
        self.frequency = midi_note_to_freq(note);
        self.level = velocity * self.level_scale;
        self.refresh_filter(true);

        self.envelope.set_trigger(true);
        self.state = VoiceState::Sounding;
    }

    /// Release the note. With `allow_tail_off` the envelope runs its release
    /// stage; without it the voice is silenced and freed immediately.
    pub fn stop_note(&mut self, allow_tail_off: bool) {
        self.envelope.set_trigger(false);

        if !allow_tail_off {
            self.clear_current_note();
        } else if self.state == VoiceState::Sounding {
            self.state = VoiceState::Releasing;
        }
    }

    /// Free the voice right now, bypassing any release.
    pub fn clear_current_note(&mut self) {
        self.envelope.reset();
        self.filter.reset();
        self.envelope_level = 0.0;
        self.note = None;
        self.state = VoiceState::Idle;
    }

    /// Apply one note event. A keyed stop for a note other than the current
    /// one is stale and ignored.
    pub fn handle_message(&mut self, message: VoiceMessage) {
        match message {
            VoiceMessage::StartNote { note, velocity } => self.start_note(note, velocity),
            VoiceMessage::StopNote {
                note: Some(note),
                ..
            } if self.note != Some(note) => {}
            VoiceMessage::StopNote { allow_tail_off, .. } => self.stop_note(allow_tail_off),
        }
    }

    /// Apply every pending message from `rx`.
    pub fn drain_messages<R: MessageReceiver>(&mut self, rx: &mut R) {
        while let Some(message) = rx.pop() {
            self.handle_message(message);
        }
    }

    /// Attach a fresh note queue to this voice and return its sending side.
    ///
    /// Queued events are applied at the start of the next
    /// [`Voice::render_next_block`]. Replaces any previously attached queue.
    #[cfg(feature = "rtrb")]
    pub fn handle(&mut self) -> VoiceHandle {
        let (handle, rx) = voice_queue();
        self.rx = Some(rx);
        handle
    }

    #[cfg(feature = "rtrb")]
    fn drain_queue(&mut self) {
        if let Some(mut rx) = self.rx.take() {
            self.drain_messages(&mut rx);
            self.rx = Some(rx);
        }
    }

    /// Add `num_samples` samples into every channel of `output`, starting at
    /// `start_sample`. Realtime-safe: no allocation, no locks.
    pub fn render_next_block<B: AsMut<[f32]>>(
        &mut self,
        output: &mut [B],
        start_sample: usize,
        num_samples: usize,
    ) {
        #[cfg(feature = "rtrb")]
        self.drain_queue();

        // A note released before it ever rendered is already silent.
        if self.is_silent() {
            if self.state != VoiceState::Idle {
                self.clear_current_note();
            }
            return;
        }

        if self.track_cutoff {
            self.refresh_filter(false);
        }

        for position in start_sample..start_sample + num_samples {
            self.envelope_level = self.envelope.next_sample();

            let waveform = self.params.selected_waveform();
            let raw = self.oscillator.next_sample(waveform, self.frequency);
            let filtered = self.filter.process_sample(raw);

            let gain = self.params.gain_linear();
            let gain = if gain.is_finite() { gain } else { 0.0 };
            let sample = filtered * self.level * self.envelope_level * gain;
            debug_assert!(sample.is_finite());

            for channel in output.iter_mut() {
                if let Some(slot) = channel.as_mut().get_mut(position) {
                    *slot += sample;
                }
            }

            if self.is_silent() {
                self.clear_current_note();
                break;
            }
        }
    }

    /// Released and quiet enough to stop rendering.
    fn is_silent(&self) -> bool {
        !self.envelope.trigger() && self.envelope_level < SILENCE_THRESHOLD
    }

    fn refresh_filter(&mut self, force: bool) {
        let low = self.params.cutoff_low_hz();
        let high = self.params.cutoff_high_hz();

        let changed = match self.filter_mode {
            FilterMode::LowPass => low != self.applied_cutoffs.0,
            FilterMode::BandPass => (low, high) != self.applied_cutoffs,
        };
        if !force && !changed {
            return;
        }

        match self.filter_mode {
            FilterMode::LowPass => self.filter.set_cutoff(low),
            FilterMode::BandPass => self.filter.set_band(low, high),
        }
        self.applied_cutoffs = (low, high);
    }

    pub fn is_active(&self) -> bool {
        self.state != VoiceState::Idle
    }

    pub fn state(&self) -> VoiceState {
        self.state
    }

    pub fn current_note(&self) -> Option<u8> {
        self.note
    }

    pub fn frequency(&self) -> f32 {
        self.frequency
    }

    /// Note gain derived from velocity.
    pub fn level(&self) -> f32 {
        self.level
    }

    pub fn envelope_level(&self) -> f32 {
        self.envelope_level
    }

    pub fn envelope_stage(&self) -> EnvelopeStage {
        self.envelope.stage()
    }

    pub fn filter(&self) -> &FirFilter {
        &self.filter
    }

    pub fn params(&self) -> &P {
        &self.params
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::{
        dsp::{envelope::EnvelopeConfig, filter::FirResponse, oscillator::Waveform},
        io::{converter::midi_to_voice_message, midi::MidiEvent},
        synth::params::SynthParams,
    };

    const BLOCK: usize = 256;

    fn voice_with(config: VoiceConfig) -> (Voice<Arc<SynthParams>>, Arc<SynthParams>) {
        let params = SynthParams::shared();
        let voice = Voice::new(config, Arc::clone(&params)).unwrap();
        (voice, params)
    }

    fn render(voice: &mut Voice<Arc<SynthParams>>, frames: usize) -> Vec<Vec<f32>> {
        let mut out = vec![vec![0.0f32; frames]; 2];
        voice.render_next_block(&mut out, 0, frames);
        out
    }

    #[test]
    fn rejects_invalid_config() {
        let config = VoiceConfig::default().with_tap_count(2);
        let result = Voice::new(config, SynthParams::shared());

        assert!(matches!(result, Err(ConfigError::InvalidTapCount(2))));
    }

    #[test]
    fn untriggered_voice_is_silent() {
        let (mut voice, _) = voice_with(VoiceConfig::default());

        for _ in 0..16 {
            let out = render(&mut voice, BLOCK);
            assert!(out.iter().flatten().all(|&s| s == 0.0));
        }
        assert_eq!(voice.state(), VoiceState::Idle);
    }

    #[test]
    fn start_note_sets_pitch_level_and_state() {
        let (mut voice, _) = voice_with(VoiceConfig::default());
        voice.start_note(69, 0.5);

        assert_eq!(voice.state(), VoiceState::Sounding);
        assert_eq!(voice.current_note(), Some(69));
        assert!((voice.frequency() - 440.0).abs() < 1e-3);
        assert!((voice.level() - 0.075).abs() < 1e-6);
    }

    #[test]
    fn renders_identical_signal_into_every_channel() {
        let (mut voice, _) = voice_with(VoiceConfig::default());
        voice.start_note(60, 1.0);

        let out = render(&mut voice, 4_096);

        assert!(out[0].iter().any(|&s| s.abs() > 1e-4));
        assert!(out[0].iter().all(|s| s.is_finite()));
        assert_eq!(out[0], out[1]);
    }

    #[test]
    fn output_is_accumulated_not_overwritten() {
        let (mut a, _) = voice_with(VoiceConfig::default());
        let (mut b, _) = voice_with(VoiceConfig::default());
        a.start_note(64, 0.8);
        b.start_note(64, 0.8);

        let reference = render(&mut a, BLOCK);

        let mut out = vec![vec![1.0f32; BLOCK]; 2];
        b.render_next_block(&mut out, 0, BLOCK);

        for (got, expected) in out[0].iter().zip(&reference[0]) {
            assert!((got - (1.0 + expected)).abs() < 1e-6);
        }
    }

    #[test]
    fn renders_only_the_requested_window() {
        let (mut voice, _) = voice_with(
            VoiceConfig::default().with_envelope(EnvelopeConfig::new(0.0, 0.0, 1.0, 10.0)),
        );
        voice.start_note(69, 1.0);

        let mut out = vec![vec![0.0f32; BLOCK]; 1];
        voice.render_next_block(&mut out, 64, 32);

        assert!(out[0][..64].iter().all(|&s| s == 0.0));
        assert!(out[0][64..96].iter().any(|&s| s != 0.0));
        assert!(out[0][96..].iter().all(|&s| s == 0.0));
    }

    #[test]
    fn hard_cut_frees_voice_immediately() {
        let (mut voice, _) = voice_with(VoiceConfig::default());
        voice.start_note(60, 1.0);
        render(&mut voice, BLOCK);

        voice.stop_note(false);

        assert_eq!(voice.state(), VoiceState::Idle);
        assert_eq!(voice.current_note(), None);
        assert_eq!(voice.envelope_level(), 0.0);
        let out = render(&mut voice, BLOCK);
        assert!(out.iter().flatten().all(|&s| s == 0.0));
    }

    #[test]
    fn tail_off_releases_then_frees() {
        let config = VoiceConfig::default().with_envelope(EnvelopeConfig::new(1.0, 1.0, 0.8, 10.0));
        let (mut voice, _) = voice_with(config);
        voice.start_note(60, 1.0);
        render(&mut voice, BLOCK);

        voice.stop_note(true);
        assert_eq!(voice.state(), VoiceState::Releasing);

        // 10 ms at 48 kHz = 480 samples of release.
        let out = render(&mut voice, 1_024);
        assert_eq!(voice.state(), VoiceState::Idle);
        assert!(out[0][..BLOCK].iter().any(|&s| s != 0.0));
        assert!(out[0][600..].iter().all(|&s| s == 0.0));

        let out = render(&mut voice, BLOCK);
        assert!(out.iter().flatten().all(|&s| s == 0.0));
    }

    #[test]
    fn retrigger_while_releasing_resumes_sounding() {
        let (mut voice, _) = voice_with(VoiceConfig::default());
        voice.start_note(60, 1.0);
        render(&mut voice, BLOCK);
        voice.stop_note(true);
        render(&mut voice, 16);
        let released = voice.envelope_level();

        voice.start_note(62, 1.0);
        render(&mut voice, 1);

        assert_eq!(voice.state(), VoiceState::Sounding);
        assert_eq!(voice.envelope_stage(), EnvelopeStage::Attack);
        assert!(voice.envelope_level() > released);
    }

    #[test]
    fn zero_attack_reaches_sustain_right_after_decay() {
        let config = VoiceConfig::default().with_envelope(EnvelopeConfig::new(0.0, 0.0, 0.6, 50.0));
        let (mut voice, _) = voice_with(config);
        voice.start_note(60, 1.0);

        render(&mut voice, 1);
        assert_eq!(voice.envelope_level(), 1.0);
        render(&mut voice, 1);
        assert_eq!(voice.envelope_level(), 0.6);
        assert_eq!(voice.envelope_stage(), EnvelopeStage::Sustain);
    }

    #[test]
    fn cutoff_is_refreshed_on_note_start() {
        let config = VoiceConfig {
            track_cutoff: false,
            ..VoiceConfig::default()
        };
        let (mut voice, params) = voice_with(config);

        params.set_cutoff_low_hz(2_500.0);
        render(&mut voice, BLOCK);
        assert_eq!(voice.filter().cutoff_hz(), 1_000.0);

        voice.start_note(60, 1.0);
        assert_eq!(voice.filter().cutoff_hz(), 2_500.0);

        params.set_cutoff_low_hz(400.0);
        render(&mut voice, BLOCK);
        assert_eq!(voice.filter().cutoff_hz(), 2_500.0, "tracking disabled");
    }

    #[test]
    fn cutoff_tracks_parameter_per_block() {
        let (mut voice, params) = voice_with(VoiceConfig::default());
        voice.start_note(60, 1.0);

        params.set_cutoff_low_hz(3_000.0);
        render(&mut voice, BLOCK);
        assert_eq!(voice.filter().cutoff_hz(), 3_000.0);
    }

    #[test]
    fn band_pass_mode_uses_both_cutoffs() {
        let (mut voice, params) =
            voice_with(VoiceConfig::default().with_filter_mode(FilterMode::BandPass));
        params.set_cutoff_low_hz(500.0);
        params.set_cutoff_high_hz(5_000.0);

        voice.start_note(60, 1.0);

        assert_eq!(
            voice.filter().response(),
            FirResponse::BandPass {
                low_hz: 500.0,
                high_hz: 5_000.0
            }
        );
    }

    #[test]
    fn gain_and_waveform_are_polled_while_rendering() {
        let (mut quiet, quiet_params) = voice_with(VoiceConfig::default());
        let (mut loud, loud_params) = voice_with(VoiceConfig::default());
        quiet_params.set_waveform(Waveform::Sawtooth);
        loud_params.set_waveform(Waveform::Sawtooth);
        loud_params.set_gain_db(6.0);

        quiet.start_note(57, 1.0);
        loud.start_note(57, 1.0);
        let q = render(&mut quiet, 2_048);
        let l = render(&mut loud, 2_048);

        let ratio = loud_params.gain_linear();
        for (a, b) in q[0].iter().zip(&l[0]) {
            assert!((b - a * ratio).abs() < 1e-5);
        }
    }

    #[test]
    fn plays_wavetable_sounds() {
        let (voice, _) = voice_with(VoiceConfig::default());

        assert!(voice.can_play_sound(&Sound::wavetable()));
    }

    #[cfg(feature = "rtrb")]
    #[test]
    fn queued_messages_apply_on_next_block() {
        let (mut voice, _) = voice_with(VoiceConfig::default());
        let mut handle = voice.handle();

        handle.start_note(72, 1.0);
        assert_eq!(voice.state(), VoiceState::Idle);

        let out = render(&mut voice, BLOCK);
        assert_eq!(voice.current_note(), Some(72));
        assert!(out[0].iter().any(|&s| s != 0.0));

        handle.stop_note(false);
        render(&mut voice, BLOCK);
        assert_eq!(voice.state(), VoiceState::Idle);
    }

    #[cfg(feature = "rtrb")]
    #[test]
    fn note_released_before_rendering_frees_the_voice() {
        let (mut voice, _) = voice_with(VoiceConfig::default());
        let mut handle = voice.handle();

        handle.start_note(60, 1.0);
        handle.stop_note(true);

        let out = render(&mut voice, BLOCK);
        assert_eq!(voice.state(), VoiceState::Idle);
        assert_eq!(voice.current_note(), None);
        assert!(!voice.is_active());
        assert!(out.iter().flatten().all(|&s| s == 0.0));
    }

    #[test]
    fn start_then_tail_off_without_render_goes_idle() {
        let (mut voice, _) = voice_with(VoiceConfig::default());
        voice.start_note(60, 1.0);
        voice.stop_note(true);
        assert_eq!(voice.state(), VoiceState::Releasing);

        render(&mut voice, BLOCK);
        assert_eq!(voice.state(), VoiceState::Idle);
        assert_eq!(voice.current_note(), None);
    }

    #[test]
    fn stale_note_off_keeps_the_new_note_sounding() {
        let (mut voice, _) = voice_with(VoiceConfig::default());
        let events: [[u8; 3]; 3] = [[0x90, 60, 100], [0x90, 64, 100], [0x80, 60, 0]];

        for bytes in events {
            let event = MidiEvent::from_bytes(&bytes).unwrap();
            if let Some(message) = midi_to_voice_message(event, 0) {
                voice.handle_message(message);
            }
        }
        render(&mut voice, BLOCK);

        assert_eq!(voice.current_note(), Some(64));
        assert_eq!(voice.state(), VoiceState::Sounding);

        let off = MidiEvent::from_bytes(&[0x80, 64, 0]).unwrap();
        voice.handle_message(midi_to_voice_message(off, 0).unwrap());
        assert_eq!(voice.state(), VoiceState::Releasing);
    }

    #[test]
    fn unkeyed_stop_releases_any_note() {
        let (mut voice, _) = voice_with(VoiceConfig::default());
        voice.start_note(67, 1.0);

        voice.handle_message(VoiceMessage::StopNote {
            note: None,
            allow_tail_off: true,
        });
        assert_eq!(voice.state(), VoiceState::Releasing);
    }
}

use std::ops::RangeInclusive;

/// What kind of voice a sound needs.
///
/// Voices match on this tag instead of inspecting concrete types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundKind {
    /// Oscillator → envelope → FIR filter voice.
    Wavetable,
}

/// Describes a playable sound: which voices can play it and where it applies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sound {
    kind: SoundKind,
    notes: RangeInclusive<u8>,
    channel: Option<u8>,
}

impl Sound {
    /// A wavetable sound covering every note on every MIDI channel.
    pub fn wavetable() -> Self {
        Self {
            kind: SoundKind::Wavetable,
            notes: 0..=127,
            channel: None,
        }
    }

    /// Restrict the sound to a key range.
    pub fn with_notes(mut self, notes: RangeInclusive<u8>) -> Self {
        self.notes = notes;
        self
    }

    /// Restrict the sound to a single MIDI channel (0-15).
    pub fn with_channel(mut self, channel: u8) -> Self {
        self.channel = Some(channel);
        self
    }

    pub fn kind(&self) -> SoundKind {
        self.kind
    }

    pub fn applies_to_note(&self, note: u8) -> bool {
        self.notes.contains(&note)
    }

    pub fn applies_to_channel(&self, channel: u8) -> bool {
        self.channel.map_or(true, |c| c == channel)
    }
}

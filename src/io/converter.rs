use crate::{io::midi::MidiEvent, synth::message::VoiceMessage};

/// Translate a MIDI event on `channel_filter` into a voice message.
///
/// Note-on with velocity 0 is a note-off, per the MIDI running-status idiom.
/// Note-offs carry their key and always allow the release tail.
pub fn midi_to_voice_message(midi: MidiEvent, channel_filter: u8) -> Option<VoiceMessage> {
    match midi {
        MidiEvent::NoteOn {
            channel,
            key,
            velocity,
        } if channel == channel_filter => {
            if velocity == 0 {
                Some(VoiceMessage::StopNote {
                    note: Some(key),
                    allow_tail_off: true,
                })
            } else {
                Some(VoiceMessage::StartNote {
                    note: key,
                    velocity: velocity_to_unit(velocity),
                })
            }
        }
        MidiEvent::NoteOff { channel, key, .. } if channel == channel_filter => {
            Some(VoiceMessage::StopNote {
                note: Some(key),
                allow_tail_off: true,
            })
        }
        _ => None,
    }
}

/// Map a 7-bit MIDI velocity onto 0.0..=1.0.
#[inline]
pub fn velocity_to_unit(velocity: u8) -> f32 {
    velocity.min(127) as f32 / 127.0
}

/// Convert MIDI note number to frequency in Hz.
/// A4 = 440 Hz = MIDI note 69
#[inline]
pub fn midi_note_to_freq(note: u8) -> f32 {
    440.0 * 2.0_f32.powf((note as f32 - 69.0) / 12.0)
}

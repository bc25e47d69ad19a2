#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MidiEvent {
    NoteOn { channel: u8, key: u8, velocity: u8 },
    NoteOff { channel: u8, key: u8, velocity: u8 },
    ControlChange { channel: u8, controller: u8, value: u8 },
    PitchBend { channel: u8, value: i16 },
    ProgramChange { channel: u8, program: u8 },
}

impl MidiEvent {
    /// Decode a raw channel-voice message. Returns `None` for anything else.
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        let (&status, data) = bytes.split_first()?;
        let channel = status & 0x0F;

        match (status & 0xF0, data) {
            (0x80, &[key, velocity, ..]) => Some(MidiEvent::NoteOff {
                channel,
                key: key & 0x7F,
                velocity: velocity & 0x7F,
            }),
            (0x90, &[key, velocity, ..]) => Some(MidiEvent::NoteOn {
                channel,
                key: key & 0x7F,
                velocity: velocity & 0x7F,
            }),
            (0xB0, &[controller, value, ..]) => Some(MidiEvent::ControlChange {
                channel,
                controller: controller & 0x7F,
                value: value & 0x7F,
            }),
            (0xC0, &[program, ..]) => Some(MidiEvent::ProgramChange {
                channel,
                program: program & 0x7F,
            }),
            (0xE0, &[lsb, msb, ..]) => {
                let raw = ((msb as i16 & 0x7F) << 7) | (lsb as i16 & 0x7F);
                Some(MidiEvent::PitchBend {
                    channel,
                    value: raw - 8_192,
                })
            }
            _ => None,
        }
    }
}

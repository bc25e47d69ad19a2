#[cfg(feature = "rtrb")]
use rtrb::{Consumer, Producer, RingBuffer};

/// Note events delivered to a voice from outside the audio thread.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum VoiceMessage {
    StartNote {
        note: u8,
        velocity: f32,
    },
    /// Release the sounding note. A keyed stop only applies while that key
    /// is the voice's current note; `note: None` releases whatever is playing.
    StopNote {
        note: Option<u8>,
        allow_tail_off: bool,
    },
}

pub trait MessageReceiver {
    fn pop(&mut self) -> Option<VoiceMessage>;
}

#[cfg(feature = "rtrb")]
impl MessageReceiver for Consumer<VoiceMessage> {
    fn pop(&mut self) -> Option<VoiceMessage> {
        Consumer::pop(self).ok()
    }
}

/// Capacity of the queue between a [`VoiceHandle`] and its voice.
pub const VOICE_QUEUE_SIZE: usize = 64;

/// Control-thread side of a voice's note queue.
///
/// Pushing never blocks. When the queue is full the event is dropped and the
/// call returns `false`.
#[cfg(feature = "rtrb")]
pub struct VoiceHandle {
    tx: Producer<VoiceMessage>,
}

#[cfg(feature = "rtrb")]
impl VoiceHandle {
    pub fn send(&mut self, message: VoiceMessage) -> bool {
        self.tx.push(message).is_ok()
    }

    pub fn start_note(&mut self, note: u8, velocity: f32) -> bool {
        self.send(VoiceMessage::StartNote { note, velocity })
    }

    pub fn stop_note(&mut self, allow_tail_off: bool) -> bool {
        self.send(VoiceMessage::StopNote {
            note: None,
            allow_tail_off,
        })
    }

    /// Release `note` only if it is still the one sounding.
    pub fn note_off(&mut self, note: u8, allow_tail_off: bool) -> bool {
        self.send(VoiceMessage::StopNote {
            note: Some(note),
            allow_tail_off,
        })
    }
}

/// Create a connected handle / receiver pair.
#[cfg(feature = "rtrb")]
pub fn voice_queue() -> (VoiceHandle, Consumer<VoiceMessage>) {
    let (tx, rx) = RingBuffer::<VoiceMessage>::new(VOICE_QUEUE_SIZE);
    (VoiceHandle { tx }, rx)
}

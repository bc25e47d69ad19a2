// Purpose - external interfaces, format conversions

pub mod converter;
pub mod midi;

/// Caller-owned multi-channel block that voices add into.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct AudioOutput {
    pub buffers: Vec<Vec<f32>>,
}

impl AudioOutput {
    pub fn new(channels: usize, frames: usize) -> Self {
        Self {
            buffers: vec![vec![0.0; frames]; channels],
        }
    }

    pub fn num_channels(&self) -> usize {
        self.buffers.len()
    }

    pub fn num_frames(&self) -> usize {
        self.buffers.first().map_or(0, Vec::len)
    }

    pub fn channels_mut(&mut self) -> &mut [Vec<f32>] {
        &mut self.buffers
    }

    pub fn clear(&mut self) {
        for channel in &mut self.buffers {
            channel.fill(0.0);
        }
    }

    /// Interleave the first `frames` frames into `out` (`frames * channels` long).
    pub fn interleave_into(&self, out: &mut [f32], frames: usize) {
        let channels = self.num_channels();
        for (frame, chunk) in out.chunks_mut(channels).take(frames).enumerate() {
            for (slot, channel) in chunk.iter_mut().zip(&self.buffers) {
                *slot = channel[frame];
            }
        }
    }

    pub fn peak(&self) -> f32 {
        self.buffers
            .iter()
            .flatten()
            .fold(0.0f32, |acc, &s| acc.max(s.abs()))
    }
}

//! Audio-callback side of the synth: turns queued voices into sound
//! instances and sums them into the output buffer.

use crossbeam_channel::Receiver;

use super::synth::SoundInstance;
use super::voice::Voice;

const INITIAL_CAPACITY: usize = 64;

pub struct Mixer {
    sample_rate: f32,
    incoming: Receiver<Voice>,
    active: Vec<SoundInstance>,
}

impl Mixer {
    pub fn new(sample_rate: f32, incoming: Receiver<Voice>) -> Self {
        Self {
            sample_rate,
            incoming,
            active: Vec::with_capacity(INITIAL_CAPACITY),
        }
    }

    /// Number of sounds still decaying.
    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    /// Fill an interleaved buffer. Every channel of a frame gets the same
    /// mono sample.
    pub fn render(&mut self, data: &mut [f32], channels: usize) {
        for voice in self.incoming.try_iter() {
            self.active.push(SoundInstance::new(&voice, self.sample_rate));
        }

        for frame in data.chunks_mut(channels.max(1)) {
            let sum: f32 = self.active.iter_mut().map(SoundInstance::next_sample).sum();
            frame.fill(sum.clamp(-1.0, 1.0));
        }

        self.active.retain(|instance| !instance.is_finished());
    }
}

//! Per-sample building blocks: sine oscillator, exponential ramp, and the
//! sound instance that chains them (oscillator -> gain -> output).

use std::f32::consts::TAU;

use super::voice::{Voice, GAIN_FLOOR};

/// Sine oscillator driven by a phase accumulator in [0, 1).
#[derive(Debug, Clone, Default)]
pub struct Oscillator {
    phase: f32,
}

impl Oscillator {
    pub fn new() -> Self {
        Self { phase: 0.0 }
    }

    /// Output one sample at `frequency` and advance the phase.
    pub fn next_sample(&mut self, frequency: f32, sample_rate: f32) -> f32 {
        let sample = (self.phase * TAU).sin();
        self.phase += frequency / sample_rate;
        if self.phase >= 1.0 {
            self.phase -= self.phase.floor();
        }
        sample
    }
}

/// Exponential ramp `start * (end / start)^(t / T)` over `length` samples,
/// holding `end` once the ramp is over.
#[derive(Debug, Clone)]
pub struct ExpRamp {
    start: f32,
    end: f32,
    length: usize,
    position: usize,
}

impl ExpRamp {
    pub fn new(start: f32, end: f32, seconds: f32, sample_rate: f32) -> Self {
        Self {
            start,
            end,
            length: seconds_to_samples(seconds, sample_rate),
            position: 0,
        }
    }

    pub fn value(&self) -> f32 {
        if self.position >= self.length {
            return self.end;
        }
        // Exponential curves are undefined through zero.
        if self.start <= 0.0 || self.end <= 0.0 {
            return self.start;
        }
        let t = self.position as f32 / self.length as f32;
        self.start * (self.end / self.start).powf(t)
    }

    pub fn next_value(&mut self) -> f32 {
        let value = self.value();
        if self.position < self.length {
            self.position += 1;
        }
        value
    }
}

/// One triggered sound. Starts immediately and stops by itself after the
/// voice's duration; every trigger gets its own instance.
#[derive(Debug, Clone)]
pub struct SoundInstance {
    oscillator: Oscillator,
    frequency: f32,
    pitch: Option<ExpRamp>,
    gain: ExpRamp,
    remaining: usize,
    sample_rate: f32,
}

impl SoundInstance {
    pub fn new(voice: &Voice, sample_rate: f32) -> Self {
        let duration = voice.duration();
        let pitch = voice
            .pitch_target()
            .map(|target| ExpRamp::new(voice.frequency(), target, duration, sample_rate));

        Self {
            oscillator: Oscillator::new(),
            frequency: voice.frequency(),
            pitch,
            gain: ExpRamp::new(voice.volume(), GAIN_FLOOR, duration, sample_rate),
            remaining: seconds_to_samples(duration, sample_rate),
            sample_rate,
        }
    }

    pub fn is_finished(&self) -> bool {
        self.remaining == 0
    }

    pub fn next_sample(&mut self) -> f32 {
        if self.is_finished() {
            return 0.0;
        }
        self.remaining -= 1;

        let frequency = match self.pitch.as_mut() {
            Some(ramp) => ramp.next_value(),
            None => self.frequency,
        };
        let tone = self.oscillator.next_sample(frequency, self.sample_rate);
        tone * self.gain.next_value()
    }
}

fn seconds_to_samples(seconds: f32, sample_rate: f32) -> usize {
    (seconds.max(0.0) * sample_rate).round() as usize
}

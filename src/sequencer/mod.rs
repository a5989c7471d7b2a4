//! Core sequencer logic - grid state and step management
//!
//! Track count and step count are fixed once the sequencer is built; only
//! the on/off pattern, the playhead and the paused flag change afterwards.

use std::sync::{Arc, Mutex, MutexGuard};

use crate::audio::{Synth, Voice};
use crate::render::Color;

pub mod clock;

/// One instrument row: its on/off pattern, display color and voice.
#[derive(Debug, Clone, PartialEq)]
pub struct Track {
    steps: Vec<bool>,
    color: Color,
    voice: Voice,
}

impl Track {
    /// A track of `step_count` steps, all off.
    pub fn new(step_count: usize, color: Color, voice: Voice) -> Self {
        Self {
            steps: vec![false; step_count],
            color,
            voice,
        }
    }

    pub fn steps(&self) -> &[bool] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn color(&self) -> Color {
        self.color
    }

    pub fn voice(&self) -> &Voice {
        &self.voice
    }

    pub fn get(&self, step: usize) -> bool {
        self.steps.get(step).copied().unwrap_or(false)
    }

    pub fn set(&mut self, step: usize, value: bool) {
        if let Some(cell) = self.steps.get_mut(step) {
            *cell = value;
        }
    }

    pub fn toggle(&mut self, step: usize) {
        let current = self.get(step);
        self.set(step, !current);
    }

    pub fn clear(&mut self) {
        for cell in &mut self.steps {
            *cell = false;
        }
    }

    /// Start one sound instance of this track's voice.
    pub fn play(&self, synth: &mut impl Synth) {
        synth.trigger(&self.voice);
    }
}

/// State shared between the clock thread, the click handler and the draw
/// loop.
pub type SharedSequencer = Arc<Mutex<Sequencer>>;

#[derive(Debug, Clone)]
pub struct Sequencer {
    step_count: usize,
    tracks: Vec<Track>,
    current_step: usize,
    paused: bool,
}

impl Sequencer {
    /// Build one track per `(color, voice)` entry, in order. Every track
    /// gets exactly `step_count` steps, all off; playback starts running
    /// at step 0.
    pub fn new(step_count: usize, kit: impl IntoIterator<Item = (Color, Voice)>) -> Self {
        let tracks = kit
            .into_iter()
            .map(|(color, voice)| Track::new(step_count, color, voice))
            .collect();

        Self {
            step_count,
            tracks,
            current_step: 0,
            paused: false,
        }
    }

    pub fn into_shared(self) -> SharedSequencer {
        Arc::new(Mutex::new(self))
    }

    pub fn step_count(&self) -> usize {
        self.step_count
    }

    pub fn track_count(&self) -> usize {
        self.tracks.len()
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    pub fn current_step(&self) -> usize {
        self.current_step
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn set_paused(&mut self, paused: bool) {
        self.paused = paused;
    }

    /// Flip between running and paused; returns the new paused flag.
    pub fn toggle_paused(&mut self) -> bool {
        self.paused = !self.paused;
        self.paused
    }

    pub fn get_step(&self, track: usize, step: usize) -> bool {
        self.tracks.get(track).is_some_and(|t| t.get(step))
    }

    pub fn set_step(&mut self, track: usize, step: usize, value: bool) {
        if let Some(t) = self.tracks.get_mut(track) {
            t.set(step, value);
        }
    }

    pub fn toggle_step(&mut self, track: usize, step: usize) {
        if let Some(t) = self.tracks.get_mut(track) {
            t.toggle(step);
        }
    }

    /// Turn every step of every track off. Sizes are untouched.
    pub fn clear(&mut self) {
        for track in &mut self.tracks {
            track.clear();
        }
    }

    /// Move the playhead one step forward, wrapping at the end.
    pub fn advance(&mut self) -> usize {
        self.current_step = (self.current_step + 1) % self.step_count.max(1);
        self.current_step
    }
}

/// Lock the shared state, recovering the data if a panicking holder
/// poisoned the mutex.
pub fn lock(shared: &SharedSequencer) -> MutexGuard<'_, Sequencer> {
    shared.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;

    const GREY: Color = Color::rgb(128, 128, 128);

    fn sequencer(step_count: usize, track_count: usize) -> Sequencer {
        Sequencer::new(
            step_count,
            (0..track_count).map(|i| (GREY, Voice::note(220.0 * (i + 1) as f32))),
        )
    }

    #[test]
    fn test_track_creation() {
        let track = Track::new(8, GREY, Voice::kick(160.0));
        assert_eq!(track.len(), 8);
        assert!(track.steps().iter().all(|&s| !s));
    }

    #[test]
    fn test_sequencer_shape() {
        let seq = sequencer(8, 6);
        assert_eq!(seq.step_count(), 8);
        assert_eq!(seq.track_count(), 6);
        assert!(seq.tracks().iter().all(|t| t.len() == 8));
        assert_eq!(seq.current_step(), 0);
        assert!(!seq.is_paused());
    }

    #[test]
    fn test_toggle_twice_restores() {
        let mut seq = sequencer(8, 6);
        seq.set_step(2, 3, true);
        seq.toggle_step(2, 3);
        assert!(!seq.get_step(2, 3));
        seq.toggle_step(2, 3);
        assert!(seq.get_step(2, 3));

        seq.toggle_step(4, 0);
        seq.toggle_step(4, 0);
        assert!(!seq.get_step(4, 0));
    }

    #[test]
    fn test_out_of_range_is_ignored() {
        let mut seq = sequencer(4, 2);
        seq.toggle_step(7, 0);
        seq.set_step(0, 9, true);
        assert!(!seq.get_step(0, 9));
        assert!(seq.tracks().iter().all(|t| t.len() == 4));
    }

    #[test]
    fn test_clear_preserves_shape() {
        let mut seq = sequencer(8, 6);
        for track in 0..6 {
            for step in (track % 2..8).step_by(2) {
                seq.set_step(track, step, true);
            }
        }
        seq.clear();
        assert_eq!(seq.track_count(), 6);
        for track in seq.tracks() {
            assert_eq!(track.len(), 8);
            assert!(track.steps().iter().all(|&s| !s));
        }
    }

    #[test]
    fn test_advance_wraps() {
        let mut seq = sequencer(8, 1);
        for n in 0..50 {
            let mut cursor = seq.clone();
            for _ in 0..n {
                cursor.advance();
            }
            assert_eq!(cursor.current_step(), n % 8);
        }
        for _ in 0..8 {
            seq.advance();
        }
        assert_eq!(seq.current_step(), 0);
    }

    #[test]
    fn test_toggle_paused() {
        let mut seq = sequencer(8, 1);
        assert!(seq.toggle_paused());
        assert!(!seq.toggle_paused());
    }

    #[test]
    fn test_lock_survives_poison() {
        let shared = sequencer(8, 1).into_shared();
        let clone = Arc::clone(&shared);
        let _ = std::thread::spawn(move || {
            let _guard = clone.lock().unwrap();
            panic!("poison");
        })
        .join();
        assert!(shared.is_poisoned());
        assert_eq!(lock(&shared).step_count(), 8);
    }
}

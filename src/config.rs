//! Startup constants: grid size, tempo, geometry and the default kit.

use std::time::Duration;

use crate::audio::Voice;
use crate::layout::Layout;
use crate::render::Color;
use crate::sequencer::Sequencer;

pub const STEP_COUNT: usize = 8;

/// Time between ticks. Longer is slower.
pub const TICK_PERIOD: Duration = Duration::from_millis(200);

/// Edge length of one cell in pixels.
pub const BUTTON_SIZE: f32 = 39.0;

pub const OFF_COLOR: Color = Color::rgb(60, 60, 60);
pub const PLAYHEAD_COLOR: Color = Color::rgb(240, 240, 240);
pub const BACKGROUND_COLOR: Color = Color::rgb(20, 20, 20);

pub const KICK_FREQUENCY: f32 = 160.0;

/// Melodic tracks, top to bottom (A major pentatonic, descending).
const NOTE_TRACKS: [(Color, f32); 5] = [
    (Color::rgb(230, 70, 70), 880.0),
    (Color::rgb(240, 150, 50), 739.99),
    (Color::rgb(230, 210, 60), 659.25),
    (Color::rgb(90, 200, 90), 554.37),
    (Color::rgb(70, 150, 230), 440.0),
];

const KICK_COLOR: Color = Color::rgb(170, 90, 220);

/// The six tracks in trigger order; the kick is last.
pub fn default_kit() -> Vec<(Color, Voice)> {
    NOTE_TRACKS
        .iter()
        .map(|&(color, frequency)| (color, Voice::note(frequency)))
        .chain(std::iter::once((KICK_COLOR, Voice::kick(KICK_FREQUENCY))))
        .collect()
}

pub fn default_sequencer() -> Sequencer {
    Sequencer::new(STEP_COUNT, default_kit())
}

pub fn default_layout() -> Layout {
    Layout::new(BUTTON_SIZE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_sequencer() {
        let seq = default_sequencer();
        assert_eq!(seq.step_count(), 8);
        assert_eq!(seq.track_count(), 6);
        assert!(matches!(seq.tracks()[5].voice(), Voice::Kick { .. }));
        assert!(seq.tracks()[..5]
            .iter()
            .all(|t| matches!(t.voice(), Voice::Note { .. })));
    }

    #[test]
    fn test_colors_are_distinct() {
        let kit = default_kit();
        for (i, (a, _)) in kit.iter().enumerate() {
            assert_ne!(*a, OFF_COLOR);
            assert_ne!(*a, PLAYHEAD_COLOR);
            for (b, _) in &kit[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }
}

//! Grid renderer. Reads the sequencer and paints it onto any `Surface`.

use log::trace;

use crate::config;
use crate::layout::{Layout, Rect};
use crate::sequencer::Sequencer;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

/// A fixed-size 2D canvas that can fill rectangles.
pub trait Surface {
    /// Wipe the whole canvas.
    fn clear(&mut self);
    fn fill_rect(&mut self, rect: Rect, color: Color);
}

/// Paint one frame: every cell in its track color when on and the off
/// color otherwise, then the playhead cell under the current step.
pub fn draw(state: &Sequencer, layout: &Layout, surface: &mut impl Surface) {
    surface.clear();

    for (row, track) in state.tracks().iter().enumerate() {
        for (column, &on) in track.steps().iter().enumerate() {
            let color = if on { track.color() } else { config::OFF_COLOR };
            surface.fill_rect(layout.cell(row, column), color);
        }
    }

    let step = state.current_step();
    if step >= state.step_count() {
        trace!("playhead {} out of range, skipping indicator", step);
        return;
    }
    surface.fill_rect(
        layout.indicator(state.track_count(), step),
        config::PLAYHEAD_COLOR,
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::Voice;

    const RED: Color = Color::rgb(255, 0, 0);
    const BLUE: Color = Color::rgb(0, 0, 255);

    #[derive(Debug, PartialEq)]
    enum DrawCall {
        Clear,
        Fill(Rect, Color),
    }

    #[derive(Default)]
    struct RecordingSurface {
        calls: Vec<DrawCall>,
    }

    impl Surface for RecordingSurface {
        fn clear(&mut self) {
            self.calls.push(DrawCall::Clear);
        }

        fn fill_rect(&mut self, rect: Rect, color: Color) {
            self.calls.push(DrawCall::Fill(rect, color));
        }
    }

    fn two_tracks() -> Sequencer {
        Sequencer::new(4, [(RED, Voice::note(440.0)), (BLUE, Voice::kick(160.0))])
    }

    #[test]
    fn test_frame_starts_with_clear() {
        let mut surface = RecordingSurface::default();
        draw(&two_tracks(), &Layout::new(39.0), &mut surface);
        assert_eq!(surface.calls.first(), Some(&DrawCall::Clear));
        // clear + 2x4 cells + playhead
        assert_eq!(surface.calls.len(), 10);
    }

    #[test]
    fn test_cells_use_track_or_off_color() {
        let layout = Layout::new(39.0);
        let mut seq = two_tracks();
        seq.set_step(0, 1, true);
        seq.set_step(1, 3, true);

        let mut surface = RecordingSurface::default();
        draw(&seq, &layout, &mut surface);

        assert!(surface.calls.contains(&DrawCall::Fill(layout.cell(0, 1), RED)));
        assert!(surface.calls.contains(&DrawCall::Fill(layout.cell(1, 3), BLUE)));
        assert!(surface
            .calls
            .contains(&DrawCall::Fill(layout.cell(0, 0), config::OFF_COLOR)));
        assert!(surface
            .calls
            .contains(&DrawCall::Fill(layout.cell(1, 1), config::OFF_COLOR)));
    }

    #[test]
    fn test_playhead_follows_current_step() {
        let layout = Layout::new(39.0);
        let mut seq = two_tracks();
        seq.advance();
        seq.advance();

        let mut surface = RecordingSurface::default();
        draw(&seq, &layout, &mut surface);
        assert_eq!(
            surface.calls.last(),
            Some(&DrawCall::Fill(layout.indicator(2, 2), config::PLAYHEAD_COLOR))
        );
    }

    #[test]
    fn test_out_of_range_playhead_is_skipped() {
        let layout = Layout::new(39.0);
        let seq = Sequencer::new(0, [(RED, Voice::note(440.0))]);
        assert!(seq.current_step() >= seq.step_count());

        let mut surface = RecordingSurface::default();
        draw(&seq, &layout, &mut surface);
        assert_eq!(surface.calls, vec![DrawCall::Clear]);
    }

    #[test]
    fn test_draw_leaves_state_alone() {
        let mut seq = two_tracks();
        seq.set_step(1, 2, true);
        let before = seq.clone();
        draw(&seq, &Layout::new(39.0), &mut RecordingSurface::default());
        assert_eq!(seq.tracks(), before.tracks());
        assert_eq!(seq.current_step(), before.current_step());
    }
}

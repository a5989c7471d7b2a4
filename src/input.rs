//! Click handling: maps a point on the canvas to a sequencer change.

use log::debug;

use crate::layout::{Layout, Point};
use crate::sequencer::Sequencer;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickOutcome {
    /// The play bar was hit; carries the new paused flag.
    PauseToggled { paused: bool },
    /// A cell was hit; carries its new value.
    StepToggled { track: usize, step: usize, on: bool },
    /// Nothing under the click.
    Ignored,
}

/// Apply a click at `point`. Anything at or below the play bar toggles
/// pause; otherwise the cell containing the point (if any) is toggled.
pub fn handle_click(state: &mut Sequencer, layout: &Layout, point: Point) -> ClickOutcome {
    let outcome = if point.y >= layout.play_bar_top(state.track_count()) {
        ClickOutcome::PauseToggled {
            paused: state.toggle_paused(),
        }
    } else {
        match find_cell(state, layout, point) {
            Some((track, step)) => {
                state.toggle_step(track, step);
                ClickOutcome::StepToggled {
                    track,
                    step,
                    on: state.get_step(track, step),
                }
            }
            None => ClickOutcome::Ignored,
        }
    };

    debug!("click at ({}, {}) -> {:?}", point.x, point.y, outcome);
    outcome
}

fn find_cell(state: &Sequencer, layout: &Layout, point: Point) -> Option<(usize, usize)> {
    (0..state.track_count())
        .flat_map(|track| (0..state.step_count()).map(move |step| (track, step)))
        .find(|&(track, step)| layout.cell(track, step).contains(point))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::Voice;
    use crate::render::Color;

    fn setup() -> (Sequencer, Layout) {
        let kit = (0..6).map(|i| (Color::rgb(i * 40, 0, 0), Voice::note(440.0)));
        (Sequencer::new(8, kit), Layout::new(39.0))
    }

    #[test]
    fn test_click_inside_first_cell() {
        let (mut seq, layout) = setup();
        let outcome = handle_click(&mut seq, &layout, Point::new(30.0, 30.0));
        assert_eq!(
            outcome,
            ClickOutcome::StepToggled {
                track: 0,
                step: 0,
                on: true
            }
        );
        assert!(seq.get_step(0, 0));
        assert!(!seq.is_paused());
    }

    #[test]
    fn test_click_just_outside_first_cell() {
        let (mut seq, layout) = setup();
        let outcome = handle_click(&mut seq, &layout, Point::new(19.0, 19.0));
        assert_eq!(outcome, ClickOutcome::Ignored);
        assert!(seq.tracks().iter().all(|t| t.steps().iter().all(|&s| !s)));
    }

    #[test]
    fn test_click_targets_row_and_column() {
        let (mut seq, layout) = setup();
        let cell = layout.cell(4, 6);
        let center = Point::new(cell.left + cell.size / 2.0, cell.top + cell.size / 2.0);

        handle_click(&mut seq, &layout, center);
        for track in 0..6 {
            for step in 0..8 {
                assert_eq!(seq.get_step(track, step), (track, step) == (4, 6));
            }
        }

        handle_click(&mut seq, &layout, center);
        assert!(!seq.get_step(4, 6));
    }

    #[test]
    fn test_click_in_gap_is_ignored() {
        let (mut seq, layout) = setup();
        // Between column 0 and column 1 of the first row.
        let outcome = handle_click(&mut seq, &layout, Point::new(65.0, 30.0));
        assert_eq!(outcome, ClickOutcome::Ignored);
    }

    #[test]
    fn test_play_bar_toggles_pause_only() {
        let (mut seq, layout) = setup();
        let indicator = layout.indicator(6, 2);
        let point = Point::new(indicator.left + 5.0, indicator.top + 5.0);

        let outcome = handle_click(&mut seq, &layout, point);
        assert_eq!(outcome, ClickOutcome::PauseToggled { paused: true });
        assert!(seq.tracks().iter().all(|t| t.steps().iter().all(|&s| !s)));

        // Far below the grid still counts as the play bar.
        let outcome = handle_click(&mut seq, &layout, Point::new(5.0, 2000.0));
        assert_eq!(outcome, ClickOutcome::PauseToggled { paused: false });
    }

    #[test]
    fn test_band_above_play_bar_is_ignored() {
        let (mut seq, layout) = setup();
        let last_row = layout.cell(5, 0);
        let y = 360.0;
        assert!(y > last_row.top + last_row.size);
        assert!(y < layout.play_bar_top(6));

        for x in [10.0, 30.0, 200.0, 470.0] {
            assert_eq!(handle_click(&mut seq, &layout, Point::new(x, y)), ClickOutcome::Ignored);
        }
        assert!(!seq.is_paused());
        assert!(seq.tracks().iter().all(|t| t.steps().iter().all(|&s| !s)));
    }

    #[test]
    fn test_last_row_is_not_play_bar() {
        let (mut seq, layout) = setup();
        let cell = layout.cell(5, 0);
        let point = Point::new(cell.left + 1.0, cell.top + cell.size);

        let outcome = handle_click(&mut seq, &layout, point);
        assert!(matches!(outcome, ClickOutcome::StepToggled { track: 5, step: 0, .. }));
        assert!(!seq.is_paused());
    }
}

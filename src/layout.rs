//! Screen geometry shared by the click handler and the renderer.
//!
//! Cells are squares of `button_size` pixels laid out on a pitch of
//! `1.5 * button_size`, with a half-button margin at the top-left. The
//! playhead row sits directly below the last track row and doubles as
//! the play bar.

/// Screen coordinates, relative to the drawing surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Square region addressed by its top-left corner.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub left: f32,
    pub top: f32,
    pub size: f32,
}

impl Rect {
    /// Inclusive on every edge.
    pub fn contains(&self, p: Point) -> bool {
        !(p.x < self.left
            || p.y < self.top
            || p.x > self.left + self.size
            || p.y > self.top + self.size)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Layout {
    button_size: f32,
}

impl Layout {
    pub fn new(button_size: f32) -> Self {
        Self { button_size }
    }

    fn pitch(&self) -> f32 {
        self.button_size * 1.5
    }

    fn margin(&self) -> f32 {
        self.button_size / 2.0
    }

    /// Bounding box of the cell at `row` (track) and `column` (step).
    pub fn cell(&self, row: usize, column: usize) -> Rect {
        Rect {
            left: self.margin() + column as f32 * self.pitch(),
            top: self.margin() + row as f32 * self.pitch(),
            size: self.button_size,
        }
    }

    /// Playhead cell: one row below the last track.
    pub fn indicator(&self, track_count: usize, step: usize) -> Rect {
        self.cell(track_count, step)
    }

    /// Any click at or below this y toggles play/pause.
    pub fn play_bar_top(&self, track_count: usize) -> f32 {
        self.indicator(track_count, 0).top
    }

    /// Width and height needed to show every cell plus the playhead row.
    pub fn canvas_size(&self, step_count: usize, track_count: usize) -> (f32, f32) {
        let width = self.margin() + step_count as f32 * self.pitch();
        let height = self.margin() + (track_count + 1) as f32 * self.pitch();
        (width, height)
    }
}

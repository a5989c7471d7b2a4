//! BEATGRID - A click-to-toggle drum machine
//!
//! This library provides the core components of a fixed-grid step sequencer:
//! - Grid model with one row of on/off steps per instrument track
//! - Fixed-period clock that advances the playhead and fires triggers
//! - Sine synthesis with exponential volume and pitch decay
//! - Click handling and rendering against abstract geometry and surfaces
//! - Optional MIDI mirror of every trigger

pub mod audio;
pub mod config;
pub mod error;
pub mod input;
pub mod layout;
pub mod midi;
pub mod render;
pub mod sequencer;

// Re-export commonly used types
pub use audio::{AudioOutput, Synth, Voice, VoiceSender};
pub use error::{AudioError, MidiError};
pub use input::{handle_click, ClickOutcome};
pub use layout::{Layout, Point, Rect};
pub use midi::{MidiMirror, MidiOutputDevice};
pub use render::{draw, Color, Surface};
pub use sequencer::clock::{tick, Clock};
pub use sequencer::{Sequencer, SharedSequencer, Track};

//! Error types for the audio and MIDI edges.
//!
//! Neither kind of failure is fatal: callers log the error and keep
//! sequencing and drawing with a silent or disconnected output.

use std::fmt;

/// Errors that can occur while opening the audio output stream.
#[derive(Debug)]
pub enum AudioError {
    /// The host has no default output device.
    NoOutputDevice,
    /// The device could not report a default output configuration.
    DefaultConfig(cpal::DefaultStreamConfigError),
    /// The device only offers sample formats we do not render.
    UnsupportedSampleFormat(cpal::SampleFormat),
    /// The output stream could not be built.
    BuildStream(cpal::BuildStreamError),
    /// The stream exists but refused to start (e.g. still suspended).
    PlayStream(cpal::PlayStreamError),
}

impl fmt::Display for AudioError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AudioError::NoOutputDevice => write!(f, "no audio output device available"),
            AudioError::DefaultConfig(e) => write!(f, "failed to query output config: {}", e),
            AudioError::UnsupportedSampleFormat(format) => {
                write!(f, "unsupported sample format: {:?}", format)
            }
            AudioError::BuildStream(e) => write!(f, "failed to build output stream: {}", e),
            AudioError::PlayStream(e) => write!(f, "failed to start output stream: {}", e),
        }
    }
}

impl std::error::Error for AudioError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AudioError::DefaultConfig(e) => Some(e),
            AudioError::BuildStream(e) => Some(e),
            AudioError::PlayStream(e) => Some(e),
            AudioError::NoOutputDevice | AudioError::UnsupportedSampleFormat(_) => None,
        }
    }
}

impl From<cpal::DefaultStreamConfigError> for AudioError {
    fn from(e: cpal::DefaultStreamConfigError) -> Self {
        AudioError::DefaultConfig(e)
    }
}

impl From<cpal::BuildStreamError> for AudioError {
    fn from(e: cpal::BuildStreamError) -> Self {
        AudioError::BuildStream(e)
    }
}

impl From<cpal::PlayStreamError> for AudioError {
    fn from(e: cpal::PlayStreamError) -> Self {
        AudioError::PlayStream(e)
    }
}

/// Errors from the MIDI mirror.
#[derive(Debug)]
pub enum MidiError {
    /// The MIDI client could not be created.
    Init(midir::InitError),
    /// No port exists at the requested index.
    InvalidPort(usize),
    /// Connecting to the chosen port failed.
    Connect(String),
    /// A message could not be delivered.
    Send(midir::SendError),
}

impl fmt::Display for MidiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MidiError::Init(e) => write!(f, "failed to create MIDI output: {}", e),
            MidiError::InvalidPort(index) => write!(f, "invalid MIDI port index {}", index),
            MidiError::Connect(reason) => write!(f, "failed to connect: {}", reason),
            MidiError::Send(e) => write!(f, "failed to send MIDI message: {}", e),
        }
    }
}

impl std::error::Error for MidiError {}

impl From<midir::InitError> for MidiError {
    fn from(e: midir::InitError) -> Self {
        MidiError::Init(e)
    }
}

impl From<midir::SendError> for MidiError {
    fn from(e: midir::SendError) -> Self {
        MidiError::Send(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_names_the_port() {
        let err = MidiError::InvalidPort(3);
        assert_eq!(err.to_string(), "invalid MIDI port index 3");
    }

    #[test]
    fn test_audio_error_without_source() {
        use std::error::Error;
        let err = AudioError::NoOutputDevice;
        assert!(err.source().is_none());
        assert_eq!(err.to_string(), "no audio output device available");
    }
}

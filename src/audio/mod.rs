//! Audio output using cpal
//!
//! Triggers never touch the stream directly: they push a `Voice` onto a
//! bounded queue that the audio callback drains, so a trigger returns as
//! soon as the voice is queued.

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};
use log::{error, info, trace, warn};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::error::AudioError;

pub mod mixer;
pub mod synth;
pub mod voice;

pub use mixer::Mixer;
pub use synth::{ExpRamp, Oscillator, SoundInstance};
pub use voice::Voice;

const VOICE_QUEUE_CAPACITY: usize = 64;

/// Something that can start a sound for a voice. Fire-and-forget: the
/// sound runs to completion on its own and is never awaited or cancelled.
pub trait Synth {
    fn trigger(&mut self, voice: &Voice);
}

impl<S: Synth + ?Sized> Synth for &mut S {
    fn trigger(&mut self, voice: &Voice) {
        (**self).trigger(voice);
    }
}

impl<S: Synth + ?Sized> Synth for Box<S> {
    fn trigger(&mut self, voice: &Voice) {
        (**self).trigger(voice);
    }
}

/// Trigger both, first `A` then `B`.
impl<A: Synth, B: Synth> Synth for (A, B) {
    fn trigger(&mut self, voice: &Voice) {
        self.0.trigger(voice);
        self.1.trigger(voice);
    }
}

/// Cloneable, thread-safe handle onto an `AudioOutput`'s voice queue.
#[derive(Clone)]
pub struct VoiceSender {
    sender: Option<Sender<Voice>>,
    running: Arc<AtomicBool>,
}

impl VoiceSender {
    /// A handle that never makes a sound.
    pub fn silent() -> Self {
        Self {
            sender: None,
            running: Arc::new(AtomicBool::new(false)),
        }
    }
}

impl Synth for VoiceSender {
    fn trigger(&mut self, voice: &Voice) {
        let Some(sender) = &self.sender else {
            return;
        };
        // Voices queued while suspended would all burst out on resume.
        if !self.running.load(Ordering::Acquire) {
            trace!("audio suspended, dropping {:?}", voice);
            return;
        }
        match sender.try_send(*voice) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) => warn!("voice queue full, dropping {:?}", voice),
            Err(TrySendError::Disconnected(_)) => trace!("audio callback gone"),
        }
    }
}

pub struct AudioOutput {
    stream: Option<cpal::Stream>,
    sender: Option<Sender<Voice>>,
    running: Arc<AtomicBool>,
}

impl AudioOutput {
    /// Open the default output device. The stream is started right away
    /// when the host allows it; otherwise `resume` starts it later.
    pub fn new() -> Result<Self, AudioError> {
        let (sender, receiver) = bounded(VOICE_QUEUE_CAPACITY);
        let stream = Self::setup_audio_stream(receiver)?;

        let mut output = Self {
            stream: Some(stream),
            sender: Some(sender),
            running: Arc::new(AtomicBool::new(false)),
        };
        if let Err(e) = output.resume() {
            warn!("audio stream suspended until the first interaction: {}", e);
        }
        Ok(output)
    }

    /// An output with no device; every trigger is dropped.
    pub fn silent() -> Self {
        Self {
            stream: None,
            sender: None,
            running: Arc::new(AtomicBool::new(false)),
        }
    }

    fn setup_audio_stream(receiver: Receiver<Voice>) -> Result<cpal::Stream, AudioError> {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or(AudioError::NoOutputDevice)?;
        let config = device.default_output_config()?;

        let sample_rate = config.sample_rate().0 as f32;
        let channels = config.channels() as usize;
        let mut mixer = Mixer::new(sample_rate, receiver);

        let stream = match config.sample_format() {
            cpal::SampleFormat::F32 => device.build_output_stream(
                &config.config(),
                move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                    mixer.render(data, channels);
                },
                |err| error!("audio stream error: {}", err),
                None,
            )?,
            other => return Err(AudioError::UnsupportedSampleFormat(other)),
        };

        info!(
            "opened audio output: {} Hz, {} channel(s)",
            sample_rate, channels
        );
        Ok(stream)
    }

    /// Start the stream if it is not running yet. Call on user interaction
    /// until `is_running` reports true; afterwards this does nothing.
    pub fn resume(&mut self) -> Result<(), AudioError> {
        if self.is_running() {
            return Ok(());
        }
        let Some(stream) = &self.stream else {
            return Ok(());
        };
        stream.play()?;
        self.running.store(true, Ordering::Release);
        info!("audio output running");
        Ok(())
    }

    /// Retry starting a held-back stream. Returns whether a start was
    /// attempted; failures are logged and left for the next interaction.
    pub fn on_interaction(&mut self) -> bool {
        if !self.is_available() || self.is_running() {
            return false;
        }
        if let Err(e) = self.resume() {
            warn!("audio still suspended: {}", e);
        }
        true
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Whether a device was opened at all.
    pub fn is_available(&self) -> bool {
        self.stream.is_some()
    }

    /// What to tell the user while triggers are being dropped, if anything.
    pub fn status_warning(&self) -> Option<&'static str> {
        status_warning(self.is_available(), self.is_running())
    }

    pub fn voice_sender(&self) -> VoiceSender {
        VoiceSender {
            sender: self.sender.clone(),
            running: Arc::clone(&self.running),
        }
    }
}

fn status_warning(available: bool, running: bool) -> Option<&'static str> {
    match (available, running) {
        (false, _) => Some("Audio output unavailable - sequencing continues silently"),
        (true, false) => Some("Audio output suspended - click the grid to start it"),
        (true, true) => None,
    }
}

impl Default for AudioOutput {
    fn default() -> Self {
        Self::new().unwrap_or_else(|e| {
            warn!("audio unavailable, continuing silently: {}", e);
            Self::silent()
        })
    }
}

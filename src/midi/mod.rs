//! MIDI output using midir
//!
//! Mirrors every trigger to an external MIDI port, so the grid can also
//! drive hardware or a DAW.

use crossbeam_channel::{bounded, Receiver, RecvTimeoutError, Sender, TrySendError};
use log::{info, trace, warn};
use midir::{MidiOutput, MidiOutputConnection};
use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread;
use std::time::{Duration, Instant};

use crate::audio::{Synth, Voice};
use crate::error::MidiError;

const CLIENT_NAME: &str = "BEATGRID MIDI Output";

/// Channel 1 for melodic voices, channel 10 (index 9) for drums.
const NOTE_CHANNEL: u8 = 0;
const DRUM_CHANNEL: u8 = 9;
/// General MIDI bass drum.
const KICK_NOTE: u8 = 36;

const MIDI_QUEUE_CAPACITY: usize = 64;

pub struct MidiOutputDevice {
    connection: Option<MidiOutputConnection>,
}

impl MidiOutputDevice {
    pub fn new() -> Self {
        Self { connection: None }
    }

    pub fn available_ports() -> Vec<String> {
        if let Ok(midi_out) = MidiOutput::new(CLIENT_NAME) {
            midi_out
                .ports()
                .iter()
                .filter_map(|p| midi_out.port_name(p).ok())
                .collect()
        } else {
            vec![]
        }
    }

    pub fn connect(&mut self, port_index: usize) -> Result<(), MidiError> {
        let midi_out = MidiOutput::new(CLIENT_NAME)?;

        let ports = midi_out.ports();
        let port = ports
            .get(port_index)
            .ok_or(MidiError::InvalidPort(port_index))?;
        let port_name = midi_out.port_name(port).unwrap_or_default();

        let connection = midi_out
            .connect(port, "beatgrid")
            .map_err(|e| MidiError::Connect(e.to_string()))?;

        info!("connected MIDI output '{}'", port_name);
        self.connection = Some(connection);
        Ok(())
    }

    pub fn is_connected(&self) -> bool {
        self.connection.is_some()
    }

    pub fn send_note_on(&mut self, channel: u8, note: u8, velocity: u8) -> Result<(), MidiError> {
        if let Some(ref mut conn) = self.connection {
            conn.send(&[0x90 | (channel & 0x0F), note, velocity])?;
        }
        Ok(())
    }

    pub fn send_note_off(&mut self, channel: u8, note: u8) -> Result<(), MidiError> {
        if let Some(ref mut conn) = self.connection {
            conn.send(&[0x80 | (channel & 0x0F), note, 0])?;
        }
        Ok(())
    }
}

impl Default for MidiOutputDevice {
    fn default() -> Self {
        Self::new()
    }
}

/// Channel, note number and velocity a voice is mirrored as.
pub fn voice_to_midi(voice: &Voice) -> (u8, u8, u8) {
    let velocity = (voice.volume().clamp(0.0, 0.5) * 2.0 * 127.0).round() as u8;
    match voice {
        Voice::Note { frequency, .. } => (NOTE_CHANNEL, frequency_to_midi_note(*frequency), velocity),
        Voice::Kick { .. } => (DRUM_CHANNEL, KICK_NOTE, velocity),
    }
}

/// Nearest equal-tempered note, A4 = 440 Hz = 69.
pub fn frequency_to_midi_note(frequency: f32) -> u8 {
    if frequency <= 0.0 {
        return 0;
    }
    (69.0 + 12.0 * (frequency / 440.0).log2()).round().clamp(0.0, 127.0) as u8
}

pub fn midi_note_name(note: u8) -> String {
    let note_names = ["C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B"];
    let octave = (note / 12) as i32 - 1;
    let note_index = (note % 12) as usize;
    format!("{}{}", note_names[note_index], octave)
}

/// A mirrored note: channel and note number.
pub type NoteKey = (u8, u8);

/// Note-off bookkeeping for overlapping triggers of the same note. A
/// note-off is only due once every instance started on that key has run
/// out, so a re-strike is never cut short by an earlier trigger's expiry.
#[derive(Debug, Default)]
pub struct NoteSchedule {
    active: HashMap<NoteKey, usize>,
    expiries: BinaryHeap<Reverse<(Instant, NoteKey)>>,
}

impl NoteSchedule {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an instance of `key` starting at `now` and lasting `hold`.
    pub fn start(&mut self, key: NoteKey, now: Instant, hold: Duration) {
        *self.active.entry(key).or_insert(0) += 1;
        self.expiries.push(Reverse((now + hold, key)));
    }

    /// Earliest pending expiry, if any.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.expiries.peek().map(|Reverse((at, _))| *at)
    }

    /// Retire every instance that has expired by `now` and return the keys
    /// whose last instance just ended.
    pub fn expire(&mut self, now: Instant) -> Vec<NoteKey> {
        let mut released = Vec::new();
        while let Some(&Reverse((at, key))) = self.expiries.peek() {
            if at > now {
                break;
            }
            self.expiries.pop();
            if let Some(count) = self.active.get_mut(&key) {
                *count -= 1;
                if *count == 0 {
                    self.active.remove(&key);
                    released.push(key);
                }
            }
        }
        released
    }

    /// Forget everything, returning the keys that were still sounding.
    pub fn drain(&mut self) -> Vec<NoteKey> {
        self.expiries.clear();
        self.active.drain().map(|(key, _)| key).collect()
    }
}

struct MidiNote {
    channel: u8,
    note: u8,
    velocity: u8,
    hold: Duration,
}

/// `Synth` that forwards triggers to a shared MIDI device. Triggers only
/// enqueue; one worker thread owns the sends and the note-off schedule.
#[derive(Clone)]
pub struct MidiMirror {
    device: Arc<Mutex<MidiOutputDevice>>,
    connected: Arc<AtomicBool>,
    sender: Sender<MidiNote>,
}

impl MidiMirror {
    pub fn new(device: MidiOutputDevice) -> Self {
        let connected = Arc::new(AtomicBool::new(device.is_connected()));
        let device = Arc::new(Mutex::new(device));
        let (sender, receiver) = bounded(MIDI_QUEUE_CAPACITY);

        let worker_device = Arc::clone(&device);
        thread::spawn(move || run_worker(receiver, worker_device));

        Self {
            device,
            connected,
            sender,
        }
    }

    /// Open `port_index` without holding the shared device while the port
    /// connects, then swap the connection in.
    pub fn connect(&self, port_index: usize) -> Result<(), MidiError> {
        let mut fresh = MidiOutputDevice::new();
        fresh.connect(port_index)?;
        *lock_device(&self.device) = fresh;
        self.connected.store(true, Ordering::Release);
        Ok(())
    }

    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::Acquire)
    }
}

impl Default for MidiMirror {
    fn default() -> Self {
        Self::new(MidiOutputDevice::new())
    }
}

fn lock_device(device: &Mutex<MidiOutputDevice>) -> MutexGuard<'_, MidiOutputDevice> {
    device.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl Synth for MidiMirror {
    fn trigger(&mut self, voice: &Voice) {
        if !self.is_connected() {
            return;
        }
        let (channel, note, velocity) = voice_to_midi(voice);
        let hold = Duration::from_secs_f32(voice.duration().max(0.0));
        match self.sender.try_send(MidiNote {
            channel,
            note,
            velocity,
            hold,
        }) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) => warn!("MIDI queue full, dropping {}", midi_note_name(note)),
            Err(TrySendError::Disconnected(_)) => trace!("MIDI worker gone"),
        }
    }
}

fn run_worker(receiver: Receiver<MidiNote>, device: Arc<Mutex<MidiOutputDevice>>) {
    let mut schedule = NoteSchedule::new();

    loop {
        let received = match schedule.next_deadline() {
            Some(deadline) => receiver.recv_deadline(deadline),
            None => receiver.recv().map_err(|_| RecvTimeoutError::Disconnected),
        };

        match received {
            Ok(midi) => {
                let key = (midi.channel, midi.note);
                let sent = lock_device(&device).send_note_on(midi.channel, midi.note, midi.velocity);
                if let Err(e) = sent {
                    warn!("MIDI note on dropped: {}", e);
                    continue;
                }
                trace!("midi {} on channel {}", midi_note_name(midi.note), midi.channel + 1);
                schedule.start(key, Instant::now(), midi.hold);
            }
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => break,
        }

        for (channel, note) in schedule.expire(Instant::now()) {
            if let Err(e) = lock_device(&device).send_note_off(channel, note) {
                warn!("MIDI note off dropped: {}", e);
            }
        }
    }

    let mut device = lock_device(&device);
    for (channel, note) in schedule.drain() {
        let _ = device.send_note_off(channel, note);
    }
}

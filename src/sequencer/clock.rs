//! Playback clock - fixed-period ticks that move the playhead and fire
//! triggers

use log::{info, trace};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use super::{lock, Sequencer, SharedSequencer};
use crate::audio::Synth;

/// One clock tick. While paused nothing happens. Otherwise the playhead
/// advances (wrapping) and every track that is on at the new step is
/// triggered, in track order. Returns the number of triggers fired.
pub fn tick(state: &mut Sequencer, synth: &mut impl Synth) -> usize {
    if state.is_paused() {
        return 0;
    }

    let step = state.advance();
    let mut fired = 0;
    for track in state.tracks().iter().filter(|t| t.get(step)) {
        track.play(synth);
        fired += 1;
    }
    trace!("tick -> step {} ({} triggers)", step, fired);
    fired
}

/// Background thread ticking a shared sequencer at a fixed period.
pub struct Clock {
    is_running: Arc<AtomicBool>,
}

impl Clock {
    /// Spawn the clock thread. The first tick happens one `period` after
    /// start. The state is locked only for the duration of each tick.
    pub fn start<S>(period: Duration, state: SharedSequencer, mut synth: S) -> Self
    where
        S: Synth + Send + 'static,
    {
        let is_running = Arc::new(AtomicBool::new(true));
        let running = Arc::clone(&is_running);

        thread::spawn(move || {
            let mut next_tick = Instant::now() + period;

            while running.load(Ordering::Acquire) {
                let now = Instant::now();
                if now < next_tick {
                    thread::sleep(next_tick - now);
                    continue;
                }

                tick(&mut lock(&state), &mut synth);

                // Deadline schedule: a late tick does not shift the ones after it.
                next_tick += period;
                if next_tick < now {
                    next_tick = now + period;
                }
            }
        });

        info!("clock started, {} ms per step", period.as_millis());
        Self { is_running }
    }

    pub fn stop(&mut self) {
        self.is_running.store(false, Ordering::Release);
    }

    pub fn is_running(&self) -> bool {
        self.is_running.load(Ordering::Acquire)
    }
}

impl Drop for Clock {
    fn drop(&mut self) {
        self.stop();
    }
}

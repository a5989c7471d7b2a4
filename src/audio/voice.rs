//! Sound presets bound to each track

/// Floor for the volume decay; exponential ramps cannot reach zero.
pub const GAIN_FLOOR: f32 = 0.001;
/// Where the kick's pitch drop ends.
pub const PITCH_FLOOR: f32 = 0.01;

/// One instrument voice. Triggering it produces a single decaying sine.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Voice {
    /// Fixed-pitch tone for melodic tracks.
    Note {
        frequency: f32,
        volume: f32,
        duration: f32,
    },
    /// Sine whose pitch falls exponentially from `frequency` towards zero.
    Kick {
        frequency: f32,
        volume: f32,
        duration: f32,
    },
}

impl Voice {
    pub const NOTE_VOLUME: f32 = 0.2;
    pub const NOTE_DURATION: f32 = 1.0;
    pub const KICK_VOLUME: f32 = 0.4;
    pub const KICK_DURATION: f32 = 3.0;

    /// Short bright note at `frequency` Hz.
    pub fn note(frequency: f32) -> Self {
        Voice::Note {
            frequency,
            volume: Self::NOTE_VOLUME,
            duration: Self::NOTE_DURATION,
        }
    }

    /// Long kick starting at `frequency` Hz.
    pub fn kick(frequency: f32) -> Self {
        Voice::Kick {
            frequency,
            volume: Self::KICK_VOLUME,
            duration: Self::KICK_DURATION,
        }
    }

    pub fn frequency(&self) -> f32 {
        match *self {
            Voice::Note { frequency, .. } | Voice::Kick { frequency, .. } => frequency,
        }
    }

    pub fn volume(&self) -> f32 {
        match *self {
            Voice::Note { volume, .. } | Voice::Kick { volume, .. } => volume,
        }
    }

    /// Seconds until the sound stops on its own.
    pub fn duration(&self) -> f32 {
        match *self {
            Voice::Note { duration, .. } | Voice::Kick { duration, .. } => duration,
        }
    }

    /// Target of the pitch ramp, if this voice has one.
    pub fn pitch_target(&self) -> Option<f32> {
        match self {
            Voice::Note { .. } => None,
            Voice::Kick { .. } => Some(PITCH_FLOOR),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_note_preset() {
        let voice = Voice::note(440.0);
        assert_eq!(voice.frequency(), 440.0);
        assert_eq!(voice.volume(), 0.2);
        assert_eq!(voice.duration(), 1.0);
        assert_eq!(voice.pitch_target(), None);
    }

    #[test]
    fn test_kick_preset() {
        let voice = Voice::kick(160.0);
        assert_eq!(voice.volume(), 0.4);
        assert!((2.0..=4.0).contains(&voice.duration()));
        assert_eq!(voice.pitch_target(), Some(PITCH_FLOOR));
    }
}

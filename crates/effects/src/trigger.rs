//! Adaptive-trigger effect value.

use std::fmt;

/// Highest zone a trigger effect can start at.
pub const MAX_START_POSITION: u8 = 9;
pub const MIN_STRENGTH: u8 = 1;
pub const MAX_STRENGTH: u8 = 8;

/// Effect mode without parameters; what the mixer debounces on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum TriggerMode {
    #[default]
    Off,
    Feedback,
    Vibration,
}

/// Command for one adaptive trigger.
///
/// Constructors clamp their arguments, so every value of this type is valid
/// at the output boundary: start position in `0..=9`, strength and amplitude
/// in `1..=8`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum TriggerEffect {
    #[default]
    Off,
    /// Continuous resistance from `start_position` to the end of travel.
    Feedback { start_position: u8, strength: u8 },
    /// Oscillation from `start_position` to the end of travel.
    Vibration {
        start_position: u8,
        amplitude: u8,
        frequency_hz: u8,
    },
}

impl TriggerEffect {
    pub fn feedback(start_position: u8, strength: u8) -> Self {
        Self::Feedback {
            start_position: start_position.min(MAX_START_POSITION),
            strength: strength.clamp(MIN_STRENGTH, MAX_STRENGTH),
        }
    }

    pub fn vibration(start_position: u8, amplitude: u8, frequency_hz: u8) -> Self {
        Self::Vibration {
            start_position: start_position.min(MAX_START_POSITION),
            amplitude: amplitude.clamp(MIN_STRENGTH, MAX_STRENGTH),
            frequency_hz,
        }
    }

    pub fn mode(&self) -> TriggerMode {
        match self {
            Self::Off => TriggerMode::Off,
            Self::Feedback { .. } => TriggerMode::Feedback,
            Self::Vibration { .. } => TriggerMode::Vibration,
        }
    }

    pub fn is_off(&self) -> bool {
        matches!(self, Self::Off)
    }
}

/// Compact summary used in the status line: `Off`, `Res(n)`, `Vib(aNfM)`.
impl fmt::Display for TriggerEffect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Off => f.pad("Off"),
            Self::Feedback { strength, .. } => f.pad(&format!("Res({strength})")),
            Self::Vibration {
                amplitude,
                frequency_hz,
                ..
            } => f.pad(&format!("Vib(a{amplitude}f{frequency_hz})")),
        }
    }
}

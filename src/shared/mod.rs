use std::fmt;

use chrono::Duration;
use strum::{Display, EnumIter};
use tokio::time;

pub mod error;

use error::{
    CountdownValidationError, PenaltySecondsValidationError, PollIntervalValidationError,
};

/// The four ordered puzzle stages a player must clear in sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter)]
pub enum PhaseKind {
    Toggles,
    Button,
    Keypad,
    Wires,
}

impl PhaseKind {
    /// The fixed order phases are visited in during a session.
    pub const ORDERED: [Self; 4] = [Self::Toggles, Self::Button, Self::Keypad, Self::Wires];

    /// Returns the 1-based position of the phase in the session sequence.
    pub const fn number(&self) -> usize {
        match self {
            Self::Toggles => 1,
            Self::Button => 2,
            Self::Keypad => 3,
            Self::Wires => 4,
        }
    }
}

/// Formats a seconds count as `MM:SS`.
pub(crate) fn format_mm_ss(secs: u32) -> String {
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

/// Validated total countdown duration for a session, in seconds.
///
/// Bounded so the remaining time always renders as `MM:SS`.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Eq, Ord)]
pub struct Countdown(u32);

impl Countdown {
    /// Minimum countdown: 1 second.
    pub const MIN: Self = Self(1);

    /// Maximum countdown: 5999 seconds (`99:59`).
    pub const MAX: Self = Self(5_999);

    /// Returns the countdown as a number of seconds.
    pub fn as_secs(&self) -> u32 {
        self.0
    }

    /// Returns the countdown as a [`Duration`].
    pub fn as_duration(&self) -> Duration {
        Duration::seconds(self.0 as i64)
    }
}

impl TryFrom<u32> for Countdown {
    type Error = CountdownValidationError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        if value < Self::MIN.0 {
            return Err(CountdownValidationError::InvalidCountdownTooShort);
        }

        if value > Self::MAX.0 {
            return Err(CountdownValidationError::InvalidCountdownTooLong);
        }

        Ok(Self(value))
    }
}

impl TryFrom<u64> for Countdown {
    type Error = CountdownValidationError;

    fn try_from(value: u64) -> Result<Self, Self::Error> {
        let value = u32::try_from(value)
            .map_err(|_| CountdownValidationError::InvalidCountdownTooLong)?;
        Self::try_from(value)
    }
}

impl fmt::Display for Countdown {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", format_mm_ss(self.0))
    }
}

/// Validated time deduction applied to the countdown on a wrong submission or cut, in seconds.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Eq, Ord)]
pub struct PenaltySeconds(u32);

impl PenaltySeconds {
    /// Minimum penalty: 1 second.
    pub const MIN: Self = Self(1);

    /// Maximum penalty: 600 seconds.
    pub const MAX: Self = Self(600);

    /// Returns the penalty as a number of seconds.
    pub fn as_secs(&self) -> u32 {
        self.0
    }
}

impl TryFrom<u32> for PenaltySeconds {
    type Error = PenaltySecondsValidationError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        if value < Self::MIN.0 {
            return Err(PenaltySecondsValidationError::InvalidPenaltyTooShort);
        }

        if value > Self::MAX.0 {
            return Err(PenaltySecondsValidationError::InvalidPenaltyTooLong);
        }

        Ok(Self(value))
    }
}

impl fmt::Display for PenaltySeconds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}s", self.0)
    }
}

/// Validated sampling interval for solver workers and the session coordinator.
///
/// Bounded to keep polling responsive without busy-spinning.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Eq, Ord)]
pub struct PollInterval(time::Duration);

impl PollInterval {
    pub const MIN: Self = Self(time::Duration::from_millis(1));

    pub const MAX: Self = Self(time::Duration::from_secs(1));

    pub fn millis(millis: u64) -> Result<Self, PollIntervalValidationError> {
        Self::try_from(time::Duration::from_millis(millis))
    }

    /// Returns the poll interval as a [`time::Duration`].
    pub fn as_duration(&self) -> time::Duration {
        self.0
    }
}

impl TryFrom<time::Duration> for PollInterval {
    type Error = PollIntervalValidationError;

    fn try_from(value: time::Duration) -> Result<Self, Self::Error> {
        if value < Self::MIN.0 {
            return Err(PollIntervalValidationError::InvalidPollIntervalTooShort);
        }

        if value > Self::MAX.0 {
            return Err(PollIntervalValidationError::InvalidPollIntervalTooLong);
        }

        Ok(Self(value))
    }
}

impl fmt::Display for PollInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}ms", self.0.as_millis())
    }
}

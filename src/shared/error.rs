use thiserror::Error;

#[derive(Error, Debug)]
pub enum CountdownValidationError {
    #[error("Invalid `Countdown`, too short error")]
    InvalidCountdownTooShort,

    #[error("Invalid `Countdown`, too long error")]
    InvalidCountdownTooLong,
}

#[derive(Error, Debug)]
pub enum PenaltySecondsValidationError {
    #[error("Invalid `PenaltySeconds`, too short error")]
    InvalidPenaltyTooShort,

    #[error("Invalid `PenaltySeconds`, too long error")]
    InvalidPenaltyTooLong,
}

#[derive(Error, Debug)]
pub enum PollIntervalValidationError {
    #[error("Invalid `PollInterval`, too short error")]
    InvalidPollIntervalTooShort,

    #[error("Invalid `PollInterval`, too long error")]
    InvalidPollIntervalTooLong,
}

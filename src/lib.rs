#![doc = include_str!("../README.md")]

/// Exports [`GameClock`] and other types related to the countdown clock.
///
/// [`GameClock`]: crate::clock::GameClock
pub mod clock;
/// Exports [`DeviceBoard`], the input-source contracts consumed by phase solvers, and simulated
/// input devices.
///
/// [`DeviceBoard`]: crate::input::DeviceBoard
pub mod input;
/// Exports [`SessionEngine`], [`SessionController`], and other types related to running and
/// monitoring game sessions.
///
/// [`SessionEngine`]: crate::session::SessionEngine
/// [`SessionController`]: crate::session::SessionController
pub mod session;
mod shared;
/// Exports the [`PhaseSolver`] contract, the four phase solver variants, and their puzzle types.
///
/// [`PhaseSolver`]: crate::solver::PhaseSolver
pub mod solver;
mod util;

/// Error types returned by `defusal`.
pub mod error {
    pub use super::input::error::BoardValidationError;
    pub use super::session::{error::SessionError, process::error::SessionProcessFatalError};
    pub use super::shared::error::{
        CountdownValidationError, PenaltySecondsValidationError, PollIntervalValidationError,
    };
    pub use super::solver::error::SolverError;

    /// Convenience general-purpose Result type alias.
    pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;
}

/// Exports validated domain types shared across the crate.
pub mod models {
    pub use super::shared::{Countdown, PenaltySeconds, PhaseKind, PollInterval};
}

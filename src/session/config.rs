use tokio::time;

use crate::shared::{Countdown, PenaltySeconds, PollInterval};

/// Configuration for a game session.
#[derive(Clone, Debug)]
pub struct SessionConfig {
    countdown: Countdown,
    penalty: PenaltySeconds,
    solver_poll_interval: PollInterval,
    coordinator_tick_interval: PollInterval,
    clock_tick_interval: time::Duration,
    phase_advance_delay: time::Duration,
    shutdown_timeout: time::Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            countdown: Countdown::try_from(300u32).expect("within bounds"),
            penalty: PenaltySeconds::try_from(30u32).expect("within bounds"),
            solver_poll_interval: PollInterval::millis(100).expect("within bounds"),
            coordinator_tick_interval: PollInterval::millis(100).expect("within bounds"),
            clock_tick_interval: time::Duration::from_secs(1),
            phase_advance_delay: time::Duration::from_secs(1),
            shutdown_timeout: time::Duration::from_secs(6),
        }
    }
}

impl SessionConfig {
    /// Returns the total countdown for the session.
    pub fn countdown(&self) -> Countdown {
        self.countdown
    }

    /// Returns the time deduction applied per wrong submission or cut.
    pub fn penalty(&self) -> PenaltySeconds {
        self.penalty
    }

    /// Returns the sampling interval of the solver workers.
    pub fn solver_poll_interval(&self) -> PollInterval {
        self.solver_poll_interval
    }

    /// Returns the evaluation interval of the session coordinator.
    pub fn coordinator_tick_interval(&self) -> PollInterval {
        self.coordinator_tick_interval
    }

    /// Returns the wall-time duration of one countdown second.
    pub fn clock_tick_interval(&self) -> time::Duration {
        self.clock_tick_interval
    }

    /// Returns the delay between a phase being judged solved and the next phase's prompt.
    pub fn phase_advance_delay(&self) -> time::Duration {
        self.phase_advance_delay
    }

    /// Returns the timeout duration for graceful shutdown operations.
    pub fn shutdown_timeout(&self) -> time::Duration {
        self.shutdown_timeout
    }

    /// Sets the total countdown for the session.
    ///
    /// Default: `300` seconds
    pub fn with_countdown(mut self, countdown: Countdown) -> Self {
        self.countdown = countdown;
        self
    }

    /// Sets the time deduction applied per wrong submission or cut.
    ///
    /// Default: `30` seconds
    pub fn with_penalty(mut self, penalty: PenaltySeconds) -> Self {
        self.penalty = penalty;
        self
    }

    /// Sets the sampling interval of the solver workers.
    ///
    /// Default: `100` milliseconds
    pub fn with_solver_poll_interval(mut self, interval: PollInterval) -> Self {
        self.solver_poll_interval = interval;
        self
    }

    /// Sets the evaluation interval of the session coordinator.
    ///
    /// Default: `100` milliseconds
    pub fn with_coordinator_tick_interval(mut self, interval: PollInterval) -> Self {
        self.coordinator_tick_interval = interval;
        self
    }

    /// Sets the wall-time duration of one countdown second.
    ///
    /// Shorter values accelerate simulations; the countdown still decrements one second per
    /// tick.
    ///
    /// Default: `1` second
    pub fn with_clock_tick_interval(mut self, interval: time::Duration) -> Self {
        self.clock_tick_interval = interval;
        self
    }

    /// Sets the delay between a phase being judged solved and the next phase's prompt.
    ///
    /// Default: `1` second
    pub fn with_phase_advance_delay(mut self, delay: time::Duration) -> Self {
        self.phase_advance_delay = delay;
        self
    }

    /// Sets the timeout duration for graceful shutdown operations.
    ///
    /// Default: `6` seconds
    pub fn with_shutdown_timeout(mut self, secs: u64) -> Self {
        self.shutdown_timeout = time::Duration::from_secs(secs);
        self
    }
}

#[derive(Debug)]
pub(crate) struct SessionControllerConfig {
    shutdown_timeout: time::Duration,
}

impl SessionControllerConfig {
    pub fn shutdown_timeout(&self) -> time::Duration {
        self.shutdown_timeout
    }
}

impl From<&SessionConfig> for SessionControllerConfig {
    fn from(value: &SessionConfig) -> Self {
        Self {
            shutdown_timeout: value.shutdown_timeout,
        }
    }
}

#[derive(Clone, Debug)]
pub(crate) struct SessionProcessConfig {
    penalty: PenaltySeconds,
    solver_poll_interval: time::Duration,
    coordinator_tick_interval: time::Duration,
    clock_tick_interval: time::Duration,
    phase_advance_delay: time::Duration,
}

impl SessionProcessConfig {
    pub fn penalty(&self) -> PenaltySeconds {
        self.penalty
    }

    pub fn solver_poll_interval(&self) -> time::Duration {
        self.solver_poll_interval
    }

    pub fn coordinator_tick_interval(&self) -> time::Duration {
        self.coordinator_tick_interval
    }

    pub fn clock_tick_interval(&self) -> time::Duration {
        self.clock_tick_interval
    }

    pub fn phase_advance_delay(&self) -> time::Duration {
        self.phase_advance_delay
    }
}

impl From<&SessionConfig> for SessionProcessConfig {
    fn from(value: &SessionConfig) -> Self {
        Self {
            penalty: value.penalty,
            solver_poll_interval: value.solver_poll_interval.as_duration(),
            coordinator_tick_interval: value.coordinator_tick_interval.as_duration(),
            clock_tick_interval: value.clock_tick_interval,
            phase_advance_delay: value.phase_advance_delay,
        }
    }
}

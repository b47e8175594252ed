use std::sync::{Arc, Mutex, MutexGuard};

use tokio::time::{self, Duration};

use crate::{
    shared::{Countdown, PenaltySeconds, format_mm_ss},
    util::AbortOnDropHandle,
};

/// Outcome of a single clock tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockTick {
    /// The remaining time was decremented by one second.
    Decremented(u32),
    /// The clock is paused; remaining time unchanged.
    Idle,
    /// The remaining time reached zero on this tick. Signaled exactly once per session.
    Expired,
    /// The clock is no longer running; the tick was a no-op.
    Stopped,
}

#[derive(Debug)]
struct ClockInner {
    remaining: u32,
    paused: bool,
    running: bool,
    expired: bool,
}

/// Shared countdown clock for a session.
///
/// The remaining-time counter is the only piece of session state mutated from multiple workers:
/// the clock ticker decrements it while solvers' wrong answers subtract penalties. Both compound
/// operations run under the same mutex, so a decrement and a penalty subtraction can never drop
/// each other's update.
///
/// `running` is one-way: once the clock stops (expiry or [`stop`](Self::stop)) it never runs
/// again.
#[derive(Debug)]
pub struct GameClock {
    total: u32,
    inner: Mutex<ClockInner>,
}

impl GameClock {
    pub fn new(countdown: Countdown) -> Arc<Self> {
        Arc::new(Self {
            total: countdown.as_secs(),
            inner: Mutex::new(ClockInner {
                remaining: countdown.as_secs(),
                paused: false,
                running: true,
                expired: false,
            }),
        })
    }

    fn lock_inner(&self) -> MutexGuard<'_, ClockInner> {
        self.inner
            .lock()
            .expect("`GameClock` mutex can't be poisoned")
    }

    /// Advances the clock by one tick.
    ///
    /// Reaching zero remaining seconds returns [`ClockTick::Expired`] exactly once; the clock
    /// stops in the same operation, so every later tick is a no-op.
    pub(crate) fn tick(&self) -> ClockTick {
        let mut inner = self.lock_inner();

        if !inner.running {
            return ClockTick::Stopped;
        }

        if inner.paused {
            return ClockTick::Idle;
        }

        // A penalty may already have drained the counter since the last tick
        if inner.remaining > 0 {
            inner.remaining -= 1;
        }

        if inner.remaining == 0 {
            inner.expired = true;
            inner.running = false;
            return ClockTick::Expired;
        }

        ClockTick::Decremented(inner.remaining)
    }

    /// Subtracts a penalty from the remaining time, clamped at zero.
    ///
    /// Does not itself signal expiry; the next tick or coordinator poll observes the drained
    /// counter. Returns the remaining time after the deduction.
    pub fn apply_penalty(&self, penalty: PenaltySeconds) -> u32 {
        let mut inner = self.lock_inner();
        inner.remaining = inner.remaining.saturating_sub(penalty.as_secs());
        inner.remaining
    }

    /// Pauses the countdown. The clock worker keeps polling, but remaining time is frozen.
    pub fn pause(&self) {
        self.lock_inner().paused = true;
    }

    /// Resumes a paused countdown.
    pub fn resume(&self) {
        self.lock_inner().paused = false;
    }

    /// Stops the clock. One-way and idempotent; does not mark the clock as expired.
    pub fn stop(&self) {
        self.lock_inner().running = false;
    }

    pub fn remaining(&self) -> u32 {
        self.lock_inner().remaining
    }

    pub fn total(&self) -> u32 {
        self.total
    }

    pub fn is_running(&self) -> bool {
        self.lock_inner().running
    }

    pub fn is_paused(&self) -> bool {
        self.lock_inner().paused
    }

    /// Returns `true` if the countdown reached zero while running.
    pub fn is_expired(&self) -> bool {
        self.lock_inner().expired
    }

    /// Returns the remaining time formatted as `MM:SS`.
    pub fn formatted(&self) -> String {
        format_mm_ss(self.remaining())
    }

    /// Spawns the ticker worker, decrementing once per `tick_interval` of wall time.
    ///
    /// The worker exits when the clock expires or is stopped.
    pub(crate) fn spawn(self: &Arc<Self>, tick_interval: Duration) -> AbortOnDropHandle<()> {
        let clock = Arc::clone(self);

        tokio::spawn(async move {
            loop {
                time::sleep(tick_interval).await;

                if matches!(clock.tick(), ClockTick::Expired | ClockTick::Stopped) {
                    return;
                }
            }
        })
        .into()
    }
}

use std::sync::{Arc, Mutex, MutexGuard};

use tokio::sync::broadcast;

use crate::{
    shared::{PenaltySeconds, PhaseKind},
    solver::PhasePrompt,
};

use super::process::error::SessionProcessFatalError;

const UPDATE_CHANNEL_CAPACITY: usize = 256;

/// Lifecycle state of a game session.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionStatus {
    /// The session process is spawning its workers.
    Starting,
    /// The named phase is armed and being judged.
    Active(PhaseKind),
    /// All four phases were solved before the countdown expired.
    Won,
    /// The countdown reached zero with at least one phase unsolved.
    Lost,
    /// The session was shut down before reaching an outcome.
    Stopped,
    /// The session process failed and cannot continue.
    Terminated(Arc<SessionProcessFatalError>),
}

impl SessionStatus {
    /// Whether the session has reached a state it can never leave.
    pub fn is_final(&self) -> bool {
        matches!(
            self,
            Self::Won | Self::Lost | Self::Stopped | Self::Terminated(_)
        )
    }
}

/// Observable events published while a session runs.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionUpdate {
    /// The session process started its countdown and armed the first phase.
    Started { session_id: String, countdown: u32 },
    /// The session entered a new lifecycle state.
    Status(SessionStatus),
    /// Periodic countdown reading.
    Clock {
        remaining: u32,
        total: u32,
        formatted: String,
    },
    /// The active phase's prompt, published when the phase is armed.
    Prompt(PhasePrompt),
    /// A solver's visible input buffer changed.
    InputChanged { phase: PhaseKind, view: String },
    /// A wrong submission or cut was judged and its penalty applied.
    WrongAnswer {
        phase: PhaseKind,
        penalty: PenaltySeconds,
        remaining: u32,
    },
    /// The named phase was judged solved.
    PhaseSolved(PhaseKind),
}

pub(crate) type SessionTransmitter = broadcast::Sender<SessionUpdate>;
pub type SessionReceiver = broadcast::Receiver<SessionUpdate>;

/// Read-only view over a live session's broadcast state.
pub trait SessionReader: Send + Sync {
    /// Returns a receiver subscribed to the session's update stream.
    fn update_receiver(&self) -> SessionReceiver;

    /// Returns the most recently published lifecycle status.
    fn status_snapshot(&self) -> SessionStatus;
}

/// Holds the latest [`SessionStatus`] and fans updates out to subscribers.
pub(crate) struct SessionStatusManager {
    status: Mutex<SessionStatus>,
    update_tx: SessionTransmitter,
}

impl SessionStatusManager {
    pub fn new() -> Arc<Self> {
        let (update_tx, _) = broadcast::channel(UPDATE_CHANNEL_CAPACITY);

        Arc::new(Self {
            status: Mutex::new(SessionStatus::Starting),
            update_tx,
        })
    }

    fn lock_status(&self) -> MutexGuard<'_, SessionStatus> {
        self.status
            .lock()
            .expect("`SessionStatusManager` mutex can't be poisoned")
    }

    /// Publishes an update, recording the new status first when the update carries one.
    ///
    /// Send errors are ignored; a session with no subscribers still runs to completion.
    pub fn update(&self, update: SessionUpdate) {
        if let SessionUpdate::Status(status) = &update {
            *self.lock_status() = status.clone();
        }

        let _ = self.update_tx.send(update);
    }
}

impl SessionReader for SessionStatusManager {
    fn update_receiver(&self) -> SessionReceiver {
        self.update_tx.subscribe()
    }

    fn status_snapshot(&self) -> SessionStatus {
        self.lock_status().clone()
    }
}

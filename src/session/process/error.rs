use thiserror::Error;
use tokio::{sync::broadcast, task::JoinError};

use crate::shared::PhaseKind;

#[derive(Error, Debug)]
pub enum SessionProcessFatalError {
    #[error("solver event inbox closed while `{0}` phase was active")]
    EventInboxClosed(PhaseKind),
    #[error("failed to join session process task")]
    SessionProcessTaskJoin(#[from] JoinError),
    #[error("failed to receive shutdown signal")]
    ShutdownSignalRecv(#[from] broadcast::error::RecvError),
    #[error("failed to send shutdown signal")]
    SendShutdownSignalFailed(#[from] broadcast::error::SendError<()>),
    #[error("session process did not stop before the shutdown timeout")]
    ShutdownTimeout,
}

impl PartialEq for SessionProcessFatalError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::EventInboxClosed(a), Self::EventInboxClosed(b)) => a == b,
            (Self::SessionProcessTaskJoin(_), Self::SessionProcessTaskJoin(_)) => true,
            (Self::ShutdownSignalRecv(a), Self::ShutdownSignalRecv(b)) => a == b,
            (Self::SendShutdownSignalFailed(_), Self::SendShutdownSignalFailed(_)) => true,
            (Self::ShutdownTimeout, Self::ShutdownTimeout) => true,
            _ => false,
        }
    }
}

pub(crate) type ProcessResult<T> = Result<T, SessionProcessFatalError>;

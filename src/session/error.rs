use std::sync::Arc;

use thiserror::Error;

use super::{process::error::SessionProcessFatalError, state::SessionStatus};

pub type Result<T> = std::result::Result<T, SessionError>;

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("session has already been shut down")]
    SessionAlreadyShutdown,
    #[error("session process already stopped with status `{0:?}`")]
    SessionAlreadyStopped(SessionStatus),
    #[error("session shutdown failed")]
    SessionShutdownFailed(#[source] Arc<SessionProcessFatalError>),
}

use std::result;

use thiserror::Error;

use crate::shared::PhaseKind;

#[derive(Error, Debug)]
pub enum SolverError {
    #[error("`{0}` solver event inbox closed error")]
    EventInboxClosed(PhaseKind),
}

pub(crate) type SolverResult<T> = result::Result<T, SolverError>;

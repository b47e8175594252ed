use thiserror::Error;

use super::{TOGGLE_PIN_COUNT, WIRE_PIN_COUNT};

#[derive(Error, Debug)]
pub enum BoardValidationError {
    #[error("Invalid toggle pin count error, expected {TOGGLE_PIN_COUNT}, got {0}")]
    InvalidTogglePinCount(usize),

    #[error("Invalid wire pin count error, expected {WIRE_PIN_COUNT}, got {0}")]
    InvalidWirePinCount(usize),
}

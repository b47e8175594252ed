mod config;
mod engine;
mod state;

pub(crate) mod error;
pub(crate) mod process;

pub use config::SessionConfig;
pub use engine::{SessionController, SessionEngine};
pub use state::{SessionReader, SessionReceiver, SessionStatus, SessionUpdate};

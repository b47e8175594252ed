use std::sync::Arc;

use async_trait::async_trait;

use crate::{input::PinSource, shared::PhaseKind};

use super::{PhasePrompt, PhaseSolver, SolverFlags, error::SolverResult};

const INSTRUCTION: &str = "Press the button";

/// Solver for the button phase: solved the instant the input line first reads `true`.
///
/// No penalty path and no puzzle state beyond the instruction text.
pub struct ButtonSolver {
    pin: Arc<dyn PinSource>,
    flags: SolverFlags,
}

impl ButtonSolver {
    pub(crate) fn new(pin: Arc<dyn PinSource>) -> Self {
        Self {
            pin,
            flags: SolverFlags::new(),
        }
    }
}

#[async_trait]
impl PhaseSolver for ButtonSolver {
    fn kind(&self) -> PhaseKind {
        PhaseKind::Button
    }

    fn prompt(&self) -> PhasePrompt {
        PhasePrompt::Button {
            instruction: INSTRUCTION.to_string(),
        }
    }

    fn is_solved(&self) -> bool {
        self.flags.is_solved()
    }

    fn is_running(&self) -> bool {
        self.flags.is_running()
    }

    fn stop(&self) {
        self.flags.stop();
    }

    async fn poll_once(&self) -> SolverResult<()> {
        if self.pin.read() {
            self.flags.mark_solved();
        }

        Ok(())
    }
}

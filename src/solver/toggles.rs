use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use rand::seq::IndexedRandom;

use crate::{input::PinSource, shared::PhaseKind};

use super::{
    PhasePrompt, PhaseSolver, SolverEvent, SolverEventSender, SolverFlags,
    error::{SolverError, SolverResult},
};

/// Arithmetic problems whose answers fit in four bits.
const PROBLEM_POOL: [(&str, u8); 3] = [("2^3 + 3", 11), ("4 * 3 - 2", 10), ("5 + 2^2", 9)];

/// A toggles puzzle: an arithmetic expression and its answer encoded as a 4-bit binary target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TogglesPuzzle {
    expression: String,
    target: String,
}

impl TogglesPuzzle {
    pub(crate) fn generate() -> Self {
        let (expression, answer) = PROBLEM_POOL
            .choose(&mut rand::rng())
            .expect("problem pool is not empty");

        Self::new(expression, *answer)
    }

    pub(crate) fn new(expression: &str, answer: u8) -> Self {
        Self {
            expression: expression.to_string(),
            target: format!("{answer:04b}"),
        }
    }

    pub fn expression(&self) -> &str {
        &self.expression
    }

    /// The target bit-string the toggle lines must match.
    pub fn target(&self) -> &str {
        &self.target
    }
}

/// Solver for the toggles phase: four binary lines must match the puzzle's 4-bit target.
///
/// Toggles may be freely adjusted; there is no penalty path.
pub struct TogglesSolver {
    pins: Vec<Arc<dyn PinSource>>,
    puzzle: TogglesPuzzle,
    live: Mutex<String>,
    flags: SolverFlags,
    events: SolverEventSender,
}

impl TogglesSolver {
    pub(crate) fn new(pins: Vec<Arc<dyn PinSource>>, events: SolverEventSender) -> Self {
        Self::with_puzzle(pins, events, TogglesPuzzle::generate())
    }

    pub(crate) fn with_puzzle(
        pins: Vec<Arc<dyn PinSource>>,
        events: SolverEventSender,
        puzzle: TogglesPuzzle,
    ) -> Self {
        Self {
            pins,
            puzzle,
            live: Mutex::new(String::new()),
            flags: SolverFlags::new(),
            events,
        }
    }

    pub fn puzzle(&self) -> &TogglesPuzzle {
        &self.puzzle
    }

    fn lock_live(&self) -> MutexGuard<'_, String> {
        self.live
            .lock()
            .expect("`TogglesSolver` mutex can't be poisoned")
    }

    /// Reads all lines in one synchronous pass. A line flipping mid-sample produces a torn
    /// bit-string that is resolved on the next poll.
    fn sample(&self) -> String {
        self.pins
            .iter()
            .map(|pin| if pin.read() { '1' } else { '0' })
            .collect()
    }
}

#[async_trait]
impl PhaseSolver for TogglesSolver {
    fn kind(&self) -> PhaseKind {
        PhaseKind::Toggles
    }

    fn prompt(&self) -> PhasePrompt {
        PhasePrompt::Toggles {
            expression: self.puzzle.expression().to_string(),
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
        let value = self.sample();

        let changed = {
            let mut live = self.lock_live();
            if *live == value {
                false
            } else {
                live.clone_from(&value);
                true
            }
        };

        if changed {
            self.events
                .send(SolverEvent::InputChanged {
                    phase: self.kind(),
                    view: value.clone(),
                })
                .await
                .map_err(|_| SolverError::EventInboxClosed(self.kind()))?;
        }

        if value == self.puzzle.target() {
            self.flags.mark_solved();
        }

        Ok(())
    }
}

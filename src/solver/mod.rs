use std::{
    fmt,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
};

use async_trait::async_trait;
use tokio::{
    sync::mpsc,
    time::{self, Duration},
};

use crate::{
    shared::{PenaltySeconds, PhaseKind},
    util::AbortOnDropHandle,
};

mod button;
mod keypad;
mod toggles;
mod wires;

pub(crate) mod error;

pub use button::ButtonSolver;
pub use keypad::{KeypadPuzzle, KeypadSolver};
pub use toggles::{TogglesPuzzle, TogglesSolver};
pub use wires::{WireLabel, WireQuestion, WiresSolver};

use error::SolverResult;

/// Typed puzzle prompt a presentation layer renders when a phase becomes active.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PhasePrompt {
    /// Arithmetic expression whose answer must be entered on the toggles in 4-bit binary.
    Toggles { expression: String },
    /// Instruction text for the button phase.
    Button { instruction: String },
    /// The two operands to multiply, rendered in binary; the product is typed on the keypad.
    Keypad { operand_a: String, operand_b: String },
    /// Trivia question with one lettered choice per wire; the correct wire must be cut.
    Wires {
        question: String,
        choices: Vec<String>,
    },
}

impl PhasePrompt {
    /// Returns the phase this prompt belongs to.
    pub fn phase(&self) -> PhaseKind {
        match self {
            Self::Toggles { .. } => PhaseKind::Toggles,
            Self::Button { .. } => PhaseKind::Button,
            Self::Keypad { .. } => PhaseKind::Keypad,
            Self::Wires { .. } => PhaseKind::Wires,
        }
    }
}

impl fmt::Display for PhasePrompt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Toggles { expression } => write!(f, "Solve: {expression}"),
            Self::Button { instruction } => write!(f, "{instruction}"),
            Self::Keypad {
                operand_a,
                operand_b,
            } => write!(f, "Multiply: {operand_a} x {operand_b}"),
            Self::Wires { question, choices } => {
                write!(f, "{question}")?;
                for choice in choices {
                    write!(f, "\n{choice}")?;
                }
                Ok(())
            }
        }
    }
}

/// Events a solver reports to the session coordinator.
///
/// Solvers never touch the clock or the coordinator directly; the coordinator drains this inbox
/// on its tick and applies penalties itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum SolverEvent {
    /// The live sampled-state view of a phase changed.
    InputChanged { phase: PhaseKind, view: String },
    /// A wrong submission or cut was judged. Emitted at most once per wrong input.
    WrongAnswer {
        phase: PhaseKind,
        penalty: PenaltySeconds,
    },
}

pub(crate) type SolverEventSender = mpsc::Sender<SolverEvent>;

/// One-way lifecycle flags shared by every solver.
///
/// `solved` only transitions false to true, `running` only true to false. Release/Acquire
/// ordering publishes each flip to the coordinator's next read; no further locking is needed for
/// readers.
#[derive(Debug)]
pub(crate) struct SolverFlags {
    solved: AtomicBool,
    running: AtomicBool,
}

impl SolverFlags {
    pub(crate) fn new() -> Self {
        Self {
            solved: AtomicBool::new(false),
            running: AtomicBool::new(true),
        }
    }

    pub(crate) fn is_solved(&self) -> bool {
        self.solved.load(Ordering::Acquire)
    }

    pub(crate) fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    pub(crate) fn stop(&self) {
        self.running.store(false, Ordering::Release);
    }

    /// Marks the puzzle solved and stops the solver in one step.
    pub(crate) fn mark_solved(&self) {
        self.solved.store(true, Ordering::Release);
        self.running.store(false, Ordering::Release);
    }
}

/// Background worker judging whether a phase's puzzle is currently satisfied.
///
/// Implementations own their puzzle state exclusively; other components only read the one-way
/// flags and the prompt.
#[async_trait]
pub trait PhaseSolver: Send + Sync + 'static {
    fn kind(&self) -> PhaseKind;

    fn prompt(&self) -> PhasePrompt;

    /// Whether the puzzle has been solved. One-way: never returns to `false`.
    fn is_solved(&self) -> bool;

    fn is_running(&self) -> bool;

    /// Requests cooperative cancellation; the worker observes it on its next poll.
    fn stop(&self);

    /// Samples the solver's input sources once and judges the result.
    async fn poll_once(&self) -> SolverResult<()>;
}

/// Spawns the periodic polling worker for a solver.
///
/// The worker never blocks on any other component: it samples, sleeps, repeats. It exits when
/// the solver stops (solve, external stop, or a failed event send).
pub(crate) fn spawn_solver_worker(
    solver: Arc<dyn PhaseSolver>,
    poll_interval: Duration,
) -> AbortOnDropHandle<()> {
    tokio::spawn(async move {
        while solver.is_running() {
            if solver.poll_once().await.is_err() {
                // Event inbox gone; the coordinator is shutting down
                solver.stop();
                return;
            }

            time::sleep(poll_interval).await;
        }
    })
    .into()
}

#[cfg(test)]
mod tests;

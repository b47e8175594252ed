use std::{
    collections::HashSet,
    sync::{Arc, Mutex, MutexGuard},
};

use async_trait::async_trait;
use rand::seq::IndexedRandom;
use strum::{Display, EnumIter};

use crate::{
    input::{PinSource, WIRE_PIN_COUNT},
    shared::{PenaltySeconds, PhaseKind},
};

use super::{
    PhasePrompt, PhaseSolver, SolverEvent, SolverEventSender, SolverFlags,
    error::{SolverError, SolverResult},
};

/// Label of one of the five wires, matching the lettered answer choices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter)]
pub enum WireLabel {
    A,
    B,
    C,
    D,
    E,
}

impl WireLabel {
    pub(crate) fn from_index(index: usize) -> Option<Self> {
        use strum::IntoEnumIterator;

        Self::iter().nth(index)
    }
}

/// A wires question: trivia text, one lettered choice per wire, and the single correct wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WireQuestion {
    question: &'static str,
    choices: [&'static str; WIRE_PIN_COUNT],
    correct: WireLabel,
}

impl WireQuestion {
    pub fn question(&self) -> &'static str {
        self.question
    }

    pub fn choices(&self) -> &[&'static str; WIRE_PIN_COUNT] {
        &self.choices
    }

    pub fn correct(&self) -> WireLabel {
        self.correct
    }
}

pub(crate) static QUESTION_BANK: [WireQuestion; 4] = [
    WireQuestion {
        question: "What year was the University of Tampa founded?",
        choices: ["A. 1940", "B. 1931", "C. 1933", "D. 1924", "E. 2005"],
        correct: WireLabel::B,
    },
    WireQuestion {
        question: "What was the first cause of a computer bug?",
        choices: [
            "A. Syntax error",
            "B. Logic error",
            "C. Server crash",
            "D. A real life bug",
            "E. None",
        ],
        correct: WireLabel::D,
    },
    WireQuestion {
        question: "First school with a computer science program?",
        choices: [
            "A. Harvard",
            "B. UPenn",
            "C. Princeton",
            "D. MIT",
            "E. Cambridge",
        ],
        correct: WireLabel::E,
    },
    WireQuestion {
        question: "Who is considered the first programmer?",
        choices: [
            "A. Charles Babbage",
            "B. Alan Turing",
            "C. Ada Lovelace",
            "D. Grace Hopper",
            "E. John von Neumann",
        ],
        correct: WireLabel::C,
    },
];

/// Solver for the wires phase: five intact lines, one of which must be cut.
///
/// Each physical cut is judged exactly once; re-observing an already-cut wire never re-triggers
/// a penalty or solve. Wrong cuts keep the solver running so remaining wires stay judgeable.
pub struct WiresSolver {
    pins: Vec<Arc<dyn PinSource>>,
    question: &'static WireQuestion,
    penalty: PenaltySeconds,
    processed: Mutex<HashSet<WireLabel>>,
    flags: SolverFlags,
    events: SolverEventSender,
}

impl WiresSolver {
    pub(crate) fn new(
        pins: Vec<Arc<dyn PinSource>>,
        penalty: PenaltySeconds,
        events: SolverEventSender,
    ) -> Self {
        let question = QUESTION_BANK
            .choose(&mut rand::rng())
            .expect("question bank is not empty");

        Self::with_question(pins, penalty, events, question)
    }

    pub(crate) fn with_question(
        pins: Vec<Arc<dyn PinSource>>,
        penalty: PenaltySeconds,
        events: SolverEventSender,
        question: &'static WireQuestion,
    ) -> Self {
        Self {
            pins,
            question,
            penalty,
            processed: Mutex::new(HashSet::new()),
            flags: SolverFlags::new(),
            events,
        }
    }

    pub fn question(&self) -> &'static WireQuestion {
        self.question
    }

    fn lock_processed(&self) -> MutexGuard<'_, HashSet<WireLabel>> {
        self.processed
            .lock()
            .expect("`WiresSolver` mutex can't be poisoned")
    }
}

#[async_trait]
impl PhaseSolver for WiresSolver {
    fn kind(&self) -> PhaseKind {
        PhaseKind::Wires
    }

    fn prompt(&self) -> PhasePrompt {
        PhasePrompt::Wires {
            question: self.question.question().to_string(),
            choices: self
                .question
                .choices()
                .iter()
                .map(|choice| choice.to_string())
                .collect(),
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
        // Collect cuts not judged before, in wire order
        let newly_cut: Vec<WireLabel> = {
            let mut processed = self.lock_processed();

            self.pins
                .iter()
                .enumerate()
                .filter(|(_, pin)| !pin.read())
                .filter_map(|(index, _)| WireLabel::from_index(index))
                .filter(|label| processed.insert(*label))
                .collect()
        };

        for label in newly_cut {
            if label == self.question.correct() {
                self.flags.mark_solved();
                return Ok(());
            }

            self.events
                .send(SolverEvent::WrongAnswer {
                    phase: self.kind(),
                    penalty: self.penalty,
                })
                .await
                .map_err(|_| SolverError::EventInboxClosed(self.kind()))?;
        }

        Ok(())
    }
}

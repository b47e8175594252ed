use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use rand::Rng;

use crate::{
    input::{Key, KeypadSource},
    shared::{PenaltySeconds, PhaseKind},
};

use super::{
    PhasePrompt, PhaseSolver, SolverEvent, SolverEventSender, SolverFlags,
    error::{SolverError, SolverResult},
};

const OPERAND_MIN: u32 = 1;
const OPERAND_MAX: u32 = 255;

pub(crate) const TARGET_MIN: u32 = 1_000;
pub(crate) const TARGET_MAX: u32 = 9_999;

/// Bounds the rejection sampling; a valid pair is typically found within a few attempts.
const MAX_GENERATION_ATTEMPTS: u32 = 10_000;

/// Fallback operands should sampling exhaust its attempts: 63 * 64 = 4032.
const FALLBACK_OPERANDS: (u32, u32) = (63, 64);

pub(crate) const BUFFER_CAPACITY: usize = 4;

/// A keypad puzzle: two operands, shown in binary, whose decimal product is the 4-digit target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeypadPuzzle {
    operand_a: u32,
    operand_b: u32,
}

impl KeypadPuzzle {
    pub(crate) fn generate() -> Self {
        let mut rng = rand::rng();

        for _ in 0..MAX_GENERATION_ATTEMPTS {
            let operand_a = rng.random_range(OPERAND_MIN..=OPERAND_MAX);
            let operand_b = rng.random_range(OPERAND_MIN..=OPERAND_MAX);

            if (TARGET_MIN..=TARGET_MAX).contains(&(operand_a * operand_b)) {
                return Self::new(operand_a, operand_b);
            }
        }

        let (operand_a, operand_b) = FALLBACK_OPERANDS;
        Self::new(operand_a, operand_b)
    }

    pub(crate) fn new(operand_a: u32, operand_b: u32) -> Self {
        Self {
            operand_a,
            operand_b,
        }
    }

    pub fn operand_a_binary(&self) -> String {
        format!("{:b}", self.operand_a)
    }

    pub fn operand_b_binary(&self) -> String {
        format!("{:b}", self.operand_b)
    }

    /// The decimal product the player must type.
    pub fn target(&self) -> u32 {
        self.operand_a * self.operand_b
    }
}

enum KeyOutcome {
    Ignored,
    BufferChanged(String),
    Solved,
    Wrong,
}

/// Solver for the keypad phase: the player types the 4-digit product of two binary operands.
///
/// The keystroke source is edge-triggered; each poll consumes at most one pending key and clears
/// it so the same press is never judged twice.
pub struct KeypadSolver {
    keypad: Arc<dyn KeypadSource>,
    puzzle: KeypadPuzzle,
    penalty: PenaltySeconds,
    buffer: Mutex<String>,
    flags: SolverFlags,
    events: SolverEventSender,
}

impl KeypadSolver {
    pub(crate) fn new(
        keypad: Arc<dyn KeypadSource>,
        penalty: PenaltySeconds,
        events: SolverEventSender,
    ) -> Self {
        Self::with_puzzle(keypad, penalty, events, KeypadPuzzle::generate())
    }

    pub(crate) fn with_puzzle(
        keypad: Arc<dyn KeypadSource>,
        penalty: PenaltySeconds,
        events: SolverEventSender,
        puzzle: KeypadPuzzle,
    ) -> Self {
        Self {
            keypad,
            puzzle,
            penalty,
            buffer: Mutex::new(String::with_capacity(BUFFER_CAPACITY)),
            flags: SolverFlags::new(),
            events,
        }
    }

    pub fn puzzle(&self) -> &KeypadPuzzle {
        &self.puzzle
    }

    fn lock_buffer(&self) -> MutexGuard<'_, String> {
        self.buffer
            .lock()
            .expect("`KeypadSolver` mutex can't be poisoned")
    }

    fn apply_key(&self, key: Key) -> KeyOutcome {
        let mut buffer = self.lock_buffer();

        match key {
            Key::Delete => match buffer.pop() {
                Some(_) => KeyOutcome::BufferChanged(buffer.clone()),
                None => KeyOutcome::Ignored,
            },
            // Submitting an empty buffer is a no-op: no penalty, no match
            Key::Submit if buffer.is_empty() => KeyOutcome::Ignored,
            Key::Submit => {
                if buffer.parse::<u32>().ok() == Some(self.puzzle.target()) {
                    KeyOutcome::Solved
                } else {
                    buffer.clear();
                    KeyOutcome::Wrong
                }
            }
            Key::Digit(digit) if digit <= 9 && buffer.len() < BUFFER_CAPACITY => {
                buffer.push(char::from(b'0' + digit));
                KeyOutcome::BufferChanged(buffer.clone())
            }
            // Out-of-range digit samples and overflowing presses are absorbed silently
            Key::Digit(_) => KeyOutcome::Ignored,
        }
    }

    async fn send_input_changed(&self, view: String) -> SolverResult<()> {
        self.events
            .send(SolverEvent::InputChanged {
                phase: self.kind(),
                view,
            })
            .await
            .map_err(|_| SolverError::EventInboxClosed(self.kind()))
    }
}

#[async_trait]
impl PhaseSolver for KeypadSolver {
    fn kind(&self) -> PhaseKind {
        PhaseKind::Keypad
    }

    fn prompt(&self) -> PhasePrompt {
        PhasePrompt::Keypad {
            operand_a: self.puzzle.operand_a_binary(),
            operand_b: self.puzzle.operand_b_binary(),
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
        let Some(key) = self.keypad.peek_pressed_key() else {
            return Ok(());
        };
        self.keypad.clear_pressed_key();

        match self.apply_key(key) {
            KeyOutcome::Ignored => Ok(()),
            KeyOutcome::BufferChanged(view) => self.send_input_changed(view).await,
            KeyOutcome::Solved => {
                self.flags.mark_solved();
                Ok(())
            }
            KeyOutcome::Wrong => {
                self.events
                    .send(SolverEvent::WrongAnswer {
                        phase: self.kind(),
                        penalty: self.penalty,
                    })
                    .await
                    .map_err(|_| SolverError::EventInboxClosed(self.kind()))?;

                self.send_input_changed(String::new()).await
            }
        }
    }
}

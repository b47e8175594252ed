use std::sync::Arc;

use tokio::{
    sync::mpsc::{self, Receiver},
    time::{Duration, timeout},
};

use crate::input::{Key, PinSource, SimKeypad, SimPin};
use crate::shared::PenaltySeconds;

use super::*;

fn event_channel() -> (SolverEventSender, Receiver<SolverEvent>) {
    mpsc::channel(16)
}

fn penalty() -> PenaltySeconds {
    PenaltySeconds::try_from(30u32).unwrap()
}

fn as_pin_sources<const N: usize>(pins: &[Arc<SimPin>; N]) -> Vec<Arc<dyn PinSource>> {
    pins.iter()
        .map(|pin| pin.clone() as Arc<dyn PinSource>)
        .collect()
}

mod toggles {
    use super::*;

    fn solver_with_pins() -> (TogglesSolver, [Arc<SimPin>; 4], Receiver<SolverEvent>) {
        let pins: [Arc<SimPin>; 4] = std::array::from_fn(|_| SimPin::low());
        let (events_tx, events_rx) = event_channel();

        let solver = TogglesSolver::with_puzzle(
            as_pin_sources(&pins),
            events_tx,
            TogglesPuzzle::new("2^3 + 3", 11),
        );

        (solver, pins, events_rx)
    }

    #[tokio::test]
    async fn solves_when_lines_match_the_target() {
        let (solver, pins, _events_rx) = solver_with_pins();

        // 11 = 1011
        pins[0].set(true);
        pins[2].set(true);
        pins[3].set(true);

        solver.poll_once().await.unwrap();

        assert!(solver.is_solved());
        assert!(!solver.is_running());
    }

    #[tokio::test]
    async fn emits_input_changed_only_when_the_sample_changes() {
        let (solver, pins, mut events_rx) = solver_with_pins();

        solver.poll_once().await.unwrap();
        assert_eq!(
            events_rx.try_recv().unwrap(),
            SolverEvent::InputChanged {
                phase: PhaseKind::Toggles,
                view: "0000".to_string(),
            }
        );

        // Unchanged sample: no event
        solver.poll_once().await.unwrap();
        assert!(events_rx.try_recv().is_err());

        pins[1].set(true);
        solver.poll_once().await.unwrap();
        assert_eq!(
            events_rx.try_recv().unwrap(),
            SolverEvent::InputChanged {
                phase: PhaseKind::Toggles,
                view: "0100".to_string(),
            }
        );
    }

    #[tokio::test]
    async fn mismatched_lines_never_trigger_a_penalty() {
        let (solver, pins, mut events_rx) = solver_with_pins();

        for _ in 0..5 {
            pins[0].toggle();
            solver.poll_once().await.unwrap();
        }

        assert!(!solver.is_solved());
        while let Ok(event) = events_rx.try_recv() {
            assert!(matches!(event, SolverEvent::InputChanged { .. }));
        }
    }
}

mod button {
    use super::*;

    #[tokio::test]
    async fn solves_on_the_first_pressed_sample() {
        let pin = SimPin::low();
        let solver = ButtonSolver::new(pin.clone());

        solver.poll_once().await.unwrap();
        assert!(!solver.is_solved());

        pin.set(true);
        solver.poll_once().await.unwrap();

        assert!(solver.is_solved());
        assert!(!solver.is_running());
    }
}

mod keypad {
    use super::*;
    use super::super::keypad::{TARGET_MAX, TARGET_MIN};

    fn solver_with_keypad() -> (KeypadSolver, Arc<SimKeypad>, Receiver<SolverEvent>) {
        let keypad = SimKeypad::new();
        let (events_tx, events_rx) = event_channel();

        // 33 * 129 = 4257
        let solver = KeypadSolver::with_puzzle(
            keypad.clone(),
            penalty(),
            events_tx,
            KeypadPuzzle::new(33, 129),
        );

        (solver, keypad, events_rx)
    }

    async fn press_and_poll(solver: &KeypadSolver, keypad: &SimKeypad, key: Key) {
        keypad.press(key);
        solver.poll_once().await.unwrap();
    }

    #[test]
    fn generated_puzzles_multiply_into_the_target_range() {
        for _ in 0..100 {
            let puzzle = KeypadPuzzle::generate();

            let operand_a = u32::from_str_radix(&puzzle.operand_a_binary(), 2).unwrap();
            let operand_b = u32::from_str_radix(&puzzle.operand_b_binary(), 2).unwrap();

            assert!((1..=255).contains(&operand_a));
            assert!((1..=255).contains(&operand_b));
            assert!((TARGET_MIN..=TARGET_MAX).contains(&puzzle.target()));
            assert_eq!(puzzle.target(), operand_a * operand_b);
        }
    }

    #[tokio::test]
    async fn typed_digits_build_the_buffer_and_submit_solves() {
        let (solver, keypad, mut events_rx) = solver_with_keypad();

        for (digit, view) in [(4, "4"), (2, "42"), (5, "425"), (7, "4257")] {
            press_and_poll(&solver, &keypad, Key::Digit(digit)).await;
            assert_eq!(
                events_rx.try_recv().unwrap(),
                SolverEvent::InputChanged {
                    phase: PhaseKind::Keypad,
                    view: view.to_string(),
                }
            );
        }

        press_and_poll(&solver, &keypad, Key::Submit).await;

        assert!(solver.is_solved());
        assert!(!solver.is_running());
    }

    #[tokio::test]
    async fn wrong_submission_penalizes_and_clears_the_buffer() {
        let (solver, keypad, mut events_rx) = solver_with_keypad();

        press_and_poll(&solver, &keypad, Key::Digit(1)).await;
        press_and_poll(&solver, &keypad, Key::Submit).await;

        assert!(!solver.is_solved());
        assert!(solver.is_running());

        // The InputChanged for the typed digit comes first
        assert_eq!(
            events_rx.try_recv().unwrap(),
            SolverEvent::InputChanged {
                phase: PhaseKind::Keypad,
                view: "1".to_string(),
            }
        );
        assert_eq!(
            events_rx.try_recv().unwrap(),
            SolverEvent::WrongAnswer {
                phase: PhaseKind::Keypad,
                penalty: penalty(),
            }
        );
        assert_eq!(
            events_rx.try_recv().unwrap(),
            SolverEvent::InputChanged {
                phase: PhaseKind::Keypad,
                view: String::new(),
            }
        );
    }

    #[tokio::test]
    async fn submitting_an_empty_buffer_is_a_no_op() {
        let (solver, keypad, mut events_rx) = solver_with_keypad();

        press_and_poll(&solver, &keypad, Key::Submit).await;

        assert!(!solver.is_solved());
        assert!(events_rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn deleting_from_an_empty_buffer_is_a_no_op() {
        let (solver, keypad, mut events_rx) = solver_with_keypad();

        press_and_poll(&solver, &keypad, Key::Delete).await;

        assert!(!solver.is_solved());
        assert!(events_rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn delete_removes_the_last_typed_digit() {
        let (solver, keypad, mut events_rx) = solver_with_keypad();

        press_and_poll(&solver, &keypad, Key::Digit(4)).await;
        press_and_poll(&solver, &keypad, Key::Digit(9)).await;
        press_and_poll(&solver, &keypad, Key::Delete).await;

        let mut last_view = None;
        while let Ok(SolverEvent::InputChanged { view, .. }) = events_rx.try_recv() {
            last_view = Some(view);
        }
        assert_eq!(last_view.as_deref(), Some("4"));
    }

    #[tokio::test]
    async fn digits_beyond_capacity_are_absorbed() {
        let (solver, keypad, mut events_rx) = solver_with_keypad();

        for digit in [1, 2, 3, 4] {
            press_and_poll(&solver, &keypad, Key::Digit(digit)).await;
        }
        while events_rx.try_recv().is_ok() {}

        // A fifth digit neither grows the buffer nor emits an event
        press_and_poll(&solver, &keypad, Key::Digit(5)).await;
        assert!(events_rx.try_recv().is_err());

        press_and_poll(&solver, &keypad, Key::Submit).await;
        assert!(matches!(
            events_rx.try_recv().unwrap(),
            SolverEvent::WrongAnswer { .. }
        ));
    }

    #[tokio::test]
    async fn out_of_range_digit_samples_are_absorbed() {
        let (solver, keypad, mut events_rx) = solver_with_keypad();

        press_and_poll(&solver, &keypad, Key::Digit(12)).await;

        assert!(events_rx.try_recv().is_err());
    }
}

mod wires {
    use super::*;
    use super::super::wires::QUESTION_BANK;

    fn solver_with_pins() -> (WiresSolver, [Arc<SimPin>; 5], Receiver<SolverEvent>) {
        let pins: [Arc<SimPin>; 5] = std::array::from_fn(|_| SimPin::high());
        let (events_tx, events_rx) = event_channel();

        // Correct wire: B
        let solver = WiresSolver::with_question(
            as_pin_sources(&pins),
            penalty(),
            events_tx,
            &QUESTION_BANK[0],
        );

        (solver, pins, events_rx)
    }

    #[tokio::test]
    async fn cutting_the_correct_wire_solves() {
        let (solver, pins, mut events_rx) = solver_with_pins();

        pins[1].set(false);
        solver.poll_once().await.unwrap();

        assert!(solver.is_solved());
        assert!(!solver.is_running());
        assert!(events_rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn wrong_cut_penalizes_exactly_once() {
        let (solver, pins, mut events_rx) = solver_with_pins();

        pins[0].set(false);

        // The cut stays visible on every later poll but is judged only once
        solver.poll_once().await.unwrap();
        solver.poll_once().await.unwrap();
        solver.poll_once().await.unwrap();

        assert_eq!(
            events_rx.try_recv().unwrap(),
            SolverEvent::WrongAnswer {
                phase: PhaseKind::Wires,
                penalty: penalty(),
            }
        );
        assert!(events_rx.try_recv().is_err());
        assert!(!solver.is_solved());
        assert!(solver.is_running());
    }

    #[tokio::test]
    async fn wrong_cut_then_correct_cut_penalizes_then_solves() {
        let (solver, pins, mut events_rx) = solver_with_pins();

        pins[4].set(false);
        solver.poll_once().await.unwrap();

        pins[1].set(false);
        solver.poll_once().await.unwrap();

        assert_eq!(
            events_rx.try_recv().unwrap(),
            SolverEvent::WrongAnswer {
                phase: PhaseKind::Wires,
                penalty: penalty(),
            }
        );
        assert!(solver.is_solved());
    }

    #[test]
    fn every_bank_question_has_one_choice_per_wire() {
        for question in &QUESTION_BANK {
            assert_eq!(question.choices().len(), 5);
            assert!(!question.question().is_empty());
        }
    }
}

mod worker {
    use super::*;

    #[tokio::test]
    async fn worker_exits_once_the_solver_is_solved() {
        let pin = SimPin::high();
        let solver: Arc<dyn PhaseSolver> = Arc::new(ButtonSolver::new(pin));

        let mut handle = spawn_solver_worker(solver.clone(), Duration::from_millis(1));

        timeout(Duration::from_secs(1), &mut handle)
            .await
            .expect("worker should exit after the solve")
            .unwrap();

        assert!(solver.is_solved());
        assert!(!solver.is_running());
    }

    #[tokio::test]
    async fn worker_stops_when_the_event_inbox_closes() {
        let pins: [Arc<SimPin>; 4] = std::array::from_fn(|_| SimPin::low());
        let (events_tx, events_rx) = event_channel();
        drop(events_rx);

        let solver: Arc<dyn PhaseSolver> =
            Arc::new(TogglesSolver::with_puzzle(
                as_pin_sources(&pins),
                events_tx,
                TogglesPuzzle::new("2^3 + 3", 11),
            ));

        let mut handle = spawn_solver_worker(solver.clone(), Duration::from_millis(1));

        timeout(Duration::from_secs(1), &mut handle)
            .await
            .expect("worker should exit after the failed send")
            .unwrap();

        assert!(!solver.is_running());
        assert!(!solver.is_solved());
    }

    #[tokio::test]
    async fn external_stop_is_observed_on_the_next_poll() {
        let pin = SimPin::low();
        let solver: Arc<dyn PhaseSolver> = Arc::new(ButtonSolver::new(pin));

        let mut handle = spawn_solver_worker(solver.clone(), Duration::from_millis(1));

        solver.stop();

        timeout(Duration::from_secs(1), &mut handle)
            .await
            .expect("worker should observe the stop")
            .unwrap();

        assert!(!solver.is_running());
    }
}

use std::sync::Arc;

use tokio::{
    sync::{
        broadcast,
        mpsc::{self, error::TryRecvError},
    },
    time,
};

use crate::{
    clock::GameClock,
    input::DeviceBoard,
    shared::PhaseKind,
    solver::{
        ButtonSolver, KeypadSolver, PhaseSolver, SolverEvent, TogglesSolver, WiresSolver,
        spawn_solver_worker,
    },
    util::AbortOnDropHandle,
};

use super::{
    config::SessionProcessConfig,
    state::{SessionReader, SessionStatus, SessionStatusManager, SessionUpdate},
};

pub(crate) mod error;

use error::{ProcessResult, SessionProcessFatalError};

const SOLVER_EVENT_INBOX_CAPACITY: usize = 256;

/// Background task driving one game session to its outcome.
///
/// Owns the solver set and the solver event inbox. Each coordinator tick drains pending solver
/// events, publishes the countdown, and judges expiry before solve so a drained clock always
/// loses the session.
pub(crate) struct SessionProcess {
    config: SessionProcessConfig,
    session_id: String,
    clock: Arc<GameClock>,
    solvers: [Arc<dyn PhaseSolver>; PhaseKind::ORDERED.len()],
    events_rx: mpsc::Receiver<SolverEvent>,
    active: usize,
    last_published_remaining: Option<u32>,
    status_manager: Arc<SessionStatusManager>,
}

impl SessionProcess {
    /// Spawns the session process and its workers.
    ///
    /// The returned handle aborts the coordinator on drop; the coordinator in turn holds the
    /// clock and solver worker handles, so the whole worker tree dies with it.
    pub fn spawn(
        config: SessionProcessConfig,
        session_id: String,
        board: DeviceBoard,
        clock: Arc<GameClock>,
        status_manager: Arc<SessionStatusManager>,
        shutdown_tx: broadcast::Sender<()>,
    ) -> AbortOnDropHandle<()> {
        let (events_tx, events_rx) = mpsc::channel(SOLVER_EVENT_INBOX_CAPACITY);

        let (toggle_pins, button_pin, keypad, wire_pins) = board.into_parts();

        let solvers: [Arc<dyn PhaseSolver>; PhaseKind::ORDERED.len()] = [
            Arc::new(TogglesSolver::new(toggle_pins, events_tx.clone())),
            Arc::new(ButtonSolver::new(button_pin)),
            Arc::new(KeypadSolver::new(
                keypad,
                config.penalty(),
                events_tx.clone(),
            )),
            Arc::new(WiresSolver::new(wire_pins, config.penalty(), events_tx)),
        ];

        let process = Self {
            config,
            session_id,
            clock,
            solvers,
            events_rx,
            active: 0,
            last_published_remaining: None,
            status_manager,
        };

        tokio::spawn(process.run_loop(shutdown_tx.subscribe())).into()
    }

    async fn run_loop(mut self, mut shutdown_rx: broadcast::Receiver<()>) {
        let _clock_worker = self.clock.spawn(self.config.clock_tick_interval());

        let _solver_workers: Vec<AbortOnDropHandle<()>> = self
            .solvers
            .iter()
            .map(|solver| spawn_solver_worker(Arc::clone(solver), self.config.solver_poll_interval()))
            .collect();

        let res = tokio::select! {
            res = self.run() => res,
            res = shutdown_rx.recv() => res.map_err(SessionProcessFatalError::from),
        };

        match res {
            Ok(()) => {
                // Either the session reached an outcome or a shutdown signal arrived
                if !self.status_manager.status_snapshot().is_final() {
                    self.finish(SessionStatus::Stopped);
                }
            }
            Err(error) => {
                self.finish(SessionStatus::Terminated(Arc::new(error)));
            }
        }
    }

    async fn run(&mut self) -> ProcessResult<()> {
        self.status_manager.update(SessionUpdate::Started {
            session_id: self.session_id.clone(),
            countdown: self.clock.total(),
        });

        self.arm_active_phase();

        let mut interval = time::interval(self.config.coordinator_tick_interval());
        interval.set_missed_tick_behavior(time::MissedTickBehavior::Delay);

        loop {
            interval.tick().await;

            self.drain_solver_events()?;
            self.publish_clock();

            // Expiry is judged before solve, so a drained clock wins any race
            if self.clock.is_expired() || self.clock.remaining() == 0 {
                self.finish(SessionStatus::Lost);
                return Ok(());
            }

            if self.solvers[self.active].is_solved() {
                self.status_manager
                    .update(SessionUpdate::PhaseSolved(self.solvers[self.active].kind()));

                self.active += 1;

                if self.active == self.solvers.len() {
                    self.finish(SessionStatus::Won);
                    return Ok(());
                }

                time::sleep(self.config.phase_advance_delay()).await;
                self.arm_active_phase();
            }
        }
    }

    /// Publishes the new active phase and its prompt.
    fn arm_active_phase(&self) {
        let solver = &self.solvers[self.active];

        self.status_manager
            .update(SessionUpdate::Status(SessionStatus::Active(solver.kind())));
        self.status_manager
            .update(SessionUpdate::Prompt(solver.prompt()));
    }

    /// Drains the solver event inbox without blocking, applying penalties as they surface.
    fn drain_solver_events(&mut self) -> ProcessResult<()> {
        loop {
            match self.events_rx.try_recv() {
                Ok(SolverEvent::WrongAnswer { phase, penalty }) => {
                    let remaining = self.clock.apply_penalty(penalty);

                    self.status_manager.update(SessionUpdate::WrongAnswer {
                        phase,
                        penalty,
                        remaining,
                    });
                }
                Ok(SolverEvent::InputChanged { phase, view }) => {
                    self.status_manager
                        .update(SessionUpdate::InputChanged { phase, view });
                }
                Err(TryRecvError::Empty) => return Ok(()),
                // Unreachable while `solvers` is alive; treated as fatal if it ever surfaces
                Err(TryRecvError::Disconnected) => {
                    return Err(SessionProcessFatalError::EventInboxClosed(
                        self.solvers[self.active].kind(),
                    ));
                }
            }
        }
    }

    /// Publishes the countdown reading if it changed since the last publication.
    fn publish_clock(&mut self) {
        let remaining = self.clock.remaining();

        if self.last_published_remaining == Some(remaining) {
            return;
        }
        self.last_published_remaining = Some(remaining);

        self.status_manager.update(SessionUpdate::Clock {
            remaining,
            total: self.clock.total(),
            formatted: self.clock.formatted(),
        });
    }

    /// Stops the clock and every solver, then publishes the final status.
    fn finish(&self, status: SessionStatus) {
        self.clock.stop();

        for solver in &self.solvers {
            solver.stop();
        }

        self.status_manager.update(SessionUpdate::Status(status));
    }
}

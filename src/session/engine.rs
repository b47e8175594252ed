use std::sync::{Arc, Mutex};

use tokio::{
    sync::broadcast::{self, error::RecvError},
    time,
};
use uuid::Uuid;

use crate::{clock::GameClock, input::DeviceBoard, util::AbortOnDropHandle};

use super::{
    config::{SessionConfig, SessionControllerConfig},
    error::{Result, SessionError},
    process::{SessionProcess, error::SessionProcessFatalError},
    state::{SessionReader, SessionReceiver, SessionStatus, SessionStatusManager, SessionUpdate},
};

/// Controller for managing and monitoring a running game session.
///
/// `SessionController` provides an interface to observe the session's progress, pause and resume
/// the countdown, and perform graceful shutdown. It holds a handle to the running session task
/// and coordinates shutdown signals.
pub struct SessionController {
    config: SessionControllerConfig,
    session_id: String,
    clock: Arc<GameClock>,
    handle: Mutex<Option<AbortOnDropHandle<()>>>,
    shutdown_tx: broadcast::Sender<()>,
    status_manager: Arc<SessionStatusManager>,
}

impl SessionController {
    fn new(
        config: &SessionConfig,
        session_id: String,
        clock: Arc<GameClock>,
        handle: AbortOnDropHandle<()>,
        shutdown_tx: broadcast::Sender<()>,
        status_manager: Arc<SessionStatusManager>,
    ) -> Arc<Self> {
        Arc::new(Self {
            config: config.into(),
            session_id,
            clock,
            handle: Mutex::new(Some(handle)),
            shutdown_tx,
            status_manager,
        })
    }

    /// Returns the unique identifier assigned to this session.
    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// Returns a [`SessionReader`] interface for accessing session status and updates.
    pub fn reader(&self) -> Arc<dyn SessionReader> {
        self.status_manager.clone()
    }

    /// Creates a new [`SessionReceiver`] for subscribing to session updates.
    pub fn update_receiver(&self) -> SessionReceiver {
        self.status_manager.update_receiver()
    }

    /// Returns the current [`SessionStatus`] as a snapshot.
    pub fn status_snapshot(&self) -> SessionStatus {
        self.status_manager.status_snapshot()
    }

    /// Freezes the countdown. Solvers keep polling; only the clock is affected.
    pub fn pause(&self) {
        self.clock.pause();
    }

    /// Resumes a paused countdown.
    pub fn resume(&self) {
        self.clock.resume();
    }

    /// Whether the countdown is currently paused.
    pub fn is_paused(&self) -> bool {
        self.clock.is_paused()
    }

    /// Returns the remaining countdown in seconds.
    pub fn remaining(&self) -> u32 {
        self.clock.remaining()
    }

    fn try_consume_handle(&self) -> Option<AbortOnDropHandle<()>> {
        self.handle
            .lock()
            .expect("`SessionController` mutex can't be poisoned")
            .take()
    }

    /// Tries to perform a clean shutdown of the session process and consumes the task handle.
    ///
    /// If a clean shutdown fails, the process is aborted. This method can only be called once
    /// per controller instance.
    ///
    /// Returns an error if the process had to be aborted, or if the handle was already consumed.
    pub async fn shutdown(&self) -> Result<()> {
        let Some(mut handle) = self.try_consume_handle() else {
            return Err(SessionError::SessionAlreadyShutdown);
        };

        if handle.is_finished() {
            let status = self.status_manager.status_snapshot();
            return Err(SessionError::SessionAlreadyStopped(status));
        }

        let shutdown_send_res = self.shutdown_tx.send(()).map_err(|e| {
            handle.abort();
            SessionProcessFatalError::SendShutdownSignalFailed(e)
        });

        let shutdown_res = match shutdown_send_res {
            Ok(_) => {
                tokio::select! {
                    join_res = &mut handle => {
                        join_res.map_err(SessionProcessFatalError::SessionProcessTaskJoin)
                    }
                    _ = time::sleep(self.config.shutdown_timeout()) => {
                        handle.abort();
                        Err(SessionProcessFatalError::ShutdownTimeout)
                    }
                }
            }
            Err(e) => Err(e),
        };

        if let Err(e) = shutdown_res {
            let e_ref = Arc::new(e);
            self.status_manager
                .update(SessionUpdate::Status(SessionStatus::Terminated(
                    e_ref.clone(),
                )));

            return Err(SessionError::SessionShutdownFailed(e_ref));
        }

        Ok(())
    }

    /// Waits until the session process has stopped and returns the final status.
    ///
    /// This method blocks until the session reaches a final state, whether an outcome, a
    /// graceful shutdown, or termination.
    pub async fn until_stopped(&self) -> SessionStatus {
        let mut update_rx = self.update_receiver();

        let status = self.status_snapshot();
        if status.is_final() {
            return status;
        }

        loop {
            match update_rx.recv().await {
                Ok(update) => {
                    if let SessionUpdate::Status(status) = update
                        && status.is_final()
                    {
                        return status;
                    }
                }
                Err(RecvError::Lagged(_)) => {
                    let status = self.status_snapshot();
                    if status.is_final() {
                        return status;
                    }
                }
                Err(RecvError::Closed) => return self.status_snapshot(),
            }
        }
    }
}

/// Builder for configuring and starting a game session.
///
/// `SessionEngine` encapsulates the session configuration and the input board. The session
/// process is spawned when [`start`](Self::start) is called, and a [`SessionController`] is
/// returned for monitoring and management.
pub struct SessionEngine {
    config: SessionConfig,
    board: DeviceBoard,
    status_manager: Arc<SessionStatusManager>,
}

impl SessionEngine {
    /// Creates a new engine over the given input board with the default configuration.
    pub fn new(board: DeviceBoard) -> Self {
        Self::with_config(board, SessionConfig::default())
    }

    /// Creates a new engine over the given input board with the specified configuration.
    pub fn with_config(board: DeviceBoard, config: SessionConfig) -> Self {
        Self {
            config,
            board,
            status_manager: SessionStatusManager::new(),
        }
    }

    /// Returns a reader interface for accessing session status and updates.
    pub fn reader(&self) -> Arc<dyn SessionReader> {
        self.status_manager.clone()
    }

    /// Creates a new receiver for subscribing to session updates.
    pub fn update_receiver(&self) -> SessionReceiver {
        self.status_manager.update_receiver()
    }

    /// Returns the current session status as a snapshot.
    pub fn status_snapshot(&self) -> SessionStatus {
        self.status_manager.status_snapshot()
    }

    /// Starts the session process and returns a [`SessionController`] for managing it.
    ///
    /// This consumes the engine and spawns the session task in the background. The countdown
    /// starts immediately.
    pub fn start(self) -> Arc<SessionController> {
        let session_id = Uuid::new_v4().to_string();
        let clock = GameClock::new(self.config.countdown());

        let (shutdown_tx, _) = broadcast::channel::<()>(1);

        let handle = SessionProcess::spawn(
            (&self.config).into(),
            session_id.clone(),
            self.board,
            clock.clone(),
            self.status_manager.clone(),
            shutdown_tx.clone(),
        );

        SessionController::new(
            &self.config,
            session_id,
            clock,
            handle,
            shutdown_tx,
            self.status_manager,
        )
    }
}

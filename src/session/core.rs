//! # Session manager: lifecycle of a scheduler session against the master.
//!
//! [`Session`] owns the driver handle, the lifecycle state cell, and the
//! per-task watch table, and converts the push-style event stream plus the
//! command-style driver surface into lifecycle-aware async results.
//!
//! ## Architecture
//! ```text
//! caller ──► Session::connect()     ──► CAS state ──► arm subscription ──► driver.start()
//!        ──► Session::launch()      ──► arm launch-watches ──► driver.launch_tasks()
//!        ──► Session::kill()        ──► arm kill-watch ──► driver.kill_task()
//!        ──► Session::disconnect()  ──► drain watches ──► driver.stop() ──► join (blocking)
//!
//! driver ──► Bus ──► {connect-watch, launch-watches, terminal-watches, kill-watches}
//! ```
//!
//! ## Rules
//! - Subscriptions are always armed **before** the driver command they
//!   observe, so no event can slip between command and watch.
//! - Timeouts count from subscription arm time and resolve each result at
//!   most once; later matching events are discarded with the subscription.
//! - State reads outside a CAS are hints; every mutation re-validates
//!   through [`StateCell::transition`].

use std::sync::Arc;

use tracing::{debug, warn};

use crate::config::Config;
use crate::driver::{Driver, DriverStatus};
use crate::error::SessionError;
use crate::events::{Bus, Event, MasterInfo, Signal, Subscription};
use crate::model::{FrameworkId, OfferId, TaskId, TaskInfo, TaskState};
use crate::session::state::StateCell;
use crate::session::watch::{spawn_launch_watch, LaunchedTask, WatchTable};
use crate::session::SessionState;

/// Successful registration with the master.
#[derive(Debug, Clone, PartialEq)]
pub struct Registration {
    /// Framework id assigned by the master.
    pub framework_id: FrameworkId,
    /// The master the session registered with.
    pub master: MasterInfo,
}

/// How a session is being torn down.
enum StopMode {
    /// Stop with failover: the framework stays registered.
    Disconnect,
    /// Stop without failover: the framework unregisters.
    Terminate,
    /// Abort the driver without unregistering.
    Abort,
}

impl StopMode {
    fn operation(&self) -> &'static str {
        match self {
            StopMode::Disconnect => "disconnect",
            StopMode::Terminate => "terminate",
            StopMode::Abort => "abort",
        }
    }
}

/// Manages the lifecycle of one scheduler session.
///
/// All operations are safe to invoke concurrently; lifecycle transitions are
/// serialized through an atomic compare-and-set.
pub struct Session {
    driver: Arc<dyn Driver>,
    bus: Bus,
    cfg: Config,
    state: Arc<StateCell>,
    watches: Arc<WatchTable>,
}

impl Session {
    /// Creates a session over the given driver and event bus.
    ///
    /// The bus must be the one the driver publishes its events on.
    pub fn new(driver: Arc<dyn Driver>, bus: Bus, cfg: Config) -> Self {
        Self {
            driver,
            bus,
            cfg,
            state: Arc::new(StateCell::new()),
            watches: Arc::new(WatchTable::new()),
        }
    }

    /// Current lifecycle state. A hint only; it may change immediately.
    pub fn state(&self) -> SessionState {
        self.state.load()
    }

    /// Read-only view of the event stream.
    pub fn events(&self) -> Subscription {
        self.bus.subscribe()
    }

    /// Number of tasks currently observed by a terminal-watch.
    pub fn watched_tasks(&self) -> usize {
        self.watches.len()
    }

    /// Connects to the master: starts the driver and waits for registration.
    ///
    /// Fails with [`SessionError::InvalidState`] unless the session is
    /// disconnected. The registration subscription is armed before the
    /// driver starts; whichever of registration, disconnect, master error,
    /// or timeout arrives first resolves the attempt.
    pub async fn connect(&self) -> Result<Registration, SessionError> {
        if !self
            .state
            .transition(SessionState::Disconnected, SessionState::Connecting)
        {
            return Err(SessionError::InvalidState {
                operation: "connect",
                state: self.state.load(),
            });
        }

        let deadline = tokio::time::Instant::now() + self.cfg.connect_timeout;
        let mut sub = self.bus.subscribe();

        let status = self.driver.start();
        if !status.is_running() {
            self.state
                .transition(SessionState::Connecting, SessionState::Disconnected);
            return Err(SessionError::Driver {
                reason: format!("driver did not start: {status:?}"),
            });
        }
        debug!("driver started; awaiting registration");

        let outcome = self.await_registration(&mut sub, deadline).await;
        match outcome {
            Ok(registration) => {
                if !self
                    .state
                    .transition(SessionState::Connecting, SessionState::Connected)
                {
                    return Err(SessionError::IllegalState {
                        expected: SessionState::Connecting,
                        found: self.state.load(),
                    });
                }
                debug!(framework_id = %registration.framework_id, "registered");
                Ok(registration)
            }
            Err(err) => {
                self.state
                    .transition(SessionState::Connecting, SessionState::Disconnected);
                warn!(error = %err, "connect failed");
                Err(err)
            }
        }
    }

    async fn await_registration(
        &self,
        sub: &mut Subscription,
        deadline: tokio::time::Instant,
    ) -> Result<Registration, SessionError> {
        let relevant = |ev: &Event| {
            matches!(
                ev,
                Event::Registered { .. } | Event::Disconnected | Event::MasterError { .. }
            )
        };

        loop {
            match sub.next_match_until(relevant, deadline).await {
                Signal::Event(Event::Registered { framework_id, master }) => {
                    return Ok(Registration { framework_id, master });
                }
                Signal::Event(Event::Disconnected) => return Err(SessionError::ConnectionLost),
                Signal::Event(Event::MasterError { message }) => {
                    return Err(SessionError::Master { message });
                }
                Signal::Event(_) => continue,
                Signal::TimedOut => {
                    return Err(SessionError::Timeout {
                        reason: "connection attempt timed out",
                        timeout: self.cfg.connect_timeout,
                    });
                }
                Signal::Closed => return Err(SessionError::ConnectionLost),
            }
        }
    }

    /// Launches `tasks` against the given offers.
    ///
    /// Requires a connected session. For each task a launch-watch is armed
    /// before the driver call; the returned [`LaunchedTask`]s resolve, in
    /// input order, once their task reaches running (installing the
    /// long-lived terminal-watch) or fail with the state that prevented it.
    ///
    /// A synchronous driver rejection cancels the armed watches and is
    /// returned as [`SessionError::Driver`]; callers treat it as a decline
    /// signal for the attempted offers.
    pub fn launch(
        &self,
        offers: Vec<OfferId>,
        tasks: Vec<TaskInfo>,
    ) -> Result<Vec<LaunchedTask>, SessionError> {
        let state = self.state.load();
        if state != SessionState::Connected {
            return Err(SessionError::InvalidState {
                operation: "launch",
                state,
            });
        }

        let deadline = tokio::time::Instant::now() + self.cfg.launch_timeout;
        let watches: Vec<LaunchedTask> = tasks
            .iter()
            .map(|info| {
                spawn_launch_watch(
                    Arc::clone(&self.watches),
                    Arc::clone(&self.state),
                    self.bus.subscribe(),
                    info.clone(),
                    deadline,
                    self.cfg.launch_timeout,
                )
            })
            .collect();

        if let Err(err) = self.driver.launch_tasks(&offers, &tasks) {
            for watch in &watches {
                watch.cancel();
            }
            warn!(error = %err, "driver rejected launch");
            return Err(SessionError::Driver {
                reason: err.to_string(),
            });
        }

        debug!(offers = offers.len(), tasks = tasks.len(), "launch issued");
        Ok(watches)
    }

    /// Kills a task and waits for the outcome.
    ///
    /// Requires a connected session. A task observed in `Killed` — or any
    /// other terminal state, meaning it was already done — resolves the kill
    /// successfully; `Lost` fails it (the task was already gone).
    pub async fn kill(&self, task: TaskId) -> Result<TaskId, SessionError> {
        let state = self.state.load();
        if state != SessionState::Connected {
            return Err(SessionError::InvalidState {
                operation: "kill",
                state,
            });
        }

        let deadline = tokio::time::Instant::now() + self.cfg.kill_timeout;
        let mut sub = self.bus.subscribe();
        self.driver.kill_task(&task);

        loop {
            match sub
                .next_match_until(|ev| ev.concerns_task(&task), deadline)
                .await
            {
                Signal::Event(Event::TaskUpdate { state, message, .. }) => match state {
                    TaskState::Killed => return Ok(task),
                    TaskState::Lost => {
                        return Err(SessionError::TaskFailed {
                            task,
                            state: TaskState::Lost,
                            message,
                        });
                    }
                    other if other.is_terminal() => return Ok(task),
                    _ => continue,
                },
                Signal::Event(_) => continue,
                Signal::TimedOut => {
                    return Err(SessionError::Timeout {
                        reason: "task kill timed out",
                        timeout: self.cfg.kill_timeout,
                    });
                }
                Signal::Closed => return Err(SessionError::ConnectionLost),
            }
        }
    }

    /// Declines a single offer. Permitted in any state except disconnected,
    /// so offers arriving during the connect race are not lost.
    pub fn decline(&self, offer: &OfferId) -> Result<(), SessionError> {
        let state = self.state.load();
        if state == SessionState::Disconnected {
            return Err(SessionError::InvalidState {
                operation: "decline",
                state,
            });
        }
        self.driver.decline_offer(offer);
        Ok(())
    }

    /// Stops the session with failover: the framework stays registered so a
    /// successor can take over. Returns the driver's final status.
    pub async fn disconnect(&self) -> Result<DriverStatus, SessionError> {
        self.stop(StopMode::Disconnect).await
    }

    /// Stops the session and unregisters the framework.
    pub async fn terminate(&self) -> Result<DriverStatus, SessionError> {
        self.stop(StopMode::Terminate).await
    }

    /// Aborts the driver without unregistering.
    pub async fn abort(&self) -> Result<DriverStatus, SessionError> {
        self.stop(StopMode::Abort).await
    }

    async fn stop(&self, mode: StopMode) -> Result<DriverStatus, SessionError> {
        if !self
            .state
            .transition(SessionState::Connected, SessionState::Disconnecting)
        {
            return Err(SessionError::InvalidState {
                operation: mode.operation(),
                state: self.state.load(),
            });
        }

        self.watches.drain();
        match mode {
            StopMode::Disconnect => self.driver.stop(true),
            StopMode::Terminate => self.driver.stop(false),
            StopMode::Abort => self.driver.abort(),
        }

        // join blocks until the driver's internal loop exits
        let driver = Arc::clone(&self.driver);
        let status = tokio::task::spawn_blocking(move || driver.join())
            .await
            .map_err(|err| SessionError::Driver {
                reason: format!("driver join failed: {err}"),
            })?;

        if !self
            .state
            .transition(SessionState::Disconnecting, SessionState::Disconnected)
        {
            return Err(SessionError::IllegalState {
                expected: SessionState::Disconnecting,
                found: self.state.load(),
            });
        }

        debug!(operation = mode.operation(), ?status, "session stopped");
        Ok(status)
    }
}

//! # Driver boundary.
//!
//! [`Driver`] is the synchronous command surface of the low-level scheduler
//! driver: the component that serializes calls to the master and
//! deserializes callbacks into [`Event`](crate::events::Event)s published on
//! the [`Bus`](crate::events::Bus).
//!
//! This crate never implements the wire protocol; it consumes the driver
//! through this trait. Implementations must be safe for concurrent command
//! invocation.
//!
//! ## Rules
//! - [`Driver::join`] **blocks** until the driver's internal loop exits; the
//!   session calls it on a blocking-friendly executor
//!   (`tokio::task::spawn_blocking`).
//! - All other commands are non-blocking.
//! - [`Driver::launch_tasks`] may fail synchronously; the task launcher
//!   treats that as a decline signal for the attempted offers.

use thiserror::Error;

use crate::model::{OfferId, TaskId, TaskInfo};

/// Status reported by the driver's lifecycle commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverStatus {
    /// The driver has not been started yet.
    NotStarted,
    /// The driver's internal loop is running.
    Running,
    /// The driver was stopped.
    Stopped,
    /// The driver was aborted.
    Aborted,
}

impl DriverStatus {
    /// True if the driver's internal loop is running.
    pub fn is_running(&self) -> bool {
        matches!(self, DriverStatus::Running)
    }
}

/// Synchronous failure raised by a driver command.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct DriverError(pub String);

impl DriverError {
    /// Creates a driver error from any message.
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// Command surface of the external scheduler driver.
pub trait Driver: Send + Sync + 'static {
    /// Starts the driver's internal loop and reports its status.
    fn start(&self) -> DriverStatus;

    /// Stops the driver. With `failover = true` the framework stays
    /// registered with the master so a successor can take over.
    fn stop(&self, failover: bool);

    /// Aborts the driver without unregistering.
    fn abort(&self);

    /// Blocks until the driver's internal loop exits, returning its final
    /// status. Callers must run this on a thread that tolerates blocking.
    fn join(&self) -> DriverStatus;

    /// Launches `tasks` against the given offers. May fail synchronously.
    fn launch_tasks(&self, offers: &[OfferId], tasks: &[TaskInfo]) -> Result<(), DriverError>;

    /// Declines a single offer.
    fn decline_offer(&self, offer: &OfferId);

    /// Requests that a task be killed.
    fn kill_task(&self, task: &TaskId);
}

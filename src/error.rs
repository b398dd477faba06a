//! # Error types for session operations.
//!
//! [`SessionError`] covers every failure a session or launcher operation can
//! surface: lifecycle precondition violations, per-operation timeouts,
//! master-side errors, task failures, driver failures, and teardown races.
//!
//! `as_label` provides short stable labels for logs and metrics.

use std::time::Duration;

use thiserror::Error;

use crate::model::{TaskId, TaskState};
use crate::session::SessionState;

/// Errors produced by session and launcher operations.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum SessionError {
    /// Operation invoked in a lifecycle state that does not permit it.
    #[error("operation '{operation}' not allowed while {state}")]
    InvalidState {
        /// The attempted operation.
        operation: &'static str,
        /// The state the session was in.
        state: SessionState,
    },

    /// A pending operation exceeded its timeout budget.
    #[error("{reason} after {timeout:?}")]
    Timeout {
        /// Human-readable description of what timed out.
        reason: &'static str,
        /// The configured budget that was exceeded.
        timeout: Duration,
    },

    /// The master reported an error.
    #[error("master error: {message}")]
    Master {
        /// Error message from the master.
        message: String,
    },

    /// The connection to the master was lost while an operation was pending.
    #[error("connection to master lost")]
    ConnectionLost,

    /// A task entered an unexpected state.
    #[error("task '{task}' entered {state:?}: {message:?}")]
    TaskFailed {
        /// The task the failure is about.
        task: TaskId,
        /// The state the task entered.
        state: TaskState,
        /// Optional status message from the slave or master.
        message: Option<String>,
    },

    /// The driver failed to start or rejected a call synchronously.
    #[error("driver failure: {reason}")]
    Driver {
        /// Description of the driver failure.
        reason: String,
    },

    /// Session teardown observed a state it did not set.
    #[error("teardown expected {expected} but found {found}")]
    IllegalState {
        /// The state teardown expected to replace.
        expected: SessionState,
        /// The state actually found.
        found: SessionState,
    },

    /// A pending watch was cancelled before it could resolve.
    #[error("operation canceled")]
    Canceled,
}

impl SessionError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            SessionError::InvalidState { .. } => "invalid_state",
            SessionError::Timeout { .. } => "timeout",
            SessionError::Master { .. } => "master_error",
            SessionError::ConnectionLost => "connection_lost",
            SessionError::TaskFailed { .. } => "task_failed",
            SessionError::Driver { .. } => "driver_failure",
            SessionError::IllegalState { .. } => "illegal_state",
            SessionError::Canceled => "canceled",
        }
    }

    /// True if the error is a per-operation timeout.
    pub fn is_timeout(&self) -> bool {
        matches!(self, SessionError::Timeout { .. })
    }

    /// True if the error is a lifecycle precondition violation.
    pub fn is_precondition(&self) -> bool {
        matches!(self, SessionError::InvalidState { .. })
    }
}

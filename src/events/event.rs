//! # Session events delivered by the driver.
//!
//! The driver deserializes master callbacks into [`Event`]s and publishes
//! them on the [`Bus`](super::Bus). Both the session manager and the task
//! launcher consume the same stream through independent subscriptions:
//!
//! - `Registered` / `Disconnected` / `MasterError` resolve a pending connect
//! - `Offers` feeds the task launcher's assignment loop
//! - `TaskUpdate` drives launch-watches, terminal-watches, and kill-watches
//!
//! Events are plain values; subscribers filter by variant (and task id) on
//! their own subscription.

use serde::{Deserialize, Serialize};

use crate::model::{FrameworkId, MasterId, Offer, TaskId, TaskState};

/// Description of the master a session registered with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MasterInfo {
    /// Master identifier.
    pub id: MasterId,
    /// Hostname the master is reachable at.
    pub hostname: String,
    /// Port the master is reachable at.
    pub port: u16,
}

/// An asynchronous event pushed by the driver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Event {
    /// The framework registered with the master.
    Registered {
        /// Framework id assigned by the master.
        framework_id: FrameworkId,
        /// The master the session registered with.
        master: MasterInfo,
    },
    /// The connection to the master was lost.
    Disconnected,
    /// The master reported an error.
    MasterError {
        /// Error message from the master.
        message: String,
    },
    /// One or more resource offers arrived.
    Offers {
        /// Offers in delivery order.
        offers: Vec<Offer>,
    },
    /// A task changed state.
    TaskUpdate {
        /// Task the update is about.
        task_id: TaskId,
        /// New task state.
        state: TaskState,
        /// Optional status message from the slave or master.
        message: Option<String>,
    },
}

impl Event {
    /// Returns the task id for `TaskUpdate` events, `None` otherwise.
    pub fn task_id(&self) -> Option<&TaskId> {
        match self {
            Event::TaskUpdate { task_id, .. } => Some(task_id),
            _ => None,
        }
    }

    /// Returns true for `TaskUpdate` events about the given task.
    pub fn concerns_task(&self, id: &TaskId) -> bool {
        self.task_id() == Some(id)
    }
}

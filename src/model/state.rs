//! Task execution states reported by the master.

use serde::{Deserialize, Serialize};

/// Current execution state of a launched task.
///
/// Transitions flow only from non-terminal to terminal states; once a task
/// is terminal no further transitions are meaningful.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TaskState {
    /// Task has been accepted but not yet started.
    Staging,
    /// Task is starting on the slave.
    Starting,
    /// Task is running.
    Running,
    /// Task completed successfully.
    Finished,
    /// Task failed with an error.
    Failed,
    /// Task was killed on request.
    Killed,
    /// Task (or its slave) was lost.
    Lost,
    /// Task description was invalid or the task could not be started.
    Error,
}

impl TaskState {
    /// Returns `true` if the state is terminal (no further transitions).
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            TaskState::Finished
                | TaskState::Failed
                | TaskState::Killed
                | TaskState::Lost
                | TaskState::Error
        )
    }
}

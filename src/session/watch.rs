//! # Per-task watches.
//!
//! Every launched task is observed by two successive subscriptions on the
//! event stream:
//!
//! - the **launch-watch**: armed before the driver call, bounded by the
//!   launch timeout, resolves the pending launch result when the task
//!   reaches running (or fails it on any other state);
//! - the **terminal-watch**: takes over the launch-watch's subscription once
//!   running was observed, has no timeout, and exits on the task's terminal
//!   state.
//!
//! ## Rules
//! - The terminal-watch continues the launch-watch's subscription, so it
//!   only ever observes post-running transitions; a duplicate running update
//!   is a non-terminal state there and is silently discarded.
//! - [`WatchTable`] holds one entry per task id: the terminal-watch's
//!   cancellation handle. Inserting for an already-watched task cancels and
//!   replaces the old entry. The table is used for lookup-and-cancel only;
//!   each watch owns its own lifetime.
//! - Removal is guarded by the entry's unique watch id, so a replaced watch
//!   can never evict its successor.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use tokio::sync::oneshot;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::error::SessionError;
use crate::events::{Event, Signal, Subscription};
use crate::model::{TaskId, TaskInfo, TaskState};
use crate::session::state::StateCell;
use crate::session::SessionState;

/// Cancellation handle of a registered terminal-watch.
struct WatchHandle {
    id: u64,
    cancel: CancellationToken,
}

/// Concurrent registry of terminal-watches, keyed by task id.
pub(crate) struct WatchTable {
    entries: DashMap<TaskId, WatchHandle>,
    seq: AtomicU64,
}

impl WatchTable {
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
            seq: AtomicU64::new(0),
        }
    }

    /// Registers a watch for `task`, cancelling and replacing any previous
    /// entry. Returns the unique id guarding later removal.
    pub fn install(&self, task: TaskId, cancel: CancellationToken) -> u64 {
        let id = self.seq.fetch_add(1, Ordering::Relaxed);
        if let Some(old) = self.entries.insert(task, WatchHandle { id, cancel }) {
            old.cancel.cancel();
        }
        id
    }

    /// Removes the entry for `task` if it is still the one identified by
    /// `id`. A replaced watch calling in late is a no-op.
    pub fn discard(&self, task: &TaskId, id: u64) {
        self.entries.remove_if(task, |_, handle| handle.id == id);
    }

    /// Cancels every watch and clears the table.
    pub fn drain(&self) {
        self.entries.retain(|_, handle| {
            handle.cancel.cancel();
            false
        });
    }

    /// Number of registered watches.
    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

/// Pending result of a single launched task.
///
/// Returned by [`Session::launch`](crate::session::Session::launch); awaiting
/// [`wait`](LaunchedTask::wait) yields the [`TaskInfo`] once the task reached
/// running, or the failure that resolved the watch instead.
#[derive(Debug)]
pub struct LaunchedTask {
    task_id: TaskId,
    cancel: CancellationToken,
    rx: oneshot::Receiver<Result<TaskInfo, SessionError>>,
}

impl LaunchedTask {
    /// Id of the task this result belongs to.
    pub fn task_id(&self) -> &TaskId {
        &self.task_id
    }

    /// Cancels the pending watch. Used when the driver rejected the launch
    /// synchronously and the result will never be delivered.
    pub(crate) fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Waits for the task to reach running.
    pub async fn wait(self) -> Result<TaskInfo, SessionError> {
        match self.rx.await {
            Ok(result) => result,
            Err(_) => Err(SessionError::Canceled),
        }
    }
}

/// Arms the launch-watch for one task and returns its pending result.
///
/// The subscription must have been created before the driver call so no
/// update can slip between command and watch.
pub(crate) fn spawn_launch_watch(
    table: Arc<WatchTable>,
    state: Arc<StateCell>,
    sub: Subscription,
    info: TaskInfo,
    deadline: Instant,
    timeout: Duration,
) -> LaunchedTask {
    let (tx, rx) = oneshot::channel();
    let cancel = CancellationToken::new();
    let task_id = info.task_id.clone();

    tokio::spawn(launch_watch(
        table,
        state,
        sub,
        info,
        deadline,
        timeout,
        cancel.clone(),
        tx,
    ));

    LaunchedTask { task_id, cancel, rx }
}

#[allow(clippy::too_many_arguments)]
async fn launch_watch(
    table: Arc<WatchTable>,
    state: Arc<StateCell>,
    mut sub: Subscription,
    info: TaskInfo,
    deadline: Instant,
    timeout: Duration,
    cancel: CancellationToken,
    tx: oneshot::Sender<Result<TaskInfo, SessionError>>,
) {
    let task_id = info.task_id.clone();
    let watched = task_id.clone();
    let relevant =
        move |ev: &Event| ev.concerns_task(&watched) || matches!(ev, Event::Disconnected);

    loop {
        // biased: a cancelled watch must never act on a buffered event
        let signal = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                let _ = tx.send(Err(SessionError::Canceled));
                return;
            }
            signal = sub.next_match_until(&relevant, deadline) => signal,
        };

        match signal {
            Signal::TimedOut => {
                let _ = tx.send(Err(SessionError::Timeout {
                    reason: "task launch attempt timed out",
                    timeout,
                }));
                return;
            }
            Signal::Closed | Signal::Event(Event::Disconnected) => {
                let _ = tx.send(Err(SessionError::ConnectionLost));
                return;
            }
            Signal::Event(Event::TaskUpdate { state: task_state, message, .. }) => {
                match task_state {
                    TaskState::Running => {
                        let _ = tx.send(Ok(info));
                        install_terminal_watch(table, state, sub, task_id);
                        return;
                    }
                    TaskState::Staging | TaskState::Starting => continue,
                    other => {
                        let _ = tx.send(Err(SessionError::TaskFailed {
                            task: task_id,
                            state: other,
                            message,
                        }));
                        return;
                    }
                }
            }
            Signal::Event(_) => continue,
        }
    }
}

/// Hands the launch-watch's subscription over to a terminal-watch and
/// registers it in the table.
///
/// If the session left the connected state between the running update and
/// the registration, the fresh entry is removed and cancelled again instead
/// of lingering past teardown.
fn install_terminal_watch(
    table: Arc<WatchTable>,
    state: Arc<StateCell>,
    mut sub: Subscription,
    task_id: TaskId,
) {
    let cancel = CancellationToken::new();
    let id = table.install(task_id.clone(), cancel.clone());

    if state.load() != SessionState::Connected {
        table.discard(&task_id, id);
        cancel.cancel();
        return;
    }

    tokio::spawn(async move {
        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                ev = sub.next_match(|ev| ev.concerns_task(&task_id)) => match ev {
                    Some(Event::TaskUpdate { state, .. }) if state.is_terminal() => break,
                    Some(_) => continue,
                    None => break,
                }
            }
        }
        table.discard(&task_id, id);
    });
}

//! Test support: a recording driver double.
//!
//! `FakeDriver` records every command it receives and can publish canned
//! events back onto the bus at command time. Because the session always arms
//! its subscriptions before issuing the driver command, publishing from
//! inside the command makes tests race-free without sleeps.

use std::sync::{Arc, Mutex};

use crate::driver::{Driver, DriverError, DriverStatus};
use crate::events::{Bus, Event, MasterInfo};
use crate::model::{FrameworkId, MasterId, OfferId, TaskId, TaskInfo, TaskState};

/// A registration event for the given framework id.
pub fn registered(framework_id: &str) -> Event {
    Event::Registered {
        framework_id: FrameworkId::from(framework_id),
        master: MasterInfo {
            id: MasterId::from("master-1"),
            hostname: "master.local".to_string(),
            port: 5050,
        },
    }
}

/// One recorded driver command.
#[derive(Debug, Clone, PartialEq)]
pub enum DriverCall {
    Start,
    Stop { failover: bool },
    Abort,
    Join,
    Launch { offers: Vec<OfferId>, tasks: Vec<TaskId> },
    Decline(OfferId),
    Kill(TaskId),
}

/// Builder for [`FakeDriver`].
pub struct FakeDriverBuilder {
    bus: Bus,
    start_status: DriverStatus,
    join_status: DriverStatus,
    on_start: Vec<Event>,
    auto_running: bool,
    fail_next_launch: Option<DriverError>,
    kill_reply: Option<TaskState>,
}

impl FakeDriverBuilder {
    /// Status returned by `start()`. Defaults to `Running`.
    pub fn start_status(mut self, status: DriverStatus) -> Self {
        self.start_status = status;
        self
    }

    /// Events published when `start()` is called.
    pub fn on_start(mut self, events: Vec<Event>) -> Self {
        self.on_start = events;
        self
    }

    /// Publish a `Running` update for every task of a successful launch.
    pub fn auto_running(mut self) -> Self {
        self.auto_running = true;
        self
    }

    /// Fail the next `launch_tasks` call synchronously; later calls succeed.
    pub fn fail_next_launch(mut self, reason: &str) -> Self {
        self.fail_next_launch = Some(DriverError::new(reason));
        self
    }

    /// Publish a task update with this state when `kill_task` is called.
    pub fn kill_reply(mut self, state: TaskState) -> Self {
        self.kill_reply = Some(state);
        self
    }

    pub fn build(self) -> Arc<FakeDriver> {
        Arc::new(FakeDriver {
            bus: self.bus,
            start_status: self.start_status,
            join_status: self.join_status,
            on_start: self.on_start,
            auto_running: self.auto_running,
            kill_reply: self.kill_reply,
            fail_next_launch: Mutex::new(self.fail_next_launch),
            calls: Mutex::new(Vec::new()),
        })
    }
}

/// Recording driver double publishing canned events on command.
pub struct FakeDriver {
    bus: Bus,
    start_status: DriverStatus,
    join_status: DriverStatus,
    on_start: Vec<Event>,
    auto_running: bool,
    kill_reply: Option<TaskState>,
    fail_next_launch: Mutex<Option<DriverError>>,
    calls: Mutex<Vec<DriverCall>>,
}

impl FakeDriver {
    pub fn builder(bus: Bus) -> FakeDriverBuilder {
        FakeDriverBuilder {
            bus,
            start_status: DriverStatus::Running,
            join_status: DriverStatus::Stopped,
            on_start: Vec::new(),
            auto_running: false,
            fail_next_launch: None,
            kill_reply: None,
        }
    }

    fn record(&self, call: DriverCall) {
        self.calls.lock().unwrap().push(call);
    }

    /// Every command recorded so far, in invocation order.
    pub fn calls(&self) -> Vec<DriverCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Offer ids declined so far, in invocation order.
    pub fn declined(&self) -> Vec<OfferId> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                DriverCall::Decline(id) => Some(id),
                _ => None,
            })
            .collect()
    }

    /// Offer ids and task ids of every launch call, in invocation order.
    pub fn launch_calls(&self) -> Vec<(Vec<OfferId>, Vec<TaskId>)> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                DriverCall::Launch { offers, tasks } => Some((offers, tasks)),
                _ => None,
            })
            .collect()
    }
}

impl Driver for FakeDriver {
    fn start(&self) -> DriverStatus {
        self.record(DriverCall::Start);
        for event in &self.on_start {
            self.bus.publish(event.clone());
        }
        self.start_status
    }

    fn stop(&self, failover: bool) {
        self.record(DriverCall::Stop { failover });
    }

    fn abort(&self) {
        self.record(DriverCall::Abort);
    }

    fn join(&self) -> DriverStatus {
        self.record(DriverCall::Join);
        self.join_status
    }

    fn launch_tasks(&self, offers: &[OfferId], tasks: &[TaskInfo]) -> Result<(), DriverError> {
        self.record(DriverCall::Launch {
            offers: offers.to_vec(),
            tasks: tasks.iter().map(|t| t.task_id.clone()).collect(),
        });

        if let Some(err) = self.fail_next_launch.lock().unwrap().take() {
            return Err(err);
        }

        if self.auto_running {
            for task in tasks {
                self.bus.publish(Event::TaskUpdate {
                    task_id: task.task_id.clone(),
                    state: TaskState::Running,
                    message: None,
                });
            }
        }
        Ok(())
    }

    fn decline_offer(&self, offer: &OfferId) {
        self.record(DriverCall::Decline(offer.clone()));
    }

    fn kill_task(&self, task: &TaskId) {
        self.record(DriverCall::Kill(task.clone()));
        if let Some(state) = self.kill_reply {
            self.bus.publish(Event::TaskUpdate {
                task_id: task.clone(),
                state,
                message: None,
            });
        }
    }
}

//! # offervisor
//!
//! **Offervisor** is a client-side framework library for two-level
//! resource-offer schedulers: a central master offers pools of slave
//! resources to registered frameworks, which launch tasks on the offers
//! they accept.
//!
//! The crate drives the scheduler session and the offer-to-task assignment;
//! the wire protocol lives behind the [`Driver`] boundary.
//!
//! ## Features
//!
//! | Area                | Description                                                          | Key types / traits                        |
//! |---------------------|----------------------------------------------------------------------|-------------------------------------------|
//! | **Session**         | Connect, launch, kill, decline, disconnect against the master.       | [`Session`], [`Registration`]              |
//! | **Task launching**  | Consume offers, assign tasks, decline the rest, await running.       | [`TaskLauncher`], [`OfferFilter`]          |
//! | **Events**          | Hot broadcast stream of driver events with filtered, timed views.    | [`Bus`], [`Event`], [`Subscribe`]          |
//! | **Driver boundary** | Command surface of the external scheduler driver.                    | [`Driver`], [`DriverStatus`]               |
//! | **Errors**          | Typed errors for lifecycle, timeouts, and task failures.             | [`SessionError`]                           |
//! | **Configuration**   | Per-operation timeout budgets.                                       | [`Config`]                                 |
//!
//! ```no_run
//! use std::sync::Arc;
//! use offervisor::{
//!     Bus, Config, DistinctSlaves, Resource, Session, TaskDescriptor, TaskLauncher,
//! };
//! # use offervisor::Driver;
//! # async fn example(driver: Arc<dyn Driver>) -> Result<(), Box<dyn std::error::Error>> {
//! let cfg = Config::default();
//! let bus = Bus::new(cfg.bus_capacity);
//!
//! let session = Arc::new(Session::new(driver, bus, cfg));
//! let registration = session.connect().await?;
//! println!("registered as {}", registration.framework_id);
//!
//! let launcher = TaskLauncher::new(Arc::clone(&session));
//! let tasks = launcher
//!     .submit(
//!         vec![TaskDescriptor::command(
//!             "worker",
//!             vec![Resource::scalar("cpus", 1.0)],
//!             "run.sh",
//!         )],
//!         Some(Arc::new(DistinctSlaves)),
//!     )
//!     .await?;
//! println!("launched {} tasks", tasks.len());
//!
//! session.disconnect().await?;
//! # Ok(())
//! # }
//! ```
//!
//! ---

mod config;
mod driver;
mod error;
mod events;
mod launcher;
mod model;
mod session;

#[cfg(test)]
mod testkit;

// ---- Public re-exports ----

pub use config::Config;
pub use driver::{Driver, DriverError, DriverStatus};
pub use error::SessionError;
pub use events::{Bus, Event, EventLogger, MasterInfo, Signal, Subscribe, Subscription};
pub use launcher::{
    DistinctSlaves, MaxTasksPerOffer, OfferFilter, OnSlave, Proposal, ProposalEntry, TaskLauncher,
};
pub use model::{
    CommandSpec, ContainerSpec, ExecutorId, FrameworkId, Launchable, MasterId, Offer, OfferId,
    Resource, ResourceKind, SlaveId, TaskDescriptor, TaskId, TaskInfo, TaskState,
};
pub use session::{LaunchedTask, Registration, Session, SessionState};

//! Event stream plumbing: the bus, subscriptions, and subscriber hooks.

mod bus;
mod event;
mod log;
mod subscribe;

pub use bus::{Bus, Signal, Subscription};
pub use event::{Event, MasterInfo};
pub use log::EventLogger;
pub use subscribe::Subscribe;

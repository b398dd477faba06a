//! Session manager: lifecycle state machine over the driver and event bus.

mod core;
mod state;
mod watch;

pub use core::{Registration, Session};
pub use state::SessionState;
pub use watch::LaunchedTask;

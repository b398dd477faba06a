//! # Session configuration.
//!
//! [`Config`] centralizes the per-operation timeout budgets and the event
//! bus capacity.
//!
//! # Example
//! ```
//! use std::time::Duration;
//! use offervisor::Config;
//!
//! let mut cfg = Config::default();
//! cfg.connect_timeout = Duration::from_secs(10);
//!
//! assert_eq!(cfg.launch_timeout, Duration::from_secs(30));
//! ```

use std::time::Duration;

/// Configuration for the session manager and task launcher.
///
/// Each timeout is counted from the moment the corresponding event
/// subscription is armed, not from the driver call.
#[derive(Clone, Debug)]
pub struct Config {
    /// Maximum time to wait for registration after starting the driver.
    pub connect_timeout: Duration,
    /// Maximum time to wait for a launched task to reach running.
    pub launch_timeout: Duration,
    /// Maximum time to wait for a killed task to reach a terminal state.
    pub kill_timeout: Duration,
    /// Capacity of the event bus channel.
    pub bus_capacity: usize,
}

impl Default for Config {
    /// Provides a default configuration:
    /// - `connect_timeout = 30s`
    /// - `launch_timeout = 30s`
    /// - `kill_timeout = 30s`
    /// - `bus_capacity = 1024`
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(30),
            launch_timeout: Duration::from_secs(30),
            kill_timeout: Duration::from_secs(30),
            bus_capacity: 1024,
        }
    }
}

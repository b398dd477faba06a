//! # Session lifecycle states.
//!
//! The session is a small state machine over four states; every transition
//! goes through a compare-and-set on a single atomic cell. Plain reads are
//! hints only and are re-validated by the CAS on any mutation.
//!
//! ```text
//! Disconnected ──connect()──► Connecting ──Registered──► Connected
//!      ▲                          │                          │
//!      │        timeout / Disconnected / MasterError         │
//!      ├──────────────────────────┘                          │
//!      │                                                     ▼
//!      └──────driver join returns────────────────────── Disconnecting
//! ```

use std::fmt;
use std::sync::atomic::{AtomicU8, Ordering};

/// Lifecycle state of a scheduler session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum SessionState {
    /// No session with the master. Initial state.
    Disconnected = 0,
    /// Driver started, waiting for registration.
    Connecting = 1,
    /// Registered with the master.
    Connected = 2,
    /// Stop requested, waiting for the driver to join.
    Disconnecting = 3,
}

impl SessionState {
    fn from_u8(raw: u8) -> Self {
        match raw {
            0 => SessionState::Disconnected,
            1 => SessionState::Connecting,
            2 => SessionState::Connected,
            3 => SessionState::Disconnecting,
            _ => unreachable!("invalid session state tag {raw}"),
        }
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SessionState::Disconnected => "disconnected",
            SessionState::Connecting => "connecting",
            SessionState::Connected => "connected",
            SessionState::Disconnecting => "disconnecting",
        };
        f.write_str(name)
    }
}

/// Atomic holder of the session state. Single source of truth for lifecycle.
pub(crate) struct StateCell(AtomicU8);

impl StateCell {
    /// Creates a cell in the `Disconnected` state.
    pub fn new() -> Self {
        Self(AtomicU8::new(SessionState::Disconnected as u8))
    }

    /// Reads the current state. A hint only; mutations re-validate via CAS.
    pub fn load(&self) -> SessionState {
        SessionState::from_u8(self.0.load(Ordering::SeqCst))
    }

    /// Atomically moves `from` → `to`. Returns `false` (leaving the cell
    /// untouched) if the current state is not `from`.
    pub fn transition(&self, from: SessionState, to: SessionState) -> bool {
        self.0
            .compare_exchange(from as u8, to as u8, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
    }
}

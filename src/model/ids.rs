//! Opaque string identifiers used across the framework API.
//!
//! Each identifier is a thin newtype over `String`. The wrappers exist so the
//! type system keeps offer ids, slave ids, and task ids from being mixed up
//! in driver calls; none of them interpret their contents.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier assigned to a framework by the master on registration.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FrameworkId(String);

/// Identifier of the master a session is registered with.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MasterId(String);

/// Identifier of a resource offer. Valid until the offer is accepted or
/// declined; never reused afterwards.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OfferId(String);

/// Identifier of a slave node advertising resources.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SlaveId(String);

/// Identifier of an executor running on a slave.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExecutorId(String);

/// Identifier of a single launched task.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(String);

macro_rules! impl_id {
    ($name:ident) => {
        impl $name {
            /// Wraps a raw identifier string.
            pub fn new(raw: impl Into<String>) -> Self {
                Self(raw.into())
            }

            /// Returns the identifier as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(raw: &str) -> Self {
                Self(raw.to_string())
            }
        }

        impl From<String> for $name {
            fn from(raw: String) -> Self {
                Self(raw)
            }
        }
    };
}

impl_id!(FrameworkId);
impl_id!(MasterId);
impl_id!(OfferId);
impl_id!(SlaveId);
impl_id!(ExecutorId);
impl_id!(TaskId);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_opaque_strings() {
        let id = TaskId::from("task-1");
        assert_eq!(id.as_str(), "task-1");
        assert_eq!(id.to_string(), "task-1");
        assert_eq!(id, TaskId::new("task-1".to_string()));
    }

    #[test]
    fn serde_transparent() {
        let id = OfferId::from("offer-42");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, r#""offer-42""#);

        let back: OfferId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }
}

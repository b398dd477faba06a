//! Resource descriptions carried by offers and requested by tasks.

use serde::{Deserialize, Serialize};

/// Type tag of a resource amount.
///
/// Only scalar resources are interpreted by this crate; the tag is carried
/// through so a richer matching strategy can distinguish kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ResourceKind {
    /// A single numeric amount (cpus, mem, disk).
    Scalar,
}

/// A named, typed resource amount.
///
/// Offers advertise resources; task descriptors request them. The core
/// matches by **name only** (an offer matches a descriptor when it carries
/// every resource name the descriptor requests); quantitative arithmetic is
/// left to the caller's matching strategy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Resource {
    /// Resource name, e.g. `"cpus"` or `"mem"`.
    pub name: String,
    /// Type tag of the amount.
    pub kind: ResourceKind,
    /// Numeric amount.
    pub amount: f64,
}

impl Resource {
    /// Creates a scalar resource.
    pub fn scalar(name: impl Into<String>, amount: f64) -> Self {
        Self {
            name: name.into(),
            kind: ResourceKind::Scalar,
            amount,
        }
    }
}

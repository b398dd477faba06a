//! Resource offers advertised by slaves through the master.

use serde::{Deserialize, Serialize};

use super::ids::{ExecutorId, FrameworkId, OfferId, SlaveId};
use super::resource::Resource;

/// A bundle of resources offered to the framework.
///
/// Immutable once received. An offer stays valid until it is accepted in a
/// launch or declined; after either, its id must not be reused.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Offer {
    /// Offer identifier.
    pub id: OfferId,
    /// Framework the offer was made to.
    pub framework_id: FrameworkId,
    /// Slave advertising the resources.
    pub slave_id: SlaveId,
    /// Hostname of the slave.
    pub hostname: String,
    /// Executor already running on the slave, if any.
    pub executor_id: Option<ExecutorId>,
    /// Offered resources, in the order advertised.
    pub resources: Vec<Resource>,
}

impl Offer {
    /// Returns true if the offer carries a resource with the given name.
    pub fn has_resource(&self, name: &str) -> bool {
        self.resources.iter().any(|r| r.name == name)
    }
}

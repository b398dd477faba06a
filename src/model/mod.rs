//! Domain value types: identifiers, resources, offers, and tasks.

mod ids;
mod offer;
mod resource;
mod state;
mod task;

pub use ids::{ExecutorId, FrameworkId, MasterId, OfferId, SlaveId, TaskId};
pub use offer::Offer;
pub use resource::{Resource, ResourceKind};
pub use state::TaskState;
pub use task::{CommandSpec, ContainerSpec, Launchable, TaskDescriptor, TaskInfo};

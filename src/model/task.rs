//! Task descriptors and launchable task descriptions.
//!
//! A [`TaskDescriptor`] is the caller-owned request: what to run and which
//! resource names it needs. Pairing a descriptor with the offer that carries
//! it produces a [`TaskInfo`] — the concrete task handed to the driver.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::ids::{SlaveId, TaskId};
use super::offer::Offer;
use super::resource::Resource;

/// Shell command executed directly on the slave.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandSpec {
    /// Command line to execute.
    pub value: String,
    /// Additional arguments.
    pub arguments: Vec<String>,
}

/// Containerized task description.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContainerSpec {
    /// Container image to run.
    pub image: String,
    /// Arguments passed to the container entrypoint.
    pub arguments: Vec<String>,
}

/// What a task actually runs: either a plain command or a container.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Launchable {
    /// Execute a shell command.
    Command(CommandSpec),
    /// Run a container image.
    Container(ContainerSpec),
}

/// Caller-owned description of a task to launch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskDescriptor {
    /// Human-readable task name; also the prefix of the generated task id.
    pub name: String,
    /// Resources the task requests. Matching is by name containment.
    pub resources: Vec<Resource>,
    /// Command or container to run.
    pub launchable: Launchable,
}

impl TaskDescriptor {
    /// Creates a descriptor running a shell command.
    pub fn command(name: impl Into<String>, resources: Vec<Resource>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            resources,
            launchable: Launchable::Command(CommandSpec {
                value: value.into(),
                arguments: Vec::new(),
            }),
        }
    }

    /// Creates a descriptor running a container image.
    pub fn container(name: impl Into<String>, resources: Vec<Resource>, image: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            resources,
            launchable: Launchable::Container(ContainerSpec {
                image: image.into(),
                arguments: Vec::new(),
            }),
        }
    }
}

/// A concrete task bound to the slave of the offer that will carry it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskInfo {
    /// Task name, copied from the descriptor.
    pub name: String,
    /// Generated task identifier (`<name>-<uuid>`).
    pub task_id: TaskId,
    /// Slave the task is launched on.
    pub slave_id: SlaveId,
    /// Resources the task requested.
    pub resources: Vec<Resource>,
    /// Command or container to run.
    pub launchable: Launchable,
}

impl TaskInfo {
    /// Pairs a descriptor with the offer chosen to carry it, generating a
    /// fresh task id.
    pub fn from_descriptor(descriptor: &TaskDescriptor, offer: &Offer) -> Self {
        Self {
            name: descriptor.name.clone(),
            task_id: TaskId::new(format!("{}-{}", descriptor.name, Uuid::new_v4())),
            slave_id: offer.slave_id.clone(),
            resources: descriptor.resources.clone(),
            launchable: descriptor.launchable.clone(),
        }
    }
}

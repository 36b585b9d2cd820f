//! Task definitions.

use crate::arena::Arena;
use crate::ids::InstanceId;
use crate::instance::Instance;
use crate::interconnect::Interconnect;
use crate::port::Port;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Whether a task is synthesized from source or composed from children.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskLevel {
    /// Synthesized from behavioral source.
    Leaf,
    /// Structural composition of child instances.
    Upper,
}

/// A named hardware behavior.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Task {
    /// Task name, unique in the graph.
    pub name: String,
    /// Leaf or upper.
    pub level: TaskLevel,
    /// Behavioral source of a leaf task.
    pub source: Option<PathBuf>,
    /// External interface in declaration order.
    pub ports: Vec<Port>,
    /// Child instances followed by implicit memory components.
    pub instances: Arena<InstanceId, Instance>,
    /// Interconnects sorted by name.
    pub interconnects: Vec<Interconnect>,
}

impl Task {
    /// Whether this task is a leaf.
    pub fn is_leaf(&self) -> bool {
        self.level == TaskLevel::Leaf
    }

    /// Finds a port by name.
    pub fn port(&self, name: &str) -> Option<&Port> {
        self.ports.iter().find(|p| p.name == name)
    }

    /// Finds an instance by name.
    pub fn instance_by_name(&self, name: &str) -> Option<(InstanceId, &Instance)> {
        self.instances.iter().find(|(_, inst)| inst.name == name)
    }

    /// Finds an interconnect by name.
    pub fn interconnect(&self, name: &str) -> Option<&Interconnect> {
        self.interconnects.iter().find(|ic| ic.name == name)
    }

    /// Task instances that need a start/done controller, in instance order.
    pub fn controlled_instances(&self) -> impl Iterator<Item = (InstanceId, &Instance)> {
        self.instances.iter().filter(|(_, inst)| inst.is_controlled())
    }
}

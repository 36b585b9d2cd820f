//! Instances inside an upper task, including implicit memory components.

use crate::ids::{InstanceId, TaskId};
use crate::port::ArgCategory;
use serde::{Deserialize, Serialize};

/// Binds a parent-scope name to one port of a child task.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Arg {
    /// Port name on the child task.
    pub port: String,
    /// Parent-scope name: a parent port, an interconnect, or a scalar literal.
    pub name: String,
    /// Category, equal to the child port's category.
    pub category: ArgCategory,
    /// `true` when more than one binding in the parent uses the same memory name.
    pub shared: bool,
}

impl Arg {
    /// The parent-scope net this arg drives or reads.
    ///
    /// Shared memory bindings get a private net per user, which an arbiter
    /// merges back onto `name`.
    pub fn net(&self, instance: &str) -> String {
        if self.shared {
            shared_mmap_name(&self.name, instance, &self.port)
        } else {
            self.name.clone()
        }
    }
}

/// Private memory net of one user of a shared memory argument.
pub fn shared_mmap_name(arg: &str, instance: &str, port: &str) -> String {
    format!("{arg}___{instance}___{port}")
}

/// One user of a shared memory argument.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MmapUser {
    /// The using instance.
    pub instance: InstanceId,
    /// The child port bound to the shared argument.
    pub port: String,
    /// The private net of this user.
    pub net: String,
    /// Whether this user accesses the memory through address/data streams.
    pub asynchronous: bool,
}

/// What an instance instantiates.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum InstanceKind {
    /// A child task.
    Task {
        /// The instantiated task.
        task: TaskId,
        /// Its name, kept for naming and diagnostics.
        task_name: String,
        /// Ordinal among instances of the same task in this parent.
        index: u32,
    },
    /// Address-channel demultiplexer in front of an async memory user.
    AsyncMmap {
        /// Memory net the demultiplexer drives.
        net: String,
        /// The user instance.
        user: InstanceId,
        /// The user's port.
        port: String,
        /// Data width of the memory.
        width: u32,
    },
    /// Address arbiter merging the users of a shared memory argument.
    Arbiter {
        /// The parent memory port the users share.
        arg: String,
        /// Data width of the memory.
        width: u32,
        /// All users, in instance order.
        users: Vec<MmapUser>,
    },
}

/// One instantiation inside an upper task.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Instance {
    /// Unique name within the parent, e.g. `Add_0`.
    pub name: String,
    /// What is instantiated.
    pub kind: InstanceKind,
    /// Bulk-synchronous step; negative means free-running.
    pub step: i32,
    /// Args in the child task's port order. Empty for implicit instances.
    pub args: Vec<Arg>,
}

impl Instance {
    /// Canonical name of the `index`-th instance of `task`.
    pub fn task_instance_name(task: &str, index: u32) -> String {
        format!("{task}_{index}")
    }

    /// Free-running instances bypass the start/done controller.
    pub fn is_autorun(&self) -> bool {
        self.step < 0
    }

    /// The child task, if this is a task instance.
    pub fn task(&self) -> Option<TaskId> {
        match self.kind {
            InstanceKind::Task { task, .. } => Some(task),
            _ => None,
        }
    }

    /// Whether this instance needs a start/done controller.
    pub fn is_controlled(&self) -> bool {
        self.task().is_some() && !self.is_autorun()
    }

    /// Whether this instance was created to serve a memory argument.
    pub fn is_implicit(&self) -> bool {
        !matches!(self.kind, InstanceKind::Task { .. })
    }

    /// Finds the arg bound to `port`.
    pub fn arg(&self, port: &str) -> Option<&Arg> {
        self.args.iter().find(|a| a.port == port)
    }
}

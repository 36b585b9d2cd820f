//! The named entity a diagnostic is about.

use serde::{Deserialize, Serialize};
use std::fmt;

/// What kind of entity a [`Subject`] names.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum SubjectKind {
    /// A task definition.
    Task,
    /// An instance inside an upper task.
    Instance,
    /// A FIFO interconnect.
    Interconnect,
    /// A port of a task or of a compiled module.
    Port,
    /// A placement region, or an ordered pair of them.
    Region,
    /// A file on disk.
    File,
    /// An external tool invocation.
    Tool,
}

impl fmt::Display for SubjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SubjectKind::Task => "task",
            SubjectKind::Instance => "instance",
            SubjectKind::Interconnect => "interconnect",
            SubjectKind::Port => "port",
            SubjectKind::Region => "region",
            SubjectKind::File => "file",
            SubjectKind::Tool => "tool",
        };
        f.write_str(s)
    }
}

/// A named entity at fault, e.g. instance `Add_0`.
#[derive(Clone, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub struct Subject {
    /// The entity kind.
    pub kind: SubjectKind,
    /// The entity name as it appears in the task graph.
    pub name: String,
}

impl Subject {
    /// Creates a subject.
    pub fn new(kind: SubjectKind, name: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
        }
    }
}

impl fmt::Display for Subject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} `{}`", self.kind, self.name)
    }
}

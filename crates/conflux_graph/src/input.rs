//! The serialized task-graph format read by `analyze`.
//!
//! Maps are ordered so that re-serializing a document is canonical.

use crate::error::GraphConsistencyError;
use crate::port::{ArgCategory, Port};
use crate::task::TaskLevel;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// A whole program: the top task's name and every task keyed by name.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GraphDoc {
    /// Name of the top task.
    pub top: String,
    /// Every task definition.
    pub tasks: BTreeMap<String, TaskDoc>,
}

/// One task definition.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TaskDoc {
    /// Leaf or upper.
    pub level: TaskLevel,
    /// Behavioral source of a leaf.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<PathBuf>,
    /// External interface.
    #[serde(default)]
    pub ports: Vec<Port>,
    /// Child instances keyed by child task name, in index order.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub instances: BTreeMap<String, Vec<InstanceDoc>>,
    /// Interconnects keyed by name.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub fifos: BTreeMap<String, FifoDoc>,
}

/// One child instance record.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct InstanceDoc {
    /// Bulk-synchronous step; negative means free-running.
    #[serde(default)]
    pub step: i32,
    /// Bindings keyed by child port name.
    #[serde(default)]
    pub args: BTreeMap<String, ArgDoc>,
}

/// One arg binding.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ArgDoc {
    /// Parent-scope name.
    pub arg: String,
    /// Declared category.
    pub category: ArgCategory,
}

/// One interconnect record.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FifoDoc {
    /// Declared depth; absent means pass-through.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub depth: Option<u32>,
    /// Writing instance as `[task, index]`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub producer: Option<EndpointDoc>,
    /// Reading instance as `[task, index]`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub consumer: Option<EndpointDoc>,
}

/// An instance reference, serialized as `["Task", index]`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointDoc(pub String, pub u32);

impl GraphDoc {
    /// Decodes a document from JSON text.
    pub fn from_json(text: &str) -> Result<Self, GraphConsistencyError> {
        serde_json::from_str(text).map_err(|e| GraphConsistencyError::Malformed {
            reason: e.to_string(),
        })
    }

    /// Encodes the document as pretty-printed, key-sorted JSON.
    pub fn to_json(&self) -> Result<String, GraphConsistencyError> {
        serde_json::to_string_pretty(self).map_err(|e| GraphConsistencyError::Malformed {
            reason: e.to_string(),
        })
    }
}

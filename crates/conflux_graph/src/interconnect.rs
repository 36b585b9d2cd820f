//! FIFO interconnects between instances or to the task boundary.

use crate::ids::InstanceId;
use serde::{Deserialize, Serialize};

/// A named directional channel inside an upper task.
///
/// With a depth, both endpoints are instances and a FIFO is built. Without
/// one, exactly one endpoint is an instance and the other is the owning
/// task's boundary port of the same name.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interconnect {
    /// Name, unique within the task.
    pub name: String,
    /// Declared depth; absent means pass-through.
    pub depth: Option<u32>,
    /// Writing instance, absent when the boundary writes.
    pub producer: Option<InstanceId>,
    /// Reading instance, absent when the boundary reads.
    pub consumer: Option<InstanceId>,
    /// Payload width in bits, derived from the producer side.
    pub width: u32,
}

impl Interconnect {
    /// Whether this channel connects a child straight to the boundary.
    pub fn is_pass_through(&self) -> bool {
        self.depth.is_none()
    }

    /// Both endpoints when the channel is internal.
    pub fn endpoints(&self) -> Option<(InstanceId, InstanceId)> {
        Some((self.producer?, self.consumer?))
    }
}

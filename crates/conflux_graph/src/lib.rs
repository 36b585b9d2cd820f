//! The hierarchical dataflow task graph.
//!
//! A program is a set of [`Task`]s keyed by name. Leaf tasks are synthesized
//! from behavioral source; upper tasks instantiate children and connect them
//! with [`Interconnect`]s and memory-mapped [`Arg`]s. The graph is parsed once
//! from its serialized form ([`GraphDoc`]), validated, and never mutated.
//!
//! Memory arguments bound by several instances and asynchronous memory users
//! get implicit arbiter and demultiplexer [`Instance`]s in the same arena as
//! task instances, so later stages treat them uniformly.

#![warn(missing_docs)]

pub mod arena;
pub mod error;
pub mod graph;
pub mod ids;
pub mod input;
pub mod instance;
pub mod interconnect;
pub mod port;
pub mod task;

pub use arena::{Arena, ArenaId};
pub use error::GraphConsistencyError;
pub use graph::TaskGraph;
pub use ids::{InstanceId, TaskId};
pub use input::{ArgDoc, EndpointDoc, FifoDoc, GraphDoc, InstanceDoc, TaskDoc};
pub use instance::{shared_mmap_name, Arg, Instance, InstanceKind, MmapUser};
pub use interconnect::Interconnect;
pub use port::{ArgCategory, Port};
pub use task::{Task, TaskLevel};

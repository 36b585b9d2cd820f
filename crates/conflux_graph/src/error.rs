//! Graph consistency errors.

use crate::port::ArgCategory;

/// A task graph, compiled interface, or region assignment that cannot be
/// turned into a correct netlist.
///
/// Every variant names the entities at fault. These errors are never
/// recovered from: a wrong netlist is worse than no netlist.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GraphConsistencyError {
    /// The serialized graph could not be decoded.
    #[error("malformed task graph: {reason}")]
    Malformed {
        /// Decoder message.
        reason: String,
    },

    /// The declared top task does not exist.
    #[error("top task `{top}` is not defined")]
    UnknownTop {
        /// The missing name.
        top: String,
    },

    /// An upper task instantiates an undefined task.
    #[error("task `{parent}` instantiates undefined task `{task}`")]
    UnknownTask {
        /// The instantiating task.
        parent: String,
        /// The undefined name.
        task: String,
    },

    /// The task-reference graph has a cycle through `task`.
    #[error("task `{task}` instantiates itself through its children")]
    CyclicTaskReference {
        /// A task on the cycle.
        task: String,
    },

    /// A leaf task carries children or interconnects, or lacks a source.
    #[error("leaf task `{task}` is malformed: {reason}")]
    MalformedLeaf {
        /// The leaf task.
        task: String,
        /// What is wrong with it.
        reason: String,
    },

    /// Two ports of one task share a name.
    #[error("task `{task}` declares port `{port}` twice")]
    DuplicatePort {
        /// The task.
        task: String,
        /// The repeated port.
        port: String,
    },

    /// An arg or the assembler refers to a port the child does not have.
    #[error("instance `{instance}` has no port `{port}`")]
    MissingChildPort {
        /// The instance.
        instance: String,
        /// The expected port.
        port: String,
    },

    /// A compiled child exposes a port at a width the graph does not imply.
    #[error(
        "port `{port}` of instance `{instance}` is {found} bits wide but {expected} are expected"
    )]
    CompiledWidthMismatch {
        /// The instance.
        instance: String,
        /// The compiled port.
        port: String,
        /// Width implied by the graph.
        expected: u32,
        /// Width of the compiled port.
        found: u32,
    },

    /// A child port is left without a binding.
    #[error("port `{port}` of instance `{instance}` is not bound")]
    UnboundPort {
        /// The instance.
        instance: String,
        /// The unbound port.
        port: String,
    },

    /// An arg's category differs from its port's category.
    #[error(
        "port `{port}` of instance `{instance}` is {expected} but is bound as {found}"
    )]
    CategoryMismatch {
        /// The instance.
        instance: String,
        /// The port.
        port: String,
        /// The port's category.
        expected: ArgCategory,
        /// The arg's category.
        found: ArgCategory,
    },

    /// An arg names nothing the parent can supply.
    #[error("port `{port}` of instance `{instance}` is bound to unknown `{arg}`")]
    UnknownArgSource {
        /// The instance.
        instance: String,
        /// The port.
        port: String,
        /// The unresolved parent-scope name.
        arg: String,
    },

    /// An interconnect's endpoints or bindings are inconsistent.
    #[error("interconnect `{interconnect}` in task `{task}` is malformed: {reason}")]
    MalformedInterconnect {
        /// The owning task.
        task: String,
        /// The interconnect.
        interconnect: String,
        /// What is wrong with it.
        reason: String,
    },

    /// Producer and consumer disagree on the payload width.
    #[error(
        "interconnect `{interconnect}` is {producer_width} bits wide at the producer but {consumer_width} at the consumer"
    )]
    WidthMismatch {
        /// The interconnect.
        interconnect: String,
        /// Producer-side width.
        producer_width: u32,
        /// Consumer-side width.
        consumer_width: u32,
    },

    /// A memory argument of a category that cannot be arbitrated is bound twice.
    #[error("`{arg}` is bound by several instances, which {category} ports do not support")]
    UnsupportedSharing {
        /// The shared parent-scope name.
        arg: String,
        /// Its category.
        category: ArgCategory,
    },

    /// An instance has no region in the assignment.
    #[error("instance `{instance}` has no region assignment")]
    MissingAssignment {
        /// The instance.
        instance: String,
    },

    /// An instance was assigned more than once.
    #[error("instance `{instance}` is assigned to both `{first}` and `{second}`")]
    DuplicateAssignment {
        /// The instance.
        instance: String,
        /// First region.
        first: String,
        /// Second region.
        second: String,
    },

    /// The assignment names an instance the task does not have.
    #[error("region `{region}` lists unknown instance `{instance}`")]
    UnknownAssignedInstance {
        /// The unknown instance.
        instance: String,
        /// The region listing it.
        region: String,
    },

    /// The assignment uses a region the device does not have.
    #[error("instance `{instance}` is assigned to unknown region `{region}`")]
    UnknownRegion {
        /// The instance.
        instance: String,
        /// The unknown region.
        region: String,
    },

    /// The topology has no hop chain for an ordered region pair.
    #[error("no route from region `{from}` to region `{to}` for interconnect `{interconnect}`")]
    UnreachableRegionPair {
        /// Producer region.
        from: String,
        /// Consumer region.
        to: String,
        /// The interconnect that needs the route.
        interconnect: String,
    },

    /// Two instances that must share a region do not.
    #[error(
        "instance `{instance}` in region `{region}` must share a region with `{anchor}` in `{anchor_region}`"
    )]
    ColocationViolated {
        /// The displaced instance.
        instance: String,
        /// Its region.
        region: String,
        /// The instance it must sit with.
        anchor: String,
        /// The anchor's region.
        anchor_region: String,
    },
}

impl GraphConsistencyError {
    /// Stable numeric code used when rendering diagnostics (`E1xx`).
    pub fn code(&self) -> u16 {
        match self {
            GraphConsistencyError::Malformed { .. } => 100,
            GraphConsistencyError::UnknownTop { .. } => 101,
            GraphConsistencyError::UnknownTask { .. } => 102,
            GraphConsistencyError::CyclicTaskReference { .. } => 103,
            GraphConsistencyError::MalformedLeaf { .. } => 104,
            GraphConsistencyError::DuplicatePort { .. } => 105,
            GraphConsistencyError::MissingChildPort { .. } => 106,
            GraphConsistencyError::UnboundPort { .. } => 107,
            GraphConsistencyError::CategoryMismatch { .. } => 108,
            GraphConsistencyError::UnknownArgSource { .. } => 109,
            GraphConsistencyError::MalformedInterconnect { .. } => 110,
            GraphConsistencyError::WidthMismatch { .. } => 111,
            GraphConsistencyError::UnsupportedSharing { .. } => 112,
            GraphConsistencyError::CompiledWidthMismatch { .. } => 115,
            GraphConsistencyError::MissingAssignment { .. } => 120,
            GraphConsistencyError::DuplicateAssignment { .. } => 121,
            GraphConsistencyError::UnknownAssignedInstance { .. } => 122,
            GraphConsistencyError::UnknownRegion { .. } => 123,
            GraphConsistencyError::UnreachableRegionPair { .. } => 124,
            GraphConsistencyError::ColocationViolated { .. } => 125,
        }
    }
}

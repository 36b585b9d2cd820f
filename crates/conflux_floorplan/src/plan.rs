//! Per-interconnect partition plan derived from a placement.

use crate::assignment::{Assignment, Placement};
use crate::constraints::check_colocation;
use crate::region::{Region, Topology};
use conflux_graph::{GraphConsistencyError, Task};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, info};

/// Knobs that change how interconnects are split.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PartitionPolicy {
    /// Pipeline same-region FIFOs with one extra stage.
    pub additional_pipelining: bool,
    /// Interconnects that must stay a single stage.
    pub nonpipeline_fifos: BTreeSet<String>,
}

/// How one FIFO is split across regions.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FifoPlan {
    /// Writing instance.
    pub producer: String,
    /// Reading instance.
    pub consumer: String,
    /// Number of chained stages.
    pub partitions: u32,
    /// Region of each stage, producer side first.
    pub stages: Vec<Region>,
}

/// The persisted result of floorplanning one task.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Floorplan {
    /// Floorplanned task.
    pub task: String,
    /// Canonical assignment.
    pub assignment: Assignment,
    /// Plan per buffered interconnect.
    pub fifos: BTreeMap<String, FifoPlan>,
    /// Longest hop chain; a lower bound for the task's register level.
    pub register_level_bound: u32,
}

impl Floorplan {
    /// Partition counts keyed by interconnect, as consumed by assembly.
    pub fn partitions(&self) -> BTreeMap<String, u32> {
        self.fifos
            .iter()
            .map(|(name, plan)| (name.clone(), plan.partitions))
            .collect()
    }

    /// Encodes the plan as pretty-printed JSON.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Decodes a plan written by [`Floorplan::to_json`].
    pub fn from_json(text: &str) -> serde_json::Result<Self> {
        serde_json::from_str(text)
    }
}

/// Splits every buffered interconnect of `task` along the hop chain between
/// its endpoints' regions.
///
/// The assignment must cover every instance exactly once and satisfy the
/// co-location `groups`; each FIFO's region pair must be routable. A FIFO in
/// `policy.nonpipeline_fifos` is always one partition and its endpoints must
/// share a region. Nothing is corrected silently.
pub fn partition(
    task: &Task,
    assignment: &Assignment,
    topology: &Topology,
    groups: &[Vec<String>],
    policy: PartitionPolicy,
) -> Result<Floorplan, GraphConsistencyError> {
    let placement = assignment.resolve(task, None)?;
    check_colocation(groups, &placement)?;

    let mut fifos = BTreeMap::new();
    let mut bound = 0;
    for ic in &task.interconnects {
        let Some((p, c)) = ic.endpoints() else {
            continue;
        };
        if ic.depth.is_none() {
            continue;
        }
        let producer = &task.instances[p].name;
        let consumer = &task.instances[c].name;
        let from = region_of(&placement, producer)?;
        let to = region_of(&placement, consumer)?;

        if policy.nonpipeline_fifos.contains(&ic.name) {
            if from != to {
                return Err(GraphConsistencyError::ColocationViolated {
                    instance: consumer.clone(),
                    region: to.to_string(),
                    anchor: producer.clone(),
                    anchor_region: from.to_string(),
                });
            }
            bound = bound.max(1);
            debug!(fifo = %ic.name, region = %from, "unpipelined");
            fifos.insert(
                ic.name.clone(),
                FifoPlan {
                    producer: producer.clone(),
                    consumer: consumer.clone(),
                    partitions: 1,
                    stages: vec![from.clone()],
                },
            );
            continue;
        }

        let hops = topology.hops(from, to).ok_or_else(|| {
            GraphConsistencyError::UnreachableRegionPair {
                from: from.to_string(),
                to: to.to_string(),
                interconnect: ic.name.clone(),
            }
        })?;
        bound = bound.max(hops.len() as u32);

        let stages = if from == to && policy.additional_pipelining {
            vec![from.clone(), from.clone()]
        } else {
            hops
        };
        debug!(fifo = %ic.name, %from, %to, partitions = stages.len(), "partition");
        fifos.insert(
            ic.name.clone(),
            FifoPlan {
                producer: producer.clone(),
                consumer: consumer.clone(),
                partitions: stages.len() as u32,
                stages,
            },
        );
    }

    info!(
        task = %task.name,
        fifos = fifos.len(),
        bound,
        "floorplan partitioned"
    );
    Ok(Floorplan {
        task: task.name.clone(),
        assignment: placement.to_assignment(),
        fifos,
        register_level_bound: bound,
    })
}

fn region_of<'a>(placement: &'a Placement, instance: &str) -> Result<&'a Region, GraphConsistencyError> {
    placement
        .region_of(instance)
        .ok_or_else(|| GraphConsistencyError::MissingAssignment {
            instance: instance.to_string(),
        })
}

//! The constraint list handed once to the region solver.

use crate::assignment::Placement;
use crate::region::Region;
use conflux_graph::{GraphConsistencyError, InstanceKind, Task};
use conflux_synth::{arbiter_area, async_mmap_area, Area};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One placeable instance.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vertex {
    /// Instance name.
    pub name: String,
    /// Instantiated task, or `async_mmap` / `arbiter` for implicit ones.
    pub kind: String,
    /// Estimated area.
    pub area: Area,
}

/// One buffered interconnect between two instances.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edge {
    /// Interconnect name.
    pub name: String,
    /// Producer instance.
    pub producer: String,
    /// Consumer instance.
    pub consumer: String,
    /// Wire width including the end-of-transaction bit.
    pub width: u32,
}

/// Everything the solver needs, in a deterministic order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConstraintList {
    /// Task being floorplanned.
    pub task: String,
    /// Target device.
    pub part: Option<String>,
    /// Known regions; empty lets the solver choose.
    pub regions: Vec<Region>,
    /// Instances in arena order.
    pub vertices: Vec<Vertex>,
    /// Buffered interconnects in name order.
    pub edges: Vec<Edge>,
    /// Instances that must share one region; the first is the anchor.
    pub groups: Vec<Vec<String>>,
}

impl ConstraintList {
    /// Builds the list for `task` with leaf and upper areas from `areas`
    /// (keyed by task name; missing ones count as zero).
    ///
    /// Each interconnect named in `nonpipeline` pins its producer and
    /// consumer to one region.
    pub fn build(
        task: &Task,
        areas: &BTreeMap<String, Area>,
        regions: &[Region],
        part: Option<&str>,
        nonpipeline: &[String],
    ) -> Result<Self, GraphConsistencyError> {
        let mut vertices = Vec::new();
        let mut groups = Vec::new();
        for (_, inst) in task.instances.iter() {
            let (kind, area) = match &inst.kind {
                InstanceKind::Task { task_name, .. } => (
                    task_name.clone(),
                    areas.get(task_name).copied().unwrap_or(Area::ZERO),
                ),
                InstanceKind::AsyncMmap { user, width, .. } => {
                    groups.push(vec![task.instances[*user].name.clone(), inst.name.clone()]);
                    ("async_mmap".to_string(), async_mmap_area(*width))
                }
                InstanceKind::Arbiter { users, .. } => {
                    let mut group = vec![inst.name.clone()];
                    for u in users {
                        let name = &task.instances[u.instance].name;
                        if !group.contains(name) {
                            group.push(name.clone());
                        }
                    }
                    groups.push(group);
                    ("arbiter".to_string(), arbiter_area(users.len()))
                }
            };
            vertices.push(Vertex {
                name: inst.name.clone(),
                kind,
                area,
            });
        }

        for name in nonpipeline {
            let endpoints = task
                .interconnects
                .iter()
                .find(|ic| &ic.name == name && ic.depth.is_some())
                .and_then(|ic| ic.endpoints())
                .ok_or_else(|| GraphConsistencyError::MalformedInterconnect {
                    task: task.name.clone(),
                    interconnect: name.clone(),
                    reason: "kept unpipelined but is not a buffered interconnect".to_string(),
                })?;
            let (p, c) = endpoints;
            groups.push(vec![
                task.instances[p].name.clone(),
                task.instances[c].name.clone(),
            ]);
        }

        let edges = task
            .interconnects
            .iter()
            .filter_map(|ic| {
                let (p, c) = ic.endpoints()?;
                ic.depth?;
                Some(Edge {
                    name: ic.name.clone(),
                    producer: task.instances[p].name.clone(),
                    consumer: task.instances[c].name.clone(),
                    width: ic.width + 1,
                })
            })
            .collect();

        Ok(Self {
            task: task.name.clone(),
            part: part.map(str::to_string),
            regions: regions.to_vec(),
            vertices,
            edges,
            groups,
        })
    }
}

/// Checks that every group sits in one region.
pub fn check_colocation(
    groups: &[Vec<String>],
    placement: &Placement,
) -> Result<(), GraphConsistencyError> {
    for group in groups {
        let Some((anchor, rest)) = group.split_first() else {
            continue;
        };
        let Some(anchor_region) = placement.region_of(anchor) else {
            continue;
        };
        for inst in rest {
            if let Some(region) = placement.region_of(inst).filter(|r| *r != anchor_region) {
                return Err(GraphConsistencyError::ColocationViolated {
                    instance: inst.clone(),
                    region: region.to_string(),
                    anchor: anchor.clone(),
                    anchor_region: anchor_region.to_string(),
                });
            }
        }
    }
    Ok(())
}

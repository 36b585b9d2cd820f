//! Region assignments and their validation against a task.

use crate::region::Region;
use conflux_graph::{GraphConsistencyError, Task};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Instances listed per region, as authored by hand or returned by a solver.
///
/// Serialized as `{"REGION": ["inst", ...], ...}`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Assignment {
    regions: BTreeMap<Region, Vec<String>>,
}

impl Assignment {
    /// An empty assignment.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `instance` to `region`.
    pub fn assign(&mut self, region: Region, instance: impl Into<String>) {
        self.regions.entry(region).or_default().push(instance.into());
    }

    /// Builder form of [`Assignment::assign`] for several instances.
    pub fn with(mut self, region: &str, instances: &[&str]) -> Self {
        for inst in instances {
            self.assign(region.into(), *inst);
        }
        self
    }

    /// Regions with their instances, in region order.
    pub fn regions(&self) -> impl Iterator<Item = (&Region, &[String])> {
        self.regions.iter().map(|(r, i)| (r, i.as_slice()))
    }

    /// Checks the assignment against `task` and indexes it by instance.
    ///
    /// Every instance of `task`, implicit ones included, must appear exactly
    /// once. When `known` is given, every region must be one of them.
    pub fn resolve(
        &self,
        task: &Task,
        known: Option<&BTreeSet<Region>>,
    ) -> Result<Placement, GraphConsistencyError> {
        let mut by_instance: BTreeMap<String, Region> = BTreeMap::new();
        for (region, instances) in &self.regions {
            for inst in instances {
                if task.instance_by_name(inst).is_none() {
                    return Err(GraphConsistencyError::UnknownAssignedInstance {
                        instance: inst.clone(),
                        region: region.to_string(),
                    });
                }
                if known.is_some_and(|k| !k.contains(region)) {
                    return Err(GraphConsistencyError::UnknownRegion {
                        instance: inst.clone(),
                        region: region.to_string(),
                    });
                }
                if let Some(first) = by_instance.insert(inst.clone(), region.clone()) {
                    return Err(GraphConsistencyError::DuplicateAssignment {
                        instance: inst.clone(),
                        first: first.to_string(),
                        second: region.to_string(),
                    });
                }
            }
        }

        if let Some((_, missing)) = task
            .instances
            .iter()
            .find(|(_, inst)| !by_instance.contains_key(&inst.name))
        {
            return Err(GraphConsistencyError::MissingAssignment {
                instance: missing.name.clone(),
            });
        }
        Ok(Placement { by_instance })
    }
}

/// A validated assignment: exactly one region per instance.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Placement {
    by_instance: BTreeMap<String, Region>,
}

impl Placement {
    /// Region of `instance`.
    pub fn region_of(&self, instance: &str) -> Option<&Region> {
        self.by_instance.get(instance)
    }

    /// The canonical assignment: regions in order, instances sorted.
    pub fn to_assignment(&self) -> Assignment {
        let mut out = Assignment::new();
        for (inst, region) in &self.by_instance {
            out.assign(region.clone(), inst.clone());
        }
        out
    }
}

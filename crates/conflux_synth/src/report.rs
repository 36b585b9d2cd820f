//! Per-task resource reports and their aggregation up the hierarchy.

use crate::area::{estimate_overhead, Area};
use crate::error::ExternalToolError;
use conflux_common::ClockPeriod;
use conflux_graph::{Instance, TaskGraph};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

/// Version tag written into every report.
pub const REPORT_SCHEMA: &str = "v1";

/// Timing achieved by a task.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Performance {
    /// Estimated clock period.
    pub clock_period: ClockPeriod,
}

/// Instances of one child task and their combined area.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChildUsage {
    /// Number of instances.
    pub count: u64,
    /// Area of all of them.
    pub area: Area,
}

/// Total area and its split by child task.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AreaReport {
    /// Everything, including the task's own overhead.
    pub total: Area,
    /// Per child task; empty for leaves.
    #[serde(default)]
    pub breakdown: BTreeMap<String, ChildUsage>,
}

/// `report/{task}.json`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TaskReport {
    /// Always [`REPORT_SCHEMA`].
    pub schema: String,
    /// Task name.
    pub name: String,
    /// Timing.
    pub performance: Performance,
    /// Resources.
    pub area: AreaReport,
}

impl TaskReport {
    /// A leaf report.
    pub fn leaf(name: impl Into<String>, clock_period: ClockPeriod, area: Area) -> Self {
        Self {
            schema: REPORT_SCHEMA.to_string(),
            name: name.into(),
            performance: Performance { clock_period },
            area: AreaReport {
                total: area,
                breakdown: BTreeMap::new(),
            },
        }
    }

    /// Pretty JSON, as persisted.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// Reports for every reachable task: the given leaf reports plus one
/// aggregated report per upper task.
///
/// An upper task runs at the slowest child's clock and occupies the sum of
/// its children's areas plus its own estimated overhead. Partition counts
/// apply to the top task only.
pub fn aggregate_reports(
    graph: &TaskGraph,
    leaves: &BTreeMap<String, TaskReport>,
    register_level: u32,
    partitions: &BTreeMap<String, u32>,
    default_period: ClockPeriod,
) -> Result<BTreeMap<String, TaskReport>, ExternalToolError> {
    let none = BTreeMap::new();
    let mut out: BTreeMap<String, TaskReport> = BTreeMap::new();

    for &id in graph.leaves_first() {
        let task = &graph[id];
        if task.is_leaf() {
            let report = leaves
                .get(&task.name)
                .ok_or_else(|| ExternalToolError::MissingReport {
                    task: task.name.clone(),
                })?;
            out.insert(task.name.clone(), report.clone());
            continue;
        }

        let mut breakdown: BTreeMap<String, ChildUsage> = BTreeMap::new();
        let mut period: Option<ClockPeriod> = None;
        for child_name in task.instances.values().filter_map(task_name) {
            let child = out
                .get(child_name)
                .ok_or_else(|| ExternalToolError::MissingReport {
                    task: child_name.to_string(),
                })?;
            let usage = breakdown.entry(child_name.to_string()).or_insert(ChildUsage {
                count: 0,
                area: Area::ZERO,
            });
            usage.count += 1;
            usage.area += child.area.total;
            let p = child.performance.clock_period;
            period = Some(period.map_or(p, |q| q.max(p)));
        }

        let parts = if id == graph.top() { partitions } else { &none };
        let overhead = estimate_overhead(task, register_level, parts);
        let total = breakdown.values().map(|u| u.area).sum::<Area>() + overhead;
        debug!(task = %task.name, lut = total.lut, ff = total.ff, "aggregated area");
        out.insert(
            task.name.clone(),
            TaskReport {
                schema: REPORT_SCHEMA.to_string(),
                name: task.name.clone(),
                performance: Performance {
                    clock_period: period.unwrap_or(default_period),
                },
                area: AreaReport { total, breakdown },
            },
        );
    }
    Ok(out)
}

fn task_name(inst: &Instance) -> Option<&str> {
    match &inst.kind {
        conflux_graph::InstanceKind::Task { task_name, .. } => Some(task_name),
        _ => None,
    }
}

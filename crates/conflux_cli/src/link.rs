//! `conflux link`: assemble every upper task and write all netlists.

use std::collections::BTreeMap;

use conflux_assemble::LinkOptions;
use conflux_cache::{read_text, stage, write_json, write_text};
use conflux_config::PipelineStrategy;
use conflux_floorplan::Floorplan;
use conflux_graph::TaskGraph;
use conflux_netlist::write_verilog;
use conflux_synth::{aggregate_reports, TaskReport};
use tracing::info;

use crate::pipeline::{load_graph, load_leaves, load_project, status, Project, StageResult};
use crate::GlobalArgs;

/// Runs the `conflux link` command.
pub fn run(global: &GlobalArgs) -> StageResult<i32> {
    let project = load_project(global)?;
    let graph = load_graph(&project.work)?;
    link(&project, &graph, global)?;
    Ok(0)
}

/// The register level actually used: the configured one, raised to the
/// floorplan's longest hop chain.
pub fn effective_register_level(configured: u32, plan: Option<&Floorplan>) -> u32 {
    plan.map_or(configured, |p| configured.max(p.register_level_bound))
}

/// Assembles upper tasks leaves-first and writes `hdl/{task}.v` for every
/// task, leaves verbatim. Upper reports are re-aggregated with the final
/// register level and partition counts.
pub fn link(project: &Project, graph: &TaskGraph, global: &GlobalArgs) -> StageResult<()> {
    let settings = &project.settings;
    let work = &project.work;
    let leaves = load_leaves(graph, work)?;

    let plan = match settings.strategy {
        PipelineStrategy::Floorplan => Some(Floorplan::from_json(&read_text(
            &work.floorplan(),
            stage::FLOORPLAN,
        )?)?),
        PipelineStrategy::None => None,
    };
    let register_level = effective_register_level(settings.register_level, plan.as_ref());
    if register_level > settings.register_level {
        info!(
            configured = settings.register_level,
            register_level, "register level raised to cover the longest region crossing"
        );
    }
    let partitions = plan.as_ref().map(Floorplan::partitions).unwrap_or_default();

    let mut interfaces = BTreeMap::new();
    for (name, artifact) in &leaves {
        interfaces.insert(name.clone(), artifact.interface()?);
    }
    status(global, "Linking", &graph.top_task().name);
    let linked = conflux_assemble::link(
        graph,
        &interfaces,
        &LinkOptions {
            register_level,
            partitions: partitions.clone(),
        },
    )?;

    for (name, artifact) in &leaves {
        write_text(&work.hdl(name), &artifact.verilog)?;
    }
    for (name, module) in &linked.modules {
        write_text(&work.hdl(name), &write_verilog(module))?;
    }

    let leaf_reports: BTreeMap<String, TaskReport> = leaves
        .iter()
        .map(|(name, a)| (name.clone(), a.report.clone()))
        .collect();
    let reports = aggregate_reports(
        graph,
        &leaf_reports,
        register_level,
        &partitions,
        settings.clock_period,
    )?;
    for (name, report) in reports.iter().filter(|(name, _)| linked.modules.contains_key(*name)) {
        write_json(&work.report(name), report)?;
    }
    Ok(())
}

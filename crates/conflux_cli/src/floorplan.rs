//! `conflux floorplan`: place the top task's instances and plan FIFO stages.

use std::collections::{BTreeMap, BTreeSet};

use conflux_cache::write_text;
use conflux_config::ConfigError;
use conflux_floorplan::{
    partition, region_script, solve_or_fallback, ConstraintList, Floorplan, OverrideSolver,
    PartitionPolicy, ProcessSolver, Region, RegionSolver,
};
use conflux_graph::TaskGraph;

use crate::pipeline::{load_graph, load_project, load_report, status, Project, StageResult};
use crate::GlobalArgs;

/// Runs the `conflux floorplan` command.
pub fn run(global: &GlobalArgs) -> StageResult<i32> {
    let project = load_project(global)?;
    let graph = load_graph(&project.work)?;
    floorplan(&project, &graph, global)?;
    Ok(0)
}

/// Builds the constraint list, obtains an assignment, partitions, and
/// writes `floorplan.json` and `constraints.tcl`.
pub fn floorplan(project: &Project, graph: &TaskGraph, global: &GlobalArgs) -> StageResult<Floorplan> {
    let settings = &project.settings;
    let top = graph.top_task();
    status(global, "Floorplanning", &top.name);

    let mut areas = BTreeMap::new();
    for (_, task) in graph.tasks() {
        if task.name != top.name {
            areas.insert(task.name.clone(), load_report(&project.work, &task.name)?.area.total);
        }
    }
    let regions: Vec<Region> = settings.floorplan.regions.iter().map(Region::new).collect();
    let constraints = ConstraintList::build(
        top,
        &areas,
        &regions,
        settings.part.as_deref(),
        &settings.floorplan.nonpipeline_fifos,
    )?;

    let solver: Box<dyn RegionSolver> = match (&settings.floorplan.assignment, &settings.floorplan.solver) {
        (Some(path), _) => Box::new(OverrideSolver { path: path.clone() }),
        (None, Some(command)) => Box::new(ProcessSolver {
            command: command.clone(),
            args: settings.floorplan.solver_args.clone(),
            work_dir: project.work.root().join("solver"),
        }),
        (None, None) => {
            return Err(ConfigError::ValidationError(
                "floorplanning needs floorplan.assignment or floorplan.solver".to_string(),
            )
            .into())
        }
    };
    let solution = solve_or_fallback(solver.as_ref(), &constraints, settings.floorplan.best_effort)?;

    if !regions.is_empty() {
        let known: BTreeSet<Region> = regions.iter().cloned().collect();
        solution.assignment.resolve(top, Some(&known))?;
    }
    let plan = partition(
        top,
        &solution.assignment,
        &solution.topology,
        &constraints.groups,
        PartitionPolicy {
            additional_pipelining: settings.additional_pipelining,
            nonpipeline_fifos: settings.floorplan.nonpipeline_fifos.iter().cloned().collect(),
        },
    )?;

    write_text(&project.work.floorplan(), &plan.to_json()?)?;
    write_text(&project.work.constraints(), &region_script(&plan))?;
    Ok(plan)
}

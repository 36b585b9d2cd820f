//! `conflux analyze`: validate the task graph and persist it canonically.

use conflux_cache::write_text;
use conflux_config::ConfigError;
use conflux_graph::{GraphDoc, TaskGraph};
use tracing::info;

use crate::pipeline::{load_project, status, Project, StageResult};
use crate::GlobalArgs;

/// Runs the `conflux analyze` command.
pub fn run(global: &GlobalArgs) -> StageResult<i32> {
    let project = load_project(global)?;
    analyze(&project, global)?;
    Ok(0)
}

/// Reads the input graph, checks it, and writes `graph.json`.
pub fn analyze(project: &Project, global: &GlobalArgs) -> StageResult<TaskGraph> {
    let path = &project.settings.graph_path;
    status(global, "Analyzing", path.display());
    let text = std::fs::read_to_string(path)
        .map_err(|e| format!("cannot read task graph {}: {e}", path.display()))?;
    let doc = GraphDoc::from_json(&text)?;
    if doc.top != project.settings.top {
        return Err(ConfigError::ValidationError(format!(
            "project.top is `{}` but the task graph's top is `{}`",
            project.settings.top, doc.top
        ))
        .into());
    }
    let graph = TaskGraph::from_doc(&doc)?;
    write_text(&project.work.graph(), &doc.to_json()?)?;
    info!(
        top = %doc.top,
        tasks = graph.tasks().count(),
        leaves = graph.leaves().count(),
        "task graph analyzed"
    );
    Ok(graph)
}

//! Shared helpers for the stage commands: locating the project, resolving
//! settings, and reading earlier stages' outputs.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use conflux_cache::{read_json, read_text, stage, SynthCache, WorkDir};
use conflux_config::{resolve_settings, ResolvedSettings, CONFIG_FILE};
use conflux_graph::TaskGraph;
use conflux_synth::{LeafArtifact, TaskReport};

use crate::GlobalArgs;

/// Version recorded in the artifact cache; other versions start fresh.
pub const TOOL_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Result type of stage helpers.
pub type StageResult<T> = Result<T, Box<dyn std::error::Error>>;

/// A loaded project.
pub struct Project {
    /// Directory holding `conflux.toml`.
    pub dir: PathBuf,
    /// Settings after overrides.
    pub settings: ResolvedSettings,
    /// Work directory layout.
    pub work: WorkDir,
}

/// Walks up from `start` looking for the nearest directory containing
/// `conflux.toml`.
pub fn find_project_root(start: &Path) -> StageResult<PathBuf> {
    let mut current = start.to_path_buf();
    loop {
        if current.join(CONFIG_FILE).exists() {
            return Ok(current);
        }
        if !current.pop() {
            return Err(format!(
                "could not find {CONFIG_FILE} in {} or any parent directory",
                start.display()
            )
            .into());
        }
    }
}

/// The project directory named by `--config` (a file or its directory), or
/// the nearest one above the current directory.
pub fn resolve_project_root(global: &GlobalArgs) -> StageResult<PathBuf> {
    match &global.config {
        Some(p) if p.is_file() => Ok(p
            .parent()
            .map_or_else(|| PathBuf::from("."), Path::to_path_buf)),
        Some(p) => Ok(p.clone()),
        None => find_project_root(&std::env::current_dir()?),
    }
}

/// Loads `conflux.toml` and applies the command-line overrides.
pub fn load_project(global: &GlobalArgs) -> StageResult<Project> {
    let dir = resolve_project_root(global)?;
    let config = conflux_config::load_config(&dir)?;
    let settings = resolve_settings(&config, &dir, &global.overrides)?;
    let work = WorkDir::new(settings.work_dir.clone());
    Ok(Project {
        dir,
        settings,
        work,
    })
}

/// Prints a progress line unless `--quiet`.
pub fn status(global: &GlobalArgs, verb: &str, what: impl std::fmt::Display) {
    if !global.quiet {
        eprintln!("   {verb} {what}");
    }
}

/// The graph persisted by `analyze`.
pub fn load_graph(work: &WorkDir) -> StageResult<TaskGraph> {
    Ok(TaskGraph::from_json(&read_text(&work.graph(), stage::ANALYZE)?)?)
}

/// Every leaf's cached artifact, keyed by task name.
pub fn load_leaves(graph: &TaskGraph, work: &WorkDir) -> StageResult<BTreeMap<String, LeafArtifact>> {
    let cache = SynthCache::load_or_create(&work.cache(), TOOL_VERSION);
    let mut leaves = BTreeMap::new();
    for (_, task) in graph.leaves() {
        let artifact = cache
            .cached(&task.name)
            .ok_or_else(|| conflux_cache::CacheError::MissingStage {
                path: work.cache(),
                stage: stage::SYNTH.to_string(),
            })?;
        leaves.insert(task.name.clone(), artifact);
    }
    Ok(leaves)
}

/// The report `synth` wrote for `task`.
pub fn load_report(work: &WorkDir, task: &str) -> StageResult<TaskReport> {
    Ok(read_json(&work.report(task), stage::SYNTH)?)
}

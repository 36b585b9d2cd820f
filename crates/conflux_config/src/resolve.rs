//! Resolution of file settings and command-line overrides into one value.

use crate::error::ConfigError;
use crate::loader::validate_pipeline;
use crate::types::{PipelineStrategy, ProjectConfig};
use conflux_common::ClockPeriod;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Command-line values that take precedence over `conflux.toml`.
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    /// Overrides `pipeline.register_level`.
    pub register_level: Option<u32>,
    /// Overrides `synth.jobs`.
    pub jobs: Option<usize>,
    /// Overrides `project.work_dir`.
    pub work_dir: Option<PathBuf>,
    /// Overrides `device.clock_period`.
    pub clock_period: Option<String>,
}

/// Fully resolved settings shared by every stage.
///
/// Persisted as `settings.json` in the work directory so later stages run
/// against exactly what earlier stages used.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolvedSettings {
    /// Project name.
    pub name: String,
    /// Top task name.
    pub top: String,
    /// Absolute or project-relative path of the input task graph.
    pub graph_path: PathBuf,
    /// Work directory for persisted stage outputs.
    pub work_dir: PathBuf,
    /// Device part number, if any.
    pub part: Option<String>,
    /// Target clock period.
    pub clock_period: ClockPeriod,
    /// Control latency L of every upper task.
    pub register_level: u32,
    /// Pipelining strategy.
    pub strategy: PipelineStrategy,
    /// Pipeline same-region interconnects as well.
    pub additional_pipelining: bool,
    /// Synthesizer invocation.
    pub synth: SynthSettings,
    /// Floorplan sources.
    pub floorplan: FloorplanSettings,
}

/// Resolved synthesizer invocation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SynthSettings {
    /// Executable.
    pub command: String,
    /// Leading arguments.
    pub args: Vec<String>,
    /// Worker count, always at least 1.
    pub jobs: usize,
    /// Best-effort resource estimation.
    pub best_effort: bool,
}

/// Resolved floorplan sources.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FloorplanSettings {
    /// Known region labels; empty means unchecked.
    pub regions: Vec<String>,
    /// Hand-authored assignment file.
    pub assignment: Option<PathBuf>,
    /// Solver executable.
    pub solver: Option<String>,
    /// Solver arguments.
    pub solver_args: Vec<String>,
    /// Best-effort region solving.
    pub best_effort: bool,
    /// Interconnects kept as a single unsplit FIFO.
    #[serde(default)]
    pub nonpipeline_fifos: Vec<String>,
}

/// Merges `config` with `overrides`, anchoring relative paths at `project_dir`.
///
/// Overridden values are validated with the same rules as the file.
pub fn resolve_settings(
    config: &ProjectConfig,
    project_dir: &Path,
    overrides: &Overrides,
) -> Result<ResolvedSettings, ConfigError> {
    let register_level = overrides
        .register_level
        .unwrap_or(config.pipeline.register_level);
    validate_pipeline(
        register_level,
        config.pipeline.strategy,
        config.pipeline.additional_pipelining,
    )?;

    let clock_period = match overrides
        .clock_period
        .as_deref()
        .or(config.device.clock_period.as_deref())
    {
        Some(text) => text
            .parse::<ClockPeriod>()
            .map_err(|e| ConfigError::ValidationError(e.to_string()))?,
        None => ClockPeriod::default(),
    };

    let jobs = match overrides.jobs.unwrap_or(config.synth.jobs) {
        0 => std::thread::available_parallelism().map_or(1, |n| n.get()),
        n => n,
    };

    let work_dir = overrides
        .work_dir
        .clone()
        .unwrap_or_else(|| project_dir.join(&config.project.work_dir));

    Ok(ResolvedSettings {
        name: config.project.name.clone(),
        top: config.project.top.clone(),
        graph_path: project_dir.join(&config.project.graph),
        work_dir,
        part: config.device.part.clone(),
        clock_period,
        register_level,
        strategy: config.pipeline.strategy,
        additional_pipelining: config.pipeline.additional_pipelining,
        synth: SynthSettings {
            command: config.synth.command.clone(),
            args: config.synth.args.clone(),
            jobs,
            best_effort: config.synth.best_effort,
        },
        floorplan: FloorplanSettings {
            regions: config.floorplan.regions.clone(),
            assignment: config
                .floorplan
                .assignment
                .as_ref()
                .map(|p| project_dir.join(p)),
            solver: config.floorplan.solver.clone(),
            solver_args: config.floorplan.solver_args.clone(),
            best_effort: config.floorplan.best_effort,
            nonpipeline_fifos: config.floorplan.nonpipeline_fifos.clone(),
        },
    })
}

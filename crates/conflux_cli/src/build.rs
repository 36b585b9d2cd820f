//! `conflux build`: every stage in order.

use conflux_config::PipelineStrategy;

use crate::pack::{default_output, pack};
use crate::pipeline::{load_project, status, StageResult};
use crate::{analyze, floorplan, link, synth, GlobalArgs, PackArgs};

/// Runs analyze, synth, floorplan (when the strategy asks for it), link and
/// pack.
pub fn run(args: &PackArgs, global: &GlobalArgs) -> StageResult<i32> {
    let project = load_project(global)?;
    status(
        global,
        "Building",
        format_args!("{} (top {})", project.settings.name, project.settings.top),
    );

    let graph = analyze::analyze(&project, global)?;
    synth::synth(&project, &graph, global)?;
    if project.settings.strategy == PipelineStrategy::Floorplan {
        floorplan::floorplan(&project, &graph, global)?;
    }
    link::link(&project, &graph, global)?;

    let output = args
        .output
        .clone()
        .unwrap_or_else(|| default_output(&project.work, &project.settings.name));
    let archive = pack(&project.work, &project.settings.name, &output)?;
    status(
        global,
        "Finished",
        format_args!("{} ({} files)", output.display(), archive.entries.len()),
    );
    Ok(0)
}

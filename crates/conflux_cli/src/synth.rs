//! `conflux synth`: synthesize every leaf, then write per-task reports.

use std::collections::BTreeMap;

use conflux_cache::{write_json, SynthCache};
use conflux_graph::TaskGraph;
use conflux_synth::{aggregate_reports, synthesize_all, LeafArtifact, ProcessSynthesizer, SynthJob};
use tracing::info;

use crate::pipeline::{load_graph, load_project, status, Project, StageResult, TOOL_VERSION};
use crate::GlobalArgs;

/// Runs the `conflux synth` command.
pub fn run(global: &GlobalArgs) -> StageResult<i32> {
    let project = load_project(global)?;
    let graph = load_graph(&project.work)?;
    synth(&project, &graph, global)?;
    Ok(0)
}

/// Synthesizes leaves whose source or settings changed, reuses the rest
/// from the cache, and writes `report/{task}.json` for every task.
pub fn synth(
    project: &Project,
    graph: &TaskGraph,
    global: &GlobalArgs,
) -> StageResult<BTreeMap<String, LeafArtifact>> {
    let settings = &project.settings;
    let work = &project.work;
    write_json(&work.settings(), settings)?;

    let mut cache = SynthCache::load_or_create(&work.cache(), TOOL_VERSION);
    let mut artifacts = BTreeMap::new();
    let mut pending = Vec::new();
    for (_, task) in graph.leaves() {
        let Some(source) = &task.source else {
            continue;
        };
        let job = SynthJob {
            task: task.name.clone(),
            source: project.dir.join(source),
            clock_period: settings.clock_period,
            part: settings.part.clone(),
            out_dir: work.synth_scratch(&task.name),
        };
        let key = SynthCache::job_key(&job)?;
        match cache.lookup(&key) {
            Some(artifact) => {
                status(global, "Fresh", &task.name);
                cache.insert(&job, &key, &artifact)?;
                artifacts.insert(task.name.clone(), artifact);
            }
            None => {
                status(global, "Synthesizing", &task.name);
                pending.push((job, key));
            }
        }
    }

    let synthesizer = ProcessSynthesizer {
        command: settings.synth.command.clone(),
        args: settings.synth.args.clone(),
        best_effort: settings.synth.best_effort,
    };
    let jobs: Vec<SynthJob> = pending.iter().map(|(job, _)| job.clone()).collect();
    let results = synthesize_all(&synthesizer, &jobs, settings.synth.jobs)?;
    for ((job, key), artifact) in pending.iter().zip(results) {
        cache.insert(job, key, &artifact)?;
        artifacts.insert(job.task.clone(), artifact);
    }
    cache.save()?;

    let leaves = artifacts
        .iter()
        .map(|(name, a)| (name.clone(), a.report.clone()))
        .collect();
    let reports = aggregate_reports(
        graph,
        &leaves,
        settings.register_level,
        &BTreeMap::new(),
        settings.clock_period,
    )?;
    for (name, report) in &reports {
        write_json(&work.report(name), report)?;
    }
    info!(
        synthesized = jobs.len(),
        reused = artifacts.len() - jobs.len(),
        "synthesis complete"
    );
    Ok(artifacts)
}

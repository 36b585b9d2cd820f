//! Bounded parallel synthesis of independent leaf tasks.

use crate::error::ExternalToolError;
use crate::synthesizer::{LeafArtifact, SynthJob, Synthesizer};
use rayon::prelude::*;
use tracing::{info, warn};

/// Runs one job, retrying exactly once on the recognized transient failure.
pub fn synthesize_with_retry(
    synth: &dyn Synthesizer,
    job: &SynthJob,
) -> Result<LeafArtifact, ExternalToolError> {
    match synth.synthesize(job) {
        Err(err) if err.is_transient() => {
            warn!(task = %job.task, tool = synth.name(), "synthesis failed transiently; retrying");
            synth.synthesize(job)
        }
        result => result,
    }
}

/// Runs every job on at most `workers` threads (`0` means one per CPU).
///
/// Results come back in job order. The first fatal failure aborts the batch.
pub fn synthesize_all(
    synth: &dyn Synthesizer,
    jobs: &[SynthJob],
    workers: usize,
) -> Result<Vec<LeafArtifact>, ExternalToolError> {
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(workers)
        .build()
        .map_err(|e| ExternalToolError::Pool {
            reason: e.to_string(),
        })?;
    info!(jobs = jobs.len(), workers = pool.current_num_threads(), "synthesizing leaves");
    pool.install(|| {
        jobs.par_iter()
            .map(|job| synthesize_with_retry(synth, job))
            .collect()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::area::Area;
    use crate::report::TaskReport;
    use conflux_common::ClockPeriod;
    use std::collections::HashMap;
    use std::path::PathBuf;
    use std::sync::Mutex;

    /// Fails each task's first `n` attempts with the given output.
    struct Flaky {
        failures: HashMap<String, (usize, &'static str)>,
        calls: Mutex<HashMap<String, usize>>,
    }

    impl Flaky {
        fn new(failures: &[(&str, usize, &'static str)]) -> Self {
            Self {
                failures: failures
                    .iter()
                    .map(|&(t, n, out)| (t.to_string(), (n, out)))
                    .collect(),
                calls: Mutex::new(HashMap::new()),
            }
        }

        fn calls(&self, task: &str) -> usize {
            self.calls.lock().unwrap().get(task).copied().unwrap_or(0)
        }
    }

    impl Synthesizer for Flaky {
        fn name(&self) -> &str {
            "flaky"
        }

        fn synthesize(&self, job: &SynthJob) -> Result<LeafArtifact, ExternalToolError> {
            let attempt = {
                let mut calls = self.calls.lock().unwrap();
                let n = calls.entry(job.task.clone()).or_insert(0);
                *n += 1;
                *n
            };
            if let Some(&(fail, output)) = self.failures.get(&job.task) {
                if attempt <= fail {
                    return Err(ExternalToolError::Failed {
                        tool: "flaky".to_string(),
                        task: job.task.clone(),
                        status: Some(1),
                        output: output.to_string(),
                    });
                }
            }
            Ok(LeafArtifact {
                name: job.task.clone(),
                ports: Vec::new(),
                verilog: String::new(),
                report: TaskReport::leaf(job.task.clone(), job.clock_period, Area::ZERO),
            })
        }
    }

    fn job(task: &str) -> SynthJob {
        SynthJob {
            task: task.to_string(),
            source: PathBuf::from(format!("{task}.cpp")),
            clock_period: ClockPeriod::default(),
            part: None,
            out_dir: PathBuf::from("out"),
        }
    }

    const FLAKY: &str = "Pre-synthesis failed.\n";

    #[test]
    fn transient_failure_is_retried_once() {
        let synth = Flaky::new(&[("A", 1, FLAKY)]);
        let artifact = synthesize_with_retry(&synth, &job("A")).unwrap();
        assert_eq!(artifact.name, "A");
        assert_eq!(synth.calls("A"), 2);
    }

    #[test]
    fn second_transient_failure_is_fatal() {
        let synth = Flaky::new(&[("A", 2, FLAKY)]);
        let err = synthesize_with_retry(&synth, &job("A")).unwrap_err();
        assert!(err.is_transient());
        assert_eq!(synth.calls("A"), 2);
    }

    #[test]
    fn other_failures_are_not_retried() {
        let synth = Flaky::new(&[("A", 1, "ERROR: syntax")]);
        assert!(synthesize_with_retry(&synth, &job("A")).is_err());
        assert_eq!(synth.calls("A"), 1);
    }

    #[test]
    fn pool_keeps_job_order() {
        let synth = Flaky::new(&[("C", 1, FLAKY)]);
        let jobs: Vec<SynthJob> = ["A", "B", "C", "D"].into_iter().map(job).collect();
        let out = synthesize_all(&synth, &jobs, 2).unwrap();
        let names: Vec<&str> = out.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, ["A", "B", "C", "D"]);
    }

    #[test]
    fn pool_stops_on_fatal_failure() {
        let synth = Flaky::new(&[("B", 5, "ERROR: bad")]);
        let jobs: Vec<SynthJob> = ["A", "B"].into_iter().map(job).collect();
        let err = synthesize_all(&synth, &jobs, 0).unwrap_err();
        assert!(matches!(err, ExternalToolError::Failed { task, .. } if task == "B"));
    }
}

//! Region solver collaborators.

use crate::assignment::Assignment;
use crate::constraints::ConstraintList;
use crate::region::{Region, Topology};
use conflux_synth::ExternalToolError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::{debug, warn};

/// Region used when every instance is placed together.
pub const FALLBACK_REGION: &str = "ALL";

/// What a solver returns, and the format of a hand-authored override file.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Solution {
    /// Instances per region.
    pub assignment: Assignment,
    /// Directional hop chains between regions.
    #[serde(default)]
    pub topology: Topology,
}

impl Solution {
    /// Every vertex in one region: the first known one, or [`FALLBACK_REGION`].
    pub fn single_region(constraints: &ConstraintList) -> Self {
        let region = constraints
            .regions
            .first()
            .cloned()
            .unwrap_or_else(|| Region::new(FALLBACK_REGION));
        let mut assignment = Assignment::new();
        for v in &constraints.vertices {
            assignment.assign(region.clone(), v.name.clone());
        }
        Self {
            assignment,
            topology: Topology::new(),
        }
    }
}

/// Turns a constraint list into a region assignment and topology.
pub trait RegionSolver {
    /// Tool name for diagnostics.
    fn name(&self) -> &str;

    /// Solves once.
    fn solve(&self, constraints: &ConstraintList) -> Result<Solution, ExternalToolError>;
}

fn read_solution(tool: &str, task: &str, path: &Path) -> Result<Solution, ExternalToolError> {
    let bad = |reason: String| ExternalToolError::BadOutput {
        tool: tool.to_string(),
        task: task.to_string(),
        path: path.to_path_buf(),
        reason,
    };
    let text = std::fs::read_to_string(path).map_err(|e| bad(e.to_string()))?;
    serde_json::from_str(&text).map_err(|e| bad(e.to_string()))
}

/// Reads a hand-authored solution instead of solving.
#[derive(Clone, Debug)]
pub struct OverrideSolver {
    /// The override file.
    pub path: PathBuf,
}

impl RegionSolver for OverrideSolver {
    fn name(&self) -> &str {
        "override"
    }

    fn solve(&self, constraints: &ConstraintList) -> Result<Solution, ExternalToolError> {
        read_solution(self.name(), &constraints.task, &self.path)
    }
}

/// Runs an external solver as
/// `{command} {args..} --constraints C --output O`, with `C` the constraint
/// list as JSON and `O` where the tool writes its [`Solution`].
#[derive(Clone, Debug)]
pub struct ProcessSolver {
    /// Executable.
    pub command: String,
    /// Leading arguments.
    pub args: Vec<String>,
    /// Directory for the exchanged files.
    pub work_dir: PathBuf,
}

impl RegionSolver for ProcessSolver {
    fn name(&self) -> &str {
        &self.command
    }

    fn solve(&self, constraints: &ConstraintList) -> Result<Solution, ExternalToolError> {
        let launch = |e: std::io::Error| ExternalToolError::Launch {
            tool: self.command.clone(),
            task: constraints.task.clone(),
            source: e,
        };
        std::fs::create_dir_all(&self.work_dir).map_err(launch)?;
        let input = self.work_dir.join("constraints.json");
        let output = self.work_dir.join("solution.json");
        let text = serde_json::to_string_pretty(constraints)
            .map_err(|e| launch(std::io::Error::other(e)))?;
        std::fs::write(&input, text).map_err(launch)?;

        let mut cmd = Command::new(&self.command);
        cmd.args(&self.args)
            .arg("--constraints")
            .arg(&input)
            .arg("--output")
            .arg(&output);
        debug!(task = %constraints.task, command = ?cmd, "launching region solver");

        let out = cmd.output().map_err(launch)?;
        if !out.status.success() {
            let mut text = String::from_utf8_lossy(&out.stdout).into_owned();
            text.push_str(&String::from_utf8_lossy(&out.stderr));
            return Err(ExternalToolError::Failed {
                tool: self.command.clone(),
                task: constraints.task.clone(),
                status: out.status.code(),
                output: text,
            });
        }
        read_solution(&self.command, &constraints.task, &output)
    }
}

/// Solves, or with `best_effort` places everything in one region when the
/// solver fails.
pub fn solve_or_fallback(
    solver: &dyn RegionSolver,
    constraints: &ConstraintList,
    best_effort: bool,
) -> Result<Solution, ExternalToolError> {
    match solver.solve(constraints) {
        Ok(solution) => Ok(solution),
        Err(e) if best_effort => {
            warn!(
                solver = solver.name(),
                task = %constraints.task,
                error = %e,
                "region solver failed; placing every instance in one region"
            );
            Ok(Solution::single_region(constraints))
        }
        Err(e) => Err(e),
    }
}

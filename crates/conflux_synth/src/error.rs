//! Error type for external tool invocations.

use std::path::PathBuf;

/// Output fragment of the one synthesizer failure known to be flaky.
pub const TRANSIENT_SIGNATURE: &str = "Pre-synthesis failed.";

/// Marker of a real error in synthesizer output; its presence rules out the
/// transient case.
const HARD_ERROR_MARKER: &str = "\nERROR:";

/// Failures of the behavioral synthesizer or the placement solver.
#[derive(Debug, thiserror::Error)]
pub enum ExternalToolError {
    /// The tool could not be started.
    #[error("cannot run `{tool}` for `{task}`: {source}")]
    Launch {
        /// Command name.
        tool: String,
        /// Task or stage the run was for.
        task: String,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The tool ran and exited unsuccessfully.
    #[error("`{tool}` failed for `{task}` (exit status {})\n{output}", .status.map_or("unknown".to_string(), |s| s.to_string()))]
    Failed {
        /// Command name.
        tool: String,
        /// Task or stage the run was for.
        task: String,
        /// Exit code, if the process exited normally.
        status: Option<i32>,
        /// Captured stdout followed by stderr.
        output: String,
    },

    /// The tool succeeded but its output files are missing or unreadable.
    #[error("`{tool}` produced unusable output for `{task}` at {}: {reason}", .path.display())]
    BadOutput {
        /// Command name.
        tool: String,
        /// Task or stage the run was for.
        task: String,
        /// The offending file.
        path: PathBuf,
        /// What is wrong with it.
        reason: String,
    },

    /// A leaf task has no resource report to aggregate.
    #[error("no resource report for task `{task}`")]
    MissingReport {
        /// The leaf task.
        task: String,
    },

    /// The worker pool could not be created.
    #[error("cannot start synthesis workers: {reason}")]
    Pool {
        /// Builder message.
        reason: String,
    },
}

impl ExternalToolError {
    /// Whether this failure matches the recognized flaky signature and may
    /// be retried once.
    pub fn is_transient(&self) -> bool {
        match self {
            ExternalToolError::Failed { output, .. } => {
                output.contains(TRANSIENT_SIGNATURE) && !output.contains(HARD_ERROR_MARKER)
            }
            _ => false,
        }
    }

    /// Stable numeric code used by diagnostics (`E2xx`).
    pub fn code(&self) -> u16 {
        match self {
            ExternalToolError::Launch { .. } => 200,
            ExternalToolError::Failed { .. } => 201,
            ExternalToolError::BadOutput { .. } => 202,
            ExternalToolError::MissingReport { .. } => 203,
            ExternalToolError::Pool { .. } => 204,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn failed(output: &str) -> ExternalToolError {
        ExternalToolError::Failed {
            tool: "conflux-hls".to_string(),
            task: "Add".to_string(),
            status: Some(1),
            output: output.to_string(),
        }
    }

    #[test]
    fn transient_signature() {
        assert!(failed("INFO: start\nPre-synthesis failed.\n").is_transient());
        assert!(!failed("Pre-synthesis failed.\nERROR: [HLS 200-70] bad pragma").is_transient());
        assert!(!failed("ERROR: at line 3").is_transient());
        assert!(!ExternalToolError::MissingReport {
            task: "Add".to_string()
        }
        .is_transient());
    }

    #[test]
    fn failed_display_includes_output() {
        let msg = failed("some log").to_string();
        assert!(msg.contains("`conflux-hls` failed for `Add` (exit status 1)"));
        assert!(msg.contains("some log"));

        let killed = ExternalToolError::Failed {
            tool: "t".to_string(),
            task: "x".to_string(),
            status: None,
            output: String::new(),
        };
        assert!(killed.to_string().contains("exit status unknown"));
    }
}

//! The behavioral synthesizer collaborator.

use crate::area::Area;
use crate::error::ExternalToolError;
use crate::report::TaskReport;
use conflux_common::ClockPeriod;
use conflux_netlist::{Module, NetlistError, Port};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::{debug, warn};

/// One leaf task to synthesize.
#[derive(Clone, Debug)]
pub struct SynthJob {
    /// Task name, also the top function in `source`.
    pub task: String,
    /// Behavioral source.
    pub source: PathBuf,
    /// Target clock period.
    pub clock_period: ClockPeriod,
    /// Device part number, if any.
    pub part: Option<String>,
    /// Scratch directory owned by this job.
    pub out_dir: PathBuf,
}

/// Everything kept from one leaf synthesis run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LeafArtifact {
    /// Task name.
    pub name: String,
    /// Module interface in declaration order.
    pub ports: Vec<Port>,
    /// The synthesized netlist, verbatim.
    pub verilog: String,
    /// Timing and area.
    pub report: TaskReport,
}

impl LeafArtifact {
    /// The module interface consumed by assembly.
    pub fn interface(&self) -> Result<Module, NetlistError> {
        Module::with_ports(self.name.clone(), self.ports.clone())
    }
}

/// Turns one leaf's behavioral source into a netlist and a report.
///
/// Implementations must be pure functions of the job: the pool may run any
/// number of them concurrently and retry one.
pub trait Synthesizer: Sync {
    /// Tool name for diagnostics.
    fn name(&self) -> &str;

    /// Runs one job.
    fn synthesize(&self, job: &SynthJob) -> Result<LeafArtifact, ExternalToolError>;
}

/// `{task}.json` written by the external tool next to `{task}.v`.
#[derive(Debug, Deserialize)]
struct ToolOutput {
    ports: Vec<Port>,
    #[serde(default)]
    clock_period: Option<ClockPeriod>,
    #[serde(default)]
    area: Option<Area>,
}

/// Runs an external command per job.
///
/// The command is invoked as
/// `{command} {args..} --top T --source S --clock-period NS [--part P] --out-dir D`
/// and must leave `D/T.v` and `D/T.json` behind.
#[derive(Clone, Debug)]
pub struct ProcessSynthesizer {
    /// Executable.
    pub command: String,
    /// Leading arguments.
    pub args: Vec<String>,
    /// Record a zero area instead of failing when the tool reports none.
    pub best_effort: bool,
}

impl ProcessSynthesizer {
    fn bad_output(&self, job: &SynthJob, path: &Path, reason: impl ToString) -> ExternalToolError {
        ExternalToolError::BadOutput {
            tool: self.command.clone(),
            task: job.task.clone(),
            path: path.to_path_buf(),
            reason: reason.to_string(),
        }
    }

    fn read(&self, job: &SynthJob, path: &Path) -> Result<String, ExternalToolError> {
        std::fs::read_to_string(path).map_err(|e| self.bad_output(job, path, e))
    }
}

impl Synthesizer for ProcessSynthesizer {
    fn name(&self) -> &str {
        &self.command
    }

    fn synthesize(&self, job: &SynthJob) -> Result<LeafArtifact, ExternalToolError> {
        std::fs::create_dir_all(&job.out_dir).map_err(|e| ExternalToolError::Launch {
            tool: self.command.clone(),
            task: job.task.clone(),
            source: e,
        })?;

        let mut cmd = Command::new(&self.command);
        cmd.args(&self.args)
            .arg("--top")
            .arg(&job.task)
            .arg("--source")
            .arg(&job.source)
            .arg("--clock-period")
            .arg(job.clock_period.ns().to_string());
        if let Some(part) = &job.part {
            cmd.arg("--part").arg(part);
        }
        cmd.arg("--out-dir").arg(&job.out_dir);
        debug!(task = %job.task, command = ?cmd, "launching synthesizer");

        let output = cmd.output().map_err(|e| ExternalToolError::Launch {
            tool: self.command.clone(),
            task: job.task.clone(),
            source: e,
        })?;
        if !output.status.success() {
            let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
            text.push_str(&String::from_utf8_lossy(&output.stderr));
            return Err(ExternalToolError::Failed {
                tool: self.command.clone(),
                task: job.task.clone(),
                status: output.status.code(),
                output: text,
            });
        }

        let verilog = self.read(job, &job.out_dir.join(format!("{}.v", job.task)))?;
        let json_path = job.out_dir.join(format!("{}.json", job.task));
        let parsed: ToolOutput = serde_json::from_str(&self.read(job, &json_path)?)
            .map_err(|e| self.bad_output(job, &json_path, e))?;

        let area = match parsed.area {
            Some(area) => area,
            None if self.best_effort => {
                warn!(task = %job.task, "no area estimate; recording zero area");
                Area::ZERO
            }
            None => return Err(self.bad_output(job, &json_path, "no area estimate")),
        };
        Ok(LeafArtifact {
            name: job.task.clone(),
            ports: parsed.ports,
            verilog,
            report: TaskReport::leaf(
                job.task.clone(),
                parsed.clock_period.unwrap_or(job.clock_period),
                area,
            ),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const FAKE_TOOL: &str = r#"
while [ $# -gt 0 ]; do
  case "$1" in
    --top) top="$2"; shift 2;;
    --out-dir) out="$2"; shift 2;;
    *) shift;;
  esac
done
echo "module $top(); endmodule" > "$out/$top.v"
printf '{"ports":[{"name":"ap_clk","direction":"Input","width":1}],"clock_period":2.5%s}' "$AREA" > "$out/$top.json"
"#;

    fn tool(dir: &Path, body: &str) -> ProcessSynthesizer {
        let script = dir.join("tool.sh");
        let mut f = std::fs::File::create(&script).unwrap();
        f.write_all(body.as_bytes()).unwrap();
        ProcessSynthesizer {
            command: "sh".to_string(),
            args: vec![script.display().to_string()],
            best_effort: false,
        }
    }

    fn job(dir: &Path) -> SynthJob {
        SynthJob {
            task: "Add".to_string(),
            source: dir.join("add.cpp"),
            clock_period: ClockPeriod::from_ns(3.33),
            part: Some("xcu250-figd2104-2L-e".to_string()),
            out_dir: dir.join("out/Add"),
        }
    }

    #[test]
    fn reads_tool_outputs() {
        let dir = tempfile::tempdir().unwrap();
        let body = FAKE_TOOL.replace(
            "\"$AREA\"",
            "',\"area\":{\"bram\":0,\"dsp\":1,\"ff\":10,\"lut\":20,\"uram\":0}'",
        );
        let synth = tool(dir.path(), &body);
        let artifact = synth.synthesize(&job(dir.path())).unwrap();
        assert_eq!(artifact.name, "Add");
        assert!(artifact.verilog.contains("module Add"));
        assert_eq!(artifact.ports[0].name, "ap_clk");
        assert_eq!(artifact.report.area.total.lut, 20);
        assert_eq!(
            artifact.report.performance.clock_period,
            ClockPeriod::from_ns(2.5)
        );
        assert_eq!(artifact.interface().unwrap().ports.len(), 1);
    }

    #[test]
    fn missing_area_is_fatal_unless_best_effort() {
        let dir = tempfile::tempdir().unwrap();
        let body = FAKE_TOOL.replace("\"$AREA\"", "''");
        let mut synth = tool(dir.path(), &body);
        let err = synth.synthesize(&job(dir.path())).unwrap_err();
        assert!(matches!(err, ExternalToolError::BadOutput { .. }));

        synth.best_effort = true;
        let artifact = synth.synthesize(&job(dir.path())).unwrap();
        assert_eq!(artifact.report.area.total, Area::ZERO);
    }

    #[test]
    fn failure_carries_output() {
        let dir = tempfile::tempdir().unwrap();
        let synth = tool(dir.path(), "echo 'Pre-synthesis failed.'\nexit 1\n");
        let err = synth.synthesize(&job(dir.path())).unwrap_err();
        assert!(err.is_transient());
        match err {
            ExternalToolError::Failed { status, output, .. } => {
                assert_eq!(status, Some(1));
                assert!(output.contains("Pre-synthesis failed."));
            }
            other => panic!("expected failure, got {other:?}"),
        }
    }

    #[test]
    fn unknown_command_fails_to_launch() {
        let dir = tempfile::tempdir().unwrap();
        let synth = ProcessSynthesizer {
            command: "conflux-no-such-tool".to_string(),
            args: Vec::new(),
            best_effort: false,
        };
        let err = synth.synthesize(&job(dir.path())).unwrap_err();
        assert!(matches!(err, ExternalToolError::Launch { .. }));
    }
}

//! Configuration types deserialized from `conflux.toml`.

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize};

/// The top-level project configuration parsed from `conflux.toml`.
#[derive(Debug, Deserialize)]
pub struct ProjectConfig {
    /// Project metadata: name, top task, input graph and work directory.
    pub project: ProjectMeta,
    /// Target device and clock.
    #[serde(default)]
    pub device: DeviceConfig,
    /// Register level and pipelining policy.
    #[serde(default)]
    pub pipeline: PipelineConfig,
    /// External behavioral synthesizer settings.
    #[serde(default)]
    pub synth: SynthConfig,
    /// Region assignment sources and best-effort policy.
    #[serde(default)]
    pub floorplan: FloorplanConfig,
}

/// Core project metadata required in every `conflux.toml`.
#[derive(Debug, Deserialize)]
pub struct ProjectMeta {
    /// The project name, used for the packed archive.
    pub name: String,
    /// Name of the top task in the task graph.
    pub top: String,
    /// Path of the serialized task graph, relative to the project directory.
    #[serde(default = "default_graph")]
    pub graph: String,
    /// Directory that holds every persisted stage output.
    #[serde(default = "default_work_dir")]
    pub work_dir: String,
}

fn default_graph() -> String {
    "graph.json".to_string()
}

fn default_work_dir() -> String {
    "work".to_string()
}

/// Target device settings.
#[derive(Debug, Default, Deserialize)]
pub struct DeviceConfig {
    /// Full part number (e.g. "xcu250-figd2104-2L-e").
    pub part: Option<String>,
    /// Target clock as a period ("3.33ns") or frequency ("300MHz").
    pub clock_period: Option<String>,
}

/// How region-crossing signals are pipelined.
#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PipelineStrategy {
    /// No floorplanning; every interconnect gets a single FIFO (default).
    #[default]
    None,
    /// Floorplan across regions and pipeline every crossing.
    Floorplan,
}

/// Register level and pipelining policy.
#[derive(Debug, Deserialize)]
pub struct PipelineConfig {
    /// Fixed control latency L of every upper task.
    #[serde(default = "default_register_level")]
    pub register_level: u32,
    /// Floorplan-driven pipelining strategy.
    #[serde(default)]
    pub strategy: PipelineStrategy,
    /// Also pipeline interconnects whose endpoints share a region.
    #[serde(default)]
    pub additional_pipelining: bool,
}

/// The register level used when neither the file nor the command line sets one.
pub const DEFAULT_REGISTER_LEVEL: u32 = 3;

fn default_register_level() -> u32 {
    DEFAULT_REGISTER_LEVEL
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            register_level: DEFAULT_REGISTER_LEVEL,
            strategy: PipelineStrategy::None,
            additional_pipelining: false,
        }
    }
}

/// External behavioral synthesizer settings.
#[derive(Debug, Deserialize)]
pub struct SynthConfig {
    /// Executable invoked once per leaf task.
    #[serde(default = "default_synth_command")]
    pub command: String,
    /// Extra arguments placed before the per-task arguments.
    ///
    /// Accepts either a single string or a list of strings.
    #[serde(default, deserialize_with = "deserialize_string_or_vec")]
    pub args: Vec<String>,
    /// Worker count; 0 means one per available CPU.
    #[serde(default)]
    pub jobs: usize,
    /// Record a zero area instead of failing when a resource estimate is unavailable.
    #[serde(default)]
    pub best_effort: bool,
}

fn default_synth_command() -> String {
    "conflux-hls".to_string()
}

impl Default for SynthConfig {
    fn default() -> Self {
        Self {
            command: default_synth_command(),
            args: Vec::new(),
            jobs: 0,
            best_effort: false,
        }
    }
}

/// Region assignment sources.
#[derive(Debug, Default, Deserialize)]
pub struct FloorplanConfig {
    /// Known region labels of the device, if the user wants them checked.
    #[serde(default)]
    pub regions: Vec<String>,
    /// Hand-authored assignment override file.
    pub assignment: Option<String>,
    /// External placement solver executable.
    pub solver: Option<String>,
    /// Extra solver arguments.
    #[serde(default, deserialize_with = "deserialize_string_or_vec")]
    pub solver_args: Vec<String>,
    /// Place everything in one region instead of failing when the solver fails.
    #[serde(default)]
    pub best_effort: bool,
    /// Top-level interconnects whose endpoints must share a region and
    /// which are never split.
    #[serde(default)]
    pub nonpipeline_fifos: Vec<String>,
}

/// Deserializes a field that can be either a single string or a list of strings.
fn deserialize_string_or_vec<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    struct StringOrVec;

    impl<'de> Visitor<'de> for StringOrVec {
        type Value = Vec<String>;

        fn expecting(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            formatter.write_str("a string or a list of strings")
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
            Ok(vec![v.to_string()])
        }

        fn visit_seq<A: de::SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
            let mut vec = Vec::new();
            while let Some(val) = seq.next_element::<String>()? {
                vec.push(val);
            }
            Ok(vec)
        }
    }

    deserializer.deserialize_any(StringOrVec)
}

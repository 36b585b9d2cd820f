//! Configuration file loading and validation.

use crate::error::ConfigError;
use crate::types::{PipelineStrategy, ProjectConfig};
use conflux_common::ClockPeriod;
use std::path::Path;

/// File name of the project configuration inside a project directory.
pub const CONFIG_FILE: &str = "conflux.toml";

/// Loads and validates `conflux.toml` from a project directory.
pub fn load_config(project_dir: &Path) -> Result<ProjectConfig, ConfigError> {
    let content = std::fs::read_to_string(project_dir.join(CONFIG_FILE))?;
    load_config_from_str(&content)
}

/// Parses and validates a `conflux.toml` configuration from a string.
pub fn load_config_from_str(content: &str) -> Result<ProjectConfig, ConfigError> {
    let config: ProjectConfig =
        toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
    validate_config(&config)?;
    Ok(config)
}

/// Rejects missing fields and contradictory settings.
pub(crate) fn validate_config(config: &ProjectConfig) -> Result<(), ConfigError> {
    if config.project.name.is_empty() {
        return Err(ConfigError::MissingField("project.name".to_string()));
    }
    if config.project.top.is_empty() {
        return Err(ConfigError::MissingField("project.top".to_string()));
    }
    if config.synth.command.trim().is_empty() {
        return Err(ConfigError::MissingField("synth.command".to_string()));
    }
    if let Some(period) = &config.device.clock_period {
        period
            .parse::<ClockPeriod>()
            .map_err(|e| ConfigError::ValidationError(e.to_string()))?;
    }
    validate_pipeline(
        config.pipeline.register_level,
        config.pipeline.strategy,
        config.pipeline.additional_pipelining,
    )?;

    if config.pipeline.strategy == PipelineStrategy::Floorplan {
        if config.device.part.is_none() {
            return Err(ConfigError::ValidationError(
                "pipeline.strategy = \"floorplan\" requires device.part".to_string(),
            ));
        }
        if config.floorplan.assignment.is_none() && config.floorplan.solver.is_none() {
            return Err(ConfigError::ValidationError(
                "pipeline.strategy = \"floorplan\" requires floorplan.assignment or floorplan.solver"
                    .to_string(),
            ));
        }
    }
    Ok(())
}

pub(crate) fn validate_pipeline(
    register_level: u32,
    strategy: PipelineStrategy,
    additional_pipelining: bool,
) -> Result<(), ConfigError> {
    if register_level == 0 {
        return Err(ConfigError::ValidationError(
            "pipeline.register_level must be at least 1".to_string(),
        ));
    }
    if additional_pipelining && strategy == PipelineStrategy::None {
        return Err(ConfigError::ValidationError(
            "pipeline.additional_pipelining has no effect without pipeline.strategy = \"floorplan\""
                .to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_minimal_config() {
        let toml = r#"
[project]
name = "vadd"
top = "VecAdd"
"#;
        let config = load_config_from_str(toml).unwrap();
        assert_eq!(config.project.name, "vadd");
        assert_eq!(config.project.top, "VecAdd");
        assert_eq!(config.project.graph, "graph.json");
        assert_eq!(config.project.work_dir, "work");
        assert_eq!(config.pipeline.register_level, 3);
    }

    #[test]
    fn parse_full_config() {
        let toml = r#"
[project]
name = "vadd"
top = "VecAdd"
graph = "build/graph.json"
work_dir = "build/work"

[device]
part = "xcu250-figd2104-2L-e"
clock_period = "300MHz"

[pipeline]
register_level = 4
strategy = "floorplan"
additional_pipelining = true

[synth]
command = "vitis-hls-wrapper"
args = ["--flow", "impl"]
jobs = 8
best_effort = true

[floorplan]
regions = ["SLOT_X0Y0", "SLOT_X0Y1"]
solver = "autobridge"
solver_args = "--max-usage=0.7"
best_effort = true
nonpipeline_fifos = ["a_q"]
"#;
        let config = load_config_from_str(toml).unwrap();
        assert_eq!(config.device.part.as_deref(), Some("xcu250-figd2104-2L-e"));
        assert_eq!(config.pipeline.strategy, PipelineStrategy::Floorplan);
        assert_eq!(config.synth.jobs, 8);
        assert_eq!(config.floorplan.regions.len(), 2);
        assert_eq!(config.floorplan.solver_args, vec!["--max-usage=0.7"]);
        assert_eq!(config.floorplan.nonpipeline_fifos, vec!["a_q"]);
    }

    #[test]
    fn missing_top_errors() {
        let toml = r#"
[project]
name = "vadd"
top = ""
"#;
        let err = load_config_from_str(toml).unwrap_err();
        assert!(matches!(err, ConfigError::MissingField(f) if f == "project.top"));
    }

    #[test]
    fn zero_register_level_rejected() {
        let toml = r#"
[project]
name = "vadd"
top = "VecAdd"

[pipeline]
register_level = 0
"#;
        let err = load_config_from_str(toml).unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }

    #[test]
    fn floorplan_without_device_rejected() {
        let toml = r#"
[project]
name = "vadd"
top = "VecAdd"

[pipeline]
strategy = "floorplan"

[floorplan]
assignment = "floorplan.json"
"#;
        let err = load_config_from_str(toml).unwrap_err();
        assert!(err.to_string().contains("device.part"));
    }

    #[test]
    fn floorplan_without_source_rejected() {
        let toml = r#"
[project]
name = "vadd"
top = "VecAdd"

[device]
part = "xcu250"

[pipeline]
strategy = "floorplan"
"#;
        let err = load_config_from_str(toml).unwrap_err();
        assert!(err.to_string().contains("floorplan.solver"));
    }

    #[test]
    fn additional_pipelining_needs_floorplan() {
        let toml = r#"
[project]
name = "vadd"
top = "VecAdd"

[pipeline]
additional_pipelining = true
"#;
        let err = load_config_from_str(toml).unwrap_err();
        assert!(err.to_string().contains("additional_pipelining"));
    }

    #[test]
    fn bad_clock_rejected() {
        let toml = r#"
[project]
name = "vadd"
top = "VecAdd"

[device]
clock_period = "soon"
"#;
        let err = load_config_from_str(toml).unwrap_err();
        assert!(err.to_string().contains("soon"));
    }

    #[test]
    fn invalid_toml_errors() {
        let err = load_config_from_str("this is not valid toml {{{}}}").unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(_)));
    }

    #[test]
    fn load_from_directory() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(CONFIG_FILE),
            "[project]\nname = \"p\"\ntop = \"T\"\n",
        )
        .unwrap();
        let config = load_config(dir.path()).unwrap();
        assert_eq!(config.project.top, "T");
    }

    #[test]
    fn load_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_config(dir.path()).unwrap_err();
        assert!(matches!(err, ConfigError::IoError(_)));
    }
}

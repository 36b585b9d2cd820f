//! Error types for configuration loading and validation.

/// Errors that can occur when loading or validating a `conflux.toml` configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// An I/O error occurred while reading the configuration file.
    #[error("failed to read configuration: {0}")]
    IoError(#[from] std::io::Error),

    /// The TOML content could not be parsed.
    #[error("failed to parse configuration: {0}")]
    ParseError(String),

    /// A required field is missing from the configuration.
    #[error("missing required field: {0}")]
    MissingField(String),

    /// The settings are individually well-formed but contradict each other,
    /// e.g. floorplanning requested without a target device.
    #[error("inconsistent configuration: {0}")]
    ValidationError(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_missing_field() {
        let err = ConfigError::MissingField("project.top".to_string());
        assert_eq!(err.to_string(), "missing required field: project.top");
    }

    #[test]
    fn display_validation_error() {
        let err = ConfigError::ValidationError("register_level must be at least 1".to_string());
        assert_eq!(
            err.to_string(),
            "inconsistent configuration: register_level must be at least 1"
        );
    }

    #[test]
    fn display_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "conflux.toml not found");
        let err: ConfigError = io_err.into();
        assert!(err.to_string().starts_with("failed to read configuration"));
    }
}

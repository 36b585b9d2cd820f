//! Error types for persisted stage outputs and the artifact cache.

use std::path::PathBuf;

/// Errors reading or writing the work directory.
///
/// Artifact reads never produce these: a damaged artifact is a cache miss.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    /// An I/O error at a specific path.
    #[error("I/O error at {}: {source}", .path.display())]
    Io {
        /// The path that caused the error.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// A stage output is missing; the stage producing it has not run.
    #[error("{} not found; run `{stage}` first", .path.display())]
    MissingStage {
        /// The expected file.
        path: PathBuf,
        /// The stage that writes it.
        stage: String,
    },

    /// A persisted file could not be decoded.
    #[error("cannot decode {}: {reason}", .path.display())]
    Decode {
        /// The file.
        path: PathBuf,
        /// Decoder message.
        reason: String,
    },

    /// A value could not be encoded.
    #[error("serialization error: {reason}")]
    Serialization {
        /// Encoder message.
        reason: String,
    },
}

impl CacheError {
    /// Stable diagnostic number in the 4xx range.
    pub fn code(&self) -> u16 {
        match self {
            CacheError::Io { .. } => 400,
            CacheError::MissingStage { .. } => 401,
            CacheError::Decode { .. } => 402,
            CacheError::Serialization { .. } => 403,
        }
    }

    pub(crate) fn io(path: impl Into<PathBuf>) -> impl FnOnce(std::io::Error) -> CacheError {
        let path = path.into();
        move |source| CacheError::Io { path, source }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_stage_names_stage() {
        let err = CacheError::MissingStage {
            path: PathBuf::from("work/graph.json"),
            stage: "analyze".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("work/graph.json"));
        assert!(msg.contains("run `analyze` first"));
        assert_eq!(err.code(), 401);
    }

    #[test]
    fn io_error_display() {
        let err = CacheError::Io {
            path: PathBuf::from("work/hdl/Top.v"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        assert!(err.to_string().contains("work/hdl/Top.v"));
    }
}

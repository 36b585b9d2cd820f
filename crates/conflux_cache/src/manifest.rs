//! `manifest.json`: which artifact each leaf task last resolved to.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::CacheError;

const MANIFEST_FILE: &str = "manifest.json";

/// Cache index persisted next to the artifacts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheManifest {
    /// Version of the tool that wrote the cache; any other version starts fresh.
    pub tool_version: String,
    /// Per-leaf entries keyed by task name.
    pub tasks: BTreeMap<String, TaskEntry>,
}

/// The artifact a leaf task resolved to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskEntry {
    /// Behavioral source at the time of synthesis.
    pub source: PathBuf,
    /// Artifact key: hash of source bytes, clock period and part.
    pub key: String,
}

impl CacheManifest {
    /// An empty manifest.
    pub fn new(tool_version: &str) -> Self {
        Self {
            tool_version: tool_version.to_string(),
            tasks: BTreeMap::new(),
        }
    }

    /// Loads the manifest; `None` when missing or unreadable.
    pub fn load(dir: &Path) -> Option<Self> {
        let content = std::fs::read_to_string(dir.join(MANIFEST_FILE)).ok()?;
        serde_json::from_str(&content).ok()
    }

    /// Writes the manifest, creating `dir` as needed.
    pub fn save(&self, dir: &Path) -> Result<(), CacheError> {
        std::fs::create_dir_all(dir).map_err(CacheError::io(dir))?;
        let path = dir.join(MANIFEST_FILE);
        let json = serde_json::to_string_pretty(self).map_err(|e| CacheError::Serialization {
            reason: e.to_string(),
        })?;
        std::fs::write(&path, json).map_err(CacheError::io(&path))
    }

    /// Whether the manifest was written by `current`.
    pub fn is_compatible(&self, current: &str) -> bool {
        self.tool_version == current
    }
}

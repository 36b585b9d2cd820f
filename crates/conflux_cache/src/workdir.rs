//! Layout of the work directory shared by all stages.
//!
//! ```text
//! work/
//!   graph.json          analyze
//!   settings.json       synth
//!   report/{task}.json  synth
//!   synth/{task}/       synthesizer scratch
//!   cache/              synthesized artifacts
//!   floorplan.json      floorplan
//!   constraints.tcl     floorplan
//!   hdl/{task}.v        link
//! ```

use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::CacheError;

/// Stage names used in "run this first" errors.
pub mod stage {
    /// Writes `graph.json`.
    pub const ANALYZE: &str = "analyze";
    /// Writes reports and the settings snapshot.
    pub const SYNTH: &str = "synth";
    /// Writes the floorplan.
    pub const FLOORPLAN: &str = "floorplan";
    /// Writes the assembled netlists.
    pub const LINK: &str = "link";
}

/// A work directory root.
#[derive(Debug, Clone)]
pub struct WorkDir {
    root: PathBuf,
}

impl WorkDir {
    /// Wraps `root`; nothing is created until written.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The root itself.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Canonical task graph.
    pub fn graph(&self) -> PathBuf {
        self.root.join("graph.json")
    }

    /// Settings snapshot of the last synthesis.
    pub fn settings(&self) -> PathBuf {
        self.root.join("settings.json")
    }

    /// Report directory.
    pub fn report_dir(&self) -> PathBuf {
        self.root.join("report")
    }

    /// Report of one task.
    pub fn report(&self, task: &str) -> PathBuf {
        self.report_dir().join(format!("{task}.json"))
    }

    /// Synthesizer scratch directory of one leaf.
    pub fn synth_scratch(&self, task: &str) -> PathBuf {
        self.root.join("synth").join(task)
    }

    /// Artifact cache.
    pub fn cache(&self) -> PathBuf {
        self.root.join("cache")
    }

    /// Floorplan of the top task.
    pub fn floorplan(&self) -> PathBuf {
        self.root.join("floorplan.json")
    }

    /// Region-constraint script.
    pub fn constraints(&self) -> PathBuf {
        self.root.join("constraints.tcl")
    }

    /// Netlist directory.
    pub fn hdl_dir(&self) -> PathBuf {
        self.root.join("hdl")
    }

    /// Netlist of one task.
    pub fn hdl(&self, task: &str) -> PathBuf {
        self.hdl_dir().join(format!("{task}.v"))
    }
}

/// Writes `text` to `path`, creating parent directories.
pub fn write_text(path: &Path, text: &str) -> Result<(), CacheError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(CacheError::io(parent))?;
    }
    std::fs::write(path, text).map_err(CacheError::io(path))
}

/// Reads a file written by `stage`.
pub fn read_text(path: &Path, stage: &str) -> Result<String, CacheError> {
    if !path.exists() {
        return Err(CacheError::MissingStage {
            path: path.to_path_buf(),
            stage: stage.to_string(),
        });
    }
    std::fs::read_to_string(path).map_err(CacheError::io(path))
}

/// Writes `value` as pretty JSON.
pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), CacheError> {
    let text = serde_json::to_string_pretty(value).map_err(|e| CacheError::Serialization {
        reason: e.to_string(),
    })?;
    write_text(path, &text)
}

/// Reads JSON written by `stage`.
pub fn read_json<T: DeserializeOwned>(path: &Path, stage: &str) -> Result<T, CacheError> {
    let text = read_text(path, stage)?;
    serde_json::from_str(&text).map_err(|e| CacheError::Decode {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}

/// Files in `dir` with extension `ext`, sorted by name. A missing directory
/// has none.
pub fn list_files(dir: &Path, ext: &str) -> Result<Vec<PathBuf>, CacheError> {
    if !dir.exists() {
        return Ok(Vec::new());
    }
    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(CacheError::io(dir))? {
        let path = entry.map_err(CacheError::io(dir))?.path();
        if path.is_file() && path.extension().and_then(|e| e.to_str()) == Some(ext) {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

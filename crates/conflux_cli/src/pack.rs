//! `conflux pack`: bundle netlists, reports and constraints into one
//! gzip-compressed archive.

use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use conflux_cache::{list_files, stage, CacheError, WorkDir};
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use serde::{Deserialize, Serialize};

use crate::pipeline::{load_project, status, StageResult};
use crate::{GlobalArgs, PackArgs};

/// Archive format version.
const ARCHIVE_SCHEMA: &str = "v1";

/// Contents of a `.cfx` archive before compression.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Archive {
    /// Always [`ARCHIVE_SCHEMA`].
    pub schema: String,
    /// Project name.
    pub name: String,
    /// Files in path order.
    pub entries: Vec<Entry>,
}

/// One archived file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    /// Path relative to the work directory, `/`-separated.
    pub path: String,
    /// UTF-8 contents.
    pub contents: String,
}

/// Runs the `conflux pack` command.
pub fn run(args: &PackArgs, global: &GlobalArgs) -> StageResult<i32> {
    let project = load_project(global)?;
    let output = args
        .output
        .clone()
        .unwrap_or_else(|| default_output(&project.work, &project.settings.name));
    status(global, "Packing", output.display());
    pack(&project.work, &project.settings.name, &output)?;
    Ok(0)
}

/// `{work_dir}/{name}.cfx`.
pub fn default_output(work: &WorkDir, name: &str) -> PathBuf {
    work.root().join(format!("{name}.cfx"))
}

/// Collects `hdl/*.v`, `report/*.json` and `constraints.tcl` (if present).
pub fn collect(work: &WorkDir, name: &str) -> StageResult<Archive> {
    let hdl = list_files(&work.hdl_dir(), "v")?;
    if hdl.is_empty() {
        return Err(CacheError::MissingStage {
            path: work.hdl_dir(),
            stage: stage::LINK.to_string(),
        }
        .into());
    }
    let mut files = hdl;
    files.extend(list_files(&work.report_dir(), "json")?);
    if work.constraints().is_file() {
        files.push(work.constraints());
    }

    let mut entries = Vec::with_capacity(files.len());
    for file in files {
        let contents = std::fs::read_to_string(&file).map_err(|e| CacheError::Io {
            path: file.clone(),
            source: e,
        })?;
        entries.push(Entry {
            path: relative(work.root(), &file),
            contents,
        });
    }
    entries.sort_by(|a, b| a.path.cmp(&b.path));
    Ok(Archive {
        schema: ARCHIVE_SCHEMA.to_string(),
        name: name.to_string(),
        entries,
    })
}

fn relative(root: &Path, file: &Path) -> String {
    let rel = file.strip_prefix(root).unwrap_or(file);
    rel.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

/// Writes the archive of `work` to `output`.
pub fn pack(work: &WorkDir, name: &str, output: &Path) -> StageResult<Archive> {
    let archive = collect(work, name)?;
    let json = serde_json::to_vec(&archive)?;
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(&json)?;
    let bytes = encoder.finish()?;
    if let Some(parent) = output.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(output, bytes).map_err(|e| CacheError::Io {
        path: output.to_path_buf(),
        source: e,
    })?;
    Ok(archive)
}

/// Reads an archive written by [`pack`].
pub fn unpack(path: &Path) -> StageResult<Archive> {
    let compressed = std::fs::read(path)?;
    let mut decoder = GzDecoder::new(&compressed[..]);
    let mut json = String::new();
    decoder.read_to_string(&mut json)?;
    Ok(serde_json::from_str(&json)?)
}

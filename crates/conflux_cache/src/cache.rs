//! Cache of synthesized leaf artifacts.

use std::path::{Path, PathBuf};

use conflux_common::ContentHash;
use conflux_synth::{LeafArtifact, SynthJob};
use tracing::debug;

use crate::artifact::ArtifactStore;
use crate::error::CacheError;
use crate::manifest::{CacheManifest, TaskEntry};

const ARTIFACT_SUBDIR: &str = "synth";
const ARTIFACT_EXT: &str = "bin";

/// Synthesized leaves keyed by everything that determines their output.
///
/// Reads are fail-safe: a damaged or incompatible cache is a miss.
pub struct SynthCache {
    dir: PathBuf,
    manifest: CacheManifest,
    store: ArtifactStore,
    tool_version: String,
}

impl SynthCache {
    /// Opens the cache in `dir`, starting fresh if it was written by another
    /// tool version.
    pub fn load_or_create(dir: &Path, tool_version: &str) -> Self {
        let manifest = CacheManifest::load(dir)
            .filter(|m| m.is_compatible(tool_version))
            .unwrap_or_else(|| CacheManifest::new(tool_version));
        Self {
            dir: dir.to_path_buf(),
            manifest,
            store: ArtifactStore::new(&dir.join(ARTIFACT_SUBDIR)),
            tool_version: tool_version.to_string(),
        }
    }

    /// The key for `job`: hash of the source bytes, clock period and part.
    pub fn job_key(job: &SynthJob) -> Result<ContentHash, CacheError> {
        let source = std::fs::read(&job.source).map_err(CacheError::io(&job.source))?;
        let clock = job.clock_period.ns().to_string();
        let part = job.part.as_deref().unwrap_or("");
        Ok(ContentHash::from_parts([
            source.as_slice(),
            clock.as_bytes(),
            part.as_bytes(),
        ]))
    }

    /// The cached artifact for `key`, if present and intact.
    pub fn lookup(&self, key: &ContentHash) -> Option<LeafArtifact> {
        self.decode(&key.to_string())
    }

    /// The artifact `task` last resolved to.
    pub fn cached(&self, task: &str) -> Option<LeafArtifact> {
        self.decode(&self.entry(task)?.key)
    }

    fn decode(&self, key: &str) -> Option<LeafArtifact> {
        let bytes = self.store.read_artifact(key, ARTIFACT_EXT, &self.tool_version)?;
        let (artifact, _) =
            bincode::serde::decode_from_slice(&bytes, bincode::config::standard()).ok()?;
        Some(artifact)
    }

    /// Stores `artifact` for `job` under `key` and records it in the manifest.
    pub fn insert(
        &mut self,
        job: &SynthJob,
        key: &ContentHash,
        artifact: &LeafArtifact,
    ) -> Result<(), CacheError> {
        let bytes = bincode::serde::encode_to_vec(artifact, bincode::config::standard())
            .map_err(|e| CacheError::Serialization {
                reason: e.to_string(),
            })?;
        let key = self
            .store
            .write_artifact(key, ARTIFACT_EXT, &bytes, &self.tool_version)?;
        debug!(task = %job.task, %key, "cached artifact");
        self.manifest.tasks.insert(
            job.task.clone(),
            TaskEntry {
                source: job.source.clone(),
                key,
            },
        );
        Ok(())
    }

    /// Persists the manifest and drops artifacts no task refers to.
    pub fn save(&self) -> Result<usize, CacheError> {
        self.manifest.save(&self.dir)?;
        let live: Vec<&str> = self
            .manifest
            .tasks
            .values()
            .map(|e| e.key.as_str())
            .collect();
        self.store.gc(ARTIFACT_EXT, &live)
    }

    /// The manifest entry of `task`.
    pub fn entry(&self, task: &str) -> Option<&TaskEntry> {
        self.manifest.tasks.get(task)
    }
}

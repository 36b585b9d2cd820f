//! Content-addressed binary artifact storage.
//!
//! Each artifact is a file `<dir>/<key>.<ext>` holding a length-prefixed
//! bincode header (magic, format version, producer version, checksum)
//! followed by the payload.

use std::path::{Path, PathBuf};

use conflux_common::ContentHash;
use serde::{Deserialize, Serialize};

use crate::error::CacheError;

const ARTIFACT_MAGIC: [u8; 4] = *b"CFLX";

/// Bumped on any change to the header or payload encoding.
const ARTIFACT_FORMAT_VERSION: u32 = 1;

/// Header prepended to every stored artifact.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactHeader {
    /// Must be `b"CFLX"`.
    pub magic: [u8; 4],
    /// Encoding version.
    pub format_version: u32,
    /// Version of the tool that wrote the artifact.
    pub tool_version: String,
    /// Hash of the payload.
    pub checksum: ContentHash,
}

/// Reads and writes artifacts under one directory.
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    dir: PathBuf,
}

impl ArtifactStore {
    /// A store rooted at `dir`; nothing is created until the first write.
    pub fn new(dir: &Path) -> Self {
        Self {
            dir: dir.to_path_buf(),
        }
    }

    /// Where the artifact with `key` lives.
    pub fn artifact_path(&self, key: &str, ext: &str) -> PathBuf {
        self.dir.join(format!("{key}.{ext}"))
    }

    /// Stores `data` under `key`, returning the key as text.
    pub fn write_artifact(
        &self,
        key: &ContentHash,
        ext: &str,
        data: &[u8],
        tool_version: &str,
    ) -> Result<String, CacheError> {
        std::fs::create_dir_all(&self.dir).map_err(CacheError::io(&self.dir))?;

        let key = key.to_string();
        let path = self.artifact_path(&key, ext);
        let header = ArtifactHeader {
            magic: ARTIFACT_MAGIC,
            format_version: ARTIFACT_FORMAT_VERSION,
            tool_version: tool_version.to_string(),
            checksum: ContentHash::from_bytes(data),
        };
        let header_bytes = bincode::serde::encode_to_vec(&header, bincode::config::standard())
            .map_err(|e| CacheError::Serialization {
                reason: e.to_string(),
            })?;

        let header_len = header_bytes.len() as u32;
        let mut output = Vec::with_capacity(4 + header_bytes.len() + data.len());
        output.extend_from_slice(&header_len.to_le_bytes());
        output.extend_from_slice(&header_bytes);
        output.extend_from_slice(data);

        std::fs::write(&path, &output).map_err(CacheError::io(&path))?;
        Ok(key)
    }

    /// Loads the payload stored under `key` by `tool_version`.
    ///
    /// Any defect (missing file, bad magic, other format or tool version,
    /// checksum mismatch) is reported as `None` so the caller rebuilds.
    pub fn read_artifact(&self, key: &str, ext: &str, tool_version: &str) -> Option<Vec<u8>> {
        let raw = std::fs::read(self.artifact_path(key, ext)).ok()?;
        if raw.len() < 4 {
            return None;
        }
        let header_len = u32::from_le_bytes(raw[..4].try_into().ok()?) as usize;
        if raw.len() < 4 + header_len {
            return None;
        }
        let (header, _): (ArtifactHeader, _) =
            bincode::serde::decode_from_slice(&raw[4..4 + header_len], bincode::config::standard())
                .ok()?;
        if header.magic != ARTIFACT_MAGIC
            || header.format_version != ARTIFACT_FORMAT_VERSION
            || header.tool_version != tool_version
        {
            return None;
        }
        let payload = &raw[4 + header_len..];
        if ContentHash::from_bytes(payload) != header.checksum {
            return None;
        }
        Some(payload.to_vec())
    }

    /// Deletes `*.ext` files whose key is not in `live`; returns how many.
    pub fn gc(&self, ext: &str, live: &[&str]) -> Result<usize, CacheError> {
        if !self.dir.exists() {
            return Ok(0);
        }
        let mut removed = 0;
        for entry in std::fs::read_dir(&self.dir).map_err(CacheError::io(&self.dir))? {
            let path = entry.map_err(CacheError::io(&self.dir))?.path();
            if path.extension().and_then(|e| e.to_str()) != Some(ext) {
                continue;
            }
            let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            if !live.contains(&stem) {
                std::fs::remove_file(&path).map_err(CacheError::io(&path))?;
                removed += 1;
            }
        }
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> (tempfile::TempDir, ArtifactStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = ArtifactStore::new(&dir.path().join("synth"));
        (dir, store)
    }

    fn forge(header: &ArtifactHeader, payload: &[u8]) -> Vec<u8> {
        let bytes = bincode::serde::encode_to_vec(header, bincode::config::standard()).unwrap();
        let mut out = (bytes.len() as u32).to_le_bytes().to_vec();
        out.extend_from_slice(&bytes);
        out.extend_from_slice(payload);
        out
    }

    #[test]
    fn stored_payload_reads_back() {
        let (_dir, store) = store();
        let key = ContentHash::from_bytes(b"Add.cpp");
        let k = store.write_artifact(&key, "bin", b"netlist", "0.1.0").unwrap();
        assert_eq!(k, key.to_string());
        assert_eq!(store.read_artifact(&k, "bin", "0.1.0").unwrap(), b"netlist");
        assert!(store.read_artifact("absent", "bin", "0.1.0").is_none());
    }

    #[test]
    fn damaged_artifacts_are_misses() {
        let (_dir, store) = store();
        let key = ContentHash::from_bytes(b"k");
        let k = store.write_artifact(&key, "bin", b"x", "0.1.0").unwrap();
        let path = store.artifact_path(&k, "bin");

        std::fs::write(&path, b"AB").unwrap();
        assert!(store.read_artifact(&k, "bin", "0.1.0").is_none());

        let mut header = ArtifactHeader {
            magic: ARTIFACT_MAGIC,
            format_version: ARTIFACT_FORMAT_VERSION,
            tool_version: "0.1.0".to_string(),
            checksum: ContentHash::from_bytes(b"data"),
        };
        std::fs::write(&path, forge(&header, b"tampered")).unwrap();
        assert!(store.read_artifact(&k, "bin", "0.1.0").is_none());

        header.format_version = 999;
        std::fs::write(&path, forge(&header, b"data")).unwrap();
        assert!(store.read_artifact(&k, "bin", "0.1.0").is_none());

        header.format_version = ARTIFACT_FORMAT_VERSION;
        header.magic = *b"BAAD";
        std::fs::write(&path, forge(&header, b"data")).unwrap();
        assert!(store.read_artifact(&k, "bin", "0.1.0").is_none());
    }

    #[test]
    fn other_tool_version_is_a_miss() {
        let (_dir, store) = store();
        let key = ContentHash::from_bytes(b"Add.cpp");
        let k = store.write_artifact(&key, "bin", b"netlist", "0.1.0").unwrap();
        assert!(store.read_artifact(&k, "bin", "0.2.0").is_none());
        assert_eq!(store.read_artifact(&k, "bin", "0.1.0").unwrap(), b"netlist");
    }

    #[test]
    fn gc_keeps_live_keys() {
        let (_dir, store) = store();
        let a = store
            .write_artifact(&ContentHash::from_bytes(b"a"), "bin", b"A", "0.1.0")
            .unwrap();
        store
            .write_artifact(&ContentHash::from_bytes(b"b"), "bin", b"B", "0.1.0")
            .unwrap();
        assert_eq!(store.gc("bin", &[a.as_str()]).unwrap(), 1);
        assert!(store.read_artifact(&a, "bin", "0.1.0").is_some());
        assert_eq!(ArtifactStore::new(Path::new("/nonexistent")).gc("bin", &[]).unwrap(), 0);
    }
}

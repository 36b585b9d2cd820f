//! Persisted stage outputs and the synthesized-artifact cache.
//!
//! Every stage writes its results into a [`WorkDir`] so later stages can be
//! rerun alone. Synthesized leaves are additionally kept in a
//! content-addressed [`SynthCache`], so unchanged leaves skip the external
//! synthesizer.

#![warn(missing_docs)]

pub mod artifact;
pub mod cache;
pub mod error;
pub mod manifest;
pub mod workdir;

pub use artifact::{ArtifactHeader, ArtifactStore};
pub use cache::SynthCache;
pub use error::CacheError;
pub use manifest::{CacheManifest, TaskEntry};
pub use workdir::{list_files, read_json, read_text, stage, write_json, write_text, WorkDir};

//! Parsing and validation of `conflux.toml` project configuration files.
//!
//! This crate reads the project configuration file into a strongly-typed
//! [`ProjectConfig`], rejects inconsistent combinations before any synthesis
//! starts, and merges command-line overrides into [`ResolvedSettings`].

#![warn(missing_docs)]

pub mod error;
pub mod loader;
pub mod resolve;
pub mod types;

pub use error::ConfigError;
pub use loader::{load_config, load_config_from_str, CONFIG_FILE};
pub use resolve::{resolve_settings, FloorplanSettings, Overrides, ResolvedSettings, SynthSettings};
pub use types::*;

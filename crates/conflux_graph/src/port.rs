//! Task boundary ports and argument categories.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The category of a port, and of every arg bound to it.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArgCategory {
    /// A value sampled once at start.
    Scalar,
    /// A FIFO read side.
    Istream,
    /// A FIFO write side.
    Ostream,
    /// A memory-mapped master with synchronous access.
    Mmap,
    /// A memory-mapped master exposed as address/data streams.
    AsyncMmap,
    /// A banked memory: `chan_count` independent `mmap` channels.
    Hmap,
}

impl ArgCategory {
    /// Returns `true` for the two FIFO categories.
    pub fn is_stream(self) -> bool {
        matches!(self, ArgCategory::Istream | ArgCategory::Ostream)
    }

    /// Returns `true` for every memory-mapped category.
    pub fn is_mmap(self) -> bool {
        matches!(
            self,
            ArgCategory::Mmap | ArgCategory::AsyncMmap | ArgCategory::Hmap
        )
    }

    /// Whether a child arg of this category can be fed from a parent port of `parent`.
    ///
    /// Streams are fed from interconnects, not ports, so they never match here.
    pub fn accepts_parent(self, parent: ArgCategory) -> bool {
        match self {
            ArgCategory::Scalar => parent == ArgCategory::Scalar,
            ArgCategory::Mmap | ArgCategory::AsyncMmap => {
                matches!(parent, ArgCategory::Mmap | ArgCategory::AsyncMmap)
            }
            ArgCategory::Hmap => parent == ArgCategory::Hmap,
            ArgCategory::Istream | ArgCategory::Ostream => false,
        }
    }
}

impl fmt::Display for ArgCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ArgCategory::Scalar => "scalar",
            ArgCategory::Istream => "istream",
            ArgCategory::Ostream => "ostream",
            ArgCategory::Mmap => "mmap",
            ArgCategory::AsyncMmap => "async_mmap",
            ArgCategory::Hmap => "hmap",
        };
        f.write_str(s)
    }
}

/// One port of a task's external interface.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Port {
    /// Port name, unique within the task.
    pub name: String,
    /// Port category.
    pub category: ArgCategory,
    /// Data width in bits (stream payload without the end-of-transaction bit).
    pub width: u32,
    /// Number of banks of an `hmap` port.
    #[serde(default)]
    pub chan_count: Option<u32>,
    /// Size in bytes of each `hmap` bank.
    #[serde(default)]
    pub chan_size: Option<u64>,
}

impl Port {
    /// Creates a port without channel information.
    pub fn new(name: impl Into<String>, category: ArgCategory, width: u32) -> Self {
        Self {
            name: name.into(),
            category,
            width,
            chan_count: None,
            chan_size: None,
        }
    }

    /// Number of independent memory channels behind this port.
    pub fn channels(&self) -> u32 {
        match self.category {
            ArgCategory::Hmap => self.chan_count.unwrap_or(1),
            _ => 1,
        }
    }
}

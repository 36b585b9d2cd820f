//! Internal signal declarations.

use serde::{Deserialize, Serialize};

/// Whether a signal is driven continuously or by a clocked process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SignalKind {
    /// Driven by an `assign` or an instance output.
    Wire,
    /// Driven inside an `always` block.
    Reg,
}

/// A signal declared inside a module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signal {
    /// The signal name.
    pub name: String,
    /// Wire or reg.
    pub kind: SignalKind,
    /// Width in bits, at least 1.
    pub width: u32,
}

impl Signal {
    /// Declares a wire.
    pub fn wire(name: impl Into<String>, width: u32) -> Self {
        Self {
            name: name.into(),
            kind: SignalKind::Wire,
            width,
        }
    }

    /// Declares a reg.
    pub fn reg(name: impl Into<String>, width: u32) -> Self {
        Self {
            name: name.into(),
            kind: SignalKind::Reg,
            width,
        }
    }
}

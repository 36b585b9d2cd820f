//! Port definitions for module interfaces.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The direction of a port on a module boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PortDirection {
    /// Data flows into the module.
    Input,
    /// Data flows out of the module.
    Output,
    /// Bidirectional.
    InOut,
}

impl PortDirection {
    /// The opposite direction, as seen from the other side of a connection.
    pub fn flip(self) -> Self {
        match self {
            PortDirection::Input => PortDirection::Output,
            PortDirection::Output => PortDirection::Input,
            PortDirection::InOut => PortDirection::InOut,
        }
    }
}

impl fmt::Display for PortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PortDirection::Input => "input",
            PortDirection::Output => "output",
            PortDirection::InOut => "inout",
        };
        f.write_str(s)
    }
}

/// A port in a module's external interface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Port {
    /// The port name.
    pub name: String,
    /// The direction of data flow.
    pub direction: PortDirection,
    /// Width in bits, at least 1.
    pub width: u32,
}

impl Port {
    /// Creates an input port.
    pub fn input(name: impl Into<String>, width: u32) -> Self {
        Self {
            name: name.into(),
            direction: PortDirection::Input,
            width,
        }
    }

    /// Creates an output port.
    pub fn output(name: impl Into<String>, width: u32) -> Self {
        Self {
            name: name.into(),
            direction: PortDirection::Output,
            width,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flip_swaps_input_and_output() {
        assert_eq!(PortDirection::Input.flip(), PortDirection::Output);
        assert_eq!(PortDirection::Output.flip(), PortDirection::Input);
        assert_eq!(PortDirection::InOut.flip(), PortDirection::InOut);
    }

    #[test]
    fn constructors() {
        let p = Port::input("ap_start", 1);
        assert_eq!(p.direction, PortDirection::Input);
        assert_eq!(Port::output("ap_done", 1).direction.to_string(), "output");
    }
}

//! Error type for netlist assembly.

use conflux_graph::GraphConsistencyError;
use conflux_netlist::NetlistError;
use thiserror::Error;

/// Fatal assembly failures.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AssembleError {
    /// The graph and the compiled child interfaces disagree.
    #[error(transparent)]
    Graph(#[from] GraphConsistencyError),
    /// A structural edit collided with an existing name.
    #[error(transparent)]
    Netlist(#[from] NetlistError),
    /// A child task was assembled before its interface was known.
    #[error("no module interface for task `{task}`")]
    MissingInterface {
        /// Task whose interface is missing.
        task: String,
    },
}

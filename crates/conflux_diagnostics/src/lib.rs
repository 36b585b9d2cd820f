//! Diagnostic creation, severity management, and terminal rendering.
//!
//! Every fatal condition in conflux names the entity at fault: a task, an
//! instance, an interconnect, a region pair, or an external tool. A
//! [`Diagnostic`] carries that [`Subject`] instead of a source span, and
//! [`TerminalRenderer`] formats it for the CLI.

#![warn(missing_docs)]

pub mod code;
pub mod diagnostic;
pub mod renderer;
pub mod severity;
pub mod subject;

pub use code::{Category, DiagnosticCode};
pub use diagnostic::Diagnostic;
pub use renderer::{DiagnosticRenderer, TerminalRenderer};
pub use severity::Severity;
pub use subject::{Subject, SubjectKind};

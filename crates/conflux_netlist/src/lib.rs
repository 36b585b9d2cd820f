//! Structural netlists and the module editor used to build them.
//!
//! A [`Module`] holds ports, parameters, signals, child instances, continuous
//! assignments, and clocked processes. Every mutation goes through the
//! [`ModuleEditor`] trait so that the handshake and assembly code never depends
//! on how a module is stored or printed. [`write_verilog`] prints a module as
//! deterministic structural Verilog.

#![warn(missing_docs)]

pub mod editor;
pub mod error;
pub mod expr;
pub mod instance;
pub mod module;
pub mod pipeline;
pub mod port;
pub mod signal;
pub mod stmt;
pub mod verilog;

pub use editor::ModuleEditor;
pub use error::NetlistError;
pub use expr::{BinaryOp, Expr, UnaryOp};
pub use instance::{Connection, Instance, Parameter};
pub use module::Module;
pub use pipeline::Pipeline;
pub use port::{Port, PortDirection};
pub use signal::{Signal, SignalKind};
pub use stmt::{Assignment, CaseArm, Process, Statement};
pub use verilog::write_verilog;

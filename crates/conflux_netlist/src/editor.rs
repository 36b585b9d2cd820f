//! The structural editing capability consumed by FSM emission and assembly.

use crate::error::NetlistError;
use crate::instance::{Instance, Parameter};
use crate::port::Port;
use crate::signal::Signal;
use crate::stmt::{Assignment, Process};

/// Query and mutate one module's ports, parameters, signals, instances,
/// and statements.
///
/// Names share one namespace: a port, signal, parameter, or instance name may
/// be declared only once.
pub trait ModuleEditor {
    /// The module name.
    fn module_name(&self) -> &str;

    /// Ports in declaration order.
    fn ports(&self) -> &[Port];

    /// Finds a port by name.
    fn find_port(&self, name: &str) -> Option<&Port> {
        self.ports().iter().find(|p| p.name == name)
    }

    /// Whether a port or signal of this name exists.
    fn has_net(&self, name: &str) -> bool;

    /// Declares a port.
    fn add_port(&mut self, port: Port) -> Result<(), NetlistError>;

    /// Removes a port, returning it if it existed.
    fn remove_port(&mut self, name: &str) -> Option<Port>;

    /// Declares a module parameter.
    fn add_param(&mut self, param: Parameter) -> Result<(), NetlistError>;

    /// Declares an internal signal.
    fn add_signal(&mut self, signal: Signal) -> Result<(), NetlistError>;

    /// Adds a child instance.
    fn add_instance(&mut self, instance: Instance) -> Result<(), NetlistError>;

    /// Adds a continuous assignment.
    fn add_assignment(&mut self, assignment: Assignment);

    /// Adds a clocked process.
    fn add_process(&mut self, process: Process);

    /// Drops every signal, instance, assignment, and process, keeping the
    /// interface. A synthesized leaf's own `ap_*` control logic goes with it.
    fn strip_body(&mut self);

    /// Declares a port unless one of that name already exists.
    fn ensure_port(&mut self, port: Port) -> Result<(), NetlistError> {
        if self.find_port(&port.name).is_some() {
            return Ok(());
        }
        self.add_port(port)
    }

    /// Declares a signal unless a net of that name already exists.
    fn ensure_signal(&mut self, signal: Signal) -> Result<(), NetlistError> {
        if self.has_net(&signal.name) {
            return Ok(());
        }
        self.add_signal(signal)
    }
}

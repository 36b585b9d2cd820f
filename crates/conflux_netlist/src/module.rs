//! In-memory modules.

use crate::editor::ModuleEditor;
use crate::error::NetlistError;
use crate::instance::{Instance, Parameter};
use crate::port::Port;
use crate::signal::Signal;
use crate::stmt::{Assignment, Process};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// A structural hardware module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Module {
    /// The module name.
    pub name: String,
    /// Declared parameters with defaults.
    pub params: Vec<Parameter>,
    /// External interface in declaration order.
    pub ports: Vec<Port>,
    /// Internal signals in declaration order.
    pub signals: Vec<Signal>,
    /// Child instances.
    pub instances: Vec<Instance>,
    /// Continuous assignments.
    pub assignments: Vec<Assignment>,
    /// Clocked processes.
    pub processes: Vec<Process>,
    #[serde(skip)]
    names: HashSet<String>,
}

impl Module {
    /// Creates an empty module.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            params: Vec::new(),
            ports: Vec::new(),
            signals: Vec::new(),
            instances: Vec::new(),
            assignments: Vec::new(),
            processes: Vec::new(),
            names: HashSet::new(),
        }
    }

    /// Creates a module with the given interface and an empty body.
    pub fn with_ports(name: impl Into<String>, ports: Vec<Port>) -> Result<Self, NetlistError> {
        let mut module = Self::new(name);
        for port in ports {
            module.add_port(port)?;
        }
        Ok(module)
    }

    /// A copy holding only the name, parameters, and ports.
    pub fn interface(&self) -> Module {
        let mut iface = self.clone();
        iface.strip_body();
        iface
    }

    /// Finds a signal by name.
    pub fn signal(&self, name: &str) -> Option<&Signal> {
        self.signals.iter().find(|s| s.name == name)
    }

    /// Finds an instance by name.
    pub fn instance(&self, name: &str) -> Option<&Instance> {
        self.instances.iter().find(|i| i.name == name)
    }

    /// Rebuilds the name index, e.g. after deserialization.
    pub fn reindex(&mut self) {
        self.names = self
            .params
            .iter()
            .map(|p| p.name.clone())
            .chain(self.ports.iter().map(|p| p.name.clone()))
            .chain(self.signals.iter().map(|s| s.name.clone()))
            .chain(self.instances.iter().map(|i| i.name.clone()))
            .collect();
    }

    fn claim(&mut self, name: &str) -> Result<(), NetlistError> {
        if self.names.is_empty() && !self.ports.is_empty() {
            self.reindex();
        }
        if !self.names.insert(name.to_string()) {
            return Err(NetlistError::Duplicate {
                module: self.name.clone(),
                name: name.to_string(),
            });
        }
        Ok(())
    }
}

impl ModuleEditor for Module {
    fn module_name(&self) -> &str {
        &self.name
    }

    fn ports(&self) -> &[Port] {
        &self.ports
    }

    fn has_net(&self, name: &str) -> bool {
        self.ports.iter().any(|p| p.name == name) || self.signals.iter().any(|s| s.name == name)
    }

    fn add_port(&mut self, port: Port) -> Result<(), NetlistError> {
        self.claim(&port.name)?;
        self.ports.push(port);
        Ok(())
    }

    fn remove_port(&mut self, name: &str) -> Option<Port> {
        let pos = self.ports.iter().position(|p| p.name == name)?;
        self.names.remove(name);
        Some(self.ports.remove(pos))
    }

    fn add_param(&mut self, param: Parameter) -> Result<(), NetlistError> {
        self.claim(&param.name)?;
        self.params.push(param);
        Ok(())
    }

    fn add_signal(&mut self, signal: Signal) -> Result<(), NetlistError> {
        self.claim(&signal.name)?;
        self.signals.push(signal);
        Ok(())
    }

    fn add_instance(&mut self, instance: Instance) -> Result<(), NetlistError> {
        self.claim(&instance.name)?;
        self.instances.push(instance);
        Ok(())
    }

    fn add_assignment(&mut self, assignment: Assignment) {
        self.assignments.push(assignment);
    }

    fn add_process(&mut self, process: Process) {
        self.processes.push(process);
    }

    fn strip_body(&mut self) {
        self.signals.clear();
        self.instances.clear();
        self.assignments.clear();
        self.processes.clear();
        self.reindex();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::Expr;

    fn sample() -> Module {
        let mut m = Module::with_ports(
            "Add",
            vec![Port::input("ap_clk", 1), Port::output("ap_done", 1)],
        )
        .unwrap();
        m.add_signal(Signal::reg("state", 2)).unwrap();
        m.add_instance(Instance::new("fifo", "a_q")).unwrap();
        m.add_assignment(Assignment::new("ap_done", Expr::low()));
        m
    }

    #[test]
    fn duplicate_names_rejected() {
        let mut m = sample();
        let err = m.add_signal(Signal::wire("ap_clk", 1)).unwrap_err();
        assert_eq!(
            err,
            NetlistError::Duplicate {
                module: "Add".to_string(),
                name: "ap_clk".to_string()
            }
        );
        assert!(m.add_instance(Instance::new("fifo", "state")).is_err());
    }

    #[test]
    fn ensure_is_idempotent() {
        let mut m = sample();
        m.ensure_signal(Signal::wire("state", 2)).unwrap();
        m.ensure_port(Port::input("ap_clk", 1)).unwrap();
        assert_eq!(m.signals.len(), 1);
        assert_eq!(m.ports.len(), 2);
    }

    #[test]
    fn strip_body_keeps_interface() {
        let mut m = sample();
        m.strip_body();
        assert_eq!(m.ports.len(), 2);
        assert!(m.signals.is_empty());
        assert!(m.instances.is_empty());
        assert!(m.assignments.is_empty());
        m.add_signal(Signal::reg("state", 2)).unwrap();
    }

    #[test]
    fn remove_port_frees_name() {
        let mut m = sample();
        assert!(m.remove_port("ap_done").is_some());
        assert!(m.remove_port("ap_done").is_none());
        m.add_signal(Signal::wire("ap_done", 1)).unwrap();
    }

    #[test]
    fn interface_survives_bincode() {
        let iface = sample().interface();
        let bytes = bincode::serde::encode_to_vec(&iface, bincode::config::standard()).unwrap();
        let (mut back, _): (Module, usize) =
            bincode::serde::decode_from_slice(&bytes, bincode::config::standard()).unwrap();
        back.reindex();
        assert_eq!(back.ports, iface.ports);
        assert!(back.signals.is_empty());
        assert!(back.add_port(Port::input("ap_clk", 1)).is_err());
    }
}

//! Module instantiations.

use crate::expr::Expr;
use serde::{Deserialize, Serialize};

/// A parameter binding on an instance, or a parameter declaration on a module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parameter {
    /// Parameter name.
    pub name: String,
    /// Value or default.
    pub value: Expr,
}

impl Parameter {
    /// Creates a parameter.
    pub fn new(name: impl Into<String>, value: impl Into<Expr>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }

    /// An unsized integer parameter.
    pub fn int(name: impl Into<String>, value: u64) -> Self {
        Self::new(name, Expr::constant(0, value))
    }
}

/// A named port connection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Connection {
    /// Port name on the instantiated module.
    pub port: String,
    /// Expression in the parent module.
    pub expr: Expr,
}

impl Connection {
    /// Creates a connection.
    pub fn new(port: impl Into<String>, expr: impl Into<Expr>) -> Self {
        Self {
            port: port.into(),
            expr: expr.into(),
        }
    }
}

/// An instantiation of another module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Instance {
    /// The instantiated module's name.
    pub module: String,
    /// The instance name.
    pub name: String,
    /// Parameter overrides.
    pub params: Vec<Parameter>,
    /// Port connections, in the order they are printed.
    pub connections: Vec<Connection>,
}

impl Instance {
    /// Creates an instance with no parameters or connections.
    pub fn new(module: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            module: module.into(),
            name: name.into(),
            params: Vec::new(),
            connections: Vec::new(),
        }
    }

    /// Adds a parameter override.
    pub fn with_param(mut self, param: Parameter) -> Self {
        self.params.push(param);
        self
    }

    /// Adds a port connection.
    pub fn connect(mut self, port: impl Into<String>, expr: impl Into<Expr>) -> Self {
        self.connections.push(Connection::new(port, expr));
        self
    }

    /// Finds the connection of `port`.
    pub fn connection(&self, port: &str) -> Option<&Expr> {
        self.connections
            .iter()
            .find(|c| c.port == port)
            .map(|c| &c.expr)
    }
}

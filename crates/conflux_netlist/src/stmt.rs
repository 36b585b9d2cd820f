//! Continuous assignments and clocked processes.

use crate::expr::Expr;
use serde::{Deserialize, Serialize};

/// `assign target = value;`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignment {
    /// The driven wire or output port.
    pub target: String,
    /// The driving expression.
    pub value: Expr,
}

impl Assignment {
    /// Creates an assignment.
    pub fn new(target: impl Into<String>, value: impl Into<Expr>) -> Self {
        Self {
            target: target.into(),
            value: value.into(),
        }
    }
}

/// One arm of a case statement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaseArm {
    /// The matched value.
    pub pattern: Expr,
    /// Statements run on a match.
    pub body: Vec<Statement>,
}

/// A statement inside a clocked process.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Statement {
    /// `target <= value;`
    NonBlocking {
        /// The driven reg.
        target: String,
        /// The next value.
        value: Expr,
    },
    /// `if (condition) ... else ...`
    If {
        /// The condition.
        condition: Expr,
        /// Taken branch.
        then_body: Vec<Statement>,
        /// Untaken branch, possibly empty.
        else_body: Vec<Statement>,
    },
    /// `case (subject) ... endcase`
    Case {
        /// The matched expression.
        subject: Expr,
        /// Arms in order.
        arms: Vec<CaseArm>,
        /// Default branch, possibly empty.
        default: Vec<Statement>,
    },
}

impl Statement {
    /// `target <= value;`
    pub fn assign(target: impl Into<String>, value: impl Into<Expr>) -> Self {
        Statement::NonBlocking {
            target: target.into(),
            value: value.into(),
        }
    }

    /// `if` with an empty `else`.
    pub fn when(condition: Expr, then_body: Vec<Statement>) -> Self {
        Statement::If {
            condition,
            then_body,
            else_body: Vec::new(),
        }
    }
}

/// `always @(posedge clock) begin ... end`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Process {
    /// The clock signal.
    pub clock: String,
    /// Body statements.
    pub body: Vec<Statement>,
}

impl Process {
    /// A process on the rising edge of `clock`.
    pub fn posedge(clock: impl Into<String>, body: Vec<Statement>) -> Self {
        Self {
            clock: clock.into(),
            body,
        }
    }
}

//! Expressions used in assignments, process bodies, and connections.

use serde::{Deserialize, Serialize};

/// A unary operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnaryOp {
    /// Bitwise NOT (`~`).
    Not,
    /// Logical NOT (`!`).
    LogicNot,
}

/// A binary operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BinaryOp {
    /// Bitwise AND (`&`).
    And,
    /// Bitwise OR (`|`).
    Or,
    /// Logical AND (`&&`).
    LogicAnd,
    /// Logical OR (`||`).
    LogicOr,
    /// Equality (`==`).
    Eq,
    /// Inequality (`!=`).
    Ne,
    /// Subtraction (`-`).
    Sub,
}

impl BinaryOp {
    /// The Verilog spelling of the operator.
    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOp::And => "&",
            BinaryOp::Or => "|",
            BinaryOp::LogicAnd => "&&",
            BinaryOp::LogicOr => "||",
            BinaryOp::Eq => "==",
            BinaryOp::Ne => "!=",
            BinaryOp::Sub => "-",
        }
    }
}

/// A structural expression.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Expr {
    /// A port, signal, or parameter reference.
    Ident(String),
    /// A sized constant; `width == 0` prints an unsized decimal.
    Const {
        /// Width in bits.
        width: u32,
        /// Value.
        value: u64,
    },
    /// A literal copied verbatim, e.g. a scalar arg like `64'd0`.
    Literal(String),
    /// A unary operation.
    Unary {
        /// The operator.
        op: UnaryOp,
        /// The operand.
        operand: Box<Expr>,
    },
    /// A binary operation.
    Binary {
        /// The operator.
        op: BinaryOp,
        /// Left operand.
        lhs: Box<Expr>,
        /// Right operand.
        rhs: Box<Expr>,
    },
    /// `cond ? a : b`.
    Ternary {
        /// The condition.
        condition: Box<Expr>,
        /// Value when true.
        true_val: Box<Expr>,
        /// Value when false.
        false_val: Box<Expr>,
    },
    /// A single bit of a signal.
    Index {
        /// The signal.
        base: String,
        /// Bit index.
        index: u32,
    },
    /// `{a, b, ...}`, most significant first.
    Concat(Vec<Expr>),
    /// Unconnected, printed as an empty connection.
    Open,
}

impl Expr {
    /// A name reference.
    pub fn ident(name: impl Into<String>) -> Self {
        Expr::Ident(name.into())
    }

    /// A sized constant.
    pub fn constant(width: u32, value: u64) -> Self {
        Expr::Const { width, value }
    }

    /// `1'b1`.
    pub fn high() -> Self {
        Expr::constant(1, 1)
    }

    /// `1'b0`.
    pub fn low() -> Self {
        Expr::constant(1, 0)
    }

    /// Logical negation.
    pub fn not(self) -> Self {
        Expr::Unary {
            op: UnaryOp::LogicNot,
            operand: Box::new(self),
        }
    }

    /// Binary operation helper.
    pub fn binary(op: BinaryOp, lhs: Expr, rhs: Expr) -> Self {
        Expr::Binary {
            op,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        }
    }

    /// Logical AND.
    pub fn and(self, rhs: Expr) -> Self {
        Expr::binary(BinaryOp::LogicAnd, self, rhs)
    }

    /// Equality test.
    pub fn equals(self, rhs: Expr) -> Self {
        Expr::binary(BinaryOp::Eq, self, rhs)
    }

    /// Logical AND of every operand; `1'b1` when there are none.
    pub fn all(operands: impl IntoIterator<Item = Expr>) -> Self {
        operands
            .into_iter()
            .reduce(Expr::and)
            .unwrap_or_else(Expr::high)
    }

    /// Conditional selection.
    pub fn select(condition: Expr, true_val: Expr, false_val: Expr) -> Self {
        Expr::Ternary {
            condition: Box::new(condition),
            true_val: Box::new(true_val),
            false_val: Box::new(false_val),
        }
    }

    /// Names referenced by this expression, in order of appearance.
    pub fn idents(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.collect_idents(&mut out);
        out
    }

    fn collect_idents<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            Expr::Ident(name) | Expr::Index { base: name, .. } => out.push(name),
            Expr::Const { .. } | Expr::Literal(_) | Expr::Open => {}
            Expr::Unary { operand, .. } => operand.collect_idents(out),
            Expr::Binary { lhs, rhs, .. } => {
                lhs.collect_idents(out);
                rhs.collect_idents(out);
            }
            Expr::Ternary {
                condition,
                true_val,
                false_val,
            } => {
                condition.collect_idents(out);
                true_val.collect_idents(out);
                false_val.collect_idents(out);
            }
            Expr::Concat(parts) => parts.iter().for_each(|p| p.collect_idents(out)),
        }
    }
}

impl From<&str> for Expr {
    fn from(name: &str) -> Self {
        Expr::ident(name)
    }
}

impl From<String> for Expr {
    fn from(name: String) -> Self {
        Expr::Ident(name)
    }
}

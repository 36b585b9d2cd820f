//! Fixed-latency register chains.

use crate::editor::ModuleEditor;
use crate::error::NetlistError;
use crate::expr::Expr;
use crate::signal::Signal;
use crate::stmt::{Assignment, Process, Statement};

/// A chain of `level` registers named `{name}__q0` .. `{name}__q{level}`.
///
/// Stage 0 is a wire driven by the input; every later stage is a register
/// clocked from the previous one, so the tail lags the head by `level` cycles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pipeline {
    /// Base name.
    pub name: String,
    /// Number of register stages.
    pub level: u32,
    /// Width in bits.
    pub width: u32,
}

impl Pipeline {
    /// Creates a pipeline description; nothing is emitted yet.
    pub fn new(name: impl Into<String>, level: u32, width: u32) -> Self {
        Self {
            name: name.into(),
            level,
            width,
        }
    }

    /// Name of stage `i`.
    pub fn stage(&self, i: u32) -> String {
        format!("{}__q{i}", self.name)
    }

    /// The undelayed input stage.
    pub fn head(&self) -> String {
        self.stage(0)
    }

    /// The fully delayed output stage.
    pub fn tail(&self) -> String {
        self.stage(self.level)
    }

    /// Declares the stages, drives the head from `input`, and clocks the chain.
    pub fn emit(
        &self,
        editor: &mut impl ModuleEditor,
        input: Expr,
        clock: &str,
    ) -> Result<(), NetlistError> {
        editor.add_signal(Signal::wire(self.head(), self.width))?;
        for i in 1..=self.level {
            editor.add_signal(Signal::reg(self.stage(i), self.width))?;
        }
        editor.add_assignment(Assignment::new(self.head(), input));
        if self.level > 0 {
            let body = (0..self.level)
                .map(|i| Statement::assign(self.stage(i + 1), Expr::ident(self.stage(i))))
                .collect();
            editor.add_process(Process::posedge(clock, body));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::module::Module;
    use crate::signal::SignalKind;

    #[test]
    fn stage_names() {
        let p = Pipeline::new("n", 3, 64);
        assert_eq!(p.head(), "n__q0");
        assert_eq!(p.tail(), "n__q3");
    }

    #[test]
    fn emit_declares_wire_head_and_reg_stages() {
        let mut m = Module::new("Top");
        Pipeline::new("ap_start_global", 2, 1)
            .emit(&mut m, Expr::ident("ap_start"), "ap_clk")
            .unwrap();
        let kinds: Vec<(&str, SignalKind)> =
            m.signals.iter().map(|s| (s.name.as_str(), s.kind)).collect();
        assert_eq!(
            kinds,
            vec![
                ("ap_start_global__q0", SignalKind::Wire),
                ("ap_start_global__q1", SignalKind::Reg),
                ("ap_start_global__q2", SignalKind::Reg),
            ]
        );
        assert_eq!(m.assignments.len(), 1);
        assert_eq!(m.processes[0].body.len(), 2);
    }

    #[test]
    fn zero_level_is_a_wire() {
        let mut m = Module::new("Top");
        let p = Pipeline::new("x", 0, 8);
        p.emit(&mut m, Expr::ident("y"), "ap_clk").unwrap();
        assert_eq!(p.head(), p.tail());
        assert!(m.processes.is_empty());
    }
}

//! Deterministic structural Verilog output.

use crate::expr::{Expr, UnaryOp};
use crate::module::Module;
use crate::signal::SignalKind;
use crate::stmt::Statement;
use std::fmt::Write;

/// Prints `module` as Verilog-2001.
///
/// Output depends only on the module's contents and their order, so equal
/// modules print byte-identical text.
pub fn write_verilog(module: &Module) -> String {
    let mut out = String::new();
    // Writing to a String cannot fail.
    let _ = write_module(&mut out, module);
    out
}

fn range(width: u32) -> String {
    if width > 1 {
        format!("[{}:0] ", width - 1)
    } else {
        String::new()
    }
}

fn write_module(out: &mut String, m: &Module) -> std::fmt::Result {
    write!(out, "module {}", m.name)?;
    if !m.params.is_empty() {
        writeln!(out, " #(")?;
        for (i, p) in m.params.iter().enumerate() {
            let sep = if i + 1 < m.params.len() { "," } else { "" };
            writeln!(out, "  parameter {} = {}{sep}", p.name, expr(&p.value))?;
        }
        write!(out, ")")?;
    }
    writeln!(out, " (")?;
    for (i, p) in m.ports.iter().enumerate() {
        let sep = if i + 1 < m.ports.len() { "," } else { "" };
        writeln!(out, "  {} wire {}{}{sep}", p.direction, range(p.width), p.name)?;
    }
    writeln!(out, ");")?;

    if !m.signals.is_empty() {
        writeln!(out)?;
        for s in &m.signals {
            let kind = match s.kind {
                SignalKind::Wire => "wire",
                SignalKind::Reg => "reg",
            };
            writeln!(out, "  {kind} {}{};", range(s.width), s.name)?;
        }
    }

    for inst in &m.instances {
        writeln!(out)?;
        write!(out, "  {}", inst.module)?;
        if !inst.params.is_empty() {
            writeln!(out, " #(")?;
            for (i, p) in inst.params.iter().enumerate() {
                let sep = if i + 1 < inst.params.len() { "," } else { "" };
                writeln!(out, "    .{}({}){sep}", p.name, expr(&p.value))?;
            }
            write!(out, "  )")?;
        }
        writeln!(out, " {} (", inst.name)?;
        for (i, c) in inst.connections.iter().enumerate() {
            let sep = if i + 1 < inst.connections.len() { "," } else { "" };
            writeln!(out, "    .{}({}){sep}", c.port, expr(&c.expr))?;
        }
        writeln!(out, "  );")?;
    }

    if !m.assignments.is_empty() {
        writeln!(out)?;
        for a in &m.assignments {
            writeln!(out, "  assign {} = {};", a.target, expr(&a.value))?;
        }
    }

    for p in &m.processes {
        writeln!(out)?;
        writeln!(out, "  always @(posedge {}) begin", p.clock)?;
        write_statements(out, &p.body, 2)?;
        writeln!(out, "  end")?;
    }

    writeln!(out, "endmodule")
}

fn write_statements(out: &mut String, body: &[Statement], depth: usize) -> std::fmt::Result {
    let pad = "  ".repeat(depth);
    for stmt in body {
        match stmt {
            Statement::NonBlocking { target, value } => {
                writeln!(out, "{pad}{target} <= {};", expr(value))?;
            }
            Statement::If {
                condition,
                then_body,
                else_body,
            } => {
                writeln!(out, "{pad}if ({}) begin", expr(condition))?;
                write_statements(out, then_body, depth + 1)?;
                if else_body.is_empty() {
                    writeln!(out, "{pad}end")?;
                } else {
                    writeln!(out, "{pad}end else begin")?;
                    write_statements(out, else_body, depth + 1)?;
                    writeln!(out, "{pad}end")?;
                }
            }
            Statement::Case {
                subject,
                arms,
                default,
            } => {
                writeln!(out, "{pad}case ({})", expr(subject))?;
                for arm in arms {
                    writeln!(out, "{pad}  {}: begin", expr(&arm.pattern))?;
                    write_statements(out, &arm.body, depth + 2)?;
                    writeln!(out, "{pad}  end")?;
                }
                if !default.is_empty() {
                    writeln!(out, "{pad}  default: begin")?;
                    write_statements(out, default, depth + 2)?;
                    writeln!(out, "{pad}  end")?;
                }
                writeln!(out, "{pad}endcase")?;
            }
        }
    }
    Ok(())
}

/// Prints one expression; compound operands are parenthesized.
pub fn expr(e: &Expr) -> String {
    match e {
        Expr::Ident(name) => name.clone(),
        Expr::Const { width: 0, value } => value.to_string(),
        Expr::Const { width, value } if *width == 1 => format!("1'b{value}"),
        Expr::Const { width, value } => format!("{width}'d{value}"),
        Expr::Literal(text) => text.clone(),
        Expr::Unary { op, operand } => {
            let sym = match op {
                UnaryOp::Not => "~",
                UnaryOp::LogicNot => "!",
            };
            format!("{sym}{}", operand_expr(operand))
        }
        Expr::Binary { op, lhs, rhs } => {
            format!("{} {} {}", operand_expr(lhs), op.symbol(), operand_expr(rhs))
        }
        Expr::Ternary {
            condition,
            true_val,
            false_val,
        } => format!(
            "{} ? {} : {}",
            operand_expr(condition),
            operand_expr(true_val),
            operand_expr(false_val)
        ),
        Expr::Index { base, index } => format!("{base}[{index}]"),
        Expr::Concat(parts) => {
            let parts: Vec<String> = parts.iter().map(expr).collect();
            format!("{{{}}}", parts.join(", "))
        }
        Expr::Open => String::new(),
    }
}

fn operand_expr(e: &Expr) -> String {
    match e {
        Expr::Binary { .. } | Expr::Ternary { .. } => format!("({})", expr(e)),
        _ => expr(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editor::ModuleEditor;
    use crate::instance::{Instance, Parameter};
    use crate::port::Port;
    use crate::signal::Signal;
    use crate::stmt::{Assignment, CaseArm, Process};

    fn sample() -> Module {
        let mut m = Module::with_ports(
            "Top",
            vec![
                Port::input("ap_clk", 1),
                Port::input("ap_rst_n", 1),
                Port::output("ap_done", 1),
            ],
        )
        .unwrap();
        m.add_signal(Signal::reg("state", 2)).unwrap();
        m.add_signal(Signal::wire("data", 33)).unwrap();
        m.add_instance(
            Instance::new("fifo", "a_q")
                .with_param(Parameter::int("DEPTH", 8))
                .connect("clk", "ap_clk")
                .connect("if_dout", "data"),
        )
        .unwrap();
        m.add_assignment(Assignment::new(
            "ap_done",
            Expr::ident("state").equals(Expr::constant(2, 2)),
        ));
        m.add_process(Process::posedge(
            "ap_clk",
            vec![Statement::If {
                condition: Expr::ident("ap_rst_n").not(),
                then_body: vec![Statement::assign("state", Expr::constant(2, 0))],
                else_body: vec![Statement::Case {
                    subject: Expr::ident("state"),
                    arms: vec![CaseArm {
                        pattern: Expr::constant(2, 0),
                        body: vec![Statement::assign("state", Expr::constant(2, 1))],
                    }],
                    default: Vec::new(),
                }],
            }],
        ));
        m
    }

    #[test]
    fn prints_structure() {
        let text = write_verilog(&sample());
        let expected = "\
module Top (
  input wire ap_clk,
  input wire ap_rst_n,
  output wire ap_done
);

  reg [1:0] state;
  wire [32:0] data;

  fifo #(
    .DEPTH(8)
  ) a_q (
    .clk(ap_clk),
    .if_dout(data)
  );

  assign ap_done = state == 2'd2;

  always @(posedge ap_clk) begin
    if (!ap_rst_n) begin
      state <= 2'd0;
    end else begin
      case (state)
        2'd0: begin
          state <= 2'd1;
        end
      endcase
    end
  end
endmodule
";
        assert_eq!(text, expected);
    }

    #[test]
    fn output_is_deterministic() {
        assert_eq!(write_verilog(&sample()), write_verilog(&sample()));
    }

    #[test]
    fn nested_operands_are_parenthesized() {
        let e = Expr::ident("a")
            .and(Expr::ident("b"))
            .and(Expr::ident("c").not());
        assert_eq!(expr(&e), "(a && b) && !c");
        assert_eq!(expr(&Expr::high()), "1'b1");
        assert_eq!(expr(&Expr::Open), "");
    }
}

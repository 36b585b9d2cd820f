//! Diagnostic rendering for the terminal.

use crate::diagnostic::Diagnostic;
use crate::severity::Severity;

/// Trait for rendering diagnostics into formatted output strings.
pub trait DiagnosticRenderer {
    /// Renders a single diagnostic into a formatted string.
    fn render(&self, diag: &Diagnostic) -> String;
}

/// Renders diagnostics in a rustc-style terminal format.
///
/// Produces output like:
/// ```text
/// error[E104]: instance has no region assignment
///   --> instance `Add_0`
///    = note: 3 instances were assigned
///    = help: rerun the floorplan solver
/// ```
pub struct TerminalRenderer {
    /// Whether to use ANSI color codes in output.
    pub color: bool,
}

impl TerminalRenderer {
    /// Creates a new terminal renderer.
    pub fn new(color: bool) -> Self {
        Self { color }
    }

    fn paint(&self, severity: Severity) -> (&'static str, &'static str) {
        if !self.color {
            return ("", "");
        }
        let start = match severity {
            Severity::Error => "\x1b[1;31m",
            Severity::Warning => "\x1b[1;33m",
        };
        (start, "\x1b[0m")
    }
}

impl DiagnosticRenderer for TerminalRenderer {
    fn render(&self, diag: &Diagnostic) -> String {
        let (start, end) = self.paint(diag.severity);
        let mut out = format!(
            "{start}{}[{}]{end}: {}\n",
            diag.severity, diag.code, diag.message
        );

        for subject in &diag.subjects {
            out.push_str(&format!("  --> {subject}\n"));
        }
        for note in &diag.notes {
            out.push_str(&format!("   = note: {note}\n"));
        }
        for help in &diag.help {
            out.push_str(&format!("   = help: {help}\n"));
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::code::DiagnosticCode;
    use crate::subject::{Subject, SubjectKind};

    #[test]
    fn render_error_with_subjects() {
        let diag = Diagnostic::error(DiagnosticCode::error(106), "no route between regions")
            .with_subject(Subject::new(SubjectKind::Region, "X -> Y"))
            .with_subject(Subject::new(SubjectKind::Interconnect, "f"));

        let output = TerminalRenderer::new(false).render(&diag);

        assert!(output.starts_with("error[E106]: no route between regions\n"));
        assert!(output.contains("  --> region `X -> Y`\n"));
        assert!(output.contains("  --> interconnect `f`\n"));
    }

    #[test]
    fn render_warning_with_notes() {
        let diag = Diagnostic::warning(DiagnosticCode::warning(201), "area estimate missing")
            .with_note("best-effort synthesis is enabled")
            .with_help("check the synthesizer log");

        let output = TerminalRenderer::new(false).render(&diag);

        assert!(output.contains("warning[W201]: area estimate missing"));
        assert!(output.contains("= note: best-effort synthesis is enabled"));
        assert!(output.contains("= help: check the synthesizer log"));
    }

    #[test]
    fn color_wraps_header_only() {
        let diag = Diagnostic::error(DiagnosticCode::error(1), "boom");
        let output = TerminalRenderer::new(true).render(&diag);
        assert!(output.starts_with("\x1b[1;31merror[E001]\x1b[0m: boom"));
    }
}

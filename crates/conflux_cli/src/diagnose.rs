//! Conversion of stage errors into coded diagnostics naming their subject.

use conflux_assemble::AssembleError;
use conflux_cache::CacheError;
use conflux_config::ConfigError;
use conflux_diagnostics::{Diagnostic, DiagnosticCode, Subject, SubjectKind};
use conflux_graph::GraphConsistencyError;
use conflux_netlist::NetlistError;
use conflux_synth::ExternalToolError;

/// Turns any stage error into one diagnostic.
///
/// Known error types get their stable code and the entities at fault;
/// anything else is reported as an internal error `E900`.
pub fn diagnose(err: &(dyn std::error::Error + 'static)) -> Diagnostic {
    if let Some(e) = err.downcast_ref::<GraphConsistencyError>() {
        return graph(e);
    }
    if let Some(e) = err.downcast_ref::<AssembleError>() {
        return match e {
            AssembleError::Graph(g) => graph(g),
            AssembleError::Netlist(n) => netlist(n),
            AssembleError::MissingInterface { task } => {
                Diagnostic::error(DiagnosticCode::error(113), e.to_string())
                    .with_subject(Subject::new(SubjectKind::Task, task))
                    .with_help("run `conflux synth` so every leaf has an interface")
            }
        };
    }
    if let Some(e) = err.downcast_ref::<NetlistError>() {
        return netlist(e);
    }
    if let Some(e) = err.downcast_ref::<ExternalToolError>() {
        return tool(e);
    }
    if let Some(e) = err.downcast_ref::<ConfigError>() {
        let number = match e {
            ConfigError::IoError(_) => 300,
            ConfigError::ParseError(_) => 301,
            ConfigError::MissingField(_) => 302,
            ConfigError::ValidationError(_) => 303,
        };
        return Diagnostic::error(DiagnosticCode::error(number), e.to_string());
    }
    if let Some(e) = err.downcast_ref::<CacheError>() {
        let d = Diagnostic::error(DiagnosticCode::error(e.code()), e.to_string());
        return match e {
            CacheError::Io { path, .. }
            | CacheError::MissingStage { path, .. }
            | CacheError::Decode { path, .. } => {
                d.with_subject(Subject::new(SubjectKind::File, path.display().to_string()))
            }
            CacheError::Serialization { .. } => d,
        };
    }
    Diagnostic::error(DiagnosticCode::error(900), err.to_string())
}

fn graph(e: &GraphConsistencyError) -> Diagnostic {
    use GraphConsistencyError as G;
    let s = |kind, name: &String| Subject::new(kind, name.clone());
    let subjects: Vec<Subject> = match e {
        G::Malformed { .. } => Vec::new(),
        G::UnknownTop { top } => vec![s(SubjectKind::Task, top)],
        G::UnknownTask { parent, task } => {
            vec![s(SubjectKind::Task, task), s(SubjectKind::Task, parent)]
        }
        G::CyclicTaskReference { task } | G::MalformedLeaf { task, .. } => {
            vec![s(SubjectKind::Task, task)]
        }
        G::DuplicatePort { task, port } => {
            vec![s(SubjectKind::Port, port), s(SubjectKind::Task, task)]
        }
        G::MissingChildPort { instance, port }
        | G::UnboundPort { instance, port }
        | G::CompiledWidthMismatch { instance, port, .. }
        | G::CategoryMismatch { instance, port, .. }
        | G::UnknownArgSource { instance, port, .. } => {
            vec![s(SubjectKind::Port, port), s(SubjectKind::Instance, instance)]
        }
        G::MalformedInterconnect {
            task, interconnect, ..
        } => vec![
            s(SubjectKind::Interconnect, interconnect),
            s(SubjectKind::Task, task),
        ],
        G::WidthMismatch { interconnect, .. } => vec![s(SubjectKind::Interconnect, interconnect)],
        G::UnsupportedSharing { arg, .. } => vec![s(SubjectKind::Port, arg)],
        G::MissingAssignment { instance } => vec![s(SubjectKind::Instance, instance)],
        G::DuplicateAssignment {
            instance,
            first,
            second,
        } => vec![
            s(SubjectKind::Instance, instance),
            s(SubjectKind::Region, first),
            s(SubjectKind::Region, second),
        ],
        G::UnknownAssignedInstance { instance, region } | G::UnknownRegion { instance, region } => {
            vec![s(SubjectKind::Instance, instance), s(SubjectKind::Region, region)]
        }
        G::UnreachableRegionPair {
            from,
            to,
            interconnect,
        } => vec![
            Subject::new(SubjectKind::Region, format!("{from} -> {to}")),
            s(SubjectKind::Interconnect, interconnect),
        ],
        G::ColocationViolated {
            instance, anchor, ..
        } => vec![
            s(SubjectKind::Instance, instance),
            s(SubjectKind::Instance, anchor),
        ],
    };
    let mut d = Diagnostic::error(DiagnosticCode::error(e.code()), e.to_string());
    for subject in subjects {
        d = d.with_subject(subject);
    }
    if e.code() >= 120 {
        d = d.with_help("fix the region assignment or solve the floorplan again");
    }
    d
}

fn netlist(e: &NetlistError) -> Diagnostic {
    let NetlistError::Duplicate { module, .. } = e;
    Diagnostic::error(DiagnosticCode::error(114), e.to_string())
        .with_subject(Subject::new(SubjectKind::Task, module))
}

fn tool(e: &ExternalToolError) -> Diagnostic {
    let mut d = Diagnostic::error(DiagnosticCode::error(e.code()), e.to_string());
    match e {
        ExternalToolError::Launch { tool, task, .. }
        | ExternalToolError::BadOutput { tool, task, .. } => {
            d = d
                .with_subject(Subject::new(SubjectKind::Tool, tool))
                .with_subject(Subject::new(SubjectKind::Task, task));
        }
        ExternalToolError::Failed {
            tool, task, output, ..
        } => {
            // the tool's output goes into notes, one line each
            d.message = format!("`{tool}` failed for `{task}`");
            d = d
                .with_subject(Subject::new(SubjectKind::Tool, tool))
                .with_subject(Subject::new(SubjectKind::Task, task));
            for line in output.lines().filter(|l| !l.trim().is_empty()) {
                d = d.with_note(line);
            }
        }
        ExternalToolError::MissingReport { task } => {
            d = d.with_subject(Subject::new(SubjectKind::Task, task));
        }
        ExternalToolError::Pool { .. } => {}
    }
    d
}

//! Printing the controllers into a module through [`ModuleEditor`].

use crate::model::done_delay;
use crate::state::{InstanceGuard, InstanceState, TaskState};
use conflux_common::bit_length;
use conflux_netlist::{
    Assignment, BinaryOp, CaseArm, Expr, ModuleEditor, NetlistError, Pipeline, Port, Process,
    Signal, Statement,
};
use tracing::debug;

/// Clock port.
pub const CLK: &str = "ap_clk";
/// Active-low reset port.
pub const RST_N: &str = "ap_rst_n";
/// Start port.
pub const START: &str = "ap_start";
/// Done port.
pub const DONE: &str = "ap_done";
/// Idle port.
pub const IDLE: &str = "ap_idle";
/// Ready port.
pub const READY: &str = "ap_ready";

/// State register of a task's own machine.
pub const FSM_STATE: &str = "fsm_state";
/// Drain countdown register of a task's own machine.
pub const COUNTDOWN: &str = "fsm_countdown";

/// Names of the handshake nets created for one child instance.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ControllerSignals {
    /// Delayed reset, connected to the child's `ap_rst_n`.
    pub reset: String,
    /// Connected to the child's `ap_start`.
    pub start: String,
    /// Connected to the child's `ap_done`.
    pub done: String,
    /// Connected to the child's `ap_idle`.
    pub idle: String,
    /// Connected to the child's `ap_ready`.
    pub ready: String,
    /// Completion flag for the parent's AND; `None` for autorun children.
    pub is_done: Option<String>,
}

/// Names of the nets created by [`emit_task_fsm`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TaskFsmSignals {
    /// High for the one cycle the machine spends in `FINISHING`; children's
    /// global-done pipelines start here.
    pub finishing: String,
}

fn state_const(code: u64) -> Expr {
    Expr::constant(2, code)
}

fn done_head() -> String {
    Pipeline::new(DONE, 0, 1).head()
}

/// Emits the start and reset pipelines and, for controlled children, the
/// four-state controller of `instance`.
///
/// Every pipeline uses `level` registers, so the child sees `ap_start`
/// exactly `level` cycles after the parent does.
pub fn emit_instance_controller(
    editor: &mut impl ModuleEditor,
    instance: &str,
    level: u32,
    autorun: bool,
) -> Result<ControllerSignals, NetlistError> {
    let reset_q = Pipeline::new(format!("{instance}__{RST_N}"), level, 1);
    reset_q.emit(editor, Expr::ident(RST_N), CLK)?;
    let start_q = Pipeline::new(format!("{instance}__{START}_global"), level, 1);
    start_q.emit(editor, Expr::ident(START), CLK)?;

    let is_done = format!("{instance}__is_done");
    let signals = ControllerSignals {
        reset: reset_q.tail(),
        start: format!("{instance}__{START}"),
        done: format!("{instance}__{DONE}"),
        idle: format!("{instance}__{IDLE}"),
        ready: format!("{instance}__{READY}"),
        is_done: (!autorun).then(|| is_done.clone()),
    };
    for name in [&signals.done, &signals.idle, &signals.ready] {
        editor.add_signal(Signal::wire(name.clone(), 1))?;
    }
    let in_reset = Expr::ident(reset_q.tail()).not();

    if autorun {
        debug!(instance, level, "autorun start latch");
        editor.add_signal(Signal::reg(signals.start.clone(), 1))?;
        editor.add_process(Process::posedge(
            CLK,
            vec![Statement::If {
                condition: in_reset,
                then_body: vec![Statement::assign(signals.start.clone(), Expr::low())],
                else_body: vec![Statement::when(
                    Expr::ident(start_q.tail()),
                    vec![Statement::assign(signals.start.clone(), Expr::high())],
                )],
            }],
        ));
        return Ok(signals);
    }

    debug!(instance, level, "instance controller");
    let done_q = Pipeline::new(format!("{instance}__{DONE}_global"), level, 1);
    done_q.emit(editor, Expr::ident(done_head()), CLK)?;

    let state = format!("{instance}__state");
    editor.add_signal(Signal::reg(state.clone(), 2))?;
    editor.add_signal(Signal::wire(signals.start.clone(), 1))?;
    editor.add_signal(Signal::wire(is_done.clone(), 1))?;
    let in_state = |s: InstanceState| Expr::ident(state.clone()).equals(state_const(s.code()));
    editor.add_assignment(Assignment::new(
        signals.start.clone(),
        in_state(InstanceState::Running),
    ));
    editor.add_assignment(Assignment::new(
        is_done,
        in_state(InstanceState::DoneLatched),
    ));

    let ready = || Expr::ident(signals.ready.clone());
    let done = || Expr::ident(signals.done.clone());
    let guard = |g: InstanceGuard| match g {
        InstanceGuard::GlobalStart => Expr::ident(start_q.tail()),
        InstanceGuard::ReadyAndDone => ready().and(done()),
        InstanceGuard::ReadyNotDone => ready().and(done().not()),
        InstanceGuard::Done => done(),
        InstanceGuard::GlobalDone => Expr::ident(done_q.tail()),
    };

    let arms = InstanceState::ALL
        .into_iter()
        .map(|from| {
            // Later edges nest in the else branch of earlier ones.
            let body = from
                .edges()
                .iter()
                .rev()
                .fold(Vec::new(), |else_body, &(g, to)| {
                    vec![Statement::If {
                        condition: guard(g),
                        then_body: vec![Statement::assign(state.clone(), state_const(to.code()))],
                        else_body,
                    }]
                });
            CaseArm {
                pattern: state_const(from.code()),
                body,
            }
        })
        .collect();

    editor.add_process(Process::posedge(
        CLK,
        vec![Statement::If {
            condition: in_reset,
            then_body: vec![Statement::assign(
                state.clone(),
                state_const(InstanceState::RESET.code()),
            )],
            else_body: vec![Statement::Case {
                subject: Expr::ident(state),
                arms,
                default: Vec::new(),
            }],
        }],
    ));
    Ok(signals)
}

/// Emits a task's own machine, driving its handshake ports from the AND of
/// `is_done` (every controlled child's completion flag).
pub fn emit_task_fsm(
    editor: &mut impl ModuleEditor,
    level: u32,
    is_done: &[String],
) -> Result<TaskFsmSignals, NetlistError> {
    for port in [
        Port::input(CLK, 1),
        Port::input(RST_N, 1),
        Port::input(START, 1),
        Port::output(DONE, 1),
        Port::output(IDLE, 1),
        Port::output(READY, 1),
    ] {
        editor.ensure_port(port)?;
    }

    let countdown_width = bit_length(u64::from(level.saturating_sub(1))).max(1);
    editor.add_signal(Signal::reg(FSM_STATE, 2))?;
    editor.add_signal(Signal::reg(COUNTDOWN, countdown_width))?;
    debug!(
        module = editor.module_name(),
        level,
        children = is_done.len(),
        "task fsm"
    );

    let in_state = |s: TaskState| Expr::ident(FSM_STATE).equals(state_const(s.code()));
    let set_state = |s: TaskState| Statement::assign(FSM_STATE, state_const(s.code()));
    let countdown = |v: u32| Expr::constant(countdown_width, u64::from(v));

    let done_q = Pipeline::new(DONE, done_delay(level), 1);
    done_q.emit(editor, in_state(TaskState::Finishing), CLK)?;
    editor.add_assignment(Assignment::new(IDLE, in_state(TaskState::Idle)));
    editor.add_assignment(Assignment::new(READY, Expr::ident(done_q.head())));
    editor.add_assignment(Assignment::new(DONE, Expr::ident(done_q.tail())));

    let finish = if is_done.is_empty() {
        vec![set_state(TaskState::Finishing)]
    } else {
        vec![Statement::when(
            Expr::all(is_done.iter().map(|s| Expr::ident(s.clone()))),
            vec![set_state(TaskState::Finishing)],
        )]
    };
    let after_finishing = TaskState::Finishing.next(Default::default(), level);
    let arms = vec![
        CaseArm {
            pattern: state_const(TaskState::Idle.code()),
            body: vec![Statement::when(
                Expr::ident(START),
                vec![set_state(TaskState::Running)],
            )],
        },
        CaseArm {
            pattern: state_const(TaskState::Running.code()),
            body: finish,
        },
        CaseArm {
            pattern: state_const(TaskState::Finishing.code()),
            body: vec![
                set_state(after_finishing),
                Statement::assign(
                    COUNTDOWN,
                    countdown(TaskState::countdown_reload(level)),
                ),
            ],
        },
        CaseArm {
            pattern: state_const(TaskState::Drain.code()),
            body: vec![Statement::If {
                condition: Expr::ident(COUNTDOWN).equals(countdown(0)),
                then_body: vec![set_state(TaskState::Idle)],
                else_body: vec![Statement::assign(
                    COUNTDOWN,
                    Expr::binary(BinaryOp::Sub, Expr::ident(COUNTDOWN), countdown(1)),
                )],
            }],
        },
    ];

    editor.add_process(Process::posedge(
        CLK,
        vec![Statement::If {
            condition: Expr::ident(RST_N).not(),
            then_body: vec![set_state(TaskState::Idle), Statement::assign(COUNTDOWN, countdown(0))],
            else_body: vec![Statement::Case {
                subject: Expr::ident(FSM_STATE),
                arms,
                default: Vec::new(),
            }],
        }],
    ));

    Ok(TaskFsmSignals {
        finishing: done_q.head(),
    })
}

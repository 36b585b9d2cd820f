//! Closed state sets and their transition tables.

use serde::{Deserialize, Serialize};
use std::fmt;

/// State of one child instance's controller.
///
/// The two-bit encodings are fixed: they appear in emitted hardware and in
/// waveforms, so they never change with declaration order.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum InstanceState {
    /// `00`: waiting for the delayed global start.
    WaitStart,
    /// `01`: child running, `ap_start` held high.
    Running,
    /// `11`: child accepted its inputs, waiting for `ap_done`.
    WaitDone,
    /// `10`: child finished, `is_done` held until the parent's global done.
    DoneLatched,
}

/// A condition on [`InstanceInputs`] guarding one transition.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum InstanceGuard {
    /// The delayed global start is high.
    GlobalStart,
    /// The child is ready and done in the same cycle.
    ReadyAndDone,
    /// The child is ready but not yet done.
    ReadyNotDone,
    /// The child is done.
    Done,
    /// The parent's delayed global done is high.
    GlobalDone,
}

/// Signals sampled by an instance controller in one cycle.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct InstanceInputs {
    /// Delayed global start from the parent.
    pub global_start: bool,
    /// The child's `ap_ready`.
    pub ready: bool,
    /// The child's `ap_done`.
    pub done: bool,
    /// Delayed global done from the parent.
    pub global_done: bool,
}

impl InstanceGuard {
    /// Whether the guard holds for `inputs`.
    pub fn holds(self, inputs: InstanceInputs) -> bool {
        match self {
            InstanceGuard::GlobalStart => inputs.global_start,
            InstanceGuard::ReadyAndDone => inputs.ready && inputs.done,
            InstanceGuard::ReadyNotDone => inputs.ready && !inputs.done,
            InstanceGuard::Done => inputs.done,
            InstanceGuard::GlobalDone => inputs.global_done,
        }
    }
}

impl InstanceState {
    /// Every state, in visiting order.
    pub const ALL: [InstanceState; 4] = [
        InstanceState::WaitStart,
        InstanceState::Running,
        InstanceState::WaitDone,
        InstanceState::DoneLatched,
    ];

    /// The state entered on reset.
    pub const RESET: InstanceState = InstanceState::WaitStart;

    /// Two-bit hardware encoding.
    pub fn code(self) -> u64 {
        match self {
            InstanceState::WaitStart => 0b00,
            InstanceState::Running => 0b01,
            InstanceState::WaitDone => 0b11,
            InstanceState::DoneLatched => 0b10,
        }
    }

    /// Decodes a two-bit encoding.
    pub fn from_code(code: u64) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.code() == code)
    }

    /// Outgoing transitions in priority order; no match means stay.
    pub fn edges(self) -> &'static [(InstanceGuard, InstanceState)] {
        match self {
            InstanceState::WaitStart => &[(InstanceGuard::GlobalStart, InstanceState::Running)],
            InstanceState::Running => &[
                (InstanceGuard::ReadyAndDone, InstanceState::DoneLatched),
                (InstanceGuard::ReadyNotDone, InstanceState::WaitDone),
            ],
            InstanceState::WaitDone => &[(InstanceGuard::Done, InstanceState::DoneLatched)],
            InstanceState::DoneLatched => {
                &[(InstanceGuard::GlobalDone, InstanceState::WaitStart)]
            }
        }
    }

    /// The state after one clock edge with `inputs` sampled.
    pub fn next(self, inputs: InstanceInputs) -> Self {
        self.edges()
            .iter()
            .find(|(guard, _)| guard.holds(inputs))
            .map_or(self, |&(_, to)| to)
    }

    /// `ap_start` driven to the child.
    pub fn start(self) -> bool {
        self == InstanceState::Running
    }

    /// Completion flag fed to the parent's AND.
    pub fn is_done(self) -> bool {
        self == InstanceState::DoneLatched
    }
}

impl fmt::Display for InstanceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            InstanceState::WaitStart => "WAIT_START",
            InstanceState::Running => "RUNNING",
            InstanceState::WaitDone => "WAIT_DONE",
            InstanceState::DoneLatched => "DONE_LATCHED",
        };
        f.write_str(s)
    }
}

/// State of an upper task's own boundary machine.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum TaskState {
    /// `00`: `ap_idle` high, waiting for `ap_start`.
    Idle,
    /// `01`: children running.
    Running,
    /// `10`: every child done; loads the drain countdown.
    Finishing,
    /// `11`: counting down before accepting the next start.
    Drain,
}

/// Signals sampled by a task machine in one cycle.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct TaskInputs {
    /// The task's own `ap_start`.
    pub start: bool,
    /// AND of every non-autorun child's `is_done`; true with no children.
    pub all_done: bool,
    /// The drain countdown register is zero.
    pub countdown_zero: bool,
}

impl TaskState {
    /// Every state, in visiting order.
    pub const ALL: [TaskState; 4] = [
        TaskState::Idle,
        TaskState::Running,
        TaskState::Finishing,
        TaskState::Drain,
    ];

    /// Two-bit hardware encoding.
    pub fn code(self) -> u64 {
        match self {
            TaskState::Idle => 0b00,
            TaskState::Running => 0b01,
            TaskState::Finishing => 0b10,
            TaskState::Drain => 0b11,
        }
    }

    /// Decodes a two-bit encoding.
    pub fn from_code(code: u64) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.code() == code)
    }

    /// The state after one clock edge under register level `level`.
    pub fn next(self, inputs: TaskInputs, level: u32) -> Self {
        match self {
            TaskState::Idle if inputs.start => TaskState::Running,
            TaskState::Idle => TaskState::Idle,
            TaskState::Running if inputs.all_done => TaskState::Finishing,
            TaskState::Running => TaskState::Running,
            TaskState::Finishing if level == 0 => TaskState::Idle,
            TaskState::Finishing => TaskState::Drain,
            TaskState::Drain if inputs.countdown_zero => TaskState::Idle,
            TaskState::Drain => TaskState::Drain,
        }
    }

    /// Value loaded into the countdown on leaving [`TaskState::Finishing`].
    pub fn countdown_reload(level: u32) -> u32 {
        level.saturating_sub(1)
    }

    /// `ap_idle`.
    pub fn idle(self) -> bool {
        self == TaskState::Idle
    }
}

impl fmt::Display for TaskState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TaskState::Idle => "IDLE",
            TaskState::Running => "RUNNING",
            TaskState::Finishing => "FINISHING",
            TaskState::Drain => "DRAIN",
        };
        f.write_str(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn every_input() -> Vec<InstanceInputs> {
        (0u8..16)
            .map(|bits| InstanceInputs {
                global_start: bits & 1 != 0,
                ready: bits & 2 != 0,
                done: bits & 4 != 0,
                global_done: bits & 8 != 0,
            })
            .collect()
    }

    #[test]
    fn encodings_are_distinct_two_bit_codes() {
        for state in InstanceState::ALL {
            assert!(state.code() < 4);
            assert_eq!(InstanceState::from_code(state.code()), Some(state));
        }
        for state in TaskState::ALL {
            assert_eq!(TaskState::from_code(state.code()), Some(state));
        }
        assert_eq!(InstanceState::DoneLatched.code(), 0b10);
        assert_eq!(InstanceState::WaitDone.code(), 0b11);
        assert_eq!(InstanceState::from_code(4), None);
    }

    #[test]
    fn instance_transition_table() {
        for inputs in every_input() {
            let expect_wait_start = if inputs.global_start {
                InstanceState::Running
            } else {
                InstanceState::WaitStart
            };
            assert_eq!(InstanceState::WaitStart.next(inputs), expect_wait_start);

            let expect_running = match (inputs.ready, inputs.done) {
                (true, true) => InstanceState::DoneLatched,
                (true, false) => InstanceState::WaitDone,
                (false, _) => InstanceState::Running,
            };
            assert_eq!(InstanceState::Running.next(inputs), expect_running);

            let expect_wait_done = if inputs.done {
                InstanceState::DoneLatched
            } else {
                InstanceState::WaitDone
            };
            assert_eq!(InstanceState::WaitDone.next(inputs), expect_wait_done);

            let expect_latched = if inputs.global_done {
                InstanceState::WaitStart
            } else {
                InstanceState::DoneLatched
            };
            assert_eq!(InstanceState::DoneLatched.next(inputs), expect_latched);
        }
    }

    #[test]
    fn instance_outputs() {
        let starts: Vec<bool> = InstanceState::ALL.iter().map(|s| s.start()).collect();
        let dones: Vec<bool> = InstanceState::ALL.iter().map(|s| s.is_done()).collect();
        assert_eq!(starts, [false, true, false, false]);
        assert_eq!(dones, [false, false, false, true]);
    }

    #[test]
    fn task_transition_table() {
        for bits in 0u8..8 {
            let inputs = TaskInputs {
                start: bits & 1 != 0,
                all_done: bits & 2 != 0,
                countdown_zero: bits & 4 != 0,
            };
            for level in [0, 1, 3] {
                let idle = TaskState::Idle.next(inputs, level);
                assert_eq!(idle == TaskState::Running, inputs.start);
                let running = TaskState::Running.next(inputs, level);
                assert_eq!(running == TaskState::Finishing, inputs.all_done);
                let finishing = TaskState::Finishing.next(inputs, level);
                let expected = if level == 0 {
                    TaskState::Idle
                } else {
                    TaskState::Drain
                };
                assert_eq!(finishing, expected);
                let drain = TaskState::Drain.next(inputs, level);
                assert_eq!(drain == TaskState::Idle, inputs.countdown_zero);
            }
        }
    }

    #[test]
    fn countdown_reload_saturates() {
        assert_eq!(TaskState::countdown_reload(0), 0);
        assert_eq!(TaskState::countdown_reload(1), 0);
        assert_eq!(TaskState::countdown_reload(4), 3);
    }
}

//! Cycle-accurate behavioral models of the emitted controllers.
//!
//! Each `step` call is one clock cycle: it returns the outputs visible during
//! that cycle (a function of the registers before the edge) and then applies
//! the rising edge. The models mirror [`crate::emit`] register for register,
//! so protocol timing can be checked without a Verilog simulator.

use crate::state::{InstanceInputs, InstanceState, TaskInputs, TaskState};

/// A chain of `level` registers; the model of a netlist `Pipeline`.
#[derive(Clone, Debug)]
pub struct DelayLine {
    regs: Vec<bool>,
}

impl DelayLine {
    /// A cleared chain of `level` registers.
    pub fn new(level: u32) -> Self {
        Self {
            regs: vec![false; level as usize],
        }
    }

    /// Number of register stages.
    pub fn level(&self) -> u32 {
        self.regs.len() as u32
    }

    /// Returns the tail for this cycle, then shifts `input` in.
    pub fn step(&mut self, input: bool) -> bool {
        match self.regs.last().copied() {
            None => input,
            Some(tail) => {
                self.regs.rotate_right(1);
                self.regs[0] = input;
                tail
            }
        }
    }
}

/// Model of one child instance's controller.
#[derive(Clone, Debug)]
pub struct InstanceController {
    state: InstanceState,
}

impl Default for InstanceController {
    fn default() -> Self {
        Self::new()
    }
}

impl InstanceController {
    /// A controller in its reset state.
    pub fn new() -> Self {
        Self {
            state: InstanceState::RESET,
        }
    }

    /// Current state.
    pub fn state(&self) -> InstanceState {
        self.state
    }

    /// Synchronous reset.
    pub fn reset(&mut self) {
        self.state = InstanceState::RESET;
    }

    /// One cycle; returns the state visible during it.
    pub fn step(&mut self, inputs: InstanceInputs) -> InstanceState {
        let current = self.state;
        self.state = current.next(inputs);
        current
    }
}

/// Boundary outputs of a task during one cycle.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct TaskOutputs {
    /// State register value.
    pub state: TaskState,
    /// `ap_idle`.
    pub idle: bool,
    /// `ap_ready`: one cycle, on entry to [`TaskState::Finishing`].
    pub ready: bool,
    /// `ap_done`: `ready` delayed so that it lands `level` cycles after the
    /// children's AND.
    pub done: bool,
}

/// Model of an upper task's own machine.
#[derive(Clone, Debug)]
pub struct GlobalFsm {
    level: u32,
    state: TaskState,
    countdown: u32,
    done_line: DelayLine,
}

impl GlobalFsm {
    /// A machine for register level `level`, in its reset state.
    pub fn new(level: u32) -> Self {
        Self {
            level,
            state: TaskState::Idle,
            countdown: 0,
            done_line: DelayLine::new(done_delay(level)),
        }
    }

    /// Current state.
    pub fn state(&self) -> TaskState {
        self.state
    }

    /// Current countdown register.
    pub fn countdown(&self) -> u32 {
        self.countdown
    }

    /// One cycle with the undelayed `start` and the children's AND.
    pub fn step(&mut self, start: bool, all_done: bool) -> TaskOutputs {
        let current = self.state;
        let ready = current == TaskState::Finishing;
        let outputs = TaskOutputs {
            state: current,
            idle: current.idle(),
            ready,
            done: self.done_line.step(ready),
        };

        let inputs = TaskInputs {
            start,
            all_done,
            countdown_zero: self.countdown == 0,
        };
        match current {
            TaskState::Finishing => self.countdown = TaskState::countdown_reload(self.level),
            TaskState::Drain if self.countdown > 0 => self.countdown -= 1,
            _ => {}
        }
        self.state = current.next(inputs, self.level);
        outputs
    }
}

/// Registers between `state == FINISHING` and `ap_done`.
///
/// The state register itself is the first of the `level` stages.
pub(crate) fn done_delay(level: u32) -> u32 {
    level.saturating_sub(1)
}

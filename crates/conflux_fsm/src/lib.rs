//! Handshake controllers for task instances and upper tasks.
//!
//! Every non-autorun child instance gets a four-state [`InstanceState`]
//! controller that bridges the child's own `ap_done`/`ap_ready` pulses with
//! the parent's fixed-latency global start and done. Every upper task gets a
//! [`TaskState`] machine that drives its boundary from the AND of its
//! children's `is_done`, delaying `ap_done` by the register level `L` so that
//! start and done see the same latency at every nesting depth.
//!
//! The transition tables are the single source of truth: the cycle models in
//! [`model`] step them directly and [`emit`] prints them as clocked processes.

#![warn(missing_docs)]

pub mod emit;
pub mod model;
pub mod state;

pub use emit::{
    emit_instance_controller, emit_task_fsm, ControllerSignals, TaskFsmSignals, CLK, COUNTDOWN,
    DONE, FSM_STATE, IDLE, READY, RST_N, START,
};
pub use model::{DelayLine, GlobalFsm, InstanceController, TaskOutputs};
pub use state::{InstanceGuard, InstanceInputs, InstanceState, TaskInputs, TaskState};

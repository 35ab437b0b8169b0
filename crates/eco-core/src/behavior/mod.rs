//! Two-Level Behavior Scheduler
//!
//! A [`Machine`] owns priority-ordered [`State`]s; each state owns an
//! ordered sequence of tasks. Every tick the machine picks the first
//! state whose entry guard passes (unless the current one refuses
//! interruption) and advances that state's single current task. Task
//! results bubble up: success advances the sequence, failure or
//! cancellation restarts it from the first runnable task.

pub mod machine;
pub mod state;
pub mod states;
pub mod target;
pub mod task;
pub mod tasks;

#[cfg(test)]
pub(crate) mod testing;

pub use machine::Machine;
pub use state::{AlwaysEligible, State, StateSpec};
pub use states::{
    chase_state, default_machine, flee_state, reproduce_state, sleep_state, wander_state,
    FLEE_SAFETY_RADIUS, FLEE_TRIGGER_RADIUS,
};
pub use target::{LocationSlot, TargetSlot};
pub use task::{BehaviorCtx, Task, TaskCtx, TaskResult, TaskSlot};

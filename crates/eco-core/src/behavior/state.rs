//! States
//!
//! A state is a named, ordered sequence of tasks plus the guard predicates
//! the machine consults during selection. Task order is execution order;
//! the sequence loops back to its first runnable task when it runs off the
//! end or fails.

use super::task::{BehaviorCtx, Task, TaskResult, TaskSlot};

/// Per-state guards and lifecycle hooks.
///
/// Implementations hold whatever the guard needs (shared target slots,
/// radii); task bookkeeping stays in [`State`].
pub trait StateSpec {
    /// May this state become current? Evaluated by the machine on every
    /// selection pass.
    fn can_switch_to(&self, _ctx: &BehaviorCtx<'_>) -> bool {
        true
    }

    /// May the machine leave this state right now? `default` is the
    /// task-derived policy: true if no task is active, otherwise the
    /// current task's `can_switch_from_early`.
    fn can_switch_from(&self, _ctx: &BehaviorCtx<'_>, default: bool) -> bool {
        default
    }

    fn on_begin(&mut self, _ctx: &mut BehaviorCtx<'_>) {}

    fn on_update(&mut self, _ctx: &mut BehaviorCtx<'_>, _dt: f32) {}

    fn on_end(&mut self, _ctx: &mut BehaviorCtx<'_>) {}
}

/// Spec for states whose guards are all defaults.
pub struct AlwaysEligible;

impl StateSpec for AlwaysEligible {}

/// A named ordered sequence of tasks, driven by a machine.
pub struct State {
    name: &'static str,
    spec: Box<dyn StateSpec>,
    tasks: Vec<TaskSlot>,
    current: Option<usize>,
}

impl State {
    pub fn new(name: &'static str, spec: impl StateSpec + 'static) -> Self {
        Self {
            name,
            spec: Box::new(spec),
            tasks: Vec::new(),
            current: None,
        }
    }

    /// Appends a task; insertion order is execution order.
    pub fn with_task(mut self, task: impl Task + 'static) -> Self {
        self.tasks.push(TaskSlot::new(Box::new(task)));
        self
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn tasks(&self) -> &[TaskSlot] {
        &self.tasks
    }

    pub fn current_task_index(&self) -> Option<usize> {
        self.current
    }

    pub fn current_task(&self) -> Option<&TaskSlot> {
        self.current.map(|index| &self.tasks[index])
    }

    pub fn can_switch_to(&self, ctx: &BehaviorCtx<'_>) -> bool {
        self.spec.can_switch_to(ctx)
    }

    pub fn can_switch_from(&self, ctx: &BehaviorCtx<'_>) -> bool {
        let default = match self.current {
            None => true,
            Some(index) => self.tasks[index].can_switch_from_early(ctx),
        };
        self.spec.can_switch_from(ctx, default)
    }

    /// Ends the active task (if any), then restarts the task at `index`.
    /// Switching to the already-current index still performs the full
    /// end-then-begin cycle; this is a restart, not a no-op.
    pub fn switch_task(&mut self, ctx: &mut BehaviorCtx<'_>, index: usize) {
        assert!(
            index < self.tasks.len(),
            "state '{}' has no task at index {index}",
            self.name
        );
        self.deactivate_current(ctx);
        self.current = Some(index);
        self.tasks[index].begin(ctx);
    }

    /// Advances circularly from the current task, skipping ignorable
    /// tasks. When every task is ignorable (or there are none), the
    /// current task is invalidated and false is returned. The scan visits
    /// each task at most once.
    pub fn next_task(&mut self, ctx: &mut BehaviorCtx<'_>) -> bool {
        let len = self.tasks.len();
        if len > 0 {
            let start = self.current.map_or(0, |index| index + 1);
            for offset in 0..len {
                let index = (start + offset) % len;
                if self.tasks[index].can_ignore(ctx) {
                    continue;
                }
                self.switch_task(ctx, index);
                return true;
            }
        }
        self.deactivate_current(ctx);
        false
    }

    /// Invalidates the current task, then restarts the sequence from its
    /// first runnable task.
    pub fn reset_task(&mut self, ctx: &mut BehaviorCtx<'_>) -> bool {
        self.deactivate_current(ctx);
        self.next_task(ctx)
    }

    /// Ends and clears the active task, if any.
    fn deactivate_current(&mut self, ctx: &mut BehaviorCtx<'_>) {
        if let Some(index) = self.current.take() {
            self.tasks[index].end(ctx);
        }
    }

    /// Force-finishes an unfinished active task as Canceled and ends it.
    /// Returns the name and final result of the task that was active.
    pub(crate) fn cancel_current(
        &mut self,
        ctx: &mut BehaviorCtx<'_>,
    ) -> Option<(&'static str, TaskResult)> {
        let index = self.current.take()?;
        let slot = &mut self.tasks[index];
        slot.cancel(ctx);
        Some((slot.name(), slot.result()))
    }

    /// Updates the current task if it has not finished yet, and reports
    /// its result. A task that finished inside its own `on_begin` is
    /// skipped here so it never sees an `on_update` in the same tick.
    pub(crate) fn drive_current_task(
        &mut self,
        ctx: &mut BehaviorCtx<'_>,
        dt: f32,
    ) -> Option<TaskResult> {
        let index = self.current?;
        let slot = &mut self.tasks[index];
        if !slot.is_finished() {
            slot.update(ctx, dt);
        }
        Some(slot.result())
    }

    pub(crate) fn enter(&mut self, ctx: &mut BehaviorCtx<'_>) {
        self.spec.on_begin(ctx);
    }

    pub(crate) fn update(&mut self, ctx: &mut BehaviorCtx<'_>, dt: f32) {
        self.spec.on_update(ctx, dt);
    }

    pub(crate) fn exit(&mut self, ctx: &mut BehaviorCtx<'_>) {
        self.spec.on_end(ctx);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::behavior::testing::ProbeTask;
    use crate::data::PawnData;
    use crate::grid::GridPos;
    use crate::world::{PawnId, World};
    use std::sync::Arc;

    fn world_with_pawn() -> (World, PawnId) {
        let mut world = World::new(8, 8, 1);
        let id = world.spawn_pawn(Arc::new(PawnData::default()), GridPos::new(1, 1));
        (world, id)
    }

    #[test]
    fn test_next_task_runs_in_insertion_order() {
        let (mut world, id) = world_with_pawn();
        let mut ctx = BehaviorCtx::new(&mut world, id);
        let first = ProbeTask::new("first");
        let second = ProbeTask::new("second");
        let mut state = State::new("test", AlwaysEligible)
            .with_task(first.clone())
            .with_task(second.clone());

        assert!(state.next_task(&mut ctx));
        assert_eq!(state.current_task_index(), Some(0));
        assert!(state.next_task(&mut ctx));
        assert_eq!(state.current_task_index(), Some(1));
        // Wraps around.
        assert!(state.next_task(&mut ctx));
        assert_eq!(state.current_task_index(), Some(0));
        assert_eq!(first.counters().begins(), 2);
        assert_eq!(first.counters().ends(), 1);
    }

    #[test]
    fn test_next_task_skips_ignorable() {
        let (mut world, id) = world_with_pawn();
        let mut ctx = BehaviorCtx::new(&mut world, id);
        let skipped = ProbeTask::new("skipped").ignorable();
        let runnable = ProbeTask::new("runnable");
        let mut state = State::new("test", AlwaysEligible)
            .with_task(skipped.clone())
            .with_task(runnable.clone());

        assert!(state.next_task(&mut ctx));
        assert_eq!(state.current_task_index(), Some(1));
        assert_eq!(skipped.counters().begins(), 0);
    }

    #[test]
    fn test_all_ignorable_scan_terminates() {
        let (mut world, id) = world_with_pawn();

        // 0, 1 and N tasks, all ignorable.
        for count in [0usize, 1, 5] {
            let mut ctx = BehaviorCtx::new(&mut world, id);
            let mut state = State::new("test", AlwaysEligible);
            for _ in 0..count {
                state = state.with_task(ProbeTask::new("ignored").ignorable());
            }
            assert!(!state.next_task(&mut ctx));
            assert_eq!(state.current_task_index(), None);
            assert!(state.current_task().is_none());
        }
    }

    #[test]
    fn test_switch_task_to_same_index_restarts() {
        let (mut world, id) = world_with_pawn();
        let mut ctx = BehaviorCtx::new(&mut world, id);
        let probe = ProbeTask::new("probe");
        let mut state = State::new("test", AlwaysEligible).with_task(probe.clone());

        state.switch_task(&mut ctx, 0);
        state.switch_task(&mut ctx, 0);
        assert_eq!(probe.counters().begins(), 2);
        assert_eq!(probe.counters().ends(), 1);
    }

    #[test]
    fn test_reset_task_restarts_from_first_runnable() {
        let (mut world, id) = world_with_pawn();
        let mut ctx = BehaviorCtx::new(&mut world, id);
        let skipped = ProbeTask::new("skipped").ignorable();
        let first_runnable = ProbeTask::new("first_runnable");
        let tail = ProbeTask::new("tail");
        let mut state = State::new("test", AlwaysEligible)
            .with_task(skipped)
            .with_task(first_runnable)
            .with_task(tail.clone());

        state.switch_task(&mut ctx, 2);
        assert!(state.reset_task(&mut ctx));
        assert_eq!(state.current_task_index(), Some(1));
        assert_eq!(tail.counters().ends(), 1);
    }

    #[test]
    fn test_empty_state_is_interruptible() {
        let (mut world, id) = world_with_pawn();
        let mut ctx = BehaviorCtx::new(&mut world, id);
        let mut state = State::new("empty", AlwaysEligible);
        assert!(!state.reset_task(&mut ctx));
        assert!(state.can_switch_from(&ctx));
    }

    #[test]
    #[should_panic(expected = "no task at index")]
    fn test_switch_task_out_of_range_panics() {
        let (mut world, id) = world_with_pawn();
        let mut ctx = BehaviorCtx::new(&mut world, id);
        let mut state = State::new("test", AlwaysEligible);
        state.switch_task(&mut ctx, 0);
    }
}

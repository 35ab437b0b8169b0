//! Tasks
//!
//! The smallest unit of behavior. A task runs as the single current task
//! of the single current state of a machine; it reports back by finishing
//! with a terminal result, and the machine reacts once per tick.

use serde::{Deserialize, Serialize};

use crate::pawn::Pawn;
use crate::world::{PawnId, World};

/// Outcome of a task. `Pending` is the only non-terminal value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskResult {
    Pending,
    Succeeded,
    Failed,
    /// Produced only when the machine interrupts an unfinished task to
    /// switch state; sequenced like `Failed` but distinguishable in
    /// diagnostics.
    Canceled,
}

impl TaskResult {
    pub fn is_terminal(self) -> bool {
        self != TaskResult::Pending
    }

    pub fn label(self) -> &'static str {
        match self {
            TaskResult::Pending => "pending",
            TaskResult::Succeeded => "succeeded",
            TaskResult::Failed => "failed",
            TaskResult::Canceled => "canceled",
        }
    }
}

/// Everything a state or machine callback can reach: the world and a
/// validity-checked handle to the owning pawn.
pub struct BehaviorCtx<'a> {
    pub world: &'a mut World,
    owner: PawnId,
}

impl<'a> BehaviorCtx<'a> {
    pub fn new(world: &'a mut World, owner: PawnId) -> Self {
        Self { world, owner }
    }

    pub fn owner_id(&self) -> PawnId {
        self.owner
    }

    /// The owning pawn. The owner is guaranteed alive for the duration of
    /// its machine's tick and shutdown; anything else is a driver bug.
    pub fn owner(&self) -> &Pawn {
        self.world
            .pawn(self.owner)
            .expect("behavior callback without a live owner")
    }

    pub fn owner_mut(&mut self) -> &mut Pawn {
        self.world
            .pawn_mut(self.owner)
            .expect("behavior callback without a live owner")
    }
}

/// Task-callback context: world access plus the task's result cell.
pub struct TaskCtx<'a> {
    pub world: &'a mut World,
    owner: PawnId,
    result: &'a mut TaskResult,
}

impl<'a> TaskCtx<'a> {
    pub fn owner_id(&self) -> PawnId {
        self.owner
    }

    pub fn owner(&self) -> &Pawn {
        self.world
            .pawn(self.owner)
            .expect("behavior callback without a live owner")
    }

    pub fn owner_mut(&mut self) -> &mut Pawn {
        self.world
            .pawn_mut(self.owner)
            .expect("behavior callback without a live owner")
    }

    /// Sets the task's result exactly once. Calls made while the task is
    /// already finished are ignored, so a result set inside `on_begin`
    /// cannot be overridden later in the same run.
    pub fn finish(&mut self, result: TaskResult) {
        if *self.result == TaskResult::Pending && result.is_terminal() {
            *self.result = result;
        }
    }

    pub fn result(&self) -> TaskResult {
        *self.result
    }

    pub fn is_finished(&self) -> bool {
        self.result().is_terminal()
    }
}

/// A unit of sequential behavior within a state.
///
/// Callbacks fire only while the task is current; exactly one `on_end`
/// follows every `on_begin`.
pub trait Task {
    /// Stable name for diagnostics.
    fn name(&self) -> &'static str;

    fn on_begin(&mut self, _ctx: &mut TaskCtx<'_>) {}

    fn on_update(&mut self, _ctx: &mut TaskCtx<'_>, _dt: f32) {}

    fn on_end(&mut self, _ctx: &mut TaskCtx<'_>) {}

    /// May the machine leave this task before it finishes? Defaults to
    /// true; return false to forbid interruption (e.g. mid-stride).
    fn can_switch_from_early(&self, _ctx: &BehaviorCtx<'_>) -> bool {
        true
    }

    /// Should the sequencer skip this task entirely when searching for
    /// the next runnable task? Defaults to false.
    fn can_ignore(&self, _ctx: &BehaviorCtx<'_>) -> bool {
        false
    }
}

/// A task plus its result cell, owned by a state.
pub struct TaskSlot {
    task: Box<dyn Task>,
    result: TaskResult,
}

impl TaskSlot {
    pub(crate) fn new(task: Box<dyn Task>) -> Self {
        Self {
            task,
            result: TaskResult::Pending,
        }
    }

    pub fn name(&self) -> &'static str {
        self.task.name()
    }

    pub fn result(&self) -> TaskResult {
        self.result
    }

    pub fn is_finished(&self) -> bool {
        self.result.is_terminal()
    }

    pub(crate) fn can_ignore(&self, ctx: &BehaviorCtx<'_>) -> bool {
        self.task.can_ignore(ctx)
    }

    pub(crate) fn can_switch_from_early(&self, ctx: &BehaviorCtx<'_>) -> bool {
        self.task.can_switch_from_early(ctx)
    }

    /// Re-enters the task: result back to `Pending`, then `on_begin`.
    pub(crate) fn begin(&mut self, ctx: &mut BehaviorCtx<'_>) {
        self.result = TaskResult::Pending;
        let owner = ctx.owner_id();
        let Self { task, result } = self;
        let mut task_ctx = TaskCtx {
            world: &mut *ctx.world,
            owner,
            result,
        };
        task.on_begin(&mut task_ctx);
    }

    pub(crate) fn update(&mut self, ctx: &mut BehaviorCtx<'_>, dt: f32) {
        let owner = ctx.owner_id();
        let Self { task, result } = self;
        let mut task_ctx = TaskCtx {
            world: &mut *ctx.world,
            owner,
            result,
        };
        task.on_update(&mut task_ctx, dt);
    }

    pub(crate) fn end(&mut self, ctx: &mut BehaviorCtx<'_>) {
        let owner = ctx.owner_id();
        let Self { task, result } = self;
        let mut task_ctx = TaskCtx {
            world: &mut *ctx.world,
            owner,
            result,
        };
        task.on_end(&mut task_ctx);
    }

    /// Force-finishes an unfinished task as `Canceled`, then ends it.
    pub(crate) fn cancel(&mut self, ctx: &mut BehaviorCtx<'_>) {
        if !self.result.is_terminal() {
            self.result = TaskResult::Canceled;
        }
        self.end(ctx);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::PawnData;
    use crate::grid::GridPos;
    use std::sync::Arc;

    struct Stubborn;

    impl Task for Stubborn {
        fn name(&self) -> &'static str {
            "stubborn"
        }

        fn on_begin(&mut self, ctx: &mut TaskCtx<'_>) {
            ctx.finish(TaskResult::Failed);
            // Already finished; this must not override the first result.
            ctx.finish(TaskResult::Succeeded);
        }
    }

    fn world_with_pawn() -> (World, PawnId) {
        let mut world = World::new(8, 8, 1);
        let id = world.spawn_pawn(Arc::new(PawnData::default()), GridPos::new(1, 1));
        (world, id)
    }

    #[test]
    fn test_finish_is_write_once() {
        let (mut world, id) = world_with_pawn();
        let mut ctx = BehaviorCtx::new(&mut world, id);
        let mut slot = TaskSlot::new(Box::new(Stubborn));
        slot.begin(&mut ctx);
        assert_eq!(slot.result(), TaskResult::Failed);
    }

    #[test]
    fn test_begin_resets_result() {
        let (mut world, id) = world_with_pawn();
        let mut ctx = BehaviorCtx::new(&mut world, id);
        let mut slot = TaskSlot::new(Box::new(Stubborn));
        slot.begin(&mut ctx);
        assert!(slot.is_finished());
        slot.begin(&mut ctx);
        // Fresh run: on_begin fired again and set Failed again.
        assert_eq!(slot.result(), TaskResult::Failed);
    }

    #[test]
    fn test_cancel_only_marks_unfinished_tasks() {
        let (mut world, id) = world_with_pawn();
        let mut ctx = BehaviorCtx::new(&mut world, id);

        struct Inert;
        impl Task for Inert {
            fn name(&self) -> &'static str {
                "inert"
            }
        }

        let mut slot = TaskSlot::new(Box::new(Inert));
        slot.begin(&mut ctx);
        slot.cancel(&mut ctx);
        assert_eq!(slot.result(), TaskResult::Canceled);

        let mut finished = TaskSlot::new(Box::new(Stubborn));
        finished.begin(&mut ctx);
        finished.cancel(&mut ctx);
        assert_eq!(finished.result(), TaskResult::Failed);
    }

    #[test]
    fn test_finish_rejects_pending() {
        let (mut world, id) = world_with_pawn();
        let mut ctx = BehaviorCtx::new(&mut world, id);

        struct Undecided;
        impl Task for Undecided {
            fn name(&self) -> &'static str {
                "undecided"
            }

            fn on_update(&mut self, ctx: &mut TaskCtx<'_>, _dt: f32) {
                ctx.finish(TaskResult::Pending);
            }
        }

        let mut slot = TaskSlot::new(Box::new(Undecided));
        slot.begin(&mut ctx);
        slot.update(&mut ctx, 0.1);
        assert_eq!(slot.result(), TaskResult::Pending);
    }
}

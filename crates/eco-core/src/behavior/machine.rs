//! Behavior Machine
//!
//! Top-level scheduler bound to one pawn. Every tick it re-evaluates which
//! state should be current (first eligible wins, in insertion order) and
//! drives that state's current task. Selection is fully deterministic
//! given the guards; any randomness lives inside individual tasks.

use eco_events::EventKind;

use super::state::State;
use super::task::{BehaviorCtx, TaskResult};
use crate::world::{PawnId, World};

/// A two-level behavior scheduler: priority-ordered states, each running
/// its tasks in sequence.
pub struct Machine {
    owner: PawnId,
    states: Vec<State>,
    current: Option<usize>,
}

impl Machine {
    /// Creates a machine bound to its owning pawn. The binding is fixed
    /// for the machine's lifetime.
    pub fn new(owner: PawnId) -> Self {
        Self {
            owner,
            states: Vec::new(),
            current: None,
        }
    }

    /// Appends a state; insertion order is priority order.
    pub fn with_state(mut self, state: State) -> Self {
        self.states.push(state);
        self
    }

    pub fn owner(&self) -> PawnId {
        self.owner
    }

    pub fn states(&self) -> &[State] {
        &self.states
    }

    pub fn current_state(&self) -> Option<&State> {
        self.current.map(|index| &self.states[index])
    }

    pub fn current_state_name(&self) -> Option<&'static str> {
        self.current_state().map(State::name)
    }

    pub fn current_task_name(&self) -> Option<&'static str> {
        self.current_state()?.current_task().map(|task| task.name())
    }

    /// Drives the machine for one substep.
    ///
    /// At most one task across the machine receives `on_update` per call,
    /// and a task result is reacted to exactly once, after the drive.
    pub fn tick(&mut self, world: &mut World, dt: f32) {
        assert!(
            world.is_alive(self.owner),
            "behavior machine ticked without a live owner"
        );
        let mut ctx = BehaviorCtx::new(world, self.owner);

        // Keep the current state unconditionally while it refuses
        // interruption; otherwise take the first eligible state.
        let reevaluate = match self.current {
            None => true,
            Some(index) => self.states[index].can_switch_from(&ctx),
        };
        let next = if reevaluate {
            self.select(&ctx)
        } else {
            self.current
        };

        if next != self.current {
            self.transition(&mut ctx, next);
        }

        let Some(index) = self.current else {
            return;
        };

        if self.states[index].current_task().is_none() {
            self.states[index].reset_task(&mut ctx);
        }

        self.states[index].update(&mut ctx, dt);

        let Some(result) = self.states[index].drive_current_task(&mut ctx, dt) else {
            return;
        };
        match result {
            TaskResult::Pending => {}
            TaskResult::Succeeded => {
                self.report_task_result(&mut ctx, index);
                self.states[index].next_task(&mut ctx);
            }
            TaskResult::Failed | TaskResult::Canceled => {
                self.report_task_result(&mut ctx, index);
                self.states[index].reset_task(&mut ctx);
            }
        }
    }

    /// Cancels whatever is running and leaves the machine idle. Called
    /// when the owning pawn is removed, while the pawn is still
    /// observable, so every begun task and state gets its end callback.
    pub fn shutdown(&mut self, world: &mut World) {
        if self.current.is_none() {
            return;
        }
        let mut ctx = BehaviorCtx::new(world, self.owner);
        self.transition(&mut ctx, None);
    }

    fn select(&self, ctx: &BehaviorCtx<'_>) -> Option<usize> {
        self.states.iter().position(|state| state.can_switch_to(ctx))
    }

    fn transition(&mut self, ctx: &mut BehaviorCtx<'_>, next: Option<usize>) {
        if let Some(index) = next {
            assert!(index < self.states.len(), "no behavior state at index {index}");
        }

        if let Some(index) = self.current {
            let owner = ctx.owner().name().to_string();
            let state = &mut self.states[index];
            if let Some((task, result)) = state.cancel_current(ctx) {
                ctx.world.push_event(
                    owner.clone(),
                    EventKind::TaskFinished {
                        state: state.name().to_string(),
                        task: task.to_string(),
                        result: result.label().to_string(),
                    },
                );
            }
            state.exit(ctx);
            tracing::trace!(pawn = %owner, state = state.name(), "state left");
            ctx.world.push_event(
                owner,
                EventKind::StateLeft {
                    state: state.name().to_string(),
                },
            );
        }

        self.current = next;

        if let Some(index) = self.current {
            let owner = ctx.owner().name().to_string();
            let state = &mut self.states[index];
            tracing::trace!(pawn = %owner, state = state.name(), "state entered");
            ctx.world.push_event(
                owner,
                EventKind::StateEntered {
                    state: state.name().to_string(),
                },
            );
            state.enter(ctx);
        }
    }

    fn report_task_result(&self, ctx: &mut BehaviorCtx<'_>, index: usize) {
        let state = &self.states[index];
        let Some(slot) = state.current_task() else {
            return;
        };
        let owner = ctx.owner().name().to_string();
        ctx.world.push_event(
            owner,
            EventKind::TaskFinished {
                state: state.name().to_string(),
                task: slot.name().to_string(),
                result: slot.result().label().to_string(),
            },
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::behavior::state::{AlwaysEligible, State};
    use crate::behavior::testing::{ProbeFlag, ProbeSpec, ProbeTask};
    use crate::data::PawnData;
    use crate::grid::GridPos;
    use std::sync::Arc;

    fn world_with_pawn() -> (World, PawnId) {
        let mut world = World::new(8, 8, 1);
        let id = world.spawn_pawn(Arc::new(PawnData::default()), GridPos::new(1, 1));
        (world, id)
    }

    #[test]
    fn test_priority_selection_is_deterministic() {
        let (mut world, id) = world_with_pawn();
        let mut machine = Machine::new(id)
            .with_state(State::new("a", ProbeSpec::new(ProbeFlag::new(false))))
            .with_state(State::new("b", ProbeSpec::new(ProbeFlag::new(true))))
            .with_state(State::new("c", ProbeSpec::new(ProbeFlag::new(true))));

        for _ in 0..5 {
            machine.tick(&mut world, 0.1);
            assert_eq!(machine.current_state_name(), Some("b"));
        }
    }

    #[test]
    fn test_no_eligible_state_idles() {
        let (mut world, id) = world_with_pawn();
        let mut machine =
            Machine::new(id).with_state(State::new("a", ProbeSpec::new(ProbeFlag::new(false))));
        machine.tick(&mut world, 0.1);
        assert_eq!(machine.current_state_name(), None);
    }

    #[test]
    fn test_at_most_one_task_update_per_tick() {
        let (mut world, id) = world_with_pawn();
        let first = ProbeTask::new("first");
        let second = ProbeTask::new("second");
        let mut machine = Machine::new(id).with_state(
            State::new("busy", AlwaysEligible)
                .with_task(first.clone())
                .with_task(second.clone()),
        );

        for tick in 1..=4u32 {
            machine.tick(&mut world, 0.1);
            assert_eq!(first.counters().updates() + second.counters().updates(), tick);
        }
        // The pending first task never advanced, so the second never ran.
        assert_eq!(second.counters().updates(), 0);
    }

    #[test]
    fn test_task_finishing_in_begin_gets_no_update() {
        let (mut world, id) = world_with_pawn();
        let eager = ProbeTask::new("eager").finishes_on_begin(TaskResult::Succeeded);
        let follower = ProbeTask::new("follower");
        let mut machine = Machine::new(id).with_state(
            State::new("busy", AlwaysEligible)
                .with_task(eager.clone())
                .with_task(follower.clone()),
        );

        machine.tick(&mut world, 0.1);
        assert_eq!(eager.counters().begins(), 1);
        assert_eq!(eager.counters().updates(), 0);
        // Reaction ran in the same tick: the follower became current.
        assert_eq!(machine.current_task_name(), Some("follower"));
        // But it was only begun, not updated.
        assert_eq!(follower.counters().updates(), 0);
    }

    #[test]
    fn test_success_advances_to_next_task() {
        let (mut world, id) = world_with_pawn();
        let first = ProbeTask::new("first").finishes_after(1, TaskResult::Succeeded);
        let second = ProbeTask::new("second");
        let mut machine = Machine::new(id).with_state(
            State::new("busy", AlwaysEligible)
                .with_task(first.clone())
                .with_task(second.clone()),
        );

        machine.tick(&mut world, 0.1);
        assert_eq!(machine.current_task_name(), Some("second"));
        machine.tick(&mut world, 0.1);
        assert_eq!(second.counters().updates(), 1);
    }

    #[test]
    fn test_failure_restarts_sequence_from_first_task() {
        let (mut world, id) = world_with_pawn();
        let failing = ProbeTask::new("failing").finishes_after(1, TaskResult::Failed);
        let unreached = ProbeTask::new("unreached");
        let mut machine = Machine::new(id).with_state(
            State::new("busy", AlwaysEligible)
                .with_task(failing.clone())
                .with_task(unreached.clone()),
        );

        machine.tick(&mut world, 0.1);
        // Back at index 0, freshly begun.
        assert_eq!(machine.current_task_name(), Some("failing"));
        assert_eq!(failing.counters().begins(), 2);
        assert_eq!(failing.counters().ends(), 1);
        assert_eq!(unreached.counters().begins(), 0);
    }

    #[test]
    fn test_interruption_cancels_pending_task() {
        let (mut world, id) = world_with_pawn();
        let high_flag = ProbeFlag::new(false);
        let interrupted = ProbeTask::new("interrupted");
        let mut machine = Machine::new(id)
            .with_state(State::new("high", ProbeSpec::new(high_flag.clone())))
            .with_state(State::new("low", AlwaysEligible).with_task(interrupted.clone()));

        machine.tick(&mut world, 0.1);
        assert_eq!(machine.current_state_name(), Some("low"));
        assert_eq!(interrupted.counters().begins(), 1);

        high_flag.set(true);
        machine.tick(&mut world, 0.1);
        assert_eq!(machine.current_state_name(), Some("high"));
        // The pending task was force-finished as Canceled and ended once.
        assert_eq!(interrupted.counters().ends(), 1);
        assert_eq!(machine.states()[1].tasks()[0].result(), TaskResult::Canceled);
    }

    #[test]
    fn test_uninterruptible_task_blocks_selection() {
        let (mut world, id) = world_with_pawn();
        let high_flag = ProbeFlag::new(false);
        let stubborn = ProbeTask::new("stubborn").uninterruptible();
        let mut machine = Machine::new(id)
            .with_state(State::new("high", ProbeSpec::new(high_flag.clone())))
            .with_state(State::new("low", AlwaysEligible).with_task(stubborn.clone()));

        machine.tick(&mut world, 0.1);
        high_flag.set(true);
        machine.tick(&mut world, 0.1);
        // The higher-priority state is eligible but cannot preempt.
        assert_eq!(machine.current_state_name(), Some("low"));
        assert_eq!(stubborn.counters().ends(), 0);
    }

    #[test]
    fn test_shutdown_pairs_every_begin_with_an_end() {
        let (mut world, id) = world_with_pawn();
        let running = ProbeTask::new("running");
        let mut machine =
            Machine::new(id).with_state(State::new("busy", AlwaysEligible).with_task(running.clone()));

        machine.tick(&mut world, 0.1);
        assert_eq!(running.counters().begins(), 1);
        machine.shutdown(&mut world);
        assert_eq!(running.counters().ends(), 1);
        assert_eq!(machine.current_state_name(), None);

        // Idempotent: a second shutdown does nothing.
        machine.shutdown(&mut world);
        assert_eq!(running.counters().ends(), 1);
    }

    #[test]
    fn test_all_ignorable_state_stays_current_but_idle() {
        let (mut world, id) = world_with_pawn();
        let ignored = ProbeTask::new("ignored").ignorable();
        let mut machine = Machine::new(id)
            .with_state(State::new("idle", AlwaysEligible).with_task(ignored.clone()));

        for _ in 0..3 {
            machine.tick(&mut world, 0.1);
        }
        assert_eq!(machine.current_state_name(), Some("idle"));
        assert_eq!(machine.current_task_name(), None);
        assert_eq!(ignored.counters().begins(), 0);
    }

    #[test]
    #[should_panic(expected = "without a live owner")]
    fn test_tick_with_dead_owner_panics() {
        let (mut world, id) = world_with_pawn();
        let mut machine = Machine::new(id).with_state(State::new("a", AlwaysEligible));
        world.kill_pawn(id, eco_events::DeathCause::Starved);
        machine.tick(&mut world, 0.1);
    }
}

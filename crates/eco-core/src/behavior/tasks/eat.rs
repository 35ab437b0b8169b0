//! Eat Task
//!
//! Terminal action: transfers the target's food value to the owner and
//! removes the eaten pawn. The stored target may have disappeared since
//! it was found; that is a normal failure, not an error.

use eco_events::{DeathCause, EventKind};

use crate::behavior::target::TargetSlot;
use crate::behavior::task::{Task, TaskCtx, TaskResult};

/// Consumes the pawn stored in the target slot.
pub struct Eat {
    target: TargetSlot,
}

impl Eat {
    pub fn new(target: TargetSlot) -> Self {
        Self { target }
    }
}

impl Task for Eat {
    fn name(&self) -> &'static str {
        "eat"
    }

    fn on_begin(&mut self, ctx: &mut TaskCtx<'_>) {
        let Some(target_id) = self.target.get() else {
            ctx.finish(TaskResult::Failed);
            return;
        };
        let Some(target) = ctx.world.pawn(target_id) else {
            self.target.clear();
            ctx.finish(TaskResult::Failed);
            return;
        };

        let food_amount = target.data.food_amount;
        let target_name = target.name().to_string();

        let owner = ctx.owner_mut();
        owner.hunger = (owner.hunger + food_amount).min(owner.data.max_hunger);
        let owner_name = owner.name().to_string();

        ctx.world.kill_pawn(target_id, DeathCause::Eaten);
        self.target.clear();

        tracing::info!(pawn = %owner_name, target = %target_name, "ate");
        ctx.world.push_event(
            owner_name,
            EventKind::Ate {
                target: target_name,
                food_amount,
            },
        );
        ctx.finish(TaskResult::Succeeded);
    }
}

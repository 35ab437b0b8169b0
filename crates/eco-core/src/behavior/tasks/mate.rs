//! Mate Task
//!
//! Terminal action: reproduces with the stored partner, or asexually for
//! photosynthesizers. A vanished partner is a normal failure.

use crate::behavior::target::TargetSlot;
use crate::behavior::task::{Task, TaskCtx, TaskResult};
use crate::data::Adjective;

/// Reproduces with the pawn stored in the partner slot.
pub struct Mate {
    partner: TargetSlot,
}

impl Mate {
    pub fn new(partner: TargetSlot) -> Self {
        Self { partner }
    }
}

impl Task for Mate {
    fn name(&self) -> &'static str {
        "mate"
    }

    fn on_begin(&mut self, ctx: &mut TaskCtx<'_>) {
        let partner = self
            .partner
            .get()
            .filter(|&id| ctx.world.is_alive(id));
        let asexual = ctx.owner().data.has_adjective(Adjective::Photosynthesis);

        if partner.is_none() {
            self.partner.clear();
            if !asexual {
                ctx.finish(TaskResult::Failed);
                return;
            }
        }

        ctx.world.reproduce(ctx.owner_id(), partner);
        self.partner.clear();
        ctx.finish(TaskResult::Succeeded);
    }
}

//! Find Mate Task
//!
//! Advertises the owner as willing to mate, then looks for the nearest
//! willing pawn of the same template. Partnerships are assigned on both
//! sides, so the other pawn's own find-mate run sees itself already
//! picked and succeeds without re-querying.

use std::sync::Arc;

use crate::behavior::target::TargetSlot;
use crate::behavior::task::{BehaviorCtx, Task, TaskCtx, TaskResult};
use crate::data::Adjective;

/// Establishes a mutual partnership and writes it into the target slot.
pub struct FindMate {
    target: TargetSlot,
}

impl FindMate {
    pub fn new(target: TargetSlot) -> Self {
        Self { target }
    }
}

impl Task for FindMate {
    fn name(&self) -> &'static str {
        "find_mate"
    }

    fn on_begin(&mut self, ctx: &mut TaskCtx<'_>) {
        let owner = ctx.owner_mut();
        owner.wants_to_mate = true;

        if !owner.data.can_move() {
            ctx.finish(TaskResult::Failed);
        }
    }

    fn on_update(&mut self, ctx: &mut TaskCtx<'_>, _dt: f32) {
        let owner_id = ctx.owner_id();

        // A partner may already have been assigned by the other side.
        if let Some(partner) = ctx.owner().partner {
            if ctx.world.is_alive(partner) {
                self.target.set(Some(partner));
                ctx.finish(TaskResult::Succeeded);
                return;
            }
            ctx.owner_mut().partner = None;
        }

        let owner = ctx.owner();
        let data = owner.data.clone();
        let origin = owner.tile_pos;
        let found = ctx.world.find_nearest_pawn(origin, |id, pawn| {
            id != owner_id && Arc::ptr_eq(&pawn.data, &data) && pawn.wants_to_mate
        });

        match found {
            Some(mate) => {
                self.target.set(Some(mate));
                ctx.owner_mut().partner = Some(mate);
                if let Some(other) = ctx.world.pawn_mut(mate) {
                    other.partner = Some(owner_id);
                    tracing::debug!(pawn = %ctx.owner().name(), "found a mate");
                }
                ctx.finish(TaskResult::Succeeded);
            }
            None => ctx.finish(TaskResult::Failed),
        }
    }

    fn on_end(&mut self, ctx: &mut TaskCtx<'_>) {
        ctx.owner_mut().wants_to_mate = false;
    }

    fn can_ignore(&self, ctx: &BehaviorCtx<'_>) -> bool {
        // Asexual organisms skip partner search entirely.
        ctx.owner().data.has_adjective(Adjective::Photosynthesis)
    }
}

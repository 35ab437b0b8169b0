//! Find Food Task
//!
//! Looks for the nearest pawn the owner's diet allows it to eat and
//! writes it into the shared target slot.

use crate::behavior::target::TargetSlot;
use crate::behavior::task::{Task, TaskCtx, TaskResult};
use crate::data::Adjective;
use crate::world::{PawnId, World};

/// Nearest edible pawn for the owner's diet: not self, not in the owner's
/// protected group, carrying the adjective the diet matches. None for
/// pawns without a diet (photosynthesizers eat light).
pub fn find_food(world: &World, owner_id: PawnId) -> Option<PawnId> {
    let owner = world.pawn(owner_id)?;
    let diet = if owner.data.has_adjective(Adjective::Herbivore) {
        Adjective::Vegetal
    } else if owner.data.has_adjective(Adjective::Carnivore) {
        Adjective::Meat
    } else {
        return None;
    };
    let origin = owner.tile_pos;
    let group_id = owner.group_id;

    world.find_nearest_pawn(origin, |id, pawn| {
        id != owner_id && !pawn.is_same_group(group_id) && pawn.data.has_adjective(diet)
    })
}

/// Writes the nearest edible pawn into the target slot.
pub struct FindFood {
    target: TargetSlot,
}

impl FindFood {
    pub fn new(target: TargetSlot) -> Self {
        Self { target }
    }
}

impl Task for FindFood {
    fn name(&self) -> &'static str {
        "find_food"
    }

    fn on_begin(&mut self, ctx: &mut TaskCtx<'_>) {
        if ctx.owner().data.has_adjective(Adjective::Photosynthesis) {
            ctx.finish(TaskResult::Failed);
        }
    }

    fn on_update(&mut self, ctx: &mut TaskCtx<'_>, _dt: f32) {
        match find_food(ctx.world, ctx.owner_id()) {
            Some(found) => {
                self.target.set(Some(found));
                if let Some(target) = ctx.world.pawn(found) {
                    tracing::debug!(
                        pawn = %ctx.owner().name(),
                        target = %target.name(),
                        "wants to eat"
                    );
                }
                ctx.finish(TaskResult::Succeeded);
            }
            None => {
                tracing::trace!(pawn = %ctx.owner().name(), "no food in sight");
                ctx.finish(TaskResult::Failed);
            }
        }
    }
}

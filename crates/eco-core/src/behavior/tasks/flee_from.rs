//! Flee Task
//!
//! Specialization of the move task: the destination is recomputed away
//! from a pursuer whenever the pursuer moves, clamped to world bounds.
//! The owner may only leave the fleeing behavior once it is outside a
//! safety radius from the pursuer, or the pursuer is gone.

use crate::behavior::target::{LocationSlot, TargetSlot};
use crate::behavior::task::{BehaviorCtx, Task, TaskCtx, TaskResult};
use crate::behavior::tasks::move_to::MoveTo;
use crate::grid::{GridBounds, GridPos};

/// Keeps moving away from a pursuing pawn.
pub struct FleeFrom {
    pursuer: TargetSlot,
    safety_radius: f32,
    flee_spot: LocationSlot,
    mover: MoveTo,
    last_pursuer_pos: Option<GridPos>,
}

impl FleeFrom {
    pub fn new(pursuer: TargetSlot, safety_radius: f32) -> Self {
        let flee_spot = LocationSlot::new();
        Self {
            pursuer,
            safety_radius,
            mover: MoveTo::location(flee_spot.clone()),
            flee_spot,
            last_pursuer_pos: None,
        }
    }

    fn pursuer_pos(&self, ctx: &TaskCtx<'_>) -> Option<GridPos> {
        let id = self.pursuer.get()?;
        ctx.world.pawn(id).map(|pawn| pawn.tile_pos)
    }

    /// Aims one tile directly away from the pursuer; when standing on top
    /// of it, kicks off perpendicular instead.
    fn retarget(&mut self, bounds: GridBounds, owner_pos: GridPos, pursuer_pos: GridPos) {
        self.last_pursuer_pos = Some(pursuer_pos);

        let mut step = GridPos::new(
            (owner_pos.x - pursuer_pos.x).signum(),
            (owner_pos.y - pursuer_pos.y).signum(),
        );
        if owner_pos.distance_sq(pursuer_pos) <= 1 {
            step = GridPos::new(step.y, -step.x);
        }
        if step == GridPos::ZERO {
            step = GridPos::new(1, 0);
        }

        let spot = bounds.clamp(owner_pos.offset(step.x, step.y));
        self.flee_spot.set(Some(spot));
    }
}

impl Task for FleeFrom {
    fn name(&self) -> &'static str {
        "flee_from"
    }

    fn on_begin(&mut self, ctx: &mut TaskCtx<'_>) {
        self.last_pursuer_pos = None;
        self.mover.on_begin(ctx);

        if let Some(pursuer_pos) = self.pursuer_pos(ctx) {
            let bounds = ctx.world.bounds();
            let owner_pos = ctx.owner().tile_pos;
            self.retarget(bounds, owner_pos, pursuer_pos);
        }
    }

    fn on_update(&mut self, ctx: &mut TaskCtx<'_>, dt: f32) {
        let Some(pursuer_pos) = self.pursuer_pos(ctx) else {
            // Pursuer gone; the danger is over.
            ctx.finish(TaskResult::Succeeded);
            return;
        };

        if self.last_pursuer_pos != Some(pursuer_pos) {
            let bounds = ctx.world.bounds();
            let owner_pos = ctx.owner().tile_pos;
            self.retarget(bounds, owner_pos, pursuer_pos);
        }

        self.mover.on_update(ctx, dt);
    }

    fn on_end(&mut self, ctx: &mut TaskCtx<'_>) {
        self.mover.on_end(ctx);
    }

    fn can_switch_from_early(&self, ctx: &BehaviorCtx<'_>) -> bool {
        if !self.mover.can_switch_from_early(ctx) {
            return false;
        }
        // Keep fleeing until out of the pursuer's reach.
        match self.pursuer.get().and_then(|id| ctx.world.pawn(id)) {
            Some(pursuer) => !ctx
                .owner()
                .tile_pos
                .within_radius(pursuer.tile_pos, self.safety_radius),
            None => true,
        }
    }

    fn can_ignore(&self, ctx: &BehaviorCtx<'_>) -> bool {
        !ctx.owner().data.can_move()
    }
}

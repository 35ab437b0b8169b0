//! Move Task
//!
//! Walks the owner tile by tile toward a pawn or location target. Paths
//! are simple axis-aligned legs (x first, then y); each step interpolates
//! by `move_speed * dt` and commits the tile once progress reaches 1.0.
//! The owner may not be interrupted mid-stride.

use std::collections::VecDeque;

use crate::behavior::target::{LocationSlot, TargetSlot};
use crate::behavior::task::{BehaviorCtx, Task, TaskCtx, TaskResult};
use crate::grid::GridPos;
use crate::world::World;

enum MoveTarget {
    Pawn(TargetSlot),
    Location(LocationSlot),
}

/// Moves the owner toward a (possibly moving) target.
pub struct MoveTo {
    target: MoveTarget,
    acceptance_radius: f32,
    path: VecDeque<GridPos>,
    progress: f32,
    last_target_pos: Option<GridPos>,
}

impl MoveTo {
    /// Follow a pawn target; the path is recomputed whenever the target's
    /// tile changes.
    pub fn pawn(target: TargetSlot) -> Self {
        Self::with_target(MoveTarget::Pawn(target))
    }

    /// Walk to a fixed location target.
    pub fn location(target: LocationSlot) -> Self {
        Self::with_target(MoveTarget::Location(target))
    }

    fn with_target(target: MoveTarget) -> Self {
        Self {
            target,
            acceptance_radius: 0.0,
            path: VecDeque::new(),
            progress: 0.0,
            last_target_pos: None,
        }
    }

    /// Succeed once within this distance of the target instead of
    /// requiring the exact tile.
    pub fn with_acceptance_radius(mut self, radius: f32) -> Self {
        self.acceptance_radius = radius;
        self
    }

    /// Whether a step interpolation is underway.
    pub fn is_moving(&self) -> bool {
        self.progress > 0.0
    }

    /// Current destination tile, if the target still resolves.
    fn destination(&self, world: &World) -> Option<GridPos> {
        match &self.target {
            MoveTarget::Pawn(slot) => {
                let id = slot.get()?;
                world.pawn(id).map(|pawn| pawn.tile_pos)
            }
            MoveTarget::Location(slot) => slot.get(),
        }
    }

    /// Recomputes the path when needed. False means no valid target.
    fn refresh_path(&mut self, world: &World, owner_pos: GridPos) -> bool {
        match &self.target {
            MoveTarget::Pawn(slot) => {
                let Some(dest) = slot.get().and_then(|id| world.pawn(id)).map(|p| p.tile_pos)
                else {
                    return false;
                };
                // Re-path only when the target actually moved.
                if self.last_target_pos != Some(dest) {
                    self.plan_path(owner_pos, dest);
                    self.last_target_pos = Some(dest);
                }
                true
            }
            MoveTarget::Location(slot) => {
                let Some(dest) = slot.get() else {
                    return false;
                };
                self.plan_path(owner_pos, dest);
                self.last_target_pos = Some(dest);
                true
            }
        }
    }

    /// Axis-aligned path: the x leg first, then the y leg.
    fn plan_path(&mut self, from: GridPos, to: GridPos) {
        self.path.clear();

        let x_sign = (to.x - from.x).signum();
        let mut x = from.x;
        while x != to.x {
            x += x_sign;
            self.path.push_back(GridPos::new(x, from.y));
        }

        let y_sign = (to.y - from.y).signum();
        let mut y = from.y;
        while y != to.y {
            y += y_sign;
            self.path.push_back(GridPos::new(to.x, y));
        }
    }
}

impl Task for MoveTo {
    fn name(&self) -> &'static str {
        "move_to"
    }

    fn on_begin(&mut self, _ctx: &mut TaskCtx<'_>) {
        self.path.clear();
        self.progress = 0.0;
        self.last_target_pos = None;
    }

    fn on_update(&mut self, ctx: &mut TaskCtx<'_>, dt: f32) {
        let owner_pos = ctx.owner().tile_pos;

        if !self.is_moving() {
            if self.acceptance_radius > 0.0 {
                if let Some(dest) = self.destination(ctx.world) {
                    if owner_pos.within_radius(dest, self.acceptance_radius) {
                        ctx.finish(TaskResult::Succeeded);
                        return;
                    }
                }
            }
            if !self.refresh_path(ctx.world, owner_pos) {
                ctx.finish(TaskResult::Failed);
                return;
            }
        }

        let Some(&next_tile) = self.path.front() else {
            ctx.finish(TaskResult::Succeeded);
            return;
        };

        let speed = ctx.owner().data.move_speed;
        self.progress = (self.progress + speed * dt).min(1.0);

        // Commit the step only once fully interpolated.
        if self.progress >= 1.0 {
            ctx.owner_mut().tile_pos = next_tile;
            self.path.pop_front();
            self.progress = 0.0;
        }
    }

    fn can_switch_from_early(&self, _ctx: &BehaviorCtx<'_>) -> bool {
        // Never interrupt mid-stride.
        !self.is_moving()
    }

    fn can_ignore(&self, ctx: &BehaviorCtx<'_>) -> bool {
        // Immobile pawns skip movement entirely.
        !ctx.owner().data.can_move()
    }
}

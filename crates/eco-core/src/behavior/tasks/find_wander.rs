//! Find Wander Spot Task
//!
//! Picks a random nearby tile, clamped to world bounds, and writes it
//! into the shared location slot for the following move task.

use rand::Rng;

use crate::behavior::target::LocationSlot;
use crate::behavior::task::{Task, TaskCtx, TaskResult};
use crate::data::Adjective;

/// Default wander radius in tiles.
const WANDER_RADIUS: i32 = 2;

/// Writes a random tile around the owner into the location slot.
pub struct FindWanderSpot {
    location: LocationSlot,
    radius: i32,
}

impl FindWanderSpot {
    pub fn new(location: LocationSlot) -> Self {
        Self {
            location,
            radius: WANDER_RADIUS,
        }
    }

    pub fn with_radius(mut self, radius: i32) -> Self {
        self.radius = radius;
        self
    }
}

impl Task for FindWanderSpot {
    fn name(&self) -> &'static str {
        "find_wander_spot"
    }

    fn on_begin(&mut self, ctx: &mut TaskCtx<'_>) {
        if ctx.owner().data.has_adjective(Adjective::Photosynthesis) {
            ctx.finish(TaskResult::Failed);
        }
    }

    fn on_update(&mut self, ctx: &mut TaskCtx<'_>, _dt: f32) {
        let origin = ctx.owner().tile_pos;
        let bounds = ctx.world.bounds();
        let dx = ctx.world.rng_mut().gen_range(-self.radius..=self.radius);
        let dy = ctx.world.rng_mut().gen_range(-self.radius..=self.radius);

        let spot = bounds.clamp(origin.offset(dx, dy));
        self.location.set(Some(spot));
        ctx.finish(TaskResult::Succeeded);
    }
}

//! Concrete state library for pawn behaviors.
//!
//! Each constructor wires a state's tasks to the shared target slots they
//! communicate through. `default_machine` assembles the full priority
//! list; insertion order is selection priority, survival concerns first.

use super::machine::Machine;
use super::state::{State, StateSpec};
use super::target::{LocationSlot, TargetSlot};
use super::task::BehaviorCtx;
use super::tasks::{find_food, Eat, FindFood, FindMate, FindWanderSpot, FleeFrom, Mate, MoveTo, Wait};
use crate::data::Adjective;
use crate::world::PawnId;

/// Distance at which a predator registers as a threat.
pub const FLEE_TRIGGER_RADIUS: f32 = 4.0;
/// Distance the owner must put between itself and the pursuer before the
/// fleeing behavior may be left.
pub const FLEE_SAFETY_RADIUS: f32 = 6.0;

struct FleeSpec {
    pursuer: TargetSlot,
}

impl StateSpec for FleeSpec {
    fn can_switch_to(&self, ctx: &BehaviorCtx<'_>) -> bool {
        let owner = ctx.owner();
        if !owner.data.can_move() {
            return false;
        }
        let Some(threat) = owner.threat else {
            return false;
        };
        match ctx.world.pawn(threat) {
            Some(pursuer) => owner
                .tile_pos
                .within_radius(pursuer.tile_pos, FLEE_TRIGGER_RADIUS),
            None => false,
        }
    }

    fn on_begin(&mut self, ctx: &mut BehaviorCtx<'_>) {
        self.pursuer.set(ctx.owner().threat);
    }

    fn on_end(&mut self, _ctx: &mut BehaviorCtx<'_>) {
        self.pursuer.clear();
    }
}

/// Run from the nearest predator until outside its reach.
pub fn flee_state() -> State {
    let pursuer = TargetSlot::new();
    State::new("flee", FleeSpec {
        pursuer: pursuer.clone(),
    })
    .with_task(FleeFrom::new(pursuer, FLEE_SAFETY_RADIUS))
}

struct ChaseSpec;

impl StateSpec for ChaseSpec {
    fn can_switch_to(&self, ctx: &BehaviorCtx<'_>) -> bool {
        let owner = ctx.owner();
        if !owner.data.can_move() {
            return false;
        }
        if owner.data.has_adjective(Adjective::Photosynthesis) {
            return false;
        }
        if owner.hunger >= owner.data.min_hunger_to_eat {
            return false;
        }

        // Check for food first
        find_food(ctx.world, ctx.owner_id()).is_some()
    }
}

/// Hunt down the nearest edible pawn, eat it, digest a moment.
pub fn chase_state() -> State {
    let target = TargetSlot::new();
    State::new("chase", ChaseSpec)
        .with_task(FindFood::new(target.clone()))
        .with_task(MoveTo::pawn(target.clone()).with_acceptance_radius(1.0))
        .with_task(Eat::new(target))
        .with_task(Wait::new(1.0).with_deviation(0.5))
}

struct ReproduceSpec;

impl StateSpec for ReproduceSpec {
    fn can_switch_to(&self, ctx: &BehaviorCtx<'_>) -> bool {
        let owner = ctx.owner();
        if !owner.can_reproduce() {
            return false;
        }

        // Grouped pawns respect their group's population limit.
        if owner.group_id > 0 {
            let limit = ctx.world.group_limit(owner.group_id);
            if limit > 0 && ctx.world.pawns_in_group(owner.group_id) >= limit as usize {
                return false;
            }
        }

        true
    }
}

/// Pair up with a willing pawn of the same template and spawn offspring.
pub fn reproduce_state() -> State {
    let partner = TargetSlot::new();
    State::new("reproduce", ReproduceSpec)
        .with_task(FindMate::new(partner.clone()))
        .with_task(MoveTo::pawn(partner.clone()).with_acceptance_radius(1.0))
        .with_task(Mate::new(partner))
}

struct SleepSpec;

impl SleepSpec {
    fn in_sleep_window(ctx: &BehaviorCtx<'_>) -> bool {
        let owner = ctx.owner();
        ctx.world
            .is_within_world_time(owner.data.start_sleep_time, owner.data.end_sleep_time)
    }
}

impl StateSpec for SleepSpec {
    fn can_switch_to(&self, ctx: &BehaviorCtx<'_>) -> bool {
        Self::in_sleep_window(ctx)
    }

    fn can_switch_from(&self, ctx: &BehaviorCtx<'_>, _default: bool) -> bool {
        // Sleep through the whole window, then wake.
        !Self::in_sleep_window(ctx)
    }

    fn on_begin(&mut self, ctx: &mut BehaviorCtx<'_>) {
        ctx.owner_mut().is_sleeping = true;
    }

    fn on_end(&mut self, ctx: &mut BehaviorCtx<'_>) {
        ctx.owner_mut().is_sleeping = false;
    }
}

/// Doze in place while the clock is inside the template's sleep window.
pub fn sleep_state() -> State {
    State::new("sleep", SleepSpec).with_task(Wait::new(2.0).with_deviation(1.0))
}

struct WanderSpec;

impl StateSpec for WanderSpec {
    fn can_switch_to(&self, ctx: &BehaviorCtx<'_>) -> bool {
        // A moveable pawn can always wander
        ctx.owner().data.can_move()
    }
}

/// Stroll to a random nearby tile and linger there.
pub fn wander_state() -> State {
    let spot = LocationSlot::new();
    State::new("wander", WanderSpec)
        .with_task(FindWanderSpot::new(spot.clone()))
        .with_task(MoveTo::location(spot))
        .with_task(Wait::new(3.0).with_deviation(1.5))
}

/// The full behavior repertoire, in priority order.
pub fn default_machine(owner: PawnId) -> Machine {
    Machine::new(owner)
        .with_state(flee_state())
        .with_state(chase_state())
        .with_state(reproduce_state())
        .with_state(sleep_state())
        .with_state(wander_state())
}

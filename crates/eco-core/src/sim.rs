//! Simulation Driver
//!
//! Owns the world and advances it: clock, metabolism, perception, then
//! one behavior-machine tick per pawn. Updates are substepped when the
//! time scale is high, so behavior thresholds stay correct under extreme
//! time scaling; the scheduler itself is substep-agnostic.

use eco_events::{DeathCause, EventKind};

use crate::behavior::FLEE_TRIGGER_RADIUS;
use crate::data::Adjective;
use crate::world::World;

/// Top-level simulation loop.
pub struct Simulation {
    pub world: World,
    time_scale: f32,
}

impl Simulation {
    pub fn new(world: World) -> Self {
        Self {
            world,
            time_scale: 1.0,
        }
    }

    pub fn with_time_scale(mut self, time_scale: f32) -> Self {
        self.set_time_scale(time_scale);
        self
    }

    pub fn time_scale(&self) -> f32 {
        self.time_scale
    }

    pub fn set_time_scale(&mut self, time_scale: f32) {
        self.time_scale = time_scale.max(0.0);
    }

    /// Advances the simulation by `dt` seconds of real time, split into
    /// substeps so a high time scale cannot step over behavior
    /// thresholds (reproduction windows, eat thresholds).
    pub fn update(&mut self, dt: f32) {
        let substeps = (self.time_scale.ceil() as u32).max(1);
        let subdelta = dt * self.time_scale / substeps as f32;
        for _ in 0..substeps {
            self.tick(subdelta);
        }
    }

    /// A single simulation substep.
    pub fn tick(&mut self, dt: f32) {
        self.world.advance_time(dt);
        self.metabolism(dt);
        self.perception();
        self.behavior(dt);
    }

    /// Hunger decay, photosynthesis, starvation deaths.
    fn metabolism(&mut self, dt: f32) {
        let daylight = self.world.clock().daylight();
        let mut starved = Vec::new();
        for (id, pawn) in self.world.pawns_mut() {
            pawn.metabolize(dt, daylight);
            if pawn.is_starving() {
                starved.push(id);
            }
        }
        for id in starved {
            self.world.kill_pawn(id, DeathCause::Starved);
        }
    }

    /// Refreshes each mobile, edible pawn's threat handle with the
    /// nearest live predator in range.
    fn perception(&mut self) {
        for id in self.world.pawn_ids() {
            let Some(pawn) = self.world.pawn(id) else {
                continue;
            };
            if !pawn.data.can_move() || !pawn.data.has_adjective(Adjective::Meat) {
                continue;
            }
            let origin = pawn.tile_pos;
            let group_id = pawn.group_id;

            let threat = self
                .world
                .find_nearest_pawn(origin, |other_id, other| {
                    other_id != id
                        && !other.is_same_group(group_id)
                        && other.data.can_move()
                        && other.data.has_adjective(Adjective::Carnivore)
                })
                .filter(|&predator| {
                    self.world
                        .pawn(predator)
                        .is_some_and(|p| origin.within_radius(p.tile_pos, FLEE_TRIGGER_RADIUS))
                });

            if let Some(pawn) = self.world.pawn_mut(id) {
                pawn.threat = threat;
            }
        }
    }

    /// Ticks every pawn's behavior machine. The machine is taken out of
    /// its pawn for the duration of the call so tasks can mutate the
    /// world (including killing other pawns) freely.
    fn behavior(&mut self, dt: f32) {
        for id in self.world.pawn_ids() {
            let Some(mut machine) = self
                .world
                .pawn_mut(id)
                .and_then(|pawn| pawn.machine.take())
            else {
                continue;
            };
            machine.tick(&mut self.world, dt);
            if let Some(pawn) = self.world.pawn_mut(id) {
                pawn.machine = Some(machine);
            }
        }
    }

    /// Diagnostic events queued since the last drain.
    pub fn drain_events(&mut self) -> Vec<(String, EventKind)> {
        self.world.drain_events()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::PawnData;
    use crate::grid::GridPos;
    use std::sync::Arc;

    fn starving_template() -> Arc<PawnData> {
        Arc::new(PawnData {
            name: "mayfly".to_string(),
            move_speed: 0.0,
            hunger_at_spawn: 0.15,
            natural_hunger_consumption: 1.0,
            ..PawnData::default()
        })
    }

    #[test]
    fn test_starvation_removes_pawn() {
        let world = World::new(8, 8, 1);
        let mut sim = Simulation::new(world);
        let id = sim
            .world
            .spawn_pawn(starving_template(), GridPos::new(1, 1));

        sim.tick(0.1);
        assert!(sim.world.is_alive(id));
        sim.tick(0.1);
        assert!(!sim.world.is_alive(id));
    }

    #[test]
    fn test_update_substeps_high_time_scale() {
        let world = World::new(8, 8, 1);
        let mut sim = Simulation::new(world).with_time_scale(32.0);
        let start = sim.world.time().tick;
        sim.update(0.1);
        // ceil(32) substeps ran
        assert_eq!(sim.world.time().tick, start + 32);
    }

    #[test]
    fn test_perception_flags_nearby_predator() {
        let world = World::new(16, 16, 1);
        let mut sim = Simulation::new(world);
        let prey_data = Arc::new(PawnData {
            name: "rabbit".to_string(),
            move_speed: 2.0,
            natural_hunger_consumption: 0.0,
            adjectives: vec![Adjective::Herbivore, Adjective::Meat],
            ..PawnData::default()
        });
        let predator_data = Arc::new(PawnData {
            name: "wolf".to_string(),
            move_speed: 2.0,
            natural_hunger_consumption: 0.0,
            adjectives: vec![Adjective::Carnivore],
            ..PawnData::default()
        });

        let prey = sim.world.spawn_pawn(prey_data, GridPos::new(5, 5));
        let predator = sim.world.spawn_pawn(predator_data, GridPos::new(7, 5));
        sim.perception();
        assert_eq!(sim.world.pawn(prey).unwrap().threat, Some(predator));
        // Predators fear nothing here.
        assert_eq!(sim.world.pawn(predator).unwrap().threat, None);

        // Out of range: threat cleared.
        sim.world.pawn_mut(predator).unwrap().tile_pos = GridPos::new(15, 15);
        sim.perception();
        assert_eq!(sim.world.pawn(prey).unwrap().threat, None);
    }
}

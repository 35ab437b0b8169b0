//! World
//!
//! The tile grid, the pawn arena, spatial queries, the day/night clock and
//! group population limits. Pawns are addressed through generational
//! handles; a handle whose pawn has been removed simply stops resolving,
//! which every behavior treats as a normal input.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use slotmap::{new_key_type, SlotMap};
use std::sync::Arc;

use eco_events::{DeathCause, EventKind, PawnSnapshot, SimTime, WorldSnapshot, HOURS_PER_DAY};

use crate::behavior;
use crate::data::{Adjective, PawnData};
use crate::grid::{GridBounds, GridPos};
use crate::pawn::{GroupId, Pawn, MAX_GROUP_ID};

new_key_type! {
    /// Stable handle for pawns backed by a generational slot map.
    pub struct PawnId;
}

/// Day/night clock in fractional hours.
#[derive(Debug, Clone)]
pub struct WorldClock {
    hours: f32,
    /// Simulated hours that pass per simulated second
    pub time_scale: f32,
}

impl Default for WorldClock {
    fn default() -> Self {
        // Midday start, so freshly spawned pawns are awake
        Self {
            hours: 12.0,
            time_scale: 0.5,
        }
    }
}

impl WorldClock {
    /// Hour of day in `[0, 24)`.
    pub fn hours(&self) -> f32 {
        self.hours
    }

    pub fn set_hours(&mut self, hours: f32) {
        self.hours = hours.rem_euclid(HOURS_PER_DAY);
    }

    pub fn advance(&mut self, dt: f32) {
        self.hours = (self.hours + dt * self.time_scale).rem_euclid(HOURS_PER_DAY);
    }

    /// Whether the current hour falls inside a window; windows may wrap
    /// past midnight (e.g. 20.0 to 6.0).
    pub fn is_within(&self, start: f32, end: f32) -> bool {
        if start <= end {
            self.hours >= start && self.hours < end
        } else {
            self.hours >= start || self.hours < end
        }
    }

    /// Light factor in 0..1: zero at night, peaking at midday.
    pub fn daylight(&self) -> f32 {
        let t = (self.hours - 6.0) / 14.0;
        if (0.0..=1.0).contains(&t) {
            (t * std::f32::consts::PI).sin()
        } else {
            0.0
        }
    }
}

/// The simulated world.
pub struct World {
    width: u32,
    height: u32,
    pawns: SlotMap<PawnId, Pawn>,
    rng: SmallRng,
    clock: WorldClock,
    tick: u64,
    next_serial: u64,
    group_limits: [u8; MAX_GROUP_ID as usize + 1],
    pending_events: Vec<(String, EventKind)>,
}

impl World {
    pub fn new(width: u32, height: u32, seed: u64) -> Self {
        Self {
            width,
            height,
            pawns: SlotMap::with_key(),
            rng: SmallRng::seed_from_u64(seed),
            clock: WorldClock::default(),
            tick: 0,
            next_serial: 1,
            group_limits: [0; MAX_GROUP_ID as usize + 1],
            pending_events: Vec::new(),
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn bounds(&self) -> GridBounds {
        GridBounds::new(
            GridPos::ZERO,
            GridPos::new(self.width as i32 - 1, self.height as i32 - 1),
        )
    }

    pub fn clock(&self) -> &WorldClock {
        &self.clock
    }

    pub fn clock_mut(&mut self) -> &mut WorldClock {
        &mut self.clock
    }

    /// Current simulation time.
    pub fn time(&self) -> SimTime {
        SimTime::new(self.tick, self.clock.hours())
    }

    /// Advances the tick counter and the day/night clock by one substep.
    pub fn advance_time(&mut self, dt: f32) {
        self.tick += 1;
        self.clock.advance(dt);
    }

    /// Shortcut for the clock's sleep-window check.
    pub fn is_within_world_time(&self, start: f32, end: f32) -> bool {
        self.clock.is_within(start, end)
    }

    pub fn rng_mut(&mut self) -> &mut SmallRng {
        &mut self.rng
    }

    // ------------------------------------------------------------------
    // Pawn access
    // ------------------------------------------------------------------

    pub fn pawn(&self, id: PawnId) -> Option<&Pawn> {
        self.pawns.get(id)
    }

    pub fn pawn_mut(&mut self, id: PawnId) -> Option<&mut Pawn> {
        self.pawns.get_mut(id)
    }

    pub fn is_alive(&self, id: PawnId) -> bool {
        self.pawns.contains_key(id)
    }

    pub fn pawns(&self) -> impl Iterator<Item = (PawnId, &Pawn)> {
        self.pawns.iter()
    }

    pub fn pawns_mut(&mut self) -> impl Iterator<Item = (PawnId, &mut Pawn)> {
        self.pawns.iter_mut()
    }

    /// Handles of every live pawn; safe to hold across mutations.
    pub fn pawn_ids(&self) -> Vec<PawnId> {
        self.pawns.keys().collect()
    }

    pub fn pawn_count(&self) -> usize {
        self.pawns.len()
    }

    // ------------------------------------------------------------------
    // Group limits
    // ------------------------------------------------------------------

    /// Sets the population limit for a group; 0 means unlimited.
    pub fn set_group_limit(&mut self, group_id: GroupId, limit: u8) {
        assert!(group_id <= MAX_GROUP_ID, "no pawn group {group_id}");
        self.group_limits[group_id as usize] = limit;
    }

    /// Population limit for a group; 0 (and any untracked group) means
    /// unlimited.
    pub fn group_limit(&self, group_id: GroupId) -> u8 {
        self.group_limits
            .get(group_id as usize)
            .copied()
            .unwrap_or(0)
    }

    pub fn pawns_in_group(&self, group_id: GroupId) -> usize {
        self.pawns
            .values()
            .filter(|pawn| pawn.group_id == group_id)
            .count()
    }

    // ------------------------------------------------------------------
    // Spatial queries
    // ------------------------------------------------------------------

    /// Nearest pawn (squared euclidean distance) accepted by the predicate.
    pub fn find_nearest_pawn(
        &self,
        origin: GridPos,
        mut predicate: impl FnMut(PawnId, &Pawn) -> bool,
    ) -> Option<PawnId> {
        let mut nearest = None;
        let mut nearest_dist = i64::MAX;
        for (id, pawn) in self.pawns.iter() {
            if !predicate(id, pawn) {
                continue;
            }
            let dist = origin.distance_sq(pawn.tile_pos);
            if nearest.is_none() || dist < nearest_dist {
                nearest = Some(id);
                nearest_dist = dist;
            }
        }
        nearest
    }

    /// First pawn accepted by the predicate, in arena order.
    pub fn find_pawn(&self, mut predicate: impl FnMut(PawnId, &Pawn) -> bool) -> Option<PawnId> {
        self.pawns
            .iter()
            .find(|&(id, pawn)| predicate(id, pawn))
            .map(|(id, _)| id)
    }

    /// Pawn standing on a tile, optionally filtered by adjective.
    pub fn find_pawn_at(&self, pos: GridPos, filter: Option<Adjective>) -> Option<PawnId> {
        self.find_pawn(|_, pawn| {
            pawn.tile_pos == pos && filter.map_or(true, |adjective| pawn.data.has_adjective(adjective))
        })
    }

    /// An unoccupied in-bounds tile adjacent to `pos`, or None when the
    /// whole neighborhood is taken. Scan direction is randomized so
    /// repeated calls do not always hand out the same side.
    pub fn find_empty_tile_around(
        &mut self,
        pos: GridPos,
        filter: Option<Adjective>,
    ) -> Option<GridPos> {
        let sign_x: i32 = if self.rng.gen::<bool>() { 1 } else { -1 };
        let sign_y: i32 = if self.rng.gen::<bool>() { 1 } else { -1 };
        let bounds = self.bounds();

        for dx in -1..=1 {
            for dy in -1..=1 {
                if dx == 0 && dy == 0 {
                    continue;
                }
                let candidate = pos.offset(dx * sign_x, dy * sign_y);
                if !bounds.contains(candidate) {
                    continue;
                }
                if self.find_pawn_at(candidate, filter).is_some() {
                    continue;
                }
                return Some(candidate);
            }
        }
        None
    }

    /// Uniformly random in-bounds tile.
    pub fn random_tile(&mut self) -> GridPos {
        GridPos::new(
            self.rng.gen_range(0..self.width as i32),
            self.rng.gen_range(0..self.height as i32),
        )
    }

    // ------------------------------------------------------------------
    // Lifecycle
    // ------------------------------------------------------------------

    /// Spawns a pawn from a template, attaching the default behavior
    /// machine.
    pub fn spawn_pawn(&mut self, data: Arc<PawnData>, tile_pos: GridPos) -> PawnId {
        let pos = self.bounds().clamp(tile_pos);
        let serial = self.next_serial;
        self.next_serial += 1;

        let template = data.name.clone();
        let id = self.pawns.insert(Pawn::new(data, pos, serial));
        let machine = behavior::default_machine(id);
        let pawn = &mut self.pawns[id];
        pawn.machine = Some(machine);

        let name = pawn.name().to_string();
        tracing::debug!(pawn = %name, pos = %pos, "pawn spawned");
        self.push_event(name, EventKind::Spawned { template });
        id
    }

    /// Removes a pawn, shutting its behavior machine down first so every
    /// begun task and state receives its end callback.
    pub fn kill_pawn(&mut self, id: PawnId, cause: DeathCause) -> bool {
        let Some(pawn) = self.pawns.get_mut(id) else {
            return false;
        };
        let machine = pawn.machine.take();
        if let Some(mut machine) = machine {
            // The pawn stays in the arena until shutdown completes, so end
            // callbacks can still observe their owner.
            machine.shutdown(self);
        }
        let Some(pawn) = self.pawns.remove(id) else {
            return false;
        };
        tracing::debug!(pawn = %pawn.name(), ?cause, "pawn removed");
        self.push_event(pawn.name().to_string(), EventKind::Died { cause });
        true
    }

    /// Spawns offspring around a parent, deducting the reproduction cost
    /// from both sides of the partnership (if any) and clearing it.
    /// Returns the number of children spawned.
    pub fn reproduce(&mut self, parent_id: PawnId, partner_id: Option<PawnId>) -> u32 {
        let Some(parent) = self.pawns.get(parent_id) else {
            return 0;
        };
        let data = parent.data.clone();
        let origin = parent.tile_pos;
        let group_id = parent.group_id;
        let parent_name = parent.name().to_string();
        let partner_name = partner_id
            .and_then(|id| self.pawns.get(id))
            .map(|partner| partner.name().to_string());

        let range = data.child_spawn_range();
        let count = if range.is_empty() {
            0
        } else {
            self.rng.gen_range(range)
        };

        let mut spawned = 0;
        for _ in 0..count {
            let Some(spawn_pos) = self.find_empty_tile_around(origin, None) else {
                continue;
            };
            let child = self.spawn_pawn(data.clone(), spawn_pos);
            if let Some(child) = self.pawns.get_mut(child) {
                child.group_id = group_id;
            }
            spawned += 1;
        }

        if let Some(parent) = self.pawns.get_mut(parent_id) {
            parent.hunger -= parent.data.hunger_consumption_on_reproduction;
            parent.partner = None;
            parent.wants_to_mate = false;
        }
        if let Some(partner_id) = partner_id {
            if let Some(partner) = self.pawns.get_mut(partner_id) {
                partner.hunger -= partner.data.hunger_consumption_on_reproduction;
                partner.partner = None;
                partner.wants_to_mate = false;
            }
        }

        tracing::info!(
            pawn = %parent_name,
            partner = partner_name.as_deref().unwrap_or("-"),
            spawned,
            "reproduced"
        );
        self.push_event(
            parent_name,
            EventKind::Offspring {
                partner: partner_name,
                count: spawned,
            },
        );
        spawned
    }

    // ------------------------------------------------------------------
    // Diagnostics
    // ------------------------------------------------------------------

    /// Queues a diagnostic event; drained once per tick by the driver.
    pub fn push_event(&mut self, pawn: String, kind: EventKind) {
        self.pending_events.push((pawn, kind));
    }

    pub fn drain_events(&mut self) -> Vec<(String, EventKind)> {
        std::mem::take(&mut self.pending_events)
    }

    /// Captures the current population state.
    pub fn snapshot(&self) -> WorldSnapshot {
        let mut pawns: Vec<PawnSnapshot> = self
            .pawns
            .values()
            .map(|pawn| {
                let machine = pawn.machine.as_ref();
                PawnSnapshot {
                    name: pawn.name().to_string(),
                    template: pawn.data.name.clone(),
                    group: pawn.group_id,
                    x: pawn.tile_pos.x,
                    y: pawn.tile_pos.y,
                    hunger: pawn.hunger,
                    sleeping: pawn.is_sleeping,
                    state: machine
                        .and_then(|m| m.current_state_name())
                        .map(str::to_string),
                    task: machine
                        .and_then(|m| m.current_task_name())
                        .map(str::to_string),
                    task_result: machine
                        .and_then(|m| m.current_state())
                        .and_then(|state| state.current_task())
                        .map(|task| task.result().label().to_string()),
                }
            })
            .collect();
        pawns.sort_by(|a, b| a.name.cmp(&b.name));

        WorldSnapshot {
            time: self.time(),
            width: self.width,
            height: self.height,
            pawn_count: pawns.len(),
            pawns,
        }
    }
}

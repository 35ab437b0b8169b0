//! Pawns
//!
//! The simulated creatures: a template handle, a tile position, hunger, and
//! the behavior machine that drives them.

use std::sync::Arc;

use crate::behavior::Machine;
use crate::data::{Adjective, PawnData};
use crate::grid::GridPos;
use crate::world::PawnId;

/// Group identifier; group 0 means ungrouped.
pub type GroupId = u8;

/// Highest group id the world tracks a population limit for.
pub const MAX_GROUP_ID: GroupId = 10;

/// A single creature in the world.
pub struct Pawn {
    /// Template this pawn was spawned from
    pub data: Arc<PawnData>,
    /// Group this pawn belongs to; same-group pawns never eat each other
    pub group_id: GroupId,
    /// Current hunger level, in `[0, max_hunger]`; 0 means starved
    pub hunger: f32,
    /// Position in tile coordinates
    pub tile_pos: GridPos,
    /// Advertised while this pawn is actively looking for a partner
    pub wants_to_mate: bool,
    /// Set while the sleep state is current
    pub is_sleeping: bool,
    /// Pending partner chosen by this pawn or by the other side
    pub partner: Option<PawnId>,
    /// Nearest live predator, refreshed by the perception pass
    pub threat: Option<PawnId>,
    /// Behavior machine; taken out of the pawn while it is being ticked
    pub machine: Option<Machine>,
    name: String,
}

impl Pawn {
    pub(crate) fn new(data: Arc<PawnData>, tile_pos: GridPos, serial: u64) -> Self {
        let name = format!("{}#{}", data.name, serial);
        let hunger = data.hunger_at_spawn.min(data.max_hunger);
        Self {
            data,
            group_id: 0,
            hunger,
            tile_pos,
            wants_to_mate: false,
            is_sleeping: false,
            partner: None,
            threat: None,
            machine: None,
            name,
        }
    }

    /// Display name, unique per pawn ("template#serial").
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether this pawn currently satisfies its own reproduction threshold.
    pub fn can_reproduce(&self) -> bool {
        self.data.can_reproduce() && self.hunger >= self.data.min_hunger_for_reproduction
    }

    /// True if this pawn belongs to the given protected group.
    pub fn is_same_group(&self, group_id: GroupId) -> bool {
        self.group_id > 0 && self.group_id == group_id
    }

    /// Applies hunger decay and photosynthesis gain for one substep.
    ///
    /// `daylight` is the world clock's 0..1 light factor.
    pub fn metabolize(&mut self, dt: f32, daylight: f32) {
        self.hunger = (self.hunger - self.data.natural_hunger_consumption * dt).max(0.0);

        if self.data.has_adjective(Adjective::Photosynthesis) {
            self.hunger = (self.hunger + self.data.photosynthesis_gain * daylight * dt)
                .min(self.data.max_hunger);
        }
    }

    /// True once hunger has bottomed out.
    pub fn is_starving(&self) -> bool {
        self.hunger <= 0.0
    }
}

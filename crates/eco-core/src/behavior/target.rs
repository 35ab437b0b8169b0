//! Target Handles
//!
//! Shared single-value slots that let the tasks of one state communicate:
//! a find task writes a target, a move task follows it, a terminal task
//! consumes it. Slots are relation pointers, never ownership: a stored
//! pawn handle may stop resolving at any tick and every reader must
//! revalidate it against the world.

use std::cell::Cell;
use std::rc::Rc;

use crate::grid::GridPos;
use crate::world::PawnId;

/// Shared slot holding a pawn handle.
#[derive(Debug, Clone, Default)]
pub struct TargetSlot(Rc<Cell<Option<PawnId>>>);

impl TargetSlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self) -> Option<PawnId> {
        self.0.get()
    }

    pub fn set(&self, target: Option<PawnId>) {
        self.0.set(target);
    }

    pub fn clear(&self) {
        self.0.set(None);
    }
}

/// Shared slot holding a tile position.
#[derive(Debug, Clone, Default)]
pub struct LocationSlot(Rc<Cell<Option<GridPos>>>);

impl LocationSlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self) -> Option<GridPos> {
        self.0.get()
    }

    pub fn set(&self, location: Option<GridPos>) {
        self.0.set(location);
    }

    pub fn clear(&self) {
        self.0.set(None);
    }
}

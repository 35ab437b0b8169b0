//! Ecosystem simulation kernel.
//!
//! Pawns (plants, herbivores, carnivores) live on a tile grid and are
//! driven by a two-level behavior scheduler: a machine selects among
//! priority-ordered states, and the current state runs its tasks in
//! sequence. The kernel is headless and deterministic for a given seed;
//! diagnostics flow out through `eco-events`.

pub mod behavior;
pub mod data;
pub mod grid;
pub mod pawn;
pub mod sim;
pub mod world;

pub use behavior::{BehaviorCtx, Machine, State, StateSpec, Task, TaskCtx, TaskResult};
pub use data::{Adjective, PawnData, TemplateError, TemplateLibrary};
pub use grid::{GridBounds, GridPos};
pub use pawn::{GroupId, Pawn};
pub use sim::Simulation;
pub use world::{PawnId, World, WorldClock};

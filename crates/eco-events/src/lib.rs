//! Diagnostics types for the ecosystem simulation.
//!
//! Everything the kernel reports about itself flows through this crate:
//! simulation timestamps, behavior/lifecycle events (serialized as JSONL),
//! and world snapshots. These types are purely observational; nothing in
//! here feeds back into scheduling decisions.

pub mod event;
pub mod snapshot;
pub mod time;

pub use event::{DeathCause, Event, EventKind, EventLog};
pub use snapshot::{PawnSnapshot, WorldSnapshot};
pub use time::{SimTime, HOURS_PER_DAY};

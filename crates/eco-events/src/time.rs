//! Simulation Time
//!
//! A point in simulation time: a monotonic tick counter plus the world
//! clock's hour-of-day, which drives sleep schedules and photosynthesis.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Hours in a simulated day; the world clock wraps at this value.
pub const HOURS_PER_DAY: f32 = 24.0;

/// A point in simulation time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimTime {
    /// Monotonically increasing simulation tick.
    pub tick: u64,
    /// Hour of the simulated day, in `[0, 24)`.
    pub hours: f32,
}

impl SimTime {
    /// Creates a new SimTime.
    pub fn new(tick: u64, hours: f32) -> Self {
        Self { tick, hours }
    }

    /// Creates a timestamp for the start of the simulation.
    pub fn start() -> Self {
        Self {
            tick: 0,
            hours: 0.0,
        }
    }
}

impl fmt::Display for SimTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "tick_{}.h{:.2}", self.tick, self.hours)
    }
}

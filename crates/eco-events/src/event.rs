//! Event Types
//!
//! Behavior and lifecycle events emitted by the simulation, plus the
//! append-only JSONL logger that persists them.

use serde::{Deserialize, Serialize};
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::SimTime;

/// Why a pawn was removed from the world.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeathCause {
    Starved,
    Eaten,
}

/// What happened to a pawn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EventKind {
    /// A pawn entered the world.
    Spawned { template: String },
    /// A pawn left the world.
    Died { cause: DeathCause },
    /// A pawn consumed another pawn.
    Ate { target: String, food_amount: f32 },
    /// A pawn (and optionally a partner) produced offspring.
    Offspring {
        #[serde(skip_serializing_if = "Option::is_none")]
        partner: Option<String>,
        count: u32,
    },
    /// A behavior state became current on a pawn's machine.
    StateEntered { state: String },
    /// A behavior state stopped being current.
    StateLeft { state: String },
    /// A behavior task reached a terminal result.
    TaskFinished {
        state: String,
        task: String,
        result: String,
    },
}

/// A single simulation event.
///
/// Events are the atomic units of simulation history: one line of the
/// JSONL log per event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// Unique identifier (e.g., "evt_00000042")
    pub event_id: String,
    /// When the event occurred
    pub time: SimTime,
    /// Display name of the pawn the event is about
    pub pawn: String,
    /// What happened
    #[serde(flatten)]
    pub kind: EventKind,
}

impl Event {
    /// Create a new event.
    pub fn new(event_id: impl Into<String>, time: SimTime, pawn: impl Into<String>, kind: EventKind) -> Self {
        Self {
            event_id: event_id.into(),
            time,
            pawn: pawn.into(),
            kind,
        }
    }

    /// Serializes the event to a JSON line (for JSONL format).
    pub fn to_jsonl(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Deserializes an event from a JSON line.
    pub fn from_jsonl(line: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(line)
    }
}

/// Logger writing events to a JSONL file.
pub struct EventLog {
    writer: Option<BufWriter<File>>,
    event_count: u64,
    next_event_id: u64,
}

impl EventLog {
    /// Create a new event log writing to the specified path.
    pub fn new(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(path)?;

        Ok(Self {
            writer: Some(BufWriter::new(file)),
            event_count: 0,
            next_event_id: 1,
        })
    }

    /// Create a log that discards events (for testing).
    pub fn null() -> Self {
        Self {
            writer: None,
            event_count: 0,
            next_event_id: 1,
        }
    }

    /// Generate the next event ID.
    pub fn next_id(&mut self) -> String {
        let id = format!("evt_{:08}", self.next_event_id);
        self.next_event_id += 1;
        id
    }

    /// Get the current event count.
    pub fn event_count(&self) -> u64 {
        self.event_count
    }

    /// Log an event to the file.
    pub fn log(&mut self, event: &Event) -> std::io::Result<()> {
        self.event_count += 1;
        if let Some(ref mut writer) = self.writer {
            let json = serde_json::to_string(event)?;
            writeln!(writer, "{}", json)?;
        }
        Ok(())
    }

    /// Stamp an id on a (pawn, kind) pair and log the resulting event.
    pub fn record(
        &mut self,
        time: SimTime,
        pawn: impl Into<String>,
        kind: EventKind,
    ) -> std::io::Result<Event> {
        let event = Event::new(self.next_id(), time, pawn, kind);
        self.log(&event)?;
        Ok(event)
    }

    /// Flush the buffer to disk.
    pub fn flush(&mut self) -> std::io::Result<()> {
        if let Some(ref mut writer) = self.writer {
            writer.flush()?;
        }
        Ok(())
    }
}

impl Drop for EventLog {
    fn drop(&mut self) {
        if let Err(e) = self.flush() {
            eprintln!("Warning: Failed to flush event log: {}", e);
        }
    }
}

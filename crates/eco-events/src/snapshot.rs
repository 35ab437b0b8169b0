//! Snapshot Types
//!
//! Serialization structs for world snapshots: the full population state at
//! a point in time, used for analysis and debugging.

use serde::{Deserialize, Serialize};

use crate::SimTime;

/// Generates a snapshot ID with the given sequence number.
pub fn generate_snapshot_id(sequence: u64) -> String {
    format!("snap_{:06}", sequence)
}

/// Per-pawn state at snapshot time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PawnSnapshot {
    pub name: String,
    pub template: String,
    #[serde(default)]
    pub group: u8,
    pub x: i32,
    pub y: i32,
    pub hunger: f32,
    #[serde(default)]
    pub sleeping: bool,
    /// Current behavior state name, if the machine is in one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    /// Current behavior task name, if one is active
    #[serde(skip_serializing_if = "Option::is_none")]
    pub task: Option<String>,
    /// Result of the current task
    #[serde(skip_serializing_if = "Option::is_none")]
    pub task_result: Option<String>,
}

/// Full world snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorldSnapshot {
    pub time: SimTime,
    pub width: u32,
    pub height: u32,
    pub pawn_count: usize,
    #[serde(default)]
    pub pawns: Vec<PawnSnapshot>,
}

impl WorldSnapshot {
    /// Serializes to pretty-printed JSON.
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Serializes to compact JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Deserializes from JSON.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_snapshot() -> WorldSnapshot {
        WorldSnapshot {
            time: SimTime::new(500, 14.0),
            width: 20,
            height: 20,
            pawn_count: 1,
            pawns: vec![PawnSnapshot {
                name: "wolf#2".to_string(),
                template: "wolf".to_string(),
                group: 1,
                x: 4,
                y: 9,
                hunger: 0.35,
                sleeping: false,
                state: Some("chase".to_string()),
                task: Some("move_to".to_string()),
                task_result: Some("pending".to_string()),
            }],
        }
    }

    #[test]
    fn test_snapshot_id() {
        assert_eq!(generate_snapshot_id(7), "snap_000007");
    }

    #[test]
    fn test_snapshot_roundtrip() {
        let original = sample_snapshot();
        let json = original.to_json_pretty().unwrap();
        let parsed = WorldSnapshot::from_json(&json).unwrap();
        assert_eq!(original, parsed);
    }

    #[test]
    fn test_idle_pawn_omits_behavior_fields() {
        let mut snapshot = sample_snapshot();
        snapshot.pawns[0].state = None;
        snapshot.pawns[0].task = None;
        snapshot.pawns[0].task_result = None;
        let json = snapshot.to_json().unwrap();
        assert!(!json.contains("\"state\""));
        assert!(!json.contains("\"task\""));
    }
}

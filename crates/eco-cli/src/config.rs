//! Scenario configuration loading.
//!
//! A scenario TOML file describes the world, the templates to load, and
//! the initial population. Every section defaults, so a minimal scenario
//! only lists its spawns.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use eco_core::PawnData;

/// Complete scenario configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Scenario {
    /// World grid and clock settings
    pub world: WorldSettings,
    /// Directory of `*.json` pawn templates to load
    pub templates_dir: Option<PathBuf>,
    /// Templates defined inline in the scenario
    pub templates: Vec<PawnData>,
    /// Per-group population limits
    pub groups: Vec<GroupSettings>,
    /// Initial population batches
    pub spawns: Vec<SpawnBatch>,
}

impl Scenario {
    /// Loads a scenario from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::IoError)?;
        Self::from_str(&content)
    }

    /// Parses a scenario from a TOML string.
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(ConfigError::TomlError)
    }
}

/// World grid and clock settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldSettings {
    /// Grid width in tiles
    pub width: u32,
    /// Grid height in tiles
    pub height: u32,
    /// Simulated hours that pass per simulated second
    pub world_time_scale: f32,
    /// Hour of day the clock starts at
    pub start_hours: f32,
}

impl Default for WorldSettings {
    fn default() -> Self {
        Self {
            width: 20,
            height: 20,
            world_time_scale: 0.5,
            start_hours: 12.0,
        }
    }
}

/// Population limit for one group.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GroupSettings {
    pub id: u8,
    /// 0 means unlimited
    pub limit: u8,
}

/// One batch of pawns to spawn at startup.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SpawnBatch {
    /// Template name (file stem for directory-loaded templates)
    pub template: String,
    pub count: u32,
    /// Group to assign; 0 means ungrouped
    pub group: u8,
    /// Fixed position; random tiles when omitted
    pub position: Option<[i32; 2]>,
}

impl Default for SpawnBatch {
    fn default() -> Self {
        Self {
            template: String::new(),
            count: 1,
            group: 0,
            position: None,
        }
    }
}

/// Error loading a scenario file.
#[derive(Debug)]
pub enum ConfigError {
    /// IO error reading the scenario file
    IoError(std::io::Error),
    /// Error parsing the scenario TOML
    TomlError(toml::de::Error),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::IoError(e) => write!(f, "IO error: {}", e),
            ConfigError::TomlError(e) => write!(f, "TOML parse error: {}", e),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::IoError(e) => Some(e),
            ConfigError::TomlError(e) => Some(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_scenario() {
        let scenario = Scenario::from_str(
            r#"
            [[spawns]]
            template = "clover"
            count = 10
            "#,
        )
        .unwrap();

        assert_eq!(scenario.world.width, 20);
        assert_eq!(scenario.spawns.len(), 1);
        assert_eq!(scenario.spawns[0].template, "clover");
        assert_eq!(scenario.spawns[0].count, 10);
        assert_eq!(scenario.spawns[0].group, 0);
        assert_eq!(scenario.spawns[0].position, None);
    }

    #[test]
    fn test_full_scenario() {
        let scenario = Scenario::from_str(
            r#"
            templates_dir = "assets/pawns"

            [world]
            width = 32
            height = 24
            world_time_scale = 1.0
            start_hours = 8.0

            [[groups]]
            id = 1
            limit = 30

            [[spawns]]
            template = "rabbit"
            count = 4
            group = 1
            position = [5, 5]
            "#,
        )
        .unwrap();

        assert_eq!(scenario.world.width, 32);
        assert_eq!(scenario.world.height, 24);
        assert_eq!(scenario.templates_dir.as_deref(), Some(Path::new("assets/pawns")));
        assert_eq!(scenario.groups[0].limit, 30);
        assert_eq!(scenario.spawns[0].position, Some([5, 5]));
    }

    #[test]
    fn test_inline_templates() {
        let scenario = Scenario::from_str(
            r#"
            [[templates]]
            name = "clover"
            move_speed = 0.0
            adjectives = ["photosynthesis", "vegetal"]
            "#,
        )
        .unwrap();

        assert_eq!(scenario.templates.len(), 1);
        assert_eq!(scenario.templates[0].name, "clover");
        assert!(!scenario.templates[0].can_move());
    }

    #[test]
    fn test_invalid_toml_is_an_error() {
        assert!(Scenario::from_str("spawns = 3").is_err());
    }
}

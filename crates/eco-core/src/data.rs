//! Pawn Templates
//!
//! Data-driven pawn definitions: diet, movement, hunger and reproduction
//! parameters. Templates are loaded from JSON files and shared between all
//! pawns spawned from them.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;

/// A behavioral adjective a template can carry.
///
/// Adjectives drive both diet (what a pawn eats) and edibility (what can
/// eat it).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Adjective {
    /// Consumes light as food
    Photosynthesis,
    /// Consumes Meat as food
    Carnivore,
    /// Consumes Vegetal as food
    Herbivore,
    /// Is eatable by Carnivore
    Meat,
    /// Is eatable by Herbivore
    Vegetal,
}

/// A pawn template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PawnData {
    /// Unique name of the template
    pub name: String,
    /// Movement speed in tiles per second; 0 means immobile
    pub move_speed: f32,
    /// Hour of day at which sleep becomes eligible
    pub start_sleep_time: f32,
    /// Hour of day at which sleep ends
    pub end_sleep_time: f32,
    /// Range of children to generate upon reproduction.
    /// Set max to 0 to disable reproduction.
    pub min_child_spawn_count: u32,
    pub max_child_spawn_count: u32,
    /// Minimum amount of hunger this pawn needs before reproducing
    pub min_hunger_for_reproduction: f32,
    /// Amount of hunger to consume after reproduction
    pub hunger_consumption_on_reproduction: f32,
    /// Amount of food this pawn provides when eaten
    pub food_amount: f32,
    /// Maximum amount of hunger this pawn can hold
    pub max_hunger: f32,
    /// Rate of decrease of hunger per second
    pub natural_hunger_consumption: f32,
    /// Minimum amount of hunger to start eating
    pub min_hunger_to_eat: f32,
    /// Amount of hunger to spawn with
    pub hunger_at_spawn: f32,
    /// Rate of increase of hunger per second by photosynthesis, at full daylight
    pub photosynthesis_gain: f32,
    /// Behaviors defining this pawn
    pub adjectives: Vec<Adjective>,
}

impl Default for PawnData {
    fn default() -> Self {
        Self {
            name: "N/A".to_string(),
            move_speed: 1.0,
            start_sleep_time: 20.0,
            end_sleep_time: 6.0,
            min_child_spawn_count: 0,
            max_child_spawn_count: 0,
            min_hunger_for_reproduction: 0.8,
            hunger_consumption_on_reproduction: 0.4,
            food_amount: 1.0,
            max_hunger: 1.0,
            natural_hunger_consumption: 0.1,
            min_hunger_to_eat: 0.4,
            hunger_at_spawn: 0.5,
            photosynthesis_gain: 0.05,
            adjectives: Vec::new(),
        }
    }
}

impl PawnData {
    /// Returns whether the template carries the given adjective.
    pub fn has_adjective(&self, adjective: Adjective) -> bool {
        self.adjectives.contains(&adjective)
    }

    /// Whether pawns of this template can move at all.
    pub fn can_move(&self) -> bool {
        self.move_speed > 0.0
    }

    /// Whether pawns of this template ever reproduce.
    pub fn can_reproduce(&self) -> bool {
        self.max_child_spawn_count > 0
    }

    /// Offspring count range, normalized so min never exceeds max.
    pub fn child_spawn_range(&self) -> RangeInclusive<u32> {
        let min = self.min_child_spawn_count.min(self.max_child_spawn_count);
        min..=self.max_child_spawn_count
    }

    /// Serializes to pretty-printed JSON.
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Deserializes from JSON. Absent fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

/// Error raised while registering or loading templates.
#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("template io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid template file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("duplicate template name '{0}'")]
    Duplicate(String),
}

/// Registry of all pawn templates, keyed by unique name.
#[derive(Debug, Default)]
pub struct TemplateLibrary {
    templates: HashMap<String, Arc<PawnData>>,
}

impl TemplateLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a template; names must be unique.
    pub fn register(&mut self, data: PawnData) -> Result<Arc<PawnData>, TemplateError> {
        if self.templates.contains_key(&data.name) {
            return Err(TemplateError::Duplicate(data.name));
        }
        let data = Arc::new(data);
        self.templates.insert(data.name.clone(), data.clone());
        tracing::info!(template = %data.name, "registered pawn template");
        Ok(data)
    }

    /// Get a template by name.
    pub fn get(&self, name: &str) -> Option<Arc<PawnData>> {
        self.templates.get(name).cloned()
    }

    /// Sorted list of registered template names.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.templates.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    /// Loads every `*.json` file in a directory as a template, using the
    /// file stem as the template name. Returns the number loaded.
    pub fn load_dir(&mut self, dir: impl AsRef<Path>) -> Result<usize, TemplateError> {
        let mut paths: Vec<PathBuf> = fs::read_dir(dir)?
            .collect::<Result<Vec<_>, _>>()?
            .into_iter()
            .map(|entry| entry.path())
            .filter(|path| path.is_file() && path.extension().and_then(|e| e.to_str()) == Some("json"))
            .collect();
        // Deterministic registration order
        paths.sort();

        let mut loaded = 0;
        for path in paths {
            let content = fs::read_to_string(&path)?;
            let mut data = PawnData::from_json(&content).map_err(|source| TemplateError::Parse {
                path: path.clone(),
                source,
            })?;
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                data.name = stem.to_string();
            }
            tracing::info!(path = %path.display(), "loading pawn template");
            self.register(data)?;
            loaded += 1;
        }
        Ok(loaded)
    }
}

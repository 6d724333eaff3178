//! Course generation settings
//!
//! Read-only configuration: defaults, difficulty presets, or a JSON file.
//! Missing JSON fields fall back to the defaults.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::course::EdgeSide;

/// Difficulty presets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Difficulty {
    Easy,
    #[default]
    Normal,
    Hard,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Normal => "Normal",
            Difficulty::Hard => "Hard",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "easy" => Some(Difficulty::Easy),
            "normal" | "medium" => Some(Difficulty::Normal),
            "hard" => Some(Difficulty::Hard),
            _ => None,
        }
    }
}

/// A forced edge water body
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgeWaterSpec {
    pub side: EdgeSide,
    /// Base fill depth in tiles from the grid edge
    pub depth: i32,
}

/// Settings errors
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("invalid settings JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("could not read settings file: {0}")]
    Io(#[from] std::io::Error),
    #[error("par must be 3, 4 or 5 (got {0})")]
    InvalidPar(u8),
}

/// Course generation settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CourseSettings {
    pub difficulty: Difficulty,

    // === Layout ===
    /// Force a par (3, 4 or 5); `None` rolls 25/50/25
    pub par: Option<u8>,
    /// Chance a par 4 or 5 doglegs
    pub dogleg_chance: f64,

    // === Water ===
    pub edge_water_chance: f64,
    /// Always place this edge water body (overrides the chance)
    pub forced_edge_water: Option<EdgeWaterSpec>,
    pub pond_chance: f64,
    pub island_green_chance: f64,

    // === Sand and trees ===
    pub max_greenside_bunkers: u32,
    pub fairway_bunker_chance: f64,
    pub stray_sand_chance: f64,
    pub tree_chance: f64,

    /// Tries per placement loop before giving up
    pub placement_attempts: u32,
}

impl Default for CourseSettings {
    fn default() -> Self {
        Self {
            difficulty: Difficulty::Normal,

            par: None,
            dogleg_chance: 0.4,

            edge_water_chance: 0.35,
            forced_edge_water: None,
            pond_chance: 0.7,
            island_green_chance: 0.1,

            max_greenside_bunkers: 3,
            fairway_bunker_chance: 0.6,
            stray_sand_chance: 0.01,
            tree_chance: 0.35,

            placement_attempts: 30,
        }
    }
}

impl CourseSettings {
    /// Create settings from a difficulty preset
    pub fn from_preset(difficulty: Difficulty) -> Self {
        let mut settings = Self::default();
        settings.apply_preset(difficulty);
        settings
    }

    /// Apply a difficulty preset (updates hazard chances)
    pub fn apply_preset(&mut self, difficulty: Difficulty) {
        self.difficulty = difficulty;
        match difficulty {
            Difficulty::Easy => {
                self.edge_water_chance = 0.15;
                self.pond_chance = 0.4;
                self.island_green_chance = 0.0;
                self.max_greenside_bunkers = 2;
                self.fairway_bunker_chance = 0.3;
                self.tree_chance = 0.2;
            }
            Difficulty::Normal => {
                let defaults = Self::default();
                self.edge_water_chance = defaults.edge_water_chance;
                self.pond_chance = defaults.pond_chance;
                self.island_green_chance = defaults.island_green_chance;
                self.max_greenside_bunkers = defaults.max_greenside_bunkers;
                self.fairway_bunker_chance = defaults.fairway_bunker_chance;
                self.tree_chance = defaults.tree_chance;
            }
            Difficulty::Hard => {
                self.edge_water_chance = 0.55;
                self.pond_chance = 0.9;
                self.island_green_chance = 0.25;
                self.max_greenside_bunkers = 3;
                self.fairway_bunker_chance = 0.9;
                self.tree_chance = 0.5;
            }
        }
    }

    /// Parse settings from JSON
    pub fn from_json(json: &str) -> Result<Self, SettingsError> {
        let settings: Self = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Read settings from a JSON file
    pub fn load_file(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let json = std::fs::read_to_string(path.as_ref())?;
        let settings = Self::from_json(&json)?;
        log::info!("Loaded course settings from {}", path.as_ref().display());
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        match self.par {
            Some(par) if !(3..=5).contains(&par) => Err(SettingsError::InvalidPar(par)),
            _ => Ok(()),
        }
    }
}

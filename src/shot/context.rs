//! Per-shot mutable state shared with modifier sources

use serde::{Deserialize, Serialize};

use super::club::{Club, ClubSpec};
use crate::course::SurfaceType;
use crate::hex::HexCoord;

/// Post-landing spin
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Spin {
    #[default]
    None,
    /// One extra tile forward
    Topspin,
    /// One tile back toward the start
    Backspin,
}

/// Where a completed shot ended up
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ShotOutcome {
    /// Came to rest in play
    InPlay,
    /// Went in the water; replayed from the previous tile
    Water,
    /// Reached the flag
    Holed,
}

/// Fixed set of outcome flags for a shot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ShotFlags {
    pub reached_flag: bool,
    pub hit_water: bool,
    pub stopped_in_sand: bool,
    pub stopped_in_trees: bool,
    /// Roll ran into the edge of the hole
    pub hit_boundary: bool,
    pub penalty_strokes: u32,
    pub outcome: Option<ShotOutcome>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShotContext {
    pub start_tile: HexCoord,
    pub aim_tile: Option<HexCoord>,
    pub landing_tile: Option<HexCoord>,
    /// 0-based shot number on this hole
    pub shot_index: u32,

    pub club: Club,
    pub base: ClubSpec,
    pub lie: SurfaceType,

    // === Modifiers (additive) ===
    pub power_modifier: i32,
    pub accuracy_modifier: i32,
    pub roll_modifier: i32,
    /// Lateral flight bend in tiles (positive bends toward +column)
    pub curve: f64,
    /// Lateral AOE center shift in columns
    pub aoe_offset: i32,
    pub spin: Spin,

    // === Scoring ===
    pub chips: i32,
    pub mult: f32,
    pub final_score: i32,

    pub flags: ShotFlags,
}

impl ShotContext {
    pub fn new(start_tile: HexCoord, shot_index: u32, club: Club, lie: SurfaceType) -> Self {
        Self {
            start_tile,
            aim_tile: None,
            landing_tile: None,
            shot_index,
            club,
            base: club.spec(),
            lie,
            power_modifier: 0,
            accuracy_modifier: 0,
            roll_modifier: 0,
            curve: 0.0,
            aoe_offset: 0,
            spin: Spin::None,
            chips: 0,
            mult: 1.0,
            final_score: 0,
            flags: ShotFlags::default(),
        }
    }

    /// Effective carry in tiles, never below 1
    pub fn current_distance(&self) -> i32 {
        (self.base.distance + self.power_modifier).max(1)
    }

    /// Effective AOE radius, never negative
    pub fn accuracy_radius(&self) -> i32 {
        (self.base.accuracy + self.accuracy_modifier).max(0)
    }

    /// Effective bounce count, never negative
    pub fn roll_count(&self) -> i32 {
        (self.base.roll + self.roll_modifier).max(0)
    }

    /// Swap clubs; modifiers stay
    pub fn set_club(&mut self, club: Club) {
        self.club = club;
        self.base = club.spec();
    }
}

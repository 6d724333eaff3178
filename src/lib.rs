//! Hex Golf - procedural hex-grid golf holes and shot resolution
//!
//! Core modules:
//! - `hex`: Odd-q offset coordinates, distances and world layout
//! - `course`: Seeded hole generation (terrain, elevation, hazards)
//! - `shot`: Clubs, modifier pipeline and the shot state machine
//! - `placement`: Per-tile rendering feed
//! - `scorecard`: Strokes against par over a round
//! - `settings`: Generation settings and difficulty presets

pub mod course;
pub mod hex;
pub mod placement;
pub mod scorecard;
pub mod settings;
pub mod shot;

pub use course::{Hole, Par, SurfaceType, TerrainGrid, generate_hole};
pub use hex::{HexCoord, HexLayout};
pub use scorecard::Scorecard;
pub use settings::{CourseSettings, Difficulty};
pub use shot::{Club, ShotEngine};

/// Shared constants
pub mod consts {
    /// Hex circumradius in world units
    pub const TILE_SIZE: f64 = 1.0;
    /// Yards per grid row
    pub const YARDS_PER_ROW: u32 = 10;
    /// Wind strength cap (tiles of drift at full loft) for the demo
    pub const DEFAULT_WIND: f64 = 1.5;
    /// Demo frame step
    pub const FRAME_DT: f64 = 1.0 / 60.0;
}

/// Linear interpolation
#[inline]
pub fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

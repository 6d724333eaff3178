//! Procedural hole generation
//!
//! - `grid`: surface and elevation storage
//! - `noise` / `landform` / `elevation`: height synthesis
//! - `water` / `bunkers` / `rough`: hazard and rough passes
//! - `generator`: the seeded pipeline that ties them together

pub mod bunkers;
pub mod elevation;
pub mod generator;
pub mod grid;
pub mod landform;
pub mod noise;
pub mod rough;
pub mod water;

pub use generator::{Dogleg, Hole, Par, generate_hole};
pub use grid::{SurfaceType, TerrainGrid};
pub use landform::Landform;
pub use noise::TerrainNoise;
pub use water::EdgeSide;

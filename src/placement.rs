//! Tile placement feed for renderers
//!
//! One record per non-empty cell. `TileInstance` is the packed form for GPU
//! instancing; the byte layout matches a `Float32x3, Float32, Float32x4,
//! Uint32` vertex attribute set with 12 bytes of padding.

use bytemuck::{Pod, Zeroable};
use glam::DVec3;
use serde::{Deserialize, Serialize};

use crate::course::{Hole, SurfaceType};
use crate::hex::{HexCoord, HexLayout};

/// Where and what to draw for one cell
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TilePlacement {
    pub coord: HexCoord,
    pub surface: SurfaceType,
    /// Cell center on the ground plane (y = 0)
    pub world_position: DVec3,
    pub elevation: f64,
}

impl TilePlacement {
    /// Surface position with elevation applied
    pub fn top(&self) -> DVec3 {
        self.world_position + DVec3::Y * self.elevation
    }
}

/// Placements for every drawable cell of the hole, row-major
pub fn placements(hole: &Hole, layout: &HexLayout) -> Vec<TilePlacement> {
    let grid = &hole.grid;
    let mut out = Vec::with_capacity(grid.area());
    let mut skipped = 0usize;
    for cell in grid.cells() {
        let surface = grid.surface(cell);
        if surface == SurfaceType::Empty {
            skipped += 1;
            continue;
        }
        out.push(TilePlacement {
            coord: cell,
            surface,
            world_position: layout.world_position(cell),
            elevation: grid.elevation(cell),
        });
    }
    log::debug!("Placement feed: {} tiles, {} empty cells skipped", out.len(), skipped);
    out
}

/// Per-instance GPU record
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct TileInstance {
    pub position: [f32; 3],
    pub elevation: f32,
    pub color: [f32; 4],
    pub surface: u32,
    pub _pad: [u32; 3],
}

impl TileInstance {
    pub fn from_placement(p: &TilePlacement) -> Self {
        Self {
            position: p.world_position.as_vec3().to_array(),
            elevation: p.elevation as f32,
            color: shaded_color(p.surface, p.elevation),
            surface: surface_index(p.surface),
            _pad: [0; 3],
        }
    }
}

/// Stable index for shader-side lookups
pub fn surface_index(surface: SurfaceType) -> u32 {
    match surface {
        SurfaceType::Empty => 0,
        SurfaceType::Tee => 1,
        SurfaceType::Fairway => 2,
        SurfaceType::Rough => 3,
        SurfaceType::DeepRough => 4,
        SurfaceType::Green => 5,
        SurfaceType::Sand => 6,
        SurfaceType::Water => 7,
        SurfaceType::Tree => 8,
        SurfaceType::Flag => 9,
    }
}

/// Base color, lightened on high ground and darkened in hollows
pub fn shaded_color(surface: SurfaceType, elevation: f64) -> [f32; 4] {
    let [r, g, b, a] = colors::surface(surface);
    // Water stays flat
    if surface == SurfaceType::Water {
        return [r, g, b, a];
    }
    let shade = (1.0 + elevation as f32 * 0.25).clamp(0.6, 1.3);
    [
        (r * shade).min(1.0),
        (g * shade).min(1.0),
        (b * shade).min(1.0),
        a,
    ]
}

/// Packed instances for the hole
pub fn instances(hole: &Hole, layout: &HexLayout) -> Vec<TileInstance> {
    placements(hole, layout).iter().map(TileInstance::from_placement).collect()
}

/// Raw bytes for an instance buffer upload
pub fn instance_bytes(instances: &[TileInstance]) -> &[u8] {
    bytemuck::cast_slice(instances)
}

/// Surface colors
pub mod colors {
    use crate::course::SurfaceType;

    pub const TEE: [f32; 4] = [0.45, 0.75, 0.35, 1.0];
    pub const FAIRWAY: [f32; 4] = [0.35, 0.7, 0.3, 1.0];
    pub const ROUGH: [f32; 4] = [0.25, 0.55, 0.2, 1.0];
    pub const DEEP_ROUGH: [f32; 4] = [0.18, 0.42, 0.15, 1.0];
    pub const GREEN: [f32; 4] = [0.4, 0.85, 0.4, 1.0];
    pub const SAND: [f32; 4] = [0.9, 0.82, 0.55, 1.0];
    pub const WATER: [f32; 4] = [0.2, 0.45, 0.85, 0.9];
    pub const TREE: [f32; 4] = [0.1, 0.3, 0.12, 1.0];
    pub const FLAG: [f32; 4] = [0.95, 0.2, 0.2, 1.0];
    pub const EMPTY: [f32; 4] = [0.0, 0.0, 0.0, 0.0];

    pub fn surface(surface: SurfaceType) -> [f32; 4] {
        match surface {
            SurfaceType::Tee => TEE,
            SurfaceType::Fairway => FAIRWAY,
            SurfaceType::Rough => ROUGH,
            SurfaceType::DeepRough => DEEP_ROUGH,
            SurfaceType::Green => GREEN,
            SurfaceType::Sand => SAND,
            SurfaceType::Water => WATER,
            SurfaceType::Tree => TREE,
            SurfaceType::Flag => FLAG,
            SurfaceType::Empty => EMPTY,
        }
    }
}

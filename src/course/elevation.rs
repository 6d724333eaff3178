//! Elevation synthesis
//!
//! elevation = base_offset
//!           + terrain_noise * terrain_mult[surface]
//!           + sum(landforms) * landform_mult[surface]
//!           + surface_offset[surface]
//!
//! followed by one smoothing pass around sand and water.

use glam::DVec2;
use rand::Rng;

use super::grid::{SurfaceType, TerrainGrid};
use super::landform::{Landform, Ridge, Swale, total_contribution};
use super::noise::TerrainNoise;

/// How strongly the noise field shows through each surface
pub fn terrain_mult(surface: SurfaceType) -> f64 {
    match surface {
        SurfaceType::Tee => 0.1,
        SurfaceType::Green | SurfaceType::Flag => 0.15,
        SurfaceType::Fairway => 0.5,
        SurfaceType::Rough => 0.8,
        SurfaceType::DeepRough => 1.0,
        SurfaceType::Tree => 1.2,
        SurfaceType::Sand => 0.4,
        SurfaceType::Water => 0.2,
        SurfaceType::Empty => 0.0,
    }
}

/// How strongly landforms show through each surface
pub fn landform_mult(surface: SurfaceType) -> f64 {
    match surface {
        SurfaceType::Tee => 0.1,
        SurfaceType::Green | SurfaceType::Flag => 0.15,
        SurfaceType::Fairway => 0.6,
        SurfaceType::Rough => 1.0,
        SurfaceType::DeepRough => 1.1,
        SurfaceType::Tree => 1.2,
        SurfaceType::Sand => 0.5,
        SurfaceType::Water => 0.3,
        SurfaceType::Empty => 0.0,
    }
}

/// Fixed platform height per surface
pub fn surface_offset(surface: SurfaceType) -> f64 {
    match surface {
        SurfaceType::Tee => 0.15,
        SurfaceType::Sand => -0.25,
        SurfaceType::Water => -0.35,
        _ => 0.0,
    }
}

/// Weight of each non-hazard neighbor when smoothing a hazard cell
pub const HAZARD_BLEND_WEIGHT: f64 = 0.3;

/// Elevation of one cell before smoothing
pub fn cell_elevation(
    surface: SurfaceType,
    col: i32,
    row: i32,
    base_offset: f64,
    noise: &TerrainNoise,
    landforms: &[Landform],
) -> f64 {
    if surface == SurfaceType::Empty {
        return 0.0;
    }
    base_offset
        + noise.sample(col, row) * terrain_mult(surface)
        + total_contribution(landforms, col, row) * landform_mult(surface)
        + surface_offset(surface)
}

/// Write elevations for every cell from the finished surface map
pub fn synthesize(grid: &mut TerrainGrid, base_offset: f64, noise: &TerrainNoise, landforms: &[Landform]) {
    for row in 0..grid.height() {
        for col in 0..grid.width() {
            let e = cell_elevation(grid.get(col, row), col, row, base_offset, noise, landforms);
            grid.set_elevation(col, row, e);
        }
    }
}

/// Blend every sand/water cell toward its non-hazard neighbors so hazard
/// edges don't form hard steps. Reads from a snapshot; order independent.
pub fn smooth_hazard_edges(grid: &mut TerrainGrid) {
    let snapshot = grid.clone();
    for cell in snapshot.cells() {
        if !snapshot.surface(cell).is_hazard() {
            continue;
        }
        let mut total = snapshot.elevation(cell);
        let mut weight = 1.0;
        for n in snapshot.neighbors(cell) {
            let s = snapshot.surface(n);
            if s.is_hazard() || s == SurfaceType::Empty {
                continue;
            }
            total += snapshot.elevation(n) * HAZARD_BLEND_WEIGHT;
            weight += HAZARD_BLEND_WEIGHT;
        }
        grid.set_elevation(cell.col, cell.row, total / weight);
    }
}

/// Landform counts for a hole of the given area
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LandformBudget {
    pub hills: u32,
    pub mounds: u32,
    pub valleys: u32,
    pub ridges: u32,
    pub swales: u32,
    pub dune_clusters: u32,
}

/// Reference hole area (a mid-length par 4) for scaling landform counts
const REFERENCE_AREA: f64 = 18.0 * 38.0;

impl LandformBudget {
    /// Roll counts within their ranges, scaled toward the top of each range
    /// for larger holes
    pub fn roll<R: Rng>(rng: &mut R, area: usize) -> Self {
        let scale = (area as f64 / REFERENCE_AREA).clamp(0.5, 1.5);
        let mut pick = |lo: u32, hi: u32| {
            let span = (hi - lo) as f64;
            let top = lo + (span * scale / 1.5).round() as u32;
            rng.random_range(lo..=top.clamp(lo, hi))
        };
        Self {
            hills: pick(1, 3),
            mounds: pick(3, 7),
            valleys: pick(1, 2),
            ridges: pick(0, 1),
            swales: pick(1, 3),
            dune_clusters: pick(0, 2),
        }
    }
}

/// Tries per dune cluster to find a sand anchor
const DUNE_ANCHOR_ATTEMPTS: u32 = 30;

/// Scatter landforms over the hole. Dune clusters anchor on sand and are
/// skipped when no sand turns up within the attempt budget.
pub fn generate_landforms<R: Rng>(rng: &mut R, grid: &TerrainGrid) -> Vec<Landform> {
    let budget = LandformBudget::roll(rng, grid.area());
    let w = grid.width().max(1) as f64;
    let h = grid.height().max(1) as f64;
    let point = |rng: &mut R| DVec2::new(rng.random_range(0.0..w), rng.random_range(0.0..h));

    let mut landforms = Vec::new();

    for _ in 0..budget.hills {
        let c = point(rng);
        landforms.push(Landform::hill(
            c,
            rng.random_range(3.0..6.0),
            rng.random_range(0.4..0.9),
            rng.random_range(1.2..2.0),
        ));
    }
    for _ in 0..budget.mounds {
        let c = point(rng);
        landforms.push(Landform::mound(
            c,
            rng.random_range(1.0..2.5),
            rng.random_range(0.15..0.35),
            rng.random_range(1.0..1.5),
        ));
    }
    for _ in 0..budget.valleys {
        let c = point(rng);
        landforms.push(Landform::valley(
            c,
            rng.random_range(3.0..5.0),
            rng.random_range(0.3..0.6),
            rng.random_range(1.2..1.8),
        ));
    }
    for _ in 0..budget.ridges {
        let origin = point(rng);
        landforms.push(Landform::Ridge(Ridge {
            origin,
            angle: rng.random_range(0.0..std::f64::consts::TAU),
            length: rng.random_range(6.0..(h * 0.5).max(7.0)),
            width: rng.random_range(1.5..3.0),
            height: rng.random_range(0.3..0.7),
            falloff: rng.random_range(1.0..1.6),
        }));
    }
    for _ in 0..budget.swales {
        let origin = point(rng);
        landforms.push(Landform::Swale(Swale {
            origin,
            angle: rng.random_range(0.0..std::f64::consts::TAU),
            length: rng.random_range(6.0..(h * 0.4).max(7.0)),
            width: rng.random_range(2.0..4.0),
            depth: rng.random_range(0.1..0.3),
            curvature: rng.random_range(-0.2..0.2),
        }));
    }

    for _ in 0..budget.dune_clusters {
        let anchor = (0..DUNE_ANCHOR_ATTEMPTS).find_map(|_| {
            let col = rng.random_range(0..grid.width().max(1));
            let row = rng.random_range(0..grid.height().max(1));
            (grid.get(col, row) == SurfaceType::Sand).then_some(DVec2::new(col as f64, row as f64))
        });
        let Some(anchor) = anchor else {
            log::debug!("No sand found for dune cluster, skipping");
            continue;
        };
        for _ in 0..rng.random_range(2..=4) {
            let offset = DVec2::new(rng.random_range(-2.5..2.5), rng.random_range(-2.5..2.5));
            landforms.push(Landform::dune(
                anchor + offset,
                rng.random_range(0.8..1.8),
                rng.random_range(0.1..0.25),
                rng.random_range(1.0..1.4),
            ));
        }
    }

    landforms
}

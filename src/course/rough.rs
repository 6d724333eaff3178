//! Rough classification and organic boundary trimming
//!
//! Both passes key off the hex-step distance from each cell to the nearest
//! play-area cell (tee, fairway, green, flag), perturbed by [`base_noise`].

use std::collections::VecDeque;

use rand::Rng;

use super::grid::{SurfaceType, TerrainGrid};
use super::noise::base_noise;

/// Multi-source BFS distance (in hex steps) from every cell to the nearest
/// play-area cell. Cells are indexed row-major; `u32::MAX` means unreachable
/// (only possible with no play area at all).
pub fn play_area_distance(grid: &TerrainGrid) -> Vec<u32> {
    let mut dist = vec![u32::MAX; grid.area()];
    let mut queue = VecDeque::new();
    for cell in grid.cells() {
        if grid.surface(cell).is_play_area() {
            if let Some(i) = grid.index_of(cell) {
                dist[i] = 0;
                queue.push_back(cell);
            }
        }
    }
    while let Some(cell) = queue.pop_front() {
        let Some(ci) = grid.index_of(cell) else { continue };
        let next = dist[ci].saturating_add(1);
        for n in grid.neighbors(cell) {
            if let Some(ni) = grid.index_of(n) {
                if dist[ni] > next {
                    dist[ni] = next;
                    queue.push_back(n);
                }
            }
        }
    }
    dist
}

/// Base distance beyond which rough thickens to deep rough
pub const DEEP_ROUGH_THRESHOLD: f64 = 3.0;
/// Noise amplitude applied to the deep rough threshold
pub const DEEP_ROUGH_NOISE: f64 = 1.5;
/// Extra distance past the deep rough threshold where trees may grow
pub const TREE_MARGIN: f64 = 3.0;

/// Reclassify rough by distance from the play area.
///
/// Beyond `3.0 + noise * 1.5` rough becomes deep rough; beyond a further
/// [`TREE_MARGIN`] it becomes trees with probability `tree_chance`. Rough on
/// the grid border is always at least deep rough.
pub fn classify_rough<R: Rng>(rng: &mut R, grid: &mut TerrainGrid, noise_seed: f64, tree_chance: f64) {
    let dist = play_area_distance(grid);
    let cells: Vec<_> = grid.cells().collect();
    for cell in cells {
        if grid.surface(cell) != SurfaceType::Rough {
            continue;
        }
        let Some(i) = grid.index_of(cell) else { continue };
        let d = dist[i] as f64;
        let threshold = DEEP_ROUGH_THRESHOLD + base_noise(cell.col, cell.row, noise_seed) * DEEP_ROUGH_NOISE;

        if d > threshold + TREE_MARGIN && rng.random_bool(tree_chance.clamp(0.0, 1.0)) {
            grid.set_surface(cell, SurfaceType::Tree);
        } else if d > threshold || grid.is_edge(cell) {
            grid.set_surface(cell, SurfaceType::DeepRough);
        }
    }
}

/// Base distance beyond which cells are trimmed from the hole
pub const TRIM_THRESHOLD: f64 = 7.0;
/// Noise amplitude applied to the trim threshold
pub const TRIM_NOISE: f64 = 3.0;
/// Largest threshold reduction right in a far corner
pub const CORNER_TRIM: f64 = 3.0;

/// Surfaces the trim passes never remove
fn protected(s: SurfaceType) -> bool {
    matches!(
        s,
        SurfaceType::Tee | SurfaceType::Green | SurfaceType::Fairway | SurfaceType::Flag | SurfaceType::Water
    )
}

/// How deep into a far corner (the green end's last rows) a cell sits,
/// 0 (outside) to 1 (the corner). The tee end is left alone.
fn corner_factor(grid: &TerrainGrid, col: i32, row: i32) -> f64 {
    let w = grid.width().max(1) as f64;
    let h = grid.height().max(1) as f64;
    let zone = (w * 0.25).max(2.0);
    let edge_x = (col as f64).min(w - 1.0 - col as f64);
    let edge_y = h - 1.0 - row as f64;
    let fx = (1.0 - edge_x / zone).clamp(0.0, 1.0);
    let fy = (1.0 - edge_y / zone).clamp(0.0, 1.0);
    fx * fy
}

/// Remove outlying cells so the hole's border is organic rather than
/// rectangular. Returns the number of cells emptied.
///
/// 1. Cells farther from the play area than `7.0 + noise * 3.0` (less in the
///    far corners) become `Empty`.
/// 2. Cells whose neighborhood is more than half empty (out of bounds counts
///    as empty) become `Empty`.
///
/// Tee, green, fairway, flag and water are never trimmed; callers re-run
/// water validation afterward.
pub fn organic_trim(grid: &mut TerrainGrid, noise_seed: f64) -> usize {
    let dist = play_area_distance(grid);
    let mut trimmed = 0;

    let cells: Vec<_> = grid.cells().collect();
    for &cell in &cells {
        let s = grid.surface(cell);
        if s == SurfaceType::Empty || protected(s) {
            continue;
        }
        let Some(i) = grid.index_of(cell) else { continue };
        let threshold = TRIM_THRESHOLD + base_noise(cell.col, cell.row, noise_seed + 17.0) * TRIM_NOISE
            - corner_factor(grid, cell.col, cell.row) * CORNER_TRIM;
        if dist[i] as f64 > threshold {
            grid.set_surface(cell, SurfaceType::Empty);
            trimmed += 1;
        }
    }

    let snapshot = grid.clone();
    for &cell in &cells {
        let s = snapshot.surface(cell);
        if s == SurfaceType::Empty || protected(s) {
            continue;
        }
        let empty = crate::hex::adjacent_cells(cell)
            .iter()
            .filter(|n| snapshot.surface(**n) == SurfaceType::Empty)
            .count();
        if empty > 3 {
            grid.set_surface(cell, SurfaceType::Empty);
            trimmed += 1;
        }
    }

    trimmed
}

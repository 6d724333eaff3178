//! Sand hazards: greenside bunkers, fairway bunkers, edge clumps
//!
//! Every bunker grows from a seed cell by a short random walk.

use rand::Rng;
use rand::seq::IndexedRandom;

use super::grid::{SurfaceType, TerrainGrid};
use crate::hex::{HexCoord, adjacent_cells, hex_distance};

/// Random-walk clump growth.
///
/// Paints `seed` and then repeatedly steps from a random already-painted cell
/// to a random neighbor accepted by `can_paint`, until `size` cells are
/// painted or `attempts` steps have been tried. Returns the painted cells.
pub fn grow_clump<R: Rng>(
    rng: &mut R,
    grid: &mut TerrainGrid,
    seed: HexCoord,
    size: usize,
    surface: SurfaceType,
    attempts: u32,
    can_paint: impl Fn(SurfaceType) -> bool,
) -> Vec<HexCoord> {
    if !grid.contains(seed) || !can_paint(grid.surface(seed)) {
        return Vec::new();
    }
    grid.set_surface(seed, surface);
    let mut painted = vec![seed];

    for _ in 0..attempts {
        if painted.len() >= size {
            break;
        }
        let Some(&from) = painted.choose(rng) else { break };
        let next = from.neighbor(rng.random_range(0..6));
        if grid.contains(next) && grid.surface(next) != surface && can_paint(grid.surface(next)) {
            grid.set_surface(next, surface);
            painted.push(next);
        }
    }
    painted
}

/// Which side of the green a bunker sits on, seen from the tee
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quadrant {
    FrontLeft,
    FrontRight,
    BackLeft,
    BackRight,
}

impl Quadrant {
    fn of(center: HexCoord, cell: HexCoord) -> Self {
        let front = cell.row <= center.row;
        let left = cell.col < center.col;
        match (front, left) {
            (true, true) => Quadrant::FrontLeft,
            (true, false) => Quadrant::FrontRight,
            (false, true) => Quadrant::BackLeft,
            (false, false) => Quadrant::BackRight,
        }
    }
}

/// Heuristic score for a greenside bunker seed: front beats side beats rear,
/// repeating a quadrant is penalized, plus a little jitter
fn greenside_score<R: Rng>(rng: &mut R, center: HexCoord, cell: HexCoord, used: &[Quadrant]) -> f64 {
    let dr = cell.row - center.row;
    let dc = (cell.col - center.col).abs();
    let position = if dr < 0 && dc <= (-dr) {
        3.0 // front, between green and tee
    } else if dc > dr.abs() {
        2.0 // side
    } else if dr < 0 {
        2.5 // front corner
    } else {
        0.5 // rear
    };
    let repeat = if used.contains(&Quadrant::of(center, cell)) { 2.0 } else { 0.0 };
    position - repeat + rng.random_range(0.0..1.0)
}

/// Greenside bunker surfaces that may be overwritten
fn greenside_paintable(s: SurfaceType) -> bool {
    matches!(s, SurfaceType::Rough | SurfaceType::Fairway)
}

/// Place 1..=max greenside bunkers around the green. Returns how many were
/// placed.
pub fn place_greenside_bunkers<R: Rng>(
    rng: &mut R,
    grid: &mut TerrainGrid,
    green_center: HexCoord,
    green_radius: i32,
    max: u32,
) -> u32 {
    let count = rng.random_range(1..=max.max(1));
    let mut used: Vec<Quadrant> = Vec::new();
    let mut placed = 0;

    for _ in 0..count {
        let candidates: Vec<HexCoord> = grid
            .cells()
            .filter(|c| {
                let d = hex_distance(green_center, *c);
                (d == green_radius + 1 || d == green_radius + 2) && greenside_paintable(grid.surface(*c))
            })
            .collect();
        let best = candidates
            .iter()
            .map(|c| (*c, greenside_score(rng, green_center, *c, &used)))
            .max_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal));
        let Some((seed, _)) = best else {
            log::debug!("No greenside bunker site left");
            break;
        };

        let size = rng.random_range(2..=5);
        let cells = grow_clump(rng, grid, seed, size, SurfaceType::Sand, 15, greenside_paintable);
        if !cells.is_empty() {
            used.push(Quadrant::of(green_center, seed));
            placed += 1;
        }
    }
    placed
}

/// A fairway cell with at least one non-fairway neighbor
fn is_fairway_edge(grid: &TerrainGrid, cell: HexCoord) -> bool {
    grid.surface(cell) == SurfaceType::Fairway
        && adjacent_cells(cell)
            .iter()
            .any(|n| grid.surface(*n) != SurfaceType::Fairway)
}

/// Place fairway bunkers in the tee-shot landing zone (25–45% of the hole's
/// length), preferring the fairway edge. Returns how many were placed.
pub fn place_fairway_bunkers<R: Rng>(rng: &mut R, grid: &mut TerrainGrid, attempts: u32) -> u32 {
    let h = grid.height();
    let zone = (h as f64 * 0.25) as i32..=(h as f64 * 0.45) as i32;
    let edge_cells: Vec<HexCoord> = grid
        .cells()
        .filter(|c| zone.contains(&c.row) && is_fairway_edge(grid, *c))
        .collect();
    if edge_cells.is_empty() {
        return 0;
    }

    let count = rng.random_range(1..=2);
    let mut placed = 0;
    for _ in 0..count {
        let seed = (0..attempts).find_map(|_| {
            edge_cells
                .choose(rng)
                .copied()
                .filter(|c| grid.surface(*c) == SurfaceType::Fairway)
        });
        let Some(seed) = seed else {
            log::debug!("No fairway bunker site in {} attempts", attempts);
            continue;
        };
        let size = rng.random_range(2..=4);
        let cells = grow_clump(rng, grid, seed, size, SurfaceType::Sand, 15, |s| {
            matches!(s, SurfaceType::Fairway | SurfaceType::Rough)
        });
        if !cells.is_empty() {
            placed += 1;
        }
    }
    placed
}

/// Chance per fairway edge cell to sprout a decoration clump
const EDGE_CLUMP_CHANCE: f64 = 0.03;
/// Share of edge clumps that are water rather than sand
const EDGE_WATER_CLUMP_SHARE: f64 = 0.1;
/// Most decoration clumps per hole
const MAX_EDGE_CLUMPS: usize = 4;

/// Sparse sand (occasionally water) clumps in the rough just off the fairway
pub fn place_edge_clumps<R: Rng>(rng: &mut R, grid: &mut TerrainGrid) -> usize {
    let edges: Vec<HexCoord> = grid.cells().filter(|c| is_fairway_edge(grid, *c)).collect();
    let mut clumps = 0;
    for cell in edges {
        if clumps >= MAX_EDGE_CLUMPS {
            break;
        }
        if !rng.random_bool(EDGE_CLUMP_CHANCE) {
            continue;
        }
        let rough: Vec<HexCoord> = grid
            .neighbors(cell)
            .filter(|n| grid.surface(*n) == SurfaceType::Rough)
            .collect();
        let Some(&seed) = rough.choose(rng) else { continue };
        let surface = if rng.random_bool(EDGE_WATER_CLUMP_SHARE) {
            SurfaceType::Water
        } else {
            SurfaceType::Sand
        };
        let size = rng.random_range(1..=3);
        let cells = grow_clump(rng, grid, seed, size, surface, 10, |s| s == SurfaceType::Rough);
        if !cells.is_empty() {
            clumps += 1;
        }
    }
    clumps
}

/// Rare single sand cells inside open fairway (not on its edge)
pub fn place_stray_sand<R: Rng>(rng: &mut R, grid: &mut TerrainGrid, chance: f64) -> usize {
    let interior: Vec<HexCoord> = grid
        .cells()
        .filter(|c| grid.surface(*c) == SurfaceType::Fairway && !is_fairway_edge(grid, *c))
        .collect();
    let mut placed = 0;
    for c in interior {
        if rng.random_bool(chance.clamp(0.0, 1.0)) {
            grid.set_surface(c, SurfaceType::Sand);
            placed += 1;
        }
    }
    placed
}

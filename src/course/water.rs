//! Water features and water connectivity validation

use std::collections::VecDeque;
use std::ops::Range;

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::grid::{SurfaceType, TerrainGrid};
use super::noise::base_noise;
use crate::hex::{HexCoord, hex_distance};

/// Grid side for an edge body of water
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EdgeSide {
    Left,
    Right,
}

impl EdgeSide {
    pub fn as_str(&self) -> &'static str {
        match self {
            EdgeSide::Left => "left",
            EdgeSide::Right => "right",
        }
    }
}

/// Hard cap on water cells per row for an edge body
pub const MAX_EDGE_WATER_PER_ROW: i32 = 10;

/// Place a body of water along one side of the grid.
///
/// Each row in `rows` fills inward from the edge by `depth` plus a small
/// noise-driven extra, stopping one tile short of the nearest play-area cell
/// in that row and never exceeding [`MAX_EDGE_WATER_PER_ROW`]. Only rough is
/// overwritten. Returns the number of cells turned to water.
pub fn place_edge_water(
    grid: &mut TerrainGrid,
    side: EdgeSide,
    depth: i32,
    rows: Range<i32>,
    noise_seed: f64,
) -> usize {
    let width = grid.width();
    let column = |step: i32| match side {
        EdgeSide::Left => step,
        EdgeSide::Right => width - 1 - step,
    };

    let mut placed = 0;
    for row in rows.start.max(0)..rows.end.min(grid.height()) {
        // Steps from the edge to the first play-area cell
        let gap = (0..width)
            .find(|&step| grid.get(column(step), row).is_play_area())
            .unwrap_or(width);
        let extra = ((base_noise(column(0), row, noise_seed) + 1.0) * 1.5).round() as i32;
        let fill = (depth + extra).min(gap - 1).min(MAX_EDGE_WATER_PER_ROW);

        for step in 0..fill.max(0) {
            let col = column(step);
            if grid.get(col, row) == SurfaceType::Rough {
                grid.set(col, row, SurfaceType::Water);
                placed += 1;
            }
        }
    }
    placed
}

/// Try to place a circular pond away from the tee, green and fairway.
///
/// The pond's buffer (`radius + 2`) must be free of Green/Tee/Fairway/Flag.
/// Returns the pond center, or `None` when no site was found within
/// `attempts` tries.
pub fn place_pond<R: Rng>(rng: &mut R, grid: &mut TerrainGrid, attempts: u32) -> Option<HexCoord> {
    let (w, h) = (grid.width(), grid.height());
    for _ in 0..attempts {
        let radius = rng.random_range(2..=3);
        let buffer = radius + 2;
        if w <= 2 * radius || h <= 2 * radius {
            continue;
        }
        let center = HexCoord::new(
            rng.random_range(radius..w - radius),
            rng.random_range(radius..h - radius),
        );
        let clear = grid
            .cells()
            .filter(|c| hex_distance(center, *c) <= buffer)
            .all(|c| {
                !matches!(
                    grid.surface(c),
                    SurfaceType::Green | SurfaceType::Tee | SurfaceType::Fairway | SurfaceType::Flag
                )
            });
        if !clear {
            continue;
        }

        let cells: Vec<HexCoord> = grid
            .cells()
            .filter(|c| hex_distance(center, *c) <= radius && grid.surface(*c) == SurfaceType::Rough)
            .collect();
        for c in &cells {
            grid.set_surface(*c, SurfaceType::Water);
        }
        log::debug!("Pond at {:?} radius {} ({} cells)", center, radius, cells.len());
        return Some(center);
    }
    log::debug!("No pond site found in {} attempts", attempts);
    None
}

/// Ring the green with a two-tile moat. The column running from the green
/// center toward the tee becomes a fairway causeway, so the green stays
/// reachable on foot and later rough-only passes can't flood it. Only rough
/// and fairway are flooded.
pub fn surround_green(grid: &mut TerrainGrid, center: HexCoord, radius: i32) -> usize {
    let mut placed = 0;
    let cells: Vec<HexCoord> = grid
        .cells()
        .filter(|c| {
            let d = hex_distance(center, *c);
            d > radius && d <= radius + 2
        })
        .collect();
    for c in cells {
        let causeway = c.col == center.col && c.row < center.row;
        if causeway {
            if grid.surface(c) == SurfaceType::Rough {
                grid.set_surface(c, SurfaceType::Fairway);
            }
            continue;
        }
        if matches!(grid.surface(c), SurfaceType::Rough | SurfaceType::Fairway) {
            grid.set_surface(c, SurfaceType::Water);
            placed += 1;
        }
    }
    placed
}

/// Connected water components (hex adjacency), found with a work-queue
/// flood fill
pub fn water_components(grid: &TerrainGrid) -> Vec<Vec<HexCoord>> {
    let mut visited = vec![false; grid.area()];
    let mut components = Vec::new();

    for start in grid.cells() {
        if grid.surface(start) != SurfaceType::Water {
            continue;
        }
        let Some(start_idx) = grid.index_of(start) else { continue };
        if visited[start_idx] {
            continue;
        }

        visited[start_idx] = true;
        let mut queue = VecDeque::from([start]);
        let mut component = Vec::new();
        while let Some(cell) = queue.pop_front() {
            component.push(cell);
            for n in grid.neighbors(cell) {
                if grid.surface(n) != SurfaceType::Water {
                    continue;
                }
                if let Some(i) = grid.index_of(n) {
                    if !visited[i] {
                        visited[i] = true;
                        queue.push_back(n);
                    }
                }
            }
        }
        components.push(component);
    }
    components
}

/// True when any cell of the component borders a cell accepted by `touches`
fn component_touches(grid: &TerrainGrid, component: &[HexCoord], touches: impl Fn(SurfaceType) -> bool) -> bool {
    component
        .iter()
        .any(|c| grid.neighbors(*c).any(|n| touches(grid.surface(n))))
}

/// One validation pass: water components that touch no playable surface
/// revert to rough. Returns the number of cells reverted.
pub fn remove_floating_water(grid: &mut TerrainGrid) -> usize {
    let mut reverted = 0;
    for component in water_components(grid) {
        if component_touches(grid, &component, |s| s.is_playable()) {
            continue;
        }
        for c in &component {
            grid.set_surface(*c, SurfaceType::Rough);
        }
        reverted += component.len();
    }
    reverted
}

/// Repeat [`remove_floating_water`] until nothing changes, capped at one
/// pass per grid cell. Returns the total number of cells reverted.
pub fn validate_water(grid: &mut TerrainGrid) -> usize {
    let mut total = 0;
    for _ in 0..grid.area().max(1) {
        let reverted = remove_floating_water(grid);
        if reverted == 0 {
            break;
        }
        total += reverted;
    }
    if total > 0 {
        log::debug!("Water validation reverted {} cells", total);
    }
    total
}

/// Every water component borders at least one non-water, non-empty cell
pub fn all_water_anchored(grid: &TerrainGrid) -> bool {
    water_components(grid)
        .iter()
        .all(|c| component_touches(grid, c, |s| s != SurfaceType::Water && s != SurfaceType::Empty))
}

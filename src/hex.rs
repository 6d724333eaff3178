//! Offset-coordinate hex grid math
//!
//! Cells are addressed by (column, row) in an "odd-q" layout: columns are
//! flat-topped hexes stacked vertically, and every odd column is shifted half
//! a row toward +row. World space puts columns along +X and rows along +Z;
//! Y is up and left at zero here (elevation is applied by the grid).

use std::collections::HashSet;

use glam::{DVec2, DVec3};
use serde::{Deserialize, Serialize};

use crate::consts::TILE_SIZE;

/// A single hex cell, addressed by (column, row)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct HexCoord {
    pub col: i32,
    pub row: i32,
}

impl HexCoord {
    pub const fn new(col: i32, row: i32) -> Self {
        Self { col, row }
    }

    /// True for odd columns (shifted half a row toward +row)
    #[inline]
    pub fn is_odd_column(&self) -> bool {
        self.col.rem_euclid(2) == 1
    }

    /// Neighbor in the given direction (0..6, see [`NEIGHBOR_OFFSETS_EVEN`])
    pub fn neighbor(&self, direction: usize) -> HexCoord {
        let (dc, dr) = if self.is_odd_column() {
            NEIGHBOR_OFFSETS_ODD[direction % 6]
        } else {
            NEIGHBOR_OFFSETS_EVEN[direction % 6]
        };
        HexCoord::new(self.col + dc, self.row + dr)
    }

    /// Shift by whole columns, keeping the row
    pub fn shifted_columns(&self, delta: i32) -> HexCoord {
        HexCoord::new(self.col + delta, self.row)
    }
}

impl From<(i32, i32)> for HexCoord {
    fn from((col, row): (i32, i32)) -> Self {
        Self::new(col, row)
    }
}

/// Neighbor offsets for even columns.
///
/// Both tables list directions in the same angular order (counter-clockwise
/// in the x/z plane, starting at -30°), so direction `d` means the same
/// heading regardless of column parity. Direction 2 is +row.
pub const NEIGHBOR_OFFSETS_EVEN: [(i32, i32); 6] =
    [(1, -1), (1, 0), (0, 1), (-1, 0), (-1, -1), (0, -1)];

/// Neighbor offsets for odd columns (shifted half a row toward +row)
pub const NEIGHBOR_OFFSETS_ODD: [(i32, i32); 6] =
    [(1, 0), (1, 1), (0, 1), (-1, 1), (-1, 0), (0, -1)];

/// Turn a direction index one step counter-clockwise ("forward-left" when
/// travelling toward +row)
#[inline]
pub fn turn_left(direction: usize) -> usize {
    (direction + 1) % 6
}

/// Turn a direction index one step clockwise
#[inline]
pub fn turn_right(direction: usize) -> usize {
    (direction + 5) % 6
}

/// Reverse a direction index
#[inline]
pub fn reverse(direction: usize) -> usize {
    (direction + 3) % 6
}

/// World-space layout of the grid
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HexLayout {
    /// Hex circumradius in world units
    pub tile_size: f64,
}

impl Default for HexLayout {
    fn default() -> Self {
        Self {
            tile_size: TILE_SIZE,
        }
    }
}

impl HexLayout {
    pub fn new(tile_size: f64) -> Self {
        Self { tile_size }
    }

    /// Horizontal distance between column centers
    #[inline]
    pub fn column_spacing(&self) -> f64 {
        self.tile_size * 1.5
    }

    /// Vertical distance between row centers in the same column
    #[inline]
    pub fn row_spacing(&self) -> f64 {
        self.tile_size * 3.0_f64.sqrt()
    }

    /// World position of a cell center (y = 0)
    pub fn world_position(&self, cell: HexCoord) -> DVec3 {
        let x = cell.col as f64 * self.column_spacing();
        let mut z = cell.row as f64 * self.row_spacing();
        if cell.is_odd_column() {
            z += self.row_spacing() * 0.5;
        }
        DVec3::new(x, 0.0, z)
    }

    /// Ground-plane (x, z) position of a cell center
    pub fn plane_position(&self, cell: HexCoord) -> DVec2 {
        let p = self.world_position(cell);
        DVec2::new(p.x, p.z)
    }

    /// Cell containing a world position, by rounding to the nearest column
    /// and then the nearest row within that column. Exact for cell centers.
    pub fn world_to_cell(&self, pos: DVec3) -> HexCoord {
        let col = (pos.x / self.column_spacing()).round() as i32;
        let offset = if col.rem_euclid(2) == 1 {
            self.row_spacing() * 0.5
        } else {
            0.0
        };
        let row = ((pos.z - offset) / self.row_spacing()).round() as i32;
        HexCoord::new(col, row)
    }
}

/// The 6 cells adjacent to `cell`, in direction order
pub fn adjacent_cells(cell: HexCoord) -> [HexCoord; 6] {
    std::array::from_fn(|d| cell.neighbor(d))
}

/// Cells exactly two steps away: neighbors of neighbors, minus the center
/// and its direct neighbors. Up to 12 cells, no duplicates.
pub fn outer_ring(cell: HexCoord) -> Vec<HexCoord> {
    let inner = adjacent_cells(cell);
    let mut visited: HashSet<HexCoord> = HashSet::with_capacity(19);
    visited.insert(cell);
    visited.extend(inner.iter().copied());

    let mut ring = Vec::with_capacity(12);
    for n in inner {
        for nn in adjacent_cells(n) {
            if visited.insert(nn) {
                ring.push(nn);
            }
        }
    }
    ring
}

/// Tile distance used by every gameplay distance check (club range, AOE,
/// "near green").
///
/// `max(|dx|, |dy| + |dx| / 2)` on offset coordinates. Matches
/// [`cube_distance`] whenever the column delta is even and is off by at most
/// one otherwise.
pub fn hex_distance(a: HexCoord, b: HexCoord) -> i32 {
    let dx = (b.col - a.col).abs();
    let dy = (b.row - a.row).abs();
    dx.max(dy + dx / 2)
}

/// Exact hex distance via cube coordinates (reference metric)
pub fn cube_distance(a: HexCoord, b: HexCoord) -> i32 {
    let (ax, ay, az) = to_cube(a);
    let (bx, by, bz) = to_cube(b);
    (ax - bx).abs().max((ay - by).abs()).max((az - bz).abs())
}

fn to_cube(cell: HexCoord) -> (i32, i32, i32) {
    let x = cell.col;
    let z = cell.row - (cell.col - cell.col.rem_euclid(2)) / 2;
    (x, -x - z, z)
}

/// Unit world-plane (x, z) direction for each neighbor direction index
pub fn direction_vector(layout: &HexLayout, direction: usize) -> DVec2 {
    let origin = HexCoord::new(0, 0);
    (layout.plane_position(origin.neighbor(direction)) - layout.plane_position(origin))
        .normalize_or_zero()
}

/// Direction index whose heading best matches the straight line from `from`
/// to `to`. Returns direction 2 (+row, "down the hole") when the cells are
/// identical.
pub fn direction_between(layout: &HexLayout, from: HexCoord, to: HexCoord) -> usize {
    let heading = (layout.plane_position(to) - layout.plane_position(from)).normalize_or_zero();
    if heading == DVec2::ZERO {
        return 2;
    }
    (0..6)
        .max_by(|&a, &b| {
            let da = direction_vector(layout, a).dot(heading);
            let db = direction_vector(layout, b).dot(heading);
            da.partial_cmp(&db).unwrap_or(std::cmp::Ordering::Equal)
        })
        .unwrap_or(2)
}

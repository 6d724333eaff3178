//! Terrain grid: surface types plus a parallel elevation map
//!
//! Accessors are tolerant of out-of-bounds coordinates so generation passes
//! can scan neighborhoods at the edges without explicit checks.

use serde::{Deserialize, Serialize};

use crate::hex::{HexCoord, adjacent_cells};

/// Surface type of a single cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SurfaceType {
    Tee,
    Fairway,
    Rough,
    DeepRough,
    Green,
    Sand,
    Water,
    Tree,
    Flag,
    /// Not part of the hole; never rendered or targetable
    #[default]
    Empty,
}

impl SurfaceType {
    pub const ALL: [SurfaceType; 10] = [
        SurfaceType::Tee,
        SurfaceType::Fairway,
        SurfaceType::Rough,
        SurfaceType::DeepRough,
        SurfaceType::Green,
        SurfaceType::Sand,
        SurfaceType::Water,
        SurfaceType::Tree,
        SurfaceType::Flag,
        SurfaceType::Empty,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SurfaceType::Tee => "tee",
            SurfaceType::Fairway => "fairway",
            SurfaceType::Rough => "rough",
            SurfaceType::DeepRough => "deep_rough",
            SurfaceType::Green => "green",
            SurfaceType::Sand => "sand",
            SurfaceType::Water => "water",
            SurfaceType::Tree => "tree",
            SurfaceType::Flag => "flag",
            SurfaceType::Empty => "empty",
        }
    }

    /// One-character glyph for text dumps
    pub fn glyph(&self) -> char {
        match self {
            SurfaceType::Tee => 'T',
            SurfaceType::Fairway => '=',
            SurfaceType::Rough => ',',
            SurfaceType::DeepRough => ';',
            SurfaceType::Green => 'o',
            SurfaceType::Sand => ':',
            SurfaceType::Water => '~',
            SurfaceType::Tree => '^',
            SurfaceType::Flag => 'P',
            SurfaceType::Empty => ' ',
        }
    }

    /// Tee, fairway, green and the flag: the corridor the hole is built around
    pub fn is_play_area(&self) -> bool {
        matches!(
            self,
            SurfaceType::Tee | SurfaceType::Fairway | SurfaceType::Green | SurfaceType::Flag
        )
    }

    /// Surfaces a water body must touch to count as part of the course
    pub fn is_playable(&self) -> bool {
        matches!(
            self,
            SurfaceType::Tee
                | SurfaceType::Fairway
                | SurfaceType::Green
                | SurfaceType::Rough
                | SurfaceType::Sand
                | SurfaceType::Flag
        )
    }

    pub fn is_hazard(&self) -> bool {
        matches!(self, SurfaceType::Sand | SurfaceType::Water)
    }

    /// Rolling ends immediately on entering one of these
    pub fn stops_roll(&self) -> bool {
        matches!(self, SurfaceType::Water | SurfaceType::Sand | SurfaceType::Tree)
    }

    pub fn is_targetable(&self) -> bool {
        *self != SurfaceType::Empty
    }

    pub fn is_green(&self) -> bool {
        matches!(self, SurfaceType::Green | SurfaceType::Flag)
    }
}

/// Width × height grid of surfaces and elevations, row-major
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TerrainGrid {
    width: i32,
    height: i32,
    surfaces: Vec<SurfaceType>,
    elevations: Vec<f64>,
}

impl TerrainGrid {
    /// New grid with every cell set to `fill` at elevation 0
    pub fn new(width: i32, height: i32, fill: SurfaceType) -> Self {
        let width = width.max(0);
        let height = height.max(0);
        let len = (width * height) as usize;
        Self {
            width,
            height,
            surfaces: vec![fill; len],
            elevations: vec![0.0; len],
        }
    }

    /// Build a grid from text rows of [`SurfaceType::glyph`] characters.
    /// Unknown characters become `Empty`; short rows are padded.
    pub fn from_glyphs(rows: &[&str]) -> Self {
        let height = rows.len() as i32;
        let width = rows.iter().map(|r| r.chars().count()).max().unwrap_or(0) as i32;
        let mut grid = Self::new(width, height, SurfaceType::Empty);
        for (row, line) in rows.iter().enumerate() {
            for (col, ch) in line.chars().enumerate() {
                let surface = SurfaceType::ALL
                    .iter()
                    .copied()
                    .find(|s| s.glyph() == ch)
                    .unwrap_or(SurfaceType::Empty);
                grid.set(col as i32, row as i32, surface);
            }
        }
        grid
    }

    #[inline]
    pub fn width(&self) -> i32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> i32 {
        self.height
    }

    #[inline]
    pub fn area(&self) -> usize {
        self.surfaces.len()
    }

    #[inline]
    pub fn in_bounds(&self, col: i32, row: i32) -> bool {
        col >= 0 && row >= 0 && col < self.width && row < self.height
    }

    #[inline]
    pub fn contains(&self, cell: HexCoord) -> bool {
        self.in_bounds(cell.col, cell.row)
    }

    #[inline]
    fn index(&self, col: i32, row: i32) -> Option<usize> {
        self.in_bounds(col, row)
            .then(|| (row * self.width + col) as usize)
    }

    /// Flat index of an in-bounds cell (for visited sets and distance fields)
    #[inline]
    pub fn index_of(&self, cell: HexCoord) -> Option<usize> {
        self.index(cell.col, cell.row)
    }

    /// Surface at (col, row), `Empty` when out of bounds
    pub fn get(&self, col: i32, row: i32) -> SurfaceType {
        self.index(col, row)
            .map(|i| self.surfaces[i])
            .unwrap_or(SurfaceType::Empty)
    }

    /// Elevation at (col, row), `0.0` when out of bounds
    pub fn get_elevation(&self, col: i32, row: i32) -> f64 {
        self.index(col, row).map(|i| self.elevations[i]).unwrap_or(0.0)
    }

    /// No-op when out of bounds
    pub fn set(&mut self, col: i32, row: i32, surface: SurfaceType) {
        if let Some(i) = self.index(col, row) {
            self.surfaces[i] = surface;
        }
    }

    /// No-op when out of bounds
    pub fn set_elevation(&mut self, col: i32, row: i32, elevation: f64) {
        if let Some(i) = self.index(col, row) {
            self.elevations[i] = elevation;
        }
    }

    #[inline]
    pub fn surface(&self, cell: HexCoord) -> SurfaceType {
        self.get(cell.col, cell.row)
    }

    #[inline]
    pub fn elevation(&self, cell: HexCoord) -> f64 {
        self.get_elevation(cell.col, cell.row)
    }

    #[inline]
    pub fn set_surface(&mut self, cell: HexCoord, surface: SurfaceType) {
        self.set(cell.col, cell.row, surface);
    }

    /// In bounds and not `Empty`
    pub fn is_targetable(&self, cell: HexCoord) -> bool {
        self.surface(cell).is_targetable()
    }

    /// All cell coordinates in row-major order
    pub fn cells(&self) -> impl Iterator<Item = HexCoord> + '_ {
        (0..self.height).flat_map(move |row| (0..self.width).map(move |col| HexCoord::new(col, row)))
    }

    /// In-bounds neighbors of a cell
    pub fn neighbors(&self, cell: HexCoord) -> impl Iterator<Item = HexCoord> + '_ {
        adjacent_cells(cell).into_iter().filter(|n| self.contains(*n))
    }

    /// Number of cells with the given surface
    pub fn count(&self, surface: SurfaceType) -> usize {
        self.surfaces.iter().filter(|s| **s == surface).count()
    }

    /// First cell (row-major) with the given surface
    pub fn find(&self, surface: SurfaceType) -> Option<HexCoord> {
        self.cells().find(|c| self.surface(*c) == surface)
    }

    /// True when the cell touches the grid border
    pub fn is_edge(&self, cell: HexCoord) -> bool {
        cell.col == 0 || cell.row == 0 || cell.col == self.width - 1 || cell.row == self.height - 1
    }

    /// Text dump, one line per row
    pub fn to_glyphs(&self) -> Vec<String> {
        (0..self.height)
            .map(|row| (0..self.width).map(|col| self.get(col, row).glyph()).collect())
            .collect()
    }
}

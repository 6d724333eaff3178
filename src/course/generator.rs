//! Hole generation pipeline
//!
//! One seeded [`Pcg32`] drives every stage, so a seed plus settings always
//! reproduces the same hole:
//!
//! 1. par, yardage and grid size
//! 2. tee, green and flag
//! 3. fairway along a quadratic Bezier centerline
//! 4. water (edge body, pond, island green) and connectivity validation
//! 5. bunkers
//! 6. rough classification and organic trim
//! 7. corridor check, landforms and elevation

use std::collections::VecDeque;

use glam::DVec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::bunkers::{place_edge_clumps, place_fairway_bunkers, place_greenside_bunkers, place_stray_sand};
use super::elevation::{generate_landforms, smooth_hazard_edges, synthesize};
use super::grid::{SurfaceType, TerrainGrid};
use super::landform::Landform;
use super::noise::{DEFAULT_TERRAIN_SCALE, TerrainNoise};
use super::rough::{classify_rough, organic_trim};
use super::water::{EdgeSide, place_edge_water, place_pond, surround_green, validate_water};
use crate::consts::YARDS_PER_ROW;
use crate::hex::{HexCoord, HexLayout, adjacent_cells, direction_between, hex_distance};
use crate::lerp;
use crate::settings::CourseSettings;

/// Hole par
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Par {
    Three,
    Four,
    Five,
}

impl Par {
    pub fn from_strokes(strokes: u8) -> Option<Self> {
        match strokes {
            3 => Some(Par::Three),
            4 => Some(Par::Four),
            5 => Some(Par::Five),
            _ => None,
        }
    }

    pub fn strokes(&self) -> u8 {
        match self {
            Par::Three => 3,
            Par::Four => 4,
            Par::Five => 5,
        }
    }

    /// Yardage range (inclusive)
    pub fn yardage_range(&self) -> (u32, u32) {
        match self {
            Par::Three => (150, 300),
            Par::Four => (300, 450),
            Par::Five => (450, 600),
        }
    }

    /// Grid width range (inclusive), before the dogleg allowance
    pub fn width_range(&self) -> (i32, i32) {
        match self {
            Par::Three => (10, 18),
            Par::Four => (14, 22),
            Par::Five => (18, 26),
        }
    }

    /// 25% par 3, 50% par 4, 25% par 5
    fn roll<R: Rng>(rng: &mut R) -> Self {
        match rng.random_range(0..4) {
            0 => Par::Three,
            3 => Par::Five,
            _ => Par::Four,
        }
    }
}

/// Extra grid width given to dogleg holes
pub const DOGLEG_EXTRA_WIDTH: i32 = 6;

/// Random column spread of the green center around its dogleg position
pub const GREEN_COL_JITTER: i32 = 2;

/// Fairway bend
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Dogleg {
    Straight,
    /// Bends toward column 0; severity in (0, 1]
    Left { severity: f64 },
    /// Bends toward the last column
    Right { severity: f64 },
}

impl Dogleg {
    pub fn as_str(&self) -> &'static str {
        match self {
            Dogleg::Straight => "straight",
            Dogleg::Left { .. } => "left",
            Dogleg::Right { .. } => "right",
        }
    }

    /// Signed lateral pull: negative left, positive right
    pub fn pull(&self) -> f64 {
        match *self {
            Dogleg::Straight => 0.0,
            Dogleg::Left { severity } => -severity,
            Dogleg::Right { severity } => severity,
        }
    }

    fn roll<R: Rng>(rng: &mut R, par: Par, chance: f64) -> Self {
        if par == Par::Three || !rng.random_bool(chance.clamp(0.0, 1.0)) {
            return Dogleg::Straight;
        }
        let severity = rng.random_range(0.4..=1.0);
        if rng.random_bool(0.5) {
            Dogleg::Left { severity }
        } else {
            Dogleg::Right { severity }
        }
    }
}

/// A generated hole
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Hole {
    pub seed: u64,
    pub par: Par,
    pub yardage: u32,
    pub grid: TerrainGrid,
    pub tee: HexCoord,
    pub green_center: HexCoord,
    pub green_radius: i32,
    /// Cup location (the green center)
    pub flag: HexCoord,
    pub dogleg: Dogleg,
    /// Fairway centerline samples in grid space (x = column, y = row)
    pub fairway_path: Vec<DVec2>,
    /// Elevation shapers, kept for debug queries
    pub landforms: Vec<Landform>,
}

impl Hole {
    /// Wrap a hand-built grid. The green radius is measured from the green
    /// cells around the flag.
    pub fn from_grid(grid: TerrainGrid, tee: HexCoord, flag: HexCoord, par: Par) -> Self {
        let green_radius = grid
            .cells()
            .filter(|c| grid.surface(*c).is_green())
            .map(|c| hex_distance(flag, c))
            .max()
            .unwrap_or(0);
        Self {
            seed: 0,
            par,
            yardage: grid.height().max(0) as u32 * YARDS_PER_ROW,
            tee,
            green_center: flag,
            green_radius,
            flag,
            dogleg: Dogleg::Straight,
            fairway_path: Vec::new(),
            landforms: Vec::new(),
            grid,
        }
    }

    pub fn width(&self) -> i32 {
        self.grid.width()
    }

    pub fn height(&self) -> i32 {
        self.grid.height()
    }

    /// Glyph map with a legend line per row
    pub fn ascii_map(&self) -> String {
        let mut out = String::new();
        for (row, line) in self.grid.to_glyphs().into_iter().enumerate() {
            out.push_str(&format!("{:3} |{}|\n", row, line));
        }
        out
    }
}

/// Quadratic Bezier point
fn bezier(p0: DVec2, p1: DVec2, p2: DVec2, t: f64) -> DVec2 {
    let u = 1.0 - t;
    p0 * (u * u) + p1 * (2.0 * u * t) + p2 * (t * t)
}

/// Corridor width at normalized position `t` along the centerline: narrow at
/// the tee and green, widest mid-hole
pub fn fairway_width(t: f64) -> f64 {
    let s = (t.clamp(0.0, 1.0) * std::f64::consts::PI).sin().max(0.0);
    lerp(3.0, 10.0, s.powf(1.5))
}

/// Largest fairway disc radius as a share of grid width
const FAIRWAY_RADIUS_CAP: f64 = 0.35;

/// True when `cell` is, or touches, a tee or green cell
fn near_tee_or_green(grid: &TerrainGrid, cell: HexCoord) -> bool {
    let blocks = |s: SurfaceType| matches!(s, SurfaceType::Tee | SurfaceType::Green | SurfaceType::Flag);
    blocks(grid.surface(cell)) || adjacent_cells(cell).iter().any(|n| blocks(grid.surface(*n)))
}

/// Paint the fairway along a Bezier from tee to green. Returns the sampled
/// centerline.
pub fn paint_fairway(grid: &mut TerrainGrid, tee: HexCoord, control: DVec2, green: HexCoord) -> Vec<DVec2> {
    let p0 = DVec2::new(tee.col as f64, tee.row as f64);
    let p2 = DVec2::new(green.col as f64, green.row as f64);
    let cap = (grid.width() as f64 * FAIRWAY_RADIUS_CAP).max(1.0);

    // Dense enough that consecutive centers land in neighboring cells
    let samples = (grid.height().max(grid.width()) * 4).max(8) as usize;
    let mut path = Vec::with_capacity(samples + 1);

    for i in 0..=samples {
        let t = i as f64 / samples as f64;
        let p = bezier(p0, control, p2, t);
        path.push(p);

        let center = HexCoord::new(p.x.round() as i32, p.y.round() as i32);
        let radius = (fairway_width(t) * 0.5).min(cap);
        let reach = radius.ceil() as i32;
        for row in center.row - reach..=center.row + reach {
            for col in center.col - reach..=center.col + reach {
                let cell = HexCoord::new(col, row);
                if !grid.contains(cell) || hex_distance(center, cell) as f64 > radius {
                    continue;
                }
                if near_tee_or_green(grid, cell) {
                    continue;
                }
                grid.set_surface(cell, SurfaceType::Fairway);
            }
        }
    }
    path
}

/// Cells that can be walked: neither `Empty` nor `Water`
fn walkable(s: SurfaceType) -> bool {
    s != SurfaceType::Empty && s != SurfaceType::Water
}

/// Cells reachable from `start` over walkable ground
pub fn reachable_from(grid: &TerrainGrid, start: HexCoord) -> Vec<bool> {
    let mut seen = vec![false; grid.area()];
    let Some(i) = grid.index_of(start) else { return seen };
    if !walkable(grid.surface(start)) {
        return seen;
    }
    seen[i] = true;
    let mut queue = VecDeque::from([start]);
    while let Some(cell) = queue.pop_front() {
        for n in grid.neighbors(cell) {
            if !walkable(grid.surface(n)) {
                continue;
            }
            if let Some(ni) = grid.index_of(n) {
                if !seen[ni] {
                    seen[ni] = true;
                    queue.push_back(n);
                }
            }
        }
    }
    seen
}

/// Make `target` walkable from `tee`. When cut off, walks a straight hex
/// line from the target toward the tee and turns any water or empty cell on
/// it into rough. Returns the number of cells changed.
pub fn open_corridor(grid: &mut TerrainGrid, tee: HexCoord, target: HexCoord) -> usize {
    let reached = reachable_from(grid, tee);
    if grid.index_of(target).is_none_or(|i| reached[i]) {
        return 0;
    }

    let layout = HexLayout::default();
    let mut carved = 0;
    let mut cell = target;
    for _ in 0..grid.area() {
        if cell == tee {
            break;
        }
        if !walkable(grid.surface(cell)) {
            grid.set_surface(cell, SurfaceType::Rough);
            carved += 1;
        }
        let next = cell.neighbor(direction_between(&layout, cell, tee));
        if !grid.contains(next) {
            break;
        }
        cell = next;
    }
    if carved > 0 {
        log::debug!("Opened corridor to {:?} ({} cells)", target, carved);
    }
    carved
}

/// Generate a hole from a seed
pub fn generate_hole(seed: u64, settings: &CourseSettings) -> Hole {
    let mut rng = Pcg32::seed_from_u64(seed);
    let noise_seed = rng.random_range(0.0..100.0);

    // === Dimensions ===
    let par = settings
        .par
        .and_then(Par::from_strokes)
        .unwrap_or_else(|| Par::roll(&mut rng));
    let (lo, hi) = par.yardage_range();
    let yardage = rng.random_range(lo..=hi);
    let height = (yardage / YARDS_PER_ROW) as i32;
    let dogleg = Dogleg::roll(&mut rng, par, settings.dogleg_chance);
    let (wlo, whi) = par.width_range();
    let mut width = rng.random_range(wlo..=whi);
    if dogleg != Dogleg::Straight {
        width += DOGLEG_EXTRA_WIDTH;
    }
    let mut grid = TerrainGrid::new(width, height, SurfaceType::Rough);

    // === Tee and green ===
    let tee = HexCoord::new(width / 2, 1);
    grid.set_surface(tee, SurfaceType::Tee);

    let green_radius = rng.random_range(2..=3);
    let shift = (dogleg.pull() * width as f64 * 0.2).round() as i32;
    let jitter = rng.random_range(-GREEN_COL_JITTER..=GREEN_COL_JITTER);
    let green_col = (width / 2 + shift + jitter).clamp(green_radius + 1, width - green_radius - 2);
    // Anywhere in the final sixth, pulled up when the green wouldn't fit
    let last_sixth = (height - (height / 6).max(1)).max(0);
    let green_row = rng
        .random_range(last_sixth..=(height - 1).max(last_sixth))
        .min(height - green_radius - 2)
        .max(tee.row + green_radius + 3);
    let green_center = HexCoord::new(green_col, green_row);
    for cell in grid.cells().collect::<Vec<_>>() {
        if hex_distance(green_center, cell) <= green_radius {
            grid.set_surface(cell, SurfaceType::Green);
        }
    }
    grid.set_surface(green_center, SurfaceType::Flag);

    // === Fairway ===
    let control = DVec2::new(
        width as f64 * 0.5 + dogleg.pull() * (width as f64 * 0.5 - 3.0).max(0.0),
        height as f64 * rng.random_range(0.4..0.6),
    );
    let fairway_path = paint_fairway(&mut grid, tee, control, green_center);

    // === Water ===
    let edge = if let Some(spec) = settings.forced_edge_water {
        Some((spec.side, spec.depth))
    } else if rng.random_bool(settings.edge_water_chance.clamp(0.0, 1.0)) {
        let side = if rng.random_bool(0.5) { EdgeSide::Left } else { EdgeSide::Right };
        Some((side, rng.random_range(2..=4)))
    } else {
        None
    };
    if let Some((side, depth)) = edge {
        // Edge water runs the full side; only Rough is flooded
        let placed = place_edge_water(&mut grid, side, depth, 0..height, noise_seed);
        log::debug!("Edge water on the {} side: {} cells", side.as_str(), placed);
    }
    if rng.random_bool(settings.pond_chance.clamp(0.0, 1.0)) {
        place_pond(&mut rng, &mut grid, settings.placement_attempts);
    }
    let island = rng.random_bool(settings.island_green_chance.clamp(0.0, 1.0));
    if island {
        let moat = surround_green(&mut grid, green_center, green_radius);
        log::debug!("Island green: {} moat cells", moat);
    }
    validate_water(&mut grid);

    // === Bunkers ===
    let greenside = place_greenside_bunkers(
        &mut rng,
        &mut grid,
        green_center,
        green_radius,
        settings.max_greenside_bunkers,
    );
    let fairway_bunkers = if rng.random_bool(settings.fairway_bunker_chance.clamp(0.0, 1.0)) {
        place_fairway_bunkers(&mut rng, &mut grid, settings.placement_attempts)
    } else {
        0
    };
    let clumps = place_edge_clumps(&mut rng, &mut grid);
    let stray = place_stray_sand(&mut rng, &mut grid, settings.stray_sand_chance);
    log::debug!(
        "Bunkers: {} greenside, {} fairway, {} edge clumps, {} stray sand",
        greenside,
        fairway_bunkers,
        clumps,
        stray
    );

    // === Rough and trim ===
    classify_rough(&mut rng, &mut grid, noise_seed, settings.tree_chance);
    let trimmed = organic_trim(&mut grid, noise_seed);
    validate_water(&mut grid);
    log::debug!("Trimmed {} cells", trimmed);

    // Tee, fairway and green must stay mutually reachable
    let mut carved = open_corridor(&mut grid, tee, green_center);
    if let Some(fairway) = grid
        .cells()
        .filter(|c| grid.surface(*c) == SurfaceType::Fairway)
        .min_by_key(|c| hex_distance(tee, *c))
    {
        carved += open_corridor(&mut grid, tee, fairway);
    }
    if carved > 0 {
        validate_water(&mut grid);
    }

    // === Elevation ===
    let landforms = generate_landforms(&mut rng, &grid);
    let noise = TerrainNoise::seeded(&mut rng, DEFAULT_TERRAIN_SCALE);
    synthesize(&mut grid, 0.0, &noise, &landforms);
    smooth_hazard_edges(&mut grid);

    log::info!(
        "Hole seed {}: par {}, {} yds, {}x{} grid, {} dogleg{}, {} water, {} sand, {} landforms",
        seed,
        par.strokes(),
        yardage,
        width,
        height,
        dogleg.as_str(),
        if island { ", island green" } else { "" },
        grid.count(SurfaceType::Water),
        grid.count(SurfaceType::Sand),
        landforms.len()
    );

    Hole {
        seed,
        par,
        yardage,
        grid,
        tee,
        green_center,
        green_radius,
        flag: green_center,
        dogleg,
        fairway_path,
        landforms,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::course::water::all_water_anchored;
    use crate::settings::{Difficulty, EdgeWaterSpec};
    use proptest::prelude::*;

    fn par3() -> CourseSettings {
        CourseSettings {
            par: Some(3),
            ..CourseSettings::default()
        }
    }

    fn corridor_intact(hole: &Hole) -> bool {
        let grid = &hole.grid;
        let reached = reachable_from(grid, hole.tee);
        let at = |c: HexCoord| grid.index_of(c).is_some_and(|i| reached[i]);
        let fairway_reached = grid
            .cells()
            .any(|c| grid.surface(c) == SurfaceType::Fairway && at(c));
        let green_reached = grid.cells().any(|c| grid.surface(c).is_green() && at(c));
        at(hole.tee) && fairway_reached && green_reached
    }

    #[test]
    fn test_par3_layout() {
        for seed in 0..10 {
            let hole = generate_hole(seed, &par3());
            assert_eq!(hole.par, Par::Three);
            assert!((150..=300).contains(&hole.yardage));
            assert_eq!(hole.height(), (hole.yardage / 10) as i32);
            assert!((10..=18).contains(&hole.width()));
            assert_eq!(hole.grid.count(SurfaceType::Tee), 1);
            assert!(hole.grid.count(SurfaceType::Green) >= 1);
            assert_eq!(hole.grid.surface(hole.flag), SurfaceType::Flag);
            assert_eq!(hole.dogleg, Dogleg::Straight);
        }
    }

    #[test]
    fn test_forced_left_edge_water() {
        let settings = CourseSettings {
            forced_edge_water: Some(EdgeWaterSpec {
                side: EdgeSide::Left,
                depth: 3,
            }),
            pond_chance: 0.0,
            island_green_chance: 0.0,
            ..CourseSettings::default()
        };
        for seed in 0..8 {
            let hole = generate_hole(seed, &settings);
            let grid = &hole.grid;
            for row in 0..grid.height() {
                let water = (0..grid.width())
                    .filter(|&c| grid.get(c, row) == SurfaceType::Water)
                    .count();
                assert!(water <= 10, "seed {} row {} has {} water", seed, row, water);
            }
            assert!(grid.count(SurfaceType::Water) > 0);
            assert!(all_water_anchored(grid));
        }
    }

    #[test]
    fn test_green_center_is_drawn() {
        let mut col_offsets = std::collections::HashSet::new();
        let mut rows = std::collections::HashSet::new();
        for seed in 0..60 {
            let hole = generate_hole(seed, &par3());
            let (h, r) = (hole.height(), hole.green_radius);
            let green = hole.green_center;
            assert!(green.row >= (h - h / 6).min(h - r - 2), "seed {} row {}", seed, green.row);
            assert!(green.row <= h - r - 2);
            assert!(green.col >= r + 1 && green.col <= hole.width() - r - 2);
            col_offsets.insert(green.col - hole.width() / 2);
            rows.insert(h - 1 - green.row);
        }
        assert!(col_offsets.len() > 1);
        assert!(rows.len() > 1);
    }

    #[test]
    fn test_rolled_edge_water_runs_full_side() {
        let settings = CourseSettings {
            edge_water_chance: 1.0,
            pond_chance: 0.0,
            island_green_chance: 0.0,
            ..CourseSettings::default()
        };
        for seed in 0..6 {
            let hole = generate_hole(seed, &settings);
            let grid = &hole.grid;
            let water_rows: Vec<i32> = (0..grid.height())
                .filter(|&row| (0..grid.width()).any(|c| grid.get(c, row) == SurfaceType::Water))
                .collect();
            let first = water_rows.first().copied().unwrap_or(grid.height());
            let last = water_rows.last().copied().unwrap_or(-1);
            assert!(first < 3, "seed {} water starts at row {}", seed, first);
            assert!(last >= grid.height() - 3, "seed {} water ends at row {}", seed, last);
        }
    }

    #[test]
    fn test_same_seed_same_hole() {
        let settings = CourseSettings::default();
        let a = generate_hole(77, &settings);
        let b = generate_hole(77, &settings);
        assert_eq!(a.grid, b.grid);
        assert_eq!(a.par, b.par);
        assert_eq!(a.landforms, b.landforms);
        let c = generate_hole(78, &settings);
        assert!(a.grid != c.grid || a.par != c.par);
    }

    #[test]
    fn test_dogleg_widens_grid() {
        let settings = CourseSettings {
            par: Some(5),
            dogleg_chance: 1.0,
            ..CourseSettings::default()
        };
        let hole = generate_hole(3, &settings);
        assert_ne!(hole.dogleg, Dogleg::Straight);
        assert!((24..=32).contains(&hole.width()));
    }

    #[test]
    fn test_fairway_width_profile() {
        assert!((fairway_width(0.0) - 3.0).abs() < 1e-9);
        assert!((fairway_width(0.5) - 10.0).abs() < 1e-9);
        assert!((fairway_width(1.0) - 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_fairway_skips_tee_and_green_surroundings() {
        let mut grid = TerrainGrid::new(14, 30, SurfaceType::Rough);
        let tee = HexCoord::new(7, 1);
        let green = HexCoord::new(7, 26);
        grid.set_surface(tee, SurfaceType::Tee);
        grid.set_surface(green, SurfaceType::Green);
        paint_fairway(&mut grid, tee, DVec2::new(7.0, 14.0), green);
        assert_eq!(grid.surface(tee), SurfaceType::Tee);
        for n in adjacent_cells(tee).into_iter().chain(adjacent_cells(green)) {
            assert_ne!(grid.surface(n), SurfaceType::Fairway);
        }
        assert_eq!(grid.get(7, 14), SurfaceType::Fairway);
    }

    #[test]
    fn test_open_corridor_carves_through_water() {
        let mut grid = TerrainGrid::new(9, 12, SurfaceType::Rough);
        for col in 0..9 {
            grid.set(col, 6, SurfaceType::Water);
            grid.set(col, 7, SurfaceType::Water);
        }
        let tee = HexCoord::new(4, 1);
        let green = HexCoord::new(4, 10);
        let carved = open_corridor(&mut grid, tee, green);
        assert!(carved >= 2);
        let reached = reachable_from(&grid, tee);
        assert!(reached[grid.index_of(green).unwrap()]);
        assert_eq!(open_corridor(&mut grid, tee, green), 0);
    }

    #[test]
    fn test_hard_preset_holes_stay_playable() {
        let settings = CourseSettings::from_preset(Difficulty::Hard);
        for seed in 100..110 {
            let hole = generate_hole(seed, &settings);
            assert!(corridor_intact(&hole), "seed {}", seed);
            assert!(all_water_anchored(&hole.grid), "seed {}", seed);
        }
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(24))]

        #[test]
        fn prop_no_floating_water(seed in any::<u64>()) {
            let hole = generate_hole(seed, &CourseSettings::default());
            prop_assert!(all_water_anchored(&hole.grid));
        }

        #[test]
        fn prop_tee_fairway_green_connected(seed in any::<u64>()) {
            let hole = generate_hole(seed, &CourseSettings::default());
            prop_assert!(corridor_intact(&hole));
        }
    }
}

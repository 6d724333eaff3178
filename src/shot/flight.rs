//! Animation steps and roll-out decisions
//!
//! A shot plays out as a chain of discrete tile hops: one flight, zero or
//! more bounces, an optional spin hop, or a hazard return. Each hop is an
//! [`AnimationStep`] with a fixed duration advanced by the engine's tick.

use glam::{DVec2, DVec3};
use serde::{Deserialize, Serialize};

use crate::course::TerrainGrid;
use crate::hex::{HexCoord, hex_distance, turn_left, turn_right};

/// Elevation drop between tiles that earns an extra bounce
pub const DROP_THRESHOLD: f64 = 0.3;
/// Elevation rise that ends the roll after the move
pub const RISE_THRESHOLD: f64 = 0.3;
/// A side tile must be this much lower than straight ahead to pull the ball
pub const SLOPE_PULL: f64 = 0.15;
/// Most extra bounces slopes can add to one shot
pub const MAX_EXTRA_BOUNCES: u32 = 3;

const FLIGHT_BASE_DURATION: f64 = 0.6;
const FLIGHT_DURATION_PER_TILE: f64 = 0.08;
const BOUNCE_DURATION: f64 = 0.25;
const BOUNCE_HEIGHT: f64 = 0.4;
/// Each successive bounce keeps this share of the previous one
const BOUNCE_DECAY: f64 = 0.6;
const SPIN_DURATION: f64 = 0.2;
const HAZARD_RETURN_DURATION: f64 = 0.5;
const HAZARD_RETURN_HEIGHT: f64 = 0.6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StepKind {
    Flight,
    /// 1-based bounce number
    Bounce(u32),
    Spin,
    HazardReturn,
}

/// One timed hop between two tiles
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnimationStep {
    pub kind: StepKind,
    pub from: HexCoord,
    pub to: HexCoord,
    pub from_pos: DVec3,
    pub to_pos: DVec3,
    pub duration: f64,
    pub elapsed: f64,
    /// Arc apex above the straight line between the endpoints
    pub peak_height: f64,
    /// Lateral bend at the widest point of the profile, world units
    pub curve: f64,
}

/// Lateral bend profile: 0 at both ends, widest at t = 1/sqrt(3)
#[inline]
pub fn bend_profile(t: f64) -> f64 {
    t - t * t * t
}

impl AnimationStep {
    fn new(kind: StepKind, from: (HexCoord, DVec3), to: (HexCoord, DVec3), duration: f64, peak: f64) -> Self {
        Self {
            kind,
            from: from.0,
            to: to.0,
            from_pos: from.1,
            to_pos: to.1,
            duration,
            elapsed: 0.0,
            peak_height: peak,
            curve: 0.0,
        }
    }

    /// Carry from the start tile to the landing tile. Longer carries take
    /// longer and fly higher; lofted clubs fly higher still.
    pub fn flight(from: (HexCoord, DVec3), to: (HexCoord, DVec3), arc_height: f64, loft: u8, curve: f64) -> Self {
        let tiles = hex_distance(from.0, to.0).max(1) as f64;
        let duration = FLIGHT_BASE_DURATION + FLIGHT_DURATION_PER_TILE * tiles;
        let peak = arc_height * (tiles / 10.0).clamp(0.3, 2.5) * (0.8 + 0.1 * loft as f64);
        let mut step = Self::new(StepKind::Flight, from, to, duration, peak);
        step.curve = curve;
        step
    }

    /// Roll-out hop; each bounce is shorter and lower than the last
    pub fn bounce(number: u32, from: (HexCoord, DVec3), to: (HexCoord, DVec3)) -> Self {
        let decay = BOUNCE_DECAY.powi(number.saturating_sub(1) as i32);
        Self::new(
            StepKind::Bounce(number),
            from,
            to,
            BOUNCE_DURATION * decay,
            BOUNCE_HEIGHT * decay,
        )
    }

    pub fn spin(from: (HexCoord, DVec3), to: (HexCoord, DVec3)) -> Self {
        Self::new(StepKind::Spin, from, to, SPIN_DURATION, 0.0)
    }

    /// Lift the ball out of a hazard back to a dry tile
    pub fn hazard_return(from: (HexCoord, DVec3), to: (HexCoord, DVec3)) -> Self {
        Self::new(StepKind::HazardReturn, from, to, HAZARD_RETURN_DURATION, HAZARD_RETURN_HEIGHT)
    }

    /// 0..=1
    pub fn progress(&self) -> f64 {
        if self.duration <= 0.0 {
            1.0
        } else {
            (self.elapsed / self.duration).clamp(0.0, 1.0)
        }
    }

    pub fn is_finished(&self) -> bool {
        self.elapsed >= self.duration
    }

    /// Advance by `dt`; returns the time left over past the end of the step
    pub fn advance(&mut self, dt: f64) -> f64 {
        self.elapsed += dt.max(0.0);
        let over = self.elapsed - self.duration;
        if over > 0.0 {
            self.elapsed = self.duration;
            over
        } else {
            0.0
        }
    }

    pub fn finish(&mut self) {
        self.elapsed = self.duration;
    }

    /// World position of the ball at normalized time `t`
    pub fn position_at(&self, t: f64) -> DVec3 {
        let t = t.clamp(0.0, 1.0);
        let mut pos = self.from_pos.lerp(self.to_pos, t);
        pos.y += self.peak_height * 4.0 * t * (1.0 - t);

        if self.curve != 0.0 {
            let travel = DVec2::new(self.to_pos.x - self.from_pos.x, self.to_pos.z - self.from_pos.z);
            // Heading down the hole (+z), positive curve bends toward +x
            let side = DVec2::new(travel.y, -travel.x).normalize_or_zero();
            let bend = side * self.curve * bend_profile(t);
            pos.x += bend.x;
            pos.z += bend.y;
        }
        pos
    }

    /// Current world position
    pub fn current_position(&self) -> DVec3 {
        self.position_at(self.progress())
    }
}

/// Next roll tile from `current` heading in `direction`.
///
/// Candidates are straight ahead and the two forward diagonals. The ball
/// goes straight unless the lower diagonal beats straight ahead by more than
/// [`SLOPE_PULL`]. Diagonals that are off the hole are never picked; a
/// straight tile that is off the hole is returned as-is so the caller can
/// stop the roll. Returns the tile and its direction index.
pub fn next_roll_tile(grid: &TerrainGrid, current: HexCoord, direction: usize) -> (HexCoord, usize) {
    let straight = current.neighbor(direction);
    if !grid.is_targetable(straight) {
        return (straight, direction);
    }
    let straight_elevation = grid.elevation(straight);

    let lowest_side = [turn_left(direction), turn_right(direction)]
        .into_iter()
        .map(|d| (current.neighbor(d), d))
        .filter(|(c, _)| grid.is_targetable(*c))
        .min_by(|a, b| {
            grid.elevation(a.0)
                .partial_cmp(&grid.elevation(b.0))
                .unwrap_or(std::cmp::Ordering::Equal)
        });

    match lowest_side {
        Some((cell, d)) if straight_elevation - grid.elevation(cell) > SLOPE_PULL => (cell, d),
        _ => (straight, direction),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::course::SurfaceType;

    fn pos(x: f64, z: f64) -> DVec3 {
        DVec3::new(x, 0.0, z)
    }

    #[test]
    fn test_flight_scales_with_distance() {
        let a = HexCoord::new(0, 0);
        let short = AnimationStep::flight((a, pos(0.0, 0.0)), (HexCoord::new(0, 4), pos(0.0, 4.0)), 3.0, 1, 0.0);
        let long = AnimationStep::flight((a, pos(0.0, 0.0)), (HexCoord::new(0, 20), pos(0.0, 20.0)), 3.0, 1, 0.0);
        assert!(long.duration > short.duration);
        assert!(long.peak_height > short.peak_height);
        assert!((short.duration - (0.6 + 0.08 * 4.0)).abs() < 1e-12);

        let lofted = AnimationStep::flight((a, pos(0.0, 0.0)), (HexCoord::new(0, 4), pos(0.0, 4.0)), 3.0, 5, 0.0);
        assert!(lofted.peak_height > short.peak_height);
    }

    #[test]
    fn test_position_profile() {
        let mut step = AnimationStep::flight(
            (HexCoord::new(0, 0), pos(0.0, 0.0)),
            (HexCoord::new(0, 10), pos(0.0, 10.0)),
            3.0,
            3,
            2.0,
        );
        assert_eq!(step.position_at(0.0), pos(0.0, 0.0));
        assert!((step.position_at(1.0) - pos(0.0, 10.0)).length() < 1e-12);
        let mid = step.position_at(0.5);
        assert!((mid.y - step.peak_height).abs() < 1e-12);
        // Travel is +z; positive curve bends toward +x
        assert!(mid.x > 0.0);
        assert!((mid.x - 2.0 * bend_profile(0.5)).abs() < 1e-12);

        let leftover = step.advance(step.duration + 0.1);
        assert!((leftover - 0.1).abs() < 1e-9);
        assert!(step.is_finished());
        assert_eq!(step.progress(), 1.0);
    }

    #[test]
    fn test_bounces_decay() {
        let a = (HexCoord::new(0, 0), pos(0.0, 0.0));
        let b = (HexCoord::new(0, 1), pos(0.0, 1.0));
        let first = AnimationStep::bounce(1, a, b);
        let third = AnimationStep::bounce(3, a, b);
        assert!((first.peak_height - 0.4).abs() < 1e-12);
        assert!((third.peak_height - 0.4 * 0.36).abs() < 1e-12);
        assert!(third.duration < first.duration);
    }

    #[test]
    fn test_roll_prefers_clearly_lower_side() {
        let mut grid = TerrainGrid::new(9, 9, SurfaceType::Fairway);
        let current = HexCoord::new(4, 4);
        let straight = current.neighbor(2);
        let left = current.neighbor(turn_left(2));

        assert_eq!(next_roll_tile(&grid, current, 2), (straight, 2));

        // Slightly lower: not enough to pull
        grid.set_elevation(left.col, left.row, -0.1);
        assert_eq!(next_roll_tile(&grid, current, 2), (straight, 2));

        grid.set_elevation(left.col, left.row, -0.5);
        assert_eq!(next_roll_tile(&grid, current, 2), (left, turn_left(2)));

        // Off-hole straight tile is reported for the caller to stop on
        grid.set_surface(straight, SurfaceType::Empty);
        assert_eq!(next_roll_tile(&grid, current, 2), (straight, 2));
    }
}

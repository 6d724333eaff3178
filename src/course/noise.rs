//! Deterministic coordinate-seeded noise
//!
//! Two flavors:
//! - [`base_noise`]: cheap sine sum used to wobble classification thresholds
//!   (deep rough boundary, tree placement, edge trimming). Never elevation.
//! - [`TerrainNoise`]: 4-octave sin·cos field used for elevation.

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Sine-sum noise in roughly [-1, 1]
#[inline]
pub fn base_noise(col: i32, row: i32, seed: f64) -> f64 {
    let x = col as f64 * 0.3 + seed;
    let y = row as f64 * 0.3;
    ((1.2 * x + 0.8 * y).sin() + (0.7 * x - 1.3 * y).sin() + (x + y).sin()) / 3.0
}

/// Octave amplitudes, coarse to fine
pub const OCTAVE_AMPLITUDES: [f64; 4] = [0.5, 0.25, 0.12, 0.06];
/// Octave frequencies as multiples of the base scale
pub const OCTAVE_FREQUENCIES: [f64; 4] = [0.5, 1.2, 2.5, 4.0];

/// Default base frequency for elevation noise (cycles per cell, roughly)
pub const DEFAULT_TERRAIN_SCALE: f64 = 0.35;

/// Per-hole elevation noise field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TerrainNoise {
    /// Base frequency
    pub scale: f64,
    /// Global amplitude multiplier (0 disables the field)
    pub amplitude: f64,
    /// Per-octave phase offsets (x, y)
    pub phases: [(f64, f64); 4],
}

impl TerrainNoise {
    /// Draw per-octave phases from the hole RNG
    pub fn seeded<R: Rng>(rng: &mut R, scale: f64) -> Self {
        let phases = std::array::from_fn(|_| {
            (
                rng.random_range(0.0..std::f64::consts::TAU),
                rng.random_range(0.0..std::f64::consts::TAU),
            )
        });
        Self {
            scale,
            amplitude: 1.0,
            phases,
        }
    }

    /// A field that contributes nothing
    pub fn flat() -> Self {
        Self {
            scale: DEFAULT_TERRAIN_SCALE,
            amplitude: 0.0,
            phases: [(0.0, 0.0); 4],
        }
    }

    /// Sample at a cell. Range is about ±0.93 × amplitude.
    pub fn sample(&self, col: i32, row: i32) -> f64 {
        if self.amplitude == 0.0 {
            return 0.0;
        }
        let x = col as f64;
        let y = row as f64;
        let mut total = 0.0;
        for octave in 0..4 {
            let f = self.scale * OCTAVE_FREQUENCIES[octave];
            let (px, py) = self.phases[octave];
            total += OCTAVE_AMPLITUDES[octave] * (x * f + px).sin() * (y * f + py).cos();
        }
        total * self.amplitude
    }
}

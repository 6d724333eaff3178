//! Parametric landform primitives
//!
//! Landforms only shape elevation; they never change a cell's surface. All
//! positions are in grid space (x = column, y = row).

use std::f64::consts::PI;

use glam::DVec2;
use serde::{Deserialize, Serialize};

/// Cosine falloff: 1 at t = 0, 0 at t >= 1
#[inline]
pub fn cosine_falloff(t: f64) -> f64 {
    if t >= 1.0 {
        0.0
    } else {
        0.5 * (1.0 + (PI * t.max(0.0)).cos())
    }
}

/// Smooth ramp from 0 to 1 over the first and last `fraction` of [0, 1]
fn end_taper(s: f64, fraction: f64) -> f64 {
    let ramp = |x: f64| 0.5 * (1.0 - (PI * x.clamp(0.0, 1.0)).cos());
    if s < fraction {
        ramp(s / fraction)
    } else if s > 1.0 - fraction {
        ramp((1.0 - s) / fraction)
    } else {
        1.0
    }
}

/// Radially symmetric bump (or dip, for negative amplitude)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Dome {
    pub center: DVec2,
    pub radius: f64,
    /// Peak height; negative digs a depression
    pub amplitude: f64,
    pub falloff: f64,
}

impl Dome {
    pub fn contribution(&self, p: DVec2) -> f64 {
        let reach = self.radius * self.falloff;
        if reach <= 0.0 {
            return 0.0;
        }
        self.amplitude * cosine_falloff(p.distance(self.center) / reach)
    }
}

/// Straight raised spine
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Ridge {
    pub origin: DVec2,
    /// Heading in radians (0 = +column)
    pub angle: f64,
    pub length: f64,
    pub width: f64,
    pub height: f64,
    pub falloff: f64,
}

/// Fraction of a ridge's length over which its ends taper
pub const RIDGE_TAPER: f64 = 0.2;

impl Ridge {
    pub fn contribution(&self, p: DVec2) -> f64 {
        if self.length <= 0.0 || self.width <= 0.0 {
            return 0.0;
        }
        let axis = DVec2::from_angle(self.angle);
        let d = p - self.origin;
        let along = d.dot(axis);
        if along < 0.0 || along > self.length {
            return 0.0;
        }
        let perp = d.perp_dot(axis).abs();
        let cross = cosine_falloff(perp / (self.width * self.falloff));
        self.height * cross * end_taper(along / self.length, RIDGE_TAPER)
    }
}

/// Shallow curved drainage channel with a U-shaped cross-section
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Swale {
    pub origin: DVec2,
    pub angle: f64,
    pub length: f64,
    /// Full width of the channel
    pub width: f64,
    /// Positive depth; the contribution is negative
    pub depth: f64,
    /// Lateral drift of the centerline; the drift rate grows linearly along
    /// the channel so the end bends by `curvature * length / 2` cells
    pub curvature: f64,
}

/// Fraction of a swale's length over which its ends taper
pub const SWALE_TAPER: f64 = 0.15;

impl Swale {
    /// Centerline lateral offset at normalized position `s`
    fn drift(&self, s: f64) -> f64 {
        self.curvature * self.length * s * s * 0.5
    }

    pub fn contribution(&self, p: DVec2) -> f64 {
        if self.length <= 0.0 || self.width <= 0.0 {
            return 0.0;
        }
        let axis = DVec2::from_angle(self.angle);
        let d = p - self.origin;
        let along = d.dot(axis);
        if along < 0.0 || along > self.length {
            return 0.0;
        }
        let s = along / self.length;
        let lateral = d.perp_dot(axis) - self.drift(s);
        let half = self.width * 0.5;
        let u = lateral / half;
        if u.abs() >= 1.0 {
            return 0.0;
        }
        -self.depth * (1.0 - u * u) * end_taper(s, SWALE_TAPER)
    }
}

/// A named elevation-shaping primitive
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Landform {
    Hill(Dome),
    Mound(Dome),
    Valley(Dome),
    Dune(Dome),
    Ridge(Ridge),
    Swale(Swale),
}

impl Landform {
    pub fn hill(center: DVec2, radius: f64, height: f64, falloff: f64) -> Self {
        Landform::Hill(Dome {
            center,
            radius,
            amplitude: height,
            falloff,
        })
    }

    pub fn mound(center: DVec2, radius: f64, height: f64, falloff: f64) -> Self {
        Landform::Mound(Dome {
            center,
            radius,
            amplitude: height,
            falloff,
        })
    }

    /// `depth` is positive; the valley lowers terrain
    pub fn valley(center: DVec2, radius: f64, depth: f64, falloff: f64) -> Self {
        Landform::Valley(Dome {
            center,
            radius,
            amplitude: -depth.abs(),
            falloff,
        })
    }

    pub fn dune(center: DVec2, radius: f64, height: f64, falloff: f64) -> Self {
        Landform::Dune(Dome {
            center,
            radius,
            amplitude: height,
            falloff,
        })
    }

    pub fn name(&self) -> &'static str {
        match self {
            Landform::Hill(_) => "hill",
            Landform::Mound(_) => "mound",
            Landform::Valley(_) => "valley",
            Landform::Dune(_) => "dune",
            Landform::Ridge(_) => "ridge",
            Landform::Swale(_) => "swale",
        }
    }

    /// Elevation contribution at a grid-space point
    pub fn contribution(&self, p: DVec2) -> f64 {
        match self {
            Landform::Hill(d) | Landform::Mound(d) | Landform::Valley(d) | Landform::Dune(d) => {
                d.contribution(p)
            }
            Landform::Ridge(r) => r.contribution(p),
            Landform::Swale(s) => s.contribution(p),
        }
    }

    /// Contribution at a cell center
    #[inline]
    pub fn contribution_at(&self, col: i32, row: i32) -> f64 {
        self.contribution(DVec2::new(col as f64, row as f64))
    }
}

/// Sum of all landform contributions at a cell
pub fn total_contribution(landforms: &[Landform], col: i32, row: i32) -> f64 {
    landforms.iter().map(|l| l.contribution_at(col, row)).sum()
}

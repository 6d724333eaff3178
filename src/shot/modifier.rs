//! Modifier sources and the five-phase pipeline
//!
//! Cards, items, lie and weather all feed a shot the same way: they register
//! a [`ModifierSource`] and get a mutable look at the [`ShotContext`] at each
//! phase. Sources run in registration order.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::club::Club;
use super::context::{ShotContext, Spin};
use crate::course::SurfaceType;

/// Hook points in a shot's life
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShotPhase {
    /// Shot started; adjust power/accuracy/roll before range gating
    BeforeAim,
    /// Target locked; adjust AOE offset and curve
    OnAoe,
    /// Shot confirmed; last chance before the landing tile is drawn
    OnLanding,
    /// Ball at rest; adjust chips and mult
    OnScoring,
    /// Shot fully resolved
    AfterShot,
}

impl ShotPhase {
    pub const ALL: [ShotPhase; 5] = [
        ShotPhase::BeforeAim,
        ShotPhase::OnAoe,
        ShotPhase::OnLanding,
        ShotPhase::OnScoring,
        ShotPhase::AfterShot,
    ];
}

/// Something that modifies shots. Every hook defaults to a no-op.
pub trait ModifierSource {
    fn name(&self) -> &str;

    fn before_aim(&mut self, _ctx: &mut ShotContext) {}
    fn on_aoe(&mut self, _ctx: &mut ShotContext) {}
    fn on_landing(&mut self, _ctx: &mut ShotContext) {}
    fn on_scoring(&mut self, _ctx: &mut ShotContext) {}
    fn after_shot(&mut self, _ctx: &mut ShotContext) {}
}

/// Handle returned by [`ModifierPipeline::register`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ModifierId(pub u32);

/// Ordered registry of modifier sources
#[derive(Default)]
pub struct ModifierPipeline {
    sources: Vec<(ModifierId, Box<dyn ModifierSource>)>,
    next_id: u32,
}

impl ModifierPipeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a source; it runs after everything registered before it
    pub fn register(&mut self, source: Box<dyn ModifierSource>) -> ModifierId {
        let id = ModifierId(self.next_id);
        self.next_id += 1;
        log::debug!("Registered modifier {} as {:?}", source.name(), id);
        self.sources.push((id, source));
        id
    }

    /// Remove a source. Returns it, or `None` for an unknown id.
    pub fn deregister(&mut self, id: ModifierId) -> Option<Box<dyn ModifierSource>> {
        let index = self.sources.iter().position(|(sid, _)| *sid == id)?;
        Some(self.sources.remove(index).1)
    }

    /// Invoke every source's hook for `phase`, in registration order
    pub fn run(&mut self, phase: ShotPhase, ctx: &mut ShotContext) {
        for (_, source) in self.sources.iter_mut() {
            match phase {
                ShotPhase::BeforeAim => source.before_aim(ctx),
                ShotPhase::OnAoe => source.on_aoe(ctx),
                ShotPhase::OnLanding => source.on_landing(ctx),
                ShotPhase::OnScoring => source.on_scoring(ctx),
                ShotPhase::AfterShot => source.after_shot(ctx),
            }
        }
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    /// Registered source names, in run order
    pub fn names(&self) -> Vec<&str> {
        self.sources.iter().map(|(_, s)| s.name()).collect()
    }
}

// === Reference sources ===

/// Penalties for hitting from a bad lie
#[derive(Debug, Clone, Copy, Default)]
pub struct LieEffect;

impl LieEffect {
    /// (power, accuracy, roll) deltas for a lie and club
    pub fn penalties(lie: SurfaceType, club: Club) -> (i32, i32, i32) {
        match lie {
            SurfaceType::Rough => (-2, 1, 0),
            SurfaceType::DeepRough => (-4, 1, -1),
            SurfaceType::Sand if club == Club::SandWedge => (-1, 1, 0),
            SurfaceType::Sand => (-5, 1, 0),
            SurfaceType::Tree => (-6, 2, 0),
            _ => (0, 0, 0),
        }
    }
}

impl ModifierSource for LieEffect {
    fn name(&self) -> &str {
        "lie"
    }

    fn before_aim(&mut self, ctx: &mut ShotContext) {
        let (power, accuracy, roll) = Self::penalties(ctx.lie, ctx.club);
        ctx.power_modifier += power;
        ctx.accuracy_modifier += accuracy;
        ctx.roll_modifier += roll;
    }
}

/// Crosswind, rerolled every shot from its own seeded stream
#[derive(Debug, Clone)]
pub struct Wind {
    rng: Pcg32,
    /// Largest lateral push in tiles at full loft
    pub max_strength: f64,
    /// This shot's push (negative toward column 0)
    pub strength: f64,
}

impl Wind {
    pub fn seeded(seed: u64, max_strength: f64) -> Self {
        Self {
            rng: Pcg32::seed_from_u64(seed),
            max_strength: max_strength.abs(),
            strength: 0.0,
        }
    }
}

impl ModifierSource for Wind {
    fn name(&self) -> &str {
        "wind"
    }

    fn before_aim(&mut self, _ctx: &mut ShotContext) {
        self.strength = if self.max_strength > 0.0 {
            self.rng.random_range(-self.max_strength..=self.max_strength)
        } else {
            0.0
        };
    }

    fn on_aoe(&mut self, ctx: &mut ShotContext) {
        // High shots hang in the air longer
        let push = self.strength * ctx.base.loft as f64 / 5.0;
        ctx.curve += push;
        let shift = push.round() as i32;
        if shift != 0 {
            ctx.aoe_offset += shift;
        }
    }
}

/// Deliberate curve
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ShotShape {
    /// Bends toward column 0
    Draw,
    /// Bends toward the last column
    Fade,
}

/// Curve magnitude for a shaped shot, in tiles
pub const SHAPE_CURVE: f64 = 0.6;

impl ModifierSource for ShotShape {
    fn name(&self) -> &str {
        match self {
            ShotShape::Draw => "draw",
            ShotShape::Fade => "fade",
        }
    }

    fn on_aoe(&mut self, ctx: &mut ShotContext) {
        let sign = match self {
            ShotShape::Draw => -1,
            ShotShape::Fade => 1,
        };
        ctx.aoe_offset += sign;
        ctx.curve += sign as f64 * SHAPE_CURVE;
    }
}

/// Applies spin at landing
#[derive(Debug, Clone, Copy)]
pub struct SpinCard {
    pub spin: Spin,
}

impl ModifierSource for SpinCard {
    fn name(&self) -> &str {
        match self.spin {
            Spin::Topspin => "topspin",
            Spin::Backspin => "backspin",
            Spin::None => "no spin",
        }
    }

    fn on_landing(&mut self, ctx: &mut ShotContext) {
        ctx.spin = self.spin;
    }
}

/// Flat stat bonuses from a card or item
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct StatBoost {
    pub power: i32,
    pub accuracy: i32,
    pub roll: i32,
    pub chips: i32,
    /// Multiplies the shot's mult (1.0 = none)
    pub mult: f32,
}

impl ModifierSource for StatBoost {
    fn name(&self) -> &str {
        "stat boost"
    }

    fn before_aim(&mut self, ctx: &mut ShotContext) {
        ctx.power_modifier += self.power;
        ctx.accuracy_modifier += self.accuracy;
        ctx.roll_modifier += self.roll;
    }

    fn on_scoring(&mut self, ctx: &mut ShotContext) {
        ctx.chips += self.chips;
        if self.mult > 0.0 {
            ctx.mult *= self.mult;
        }
    }
}

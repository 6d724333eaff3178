//! Shot resolution state machine
//!
//! ```text
//! Idle -> Aiming -> AoeComputed -> Confirmed -> Animating(Flight)
//!      -> Animating(Bounce n)* -> Animating(Spin)? -> Completed -> Idle
//!                               \-> Animating(HazardReturn) -> Completed
//! reaching the flag at any point -> HoleComplete
//! ```
//!
//! Input collaborators drive it with `start_shot`, `lock_target`,
//! `confirm_shot` and `tick`/`skip`; renderers read the ball position and
//! drain [`EngineEvent`]s.

use glam::DVec3;
use rand::SeedableRng;
use rand::seq::IndexedRandom;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::club::Club;
use super::context::{ShotContext, ShotOutcome, Spin};
use super::flight::{AnimationStep, DROP_THRESHOLD, MAX_EXTRA_BOUNCES, RISE_THRESHOLD, StepKind, next_roll_tile};
use super::modifier::{ModifierPipeline, ShotPhase};
use crate::course::{Hole, SurfaceType};
use crate::hex::{HexCoord, HexLayout, adjacent_cells, direction_between, hex_distance, outer_ring, reverse};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EngineState {
    /// Waiting for the next shot
    Idle,
    /// Club chosen, no target
    Aiming,
    /// Target locked and landing area known
    AoeComputed,
    /// Landing tile drawn, flight not started yet
    Confirmed,
    Animating(StepKind),
    /// Ball at rest; call `next_shot`
    Completed,
    /// Ball reached the flag
    HoleComplete,
}

/// Why a target can't be locked
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TargetRejection {
    #[error("no shot is being aimed (engine is {0:?})")]
    WrongState(EngineState),
    #[error("{0:?} is outside the hole")]
    OutOfBounds(HexCoord),
    #[error("{0:?} is not part of the hole")]
    EmptyTile(HexCoord),
    #[error("cannot target the ball's own tile")]
    BallTile,
    #[error("target is behind the ball")]
    BehindBall,
    #[error("target is {distance} tiles away; club reaches {max}")]
    OutOfRange { distance: i32, max: i32 },
}

/// Engine operation called in the wrong state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum EngineError {
    #[error("cannot {action} while {state:?}")]
    WrongState { action: &'static str, state: EngineState },
}

/// Notifications for renderers, audio and scoring collaborators
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EngineEvent {
    ShotStarted { shot_index: u32, club: Club },
    TargetLocked { aim: HexCoord, center: HexCoord, tiles: usize },
    ShotConfirmed { landing: HexCoord },
    StepStarted { kind: StepKind, from: HexCoord, to: HexCoord },
    Landed { tile: HexCoord, surface: SurfaceType },
    Bounced { number: u32, tile: HexCoord },
    WaterHazard { tile: HexCoord, return_to: HexCoord },
    ShotCompleted { tile: HexCoord, outcome: ShotOutcome, final_score: i32 },
    HoleComplete { strokes: u32 },
}

/// AOE ring weights: center, ring 1, ring 2
const AOE_WEIGHTS: [u32; 3] = [3, 2, 1];

/// Guard against runaway step chains in `tick`/`skip`
const MAX_STEPS_PER_ADVANCE: usize = 256;

/// Base chips for where the ball stopped
pub fn terrain_bonus(surface: SurfaceType) -> i32 {
    match surface {
        SurfaceType::Fairway => 5,
        SurfaceType::Green => 10,
        SurfaceType::Flag => 50,
        SurfaceType::DeepRough => -2,
        SurfaceType::Sand => -3,
        SurfaceType::Tree => -4,
        SurfaceType::Water => -5,
        _ => 0,
    }
}

/// Roll-out bookkeeping for the shot in flight
#[derive(Debug, Clone, Copy, Default)]
struct Rollout {
    direction: usize,
    remaining: i32,
    extra: u32,
    bounces: u32,
    /// Hops travelled, carry included
    tiles: i32,
}

pub struct ShotEngine {
    hole: Hole,
    layout: HexLayout,
    pipeline: ModifierPipeline,
    rng: Pcg32,
    state: EngineState,

    ball: HexCoord,
    /// Strokes so far, penalties included; also the next shot's index
    strokes: u32,

    ctx: Option<ShotContext>,
    /// Context as it was before `OnAoe`, restored on re-lock
    aim_snapshot: Option<ShotContext>,
    aoe: Vec<HexCoord>,
    aoe_weights: Vec<u32>,

    step: Option<AnimationStep>,
    rollout: Rollout,
    events: Vec<EngineEvent>,
}

impl ShotEngine {
    /// Engine for a hole with the ball on the tee. `seed` drives landing
    /// draws.
    pub fn new(hole: Hole, seed: u64) -> Self {
        Self::with_layout(hole, HexLayout::default(), seed)
    }

    pub fn with_layout(hole: Hole, layout: HexLayout, seed: u64) -> Self {
        let ball = hole.tee;
        Self {
            hole,
            layout,
            pipeline: ModifierPipeline::new(),
            rng: Pcg32::seed_from_u64(seed),
            state: EngineState::Idle,
            ball,
            strokes: 0,
            ctx: None,
            aim_snapshot: None,
            aoe: Vec::new(),
            aoe_weights: Vec::new(),
            step: None,
            rollout: Rollout::default(),
            events: Vec::new(),
        }
    }

    // === Accessors ===

    pub fn hole(&self) -> &Hole {
        &self.hole
    }

    pub fn layout(&self) -> &HexLayout {
        &self.layout
    }

    pub fn state(&self) -> EngineState {
        self.state
    }

    pub fn ball(&self) -> HexCoord {
        self.ball
    }

    /// Strokes on this hole, penalties included
    pub fn strokes(&self) -> u32 {
        self.strokes
    }

    /// Current (or most recent) shot
    pub fn context(&self) -> Option<&ShotContext> {
        self.ctx.as_ref()
    }

    /// Landing area of the locked target
    pub fn aoe(&self) -> &[HexCoord] {
        &self.aoe
    }

    pub fn current_step(&self) -> Option<&AnimationStep> {
        self.step.as_ref()
    }

    pub fn pipeline_mut(&mut self) -> &mut ModifierPipeline {
        &mut self.pipeline
    }

    pub fn drain_events(&mut self) -> Vec<EngineEvent> {
        std::mem::take(&mut self.events)
    }

    /// World position of a tile's surface
    pub fn tile_world_position(&self, cell: HexCoord) -> DVec3 {
        self.layout.world_position(cell) + DVec3::Y * self.hole.grid.elevation(cell)
    }

    /// Ball position, interpolated along the current step while animating
    pub fn ball_world_position(&self) -> DVec3 {
        match &self.step {
            Some(step) => step.current_position(),
            None => self.tile_world_position(self.ball),
        }
    }

    fn wrong_state(&self, action: &'static str) -> EngineError {
        EngineError::WrongState {
            action,
            state: self.state,
        }
    }

    // === Aiming ===

    /// Begin a shot from the ball's tile
    pub fn start_shot(&mut self, club: Club) -> Result<(), EngineError> {
        if self.state != EngineState::Idle {
            return Err(self.wrong_state("start a shot"));
        }
        let lie = self.hole.grid.surface(self.ball);
        let mut ctx = ShotContext::new(self.ball, self.strokes, club, lie);
        self.pipeline.run(ShotPhase::BeforeAim, &mut ctx);
        log::debug!(
            "Shot {} with {} from {} (range {})",
            self.strokes + 1,
            club.name(),
            lie.as_str(),
            ctx.current_distance()
        );
        self.ctx = Some(ctx);
        self.aim_snapshot = None;
        self.aoe.clear();
        self.aoe_weights.clear();
        self.rollout = Rollout::default();
        self.state = EngineState::Aiming;
        self.events.push(EngineEvent::ShotStarted {
            shot_index: self.strokes,
            club,
        });
        Ok(())
    }

    /// Swap clubs mid-aim. Modifiers stay; a locked target is released.
    pub fn select_club(&mut self, club: Club) -> Result<(), EngineError> {
        match self.state {
            EngineState::Aiming => {}
            EngineState::AoeComputed => {
                if let Some(snapshot) = self.aim_snapshot.take() {
                    self.ctx = Some(snapshot);
                }
                self.aoe.clear();
                self.aoe_weights.clear();
                self.state = EngineState::Aiming;
            }
            _ => return Err(self.wrong_state("change clubs")),
        }
        if let Some(ctx) = self.ctx.as_mut() {
            ctx.set_club(club);
        }
        Ok(())
    }

    /// Forward means a larger row, unless the flag is level with or behind
    /// the ball, in which case any row goes
    pub fn is_forward_from_ball(&self, cell: HexCoord) -> bool {
        cell.row > self.ball.row || self.hole.flag.row <= self.ball.row
    }

    /// The context targets are validated against: pre-`OnAoe` when locked
    fn aiming_context(&self) -> Option<&ShotContext> {
        match self.state {
            EngineState::Aiming => self.ctx.as_ref(),
            EngineState::AoeComputed => self.aim_snapshot.as_ref().or(self.ctx.as_ref()),
            _ => None,
        }
    }

    fn validate_target(&self, ctx: &ShotContext, cell: HexCoord) -> Result<(), TargetRejection> {
        let grid = &self.hole.grid;
        if !grid.contains(cell) {
            return Err(TargetRejection::OutOfBounds(cell));
        }
        if !grid.is_targetable(cell) {
            return Err(TargetRejection::EmptyTile(cell));
        }
        if cell == self.ball {
            return Err(TargetRejection::BallTile);
        }
        if !self.is_forward_from_ball(cell) {
            return Err(TargetRejection::BehindBall);
        }
        let distance = hex_distance(self.ball, cell);
        let max = ctx.current_distance();
        if distance > max {
            return Err(TargetRejection::OutOfRange { distance, max });
        }
        Ok(())
    }

    /// Whether `cell` can be targeted by the shot being aimed
    pub fn is_tile_available(&self, cell: HexCoord) -> bool {
        self.aiming_context()
            .is_some_and(|ctx| self.validate_target(ctx, cell).is_ok())
    }

    /// Landing candidates around `ctx`'s aim, with draw weights
    fn landing_area(&self, ctx: &ShotContext) -> Vec<(HexCoord, u32)> {
        let Some(aim) = ctx.aim_tile else { return Vec::new() };
        let center = aim.shifted_columns(ctx.aoe_offset);
        let radius = ctx.accuracy_radius();

        let mut area = vec![(center, AOE_WEIGHTS[0])];
        if radius >= 1 {
            area.extend(adjacent_cells(center).into_iter().map(|c| (c, AOE_WEIGHTS[1])));
        }
        if radius >= 2 {
            area.extend(outer_ring(center).into_iter().map(|c| (c, AOE_WEIGHTS[2])));
        }
        area.retain(|(c, _)| self.hole.grid.is_targetable(*c));
        if area.is_empty() {
            // Shifted clean off the hole: fall back to the aim tile
            area.push((aim, AOE_WEIGHTS[0]));
        }
        area
    }

    /// Lock a target and compute the landing area. Re-locking discards the
    /// previous lock's `OnAoe` effects first. Rejections change nothing.
    pub fn lock_target(&mut self, cell: HexCoord) -> Result<&[HexCoord], TargetRejection> {
        let base = self
            .aiming_context()
            .cloned()
            .ok_or(TargetRejection::WrongState(self.state))?;
        self.validate_target(&base, cell)?;

        let mut ctx = base.clone();
        ctx.aim_tile = Some(cell);
        self.pipeline.run(ShotPhase::OnAoe, &mut ctx);

        let area = self.landing_area(&ctx);
        self.aoe = area.iter().map(|(c, _)| *c).collect();
        self.aoe_weights = area.iter().map(|(_, w)| *w).collect();
        self.events.push(EngineEvent::TargetLocked {
            aim: cell,
            center: cell.shifted_columns(ctx.aoe_offset),
            tiles: self.aoe.len(),
        });

        self.aim_snapshot = Some(base);
        self.ctx = Some(ctx);
        self.state = EngineState::AoeComputed;
        Ok(&self.aoe)
    }

    /// Abandon the shot being aimed
    pub fn cancel(&mut self) -> Result<(), EngineError> {
        if !matches!(self.state, EngineState::Aiming | EngineState::AoeComputed) {
            return Err(self.wrong_state("cancel"));
        }
        self.ctx = None;
        self.aim_snapshot = None;
        self.aoe.clear();
        self.aoe_weights.clear();
        self.state = EngineState::Idle;
        Ok(())
    }

    // === Resolution ===

    /// Draw the landing tile, count the stroke and queue the flight
    pub fn confirm_shot(&mut self) -> Result<HexCoord, EngineError> {
        if self.state != EngineState::AoeComputed {
            return Err(self.wrong_state("confirm a shot"));
        }
        let Some(mut ctx) = self.ctx.take() else {
            return Err(self.wrong_state("confirm a shot"));
        };
        self.pipeline.run(ShotPhase::OnLanding, &mut ctx);

        let weighted: Vec<(HexCoord, u32)> = self.aoe.iter().copied().zip(self.aoe_weights.iter().copied()).collect();
        let aim = ctx.aim_tile.unwrap_or(self.ball);
        let landing = weighted
            .choose_weighted(&mut self.rng, |(_, w)| *w)
            .map(|(c, _)| *c)
            .unwrap_or(aim);

        ctx.landing_tile = Some(landing);
        self.strokes += 1;

        let from = (ctx.start_tile, self.tile_world_position(ctx.start_tile));
        let to = (landing, self.tile_world_position(landing));
        let step = AnimationStep::flight(
            from,
            to,
            ctx.base.arc_height,
            ctx.base.loft,
            ctx.curve * self.layout.tile_size,
        );
        self.events.push(EngineEvent::ShotConfirmed { landing });
        self.events.push(EngineEvent::StepStarted {
            kind: step.kind,
            from: step.from,
            to: step.to,
        });

        self.ctx = Some(ctx);
        self.aim_snapshot = None;
        self.step = Some(step);
        self.rollout = Rollout::default();
        self.state = EngineState::Confirmed;
        Ok(landing)
    }

    fn is_animating(&self) -> bool {
        matches!(self.state, EngineState::Animating(_))
    }

    fn begin_animation(&mut self) {
        if self.state == EngineState::Confirmed {
            self.state = EngineState::Animating(StepKind::Flight);
        }
    }

    /// Advance the current animation by `dt` seconds, resolving each step
    /// as it finishes
    pub fn tick(&mut self, dt: f64) {
        self.begin_animation();
        let mut dt = dt;
        for _ in 0..MAX_STEPS_PER_ADVANCE {
            if !self.is_animating() {
                break;
            }
            let Some(step) = self.step.as_mut() else { break };
            let leftover = step.advance(dt);
            if !step.is_finished() {
                break;
            }
            self.finish_step();
            if leftover <= 0.0 {
                break;
            }
            dt = leftover;
        }
    }

    /// Finish every remaining step immediately
    pub fn skip(&mut self) {
        self.begin_animation();
        for _ in 0..MAX_STEPS_PER_ADVANCE {
            if !self.is_animating() {
                break;
            }
            let Some(step) = self.step.as_mut() else { break };
            step.finish();
            self.finish_step();
        }
    }

    /// Completed -> Idle
    pub fn next_shot(&mut self) -> Result<(), EngineError> {
        if self.state != EngineState::Completed {
            return Err(self.wrong_state("move to the next shot"));
        }
        self.step = None;
        self.state = EngineState::Idle;
        Ok(())
    }

    fn begin_step(&mut self, step: AnimationStep) {
        self.events.push(EngineEvent::StepStarted {
            kind: step.kind,
            from: step.from,
            to: step.to,
        });
        self.state = EngineState::Animating(step.kind);
        self.step = Some(step);
    }

    fn finish_step(&mut self) {
        let Some(step) = self.step.take() else { return };
        match step.kind {
            StepKind::Flight => self.on_landed(step.from, step.to),
            StepKind::Bounce(_) => self.on_bounced(step.from, step.to),
            StepKind::Spin => {
                self.ball = step.to;
                self.rollout.tiles += 1;
                if !self.arrive(step.from, step.to) {
                    self.complete(ShotOutcome::InPlay);
                }
            }
            StepKind::HazardReturn => {
                self.ball = step.to;
                self.complete(ShotOutcome::Water);
            }
        }
    }

    /// Stop conditions shared by every arrival. Returns true when the shot
    /// has been resolved (or handed to a hazard return).
    fn arrive(&mut self, previous: HexCoord, tile: HexCoord) -> bool {
        let surface = self.hole.grid.surface(tile);
        if tile == self.hole.flag || surface == SurfaceType::Flag {
            if let Some(ctx) = self.ctx.as_mut() {
                ctx.flags.reached_flag = true;
            }
            self.complete(ShotOutcome::Holed);
            return true;
        }
        match surface {
            SurfaceType::Water => {
                self.strokes += 1;
                if let Some(ctx) = self.ctx.as_mut() {
                    ctx.flags.hit_water = true;
                    ctx.flags.penalty_strokes = 1;
                }
                self.events.push(EngineEvent::WaterHazard {
                    tile,
                    return_to: previous,
                });
                let step = AnimationStep::hazard_return(
                    (tile, self.tile_world_position(tile)),
                    (previous, self.tile_world_position(previous)),
                );
                self.begin_step(step);
                true
            }
            SurfaceType::Sand => {
                if let Some(ctx) = self.ctx.as_mut() {
                    ctx.flags.stopped_in_sand = true;
                }
                self.complete(ShotOutcome::InPlay);
                true
            }
            SurfaceType::Tree => {
                if let Some(ctx) = self.ctx.as_mut() {
                    ctx.flags.stopped_in_trees = true;
                }
                self.complete(ShotOutcome::InPlay);
                true
            }
            _ => false,
        }
    }

    fn on_landed(&mut self, start: HexCoord, landing: HexCoord) {
        self.ball = landing;
        self.rollout.tiles = hex_distance(start, landing);
        self.events.push(EngineEvent::Landed {
            tile: landing,
            surface: self.hole.grid.surface(landing),
        });
        // Water returns to the tile the shot was hit from
        if self.arrive(start, landing) {
            return;
        }
        self.rollout.direction = direction_between(&self.layout, start, landing);
        self.rollout.remaining = self.ctx.as_ref().map_or(0, |c| c.roll_count());
        self.continue_roll();
    }

    fn on_bounced(&mut self, from: HexCoord, to: HexCoord) {
        self.ball = to;
        self.rollout.tiles += 1;
        self.events.push(EngineEvent::Bounced {
            number: self.rollout.bounces,
            tile: to,
        });
        if self.arrive(from, to) {
            return;
        }

        let grid = &self.hole.grid;
        let drop = grid.elevation(from) - grid.elevation(to);
        if drop > DROP_THRESHOLD && self.rollout.extra < MAX_EXTRA_BOUNCES {
            self.rollout.extra += 1;
            self.rollout.remaining += 1;
        } else if -drop > RISE_THRESHOLD {
            // Uphill: no further bounces
            self.rollout.remaining = 0;
        }
        self.continue_roll();
    }

    fn continue_roll(&mut self) {
        if self.rollout.remaining <= 0 {
            self.finish_roll();
            return;
        }
        let (next, direction) = next_roll_tile(&self.hole.grid, self.ball, self.rollout.direction);
        if !self.hole.grid.is_targetable(next) {
            if let Some(ctx) = self.ctx.as_mut() {
                ctx.flags.hit_boundary = true;
            }
            self.complete(ShotOutcome::InPlay);
            return;
        }
        self.rollout.remaining -= 1;
        self.rollout.bounces += 1;
        self.rollout.direction = direction;
        let step = AnimationStep::bounce(
            self.rollout.bounces,
            (self.ball, self.tile_world_position(self.ball)),
            (next, self.tile_world_position(next)),
        );
        self.begin_step(step);
    }

    /// Roll used up: one spin hop, or done
    fn finish_roll(&mut self) {
        let spin = self.ctx.as_ref().map_or(Spin::None, |c| c.spin);
        let direction = match spin {
            Spin::None => {
                self.complete(ShotOutcome::InPlay);
                return;
            }
            Spin::Topspin => self.rollout.direction,
            Spin::Backspin => reverse(self.rollout.direction),
        };
        let target = self.ball.neighbor(direction);
        if !self.hole.grid.is_targetable(target) {
            if let Some(ctx) = self.ctx.as_mut() {
                ctx.flags.hit_boundary = true;
            }
            self.complete(ShotOutcome::InPlay);
            return;
        }
        let step = AnimationStep::spin(
            (self.ball, self.tile_world_position(self.ball)),
            (target, self.tile_world_position(target)),
        );
        self.begin_step(step);
    }

    /// Score the shot and settle the state
    fn complete(&mut self, outcome: ShotOutcome) {
        self.step = None;
        let rest = match outcome {
            ShotOutcome::Water => SurfaceType::Water,
            _ => self.hole.grid.surface(self.ball),
        };
        let Some(ctx) = self.ctx.as_mut() else { return };

        ctx.flags.outcome = Some(outcome);
        ctx.chips = self.rollout.tiles + terrain_bonus(rest);
        self.pipeline.run(ShotPhase::OnScoring, ctx);
        ctx.final_score = (ctx.chips as f32 * ctx.mult).round() as i32;
        self.pipeline.run(ShotPhase::AfterShot, ctx);

        let final_score = ctx.final_score;
        log::info!(
            "Shot {} ({}): {:?} at ({}, {}) on {}, score {}",
            ctx.shot_index + 1,
            ctx.club.name(),
            outcome,
            self.ball.col,
            self.ball.row,
            self.hole.grid.surface(self.ball).as_str(),
            final_score
        );

        self.events.push(EngineEvent::ShotCompleted {
            tile: self.ball,
            outcome,
            final_score,
        });
        if outcome == ShotOutcome::Holed {
            self.state = EngineState::HoleComplete;
            self.events.push(EngineEvent::HoleComplete { strokes: self.strokes });
            log::info!("Hole complete in {} strokes (par {})", self.strokes, self.hole.par.strokes());
        } else {
            self.state = EngineState::Completed;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::course::{Par, TerrainGrid, generate_hole};
    use crate::settings::CourseSettings;
    use crate::shot::modifier::{ShotShape, SpinCard, StatBoost};
    use proptest::prelude::*;

    /// Flat fairway hole, tee at (4, 2), flag at the bottom center
    fn flat_hole(width: i32, height: i32) -> Hole {
        let mut grid = TerrainGrid::new(width, height, SurfaceType::Fairway);
        let tee = HexCoord::new(4, 2);
        let flag = HexCoord::new(4, height - 1);
        grid.set_surface(tee, SurfaceType::Tee);
        grid.set_surface(flag, SurfaceType::Flag);
        Hole::from_grid(grid, tee, flag, Par::Four)
    }

    fn bounces(events: &[EngineEvent]) -> usize {
        events
            .iter()
            .filter(|e| matches!(e, EngineEvent::Bounced { .. }))
            .count()
    }

    fn spin_hops(events: &[EngineEvent]) -> usize {
        events
            .iter()
            .filter(|e| matches!(e, EngineEvent::StepStarted { kind: StepKind::Spin, .. }))
            .count()
    }

    /// Move the flag (and its surface) to `flag`
    fn with_flag(mut hole: Hole, flag: HexCoord) -> Hole {
        hole.grid.set_surface(hole.flag, SurfaceType::Fairway);
        hole.grid.set_surface(flag, SurfaceType::Flag);
        hole.flag = flag;
        hole
    }

    fn play(engine: &mut ShotEngine, club: Club, target: HexCoord) {
        engine.start_shot(club).unwrap();
        engine.lock_target(target).unwrap();
        engine.confirm_shot().unwrap();
        engine.skip();
    }

    #[test]
    fn test_driver_out_of_range_is_rejected() {
        let mut grid = TerrainGrid::new(9, 40, SurfaceType::Fairway);
        let tee = HexCoord::new(4, 1);
        let flag = HexCoord::new(4, 38);
        grid.set_surface(flag, SurfaceType::Flag);
        let mut engine = ShotEngine::new(Hole::from_grid(grid, tee, flag, Par::Five), 1);

        engine.start_shot(Club::Driver).unwrap();
        let target = HexCoord::new(4, 26);
        assert_eq!(hex_distance(tee, target), 25);
        assert_eq!(
            engine.lock_target(target),
            Err(TargetRejection::OutOfRange { distance: 25, max: 22 })
        );
        assert_eq!(engine.state(), EngineState::Aiming);
        assert_eq!(engine.context().unwrap().aim_tile, None);
        assert!(engine.aoe().is_empty());
    }

    #[test]
    fn test_water_landing_returns_to_start() {
        let mut grid = TerrainGrid::new(9, 20, SurfaceType::Fairway);
        for row in 8..=10 {
            for col in 0..9 {
                grid.set(col, row, SurfaceType::Water);
            }
        }
        let tee = HexCoord::new(4, 2);
        let flag = HexCoord::new(4, 18);
        grid.set_surface(tee, SurfaceType::Tee);
        grid.set_surface(flag, SurfaceType::Flag);
        let mut engine = ShotEngine::new(Hole::from_grid(grid, tee, flag, Par::Four), 7);

        play(&mut engine, Club::PitchingWedge, HexCoord::new(4, 8));

        assert_eq!(engine.state(), EngineState::Completed);
        assert_eq!(engine.ball(), tee);
        assert_eq!(engine.ball_world_position(), engine.tile_world_position(tee));
        // One stroke plus one penalty
        assert_eq!(engine.strokes(), 2);
        let ctx = engine.context().unwrap();
        assert_eq!(ctx.flags.penalty_strokes, 1);
        assert!(ctx.flags.hit_water);
        assert_eq!(ctx.flags.outcome, Some(ShotOutcome::Water));

        let events = engine.drain_events();
        let hazards = events
            .iter()
            .filter(|e| matches!(e, EngineEvent::WaterHazard { .. }))
            .count();
        assert_eq!(hazards, 1);
        assert!(engine.drain_events().is_empty());

        // The penalty counts toward the next shot's number
        engine.next_shot().unwrap();
        engine.start_shot(Club::PitchingWedge).unwrap();
        assert_eq!(engine.context().unwrap().shot_index, 2);
        assert_eq!(engine.context().unwrap().start_tile, tee);
    }

    #[test]
    fn test_shot_index_follows_strokes() {
        let mut engine = ShotEngine::new(flat_hole(9, 30), 3);
        play(&mut engine, Club::PitchingWedge, HexCoord::new(4, 7));
        assert_eq!(engine.context().unwrap().shot_index, 0);
        engine.next_shot().unwrap();
        engine.start_shot(Club::PitchingWedge).unwrap();
        assert_eq!(engine.context().unwrap().shot_index, 1);
        let events = engine.drain_events();
        assert!(events.contains(&EngineEvent::ShotStarted {
            shot_index: 1,
            club: Club::PitchingWedge
        }));
    }

    #[test]
    fn test_water_on_bounce_returns_to_previous_tile() {
        let mut hole = flat_hole(9, 16);
        hole.grid.set(4, 8, SurfaceType::Water);
        let mut engine = ShotEngine::new(hole, 3);
        play(&mut engine, Club::PitchingWedge, HexCoord::new(4, 7));

        assert_eq!(engine.ball(), HexCoord::new(4, 7));
        assert_eq!(engine.strokes(), 2);
        assert_eq!(engine.context().unwrap().flags.outcome, Some(ShotOutcome::Water));
        let events = engine.drain_events();
        assert!(events.contains(&EngineEvent::WaterHazard {
            tile: HexCoord::new(4, 8),
            return_to: HexCoord::new(4, 7),
        }));
    }

    #[test]
    fn test_water_on_spin_returns_to_previous_tile() {
        let mut hole = flat_hole(9, 16);
        hole.grid.set(4, 9, SurfaceType::Water);
        let mut engine = ShotEngine::new(hole, 3);
        engine.pipeline_mut().register(Box::new(SpinCard { spin: Spin::Topspin }));
        play(&mut engine, Club::PitchingWedge, HexCoord::new(4, 7));

        assert_eq!(engine.ball(), HexCoord::new(4, 8));
        assert_eq!(engine.strokes(), 2);
        assert!(engine.context().unwrap().flags.hit_water);
        let events = engine.drain_events();
        assert_eq!(spin_hops(&events), 1);
        assert!(events.contains(&EngineEvent::WaterHazard {
            tile: HexCoord::new(4, 9),
            return_to: HexCoord::new(4, 8),
        }));
    }

    #[test]
    fn test_downhill_roll_earns_capped_extra_bounces() {
        let mut hole = flat_hole(9, 16);
        for cell in hole.grid.cells().collect::<Vec<_>>() {
            hole.grid.set_elevation(cell.col, cell.row, -0.5 * cell.row as f64);
        }
        let mut engine = ShotEngine::new(hole, 3);
        play(&mut engine, Club::PitchingWedge, HexCoord::new(4, 7));

        // 1 bounce from the club, 3 more from the slope
        assert_eq!(bounces(&engine.drain_events()), 4);
        assert_eq!(engine.ball(), HexCoord::new(4, 11));
        assert_eq!(engine.state(), EngineState::Completed);
    }

    #[test]
    fn test_uphill_stops_roll() {
        let mut hole = flat_hole(9, 16);
        // Rows 8+ sit on a shelf 0.5 higher; a one-tile chute keeps the
        // roll from slipping onto a diagonal
        for cell in hole.grid.cells().collect::<Vec<_>>() {
            if cell.row >= 8 {
                hole.grid.set_elevation(cell.col, cell.row, 0.5);
            }
            if cell.row >= 6 && (cell.col == 3 || cell.col == 5) {
                hole.grid.set_surface(cell, SurfaceType::Empty);
            }
        }
        let mut engine = ShotEngine::new(hole, 3);
        engine.pipeline_mut().register(Box::new(StatBoost {
            roll: 2,
            ..StatBoost::default()
        }));
        play(&mut engine, Club::PitchingWedge, HexCoord::new(4, 7));
        assert_eq!(engine.ball(), HexCoord::new(4, 8));
        assert_eq!(bounces(&engine.drain_events()), 1);
    }

    #[test]
    fn test_spin_applies_after_uphill_stop() {
        let mut hole = flat_hole(9, 16);
        for cell in hole.grid.cells().collect::<Vec<_>>() {
            if cell.row >= 8 {
                hole.grid.set_elevation(cell.col, cell.row, 0.5);
            }
            if cell.row >= 6 && (cell.col == 3 || cell.col == 5) {
                hole.grid.set_surface(cell, SurfaceType::Empty);
            }
        }
        let mut engine = ShotEngine::new(hole, 3);
        engine.pipeline_mut().register(Box::new(StatBoost {
            roll: 2,
            ..StatBoost::default()
        }));
        engine.pipeline_mut().register(Box::new(SpinCard { spin: Spin::Topspin }));
        play(&mut engine, Club::PitchingWedge, HexCoord::new(4, 7));

        let events = engine.drain_events();
        assert_eq!(bounces(&events), 1);
        assert_eq!(spin_hops(&events), 1);
        assert_eq!(engine.ball(), HexCoord::new(4, 9));
    }

    #[test]
    fn test_spin_into_boundary_stays_put() {
        let mut grid = TerrainGrid::new(9, 10, SurfaceType::Fairway);
        let tee = HexCoord::new(4, 2);
        grid.set_surface(tee, SurfaceType::Tee);
        let mut engine = ShotEngine::new(Hole::from_grid(grid, tee, HexCoord::new(0, 9), Par::Three), 3);
        engine.pipeline_mut().register(Box::new(SpinCard { spin: Spin::Topspin }));
        play(&mut engine, Club::PitchingWedge, HexCoord::new(4, 8));

        assert_eq!(engine.ball(), HexCoord::new(4, 9));
        assert!(engine.context().unwrap().flags.hit_boundary);
        assert_eq!(engine.state(), EngineState::Completed);
        assert_eq!(spin_hops(&engine.drain_events()), 0);
    }

    #[test]
    fn test_flag_on_bounce_ends_roll() {
        let hole = with_flag(flat_hole(9, 16), HexCoord::new(4, 8));
        let mut engine = ShotEngine::new(hole, 3);
        engine.pipeline_mut().register(Box::new(StatBoost {
            roll: 3,
            ..StatBoost::default()
        }));
        engine.pipeline_mut().register(Box::new(SpinCard { spin: Spin::Backspin }));
        play(&mut engine, Club::PitchingWedge, HexCoord::new(4, 7));

        assert_eq!(engine.state(), EngineState::HoleComplete);
        assert_eq!(engine.ball(), HexCoord::new(4, 8));
        assert!(engine.context().unwrap().flags.reached_flag);
        let events = engine.drain_events();
        assert_eq!(bounces(&events), 1);
        assert_eq!(spin_hops(&events), 0);
    }

    #[test]
    fn test_flag_on_spin_hop() {
        let hole = with_flag(flat_hole(9, 16), HexCoord::new(4, 9));
        let mut engine = ShotEngine::new(hole, 3);
        engine.pipeline_mut().register(Box::new(SpinCard { spin: Spin::Topspin }));
        play(&mut engine, Club::PitchingWedge, HexCoord::new(4, 7));

        assert_eq!(engine.state(), EngineState::HoleComplete);
        assert_eq!(engine.ball(), HexCoord::new(4, 9));
        assert_eq!(engine.strokes(), 1);
        assert_eq!(spin_hops(&engine.drain_events()), 1);
    }

    #[test]
    fn test_trees_stop_the_ball() {
        let mut hole = flat_hole(9, 16);
        hole.grid.set(4, 7, SurfaceType::Tree);
        let mut engine = ShotEngine::new(hole, 3);
        play(&mut engine, Club::PitchingWedge, HexCoord::new(4, 7));
        assert_eq!(engine.ball(), HexCoord::new(4, 7));
        assert!(engine.context().unwrap().flags.stopped_in_trees);
        assert_eq!(engine.context().unwrap().flags.outcome, Some(ShotOutcome::InPlay));
        assert_eq!(bounces(&engine.drain_events()), 0);

        // Rolling into trees stops there too
        let mut hole = flat_hole(9, 16);
        hole.grid.set(4, 8, SurfaceType::Tree);
        let mut engine = ShotEngine::new(hole, 3);
        engine.pipeline_mut().register(Box::new(StatBoost {
            roll: 2,
            ..StatBoost::default()
        }));
        play(&mut engine, Club::PitchingWedge, HexCoord::new(4, 7));
        assert_eq!(engine.ball(), HexCoord::new(4, 8));
        assert!(engine.context().unwrap().flags.stopped_in_trees);
        assert_eq!(bounces(&engine.drain_events()), 1);
    }

    #[test]
    fn test_spin_after_clean_roll() {
        let mut engine = ShotEngine::new(flat_hole(9, 16), 3);
        engine.pipeline_mut().register(Box::new(SpinCard { spin: Spin::Topspin }));
        play(&mut engine, Club::PitchingWedge, HexCoord::new(4, 7));
        assert_eq!(engine.ball(), HexCoord::new(4, 9));

        let mut engine = ShotEngine::new(flat_hole(9, 16), 3);
        engine.pipeline_mut().register(Box::new(SpinCard { spin: Spin::Backspin }));
        play(&mut engine, Club::PitchingWedge, HexCoord::new(4, 7));
        assert_eq!(engine.ball(), HexCoord::new(4, 7));
    }

    #[test]
    fn test_landing_on_flag_completes_hole() {
        let mut hole = flat_hole(9, 16);
        let flag = HexCoord::new(4, 7);
        hole.grid.set_surface(hole.flag, SurfaceType::Fairway);
        hole.grid.set_surface(flag, SurfaceType::Flag);
        hole.flag = flag;
        let mut engine = ShotEngine::new(hole, 3);
        play(&mut engine, Club::PitchingWedge, flag);

        assert_eq!(engine.state(), EngineState::HoleComplete);
        assert_eq!(engine.ball(), flag);
        assert_eq!(engine.strokes(), 1);
        let ctx = engine.context().unwrap();
        assert!(ctx.flags.reached_flag);
        assert_eq!(ctx.chips, 5 + 50);
        let events = engine.drain_events();
        assert_eq!(bounces(&events), 0);
        assert!(events.contains(&EngineEvent::HoleComplete { strokes: 1 }));
        assert!(engine.start_shot(Club::Driver).is_err());
    }

    #[test]
    fn test_sand_and_boundary_stops() {
        let mut hole = flat_hole(9, 16);
        hole.grid.set(4, 7, SurfaceType::Sand);
        let mut engine = ShotEngine::new(hole, 3);
        play(&mut engine, Club::PitchingWedge, HexCoord::new(4, 7));
        assert_eq!(engine.ball(), HexCoord::new(4, 7));
        assert!(engine.context().unwrap().flags.stopped_in_sand);
        assert_eq!(bounces(&engine.drain_events()), 0);

        // Last row: the roll runs off the hole and stays put
        let mut grid = TerrainGrid::new(9, 9, SurfaceType::Fairway);
        let tee = HexCoord::new(4, 2);
        grid.set_surface(tee, SurfaceType::Tee);
        let mut engine = ShotEngine::new(Hole::from_grid(grid, tee, HexCoord::new(0, 8), Par::Three), 3);
        play(&mut engine, Club::PitchingWedge, HexCoord::new(4, 8));
        assert_eq!(engine.ball(), HexCoord::new(4, 8));
        assert!(engine.context().unwrap().flags.hit_boundary);
    }

    #[test]
    fn test_scoring_with_boost() {
        let mut engine = ShotEngine::new(flat_hole(9, 16), 3);
        play(&mut engine, Club::PitchingWedge, HexCoord::new(4, 7));
        // 5 carried + 1 rolled, fairway +5
        assert_eq!(engine.context().unwrap().final_score, 11);

        let mut engine = ShotEngine::new(flat_hole(9, 16), 3);
        engine.pipeline_mut().register(Box::new(StatBoost {
            mult: 2.0,
            ..StatBoost::default()
        }));
        play(&mut engine, Club::PitchingWedge, HexCoord::new(4, 7));
        assert_eq!(engine.context().unwrap().final_score, 22);
    }

    #[test]
    fn test_relock_discards_previous_aoe_effects() {
        let mut engine = ShotEngine::new(flat_hole(9, 16), 3);
        engine.pipeline_mut().register(Box::new(ShotShape::Fade));
        engine.start_shot(Club::PitchingWedge).unwrap();
        assert_eq!(engine.lock_target(HexCoord::new(4, 7)).unwrap(), &[HexCoord::new(5, 7)]);
        assert_eq!(engine.lock_target(HexCoord::new(4, 6)).unwrap(), &[HexCoord::new(5, 6)]);
        assert_eq!(engine.context().unwrap().aoe_offset, 1);

        // A rejected re-lock keeps the previous lock
        assert!(engine.lock_target(HexCoord::new(4, 0)).is_err());
        assert_eq!(engine.state(), EngineState::AoeComputed);
        assert_eq!(engine.aoe(), &[HexCoord::new(5, 6)]);
    }

    #[test]
    fn test_aoe_rings_follow_accuracy() {
        let mut engine = ShotEngine::new(flat_hole(15, 30), 3);
        engine.start_shot(Club::Driver).unwrap();
        assert_eq!(engine.lock_target(HexCoord::new(6, 12)).unwrap().len(), 1 + 6 + 12);
        engine.select_club(Club::SevenIron).unwrap();
        assert_eq!(engine.state(), EngineState::Aiming);
        assert_eq!(engine.lock_target(HexCoord::new(6, 10)).unwrap().len(), 1 + 6);
    }

    #[test]
    fn test_wrong_state_and_cancel() {
        let mut engine = ShotEngine::new(flat_hole(9, 16), 3);
        assert!(engine.confirm_shot().is_err());
        assert!(engine.cancel().is_err());
        assert!(matches!(
            engine.lock_target(HexCoord::new(4, 5)),
            Err(TargetRejection::WrongState(EngineState::Idle))
        ));

        engine.start_shot(Club::NineIron).unwrap();
        assert!(engine.start_shot(Club::NineIron).is_err());
        engine.lock_target(HexCoord::new(4, 6)).unwrap();
        engine.cancel().unwrap();
        assert_eq!(engine.state(), EngineState::Idle);
        assert!(engine.context().is_none());
        assert_eq!(engine.strokes(), 0);
    }

    #[test]
    fn test_tick_walks_through_flight() {
        let mut engine = ShotEngine::new(flat_hole(9, 16), 3);
        engine.start_shot(Club::PitchingWedge).unwrap();
        engine.lock_target(HexCoord::new(4, 7)).unwrap();
        engine.confirm_shot().unwrap();
        assert_eq!(engine.state(), EngineState::Confirmed);

        engine.tick(0.3);
        assert_eq!(engine.state(), EngineState::Animating(StepKind::Flight));
        assert!(engine.ball_world_position().y > 0.0);

        for _ in 0..200 {
            engine.tick(1.0 / 60.0);
        }
        assert_eq!(engine.state(), EngineState::Completed);
        assert_eq!(engine.ball(), HexCoord::new(4, 8));
        engine.next_shot().unwrap();
        assert_eq!(engine.state(), EngineState::Idle);
    }

    #[test]
    fn test_overshoot_allows_any_row() {
        let mut grid = TerrainGrid::new(9, 16, SurfaceType::Fairway);
        let flag = HexCoord::new(4, 5);
        grid.set_surface(flag, SurfaceType::Flag);
        let ball = HexCoord::new(4, 10);
        let mut engine = ShotEngine::new(Hole::from_grid(grid, ball, flag, Par::Four), 3);
        engine.start_shot(Club::NineIron).unwrap();
        assert!(engine.is_tile_available(HexCoord::new(4, 7)));
        assert!(engine.is_tile_available(HexCoord::new(4, 12)));
        assert!(!engine.is_tile_available(ball));
    }

    proptest! {
        #[test]
        fn prop_range_gating(col in 0i32..21, row in 0i32..50) {
            let mut grid = TerrainGrid::new(21, 50, SurfaceType::Rough);
            let ball = HexCoord::new(10, 5);
            let flag = HexCoord::new(10, 45);
            grid.set_surface(flag, SurfaceType::Flag);
            let mut engine = ShotEngine::new(Hole::from_grid(grid, ball, flag, Par::Five), 1);
            engine.start_shot(Club::Driver).unwrap();

            let cell = HexCoord::new(col, row);
            let expected = cell != ball && hex_distance(ball, cell) <= 22 && row > ball.row;
            prop_assert_eq!(engine.is_tile_available(cell), expected);
            prop_assert_eq!(engine.lock_target(cell).is_ok(), expected);
            let state = if expected { EngineState::AoeComputed } else { EngineState::Aiming };
            prop_assert_eq!(engine.state(), state);
        }
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(24))]

        #[test]
        fn prop_roll_terminates(seed in 0u64..500) {
            let hole = generate_hole(seed, &CourseSettings::default());
            let flag = hole.flag;
            let mut engine = ShotEngine::new(hole, seed);
            engine.start_shot(Club::Driver).unwrap();
            let target = engine
                .hole()
                .grid
                .cells()
                .filter(|c| engine.is_tile_available(*c))
                .min_by_key(|c| hex_distance(*c, flag));
            prop_assume!(target.is_some());
            engine.lock_target(target.unwrap()).unwrap();
            engine.confirm_shot().unwrap();
            engine.skip();

            let roll = Club::Driver.spec().roll as usize;
            prop_assert!(bounces(&engine.drain_events()) <= roll + MAX_EXTRA_BOUNCES as usize);
            prop_assert!(matches!(
                engine.state(),
                EngineState::Completed | EngineState::HoleComplete
            ));
        }
    }
}

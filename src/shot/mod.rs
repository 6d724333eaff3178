//! Shot resolution
//!
//! - `club`: static club table
//! - `context`: per-shot state shared with modifiers
//! - `modifier`: five-phase hook trait and ordered registry
//! - `flight`: animation steps and roll decisions
//! - `engine`: the aim -> flight -> roll -> score state machine

pub mod club;
pub mod context;
pub mod engine;
pub mod flight;
pub mod modifier;

pub use club::{Club, ClubSpec};
pub use context::{ShotContext, ShotFlags, ShotOutcome, Spin};
pub use engine::{EngineError, EngineEvent, EngineState, ShotEngine, TargetRejection, terrain_bonus};
pub use flight::{AnimationStep, StepKind};
pub use modifier::{LieEffect, ModifierId, ModifierPipeline, ModifierSource, ShotPhase, ShotShape, SpinCard, StatBoost, Wind};

//! Hex Golf demo
//!
//! Generates holes from a seed, prints each map and auto-plays it.
//!
//! ```text
//! hex-golf [seed] [holes] [easy|normal|hard|settings.json]
//! ```

#[cfg(not(target_arch = "wasm32"))]
mod demo {
    use hex_golf::consts::{DEFAULT_WIND, FRAME_DT};
    use hex_golf::course::{Hole, SurfaceType, generate_hole};
    use hex_golf::hex::{HexCoord, hex_distance};
    use hex_golf::scorecard::{HoleScore, Scorecard};
    use hex_golf::settings::{CourseSettings, Difficulty, SettingsError};
    use hex_golf::shot::{Club, EngineState, LieEffect, ShotEngine, Wind};

    /// Give up on a hole after this many strokes
    const MAX_STROKES: u32 = 12;

    /// Seconds of animation before falling back to `skip`
    const MAX_ANIMATION_SECS: f64 = 10.0;

    fn hazard_cost(surface: SurfaceType) -> i32 {
        match surface {
            SurfaceType::Water => 100,
            SurfaceType::Tree => 6,
            SurfaceType::Sand => 4,
            SurfaceType::DeepRough => 2,
            SurfaceType::Rough => 1,
            _ => 0,
        }
    }

    /// Closest reachable tile to the flag, steering clear of hazards
    fn pick_target(engine: &ShotEngine) -> Option<HexCoord> {
        let hole = engine.hole();
        hole.grid
            .cells()
            .filter(|c| engine.is_tile_available(*c))
            .min_by_key(|c| hex_distance(*c, hole.flag) + hazard_cost(hole.grid.surface(*c)))
    }

    fn play_hole(hole: Hole, seed: u64) -> HoleScore {
        let hole_seed = hole.seed;
        let par = hole.par;
        let mut engine = ShotEngine::new(hole, seed);
        engine.pipeline_mut().register(Box::new(LieEffect));
        engine.pipeline_mut().register(Box::new(Wind::seeded(seed ^ 0x5eed, DEFAULT_WIND)));

        let mut chips = 0i64;
        while engine.strokes() < MAX_STROKES {
            let to_flag = hex_distance(engine.ball(), engine.hole().flag);
            if engine.start_shot(Club::for_distance(to_flag)).is_err() {
                break;
            }
            let Some(target) = pick_target(&engine) else {
                log::warn!("No reachable target from {:?}", engine.ball());
                break;
            };
            if let Err(e) = engine.lock_target(target) {
                log::warn!("Target rejected: {}", e);
                break;
            }
            if engine.confirm_shot().is_err() {
                break;
            }

            let mut elapsed = 0.0;
            while matches!(engine.state(), EngineState::Confirmed | EngineState::Animating(_)) {
                if elapsed >= MAX_ANIMATION_SECS {
                    engine.skip();
                    break;
                }
                engine.tick(FRAME_DT);
                elapsed += FRAME_DT;
            }
            chips += engine.context().map_or(0, |c| c.final_score as i64);

            if engine.state() == EngineState::HoleComplete || engine.next_shot().is_err() {
                break;
            }
        }

        HoleScore {
            seed: hole_seed,
            par,
            strokes: engine.strokes(),
            chips,
        }
    }

    fn load_settings(arg: Option<&str>) -> Result<CourseSettings, SettingsError> {
        let Some(arg) = arg else {
            return Ok(CourseSettings::default());
        };
        match Difficulty::from_str(arg) {
            Some(difficulty) => Ok(CourseSettings::from_preset(difficulty)),
            None => CourseSettings::load_file(arg),
        }
    }

    pub fn run() -> Result<(), SettingsError> {
        let args: Vec<String> = std::env::args().skip(1).collect();
        let seed = args.first().and_then(|s| s.parse::<u64>().ok()).unwrap_or(1);
        let holes = args.get(1).and_then(|s| s.parse::<u64>().ok()).unwrap_or(1).max(1);
        let settings = load_settings(args.get(2).map(String::as_str))?;
        log::info!(
            "Hex Golf: seed {}, {} hole(s), {} difficulty",
            seed,
            holes,
            settings.difficulty.as_str()
        );

        let mut card = Scorecard::new();
        for n in 0..holes {
            let hole_seed = seed.wrapping_add(n);
            let hole = generate_hole(hole_seed, &settings);
            println!(
                "Hole {} (seed {}): par {}, {} yards, {}",
                n + 1,
                hole_seed,
                hole.par.strokes(),
                hole.yardage,
                hole.dogleg.as_str()
            );
            println!("{}", hole.ascii_map());

            let score = play_hole(hole, hole_seed);
            println!(
                "  {} strokes ({}), {} chips\n",
                score.strokes,
                score.name().label(),
                score.chips
            );
            if card.record(score).is_none() {
                break;
            }
        }

        println!(
            "Total: {} strokes over par {} ({}), {} chips",
            card.total_strokes(),
            card.total_par(),
            card.format_to_par(),
            card.total_chips()
        );
        Ok(())
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    if let Err(e) = demo::run() {
        log::error!("{}", e);
        std::process::exit(1);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // The library is the wasm surface; there is no wasm entry point here
}

//! Office Gamer headless runner
//!
//! Lets the autopilot play for a span of simulated time and prints a JSON
//! summary. No window, no audio: the browser build lives in `platform::web`.
//!
//! Usage:
//!   office-gamer [--seed N] [--seconds S] [--tuning balance.json] [--ignore-questions]
//!
//! Set `RUST_LOG=info` (or `debug`) to watch the session unfold.

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use std::collections::BTreeMap;
    use std::path::PathBuf;

    use office_gamer::Tuning;
    use office_gamer::consts::DEFAULT_FRAME_MS;
    use office_gamer::sim::{Autopilot, GameEvent, GameOverReason, GameState, tick};
    use rand::SeedableRng;
    use rand_pcg::Pcg32;
    use serde::Serialize;

    #[derive(Debug)]
    struct Args {
        seed: u64,
        seconds: f64,
        tuning: Option<PathBuf>,
        ignore_questions: bool,
    }

    fn parse_args(mut args: impl Iterator<Item = String>) -> Result<Args, String> {
        let mut parsed = Args {
            seed: 1,
            seconds: 120.0,
            tuning: None,
            ignore_questions: false,
        };
        while let Some(arg) = args.next() {
            let mut value = |name: &str| args.next().ok_or(format!("{name} needs a value"));
            match arg.as_str() {
                "--seed" => {
                    parsed.seed = value("--seed")?
                        .parse()
                        .map_err(|e| format!("bad --seed: {e}"))?;
                }
                "--seconds" => {
                    parsed.seconds = value("--seconds")?
                        .parse()
                        .map_err(|e| format!("bad --seconds: {e}"))?;
                }
                "--tuning" => parsed.tuning = Some(PathBuf::from(value("--tuning")?)),
                "--ignore-questions" => parsed.ignore_questions = true,
                other => return Err(format!("unknown argument: {other}")),
            }
        }
        if !(parsed.seconds.is_finite() && parsed.seconds > 0.0) {
            return Err("--seconds must be positive".into());
        }
        Ok(parsed)
    }

    #[derive(Debug, Default, Serialize)]
    struct Summary {
        seed: u64,
        simulated_seconds: f64,
        frames: u64,
        score: f64,
        suspicion: f32,
        game_over: bool,
        game_over_reason: Option<GameOverReason>,
        bosses_seen: BTreeMap<String, u32>,
        snitch_calls: u32,
        helpful_warnings: u32,
        conversations: u32,
        questions: u32,
    }

    impl Summary {
        fn record(&mut self, event: &GameEvent) {
            match event {
                GameEvent::BossSpawned { boss_type, .. } => {
                    *self
                        .bosses_seen
                        .entry(boss_type.label().to_string())
                        .or_default() += 1;
                }
                GameEvent::SnitchCall { .. } => self.snitch_calls += 1,
                GameEvent::HelpfulWarning { .. } => self.helpful_warnings += 1,
                GameEvent::ConversationStarted { .. } => self.conversations += 1,
                GameEvent::QuestionRaised { .. } => self.questions += 1,
                _ => {}
            }
        }
    }

    fn load_tuning(path: Option<&PathBuf>) -> Result<Tuning, String> {
        let Some(path) = path else {
            return Ok(Tuning::default());
        };
        let json = std::fs::read_to_string(path)
            .map_err(|e| format!("cannot read {}: {e}", path.display()))?;
        Tuning::from_json(&json).map_err(|e| format!("invalid tuning {}: {e}", path.display()))
    }

    pub fn run(args: impl Iterator<Item = String>) -> Result<(), String> {
        let args = parse_args(args)?;
        let tuning = load_tuning(args.tuning.as_ref())?;
        let mut rng = Pcg32::seed_from_u64(args.seed);
        let mut state = GameState::new(tuning, 0.0, &mut rng);
        let pilot = Autopilot {
            ignore_questions: args.ignore_questions,
            ..Autopilot::default()
        };
        log::info!(
            "Headless run: seed {}, {:.0}s simulated",
            args.seed,
            args.seconds
        );

        let mut summary = Summary {
            seed: args.seed,
            ..Summary::default()
        };
        // The session opens with a boss already on the floor
        if let Some(boss) = state.bosses.first() {
            summary
                .bosses_seen
                .insert(boss.boss_type.label().to_string(), 1);
        }

        let end_ms = args.seconds * 1000.0;
        let mut now = 0.0;
        while now < end_ms && !state.is_game_over {
            now += DEFAULT_FRAME_MS;
            let input = pilot.decide(&state);
            tick(&mut state, &input, now, &mut rng);
            summary.frames += 1;
            for event in &state.events {
                summary.record(event);
            }
        }

        summary.simulated_seconds = now / 1000.0;
        summary.score = state.score;
        summary.suspicion = state.suspicion;
        summary.game_over = state.is_game_over;
        summary.game_over_reason = state.game_over_reason;

        let json = serde_json::to_string_pretty(&summary).map_err(|e| e.to_string())?;
        println!("{json}");
        Ok(())
    }

}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    if let Err(e) = native::run(std::env::args().skip(1)) {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // The browser entry point is `platform::web::start`
}

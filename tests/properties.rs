//! Property tests over whole-session behaviour

use glam::Vec2;
use office_gamer::Tuning;
use office_gamer::consts::{CANVAS_HEIGHT, CANVAS_WIDTH, PLAYER_SIZE};
use office_gamer::distance;
use office_gamer::sim::boss::is_player_detected;
use office_gamer::sim::{
    GameMode, GameState, Player, QuestionResponse, TickInput, check_collision,
    create_office_layout, has_line_of_sight, tick,
};
use proptest::prelude::*;
use rand::SeedableRng;
use rand_pcg::Pcg32;

fn input_strategy() -> impl Strategy<Value = TickInput> {
    (
        any::<[bool; 6]>(),
        prop_oneof![
            6 => Just(None),
            1 => Just(Some(QuestionResponse::Answer)),
            1 => Just(Some(QuestionResponse::Ignore)),
        ],
    )
        .prop_map(|(keys, respond)| TickInput {
            up: keys[0],
            down: keys[1],
            left: keys[2],
            right: keys[3],
            interact: keys[4],
            toggle_mode: keys[5],
            respond,
        })
}

/// Each input is held for a burst of frames so the player actually travels
fn session_strategy() -> impl Strategy<Value = Vec<(TickInput, u8)>> {
    prop::collection::vec((input_strategy(), 1u8..40), 1..60)
}

fn run_session(seed: u64, session: &[(TickInput, u8)], mut check: impl FnMut(&GameState)) {
    let mut rng = Pcg32::seed_from_u64(seed);
    let mut state = GameState::new(Tuning::default(), 0.0, &mut rng);
    let mut now = 0.0;
    for (input, frames) in session {
        for _ in 0..*frames {
            now += 16.0;
            tick(&mut state, input, now, &mut rng);
            check(&state);
        }
    }
}

proptest! {
    #[test]
    fn player_stays_on_canvas_and_off_desks(seed in any::<u64>(), session in session_strategy()) {
        run_session(seed, &session, |state| {
            let p = state.player.position;
            assert!(p.x >= 0.0 && p.x <= CANVAS_WIDTH - PLAYER_SIZE, "x out of bounds: {p}");
            assert!(p.y >= 0.0 && p.y <= CANVAS_HEIGHT - PLAYER_SIZE, "y out of bounds: {p}");
            assert!(!check_collision(p, &state.desks), "player inside a desk at {p}");
        });
    }

    #[test]
    fn score_and_suspicion_stay_in_range(seed in any::<u64>(), session in session_strategy()) {
        run_session(seed, &session, |state| {
            assert!(state.score >= 0.0, "negative score {}", state.score);
            assert!(
                (0.0..=state.tuning.suspicion.max_suspicion).contains(&state.suspicion),
                "suspicion {} out of range",
                state.suspicion
            );
            assert!(state.bosses.len() <= 1);
            // An empty boss slot always has its next arrival booked
            assert!(!state.bosses.is_empty() || state.schedule.next_boss_spawn_ms.is_some());
            assert!(state.coworkers.len() <= state.tuning.coworker_system.max_coworkers);
        });
    }

    #[test]
    fn game_over_is_final(seed in any::<u64>(), session in session_strategy()) {
        let mut ended_with: Option<(f64, f32)> = None;
        run_session(seed, &session, |state| {
            if let Some((score, suspicion)) = ended_with {
                assert!(state.is_game_over);
                assert_eq!(state.score, score);
                assert_eq!(state.suspicion, suspicion);
            } else if state.is_game_over {
                ended_with = Some((state.score, state.suspicion));
            }
        });
    }

    #[test]
    fn detection_requires_seated_gaming_within_radius(
        px in 0.0f32..780.0,
        py in 0.0f32..580.0,
        bx in 0.0f32..800.0,
        by in 0.0f32..600.0,
        gaming in any::<bool>(),
        sitting in any::<bool>(),
    ) {
        let mut rng = Pcg32::seed_from_u64(7);
        let state = GameState::new(Tuning::default(), 0.0, &mut rng);
        let mut boss = state.bosses[0].clone();
        boss.position = Vec2::new(bx, by);
        let player = Player {
            position: Vec2::new(px, py),
            is_sitting: sitting,
            ..Player::default()
        };
        let mode = if gaming { GameMode::Gaming } else { GameMode::Work };
        let expected = gaming
            && sitting
            && distance(player.position, boss.position) <= boss.detection_radius;
        prop_assert_eq!(is_player_detected(&player, &boss, mode), expected);
    }

    #[test]
    fn open_floor_always_has_line_of_sight(
        bx in 0.0f32..800.0,
        by in 0.0f32..600.0,
        px in 0.0f32..780.0,
        py in 0.0f32..580.0,
    ) {
        prop_assert!(has_line_of_sight(Vec2::new(bx, by), Vec2::new(px, py), &[]));
    }

    #[test]
    fn desk_blocks_sight_across_it(offset in 0.0f32..60.0) {
        let desks = create_office_layout();
        let desk = desks[1].bounds;
        // Straight vertical line through the middle of a desk
        let x = desk.x + 40.0 + offset;
        let boss = Vec2::new(x, desk.y - 30.0);
        let player = Vec2::new(x - PLAYER_SIZE / 2.0, desk.bottom() + 30.0);
        prop_assert!(!has_line_of_sight(boss, player, &desks));
    }
}

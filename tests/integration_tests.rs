//! Integration tests for the session lifecycle

use nback::core::{default_pool, GameState, ScriptedRng, SimpleRng, VirtualClock};
use nback::types::{
    AbstainPolicy, GameAction, GameEvent, GameSettings, Stimulus, StimulusFilter, StimulusKind,
    TurnResult, CORRECT_FEEDBACK_MS,
};

fn settings(n_level: u32, game_length: usize) -> GameSettings {
    GameSettings {
        n_level,
        stimulus: StimulusFilter::Any,
        game_length,
        speed_ms: 1000,
        abstain_policy: AbstainPolicy::PreserveStreak,
    }
}

/// Answer every awaited turn correctly, ticking through feedback delays.
fn play_perfectly(state: &mut GameState) {
    while !state.game_over() {
        if state.awaiting_response() {
            let truth = state.sequence().is_match(state.position());
            assert!(state.respond(truth));
            state.tick(CORRECT_FEEDBACK_MS);
        } else {
            state.tick(1000);
        }
    }
}

#[test]
fn test_game_lifecycle() {
    let mut state = GameState::new(settings(2, 20), &default_pool(), 12345).unwrap();
    assert!(!state.started());

    state.start();
    assert!(state.started());
    assert!(state.current_stimulus().is_some());
    assert!(!state.game_over());
    assert!(!state.paused());
    assert_eq!(state.turn_number(), 1);
}

#[test]
fn test_perfect_session() {
    let mut state = GameState::new(settings(2, 24), &default_pool(), 7).unwrap();
    state.start();
    play_perfectly(&mut state);

    let stats = state.stats().unwrap();
    let matches = state.sequence().match_count() as u32;
    assert!(stats.completed);
    assert_eq!(stats.incorrect_presses, 0);
    assert!(matches >= 1);
    assert!(stats.score >= 20 * matches);
    assert!(stats.is_perfect_game());
    assert_eq!(state.turn_log().len(), 24);
}

#[test]
fn test_every_turn_resolves_once() {
    let mut state = GameState::new(settings(1, 15), &default_pool(), 3).unwrap();
    state.start();
    play_perfectly(&mut state);

    let events = state.drain_events();
    let started = events
        .iter()
        .filter(|e| matches!(e, GameEvent::TurnStarted { .. }))
        .count();
    let resolved = events
        .iter()
        .filter(|e| {
            matches!(
                e,
                GameEvent::Correct { .. } | GameEvent::Incorrect { .. } | GameEvent::Neutral { .. }
            )
        })
        .count();
    assert_eq!(started, 15);
    assert_eq!(resolved, 15);
    assert!(matches!(events.last(), Some(GameEvent::GameOver(_))));
}

#[test]
fn test_actions_drive_the_session() {
    let a = Stimulus::new(1, StimulusKind::Letter, "A");
    let b = Stimulus::new(2, StimulusKind::Letter, "B");
    let items = vec![a.clone(), b.clone(), a, b];
    let mut state =
        GameState::replay(settings(2, 4), items, SimpleRng::new(1), VirtualClock::new()).unwrap();
    state.start();
    state.tick(2000);

    assert!(state.apply_action(GameAction::Match));
    assert_eq!(state.last_result(), Some(TurnResult::Correct));
    state.tick(CORRECT_FEEDBACK_MS);

    assert!(state.apply_action(GameAction::Pause));
    assert!(state.paused());
    assert!(!state.apply_action(GameAction::NoMatch));
    assert!(state.apply_action(GameAction::Pause));

    assert!(state.apply_action(GameAction::NoMatch));
    assert_eq!(state.last_result(), Some(TurnResult::Incorrect));
    state.tick(1000);

    assert!(state.game_over());
    assert_eq!(state.score(), 10);
}

#[test]
fn test_same_seed_same_session() {
    let run = |seed| {
        let mut state = GameState::new(settings(3, 30), &default_pool(), seed).unwrap();
        state.start();
        state.tick(120_000);
        (state.sequence().clone(), state.stats())
    };
    assert_eq!(run(99), run(99));
}

#[test]
fn test_scripted_random_source() {
    let pool = vec![
        Stimulus::new(1, StimulusKind::Letter, "A"),
        Stimulus::new(2, StimulusKind::Letter, "B"),
        Stimulus::new(3, StimulusKind::Letter, "C"),
    ];
    let rng = ScriptedRng::new(vec![0, 1, 2, 3, 4, 5, 6, 7]);
    let state = GameState::with_parts(settings(1, 10), &pool, rng, VirtualClock::new()).unwrap();
    assert_eq!(state.sequence().len(), 10);
}

#[test]
fn test_restart_after_abandon() {
    let mut state = GameState::new(settings(2, 10), &default_pool(), 5).unwrap();
    state.start();
    state.tick(1500);

    let stats = state.abandon().unwrap();
    assert!(!stats.completed);
    assert!(state.current_stimulus().is_none());

    assert!(state.restart());
    assert!(!state.abandoned());
    assert_eq!(state.turn_number(), 1);
    play_perfectly(&mut state);
    assert!(state.stats().unwrap().completed);
}

#[test]
fn test_random_filter_uses_one_kind() {
    let mut s = settings(2, 20);
    s.stimulus = StimulusFilter::Random;
    for seed in 1..20 {
        let state = GameState::new(s, &default_pool(), seed).unwrap();
        let first = state.sequence().items()[0].kind;
        assert!(state.sequence().items().iter().all(|i| i.kind == first));
    }
}

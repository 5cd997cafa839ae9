//! From a finished session to rewards, achievements and a saved profile

use chrono::{TimeZone, Utc};

use nback::core::{GameState, SimpleRng, VirtualClock};
use nback::engine::{check_achievements, process_rewards, PlayerRewards, UnlockedAchievements};
use nback::profile::Profile;
use nback::types::{
    AbstainPolicy, GameSettings, Stimulus, StimulusFilter, StimulusKind, CORRECT_FEEDBACK_MS,
};

/// n = 1 over B A A A A A A: a non-match, then five consecutive matches.
fn five_match_session() -> GameState {
    let a = Stimulus::new(1, StimulusKind::Number, "7");
    let settings = GameSettings {
        n_level: 1,
        stimulus: StimulusFilter::Any,
        game_length: 7,
        speed_ms: 1000,
        abstain_policy: AbstainPolicy::PreserveStreak,
    };
    let mut items = vec![a; 7];
    items[0] = Stimulus::new(2, StimulusKind::Number, "3");
    GameState::replay(settings, items, SimpleRng::new(1), VirtualClock::new()).unwrap()
}

#[test]
fn test_streak_session_settles_into_profile() {
    let mut game = five_match_session();
    game.start();
    game.tick(1000);
    assert!(game.respond(false));
    game.tick(CORRECT_FEEDBACK_MS);
    for _ in 0..5 {
        assert!(game.respond(true));
        game.tick(CORRECT_FEEDBACK_MS);
    }
    assert!(game.game_over());

    // 10 + 15 + 20 + 25 + 30
    let stats = game.stats().unwrap();
    assert_eq!(stats.score, 100);
    assert_eq!(stats.max_streak, 5);

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("profile.json");
    let mut profile = Profile::load(&path).unwrap();
    let settlement = profile.settle(&stats, Utc.timestamp_opt(1_700_000_000, 0).unwrap());

    assert_eq!(settlement.rewards.earned.stars, 2);
    assert_eq!(settlement.rewards.earned.gems, 1);
    assert_eq!(
        settlement.unlocked,
        vec!["first_game", "score_100", "streak_5", "flawless", "speed_demon"]
    );
    profile.save(&path).unwrap();

    let reloaded = Profile::load(&path).unwrap();
    assert_eq!(reloaded.achievements["streak_5"], "2023-11-14T22:13:20.000Z");
    assert_eq!(
        reloaded.rewards,
        PlayerRewards {
            stars: 2,
            gems: 1,
            trophies: 0,
            perfect_scores: 0
        }
    );
    assert!(check_achievements(&stats, &reloaded.achievements).is_empty());
}

#[test]
fn test_rewards_cascade_example() {
    let first = process_rewards(PlayerRewards::default(), 7, false);
    let second = process_rewards(first.totals, 8, true);
    assert_eq!(
        second.totals,
        PlayerRewards {
            stars: 5,
            gems: 2,
            trophies: 0,
            perfect_scores: 0
        }
    );
}

#[test]
fn test_abandoned_session_earns_no_completion_achievements() {
    let mut game = five_match_session();
    game.start();
    game.tick(1000);
    // Calling the non-match a match
    assert!(game.respond(true));
    let stats = game.abandon().unwrap();

    let ids = check_achievements(&stats, &UnlockedAchievements::new());
    assert!(ids.is_empty());
}

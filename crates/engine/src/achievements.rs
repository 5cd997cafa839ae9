//! Achievement definitions and the evaluator that checks session stats against them.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, SecondsFormat, Utc};

use nback_types::GameStats;

/// Achievement id → unlock time (RFC 3339 / ISO 8601)
pub type UnlockedAchievements = BTreeMap<String, String>;

/// Unlock condition. Each category carries exactly the data it needs.
#[derive(Clone, Copy)]
pub enum AchievementGoal {
    /// Session score at or above the threshold
    Score(u32),
    /// Best streak at or above the threshold
    Streak(u32),
    /// Predicate over a finished session's settings and outcome
    LevelCompletion(fn(&GameStats) -> bool),
    /// Completed with exactly this many incorrect presses
    Precision(u32),
    /// Unlocked by the host through [`unlock_action`], never by the evaluator
    Action,
    Generic(fn(&GameStats) -> bool),
}

impl fmt::Debug for AchievementGoal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AchievementGoal::Score(t) => f.debug_tuple("Score").field(t).finish(),
            AchievementGoal::Streak(t) => f.debug_tuple("Streak").field(t).finish(),
            AchievementGoal::Precision(e) => f.debug_tuple("Precision").field(e).finish(),
            AchievementGoal::LevelCompletion(_) => f.write_str("LevelCompletion(..)"),
            AchievementGoal::Action => f.write_str("Action"),
            AchievementGoal::Generic(_) => f.write_str("Generic(..)"),
        }
    }
}

impl AchievementGoal {
    pub fn category(&self) -> &'static str {
        match self {
            AchievementGoal::Score(_) => "score",
            AchievementGoal::Streak(_) => "streak",
            AchievementGoal::LevelCompletion(_) => "level_completion",
            AchievementGoal::Precision(_) => "precision",
            AchievementGoal::Action => "action",
            AchievementGoal::Generic(_) => "generic",
        }
    }

    pub fn is_met(&self, stats: &GameStats) -> bool {
        match *self {
            AchievementGoal::Score(threshold) => stats.score >= threshold,
            AchievementGoal::Streak(threshold) => stats.max_streak >= threshold,
            AchievementGoal::LevelCompletion(check) | AchievementGoal::Generic(check) => {
                check(stats)
            }
            AchievementGoal::Precision(expected) => {
                stats.completed && stats.incorrect_presses == expected
            }
            AchievementGoal::Action => false,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Achievement {
    pub id: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    pub goal: AchievementGoal,
}

fn completed_at_level(stats: &GameStats, n_level: u32) -> bool {
    stats.completed && stats.settings.n_level >= n_level
}

/// Every built-in achievement, in evaluation order
pub static ACHIEVEMENTS: &[Achievement] = &[
    Achievement {
        id: "first_game",
        title: "First Steps",
        description: "Finish your first game",
        goal: AchievementGoal::Generic(|s| s.completed),
    },
    Achievement {
        id: "score_100",
        title: "Warming Up",
        description: "Score 100 points in one game",
        goal: AchievementGoal::Score(100),
    },
    Achievement {
        id: "score_500",
        title: "Sharp Mind",
        description: "Score 500 points in one game",
        goal: AchievementGoal::Score(500),
    },
    Achievement {
        id: "score_1000",
        title: "Memory Master",
        description: "Score 1000 points in one game",
        goal: AchievementGoal::Score(1000),
    },
    Achievement {
        id: "score_2500",
        title: "Total Recall",
        description: "Score 2500 points in one game",
        goal: AchievementGoal::Score(2500),
    },
    Achievement {
        id: "streak_5",
        title: "On a Roll",
        description: "Get 5 matches in a row",
        goal: AchievementGoal::Streak(5),
    },
    Achievement {
        id: "streak_10",
        title: "Unstoppable",
        description: "Get 10 matches in a row",
        goal: AchievementGoal::Streak(10),
    },
    Achievement {
        id: "streak_20",
        title: "In the Zone",
        description: "Get 20 matches in a row",
        goal: AchievementGoal::Streak(20),
    },
    Achievement {
        id: "level_2",
        title: "Double Back",
        description: "Finish a game at 2-back or higher",
        goal: AchievementGoal::LevelCompletion(|s| completed_at_level(s, 2)),
    },
    Achievement {
        id: "level_3",
        title: "Triple Back",
        description: "Finish a game at 3-back or higher",
        goal: AchievementGoal::LevelCompletion(|s| completed_at_level(s, 3)),
    },
    Achievement {
        id: "level_4",
        title: "Deep Memory",
        description: "Finish a game at 4-back or higher",
        goal: AchievementGoal::LevelCompletion(|s| completed_at_level(s, 4)),
    },
    Achievement {
        id: "flawless",
        title: "Flawless",
        description: "Finish a game without a single mistake",
        goal: AchievementGoal::Precision(0),
    },
    Achievement {
        id: "marathon",
        title: "Marathon",
        description: "Finish a game of 30 turns or more",
        goal: AchievementGoal::Generic(|s| s.completed && s.settings.game_length >= 30),
    },
    Achievement {
        id: "speed_demon",
        title: "Speed Demon",
        description: "Finish a game at 1.5 seconds per turn or faster",
        goal: AchievementGoal::Generic(|s| s.completed && s.settings.speed_ms <= 1500),
    },
    Achievement {
        id: "custom_stimulus",
        title: "Make It Yours",
        description: "Add a stimulus of your own",
        goal: AchievementGoal::Action,
    },
];

pub fn find(id: &str) -> Option<&'static Achievement> {
    ACHIEVEMENTS.iter().find(|a| a.id == id)
}

/// Ids of achievements `stats` earns that are not yet in `unlocked`, in table order.
pub fn check_achievements(stats: &GameStats, unlocked: &UnlockedAchievements) -> Vec<&'static str> {
    ACHIEVEMENTS
        .iter()
        .filter(|a| !unlocked.contains_key(a.id))
        .filter(|a| a.goal.is_met(stats))
        .map(|a| a.id)
        .collect()
}

fn timestamp(now: DateTime<Utc>) -> String {
    now.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Insert `ids` with the time `now`. Existing entries keep their original time.
///
/// Returns how many were newly recorded.
pub fn record_unlocks(
    unlocked: &mut UnlockedAchievements,
    ids: &[&str],
    now: DateTime<Utc>,
) -> usize {
    let stamp = timestamp(now);
    let mut added = 0;
    for id in ids {
        if unlocked.contains_key(*id) {
            continue;
        }
        unlocked.insert((*id).to_string(), stamp.clone());
        tracing::info!(achievement = *id, "achievement unlocked");
        added += 1;
    }
    added
}

/// Unlock an action-triggered achievement. Returns false for unknown ids, ids
/// that are not action goals, and ids already unlocked.
pub fn unlock_action(unlocked: &mut UnlockedAchievements, id: &str, now: DateTime<Utc>) -> bool {
    match find(id) {
        Some(achievement) if matches!(achievement.goal, AchievementGoal::Action) => {
            record_unlocks(unlocked, &[id], now) == 1
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use nback_types::GameSettings;

    fn example_stats() -> GameStats {
        GameStats {
            score: 500,
            settings: GameSettings {
                n_level: 1,
                ..GameSettings::default()
            },
            max_streak: 5,
            incorrect_presses: 0,
            completed: true,
        }
    }

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).unwrap()
    }

    #[test]
    fn test_ids_are_unique() {
        let mut ids: Vec<&str> = ACHIEVEMENTS.iter().map(|a| a.id).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), ACHIEVEMENTS.len());
    }

    #[test]
    fn test_example_session_unlocks() {
        let ids = check_achievements(&example_stats(), &UnlockedAchievements::new());
        assert_eq!(
            ids,
            vec!["first_game", "score_100", "score_500", "streak_5", "flawless"]
        );
    }

    #[test]
    fn test_already_unlocked_are_skipped() {
        let mut unlocked = UnlockedAchievements::new();
        unlocked.insert("score_500".into(), "2024-01-01T00:00:00.000Z".into());
        unlocked.insert("flawless".into(), "2024-01-01T00:00:00.000Z".into());

        let ids = check_achievements(&example_stats(), &unlocked);
        assert!(ids.contains(&"streak_5"));
        assert!(!ids.contains(&"score_500"));
        assert!(!ids.contains(&"flawless"));
    }

    #[test]
    fn test_precision_requires_completion() {
        let stats = GameStats {
            completed: false,
            ..example_stats()
        };
        let ids = check_achievements(&stats, &UnlockedAchievements::new());
        assert!(!ids.contains(&"flawless"));
        assert!(!ids.contains(&"first_game"));
        // Score and streak goals do not care how the session ended.
        assert!(ids.contains(&"score_500"));
    }

    #[test]
    fn test_level_and_generic_goals() {
        let stats = GameStats {
            score: 0,
            settings: GameSettings {
                n_level: 3,
                game_length: 30,
                speed_ms: 1500,
                ..GameSettings::default()
            },
            max_streak: 0,
            incorrect_presses: 4,
            completed: true,
        };
        let ids = check_achievements(&stats, &UnlockedAchievements::new());
        assert_eq!(
            ids,
            vec!["first_game", "level_2", "level_3", "marathon", "speed_demon"]
        );
    }

    #[test]
    fn test_action_goals_never_come_from_stats() {
        let stats = GameStats {
            score: u32::MAX,
            max_streak: u32::MAX,
            ..example_stats()
        };
        let ids = check_achievements(&stats, &UnlockedAchievements::new());
        assert!(!ids.contains(&"custom_stimulus"));
    }

    #[test]
    fn test_record_unlocks_is_write_once() {
        let mut unlocked = UnlockedAchievements::new();
        assert_eq!(record_unlocks(&mut unlocked, &["streak_5"], at(0)), 1);
        assert_eq!(unlocked["streak_5"], "1970-01-01T00:00:00.000Z");

        assert_eq!(record_unlocks(&mut unlocked, &["streak_5", "score_100"], at(60)), 1);
        assert_eq!(unlocked["streak_5"], "1970-01-01T00:00:00.000Z");
        assert_eq!(unlocked["score_100"], "1970-01-01T00:01:00.000Z");
    }

    #[test]
    fn test_unlock_action() {
        let mut unlocked = UnlockedAchievements::new();
        assert!(unlock_action(&mut unlocked, "custom_stimulus", at(0)));
        assert!(!unlock_action(&mut unlocked, "custom_stimulus", at(10)));
        assert!(!unlock_action(&mut unlocked, "score_100", at(10)));
        assert!(!unlock_action(&mut unlocked, "no_such_thing", at(10)));
        assert_eq!(unlocked.len(), 1);
    }

    #[test]
    fn test_categories() {
        assert_eq!(find("score_2500").map(|a| a.goal.category()), Some("score"));
        assert_eq!(find("level_4").map(|a| a.goal.category()), Some("level_completion"));
        assert_eq!(find("custom_stimulus").map(|a| a.goal.category()), Some("action"));
    }
}

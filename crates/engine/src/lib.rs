//! Post-session engine: reward cascade and achievements.
//!
//! Everything here works on a finished session's [`GameStats`] and plain value
//! types, so hosts can settle a session without touching the turn state machine.
//!
//! ```
//! use nback_engine::{check_achievements, settle_session, PlayerRewards, UnlockedAchievements};
//! use nback_types::{GameSettings, GameStats};
//!
//! let stats = GameStats {
//!     score: 500,
//!     settings: GameSettings { n_level: 1, ..GameSettings::default() },
//!     max_streak: 5,
//!     incorrect_presses: 0,
//!     completed: true,
//! };
//!
//! let outcome = settle_session(PlayerRewards::default(), &stats);
//! assert_eq!(outcome.earned.stars, 10);
//! assert_eq!(outcome.totals.gems, 2);
//!
//! let ids = check_achievements(&stats, &UnlockedAchievements::new());
//! assert!(ids.contains(&"flawless"));
//! ```
//!
//! [`GameStats`]: nback_types::GameStats

pub mod achievements;
pub mod rewards;

pub use achievements::{
    check_achievements, record_unlocks, unlock_action, Achievement, AchievementGoal,
    UnlockedAchievements, ACHIEVEMENTS,
};
pub use rewards::{
    apply_cascade, calculate_stars, process_rewards, settle_session, PlayerRewards, RewardOutcome,
};

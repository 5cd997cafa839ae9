//! Core types module - shared data structures and constants
//!
//! This module defines the fundamental types used throughout the trainer.
//! Everything here is plain data (plus serde derives for the host's persistence
//! contract), usable by the core state machine, the reward engine, and any host.
//!
//! # Game Timing Constants
//!
//! Timing values are in milliseconds:
//!
//! | Constant | Value | Description |
//! |----------|-------|-------------|
//! | `TICK_MS` | 16 | Host polling interval (~60 FPS) |
//! | `DEFAULT_SPEED_MS` | 2500 | Default time a stimulus stays up waiting for a response |
//! | `CORRECT_FEEDBACK_MS` | 500 | Delay before advancing after a correct response |
//! | `MISSED_MATCH_REVIEW_MS` | 1000 | Review overlay duration after a missed match |
//!
//! After an explicit wrong answer the review overlay stays up for the full
//! per-turn duration (`GameSettings::speed_ms`).
//!
//! # Scoring Constants
//!
//! - Base points for a correct match: `BASE_POINTS * 2^(n-1)`
//! - Penalty: half of the base points, rounded up
//! - Combo bonus: `(streak - 1) * COMBO_STEP * n`
//! - Stars: one per `STAR_CONVERSION_FACTOR * base` points
//! - Reward tiers carry over every `CASCADE_BASE` units
//!
//! # Examples
//!
//! ```
//! use nback_types::{GameAction, GameSettings, StimulusFilter, StimulusKind};
//!
//! let kind = StimulusKind::from_str("Letter").unwrap();
//! assert_eq!(kind, StimulusKind::Letter);
//!
//! let settings = GameSettings {
//!     n_level: 3,
//!     stimulus: StimulusFilter::Only(kind),
//!     ..GameSettings::default()
//! };
//! assert!(settings.validate().is_ok());
//!
//! assert_eq!(GameAction::from_str("noMatch"), Some(GameAction::NoMatch));
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Host polling interval in milliseconds (16ms ≈ 60 FPS)
pub const TICK_MS: u32 = 16;

/// Default n-back distance
pub const DEFAULT_N_LEVEL: u32 = 2;

/// Highest supported n-back distance.
///
/// Also bounds the review window, which holds the last `n` stimuli.
pub const MAX_N_LEVEL: usize = 9;

/// Default number of turns per session
pub const DEFAULT_GAME_LENGTH: usize = 20;

/// Default per-turn duration
pub const DEFAULT_SPEED_MS: u32 = 2500;

/// Delay before advancing after a correct response
pub const CORRECT_FEEDBACK_MS: u32 = 500;

/// Review overlay duration after a missed match
pub const MISSED_MATCH_REVIEW_MS: u32 = 1000;

/// Points for a correct match at n = 1 (doubles with each level)
pub const BASE_POINTS: u32 = 10;

/// Combo bonus per streak step, multiplied by n
pub const COMBO_STEP: u32 = 5;

/// Points per star, in units of the level's base points
pub const STAR_CONVERSION_FACTOR: u32 = 5;

/// Units of one reward tier that convert into one unit of the next
pub const CASCADE_BASE: u32 = 10;

/// Longest run of identical match/non-match assignments the balancer allows
pub const MAX_PLAN_STREAK: usize = 3;

/// Balancing passes before the sequence generator gives up
pub const MAX_BALANCE_PASSES: usize = 5;

/// One in `MATCH_RATIO_DIVISOR` scorable positions is a match
pub const MATCH_RATIO_DIVISOR: usize = 3;


/// Stimulus categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StimulusKind {
    Letter,
    Number,
    Color,
    Shape,
    Emoji,
    Word,
    Custom,
}

impl StimulusKind {
    /// Every kind, in display order
    pub const ALL: [StimulusKind; 7] = [
        StimulusKind::Letter,
        StimulusKind::Number,
        StimulusKind::Color,
        StimulusKind::Shape,
        StimulusKind::Emoji,
        StimulusKind::Word,
        StimulusKind::Custom,
    ];

    /// Parse stimulus kind from string (case-insensitive)
    ///
    /// # Examples
    ///
    /// ```
    /// use nback_types::StimulusKind;
    ///
    /// assert_eq!(StimulusKind::from_str("letter"), Some(StimulusKind::Letter));
    /// assert_eq!(StimulusKind::from_str("Emoji"), Some(StimulusKind::Emoji));
    /// assert_eq!(StimulusKind::from_str("unknown"), None);
    /// ```
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "letter" | "letters" => Some(StimulusKind::Letter),
            "number" | "numbers" => Some(StimulusKind::Number),
            "color" | "colors" | "colour" => Some(StimulusKind::Color),
            "shape" | "shapes" => Some(StimulusKind::Shape),
            "emoji" => Some(StimulusKind::Emoji),
            "word" | "words" => Some(StimulusKind::Word),
            "custom" => Some(StimulusKind::Custom),
            _ => None,
        }
    }

    /// Convert to lowercase string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            StimulusKind::Letter => "letter",
            StimulusKind::Number => "number",
            StimulusKind::Color => "color",
            StimulusKind::Shape => "shape",
            StimulusKind::Emoji => "emoji",
            StimulusKind::Word => "word",
            StimulusKind::Custom => "custom",
        }
    }
}

/// A single item that can be shown on a turn.
///
/// Two stimuli are the same for n-back purposes when they share a kind and a
/// value; the id only tells pool entries apart.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Stimulus {
    pub id: u32,
    pub kind: StimulusKind,
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl Stimulus {
    pub fn new(id: u32, kind: StimulusKind, value: impl Into<String>) -> Self {
        Self {
            id,
            kind,
            value: value.into(),
            name: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Name if present, otherwise the raw display value
    pub fn label(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.value)
    }

    pub fn same_as(&self, other: &Stimulus) -> bool {
        self.kind == other.kind && self.value == other.value
    }
}

/// Which stimuli a session draws from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StimulusFilter {
    /// Every kind mixed together
    Any,
    /// One kind picked at random when the session is created
    Random,
    /// A single kind
    Only(StimulusKind),
}

impl StimulusFilter {
    /// Parse from `any`, `random`, or a stimulus kind name (case-insensitive)
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "any" | "all" | "mixed" => Some(StimulusFilter::Any),
            "random" => Some(StimulusFilter::Random),
            other => StimulusKind::from_str(other).map(StimulusFilter::Only),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            StimulusFilter::Any => "any",
            StimulusFilter::Random => "random",
            StimulusFilter::Only(kind) => kind.as_str(),
        }
    }

    /// Whether a stimulus of `kind` passes this filter.
    ///
    /// `Random` accepts everything; the concrete kind is resolved by the pool.
    pub fn accepts(&self, kind: StimulusKind) -> bool {
        match self {
            StimulusFilter::Any | StimulusFilter::Random => true,
            StimulusFilter::Only(k) => *k == kind,
        }
    }
}

/// How a correct non-response (or correct "no match" press) affects the streak
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AbstainPolicy {
    /// Streak is left untouched
    #[default]
    PreserveStreak,
    /// Streak drops back to zero
    ResetStreak,
}

impl AbstainPolicy {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "preserve" | "preserve_streak" | "keep" => Some(AbstainPolicy::PreserveStreak),
            "reset" | "reset_streak" => Some(AbstainPolicy::ResetStreak),
            _ => None,
        }
    }
}

/// Settings validation failures
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SettingsError {
    #[error("n-back level {0} is out of range (expected 1..={max})", max = MAX_N_LEVEL)]
    NLevelOutOfRange(u32),

    #[error("game length {game_length} must be greater than the n-back level {n_level}")]
    GameTooShort { game_length: usize, n_level: u32 },

    #[error("turn speed must be at least 1ms")]
    ZeroSpeed,
}

/// Per-session configuration, supplied by the host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameSettings {
    /// Lag distance for matches
    pub n_level: u32,
    pub stimulus: StimulusFilter,
    /// Total number of turns
    pub game_length: usize,
    /// How long each stimulus stays up waiting for a response
    pub speed_ms: u32,
    #[serde(default)]
    pub abstain_policy: AbstainPolicy,
}

impl Default for GameSettings {
    fn default() -> Self {
        Self {
            n_level: DEFAULT_N_LEVEL,
            stimulus: StimulusFilter::Only(StimulusKind::Letter),
            game_length: DEFAULT_GAME_LENGTH,
            speed_ms: DEFAULT_SPEED_MS,
            abstain_policy: AbstainPolicy::PreserveStreak,
        }
    }
}

impl GameSettings {
    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.n_level == 0 || self.n_level as usize > MAX_N_LEVEL {
            return Err(SettingsError::NLevelOutOfRange(self.n_level));
        }
        if self.game_length <= self.n_level as usize {
            return Err(SettingsError::GameTooShort {
                game_length: self.game_length,
                n_level: self.n_level,
            });
        }
        if self.speed_ms == 0 {
            return Err(SettingsError::ZeroSpeed);
        }
        Ok(())
    }

    /// n as an index offset
    pub fn n(&self) -> usize {
        self.n_level as usize
    }
}

/// Actions a host can apply to a running session
///
/// These are produced by keyboard input or by automated players.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameAction {
    /// The current stimulus matches the one n turns back
    Match,
    /// The current stimulus does not match
    NoMatch,
    /// Toggle pause state
    Pause,
    /// Start a fresh session with the same settings
    Restart,
}

impl GameAction {
    /// Parse action from string
    ///
    /// # Examples
    ///
    /// ```
    /// use nback_types::GameAction;
    ///
    /// assert_eq!(GameAction::from_str("match"), Some(GameAction::Match));
    /// assert_eq!(GameAction::from_str("noMatch"), Some(GameAction::NoMatch));
    /// assert_eq!(GameAction::from_str("unknown"), None);
    /// ```
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "match" => Some(GameAction::Match),
            "nomatch" | "no_match" => Some(GameAction::NoMatch),
            "pause" => Some(GameAction::Pause),
            "restart" => Some(GameAction::Restart),
            _ => None,
        }
    }

    /// Convert to camelCase string
    pub fn as_str(&self) -> &'static str {
        match self {
            GameAction::Match => "match",
            GameAction::NoMatch => "noMatch",
            GameAction::Pause => "pause",
            GameAction::Restart => "restart",
        }
    }
}

/// Classification of a resolved turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TurnResult {
    Correct,
    Incorrect,
    /// No scoring impact (before position n, or a correct abstention)
    Neutral,
}

/// One point of the post-game score chart
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnLogEntry {
    /// 1-based turn number
    pub turn: usize,
    /// Cumulative score after this turn resolved
    pub score: u32,
    pub result: TurnResult,
}

/// Session summary, created once when a session ends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameStats {
    pub score: u32,
    pub settings: GameSettings,
    pub max_streak: u32,
    pub incorrect_presses: u32,
    /// False when the session was abandoned before the last turn
    pub completed: bool,
}

impl GameStats {
    /// Completed, no incorrect presses, and something scored
    pub fn is_perfect_game(&self) -> bool {
        self.completed && self.incorrect_presses == 0 && self.score > 0
    }
}

/// Core-side events, drained by the host after each call into the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameEvent {
    /// A new stimulus is up (1-based turn number)
    TurnStarted { turn: usize },
    /// Correct answer; `points` is zero for a correct "no match" press
    Correct {
        turn: usize,
        streak: u32,
        points: u32,
    },
    /// Wrong answer, or a match that went unanswered (`missed`)
    Incorrect {
        turn: usize,
        penalty: u32,
        missed: bool,
    },
    /// Turn resolved without scoring impact
    Neutral { turn: usize },
    Paused,
    Resumed,
    GameOver(GameStats),
    Abandoned(GameStats),
}

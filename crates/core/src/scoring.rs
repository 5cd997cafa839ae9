//! Scoring module - points, penalties, combos and the turn log
//!
//! Scoring rules:
//! - A correct match earns `10 * 2^(n-1)` base points.
//! - Consecutive correct matches add a combo bonus of `(streak - 1) * 5 * n`.
//! - A wrong answer or a missed match costs half the base points (rounded up), never
//!   taking the score below zero, and resets the streak.
//! - Correct abstentions and correct "no match" presses leave the score alone; the
//!   streak follows the session's [`AbstainPolicy`].

use crate::types::{AbstainPolicy, TurnLogEntry, TurnResult, BASE_POINTS, COMBO_STEP};

/// Score calculation result for a correct match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScoreResult {
    pub base_points: u32,
    pub combo_bonus: u32,
    pub total: u32,
    /// Streak after this match
    pub streak: u32,
}

/// Points for a correct match at level `n_level` (levels below 1 score as 1)
pub fn base_points(n_level: u32) -> u32 {
    let doublings = n_level.saturating_sub(1).min(31);
    BASE_POINTS.saturating_mul(1u32 << doublings)
}

/// Points lost for a wrong answer or missed match
pub fn penalty_points(n_level: u32) -> u32 {
    base_points(n_level).div_ceil(2)
}

/// Combo bonus for reaching `streak` consecutive correct matches
pub fn calculate_combo_bonus(streak: u32, n_level: u32) -> u32 {
    streak
        .saturating_sub(1)
        .saturating_mul(COMBO_STEP)
        .saturating_mul(n_level)
}

/// Score a correct match that brings the streak to `streak`
pub fn calculate_match_score(streak: u32, n_level: u32) -> ScoreResult {
    let base_points = base_points(n_level);
    let combo_bonus = calculate_combo_bonus(streak, n_level);
    ScoreResult {
        base_points,
        combo_bonus,
        total: base_points.saturating_add(combo_bonus),
        streak,
    }
}

/// Subtract `penalty` from `score`, clamped at zero
pub fn apply_penalty(score: u32, penalty: u32) -> u32 {
    score.saturating_sub(penalty)
}

/// Running score, streak and turn log for one session
#[derive(Debug, Clone, PartialEq)]
pub struct Scoreboard {
    n_level: u32,
    policy: AbstainPolicy,
    score: u32,
    streak: u32,
    max_streak: u32,
    incorrect_presses: u32,
    log: Vec<TurnLogEntry>,
}

impl Scoreboard {
    pub fn new(n_level: u32, policy: AbstainPolicy) -> Self {
        Self {
            n_level,
            policy,
            score: 0,
            streak: 0,
            max_streak: 0,
            incorrect_presses: 0,
            log: Vec::new(),
        }
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn streak(&self) -> u32 {
        self.streak
    }

    pub fn max_streak(&self) -> u32 {
        self.max_streak
    }

    pub fn incorrect_presses(&self) -> u32 {
        self.incorrect_presses
    }

    pub fn policy(&self) -> AbstainPolicy {
        self.policy
    }

    /// Turn-indexed score history for charting
    pub fn log(&self) -> &[TurnLogEntry] {
        &self.log
    }

    /// Correct match on `turn` (1-based)
    pub fn record_correct_match(&mut self, turn: usize) -> ScoreResult {
        self.streak += 1;
        self.max_streak = self.max_streak.max(self.streak);
        let result = calculate_match_score(self.streak, self.n_level);
        self.score = self.score.saturating_add(result.total);
        self.log_turn(turn, TurnResult::Correct);
        result
    }

    /// Wrong answer or missed match. Returns the nominal penalty.
    pub fn record_incorrect(&mut self, turn: usize) -> u32 {
        let penalty = penalty_points(self.n_level);
        self.score = apply_penalty(self.score, penalty);
        self.streak = 0;
        self.incorrect_presses += 1;
        self.log_turn(turn, TurnResult::Incorrect);
        penalty
    }

    /// Correct "no match" press
    pub fn record_correct_rejection(&mut self, turn: usize) {
        self.apply_abstain_policy();
        self.log_turn(turn, TurnResult::Correct);
    }

    /// No response on a turn without a match
    pub fn record_abstain(&mut self, turn: usize) {
        self.apply_abstain_policy();
        self.log_turn(turn, TurnResult::Neutral);
    }

    /// Turn with nothing to judge yet (before position n)
    pub fn record_neutral(&mut self, turn: usize) {
        self.log_turn(turn, TurnResult::Neutral);
    }

    fn apply_abstain_policy(&mut self) {
        if self.policy == AbstainPolicy::ResetStreak {
            self.streak = 0;
        }
    }

    fn log_turn(&mut self, turn: usize, result: TurnResult) {
        if self.log.last().map(|e| e.turn) == Some(turn) {
            return;
        }
        self.log.push(TurnLogEntry {
            turn,
            score: self.score,
            result,
        });
    }
}

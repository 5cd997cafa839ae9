//! Reward cascade - stars carry into gems, gems into trophies, trophies into
//! perfect scores, ten for one at each step.

use serde::{Deserialize, Serialize};

use nback_core::scoring::base_points;
use nback_types::{GameStats, CASCADE_BASE, STAR_CONVERSION_FACTOR};

/// Reward tiers, lowest first
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PlayerRewards {
    pub stars: u32,
    pub gems: u32,
    pub trophies: u32,
    pub perfect_scores: u32,
}

impl PlayerRewards {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// What one settlement added, and the totals it produced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RewardOutcome {
    /// Stars as earned; higher tiers as carried (plus the perfect-game gem)
    pub earned: PlayerRewards,
    pub totals: PlayerRewards,
}

/// Stars for a session score at level `n_level`
pub fn calculate_stars(score: u32, n_level: u32) -> u32 {
    let per_star = base_points(n_level).saturating_mul(STAR_CONVERSION_FACTOR);
    score / per_star.max(1)
}

fn carry(lower: &mut u32, upper: &mut u32) -> u32 {
    let carried = *lower / CASCADE_BASE;
    *lower %= CASCADE_BASE;
    *upper = upper.saturating_add(carried);
    carried
}

/// Add raw stars and bonus gems to `totals`, then carry upwards.
///
/// Carrying is positional, so cascading twice gives the same totals as cascading
/// the summed inputs once.
pub fn apply_cascade(totals: PlayerRewards, stars: u32, bonus_gems: u32) -> PlayerRewards {
    cascade(totals, stars, bonus_gems).0
}

/// Returns the cascaded totals and the (gems, trophies, perfect_scores) carried.
fn cascade(mut totals: PlayerRewards, stars: u32, bonus_gems: u32) -> (PlayerRewards, [u32; 3]) {
    totals.gems = totals.gems.saturating_add(bonus_gems);
    totals.stars = totals.stars.saturating_add(stars);

    let gems = carry(&mut totals.stars, &mut totals.gems);
    let trophies = carry(&mut totals.gems, &mut totals.trophies);
    let perfect = carry(&mut totals.trophies, &mut totals.perfect_scores);
    (totals, [gems, trophies, perfect])
}

/// Fold `stars` earned in a session into `current`.
///
/// A perfect game adds one bonus gem before the stars are carried.
pub fn process_rewards(current: PlayerRewards, stars: u32, perfect: bool) -> RewardOutcome {
    let bonus = u32::from(perfect);
    let (totals, [gems, trophies, perfect_scores]) = cascade(current, stars, bonus);

    RewardOutcome {
        earned: PlayerRewards {
            stars,
            gems: bonus + gems,
            trophies,
            perfect_scores,
        },
        totals,
    }
}

/// Compute stars and the perfect-game bonus for `stats` and fold them into `current`.
pub fn settle_session(current: PlayerRewards, stats: &GameStats) -> RewardOutcome {
    let stars = calculate_stars(stats.score, stats.settings.n_level);
    let perfect = stats.is_perfect_game();
    let outcome = process_rewards(current, stars, perfect);
    tracing::info!(
        score = stats.score,
        stars,
        perfect,
        gems = outcome.earned.gems,
        trophies = outcome.earned.trophies,
        "rewards settled"
    );
    outcome
}

//! Player profile persisted as JSON between sessions.

use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::engine::{
    check_achievements, record_unlocks, settle_session, PlayerRewards, RewardOutcome,
    UnlockedAchievements,
};
use crate::types::GameStats;

/// Everything the host keeps across sessions
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Profile {
    pub rewards: PlayerRewards,
    pub achievements: UnlockedAchievements,
    pub games_played: u32,
    /// Best score per n-back level, keyed by n
    pub best_scores: BTreeMap<u32, u32>,
}

/// Result of folding one session into a profile
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settlement {
    pub rewards: RewardOutcome,
    pub unlocked: Vec<&'static str>,
    pub new_best: bool,
}

impl Profile {
    /// Load from `path`; a missing file gives an empty profile.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = match fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Self::default()),
            Err(err) => {
                return Err(err).with_context(|| format!("reading profile {}", path.display()))
            }
        };
        serde_json::from_str(&raw).with_context(|| format!("parsing profile {}", path.display()))
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("serializing profile")?;
        fs::write(path, json).with_context(|| format!("writing profile {}", path.display()))
    }

    /// Fold a finished session into the profile: rewards, achievements, counters.
    pub fn settle(&mut self, stats: &GameStats, now: DateTime<Utc>) -> Settlement {
        let rewards = settle_session(self.rewards, stats);
        self.rewards = rewards.totals;

        let unlocked = check_achievements(stats, &self.achievements);
        record_unlocks(&mut self.achievements, &unlocked, now);

        let mut new_best = false;
        if stats.completed {
            self.games_played += 1;
            let best = self.best_scores.entry(stats.settings.n_level).or_insert(0);
            if stats.score > *best {
                *best = stats.score;
                new_best = true;
            }
        }

        Settlement {
            rewards,
            unlocked,
            new_best,
        }
    }
}

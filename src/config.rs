//! Environment-driven configuration for the binaries.

use std::env;
use std::path::PathBuf;

use chrono::Utc;

use crate::types::{
    AbstainPolicy, GameSettings, SettingsError, StimulusFilter, StimulusKind, DEFAULT_GAME_LENGTH,
    DEFAULT_N_LEVEL, DEFAULT_SPEED_MS,
};

pub const DEFAULT_PROFILE_PATH: &str = "nback-profile.json";

/// Host configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub n_level: u32,
    pub game_length: usize,
    pub speed_ms: u32,
    pub stimulus: StimulusFilter,
    pub abstain_policy: AbstainPolicy,
    pub seed: u32,
    /// None disables persistence
    pub profile_path: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            n_level: DEFAULT_N_LEVEL,
            game_length: DEFAULT_GAME_LENGTH,
            speed_ms: DEFAULT_SPEED_MS,
            stimulus: StimulusFilter::Only(StimulusKind::Letter),
            abstain_policy: AbstainPolicy::PreserveStreak,
            seed: 1,
            profile_path: Some(PathBuf::from(DEFAULT_PROFILE_PATH)),
        }
    }
}

fn parsed<T, F>(lookup: &F, key: &str, parse: impl Fn(&str) -> Option<T>) -> Option<T>
where
    F: Fn(&str) -> Option<String>,
{
    let raw = lookup(key)?;
    let value = parse(raw.trim());
    if value.is_none() {
        tracing::warn!(key, value = %raw, "ignoring unparseable setting");
    }
    value
}

fn time_seed() -> u32 {
    let now = Utc::now();
    (now.timestamp() as u32) ^ now.timestamp_subsec_nanos()
}

impl AppConfig {
    /// Read `NBACK_*` variables, falling back to defaults for anything missing or
    /// unparseable.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let n_level = parsed(&lookup, "NBACK_LEVEL", |s| s.parse().ok()).unwrap_or(defaults.n_level);
        let game_length =
            parsed(&lookup, "NBACK_LENGTH", |s| s.parse().ok()).unwrap_or(defaults.game_length);
        let speed_ms =
            parsed(&lookup, "NBACK_SPEED_MS", |s| s.parse().ok()).unwrap_or(defaults.speed_ms);
        let stimulus =
            parsed(&lookup, "NBACK_STIMULUS", StimulusFilter::from_str).unwrap_or(defaults.stimulus);
        let abstain_policy = parsed(&lookup, "NBACK_ABSTAIN", AbstainPolicy::from_str)
            .unwrap_or(defaults.abstain_policy);
        let seed = parsed(&lookup, "NBACK_SEED", |s| s.parse().ok()).unwrap_or_else(time_seed);

        let profile_path = match lookup("NBACK_PROFILE_PATH") {
            Some(path) if path.trim().is_empty() => None,
            Some(path) => Some(PathBuf::from(path.trim())),
            None => defaults.profile_path,
        };

        Self {
            n_level,
            game_length,
            speed_ms,
            stimulus,
            abstain_policy,
            seed,
            profile_path,
        }
    }

    /// Session settings, validated
    pub fn settings(&self) -> Result<GameSettings, SettingsError> {
        let settings = GameSettings {
            n_level: self.n_level,
            stimulus: self.stimulus,
            game_length: self.game_length,
            speed_ms: self.speed_ms,
            abstain_policy: self.abstain_policy,
        };
        settings.validate()?;
        Ok(settings)
    }
}

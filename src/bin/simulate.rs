//! Headless auto-player.
//!
//! Plays sessions on the virtual clock with a fixed answer accuracy and prints
//! one JSON summary line per session.
//!
//! Usage: `nback-simulate [ACCURACY] [GAMES]` (defaults: 90, 1). Session
//! settings come from the same `NBACK_*` variables as the terminal runner. The
//! player's profile is never touched; rewards accumulate in memory.

use anyhow::{bail, Context, Result};
use chrono::Utc;
use clap::Parser;
use serde_json::json;

use nback::config::AppConfig;
use nback::core::{default_pool, GameState, RandomSource, SimpleRng};
use nback::logging;
use nback::profile::Profile;
use nback::types::TICK_MS;

#[derive(Debug, Parser)]
#[command(name = "nback-simulate")]
#[command(about = "Auto-play n-back sessions and print a JSON summary per session", long_about = None)]
struct Args {
    /// Percent of turns answered correctly
    #[arg(default_value_t = 90, value_parser = clap::value_parser!(u32).range(0..=100))]
    accuracy: u32,

    /// Number of sessions to play
    #[arg(default_value_t = 1)]
    games: u32,
}

fn main() -> Result<()> {
    let Args { accuracy, games } = Args::parse();
    logging::init()?;

    let config = AppConfig::from_env();
    let settings = config.settings().context("invalid NBACK_* settings")?;
    let mut game = GameState::new(settings, &default_pool(), config.seed)
        .context("could not create a session")?;
    let mut player = SimpleRng::new(config.seed.wrapping_add(1));
    let mut profile = Profile::default();

    tracing::info!(accuracy, games, seed = config.seed, "simulation starting");

    for round in 0..games {
        if round == 0 {
            game.start();
        } else if !game.restart() {
            bail!("could not restart for session {round}");
        }

        while !game.game_over() {
            if game.awaiting_response() {
                let truth = game.sequence().is_match(game.position());
                let correct = player.next_range(100) < accuracy;
                game.respond(truth == correct);
            }
            game.tick(TICK_MS);
        }
        game.drain_events();

        let Some(stats) = game.stats() else {
            bail!("session {round} ended without stats");
        };
        let settlement = profile.settle(&stats, Utc::now());

        println!(
            "{}",
            json!({
                "episode": game.episode_id(),
                "stats": stats,
                "turn_log": game.turn_log(),
                "earned": settlement.rewards.earned,
                "totals": settlement.rewards.totals,
                "unlocked": settlement.unlocked,
            })
        );
    }

    tracing::info!(
        games_played = profile.games_played,
        stars = profile.rewards.stars,
        gems = profile.rewards.gems,
        trophies = profile.rewards.trophies,
        "simulation finished"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let args = Args::try_parse_from(["nback-simulate"]).unwrap();
        assert_eq!(args.accuracy, 90);
        assert_eq!(args.games, 1);
    }

    #[test]
    fn test_positional_values() {
        let args = Args::try_parse_from(["nback-simulate", "75", "3"]).unwrap();
        assert_eq!(args.accuracy, 75);
        assert_eq!(args.games, 3);
    }

    #[test]
    fn test_accuracy_is_a_percentage() {
        assert!(Args::try_parse_from(["nback-simulate", "100"]).is_ok());
        assert!(Args::try_parse_from(["nback-simulate", "101"]).is_err());
        assert!(Args::try_parse_from(["nback-simulate", "ninety"]).is_err());
    }
}

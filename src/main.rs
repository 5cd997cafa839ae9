//! Terminal n-back runner (default binary).
//!
//! Puts the terminal in raw mode for single-key input and prints each turn as a
//! plain line. Configuration comes from `NBACK_*` environment variables.

use std::io::{self, Write};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use chrono::Utc;
use crossterm::event::{self, Event};
use crossterm::terminal;

use nback::config::AppConfig;
use nback::core::{default_pool, GameState};
use nback::input::{handle_key_event, should_quit};
use nback::logging;
use nback::profile::Profile;
use nback::types::{GameEvent, GameStats, TICK_MS};

fn main() -> Result<()> {
    logging::init()?;

    let config = AppConfig::from_env();
    let settings = config.settings().context("invalid NBACK_* settings")?;
    let mut profile = match &config.profile_path {
        Some(path) => Profile::load(path)?,
        None => Profile::default(),
    };
    let mut game = GameState::new(settings, &default_pool(), config.seed)
        .context("could not create a session")?;

    terminal::enable_raw_mode().context("enabling raw mode")?;
    let result = run(&mut game, &mut profile, &config);

    // Always try to restore terminal state.
    let _ = terminal::disable_raw_mode();
    result
}

/// Raw mode needs explicit carriage returns.
fn line(out: &mut impl Write, text: &str) -> io::Result<()> {
    write!(out, "{text}\r\n")?;
    out.flush()
}

fn run(game: &mut GameState, profile: &mut Profile, config: &AppConfig) -> Result<()> {
    let mut out = io::stdout();
    let settings = *game.settings();
    line(
        &mut out,
        &format!(
            "{}-back, {} turns, {} ms per turn. M/J/Left = match, N/F/Right = no match, P = pause, R = restart, Q = quit",
            settings.n_level, settings.game_length, settings.speed_ms
        ),
    )?;

    game.start();
    report(game, profile, config, &mut out)?;

    let tick_duration = Duration::from_millis(u64::from(TICK_MS));
    let mut last_tick = Instant::now();

    loop {
        let timeout = tick_duration
            .checked_sub(last_tick.elapsed())
            .unwrap_or(Duration::ZERO);

        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                if should_quit(key) {
                    if let Some(stats) = game.abandon() {
                        line(&mut out, &format!("Quit at score {}.", stats.score))?;
                    }
                    return Ok(());
                }
                if let Some(action) = handle_key_event(key) {
                    game.apply_action(action);
                }
            }
        }

        let elapsed = last_tick.elapsed();
        if elapsed >= tick_duration {
            last_tick = Instant::now();
            game.tick(elapsed.as_millis().min(u128::from(u32::MAX)) as u32);
        }

        report(game, profile, config, &mut out)?;
    }
}

fn report(
    game: &mut GameState,
    profile: &mut Profile,
    config: &AppConfig,
    out: &mut impl Write,
) -> Result<()> {
    for event in game.drain_events() {
        match event {
            GameEvent::TurnStarted { turn } => {
                let label = game
                    .sequence()
                    .for_turn(turn)
                    .map(|s| s.label().to_string())
                    .unwrap_or_default();
                line(out, &format!("[{turn:>2}/{}]  {label}", game.sequence().len()))?;
            }
            GameEvent::Correct { points: 0, .. } => line(out, "        correct, no match")?,
            GameEvent::Correct { streak, points, .. } => line(
                out,
                &format!("        correct  +{points}  streak {streak}  score {}", game.score()),
            )?,
            GameEvent::Incorrect { penalty, missed, .. } => {
                let what = if missed { "missed match" } else { "wrong" };
                line(out, &format!("        {what}  -{penalty}  score {}", game.score()))?;
                let labels: Vec<String> =
                    game.review_window().iter().map(|s| s.label().to_string()).collect();
                line(out, &format!("        last {}: {}", labels.len(), labels.join(" ")))?;
            }
            GameEvent::Neutral { .. } => {}
            GameEvent::Paused => line(out, "-- paused (P to resume) --")?,
            GameEvent::Resumed => line(out, "-- resumed --")?,
            GameEvent::GameOver(stats) => game_over(&stats, profile, config, out)?,
            GameEvent::Abandoned(_) => {}
        }
    }
    Ok(())
}

fn game_over(
    stats: &GameStats,
    profile: &mut Profile,
    config: &AppConfig,
    out: &mut impl Write,
) -> Result<()> {
    line(
        out,
        &format!(
            "Game over: score {}, best streak {}, {} mistakes.",
            stats.score, stats.max_streak, stats.incorrect_presses
        ),
    )?;

    let settlement = profile.settle(stats, Utc::now());
    let earned = settlement.rewards.earned;
    let totals = settlement.rewards.totals;
    line(
        out,
        &format!(
            "Earned {} stars, {} gems, {} trophies. Totals: {} stars, {} gems, {} trophies, {} perfect scores.",
            earned.stars,
            earned.gems,
            earned.trophies,
            totals.stars,
            totals.gems,
            totals.trophies,
            totals.perfect_scores
        ),
    )?;
    if settlement.new_best {
        line(out, "New best score for this level!")?;
    }
    for id in &settlement.unlocked {
        if let Some(achievement) = nback::engine::achievements::find(id) {
            line(
                out,
                &format!("Achievement unlocked: {} ({})", achievement.title, achievement.description),
            )?;
        }
    }

    if let Some(path) = &config.profile_path {
        profile.save(path)?;
    }
    line(out, "R = play again, Q = quit")?;
    Ok(())
}

//! Game state module - the turn state machine
//!
//! This module ties together the sequence, the scheduler and the scoreboard. It owns
//! turn progression, response handling, pause/resume and session lifecycle.
//!
//! Each turn resolves exactly once, either through [`GameState::respond`] or through
//! the turn timer running out. Whichever happens first marks the turn as responded
//! and cancels the other path.

use arrayvec::ArrayVec;
use thiserror::Error;

use crate::pool::{distinct_count, select, MIN_DISTINCT_STIMULI};
use crate::rng::{RandomSource, SimpleRng};
use crate::scheduler::{Scheduler, TimerHandle, TimerKind, VirtualClock};
use crate::scoring::Scoreboard;
use crate::sequence::{generate, Sequence};
use crate::snapshot::GameSnapshot;
use crate::types::*;

/// Reasons a session cannot be created
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("invalid settings: {0}")]
    InvalidSettings(#[from] SettingsError),

    #[error(
        "need at least {min} distinct stimuli to start a game, found {available}",
        min = MIN_DISTINCT_STIMULI
    )]
    InsufficientStimuli { available: usize },

    #[error("sequence has {actual} turns but the settings ask for {expected}")]
    SequenceLength { expected: usize, actual: usize },
}

fn build_sequence<R: RandomSource>(
    settings: &GameSettings,
    pool: &[Stimulus],
    rng: &mut R,
) -> Result<Sequence, SessionError> {
    let session_pool = select(pool, settings.stimulus, rng);
    let available = distinct_count(&session_pool);
    if available < MIN_DISTINCT_STIMULI {
        tracing::warn!(
            available,
            filter = settings.stimulus.as_str(),
            "stimulus pool too small to start a session"
        );
        return Err(SessionError::InsufficientStimuli { available });
    }

    let sequence = generate(settings, &session_pool, rng);
    if sequence.is_empty() {
        return Err(SessionError::InsufficientStimuli { available });
    }
    Ok(sequence)
}

/// Complete session state
#[derive(Debug, Clone)]
pub struct GameState<R = SimpleRng, S = VirtualClock> {
    settings: GameSettings,
    /// Snapshot of the host's pool; restarts draw from it again.
    pool: Vec<Stimulus>,
    sequence: Sequence,
    rng: R,
    scheduler: S,
    scoreboard: Scoreboard,
    /// 0-based index of the current turn
    position: usize,
    /// Turns that have been advanced past; they make up the review history.
    completed_turns: usize,
    responded: bool,
    last_result: Option<TurnResult>,
    review_visible: bool,
    active_timer: Option<(TimerHandle, TimerKind)>,
    /// Timer parked by a pause, with the time it had left
    suspended: Option<(TimerKind, u32)>,
    events: Vec<GameEvent>,
    /// Monotonic episode id (increments on restart).
    episode_id: u32,
    started: bool,
    paused: bool,
    game_over: bool,
    abandoned: bool,
    stats: Option<GameStats>,
}

impl GameState<SimpleRng, VirtualClock> {
    /// Create a new session with a seeded RNG and a virtual clock
    pub fn new(settings: GameSettings, pool: &[Stimulus], seed: u32) -> Result<Self, SessionError> {
        Self::with_parts(settings, pool, SimpleRng::new(seed), VirtualClock::new())
    }
}

impl<R: RandomSource, S: Scheduler> GameState<R, S> {
    /// Create a new session from explicit collaborators.
    ///
    /// Fails when the settings are invalid or the filtered pool has fewer than two
    /// distinct stimuli.
    pub fn with_parts(
        settings: GameSettings,
        pool: &[Stimulus],
        mut rng: R,
        scheduler: S,
    ) -> Result<Self, SessionError> {
        settings.validate()?;
        let pool = pool.to_vec();
        let sequence = build_sequence(&settings, &pool, &mut rng)?;
        Ok(Self::from_parts(settings, pool, sequence, rng, scheduler))
    }

    /// Replay a stored sequence, e.g. to review a past session under the same
    /// stimuli. Restarts draw fresh sequences from the replayed stimuli.
    pub fn replay(
        settings: GameSettings,
        items: Vec<Stimulus>,
        rng: R,
        scheduler: S,
    ) -> Result<Self, SessionError> {
        settings.validate()?;
        if items.len() != settings.game_length {
            return Err(SessionError::SequenceLength {
                expected: settings.game_length,
                actual: items.len(),
            });
        }
        let available = distinct_count(&items);
        if available < MIN_DISTINCT_STIMULI {
            return Err(SessionError::InsufficientStimuli { available });
        }

        let pool = crate::pool::dedup_stimuli(&items);
        let sequence = Sequence::from_items(settings.n(), items);
        Ok(Self::from_parts(settings, pool, sequence, rng, scheduler))
    }

    fn from_parts(
        settings: GameSettings,
        pool: Vec<Stimulus>,
        sequence: Sequence,
        rng: R,
        scheduler: S,
    ) -> Self {
        Self {
            scoreboard: Scoreboard::new(settings.n_level, settings.abstain_policy),
            settings,
            pool,
            sequence,
            rng,
            scheduler,
            position: 0,
            completed_turns: 0,
            responded: false,
            last_result: None,
            review_visible: false,
            active_timer: None,
            suspended: None,
            events: Vec::new(),
            episode_id: 0,
            started: false,
            paused: false,
            game_over: false,
            abandoned: false,
            stats: None,
        }
    }

    /// Start the session and show the first stimulus
    pub fn start(&mut self) {
        if self.started || self.abandoned {
            return;
        }
        self.started = true;
        tracing::info!(
            episode = self.episode_id,
            n_level = self.settings.n_level,
            turns = self.sequence.len(),
            speed_ms = self.settings.speed_ms,
            "session started"
        );
        self.enter_turn();
    }

    pub fn settings(&self) -> &GameSettings {
        &self.settings
    }

    pub fn sequence(&self) -> &Sequence {
        &self.sequence
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    pub fn started(&self) -> bool {
        self.started
    }

    pub fn paused(&self) -> bool {
        self.paused
    }

    pub fn game_over(&self) -> bool {
        self.game_over
    }

    pub fn abandoned(&self) -> bool {
        self.abandoned
    }

    pub fn responded(&self) -> bool {
        self.responded
    }

    pub fn episode_id(&self) -> u32 {
        self.episode_id
    }

    pub fn position(&self) -> usize {
        self.position
    }

    /// 1-based turn number, 0 before the session starts
    pub fn turn_number(&self) -> usize {
        if self.started {
            self.position + 1
        } else {
            0
        }
    }

    pub fn score(&self) -> u32 {
        self.scoreboard.score()
    }

    pub fn streak(&self) -> u32 {
        self.scoreboard.streak()
    }

    pub fn max_streak(&self) -> u32 {
        self.scoreboard.max_streak()
    }

    pub fn incorrect_presses(&self) -> u32 {
        self.scoreboard.incorrect_presses()
    }

    pub fn last_result(&self) -> Option<TurnResult> {
        self.last_result
    }

    pub fn turn_log(&self) -> &[TurnLogEntry] {
        self.scoreboard.log()
    }

    /// Final stats, once the session has ended or been abandoned
    pub fn stats(&self) -> Option<GameStats> {
        self.stats
    }

    /// The stimulus on screen, if a turn is in progress
    pub fn current_stimulus(&self) -> Option<&Stimulus> {
        if !self.started || self.game_over || self.abandoned {
            return None;
        }
        self.sequence.get(self.position)
    }

    pub fn review_visible(&self) -> bool {
        self.review_visible
    }

    /// The last `n` stimuli before the current turn, oldest first
    pub fn review_window(&self) -> ArrayVec<Stimulus, MAX_N_LEVEL> {
        let n = self.settings.n().min(MAX_N_LEVEL);
        let end = self.completed_turns.min(self.sequence.len());
        let start = end.saturating_sub(n);
        self.sequence.items()[start..end].iter().cloned().collect()
    }

    /// Completed turns over total turns
    pub fn progress(&self) -> f32 {
        if self.sequence.is_empty() {
            return 0.0;
        }
        self.completed_turns as f32 / self.sequence.len() as f32
    }

    /// Take all events emitted since the last call
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn snapshot_into(&self, out: &mut GameSnapshot) {
        out.current = self.current_stimulus().cloned();
        out.score = self.score();
        out.turn = self.turn_number();
        out.total_turns = self.sequence.len();
        out.n_level = self.settings.n_level;
        out.streak = self.streak();
        out.max_streak = self.max_streak();
        out.incorrect_presses = self.incorrect_presses();
        out.last_result = self.last_result;
        out.responded = self.responded;
        out.started = self.started;
        out.paused = self.paused;
        out.game_over = self.game_over;
        out.progress = self.progress();
        out.review_visible = self.review_visible;
        out.review.clear();
        if self.review_visible {
            out.review = self.review_window();
        }
        out.episode_id = self.episode_id;
    }

    pub fn snapshot(&self) -> GameSnapshot {
        let mut s = GameSnapshot::default();
        self.snapshot_into(&mut s);
        s
    }

    /// Whether an explicit response would be considered right now
    pub fn awaiting_response(&self) -> bool {
        self.started
            && !self.game_over
            && !self.abandoned
            && !self.paused
            && !self.responded
            && self.position >= self.settings.n()
    }

    /// Submit the player's judgement for the current turn.
    ///
    /// Returns false (and changes nothing) when no response is expected: before
    /// position n, after the turn already resolved, while paused, or outside a
    /// running session.
    pub fn respond(&mut self, says_match: bool) -> bool {
        if !self.awaiting_response() {
            return false;
        }
        self.responded = true;
        self.cancel_active_timer();

        let turn = self.turn_number();
        let is_match = self.sequence.is_match(self.position);

        if says_match == is_match {
            let (streak, points) = if is_match {
                let result = self.scoreboard.record_correct_match(turn);
                (result.streak, result.total)
            } else {
                self.scoreboard.record_correct_rejection(turn);
                (self.scoreboard.streak(), 0)
            };
            tracing::debug!(turn, streak, points, score = self.score(), "correct response");
            self.last_result = Some(TurnResult::Correct);
            self.events.push(GameEvent::Correct {
                turn,
                streak,
                points,
            });
            self.schedule(CORRECT_FEEDBACK_MS, TimerKind::Advance);
        } else {
            let penalty = self.scoreboard.record_incorrect(turn);
            tracing::debug!(turn, penalty, score = self.score(), "incorrect response");
            self.last_result = Some(TurnResult::Incorrect);
            self.events.push(GameEvent::Incorrect {
                turn,
                penalty,
                missed: false,
            });
            self.review_visible = true;
            self.schedule(self.settings.speed_ms, TimerKind::Advance);
        }
        true
    }

    /// Advance virtual time, firing any timers that come due.
    ///
    /// Returns true if at least one timer fired.
    pub fn tick(&mut self, elapsed_ms: u32) -> bool {
        if !self.started || self.game_over || self.abandoned {
            return false;
        }

        let target = self.scheduler.now_ms() + u64::from(elapsed_ms);
        let mut fired = false;

        while let Some((handle, timer)) = self.scheduler.pop_due(target) {
            if self.active_timer.map(|(h, _)| h) != Some(handle) {
                continue;
            }
            self.active_timer = None;
            fired = true;
            match timer {
                TimerKind::TurnTimeout => self.on_turn_timeout(),
                TimerKind::Advance => self.advance(),
            }
            if self.game_over {
                break;
            }
        }

        self.scheduler.advance_to(target);
        fired
    }

    pub fn pause(&mut self) -> bool {
        if !self.started || self.game_over || self.abandoned || self.paused {
            return false;
        }
        self.paused = true;
        if let Some((handle, timer)) = self.active_timer.take() {
            let remaining = self.scheduler.remaining_ms(handle).unwrap_or(0);
            self.scheduler.cancel(handle);
            self.suspended = Some((timer, remaining));
        }
        tracing::debug!(turn = self.turn_number(), "paused");
        self.events.push(GameEvent::Paused);
        true
    }

    pub fn resume(&mut self) -> bool {
        if !self.paused || self.game_over || self.abandoned {
            return false;
        }
        self.paused = false;
        if let Some((timer, remaining)) = self.suspended.take() {
            self.schedule(remaining, timer);
        }
        tracing::debug!(turn = self.turn_number(), "resumed");
        self.events.push(GameEvent::Resumed);
        true
    }

    pub fn toggle_pause(&mut self) -> bool {
        if self.paused {
            self.resume()
        } else {
            self.pause()
        }
    }

    /// Apply a game action
    pub fn apply_action(&mut self, action: GameAction) -> bool {
        match action {
            GameAction::Match => self.respond(true),
            GameAction::NoMatch => self.respond(false),
            GameAction::Pause => self.toggle_pause(),
            GameAction::Restart => self.restart(),
        }
    }

    /// Begin a new session with the same settings and a freshly generated sequence.
    pub fn restart(&mut self) -> bool {
        let sequence = match build_sequence(&self.settings, &self.pool, &mut self.rng) {
            Ok(sequence) => sequence,
            Err(err) => {
                tracing::warn!(error = %err, "restart failed");
                return false;
            }
        };

        self.cancel_active_timer();
        self.scheduler.cancel_all();

        self.sequence = sequence;
        self.scoreboard = Scoreboard::new(self.settings.n_level, self.settings.abstain_policy);
        self.position = 0;
        self.completed_turns = 0;
        self.responded = false;
        self.last_result = None;
        self.review_visible = false;
        self.suspended = None;
        self.events.clear();
        self.episode_id = self.episode_id.wrapping_add(1);
        self.started = false;
        self.paused = false;
        self.game_over = false;
        self.abandoned = false;
        self.stats = None;

        self.start();
        true
    }

    /// Tear the session down before it finishes.
    ///
    /// Cancels every outstanding timer; nothing mutates the session afterwards
    /// except [`restart`](Self::restart). Returns the partial stats, or None if the
    /// session had already ended.
    pub fn abandon(&mut self) -> Option<GameStats> {
        self.cancel_active_timer();
        self.scheduler.cancel_all();
        self.suspended = None;

        if self.game_over || self.abandoned {
            return None;
        }
        self.abandoned = true;
        self.review_visible = false;

        let stats = self.build_stats(false);
        self.stats = Some(stats);
        tracing::info!(
            episode = self.episode_id,
            score = stats.score,
            turn = self.turn_number(),
            "session abandoned"
        );
        self.events.push(GameEvent::Abandoned(stats));
        Some(stats)
    }

    fn enter_turn(&mut self) {
        self.responded = false;
        self.review_visible = false;
        self.events.push(GameEvent::TurnStarted {
            turn: self.turn_number(),
        });
        self.schedule(self.settings.speed_ms, TimerKind::TurnTimeout);
    }

    fn on_turn_timeout(&mut self) {
        if self.responded {
            return;
        }
        self.responded = true;
        let turn = self.turn_number();

        if self.position < self.settings.n() {
            self.scoreboard.record_neutral(turn);
            self.last_result = Some(TurnResult::Neutral);
            self.events.push(GameEvent::Neutral { turn });
            self.advance();
        } else if self.sequence.is_match(self.position) {
            let penalty = self.scoreboard.record_incorrect(turn);
            tracing::debug!(turn, penalty, score = self.score(), "missed match");
            self.last_result = Some(TurnResult::Incorrect);
            self.events.push(GameEvent::Incorrect {
                turn,
                penalty,
                missed: true,
            });
            self.review_visible = true;
            self.schedule(MISSED_MATCH_REVIEW_MS, TimerKind::Advance);
        } else {
            self.scoreboard.record_abstain(turn);
            self.last_result = Some(TurnResult::Neutral);
            self.events.push(GameEvent::Neutral { turn });
            self.advance();
        }
    }

    fn advance(&mut self) {
        self.cancel_active_timer();
        self.completed_turns = self.position + 1;
        self.review_visible = false;

        if self.position + 1 < self.sequence.len() {
            self.position += 1;
            self.enter_turn();
        } else {
            self.finish();
        }
    }

    /// Move to the terminal state. Safe to call more than once.
    fn finish(&mut self) {
        if self.game_over {
            return;
        }
        self.game_over = true;
        self.cancel_active_timer();
        self.scheduler.cancel_all();
        self.suspended = None;

        let stats = self.build_stats(true);
        self.stats = Some(stats);
        tracing::info!(
            episode = self.episode_id,
            score = stats.score,
            max_streak = stats.max_streak,
            incorrect = stats.incorrect_presses,
            "session complete"
        );
        self.events.push(GameEvent::GameOver(stats));
    }

    fn build_stats(&self, completed: bool) -> GameStats {
        GameStats {
            score: self.score(),
            settings: self.settings,
            max_streak: self.max_streak(),
            incorrect_presses: self.incorrect_presses(),
            completed,
        }
    }

    fn schedule(&mut self, delay_ms: u32, timer: TimerKind) {
        self.cancel_active_timer();
        let handle = self.scheduler.schedule(delay_ms, timer);
        self.active_timer = Some((handle, timer));
    }

    fn cancel_active_timer(&mut self) {
        if let Some((handle, _)) = self.active_timer.take() {
            self.scheduler.cancel(handle);
        }
    }
}

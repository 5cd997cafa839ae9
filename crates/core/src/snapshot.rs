use arrayvec::ArrayVec;

use crate::types::{Stimulus, TurnResult, MAX_N_LEVEL};

/// Read model handed to the host after every call into the session.
#[derive(Debug, Clone, PartialEq)]
pub struct GameSnapshot {
    pub current: Option<Stimulus>,
    pub score: u32,
    /// 1-based, 0 before the session starts
    pub turn: usize,
    pub total_turns: usize,
    pub n_level: u32,
    pub streak: u32,
    pub max_streak: u32,
    pub incorrect_presses: u32,
    pub last_result: Option<TurnResult>,
    pub responded: bool,
    pub started: bool,
    pub paused: bool,
    pub game_over: bool,
    /// Completed turns over total turns
    pub progress: f32,
    pub review_visible: bool,
    /// The last `n` shown stimuli, oldest first; only filled while the review is visible
    pub review: ArrayVec<Stimulus, MAX_N_LEVEL>,
    pub episode_id: u32,
}

impl GameSnapshot {
    pub fn clear(&mut self) {
        self.current = None;
        self.score = 0;
        self.turn = 0;
        self.total_turns = 0;
        self.n_level = 0;
        self.streak = 0;
        self.max_streak = 0;
        self.incorrect_presses = 0;
        self.last_result = None;
        self.responded = false;
        self.started = false;
        self.paused = false;
        self.game_over = false;
        self.progress = 0.0;
        self.review_visible = false;
        self.review.clear();
        self.episode_id = 0;
    }

    /// Whether a response would currently be considered
    pub fn playable(&self) -> bool {
        self.started && !self.game_over && !self.paused && !self.responded
    }
}

impl Default for GameSnapshot {
    fn default() -> Self {
        Self {
            current: None,
            score: 0,
            turn: 0,
            total_turns: 0,
            n_level: 0,
            streak: 0,
            max_streak: 0,
            incorrect_presses: 0,
            last_result: None,
            responded: false,
            started: false,
            paused: false,
            game_over: false,
            progress: 0.0,
            review_visible: false,
            review: ArrayVec::new(),
            episode_id: 0,
        }
    }
}

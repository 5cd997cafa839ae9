//! Core game logic module - pure, deterministic, and testable
//!
//! This crate contains the n-back rules: sequence generation, the turn state
//! machine, scoring and streaks. It has no dependencies on terminals, files or
//! wall-clock time, making it:
//!
//! - **Deterministic**: randomness comes from an injected [`RandomSource`], so the
//!   same seed produces the same session
//! - **Testable**: time comes from an injected [`Scheduler`]; tests advance a
//!   [`VirtualClock`] by exact milliseconds
//! - **Portable**: runs the same in the terminal host and headless simulations
//!
//! # Module Structure
//!
//! - [`pool`]: built-in stimuli and stimulus filtering
//! - [`sequence`]: balanced n-back sequence generation
//! - [`game_state`]: the turn state machine
//! - [`scoring`]: points, penalties, combos and the turn log
//! - [`scheduler`]: timer abstraction and the virtual clock
//! - [`rng`]: random sources
//! - [`snapshot`]: read model for hosts
//!
//! # Example
//!
//! ```
//! use nback_core::{default_pool, GameState};
//! use nback_types::{GameSettings, StimulusFilter};
//!
//! let settings = GameSettings {
//!     n_level: 1,
//!     stimulus: StimulusFilter::Any,
//!     game_length: 10,
//!     speed_ms: 1000,
//!     ..GameSettings::default()
//! };
//! let mut game = GameState::new(settings, &default_pool(), 12345).unwrap();
//! game.start();
//!
//! // The first turn has nothing to compare against yet.
//! assert!(!game.respond(true));
//!
//! // Let every turn run out.
//! game.tick(60_000);
//! assert!(game.game_over());
//! assert!(game.stats().unwrap().completed);
//! ```

pub mod game_state;
pub mod pool;
pub mod rng;
pub mod scheduler;
pub mod scoring;
pub mod sequence;
pub mod snapshot;

pub use nback_types as types;

// Re-export commonly used types for convenience
pub use game_state::{GameState, SessionError};
pub use pool::default_pool;
pub use rng::{RandomSource, ScriptedRng, SimpleRng};
pub use scheduler::{Scheduler, TimerHandle, TimerKind, VirtualClock};
pub use scoring::{calculate_match_score, penalty_points, ScoreResult, Scoreboard};
pub use sequence::{generate, Sequence, Slot};
pub use snapshot::GameSnapshot;

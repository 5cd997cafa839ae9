//! Terminal input module.
//!
//! Maps `crossterm` key events into [`crate::types::GameAction`]. Independent of
//! the session itself; the host decides what to do with the action.

pub mod map;

pub use nback_types as types;

pub use map::{handle_key_event, should_quit};

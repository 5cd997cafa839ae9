//! N-back trainer (workspace facade crate).
//!
//! Re-exports the workspace crates under one name and adds the host-side pieces
//! shared by the binaries: environment configuration, logging setup and the JSON
//! player profile.

pub use nback_core as core;
pub use nback_engine as engine;
pub use nback_input as input;
pub use nback_types as types;

pub mod config;
pub mod logging;
pub mod profile;

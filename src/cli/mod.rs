//! Command-line interface for scrobble-sync.
//!
//! Commands to run a sync, inspect sync state and stored genres, and
//! reset the local database.

mod commands;

pub use commands::{Cli, Commands, run_command};

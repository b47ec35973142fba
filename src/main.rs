//! Scrobble Sync - incremental listening-history sync.
//!
//! Pulls new scrobbles from a Maloja server, enriches artists with genres
//! and tracks with durations from Spotify, and stores everything in a
//! local SQLite database, remembering how far each source has been synced.

pub mod cli;
pub mod config;
pub mod db;
pub mod enrichment;
pub mod error;
pub mod model;
pub mod source;
pub mod sync;
#[cfg(test)]
pub mod test_utils;

use clap::{CommandFactory, Parser};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let args = cli::Cli::parse();

    // Initialize logging (stderr, so command output stays clean)
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env().add_directive("scrobble_sync=info".parse()?))
        .init();

    if !cli::run_command(&args)? {
        cli::Cli::command().print_help()?;
    }
    Ok(())
}

//! CLI command definitions and dispatch.
//!
//! Each subcommand is implemented in its own submodule:
//! - `sync`: Run one incremental sync from the upstream server
//! - `status`: Cursor, recent sync history and entity counts
//! - `genres`: Stored genres for an artist or album
//! - `reset`: Delete and recreate the local database
//! - `config`: Show or initialise the config file

mod config;
mod genres;
mod reset;
mod status;
mod sync;

use anyhow::Context;
use clap::{Parser, Subcommand};
use sqlx::sqlite::SqlitePool;
use std::path::PathBuf;
use tokio::runtime::Runtime;

use crate::db;
use crate::sync::DurationPolicy;

pub use config::cmd_config;
pub use genres::cmd_genres;
pub use reset::cmd_reset;
pub use status::cmd_status;
pub use sync::cmd_sync;

/// Scrobble Sync CLI
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// SQLite database file
    #[arg(long, global = true, env = "SCROBBLE_SYNC_DB")]
    pub db: Option<PathBuf>,

    /// Maloja server URL, e.g. http://localhost:42010
    #[arg(long, global = true, env = "MALOJA_URL")]
    pub maloja_url: Option<String>,

    /// Spotify application client ID
    #[arg(long, global = true, env = "SPOTIFY_CLIENT_ID", hide_env_values = true)]
    pub spotify_client_id: Option<String>,

    /// Spotify application client secret
    #[arg(long, global = true, env = "SPOTIFY_CLIENT_SECRET", hide_env_values = true)]
    pub spotify_client_secret: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands
#[derive(Subcommand)]
pub enum Commands {
    /// Fetch new scrobbles and store them locally
    Sync,
    /// Show sync cursor, recent runs and library counts
    Status {
        /// Number of recent sync runs to show
        #[arg(long, default_value = "5")]
        limit: u32,
    },
    /// Show stored genres for an artist or album
    Genres {
        /// Artist name
        #[arg(long, conflicts_with = "album", required_unless_present = "album")]
        artist: Option<String>,
        /// Album title
        #[arg(long)]
        album: Option<String>,
    },
    /// Delete all local data and start over
    Reset {
        /// Confirm deletion
        #[arg(long)]
        yes: bool,
    },
    /// Show the effective configuration
    Config {
        /// Write a default config file if none exists
        #[arg(long)]
        init: bool,
    },
}

/// Effective settings: config file values overridden by CLI flags/env.
#[derive(Debug, Clone)]
pub struct Settings {
    pub db_path: Option<PathBuf>,
    pub maloja_url: Option<String>,
    pub source_name: String,
    pub spotify_client_id: Option<String>,
    pub spotify_client_secret: Option<String>,
    pub duration_policy: DurationPolicy,
}

impl Settings {
    pub fn resolve(cli: &Cli, config: &crate::config::Config) -> Self {
        Self {
            db_path: cli.db.clone().or_else(|| config.database.path.clone()),
            maloja_url: cli
                .maloja_url
                .clone()
                .or_else(|| config.source.maloja_url.clone()),
            source_name: config.source.name.clone(),
            spotify_client_id: cli
                .spotify_client_id
                .clone()
                .or_else(|| config.credentials.spotify_client_id.clone()),
            spotify_client_secret: cli
                .spotify_client_secret
                .clone()
                .or_else(|| config.credentials.spotify_client_secret.clone()),
            duration_policy: DurationPolicy::from(&config.sync),
        }
    }

    pub fn db_url(&self) -> String {
        db::db_url(self.db_path.as_deref())
    }
}

/// Open (and migrate) the configured database.
async fn open_db(settings: &Settings) -> anyhow::Result<SqlitePool> {
    let url = settings.db_url();
    db::init_db(&url)
        .await
        .with_context(|| format!("Failed to open database {}", url))
}

/// Epoch seconds as RFC 3339, or the raw number if out of range
fn fmt_timestamp(ts: i64) -> String {
    match chrono::DateTime::from_timestamp(ts, 0) {
        Some(dt) => dt.to_rfc3339(),
        None => ts.to_string(),
    }
}

/// Run the specified CLI command.
///
/// Returns `Ok(true)` if a command was run, `Ok(false)` if no command was specified.
pub fn run_command(cli: &Cli) -> anyhow::Result<bool> {
    let Some(command) = &cli.command else {
        return Ok(false);
    };

    let settings = Settings::resolve(cli, &crate::config::load());
    let rt = Runtime::new()?;

    match command {
        Commands::Sync => cmd_sync(&rt, &settings)?,
        Commands::Status { limit } => cmd_status(&rt, &settings, *limit)?,
        Commands::Genres { artist, album } => {
            cmd_genres(&rt, &settings, artist.as_deref(), album.as_deref())?
        }
        Commands::Reset { yes } => cmd_reset(&rt, &settings, *yes)?,
        Commands::Config { init } => cmd_config(&settings, *init)?,
    }
    Ok(true)
}

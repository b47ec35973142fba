//! Config file command.

use super::Settings;
use crate::config;

/// Show where the config lives and the effective settings; optionally
/// write a default file.
pub fn cmd_config(settings: &Settings, init: bool) -> anyhow::Result<()> {
    let path = config::config_path();

    if init {
        match &path {
            Some(p) if p.exists() => println!("Config already exists at {}", p.display()),
            Some(p) => {
                config::save(&config::Config::default())?;
                println!("Wrote default config to {}", p.display());
            }
            None => anyhow::bail!("Could not determine config directory"),
        }
    }

    match &path {
        Some(p) => println!("Config file: {}", p.display()),
        None => println!("Config file: (no config directory)"),
    }
    println!("Database:    {}", settings.db_url());
    println!("Source:      {}", settings.source_name);
    println!(
        "Maloja URL:  {}",
        settings.maloja_url.as_deref().unwrap_or("(not set)")
    );
    println!(
        "Spotify:     {}",
        if settings.spotify_client_id.is_some() && settings.spotify_client_secret.is_some() {
            "configured"
        } else {
            "not configured"
        }
    );
    println!("Durations:   {:?}", settings.duration_policy);
    Ok(())
}

//! Database reset command.

use anyhow::Context;
use tokio::runtime::Runtime;

use super::Settings;
use crate::db;

/// Delete the local database (entities and sync log) and recreate it empty
pub fn cmd_reset(rt: &Runtime, settings: &Settings, yes: bool) -> anyhow::Result<()> {
    let url = settings.db_url();
    if !yes {
        anyhow::bail!("This deletes all data in {}. Re-run with --yes to confirm.", url);
    }

    rt.block_on(async {
        let pool = db::reset_db(&url)
            .await
            .with_context(|| format!("Failed to reset database {}", url))?;
        pool.close().await;
        tracing::info!(database = %url, "Database reset");
        println!("Reset {}; the next sync starts from the beginning.", url);
        Ok(())
    })
}

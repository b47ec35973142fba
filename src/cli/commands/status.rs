//! Sync status command.

use tokio::runtime::Runtime;

use super::{Settings, fmt_timestamp, open_db};
use crate::db;
use crate::source::MalojaClient;
use crate::sync::cursor;

/// Show cursor, recent sync runs, local counts and the upstream total
pub fn cmd_status(rt: &Runtime, settings: &Settings, limit: u32) -> anyhow::Result<()> {
    rt.block_on(async {
        let pool = open_db(settings).await?;
        let source = &settings.source_name;

        let mut conn = pool.acquire().await?;
        let current = cursor::get_cursor(&mut conn, source).await?;
        let history = cursor::recent_syncs(&mut conn, source, limit).await?;
        drop(conn);
        let stats = db::library_stats(&pool).await?;

        println!("Source: {}", source);
        println!("Database: {}", settings.db_url());
        if current == 0 {
            println!("Cursor: never synced");
        } else {
            println!("Cursor: {} ({})", fmt_timestamp(current), current);
        }
        println!();

        println!("Library");
        println!("=======");
        println!("Artists:   {}", stats.artists);
        println!("Albums:    {}", stats.albums);
        println!("Tracks:    {}", stats.tracks);
        println!("Scrobbles: {}", stats.scrobbles);

        if let Some(url) = settings.maloja_url.as_deref() {
            let client = MalojaClient::new(url)?.with_name(source);
            match client.scrobble_count().await {
                Ok(total) => println!("Upstream:  {}", total),
                Err(e) => println!("Upstream:  unavailable ({})", e),
            }
        }

        if !history.is_empty() {
            println!();
            println!("Recent syncs");
            println!("============");
            for entry in &history {
                println!(
                    "  {}  {:>6} new  up to {}",
                    entry.sync_date,
                    entry.records_synced,
                    fmt_timestamp(entry.last_synced_at)
                );
            }
        }
        Ok(())
    })
}

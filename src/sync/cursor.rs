//! Per-source sync cursor backed by the append-only `sync_log` table.
//!
//! The cursor for a source is the largest `last_synced_at` ever logged for
//! it, or 0 when nothing has been logged. Advancing appends a row; rows are
//! never updated or deleted, so the log doubles as sync history.

use chrono::Utc;
use sqlx::SqliteConnection;

use crate::error::{Error, Result};
use crate::model::SyncLogEntry;

/// Current high-water mark for `source` (0 if never synced).
pub async fn get_cursor(conn: &mut SqliteConnection, source: &str) -> Result<i64> {
    let (cursor,): (Option<i64>,) =
        sqlx::query_as("SELECT MAX(last_synced_at) FROM sync_log WHERE source = ?")
            .bind(source)
            .fetch_one(&mut *conn)
            .await?;
    Ok(cursor.unwrap_or(0))
}

/// Record a completed sync that reached `timestamp`.
///
/// Fails with [`Error::CursorRegression`] if `timestamp` is below the
/// current cursor. An equal timestamp is accepted and simply logged.
pub async fn advance_cursor(
    conn: &mut SqliteConnection,
    source: &str,
    timestamp: i64,
    records_synced: u64,
) -> Result<()> {
    let current = get_cursor(conn, source).await?;
    if timestamp < current {
        return Err(Error::CursorRegression {
            name: source.to_string(),
            current,
            requested: timestamp,
        });
    }

    sqlx::query(
        "INSERT INTO sync_log (source, sync_date, last_synced_at, records_synced) VALUES (?, ?, ?, ?)",
    )
    .bind(source)
    .bind(Utc::now().to_rfc3339())
    .bind(timestamp)
    .bind(i64::try_from(records_synced).unwrap_or(i64::MAX))
    .execute(&mut *conn)
    .await?;

    tracing::debug!(source, cursor = timestamp, records_synced, "Advanced sync cursor");
    Ok(())
}

/// Most recent sync log rows for `source`, newest first.
pub async fn recent_syncs(
    conn: &mut SqliteConnection,
    source: &str,
    limit: u32,
) -> Result<Vec<SyncLogEntry>> {
    let rows = sqlx::query_as::<_, SyncLogEntry>(
        r#"
        SELECT id, source, sync_date, last_synced_at, records_synced
        FROM sync_log
        WHERE source = ?
        ORDER BY id DESC
        LIMIT ?
        "#,
    )
    .bind(source)
    .bind(i64::from(limit))
    .fetch_all(&mut *conn)
    .await?;
    Ok(rows)
}

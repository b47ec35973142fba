//! Test utilities and fixtures for scrobble-sync tests.
//!
//! Common helpers for databases, genre sets and upstream records.
//!
//! # Example
//!
//! ```ignore
//! use crate::test_utils::{temp_db, scrobble};
//!
//! #[tokio::test]
//! async fn test_something() {
//!     let (pool, _dir) = temp_db().await;
//!     let raw = scrobble(1_700_000_000, "Song", "Band Y");
//!     // ... test logic
//! }
//! ```

use std::sync::Arc;

use sqlx::sqlite::SqlitePool;
use tempfile::TempDir;

use crate::enrichment::MetadataResolver;
use crate::enrichment::traits::mocks::MockCatalog;
use crate::model::Genres;
use crate::source::RawScrobble;

/// Creates a temporary database for testing.
///
/// The database lives in a temporary directory that is removed when the
/// returned `TempDir` is dropped. Keep it alive for the duration of the test.
pub async fn temp_db() -> (SqlitePool, TempDir) {
    let dir = tempfile::tempdir().expect("Failed to create temp directory");
    let db_path = dir.path().join("test.db");
    let db_url = format!("sqlite:{}", db_path.display());

    let pool = crate::db::init_db(&db_url)
        .await
        .expect("Failed to initialize test database");

    (pool, dir)
}

/// Build a genre set from string slices.
pub fn genres(tags: &[&str]) -> Genres {
    tags.iter().map(|t| t.to_string()).collect()
}

/// A resolver backed by the given mock catalog, plus a handle to inspect it.
pub fn mock_resolver(catalog: MockCatalog) -> (MetadataResolver, Arc<MockCatalog>) {
    let catalog = Arc::new(catalog);
    (MetadataResolver::new(catalog.clone()), catalog)
}

/// A single-artist upstream record with no album.
pub fn scrobble(time: i64, title: &str, artist: &str) -> RawScrobble {
    RawScrobble::new(time, title, None, &[artist])
}

/// A single-artist upstream record on an album.
pub fn album_scrobble(time: i64, title: &str, album: &str, artist: &str) -> RawScrobble {
    RawScrobble::new(time, title, Some(album), &[artist])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_temp_db_creates_working_database() {
        let (pool, _dir) = temp_db().await;

        let stats = crate::db::library_stats(&pool).await.unwrap();
        assert_eq!(stats.scrobbles, 0);
    }

    #[test]
    fn test_genres_helper() {
        let set = genres(&["rock", "indie", "rock"]);
        assert_eq!(set.len(), 2);
        assert!(set.contains("indie"));
    }

    #[test]
    fn test_scrobble_helpers() {
        let raw = album_scrobble(10, "Song", "Album X", "Band Y");
        assert_eq!(raw.time, Some(10));
        assert_eq!(raw.album.as_deref(), Some("Album X"));
        assert_eq!(raw.artists, vec!["Band Y".to_string()]);

        assert!(scrobble(10, "Song", "Band Y").album.is_none());
    }
}

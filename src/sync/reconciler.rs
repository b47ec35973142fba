//! Entity reconciler - maps one upstream record onto local entities
//!
//! A record goes through two phases:
//! 1. [`Reconciler::prepare`]: validate the record, look up what already
//!    exists, and ask the resolver for whatever is missing (genres of new
//!    artists, duration of a new track). Only reads, and meant to run on a
//!    plain autocommit connection: inside a transaction the first lookup
//!    would pin a read snapshot for as long as the network calls take, and
//!    the later write could fail with `SQLITE_BUSY_SNAPSHOT`.
//! 2. [`Reconciler::apply`]: inside the caller's transaction, create missing
//!    artists, album, track and scrobble, link artists, and recompute the
//!    album's genre set. Every create is insert-first, so rows that appeared
//!    since `prepare` are picked up instead of duplicated.
//!
//! An existing scrobble makes the record a no-op ([`Reconciled::AlreadySynced`]).

use std::fmt;

use sqlx::SqliteConnection;

use crate::config::{SyncConfig, UnresolvedDuration};
use crate::db;
use crate::enrichment::{MetadataResolver, normalize_track_name};
use crate::model::{Album, Artist, Genres, Scrobble, Track};
use crate::source::RawScrobble;

/// How to handle a new track whose length nobody knows
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DurationPolicy {
    /// Reject the record with [`ReconcileError::UnresolvedDuration`]
    #[default]
    Skip,
    /// Store the track with this many seconds
    Placeholder(u32),
}

impl From<&SyncConfig> for DurationPolicy {
    fn from(config: &SyncConfig) -> Self {
        match config.unresolved_duration {
            UnresolvedDuration::Skip => Self::Skip,
            UnresolvedDuration::Placeholder => Self::Placeholder(config.placeholder_secs.max(1)),
        }
    }
}

/// Outcome of a successful reconciliation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reconciled {
    /// A new scrobble was stored
    Created(Scrobble),
    /// The scrobble already existed; nothing about it changed
    AlreadySynced(Scrobble),
}

impl Reconciled {
    pub fn scrobble(&self) -> &Scrobble {
        match self {
            Self::Created(s) | Self::AlreadySynced(s) => s,
        }
    }

    pub fn is_created(&self) -> bool {
        matches!(self, Self::Created(_))
    }
}

/// Per-record failures. None of these abort a sync run.
#[derive(Debug, thiserror::Error)]
pub enum ReconcileError {
    #[error("Malformed record: missing {field}")]
    Malformed { field: &'static str },

    /// A unique constraint fired on a statement that does not absorb
    /// conflicts. The `db` insert helpers all use `ON CONFLICT DO NOTHING`,
    /// so this only surfaces from constraints they do not cover.
    #[error("Duplicate key: {0}")]
    DuplicateKey(String),

    #[error("No duration available for new track {track:?}")]
    UnresolvedDuration { track: String },

    #[error("Persistence error: {0}")]
    Persistence(sqlx::Error),
}

/// Failure category, for per-reason counts in a sync report
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FailureKind {
    Malformed,
    DuplicateKey,
    UnresolvedDuration,
    Persistence,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Malformed => "malformed",
            Self::DuplicateKey => "duplicate key",
            Self::UnresolvedDuration => "unresolved duration",
            Self::Persistence => "persistence",
        })
    }
}

impl ReconcileError {
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::Malformed { .. } => FailureKind::Malformed,
            Self::DuplicateKey(_) => FailureKind::DuplicateKey,
            Self::UnresolvedDuration { .. } => FailureKind::UnresolvedDuration,
            Self::Persistence(_) => FailureKind::Persistence,
        }
    }
}

impl From<sqlx::Error> for ReconcileError {
    fn from(e: sqlx::Error) -> Self {
        match e {
            sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
                Self::DuplicateKey(db_err.message().to_string())
            }
            other => Self::Persistence(other),
        }
    }
}

/// Validated view of a [`RawScrobble`]
#[derive(Debug)]
struct Record<'a> {
    timestamp: i64,
    title: &'a str,
    track_name: String,
    length: Option<u32>,
    album: Option<&'a str>,
    primary_artist: &'a str,
    /// Credited on the track
    track_artists: Vec<&'a str>,
    /// Credited on the album (track artists plus album artists)
    album_artists: Vec<&'a str>,
}

impl<'a> Record<'a> {
    fn parse(raw: &'a RawScrobble) -> Result<Self, ReconcileError> {
        let timestamp = raw.time.ok_or(ReconcileError::Malformed { field: "timestamp" })?;
        let title = raw
            .title
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or(ReconcileError::Malformed { field: "title" })?;

        let credited_album_artists = dedup_names(&raw.album_artists);
        let mut track_artists = dedup_names(&raw.artists);
        if track_artists.is_empty() {
            track_artists = credited_album_artists.clone();
        }
        let primary_artist = credited_album_artists
            .first()
            .or(track_artists.first())
            .copied()
            .unwrap_or("");

        let mut album_artists = credited_album_artists;
        for &name in &track_artists {
            if !album_artists.contains(&name) {
                album_artists.push(name);
            }
        }

        Ok(Self {
            timestamp,
            title,
            track_name: normalize_track_name(title),
            length: raw.length.filter(|&secs| secs > 0),
            album: raw.album.as_deref().map(str::trim).filter(|a| !a.is_empty()),
            primary_artist,
            track_artists,
            album_artists,
        })
    }
}

/// Trimmed, non-blank names in first-seen order
fn dedup_names(names: &[String]) -> Vec<&str> {
    let mut out: Vec<&str> = Vec::with_capacity(names.len());
    for name in names.iter().map(|n| n.trim()).filter(|n| !n.is_empty()) {
        if !out.contains(&name) {
            out.push(name);
        }
    }
    out
}

/// An artist as seen during the read phase
enum PendingArtist<'a> {
    Existing(Artist),
    New { name: &'a str, genres: Genres },
}

/// A track as seen during the read phase
enum PendingTrack {
    Existing(Track),
    New { length: u32 },
}

/// A validated record with its lookups and metadata resolved, ready for
/// [`Reconciler::apply`]
pub struct Prepared<'a> {
    record: Record<'a>,
    artists: Vec<PendingArtist<'a>>,
    track: PendingTrack,
}

/// Maps upstream records onto artists, albums, tracks and scrobbles
#[derive(Clone)]
pub struct Reconciler {
    resolver: MetadataResolver,
    policy: DurationPolicy,
}

impl Reconciler {
    pub fn new(resolver: MetadataResolver, policy: DurationPolicy) -> Self {
        Self { resolver, policy }
    }

    /// Reconcile one record on `conn`: [`prepare`](Self::prepare) then
    /// [`apply`](Self::apply) on the same connection.
    pub async fn reconcile(
        &self,
        conn: &mut SqliteConnection,
        raw: &RawScrobble,
    ) -> Result<Reconciled, ReconcileError> {
        let prepared = self.prepare(conn, raw).await?;
        self.apply(conn, prepared).await
    }

    /// Read phase: validate `raw`, look up existing entities and resolve
    /// metadata for the missing ones. Writes nothing.
    pub async fn prepare<'a>(
        &self,
        conn: &mut SqliteConnection,
        raw: &'a RawScrobble,
    ) -> Result<Prepared<'a>, ReconcileError> {
        let record = Record::parse(raw)?;

        let mut pending = Vec::with_capacity(record.album_artists.len());
        for &name in &record.album_artists {
            match db::find_artist(conn, name).await? {
                Some(artist) => pending.push(PendingArtist::Existing(artist)),
                None => {
                    let genres = self.resolver.resolve_artist_genres(name).await;
                    pending.push(PendingArtist::New { name, genres });
                }
            }
        }

        let existing_album = match record.album {
            Some(title) => db::find_album(conn, title, record.primary_artist).await?,
            None => None,
        };

        // A track on an album that does not exist yet cannot exist either
        let existing_track = match (record.album, &existing_album) {
            (Some(_), None) => None,
            (_, album) => db::find_track(conn, &record.track_name, album.as_ref().map(|a| a.id)).await?,
        };

        let track = match existing_track {
            Some(track) => PendingTrack::Existing(track),
            None => PendingTrack::New {
                length: self.track_length(&record).await?,
            },
        };

        Ok(Prepared {
            record,
            artists: pending,
            track,
        })
    }

    /// Write phase for a prepared record.
    ///
    /// The caller owns the transaction: on error nothing written here should
    /// be committed.
    pub async fn apply(
        &self,
        conn: &mut SqliteConnection,
        prepared: Prepared<'_>,
    ) -> Result<Reconciled, ReconcileError> {
        let Prepared {
            record,
            artists: pending,
            track: pending_track,
        } = prepared;

        let mut artists = Vec::with_capacity(pending.len());
        for p in pending {
            artists.push(self.store_artist(conn, p).await?);
        }

        let album = match record.album {
            Some(title) => Some(self.store_album(conn, title, &record, &artists).await?),
            None => None,
        };
        let album_id = album.as_ref().map(|a| a.id);

        let track = match pending_track {
            PendingTrack::Existing(track) => track,
            PendingTrack::New { length } => {
                self.store_track(conn, &record.track_name, album_id, length).await?
            }
        };

        for artist in artists
            .iter()
            .filter(|a| record.track_artists.contains(&a.name.as_str()))
        {
            db::link_track_artist(conn, track.id, artist.id).await?;
        }

        let outcome = match db::insert_scrobble(conn, record.timestamp, track.id).await? {
            Some(scrobble) => Reconciled::Created(scrobble),
            None => {
                let existing = db::find_scrobble(conn, record.timestamp, track.id)
                    .await?
                    .ok_or(sqlx::Error::RowNotFound)?;
                Reconciled::AlreadySynced(existing)
            }
        };

        tracing::debug!(
            timestamp = record.timestamp,
            track = %record.track_name,
            album = record.album.unwrap_or(""),
            created = outcome.is_created(),
            "Reconciled record"
        );
        Ok(outcome)
    }

    /// Length for a track about to be created: upstream value, then the
    /// catalog, then the policy.
    async fn track_length(&self, record: &Record<'_>) -> Result<u32, ReconcileError> {
        if let Some(secs) = record.length {
            return Ok(secs);
        }

        let artist = record.track_artists.first().copied();
        if let Some(secs) = self.resolver.resolve_track_duration(record.title, artist).await {
            return Ok(secs);
        }

        match self.policy {
            DurationPolicy::Placeholder(secs) => {
                tracing::debug!(track = %record.track_name, secs, "Using placeholder duration");
                Ok(secs.max(1))
            }
            DurationPolicy::Skip => Err(ReconcileError::UnresolvedDuration {
                track: record.track_name.clone(),
            }),
        }
    }

    async fn store_artist(
        &self,
        conn: &mut SqliteConnection,
        pending: PendingArtist<'_>,
    ) -> Result<Artist, ReconcileError> {
        match pending {
            PendingArtist::Existing(artist) => Ok(artist),
            PendingArtist::New { name, genres } => {
                if let Some(artist) = db::insert_artist(conn, name, &genres).await? {
                    tracing::debug!(artist = name, genres = genres.len(), "Created artist");
                    return Ok(artist);
                }
                // Someone else created it between our read and write
                Ok(db::find_artist(conn, name)
                    .await?
                    .ok_or(sqlx::Error::RowNotFound)?)
            }
        }
    }

    /// Get or create the album, link its artists and widen its genre set
    /// to cover every linked artist.
    async fn store_album(
        &self,
        conn: &mut SqliteConnection,
        title: &str,
        record: &Record<'_>,
        artists: &[Artist],
    ) -> Result<Album, ReconcileError> {
        let mut album = db::get_or_create_album(conn, title, record.primary_artist).await?;

        for artist in artists {
            db::link_album_artist(conn, album.id, artist.id).await?;
        }

        let mut genres = album.genres.clone();
        for linked in db::album_artist_genres(conn, album.id).await? {
            genres.extend(linked);
        }
        if genres != album.genres {
            db::set_album_genres(conn, album.id, &genres).await?;
            album.genres = genres;
        }
        Ok(album)
    }

    async fn store_track(
        &self,
        conn: &mut SqliteConnection,
        name: &str,
        album_id: Option<i64>,
        length: u32,
    ) -> Result<Track, ReconcileError> {
        if let Some(track) = db::insert_track(conn, name, album_id, length).await? {
            return Ok(track);
        }
        Ok(db::find_track(conn, name, album_id)
            .await?
            .ok_or(sqlx::Error::RowNotFound)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enrichment::traits::mocks::{CatalogQuery, MockCatalog};
    use crate::enrichment::EnrichmentError;
    use crate::test_utils::{album_scrobble, genres, mock_resolver, scrobble, temp_db};

    fn reconciler(catalog: MockCatalog, policy: DurationPolicy) -> (Reconciler, std::sync::Arc<MockCatalog>) {
        let (resolver, handle) = mock_resolver(catalog);
        (Reconciler::new(resolver, policy), handle)
    }

    #[tokio::test]
    async fn test_live_suffix_scenario() {
        let (pool, _dir) = temp_db().await;
        let mut conn = pool.acquire().await.unwrap();
        let (reconciler, catalog) = reconciler(
            MockCatalog::empty().artist("Band Y", &["rock"]).track("Song", 215),
            DurationPolicy::Skip,
        );

        let raw = album_scrobble(1_700_000_000, "Song (Live)", "Album X", "Band Y");
        let outcome = reconciler.reconcile(&mut conn, &raw).await.unwrap();

        assert!(outcome.is_created());
        assert_eq!(outcome.scrobble().timestamp, 1_700_000_000);
        assert!(catalog.queries().contains(&CatalogQuery::Track {
            name: "Song".to_string(),
            artist: Some("Band Y".to_string()),
        }));

        let artist = db::find_artist(&mut conn, "Band Y").await.unwrap().unwrap();
        assert_eq!(artist.genres, genres(&["rock"]));

        let album = db::find_album(&mut conn, "Album X", "Band Y").await.unwrap().unwrap();
        assert_eq!(album.genres, genres(&["rock"]));

        let track = db::find_track(&mut conn, "Song", Some(album.id)).await.unwrap().unwrap();
        assert_eq!(track.length, 215);
        assert_eq!(outcome.scrobble().track_id, track.id);

        let credited = db::track_artist_names(&pool, track.id).await.unwrap();
        assert_eq!(credited, vec!["Band Y".to_string()]);
    }

    #[tokio::test]
    async fn test_second_pass_is_noop() {
        let (pool, _dir) = temp_db().await;
        let mut conn = pool.acquire().await.unwrap();
        let (reconciler, catalog) = reconciler(
            MockCatalog::empty().artist("Band Y", &["rock"]).track("Song", 215),
            DurationPolicy::Skip,
        );

        let raw = album_scrobble(1_700_000_000, "Song (Live)", "Album X", "Band Y");
        let first = reconciler.reconcile(&mut conn, &raw).await.unwrap();
        let queries_after_first = catalog.queries().len();
        let second = reconciler.reconcile(&mut conn, &raw).await.unwrap();

        assert_eq!(second, Reconciled::AlreadySynced(first.scrobble().clone()));
        assert_eq!(catalog.queries().len(), queries_after_first, "no lookups for known entities");

        let stats = db::library_stats(&pool).await.unwrap();
        assert_eq!((stats.artists, stats.albums, stats.tracks, stats.scrobbles), (1, 1, 1, 1));
    }

    #[tokio::test]
    async fn test_upstream_length_skips_catalog() {
        let (pool, _dir) = temp_db().await;
        let mut conn = pool.acquire().await.unwrap();
        let (reconciler, catalog) = reconciler(MockCatalog::empty(), DurationPolicy::Skip);

        let raw = scrobble(100, "Intro", "Band Y").with_length(42);
        reconciler.reconcile(&mut conn, &raw).await.unwrap();

        assert!(
            !catalog
                .queries()
                .iter()
                .any(|q| matches!(q, CatalogQuery::Track { .. }))
        );
        let track = db::find_track(&mut conn, "Intro", None).await.unwrap().unwrap();
        assert_eq!(track.length, 42);
    }

    #[tokio::test]
    async fn test_album_genres_cover_all_artists() {
        let (pool, _dir) = temp_db().await;
        let mut conn = pool.acquire().await.unwrap();
        let (reconciler, _) = reconciler(
            MockCatalog::empty()
                .artist("Band Y", &["rock"])
                .artist("Guest Z", &["jazz", "soul"]),
            DurationPolicy::Placeholder(1),
        );

        reconciler
            .reconcile(&mut conn, &album_scrobble(1, "One", "Album X", "Band Y"))
            .await
            .unwrap();
        let duet = RawScrobble::new(2, "Two", Some("Album X"), &["Band Y", "Guest Z"]);
        reconciler.reconcile(&mut conn, &duet).await.unwrap();

        let album = db::find_album(&mut conn, "Album X", "Band Y").await.unwrap().unwrap();
        assert_eq!(album.genres, genres(&["jazz", "rock", "soul"]));
        for linked in db::album_artist_genres(&mut conn, album.id).await.unwrap() {
            assert!(linked.is_subset(&album.genres));
        }
    }

    #[tokio::test]
    async fn test_artist_resolved_once() {
        let (pool, _dir) = temp_db().await;
        let mut conn = pool.acquire().await.unwrap();
        let (reconciler, catalog) = reconciler(
            MockCatalog::empty().artist("Band Y", &["rock"]),
            DurationPolicy::Placeholder(1),
        );

        let repeated = RawScrobble::new(1, "One", None, &["Band Y", " Band Y ", "Band Y"]);
        reconciler.reconcile(&mut conn, &repeated).await.unwrap();
        reconciler
            .reconcile(&mut conn, &scrobble(2, "Two", "Band Y"))
            .await
            .unwrap();

        assert_eq!(catalog.artist_queries(), 1);
        assert_eq!(db::library_stats(&pool).await.unwrap().artists, 1);
    }

    #[tokio::test]
    async fn test_same_title_different_artists_are_distinct_albums() {
        let (pool, _dir) = temp_db().await;
        let mut conn = pool.acquire().await.unwrap();
        let (reconciler, _) = reconciler(MockCatalog::empty(), DurationPolicy::Placeholder(1));

        reconciler
            .reconcile(&mut conn, &album_scrobble(1, "Song", "Greatest Hits", "Band Y"))
            .await
            .unwrap();
        reconciler
            .reconcile(&mut conn, &album_scrobble(2, "Song", "Greatest Hits", "Band Z"))
            .await
            .unwrap();

        let stats = db::library_stats(&pool).await.unwrap();
        assert_eq!(stats.albums, 2);
        assert_eq!(stats.tracks, 2);
    }

    #[tokio::test]
    async fn test_album_artist_is_primary() {
        let (pool, _dir) = temp_db().await;
        let mut conn = pool.acquire().await.unwrap();
        let (reconciler, _) = reconciler(MockCatalog::empty(), DurationPolicy::Placeholder(1));

        let mut raw = album_scrobble(1, "Track", "Compilation", "Band Y");
        raw.album_artists = vec!["Various Artists".to_string()];
        reconciler.reconcile(&mut conn, &raw).await.unwrap();

        assert!(
            db::find_album(&mut conn, "Compilation", "Various Artists")
                .await
                .unwrap()
                .is_some()
        );
    }

    #[tokio::test]
    async fn test_malformed_records() {
        let (pool, _dir) = temp_db().await;
        let mut conn = pool.acquire().await.unwrap();
        let (reconciler, catalog) = reconciler(MockCatalog::empty(), DurationPolicy::Placeholder(1));

        let no_time = RawScrobble {
            time: None,
            ..scrobble(0, "Song", "Band Y")
        };
        let blank_title = RawScrobble {
            title: Some("   ".to_string()),
            ..scrobble(1, "Song", "Band Y")
        };

        assert!(matches!(
            reconciler.reconcile(&mut conn, &no_time).await,
            Err(ReconcileError::Malformed { field: "timestamp" })
        ));
        assert!(matches!(
            reconciler.reconcile(&mut conn, &blank_title).await,
            Err(ReconcileError::Malformed { field: "title" })
        ));
        assert!(catalog.queries().is_empty());
        assert_eq!(db::library_stats(&pool).await.unwrap(), db::LibraryStats::default());
    }

    #[tokio::test]
    async fn test_unresolved_duration_skip_policy() {
        let (pool, _dir) = temp_db().await;
        let mut conn = pool.acquire().await.unwrap();
        let (reconciler, _) = reconciler(
            MockCatalog::with_error(EnrichmentError::RateLimited),
            DurationPolicy::Skip,
        );

        let result = reconciler
            .reconcile(&mut conn, &scrobble(1, "Mystery (Demo)", "Band Y"))
            .await;
        match result {
            Err(ReconcileError::UnresolvedDuration { track }) => assert_eq!(track, "Mystery"),
            other => panic!("expected UnresolvedDuration, got {:?}", other),
        }
        assert_eq!(db::library_stats(&pool).await.unwrap().tracks, 0);
    }

    #[tokio::test]
    async fn test_unresolved_duration_placeholder_policy() {
        let (pool, _dir) = temp_db().await;
        let mut conn = pool.acquire().await.unwrap();
        let (reconciler, _) = reconciler(MockCatalog::empty(), DurationPolicy::Placeholder(30));

        reconciler
            .reconcile(&mut conn, &scrobble(1, "Mystery", "Band Y"))
            .await
            .unwrap();

        let track = db::find_track(&mut conn, "Mystery", None).await.unwrap().unwrap();
        assert_eq!(track.length, 30);
    }

    #[tokio::test]
    async fn test_failed_record_writes_nothing() {
        let (pool, _dir) = temp_db().await;
        let (reconciler, _) = reconciler(MockCatalog::empty(), DurationPolicy::Skip);

        let mut tx = pool.begin().await.unwrap();
        let result = reconciler
            .reconcile(&mut tx, &album_scrobble(1, "Unknown", "Album X", "Band Y"))
            .await;
        assert!(result.is_err());
        tx.rollback().await.unwrap();

        assert_eq!(db::library_stats(&pool).await.unwrap(), db::LibraryStats::default());
    }

    #[tokio::test]
    async fn test_prepare_writes_nothing() {
        let (pool, _dir) = temp_db().await;
        let mut conn = pool.acquire().await.unwrap();
        let (reconciler, catalog) = reconciler(
            MockCatalog::empty().artist("Band Y", &["rock"]).track("Song", 200),
            DurationPolicy::Skip,
        );

        let raw = album_scrobble(10, "Song", "Album X", "Band Y");
        let _prepared = reconciler.prepare(&mut conn, &raw).await.unwrap();

        assert_eq!(catalog.artist_queries(), 1);
        assert_eq!(db::library_stats(&pool).await.unwrap(), db::LibraryStats::default());
    }

    #[tokio::test]
    async fn test_apply_picks_up_rows_created_after_prepare() {
        let (pool, _dir) = temp_db().await;
        let (reconciler, _) = reconciler(
            MockCatalog::empty().artist("Band Y", &["rock"]).track("Song", 200),
            DurationPolicy::Skip,
        );

        let raw = album_scrobble(10, "Song", "Album X", "Band Y");
        let mut reader = pool.acquire().await.unwrap();
        let prepared = reconciler.prepare(&mut reader, &raw).await.unwrap();

        // Another run stores the same entities before this one writes
        let mut other = pool.acquire().await.unwrap();
        let artist = db::insert_artist(&mut other, "Band Y", &genres(&["indie"]))
            .await
            .unwrap()
            .unwrap();
        let album = db::get_or_create_album(&mut other, "Album X", "Band Y").await.unwrap();
        db::insert_track(&mut other, "Song", Some(album.id), 180).await.unwrap();
        drop(other);

        let mut tx = pool.begin().await.unwrap();
        let outcome = reconciler.apply(&mut tx, prepared).await.unwrap();
        tx.commit().await.unwrap();

        assert!(outcome.is_created());
        let stats = db::library_stats(&pool).await.unwrap();
        assert_eq!((stats.artists, stats.albums, stats.tracks, stats.scrobbles), (1, 1, 1, 1));

        let stored = db::find_artist(&mut reader, "Band Y").await.unwrap().unwrap();
        assert_eq!(stored.id, artist.id);
        assert_eq!(stored.genres, genres(&["indie"]));
        let track = db::find_track(&mut reader, "Song", Some(album.id)).await.unwrap().unwrap();
        assert_eq!(track.length, 180);
    }

    #[tokio::test]
    async fn test_unique_violation_maps_to_duplicate_key() {
        let (pool, _dir) = temp_db().await;
        let mut conn = pool.acquire().await.unwrap();
        let insert = "INSERT INTO artists (name) VALUES ('Band Y')";

        sqlx::query(insert).execute(&mut *conn).await.unwrap();
        let err = sqlx::query(insert).execute(&mut *conn).await.unwrap_err();

        let err = ReconcileError::from(err);
        assert!(matches!(err, ReconcileError::DuplicateKey(_)));
        assert_eq!(err.kind(), FailureKind::DuplicateKey);
        assert!(matches!(
            ReconcileError::from(sqlx::Error::RowNotFound),
            ReconcileError::Persistence(_)
        ));
    }

    #[test]
    fn test_failure_kinds() {
        let malformed = ReconcileError::Malformed { field: "title" };
        let unresolved = ReconcileError::UnresolvedDuration {
            track: "Song".to_string(),
        };
        assert_eq!(malformed.kind(), FailureKind::Malformed);
        assert_eq!(unresolved.kind(), FailureKind::UnresolvedDuration);
        assert_eq!(FailureKind::UnresolvedDuration.to_string(), "unresolved duration");
    }

    #[test]
    fn test_policy_from_config() {
        let mut config = SyncConfig::default();
        assert_eq!(DurationPolicy::from(&config), DurationPolicy::Skip);

        config.unresolved_duration = UnresolvedDuration::Placeholder;
        config.placeholder_secs = 0;
        assert_eq!(DurationPolicy::from(&config), DurationPolicy::Placeholder(1));
    }

    #[test]
    fn test_dedup_names() {
        let names = vec![
            " A ".to_string(),
            "B".to_string(),
            "".to_string(),
            "A".to_string(),
        ];
        assert_eq!(dedup_names(&names), vec!["A", "B"]);
    }
}

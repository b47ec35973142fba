//! Database module for artist, album, track and scrobble persistence.
//!
//! Uses SQLx with SQLite for lightweight, embedded database storage.
//! Entity functions take a `&mut SqliteConnection` so callers decide the
//! transaction boundary; pass `&mut *tx` to run them inside a transaction.
//!
//! Creation is insert-first: every `insert_*` is an
//! `INSERT ... ON CONFLICT DO NOTHING RETURNING id` guarded by a unique
//! constraint, so a concurrent writer can never produce a duplicate row.
//!
//! # Example
//!
//! ```ignore
//! use scrobble_sync::db::{init_db, find_artist};
//!
//! let pool = init_db("sqlite:scrobbles.db").await?;
//! let mut conn = pool.acquire().await?;
//! let artist = find_artist(&mut conn, "Band Y").await?;
//! ```

use std::path::Path;

use sqlx::SqliteConnection;
use sqlx::migrate::MigrateDatabase;
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};

use crate::model::{Album, Artist, Genres, Scrobble, Track};

/// Default database filename.
pub const DEFAULT_DB_NAME: &str = "scrobbles.db";

/// Build a SQLite database URL from an optional path.
///
/// If no path is provided, uses [`DEFAULT_DB_NAME`] in the current directory.
pub fn db_url(path: Option<&Path>) -> String {
    match path {
        Some(p) => format!("sqlite:{}", p.display()),
        None => format!("sqlite:{}", DEFAULT_DB_NAME),
    }
}

/// Initialize the database connection pool and run migrations.
///
/// Creates the database file if it doesn't exist, establishes a connection
/// pool with up to 5 connections, and runs all pending migrations.
pub async fn init_db(db_url: &str) -> Result<SqlitePool, sqlx::Error> {
    if !sqlx::Sqlite::database_exists(db_url).await.unwrap_or(false) {
        sqlx::Sqlite::create_database(db_url).await?;
    }

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect(db_url)
        .await?;

    sqlx::migrate!("./migrations").run(&pool).await?;

    Ok(pool)
}

/// Delete the database and recreate an empty one.
///
/// Removes the database file together with its WAL/SHM side files.
pub async fn reset_db(db_url: &str) -> Result<SqlitePool, sqlx::Error> {
    if sqlx::Sqlite::database_exists(db_url).await.unwrap_or(false) {
        sqlx::Sqlite::drop_database(db_url).await?;
    }
    if let Some(path) = db_url.strip_prefix("sqlite:") {
        for suffix in ["-wal", "-shm"] {
            let side = format!("{}{}", path, suffix);
            if Path::new(&side).exists() {
                std::fs::remove_file(&side)?;
            }
        }
    }
    init_db(db_url).await
}

// ============================================================================
// Genre encoding
// ============================================================================

/// Encode a genre set as a JSON array.
pub fn encode_genres(genres: &Genres) -> String {
    serde_json::to_string(genres).unwrap_or_else(|_| "[]".to_string())
}

/// Decode a JSON genre array; malformed values decode as empty.
pub fn decode_genres(raw: &str) -> Genres {
    serde_json::from_str(raw).unwrap_or_else(|e| {
        tracing::warn!(value = raw, error = %e, "Ignoring malformed genre column");
        Genres::new()
    })
}

// ============================================================================
// Database Row Types
// ============================================================================

#[derive(Debug, sqlx::FromRow)]
struct ArtistRow {
    id: i64,
    name: String,
    genres: String,
}

impl From<ArtistRow> for Artist {
    fn from(row: ArtistRow) -> Self {
        Artist {
            id: row.id,
            name: row.name,
            genres: decode_genres(&row.genres),
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct AlbumRow {
    id: i64,
    name: String,
    primary_artist: String,
    genres: String,
}

impl From<AlbumRow> for Album {
    fn from(row: AlbumRow) -> Self {
        Album {
            id: row.id,
            name: row.name,
            primary_artist: row.primary_artist,
            genres: decode_genres(&row.genres),
        }
    }
}

// ============================================================================
// Artists
// ============================================================================

/// Look up an artist by exact name.
pub async fn find_artist(conn: &mut SqliteConnection, name: &str) -> sqlx::Result<Option<Artist>> {
    let row: Option<ArtistRow> =
        sqlx::query_as("SELECT id, name, genres FROM artists WHERE name = ?")
            .bind(name)
            .fetch_optional(&mut *conn)
            .await?;
    Ok(row.map(Artist::from))
}

/// Insert an artist unless one with that name already exists.
///
/// Returns the new row, or `None` if the name was taken.
pub async fn insert_artist(
    conn: &mut SqliteConnection,
    name: &str,
    genres: &Genres,
) -> sqlx::Result<Option<Artist>> {
    let row: Option<(i64,)> = sqlx::query_as(
        "INSERT INTO artists (name, genres) VALUES (?, ?) ON CONFLICT DO NOTHING RETURNING id",
    )
    .bind(name)
    .bind(encode_genres(genres))
    .fetch_optional(&mut *conn)
    .await?;

    Ok(row.map(|(id,)| Artist {
        id,
        name: name.to_string(),
        genres: genres.clone(),
    }))
}

// ============================================================================
// Albums
// ============================================================================

/// Look up an album by title and primary artist.
pub async fn find_album(
    conn: &mut SqliteConnection,
    name: &str,
    primary_artist: &str,
) -> sqlx::Result<Option<Album>> {
    let row: Option<AlbumRow> = sqlx::query_as(
        "SELECT id, name, primary_artist, genres FROM albums WHERE name = ? AND primary_artist = ?",
    )
    .bind(name)
    .bind(primary_artist)
    .fetch_optional(&mut *conn)
    .await?;
    Ok(row.map(Album::from))
}

/// Get or create an album by title and primary artist.
///
/// Idempotent - calling with the same key always returns the same album.
pub async fn get_or_create_album(
    conn: &mut SqliteConnection,
    name: &str,
    primary_artist: &str,
) -> sqlx::Result<Album> {
    let inserted: Option<(i64,)> = sqlx::query_as(
        "INSERT INTO albums (name, primary_artist) VALUES (?, ?) ON CONFLICT DO NOTHING RETURNING id",
    )
    .bind(name)
    .bind(primary_artist)
    .fetch_optional(&mut *conn)
    .await?;

    if let Some((id,)) = inserted {
        return Ok(Album {
            id,
            name: name.to_string(),
            primary_artist: primary_artist.to_string(),
            genres: Genres::new(),
        });
    }

    find_album(conn, name, primary_artist)
        .await?
        .ok_or(sqlx::Error::RowNotFound)
}

/// Link an artist to an album (no-op if already linked).
pub async fn link_album_artist(
    conn: &mut SqliteConnection,
    album_id: i64,
    artist_id: i64,
) -> sqlx::Result<()> {
    sqlx::query("INSERT INTO album_artists (album_id, artist_id) VALUES (?, ?) ON CONFLICT DO NOTHING")
        .bind(album_id)
        .bind(artist_id)
        .execute(&mut *conn)
        .await?;
    Ok(())
}

/// Genre sets of every artist linked to an album.
pub async fn album_artist_genres(
    conn: &mut SqliteConnection,
    album_id: i64,
) -> sqlx::Result<Vec<Genres>> {
    let rows: Vec<(String,)> = sqlx::query_as(
        r#"
        SELECT a.genres
        FROM artists a
        JOIN album_artists aa ON aa.artist_id = a.id
        WHERE aa.album_id = ?
        "#,
    )
    .bind(album_id)
    .fetch_all(&mut *conn)
    .await?;

    Ok(rows.iter().map(|(raw,)| decode_genres(raw)).collect())
}

/// Replace an album's genre set.
pub async fn set_album_genres(
    conn: &mut SqliteConnection,
    album_id: i64,
    genres: &Genres,
) -> sqlx::Result<()> {
    sqlx::query("UPDATE albums SET genres = ? WHERE id = ?")
        .bind(encode_genres(genres))
        .bind(album_id)
        .execute(&mut *conn)
        .await?;
    Ok(())
}

// ============================================================================
// Tracks
// ============================================================================

/// Look up a track by name and album (`None` album = tracks without one).
pub async fn find_track(
    conn: &mut SqliteConnection,
    name: &str,
    album_id: Option<i64>,
) -> sqlx::Result<Option<Track>> {
    sqlx::query_as::<_, Track>(
        "SELECT id, name, album_id, length FROM tracks WHERE name = ? AND album_id IS ?",
    )
    .bind(name)
    .bind(album_id)
    .fetch_optional(&mut *conn)
    .await
}

/// Insert a track unless (name, album) already exists.
///
/// Returns the new row, or `None` if the key was taken.
pub async fn insert_track(
    conn: &mut SqliteConnection,
    name: &str,
    album_id: Option<i64>,
    length: u32,
) -> sqlx::Result<Option<Track>> {
    let row: Option<(i64,)> = sqlx::query_as(
        "INSERT INTO tracks (name, album_id, length) VALUES (?, ?, ?) ON CONFLICT DO NOTHING RETURNING id",
    )
    .bind(name)
    .bind(album_id)
    .bind(i64::from(length))
    .fetch_optional(&mut *conn)
    .await?;

    Ok(row.map(|(id,)| Track {
        id,
        name: name.to_string(),
        album_id,
        length: i64::from(length),
    }))
}

/// Link an artist to a track (no-op if already linked).
pub async fn link_track_artist(
    conn: &mut SqliteConnection,
    track_id: i64,
    artist_id: i64,
) -> sqlx::Result<()> {
    sqlx::query("INSERT INTO track_artists (track_id, artist_id) VALUES (?, ?) ON CONFLICT DO NOTHING")
        .bind(track_id)
        .bind(artist_id)
        .execute(&mut *conn)
        .await?;
    Ok(())
}

// ============================================================================
// Scrobbles
// ============================================================================

/// Look up a scrobble by play time and track.
pub async fn find_scrobble(
    conn: &mut SqliteConnection,
    timestamp: i64,
    track_id: i64,
) -> sqlx::Result<Option<Scrobble>> {
    sqlx::query_as::<_, Scrobble>(
        "SELECT id, timestamp, track_id FROM scrobbles WHERE timestamp = ? AND track_id = ?",
    )
    .bind(timestamp)
    .bind(track_id)
    .fetch_optional(&mut *conn)
    .await
}

/// Insert a scrobble unless (timestamp, track) already exists.
///
/// Returns the new row, or `None` if the play was already recorded.
pub async fn insert_scrobble(
    conn: &mut SqliteConnection,
    timestamp: i64,
    track_id: i64,
) -> sqlx::Result<Option<Scrobble>> {
    let row: Option<(i64,)> = sqlx::query_as(
        "INSERT INTO scrobbles (timestamp, track_id) VALUES (?, ?) ON CONFLICT DO NOTHING RETURNING id",
    )
    .bind(timestamp)
    .bind(track_id)
    .fetch_optional(&mut *conn)
    .await?;

    Ok(row.map(|(id,)| Scrobble {
        id,
        timestamp,
        track_id,
    }))
}

// ============================================================================
// Read-side queries (CLI)
// ============================================================================

/// Stored genres for an artist, `None` if the artist is unknown.
pub async fn artist_genres(pool: &SqlitePool, name: &str) -> sqlx::Result<Option<Genres>> {
    let mut conn = pool.acquire().await?;
    Ok(find_artist(&mut conn, name).await?.map(|a| a.genres))
}

/// Every album with the given title, across all primary artists.
pub async fn albums_by_name(pool: &SqlitePool, name: &str) -> sqlx::Result<Vec<Album>> {
    let rows: Vec<AlbumRow> = sqlx::query_as(
        "SELECT id, name, primary_artist, genres FROM albums WHERE name = ? ORDER BY primary_artist",
    )
    .bind(name)
    .fetch_all(pool)
    .await?;
    Ok(rows.into_iter().map(Album::from).collect())
}

/// Names of the artists credited on a track.
pub async fn track_artist_names(pool: &SqlitePool, track_id: i64) -> sqlx::Result<Vec<String>> {
    let rows: Vec<(String,)> = sqlx::query_as(
        r#"
        SELECT a.name
        FROM artists a
        JOIN track_artists ta ON ta.artist_id = a.id
        WHERE ta.track_id = ?
        ORDER BY a.name
        "#,
    )
    .bind(track_id)
    .fetch_all(pool)
    .await?;
    Ok(rows.into_iter().map(|(name,)| name).collect())
}

/// Row counts for each entity table.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct LibraryStats {
    pub artists: i64,
    pub albums: i64,
    pub tracks: i64,
    pub scrobbles: i64,
}

/// Count rows in each entity table.
pub async fn library_stats(pool: &SqlitePool) -> sqlx::Result<LibraryStats> {
    let (artists, albums, tracks, scrobbles): (i64, i64, i64, i64) = sqlx::query_as(
        r#"
        SELECT
            (SELECT COUNT(*) FROM artists),
            (SELECT COUNT(*) FROM albums),
            (SELECT COUNT(*) FROM tracks),
            (SELECT COUNT(*) FROM scrobbles)
        "#,
    )
    .fetch_one(pool)
    .await?;

    Ok(LibraryStats {
        artists,
        albums,
        tracks,
        scrobbles,
    })
}

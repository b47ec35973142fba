//! Core data models for the listening history.
//!
//! Defines the normalized entities: [`Artist`], [`Album`], [`Track`],
//! [`Scrobble`] and the [`SyncLogEntry`] rows behind the sync cursor.
//!
//! # Database Schema
//!
//! The models map to the following tables:
//! - `artists` - Artists with unique names and genre tags
//! - `albums` - Albums keyed by title and primary artist
//! - `tracks` - Tracks keyed by name and album
//! - `scrobbles` - Play events keyed by timestamp and track
//! - `sync_log` - Append-only cursor log per source
//!
//! Genre columns hold JSON arrays; rows are decoded into the structs here
//! by the `db` module.

use std::collections::BTreeSet;

use sqlx::FromRow;

/// Ordered, de-duplicated set of genre tags.
pub type Genres = BTreeSet<String>;

/// An artist in the listening history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artist {
    /// Database ID (auto-generated)
    pub id: i64,
    /// Artist name (unique)
    pub name: String,
    /// Genre tags from the metadata catalog
    pub genres: Genres,
}

/// An album in the listening history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Album {
    /// Database ID (auto-generated)
    pub id: i64,
    /// Album title
    pub name: String,
    /// Primary artist name, part of the album identity ('' when unknown)
    pub primary_artist: String,
    /// Union of the genres of every linked artist
    pub genres: Genres,
}

/// A track in the listening history.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct Track {
    /// Database ID (auto-generated)
    pub id: i64,
    /// Normalized track title
    pub name: String,
    /// Foreign key to albums table
    pub album_id: Option<i64>,
    /// Duration in seconds (always positive)
    pub length: i64,
}

/// A single play event.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct Scrobble {
    /// Database ID (auto-generated)
    pub id: i64,
    /// Play time in epoch seconds
    pub timestamp: i64,
    /// Foreign key to tracks table
    pub track_id: i64,
}

/// One row of the sync log.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct SyncLogEntry {
    pub id: i64,
    /// Source identifier (e.g. "maloja")
    pub source: String,
    /// RFC 3339 time the sync ran
    pub sync_date: String,
    /// Epoch seconds of the newest scrobble synced in that run
    pub last_synced_at: i64,
    /// Number of scrobbles created in that run
    pub records_synced: i64,
}

//! Maloja API Data Transfer Objects
//!
//! These types match what the Maloja `mlj_1` API returns.
//! DO NOT use these types outside the maloja module - convert to domain types.
//!
//! API Reference: https://github.com/krateng/maloja/blob/master/API.md
//!
//! Example scrobble:
//! ```json
//! {
//!   "time": 1700000000,
//!   "track": {
//!     "artists": ["Band Y"],
//!     "title": "Song (Live)",
//!     "album": {"artists": ["Band Y"], "albumtitle": "Album X"},
//!     "length": null
//!   },
//!   "duration": 201,
//!   "origin": "client:default"
//! }
//! ```

use serde::{Deserialize, Serialize};

/// `GET /serverinfo`
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerInfo {
    pub name: Option<String>,
    pub versionstring: Option<String>,
    pub db_status: Option<DbStatus>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DbStatus {
    #[serde(default)]
    pub healthy: bool,
    #[serde(default)]
    pub rebuildinprogress: bool,
    #[serde(default)]
    pub complete: bool,
}

/// `GET /scrobbles`
///
/// Entries stay untyped here so one malformed record cannot reject the
/// whole page; the adapter parses them one at a time.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ScrobbleList {
    pub status: Option<String>,
    #[serde(default)]
    pub list: Vec<serde_json::Value>,
}

/// `GET /numscrobbles`
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ScrobbleCount {
    pub status: Option<String>,
    #[serde(default)]
    pub amount: u64,
}

/// A single scrobble
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Scrobble {
    /// Epoch seconds
    pub time: Option<i64>,
    pub track: Option<Track>,
    /// Seconds actually listened
    pub duration: Option<u32>,
    pub origin: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Track {
    pub artists: Option<Vec<String>>,
    pub title: Option<String>,
    pub album: Option<Album>,
    /// Full track length in seconds
    pub length: Option<u32>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Album {
    /// Maloja sends `null` here for albums without known artists
    pub artists: Option<Vec<String>>,
    pub albumtitle: Option<String>,
}

// ============================================================================
// CONTRACT TESTS
// ============================================================================

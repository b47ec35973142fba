//! Internal domain models for catalog lookups.
//!
//! These types are OUR types - they don't change when external APIs change.
//! All external API responses get converted into these types via adapters.

use std::time::Duration;

/// Best artist match returned by a catalog search
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArtistMatch {
    /// Name as known by the catalog
    pub name: String,
    /// Genre tags (may be empty - many artists have none)
    pub genres: Vec<String>,
}

/// Best track match returned by a catalog search
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrackMatch {
    /// Title as known by the catalog
    pub name: String,
    /// First credited artist
    pub artist: Option<String>,
    /// Track duration
    pub duration: Option<Duration>,
}

impl TrackMatch {
    /// Duration in whole seconds, rounded to nearest.
    ///
    /// Returns `None` for missing or sub-second durations so callers never
    /// see a zero length.
    pub fn duration_secs(&self) -> Option<u32> {
        let millis = self.duration?.as_millis();
        let secs = (millis + 500) / 1000;
        u32::try_from(secs).ok().filter(|s| *s > 0)
    }
}

/// Errors that can occur while talking to the metadata catalog
#[derive(Debug, Clone, thiserror::Error)]
pub enum EnrichmentError {
    #[error("Missing catalog credentials: {0}")]
    MissingCredentials(String),

    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("API request failed: {0}")]
    ApiError(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Failed to parse response: {0}")]
    Parse(String),

    #[error("No matches found")]
    NoMatches,

    #[error("Rate limited - try again later")]
    RateLimited,
}

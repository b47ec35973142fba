//! Internal domain models for upstream scrobble records.
//!
//! Every source adapter converts its wire format into [`RawScrobble`].
//! Fields stay optional here; validation belongs to the reconciler, which
//! rejects records without a timestamp or title.

/// One play event as reported upstream, before reconciliation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawScrobble {
    /// Event time in epoch seconds
    pub time: Option<i64>,
    /// Track title as reported
    pub title: Option<String>,
    /// Track length in seconds, if the source knows it
    pub length: Option<u32>,
    /// Album title
    pub album: Option<String>,
    /// Album artists (may be empty even when `album` is set)
    pub album_artists: Vec<String>,
    /// Track artists, in credit order
    pub artists: Vec<String>,
}

impl RawScrobble {
    /// Convenience constructor used by tests and mocks
    pub fn new(time: i64, title: &str, album: Option<&str>, artists: &[&str]) -> Self {
        Self {
            time: Some(time),
            title: Some(title.to_string()),
            length: None,
            album: album.map(String::from),
            album_artists: Vec::new(),
            artists: artists.iter().map(|a| a.to_string()).collect(),
        }
    }

    /// Set the reported length
    pub fn with_length(mut self, secs: u32) -> Self {
        self.length = Some(secs);
        self
    }
}

/// Errors that can occur while talking to the scrobble source
#[derive(Debug, Clone, thiserror::Error)]
pub enum SourceError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("HTTP {status}: {body}")]
    Api { status: u16, body: String },

    #[error("Failed to parse response: {0}")]
    Parse(String),
}

//! Trait definitions for the metadata catalog.
//!
//! These traits enable dependency injection and mocking for tests.
//! Production code uses the Spotify client, while tests substitute
//! [`mocks::MockCatalog`].
//!
//! # Example
//!
//! ```ignore
//! use scrobble_sync::enrichment::traits::CatalogApi;
//!
//! async fn genres<T: CatalogApi>(client: &T) -> Vec<String> {
//!     client.search_artist("Band Y").await.map(|m| m.genres).unwrap_or_default()
//! }
//! ```

use async_trait::async_trait;

use super::domain::{ArtistMatch, EnrichmentError, TrackMatch};

/// Trait for catalog search (genres and track durations).
///
/// Implement this trait to create mock implementations for testing.
#[async_trait]
pub trait CatalogApi: Send + Sync {
    /// Search for an artist by name and return the best match.
    async fn search_artist(&self, name: &str) -> Result<ArtistMatch, EnrichmentError>;

    /// Search for a track by title (optionally narrowed by artist) and return the best match.
    async fn search_track(
        &self,
        name: &str,
        artist: Option<&str>,
    ) -> Result<TrackMatch, EnrichmentError>;
}

#[async_trait]
impl CatalogApi for super::spotify::SpotifyClient {
    async fn search_artist(&self, name: &str) -> Result<ArtistMatch, EnrichmentError> {
        self.search_artist(name).await
    }

    async fn search_track(
        &self,
        name: &str,
        artist: Option<&str>,
    ) -> Result<TrackMatch, EnrichmentError> {
        self.search_track(name, artist).await
    }
}

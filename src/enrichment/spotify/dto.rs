//! Spotify Web API Data Transfer Objects
//!
//! These types match what the Spotify Web API returns for the endpoints we use.
//! DO NOT use these types outside the spotify module - convert to domain types.
//!
//! API Reference: https://developer.spotify.com/documentation/web-api
//!
//! We use:
//! - `POST https://accounts.spotify.com/api/token` (client credentials flow)
//! - `GET /v1/search?type=artist` for genres
//! - `GET /v1/search?type=track` for durations

use serde::{Deserialize, Serialize};

/// Client-credentials token response
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
    /// Lifetime in seconds
    pub expires_in: u64,
}

/// Search response for `type=artist`
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ArtistSearchResponse {
    pub artists: Paging<Artist>,
}

/// Search response for `type=track`
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TrackSearchResponse {
    pub tracks: Paging<Track>,
}

/// Paging object wrapping search results
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Paging<T> {
    #[serde(default = "Vec::new")]
    pub items: Vec<T>,
    pub total: Option<u32>,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

/// Full artist object
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Artist {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub genres: Vec<String>,
    pub popularity: Option<u32>,
}

/// Simplified artist object (embedded in tracks)
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SimpleArtist {
    pub id: Option<String>,
    pub name: String,
}

/// Simplified album object (embedded in tracks)
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SimpleAlbum {
    pub id: Option<String>,
    pub name: String,
}

/// Full track object
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Track {
    pub id: Option<String>,
    pub name: String,
    /// Duration in milliseconds
    pub duration_ms: u64,
    #[serde(default)]
    pub artists: Vec<SimpleArtist>,
    pub album: Option<SimpleAlbum>,
}

/// Error response from the Web API
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ErrorResponse {
    pub error: ErrorBody,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ErrorBody {
    pub status: u16,
    pub message: String,
}

/// Error response from the accounts service (token endpoint)
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AuthErrorResponse {
    pub error: String,
    pub error_description: Option<String>,
}

// ============================================================================
// CONTRACT TESTS
// These verify our DTOs match what the real API returns.
// ============================================================================

//! Spotify Web API HTTP client
//!
//! Handles the client-credentials token exchange and the two search queries
//! used for enrichment.
//! See: https://developer.spotify.com/documentation/web-api/tutorials/client-credentials-flow
//!
//! Tokens live for an hour; we cache the current one and refresh it a minute
//! before it expires, or immediately after a 401.

use std::time::{Duration, Instant};

use parking_lot::Mutex;

use super::{adapter, dto};
use crate::enrichment::domain::{ArtistMatch, EnrichmentError, TrackMatch};

const API_BASE_URL: &str = "https://api.spotify.com/v1";
const AUTH_URL: &str = "https://accounts.spotify.com/api/token";

/// Default request timeout
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Refresh tokens this long before Spotify says they expire
const TOKEN_EXPIRY_MARGIN: Duration = Duration::from_secs(60);

/// User agent string
const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Cached access token
#[derive(Debug, Clone)]
struct AccessToken {
    value: String,
    expires_at: Instant,
}

impl AccessToken {
    fn is_fresh(&self) -> bool {
        Instant::now() + TOKEN_EXPIRY_MARGIN < self.expires_at
    }
}

/// Spotify API client
pub struct SpotifyClient {
    http_client: reqwest::Client,
    client_id: String,
    client_secret: String,
    base_url: String,
    auth_url: String,
    token: Mutex<Option<AccessToken>>,
}

impl std::fmt::Debug for SpotifyClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpotifyClient")
            .field("client_id", &self.client_id)
            .field("client_secret", &"[REDACTED]")
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl SpotifyClient {
    /// Create a new client from application credentials
    ///
    /// # Errors
    /// Returns `EnrichmentError::MissingCredentials` if either value is empty.
    pub fn new(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
    ) -> Result<Self, EnrichmentError> {
        Self::with_urls(client_id, client_secret, API_BASE_URL, AUTH_URL)
    }

    /// Create a client against custom endpoints (tests, proxies)
    pub fn with_urls(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        base_url: impl Into<String>,
        auth_url: impl Into<String>,
    ) -> Result<Self, EnrichmentError> {
        let client_id = client_id.into();
        let client_secret = client_secret.into();
        if client_id.trim().is_empty() || client_secret.trim().is_empty() {
            return Err(EnrichmentError::MissingCredentials(
                "Spotify client id and secret are required".to_string(),
            ));
        }

        let http_client = reqwest::Client::builder()
            .gzip(true)
            .timeout(REQUEST_TIMEOUT)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| EnrichmentError::Network(e.to_string()))?;

        Ok(Self {
            http_client,
            client_id,
            client_secret,
            base_url: base_url.into(),
            auth_url: auth_url.into(),
            token: Mutex::new(None),
        })
    }

    /// Search for an artist and return the best match with its genres
    pub async fn search_artist(&self, name: &str) -> Result<ArtistMatch, EnrichmentError> {
        let query = artist_query(name);
        let response: dto::ArtistSearchResponse = self.search(&query, "artist").await?;
        adapter::to_artist_match(response)
    }

    /// Search for a track and return the best match with its duration
    pub async fn search_track(
        &self,
        name: &str,
        artist: Option<&str>,
    ) -> Result<TrackMatch, EnrichmentError> {
        let query = track_query(name, artist);
        let response: dto::TrackSearchResponse = self.search(&query, "track").await?;
        adapter::to_track_match(response)
    }

    /// Run a search, refreshing the token once if it was rejected
    async fn search<T: serde::de::DeserializeOwned>(
        &self,
        query: &str,
        kind: &str,
    ) -> Result<T, EnrichmentError> {
        match self.send_search_request(query, kind).await {
            Err(EnrichmentError::Auth(reason)) => {
                tracing::debug!(%reason, "Spotify token rejected, refreshing");
                self.token.lock().take();
                self.send_search_request(query, kind).await
            }
            other => other,
        }
    }

    /// Send the HTTP request and parse the response
    async fn send_search_request<T: serde::de::DeserializeOwned>(
        &self,
        query: &str,
        kind: &str,
    ) -> Result<T, EnrichmentError> {
        let token = self.access_token().await?;
        let url = format!(
            "{}/search?q={}&type={}&limit=1",
            self.base_url,
            urlencoding::encode(query),
            kind
        );

        let response = self
            .http_client
            .get(&url)
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| EnrichmentError::Network(e.to_string()))?;

        let status = response.status();

        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(EnrichmentError::Auth("access token rejected".to_string()));
        }

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(EnrichmentError::RateLimited);
        }

        if !status.is_success() {
            if let Ok(error) = response.json::<dto::ErrorResponse>().await {
                return Err(EnrichmentError::ApiError(error.error.message));
            }
            return Err(EnrichmentError::Network(format!(
                "HTTP {}: {}",
                status,
                status.canonical_reason().unwrap_or("Unknown")
            )));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| EnrichmentError::Parse(e.to_string()))
    }

    /// Return a cached token or fetch a new one
    async fn access_token(&self) -> Result<String, EnrichmentError> {
        let cached = self
            .token
            .lock()
            .as_ref()
            .filter(|t| t.is_fresh())
            .map(|t| t.value.clone());
        if let Some(value) = cached {
            return Ok(value);
        }

        let fresh = self.request_token().await?;
        let value = fresh.value.clone();
        *self.token.lock() = Some(fresh);
        Ok(value)
    }

    async fn request_token(&self) -> Result<AccessToken, EnrichmentError> {
        let response = self
            .http_client
            .post(&self.auth_url)
            .basic_auth(&self.client_id, Some(&self.client_secret))
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await
            .map_err(|e| EnrichmentError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            if let Ok(error) = response.json::<dto::AuthErrorResponse>().await {
                return Err(EnrichmentError::Auth(
                    error.error_description.unwrap_or(error.error),
                ));
            }
            return Err(EnrichmentError::Auth(format!("HTTP {}", status)));
        }

        let token = response
            .json::<dto::TokenResponse>()
            .await
            .map_err(|e| EnrichmentError::Parse(e.to_string()))?;

        tracing::debug!(expires_in = token.expires_in, "Obtained Spotify access token");

        Ok(AccessToken {
            value: token.access_token,
            expires_at: Instant::now() + Duration::from_secs(token.expires_in),
        })
    }
}

/// Field-filtered artist query (`artist:<name>`)
fn artist_query(name: &str) -> String {
    format!("artist:{}", name.trim())
}

/// Field-filtered track query (`track:<name> artist:<artist>`)
fn track_query(name: &str, artist: Option<&str>) -> String {
    match artist.map(str::trim).filter(|a| !a.is_empty()) {
        Some(artist) => format!("track:{} artist:{}", name.trim(), artist),
        None => format!("track:{}", name.trim()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let client = SpotifyClient::new("id", "secret").unwrap();
        assert_eq!(client.base_url, "https://api.spotify.com/v1");
        assert_eq!(client.auth_url, "https://accounts.spotify.com/api/token");
        assert!(client.token.lock().is_none());
    }

    #[test]
    fn test_missing_credentials_rejected() {
        let result = SpotifyClient::new("", "secret");
        assert!(matches!(result, Err(EnrichmentError::MissingCredentials(_))));
        let result = SpotifyClient::new("id", "  ");
        assert!(matches!(result, Err(EnrichmentError::MissingCredentials(_))));
    }

    #[test]
    fn test_debug_redacts_secret() {
        let client = SpotifyClient::new("id", "hunter2").unwrap();
        let debug = format!("{:?}", client);
        assert!(!debug.contains("hunter2"));
    }

    #[test]
    fn test_queries() {
        assert_eq!(artist_query(" Band Y "), "artist:Band Y");
        assert_eq!(track_query("Song", Some("Band Y")), "track:Song artist:Band Y");
        assert_eq!(track_query("Song", Some("")), "track:Song");
        assert_eq!(track_query("Song", None), "track:Song");
    }

    #[test]
    fn test_token_freshness() {
        let fresh = AccessToken {
            value: "t".to_string(),
            expires_at: Instant::now() + Duration::from_secs(3600),
        };
        assert!(fresh.is_fresh());

        let stale = AccessToken {
            value: "t".to_string(),
            expires_at: Instant::now() + Duration::from_secs(30),
        };
        assert!(!stale.is_fresh());
    }

    #[tokio::test]
    async fn test_unreachable_catalog_is_network_error() {
        let client =
            SpotifyClient::with_urls("id", "secret", "http://127.0.0.1:9", "http://127.0.0.1:9/token")
                .unwrap();
        let result = client.search_artist("Band Y").await;
        assert!(matches!(result, Err(EnrichmentError::Network(_))));
    }
}

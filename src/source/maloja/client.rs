//! Maloja HTTP client
//!
//! Talks to the `mlj_1` API of a self-hosted Maloja scrobble server.
//!
//! ## API Quirks
//!
//! `/scrobbles` only accepts calendar dates in `from`, and reads them as
//! midnight in the server's own timezone. We ask from the UTC day *before*
//! the cursor, which starts no later than the cursor for any server offset
//! between UTC-12 and UTC+14, and drop everything at or before the cursor
//! ourselves.

use std::time::Duration;

use chrono::DateTime;

use super::{adapter, dto};
use crate::source::domain::{RawScrobble, SourceError};

/// Listing a large history can take a while on small servers
const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

/// Path of the native API below the server root
const API_PATH: &str = "apis/mlj_1";

/// One day, subtracted from the cursor to cover the server's timezone
const FROM_DATE_SLACK_SECS: i64 = 86_400;

/// Maloja API client
#[derive(Debug, Clone)]
pub struct MalojaClient {
    http_client: reqwest::Client,
    base_url: String,
    name: String,
}

impl MalojaClient {
    /// Create a client for the server at `server_url` (e.g. `http://localhost:42010`)
    pub fn new(server_url: &str) -> Result<Self, SourceError> {
        let http_client = reqwest::Client::builder()
            .gzip(true)
            .timeout(REQUEST_TIMEOUT)
            .user_agent(concat!(
                env!("CARGO_PKG_NAME"),
                "/",
                env!("CARGO_PKG_VERSION")
            ))
            .build()
            .map_err(|e| SourceError::Network(e.to_string()))?;

        Ok(Self {
            http_client,
            base_url: format!("{}/{}", server_url.trim_end_matches('/'), API_PATH),
            name: "maloja".to_string(),
        })
    }

    /// Override the source identifier used for the sync cursor
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Source identifier
    pub fn name(&self) -> &str {
        &self.name
    }

    /// `true` if the server answers and reports a healthy database
    pub async fn health_check(&self) -> bool {
        match self.server_info().await {
            Ok(info) => {
                let healthy = info.db_status.as_ref().is_some_and(|s| s.healthy);
                if !healthy {
                    tracing::warn!(source = %self.name, "Maloja database is not healthy");
                }
                healthy
            }
            Err(e) => {
                tracing::warn!(source = %self.name, error = %e, "Maloja health check failed");
                false
            }
        }
    }

    /// All scrobbles strictly after `since` (epoch seconds), in server order
    pub async fn fetch_since(&self, since: i64) -> Result<Vec<RawScrobble>, SourceError> {
        let from = from_date(since.saturating_sub(FROM_DATE_SLACK_SECS));
        tracing::debug!(source = %self.name, since, %from, "Fetching scrobbles");

        let url = format!("{}/scrobbles?from={}", self.base_url, urlencoding::encode(&from));
        let list: dto::ScrobbleList = self.get_json(&url).await?;
        Ok(adapter::to_raw_scrobbles(list, since))
    }

    /// Total number of scrobbles on the server
    pub async fn scrobble_count(&self) -> Result<u64, SourceError> {
        let url = format!("{}/numscrobbles", self.base_url);
        let count: dto::ScrobbleCount = self.get_json(&url).await?;
        Ok(count.amount)
    }

    async fn server_info(&self) -> Result<dto::ServerInfo, SourceError> {
        let url = format!("{}/serverinfo", self.base_url);
        self.get_json(&url).await
    }

    /// Send a GET request and parse the JSON body
    async fn get_json<T: serde::de::DeserializeOwned>(&self, url: &str) -> Result<T, SourceError> {
        let response = self
            .http_client
            .get(url)
            .send()
            .await
            .map_err(|e| SourceError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SourceError::Api {
                status: status.as_u16(),
                body: body.chars().take(200).collect(),
            });
        }

        response
            .json::<T>()
            .await
            .map_err(|e| SourceError::Parse(e.to_string()))
    }
}

/// UTC calendar day containing `since`, as `YYYY/MM/DD`
fn from_date(since: i64) -> String {
    DateTime::from_timestamp(since.max(0), 0)
        .unwrap_or_default()
        .format("%Y/%m/%d")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let client = MalojaClient::new("http://localhost:42010/").unwrap();
        assert_eq!(client.base_url, "http://localhost:42010/apis/mlj_1");
        assert_eq!(client.name(), "maloja");
    }

    #[test]
    fn test_custom_name() {
        let client = MalojaClient::new("http://localhost:42010")
            .unwrap()
            .with_name("maloja-home");
        assert_eq!(client.name(), "maloja-home");
    }

    #[test]
    fn test_from_date() {
        assert_eq!(from_date(0), "1970/01/01");
        assert_eq!(from_date(1_700_000_000), "2023/11/14");
        assert_eq!(from_date(-5), "1970/01/01");
    }

    /// Epoch seconds of local midnight on `date` (YYYY/MM/DD) at `offset_secs` east of UTC
    fn local_midnight(date: &str, offset_secs: i64) -> i64 {
        let day = chrono::NaiveDate::parse_from_str(date, "%Y/%m/%d").unwrap();
        day.and_hms_opt(0, 0, 0).unwrap().and_utc().timestamp() - offset_secs
    }

    #[test]
    fn test_fetch_window_covers_cursor_in_any_timezone() {
        // 2023-11-15 01:00 UTC, still the 14th on a UTC-8 server
        let since: i64 = 1_700_010_000;
        let from = from_date(since.saturating_sub(FROM_DATE_SLACK_SECS));
        assert_eq!(from, "2023/11/14");

        for hours in -12..=14 {
            let start = local_midnight(&from, hours * 3600);
            assert!(start <= since, "offset {}h starts at {} after cursor {}", hours, start, since);
        }
    }

    #[test]
    fn test_fetch_window_at_epoch() {
        assert_eq!(from_date(0i64.saturating_sub(FROM_DATE_SLACK_SECS)), "1970/01/01");
    }

    #[tokio::test]
    async fn test_unreachable_server_is_unhealthy() {
        let client = MalojaClient::new("http://127.0.0.1:9").unwrap();
        assert!(!client.health_check().await);
    }

    #[tokio::test]
    async fn test_unreachable_server_fetch_fails() {
        let client = MalojaClient::new("http://127.0.0.1:9").unwrap();
        let result = client.fetch_since(0).await;
        assert!(matches!(result, Err(SourceError::Network(_))));
    }
}

//! Trait definition for the upstream scrobble source.
//!
//! The sync orchestrator is written against [`ScrobbleSource`]; production
//! uses [`MalojaClient`](super::maloja::MalojaClient), tests use
//! [`mocks::MockSource`].

use async_trait::async_trait;

use super::domain::{RawScrobble, SourceError};

/// Read-only access to a listening-history server.
#[async_trait]
pub trait ScrobbleSource: Send + Sync {
    /// Identifier used as the cursor key (e.g. "maloja")
    fn name(&self) -> &str;

    /// Whether the source is reachable and healthy
    async fn health_check(&self) -> bool;

    /// Records with an event time strictly after `since`, in source order
    async fn fetch_since(&self, since: i64) -> Result<Vec<RawScrobble>, SourceError>;

    /// Total number of records held upstream
    async fn scrobble_count(&self) -> Result<u64, SourceError>;
}

#[async_trait]
impl ScrobbleSource for super::maloja::MalojaClient {
    fn name(&self) -> &str {
        self.name()
    }

    async fn health_check(&self) -> bool {
        self.health_check().await
    }

    async fn fetch_since(&self, since: i64) -> Result<Vec<RawScrobble>, SourceError> {
        self.fetch_since(since).await
    }

    async fn scrobble_count(&self) -> Result<u64, SourceError> {
        self.scrobble_count().await
    }
}

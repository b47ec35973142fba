//! Metadata enrichment - fetches genres and durations from an external catalog.
//!
//! # Architecture
//!
//! This module follows a clean separation between:
//! - **Domain models** (`domain.rs`) - Internal types that represent our business logic
//! - **API DTOs** (`spotify/dto.rs`) - Exact API response shapes
//! - **Adapters** - Convert DTOs to domain models
//! - **Clients** - HTTP clients for external APIs
//! - **Resolver** - Best-effort lookups used by the sync engine
//!
//! The sync engine only ever sees [`MetadataResolver`], which never fails:
//! catalog errors degrade to empty genres or an absent duration.
//!
//! # Usage
//!
//! ```ignore
//! use enrichment::{MetadataResolver, spotify::SpotifyClient};
//!
//! let client = SpotifyClient::new(client_id, client_secret)?;
//! let resolver = MetadataResolver::new(Arc::new(client));
//! let genres = resolver.resolve_artist_genres("Band Y").await;
//! ```

pub mod domain;
pub mod resolver;
pub mod spotify;
pub mod traits;

pub use domain::{ArtistMatch, EnrichmentError, TrackMatch};
pub use resolver::{MetadataResolver, normalize_track_name};
pub use traits::CatalogApi;

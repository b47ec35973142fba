//! Upstream scrobble sources.
//!
//! Same layering as the enrichment module: DTOs mirror the wire format,
//! adapters convert them into [`RawScrobble`], and the orchestrator only
//! depends on the [`ScrobbleSource`] trait.

pub mod domain;
pub mod maloja;
pub mod traits;

pub use domain::{RawScrobble, SourceError};
pub use maloja::MalojaClient;
pub use traits::ScrobbleSource;

//! Metadata resolver - best-effort genre and duration lookups
//!
//! Wraps a [`CatalogApi`] and turns every failure into an empty result:
//! 1. Artist genres: search the catalog, return the best match's tags
//! 2. Track duration: normalize the title, search, return whole seconds
//!
//! Nothing here touches the database, and nothing here returns an error.
//! Failed lookups are logged and degrade to "no data".

use std::sync::Arc;

use crate::enrichment::{
    domain::EnrichmentError,
    traits::CatalogApi,
};
use crate::model::Genres;

/// Best-effort metadata lookups against an external catalog
#[derive(Clone)]
pub struct MetadataResolver {
    catalog: Arc<dyn CatalogApi>,
}

impl MetadataResolver {
    /// Create a resolver backed by the given catalog
    pub fn new(catalog: Arc<dyn CatalogApi>) -> Self {
        Self { catalog }
    }

    /// Genre tags for an artist, empty when the lookup fails or matches nothing
    pub async fn resolve_artist_genres(&self, artist_name: &str) -> Genres {
        match self.catalog.search_artist(artist_name).await {
            Ok(found) => {
                tracing::debug!(
                    artist = artist_name,
                    matched = %found.name,
                    genres = found.genres.len(),
                    "Resolved artist genres"
                );
                found.genres.into_iter().collect()
            }
            Err(e) => {
                log_lookup_failure("artist", artist_name, &e);
                Genres::new()
            }
        }
    }

    /// Track duration in seconds, `None` when the lookup fails or matches nothing
    ///
    /// The title is normalized with [`normalize_track_name`] before searching.
    pub async fn resolve_track_duration(
        &self,
        track_name: &str,
        artist_name: Option<&str>,
    ) -> Option<u32> {
        let normalized = normalize_track_name(track_name);
        match self.catalog.search_track(&normalized, artist_name).await {
            Ok(found) => {
                let secs = found.duration_secs();
                tracing::debug!(
                    track = %normalized,
                    artist = artist_name.unwrap_or(""),
                    duration = ?secs,
                    "Resolved track duration"
                );
                secs
            }
            Err(e) => {
                log_lookup_failure("track", &normalized, &e);
                None
            }
        }
    }
}

/// Misses are expected and logged quietly; real failures get a warning.
fn log_lookup_failure(kind: &str, name: &str, error: &EnrichmentError) {
    match error {
        EnrichmentError::NoMatches => {
            tracing::debug!(kind, name, "No catalog match");
        }
        other => {
            tracing::warn!(kind, name, error = %other, "Catalog lookup failed");
        }
    }
}

/// Strip parenthetical content from a track title to improve match rates.
///
/// Everything from the first `(` to the last `)` is removed and the result
/// trimmed, so `"Song (Live) (2011 Remaster)"` becomes `"Song"`. If nothing
/// would remain (e.g. `"(Intro)"`), the trimmed original is returned.
pub fn normalize_track_name(name: &str) -> String {
    let stripped = match (name.find('('), name.rfind(')')) {
        (Some(open), Some(close)) if open < close => {
            let mut out = String::with_capacity(name.len());
            out.push_str(&name[..open]);
            out.push_str(&name[close + 1..]);
            collapse_whitespace(&out)
        }
        _ => collapse_whitespace(name),
    };

    if stripped.is_empty() {
        collapse_whitespace(name)
    } else {
        stripped
    }
}

fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enrichment::traits::mocks::{CatalogQuery, MockCatalog};

    #[test]
    fn test_normalize_strips_parentheticals() {
        assert_eq!(normalize_track_name("Song (Live)"), "Song");
        assert_eq!(normalize_track_name("Song (Remix) (2011 Remaster)"), "Song");
        assert_eq!(normalize_track_name("Song (feat. X) Part 2"), "Song Part 2");
        assert_eq!(normalize_track_name("  Plain Song  "), "Plain Song");
    }

    #[test]
    fn test_normalize_keeps_unbalanced_and_empty_results() {
        assert_eq!(normalize_track_name("Song (Live"), "Song (Live");
        assert_eq!(normalize_track_name("Song) weird ("), "Song) weird (");
        assert_eq!(normalize_track_name("(Intro)"), "(Intro)");
    }

    #[tokio::test]
    async fn test_resolve_genres() {
        let catalog = Arc::new(MockCatalog::empty().artist("Band Y", &["rock", "indie", "rock"]));
        let resolver = MetadataResolver::new(catalog);

        let genres = resolver.resolve_artist_genres("Band Y").await;
        assert_eq!(
            genres.into_iter().collect::<Vec<_>>(),
            vec!["indie".to_string(), "rock".to_string()]
        );
    }

    #[tokio::test]
    async fn test_resolve_genres_degrades_on_error() {
        let catalog = Arc::new(MockCatalog::with_error(EnrichmentError::Network(
            "connection reset".to_string(),
        )));
        let resolver = MetadataResolver::new(catalog);

        assert!(resolver.resolve_artist_genres("Band Y").await.is_empty());
    }

    #[tokio::test]
    async fn test_resolve_duration_uses_normalized_name() {
        let catalog = Arc::new(MockCatalog::empty().track("Song", 215));
        let resolver = MetadataResolver::new(catalog.clone());

        let secs = resolver
            .resolve_track_duration("Song (Live)", Some("Band Y"))
            .await;
        assert_eq!(secs, Some(215));
        assert_eq!(
            catalog.queries(),
            vec![CatalogQuery::Track {
                name: "Song".to_string(),
                artist: Some("Band Y".to_string())
            }]
        );
    }

    #[tokio::test]
    async fn test_resolve_duration_absent_on_miss_or_error() {
        let resolver = MetadataResolver::new(Arc::new(MockCatalog::empty()));
        assert_eq!(resolver.resolve_track_duration("Nothing", None).await, None);

        let resolver = MetadataResolver::new(Arc::new(MockCatalog::with_error(
            EnrichmentError::Parse("unexpected token".to_string()),
        )));
        assert_eq!(resolver.resolve_track_duration("Song", None).await, None);
    }
}

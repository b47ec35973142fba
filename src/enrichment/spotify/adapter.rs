//! Adapter layer: Convert Spotify DTOs to domain models
//!
//! This is the ONLY place where Spotify DTO types are converted to domain types.

use std::time::Duration;

use super::dto;
use crate::enrichment::domain::{ArtistMatch, EnrichmentError, TrackMatch};

/// Convert an artist search response into its best (first) match
pub fn to_artist_match(response: dto::ArtistSearchResponse) -> Result<ArtistMatch, EnrichmentError> {
    let artist = response
        .artists
        .items
        .into_iter()
        .next()
        .ok_or(EnrichmentError::NoMatches)?;

    Ok(ArtistMatch {
        name: artist.name,
        genres: clean_genres(artist.genres),
    })
}

/// Convert a track search response into its best (first) match
pub fn to_track_match(response: dto::TrackSearchResponse) -> Result<TrackMatch, EnrichmentError> {
    let track = response
        .tracks
        .items
        .into_iter()
        .next()
        .ok_or(EnrichmentError::NoMatches)?;

    Ok(TrackMatch {
        name: track.name,
        artist: track.artists.into_iter().next().map(|a| a.name),
        duration: Some(Duration::from_millis(track.duration_ms)),
    })
}

/// Trim tags and drop blanks
fn clean_genres(genres: Vec<String>) -> Vec<String> {
    genres
        .into_iter()
        .map(|g| g.trim().to_string())
        .filter(|g| !g.is_empty())
        .collect()
}

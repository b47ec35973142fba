//! Spotify Web API integration
//!
//! Provides artist genres and track durations via the search endpoint,
//! authenticated with the client-credentials flow.
//!
//! API docs: https://developer.spotify.com/documentation/web-api

pub mod dto;
mod adapter;
mod client;

pub use adapter::{to_artist_match, to_track_match};
pub use client::SpotifyClient;

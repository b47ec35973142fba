//! Adapter layer: Convert Maloja DTOs to domain models

use serde_json::Value;

use super::dto;
use crate::source::domain::RawScrobble;

/// Convert a scrobble list, keeping only records strictly after `since`.
///
/// Records without a time are kept so the reconciler can report them.
pub fn to_raw_scrobbles(list: dto::ScrobbleList, since: i64) -> Vec<RawScrobble> {
    list.list
        .into_iter()
        .map(parse_entry)
        .filter(|s| s.time.is_none_or(|t| t > since))
        .collect()
}

/// Parse one list entry. An entry that does not match the DTO keeps only its
/// time, so it still reaches the reconciler and is counted as malformed.
fn parse_entry(value: Value) -> RawScrobble {
    let time = value.get("time").and_then(Value::as_i64);
    match serde_json::from_value::<dto::Scrobble>(value) {
        Ok(scrobble) => to_raw_scrobble(scrobble),
        Err(e) => {
            tracing::warn!(time = ?time, error = %e, "Unparseable Maloja scrobble");
            RawScrobble {
                time,
                ..Default::default()
            }
        }
    }
}

/// Convert a single scrobble
pub fn to_raw_scrobble(scrobble: dto::Scrobble) -> RawScrobble {
    let Some(track) = scrobble.track else {
        return RawScrobble {
            time: scrobble.time,
            ..Default::default()
        };
    };

    let (album, album_artists) = match track.album {
        Some(album) => (
            non_blank(album.albumtitle),
            clean_names(album.artists.unwrap_or_default()),
        ),
        None => (None, Vec::new()),
    };

    RawScrobble {
        time: scrobble.time,
        title: non_blank(track.title),
        length: track.length.filter(|l| *l > 0),
        album,
        album_artists,
        artists: clean_names(track.artists.unwrap_or_default()),
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn clean_names(names: Vec<String>) -> Vec<String> {
    names
        .into_iter()
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty())
        .collect()
}

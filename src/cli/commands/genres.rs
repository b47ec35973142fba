//! Stored genre queries.

use tokio::runtime::Runtime;

use super::{Settings, open_db};
use crate::db;
use crate::model::Genres;

/// Print the stored genres of an artist or of every album with a title
pub fn cmd_genres(
    rt: &Runtime,
    settings: &Settings,
    artist: Option<&str>,
    album: Option<&str>,
) -> anyhow::Result<()> {
    rt.block_on(async {
        let pool = open_db(settings).await?;

        if let Some(name) = artist {
            match db::artist_genres(&pool, name).await? {
                Some(genres) => println!("{}: {}", name, join(&genres)),
                None => println!("Unknown artist: {}", name),
            }
        }

        if let Some(title) = album {
            let albums = db::albums_by_name(&pool, title).await?;
            if albums.is_empty() {
                println!("Unknown album: {}", title);
            }
            for album in albums {
                let by = if album.primary_artist.is_empty() {
                    "unknown artist"
                } else {
                    album.primary_artist.as_str()
                };
                println!("{} ({}): {}", album.name, by, join(&album.genres));
            }
        }
        Ok(())
    })
}

fn join(genres: &Genres) -> String {
    if genres.is_empty() {
        return "(no genres)".to_string();
    }
    genres.iter().map(String::as_str).collect::<Vec<_>>().join(", ")
}

use serde::{Deserialize, Serialize};

use crate::models::{FavoriteEntry, FavoritesCollection};
use crate::{Error, Result};

/// Slot the favorites blob is stored under
pub const STORAGE_KEY: &str = "rickandmorty_favorites";

/// Version written into the blob envelope. Blobs with any other version are
/// not restored.
pub const STORAGE_VERSION: u32 = 0;

#[derive(Serialize, Deserialize)]
struct Envelope<F> {
    state: State<F>,
    version: u32,
}

#[derive(Serialize, Deserialize)]
struct State<F> {
    favorites: F,
}

/// Serialize the whole collection into the persisted JSON layout
pub fn encode(favorites: &FavoritesCollection) -> Result<String> {
    let envelope = Envelope {
        state: State { favorites },
        version: STORAGE_VERSION,
    };
    Ok(serde_json::to_string(&envelope)?)
}

/// Partitions as raw JSON, so one unreadable entry does not sink the rest
#[derive(Deserialize)]
struct RawCollection {
    #[serde(default)]
    characters: Vec<serde_json::Value>,
    #[serde(default)]
    episodes: Vec<serde_json::Value>,
    #[serde(default)]
    locations: Vec<serde_json::Value>,
}

fn entries_from(raw: Vec<serde_json::Value>, dropped: &mut usize) -> Vec<FavoriteEntry> {
    raw.into_iter()
        .filter_map(|value| match serde_json::from_value::<FavoriteEntry>(value) {
            Ok(entry) => Some(entry),
            Err(e) => {
                tracing::debug!("Skipping unreadable favorite entry: {}", e);
                *dropped += 1;
                None
            }
        })
        .collect()
}

/// Parse a persisted blob. Entries that cannot be read or that break the
/// partition invariants are dropped rather than failing the whole blob.
pub fn decode(raw: &str) -> Result<FavoritesCollection> {
    let envelope: Envelope<RawCollection> = serde_json::from_str(raw)?;
    if envelope.version != STORAGE_VERSION {
        return Err(Error::InvalidInput(format!(
            "Unsupported favorites version {} (expected {})",
            envelope.version, STORAGE_VERSION
        )));
    }

    let raw = envelope.state.favorites;
    let mut dropped = 0;
    let mut favorites = FavoritesCollection {
        characters: entries_from(raw.characters, &mut dropped),
        episodes: entries_from(raw.episodes, &mut dropped),
        locations: entries_from(raw.locations, &mut dropped),
    };
    dropped += favorites.sanitize();
    if dropped > 0 {
        tracing::warn!("Dropped {} invalid favorite entries while restoring", dropped);
    }
    Ok(favorites)
}

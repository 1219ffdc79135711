mod character;
mod episode;
mod favorite;
mod location;
mod page;

pub use character::{Character, CharacterStatus, Gender, LocationRef};
pub use episode::{season_from_code, Episode};
pub use favorite::{EntityKind, Favoritable, FavoriteDetails, FavoriteEntry, FavoritesCollection};
pub use location::Location;
pub use page::{Page, PageInfo};

use chrono::{DateTime, Utc};

/// Convert Unix timestamp (seconds) to DateTime<Utc>
pub fn timestamp_to_datetime(timestamp: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(timestamp, 0).unwrap_or_default()
}

/// Convert DateTime<Utc> to Unix timestamp (seconds)
pub fn datetime_to_timestamp(datetime: &DateTime<Utc>) -> i64 {
    datetime.timestamp()
}

/// Extract the trailing numeric identifier from a catalog resource URL,
/// e.g. `https://rickandmortyapi.com/api/episode/28` -> `Some(28)`.
///
/// Returns `None` for empty urls, `unknown` references and zero ids.
pub fn id_from_url(url: &str) -> Option<u32> {
    let last = url.trim_end_matches('/').rsplit('/').next()?;
    match last.parse::<u32>() {
        Ok(0) | Err(_) => None,
        Ok(id) => Some(id),
    }
}

/// Collect ids from a list of resource urls, skipping unusable ones and
/// keeping the first occurrence of each id.
pub fn ids_from_urls<'a, I>(urls: I) -> Vec<u32>
where
    I: IntoIterator<Item = &'a String>,
{
    let mut ids = Vec::new();
    for id in urls.into_iter().filter_map(|u| id_from_url(u)) {
        if !ids.contains(&id) {
            ids.push(id);
        }
    }
    ids
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::favorite::{Favoritable, FavoriteDetails};
use super::ids_from_urls;

/// An episode as returned by the `/episode` endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Episode {
    pub id: u32,
    pub name: String,
    /// Air date as printed by the API, e.g. "December 2, 2013"
    pub air_date: String,
    /// Episode code, e.g. "S01E01"
    pub episode: String,
    #[serde(default)]
    pub characters: Vec<String>,
    pub url: String,
    pub created: DateTime<Utc>,
}

impl Episode {
    pub fn character_ids(&self) -> Vec<u32> {
        ids_from_urls(&self.characters)
    }
}

/// Parse the season number out of an episode code like `S01E01`.
pub fn season_from_code(code: &str) -> Option<u32> {
    let rest = code.strip_prefix('S')?;
    let digits: String = rest.chars().take_while(|c| c.is_ascii_digit()).collect();
    digits.parse().ok()
}

impl Favoritable for Episode {
    fn favorite_id(&self) -> u32 {
        self.id
    }

    fn favorite_name(&self) -> &str {
        &self.name
    }

    fn favorite_details(&self) -> FavoriteDetails {
        FavoriteDetails::Episode {
            episode: Some(self.episode.clone()).filter(|s| !s.is_empty()),
            air_date: Some(self.air_date.clone()).filter(|s| !s.is_empty()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_episode_deserialize() {
        let json = r#"{
            "id": 1,
            "name": "Pilot",
            "air_date": "December 2, 2013",
            "episode": "S01E01",
            "characters": [
                "https://rickandmortyapi.com/api/character/1",
                "https://rickandmortyapi.com/api/character/2"
            ],
            "url": "https://rickandmortyapi.com/api/episode/1",
            "created": "2017-11-10T12:56:33.798Z"
        }"#;
        let episode: Episode = serde_json::from_str(json).unwrap();
        assert_eq!(episode.name, "Pilot");
        assert_eq!(episode.character_ids(), vec![1, 2]);
        assert_eq!(season_from_code(&episode.episode), Some(1));
    }

    #[test]
    fn test_season_from_code() {
        assert_eq!(season_from_code("S04E10"), Some(4));
        assert_eq!(season_from_code("E01"), None);
        assert_eq!(season_from_code(""), None);
    }
}

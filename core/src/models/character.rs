use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::favorite::{Favoritable, FavoriteDetails};
use super::{id_from_url, ids_from_urls};

/// A character as returned by the `/character` endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Character {
    pub id: u32,
    pub name: String,
    pub status: CharacterStatus,
    pub species: String,
    #[serde(rename = "type", default)]
    pub subtype: String,
    pub gender: Gender,
    pub origin: LocationRef,
    pub location: LocationRef,
    pub image: String,
    /// Urls of the episodes the character appears in.
    #[serde(default)]
    pub episode: Vec<String>,
    pub url: String,
    pub created: DateTime<Utc>,
}

/// Name and url of a location, as embedded in a character.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct LocationRef {
    pub name: String,
    #[serde(default)]
    pub url: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum CharacterStatus {
    Alive,
    Dead,
    #[serde(rename = "unknown", alias = "Unknown")]
    Unknown,
}

impl fmt::Display for CharacterStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CharacterStatus::Alive => write!(f, "Alive"),
            CharacterStatus::Dead => write!(f, "Dead"),
            CharacterStatus::Unknown => write!(f, "Unknown"),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Gender {
    Female,
    Male,
    Genderless,
    #[serde(rename = "unknown", alias = "Unknown")]
    Unknown,
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Gender::Female => write!(f, "Female"),
            Gender::Male => write!(f, "Male"),
            Gender::Genderless => write!(f, "Genderless"),
            Gender::Unknown => write!(f, "Unknown"),
        }
    }
}

impl Character {
    /// Ids of the episodes this character appears in
    pub fn episode_ids(&self) -> Vec<u32> {
        ids_from_urls(&self.episode)
    }

    /// Ids of the origin and current location, skipping unknown ones
    pub fn location_ids(&self) -> Vec<u32> {
        let mut ids = Vec::new();
        for url in [&self.origin.url, &self.location.url] {
            if let Some(id) = id_from_url(url) {
                if !ids.contains(&id) {
                    ids.push(id);
                }
            }
        }
        ids
    }
}

impl Favoritable for Character {
    fn favorite_id(&self) -> u32 {
        self.id
    }

    fn favorite_name(&self) -> &str {
        &self.name
    }

    fn favorite_details(&self) -> FavoriteDetails {
        FavoriteDetails::Character {
            image: Some(self.image.clone()).filter(|s| !s.is_empty()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RICK: &str = r#"{
        "id": 1,
        "name": "Rick Sanchez",
        "status": "Alive",
        "species": "Human",
        "type": "",
        "gender": "Male",
        "origin": { "name": "Earth (C-137)", "url": "https://rickandmortyapi.com/api/location/1" },
        "location": { "name": "Citadel of Ricks", "url": "https://rickandmortyapi.com/api/location/3" },
        "image": "https://rickandmortyapi.com/api/character/avatar/1.jpeg",
        "episode": [
            "https://rickandmortyapi.com/api/episode/1",
            "https://rickandmortyapi.com/api/episode/2"
        ],
        "url": "https://rickandmortyapi.com/api/character/1",
        "created": "2017-11-04T18:48:46.250Z"
    }"#;

    #[test]
    fn test_character_deserialize() {
        let character: Character = serde_json::from_str(RICK).unwrap();
        assert_eq!(character.id, 1);
        assert_eq!(character.status, CharacterStatus::Alive);
        assert_eq!(character.gender, Gender::Male);
        assert_eq!(character.episode_ids(), vec![1, 2]);
        assert_eq!(character.location_ids(), vec![1, 3]);
    }

    #[test]
    fn test_unknown_status_and_location() {
        let json = RICK
            .replace("\"Alive\"", "\"unknown\"")
            .replace("https://rickandmortyapi.com/api/location/1", "");
        let character: Character = serde_json::from_str(&json).unwrap();
        assert_eq!(character.status, CharacterStatus::Unknown);
        assert_eq!(character.location_ids(), vec![3]);
    }

    #[test]
    fn test_favorite_details_carry_image() {
        let character: Character = serde_json::from_str(RICK).unwrap();
        match character.favorite_details() {
            FavoriteDetails::Character { image } => {
                assert_eq!(image.as_deref(), Some("https://rickandmortyapi.com/api/character/avatar/1.jpeg"));
            }
            other => panic!("unexpected details: {:?}", other),
        }
    }
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::favorite::{Favoritable, FavoriteDetails};
use super::ids_from_urls;

/// A location as returned by the `/location` endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Location {
    pub id: u32,
    pub name: String,
    #[serde(rename = "type", default)]
    pub location_type: String,
    #[serde(default)]
    pub dimension: String,
    #[serde(default)]
    pub residents: Vec<String>,
    pub url: String,
    pub created: DateTime<Utc>,
}

impl Location {
    pub fn resident_ids(&self) -> Vec<u32> {
        ids_from_urls(&self.residents)
    }
}

impl Favoritable for Location {
    fn favorite_id(&self) -> u32 {
        self.id
    }

    fn favorite_name(&self) -> &str {
        &self.name
    }

    fn favorite_details(&self) -> FavoriteDetails {
        FavoriteDetails::Location {
            dimension: Some(self.dimension.clone()).filter(|s| !s.is_empty()),
            location_type: Some(self.location_type.clone()).filter(|s| !s.is_empty()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_location_deserialize() {
        let json = r#"{
            "id": 3,
            "name": "Citadel of Ricks",
            "type": "Space station",
            "dimension": "unknown",
            "residents": ["https://rickandmortyapi.com/api/character/8"],
            "url": "https://rickandmortyapi.com/api/location/3",
            "created": "2017-11-10T13:08:13.191Z"
        }"#;
        let location: Location = serde_json::from_str(json).unwrap();
        assert_eq!(location.location_type, "Space station");
        assert_eq!(location.resident_ids(), vec![8]);
    }
}

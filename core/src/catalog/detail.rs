//! Detail views: one entity plus the related entities it links to.
//!
//! Related entities are fetched with a single batch call per kind. Any
//! failing request fails the whole load.

use super::{Catalog, CatalogError};
use crate::models::{ids_from_urls, Character, Episode, Location};

/// A character with the episodes it appears in and its origin/current location.
#[derive(Debug, Clone, PartialEq)]
pub struct CharacterDetail {
    pub character: Character,
    pub episodes: Vec<Episode>,
    pub locations: Vec<Location>,
}

/// An episode with its cast and the locations the cast comes from or lives in.
#[derive(Debug, Clone, PartialEq)]
pub struct EpisodeDetail {
    pub episode: Episode,
    pub characters: Vec<Character>,
    pub locations: Vec<Location>,
}

/// A location with its residents and the episodes they appear in.
#[derive(Debug, Clone, PartialEq)]
pub struct LocationDetail {
    pub location: Location,
    pub residents: Vec<Character>,
    pub episodes: Vec<Episode>,
}

async fn fetch_episodes(catalog: &dyn Catalog, ids: &[u32]) -> Result<Vec<Episode>, CatalogError> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }
    catalog.episodes_by_ids(ids).await
}

async fn fetch_characters(catalog: &dyn Catalog, ids: &[u32]) -> Result<Vec<Character>, CatalogError> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }
    catalog.characters_by_ids(ids).await
}

async fn fetch_locations(catalog: &dyn Catalog, ids: &[u32]) -> Result<Vec<Location>, CatalogError> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }
    catalog.locations_by_ids(ids).await
}

/// Origin and current location ids of every character, first occurrence wins
fn location_ids_of(characters: &[Character]) -> Vec<u32> {
    let mut ids = Vec::new();
    for id in characters.iter().flat_map(Character::location_ids) {
        if !ids.contains(&id) {
            ids.push(id);
        }
    }
    ids
}

impl CharacterDetail {
    pub async fn load(catalog: &dyn Catalog, id: u32) -> Result<Self, CatalogError> {
        let character = catalog.character(id).await?;
        let episodes = fetch_episodes(catalog, &character.episode_ids()).await?;
        let locations = fetch_locations(catalog, &character.location_ids()).await?;
        tracing::debug!(
            "Loaded character {} with {} episodes and {} locations",
            id,
            episodes.len(),
            locations.len()
        );

        Ok(Self {
            character,
            episodes,
            locations,
        })
    }
}

impl EpisodeDetail {
    pub async fn load(catalog: &dyn Catalog, id: u32) -> Result<Self, CatalogError> {
        let episode = catalog.episode(id).await?;
        let characters = fetch_characters(catalog, &episode.character_ids()).await?;
        let locations = fetch_locations(catalog, &location_ids_of(&characters)).await?;
        tracing::debug!(
            "Loaded episode {} with {} characters and {} locations",
            id,
            characters.len(),
            locations.len()
        );

        Ok(Self {
            episode,
            characters,
            locations,
        })
    }
}

impl LocationDetail {
    pub async fn load(catalog: &dyn Catalog, id: u32) -> Result<Self, CatalogError> {
        let location = catalog.location(id).await?;
        let residents = fetch_characters(catalog, &location.resident_ids()).await?;

        let mut episode_ids = ids_from_urls(residents.iter().flat_map(|c| c.episode.iter()));
        episode_ids.sort_unstable();
        let episodes = fetch_episodes(catalog, &episode_ids).await?;
        tracing::debug!(
            "Loaded location {} with {} residents and {} episodes",
            id,
            residents.len(),
            episodes.len()
        );

        Ok(Self {
            location,
            residents,
            episodes,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::fixtures::{self, character_url, episode_url, location_url};
    use crate::testing::{MockCatalog, RecordedCatalogQuery};

    fn seeded() -> MockCatalog {
        let catalog = MockCatalog::new();

        let mut rick = fixtures::character(1, "Rick Sanchez");
        rick.origin.url = location_url(1);
        rick.location.url = location_url(3);
        rick.episode = vec![episode_url(2), episode_url(1)];
        catalog.add_character(rick);

        let mut morty = fixtures::character(2, "Morty Smith");
        morty.origin.url = "https://rickandmortyapi.com/api/location/unknown".to_string();
        morty.location.url = location_url(3);
        morty.episode = vec![episode_url(1)];
        catalog.add_character(morty);

        let mut pilot = fixtures::episode(1, "Pilot");
        pilot.characters = vec![character_url(1), character_url(2)];
        catalog.add_episode(pilot);
        catalog.add_episode(fixtures::episode(2, "Lawnmower Dog"));

        catalog.add_location(fixtures::location(1, "Earth (C-137)"));
        let mut citadel = fixtures::location(3, "Citadel of Ricks");
        citadel.residents = vec![character_url(2), character_url(1)];
        catalog.add_location(citadel);

        catalog
    }

    #[tokio::test]
    async fn test_character_detail() {
        let catalog = seeded();
        let detail = CharacterDetail::load(&catalog, 1).await.unwrap();

        assert_eq!(detail.character.name, "Rick Sanchez");
        let episodes: Vec<u32> = detail.episodes.iter().map(|e| e.id).collect();
        assert_eq!(episodes, vec![2, 1]);
        let locations: Vec<u32> = detail.locations.iter().map(|l| l.id).collect();
        assert_eq!(locations, vec![1, 3]);
    }

    #[tokio::test]
    async fn test_episode_detail_dedupes_locations() {
        let catalog = seeded();
        let detail = EpisodeDetail::load(&catalog, 1).await.unwrap();

        assert_eq!(detail.characters.len(), 2);
        let locations: Vec<u32> = detail.locations.iter().map(|l| l.id).collect();
        assert_eq!(locations, vec![1, 3]);
        assert!(catalog
            .recorded_queries()
            .contains(&RecordedCatalogQuery::LocationsByIds(vec![1, 3])));
    }

    #[tokio::test]
    async fn test_location_detail_sorts_episode_ids() {
        let catalog = seeded();
        let detail = LocationDetail::load(&catalog, 3).await.unwrap();

        assert_eq!(detail.residents.len(), 2);
        assert!(catalog
            .recorded_queries()
            .contains(&RecordedCatalogQuery::EpisodesByIds(vec![1, 2])));
        assert_eq!(detail.episodes.len(), 2);
    }

    #[tokio::test]
    async fn test_no_related_ids_skips_batch_calls() {
        let catalog = MockCatalog::new();
        catalog.add_episode(fixtures::episode(7, "Raising Gazorpazorp"));

        let detail = EpisodeDetail::load(&catalog, 7).await.unwrap();
        assert!(detail.characters.is_empty());
        assert!(detail.locations.is_empty());
        assert_eq!(catalog.recorded_queries(), vec![RecordedCatalogQuery::Episode(7)]);
    }

    #[tokio::test]
    async fn test_missing_entity_fails() {
        let catalog = seeded();
        let result = LocationDetail::load(&catalog, 99).await;
        assert!(matches!(result, Err(CatalogError::NotFound(_))));
    }
}

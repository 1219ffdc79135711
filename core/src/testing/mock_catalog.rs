//! Mock catalog for testing.

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

use super::fixtures;
use crate::catalog::{Catalog, CatalogError, CharacterFilter, EpisodeFilter, LocationFilter};
use crate::models::{Character, Episode, Location, Page};

/// A recorded catalog query for test assertions.
#[derive(Debug, Clone, PartialEq)]
pub enum RecordedCatalogQuery {
    Characters(CharacterFilter),
    Character(u32),
    CharactersByIds(Vec<u32>),
    Episodes(EpisodeFilter),
    Episode(u32),
    EpisodesByIds(Vec<u32>),
    Locations(LocationFilter),
    Location(u32),
    LocationsByIds(Vec<u32>),
}

/// In-memory implementation of the [`Catalog`] trait.
///
/// Listings are filtered by case-insensitive substring and paginated like
/// the real API. Filters that match nothing produce an empty page. Batch
/// fetches return the entities that exist, in the order asked for.
///
/// # Example
///
/// ```rust,ignore
/// use rickdex_core::testing::{fixtures, MockCatalog};
///
/// let catalog = MockCatalog::new();
/// catalog.add_episode(fixtures::episode(1, "Pilot"));
///
/// let page = catalog.episodes(&EpisodeFilter::default()).await?;
/// assert_eq!(page.results.len(), 1);
/// ```
#[derive(Debug)]
pub struct MockCatalog {
    characters: Mutex<BTreeMap<u32, Character>>,
    episodes: Mutex<BTreeMap<u32, Episode>>,
    locations: Mutex<BTreeMap<u32, Location>>,
    page_size: usize,
    /// Recorded queries.
    queries: Mutex<Vec<RecordedCatalogQuery>>,
    /// If set, the next operation will fail with this error.
    next_error: Mutex<Option<CatalogError>>,
}

impl Default for MockCatalog {
    fn default() -> Self {
        Self::new()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn matches(value: &str, wanted: &Option<String>) -> bool {
    match wanted.as_deref().map(str::trim) {
        None | Some("") => true,
        Some(wanted) => value.to_lowercase().contains(&wanted.to_lowercase()),
    }
}

fn matches_exact(value: &str, wanted: &Option<String>) -> bool {
    match wanted.as_deref().map(str::trim) {
        None | Some("") => true,
        Some(wanted) => value.eq_ignore_ascii_case(wanted),
    }
}

impl MockCatalog {
    /// Create a new empty mock catalog with the API's page size of 20.
    pub fn new() -> Self {
        Self::with_page_size(20)
    }

    pub fn with_page_size(page_size: usize) -> Self {
        Self {
            characters: Mutex::new(BTreeMap::new()),
            episodes: Mutex::new(BTreeMap::new()),
            locations: Mutex::new(BTreeMap::new()),
            page_size: page_size.max(1),
            queries: Mutex::new(Vec::new()),
            next_error: Mutex::new(None),
        }
    }

    pub fn add_character(&self, character: Character) {
        lock(&self.characters).insert(character.id, character);
    }

    pub fn add_episode(&self, episode: Episode) {
        lock(&self.episodes).insert(episode.id, episode);
    }

    pub fn add_location(&self, location: Location) {
        lock(&self.locations).insert(location.id, location);
    }

    /// Make the next operation fail with `error`.
    pub fn set_next_error(&self, error: CatalogError) {
        *lock(&self.next_error) = Some(error);
    }

    /// Get all recorded queries.
    pub fn recorded_queries(&self) -> Vec<RecordedCatalogQuery> {
        lock(&self.queries).clone()
    }

    fn begin(&self, query: RecordedCatalogQuery) -> Result<(), CatalogError> {
        lock(&self.queries).push(query);
        match lock(&self.next_error).take() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    fn paginate<T: Clone>(&self, matching: Vec<&T>, page: Option<u32>) -> Page<T> {
        let count = matching.len();
        let pages = count.div_ceil(self.page_size);
        let page = page.filter(|p| *p > 0).unwrap_or(1) as usize;

        let results = matching
            .into_iter()
            .skip((page - 1) * self.page_size)
            .take(self.page_size)
            .cloned()
            .collect();

        fixtures::page(results, page as u32, pages as u32, count as u32)
    }

    fn by_id<T: Clone>(map: &Mutex<BTreeMap<u32, T>>, kind: &str, id: u32) -> Result<T, CatalogError> {
        lock(map)
            .get(&id)
            .cloned()
            .ok_or_else(|| CatalogError::NotFound(format!("{} {}", kind, id)))
    }

    fn by_ids<T: Clone>(map: &Mutex<BTreeMap<u32, T>>, ids: &[u32]) -> Vec<T> {
        let map = lock(map);
        ids.iter().filter_map(|id| map.get(id).cloned()).collect()
    }
}

#[async_trait]
impl Catalog for MockCatalog {
    async fn characters(&self, filter: &CharacterFilter) -> Result<Page<Character>, CatalogError> {
        self.begin(RecordedCatalogQuery::Characters(filter.clone()))?;
        let characters = lock(&self.characters);
        let matching: Vec<&Character> = characters
            .values()
            .filter(|c| matches(&c.name, &filter.name))
            .filter(|c| matches_exact(&c.status.to_string(), &filter.status))
            .filter(|c| matches(&c.species, &filter.species))
            .filter(|c| matches(&c.subtype, &filter.subtype))
            .filter(|c| matches_exact(&c.gender.to_string(), &filter.gender))
            .collect();
        Ok(self.paginate(matching, filter.page))
    }

    async fn character(&self, id: u32) -> Result<Character, CatalogError> {
        self.begin(RecordedCatalogQuery::Character(id))?;
        Self::by_id(&self.characters, "Character", id)
    }

    async fn characters_by_ids(&self, ids: &[u32]) -> Result<Vec<Character>, CatalogError> {
        self.begin(RecordedCatalogQuery::CharactersByIds(ids.to_vec()))?;
        Ok(Self::by_ids(&self.characters, ids))
    }

    async fn episodes(&self, filter: &EpisodeFilter) -> Result<Page<Episode>, CatalogError> {
        self.begin(RecordedCatalogQuery::Episodes(filter.clone()))?;
        let episodes = lock(&self.episodes);
        let matching: Vec<&Episode> = episodes
            .values()
            .filter(|e| matches(&e.name, &filter.name))
            .filter(|e| matches(&e.episode, &filter.episode))
            .collect();
        Ok(self.paginate(matching, filter.page))
    }

    async fn episode(&self, id: u32) -> Result<Episode, CatalogError> {
        self.begin(RecordedCatalogQuery::Episode(id))?;
        Self::by_id(&self.episodes, "Episode", id)
    }

    async fn episodes_by_ids(&self, ids: &[u32]) -> Result<Vec<Episode>, CatalogError> {
        self.begin(RecordedCatalogQuery::EpisodesByIds(ids.to_vec()))?;
        Ok(Self::by_ids(&self.episodes, ids))
    }

    async fn locations(&self, filter: &LocationFilter) -> Result<Page<Location>, CatalogError> {
        self.begin(RecordedCatalogQuery::Locations(filter.clone()))?;
        let locations = lock(&self.locations);
        let matching: Vec<&Location> = locations
            .values()
            .filter(|l| matches(&l.name, &filter.name))
            .filter(|l| matches(&l.location_type, &filter.location_type))
            .filter(|l| matches(&l.dimension, &filter.dimension))
            .collect();
        Ok(self.paginate(matching, filter.page))
    }

    async fn location(&self, id: u32) -> Result<Location, CatalogError> {
        self.begin(RecordedCatalogQuery::Location(id))?;
        Self::by_id(&self.locations, "Location", id)
    }

    async fn locations_by_ids(&self, ids: &[u32]) -> Result<Vec<Location>, CatalogError> {
        self.begin(RecordedCatalogQuery::LocationsByIds(ids.to_vec()))?;
        Ok(Self::by_ids(&self.locations, ids))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_listing_filters_and_pages() {
        let catalog = MockCatalog::with_page_size(2);
        for (id, name) in [(1, "Rick Sanchez"), (2, "Morty Smith"), (3, "Summer Smith"), (4, "Beth Smith")] {
            catalog.add_character(fixtures::character(id, name));
        }

        let filter = CharacterFilter {
            name: Some("smith".to_string()),
            ..CharacterFilter::default()
        };
        let first = catalog.characters(&filter).await.unwrap();
        assert_eq!(first.info.count, 3);
        assert_eq!(first.info.pages, 2);
        assert_eq!(first.results.len(), 2);

        let second = catalog
            .characters(&CharacterFilter { page: Some(2), ..filter })
            .await
            .unwrap();
        assert_eq!(second.results.len(), 1);
        assert!(second.info.next.is_none());
    }

    #[tokio::test]
    async fn test_no_match_is_empty_page() {
        let catalog = MockCatalog::new();
        catalog.add_episode(fixtures::episode(1, "Pilot"));

        let page = catalog
            .episodes(&EpisodeFilter {
                name: Some("zzz".to_string()),
                ..EpisodeFilter::default()
            })
            .await
            .unwrap();
        assert!(page.results.is_empty());
        assert_eq!(page.info.count, 0);
    }

    #[tokio::test]
    async fn test_missing_id_and_injected_error() {
        let catalog = MockCatalog::new();
        catalog.add_location(fixtures::location(1, "Earth (C-137)"));

        assert!(matches!(catalog.location(2).await, Err(CatalogError::NotFound(_))));
        assert_eq!(catalog.locations_by_ids(&[2, 1]).await.unwrap().len(), 1);

        catalog.set_next_error(CatalogError::Api {
            status: 500,
            message: "HTTP error! status: 500".to_string(),
        });
        assert!(catalog.location(1).await.is_err());
        assert!(catalog.location(1).await.is_ok());
        assert_eq!(catalog.recorded_queries().len(), 4);
    }
}

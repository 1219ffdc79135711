//! Testing utilities: a mock catalog and entity fixtures.
//!
//! Lets the favorites store, the detail loaders and the TUI be exercised
//! without network access.
//!
//! # Example
//!
//! ```rust,ignore
//! use rickdex_core::testing::{fixtures, MockCatalog};
//!
//! let catalog = MockCatalog::new();
//! catalog.add_character(fixtures::character(1, "Rick Sanchez"));
//! ```

mod mock_catalog;

pub use mock_catalog::{MockCatalog, RecordedCatalogQuery};

/// Test fixtures and helper functions.
pub mod fixtures {
    use chrono::{DateTime, Utc};

    use crate::models::{
        Character, CharacterStatus, Episode, Gender, Location, LocationRef, Page, PageInfo,
    };

    pub const API_BASE: &str = "https://rickandmortyapi.com/api";

    pub fn character_url(id: u32) -> String {
        format!("{}/character/{}", API_BASE, id)
    }

    pub fn episode_url(id: u32) -> String {
        format!("{}/episode/{}", API_BASE, id)
    }

    pub fn location_url(id: u32) -> String {
        format!("{}/location/{}", API_BASE, id)
    }

    fn created() -> DateTime<Utc> {
        DateTime::from_timestamp(1_509_926_400, 0).unwrap_or_default()
    }

    /// A living human with unknown origin and location, in no episodes.
    pub fn character(id: u32, name: &str) -> Character {
        Character {
            id,
            name: name.to_string(),
            status: CharacterStatus::Alive,
            species: "Human".to_string(),
            subtype: String::new(),
            gender: Gender::Male,
            origin: LocationRef {
                name: "unknown".to_string(),
                url: String::new(),
            },
            location: LocationRef {
                name: "unknown".to_string(),
                url: String::new(),
            },
            image: format!("{}/character/avatar/{}.jpeg", API_BASE, id),
            episode: Vec::new(),
            url: character_url(id),
            created: created(),
        }
    }

    /// An episode of season 1 with no characters.
    pub fn episode(id: u32, name: &str) -> Episode {
        Episode {
            id,
            name: name.to_string(),
            air_date: "December 2, 2013".to_string(),
            episode: format!("S01E{:02}", id),
            characters: Vec::new(),
            url: episode_url(id),
            created: created(),
        }
    }

    /// A planet in dimension C-137 with no residents.
    pub fn location(id: u32, name: &str) -> Location {
        Location {
            id,
            name: name.to_string(),
            location_type: "Planet".to_string(),
            dimension: "Dimension C-137".to_string(),
            residents: Vec::new(),
            url: location_url(id),
            created: created(),
        }
    }

    /// Wrap `results` in a page with consistent info.
    pub fn page<T>(results: Vec<T>, page: u32, pages: u32, count: u32) -> Page<T> {
        Page {
            info: PageInfo {
                count,
                pages,
                next: (page < pages).then(|| format!("?page={}", page + 1)),
                prev: (page > 1).then(|| format!("?page={}", page - 1)),
            },
            results,
        }
    }
}

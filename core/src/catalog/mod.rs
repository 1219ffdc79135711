//! Read-only access to the remote Rick and Morty catalog.
//!
//! [`RickAndMortyClient`] talks to the public REST API; anything that needs
//! catalog data goes through the [`Catalog`] trait so the UI and the detail
//! loaders can run against [`crate::testing::MockCatalog`] in tests.

mod client;
mod detail;
mod filters;
mod pagination;

pub use client::{CatalogConfig, OneOrMany, RickAndMortyClient, DEFAULT_BASE_URL};
pub use detail::{CharacterDetail, EpisodeDetail, LocationDetail};
pub use filters::{CharacterFilter, EpisodeFilter, LocationFilter};
pub use pagination::PageAccumulator;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::{Character, Episode, Location, Page};

/// Errors that can occur when talking to the catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Resource not found (404).
    #[error("Not found: {0}")]
    NotFound(String),

    /// API returned an error status.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Failed to parse response.
    #[error("Failed to parse response: {0}")]
    Parse(String),

    /// Client could not be built from its configuration.
    #[error("Client not configured: {0}")]
    NotConfigured(String),
}

/// The three catalog collections: filtered listing, fetch by id, and batch
/// fetch by ids.
///
/// Listing with filters that match nothing yields an empty page, not an
/// error. Batch fetches always return a list, in the order the catalog
/// returns them, and an empty id list returns an empty list.
#[async_trait]
pub trait Catalog: Send + Sync {
    async fn characters(&self, filter: &CharacterFilter) -> Result<Page<Character>, CatalogError>;

    async fn character(&self, id: u32) -> Result<Character, CatalogError>;

    async fn characters_by_ids(&self, ids: &[u32]) -> Result<Vec<Character>, CatalogError>;

    async fn episodes(&self, filter: &EpisodeFilter) -> Result<Page<Episode>, CatalogError>;

    async fn episode(&self, id: u32) -> Result<Episode, CatalogError>;

    async fn episodes_by_ids(&self, ids: &[u32]) -> Result<Vec<Episode>, CatalogError>;

    async fn locations(&self, filter: &LocationFilter) -> Result<Page<Location>, CatalogError>;

    async fn location(&self, id: u32) -> Result<Location, CatalogError>;

    async fn locations_by_ids(&self, ids: &[u32]) -> Result<Vec<Location>, CatalogError>;
}

//! HTTP client for the public Rick and Morty API.
//!
//! The API needs no key. A batch fetch for a single id answers with a bare
//! object instead of a one-element array; [`OneOrMany`] absorbs that here so
//! callers always get a list.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{Catalog, CatalogError, CharacterFilter, EpisodeFilter, LocationFilter};
use crate::models::{Character, Episode, Location, Page, PageInfo};

pub const DEFAULT_BASE_URL: &str = "https://rickandmortyapi.com/api";

/// Catalog client configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CatalogConfig {
    /// Base URL of the API (default: https://rickandmortyapi.com/api).
    pub base_url: String,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: 30,
        }
    }
}

/// A response that is either a single object or an array of them.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum OneOrMany<T> {
    Many(Vec<T>),
    One(T),
}

impl<T> OneOrMany<T> {
    pub fn into_vec(self) -> Vec<T> {
        match self {
            OneOrMany::Many(items) => items,
            OneOrMany::One(item) => vec![item],
        }
    }
}

/// Error body the API sends with non-success statuses
#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: String,
}

/// Rick and Morty API client.
pub struct RickAndMortyClient {
    client: Client,
    base_url: Url,
}

impl RickAndMortyClient {
    /// Create a new client.
    pub fn new(config: CatalogConfig) -> Result<Self, CatalogError> {
        let base = format!("{}/", config.base_url.trim_end_matches('/'));
        let base_url = Url::parse(&base)
            .map_err(|e| CatalogError::NotConfigured(format!("Invalid base URL '{}': {}", config.base_url, e)))?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { client, base_url })
    }

    /// Full URL for a resource path and query parameters
    pub fn url(&self, path: &str, query: &[(&'static str, String)]) -> Result<Url, CatalogError> {
        let mut url = self
            .base_url
            .join(path)
            .map_err(|e| CatalogError::NotConfigured(format!("Invalid resource path '{}': {}", path, e)))?;
        if !query.is_empty() {
            url.query_pairs_mut()
                .extend_pairs(query.iter().map(|(k, v)| (*k, v.as_str())));
        }
        Ok(url)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, CatalogError> {
        debug!("Catalog GET {}", url);

        let response = self.client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ApiErrorBody>(&body)
                .map(|b| b.error)
                .unwrap_or_else(|_| format!("HTTP error! status: {}", status.as_u16()));
            if status == StatusCode::NOT_FOUND {
                return Err(CatalogError::NotFound(message));
            }
            return Err(CatalogError::Api {
                status: status.as_u16(),
                message,
            });
        }

        response
            .json::<T>()
            .await
            .map_err(|e| CatalogError::Parse(e.to_string()))
    }

    async fn list<T: DeserializeOwned>(
        &self,
        resource: &str,
        query: &[(&'static str, String)],
    ) -> Result<Page<T>, CatalogError> {
        let url = self.url(resource, query)?;
        match self.get_json::<Page<T>>(url).await {
            // The API answers 404 when nothing matches the filters.
            Err(CatalogError::NotFound(message)) => {
                debug!("Empty listing for {}: {}", resource, message);
                Ok(Page {
                    info: PageInfo::default(),
                    results: Vec::new(),
                })
            }
            other => other,
        }
    }

    async fn by_id<T: DeserializeOwned>(&self, resource: &str, id: u32) -> Result<T, CatalogError> {
        let url = self.url(&format!("{}/{}", resource, id), &[])?;
        self.get_json(url).await
    }

    async fn by_ids<T: DeserializeOwned>(&self, resource: &str, ids: &[u32]) -> Result<Vec<T>, CatalogError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let joined = ids.iter().map(u32::to_string).collect::<Vec<_>>().join(",");
        let url = self.url(&format!("{}/{}", resource, joined), &[])?;
        let items: OneOrMany<T> = self.get_json(url).await?;
        Ok(items.into_vec())
    }
}

#[async_trait]
impl Catalog for RickAndMortyClient {
    async fn characters(&self, filter: &CharacterFilter) -> Result<Page<Character>, CatalogError> {
        self.list("character", &filter.query_pairs()).await
    }

    async fn character(&self, id: u32) -> Result<Character, CatalogError> {
        self.by_id("character", id).await
    }

    async fn characters_by_ids(&self, ids: &[u32]) -> Result<Vec<Character>, CatalogError> {
        self.by_ids("character", ids).await
    }

    async fn episodes(&self, filter: &EpisodeFilter) -> Result<Page<Episode>, CatalogError> {
        self.list("episode", &filter.query_pairs()).await
    }

    async fn episode(&self, id: u32) -> Result<Episode, CatalogError> {
        self.by_id("episode", id).await
    }

    async fn episodes_by_ids(&self, ids: &[u32]) -> Result<Vec<Episode>, CatalogError> {
        self.by_ids("episode", ids).await
    }

    async fn locations(&self, filter: &LocationFilter) -> Result<Page<Location>, CatalogError> {
        self.list("location", &filter.query_pairs()).await
    }

    async fn location(&self, id: u32) -> Result<Location, CatalogError> {
        self.by_id("location", id).await
    }

    async fn locations_by_ids(&self, ids: &[u32]) -> Result<Vec<Location>, CatalogError> {
        self.by_ids("location", ids).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::task::JoinHandle;

    const EPISODE_JSON: &str = r#"{"id":1,"name":"Pilot","air_date":"December 2, 2013","episode":"S01E01","characters":[],"url":"https://rickandmortyapi.com/api/episode/1","created":"2017-11-10T12:56:33.798Z"}"#;

    /// Serve one canned HTTP response; resolves to the request line received.
    async fn serve_once(status: &'static str, body: String) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base_url = format!("http://{}/api", listener.local_addr().unwrap());
        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = vec![0u8; 8192];
            let mut received = Vec::new();
            loop {
                let n = socket.read(&mut buf).await.unwrap();
                received.extend_from_slice(&buf[..n]);
                if n == 0 || received.windows(4).any(|w| w == b"\r\n\r\n") {
                    break;
                }
            }
            let response = format!(
                "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status,
                body.len(),
                body
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.ok();
            let request = String::from_utf8_lossy(&received).to_string();
            request.lines().next().unwrap_or_default().to_string()
        });
        (base_url, handle)
    }

    fn client_for(base_url: &str) -> RickAndMortyClient {
        RickAndMortyClient::new(CatalogConfig {
            base_url: base_url.to_string(),
            timeout_secs: 5,
        })
        .unwrap()
    }

    #[test]
    fn test_url_building() {
        let client = client_for("https://rickandmortyapi.com/api/");
        let filter = CharacterFilter {
            name: Some("rick sanchez".to_string()),
            page: Some(2),
            ..CharacterFilter::default()
        };
        let url = client.url("character", &filter.query_pairs()).unwrap();
        assert_eq!(
            url.as_str(),
            "https://rickandmortyapi.com/api/character?name=rick+sanchez&page=2"
        );

        let url = client.url("episode/1,2,3", &[]).unwrap();
        assert_eq!(url.as_str(), "https://rickandmortyapi.com/api/episode/1,2,3");
    }

    #[test]
    fn test_invalid_base_url() {
        let result = RickAndMortyClient::new(CatalogConfig {
            base_url: "not a url".to_string(),
            timeout_secs: 5,
        });
        assert!(matches!(result, Err(CatalogError::NotConfigured(_))));
    }

    #[test]
    fn test_one_or_many() {
        let one: OneOrMany<u32> = serde_json::from_str("7").unwrap();
        assert_eq!(one.into_vec(), vec![7]);
        let many: OneOrMany<u32> = serde_json::from_str("[7, 8]").unwrap();
        assert_eq!(many.into_vec(), vec![7, 8]);
    }

    #[tokio::test]
    async fn test_batch_fetch_single_object_is_normalized() {
        let (base_url, server) = serve_once("200 OK", EPISODE_JSON.to_string()).await;
        let client = client_for(&base_url);

        let episodes = client.episodes_by_ids(&[1]).await.unwrap();
        assert_eq!(episodes.len(), 1);
        assert_eq!(episodes[0].name, "Pilot");

        let request_line = server.await.unwrap();
        assert!(request_line.starts_with("GET /api/episode/1 "), "{}", request_line);
    }

    #[tokio::test]
    async fn test_batch_fetch_array() {
        let body = format!("[{},{}]", EPISODE_JSON, EPISODE_JSON.replace("\"id\":1", "\"id\":2"));
        let (base_url, server) = serve_once("200 OK", body).await;
        let client = client_for(&base_url);

        let episodes = client.episodes_by_ids(&[1, 2]).await.unwrap();
        assert_eq!(episodes.iter().map(|e| e.id).collect::<Vec<_>>(), vec![1, 2]);

        let request_line = server.await.unwrap();
        assert!(request_line.starts_with("GET /api/episode/1,2 "), "{}", request_line);
    }

    #[tokio::test]
    async fn test_batch_fetch_no_ids_makes_no_request() {
        let client = client_for("http://127.0.0.1:9/api");
        assert!(client.characters_by_ids(&[]).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_listing_with_page_info() {
        let body = format!(
            r#"{{"info":{{"count":51,"pages":3,"next":"https://rickandmortyapi.com/api/episode?page=2","prev":null}},"results":[{}]}}"#,
            EPISODE_JSON
        );
        let (base_url, server) = serve_once("200 OK", body).await;
        let client = client_for(&base_url);

        let page = client
            .episodes(&EpisodeFilter {
                episode: Some("S01".to_string()),
                ..EpisodeFilter::default()
            })
            .await
            .unwrap();
        assert_eq!(page.info.pages, 3);
        assert_eq!(page.info.count, 51);
        assert_eq!(page.results.len(), 1);

        let request_line = server.await.unwrap();
        assert!(request_line.starts_with("GET /api/episode?episode=S01 "), "{}", request_line);
    }

    #[tokio::test]
    async fn test_listing_without_matches_is_empty() {
        let (base_url, _server) =
            serve_once("404 Not Found", r#"{"error":"There is nothing here"}"#.to_string()).await;
        let client = client_for(&base_url);

        let page = client
            .characters(&CharacterFilter {
                name: Some("nobody at all".to_string()),
                ..CharacterFilter::default()
            })
            .await
            .unwrap();
        assert!(page.results.is_empty());
        assert_eq!(page.info.pages, 0);
    }

    #[tokio::test]
    async fn test_missing_entity_reports_api_message() {
        let (base_url, _server) =
            serve_once("404 Not Found", r#"{"error":"Character not found"}"#.to_string()).await;
        let client = client_for(&base_url);

        match client.character(9999).await {
            Err(CatalogError::NotFound(message)) => assert_eq!(message, "Character not found"),
            other => panic!("unexpected result: {:?}", other.map(|c| c.id)),
        }
    }

    #[tokio::test]
    async fn test_server_error_without_body() {
        let (base_url, _server) = serve_once("500 Internal Server Error", String::new()).await;
        let client = client_for(&base_url);

        match client.location(1).await {
            Err(CatalogError::Api { status, message }) => {
                assert_eq!(status, 500);
                assert_eq!(message, "HTTP error! status: 500");
            }
            other => panic!("unexpected result: {:?}", other.map(|l| l.id)),
        }
    }

    #[tokio::test]
    async fn test_malformed_body_is_parse_error() {
        let (base_url, _server) = serve_once("200 OK", r#"{"id":"one"}"#.to_string()).await;
        let client = client_for(&base_url);
        assert!(matches!(client.episode(1).await, Err(CatalogError::Parse(_))));
    }
}

//! Client for the remote species API.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{StatusCode, Url};
use serde_json::Value;
use thiserror::Error;
use tokio::time::Instant;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request to species API failed: {0}")]
    Network(#[source] reqwest::Error),

    #[error("species API answered {0}")]
    Status(StatusCode),

    #[error("species API returned a malformed body: {0}")]
    Malformed(#[source] reqwest::Error),

    #[error("species API returned an empty array")]
    EmptyResult,

    #[error("species {0:?} cannot be used as a path segment")]
    InvalidSpecies(String),
}

#[derive(Debug, Error)]
pub enum ClientBuildError {
    #[error("invalid upstream base url {0:?}")]
    InvalidBaseUrl(String),

    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

/// Source of species data.
#[async_trait]
pub trait SpeciesSource: Send + Sync + 'static {
    async fn fetch(&self, species: &str) -> Result<Value, FetchError>;
}

/// FishWatch species API client.
#[derive(Clone)]
pub struct FishWatchClient {
    http: reqwest::Client,
    base_url: Url,
}

impl FishWatchClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ClientBuildError> {
        let base_url = Url::parse(base_url)
            .ok()
            .filter(|url| !url.cannot_be_a_base())
            .ok_or_else(|| ClientBuildError::InvalidBaseUrl(base_url.to_string()))?;
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { http, base_url })
    }

    /// `{base}/api/species/{species}` with the species encoded as a single
    /// path segment, so `/` and `?` in it stay inside the segment.
    pub fn species_url(&self, species: &str) -> Result<Url, FetchError> {
        // dot segments would be dropped and change the path
        if species == "." || species == ".." {
            return Err(FetchError::InvalidSpecies(species.to_string()));
        }

        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| FetchError::InvalidSpecies(species.to_string()))?
            .pop_if_empty()
            .extend(["api", "species", species]);
        Ok(url)
    }
}

#[async_trait]
impl SpeciesSource for FishWatchClient {
    async fn fetch(&self, species: &str) -> Result<Value, FetchError> {
        let url = self.species_url(species)?;
        let start = Instant::now();

        let result = async {
            let response = self.http.get(url.clone()).send().await.map_err(FetchError::Network)?;
            let status = response.status();
            if !status.is_success() {
                return Err(FetchError::Status(status));
            }
            response.json::<Value>().await.map_err(FetchError::Malformed)
        }
        .await;

        tracing::info!(
            species,
            elapsed_ms = start.elapsed().as_millis() as u64,
            ok = result.is_ok(),
            "Request sent to species API"
        );
        result
    }
}

/// True when the upstream answered with a JSON array holding nothing.
pub fn is_empty_result(data: &Value) -> bool {
    matches!(data, Value::Array(items) if items.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn client(base: &str) -> FishWatchClient {
        FishWatchClient::new(base, Duration::from_secs(1)).unwrap()
    }

    #[test]
    fn builds_species_url_without_double_slash() {
        let url = client("https://www.fishwatch.gov/").species_url("red-snapper").unwrap();
        assert_eq!(url.as_str(), "https://www.fishwatch.gov/api/species/red-snapper");

        let url = client("http://mirror.local/proxy").species_url("180").unwrap();
        assert_eq!(url.as_str(), "http://mirror.local/proxy/api/species/180");
    }

    #[test]
    fn species_stays_inside_its_segment() {
        let client = client("https://www.fishwatch.gov");

        let url = client.species_url("../../robots.txt").unwrap();
        assert_eq!(url.path(), "/api/species/..%2F..%2Frobots.txt");

        let url = client.species_url("a?x=1#frag").unwrap();
        assert_eq!(url.path(), "/api/species/a%3Fx=1%23frag");
        assert_eq!(url.query(), None);
        assert_eq!(url.fragment(), None);

        assert!(matches!(client.species_url(".."), Err(FetchError::InvalidSpecies(_))));
        assert!(matches!(client.species_url("."), Err(FetchError::InvalidSpecies(_))));
    }

    #[test]
    fn rejects_unusable_base_url() {
        assert!(matches!(
            FishWatchClient::new("mailto:fish@example.com", Duration::from_secs(1)),
            Err(ClientBuildError::InvalidBaseUrl(_))
        ));
        assert!(FishWatchClient::new("not a url", Duration::from_secs(1)).is_err());
    }

    #[test]
    fn only_empty_arrays_count_as_empty() {
        assert!(is_empty_result(&json!([])));
        assert!(!is_empty_result(&json!([{}])));
        assert!(!is_empty_result(&json!({})));
        assert!(!is_empty_result(&json!(null)));
    }
}

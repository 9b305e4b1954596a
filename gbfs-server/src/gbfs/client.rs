//! GBFS document HTTP client.
//!
//! Performs one outbound fetch per document and hands the body to the
//! decoder. Applies a fixed request timeout and a static identifying
//! User-Agent on every request. Never retries.

use std::future::Future;

use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};

use crate::directory::parse_directory;
use crate::domain::{FeedKind, Provider};

use super::decode::{Document, decode_discovery, decode_feed};
use super::error::{DecodeError, FetchError};
use super::types::{
    NormalizedFeedSet, StationInformationResponse, StationStatusResponse, SystemInformationResponse,
};

/// Identifying User-Agent sent with every request, so provider operators can
/// see who is polling them.
const DEFAULT_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Fixed per-request timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Configuration for the feed client.
#[derive(Debug, Clone)]
pub struct FeedClientConfig {
    /// User-Agent header value.
    pub user_agent: String,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl FeedClientConfig {
    pub fn new() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    /// Set a custom User-Agent.
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Set a custom request timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

impl Default for FeedClientConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Source of provider directories and feed documents.
///
/// The production implementation is [`FeedClient`]; tests substitute
/// in-memory mocks, and [`crate::cache::CachedFeedClient`] wraps any source
/// with memoization.
pub trait FeedSource: Send + Sync {
    /// Fetch and parse the provider directory CSV.
    fn load_directory(
        &self,
        url: &str,
    ) -> impl Future<Output = Result<Vec<Provider>, FetchError>> + Send;

    /// Fetch and normalize a root discovery document.
    fn load_discovery(
        &self,
        url: &str,
    ) -> impl Future<Output = Result<NormalizedFeedSet, FetchError>> + Send;

    /// Fetch a `system_information` document.
    fn load_system_information(
        &self,
        url: &str,
    ) -> impl Future<Output = Result<SystemInformationResponse, FetchError>> + Send;

    /// Fetch a `station_information` document.
    fn load_station_information(
        &self,
        url: &str,
    ) -> impl Future<Output = Result<StationInformationResponse, FetchError>> + Send;

    /// Fetch a `station_status` document.
    fn load_station_status(
        &self,
        url: &str,
    ) -> impl Future<Output = Result<StationStatusResponse, FetchError>> + Send;
}

/// HTTP client for GBFS documents.
#[derive(Debug, Clone)]
pub struct FeedClient {
    http: reqwest::Client,
}

impl FeedClient {
    /// Create a new feed client with the given configuration.
    pub fn new(config: FeedClientConfig) -> Result<Self, FetchError> {
        let mut headers = HeaderMap::new();

        let user_agent =
            HeaderValue::from_str(&config.user_agent).map_err(|_| FetchError::Status {
                status: 0,
                message: "invalid User-Agent value".to_string(),
            })?;
        headers.insert(USER_AGENT, user_agent);

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { http })
    }

    /// Perform one GET and return the body, surfacing non-2xx statuses.
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        let response = self.http.get(url).send().await?;
        let status = response.status();

        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(FetchError::Status {
                status: status.as_u16(),
                message: message.chars().take(500).collect(),
            });
        }

        Ok(response.bytes().await?.to_vec())
    }

    /// Fetch a feed document of the given kind.
    ///
    /// A document whose data payload is empty after a successful decode is
    /// an [`FetchError::EmptyData`] condition, not a decode failure.
    pub async fn load_feed(&self, url: &str, kind: FeedKind) -> Result<Document, FetchError> {
        let body = self.fetch(url).await?;
        let document = decode_feed(&body, kind)?;
        if document.is_empty() {
            return Err(FetchError::EmptyData);
        }
        Ok(document)
    }
}

impl FeedSource for FeedClient {
    async fn load_directory(&self, url: &str) -> Result<Vec<Provider>, FetchError> {
        let body = self.fetch(url).await?;
        let text = String::from_utf8(body).map_err(|e| {
            FetchError::Decode(DecodeError::MalformedCsv {
                message: e.to_string(),
            })
        })?;
        Ok(parse_directory(&text)?)
    }

    async fn load_discovery(&self, url: &str) -> Result<NormalizedFeedSet, FetchError> {
        let body = self.fetch(url).await?;
        let set = decode_discovery(&body)?;
        if set.is_empty() {
            return Err(FetchError::EmptyData);
        }
        Ok(set)
    }

    async fn load_system_information(
        &self,
        url: &str,
    ) -> Result<SystemInformationResponse, FetchError> {
        let body = self.fetch(url).await?;
        let response: SystemInformationResponse =
            serde_json::from_slice(&body).map_err(DecodeError::from_json)?;
        if response.data.is_none() {
            return Err(FetchError::EmptyData);
        }
        Ok(response)
    }

    async fn load_station_information(
        &self,
        url: &str,
    ) -> Result<StationInformationResponse, FetchError> {
        let body = self.fetch(url).await?;
        let response: StationInformationResponse =
            serde_json::from_slice(&body).map_err(DecodeError::from_json)?;
        if response.data.stations.is_empty() {
            return Err(FetchError::EmptyData);
        }
        Ok(response)
    }

    async fn load_station_status(&self, url: &str) -> Result<StationStatusResponse, FetchError> {
        let body = self.fetch(url).await?;
        let response: StationStatusResponse =
            serde_json::from_slice(&body).map_err(DecodeError::from_json)?;
        if response.data.stations.is_empty() {
            return Err(FetchError::EmptyData);
        }
        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_defaults() {
        let config = FeedClientConfig::new();
        assert_eq!(config.timeout_secs, DEFAULT_TIMEOUT_SECS);
        assert!(config.user_agent.starts_with("gbfs-server/"));
    }

    #[test]
    fn config_builder() {
        let config = FeedClientConfig::new()
            .with_user_agent("test-agent")
            .with_timeout(5);
        assert_eq!(config.user_agent, "test-agent");
        assert_eq!(config.timeout_secs, 5);
    }

    #[test]
    fn client_creation() {
        assert!(FeedClient::new(FeedClientConfig::new()).is_ok());
    }

    #[test]
    fn rejects_unprintable_user_agent() {
        let config = FeedClientConfig::new().with_user_agent("bad\nagent");
        assert!(FeedClient::new(config).is_err());
    }
}

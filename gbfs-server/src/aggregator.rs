//! Read-side facade over the store and the cached document client.
//!
//! This is the surface the query-serving layer consumes: provider lookups
//! and feed resolution come straight from the store; station-level data is
//! fetched on demand through the cached client.

use std::sync::Arc;

use crate::cache::CachedFeedClient;
use crate::domain::{FeedDocumentLocation, FeedKind, Provider};
use crate::gbfs::client::FeedSource;
use crate::gbfs::error::FetchError;
use crate::gbfs::types::{StationStatus, SystemInformation};
use crate::store::{Store, StoreError};

/// Errors surfaced to the query layer.
///
/// A resolution failure is a "not found", never a crash; transport errors
/// from the store or the network propagate as themselves.
#[derive(Debug, thiserror::Error)]
pub enum AggregatorError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// The provider's feed set does not publish the requested feed kind.
    #[error("provider {provider:?} publishes no {kind} feed")]
    FeedMissing { provider: String, kind: FeedKind },
}

/// Aggregated read access to providers, feeds, and live station data.
pub struct Aggregator<S> {
    store: Arc<Store>,
    client: CachedFeedClient<S>,
}

impl<S: FeedSource> Aggregator<S> {
    pub fn new(store: Arc<Store>, client: CachedFeedClient<S>) -> Self {
        Self { store, client }
    }

    /// Every registered provider.
    pub fn providers(&self) -> Result<Vec<Provider>, AggregatorError> {
        Ok(self.store.get_providers()?)
    }

    /// One provider by ID.
    pub fn provider(&self, id: &str) -> Result<Provider, AggregatorError> {
        Ok(self.store.get_provider(id)?)
    }

    /// Register or overwrite a provider.
    pub fn add_provider(&self, provider: &Provider) -> Result<(), AggregatorError> {
        Ok(self.store.put_provider(provider)?)
    }

    /// Soft-delete a provider.
    pub fn disable_provider(&self, id: &str) -> Result<(), AggregatorError> {
        Ok(self.store.disable_provider(id)?)
    }

    /// Resolve a feed URL from the persisted projection, with language
    /// fallback.
    pub fn resolve_feed_url(
        &self,
        provider_id: &str,
        kind: FeedKind,
        language: &str,
    ) -> Result<String, AggregatorError> {
        Ok(self.store.resolve_feed_url(provider_id, kind, language)?)
    }

    /// Every persisted feed location for a provider.
    pub fn feeds_for_provider(
        &self,
        provider_id: &str,
    ) -> Result<Vec<FeedDocumentLocation>, AggregatorError> {
        Ok(self.store.list_feeds_for_provider(provider_id)?)
    }

    /// The languages a provider publishes any feed in.
    pub fn languages_for_provider(
        &self,
        provider_id: &str,
    ) -> Result<Vec<String>, AggregatorError> {
        Ok(self.store.list_languages_for_provider(provider_id)?)
    }

    /// Live station statuses for a provider, fetched on demand.
    ///
    /// Resolves the provider's discovery document through the cache, finds
    /// its `station_status` feed in the requested language (with fallback),
    /// and loads that document.
    pub async fn station_status(
        &self,
        provider_id: &str,
        language: &str,
    ) -> Result<Vec<StationStatus>, AggregatorError> {
        let provider = self.store.get_provider(provider_id)?;
        let set = self.client.discovery(&provider.discovery_url).await?;

        let url = set
            .feed_url(FeedKind::StationStatus, language)
            .ok_or_else(|| AggregatorError::FeedMissing {
                provider: provider_id.to_string(),
                kind: FeedKind::StationStatus,
            })?;

        let response = self.client.source().load_station_status(url).await?;
        Ok(response.data.stations)
    }

    /// A provider's system information in the requested language, fetched
    /// on demand through the cache.
    pub async fn system_information(
        &self,
        provider_id: &str,
        language: &str,
    ) -> Result<SystemInformation, AggregatorError> {
        let provider = self.store.get_provider(provider_id)?;
        let set = self.client.discovery(&provider.discovery_url).await?;

        let url = set
            .feed_url(FeedKind::SystemInformation, language)
            .ok_or_else(|| AggregatorError::FeedMissing {
                provider: provider_id.to_string(),
                kind: FeedKind::SystemInformation,
            })?;

        let response = self.client.system_information(url).await?;
        response
            .data
            .clone()
            .ok_or(AggregatorError::Fetch(FetchError::EmptyData))
    }
}

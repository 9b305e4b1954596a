//! Bulk synchronization of the provider directory and feed locations.
//!
//! One pass walks the entire directory sequentially: the per-provider delay
//! is the only concurrency control, there to avoid hammering many
//! independent third-party hosts. There is no checkpoint; a restarted pass
//! reprocesses every provider from scratch.

use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use crate::directory::DEFAULT_DIRECTORY_URL;
use crate::domain::{FeedDocumentLocation, Provider};
use crate::gbfs::client::FeedSource;
use crate::gbfs::error::FetchError;
use crate::store::{Store, StoreError};

/// Delay between providers. Two seconds keeps the aggregate request rate
/// polite across the low thousands of hosts in the directory.
const DEFAULT_PROVIDER_DELAY: Duration = Duration::from_secs(2);

/// Configuration for a synchronization pass.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// URL of the provider directory CSV.
    pub directory_url: String,
    /// Delay after each provider, applied regardless of success.
    pub delay: Duration,
}

impl SyncConfig {
    pub fn new() -> Self {
        Self {
            directory_url: DEFAULT_DIRECTORY_URL.to_string(),
            delay: DEFAULT_PROVIDER_DELAY,
        }
    }

    /// Set a custom directory URL.
    pub fn with_directory_url(mut self, url: impl Into<String>) -> Self {
        self.directory_url = url.into();
        self
    }

    /// Set the per-provider delay.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Outcome of a completed pass.
#[derive(Debug, Default)]
pub struct SyncReport {
    /// Providers found in the directory (all were persisted).
    pub providers: usize,
    /// Feed location keys written.
    pub feeds_written: usize,
    /// Providers whose feed set could not be synchronized this pass.
    pub failed: Vec<String>,
}

/// Errors that abort an entire pass.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    /// The provider directory could not be fetched or parsed.
    #[error("load provider directory: {0}")]
    Directory(#[source] FetchError),

    /// The store failed while persisting the directory. Directory
    /// persistence is all-or-nothing.
    #[error("persist provider directory: {0}")]
    Store(#[from] StoreError),
}

/// Per-provider failures; logged, never fatal to the pass.
#[derive(Debug, thiserror::Error)]
enum ProviderSyncError {
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// The store operations a synchronization pass performs.
///
/// [`Store`] is the production implementation; tests substitute wrappers
/// that inject failures into individual phases, mirroring how
/// [`FeedSource`] is mocked on the network side.
pub trait SyncStore {
    fn put_provider(&self, provider: &Provider) -> Result<(), StoreError>;

    fn clear_feed_locations(&self, provider_id: &str) -> Result<(), StoreError>;

    fn put_feed_locations(
        &self,
        provider_id: &str,
        language: &str,
        locations: &[FeedDocumentLocation],
    ) -> Result<(), StoreError>;
}

impl SyncStore for Store {
    fn put_provider(&self, provider: &Provider) -> Result<(), StoreError> {
        Store::put_provider(self, provider)
    }

    fn clear_feed_locations(&self, provider_id: &str) -> Result<(), StoreError> {
        Store::clear_feed_locations(self, provider_id)
    }

    fn put_feed_locations(
        &self,
        provider_id: &str,
        language: &str,
        locations: &[FeedDocumentLocation],
    ) -> Result<(), StoreError> {
        Store::put_feed_locations(self, provider_id, language, locations)
    }
}

impl<T: SyncStore> SyncStore for Arc<T> {
    fn put_provider(&self, provider: &Provider) -> Result<(), StoreError> {
        (**self).put_provider(provider)
    }

    fn clear_feed_locations(&self, provider_id: &str) -> Result<(), StoreError> {
        (**self).clear_feed_locations(provider_id)
    }

    fn put_feed_locations(
        &self,
        provider_id: &str,
        language: &str,
        locations: &[FeedDocumentLocation],
    ) -> Result<(), StoreError> {
        (**self).put_feed_locations(provider_id, language, locations)
    }
}

/// Drives one full synchronization pass against a feed source and a store.
pub struct Synchronizer<S, T> {
    source: S,
    store: T,
    config: SyncConfig,
}

impl<S: FeedSource, T: SyncStore> Synchronizer<S, T> {
    pub fn new(source: S, store: T, config: SyncConfig) -> Self {
        Self {
            source,
            store,
            config,
        }
    }

    /// Run one pass: fetch the directory, persist every provider, then walk
    /// the providers fetching and persisting their feed sets.
    ///
    /// A single provider's fetch or feed-persistence failure is logged and
    /// the pass continues; only directory fetch/persistence failures abort.
    pub async fn run(&self) -> Result<SyncReport, SyncError> {
        let providers = self
            .source
            .load_directory(&self.config.directory_url)
            .await
            .map_err(SyncError::Directory)?;

        info!(count = providers.len(), "persisting provider directory");
        for provider in &providers {
            self.store.put_provider(provider)?;
        }

        let mut report = SyncReport {
            providers: providers.len(),
            ..SyncReport::default()
        };

        for provider in &providers {
            match self.sync_provider_feeds(&provider.id, &provider.discovery_url).await {
                Ok(written) => {
                    report.feeds_written += written;
                }
                Err(e) => {
                    warn!(
                        provider = %provider.id,
                        url = %provider.discovery_url,
                        error = %e,
                        "failed to synchronize provider feeds, continuing"
                    );
                    report.failed.push(provider.id.clone());
                }
            }

            tokio::time::sleep(self.config.delay).await;
        }

        info!(
            providers = report.providers,
            feeds_written = report.feeds_written,
            failed = report.failed.len(),
            "synchronization pass complete"
        );
        Ok(report)
    }

    /// Fetch one provider's discovery document and replace its stored feed
    /// locations with the freshly discovered set.
    async fn sync_provider_feeds(
        &self,
        provider_id: &str,
        discovery_url: &str,
    ) -> Result<usize, ProviderSyncError> {
        let set = self.source.load_discovery(discovery_url).await?;

        // Replace-all: stale keys from a shrunken feed set must not linger.
        self.store.clear_feed_locations(provider_id)?;

        let mut written = 0;
        for (language, locations) in &set.languages {
            self.store
                .put_feed_locations(provider_id, language, locations)?;
            written += locations.len();
        }
        Ok(written)
    }
}

//! Process-lifetime memoization of document fetches.
//!
//! Discovery documents and system information change rarely, and there are
//! only a few thousand providers, so entries are cached unbounded for the
//! process lifetime. Failures are never cached: a subsequent call always
//! retries the network. Instances are dependency-injected rather than
//! process-global so tests can run isolated copies.

use std::sync::Arc;

use moka::future::Cache as MokaCache;
use tracing::debug;

use crate::gbfs::client::FeedSource;
use crate::gbfs::error::FetchError;
use crate::gbfs::types::{NormalizedFeedSet, SystemInformationResponse};

/// Feed source wrapper that memoizes expensive fetches by URL.
///
/// Two concurrent callers may both miss and both fetch the same URL; the
/// last insert wins, which is harmless since the fetched content is
/// idempotent data.
pub struct CachedFeedClient<S> {
    inner: S,
    discovery: MokaCache<String, Arc<NormalizedFeedSet>>,
    system_information: MokaCache<String, Arc<SystemInformationResponse>>,
}

impl<S: FeedSource> CachedFeedClient<S> {
    /// Wrap a feed source with fresh, empty caches.
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            discovery: MokaCache::builder().build(),
            system_information: MokaCache::builder().build(),
        }
    }

    /// Get the normalized feed set for a discovery URL, fetching on miss.
    pub async fn discovery(&self, url: &str) -> Result<Arc<NormalizedFeedSet>, FetchError> {
        if let Some(hit) = self.discovery.get(url).await {
            return Ok(hit);
        }

        debug!(url, "discovery cache miss");
        let set = Arc::new(self.inner.load_discovery(url).await?);
        self.discovery.insert(url.to_string(), set.clone()).await;
        Ok(set)
    }

    /// Get the system information document at a URL, fetching on miss.
    pub async fn system_information(
        &self,
        url: &str,
    ) -> Result<Arc<SystemInformationResponse>, FetchError> {
        if let Some(hit) = self.system_information.get(url).await {
            return Ok(hit);
        }

        debug!(url, "system information cache miss");
        let response = Arc::new(self.inner.load_system_information(url).await?);
        self.system_information
            .insert(url.to_string(), response.clone())
            .await;
        Ok(response)
    }

    /// Access the underlying source for operations that bypass the cache.
    pub fn source(&self) -> &S {
        &self.inner
    }

    /// Number of cached discovery entries (for monitoring).
    pub fn discovery_entry_count(&self) -> u64 {
        self.discovery.entry_count()
    }

    /// Drop all cached entries.
    pub fn invalidate_all(&self) {
        self.discovery.invalidate_all();
        self.system_information.invalidate_all();
    }
}

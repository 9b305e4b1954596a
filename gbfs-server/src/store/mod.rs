//! Durable key-value projection of providers and feed locations.
//!
//! Key schema (the externally-inspectable, interoperable format):
//!
//! - `provider:<providerID>` → JSON-serialized [`Provider`]
//! - `feed:<providerID>:<feedKind>:<language>` → document URL
//!
//! The backing is an in-process ordered map with an optional JSON snapshot
//! file, loaded at open and rewritten after each mutation. Each key's
//! consistency is independent; no cross-key transaction exists.

mod error;

pub use error::StoreError;

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use crate::domain::{FeedDocumentLocation, FeedKind, Provider};

const PROVIDER_PREFIX: &str = "provider:";
const FEED_PREFIX: &str = "feed:";

fn provider_key(id: &str) -> String {
    format!("{PROVIDER_PREFIX}{id}")
}

fn feed_key(provider_id: &str, kind: FeedKind, language: &str) -> String {
    format!("{FEED_PREFIX}{provider_id}:{kind}:{language}")
}

fn feed_prefix(provider_id: &str) -> String {
    format!("{FEED_PREFIX}{provider_id}:")
}

fn feed_kind_prefix(provider_id: &str, kind: FeedKind) -> String {
    format!("{FEED_PREFIX}{provider_id}:{kind}:")
}

/// Split a feed key into its (kind, language) parts.
///
/// Splits from the right so provider IDs containing `:` still parse; feed
/// kind wire names and language tags never contain a colon.
fn split_feed_key(key: &str) -> Result<(FeedKind, String), StoreError> {
    let unprefixed = key
        .strip_prefix(FEED_PREFIX)
        .ok_or_else(|| StoreError::unavailable(format!("corrupt feed key {key:?}")))?;

    let mut parts = unprefixed.rsplitn(3, ':');
    let language = parts.next();
    let kind = parts.next();
    match (kind, language) {
        (Some(kind), Some(language)) => {
            let kind = kind
                .parse::<FeedKind>()
                .map_err(|e| StoreError::unavailable(format!("corrupt feed key {key:?}: {e}")))?;
            Ok((kind, language.to_string()))
        }
        _ => Err(StoreError::unavailable(format!("corrupt feed key {key:?}"))),
    }
}

/// True when a feed key belongs to exactly this provider. A plain prefix
/// check is not enough: provider IDs may contain `:`, so `p`'s key prefix
/// also matches keys owned by a provider named `p:sub`.
fn feed_key_matches_provider(key: &str, provider_id: &str) -> bool {
    key.strip_prefix(FEED_PREFIX)
        .and_then(|rest| rest.rsplitn(3, ':').nth(2))
        .is_some_and(|owner| owner == provider_id)
}

/// Configuration for the store.
#[derive(Debug, Clone, Default)]
pub struct StoreConfig {
    /// Snapshot file path. `None` keeps the store purely in memory
    /// (useful for tests).
    pub path: Option<PathBuf>,
}

impl StoreConfig {
    /// An in-memory store with no durability.
    pub fn in_memory() -> Self {
        Self { path: None }
    }

    /// A store persisted to a JSON snapshot at the given path.
    pub fn at_path(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
        }
    }
}

/// The key-value projection of providers and feed document locations.
///
/// Safe for concurrent reads and writes; critical sections are short and
/// the snapshot write happens while holding the write lock so readers never
/// observe a half-written state.
#[derive(Debug)]
pub struct Store {
    inner: RwLock<BTreeMap<String, String>>,
    path: Option<PathBuf>,
}

impl Store {
    /// Open the store, loading the snapshot file when one exists.
    pub fn open(config: StoreConfig) -> Result<Self, StoreError> {
        let map = match &config.path {
            Some(path) if path.exists() => {
                let contents =
                    std::fs::read_to_string(path).map_err(StoreError::unavailable)?;
                serde_json::from_str(&contents).map_err(|e| {
                    StoreError::unavailable(format!("corrupt snapshot {path:?}: {e}"))
                })?
            }
            _ => BTreeMap::new(),
        };

        Ok(Self {
            inner: RwLock::new(map),
            path: config.path,
        })
    }

    /// Rewrite the snapshot file. Called with the write lock held.
    fn persist(&self, map: &BTreeMap<String, String>) -> Result<(), StoreError> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent).map_err(StoreError::unavailable)?;
        }

        let json = serde_json::to_string(map).map_err(StoreError::unavailable)?;
        std::fs::write(path, json).map_err(StoreError::unavailable)
    }

    /// The snapshot file path, if the store is durable.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Upsert a provider record, overwriting any previous record wholesale.
    pub fn put_provider(&self, provider: &Provider) -> Result<(), StoreError> {
        let value = serde_json::to_string(provider).map_err(StoreError::unavailable)?;
        let mut map = self.inner.write().map_err(StoreError::unavailable)?;
        map.insert(provider_key(&provider.id), value);
        self.persist(&map)
    }

    /// Fetch a provider by ID.
    pub fn get_provider(&self, id: &str) -> Result<Provider, StoreError> {
        let key = provider_key(id);
        let map = self.inner.read().map_err(StoreError::unavailable)?;
        let value = map.get(&key).ok_or_else(|| StoreError::not_found(&key))?;
        serde_json::from_str(value)
            .map_err(|e| StoreError::unavailable(format!("corrupt provider record {key:?}: {e}")))
    }

    /// Flip a provider's enabled flag off, leaving every other field
    /// untouched. A missing provider is a silent no-op.
    pub fn disable_provider(&self, id: &str) -> Result<(), StoreError> {
        let key = provider_key(id);
        let mut map = self.inner.write().map_err(StoreError::unavailable)?;

        let Some(value) = map.get(&key) else {
            return Ok(());
        };

        let mut provider: Provider = serde_json::from_str(value)
            .map_err(|e| StoreError::unavailable(format!("corrupt provider record {key:?}: {e}")))?;
        provider.enabled = false;

        let value = serde_json::to_string(&provider).map_err(StoreError::unavailable)?;
        map.insert(key, value);
        self.persist(&map)
    }

    /// IDs of every stored provider, in unspecified order.
    pub fn list_provider_ids(&self) -> Result<Vec<String>, StoreError> {
        let map = self.inner.read().map_err(StoreError::unavailable)?;
        Ok(scan_prefix(&map, PROVIDER_PREFIX)
            .map(|(key, _)| key[PROVIDER_PREFIX.len()..].to_string())
            .collect())
    }

    /// Every stored provider record.
    pub fn get_providers(&self) -> Result<Vec<Provider>, StoreError> {
        let map = self.inner.read().map_err(StoreError::unavailable)?;
        scan_prefix(&map, PROVIDER_PREFIX)
            .map(|(key, value)| {
                serde_json::from_str(value).map_err(|e| {
                    StoreError::unavailable(format!("corrupt provider record {key:?}: {e}"))
                })
            })
            .collect()
    }

    /// Write one feed key per location for the given provider and language.
    ///
    /// Additive: keys for feed kinds absent from this call are left
    /// untouched. Callers wanting replace-all semantics clear first with
    /// [`Store::clear_feed_locations`].
    pub fn put_feed_locations(
        &self,
        provider_id: &str,
        language: &str,
        locations: &[FeedDocumentLocation],
    ) -> Result<(), StoreError> {
        let mut map = self.inner.write().map_err(StoreError::unavailable)?;
        for location in locations {
            map.insert(
                feed_key(provider_id, location.kind, language),
                location.url.clone(),
            );
        }
        self.persist(&map)
    }

    /// Remove every feed key for the given provider.
    pub fn clear_feed_locations(&self, provider_id: &str) -> Result<(), StoreError> {
        let mut map = self.inner.write().map_err(StoreError::unavailable)?;
        map.retain(|key, _| !feed_key_matches_provider(key, provider_id));
        self.persist(&map)
    }

    /// Resolve a feed URL by exact (provider, kind, language) match, falling
    /// back to any stored language for that provider and kind. Which
    /// language the fallback picks is unspecified; callers must not depend
    /// on it.
    pub fn resolve_feed_url(
        &self,
        provider_id: &str,
        kind: FeedKind,
        language: &str,
    ) -> Result<String, StoreError> {
        let key = feed_key(provider_id, kind, language);
        let map = self.inner.read().map_err(StoreError::unavailable)?;

        if let Some(url) = map.get(&key) {
            return Ok(url.clone());
        }

        let prefix = feed_kind_prefix(provider_id, kind);
        scan_prefix(&map, &prefix)
            .find(|(key, _)| feed_key_matches_provider(key, provider_id))
            .map(|(_, url)| url.clone())
            .ok_or_else(|| StoreError::not_found(&key))
    }

    /// Every stored feed location for the given provider.
    pub fn list_feeds_for_provider(
        &self,
        provider_id: &str,
    ) -> Result<Vec<FeedDocumentLocation>, StoreError> {
        let prefix = feed_prefix(provider_id);
        let map = self.inner.read().map_err(StoreError::unavailable)?;

        scan_prefix(&map, &prefix)
            .filter(|(key, _)| feed_key_matches_provider(key, provider_id))
            .map(|(key, url)| {
                let (kind, language) = split_feed_key(key)?;
                Ok(FeedDocumentLocation {
                    kind,
                    language,
                    url: url.clone(),
                })
            })
            .collect()
    }

    /// The distinct set of languages in which the provider publishes any
    /// feed, sorted.
    pub fn list_languages_for_provider(
        &self,
        provider_id: &str,
    ) -> Result<Vec<String>, StoreError> {
        let prefix = feed_prefix(provider_id);
        let map = self.inner.read().map_err(StoreError::unavailable)?;

        let mut languages = BTreeSet::new();
        for (key, _) in scan_prefix(&map, &prefix) {
            if !feed_key_matches_provider(key, provider_id) {
                continue;
            }
            let (_, language) = split_feed_key(key)?;
            languages.insert(language);
        }
        Ok(languages.into_iter().collect())
    }
}

/// Iterate entries whose key starts with `prefix`, using the map's ordering
/// to avoid a full scan.
fn scan_prefix<'a>(
    map: &'a BTreeMap<String, String>,
    prefix: &'a str,
) -> impl Iterator<Item = (&'a String, &'a String)> {
    map.range(prefix.to_string()..)
        .take_while(move |(key, _)| key.starts_with(prefix))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn provider(id: &str) -> Provider {
        Provider {
            id: id.to_string(),
            name: format!("{id} system"),
            country_code: "US".to_string(),
            location: "Somewhere, US".to_string(),
            url: format!("https://{id}.example.com"),
            discovery_url: format!("https://{id}.example.com/gbfs.json"),
            enabled: true,
        }
    }

    fn location(kind: FeedKind, language: &str, url: &str) -> FeedDocumentLocation {
        FeedDocumentLocation {
            kind,
            language: language.to_string(),
            url: url.to_string(),
        }
    }

    #[test]
    fn put_get_provider_roundtrip() {
        let store = Store::open(StoreConfig::in_memory()).unwrap();
        let p = provider("citibike");
        store.put_provider(&p).unwrap();
        assert_eq!(store.get_provider("citibike").unwrap(), p);
    }

    #[test]
    fn roundtrip_preserves_empty_fields() {
        let store = Store::open(StoreConfig::in_memory()).unwrap();
        let p = Provider {
            id: "sparse".to_string(),
            enabled: true,
            ..Provider::default()
        };
        store.put_provider(&p).unwrap();

        let back = store.get_provider("sparse").unwrap();
        assert_eq!(back, p);
        assert!(back.name.is_empty());
        assert!(back.country_code.is_empty());
    }

    #[test]
    fn missing_provider_is_not_found() {
        let store = Store::open(StoreConfig::in_memory()).unwrap();
        let err = store.get_provider("ghost").unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn last_write_wins_for_same_id() {
        let store = Store::open(StoreConfig::in_memory()).unwrap();
        store.put_provider(&provider("dup")).unwrap();

        let mut updated = provider("dup");
        updated.name = "renamed".to_string();
        store.put_provider(&updated).unwrap();

        assert_eq!(store.get_provider("dup").unwrap().name, "renamed");
        assert_eq!(store.list_provider_ids().unwrap().len(), 1);
    }

    #[test]
    fn disable_provider_flips_only_the_flag() {
        let store = Store::open(StoreConfig::in_memory()).unwrap();
        let before = provider("citibike");
        store.put_provider(&before).unwrap();

        store.disable_provider("citibike").unwrap();

        let after = store.get_provider("citibike").unwrap();
        assert!(!after.enabled);
        assert_eq!(after.name, before.name);
        assert_eq!(after.discovery_url, before.discovery_url);
    }

    #[test]
    fn disable_missing_provider_is_noop() {
        let store = Store::open(StoreConfig::in_memory()).unwrap();
        store.disable_provider("ghost").unwrap();
        assert!(store.list_provider_ids().unwrap().is_empty());
    }

    #[test]
    fn list_provider_ids_scans_only_provider_keys() {
        let store = Store::open(StoreConfig::in_memory()).unwrap();
        store.put_provider(&provider("a")).unwrap();
        store.put_provider(&provider("b")).unwrap();
        store
            .put_feed_locations(
                "a",
                "en",
                &[location(FeedKind::StationStatus, "en", "https://a/ss.json")],
            )
            .unwrap();

        let mut ids = store.list_provider_ids().unwrap();
        ids.sort();
        assert_eq!(ids, vec!["a", "b"]);
    }

    #[test]
    fn resolve_exact_language_match() {
        let store = Store::open(StoreConfig::in_memory()).unwrap();
        store
            .put_feed_locations(
                "p",
                "en",
                &[location(FeedKind::StationStatus, "en", "https://p/en/ss.json")],
            )
            .unwrap();
        store
            .put_feed_locations(
                "p",
                "fr",
                &[location(FeedKind::StationStatus, "fr", "https://p/fr/ss.json")],
            )
            .unwrap();

        assert_eq!(
            store
                .resolve_feed_url("p", FeedKind::StationStatus, "en")
                .unwrap(),
            "https://p/en/ss.json"
        );
    }

    #[test]
    fn resolve_falls_back_to_any_language() {
        let store = Store::open(StoreConfig::in_memory()).unwrap();
        store
            .put_feed_locations(
                "p",
                "fr",
                &[location(FeedKind::StationStatus, "fr", "https://p/fr/ss.json")],
            )
            .unwrap();

        // "en" is absent; fallback returns some stored URL for this
        // provider and kind, with no guarantee which language.
        let url = store
            .resolve_feed_url("p", FeedKind::StationStatus, "en")
            .unwrap();
        assert_eq!(url, "https://p/fr/ss.json");
    }

    #[test]
    fn resolve_missing_kind_is_not_found() {
        let store = Store::open(StoreConfig::in_memory()).unwrap();
        store
            .put_feed_locations(
                "p",
                "en",
                &[location(FeedKind::StationStatus, "en", "https://p/ss.json")],
            )
            .unwrap();

        let err = store
            .resolve_feed_url("p", FeedKind::SystemAlerts, "en")
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn feeds_and_languages_for_provider() {
        let store = Store::open(StoreConfig::in_memory()).unwrap();
        store
            .put_feed_locations(
                "p",
                "en",
                &[
                    location(FeedKind::SystemInformation, "en", "https://p/en/si.json"),
                    location(FeedKind::StationStatus, "en", "https://p/en/ss.json"),
                ],
            )
            .unwrap();
        store
            .put_feed_locations(
                "p",
                "fr",
                &[location(FeedKind::SystemInformation, "fr", "https://p/fr/si.json")],
            )
            .unwrap();
        store
            .put_feed_locations(
                "q",
                "en",
                &[location(FeedKind::SystemInformation, "en", "https://q/si.json")],
            )
            .unwrap();

        let feeds = store.list_feeds_for_provider("p").unwrap();
        assert_eq!(feeds.len(), 3);
        assert!(feeds.iter().all(|f| !f.url.contains("//q/")));

        let languages = store.list_languages_for_provider("p").unwrap();
        assert_eq!(languages, vec!["en", "fr"]);
    }

    #[test]
    fn put_feed_locations_is_additive() {
        let store = Store::open(StoreConfig::in_memory()).unwrap();
        store
            .put_feed_locations(
                "p",
                "en",
                &[location(FeedKind::SystemInformation, "en", "https://p/si.json")],
            )
            .unwrap();
        store
            .put_feed_locations(
                "p",
                "en",
                &[location(FeedKind::StationStatus, "en", "https://p/ss.json")],
            )
            .unwrap();

        // The earlier kind survives a later additive write.
        assert_eq!(store.list_feeds_for_provider("p").unwrap().len(), 2);
    }

    #[test]
    fn clear_feed_locations_removes_only_that_provider() {
        let store = Store::open(StoreConfig::in_memory()).unwrap();
        store
            .put_feed_locations(
                "p",
                "en",
                &[location(FeedKind::SystemInformation, "en", "https://p/si.json")],
            )
            .unwrap();
        store
            .put_feed_locations(
                "q",
                "en",
                &[location(FeedKind::SystemInformation, "en", "https://q/si.json")],
            )
            .unwrap();

        store.clear_feed_locations("p").unwrap();

        assert!(store.list_feeds_for_provider("p").unwrap().is_empty());
        assert_eq!(store.list_feeds_for_provider("q").unwrap().len(), 1);
    }

    #[test]
    fn snapshot_survives_reopen() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("store.json");

        {
            let store = Store::open(StoreConfig::at_path(&path)).unwrap();
            store.put_provider(&provider("citibike")).unwrap();
            store
                .put_feed_locations(
                    "citibike",
                    "en",
                    &[location(FeedKind::StationStatus, "en", "https://c/ss.json")],
                )
                .unwrap();
        }

        let reopened = Store::open(StoreConfig::at_path(&path)).unwrap();
        assert_eq!(reopened.get_provider("citibike").unwrap().id, "citibike");
        assert_eq!(
            reopened
                .resolve_feed_url("citibike", FeedKind::StationStatus, "en")
                .unwrap(),
            "https://c/ss.json"
        );
    }

    #[test]
    fn snapshot_creates_parent_directories() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("store.json");

        let store = Store::open(StoreConfig::at_path(&path)).unwrap();
        store.put_provider(&provider("p")).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn corrupt_snapshot_is_unavailable() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("store.json");
        std::fs::write(&path, "{broken").unwrap();

        let err = Store::open(StoreConfig::at_path(&path)).unwrap_err();
        assert!(matches!(err, StoreError::Unavailable { .. }));
    }

    #[test]
    fn colon_extended_provider_ids_stay_isolated() {
        let store = Store::open(StoreConfig::in_memory()).unwrap();
        store
            .put_feed_locations(
                "p",
                "en",
                &[location(FeedKind::StationStatus, "en", "https://p/ss.json")],
            )
            .unwrap();
        store
            .put_feed_locations(
                "p:sub",
                "en",
                &[location(FeedKind::StationStatus, "en", "https://sub/ss.json")],
            )
            .unwrap();

        // "p"'s key prefix also covers "p:sub"'s keys; listing must not
        // leak across the boundary in either direction.
        assert_eq!(store.list_feeds_for_provider("p").unwrap().len(), 1);
        assert_eq!(store.list_feeds_for_provider("p:sub").unwrap().len(), 1);
        assert_eq!(store.list_languages_for_provider("p").unwrap(), vec!["en"]);

        store.clear_feed_locations("p").unwrap();

        assert!(store.list_feeds_for_provider("p").unwrap().is_empty());
        assert!(
            store
                .resolve_feed_url("p", FeedKind::StationStatus, "en")
                .unwrap_err()
                .is_not_found()
        );
        assert_eq!(
            store
                .resolve_feed_url("p:sub", FeedKind::StationStatus, "en")
                .unwrap(),
            "https://sub/ss.json"
        );
    }

    #[test]
    fn provider_id_with_colon_roundtrips_through_feed_keys() {
        let store = Store::open(StoreConfig::in_memory()).unwrap();
        store
            .put_feed_locations(
                "odd:id",
                "en",
                &[location(FeedKind::StationStatus, "en", "https://odd/ss.json")],
            )
            .unwrap();

        let feeds = store.list_feeds_for_provider("odd:id").unwrap();
        assert_eq!(feeds.len(), 1);
        assert_eq!(feeds[0].kind, FeedKind::StationStatus);
        assert_eq!(feeds[0].language, "en");
    }
}

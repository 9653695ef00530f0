//! Settings store - in-memory settings backed by a table and an optional cache

use super::cache::SettingsCache;
use super::codec::{ValueCodec, ValueEncoding};
use super::repository::SettingsRepository;
use crate::config::StoreConfig;
use crate::contract::{SettingValue, SettingsApi, SettingsError, SettingsMap};
use async_trait::async_trait;
use parking_lot::RwLock;
use serde::de::DeserializeOwned;
use std::sync::Arc;

/// Typed key-value settings store
///
/// Reads are served from memory only. Writes go to the backing store first;
/// memory and cache are updated only once the write has succeeded.
pub struct SettingsStore {
    config: StoreConfig,
    repo: Arc<dyn SettingsRepository>,
    /// Present only when caching is enabled
    cache: Option<Arc<dyn SettingsCache>>,
    encoding: ValueEncoding,
    settings: RwLock<SettingsMap>,
}

impl SettingsStore {
    /// Create a store and load its settings
    ///
    /// `cache` is ignored unless `config.cache` is set, in which case it is
    /// required.
    pub async fn new(
        config: StoreConfig,
        repo: Arc<dyn SettingsRepository>,
        cache: Option<Arc<dyn SettingsCache>>,
        codec: Arc<dyn ValueCodec>,
    ) -> Result<Self, SettingsError> {
        let cache = match (config.cache, cache) {
            (false, _) => None,
            (true, Some(cache)) => Some(cache),
            (true, None) => {
                return Err(SettingsError::CacheBackend(anyhow::anyhow!(
                    "caching is enabled but no cache backend was provided"
                )))
            }
        };
        let encoding = ValueEncoding::new(config.serialize, codec);

        let store = Self {
            config,
            repo,
            cache,
            encoding,
            settings: RwLock::new(SettingsMap::new()),
        };
        store.reload(false).await?;

        tracing::info!(
            table = %store.config.table,
            cache = store.cache.is_some(),
            serialize = store.config.serialize,
            loaded = store.len(),
            "Settings store initialized"
        );
        Ok(store)
    }

    // ===== Reads =====

    /// Get a setting value
    pub fn get(&self, key: &str) -> Result<SettingValue, SettingsError> {
        self.settings
            .read()
            .get(key)
            .cloned()
            .ok_or_else(|| SettingsError::UnknownSetting {
                key: key.to_string(),
            })
    }

    /// Get a setting and deserialize it into `T`
    pub fn get_as<T: DeserializeOwned>(&self, key: &str) -> Result<T, SettingsError> {
        let value = self.get(key)?;
        serde_json::from_value(value).map_err(|e| {
            SettingsError::codec(format!("setting '{}' has an unexpected type: {}", key, e))
        })
    }

    /// Get a setting value, or `default` when it is not loaded
    pub fn get_or(&self, key: &str, default: SettingValue) -> SettingValue {
        self.settings.read().get(key).cloned().unwrap_or(default)
    }

    /// Snapshot of every loaded setting
    pub fn get_all(&self) -> SettingsMap {
        self.settings.read().clone()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.settings.read().contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.settings.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.settings.read().is_empty()
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    // ===== Writes =====

    /// Create or update a setting
    pub async fn set(&self, key: &str, value: SettingValue) -> Result<(), SettingsError> {
        if key.is_empty() {
            return Err(SettingsError::InvalidKey {
                key: key.to_string(),
            });
        }

        let encoded = self.encoding.encode(key, &value)?;

        let exists = self.contains(key);
        if exists {
            let updated = self
                .repo
                .update(key, &encoded)
                .await
                .map_err(SettingsError::BackingStore)?;
            if updated == 0 {
                // loaded from a cache entry that outlived the row
                tracing::warn!(key = %key, "No row to update; inserting setting instead");
                self.repo
                    .insert(key, &encoded)
                    .await
                    .map_err(SettingsError::BackingStore)?;
            }
        } else {
            self.repo
                .insert(key, &encoded)
                .await
                .map_err(SettingsError::BackingStore)?;
        }

        tracing::debug!(key = %key, updated = exists, "Setting written");

        let snapshot = {
            let mut settings = self.settings.write();
            settings.insert(key.to_string(), value);
            self.cache.as_ref().map(|_| settings.clone())
        };

        if let (Some(cache), Some(snapshot)) = (&self.cache, snapshot) {
            cache
                .delete(&self.config.cache_name)
                .await
                .map_err(SettingsError::CacheBackend)?;
            cache
                .save(&self.config.cache_name, &snapshot, self.config.cache_ttl())
                .await
                .map_err(SettingsError::CacheBackend)?;
        }

        Ok(())
    }

    // ===== Reload =====

    /// Replace the in-memory settings from the cache or the backing store
    ///
    /// A present, non-empty cache entry is trusted unless `force` is set.
    /// Loading from the backing store always refreshes the cache entry.
    pub async fn reload(&self, force: bool) -> Result<(), SettingsError> {
        if !force {
            if let Some(settings) = self.cached_settings().await? {
                tracing::debug!(
                    cache_name = %self.config.cache_name,
                    count = settings.len(),
                    "Settings loaded from cache"
                );
                *self.settings.write() = settings;
                return Ok(());
            }
        }

        let rows = self
            .repo
            .read_all()
            .await
            .map_err(SettingsError::BackingStore)?;

        let mut settings = SettingsMap::with_capacity(rows.len());
        for row in rows {
            let value = self.encoding.decode(&row.key, row.value.as_deref());
            // duplicate keys: last row wins
            settings.insert(row.key, value);
        }

        tracing::debug!(
            table = %self.config.table,
            count = settings.len(),
            force,
            "Settings loaded from backing store"
        );

        let snapshot = self.cache.as_ref().map(|_| settings.clone());
        *self.settings.write() = settings;

        if let (Some(cache), Some(snapshot)) = (&self.cache, snapshot) {
            cache
                .save(&self.config.cache_name, &snapshot, self.config.cache_ttl())
                .await
                .map_err(SettingsError::CacheBackend)?;
        }

        Ok(())
    }

    async fn cached_settings(&self) -> Result<Option<SettingsMap>, SettingsError> {
        let Some(cache) = &self.cache else {
            return Ok(None);
        };

        let cached = cache
            .get(&self.config.cache_name)
            .await
            .map_err(SettingsError::CacheBackend)?;

        Ok(cached.filter(|settings| !settings.is_empty()))
    }
}

#[async_trait]
impl SettingsApi for SettingsStore {
    fn get(&self, key: &str) -> Result<SettingValue, SettingsError> {
        SettingsStore::get(self, key)
    }

    fn get_all(&self) -> SettingsMap {
        SettingsStore::get_all(self)
    }

    async fn set(&self, key: &str, value: SettingValue) -> Result<(), SettingsError> {
        SettingsStore::set(self, key, value).await
    }

    async fn reload(&self, force: bool) -> Result<(), SettingsError> {
        SettingsStore::reload(self, force).await
    }
}

impl std::fmt::Debug for SettingsStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SettingsStore")
            .field("config", &self.config)
            .field("encoding", &self.encoding)
            .field("cache", &self.cache.is_some())
            .field("loaded", &self.len())
            .finish()
    }
}

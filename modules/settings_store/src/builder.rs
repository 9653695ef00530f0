//! Store wiring - resolves configuration into collaborators and builds the store

use crate::config::StoreConfig;
use crate::contract::SettingsError;
use crate::domain::codec::codec_for;
use crate::domain::{SettingsCache, SettingsRepository, SettingsStore, ValueCodec};
use crate::infra::cache::build_cache;
use crate::infra::storage::SeaOrmSettingsRepository;
use sea_orm::DatabaseConnection;
use std::sync::Arc;

/// Builder for [`SettingsStore`]
///
/// Anything not injected is derived from the configuration: the cache from
/// `cache_config` (only when `cache` is enabled) and the codec from `codec`.
pub struct SettingsStoreBuilder {
    config: StoreConfig,
    repo: Arc<dyn SettingsRepository>,
    cache: Option<Arc<dyn SettingsCache>>,
    codec: Option<Arc<dyn ValueCodec>>,
}

impl SettingsStoreBuilder {
    pub fn new(repo: Arc<dyn SettingsRepository>) -> Self {
        Self {
            config: StoreConfig::default(),
            repo,
            cache: None,
            codec: None,
        }
    }

    pub fn config(mut self, config: StoreConfig) -> Self {
        self.config = config;
        self
    }

    /// Use this cache backend instead of building one from `cache_config`
    pub fn cache(mut self, cache: Arc<dyn SettingsCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Use this codec for serialize mode instead of the configured one
    pub fn codec(mut self, codec: Arc<dyn ValueCodec>) -> Self {
        self.codec = Some(codec);
        self
    }

    /// Initialize the cache backend if enabled, then load the settings
    pub async fn build(self) -> Result<SettingsStore, SettingsError> {
        let Self {
            config,
            repo,
            cache,
            codec,
        } = self;

        let cache = match (config.cache, cache) {
            (false, _) => None,
            (true, Some(cache)) => Some(cache),
            (true, None) => Some(
                build_cache(&config.cache_config)
                    .await
                    .map_err(SettingsError::CacheBackend)?,
            ),
        };
        let codec = codec.unwrap_or_else(|| codec_for(config.codec));

        SettingsStore::new(config, repo, cache, codec).await
    }
}

impl SettingsStore {
    pub fn builder(repo: Arc<dyn SettingsRepository>) -> SettingsStoreBuilder {
        SettingsStoreBuilder::new(repo)
    }

    /// Store over a SeaORM connection using the configured table and columns
    pub async fn from_database(
        db: Arc<DatabaseConnection>,
        config: StoreConfig,
    ) -> Result<Self, SettingsError> {
        let repo = Arc::new(SeaOrmSettingsRepository::new(db, &config));
        SettingsStoreBuilder::new(repo).config(config).build().await
    }
}

//! Cache adapters selected by `cache_config`

pub mod dummy;
pub mod file;
pub mod memory;

pub use dummy::DummyCache;
pub use file::FileCache;
pub use memory::MemoryCache;

use crate::config::{CacheAdapter, CacheConfig};
use crate::domain::cache::SettingsCache;
use anyhow::Result;
use std::path::PathBuf;
use std::sync::Arc;

/// Initialize the cache backend described by `config`
pub async fn build_cache(config: &CacheConfig) -> Result<Arc<dyn SettingsCache>> {
    let cache: Arc<dyn SettingsCache> = match config.adapter {
        CacheAdapter::File => {
            let dir = config.path.clone().unwrap_or_else(default_cache_dir);
            Arc::new(FileCache::open(dir).await?)
        }
        CacheAdapter::Memory => Arc::new(MemoryCache::new()),
        CacheAdapter::Dummy => Arc::new(DummyCache),
    };

    tracing::debug!(adapter = ?config.adapter, "Settings cache initialized");
    Ok(cache)
}

fn default_cache_dir() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("settings_store")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::time::Duration;

    #[tokio::test]
    async fn test_build_memory_cache() {
        let config = CacheConfig {
            adapter: CacheAdapter::Memory,
            path: None,
        };
        let cache = build_cache(&config).await.unwrap();

        let settings = [("a".to_string(), json!(1))].into_iter().collect();
        cache.save("settings", &settings, Duration::from_secs(60)).await.unwrap();
        assert_eq!(cache.get("settings").await.unwrap(), Some(settings));
    }

    #[tokio::test]
    async fn test_build_file_cache_creates_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("cache");
        let config = CacheConfig {
            adapter: CacheAdapter::File,
            path: Some(path.clone()),
        };

        build_cache(&config).await.unwrap();
        assert!(path.is_dir());
    }

    #[tokio::test]
    async fn test_build_dummy_cache() {
        let config = CacheConfig {
            adapter: CacheAdapter::Dummy,
            path: None,
        };
        let cache = build_cache(&config).await.unwrap();

        let settings = [("a".to_string(), json!(1))].into_iter().collect();
        cache.save("settings", &settings, Duration::from_secs(60)).await.unwrap();
        assert_eq!(cache.get("settings").await.unwrap(), None);
    }
}

//! File cache adapter
//!
//! Each cache name maps to one JSON file holding the settings and their
//! expiry time. Expired or unreadable files count as a miss and are removed.

use crate::contract::SettingsMap;
use crate::domain::cache::SettingsCache;
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Serialize, Deserialize)]
struct CacheFile {
    /// `None` never expires
    expires_at: Option<DateTime<Utc>>,
    settings: SettingsMap,
}

#[derive(Debug, Clone)]
pub struct FileCache {
    dir: PathBuf,
}

impl FileCache {
    /// Use `dir` for cache files, creating it if needed
    pub async fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        tokio::fs::create_dir_all(&dir)
            .await
            .with_context(|| format!("failed to create cache directory {}", dir.display()))?;
        Ok(Self { dir })
    }

    fn path_for(&self, name: &str) -> PathBuf {
        let file_name: String = name
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
            .collect();
        self.dir.join(format!("{}.json", file_name))
    }

    async fn remove(&self, path: &Path) -> Result<()> {
        match tokio::fs::remove_file(path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e).with_context(|| format!("failed to remove {}", path.display())),
        }
    }
}

#[async_trait]
impl SettingsCache for FileCache {
    async fn get(&self, name: &str) -> Result<Option<SettingsMap>> {
        let path = self.path_for(name);
        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(e).with_context(|| format!("failed to read {}", path.display()))
            }
        };

        let file: CacheFile = match serde_json::from_slice(&bytes) {
            Ok(file) => file,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Discarding corrupt settings cache file");
                self.remove(&path).await?;
                return Ok(None);
            }
        };

        if let Some(expires_at) = file.expires_at {
            if expires_at <= Utc::now() {
                tracing::debug!(path = %path.display(), "Settings cache file expired");
                self.remove(&path).await?;
                return Ok(None);
            }
        }

        Ok(Some(file.settings))
    }

    /// A zero `ttl` keeps the file until it is deleted
    async fn save(&self, name: &str, settings: &SettingsMap, ttl: Duration) -> Result<()> {
        let expires_at = if ttl.is_zero() {
            None
        } else {
            let ttl = chrono::Duration::from_std(ttl).context("cache ttl out of range")?;
            Some(Utc::now() + ttl)
        };

        let file = CacheFile {
            expires_at,
            settings: settings.clone(),
        };
        let bytes = serde_json::to_vec(&file)?;

        // write then rename so readers never see a partial file
        let path = self.path_for(name);
        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, bytes)
            .await
            .with_context(|| format!("failed to write {}", tmp.display()))?;
        tokio::fs::rename(&tmp, &path)
            .await
            .with_context(|| format!("failed to replace {}", path.display()))?;
        Ok(())
    }

    async fn delete(&self, name: &str) -> Result<()> {
        self.remove(&self.path_for(name)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> SettingsMap {
        [
            ("site_name".to_string(), json!("My Site")),
            ("maintenance_mode".to_string(), json!(true)),
            ("prefs".to_string(), json!({"theme": "dark"})),
        ]
        .into_iter()
        .collect()
    }

    #[tokio::test]
    async fn test_save_and_get() {
        let dir = tempfile::tempdir().unwrap();
        let cache = FileCache::open(dir.path()).await.unwrap();

        cache.save("settings", &sample(), Duration::from_secs(300)).await.unwrap();
        assert!(dir.path().join("settings.json").is_file());
        assert_eq!(cache.get("settings").await.unwrap(), Some(sample()));
    }

    #[tokio::test]
    async fn test_missing_entry_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let cache = FileCache::open(dir.path()).await.unwrap();
        assert_eq!(cache.get("settings").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_expired_entry_is_removed() {
        let dir = tempfile::tempdir().unwrap();
        let cache = FileCache::open(dir.path()).await.unwrap();

        let expired = CacheFile {
            expires_at: Some(Utc::now() - chrono::Duration::seconds(1)),
            settings: sample(),
        };
        let path = dir.path().join("settings.json");
        std::fs::write(&path, serde_json::to_vec(&expired).unwrap()).unwrap();

        assert_eq!(cache.get("settings").await.unwrap(), None);
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_corrupt_file_is_a_miss() {
        let dir = tempfile::tempdir().unwrap();
        let cache = FileCache::open(dir.path()).await.unwrap();

        let path = dir.path().join("settings.json");
        std::fs::write(&path, b"not json").unwrap();

        assert_eq!(cache.get("settings").await.unwrap(), None);
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_delete_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let cache = FileCache::open(dir.path()).await.unwrap();

        cache.delete("settings").await.unwrap();
        cache.save("settings", &sample(), Duration::ZERO).await.unwrap();
        cache.delete("settings").await.unwrap();
        cache.delete("settings").await.unwrap();
        assert_eq!(cache.get("settings").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_names_are_sanitized() {
        let dir = tempfile::tempdir().unwrap();
        let cache = FileCache::open(dir.path()).await.unwrap();

        cache.save("../app settings", &sample(), Duration::from_secs(60)).await.unwrap();
        assert!(dir.path().join("___app_settings.json").is_file());
        assert_eq!(cache.get("../app settings").await.unwrap(), Some(sample()));
    }
}

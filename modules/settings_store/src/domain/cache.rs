//! Cache backend trait
//!
//! The cache only ever holds the full decoded settings map under a single
//! name. Adapters live in infra/cache.

use crate::contract::SettingsMap;
use anyhow::Result;
use async_trait::async_trait;
use std::time::Duration;

/// Cache backend for decoded settings
#[async_trait]
pub trait SettingsCache: Send + Sync {
    /// Fetch the cached map, `None` when absent or expired
    async fn get(&self, name: &str) -> Result<Option<SettingsMap>>;

    /// Store `settings` under `name`, replacing any existing entry
    async fn save(&self, name: &str, settings: &SettingsMap, ttl: Duration) -> Result<()>;

    /// Remove the entry; removing a missing entry is not an error
    async fn delete(&self, name: &str) -> Result<()>;
}

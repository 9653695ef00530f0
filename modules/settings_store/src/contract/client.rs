//! Client trait for in-process consumers
//!
//! Host code depends on `Arc<dyn SettingsApi>` instead of the concrete store.

use super::{
    error::SettingsError,
    model::{SettingValue, SettingsMap},
};
use async_trait::async_trait;

/// Settings store API
#[async_trait]
pub trait SettingsApi: Send + Sync {
    /// Get a loaded setting value
    fn get(&self, key: &str) -> Result<SettingValue, SettingsError>;

    /// Snapshot of every loaded setting
    fn get_all(&self) -> SettingsMap;

    /// Create or update a setting
    async fn set(&self, key: &str, value: SettingValue) -> Result<(), SettingsError>;

    /// Repopulate the in-memory settings, bypassing the cache when `force` is set
    async fn reload(&self, force: bool) -> Result<(), SettingsError>;
}

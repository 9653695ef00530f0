use crate::contract::SettingsMap;
use crate::domain::cache::SettingsCache;
use anyhow::Result;
use async_trait::async_trait;
use std::time::Duration;

/// Cache that never holds anything; every reload reads the backing store
#[derive(Debug, Clone, Copy, Default)]
pub struct DummyCache;

#[async_trait]
impl SettingsCache for DummyCache {
    async fn get(&self, _name: &str) -> Result<Option<SettingsMap>> {
        Ok(None)
    }

    async fn save(&self, _name: &str, _settings: &SettingsMap, _ttl: Duration) -> Result<()> {
        Ok(())
    }

    async fn delete(&self, _name: &str) -> Result<()> {
        Ok(())
    }
}

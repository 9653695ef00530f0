use crate::contract::SettingsMap;
use crate::domain::cache::SettingsCache;
use anyhow::Result;
use async_trait::async_trait;
use dashmap::DashMap;
use std::time::Duration;
use tokio::time::Instant;

struct Entry {
    settings: SettingsMap,
    /// `None` never expires
    expires_at: Option<Instant>,
}

impl Entry {
    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|at| at <= now)
    }
}

/// Process-local cache shared by every store holding the same instance
#[derive(Default)]
pub struct MemoryCache {
    entries: DashMap<String, Entry>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remove `name` only if the entry stored now is still expired at `now`
    fn evict_expired(&self, name: &str, now: Instant) {
        self.entries.remove_if(name, |_, entry| entry.is_expired(now));
    }
}

#[async_trait]
impl SettingsCache for MemoryCache {
    async fn get(&self, name: &str) -> Result<Option<SettingsMap>> {
        let now = Instant::now();
        match self.entries.get(name) {
            None => return Ok(None),
            Some(entry) if !entry.is_expired(now) => return Ok(Some(entry.settings.clone())),
            Some(_) => {}
        }

        // the read guard is released here; a save may have replaced the entry since
        self.evict_expired(name, now);
        Ok(None)
    }

    /// A zero `ttl` keeps the entry until it is deleted
    async fn save(&self, name: &str, settings: &SettingsMap, ttl: Duration) -> Result<()> {
        let expires_at = (!ttl.is_zero()).then(|| Instant::now() + ttl);
        self.entries.insert(
            name.to_string(),
            Entry {
                settings: settings.clone(),
                expires_at,
            },
        );
        Ok(())
    }

    async fn delete(&self, name: &str) -> Result<()> {
        self.entries.remove(name);
        Ok(())
    }
}

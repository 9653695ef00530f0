//! In-process backing store
//!
//! Rows are kept in insertion order and duplicate keys are allowed, like a
//! table without a unique constraint.

use crate::contract::RawSetting;
use crate::domain::repository::SettingsRepository;
use anyhow::Result;
use async_trait::async_trait;
use parking_lot::RwLock;

#[derive(Debug, Default)]
pub struct InMemorySettingsRepository {
    rows: RwLock<Vec<RawSetting>>,
}

impl InMemorySettingsRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Repository pre-populated with `rows`
    pub fn with_rows(rows: impl IntoIterator<Item = RawSetting>) -> Self {
        Self {
            rows: RwLock::new(rows.into_iter().collect()),
        }
    }

    /// Snapshot of the stored rows
    pub fn rows(&self) -> Vec<RawSetting> {
        self.rows.read().clone()
    }

    /// Stored value of the last row matching `key`
    pub fn raw_value(&self, key: &str) -> Option<Option<String>> {
        self.rows
            .read()
            .iter()
            .rev()
            .find(|row| row.key == key)
            .map(|row| row.value.clone())
    }

    /// Write a row directly, bypassing any store
    pub fn put_raw(&self, row: RawSetting) {
        let mut rows = self.rows.write();
        match rows.iter_mut().find(|existing| existing.key == row.key) {
            Some(existing) => existing.value = row.value,
            None => rows.push(row),
        }
    }
}

#[async_trait]
impl SettingsRepository for InMemorySettingsRepository {
    async fn read_all(&self) -> Result<Vec<RawSetting>> {
        Ok(self.rows())
    }

    async fn insert(&self, key: &str, value: &str) -> Result<()> {
        self.rows.write().push(RawSetting::new(key, value));
        Ok(())
    }

    async fn update(&self, key: &str, value: &str) -> Result<u64> {
        let mut updated = 0;
        for row in self.rows.write().iter_mut().filter(|row| row.key == key) {
            row.value = Some(value.to_string());
            updated += 1;
        }
        Ok(updated)
    }
}

//! Repository trait for data access
//!
//! This trait defines the interface the store needs from the backing table.
//! Implementations are in infra/storage.

use crate::contract::RawSetting;
use anyhow::Result;
use async_trait::async_trait;

/// Backing store for encoded settings rows
#[async_trait]
pub trait SettingsRepository: Send + Sync {
    /// Read every row of the settings table, in any order
    async fn read_all(&self) -> Result<Vec<RawSetting>>;

    /// Insert a new row
    async fn insert(&self, key: &str, value: &str) -> Result<()>;

    /// Update the value of the row(s) matching `key`, returning the number of rows changed
    async fn update(&self, key: &str, value: &str) -> Result<u64>;
}

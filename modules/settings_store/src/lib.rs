//! Settings Store
//!
//! Typed key-value settings persisted in a two-column table. All settings are
//! loaded into memory on construction, optionally mirrored into a cache, and
//! written through to the table on every `set`.

// Public exports
pub mod contract;
pub use contract::{
    client::SettingsApi, error::SettingsError, RawSetting, SettingValue, SettingsMap,
};

pub mod builder;
pub use builder::SettingsStoreBuilder;

pub mod config;
pub use config::{CacheAdapter, CacheConfig, CodecKind, StoreConfig};

pub mod domain;
pub use domain::{
    JsonCodec, PhpSerializeCodec, SettingsCache, SettingsRepository, SettingsStore, ValueCodec,
};

pub mod infra;
pub use infra::cache::{build_cache, DummyCache, FileCache, MemoryCache};
pub use infra::storage::{InMemorySettingsRepository, SeaOrmSettingsRepository};

//! Configuration for the settings store
//!
//! Values are layered with figment: hard-coded defaults, then the `settings`
//! section of an optional YAML file, then `SETTINGS_STORE_*` environment
//! variables, then explicit per-instance overrides. Unknown keys are ignored.

use crate::contract::SettingsError;
use figment::providers::{Env, Format, Serialized, Yaml};
use figment::Figment;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Section of the base configuration file holding the store options
pub const CONFIG_SECTION: &str = "settings";

/// Prefix of environment variables overriding the base configuration
pub const ENV_PREFIX: &str = "SETTINGS_STORE_";

/// Settings store configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Table holding the settings
    #[serde(default = "default_table")]
    pub table: String,

    /// Column storing the setting name
    #[serde(default = "default_key_field")]
    pub key_field: String,

    /// Column storing the encoded setting value
    #[serde(default = "default_value_field")]
    pub value_field: String,

    /// Mirror loaded settings into a cache backend
    #[serde(default)]
    pub cache: bool,

    /// Cache entry name
    #[serde(default = "default_cache_name")]
    pub cache_name: String,

    /// Cache entry time to live in seconds
    #[serde(default = "default_cache_ttl")]
    pub cache_ttl: u64,

    /// Cache backend selection
    #[serde(default)]
    pub cache_config: CacheConfig,

    /// Store arbitrary values through the codec instead of scalars only
    #[serde(default)]
    pub serialize: bool,

    /// Codec used when `serialize` is enabled
    #[serde(default)]
    pub codec: CodecKind,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            table: default_table(),
            key_field: default_key_field(),
            value_field: default_value_field(),
            cache: false,
            cache_name: default_cache_name(),
            cache_ttl: default_cache_ttl(),
            cache_config: CacheConfig::default(),
            serialize: false,
            codec: CodecKind::default(),
        }
    }
}

impl StoreConfig {
    /// Figment with defaults, the optional base file and the environment merged
    pub fn figment(base: Option<&Path>) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));
        if let Some(path) = base {
            // top-level YAML keys become profiles; the `settings` one is selected below
            figment = figment.merge(Yaml::file(path).nested());
        }
        figment
            .merge(Env::prefixed(ENV_PREFIX).split("__").global())
            .select(CONFIG_SECTION)
    }

    /// Load the configuration, applying `overrides` last
    ///
    /// `overrides` is any serializable map, usually a `serde_json::Value`
    /// object; keys that are not store options are ignored.
    pub fn load<T: Serialize>(base: Option<&Path>, overrides: &T) -> Result<Self, SettingsError> {
        let config = Self::figment(base)
            .merge(Serialized::globals(overrides))
            .extract()?;
        Ok(config)
    }

    /// Load from defaults and environment plus explicit overrides
    pub fn from_overrides<T: Serialize>(overrides: &T) -> Result<Self, SettingsError> {
        Self::load(None, overrides)
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl)
    }
}

/// Cache backend configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Adapter used to store cached settings
    #[serde(default)]
    pub adapter: CacheAdapter,

    /// Directory for the file adapter; defaults to the user cache directory
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            adapter: CacheAdapter::File,
            path: None,
        }
    }
}

/// Available cache adapters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheAdapter {
    /// JSON files on disk
    #[default]
    File,
    /// Process-local memory
    Memory,
    /// Stores nothing
    Dummy,
}

/// Structured value codecs
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CodecKind {
    /// PHP `serialize()` format
    #[default]
    Php,
    /// JSON text
    Json,
}

fn default_table() -> String {
    "settings".to_string()
}

fn default_key_field() -> String {
    "key".to_string()
}

fn default_value_field() -> String {
    "value".to_string()
}

fn default_cache_name() -> String {
    "settings".to_string()
}

fn default_cache_ttl() -> u64 {
    300
}

//! Contract error types for settings store

use thiserror::Error;

/// Settings store errors
#[derive(Debug, Error)]
pub enum SettingsError {
    /// `get` was called with a key that is not loaded
    #[error("Unknown setting: {key}")]
    UnknownSetting {
        /// Requested setting name
        key: String,
    },

    /// `set` was called with an unusable key
    #[error("Invalid setting key '{key}': setting names must be non-empty strings")]
    InvalidKey {
        /// Rejected setting name
        key: String,
    },

    /// Structured value written while serialize mode is off
    #[error("Unsupported value type '{kind}' for setting '{key}': only scalar/null values are permitted when serialization is disabled")]
    UnsupportedValueType {
        /// Setting name
        key: String,
        /// JSON kind of the rejected value
        kind: &'static str,
    },

    /// Value could not be encoded or converted
    #[error("Codec error: {message}")]
    Codec {
        /// Error details
        message: String,
    },

    /// Backing store read or write failed
    #[error("Backing store error: {0}")]
    BackingStore(#[source] anyhow::Error),

    /// Cache backend failed
    #[error("Cache backend error: {0}")]
    CacheBackend(#[source] anyhow::Error),

    /// Configuration could not be loaded
    #[error("Configuration error: {0}")]
    Config(#[from] Box<figment::Error>),
}

impl SettingsError {
    pub fn codec(message: impl Into<String>) -> Self {
        Self::Codec {
            message: message.into(),
        }
    }
}

impl From<figment::Error> for SettingsError {
    fn from(err: figment::Error) -> Self {
        Self::Config(Box::new(err))
    }
}

//! Value encoding for the text value column
//!
//! Without serialize mode only scalars are stored and booleans/null are
//! written as sentinel strings. With serialize mode every value goes through
//! a [`ValueCodec`].

mod json;
mod php;

pub use json::JsonCodec;
pub use php::PhpSerializeCodec;

use crate::config::{CodecKind, StoreConfig};
use crate::contract::model::{is_scalar_or_null, value_kind};
use crate::contract::{SettingValue, SettingsError};
use std::sync::Arc;

/// Stored form of `false` when serialize mode is off
pub const FALSE_SENTINEL: &str = "|false|";
/// Stored form of `true` when serialize mode is off
pub const TRUE_SENTINEL: &str = "|true|";
/// Stored form of `null` when serialize mode is off
pub const NULL_SENTINEL: &str = "|null|";

/// Structured value codec
pub trait ValueCodec: Send + Sync {
    /// Codec name for logging
    fn name(&self) -> &'static str;

    /// Whether stored text should be handed to [`ValueCodec::decode`]
    fn looks_encoded(&self, raw: &str) -> bool;

    fn encode(&self, value: &SettingValue) -> Result<String, SettingsError>;

    fn decode(&self, raw: &str) -> Result<SettingValue, SettingsError>;
}

/// Build the codec selected by configuration
pub fn codec_for(kind: CodecKind) -> Arc<dyn ValueCodec> {
    match kind {
        CodecKind::Php => Arc::new(PhpSerializeCodec),
        CodecKind::Json => Arc::new(JsonCodec),
    }
}

/// Encoding rules applied symmetrically on write and on reload
#[derive(Clone)]
pub struct ValueEncoding {
    serialize: bool,
    codec: Arc<dyn ValueCodec>,
}

impl ValueEncoding {
    pub fn new(serialize: bool, codec: Arc<dyn ValueCodec>) -> Self {
        Self { serialize, codec }
    }

    pub fn from_config(config: &StoreConfig) -> Self {
        Self::new(config.serialize, codec_for(config.codec))
    }

    pub fn serialize(&self) -> bool {
        self.serialize
    }

    /// Reject values that cannot be represented in the current mode
    pub fn check(&self, key: &str, value: &SettingValue) -> Result<(), SettingsError> {
        if !self.serialize && !is_scalar_or_null(value) {
            return Err(SettingsError::UnsupportedValueType {
                key: key.to_string(),
                kind: value_kind(value),
            });
        }
        Ok(())
    }

    /// Encode a value for the value column
    pub fn encode(&self, key: &str, value: &SettingValue) -> Result<String, SettingsError> {
        self.check(key, value)?;

        if self.serialize {
            return self.codec.encode(value);
        }

        Ok(match value {
            SettingValue::Bool(false) => FALSE_SENTINEL.to_string(),
            SettingValue::Bool(true) => TRUE_SENTINEL.to_string(),
            SettingValue::Null => NULL_SENTINEL.to_string(),
            SettingValue::String(s) => s.clone(),
            // arrays and objects were rejected by `check`
            other => other.to_string(),
        })
    }

    /// Decode a stored value; text that is not recognised passes through as a string
    pub fn decode(&self, key: &str, raw: Option<&str>) -> SettingValue {
        let Some(raw) = raw else {
            return SettingValue::Null;
        };

        if !self.serialize {
            return match raw {
                FALSE_SENTINEL => SettingValue::Bool(false),
                TRUE_SENTINEL => SettingValue::Bool(true),
                NULL_SENTINEL => SettingValue::Null,
                other => SettingValue::String(other.to_string()),
            };
        }

        if !self.codec.looks_encoded(raw) {
            return SettingValue::String(raw.to_string());
        }

        match self.codec.decode(raw) {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!(
                    key = %key,
                    codec = self.codec.name(),
                    error = %e,
                    "Stored setting looks encoded but could not be decoded; keeping raw text"
                );
                SettingValue::String(raw.to_string())
            }
        }
    }
}

impl std::fmt::Debug for ValueEncoding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ValueEncoding")
            .field("serialize", &self.serialize)
            .field("codec", &self.codec.name())
            .finish()
    }
}

//! Contract models for settings store
//!
//! Semantic values are plain JSON values; the backing table only ever sees
//! the encoded text carried by [`RawSetting`].

use std::collections::HashMap;

/// Decoded setting value (null, bool, number, string, array or object)
pub type SettingValue = serde_json::Value;

/// In-memory mapping from setting name to decoded value
pub type SettingsMap = HashMap<String, SettingValue>;

/// A row as stored in the backing table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawSetting {
    /// Setting name (key column)
    pub key: String,
    /// Encoded value (value column); `None` when the column is NULL
    pub value: Option<String>,
}

impl RawSetting {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: Some(value.into()),
        }
    }

    /// Row whose value column is NULL
    pub fn null(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: None,
        }
    }
}

/// Human readable name of a value's JSON kind, used in error messages
pub fn value_kind(value: &SettingValue) -> &'static str {
    match value {
        SettingValue::Null => "null",
        SettingValue::Bool(_) => "bool",
        SettingValue::Number(_) => "number",
        SettingValue::String(_) => "string",
        SettingValue::Array(_) => "array",
        SettingValue::Object(_) => "object",
    }
}

/// Whether a value can be stored without serialize mode
pub fn is_scalar_or_null(value: &SettingValue) -> bool {
    !matches!(value, SettingValue::Array(_) | SettingValue::Object(_))
}

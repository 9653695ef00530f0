use super::ValueCodec;
use crate::contract::{SettingValue, SettingsError};

/// Stores values as JSON text
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

impl ValueCodec for JsonCodec {
    fn name(&self) -> &'static str {
        "json"
    }

    fn looks_encoded(&self, raw: &str) -> bool {
        let trimmed = raw.trim();
        match trimmed.as_bytes().first() {
            Some(b'{' | b'[' | b'"' | b'-' | b'0'..=b'9') => true,
            Some(_) => matches!(trimmed, "true" | "false" | "null"),
            None => false,
        }
    }

    fn encode(&self, value: &SettingValue) -> Result<String, SettingsError> {
        serde_json::to_string(value).map_err(|e| SettingsError::codec(e.to_string()))
    }

    fn decode(&self, raw: &str) -> Result<SettingValue, SettingsError> {
        serde_json::from_str(raw).map_err(|e| SettingsError::codec(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_detection() {
        let codec = JsonCodec;
        assert!(codec.looks_encoded(r#"{"a":1}"#));
        assert!(codec.looks_encoded("[1,2]"));
        assert!(codec.looks_encoded("\"quoted\""));
        assert!(codec.looks_encoded("-3.5"));
        assert!(codec.looks_encoded("true"));
        assert!(!codec.looks_encoded("My Site"));
        assert!(!codec.looks_encoded("   "));
    }

    #[test]
    fn test_strings_are_quoted() {
        let codec = JsonCodec;
        let raw = codec.encode(&json!("dark")).unwrap();
        assert_eq!(raw, "\"dark\"");
        assert_eq!(codec.decode(&raw).unwrap(), json!("dark"));
    }
}

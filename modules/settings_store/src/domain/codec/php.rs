//! PHP `serialize()` compatible codec
//!
//! Keeps values written by PHP applications readable. JSON objects are
//! written as `stdClass` objects so that empty objects survive a round trip;
//! PHP arrays read back as JSON arrays when their keys are `0..n` in order
//! and as JSON objects otherwise.

use super::ValueCodec;
use crate::contract::{SettingValue, SettingsError};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Number};
use std::fmt::Write;

static SERIALIZED: Lazy<Result<Regex, regex::Error>> =
    Lazy::new(|| Regex::new(r"(?is)^(?:[isaodb]:.*[;}]|N;)$"));

const MAX_DEPTH: usize = 128;
const STD_CLASS: &str = "stdClass";

#[derive(Debug, Clone, Copy, Default)]
pub struct PhpSerializeCodec;

impl ValueCodec for PhpSerializeCodec {
    fn name(&self) -> &'static str {
        "php"
    }

    fn looks_encoded(&self, raw: &str) -> bool {
        if raw.trim().is_empty() {
            return false;
        }
        match SERIALIZED.as_ref() {
            Ok(re) => re.is_match(raw),
            Err(_) => false,
        }
    }

    fn encode(&self, value: &SettingValue) -> Result<String, SettingsError> {
        let mut out = String::new();
        write_value(&mut out, value).map_err(|e| SettingsError::codec(e.to_string()))?;
        Ok(out)
    }

    fn decode(&self, raw: &str) -> Result<SettingValue, SettingsError> {
        let mut parser = Parser {
            input: raw.as_bytes(),
            pos: 0,
        };
        let value = parser.value(0).map_err(SettingsError::codec)?;
        if parser.pos != parser.input.len() {
            return Err(SettingsError::codec(format!(
                "unexpected trailing data at byte {}",
                parser.pos
            )));
        }
        Ok(value)
    }
}

fn write_value(out: &mut String, value: &SettingValue) -> std::fmt::Result {
    match value {
        SettingValue::Null => out.push_str("N;"),
        SettingValue::Bool(b) => write!(out, "b:{};", u8::from(*b))?,
        SettingValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                write!(out, "i:{};", i)?;
            } else if let Some(u) = n.as_u64() {
                write!(out, "i:{};", u)?;
            } else if let Some(f) = n.as_f64() {
                write!(out, "d:{};", f)?;
            } else {
                write!(out, "d:{};", n)?;
            }
        }
        SettingValue::String(s) => write_string(out, s)?,
        SettingValue::Array(items) => {
            write!(out, "a:{}:{{", items.len())?;
            for (index, item) in items.iter().enumerate() {
                write!(out, "i:{};", index)?;
                write_value(out, item)?;
            }
            out.push('}');
        }
        SettingValue::Object(map) => {
            write!(out, "O:{}:\"{}\":{}:{{", STD_CLASS.len(), STD_CLASS, map.len())?;
            for (key, item) in map {
                write_string(out, key)?;
                write_value(out, item)?;
            }
            out.push('}');
        }
    }
    Ok(())
}

fn write_string(out: &mut String, s: &str) -> std::fmt::Result {
    // length is in bytes, not characters
    write!(out, "s:{}:\"{}\";", s.len(), s)
}

struct Parser<'a> {
    input: &'a [u8],
    pos: usize,
}

enum Key {
    Int(i64),
    Str(String),
}

impl<'a> Parser<'a> {
    fn value(&mut self, depth: usize) -> Result<SettingValue, String> {
        if depth > MAX_DEPTH {
            return Err("nesting too deep".to_string());
        }

        let tag = self.next()?;
        match tag {
            b'N' => {
                self.expect(b';')?;
                Ok(SettingValue::Null)
            }
            b'b' => {
                self.expect(b':')?;
                match self.until(b';')? {
                    "0" => Ok(SettingValue::Bool(false)),
                    "1" => Ok(SettingValue::Bool(true)),
                    other => Err(format!("invalid boolean '{}'", other)),
                }
            }
            b'i' => {
                self.expect(b':')?;
                let text = self.until(b';')?;
                // unsigned values above i64::MAX are accepted as well
                text.parse::<i64>()
                    .map(|i| SettingValue::Number(i.into()))
                    .or_else(|_| text.parse::<u64>().map(|u| SettingValue::Number(u.into())))
                    .map_err(|e| format!("invalid integer '{}': {}", text, e))
            }
            b'd' => {
                self.expect(b':')?;
                let text = self.until(b';')?;
                let f = text
                    .parse::<f64>()
                    .map_err(|e| format!("invalid float '{}': {}", text, e))?;
                Number::from_f64(f)
                    .map(SettingValue::Number)
                    .ok_or_else(|| format!("float '{}' has no JSON representation", text))
            }
            b's' => {
                let s = self.string_body()?;
                self.expect(b';')?;
                Ok(SettingValue::String(s))
            }
            b'a' => {
                self.expect(b':')?;
                let count = self.length(b':')?;
                let entries = self.entries(count, depth)?;
                Ok(array_or_object(entries))
            }
            b'O' => {
                // class name is dropped; properties become an object
                let _class = self.string_body()?;
                self.expect(b':')?;
                let count = self.length(b':')?;
                let entries = self.entries(count, depth)?;
                let map = entries
                    .into_iter()
                    .map(|(key, value)| (property_name(key), value))
                    .collect::<Map<_, _>>();
                Ok(SettingValue::Object(map))
            }
            other => Err(format!(
                "unsupported type tag '{}' at byte {}",
                other as char,
                self.pos - 1
            )),
        }
    }

    fn entries(&mut self, count: usize, depth: usize) -> Result<Vec<(Key, SettingValue)>, String> {
        self.expect(b'{')?;
        let mut entries = Vec::with_capacity(count.min(1024));
        for _ in 0..count {
            let key = match self.value(depth + 1)? {
                SettingValue::Number(n) => match n.as_i64() {
                    Some(i) => Key::Int(i),
                    None => return Err("array keys must be integers or strings".to_string()),
                },
                SettingValue::String(s) => Key::Str(s),
                _ => return Err("array keys must be integers or strings".to_string()),
            };
            let value = self.value(depth + 1)?;
            entries.push((key, value));
        }
        self.expect(b'}')?;
        Ok(entries)
    }

    /// `:<len>:"<bytes>"` following a `s` or `O` tag
    fn string_body(&mut self) -> Result<String, String> {
        self.expect(b':')?;
        let len = self.length(b':')?;
        self.expect(b'"')?;
        let end = self
            .pos
            .checked_add(len)
            .filter(|end| *end <= self.input.len())
            .ok_or_else(|| format!("string length {} exceeds input", len))?;
        let bytes = &self.input[self.pos..end];
        self.pos = end;
        self.expect(b'"')?;
        String::from_utf8(bytes.to_vec()).map_err(|e| format!("string is not valid UTF-8: {}", e))
    }

    fn length(&mut self, terminator: u8) -> Result<usize, String> {
        let text = self.until(terminator)?;
        text.parse::<usize>()
            .map_err(|e| format!("invalid length '{}': {}", text, e))
    }

    /// Text up to (not including) `terminator`; the terminator is consumed
    fn until(&mut self, terminator: u8) -> Result<&'a str, String> {
        let input = self.input;
        let start = self.pos;
        let offset = input[start..]
            .iter()
            .position(|b| *b == terminator)
            .ok_or_else(|| format!("expected '{}' after byte {}", terminator as char, start))?;
        self.pos = start + offset + 1;
        std::str::from_utf8(&input[start..start + offset])
            .map_err(|e| format!("invalid UTF-8: {}", e))
    }

    fn next(&mut self) -> Result<u8, String> {
        let byte = *self
            .input
            .get(self.pos)
            .ok_or_else(|| "unexpected end of input".to_string())?;
        self.pos += 1;
        Ok(byte)
    }

    fn expect(&mut self, expected: u8) -> Result<(), String> {
        let at = self.pos;
        let byte = self.next()?;
        if byte != expected {
            return Err(format!(
                "expected '{}' at byte {}, found '{}'",
                expected as char, at, byte as char
            ));
        }
        Ok(())
    }
}

fn array_or_object(entries: Vec<(Key, SettingValue)>) -> SettingValue {
    let is_list = entries
        .iter()
        .enumerate()
        .all(|(index, (key, _))| matches!(key, Key::Int(i) if usize::try_from(*i).ok() == Some(index)));

    if is_list {
        return SettingValue::Array(entries.into_iter().map(|(_, value)| value).collect());
    }

    let map = entries
        .into_iter()
        .map(|(key, value)| {
            let key = match key {
                Key::Int(i) => i.to_string(),
                Key::Str(s) => s,
            };
            (key, value)
        })
        .collect::<Map<_, _>>();
    SettingValue::Object(map)
}

/// Strip the `\0Class\0` / `\0*\0` visibility prefix of private and protected properties
fn property_name(key: Key) -> String {
    match key {
        Key::Int(i) => i.to_string(),
        Key::Str(s) => match s.strip_prefix('\0') {
            Some(rest) => rest
                .split_once('\0')
                .map(|(_, name)| name.to_string())
                .unwrap_or_else(|| rest.to_string()),
            None => s,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_detection_heuristic() {
        let codec = PhpSerializeCodec;
        assert!(codec.looks_encoded("i:5;"));
        assert!(codec.looks_encoded("s:4:\"dark\";"));
        assert!(codec.looks_encoded("a:0:{}"));
        assert!(codec.looks_encoded("a:1:{i:0;i:1;}"));
        assert!(codec.looks_encoded("O:8:\"stdClass\":0:{}"));
        assert!(codec.looks_encoded("O:8:\"stdClass\":1:{s:1:\"a\";i:1;}"));
        assert!(codec.looks_encoded("D:1.5;"));
        assert!(codec.looks_encoded("b:1;"));
        assert!(codec.looks_encoded("N;"));
        assert!(!codec.looks_encoded("My Site"));
        assert!(!codec.looks_encoded("x:1;"));
        assert!(!codec.looks_encoded("i:5"));
        assert!(!codec.looks_encoded(""));
    }

    #[test]
    fn test_encode_scalars() {
        let codec = PhpSerializeCodec;
        assert_eq!(codec.encode(&json!(null)).unwrap(), "N;");
        assert_eq!(codec.encode(&json!(true)).unwrap(), "b:1;");
        assert_eq!(codec.encode(&json!(false)).unwrap(), "b:0;");
        assert_eq!(codec.encode(&json!(-12)).unwrap(), "i:-12;");
        assert_eq!(codec.encode(&json!(0.5)).unwrap(), "d:0.5;");
        assert_eq!(codec.encode(&json!("dark")).unwrap(), "s:4:\"dark\";");
    }

    #[test]
    fn test_large_unsigned_integers_keep_precision() {
        let codec = PhpSerializeCodec;
        let raw = codec.encode(&json!(u64::MAX)).unwrap();
        assert_eq!(raw, "i:18446744073709551615;");
        assert_eq!(codec.decode(&raw).unwrap(), json!(u64::MAX));
        assert_eq!(codec.decode("i:-9223372036854775808;").unwrap(), json!(i64::MIN));
        assert!(codec.decode("i:18446744073709551616;").is_err());
    }

    #[test]
    fn test_string_length_counts_bytes() {
        let codec = PhpSerializeCodec;
        let raw = codec.encode(&json!("café")).unwrap();
        assert_eq!(raw, "s:5:\"café\";");
        assert_eq!(codec.decode(&raw).unwrap(), json!("café"));
    }

    #[test]
    fn test_strings_may_contain_delimiters() {
        let codec = PhpSerializeCodec;
        let value = json!("a\";b:{}");
        let raw = codec.encode(&value).unwrap();
        assert_eq!(codec.decode(&raw).unwrap(), value);
    }

    #[test]
    fn test_encode_collections() {
        let codec = PhpSerializeCodec;
        assert_eq!(
            codec.encode(&json!([1, "x"])).unwrap(),
            "a:2:{i:0;i:1;i:1;s:1:\"x\";}"
        );
        assert_eq!(
            codec.encode(&json!({"theme": "dark"})).unwrap(),
            "O:8:\"stdClass\":1:{s:5:\"theme\";s:4:\"dark\";}"
        );
    }

    #[test]
    fn test_decode_php_written_arrays() {
        let codec = PhpSerializeCodec;

        // serialize(array('theme' => 'dark', 'count' => 3))
        let assoc = "a:2:{s:5:\"theme\";s:4:\"dark\";s:5:\"count\";i:3;}";
        assert_eq!(codec.decode(assoc).unwrap(), json!({"theme": "dark", "count": 3}));

        // serialize(array(1 => 'b', 0 => 'a')) is not a list
        let sparse = "a:2:{i:1;s:1:\"b\";i:0;s:1:\"a\";}";
        assert_eq!(codec.decode(sparse).unwrap(), json!({"1": "b", "0": "a"}));

        assert_eq!(codec.decode("a:0:{}").unwrap(), json!([]));
    }

    #[test]
    fn test_decode_object_properties() {
        let codec = PhpSerializeCodec;
        let raw = "O:3:\"Foo\":2:{s:4:\"\0*\0a\";i:1;s:6:\"\0Foo\0b\";i:2;}";
        assert_eq!(codec.decode(raw).unwrap(), json!({"a": 1, "b": 2}));
    }

    #[test]
    fn test_nested_round_trip() {
        let codec = PhpSerializeCodec;
        let value = json!({
            "theme": "dark",
            "count": 3,
            "ratio": 0.25,
            "tags": ["a", "b"],
            "empty_list": [],
            "empty_object": {},
            "nested": {"enabled": true, "limit": null}
        });
        let raw = codec.encode(&value).unwrap();
        assert_eq!(codec.decode(&raw).unwrap(), value);
    }

    #[test]
    fn test_decode_errors() {
        let codec = PhpSerializeCodec;
        assert!(codec.decode("s:10:\"short\";").is_err());
        assert!(codec.decode("i:abc;").is_err());
        assert!(codec.decode("b:2;").is_err());
        assert!(codec.decode("d:NAN;").is_err());
        assert!(codec.decode("i:1;extra").is_err());
        assert!(codec.decode("r:1;").is_err());
        assert!(codec.decode("a:1:{i:0;").is_err());
    }
}

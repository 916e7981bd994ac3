//! Attribute codecs
//!
//! Each declared node attribute pairs a decoder (serialized HTML attribute
//! to typed value) with an encoder (typed value to serialized attribute).

use serde_json::{Map, Value};

/// HTML attribute value to typed value
pub type DecodeFn = fn(&str) -> Option<Value>;

/// Typed value to HTML attribute value
pub type EncodeFn = fn(&Value) -> Option<String>;

/// Name of the free-form JSON attribute bag carried by component nodes
pub const PROPS_ATTR: &str = "props";

/// Codec for one node attribute
#[derive(Debug, Clone)]
pub struct AttributeCodec {
    name: String,
    html_name: String,
    default: Value,
    decode: DecodeFn,
    encode: EncodeFn,
}

impl AttributeCodec {
    pub fn new(name: impl Into<String>, decode: DecodeFn, encode: EncodeFn) -> Self {
        let name = name.into();
        Self {
            html_name: name.clone(),
            name,
            default: Value::Null,
            decode,
            encode,
        }
    }

    pub fn string(name: impl Into<String>) -> Self {
        Self::new(name, decode_string, encode_string)
    }

    pub fn boolean(name: impl Into<String>) -> Self {
        Self::new(name, decode_boolean, encode_scalar).with_default(Value::Bool(false))
    }

    pub fn integer(name: impl Into<String>) -> Self {
        Self::new(name, decode_integer, encode_scalar)
    }

    pub fn json(name: impl Into<String>) -> Self {
        Self::new(name, decode_json, encode_json)
    }

    /// The `props` bag, serialized as JSON in `data-props`
    pub fn props() -> Self {
        Self::json(PROPS_ATTR)
            .with_html_name("data-props")
            .with_default(Value::Object(Map::new()))
    }

    pub fn with_default(mut self, default: Value) -> Self {
        self.default = default;
        self
    }

    pub fn with_html_name(mut self, html_name: impl Into<String>) -> Self {
        self.html_name = html_name.into();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn html_name(&self) -> &str {
        &self.html_name
    }

    pub fn default_value(&self) -> &Value {
        &self.default
    }

    /// Decode a raw attribute; missing or undecodable values yield the default
    pub fn decode(&self, raw: Option<&str>) -> Value {
        raw.and_then(self.decode)
            .unwrap_or_else(|| self.default.clone())
    }

    /// Encode a value; `None` when it should not be rendered
    pub fn encode(&self, value: Option<&Value>) -> Option<String> {
        match value {
            None | Some(Value::Null) => None,
            Some(v) if *v == self.default => None,
            Some(v) => (self.encode)(v),
        }
    }
}

fn decode_string(raw: &str) -> Option<Value> {
    Some(Value::String(raw.to_string()))
}

fn encode_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        other => encode_scalar(other),
    }
}

fn decode_boolean(raw: &str) -> Option<Value> {
    match raw {
        "" | "true" => Some(Value::Bool(true)),
        "false" => Some(Value::Bool(false)),
        _ => None,
    }
}

fn decode_integer(raw: &str) -> Option<Value> {
    raw.trim().parse::<i64>().ok().map(Value::from)
}

fn encode_scalar(value: &Value) -> Option<String> {
    match value {
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::String(s) => Some(s.clone()),
        _ => None,
    }
}

fn decode_json(raw: &str) -> Option<Value> {
    serde_json::from_str(raw).ok()
}

fn encode_json(value: &Value) -> Option<String> {
    serde_json::to_string(value).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_string_codec() {
        let codec = AttributeCodec::string("alt");
        assert_eq!(codec.decode(Some("Logo")), json!("Logo"));
        assert_eq!(codec.decode(None), Value::Null);
        assert_eq!(codec.encode(Some(&json!("Logo"))), Some("Logo".to_string()));
        assert_eq!(codec.encode(Some(&Value::Null)), None);
    }

    #[test]
    fn test_boolean_codec() {
        let codec = AttributeCodec::boolean("open");
        assert_eq!(codec.decode(Some("")), json!(true));
        assert_eq!(codec.decode(Some("nope")), json!(false));
        assert_eq!(codec.encode(Some(&json!(true))), Some("true".to_string()));
        // Default is not rendered
        assert_eq!(codec.encode(Some(&json!(false))), None);
    }

    #[test]
    fn test_integer_codec() {
        let codec = AttributeCodec::integer("level");
        assert_eq!(codec.decode(Some(" 3")), json!(3));
        assert_eq!(codec.decode(Some("three")), Value::Null);
        assert_eq!(codec.encode(Some(&json!(3))), Some("3".to_string()));
    }

    #[test]
    fn test_props_codec() {
        let codec = AttributeCodec::props();
        assert_eq!(codec.html_name(), "data-props");
        assert_eq!(
            codec.decode(Some(r#"{"color":"primary","size":2}"#)),
            json!({"color": "primary", "size": 2})
        );
        assert_eq!(codec.decode(Some("{broken")), json!({}));
        assert_eq!(codec.encode(Some(&json!({}))), None);
        assert_eq!(
            codec.encode(Some(&json!({"color": "primary"}))),
            Some(r#"{"color":"primary"}"#.to_string())
        );
    }
}

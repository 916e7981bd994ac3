//! Built-in Studio node extensions
//!
//! Callouts, MDC block and inline components, styled spans, data bindings,
//! the frontmatter atom and images.

use crate::codec::AttributeCodec;
use crate::frontmatter::{FRONTMATTER_ATTR, FRONTMATTER_TYPE};
use crate::schema::{NodeClass, NodeSpec, ParseRule, Schema, SchemaError};
use serde_json::{Map, Value};
use studio_tiptap::Attributes;

/// Callout flavours accepted by the `callout` node
pub const CALLOUT_TYPES: &[&str] = &["note", "tip", "warning", "caution", "important"];

pub const CALLOUT_TYPE: &str = "callout";
pub const ELEMENT_TYPE: &str = "element";
pub const INLINE_ELEMENT_TYPE: &str = "inline-element";
pub const SPAN_STYLE_TYPE: &str = "span-style";
pub const BINDING_TYPE: &str = "binding";
pub const IMAGE_TYPE: &str = "image";

impl Schema {
    /// Schema with every Studio extension registered
    pub fn studio() -> Result<Self, SchemaError> {
        let mut schema = Schema::new();
        for spec in studio_specs()? {
            schema.register(spec)?;
        }
        Ok(schema)
    }
}

fn studio_specs() -> Result<Vec<NodeSpec>, SchemaError> {
    Ok(vec![
        NodeSpec::builder(CALLOUT_TYPE, NodeClass::Block)
            .parse_rule(ParseRule::tag("div").with_attribute("data-callout"))
            .attribute(
                AttributeCodec::string("type")
                    .with_html_name("data-type")
                    .with_default(Value::String("note".to_string())),
            )
            .attribute(AttributeCodec::props())
            .block_rule(r"^::(note|tip|warning|caution|important)\s$", |caps| {
                string_attr("type", caps.get(1).map(|m| m.as_str()))
            })
            .build()?,
        NodeSpec::builder(ELEMENT_TYPE, NodeClass::Block)
            .parse_rule(ParseRule::tag("div").with_attribute("data-element"))
            .attribute(AttributeCodec::string("tag").with_html_name("data-tag"))
            .attribute(AttributeCodec::props())
            .block_rule(r"^::([a-zA-Z][\w-]*)\s$", |caps| {
                string_attr("tag", caps.get(1).map(|m| m.as_str()))
            })
            .build()?,
        NodeSpec::builder(INLINE_ELEMENT_TYPE, NodeClass::Inline)
            .parse_rule(ParseRule::tag("span").with_attribute("data-inline-element"))
            .attribute(AttributeCodec::string("tag").with_html_name("data-tag"))
            .attribute(AttributeCodec::props())
            .inline_rule(
                r"(?:^|\s)(:([a-zA-Z][\w-]*)\[([^\]]*)\])\s$",
                |caps| string_attr("tag", caps.get(2).map(|m| m.as_str())),
                Some(3),
            )
            .build()?,
        NodeSpec::builder(SPAN_STYLE_TYPE, NodeClass::Inline)
            .parse_rule(ParseRule::tag("span").with_attribute("data-span-style"))
            .attribute(AttributeCodec::props())
            .inline_rule(
                r"(?:^|\s)(\[([^\]]+)\]\{([^}]*)\})\s$",
                |caps| {
                    let props = parse_mdc_attributes(caps.get(3).map_or("", |m| m.as_str()));
                    let mut attrs = Attributes::new();
                    attrs.insert("props".to_string(), Value::Object(props));
                    attrs
                },
                Some(2),
            )
            .build()?,
        NodeSpec::builder(BINDING_TYPE, NodeClass::Atom)
            .parse_rule(ParseRule::tag("span").with_attribute("data-binding"))
            .attribute(AttributeCodec::string("value").with_html_name("data-value"))
            .build()?,
        NodeSpec::builder(FRONTMATTER_TYPE, NodeClass::Atom)
            .parse_rule(ParseRule::tag("div").with_attribute("data-frontmatter"))
            .attribute(
                AttributeCodec::json(FRONTMATTER_ATTR)
                    .with_html_name("data-frontmatter")
                    .with_default(Value::Object(Map::new())),
            )
            .build()?,
        NodeSpec::builder(IMAGE_TYPE, NodeClass::Atom)
            .parse_rule(ParseRule::tag("img"))
            .attribute(AttributeCodec::string("src"))
            .attribute(AttributeCodec::string("alt"))
            .attribute(AttributeCodec::string("title"))
            .attribute(AttributeCodec::props())
            .build()?,
    ])
}

fn string_attr(name: &str, value: Option<&str>) -> Attributes {
    let mut attrs = Attributes::new();
    if let Some(value) = value {
        attrs.insert(name.to_string(), Value::String(value.to_string()));
    }
    attrs
}

/// Parse an MDC attribute list such as `.big #intro color="dark red" bold`
///
/// Classes accumulate into `class`; bare keys become `true`.
pub fn parse_mdc_attributes(input: &str) -> Map<String, Value> {
    let mut attrs = Map::new();
    let mut classes: Vec<String> = Vec::new();

    for token in tokenize(input) {
        if let Some(class) = token.strip_prefix('.') {
            if !class.is_empty() {
                classes.push(class.to_string());
            }
        } else if let Some(id) = token.strip_prefix('#') {
            if !id.is_empty() {
                attrs.insert("id".to_string(), Value::String(id.to_string()));
            }
        } else if let Some((key, value)) = token.split_once('=') {
            if !key.is_empty() {
                attrs.insert(key.to_string(), Value::String(unquote(value).to_string()));
            }
        } else {
            attrs.insert(token, Value::Bool(true));
        }
    }

    if !classes.is_empty() {
        attrs.insert("class".to_string(), Value::String(classes.join(" ")));
    }
    attrs
}

/// Split on whitespace outside of quotes
fn tokenize(input: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut quote: Option<char> = None;

    for ch in input.chars() {
        match quote {
            Some(q) => {
                current.push(ch);
                if ch == q {
                    quote = None;
                }
            }
            None if ch == '"' || ch == '\'' => {
                quote = Some(ch);
                current.push(ch);
            }
            None if ch.is_whitespace() => {
                if !current.is_empty() {
                    tokens.push(std::mem::take(&mut current));
                }
            }
            None => current.push(ch),
        }
    }
    if !current.is_empty() {
        tokens.push(current);
    }
    tokens
}

fn unquote(value: &str) -> &str {
    for q in ['"', '\''] {
        if let Some(inner) = value.strip_prefix(q).and_then(|v| v.strip_suffix(q)) {
            return inner;
        }
    }
    value
}

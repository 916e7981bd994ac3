//! Editor node type names versus content tags

use serde_json::Value;
use studio_tiptap::{Attributes, COMMENT_TYPE, TEXT_TYPE};

/// How editor node types map to content tags
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum NodeNaming {
    /// The node type is the tag
    #[default]
    Verbatim,
    /// Tiptap names map to their HTML tags (`paragraph` ⇄ `p`, `heading` ⇄ `h1`..`h6`)
    Html,
}

const HEADING_TYPE: &str = "heading";
const LEVEL_ATTR: &str = "level";

/// Tiptap node type to HTML tag
const HTML_NAMES: &[(&str, &str)] = &[
    ("paragraph", "p"),
    ("blockquote", "blockquote"),
    ("bulletList", "ul"),
    ("orderedList", "ol"),
    ("listItem", "li"),
    ("codeBlock", "pre"),
    ("hardBreak", "br"),
    ("horizontalRule", "hr"),
    ("image", "img"),
    ("table", "table"),
    ("tableRow", "tr"),
    ("tableHeader", "th"),
    ("tableCell", "td"),
];

/// Editor types that classify a node as text or comment, never element
const RESERVED_TYPES: &[&str] = &[TEXT_TYPE, COMMENT_TYPE];

/// Prepended to content tags that would otherwise take a reserved type
const ESCAPE_PREFIX: char = '_';

/// Node types that are leaves in the editor but childless elements in content
const VOID_TYPES: &[&str] = &["hardBreak", "horizontalRule", "image"];

impl NodeNaming {
    /// Content tag (and remaining attributes) for an editor node
    pub fn tag_for(&self, node_type: &str, attrs: &Attributes) -> (String, Attributes) {
        let node_type = unescape_reserved(node_type);
        if *self == NodeNaming::Verbatim {
            return (node_type.to_string(), attrs.clone());
        }

        if node_type == HEADING_TYPE {
            if let Some(level) = attrs.get(LEVEL_ATTR).and_then(Value::as_u64) {
                if (1..=6).contains(&level) {
                    let mut rest = attrs.clone();
                    rest.remove(LEVEL_ATTR);
                    return (format!("h{level}"), rest);
                }
            }
        }

        let tag = HTML_NAMES
            .iter()
            .find(|(name, _)| *name == node_type)
            .map(|(_, tag)| *tag)
            .unwrap_or(node_type);
        (tag.to_string(), attrs.clone())
    }

    /// Editor node type (and attributes) for a content tag
    pub fn node_type_for(&self, tag: &str, attrs: &Attributes) -> (String, Attributes) {
        if is_reserved(tag) {
            return (format!("{ESCAPE_PREFIX}{tag}"), attrs.clone());
        }
        if *self == NodeNaming::Verbatim {
            return (tag.to_string(), attrs.clone());
        }

        // An explicit level attribute would be overwritten, keep the tag as-is
        if let Some(level) = heading_level(tag) {
            if !attrs.contains_key(LEVEL_ATTR) {
                let mut with_level = attrs.clone();
                with_level.insert(LEVEL_ATTR.to_string(), Value::from(level));
                return (HEADING_TYPE.to_string(), with_level);
            }
        }

        let node_type = HTML_NAMES
            .iter()
            .find(|(_, t)| *t == tag)
            .map(|(name, _)| *name)
            .unwrap_or(tag);
        (node_type.to_string(), attrs.clone())
    }

    /// Whether a childless node of this type is a leaf rather than an element
    pub fn is_void(&self, node_type: &str) -> bool {
        *self == NodeNaming::Html && VOID_TYPES.contains(&node_type)
    }
}

/// `text`, `comment` and their escaped forms (`_text`, `__comment`, ...)
fn is_reserved(name: &str) -> bool {
    RESERVED_TYPES.contains(&name.trim_start_matches(ESCAPE_PREFIX))
}

/// Inverse of the escape applied by `node_type_for`
fn unescape_reserved(node_type: &str) -> &str {
    match node_type.strip_prefix(ESCAPE_PREFIX) {
        Some(rest) if is_reserved(rest) => rest,
        _ => node_type,
    }
}

fn heading_level(tag: &str) -> Option<u64> {
    let digit = tag.strip_prefix('h')?;
    if digit.len() != 1 {
        return None;
    }
    digit.parse::<u64>().ok().filter(|level| (1..=6).contains(level))
}

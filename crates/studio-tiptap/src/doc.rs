//! Editor document types
//!
//! The ProseMirror JSON shape used by Tiptap: every node has a `type`,
//! optional `attrs`, and either `content` (element), `text` (text node) or
//! neither (leaf). Empty `attrs` and `marks` are omitted on output and
//! default to empty on input, so both spellings compare equal.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// String-keyed, JSON-valued attribute map
pub type Attributes = Map<String, Value>;

/// Node type name of text nodes
pub const TEXT_TYPE: &str = "text";

/// Node type name of comment nodes
pub const COMMENT_TYPE: &str = "comment";

/// Node type name of paragraphs
pub const PARAGRAPH_TYPE: &str = "paragraph";

/// Root node of an editor document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename = "doc")]
pub struct EditorDoc {
    #[serde(default)]
    pub content: Vec<EditorNode>,
}

/// An editor node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EditorNode {
    #[serde(rename = "type")]
    pub node_type: String,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub attrs: Attributes,
    /// Child nodes; `None` for text nodes and leaves
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<Vec<EditorNode>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub marks: Vec<Mark>,
}

/// Inline mark (bold, italic, link, ...)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mark {
    #[serde(rename = "type")]
    pub mark_type: String,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub attrs: Attributes,
}

/// Structural view of a node, in classification order
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NodeKind<'a> {
    Text(&'a str),
    Comment(&'a str),
    Element(&'a [EditorNode]),
    /// Neither text, comment, nor carrying `content`
    Leaf,
}

impl Mark {
    pub fn new(mark_type: impl Into<String>) -> Self {
        Self {
            mark_type: mark_type.into(),
            attrs: Attributes::new(),
        }
    }

    pub fn with_attrs(mark_type: impl Into<String>, attrs: Attributes) -> Self {
        Self {
            mark_type: mark_type.into(),
            attrs,
        }
    }
}

// Convenience constructors
impl EditorNode {
    fn bare(node_type: impl Into<String>) -> Self {
        Self {
            node_type: node_type.into(),
            attrs: Attributes::new(),
            content: None,
            text: None,
            marks: Vec::new(),
        }
    }

    pub fn text(s: impl Into<String>) -> Self {
        Self {
            text: Some(s.into()),
            ..Self::bare(TEXT_TYPE)
        }
    }

    pub fn text_with_marks(s: impl Into<String>, marks: Vec<Mark>) -> Self {
        Self {
            marks,
            ..Self::text(s)
        }
    }

    pub fn comment(s: impl Into<String>) -> Self {
        Self {
            text: Some(s.into()),
            ..Self::bare(COMMENT_TYPE)
        }
    }

    pub fn element(
        node_type: impl Into<String>,
        attrs: Attributes,
        content: Vec<EditorNode>,
    ) -> Self {
        Self {
            attrs,
            content: Some(content),
            ..Self::bare(node_type)
        }
    }

    pub fn leaf(node_type: impl Into<String>, attrs: Attributes) -> Self {
        Self {
            attrs,
            ..Self::bare(node_type)
        }
    }

    pub fn paragraph(content: Vec<EditorNode>) -> Self {
        Self::element(PARAGRAPH_TYPE, Attributes::new(), content)
    }

    pub fn kind(&self) -> NodeKind<'_> {
        match self.node_type.as_str() {
            TEXT_TYPE => NodeKind::Text(self.text.as_deref().unwrap_or_default()),
            COMMENT_TYPE => NodeKind::Comment(self.text.as_deref().unwrap_or_default()),
            _ => match &self.content {
                Some(children) => NodeKind::Element(children),
                None => NodeKind::Leaf,
            },
        }
    }

    pub fn is_text(&self) -> bool {
        self.node_type == TEXT_TYPE
    }

    /// Look up a string attribute
    pub fn attr_str(&self, name: &str) -> Option<&str> {
        self.attrs.get(name).and_then(Value::as_str)
    }

    /// Concatenated text of this node and its descendants (comments excluded)
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        match self.kind() {
            NodeKind::Text(s) => out.push_str(s),
            NodeKind::Element(children) => {
                for child in children {
                    child.collect_text(out);
                }
            }
            NodeKind::Comment(_) | NodeKind::Leaf => {}
        }
    }
}

impl EditorDoc {
    pub fn new(content: Vec<EditorNode>) -> Self {
        Self { content }
    }

    /// Parse a document from a JSON string
    pub fn from_json_str(s: &str) -> serde_json::Result<Self> {
        serde_json::from_str(s)
    }

    /// Serialize the document to a JSON string
    pub fn to_json_string(&self, pretty: bool) -> serde_json::Result<String> {
        if pretty {
            serde_json::to_string_pretty(self)
        } else {
            serde_json::to_string(self)
        }
    }
}

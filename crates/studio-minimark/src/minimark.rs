//! Minimark content tree types
//!
//! The compact tuple-shaped Markdown AST stored by the content pipeline.
//! Elements are `[tag, {attributes}, ...children]`, comments are
//! `[null, {}, "text"]` and text nodes are plain strings.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// String-keyed, JSON-valued attribute map
pub type Attributes = Map<String, Value>;

/// Root of a minimark document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename = "minimark")]
pub struct MinimarkTree {
    /// Top-level nodes, in document order
    #[serde(default)]
    pub value: Vec<MinimarkNode>,
    /// Page frontmatter (attached by the caller, never derived from `value`)
    #[serde(default)]
    pub frontmatter: Attributes,
    /// Auxiliary metadata such as a table of contents
    #[serde(default)]
    pub meta: Attributes,
}

/// A minimark node
///
/// Decoding from JSON never fails: shapes that are neither a string, a
/// comment tuple nor an element tuple decode to empty text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "Value", into = "Value")]
pub enum MinimarkNode {
    Text(String),
    Comment(String),
    Element(Element),
}

/// Element node (`[tag, {attributes}, ...children]`)
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub tag: String,
    pub attributes: Attributes,
    pub children: Vec<MinimarkNode>,
}

impl Element {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            attributes: Attributes::new(),
            children: Vec::new(),
        }
    }

    /// Look up a string attribute
    pub fn attr_str(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).and_then(Value::as_str)
    }
}

// Convenience constructors
impl MinimarkNode {
    pub fn text(s: impl Into<String>) -> Self {
        MinimarkNode::Text(s.into())
    }

    pub fn comment(s: impl Into<String>) -> Self {
        MinimarkNode::Comment(s.into())
    }

    pub fn element(
        tag: impl Into<String>,
        attributes: Attributes,
        children: Vec<MinimarkNode>,
    ) -> Self {
        MinimarkNode::Element(Element {
            tag: tag.into(),
            attributes,
            children,
        })
    }

    /// Element without attributes
    pub fn tag(tag: impl Into<String>, children: Vec<MinimarkNode>) -> Self {
        Self::element(tag, Attributes::new(), children)
    }

    /// Decode a node from its JSON tuple form.
    pub fn from_json(value: Value) -> Self {
        match value {
            Value::String(s) => MinimarkNode::Text(s),
            Value::Array(items) => decode_tuple(items),
            other => {
                tracing::debug!(value = %other, "unrecognized minimark node, using empty text");
                MinimarkNode::Text(String::new())
            }
        }
    }

    /// Encode a node into its JSON tuple form.
    pub fn to_json(&self) -> Value {
        match self {
            MinimarkNode::Text(s) => Value::String(s.clone()),
            MinimarkNode::Comment(s) => Value::Array(vec![
                Value::Null,
                Value::Object(Attributes::new()),
                Value::String(s.clone()),
            ]),
            MinimarkNode::Element(el) => {
                let mut items = Vec::with_capacity(el.children.len() + 2);
                items.push(Value::String(el.tag.clone()));
                items.push(Value::Object(el.attributes.clone()));
                items.extend(el.children.iter().map(MinimarkNode::to_json));
                Value::Array(items)
            }
        }
    }

    /// Concatenated text of this node and its descendants (comments excluded)
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        match self {
            MinimarkNode::Text(s) => out.push_str(s),
            MinimarkNode::Comment(_) => {}
            MinimarkNode::Element(el) => {
                for child in &el.children {
                    child.collect_text(out);
                }
            }
        }
    }
}

fn decode_tuple(items: Vec<Value>) -> MinimarkNode {
    let mut iter = items.into_iter();
    match iter.next() {
        Some(Value::Null) => {
            // [null, {}, "text"]
            let text = match iter.nth(1) {
                Some(Value::String(s)) => s,
                _ => String::new(),
            };
            MinimarkNode::Comment(text)
        }
        Some(Value::String(tag)) => {
            let mut rest = iter.peekable();
            // The attribute slot may be absent
            let attributes = match rest.next_if(Value::is_object) {
                Some(Value::Object(map)) => map,
                _ => Attributes::new(),
            };
            MinimarkNode::Element(Element {
                tag,
                attributes,
                children: rest.map(MinimarkNode::from_json).collect(),
            })
        }
        first => {
            tracing::debug!(?first, "malformed minimark tuple, using empty text");
            MinimarkNode::Text(String::new())
        }
    }
}

impl From<Value> for MinimarkNode {
    fn from(value: Value) -> Self {
        MinimarkNode::from_json(value)
    }
}

impl From<MinimarkNode> for Value {
    fn from(node: MinimarkNode) -> Self {
        node.to_json()
    }
}

impl MinimarkTree {
    pub fn new(value: Vec<MinimarkNode>) -> Self {
        Self {
            value,
            frontmatter: Attributes::new(),
            meta: Attributes::new(),
        }
    }

    pub fn with_frontmatter(mut self, frontmatter: Attributes) -> Self {
        self.frontmatter = frontmatter;
        self
    }

    /// Parse a tree from a JSON string
    pub fn from_json_str(s: &str) -> serde_json::Result<Self> {
        serde_json::from_str(s)
    }

    /// Serialize the tree to a JSON string
    pub fn to_json_string(&self, pretty: bool) -> serde_json::Result<String> {
        if pretty {
            serde_json::to_string_pretty(self)
        } else {
            serde_json::to_string(self)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_node_constructors() {
        let text = MinimarkNode::text("hello");
        assert!(matches!(text, MinimarkNode::Text(ref s) if s == "hello"));

        let el = MinimarkNode::tag("p", vec![MinimarkNode::text("content")]);
        if let MinimarkNode::Element(e) = el {
            assert_eq!(e.tag, "p");
            assert!(e.attributes.is_empty());
            assert_eq!(e.children.len(), 1);
        } else {
            panic!("Expected Element node");
        }
    }

    #[test]
    fn test_encode_element_always_has_attributes() {
        let node = MinimarkNode::tag("p", vec![MinimarkNode::text("hi")]);
        assert_eq!(node.to_json(), json!(["p", {}, "hi"]));
    }

    #[test]
    fn test_encode_comment() {
        let node = MinimarkNode::comment("hello");
        assert_eq!(node.to_json(), json!([null, {}, "hello"]));
    }

    #[test]
    fn test_decode_element() {
        let node = MinimarkNode::from_json(json!(["div", {"class": "a"}, "text"]));
        let MinimarkNode::Element(el) = node else {
            panic!("Expected Element node");
        };
        assert_eq!(el.tag, "div");
        assert_eq!(el.attr_str("class"), Some("a"));
        assert_eq!(el.children, vec![MinimarkNode::text("text")]);
    }

    #[test]
    fn test_decode_element_without_attribute_slot() {
        let node = MinimarkNode::from_json(json!(["p", "a", ["em", {}, "b"]]));
        let MinimarkNode::Element(el) = node else {
            panic!("Expected Element node");
        };
        assert!(el.attributes.is_empty());
        assert_eq!(el.children.len(), 2);
        assert_eq!(el.children[0], MinimarkNode::text("a"));

        // Bare tag
        let node = MinimarkNode::from_json(json!(["hr"]));
        assert_eq!(node, MinimarkNode::tag("hr", vec![]));
    }

    #[test]
    fn test_decode_comment_variants() {
        assert_eq!(
            MinimarkNode::from_json(json!([null, {}, "note"])),
            MinimarkNode::comment("note")
        );
        assert_eq!(
            MinimarkNode::from_json(json!([null, {}])),
            MinimarkNode::comment("")
        );
        assert_eq!(
            MinimarkNode::from_json(json!([null, {}, 42])),
            MinimarkNode::comment("")
        );
    }

    #[test]
    fn test_decode_malformed_degrades_to_empty_text() {
        for value in [
            json!(42),
            json!(true),
            json!(null),
            json!({"tag": "p"}),
            json!([]),
            json!([1, {}, "x"]),
        ] {
            assert_eq!(MinimarkNode::from_json(value), MinimarkNode::text(""));
        }
    }

    #[test]
    fn test_text_content() {
        let node = MinimarkNode::tag(
            "p",
            vec![
                MinimarkNode::text("Hello "),
                MinimarkNode::comment("skip"),
                MinimarkNode::tag("strong", vec![MinimarkNode::text("world")]),
            ],
        );
        assert_eq!(node.text_content(), "Hello world");
    }

    #[test]
    fn test_tree_json_shape() {
        let tree = MinimarkTree::new(vec![
            MinimarkNode::tag("h1", vec![MinimarkNode::text("Title")]),
            MinimarkNode::comment("draft"),
        ]);
        let json = tree.to_json_string(false).unwrap();
        insta::assert_snapshot!(json, @r#"{"type":"minimark","value":[["h1",{},"Title"],[null,{},"draft"]],"frontmatter":{},"meta":{}}"#);
    }

    #[test]
    fn test_tree_missing_maps_default_to_empty() {
        let tree = MinimarkTree::from_json_str(r#"{"type":"minimark","value":["x"]}"#).unwrap();
        assert_eq!(tree.value, vec![MinimarkNode::text("x")]);
        assert!(tree.frontmatter.is_empty());
        assert!(tree.meta.is_empty());
    }
}

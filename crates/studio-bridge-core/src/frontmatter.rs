//! Page frontmatter carried as a leading editor node
//!
//! The editor keeps frontmatter in a `frontmatter` atom at the top of the
//! document; the content tree keeps it beside the node list.

use serde_json::Value;
use studio_tiptap::{Attributes, EditorDoc, EditorNode};

/// Node type name of the frontmatter atom
pub const FRONTMATTER_TYPE: &str = "frontmatter";

/// Attribute of the frontmatter atom holding the data
pub const FRONTMATTER_ATTR: &str = "frontmatter";

/// Build a frontmatter atom
pub fn frontmatter_node(data: Attributes) -> EditorNode {
    let mut attrs = Attributes::new();
    attrs.insert(FRONTMATTER_ATTR.to_string(), Value::Object(data));
    EditorNode::leaf(FRONTMATTER_TYPE, attrs)
}

/// Split a leading frontmatter atom off a node list.
///
/// Returns the atom's data (if there was one) and the remaining nodes.
pub(crate) fn peel_frontmatter(nodes: &[EditorNode]) -> (Option<Attributes>, &[EditorNode]) {
    match nodes.split_first() {
        Some((first, rest)) if first.node_type == FRONTMATTER_TYPE => {
            let data = match first.attrs.get(FRONTMATTER_ATTR) {
                Some(Value::Object(map)) => map.clone(),
                _ => Attributes::new(),
            };
            (Some(data), rest)
        }
        _ => (None, nodes),
    }
}

/// Remove a leading frontmatter atom, returning the document and its data
pub fn split_frontmatter(mut doc: EditorDoc) -> (EditorDoc, Attributes) {
    let (data, _) = peel_frontmatter(&doc.content);
    match data {
        Some(data) => {
            doc.content.remove(0);
            (doc, data)
        }
        None => (doc, Attributes::new()),
    }
}

/// Put a frontmatter atom at the top of the document, replacing any existing one.
///
/// Empty data leaves the document without an atom.
pub fn with_frontmatter(doc: EditorDoc, data: Attributes) -> EditorDoc {
    let (mut doc, _) = split_frontmatter(doc);
    if !data.is_empty() {
        doc.content.insert(0, frontmatter_node(data));
    }
    doc
}

//! Editor tree ⇄ content tree conversion
//!
//! Converts Tiptap documents into minimark trees and back. Both directions
//! are total: node shapes without a counterpart degrade to empty text
//! instead of failing, and each conversion is a single depth-first pass.

use crate::frontmatter::{frontmatter_node, peel_frontmatter};
use crate::marks::{MarkPolicy, mark_for_tag, tag_for_mark};
use crate::naming::NodeNaming;
use studio_minimark::{Attributes, MinimarkNode, MinimarkTree};
use studio_tiptap::{EditorDoc, EditorNode, Mark, NodeKind};

/// Options for conversion in either direction
#[derive(Debug, Clone, Default)]
pub struct BridgeOptions {
    /// Frontmatter attached to the produced content tree
    pub frontmatter: Option<Attributes>,
    /// How inline marks are carried
    pub marks: MarkPolicy,
    /// How node type names map to tags
    pub naming: NodeNaming,
    /// Move a leading `frontmatter` atom into the content tree's
    /// frontmatter (and regenerate it on the way back)
    pub lift_frontmatter: bool,
}

/// Convert an editor document to a content tree
pub fn to_content_tree(doc: &EditorDoc) -> MinimarkTree {
    to_content_tree_with_options(doc, &BridgeOptions::default())
}

/// Convert an editor document to a content tree with options
pub fn to_content_tree_with_options(doc: &EditorDoc, options: &BridgeOptions) -> MinimarkTree {
    Converter::new(options).convert_document(doc)
}

/// Convert a content tree to an editor document
pub fn to_editor_tree(tree: &MinimarkTree) -> EditorDoc {
    to_editor_tree_with_options(tree, &BridgeOptions::default())
}

/// Convert a content tree to an editor document with options
///
/// The tree's `meta` never reaches the editor; its `frontmatter` only does
/// when `lift_frontmatter` is set.
pub fn to_editor_tree_with_options(tree: &MinimarkTree, options: &BridgeOptions) -> EditorDoc {
    Converter::new(options).convert_tree(tree)
}

/// Converter state
struct Converter<'a> {
    options: &'a BridgeOptions,
}

impl<'a> Converter<'a> {
    fn new(options: &'a BridgeOptions) -> Self {
        Self { options }
    }

    fn convert_document(&self, doc: &EditorDoc) -> MinimarkTree {
        let mut frontmatter = Attributes::new();
        let mut nodes = doc.content.as_slice();

        if self.options.lift_frontmatter {
            let (lifted, rest) = peel_frontmatter(nodes);
            if let Some(data) = lifted {
                frontmatter.extend(data);
            }
            nodes = rest;
        }

        // Caller-supplied values win over lifted ones
        if let Some(supplied) = &self.options.frontmatter {
            frontmatter.extend(supplied.clone());
        }

        MinimarkTree {
            value: self.content_nodes(nodes),
            frontmatter,
            meta: Attributes::new(),
        }
    }

    fn content_nodes(&self, nodes: &[EditorNode]) -> Vec<MinimarkNode> {
        match self.options.marks {
            MarkPolicy::Drop => nodes.iter().map(|n| self.content_node(n)).collect(),
            MarkPolicy::Wrap => self.wrap_marks(nodes, 0),
        }
    }

    /// Group siblings by their mark at `depth`, one wrapper per run.
    ///
    /// All nodes passed in share the same marks below `depth`.
    fn wrap_marks(&self, nodes: &[EditorNode], depth: usize) -> Vec<MinimarkNode> {
        let mut result = Vec::with_capacity(nodes.len());
        let mut i = 0;

        while i < nodes.len() {
            let Some(mark) = nodes[i].marks.get(depth) else {
                result.push(self.content_node(&nodes[i]));
                i += 1;
                continue;
            };

            let run = nodes[i..]
                .iter()
                .take_while(|n| n.marks.get(depth) == Some(mark))
                .count();
            let children = self.wrap_marks(&nodes[i..i + run], depth + 1);
            result.push(MinimarkNode::element(
                tag_for_mark(&mark.mark_type),
                mark.attrs.clone(),
                children,
            ));
            i += run;
        }

        result
    }

    fn content_node(&self, node: &EditorNode) -> MinimarkNode {
        match node.kind() {
            NodeKind::Text(text) => MinimarkNode::text(text),
            NodeKind::Comment(text) => MinimarkNode::comment(text),
            NodeKind::Element(children) => {
                let (tag, attributes) = self.options.naming.tag_for(&node.node_type, &node.attrs);
                MinimarkNode::element(tag, attributes, self.content_nodes(children))
            }
            NodeKind::Leaf if self.options.naming.is_void(&node.node_type) => {
                let (tag, attributes) = self.options.naming.tag_for(&node.node_type, &node.attrs);
                MinimarkNode::element(tag, attributes, Vec::new())
            }
            NodeKind::Leaf => {
                tracing::debug!(node_type = %node.node_type, "no content counterpart, using empty text");
                MinimarkNode::text("")
            }
        }
    }

    fn convert_tree(&self, tree: &MinimarkTree) -> EditorDoc {
        let mut content = self.editor_nodes(&tree.value, &[]);

        if self.options.lift_frontmatter && !tree.frontmatter.is_empty() {
            content.insert(0, frontmatter_node(tree.frontmatter.clone()));
        }

        EditorDoc::new(content)
    }

    fn editor_nodes(&self, nodes: &[MinimarkNode], marks: &[Mark]) -> Vec<EditorNode> {
        let mut result = Vec::with_capacity(nodes.len());
        for node in nodes {
            self.push_editor_node(node, marks, &mut result);
        }
        result
    }

    fn push_editor_node(&self, node: &MinimarkNode, marks: &[Mark], out: &mut Vec<EditorNode>) {
        let mut converted = match node {
            MinimarkNode::Text(text) => EditorNode::text(text.as_str()),
            MinimarkNode::Comment(text) => EditorNode::comment(text.as_str()),
            MinimarkNode::Element(el) => {
                if self.options.marks == MarkPolicy::Wrap {
                    if let Some(mark_type) = mark_for_tag(&el.tag) {
                        // Wrapper elements dissolve into a mark on every descendant
                        let mut stack = marks.to_vec();
                        stack.push(Mark::with_attrs(mark_type, el.attributes.clone()));
                        for child in &el.children {
                            self.push_editor_node(child, &stack, out);
                        }
                        return;
                    }
                }

                let naming = self.options.naming;
                let (node_type, attrs) = naming.node_type_for(&el.tag, &el.attributes);
                if el.children.is_empty() && naming.is_void(&node_type) {
                    EditorNode::leaf(node_type, attrs)
                } else {
                    EditorNode::element(node_type, attrs, self.editor_nodes(&el.children, &[]))
                }
            }
        };

        converted.marks = marks.to_vec();
        out.push(converted);
    }
}

//! Node specs and the editor schema
//!
//! A [`NodeSpec`] declares one node type: its containment class, how it is
//! recognized in and rendered to HTML, its attribute codecs, and the input
//! rules that create it while typing. Specs are validated once, when built.

use crate::codec::AttributeCodec;
use crate::html::{HtmlElement, HtmlNode};
use crate::input_rules::{BlockRule, CaptureAttrs, InlineRule, inline_text, insert_text};
use crate::marks::mark_for_tag;
use regex::Regex;
use serde_json::Value;
use std::collections::{BTreeMap, HashSet};
use studio_tiptap::{Attributes, EditorDoc, EditorNode, Mark, PARAGRAPH_TYPE};
use thiserror::Error;

/// Schema construction errors
#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("Node spec name must not be empty")]
    EmptyName,

    #[error("Node spec `{node}` has no parse rule")]
    MissingParseRule { node: String },

    #[error("Node spec `{node}` declares attribute `{attribute}` twice")]
    DuplicateAttribute { node: String, attribute: String },

    #[error("Node spec `{node}` maps two attributes to HTML attribute `{attribute}`")]
    DuplicateHtmlAttribute { node: String, attribute: String },

    #[error("Invalid input rule pattern for `{node}`: {source}")]
    InvalidPattern {
        node: String,
        #[source]
        source: regex::Error,
    },

    #[error("Inline input rule on non-inline node `{node}`")]
    InlineRuleOnNonInline { node: String },

    #[error("Node spec `{node}` is already registered")]
    DuplicateNode { node: String },
}

/// Containment class of a node type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeClass {
    /// Block container
    Block,
    /// Inline container
    Inline,
    /// Leaf without editable content
    Atom,
}

/// Matches a serialized HTML element
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseRule {
    tag: String,
    attribute: Option<(String, Option<String>)>,
}

/// Serialized HTML shell of a node
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderRule {
    tag: String,
    attributes: BTreeMap<String, String>,
}

impl ParseRule {
    pub fn tag(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            attribute: None,
        }
    }

    /// Require an attribute to be present
    pub fn with_attribute(mut self, name: impl Into<String>) -> Self {
        self.attribute = Some((name.into(), None));
        self
    }

    /// Require an attribute to have a value
    pub fn with_attribute_value(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attribute = Some((name.into(), Some(value.into())));
        self
    }

    pub fn matches(&self, el: &HtmlElement) -> bool {
        if !el.tag.eq_ignore_ascii_case(&self.tag) {
            return false;
        }
        match &self.attribute {
            None => true,
            Some((name, None)) => el.attribute(name).is_some(),
            Some((name, Some(value))) => el.attribute(name) == Some(value.as_str()),
        }
    }

    /// Render rule producing an element this rule matches
    fn to_render_rule(&self) -> RenderRule {
        let mut rule = RenderRule::tag(self.tag.as_str());
        if let Some((name, value)) = &self.attribute {
            rule = rule.with_attribute(name.as_str(), value.clone().unwrap_or_default());
        }
        rule
    }
}

impl RenderRule {
    pub fn tag(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            attributes: BTreeMap::new(),
        }
    }

    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }
}

/// Declaration of one node type
#[derive(Debug, Clone)]
pub struct NodeSpec {
    name: String,
    class: NodeClass,
    parse_rules: Vec<ParseRule>,
    render: RenderRule,
    attributes: Vec<AttributeCodec>,
    block_rules: Vec<BlockRule>,
    inline_rules: Vec<InlineRule>,
}

#[derive(Debug, Clone)]
enum PendingRule {
    Block {
        pattern: String,
        attrs: CaptureAttrs,
    },
    Inline {
        pattern: String,
        attrs: CaptureAttrs,
        content_group: Option<usize>,
    },
}

/// Builder for [`NodeSpec`]
#[derive(Debug, Clone)]
pub struct NodeSpecBuilder {
    name: String,
    class: NodeClass,
    parse_rules: Vec<ParseRule>,
    render: Option<RenderRule>,
    attributes: Vec<AttributeCodec>,
    rules: Vec<PendingRule>,
}

impl NodeSpecBuilder {
    pub fn parse_rule(mut self, rule: ParseRule) -> Self {
        self.parse_rules.push(rule);
        self
    }

    /// Defaults to the shape of the first parse rule
    pub fn render_rule(mut self, rule: RenderRule) -> Self {
        self.render = Some(rule);
        self
    }

    pub fn attribute(mut self, codec: AttributeCodec) -> Self {
        self.attributes.push(codec);
        self
    }

    pub fn block_rule(mut self, pattern: &str, attrs: CaptureAttrs) -> Self {
        self.rules.push(PendingRule::Block {
            pattern: pattern.to_string(),
            attrs,
        });
        self
    }

    /// `content_group` names the capture that becomes the node's text
    pub fn inline_rule(
        mut self,
        pattern: &str,
        attrs: CaptureAttrs,
        content_group: Option<usize>,
    ) -> Self {
        self.rules.push(PendingRule::Inline {
            pattern: pattern.to_string(),
            attrs,
            content_group,
        });
        self
    }

    pub fn build(self) -> Result<NodeSpec, SchemaError> {
        if self.name.is_empty() {
            return Err(SchemaError::EmptyName);
        }
        let Some(first_rule) = self.parse_rules.first() else {
            return Err(SchemaError::MissingParseRule { node: self.name });
        };
        let render = self
            .render
            .clone()
            .unwrap_or_else(|| first_rule.to_render_rule());

        let mut names = HashSet::new();
        let mut html_names = HashSet::new();
        for codec in &self.attributes {
            if !names.insert(codec.name()) {
                return Err(SchemaError::DuplicateAttribute {
                    node: self.name.clone(),
                    attribute: codec.name().to_string(),
                });
            }
            if !html_names.insert(codec.html_name()) {
                return Err(SchemaError::DuplicateHtmlAttribute {
                    node: self.name.clone(),
                    attribute: codec.html_name().to_string(),
                });
            }
        }

        let defaults: Attributes = self
            .attributes
            .iter()
            .map(|codec| (codec.name().to_string(), codec.default_value().clone()))
            .collect();

        let mut block_rules = Vec::new();
        let mut inline_rules = Vec::new();
        for rule in &self.rules {
            match rule {
                PendingRule::Block { pattern, attrs } => {
                    let regex = compile(&self.name, pattern)?;
                    block_rules.push(BlockRule::new(
                        regex,
                        self.name.as_str(),
                        defaults.clone(),
                        *attrs,
                    ));
                }
                PendingRule::Inline {
                    pattern,
                    attrs,
                    content_group,
                } => {
                    if self.class != NodeClass::Inline {
                        return Err(SchemaError::InlineRuleOnNonInline {
                            node: self.name.clone(),
                        });
                    }
                    let regex = compile(&self.name, pattern)?;
                    inline_rules.push(InlineRule::new(
                        regex,
                        self.name.as_str(),
                        defaults.clone(),
                        *attrs,
                        *content_group,
                    ));
                }
            }
        }

        Ok(NodeSpec {
            name: self.name,
            class: self.class,
            parse_rules: self.parse_rules,
            render,
            attributes: self.attributes,
            block_rules,
            inline_rules,
        })
    }
}

fn compile(node: &str, pattern: &str) -> Result<Regex, SchemaError> {
    Regex::new(pattern).map_err(|source| SchemaError::InvalidPattern {
        node: node.to_string(),
        source,
    })
}

impl NodeSpec {
    pub fn builder(name: impl Into<String>, class: NodeClass) -> NodeSpecBuilder {
        NodeSpecBuilder {
            name: name.into(),
            class,
            parse_rules: Vec::new(),
            render: None,
            attributes: Vec::new(),
            rules: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn class(&self) -> NodeClass {
        self.class
    }

    pub fn attributes(&self) -> &[AttributeCodec] {
        &self.attributes
    }

    pub fn block_rules(&self) -> &[BlockRule] {
        &self.block_rules
    }

    pub fn inline_rules(&self) -> &[InlineRule] {
        &self.inline_rules
    }

    /// Every declared attribute at its default
    pub fn default_attrs(&self) -> Attributes {
        self.attributes
            .iter()
            .map(|codec| (codec.name().to_string(), codec.default_value().clone()))
            .collect()
    }

    /// Decoded attributes if one of the parse rules matches
    pub fn parse_html(&self, el: &HtmlElement) -> Option<Attributes> {
        if !self.parse_rules.iter().any(|rule| rule.matches(el)) {
            return None;
        }
        Some(
            self.attributes
                .iter()
                .map(|codec| {
                    let value = codec.decode(el.attribute(codec.html_name()));
                    (codec.name().to_string(), value)
                })
                .collect(),
        )
    }

    /// HTML shell for a node of this type, without children
    pub fn render_html(&self, node: &EditorNode) -> HtmlElement {
        let mut el = HtmlElement::new(self.render.tag.as_str());
        el.attributes = self.render.attributes.clone();
        for codec in &self.attributes {
            if let Some(encoded) = codec.encode(node.attrs.get(codec.name())) {
                el.attributes.insert(codec.html_name().to_string(), encoded);
            }
        }
        el
    }
}

/// Ordered set of node specs
#[derive(Debug, Clone, Default)]
pub struct Schema {
    nodes: Vec<NodeSpec>,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a spec; parse rules are tried in registration order
    pub fn register(&mut self, spec: NodeSpec) -> Result<(), SchemaError> {
        if self.get(spec.name()).is_some() {
            return Err(SchemaError::DuplicateNode {
                node: spec.name.clone(),
            });
        }
        self.nodes.push(spec);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&NodeSpec> {
        self.nodes.iter().find(|spec| spec.name == name)
    }

    pub fn nodes(&self) -> &[NodeSpec] {
        &self.nodes
    }

    /// Parse serialized HTML into editor nodes
    ///
    /// Elements no spec claims become generic nodes named after their tag;
    /// known mark tags become marks on their descendants. A mark reaching
    /// an element stops there: the element carries it and its children
    /// start with no marks, the same shape the tree bridge produces.
    pub fn parse_fragment(&self, nodes: &[HtmlNode]) -> Vec<EditorNode> {
        let mut result = Vec::with_capacity(nodes.len());
        self.parse_nodes(nodes, &[], &mut result);
        result
    }

    pub fn parse_document(&self, nodes: &[HtmlNode]) -> EditorDoc {
        EditorDoc::new(self.parse_fragment(nodes))
    }

    fn parse_nodes(&self, nodes: &[HtmlNode], marks: &[Mark], out: &mut Vec<EditorNode>) {
        for node in nodes {
            let mut parsed = match node {
                HtmlNode::Text(text) => EditorNode::text(text.as_str()),
                HtmlNode::Comment(text) => EditorNode::comment(text.as_str()),
                HtmlNode::Element(el) => {
                    let claimed = self
                        .nodes
                        .iter()
                        .find_map(|spec| spec.parse_html(el).map(|attrs| (spec, attrs)));

                    match claimed {
                        Some((spec, attrs)) if spec.class == NodeClass::Atom => {
                            EditorNode::leaf(spec.name.as_str(), attrs)
                        }
                        // Children start a fresh mark scope
                        Some((spec, attrs)) => EditorNode::element(
                            spec.name.as_str(),
                            attrs,
                            self.parse_fragment(&el.children),
                        ),
                        None => {
                            let html_attrs: Attributes = el
                                .attributes
                                .iter()
                                .map(|(k, v)| (k.clone(), Value::String(v.clone())))
                                .collect();

                            if let Some(mark_type) = mark_for_tag(&el.tag) {
                                let mut stack = marks.to_vec();
                                stack.push(Mark::with_attrs(mark_type, html_attrs));
                                self.parse_nodes(&el.children, &stack, out);
                                continue;
                            }

                            if el.is_void() {
                                EditorNode::leaf(el.tag.as_str(), html_attrs)
                            } else {
                                EditorNode::element(
                                    el.tag.as_str(),
                                    html_attrs,
                                    self.parse_fragment(&el.children),
                                )
                            }
                        }
                    }
                }
            };
            parsed.marks = marks.to_vec();
            out.push(parsed);
        }
    }

    /// Feed one typed character into a textblock.
    ///
    /// Block rules (paragraphs only) are tried first, then inline rules;
    /// when none fires the character is appended. Returns whether a rule fired.
    pub fn handle_text_input(&self, block: &mut EditorNode, typed: char) -> bool {
        if block.content.is_none() {
            return false;
        }

        if block.node_type == PARAGRAPH_TYPE {
            let replacement = self
                .nodes
                .iter()
                .flat_map(|spec| spec.block_rules())
                .find_map(|rule| rule.apply(block, typed));
            if let Some(replacement) = replacement {
                *block = replacement;
                return true;
            }
        }

        let Some(content) = block.content.as_mut() else {
            return false;
        };
        let text_before = inline_text(content);
        let trigger = self
            .nodes
            .iter()
            .flat_map(|spec| spec.inline_rules())
            .find_map(|rule| rule.matches(&text_before, typed));

        match trigger {
            Some(trigger) => {
                trigger.apply(content);
                true
            }
            None => {
                insert_text(content, typed);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn no_attrs(_: &regex::Captures<'_>) -> Attributes {
        Attributes::new()
    }

    fn note_spec() -> NodeSpec {
        NodeSpec::builder("note", NodeClass::Block)
            .parse_rule(ParseRule::tag("aside").with_attribute("data-note"))
            .attribute(AttributeCodec::string("kind").with_html_name("data-kind"))
            .attribute(AttributeCodec::props())
            .build()
            .unwrap()
    }

    #[test]
    fn test_build_errors() {
        assert!(matches!(
            NodeSpec::builder("", NodeClass::Block).build(),
            Err(SchemaError::EmptyName)
        ));
        assert!(matches!(
            NodeSpec::builder("x", NodeClass::Block).build(),
            Err(SchemaError::MissingParseRule { .. })
        ));
        assert!(matches!(
            NodeSpec::builder("x", NodeClass::Block)
                .parse_rule(ParseRule::tag("div"))
                .attribute(AttributeCodec::string("a"))
                .attribute(AttributeCodec::integer("a"))
                .build(),
            Err(SchemaError::DuplicateAttribute { .. })
        ));
        assert!(matches!(
            NodeSpec::builder("x", NodeClass::Block)
                .parse_rule(ParseRule::tag("div"))
                .attribute(AttributeCodec::string("a").with_html_name("data-x"))
                .attribute(AttributeCodec::string("b").with_html_name("data-x"))
                .build(),
            Err(SchemaError::DuplicateHtmlAttribute { .. })
        ));
        assert!(matches!(
            NodeSpec::builder("x", NodeClass::Block)
                .parse_rule(ParseRule::tag("div"))
                .block_rule("(unclosed", no_attrs)
                .build(),
            Err(SchemaError::InvalidPattern { .. })
        ));
        assert!(matches!(
            NodeSpec::builder("x", NodeClass::Block)
                .parse_rule(ParseRule::tag("div"))
                .inline_rule(r"(x)\s$", no_attrs, None)
                .build(),
            Err(SchemaError::InlineRuleOnNonInline { .. })
        ));
    }

    #[test]
    fn test_duplicate_node() {
        let mut schema = Schema::new();
        schema.register(note_spec()).unwrap();
        let err = schema.register(note_spec()).unwrap_err();
        assert_eq!(err.to_string(), "Node spec `note` is already registered");
    }

    #[test]
    fn test_parse_rule_matching() {
        let rule = ParseRule::tag("div").with_attribute_value("data-kind", "tip");
        assert!(rule.matches(&HtmlElement::new("DIV").with_attribute("data-kind", "tip")));
        assert!(!rule.matches(&HtmlElement::new("div").with_attribute("data-kind", "note")));
        assert!(!rule.matches(&HtmlElement::new("span").with_attribute("data-kind", "tip")));
    }

    #[test]
    fn test_parse_and_render_attributes() {
        let spec = note_spec();
        let el = HtmlElement::new("aside")
            .with_attribute("data-note", "")
            .with_attribute("data-kind", "info")
            .with_attribute("data-props", r#"{"icon":"i-lucide-info"}"#);

        let attrs = spec.parse_html(&el).unwrap();
        assert_eq!(attrs.get("kind"), Some(&json!("info")));
        assert_eq!(attrs.get("props"), Some(&json!({"icon": "i-lucide-info"})));

        let node = EditorNode::element("note", attrs, vec![]);
        assert_eq!(spec.render_html(&node), el);
    }

    #[test]
    fn test_defaults_fill_missing_attributes() {
        let spec = note_spec();
        let attrs = spec
            .parse_html(&HtmlElement::new("aside").with_attribute("data-note", ""))
            .unwrap();
        assert_eq!(attrs, spec.default_attrs());
        assert_eq!(attrs.get("kind"), Some(&Value::Null));

        assert!(spec.parse_html(&HtmlElement::new("aside")).is_none());
    }

    #[test]
    fn test_parse_fragment_generic_and_marks() {
        let mut schema = Schema::new();
        schema.register(note_spec()).unwrap();

        let html = vec![HtmlNode::Element(
            HtmlElement::new("p")
                .with_child(HtmlNode::text("a "))
                .with_child(HtmlNode::Element(
                    HtmlElement::new("a")
                        .with_attribute("href", "/x")
                        .with_child(HtmlNode::Element(
                            HtmlElement::new("strong").with_child(HtmlNode::text("b")),
                        )),
                ))
                .with_child(HtmlNode::Element(HtmlElement::new("br"))),
        )];

        let nodes = schema.parse_fragment(&html);
        let mut href = Attributes::new();
        href.insert("href".to_string(), json!("/x"));
        assert_eq!(
            nodes,
            vec![EditorNode::element(
                "p",
                Attributes::new(),
                vec![
                    EditorNode::text("a "),
                    EditorNode::text_with_marks(
                        "b",
                        vec![Mark::with_attrs("link", href), Mark::new("bold")]
                    ),
                    EditorNode::leaf("br", Attributes::new()),
                ]
            )]
        );
    }

    #[test]
    fn test_parse_fragment_marks_stop_at_elements() {
        let mut schema = Schema::new();
        schema.register(note_spec()).unwrap();

        let html = vec![HtmlNode::Element(
            HtmlElement::new("strong")
                .with_child(HtmlNode::Element(
                    HtmlElement::new("aside")
                        .with_attribute("data-note", "")
                        .with_child(HtmlNode::text("claimed")),
                ))
                .with_child(HtmlNode::Element(
                    HtmlElement::new("section").with_child(HtmlNode::text("generic")),
                )),
        )];

        let nodes = schema.parse_fragment(&html);
        assert_eq!(nodes.len(), 2);
        for node in &nodes {
            assert_eq!(node.marks, vec![Mark::new("bold")]);
            let children = node.content.as_ref().unwrap();
            assert!(children.iter().all(|child| child.marks.is_empty()));
        }
        assert_eq!(nodes[0].node_type, "note");
        assert_eq!(nodes[1].node_type, "section");
    }

    #[test]
    fn test_handle_text_input_appends_without_rules() {
        let schema = Schema::new();
        let mut block = EditorNode::paragraph(vec![]);
        for ch in "hi".chars() {
            assert!(!schema.handle_text_input(&mut block, ch));
        }
        assert_eq!(block, EditorNode::paragraph(vec![EditorNode::text("hi")]));

        let mut leaf = EditorNode::leaf("image", Attributes::new());
        assert!(!schema.handle_text_input(&mut leaf, 'x'));
        assert_eq!(leaf.content, None);
    }
}

//! HTML preview rendering
//!
//! Each node type resolves to a [`NodeRenderer`]. Specs registered in a
//! [`Schema`] render through their render rule; anything else goes through
//! the fallback, which uses the HTML naming table.

use crate::frontmatter::{FRONTMATTER_ATTR, FRONTMATTER_TYPE};
use crate::html::{HtmlElement, comment_html, escape_text};
use crate::marks::tag_for_mark;
use crate::naming::NodeNaming;
use crate::schema::{NodeSpec, Schema};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use studio_tiptap::{Attributes, EditorDoc, EditorNode, Mark, NodeKind};

/// Renders one node given its already rendered children
pub trait NodeRenderer: Send + Sync {
    fn render(&self, node: &EditorNode, children: &str) -> String;
}

/// Renders through a node spec's render rule
#[derive(Debug, Clone)]
pub struct SpecRenderer {
    spec: NodeSpec,
}

impl SpecRenderer {
    pub fn new(spec: NodeSpec) -> Self {
        Self { spec }
    }
}

impl NodeRenderer for SpecRenderer {
    fn render(&self, node: &EditorNode, children: &str) -> String {
        wrap(&self.spec.render_html(node), children)
    }
}

/// Renders the frontmatter atom as a `key: value` listing
#[derive(Debug, Clone, Copy, Default)]
pub struct FrontmatterRenderer;

impl NodeRenderer for FrontmatterRenderer {
    fn render(&self, node: &EditorNode, _children: &str) -> String {
        let mut out = String::from("<pre data-frontmatter>");
        if let Some(Value::Object(data)) = node.attrs.get(FRONTMATTER_ATTR) {
            for (key, value) in data {
                out.push_str(&escape_text(&format!("{}: {}\n", key, value)));
            }
        }
        out.push_str("</pre>");
        out
    }
}

/// Renders unregistered node types as plain HTML elements
#[derive(Debug, Clone, Copy, Default)]
pub struct FallbackRenderer;

impl NodeRenderer for FallbackRenderer {
    fn render(&self, node: &EditorNode, children: &str) -> String {
        let (tag, attrs) = NodeNaming::Html.tag_for(&node.node_type, &node.attrs);
        let mut el = HtmlElement::new(tag);
        el.attributes = html_attributes(&attrs);
        wrap(&el, children)
    }
}

fn wrap(el: &HtmlElement, children: &str) -> String {
    let mut out = el.open_tag();
    if !el.is_void() {
        out.push_str(children);
    }
    out.push_str(&el.close_tag());
    out
}

/// Stringify attribute values; nulls are dropped
fn html_attributes(attrs: &Attributes) -> BTreeMap<String, String> {
    attrs
        .iter()
        .filter_map(|(name, value)| {
            let rendered = match value {
                Value::Null => return None,
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            Some((name.clone(), rendered))
        })
        .collect()
}

/// Node type name to renderer
pub struct RendererRegistry {
    renderers: HashMap<String, Box<dyn NodeRenderer>>,
    fallback: Box<dyn NodeRenderer>,
}

impl RendererRegistry {
    /// Registry with only the fallback renderer
    pub fn new() -> Self {
        Self {
            renderers: HashMap::new(),
            fallback: Box::new(FallbackRenderer),
        }
    }

    /// One renderer per spec, plus the frontmatter listing
    pub fn from_schema(schema: &Schema) -> Self {
        let mut registry = Self::new();
        for spec in schema.nodes() {
            registry.register(spec.name(), Box::new(SpecRenderer::new(spec.clone())));
        }
        registry.register(FRONTMATTER_TYPE, Box::new(FrontmatterRenderer));
        registry
    }

    /// Register a renderer, replacing any previous one for the type
    pub fn register(&mut self, node_type: impl Into<String>, renderer: Box<dyn NodeRenderer>) {
        self.renderers.insert(node_type.into(), renderer);
    }

    pub fn resolve(&self, node_type: &str) -> &dyn NodeRenderer {
        self.renderers
            .get(node_type)
            .map(Box::as_ref)
            .unwrap_or(self.fallback.as_ref())
    }

    pub fn render_node(&self, node: &EditorNode) -> String {
        match node.kind() {
            NodeKind::Text(text) => wrap_marks(&escape_text(text), &node.marks),
            NodeKind::Comment(text) => comment_html(text),
            NodeKind::Element(children) => {
                let inner: String = children.iter().map(|c| self.render_node(c)).collect();
                let rendered = self.resolve(&node.node_type).render(node, &inner);
                wrap_marks(&rendered, &node.marks)
            }
            NodeKind::Leaf => {
                let rendered = self.resolve(&node.node_type).render(node, "");
                wrap_marks(&rendered, &node.marks)
            }
        }
    }

    pub fn render_document(&self, doc: &EditorDoc) -> String {
        doc.content.iter().map(|n| self.render_node(n)).collect()
    }
}

impl Default for RendererRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for RendererRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut types: Vec<_> = self.renderers.keys().collect();
        types.sort();
        f.debug_struct("RendererRegistry")
            .field("renderers", &types)
            .finish()
    }
}

/// Outermost mark first
fn wrap_marks(inner: &str, marks: &[Mark]) -> String {
    let wrappers: Vec<HtmlElement> = marks
        .iter()
        .map(|mark| {
            let mut el = HtmlElement::new(tag_for_mark(&mark.mark_type));
            el.attributes = html_attributes(&mark.attrs);
            el
        })
        .collect();

    let mut out: String = wrappers.iter().map(HtmlElement::open_tag).collect();
    out.push_str(inner);
    for el in wrappers.iter().rev() {
        out.push_str(&el.close_tag());
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frontmatter::frontmatter_node;
    use serde_json::json;

    struct Upper;

    impl NodeRenderer for Upper {
        fn render(&self, _node: &EditorNode, children: &str) -> String {
            children.to_uppercase()
        }
    }

    fn attrs(value: Value) -> Attributes {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn test_fallback_rendering() {
        let registry = RendererRegistry::new();
        let doc = EditorDoc::new(vec![
            EditorNode::element(
                "heading",
                attrs(json!({"level": 2})),
                vec![EditorNode::text("A & B")],
            ),
            EditorNode::paragraph(vec![
                EditorNode::text("x"),
                EditorNode::leaf("hardBreak", Attributes::new()),
                EditorNode::text_with_marks(
                    "y",
                    vec![
                        Mark::with_attrs("link", attrs(json!({"href": "/a"}))),
                        Mark::new("bold"),
                    ],
                ),
            ]),
            EditorNode::comment(" note "),
        ]);

        assert_eq!(
            registry.render_document(&doc),
            r#"<h2>A &amp; B</h2><p>x<br><a href="/a"><strong>y</strong></a></p><!-- note -->"#
        );
    }

    #[test]
    fn test_schema_renderers() {
        let schema = Schema::studio().unwrap();
        let registry = RendererRegistry::from_schema(&schema);

        let doc = EditorDoc::new(vec![
            frontmatter_node(attrs(json!({"title": "Home"}))),
            EditorNode::element(
                "callout",
                attrs(json!({"type": "tip", "props": {}})),
                vec![EditorNode::paragraph(vec![EditorNode::text("Hi")])],
            ),
        ]);

        assert_eq!(
            registry.render_document(&doc),
            concat!(
                "<pre data-frontmatter>title: \"Home\"\n</pre>",
                r#"<div data-callout="" data-type="tip"><p>Hi</p></div>"#
            )
        );
    }

    #[test]
    fn test_untrusted_names_and_comments() {
        let registry = RendererRegistry::new();
        let doc = EditorDoc::new(vec![
            EditorNode::element("img src=x onerror=alert(1)", Attributes::new(), vec![]),
            EditorNode::element(
                "paragraph",
                attrs(json!({"x onmouseover=alert(1) y": "v"})),
                vec![EditorNode::text_with_marks("z", vec![Mark::new("b><i")])],
            ),
            EditorNode::comment("--><script>alert(2)</script><!--"),
        ]);

        assert_eq!(
            registry.render_document(&doc),
            concat!(
                "<div></div>",
                "<p><div>z</div></p>",
                "<!--- -><script>alert(2)</script><!- - -->"
            )
        );
    }

    #[test]
    fn test_register_overrides() {
        let mut registry = RendererRegistry::new();
        registry.register("paragraph", Box::new(Upper));
        let node = EditorNode::paragraph(vec![EditorNode::text("quiet")]);
        assert_eq!(registry.render_node(&node), "QUIET");
        assert!(format!("{:?}", registry).contains("paragraph"));
    }
}

//! studio-bridge-core: Tree bridge between editor documents and content trees
//!
//! This crate provides:
//! - Editor tree ⇄ content tree conversion (total, fail-soft)
//! - Mark and node naming policies for the conversion
//! - Frontmatter lifting between the two trees
//! - Structural node extensions (schema, attribute codecs, input rules)
//! - An HTML preview renderer registry
//!
//! ## Example
//!
//! ```rust
//! use studio_bridge_core::{to_content_tree, to_editor_tree};
//! use studio_tiptap::{EditorDoc, EditorNode};
//!
//! let doc = EditorDoc::new(vec![EditorNode::paragraph(vec![EditorNode::text("Hello")])]);
//! let tree = to_content_tree(&doc);
//! assert_eq!(to_editor_tree(&tree), doc);
//! ```

pub mod bridge;
pub mod codec;
pub mod extensions;
pub mod frontmatter;
pub mod html;
pub mod input_rules;
pub mod marks;
pub mod naming;
pub mod render;
pub mod schema;

pub use bridge::{
    BridgeOptions, to_content_tree, to_content_tree_with_options, to_editor_tree,
    to_editor_tree_with_options,
};
pub use codec::AttributeCodec;
pub use extensions::{CALLOUT_TYPES, parse_mdc_attributes};
pub use frontmatter::{split_frontmatter, with_frontmatter};
pub use html::{HtmlElement, HtmlNode};
pub use input_rules::{BlockRule, InlineRule, InlineTrigger};
pub use marks::MarkPolicy;
pub use naming::NodeNaming;
pub use render::{NodeRenderer, RendererRegistry};
pub use schema::{NodeClass, NodeSpec, NodeSpecBuilder, ParseRule, RenderRule, Schema, SchemaError};

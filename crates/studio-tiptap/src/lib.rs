//! studio-tiptap: editor document types for the Tiptap/ProseMirror JSON shape
//!
//! ## Example
//!
//! ```rust
//! use studio_tiptap::{EditorDoc, EditorNode, NodeKind};
//!
//! let doc = EditorDoc::from_json_str(
//!     r#"{"type":"doc","content":[{"type":"paragraph","content":[{"type":"text","text":"Hi"}]}]}"#,
//! ).unwrap();
//!
//! assert!(matches!(doc.content[0].kind(), NodeKind::Element(_)));
//! assert_eq!(doc.content[0], EditorNode::paragraph(vec![EditorNode::text("Hi")]));
//! ```

pub mod doc;

pub use doc::{
    Attributes, COMMENT_TYPE, EditorDoc, EditorNode, Mark, NodeKind, PARAGRAPH_TYPE, TEXT_TYPE,
};

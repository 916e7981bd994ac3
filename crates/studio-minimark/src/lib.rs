//! studio-minimark: minimark content tree types
//!
//! This crate provides:
//! - The tuple-shaped content tree (`MinimarkTree`, `MinimarkNode`)
//! - A total JSON codec: malformed entries decode to empty text
//!
//! ## Example
//!
//! ```rust
//! use studio_minimark::{MinimarkNode, MinimarkTree};
//!
//! let tree: MinimarkTree = serde_json::from_str(
//!     r#"{"type":"minimark","value":[["p",{},"Hello"]]}"#,
//! ).unwrap();
//!
//! assert_eq!(tree.value[0], MinimarkNode::tag("p", vec![MinimarkNode::text("Hello")]));
//! ```

pub mod minimark;

pub use minimark::{Attributes, Element, MinimarkNode, MinimarkTree};

//! Serialized DOM shape used by node parse and render rules

use std::collections::BTreeMap;

/// Elements serialized without a closing tag
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

/// Tag used in place of a tag name that is not a plain HTML name
const FALLBACK_TAG: &str = "div";

/// An HTML node
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HtmlNode {
    Element(HtmlElement),
    Text(String),
    Comment(String),
}

/// An HTML element
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HtmlElement {
    pub tag: String,
    pub attributes: BTreeMap<String, String>,
    pub children: Vec<HtmlNode>,
}

impl HtmlElement {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            ..Default::default()
        }
    }

    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    pub fn with_child(mut self, child: HtmlNode) -> Self {
        self.children.push(child);
        self
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    pub fn is_void(&self) -> bool {
        VOID_ELEMENTS.contains(&self.output_tag())
    }

    /// The tag as written out; invalid names become `div`
    fn output_tag(&self) -> &str {
        if is_valid_name(&self.tag) {
            &self.tag
        } else {
            FALLBACK_TAG
        }
    }

    /// Opening tag; attributes with invalid names are left out
    pub fn open_tag(&self) -> String {
        let mut out = format!("<{}", self.output_tag());
        for (name, value) in &self.attributes {
            if !is_valid_name(name) {
                tracing::debug!(tag = %self.tag, attribute = %name, "dropping invalid attribute name");
                continue;
            }
            out.push_str(&format!(r#" {}="{}""#, name, escape_attribute(value)));
        }
        out.push('>');
        out
    }

    /// Closing tag; empty for void elements
    pub fn close_tag(&self) -> String {
        if self.is_void() {
            String::new()
        } else {
            format!("</{}>", self.output_tag())
        }
    }

    pub fn to_html(&self) -> String {
        let mut out = self.open_tag();
        if !self.is_void() {
            for child in &self.children {
                out.push_str(&child.to_html());
            }
        }
        out.push_str(&self.close_tag());
        out
    }
}

impl HtmlNode {
    pub fn text(s: impl Into<String>) -> Self {
        HtmlNode::Text(s.into())
    }

    pub fn to_html(&self) -> String {
        match self {
            HtmlNode::Element(el) => el.to_html(),
            HtmlNode::Text(s) => escape_text(s),
            HtmlNode::Comment(s) => comment_html(s),
        }
    }
}

impl From<HtmlElement> for HtmlNode {
    fn from(el: HtmlElement) -> Self {
        HtmlNode::Element(el)
    }
}

/// `[A-Za-z][A-Za-z0-9-]*`
pub fn is_valid_name(name: &str) -> bool {
    let mut chars = name.chars();
    chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '-')
}

/// Serialize a comment so its text cannot close it early
///
/// Consecutive dashes are split by a space, and a space pads text that
/// starts with `>` or ends with `-`.
pub fn comment_html(text: &str) -> String {
    let mut body = String::with_capacity(text.len() + 2);
    let mut prev = None;
    for c in text.chars() {
        if c == '-' && prev == Some('-') {
            body.push(' ');
        }
        body.push(c);
        prev = Some(c);
    }
    if body.starts_with('>') || body.starts_with("->") {
        body.insert(0, ' ');
    }
    if body.ends_with('-') {
        body.push(' ');
    }
    format!("<!--{}-->", body)
}

/// Escape text content
pub fn escape_text(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Escape a double-quoted attribute value
pub fn escape_attribute(s: &str) -> String {
    escape_text(s).replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_html() {
        let el = HtmlElement::new("div")
            .with_attribute("data-callout", "")
            .with_attribute("data-type", "tip")
            .with_child(HtmlNode::text("a < b"));
        assert_eq!(
            el.to_html(),
            r#"<div data-callout="" data-type="tip">a &lt; b</div>"#
        );
    }

    #[test]
    fn test_void_element() {
        let el = HtmlElement::new("img").with_attribute("alt", r#"say "hi""#);
        assert!(el.is_void());
        assert_eq!(el.to_html(), r#"<img alt="say &quot;hi&quot;">"#);
    }

    #[test]
    fn test_comment() {
        assert_eq!(HtmlNode::Comment(" todo ".into()).to_html(), "<!-- todo -->");
    }

    #[test]
    fn test_comment_cannot_close_early() {
        assert_eq!(
            comment_html("--><script>alert(2)</script><!--"),
            "<!--- -><script>alert(2)</script><!- - -->"
        );
        assert_eq!(comment_html(">x"), "<!-- >x-->");
        assert_eq!(comment_html("a---b"), "<!--a- - -b-->");
    }

    #[test]
    fn test_invalid_names() {
        assert!(is_valid_name("data-callout"));
        assert!(is_valid_name("h2"));
        assert!(!is_valid_name(""));
        assert!(!is_valid_name("2col"));
        assert!(!is_valid_name("img src=x"));
        assert!(!is_valid_name("a\"onclick"));

        let el = HtmlElement::new("img src=x onerror=alert(1)")
            .with_attribute("x onmouseover=alert(1) y", "v")
            .with_attribute("title", "ok")
            .with_child(HtmlNode::text("body"));
        assert!(!el.is_void());
        assert_eq!(el.to_html(), r#"<div title="ok">body</div>"#);
    }
}

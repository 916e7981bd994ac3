//! Live-typing input rules
//!
//! Rules run against the text before the cursor plus the character just
//! typed. Positions are counted in chars; a non-text inline node counts as
//! one position and shows up as U+FFFC in the matched text.

use regex::{Captures, Regex};
use studio_tiptap::{Attributes, EditorNode};

/// Placeholder for non-text inline nodes in matched text
pub const OBJECT_REPLACEMENT: char = '\u{FFFC}';

/// Node attributes derived from a rule's captures
pub type CaptureAttrs = fn(&Captures<'_>) -> Attributes;

/// Turns a paragraph whose text matches into a block node
#[derive(Debug, Clone)]
pub struct BlockRule {
    pattern: Regex,
    node_type: String,
    defaults: Attributes,
    attrs: CaptureAttrs,
}

/// Replaces the matched trigger span with an inline node
#[derive(Debug, Clone)]
pub struct InlineRule {
    pattern: Regex,
    node_type: String,
    defaults: Attributes,
    attrs: CaptureAttrs,
    content_group: Option<usize>,
}

/// A fired inline rule, ready to apply to a textblock's content
#[derive(Debug, Clone, PartialEq)]
pub struct InlineTrigger {
    /// Start of the replaced span
    pub from: usize,
    /// End of the replaced span (exclusive)
    pub to: usize,
    /// Where the new node's content begins
    pub content_start: usize,
    pub node: EditorNode,
    /// Character re-inserted after the node
    pub typed: char,
}

impl BlockRule {
    pub(crate) fn new(
        pattern: Regex,
        node_type: impl Into<String>,
        defaults: Attributes,
        attrs: CaptureAttrs,
    ) -> Self {
        Self {
            pattern,
            node_type: node_type.into(),
            defaults,
            attrs,
        }
    }

    pub fn pattern(&self) -> &str {
        self.pattern.as_str()
    }

    pub fn node_type(&self) -> &str {
        &self.node_type
    }

    /// Replacement block for `block` if its text plus `typed` matches.
    ///
    /// The new block wraps one empty paragraph.
    pub fn apply(&self, block: &EditorNode, typed: char) -> Option<EditorNode> {
        let content = block.content.as_deref()?;
        let mut text = inline_text(content);
        text.push(typed);

        let caps = self.pattern.captures(&text)?;
        let mut attrs = self.defaults.clone();
        attrs.extend((self.attrs)(&caps));

        tracing::debug!(node_type = %self.node_type, "block input rule fired");
        Some(EditorNode::element(
            self.node_type.as_str(),
            attrs,
            vec![EditorNode::paragraph(vec![])],
        ))
    }
}

impl InlineRule {
    pub(crate) fn new(
        pattern: Regex,
        node_type: impl Into<String>,
        defaults: Attributes,
        attrs: CaptureAttrs,
        content_group: Option<usize>,
    ) -> Self {
        Self {
            pattern,
            node_type: node_type.into(),
            defaults,
            attrs,
            content_group,
        }
    }

    pub fn pattern(&self) -> &str {
        self.pattern.as_str()
    }

    pub fn node_type(&self) -> &str {
        &self.node_type
    }

    /// Match the rule against `text_before` followed by `typed`.
    ///
    /// The trigger span is the last occurrence of capture group 1 inside the
    /// full match (the full match when the group is absent), clamped to the
    /// match end and to the text before the cursor.
    pub fn matches(&self, text_before: &str, typed: char) -> Option<InlineTrigger> {
        let mut text = String::with_capacity(text_before.len() + typed.len_utf8());
        text.push_str(text_before);
        text.push(typed);

        let caps = self.pattern.captures(&text)?;
        let full = caps.get(0)?;
        let trigger = caps.get(1).unwrap_or(full);

        let offset = full.as_str().rfind(trigger.as_str())?;
        let start = full.start() + offset;
        let end = (start + trigger.as_str().len()).min(full.end());

        let from = text[..start].chars().count();
        let to = (from + text[start..end].chars().count()).min(text_before.chars().count());

        let content = self
            .content_group
            .and_then(|group| caps.get(group))
            .map(|m| m.as_str())
            .filter(|s| !s.is_empty())
            .map(|s| vec![EditorNode::text(s)])
            .unwrap_or_default();

        let mut attrs = self.defaults.clone();
        attrs.extend((self.attrs)(&caps));

        tracing::debug!(node_type = %self.node_type, from, to, "inline input rule fired");
        Some(InlineTrigger {
            from,
            to,
            content_start: from + 1,
            node: EditorNode::element(self.node_type.as_str(), attrs, content),
            typed,
        })
    }
}

impl InlineTrigger {
    /// Replace `from..to` in a textblock's content with the node and the typed character.
    pub fn apply(&self, content: &mut Vec<EditorNode>) {
        let start = split_at(content, self.from);
        let end = split_at(content, self.to);
        content.splice(
            start..end,
            [self.node.clone(), EditorNode::text(self.typed.to_string())],
        );
        normalize_text(content);
    }
}

/// Text of a textblock's content as seen by input rules
pub fn inline_text(content: &[EditorNode]) -> String {
    let mut out = String::new();
    for node in content {
        if node.is_text() {
            out.push_str(node.text.as_deref().unwrap_or_default());
        } else {
            out.push(OBJECT_REPLACEMENT);
        }
    }
    out
}

/// Append a typed character, carrying the marks of preceding text
pub fn insert_text(content: &mut Vec<EditorNode>, typed: char) {
    let marks = match content.last() {
        Some(last) if last.is_text() => last.marks.clone(),
        _ => Vec::new(),
    };
    content.push(EditorNode::text_with_marks(typed.to_string(), marks));
    normalize_text(content);
}

fn node_width(node: &EditorNode) -> usize {
    if node.is_text() {
        node.text.as_deref().unwrap_or_default().chars().count()
    } else {
        1
    }
}

/// Index of the first node at or after `pos`, splitting a text node if needed
fn split_at(content: &mut Vec<EditorNode>, pos: usize) -> usize {
    let mut offset = 0;
    for i in 0..content.len() {
        if offset == pos {
            return i;
        }
        let width = node_width(&content[i]);
        if pos < offset + width {
            let text = content[i].text.take().unwrap_or_default();
            let byte = text
                .char_indices()
                .nth(pos - offset)
                .map(|(b, _)| b)
                .unwrap_or(text.len());
            let (head, tail) = text.split_at(byte);
            let tail = EditorNode::text_with_marks(tail, content[i].marks.clone());
            content[i].text = Some(head.to_string());
            content.insert(i + 1, tail);
            return i + 1;
        }
        offset += width;
    }
    content.len()
}

/// Merge adjacent text nodes with equal marks and drop empty ones
fn normalize_text(content: &mut Vec<EditorNode>) {
    let mut merged: Vec<EditorNode> = Vec::with_capacity(content.len());
    for node in content.drain(..) {
        if node.is_text() && node.text.as_deref().unwrap_or_default().is_empty() {
            continue;
        }
        if let Some(last) = merged.last_mut() {
            if last.is_text() && node.is_text() && last.marks == node.marks {
                last.text
                    .get_or_insert_with(String::new)
                    .push_str(node.text.as_deref().unwrap_or_default());
                continue;
            }
        }
        merged.push(node);
    }
    *content = merged;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};
    use studio_tiptap::Mark;

    fn tag_attrs(caps: &Captures<'_>) -> Attributes {
        let mut attrs = Attributes::new();
        if let Some(tag) = caps.get(2) {
            attrs.insert("tag".to_string(), Value::String(tag.as_str().to_string()));
        }
        attrs
    }

    fn badge_rule() -> InlineRule {
        InlineRule::new(
            Regex::new(r"(?:^|\s)(:([a-zA-Z][\w-]*)\[([^\]]*)\])\s$").unwrap(),
            "inline-element",
            Attributes::new(),
            tag_attrs,
            Some(3),
        )
    }

    #[test]
    fn test_inline_trigger_span() {
        let trigger = badge_rule().matches("hello :badge[Beta]", ' ').unwrap();
        assert_eq!(trigger.from, 6);
        assert_eq!(trigger.to, 18);
        assert_eq!(trigger.content_start, 7);
        assert_eq!(trigger.node.attr_str("tag"), Some("badge"));
        assert_eq!(
            trigger.node.content,
            Some(vec![EditorNode::text("Beta")])
        );
    }

    #[test]
    fn test_inline_trigger_apply() {
        let mut content = vec![EditorNode::text("hello :badge[Beta]")];
        let trigger = badge_rule().matches(&inline_text(&content), ' ').unwrap();
        trigger.apply(&mut content);

        assert_eq!(content.len(), 3);
        assert_eq!(content[0], EditorNode::text("hello "));
        assert_eq!(content[1].node_type, "inline-element");
        assert_eq!(content[1].text_content(), "Beta");
        assert_eq!(content[2], EditorNode::text(" "));
    }

    #[test]
    fn test_inline_trigger_at_line_start() {
        let mut content = vec![EditorNode::text(":kbd[K]")];
        let trigger = badge_rule().matches(&inline_text(&content), ' ').unwrap();
        assert_eq!((trigger.from, trigger.to), (0, 7));
        trigger.apply(&mut content);
        assert_eq!(content[0].attr_str("tag"), Some("kbd"));
        assert_eq!(content[1], EditorNode::text(" "));
    }

    #[test]
    fn test_inline_trigger_empty_label_has_no_content() {
        let trigger = badge_rule().matches(":icon[]", ' ').unwrap();
        assert_eq!(trigger.node.content, Some(vec![]));
    }

    #[test]
    fn test_last_occurrence_of_capture() {
        // The captured text also appears earlier inside the full match
        fn no_attrs(_: &Captures<'_>) -> Attributes {
            Attributes::new()
        }
        let rule = InlineRule::new(
            Regex::new(r"(ab)c(ab)?\s$").unwrap(),
            "x",
            Attributes::new(),
            no_attrs,
            None,
        );
        let trigger = rule.matches("zabcab", ' ').unwrap();
        assert_eq!((trigger.from, trigger.to), (4, 6));
    }

    #[test]
    fn test_no_match_is_untouched() {
        let rule = badge_rule();
        let mut content = vec![EditorNode::text("hello")];
        for typed in " :badge[Beta".chars() {
            assert!(rule.matches(&inline_text(&content), typed).is_none());
            insert_text(&mut content, typed);
        }
        assert_eq!(content, vec![EditorNode::text("hello :badge[Beta")]);
    }

    #[test]
    fn test_surrounding_nodes_preserved() {
        let bold = vec![Mark::new("bold")];
        let mut content = vec![
            EditorNode::text_with_marks("Big", bold.clone()),
            EditorNode::leaf("hardBreak", Attributes::new()),
            EditorNode::text(" and :badge[New]"),
        ];
        let text = inline_text(&content);
        assert_eq!(text, "Big\u{FFFC} and :badge[New]");

        let trigger = badge_rule().matches(&text, ' ').unwrap();
        assert_eq!((trigger.from, trigger.to), (9, 20));
        trigger.apply(&mut content);

        assert_eq!(content[0], EditorNode::text_with_marks("Big", bold));
        assert_eq!(content[1].node_type, "hardBreak");
        assert_eq!(content[2], EditorNode::text(" and "));
        assert_eq!(content[3].node_type, "inline-element");
        assert_eq!(content[4], EditorNode::text(" "));
    }

    #[test]
    fn test_multibyte_positions() {
        let mut content = vec![EditorNode::text("héllo :badge[Bêta]")];
        let trigger = badge_rule().matches(&inline_text(&content), ' ').unwrap();
        assert_eq!((trigger.from, trigger.to), (6, 18));
        trigger.apply(&mut content);
        assert_eq!(content[0], EditorNode::text("héllo "));
        assert_eq!(content[1].text_content(), "Bêta");
    }

    #[test]
    fn test_block_rule() {
        fn callout_attrs(caps: &Captures<'_>) -> Attributes {
            let mut attrs = Attributes::new();
            attrs.insert("type".to_string(), json!(caps[1].to_string()));
            attrs
        }
        let mut defaults = Attributes::new();
        defaults.insert("props".to_string(), json!({}));
        let rule = BlockRule::new(
            Regex::new(r"^::(note|tip)\s$").unwrap(),
            "callout",
            defaults,
            callout_attrs,
        );

        let para = EditorNode::paragraph(vec![EditorNode::text("::tip")]);
        let block = rule.apply(&para, ' ').unwrap();
        assert_eq!(block.node_type, "callout");
        assert_eq!(block.attrs.get("type"), Some(&json!("tip")));
        assert_eq!(block.attrs.get("props"), Some(&json!({})));
        assert_eq!(block.content, Some(vec![EditorNode::paragraph(vec![])]));

        let para = EditorNode::paragraph(vec![EditorNode::text("say ::tip")]);
        assert!(rule.apply(&para, ' ').is_none());
        assert!(rule.apply(&EditorNode::text("::tip"), ' ').is_none());
    }

    #[test]
    fn test_insert_text_keeps_marks() {
        let bold = vec![Mark::new("bold")];
        let mut content = vec![EditorNode::text_with_marks("a", bold.clone())];
        insert_text(&mut content, 'b');
        assert_eq!(content, vec![EditorNode::text_with_marks("ab", bold)]);
    }
}

//! Inline mark handling across the bridge

/// How inline marks cross the bridge
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MarkPolicy {
    /// Text keeps only its string value
    #[default]
    Drop,
    /// Marks become wrapper elements on the content side and are
    /// unwrapped back into marks on the editor side
    Wrap,
}

/// Editor mark type to content tag
const MARK_TAGS: &[(&str, &str)] = &[
    ("bold", "strong"),
    ("italic", "em"),
    ("strike", "del"),
    ("code", "code"),
    ("underline", "u"),
    ("link", "a"),
    ("superscript", "sup"),
    ("subscript", "sub"),
];

/// Content tag for a mark type; unknown marks use their own name
pub fn tag_for_mark(mark_type: &str) -> &str {
    MARK_TAGS
        .iter()
        .find(|(mark, _)| *mark == mark_type)
        .map(|(_, tag)| *tag)
        .unwrap_or(mark_type)
}

/// Mark type for a content tag, if the tag is a known mark wrapper
pub fn mark_for_tag(tag: &str) -> Option<&'static str> {
    MARK_TAGS
        .iter()
        .find(|(_, t)| *t == tag)
        .map(|(mark, _)| *mark)
}

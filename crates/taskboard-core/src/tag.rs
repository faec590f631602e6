use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::id::TagId;

/// Color used when none is given.
pub const DEFAULT_TAG_COLOR: &str = "#6b7280";

/// Tags a fresh board starts with, as `(name, color)`.
pub const DEFAULT_TAGS: [(&str, &str); 11] = [
    ("frontend", "#3b82f6"),
    ("backend", "#8b5cf6"),
    ("bug", "#ef4444"),
    ("feature", "#10b981"),
    ("design", "#ec4899"),
    ("testing", "#f59e0b"),
    ("devops", "#06b6d4"),
    ("database", "#6366f1"),
    ("api", "#14b8a6"),
    ("ui/ux", "#f97316"),
    ("document", "#64748b"),
];

/// Registered tag with a display color.
///
/// Tasks carry tag names as plain strings; the registry only describes them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    /// Identifier of the tag.
    pub id: TagId,
    /// Lower-case name.
    pub name: String,
    /// Display color (e.g. `#ef4444`).
    pub color: String,
    /// Registration instant in UTC.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl Tag {
    /// Create a tag with a fresh id. The name is stored lower-cased.
    #[must_use]
    pub fn new(name: &str, color: impl Into<String>, now: OffsetDateTime) -> Self {
        Self {
            id: TagId::new(),
            name: name.to_lowercase(),
            color: color.into(),
            created_at: now,
        }
    }

    /// Rename and recolor in place. The name is stored lower-cased.
    pub fn rename(&mut self, name: &str, color: impl Into<String>) {
        self.name = name.to_lowercase();
        self.color = color.into();
    }
}

/// Registry entries for [`DEFAULT_TAGS`].
#[must_use]
pub fn default_tags(now: OffsetDateTime) -> Vec<Tag> {
    DEFAULT_TAGS
        .iter()
        .map(|(name, color)| Tag::new(name, *color, now))
        .collect()
}

/// Find the first tag whose name equals `name`, ignoring case.
#[must_use]
pub fn find_tag<'a>(tags: &'a [Tag], name: &str) -> Option<&'a Tag> {
    let needle = name.trim().to_lowercase();
    tags.iter().find(|tag| tag.name.to_lowercase() == needle)
}

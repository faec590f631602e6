use crate::task::Task;

/// Case-insensitive substring matcher for task fields.
pub struct TextMatcher {
    needle: String,
}

impl TextMatcher {
    /// Lowercase a query string into a matcher. Returns `None` for blank inputs.
    ///
    /// Surrounding whitespace only decides blankness; a non-blank query is
    /// searched for as typed, spaces included.
    #[must_use]
    pub fn new(query: &str) -> Option<Self> {
        if query.trim().is_empty() {
            return None;
        }
        Some(Self {
            needle: query.to_lowercase(),
        })
    }

    /// Determine whether the title, description or any tag contains the query.
    #[must_use]
    pub fn matches(&self, task: &Task) -> bool {
        self.matches_field(&task.title)
            || self.matches_field(&task.description)
            || task.tags.iter().any(|tag| self.matches_field(tag))
    }

    fn matches_field(&self, value: &str) -> bool {
        value.to_lowercase().contains(&self.needle)
    }
}

use taskboard_core::task::{ParsePriorityError, ParseStatusError};
use taskboard_core::user::find_user;
use taskboard_core::{Filters, Priority, Status, User, UserId};
use thiserror::Error;
use time::Date;
use time::macros::format_description;

/// Error type returned while turning user-facing strings into board values.
#[derive(Debug, Error)]
pub enum FilterBuildError {
    /// Priority token is not `low`, `medium` or `high`.
    #[error(transparent)]
    InvalidPriority(#[from] ParsePriorityError),
    /// Status token does not name a column.
    #[error(transparent)]
    InvalidStatus(#[from] ParseStatusError),
    /// Assignee is neither a user id nor a known user name.
    #[error("unknown assignee: {token}")]
    UnknownAssignee {
        /// Input as given.
        token: String,
    },
    /// Due date is not `YYYY-MM-DD`.
    #[error("invalid due date {token:?}: {source}")]
    InvalidDueDate {
        /// Input as given.
        token: String,
        /// Parser failure.
        #[source]
        source: time::error::Parse,
    },
}

/// Result alias for filter construction helpers.
pub type FilterBuildResult<T> = Result<T, FilterBuildError>;

/// Builder that accepts user-facing strings and normalizes them into [`Filters`].
#[derive(Debug, Clone, Default)]
pub struct FilterBuilder {
    filters: Filters,
}

impl FilterBuilder {
    /// Create an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add assignees given as ids or user names (case-insensitive).
    ///
    /// # Errors
    /// Returns an error if a token matches no user and is not a valid id.
    pub fn with_assignees(mut self, tokens: &[String], users: &[User]) -> FilterBuildResult<Self> {
        for token in tokens {
            let id = resolve_assignee(token, users)?;
            if !self.filters.assignees.contains(&id) {
                self.filters.assignees.push(id);
            }
        }
        Ok(self)
    }

    /// Add tags (blank entries are ignored).
    #[must_use]
    pub fn with_tags(mut self, tags: &[String]) -> Self {
        for tag in normalize_tags(tags) {
            if !self.filters.tags.contains(&tag) {
                self.filters.tags.push(tag);
            }
        }
        self
    }

    /// Add priorities from tokens.
    ///
    /// # Errors
    /// Returns an error if a token is not a known priority.
    pub fn with_priorities(mut self, tokens: &[String]) -> FilterBuildResult<Self> {
        for priority in parse_priority_tokens(tokens)? {
            if !self.filters.priorities.contains(&priority) {
                self.filters.priorities.push(priority);
            }
        }
        Ok(self)
    }

    /// Configure the optional search text, kept as typed.
    ///
    /// Whitespace-only text is stored empty; any other text keeps its spaces.
    #[must_use]
    pub fn with_text(mut self, text: Option<String>) -> Self {
        self.filters.query = text.filter(|raw| !raw.trim().is_empty()).unwrap_or_default();
        self
    }

    /// Build the final [`Filters`].
    #[must_use]
    pub fn build(self) -> Filters {
        self.filters
    }
}

/// Convert tokens into [`Priority`] values.
///
/// # Errors
/// Returns an error if any token does not match a priority.
pub fn parse_priority_tokens(tokens: &[String]) -> FilterBuildResult<Vec<Priority>> {
    tokens
        .iter()
        .map(|token| token.parse::<Priority>().map_err(FilterBuildError::from))
        .collect()
}

/// Convert a token into a [`Status`], accepting `in-progress`, `In Review`, etc.
///
/// # Errors
/// Returns an error if the token does not name a column.
pub fn parse_status(token: &str) -> FilterBuildResult<Status> {
    Ok(token.parse::<Status>()?)
}

/// Resolve an assignee given as a user id or a user name.
///
/// Ids are accepted even when no such user is known.
///
/// # Errors
/// Returns an error if the token is not an id and matches no user name.
pub fn resolve_assignee(token: &str, users: &[User]) -> FilterBuildResult<UserId> {
    if let Some(user) = find_user(users, token) {
        return Ok(user.id);
    }
    token.parse::<UserId>().map_err(|_| FilterBuildError::UnknownAssignee {
        token: token.to_owned(),
    })
}

/// Parse a `YYYY-MM-DD` due date.
///
/// # Errors
/// Returns an error if the input is not a valid calendar date.
pub fn parse_due_date(token: &str) -> FilterBuildResult<Date> {
    Date::parse(token.trim(), format_description!("[year]-[month]-[day]")).map_err(|source| {
        FilterBuildError::InvalidDueDate {
            token: token.to_owned(),
            source,
        }
    })
}

/// Trim tags, splitting comma-separated entries and dropping blanks.
#[must_use]
pub fn normalize_tags(tags: &[String]) -> Vec<String> {
    tags.iter()
        .flat_map(|raw| raw.split(','))
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .map(str::to_owned)
        .collect()
}

use serde::{Deserialize, Serialize};

use crate::id::UserId;

/// Person tasks can be assigned to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Identifier referenced by `Task::assignee` and `Activity::user_id`.
    pub id: UserId,
    /// Display name.
    pub name: String,
    /// Avatar URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    /// Free-form role label.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

impl User {
    /// Create a user with a fresh id.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: UserId::new(),
            name: name.into(),
            avatar: None,
            role: None,
        }
    }

    /// Set the role label.
    #[must_use]
    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.role = Some(role.into());
        self
    }
}

/// Find the first user whose id or name (case-insensitive) equals `needle`.
#[must_use]
pub fn find_user<'a>(users: &'a [User], needle: &str) -> Option<&'a User> {
    let needle = needle.trim();
    if let Ok(id) = needle.parse::<UserId>() {
        return users.iter().find(|user| user.id == id);
    }
    users
        .iter()
        .find(|user| user.name.to_lowercase() == needle.to_lowercase())
}

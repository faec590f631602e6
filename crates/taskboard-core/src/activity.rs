use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::id::{ActivityId, TaskId, UserId};

/// Number of entries kept by default.
pub const DEFAULT_ACTIVITY_CAPACITY: usize = 100;

/// What happened to the referenced task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityKind {
    /// Task was created.
    Create,
    /// Task fields were edited.
    Update,
    /// Task moved to another column.
    StatusChange,
    /// Task was deleted.
    Delete,
    /// A note was left on the task.
    Comment,
}

impl ActivityKind {
    /// Wire representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Update => "update",
            Self::StatusChange => "status_change",
            Self::Delete => "delete",
            Self::Comment => "comment",
        }
    }
}

/// Entry of the activity log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Activity {
    /// Identifier of the entry.
    pub id: ActivityId,
    /// Classification.
    #[serde(rename = "type")]
    pub kind: ActivityKind,
    /// Task the entry refers to. The task may no longer exist.
    pub task_id: TaskId,
    /// User the entry is attributed to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<UserId>,
    /// When the entry was recorded.
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
    /// Human-readable summary.
    pub message: String,
}

/// Activity fields supplied by the recorder's caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivityDraft {
    /// Classification.
    pub kind: ActivityKind,
    /// Task the entry refers to.
    pub task_id: TaskId,
    /// User the entry is attributed to.
    pub user_id: Option<UserId>,
    /// Human-readable summary.
    pub message: String,
}

impl ActivityDraft {
    /// Build a draft.
    #[must_use]
    pub fn new(
        kind: ActivityKind,
        task_id: TaskId,
        user_id: Option<UserId>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            task_id,
            user_id,
            message: message.into(),
        }
    }
}

/// Bounded log ordered most recent first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivityLog {
    entries: Vec<Activity>,
    capacity: usize,
}

impl Default for ActivityLog {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_ACTIVITY_CAPACITY)
    }
}

impl ActivityLog {
    /// Empty log keeping at most `capacity` entries (at least one).
    #[must_use]
    pub const fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::new(),
            capacity: if capacity == 0 { 1 } else { capacity },
        }
    }

    /// Rebuild a log from persisted entries in any order.
    ///
    /// Entries are sorted newest first (stable for equal timestamps) and
    /// trimmed to `capacity`.
    #[must_use]
    pub fn from_entries(mut entries: Vec<Activity>, capacity: usize) -> Self {
        let mut log = Self::with_capacity(capacity);
        entries.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        entries.truncate(log.capacity);
        log.entries = entries;
        log
    }

    /// Stamp the draft, prepend it and drop whatever exceeds the capacity.
    pub fn record(&mut self, draft: ActivityDraft, now: OffsetDateTime) -> &Activity {
        let ActivityDraft {
            kind,
            task_id,
            user_id,
            message,
        } = draft;
        self.entries.insert(
            0,
            Activity {
                id: ActivityId::new(),
                kind,
                task_id,
                user_id,
                timestamp: now,
                message,
            },
        );
        self.entries.truncate(self.capacity);
        &self.entries[0]
    }

    /// Entries, most recent first.
    #[must_use]
    pub fn entries(&self) -> &[Activity] {
        &self.entries
    }

    /// Maximum number of retained entries.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of retained entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true when nothing has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries referring to `task`, most recent first.
    pub fn for_task(&self, task: TaskId) -> impl Iterator<Item = &Activity> {
        self.entries.iter().filter(move |entry| entry.task_id == task)
    }
}

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use time::{Date, OffsetDateTime};

use crate::id::{TaskId, UserId};

time::serde::format_description!(iso_date, Date, "[year]-[month]-[day]");

/// Board column a task lives in. Variants are declared in column order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    /// Not started.
    Todo,
    /// Actively being worked on.
    InProgress,
    /// Waiting for review.
    InReview,
    /// Completed.
    Done,
}

impl Status {
    /// Every status in board column order.
    pub const ALL: [Self; 4] = [Self::Todo, Self::InProgress, Self::InReview, Self::Done];

    /// Wire representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Todo => "todo",
            Self::InProgress => "in_progress",
            Self::InReview => "in_review",
            Self::Done => "done",
        }
    }

    /// Column heading.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Todo => "To Do",
            Self::InProgress => "In Progress",
            Self::InReview => "In Review",
            Self::Done => "Done",
        }
    }

    /// Lower-case words used in activity messages (`in progress`).
    #[must_use]
    pub fn words(self) -> String {
        self.as_str().replace('_', " ")
    }

    /// Position of the column on the board.
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Token could not be mapped to a [`Status`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown status: {0}")]
pub struct ParseStatusError(pub String);

impl FromStr for Status {
    type Err = ParseStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace(['-', ' '], "_");
        match normalized.as_str() {
            "todo" | "to_do" => Ok(Self::Todo),
            "in_progress" | "inprogress" => Ok(Self::InProgress),
            "in_review" | "inreview" | "review" => Ok(Self::InReview),
            "done" => Ok(Self::Done),
            _ => Err(ParseStatusError(s.to_owned())),
        }
    }
}

/// Task urgency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    /// Can wait.
    Low,
    /// Default urgency.
    Medium,
    /// Needs attention first.
    High,
}

impl Priority {
    /// Every priority from lowest to highest.
    pub const ALL: [Self; 3] = [Self::Low, Self::Medium, Self::High];

    /// Wire representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Token could not be mapped to a [`Priority`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown priority: {0}")]
pub struct ParsePriorityError(pub String);

impl FromStr for Priority {
    type Err = ParsePriorityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "medium" | "med" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            _ => Err(ParsePriorityError(s.to_owned())),
        }
    }
}

/// A card on the board.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    /// Identifier of the task.
    pub id: TaskId,
    /// Human-readable title.
    pub title: String,
    /// Free-form description (may be empty).
    #[serde(default)]
    pub description: String,
    /// Column the task belongs to.
    pub status: Status,
    /// Urgency.
    pub priority: Priority,
    /// Attached tags in insertion order.
    #[serde(default)]
    pub tags: Vec<String>,
    /// Weak reference to the assigned user.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignee: Option<UserId>,
    /// Optional due day.
    #[serde(default, with = "iso_date::option", skip_serializing_if = "Option::is_none")]
    pub due_date: Option<Date>,
    /// Creation instant in UTC.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    /// Instant of the most recent mutation in UTC.
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
    /// Position key inside the status column (ascending).
    pub order: f64,
}

impl Task {
    /// Materialize a draft into a new task stamped with `now`.
    ///
    /// The order key starts at `now` in milliseconds so fresh tasks sort after
    /// everything created before them.
    #[must_use]
    pub fn from_draft(draft: TaskDraft, now: OffsetDateTime) -> Self {
        let TaskDraft {
            title,
            description,
            status,
            priority,
            tags,
            assignee,
            due_date,
        } = draft;
        Self {
            id: TaskId::new(),
            title,
            description,
            status,
            priority,
            tags,
            assignee,
            due_date,
            created_at: now,
            updated_at: now,
            order: unix_millis(now),
        }
    }

    /// Merge the fields present in `patch` and bump `updated_at`.
    pub fn apply_patch(&mut self, patch: TaskPatch, now: OffsetDateTime) {
        let TaskPatch {
            title,
            description,
            status,
            priority,
            tags,
            assignee,
            due_date,
        } = patch;
        if let Some(title) = title {
            self.title = title;
        }
        if let Some(description) = description {
            self.description = description;
        }
        if let Some(status) = status {
            self.status = status;
        }
        if let Some(priority) = priority {
            self.priority = priority;
        }
        if let Some(tags) = tags {
            self.tags = tags;
        }
        if let Some(assignee) = assignee {
            self.assignee = assignee;
        }
        if let Some(due_date) = due_date {
            self.due_date = due_date;
        }
        self.updated_at = now;
    }

    /// Case-sensitive tag membership.
    #[must_use]
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|candidate| candidate == tag)
    }
}

/// Milliseconds since the Unix epoch as an order key.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn unix_millis(ts: OffsetDateTime) -> f64 {
    (ts.unix_timestamp_nanos() / 1_000_000) as f64
}

/// Caller-supplied fields for a new task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskDraft {
    /// Human-readable title (validated by the caller).
    pub title: String,
    /// Free-form description.
    #[serde(default)]
    pub description: String,
    /// Initial column.
    pub status: Status,
    /// Urgency.
    pub priority: Priority,
    /// Tags to attach.
    #[serde(default)]
    pub tags: Vec<String>,
    /// Assigned user.
    #[serde(default)]
    pub assignee: Option<UserId>,
    /// Optional due day.
    #[serde(default, with = "iso_date::option")]
    pub due_date: Option<Date>,
}

impl TaskDraft {
    /// Draft with a title and defaults for everything else (`todo`, `medium`).
    #[must_use]
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: String::new(),
            status: Status::Todo,
            priority: Priority::Medium,
            tags: Vec::new(),
            assignee: None,
            due_date: None,
        }
    }

    /// Set the initial column.
    #[must_use]
    pub const fn with_status(mut self, status: Status) -> Self {
        self.status = status;
        self
    }

    /// Set the urgency.
    #[must_use]
    pub const fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    /// Set the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Replace the tag list.
    #[must_use]
    pub fn with_tags<I, T>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    /// Set the assignee.
    #[must_use]
    pub const fn with_assignee(mut self, assignee: UserId) -> Self {
        self.assignee = Some(assignee);
        self
    }

    /// Set the due day.
    #[must_use]
    pub const fn with_due_date(mut self, due_date: Date) -> Self {
        self.due_date = Some(due_date);
        self
    }
}

/// Partial update merged into an existing task. `None` leaves a field as is.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskPatch {
    /// Overwrite the title.
    pub title: Option<String>,
    /// Overwrite the description.
    pub description: Option<String>,
    /// Overwrite the column without touching the order key.
    pub status: Option<Status>,
    /// Overwrite the urgency.
    pub priority: Option<Priority>,
    /// Replace the tag list.
    pub tags: Option<Vec<String>>,
    /// Set (`Some(Some(_))`) or clear (`Some(None)`) the assignee.
    pub assignee: Option<Option<UserId>>,
    /// Set (`Some(Some(_))`) or clear (`Some(None)`) the due day.
    pub due_date: Option<Option<Date>>,
}

impl TaskPatch {
    /// Returns true when the patch would not change any field.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.status.is_none()
            && self.priority.is_none()
            && self.tags.is_none()
            && self.assignee.is_none()
            && self.due_date.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::{date, datetime};

    #[test]
    fn status_tokens_are_normalized() {
        let parsed: Vec<Status> = ["todo", "In-Progress", "in review", " DONE "]
            .iter()
            .map(|token| token.parse().unwrap_or_else(|err| panic!("{err}")))
            .collect();
        assert_eq!(parsed, Status::ALL.to_vec());
        assert!("blocked".parse::<Status>().is_err());
    }

    #[test]
    fn status_words_drop_underscores() {
        assert_eq!(Status::InProgress.words(), "in progress");
        assert_eq!(Status::InReview.words(), "in review");
        assert_eq!(Status::Todo.words(), "todo");
    }

    #[test]
    fn from_draft_uses_millisecond_order_key() {
        let now = datetime!(2025-03-01 12:00:00.250 UTC);
        let task = Task::from_draft(TaskDraft::new("Write docs"), now);
        assert_eq!(task.created_at, now);
        assert_eq!(task.updated_at, now);
        assert!((task.order - 1_740_830_400_250.0).abs() < f64::EPSILON);
    }

    #[test]
    fn apply_patch_merges_only_present_fields() {
        let now = datetime!(2025-03-01 12:00:00 UTC);
        let assignee = UserId::new();
        let mut task = Task::from_draft(
            TaskDraft::new("Original")
                .with_description("keep me")
                .with_assignee(assignee)
                .with_tags(["api"]),
            now,
        );
        let later = datetime!(2025-03-02 08:00:00 UTC);
        task.apply_patch(
            TaskPatch {
                title: Some("Renamed".into()),
                assignee: Some(None),
                due_date: Some(Some(date!(2025 - 04 - 01))),
                ..TaskPatch::default()
            },
            later,
        );

        assert_eq!(task.title, "Renamed");
        assert_eq!(task.description, "keep me");
        assert_eq!(task.tags, vec!["api".to_owned()]);
        assert!(task.assignee.is_none());
        assert_eq!(task.due_date, Some(date!(2025 - 04 - 01)));
        assert_eq!(task.updated_at, later);
        assert_eq!(task.created_at, now);
    }

    #[test]
    fn task_wire_format_uses_snake_case_and_iso_dates() {
        let now = datetime!(2025-03-01 12:00:00 UTC);
        let task = Task::from_draft(
            TaskDraft::new("Ship")
                .with_status(Status::InReview)
                .with_priority(Priority::High)
                .with_due_date(date!(2025 - 03 - 09)),
            now,
        );
        let value = serde_json::to_value(&task).unwrap_or_else(|err| panic!("serialize: {err}"));
        assert_eq!(value["status"], "in_review");
        assert_eq!(value["priority"], "high");
        assert_eq!(value["due_date"], "2025-03-09");
        assert_eq!(value["created_at"], "2025-03-01T12:00:00Z");
        assert!(value.get("assignee").is_none());

        let back: Task = serde_json::from_value(value).unwrap_or_else(|err| panic!("deserialize: {err}"));
        assert_eq!(back, task);
    }
}

//! Domain types and pure board logic for taskboard.
//!
//! Nothing in this crate performs I/O: tasks are filtered, grouped into
//! status columns, reordered and summarized as plain values. Callers own the
//! clock and pass timestamps in explicitly.

/// Activity feed entries and the bounded log.
pub mod activity;
/// Filter criteria.
pub mod filter;
/// Status column grouping.
pub mod group;
/// Identifier types.
pub mod id;
/// Order keys and drop resolution.
pub mod ordering;
/// Board statistics.
pub mod stats;
/// Tag registry.
pub mod tag;
/// Task records, drafts and patches.
pub mod task;
/// Free-text search over task fields.
pub mod text_matcher;
/// Assignable people.
pub mod user;

pub use activity::{Activity, ActivityDraft, ActivityKind, ActivityLog, DEFAULT_ACTIVITY_CAPACITY};
pub use filter::{Filters, apply_filters};
pub use group::{GroupedTasks, StatusCounts, counts_by_status, group_by_status};
pub use id::{ActivityId, TagId, TaskId, UserId};
pub use ordering::{DropEvent, DropTarget, MoveCommand, OrderingPolicy, resolve_drop};
pub use tag::Tag;
pub use task::{Priority, Status, Task, TaskDraft, TaskPatch};
pub use user::User;

//! Aggregate board statistics.
//!
//! Everything here is a pure function of the task list and a reference
//! instant supplied by the caller.

use std::collections::HashMap;

use serde::{Serialize, Serializer};
use time::{Date, OffsetDateTime, UtcOffset};

use crate::id::UserId;
use crate::task::{Priority, Status, Task};
use crate::user::User;

/// Share of finished tasks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Progress {
    /// Tasks in `done`.
    pub completed: usize,
    /// All tasks.
    pub total: usize,
    /// Rounded percentage, 0 when there are no tasks.
    pub percentage: u32,
}

/// Task counts per priority for one status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PriorityBreakdown {
    /// Column being described.
    pub status: Status,
    /// Low-priority tasks.
    pub low: usize,
    /// Medium-priority tasks.
    pub medium: usize,
    /// High-priority tasks.
    pub high: usize,
}

/// Number of tasks carrying a tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TagCount {
    /// Tag text.
    pub tag: String,
    /// Tasks carrying it.
    pub count: usize,
}

/// Number of tasks attributed to one registered user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AssigneeCount {
    /// Assignee.
    pub user: UserId,
    /// Tasks counted for the assignee.
    pub count: usize,
}

/// Tasks created and completed on one day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct VelocityPoint {
    /// Calendar day (UTC).
    #[serde(serialize_with = "serialize_day")]
    pub date: Date,
    /// Tasks created that day.
    pub created: usize,
    /// Done tasks last updated that day.
    pub completed: usize,
}

#[allow(clippy::trivially_copy_pass_by_ref)]
fn serialize_day<S: Serializer>(date: &Date, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(date)
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
fn percent(part: usize, whole: usize) -> u32 {
    if whole == 0 {
        return 0;
    }
    ((part as f64 / whole as f64) * 100.0).round() as u32
}

/// Completed versus total tasks.
#[must_use]
pub fn progress(tasks: &[Task]) -> Progress {
    let completed = tasks.iter().filter(|task| task.status == Status::Done).count();
    Progress {
        completed,
        total: tasks.len(),
        percentage: percent(completed, tasks.len()),
    }
}

/// Open tasks whose due day lies strictly before `today`.
#[must_use]
pub fn count_overdue(tasks: &[Task], today: Date) -> usize {
    tasks
        .iter()
        .filter(|task| task.status != Status::Done)
        .filter(|task| task.due_date.is_some_and(|due| due < today))
        .count()
}

/// Percentage of tasks created after `since` that are done.
#[must_use]
pub fn completion_rate(tasks: &[Task], since: OffsetDateTime) -> u32 {
    let recent: Vec<&Task> = tasks.iter().filter(|task| task.created_at > since).collect();
    let done = recent.iter().filter(|task| task.status == Status::Done).count();
    percent(done, recent.len())
}

/// Percentage of done tasks (created after `since`, with a due day) whose last
/// update happened on or before the due day.
#[must_use]
pub fn on_time_percentage(tasks: &[Task], since: OffsetDateTime) -> u32 {
    let mut considered = 0;
    let mut on_time = 0;
    for task in tasks {
        let Some(due) = task.due_date else {
            continue;
        };
        if task.status != Status::Done || task.created_at <= since {
            continue;
        }
        considered += 1;
        if task.updated_at.date() <= due {
            on_time += 1;
        }
    }
    percent(on_time, considered)
}

/// Priority histogram for every status, in column order.
#[must_use]
pub fn status_priority_matrix(tasks: &[Task]) -> Vec<PriorityBreakdown> {
    Status::ALL
        .into_iter()
        .map(|status| {
            let count = |priority: Priority| {
                tasks
                    .iter()
                    .filter(|task| task.status == status && task.priority == priority)
                    .count()
            };
            PriorityBreakdown {
                status,
                low: count(Priority::Low),
                medium: count(Priority::Medium),
                high: count(Priority::High),
            }
        })
        .collect()
}

/// Tag usage, most used first. Ties keep first-seen order.
#[must_use]
pub fn tag_distribution(tasks: &[Task]) -> Vec<TagCount> {
    let mut counts: Vec<TagCount> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();
    for tag in tasks.iter().flat_map(|task| task.tags.iter()) {
        if let Some(&slot) = index.get(tag.as_str()) {
            counts[slot].count += 1;
        } else {
            index.insert(tag.as_str(), counts.len());
            counts.push(TagCount {
                tag: tag.clone(),
                count: 1,
            });
        }
    }
    counts.sort_by(|a, b| b.count.cmp(&a.count));
    counts
}

fn count_for_users<'a>(tasks: impl Iterator<Item = &'a Task>, users: &[User]) -> Vec<AssigneeCount> {
    let mut counts: HashMap<UserId, usize> = HashMap::new();
    for user in tasks.filter_map(|task| task.assignee) {
        *counts.entry(user).or_default() += 1;
    }
    let mut rows: Vec<AssigneeCount> = users
        .iter()
        .map(|user| AssigneeCount {
            user: user.id,
            count: counts.get(&user.id).copied().unwrap_or_default(),
        })
        .collect();
    rows.sort_by(|a, b| b.count.cmp(&a.count));
    rows
}

/// Open tasks for every registered user, busiest first.
///
/// Users without tasks are listed with 0. Assignees that are not registered
/// users are left out.
#[must_use]
pub fn workload(tasks: &[Task], users: &[User]) -> Vec<AssigneeCount> {
    count_for_users(tasks.iter().filter(|task| task.status != Status::Done), users)
}

/// Tasks finished after `since` for every registered user, most productive
/// first.
#[must_use]
pub fn leaderboard(tasks: &[Task], users: &[User], since: OffsetDateTime) -> Vec<AssigneeCount> {
    count_for_users(
        tasks
            .iter()
            .filter(|task| task.status == Status::Done && task.updated_at > since),
        users,
    )
}

fn utc_day(at: OffsetDateTime) -> Date {
    at.to_offset(UtcOffset::UTC).date()
}

/// Created and completed counts for every UTC day from `since` to `until`
/// (inclusive), oldest first. Days without activity are reported with zeros.
///
/// Only instants strictly between `since` and `until` are counted.
#[must_use]
pub fn velocity(tasks: &[Task], since: OffsetDateTime, until: OffsetDateTime) -> Vec<VelocityPoint> {
    let mut points = Vec::new();
    let mut day = utc_day(since);
    let last = utc_day(until);
    while day <= last {
        points.push(VelocityPoint {
            date: day,
            created: 0,
            completed: 0,
        });
        let Some(next) = day.next_day() else {
            break;
        };
        day = next;
    }

    let in_window = |at: OffsetDateTime| at > since && at < until;
    for task in tasks {
        if in_window(task.created_at)
            && let Some(point) = points.iter_mut().find(|point| point.date == utc_day(task.created_at))
        {
            point.created += 1;
        }
        if task.status == Status::Done
            && in_window(task.updated_at)
            && let Some(point) = points.iter_mut().find(|point| point.date == utc_day(task.updated_at))
        {
            point.completed += 1;
        }
    }
    points
}

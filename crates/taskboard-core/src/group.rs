//! Partitioning of tasks into ordered status columns.

use std::cmp::Ordering;

use crate::id::TaskId;
use crate::task::{Status, Task};

/// Tasks partitioned by status, each column sorted ascending by order key.
#[derive(Debug, Clone, Default)]
pub struct GroupedTasks<'a> {
    columns: [Vec<&'a Task>; 4],
}

impl<'a> GroupedTasks<'a> {
    /// Tasks of one column in display order.
    #[must_use]
    pub fn column(&self, status: Status) -> &[&'a Task] {
        &self.columns[status.index()]
    }

    /// Columns in board order.
    pub fn iter(&self) -> impl Iterator<Item = (Status, &[&'a Task])> {
        Status::ALL
            .into_iter()
            .map(move |status| (status, self.column(status)))
    }

    /// Total number of grouped tasks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.columns.iter().map(Vec::len).sum()
    }

    /// Returns true when every column is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.columns.iter().all(Vec::is_empty)
    }

    /// Locate a task, returning its column and index within it.
    #[must_use]
    pub fn position(&self, id: TaskId) -> Option<(Status, usize)> {
        self.iter().find_map(|(status, column)| {
            column
                .iter()
                .position(|task| task.id == id)
                .map(|index| (status, index))
        })
    }
}

/// Compare two tasks by order key. Incomparable keys (NaN) are treated as equal
/// so the stable sort keeps their relative position.
#[must_use]
pub fn compare_order(a: &Task, b: &Task) -> Ordering {
    a.order.partial_cmp(&b.order).unwrap_or(Ordering::Equal)
}

/// Stable ascending sort by order key.
pub fn sort_by_order(tasks: &mut [&Task]) {
    tasks.sort_by(|a, b| compare_order(a, b));
}

/// Partition `tasks` into the four status columns and sort each by order key.
///
/// Tasks with equal keys keep their relative input order.
#[must_use]
pub fn group_by_status<'a, I>(tasks: I) -> GroupedTasks<'a>
where
    I: IntoIterator<Item = &'a Task>,
{
    let mut grouped = GroupedTasks::default();
    for task in tasks {
        grouped.columns[task.status.index()].push(task);
    }
    for column in &mut grouped.columns {
        sort_by_order(column);
    }
    grouped
}

/// Number of tasks per status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatusCounts([usize; 4]);

impl StatusCounts {
    /// Count for one status.
    #[must_use]
    pub const fn get(&self, status: Status) -> usize {
        self.0[status.index()]
    }

    /// Sum over all statuses.
    #[must_use]
    pub fn total(&self) -> usize {
        self.0.iter().sum()
    }
}

/// Count tasks per status.
#[must_use]
pub fn counts_by_status<'a, I>(tasks: I) -> StatusCounts
where
    I: IntoIterator<Item = &'a Task>,
{
    let mut counts = [0; 4];
    for task in tasks {
        counts[task.status.index()] += 1;
    }
    StatusCounts(counts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::{Filters, apply_filters};
    use crate::id::UserId;
    use crate::task::TaskDraft;
    use time::macros::datetime;

    fn task(title: &str, status: Status, order: f64) -> Task {
        let mut task = Task::from_draft(
            TaskDraft::new(title).with_status(status),
            datetime!(2025-01-01 00:00 UTC),
        );
        task.order = order;
        task
    }

    fn titles(column: &[&Task]) -> Vec<String> {
        column.iter().map(|task| task.title.clone()).collect()
    }

    #[test]
    fn groups_cover_every_task_sorted_by_order() {
        let tasks = vec![
            task("c", Status::Todo, 3000.0),
            task("x", Status::Done, 10.0),
            task("a", Status::Todo, 1000.0),
            task("r", Status::InReview, -5.0),
            task("b", Status::Todo, 2000.0),
            task("p", Status::InProgress, 1.5),
        ];

        let grouped = group_by_status(apply_filters(&tasks, &Filters::default()));
        assert_eq!(grouped.len(), tasks.len());
        assert_eq!(titles(grouped.column(Status::Todo)), vec!["a", "b", "c"]);
        assert_eq!(titles(grouped.column(Status::InProgress)), vec!["p"]);
        assert_eq!(titles(grouped.column(Status::InReview)), vec!["r"]);
        assert_eq!(titles(grouped.column(Status::Done)), vec!["x"]);

        let order: Vec<Status> = grouped.iter().map(|(status, _)| status).collect();
        assert_eq!(order, Status::ALL.to_vec());
    }

    #[test]
    fn equal_keys_keep_input_order() {
        let tasks = vec![
            task("first", Status::Todo, 1000.0),
            task("second", Status::Todo, 1000.0),
            task("zero", Status::Todo, 0.0),
            task("third", Status::Todo, 1000.0),
        ];
        let grouped = group_by_status(&tasks);
        assert_eq!(
            titles(grouped.column(Status::Todo)),
            vec!["zero", "first", "second", "third"]
        );
    }

    #[test]
    fn dangling_assignee_is_grouped_normally() {
        let mut orphan = task("orphan", Status::InProgress, 1.0);
        orphan.assignee = Some(UserId::new());
        let tasks = vec![orphan];
        let grouped = group_by_status(&tasks);
        assert_eq!(grouped.position(tasks[0].id), Some((Status::InProgress, 0)));
    }

    #[test]
    fn counts_sum_to_total() {
        let tasks = vec![
            task("a", Status::Todo, 1.0),
            task("b", Status::Todo, 2.0),
            task("c", Status::Done, 1.0),
        ];
        let counts = counts_by_status(&tasks);
        assert_eq!(counts.get(Status::Todo), 2);
        assert_eq!(counts.get(Status::InReview), 0);
        assert_eq!(counts.get(Status::Done), 1);
        assert_eq!(counts.total(), 3);
    }
}

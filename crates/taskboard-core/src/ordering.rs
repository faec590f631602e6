//! Order-key computation for drag-and-drop.
//!
//! Keys are `f64` values sorted ascending inside a status column. Appending
//! leaves a fixed gap after the last key, a cross-column drop takes the
//! midpoint of two neighbors, and a same-column reorder renumbers the column.
//! When midpoint insertion would squeeze two keys closer than
//! [`OrderingPolicy::min_gap`], the destination column is renumbered instead.

use serde::{Deserialize, Serialize};

use crate::group::GroupedTasks;
use crate::id::TaskId;
use crate::task::{Status, Task};

/// Distance between consecutive keys after appending or renumbering.
pub const ORDER_GAP: f64 = 1000.0;
/// Smallest distance tolerated between neighbors before a column is renumbered.
pub const DEFAULT_MIN_GAP: f64 = 1e-6;

/// Where a dragged task was released.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropTarget {
    /// Empty or trailing area of a column.
    Column(Status),
    /// On top of another task.
    Task(TaskId),
}

/// Drag-end event reported by the UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DropEvent {
    /// Task being dragged.
    pub active: TaskId,
    /// Release target, `None` when dropped outside the board.
    pub over: Option<DropTarget>,
}

impl DropEvent {
    /// Drop onto a column region.
    #[must_use]
    pub const fn onto_column(active: TaskId, status: Status) -> Self {
        Self {
            active,
            over: Some(DropTarget::Column(status)),
        }
    }

    /// Drop onto another task.
    #[must_use]
    pub const fn onto_task(active: TaskId, target: TaskId) -> Self {
        Self {
            active,
            over: Some(DropTarget::Task(target)),
        }
    }
}

/// `(status, order)` assignment for one task.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MoveCommand {
    /// Task to move.
    pub id: TaskId,
    /// Destination column.
    pub status: Status,
    /// New order key.
    pub order: f64,
}

/// Tunables for key assignment.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OrderingPolicy {
    /// Distance between consecutive keys when appending or renumbering.
    pub gap: f64,
    /// Minimum distance between neighbors produced by midpoint insertion.
    pub min_gap: f64,
}

impl Default for OrderingPolicy {
    fn default() -> Self {
        Self {
            gap: ORDER_GAP,
            min_gap: DEFAULT_MIN_GAP,
        }
    }
}

#[allow(clippy::float_cmp)]
fn same_key(a: f64, b: f64) -> bool {
    a == b
}

#[allow(clippy::cast_precision_loss)]
fn slot(index: usize, gap: f64) -> f64 {
    (index + 1) as f64 * gap
}

impl OrderingPolicy {
    /// Key placing a task after every task of `column`.
    #[must_use]
    pub fn append_order(&self, column: &[&Task]) -> f64 {
        column.last().map_or(self.gap, |last| last.order + self.gap)
    }

    /// Key for a task dropped onto `column[index]` coming from another column.
    ///
    /// Index 0 goes one gap before the target, the last index one gap after it,
    /// anything else takes the midpoint of `column[index - 1]` and
    /// `column[index]`. Returns `None` when `index` is out of range.
    #[must_use]
    pub fn insertion_order(&self, column: &[&Task], index: usize) -> Option<f64> {
        let target = column.get(index)?;
        if index == 0 {
            return Some(target.order - self.gap);
        }
        if index == column.len() - 1 {
            return Some(target.order + self.gap);
        }
        let before = column[index - 1];
        Some(f64::midpoint(before.order, target.order))
    }

    /// Assign `(index + 1) * gap` to every task of `sequence`, placing each in
    /// `status`. Only tasks whose key or status changes get a command.
    #[must_use]
    pub fn renumber(&self, status: Status, sequence: &[&Task]) -> Vec<MoveCommand> {
        sequence
            .iter()
            .enumerate()
            .filter_map(|(index, task)| {
                let order = slot(index, self.gap);
                (task.status != status || !same_key(task.order, order)).then_some(MoveCommand {
                    id: task.id,
                    status,
                    order,
                })
            })
            .collect()
    }

    /// Renumber a column in place of its current order.
    #[must_use]
    pub fn rebalance(&self, status: Status, column: &[&Task]) -> Vec<MoveCommand> {
        self.renumber(status, column)
    }

    /// Returns true when two neighbors of the (sorted) column are closer than
    /// `min_gap` or a key is not finite.
    #[must_use]
    pub fn needs_rebalance(&self, column: &[&Task]) -> bool {
        column.iter().any(|task| !task.order.is_finite())
            || column
                .windows(2)
                .any(|pair| pair[1].order - pair[0].order < self.min_gap)
    }

    /// Move `active` to the index of `over` inside `column` and renumber it.
    ///
    /// Empty when either task is missing from the column or both share an index.
    #[must_use]
    pub fn reorder_within(&self, status: Status, column: &[&Task], active: TaskId, over: TaskId) -> Vec<MoveCommand> {
        let from = column.iter().position(|task| task.id == active);
        let to = column.iter().position(|task| task.id == over);
        let (Some(from), Some(to)) = (from, to) else {
            return Vec::new();
        };
        if from == to {
            return Vec::new();
        }
        let mut reordered = column.to_vec();
        let moved = reordered.remove(from);
        reordered.insert(to, moved);
        self.renumber(status, &reordered)
    }

    /// Place `active` relative to `column[index]` in another column.
    ///
    /// Normally only `active` gets a command. When the resulting key would be
    /// too close to a neighbor the whole destination column is renumbered with
    /// `active` at its intended position.
    #[must_use]
    pub fn insert_into(&self, status: Status, column: &[&Task], index: usize, active: &Task) -> Vec<MoveCommand> {
        let Some(order) = self.insertion_order(column, index) else {
            return Vec::new();
        };
        // Midpoints land before the target; the trailing case lands after it.
        let position = if index != 0 && index == column.len() - 1 {
            column.len()
        } else {
            index
        };
        let before = position.checked_sub(1).and_then(|i| column.get(i));
        let after = column.get(position);
        let crowded = !order.is_finite()
            || before.is_some_and(|prev| order - prev.order < self.min_gap)
            || after.is_some_and(|next| next.order - order < self.min_gap);

        if !crowded {
            return vec![MoveCommand {
                id: active.id,
                status,
                order,
            }];
        }

        // `active` comes from another column, so renumbering always moves it.
        let mut sequence = column.to_vec();
        sequence.insert(position, active);
        self.renumber(status, &sequence)
    }

    /// Translate a drop event into the moves that realize it.
    ///
    /// `tasks` is the full collection (used to look up the dragged and target
    /// tasks); `grouped` is the column view the user dropped into. Returns an
    /// empty list for every no-op drop.
    #[must_use]
    pub fn resolve_drop(&self, tasks: &[Task], grouped: &GroupedTasks<'_>, event: &DropEvent) -> Vec<MoveCommand> {
        let Some(over) = event.over else {
            return Vec::new();
        };
        let Some(active) = tasks.iter().find(|task| task.id == event.active) else {
            return Vec::new();
        };

        match over {
            DropTarget::Column(status) => vec![MoveCommand {
                id: active.id,
                status,
                order: self.append_order(grouped.column(status)),
            }],
            DropTarget::Task(target_id) => {
                if target_id == active.id {
                    return Vec::new();
                }
                let Some(target) = tasks.iter().find(|task| task.id == target_id) else {
                    return Vec::new();
                };
                let status = target.status;
                let column = grouped.column(status);
                if active.status == status {
                    return self.reorder_within(status, column, active.id, target.id);
                }
                column
                    .iter()
                    .position(|task| task.id == target.id)
                    .map_or_else(Vec::new, |index| self.insert_into(status, column, index, active))
            }
        }
    }
}

/// [`OrderingPolicy::resolve_drop`] with the default policy.
#[must_use]
pub fn resolve_drop(tasks: &[Task], grouped: &GroupedTasks<'_>, event: &DropEvent) -> Vec<MoveCommand> {
    OrderingPolicy::default().resolve_drop(tasks, grouped, event)
}

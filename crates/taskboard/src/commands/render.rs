use std::io::Write;

use anyhow::Result;
use serde::Serialize;
use serde_json::{Map, Value};
use taskboard_app::Board;
use taskboard_core::stats::{self, AssigneeCount, PriorityBreakdown, Progress, TagCount, VelocityPoint};
use taskboard_core::{Activity, Filters, Status, Task, UserId};
use time::OffsetDateTime;

use crate::OutputFormat;

fn user_label(board: &Board, id: Option<UserId>) -> String {
    id.map_or_else(
        || "-".to_owned(),
        |id| {
            board
                .users()
                .iter()
                .find(|user| user.id == id)
                .map_or_else(|| id.to_string(), |user| user.name.clone())
        },
    )
}

fn short_id(id: impl ToString) -> String {
    id.to_string().chars().take(8).collect()
}

fn task_line(board: &Board, task: &Task) -> String {
    let tags = if task.tags.is_empty() {
        "-".to_owned()
    } else {
        task.tags.join(", ")
    };
    let due = task.due_date.map_or_else(|| "-".to_owned(), |due| due.to_string());
    format!(
        "  {} | {} | {} | {} | {} | {}",
        short_id(task.id),
        task.priority,
        task.title,
        tags,
        user_label(board, task.assignee),
        due
    )
}

/// Grouped board view.
pub fn columns(out: &mut impl Write, board: &Board, filters: &Filters, format: OutputFormat) -> Result<()> {
    let grouped = board.columns(filters);
    match format {
        OutputFormat::Json => {
            let mut columns = Map::new();
            for (status, tasks) in grouped.iter() {
                columns.insert(status.as_str().to_owned(), serde_json::to_value(tasks)?);
            }
            writeln!(out, "{}", serde_json::to_string_pretty(&Value::Object(columns))?)?;
        }
        OutputFormat::Table => {
            if grouped.is_empty() {
                if filters.is_empty() {
                    writeln!(out, "No tasks found")?;
                } else {
                    writeln!(out, "No tasks matched the provided filters")?;
                }
                return Ok(());
            }
            for (status, tasks) in grouped.iter() {
                writeln!(out, "{} ({})", status.label(), tasks.len())?;
                for task in tasks {
                    writeln!(out, "{}", task_line(board, task))?;
                }
            }
        }
    }
    Ok(())
}

/// Activity log entries.
pub fn activities(out: &mut impl Write, board: &Board, entries: &[&Activity], format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => writeln!(out, "{}", serde_json::to_string_pretty(entries)?)?,
        OutputFormat::Table => {
            for entry in entries {
                let when = entry
                    .timestamp
                    .format(&time::format_description::well_known::Rfc3339)?;
                writeln!(
                    out,
                    "{when} | {} | {} | {} | {}",
                    entry.kind.as_str(),
                    short_id(entry.task_id),
                    user_label(board, entry.user_id),
                    entry.message
                )?;
            }
        }
    }
    Ok(())
}

#[derive(Serialize)]
struct StatsReport {
    progress: Progress,
    counts: Vec<(Status, usize)>,
    overdue: usize,
    completion_rate: u32,
    on_time_percentage: u32,
    matrix: Vec<PriorityBreakdown>,
    tags: Vec<TagCount>,
    workload: Vec<AssigneeCount>,
    leaderboard: Vec<AssigneeCount>,
    velocity: Vec<VelocityPoint>,
}

/// Board statistics for the window from `since` to `now`.
pub fn stats(
    out: &mut impl Write,
    board: &Board,
    now: OffsetDateTime,
    since: OffsetDateTime,
    format: OutputFormat,
) -> Result<()> {
    let tasks = board.tasks();
    let users = board.users();
    let counts = board.counts(&Filters::default());
    let report = StatsReport {
        progress: stats::progress(tasks),
        counts: Status::ALL.into_iter().map(|status| (status, counts.get(status))).collect(),
        overdue: stats::count_overdue(tasks, now.date()),
        completion_rate: stats::completion_rate(tasks, since),
        on_time_percentage: stats::on_time_percentage(tasks, since),
        matrix: stats::status_priority_matrix(tasks),
        tags: stats::tag_distribution(tasks),
        workload: stats::workload(tasks, users),
        leaderboard: stats::leaderboard(tasks, users, since),
        velocity: stats::velocity(tasks, since, now),
    };

    if format == OutputFormat::Json {
        writeln!(out, "{}", serde_json::to_string_pretty(&report)?)?;
        return Ok(());
    }

    let Progress {
        completed,
        total,
        percentage,
    } = report.progress;
    writeln!(out, "Progress: {completed}/{total} ({percentage}%)")?;
    for (status, count) in &report.counts {
        writeln!(out, "  {}: {count}", status.label())?;
    }
    writeln!(out, "Overdue: {}", report.overdue)?;
    writeln!(out, "Completion rate: {}%", report.completion_rate)?;
    writeln!(out, "On time: {}%", report.on_time_percentage)?;
    writeln!(out, "Priority matrix (low/medium/high):")?;
    for row in &report.matrix {
        writeln!(out, "  {}: {}/{}/{}", row.status.label(), row.low, row.medium, row.high)?;
    }
    if !report.tags.is_empty() {
        writeln!(out, "Tags:")?;
        for TagCount { tag, count } in &report.tags {
            writeln!(out, "  {tag}: {count}")?;
        }
    }
    if !report.workload.is_empty() {
        writeln!(out, "Open tasks per assignee:")?;
        for entry in &report.workload {
            writeln!(out, "  {}: {}", user_label(board, Some(entry.user)), entry.count)?;
        }
    }
    if !report.leaderboard.is_empty() {
        writeln!(out, "Completed per assignee:")?;
        for entry in &report.leaderboard {
            writeln!(out, "  {}: {}", user_label(board, Some(entry.user)), entry.count)?;
        }
    }
    writeln!(out, "Velocity (created/completed):")?;
    for point in &report.velocity {
        writeln!(out, "  {}: {}/{}", point.date, point.created, point.completed)?;
    }
    Ok(())
}

/// Known users.
pub fn users(out: &mut impl Write, board: &Board) -> Result<()> {
    if board.users().is_empty() {
        writeln!(out, "No users found")?;
        return Ok(());
    }
    for user in board.users() {
        writeln!(
            out,
            "{} | {} | {}",
            user.id,
            user.name,
            user.role.as_deref().unwrap_or("-")
        )?;
    }
    Ok(())
}

/// Registered tags.
pub fn tags(out: &mut impl Write, board: &Board) -> Result<()> {
    if board.tags().is_empty() {
        writeln!(out, "No tags found")?;
        return Ok(());
    }
    for tag in board.tags() {
        writeln!(out, "{} | {}", tag.name, tag.color)?;
    }
    Ok(())
}

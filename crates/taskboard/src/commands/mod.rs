use std::io::Write;

use anyhow::{Context, Result, anyhow, bail};
use taskboard_app::{
    Board, FilterBuilder, normalize_tags, parse_due_date, parse_priority_tokens, parse_status, resolve_assignee,
};
use taskboard_core::{DropEvent, Filters, Priority, TaskDraft, TaskId, TaskPatch, User};
use time::{Duration, OffsetDateTime};

use crate::{Command, FilterArgs, TagCommand, UserCommand};

mod render;

/// Execute one command against a hydrated board, writing output to `out`.
pub fn run(command: Command, board: &mut Board, out: &mut impl Write) -> Result<()> {
    match command {
        Command::New {
            title,
            description,
            status,
            priority,
            tags,
            assignee,
            due,
        } => {
            let title = title.trim();
            if title.is_empty() {
                bail!("title must not be empty");
            }
            let mut draft = TaskDraft::new(title).with_tags(normalize_tags(&tags));
            if let Some(description) = description {
                draft = draft.with_description(description);
            }
            if let Some(status) = status {
                draft = draft.with_status(parse_status(&status)?);
            }
            if let Some(priority) = priority {
                draft = draft.with_priority(parse_priority(&priority)?);
            }
            if let Some(assignee) = assignee {
                draft = draft.with_assignee(resolve_assignee(&assignee, board.users())?);
            }
            if let Some(due) = due {
                draft = draft.with_due_date(parse_due_date(&due)?);
            }
            let id = board.create(draft);
            writeln!(out, "{id}")?;
        }

        Command::Edit {
            task,
            title,
            description,
            status,
            priority,
            tags,
            clear_tags,
            assignee,
            unassign,
            due,
            clear_due,
        } => {
            let id = resolve_task(board, &task)?;
            let mut patch = TaskPatch {
                title: title.map(|title| title.trim().to_owned()),
                description,
                ..TaskPatch::default()
            };
            if patch.title.as_deref().is_some_and(str::is_empty) {
                bail!("title must not be empty");
            }
            patch.status = status.as_deref().map(parse_status).transpose()?;
            patch.priority = priority.as_deref().map(parse_priority).transpose()?;
            if clear_tags {
                patch.tags = Some(Vec::new());
            } else if !tags.is_empty() {
                patch.tags = Some(normalize_tags(&tags));
            }
            if unassign {
                patch.assignee = Some(None);
            } else if let Some(assignee) = assignee {
                patch.assignee = Some(Some(resolve_assignee(&assignee, board.users())?));
            }
            if clear_due {
                patch.due_date = Some(None);
            } else if let Some(due) = due {
                patch.due_date = Some(Some(parse_due_date(&due)?));
            }
            if patch.is_empty() {
                bail!("nothing to change; pass at least one field to edit");
            }
            board.update(id, patch);
            writeln!(out, "Updated {id}")?;
        }

        Command::Rm { task } => {
            let id = resolve_task(board, &task)?;
            board.delete(id);
            writeln!(out, "Deleted {id}")?;
        }

        Command::Mv {
            task,
            over_task,
            over_column,
            filters,
        } => {
            let active = resolve_task(board, &task)?;
            let filters = build_filters(filters, board)?;
            let event = match (over_task, over_column) {
                (Some(target), _) => DropEvent::onto_task(active, resolve_task(board, &target)?),
                (None, Some(column)) => DropEvent::onto_column(active, parse_status(&column)?),
                (None, None) => bail!("either --over-task or --over-column is required"),
            };
            let moves = board.apply_drop(&filters, &event);
            if moves.is_empty() {
                writeln!(out, "Nothing moved")?;
            }
            for command in moves {
                writeln!(out, "{} -> {} @ {}", command.id, command.status, command.order)?;
            }
        }

        Command::Comment { task, message, user } => {
            let id = resolve_task(board, &task)?;
            let user = user
                .map(|user| resolve_assignee(&user, board.users()))
                .transpose()?;
            board.comment(id, user, message);
            writeln!(out, "Commented on {id}")?;
        }

        Command::Ls { filters, format } => {
            let filters = build_filters(filters, board)?;
            render::columns(out, board, &filters, format)?;
        }

        Command::Log { task, limit, format } => {
            let task = task.map(|task| resolve_task(board, &task)).transpose()?;
            let entries: Vec<_> = board
                .activities()
                .iter()
                .filter(|entry| task.is_none_or(|id| entry.task_id == id))
                .take(limit)
                .collect();
            render::activities(out, board, &entries, format)?;
        }

        Command::Stats { days, format } => {
            let now = OffsetDateTime::now_utc();
            let since = now - Duration::days(i64::from(days));
            render::stats(out, board, now, since, format)?;
        }

        Command::User(UserCommand::Add { name, role, avatar }) => {
            let name = name.trim();
            if name.is_empty() {
                bail!("user name must not be empty");
            }
            if board.find_user(name).is_some() {
                bail!("user {name:?} already exists");
            }
            let mut user = User::new(name);
            user.role = role;
            user.avatar = avatar;
            let id = board.add_user(user);
            writeln!(out, "{id}")?;
        }

        Command::User(UserCommand::Ls) => render::users(out, board)?,

        Command::Tag(TagCommand::Add { name, color }) => {
            let name = name.trim();
            if name.is_empty() {
                bail!("tag name must not be empty");
            }
            if board.find_tag(name).is_some() {
                bail!("tag {name:?} already exists");
            }
            let id = board.add_tag(name, color);
            writeln!(out, "{id}")?;
        }

        Command::Tag(TagCommand::Ls) => render::tags(out, board)?,

        Command::Tag(TagCommand::Rm { name }) => {
            let id = board
                .find_tag(&name)
                .map(|tag| tag.id)
                .with_context(|| format!("tag not found: {}", name.trim()))?;
            board.delete_tag(id);
            writeln!(out, "Deleted tag {}", name.trim().to_lowercase())?;
        }
    }
    Ok(())
}

fn parse_priority(token: &str) -> Result<Priority> {
    let mut parsed = parse_priority_tokens(&[token.to_owned()])?;
    parsed.pop().ok_or_else(|| anyhow!("missing priority"))
}

fn build_filters(args: FilterArgs, board: &Board) -> Result<Filters> {
    let FilterArgs {
        assignees,
        tags,
        priorities,
        query,
    } = args;
    Ok(FilterBuilder::new()
        .with_assignees(&assignees, board.users())?
        .with_tags(&tags)
        .with_priorities(&priorities)?
        .with_text(query)
        .build())
}

/// Resolve a full task id or a unique prefix of one.
fn resolve_task(board: &Board, token: &str) -> Result<TaskId> {
    let token = token.trim();
    if let Ok(id) = token.parse::<TaskId>() {
        return board
            .get(id)
            .map(|task| task.id)
            .with_context(|| format!("task not found: {id}"));
    }
    let needle = token.to_ascii_lowercase();
    if needle.is_empty() {
        bail!("task id must not be empty");
    }
    let mut matches = board
        .tasks()
        .iter()
        .filter(|task| task.id.to_string().starts_with(&needle));
    match (matches.next(), matches.next()) {
        (Some(task), None) => Ok(task.id),
        (Some(_), Some(_)) => bail!("task id prefix {token:?} is ambiguous"),
        (None, _) => bail!("task not found: {token}"),
    }
}

//! CLI entry point for taskboard.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use taskboard_app::{Board, BoardConfig, Persister};
use taskboard_core::tag::DEFAULT_TAG_COLOR;
use taskboard_store::JsonFileStore;
use tracing::debug;
use tracing_subscriber::{EnvFilter, fmt::format::FmtSpan};

mod commands;

/// Personal task board kept as JSON files in a data directory.
#[derive(Parser, Debug)]
#[command(
    name = "taskboard",
    version,
    about = "taskboard: a kanban board with ordered status columns stored as JSON files"
)]
struct Cli {
    /// Directory holding tasks.json, users.json, tags.json, activities.json and config.toml.
    #[arg(long, default_value = ".taskboard")]
    data_dir: PathBuf,

    #[command(subcommand)]
    cmd: Command,
}

/// Output format for listings.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    #[default]
    Table,
    Json,
}

/// Board filter flags shared by listing and drag commands.
#[derive(Args, Debug, Default, Clone)]
struct FilterArgs {
    /// Only tasks assigned to this user (name or id). Unassigned tasks always match.
    #[arg(short = 'a', long = "assignee")]
    assignees: Vec<String>,
    /// Only tasks carrying one of these tags.
    #[arg(short = 't', long = "tag")]
    tags: Vec<String>,
    /// Only tasks with one of these priorities.
    #[arg(short = 'p', long = "priority")]
    priorities: Vec<String>,
    /// Case-insensitive text matched against title, description and tags.
    #[arg(short = 'q', long)]
    query: Option<String>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create a new task at the bottom of its column.
    New {
        #[arg(long)]
        title: String,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        status: Option<String>,
        #[arg(long)]
        priority: Option<String>,
        #[arg(short = 't', long = "tag")]
        tags: Vec<String>,
        #[arg(short = 'a', long)]
        assignee: Option<String>,
        /// Due date as YYYY-MM-DD.
        #[arg(long)]
        due: Option<String>,
    },

    /// Edit fields of an existing task.
    Edit {
        /// Task id or unique id prefix.
        task: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        status: Option<String>,
        #[arg(long)]
        priority: Option<String>,
        /// Replace the tag list.
        #[arg(short = 't', long = "tag")]
        tags: Vec<String>,
        /// Remove every tag.
        #[arg(long, conflicts_with = "tags")]
        clear_tags: bool,
        #[arg(short = 'a', long)]
        assignee: Option<String>,
        #[arg(long, conflicts_with = "assignee")]
        unassign: bool,
        /// Due date as YYYY-MM-DD.
        #[arg(long)]
        due: Option<String>,
        #[arg(long, conflicts_with = "due")]
        clear_due: bool,
    },

    /// Delete a task. Its activity history is kept.
    Rm {
        /// Task id or unique id prefix.
        task: String,
    },

    /// Drag a task onto another task or onto a column.
    Mv {
        /// Task id or unique id prefix.
        task: String,
        /// Drop onto this task.
        #[arg(long, conflicts_with = "over_column", required_unless_present = "over_column")]
        over_task: Option<String>,
        /// Drop onto the end of this column.
        #[arg(long)]
        over_column: Option<String>,
        /// Filters defining the visible board the drop happens on.
        #[command(flatten)]
        filters: FilterArgs,
    },

    /// Add a comment to an existing task.
    Comment {
        /// Task id or unique id prefix.
        task: String,
        #[arg(short = 'm', long)]
        message: String,
        /// Author (name or id).
        #[arg(long)]
        user: Option<String>,
    },

    /// Show the board grouped by column.
    Ls {
        #[command(flatten)]
        filters: FilterArgs,
        #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },

    /// Show the activity log, newest first.
    Log {
        /// Only entries for this task.
        #[arg(long)]
        task: Option<String>,
        #[arg(short = 'n', long, default_value_t = 20)]
        limit: usize,
        #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },

    /// Show board statistics.
    Stats {
        /// Window for completion rate, on-time rate and leaderboard.
        #[arg(long, default_value_t = 30)]
        days: u16,
        #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },

    /// Manage users tasks can be assigned to.
    #[command(subcommand)]
    User(UserCommand),

    /// Manage the tag registry.
    #[command(subcommand)]
    Tag(TagCommand),
}

#[derive(Subcommand, Debug)]
enum UserCommand {
    /// Register a user.
    Add {
        name: String,
        #[arg(long)]
        role: Option<String>,
        #[arg(long)]
        avatar: Option<String>,
    },
    /// List users.
    Ls,
}

#[derive(Subcommand, Debug)]
enum TagCommand {
    /// Register a tag. Names are stored lower-case.
    Add {
        name: String,
        #[arg(long, default_value = DEFAULT_TAG_COLOR)]
        color: String,
    },
    /// List registered tags.
    Ls,
    /// Unregister a tag. Tasks keep the names they carry.
    Rm { name: String },
}

fn main() -> Result<()> {
    let Cli { data_dir, cmd } = Cli::parse();
    install_tracing();

    let runtime = tokio::runtime::Runtime::new().context("failed to start async runtime")?;
    runtime.block_on(execute_command(&data_dir, cmd))
}

async fn execute_command(data_dir: &Path, command: Command) -> Result<()> {
    debug!(data_dir = %data_dir.display(), ?command, "Executing command");
    let config = BoardConfig::load(data_dir)?;
    let store = Arc::new(JsonFileStore::new(data_dir));
    let persister = Persister::spawn(store.clone());
    let mut board = Board::load(store.as_ref(), persister, &config)
        .await
        .with_context(|| format!("failed to load board from {}", data_dir.display()))?;

    {
        let mut out = std::io::stdout().lock();
        commands::run(command, &mut board, &mut out)?;
    }

    board.persister().flush().await;
    Ok(())
}

fn install_tracing() {
    // RUST_LOG overrides the default INFO level.
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_span_events(FmtSpan::NONE)
        .compact()
        .try_init();
}

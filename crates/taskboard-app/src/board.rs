//! In-memory board state with asynchronous persistence.

use taskboard_core::activity::ActivityKind;
use taskboard_core::group::{GroupedTasks, StatusCounts, counts_by_status, group_by_status};
use taskboard_core::tag::{default_tags, find_tag};
use taskboard_core::user::find_user;
use taskboard_core::{
    Activity, ActivityDraft, ActivityLog, DropEvent, Filters, MoveCommand, OrderingPolicy, Status, Tag, TagId, Task,
    TaskDraft, TaskId, TaskPatch, User, UserId, apply_filters,
};
use taskboard_store::{Collection, RecordStore, StoreError, load_typed};
use time::OffsetDateTime;
use tracing::{debug, info};

use crate::config::BoardConfig;
use crate::persist::Persister;

/// Authoritative task, user, tag and activity collections.
///
/// Every mutation is applied to memory before returning and then handed to
/// the [`Persister`]. Operations on unknown task ids do nothing.
#[derive(Debug)]
pub struct Board {
    tasks: Vec<Task>,
    users: Vec<User>,
    tags: Vec<Tag>,
    activities: ActivityLog,
    policy: OrderingPolicy,
    persister: Persister,
}

impl Board {
    /// Empty board.
    #[must_use]
    pub fn new(config: &BoardConfig, persister: Persister) -> Self {
        Self::from_parts(Vec::new(), Vec::new(), Vec::new(), Vec::new(), config, persister)
    }

    /// Board over existing records. Activities are re-sorted newest first and
    /// trimmed to the configured capacity.
    #[must_use]
    pub fn from_parts(
        tasks: Vec<Task>,
        users: Vec<User>,
        tags: Vec<Tag>,
        activities: Vec<Activity>,
        config: &BoardConfig,
        persister: Persister,
    ) -> Self {
        Self {
            tasks,
            users,
            tags,
            activities: ActivityLog::from_entries(activities, config.activity_capacity),
            policy: config.ordering,
            persister,
        }
    }

    /// Hydrate a board from `store`.
    ///
    /// A store holding no records at all is a fresh board: the default tags
    /// are registered and scheduled for persistence.
    ///
    /// # Errors
    /// Returns a [`StoreError`] when a collection cannot be read or decoded.
    pub async fn load<S>(store: &S, persister: Persister, config: &BoardConfig) -> Result<Self, StoreError>
    where
        S: RecordStore + ?Sized,
    {
        let tasks: Vec<Task> = load_typed(store, Collection::Tasks).await?;
        let users: Vec<User> = load_typed(store, Collection::Users).await?;
        let mut tags: Vec<Tag> = load_typed(store, Collection::Tags).await?;
        let activities: Vec<Activity> = load_typed(store, Collection::Activities).await?;
        let fresh = tasks.is_empty() && users.is_empty() && tags.is_empty() && activities.is_empty();
        if fresh {
            tags = default_tags(OffsetDateTime::now_utc());
            persister.schedule(Collection::Tags, &tags);
            debug!(count = tags.len(), "Seeded default tags");
        }
        info!(
            tasks = tasks.len(),
            users = users.len(),
            tags = tags.len(),
            activities = activities.len(),
            "Loaded board"
        );
        Ok(Self::from_parts(tasks, users, tags, activities, config, persister))
    }

    /// Every task in collection order.
    #[must_use]
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    /// Known users.
    #[must_use]
    pub fn users(&self) -> &[User] {
        &self.users
    }

    /// Registered tags.
    #[must_use]
    pub fn tags(&self) -> &[Tag] {
        &self.tags
    }

    /// Activity log, newest first.
    #[must_use]
    pub fn activities(&self) -> &[Activity] {
        self.activities.entries()
    }

    /// Activity log with its capacity.
    #[must_use]
    pub const fn activity_log(&self) -> &ActivityLog {
        &self.activities
    }

    /// Order key tunables in effect.
    #[must_use]
    pub const fn policy(&self) -> &OrderingPolicy {
        &self.policy
    }

    /// Persistence handle, e.g. to flush outside a lock.
    #[must_use]
    pub const fn persister(&self) -> &Persister {
        &self.persister
    }

    /// Look up a task.
    #[must_use]
    pub fn get(&self, id: TaskId) -> Option<&Task> {
        self.tasks.iter().find(|task| task.id == id)
    }

    /// Look up a user by id or case-insensitive name.
    #[must_use]
    pub fn find_user(&self, needle: &str) -> Option<&User> {
        find_user(&self.users, needle)
    }

    /// Add a new task at the end of the collection.
    pub fn create(&mut self, draft: TaskDraft) -> TaskId {
        let task = Task::from_draft(draft, OffsetDateTime::now_utc());
        let id = task.id;
        let message = format!("created task \"{}\"", task.title);
        let assignee = task.assignee;
        self.tasks.push(task);
        self.persist_tasks();
        self.record(ActivityKind::Create, id, assignee, message);
        id
    }

    /// Merge `patch` into a task.
    pub fn update(&mut self, id: TaskId, patch: TaskPatch) {
        let Some(task) = self.tasks.iter_mut().find(|task| task.id == id) else {
            debug!(%id, "Ignoring update of unknown task");
            return;
        };
        let assignee = task.assignee;
        task.apply_patch(patch, OffsetDateTime::now_utc());
        let message = format!("updated task \"{}\"", task.title);
        self.persist_tasks();
        self.record(ActivityKind::Update, id, assignee, message);
    }

    /// Remove a task. Activities referring to it are kept.
    pub fn delete(&mut self, id: TaskId) {
        let Some(index) = self.tasks.iter().position(|task| task.id == id) else {
            debug!(%id, "Ignoring delete of unknown task");
            return;
        };
        let task = self.tasks.remove(index);
        self.persist_tasks();
        self.record(
            ActivityKind::Delete,
            id,
            task.assignee,
            format!("deleted task \"{}\"", task.title),
        );
    }

    /// Set a task's column and order key together.
    ///
    /// A `status_change` activity is recorded only when the column changes.
    pub fn move_task(&mut self, id: TaskId, status: Status, order: f64) {
        let Some(task) = self.tasks.iter_mut().find(|task| task.id == id) else {
            debug!(%id, "Ignoring move of unknown task");
            return;
        };
        let previous = task.status;
        task.status = status;
        task.order = order;
        task.updated_at = OffsetDateTime::now_utc();
        let assignee = task.assignee;
        self.persist_tasks();
        if previous != status {
            self.record(
                ActivityKind::StatusChange,
                id,
                assignee,
                format!("moved task to {}", status.words()),
            );
        }
    }

    /// Leave a note on a task.
    pub fn comment(&mut self, id: TaskId, user: Option<UserId>, message: impl Into<String>) {
        if self.get(id).is_none() {
            debug!(%id, "Ignoring comment on unknown task");
            return;
        }
        self.record(ActivityKind::Comment, id, user, message);
    }

    /// Register a user. No activity is recorded.
    pub fn add_user(&mut self, user: User) -> UserId {
        let id = user.id;
        self.users.push(user);
        self.persister.schedule(Collection::Users, &self.users);
        id
    }

    /// Register a tag. The name is stored lower-cased. No activity is recorded.
    pub fn add_tag(&mut self, name: &str, color: impl Into<String>) -> TagId {
        let tag = Tag::new(name, color, OffsetDateTime::now_utc());
        let id = tag.id;
        self.tags.push(tag);
        self.persist_tags();
        id
    }

    /// Rename and recolor a tag. Tasks keep the tag names they carry.
    pub fn update_tag(&mut self, id: TagId, name: &str, color: impl Into<String>) {
        let Some(tag) = self.tags.iter_mut().find(|tag| tag.id == id) else {
            debug!(%id, "Ignoring update of unknown tag");
            return;
        };
        tag.rename(name, color);
        self.persist_tags();
    }

    /// Unregister a tag. Tasks keep the tag names they carry.
    pub fn delete_tag(&mut self, id: TagId) {
        let before = self.tags.len();
        self.tags.retain(|tag| tag.id != id);
        if self.tags.len() == before {
            debug!(%id, "Ignoring delete of unknown tag");
            return;
        }
        self.persist_tags();
    }

    /// Look up a tag by case-insensitive name.
    #[must_use]
    pub fn find_tag(&self, name: &str) -> Option<&Tag> {
        find_tag(&self.tags, name)
    }

    /// Tasks passing `filters`, in collection order.
    #[must_use]
    pub fn visible(&self, filters: &Filters) -> Vec<&Task> {
        apply_filters(&self.tasks, filters)
    }

    /// Visible tasks grouped into status columns.
    #[must_use]
    pub fn columns(&self, filters: &Filters) -> GroupedTasks<'_> {
        group_by_status(self.visible(filters))
    }

    /// Visible task count per column.
    #[must_use]
    pub fn counts(&self, filters: &Filters) -> StatusCounts {
        counts_by_status(self.visible(filters))
    }

    /// Resolve a drop against the columns visible under `filters` and apply
    /// the resulting moves. Returns the applied moves (empty for no-ops).
    pub fn apply_drop(&mut self, filters: &Filters, event: &DropEvent) -> Vec<MoveCommand> {
        let commands = {
            let grouped = self.columns(filters);
            self.policy.resolve_drop(&self.tasks, &grouped, event)
        };
        if commands.is_empty() {
            debug!(active = %event.active, "Drop resolved to no moves");
        }
        for command in &commands {
            self.move_task(command.id, command.status, command.order);
        }
        commands
    }

    fn record(&mut self, kind: ActivityKind, task_id: TaskId, user_id: Option<UserId>, message: impl Into<String>) {
        let draft = ActivityDraft::new(kind, task_id, user_id, message);
        let entry = self.activities.record(draft, OffsetDateTime::now_utc());
        debug!(kind = entry.kind.as_str(), task = %entry.task_id, "Recorded activity");
        self.persister.schedule(Collection::Activities, self.activities.entries());
    }

    fn persist_tasks(&self) {
        self.persister.schedule(Collection::Tasks, &self.tasks);
    }

    fn persist_tags(&self) {
        self.persister.schedule(Collection::Tags, &self.tags);
    }
}

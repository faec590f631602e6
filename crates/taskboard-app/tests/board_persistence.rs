#![allow(missing_docs)]

use std::sync::Arc;

use anyhow::Result;
use serde_json::json;
use taskboard_app::{Board, BoardConfig, Persister, SharedBoard};
use taskboard_core::activity::ActivityKind;
use taskboard_core::tag::DEFAULT_TAGS;
use taskboard_core::{Activity, DropEvent, Filters, Status, Tag, Task, TaskDraft, TaskPatch, User};
use taskboard_store::{Collection, JsonFileStore, MemoryStore, load_typed};

fn memory_board(store: &Arc<MemoryStore>) -> Board {
    Board::new(&BoardConfig::default(), Persister::spawn(store.clone()))
}

#[tokio::test]
async fn mutations_reach_the_store_after_flush() -> Result<()> {
    let store = Arc::new(MemoryStore::new());
    let mut board = memory_board(&store);

    let id = board.create(TaskDraft::new("Persist me").with_tags(["io"]));
    board.update(
        id,
        TaskPatch {
            description: Some("written in the background".into()),
            ..TaskPatch::default()
        },
    );
    board.persister().flush().await;

    let tasks: Vec<Task> = load_typed(store.as_ref(), Collection::Tasks).await?;
    assert_eq!(tasks.as_slice(), board.tasks());
    let activities: Vec<Activity> = load_typed(store.as_ref(), Collection::Activities).await?;
    assert_eq!(activities.len(), 2);
    assert_eq!(activities[0].kind, ActivityKind::Update);
    Ok(())
}

#[tokio::test]
async fn failed_writes_do_not_roll_back_memory() -> Result<()> {
    let store = Arc::new(MemoryStore::new());
    store.set_fail_writes(true);
    let mut board = memory_board(&store);

    let id = board.create(TaskDraft::new("Only in memory"));
    board.move_task(id, Status::Done, 10.0);
    board.persister().flush().await;

    assert!(store.records(Collection::Tasks).await.is_empty());
    assert_eq!(board.get(id).map(|task| task.status), Some(Status::Done));
    assert_eq!(board.activities().len(), 2);

    store.set_fail_writes(false);
    board.comment(id, None, "retry");
    board.persister().flush().await;
    assert_eq!(store.records(Collection::Activities).await.len(), 3);
    Ok(())
}

#[tokio::test]
async fn load_sorts_and_truncates_activities() -> Result<()> {
    let store = Arc::new(MemoryStore::new());
    let task_id = taskboard_core::TaskId::new();
    let entries: Vec<_> = (0..5)
        .map(|minute| {
            json!({
                "id": taskboard_core::ActivityId::new().to_string(),
                "type": "comment",
                "task_id": task_id.to_string(),
                "timestamp": format!("2025-01-01T00:0{minute}:00Z"),
                "message": format!("note {minute}"),
            })
        })
        .collect();
    taskboard_store::RecordStore::replace_all(store.as_ref(), Collection::Activities, entries).await?;

    let config = BoardConfig::parse("activity_capacity = 3")?;
    let board = Board::load(store.as_ref(), Persister::disabled(), &config).await?;
    let messages: Vec<&str> = board.activities().iter().map(|entry| entry.message.as_str()).collect();
    assert_eq!(messages, vec!["note 4", "note 3", "note 2"]);
    assert!(board.tasks().is_empty());
    Ok(())
}

#[tokio::test]
async fn json_files_round_trip_a_session() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let store: Arc<JsonFileStore> = Arc::new(JsonFileStore::new(dir.path()));
    let config = BoardConfig::load(dir.path())?;

    let (a, b) = {
        let mut board = Board::load(store.as_ref(), Persister::spawn(store.clone()), &config).await?;
        let ada = board.add_user(User::new("Ada"));
        let a = board.create(TaskDraft::new("A").with_assignee(ada));
        let b = board.create(TaskDraft::new("B"));
        board.apply_drop(&Filters::default(), &DropEvent::onto_column(b, Status::InReview));
        board.persister().flush().await;
        (a, b)
    };

    let board = Board::load(store.as_ref(), Persister::disabled(), &config).await?;
    assert_eq!(board.tasks().len(), 2);
    assert_eq!(board.users().len(), 1);
    assert_eq!(board.get(b).map(|task| task.status), Some(Status::InReview));
    assert_eq!(board.get(a).and_then(|task| task.assignee), Some(board.users()[0].id));
    assert_eq!(board.activities()[0].message, "moved task to in review");
    Ok(())
}

#[tokio::test]
async fn fresh_store_is_seeded_with_default_tags_once() -> Result<()> {
    let store = Arc::new(MemoryStore::new());
    let config = BoardConfig::default();

    let mut board = Board::load(store.as_ref(), Persister::spawn(store.clone()), &config).await?;
    assert_eq!(board.tags().len(), DEFAULT_TAGS.len());
    let bug = board.find_tag("BUG").map(|tag| tag.id);
    let bug = bug.unwrap_or_else(|| panic!("bug must be seeded"));
    board.delete_tag(bug);
    board.add_tag("Infra", "#000000");
    board.persister().flush().await;

    let stored: Vec<Tag> = load_typed(store.as_ref(), Collection::Tags).await?;
    assert_eq!(stored.as_slice(), board.tags());
    assert!(store.records(Collection::Activities).await.is_empty());

    let reloaded = Board::load(store.as_ref(), Persister::disabled(), &config).await?;
    assert_eq!(reloaded.tags().len(), DEFAULT_TAGS.len());
    assert!(reloaded.find_tag("bug").is_none());
    assert!(reloaded.find_tag("infra").is_some());
    Ok(())
}

#[tokio::test]
async fn shared_board_flushes_without_holding_the_lock() -> Result<()> {
    let store = Arc::new(MemoryStore::new());
    let shared = SharedBoard::new(memory_board(&store));

    let id = shared.write(|board| board.create(TaskDraft::new("Shared")));
    shared.flush().await;

    let tasks: Vec<Task> = load_typed(store.as_ref(), Collection::Tasks).await?;
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0].id, id);
    Ok(())
}

#![allow(missing_docs)]

use anyhow::Result;
use serde_json::{Value, json};
use taskboard_core::task::{Status, Task, TaskDraft};
use taskboard_store::{Collection, JsonFileStore, RecordStore, load_typed, replace_typed};
use time::macros::datetime;

#[tokio::test]
async fn missing_directory_loads_as_empty() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let store = JsonFileStore::new(dir.path().join("not-created-yet"));
    for collection in Collection::ALL {
        assert!(store.load_all(collection).await?.is_empty());
    }
    Ok(())
}

#[tokio::test]
async fn replace_then_load_returns_latest_records() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let store = JsonFileStore::new(dir.path().join("board"));

    store
        .replace_all(Collection::Users, vec![json!({"id": "a"}), json!({"id": "b"})])
        .await?;
    store.replace_all(Collection::Users, vec![json!({"id": "c"})]).await?;

    let users = store.load_all(Collection::Users).await?;
    assert_eq!(users, vec![json!({"id": "c"})]);
    assert!(store.load_all(Collection::Tasks).await?.is_empty());

    let raw = std::fs::read_to_string(store.path(Collection::Users))?;
    let parsed: Value = serde_json::from_str(&raw)?;
    assert!(parsed.is_array());
    assert!(raw.contains('\n'), "collection files are pretty-printed");

    // Only the collection file remains; the temporary file was renamed.
    let entries: Vec<_> = std::fs::read_dir(store.root())?.collect::<Result<_, _>>()?;
    assert_eq!(entries.len(), 1);
    Ok(())
}

#[tokio::test]
async fn typed_helpers_preserve_task_fields() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let store = JsonFileStore::new(dir.path());
    let now = datetime!(2025-04-01 09:30 UTC);
    let tasks = vec![
        Task::from_draft(TaskDraft::new("Write docs").with_tags(["docs"]), now),
        Task::from_draft(TaskDraft::new("Ship").with_status(Status::InReview), now),
    ];

    replace_typed(&store, Collection::Tasks, &tasks).await?;
    let loaded: Vec<Task> = load_typed(&store, Collection::Tasks).await?;
    assert_eq!(loaded, tasks);

    let raw = store.load_all(Collection::Tasks).await?;
    assert_eq!(raw[1]["status"], "in_review");
    assert_eq!(raw[0]["created_at"], "2025-04-01T09:30:00Z");
    Ok(())
}

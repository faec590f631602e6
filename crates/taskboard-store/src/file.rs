use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde_json::Value;
use tempfile::NamedTempFile;
use tracing::debug;

use crate::{Collection, RecordStore, StoreError};

/// Store keeping one pretty-printed JSON array per collection under a
/// directory (`tasks.json`, `users.json`, `tags.json`, `activities.json`).
///
/// Files are replaced atomically: records are written to a temporary file in
/// the same directory which is then renamed over the target.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    root: PathBuf,
}

impl JsonFileStore {
    /// Use `root` as the data directory. It is created on first write.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Data directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// File backing `collection`.
    #[must_use]
    pub fn path(&self, collection: Collection) -> PathBuf {
        self.root.join(collection.file_name())
    }
}

fn read_records(path: &Path, collection: Collection) -> Result<Vec<Value>, StoreError> {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
        Err(source) => return Err(StoreError::Io { collection, source }),
    };
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(Vec::new());
    }
    serde_json::from_slice(&bytes).map_err(|source| StoreError::Decode { collection, source })
}

fn write_records(root: &Path, path: &Path, collection: Collection, records: &[Value]) -> Result<(), StoreError> {
    let io = |source| StoreError::Io { collection, source };
    fs::create_dir_all(root).map_err(io)?;
    let mut tmp = NamedTempFile::new_in(root).map_err(io)?;
    serde_json::to_writer_pretty(&mut tmp, records).map_err(|source| StoreError::Encode { collection, source })?;
    tmp.write_all(b"\n").map_err(io)?;
    tmp.as_file().sync_all().map_err(io)?;
    tmp.persist(path).map_err(|err| io(err.error))?;
    Ok(())
}

#[async_trait]
impl RecordStore for JsonFileStore {
    async fn replace_all(&self, collection: Collection, records: Vec<Value>) -> Result<(), StoreError> {
        let root = self.root.clone();
        let path = self.path(collection);
        let count = records.len();
        tokio::task::spawn_blocking(move || write_records(&root, &path, collection, &records)).await??;
        debug!(%collection, count, root = %self.root.display(), "Wrote collection file");
        Ok(())
    }

    async fn load_all(&self, collection: Collection) -> Result<Vec<Value>, StoreError> {
        let path = self.path(collection);
        let records = tokio::task::spawn_blocking(move || read_records(&path, collection)).await??;
        debug!(%collection, count = records.len(), "Read collection file");
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_file_reads_as_empty() {
        let dir = tempfile::tempdir().unwrap_or_else(|err| panic!("tempdir: {err}"));
        let path = dir.path().join("tasks.json");
        fs::write(&path, "  \n").unwrap_or_else(|err| panic!("write: {err}"));
        let records = read_records(&path, Collection::Tasks).unwrap_or_else(|err| panic!("read: {err}"));
        assert!(records.is_empty());
    }

    #[test]
    fn corrupt_file_is_a_decode_error() {
        let dir = tempfile::tempdir().unwrap_or_else(|err| panic!("tempdir: {err}"));
        let path = dir.path().join("tasks.json");
        fs::write(&path, "{not json").unwrap_or_else(|err| panic!("write: {err}"));
        let err = read_records(&path, Collection::Tasks);
        assert!(matches!(err, Err(StoreError::Decode { collection: Collection::Tasks, .. })));
    }
}

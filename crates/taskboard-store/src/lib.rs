//! Record storage for taskboard collections.
//!
//! A store keeps whole collections of JSON records. Writers always replace a
//! collection in full, so repeating a write is harmless.

use std::fmt;

use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Error types for store operations.
pub mod error;
mod file;
mod memory;

pub use error::StoreError;
pub use file::JsonFileStore;
pub use memory::MemoryStore;

/// Named record collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Collection {
    /// Task records.
    Tasks,
    /// User records.
    Users,
    /// Tag registry records.
    Tags,
    /// Activity log entries.
    Activities,
}

impl Collection {
    /// Every collection.
    pub const ALL: [Self; 4] = [Self::Tasks, Self::Users, Self::Tags, Self::Activities];

    /// Stable collection name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Tasks => "tasks",
            Self::Users => "users",
            Self::Tags => "tags",
            Self::Activities => "activities",
        }
    }

    /// File name used by [`JsonFileStore`].
    #[must_use]
    pub const fn file_name(self) -> &'static str {
        match self {
            Self::Tasks => "tasks.json",
            Self::Users => "users.json",
            Self::Tags => "tags.json",
            Self::Activities => "activities.json",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Asynchronous bulk storage for record collections.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Overwrite `collection` with `records`.
    ///
    /// # Errors
    /// Returns a [`StoreError`] when the records cannot be written.
    async fn replace_all(&self, collection: Collection, records: Vec<Value>) -> Result<(), StoreError>;

    /// Read every record of `collection`. Unknown collections are empty.
    ///
    /// # Errors
    /// Returns a [`StoreError`] when the stored data cannot be read.
    async fn load_all(&self, collection: Collection) -> Result<Vec<Value>, StoreError>;
}

/// Read `collection` and decode every record as `T`.
///
/// # Errors
/// Returns [`StoreError::Decode`] when a record does not match `T`, or any
/// error reported by the store.
pub async fn load_typed<T, S>(store: &S, collection: Collection) -> Result<Vec<T>, StoreError>
where
    T: DeserializeOwned,
    S: RecordStore + ?Sized,
{
    store
        .load_all(collection)
        .await?
        .into_iter()
        .map(serde_json::from_value)
        .collect::<Result<Vec<T>, _>>()
        .map_err(|source| StoreError::Decode { collection, source })
}

/// Encode `records` and overwrite `collection` with them.
///
/// # Errors
/// Returns [`StoreError::Encode`] when a record cannot be serialized, or any
/// error reported by the store.
pub async fn replace_typed<T, S>(store: &S, collection: Collection, records: &[T]) -> Result<(), StoreError>
where
    T: Serialize + Sync,
    S: RecordStore + ?Sized,
{
    let values = encode_records(collection, records)?;
    store.replace_all(collection, values).await
}

/// Serialize records into JSON values.
///
/// # Errors
/// Returns [`StoreError::Encode`] when a record cannot be serialized.
pub fn encode_records<T: Serialize>(collection: Collection, records: &[T]) -> Result<Vec<Value>, StoreError> {
    records
        .iter()
        .map(serde_json::to_value)
        .collect::<Result<Vec<_>, _>>()
        .map_err(|source| StoreError::Encode { collection, source })
}

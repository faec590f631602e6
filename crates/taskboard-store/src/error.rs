//! Error types for record store operations.

use thiserror::Error;

use crate::Collection;

/// Errors that can occur while reading or writing a collection.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Collection file could not be read or written.
    #[error("I/O error on {collection}: {source}")]
    Io {
        /// Collection being accessed.
        collection: Collection,
        /// Underlying failure.
        #[source]
        source: std::io::Error,
    },

    /// Stored records are not valid JSON or do not match the expected shape.
    #[error("Failed to decode {collection}: {source}")]
    Decode {
        /// Collection being decoded.
        collection: Collection,
        /// Underlying failure.
        #[source]
        source: serde_json::Error,
    },

    /// Records could not be serialized.
    #[error("Failed to encode {collection}: {source}")]
    Encode {
        /// Collection being encoded.
        collection: Collection,
        /// Underlying failure.
        #[source]
        source: serde_json::Error,
    },

    /// Blocking worker panicked or was cancelled.
    #[error("Task join error: {0}")]
    Join(#[from] tokio::task::JoinError),

    /// Write refused by the adapter.
    #[error("Write to {0} rejected")]
    Rejected(Collection),
}

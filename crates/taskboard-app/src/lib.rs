//! Application layer for taskboard.
//!
//! Wraps the pure domain logic of `taskboard-core` into a stateful [`Board`]
//! that records activity and persists through a background [`Persister`],
//! plus configuration loading and input parsing shared by frontends.

/// Entity store.
pub mod board;
/// `config.toml` loading.
pub mod config;
/// Parsing of user-facing filter and task inputs.
pub mod filter_util;
/// Background collection writes.
pub mod persist;
/// Lock-guarded board handle.
pub mod shared;

// Re-exports for convenience
pub use board::Board;
pub use config::BoardConfig;
pub use filter_util::{
    FilterBuildError, FilterBuilder, normalize_tags, parse_due_date, parse_priority_tokens, parse_status,
    resolve_assignee,
};
pub use persist::Persister;
pub use shared::SharedBoard;

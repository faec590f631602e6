//! Fire-and-forget persistence of board collections.
//!
//! Mutations hand a full snapshot of the affected collection to a
//! [`Persister`]. A single background worker writes snapshots to the
//! [`RecordStore`] in the order they were scheduled. Snapshots that pile up
//! while a write is in flight are coalesced to the newest one per collection,
//! and a snapshot older than what was already written is dropped.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;
use serde_json::Value;
use taskboard_store::{Collection, RecordStore, encode_records};
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, trace, warn};

/// Full contents of one collection at a point in time.
#[derive(Debug)]
struct Snapshot {
    collection: Collection,
    seq: u64,
    records: Vec<Value>,
}

#[derive(Debug)]
enum Command {
    Write(Snapshot),
    Flush(oneshot::Sender<()>),
}

/// Handle used to schedule collection writes.
///
/// Cloning is cheap; every clone feeds the same worker. The worker stops once
/// every handle is dropped.
#[derive(Debug, Clone)]
pub struct Persister {
    tx: Option<mpsc::UnboundedSender<Command>>,
    seq: Arc<AtomicU64>,
}

impl Persister {
    /// Start the background writer on the current Tokio runtime.
    ///
    /// # Panics
    /// Panics when called outside of a Tokio runtime.
    #[must_use]
    pub fn spawn(store: Arc<dyn RecordStore>) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        tokio::spawn(run_worker(store, rx));
        Self {
            tx: Some(tx),
            seq: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Handle that discards every write.
    #[must_use]
    pub fn disabled() -> Self {
        Self {
            tx: None,
            seq: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Returns true when writes reach a store.
    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        self.tx.is_some()
    }

    /// Queue a full replacement of `collection` with `records`.
    ///
    /// Never blocks. Encoding or queueing failures are logged and dropped.
    pub fn schedule<T: Serialize>(&self, collection: Collection, records: &[T]) {
        let Some(tx) = &self.tx else {
            trace!(%collection, "Persistence disabled, dropping snapshot");
            return;
        };
        let records = match encode_records(collection, records) {
            Ok(records) => records,
            Err(err) => {
                warn!(%collection, error = %err, "Failed to encode snapshot");
                return;
            }
        };
        let seq = self.seq.fetch_add(1, Ordering::SeqCst) + 1;
        debug!(%collection, seq, count = records.len(), "Scheduled snapshot");
        if tx
            .send(Command::Write(Snapshot {
                collection,
                seq,
                records,
            }))
            .is_err()
        {
            warn!(%collection, seq, "Persistence worker is gone, snapshot dropped");
        }
    }

    /// Wait until every write scheduled before this call has been attempted.
    pub async fn flush(&self) {
        let Some(tx) = &self.tx else {
            return;
        };
        let (done, wait) = oneshot::channel();
        if tx.send(Command::Flush(done)).is_err() {
            warn!("Persistence worker is gone, nothing to flush");
            return;
        }
        if wait.await.is_err() {
            warn!("Persistence worker stopped before flushing");
        }
    }
}

/// Commands drained from the queue in one go.
#[derive(Debug, Default)]
struct Batch {
    pending: BTreeMap<Collection, Snapshot>,
    waiters: Vec<oneshot::Sender<()>>,
}

impl Batch {
    fn push(&mut self, command: Command) {
        match command {
            Command::Write(snapshot) => self.offer(snapshot),
            Command::Flush(waiter) => self.waiters.push(waiter),
        }
    }

    fn offer(&mut self, snapshot: Snapshot) {
        match self.pending.get(&snapshot.collection) {
            Some(queued) if queued.seq > snapshot.seq => {
                trace!(collection = %snapshot.collection, seq = snapshot.seq, "Dropping superseded snapshot");
            }
            Some(queued) => {
                trace!(collection = %snapshot.collection, seq = queued.seq, "Coalescing queued snapshot");
                self.pending.insert(snapshot.collection, snapshot);
            }
            None => {
                self.pending.insert(snapshot.collection, snapshot);
            }
        }
    }
}

/// Highest sequence number written per collection.
#[derive(Debug, Default)]
struct Watermarks(HashMap<Collection, u64>);

impl Watermarks {
    fn is_stale(&self, collection: Collection, seq: u64) -> bool {
        self.0.get(&collection).is_some_and(|written| *written >= seq)
    }

    fn mark(&mut self, collection: Collection, seq: u64) {
        self.0.insert(collection, seq);
    }
}

async fn run_worker(store: Arc<dyn RecordStore>, mut rx: mpsc::UnboundedReceiver<Command>) {
    let mut written = Watermarks::default();
    while let Some(first) = rx.recv().await {
        let mut batch = Batch::default();
        batch.push(first);
        while let Ok(command) = rx.try_recv() {
            batch.push(command);
        }

        for snapshot in batch.pending.into_values() {
            let Snapshot {
                collection,
                seq,
                records,
            } = snapshot;
            if written.is_stale(collection, seq) {
                debug!(%collection, seq, "Skipping stale snapshot");
                continue;
            }
            let count = records.len();
            match store.replace_all(collection, records).await {
                Ok(()) => {
                    written.mark(collection, seq);
                    info!(%collection, seq, count, "Persisted collection");
                }
                Err(err) => warn!(%collection, seq, error = %err, "Failed to persist collection"),
            }
        }

        for waiter in batch.waiters {
            // Receiver may have given up waiting.
            let _ = waiter.send(());
        }
    }
    debug!("Persistence worker stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use taskboard_store::MemoryStore;

    fn snapshot(collection: Collection, seq: u64) -> Snapshot {
        Snapshot {
            collection,
            seq,
            records: vec![json!(seq)],
        }
    }

    #[test]
    fn batch_keeps_newest_snapshot_per_collection() {
        let mut batch = Batch::default();
        batch.offer(snapshot(Collection::Tasks, 2));
        batch.offer(snapshot(Collection::Tasks, 1));
        batch.offer(snapshot(Collection::Activities, 3));
        batch.offer(snapshot(Collection::Tasks, 4));

        let kept: Vec<(Collection, u64)> = batch
            .pending
            .values()
            .map(|snapshot| (snapshot.collection, snapshot.seq))
            .collect();
        assert_eq!(kept, vec![(Collection::Tasks, 4), (Collection::Activities, 3)]);
    }

    #[test]
    fn watermarks_reject_older_snapshots() {
        let mut written = Watermarks::default();
        assert!(!written.is_stale(Collection::Tasks, 1));
        written.mark(Collection::Tasks, 5);
        assert!(written.is_stale(Collection::Tasks, 5));
        assert!(written.is_stale(Collection::Tasks, 3));
        assert!(!written.is_stale(Collection::Tasks, 6));
        assert!(!written.is_stale(Collection::Users, 1));
    }

    #[tokio::test]
    async fn queued_snapshots_coalesce_into_one_write() {
        let store = Arc::new(MemoryStore::new());
        let persister = Persister::spawn(store.clone());

        persister.schedule(Collection::Tasks, &["a"]);
        persister.schedule(Collection::Tasks, &["a", "b"]);
        persister.schedule(Collection::Tasks, &["a", "b", "c"]);
        persister.flush().await;

        assert_eq!(store.write_count(), 1);
        assert_eq!(
            store.records(Collection::Tasks).await,
            vec![json!("a"), json!("b"), json!("c")]
        );
    }

    #[tokio::test]
    async fn failed_writes_are_logged_and_skipped() {
        let store = Arc::new(MemoryStore::new());
        store.set_fail_writes(true);
        let persister = Persister::spawn(store.clone());

        persister.schedule(Collection::Users, &["ada"]);
        persister.flush().await;
        assert!(store.records(Collection::Users).await.is_empty());

        store.set_fail_writes(false);
        persister.schedule(Collection::Users, &["ada", "grace"]);
        persister.flush().await;
        assert_eq!(store.records(Collection::Users).await.len(), 2);
    }

    #[tokio::test]
    async fn disabled_persister_drops_writes() {
        let persister = Persister::disabled();
        assert!(!persister.is_enabled());
        persister.schedule(Collection::Tasks, &["ignored"]);
        persister.flush().await;
    }
}

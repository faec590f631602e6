use std::sync::{Arc, Mutex, PoisonError};

use crate::board::Board;
use crate::persist::Persister;

/// Thread-safe handle to a [`Board`]. Every access runs under one lock, so
/// mutations from different threads are applied one at a time.
#[derive(Debug, Clone)]
pub struct SharedBoard {
    inner: Arc<Mutex<Board>>,
    persister: Persister,
}

impl SharedBoard {
    /// Wrap a board.
    #[must_use]
    pub fn new(board: Board) -> Self {
        let persister = board.persister().clone();
        Self {
            inner: Arc::new(Mutex::new(board)),
            persister,
        }
    }

    /// Run `f` with shared access to the board.
    pub fn read<R>(&self, f: impl FnOnce(&Board) -> R) -> R {
        let guard = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        f(&guard)
    }

    /// Run `f` with exclusive access to the board.
    pub fn write<R>(&self, f: impl FnOnce(&mut Board) -> R) -> R {
        let mut guard = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut guard)
    }

    /// Wait for every write scheduled so far. The board lock is not held.
    pub async fn flush(&self) {
        self.persister.flush().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BoardConfig;
    use std::thread;
    use taskboard_core::TaskDraft;

    #[test]
    fn concurrent_writers_are_serialized() {
        let shared = SharedBoard::new(Board::new(&BoardConfig::default(), Persister::disabled()));

        let handles: Vec<_> = (0..8)
            .map(|worker| {
                let shared = shared.clone();
                thread::spawn(move || {
                    for n in 0..25 {
                        shared.write(|board| board.create(TaskDraft::new(format!("w{worker}-{n}"))));
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap_or_else(|_| panic!("writer thread panicked"));
        }

        let (tasks, log) = shared.read(|board| (board.tasks().len(), board.activities().len()));
        assert_eq!(tasks, 200);
        assert_eq!(log, 100);
    }
}

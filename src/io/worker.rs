//! The store worker: a single thread that owns the [`Store`] and applies
//! every load and save in the order they were sent.
//!
//! Saves return a [`WriteReceipt`] immediately. Callers that don't care
//! drop it; callers that do (tests, the CLI before exiting) wait on it.

use std::sync::{Arc, Mutex, mpsc};
use std::thread::JoinHandle;

use crate::io::recovery::{RecoveryCategory, RecoveryEntry, RecoveryLog};
use crate::io::store::{StorageError, Store};

enum Request {
    Load {
        key: String,
        reply: mpsc::Sender<Result<Option<String>, StorageError>>,
    },
    Save {
        key: String,
        value: String,
        reply: mpsc::Sender<Result<(), StorageError>>,
    },
    Remove {
        key: String,
        reply: mpsc::Sender<Result<(), StorageError>>,
    },
}

/// Joins the worker thread once the last handle is gone.
struct WorkerGuard {
    thread: Mutex<Option<JoinHandle<()>>>,
}

impl Drop for WorkerGuard {
    fn drop(&mut self) {
        let handle = self
            .thread
            .get_mut()
            .unwrap_or_else(|e| e.into_inner())
            .take();
        if let Some(handle) = handle {
            let _ = handle.join();
        }
    }
}

/// Cloneable handle to the store worker.
#[derive(Clone)]
pub struct StoreHandle {
    // Declared before `_guard`: every sender must be gone before the join.
    tx: mpsc::Sender<Request>,
    recovery: RecoveryLog,
    _guard: Arc<WorkerGuard>,
}

impl StoreHandle {
    /// Move `store` onto a dedicated worker thread.
    pub fn spawn<S: Store + 'static>(store: S, recovery: RecoveryLog) -> Self {
        let (tx, rx) = mpsc::channel();
        let worker_log = recovery.clone();
        let thread = std::thread::Builder::new()
            .name("todos-store".into())
            .spawn(move || run_worker(store, rx, worker_log));

        let thread = match thread {
            Ok(handle) => Some(handle),
            Err(e) => {
                // Requests will fail with Unavailable once `rx` is dropped
                recovery.record(
                    RecoveryEntry::new(RecoveryCategory::Write, "could not start store worker")
                        .field("Error", e.to_string()),
                );
                None
            }
        };

        StoreHandle {
            tx,
            recovery,
            _guard: Arc::new(WorkerGuard {
                thread: Mutex::new(thread),
            }),
        }
    }

    pub fn recovery(&self) -> &RecoveryLog {
        &self.recovery
    }

    /// Read `key`, after every request sent before it has been applied.
    pub fn load(&self, key: &str) -> Result<Option<String>, StorageError> {
        let (reply, rx) = mpsc::channel();
        self.send(Request::Load {
            key: key.to_string(),
            reply,
        })?;
        rx.recv().map_err(|_| worker_gone())?
    }

    /// Queue a write of `value` to `key`.
    pub fn save(&self, key: &str, value: String) -> WriteReceipt {
        let (reply, rx) = mpsc::channel();
        let sent = self.send(Request::Save {
            key: key.to_string(),
            value,
            reply,
        });
        WriteReceipt::new(rx, sent.err())
    }

    /// Queue removal of `key`.
    pub fn remove(&self, key: &str) -> WriteReceipt {
        let (reply, rx) = mpsc::channel();
        let sent = self.send(Request::Remove {
            key: key.to_string(),
            reply,
        });
        WriteReceipt::new(rx, sent.err())
    }

    fn send(&self, request: Request) -> Result<(), StorageError> {
        self.tx.send(request).map_err(|_| {
            self.recovery.record(RecoveryEntry::new(
                RecoveryCategory::Write,
                "store worker is not running",
            ));
            worker_gone()
        })
    }
}

fn worker_gone() -> StorageError {
    StorageError::Unavailable("store worker stopped".into())
}

fn run_worker<S: Store>(mut store: S, rx: mpsc::Receiver<Request>, log: RecoveryLog) {
    // Ends when every StoreHandle has been dropped and the queue is drained
    for request in rx {
        match request {
            Request::Load { key, reply } => {
                let result = store.load(&key);
                if let Err(e) = &result {
                    log.record(
                        RecoveryEntry::new(RecoveryCategory::Read, "store read failed")
                            .field("Key", key.as_str())
                            .field("Error", e.to_string()),
                    );
                }
                let _ = reply.send(result);
            }
            Request::Save { key, value, reply } => {
                let result = store.save(&key, &value);
                if let Err(e) = &result {
                    log.record(
                        RecoveryEntry::new(RecoveryCategory::Write, "store write failed")
                            .field("Key", key.as_str())
                            .field("Error", e.to_string())
                            .body(value),
                    );
                }
                let _ = reply.send(result);
            }
            Request::Remove { key, reply } => {
                let result = store.remove(&key);
                if let Err(e) = &result {
                    log.record(
                        RecoveryEntry::new(RecoveryCategory::Write, "store remove failed")
                            .field("Key", key.as_str())
                            .field("Error", e.to_string()),
                    );
                }
                let _ = reply.send(result);
            }
        }
    }
}

/// Completion signal for a queued write.
#[must_use = "drop the receipt explicitly to fire and forget"]
pub struct WriteReceipt {
    rx: mpsc::Receiver<Result<(), StorageError>>,
    early: Option<StorageError>,
}

impl WriteReceipt {
    fn new(rx: mpsc::Receiver<Result<(), StorageError>>, early: Option<StorageError>) -> Self {
        WriteReceipt { rx, early }
    }

    /// A receipt for a write that was never queued.
    pub(crate) fn failed(err: StorageError) -> Self {
        let (_, rx) = mpsc::channel();
        WriteReceipt::new(rx, Some(err))
    }

    /// Block until the write has been applied.
    pub fn wait(self) -> Result<(), StorageError> {
        if let Some(e) = self.early {
            return Err(e);
        }
        self.rx.recv().map_err(|_| worker_gone())?
    }

    /// Non-blocking check. `None` while the write is still queued.
    pub fn poll(&mut self) -> Option<Result<(), StorageError>> {
        if let Some(e) = self.early.take() {
            return Some(Err(e));
        }
        match self.rx.try_recv() {
            Ok(result) => Some(result),
            Err(mpsc::TryRecvError::Empty) => None,
            Err(mpsc::TryRecvError::Disconnected) => Some(Err(worker_gone())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::store::MemoryStore;

    fn spawn(store: &MemoryStore) -> StoreHandle {
        StoreHandle::spawn(store.clone(), RecoveryLog::stderr_only())
    }

    #[test]
    fn load_sees_earlier_unawaited_saves() {
        let view = MemoryStore::new();
        let handle = spawn(&view);

        for i in 0..50 {
            drop(handle.save("TodoApp", format!("v{}", i)));
        }
        assert_eq!(handle.load("TodoApp").unwrap().as_deref(), Some("v49"));
        assert_eq!(view.write_count(), 50);
    }

    #[test]
    fn receipt_reports_success() {
        let view = MemoryStore::new();
        let handle = spawn(&view);
        handle.save("Theme", "dark".into()).wait().unwrap();
        assert_eq!(view.get("Theme").as_deref(), Some("dark"));
    }

    #[test]
    fn receipt_reports_failure() {
        let view = MemoryStore::new();
        view.set_unavailable(true);
        let handle = spawn(&view);

        let result = handle.save("Theme", "dark".into()).wait();
        assert!(matches!(result, Err(StorageError::Unavailable(_))));
        assert!(handle.load("Theme").is_err());
    }

    #[test]
    fn poll_eventually_completes() {
        let view = MemoryStore::new();
        let handle = spawn(&view);
        let mut receipt = handle.save("Theme", "light".into());
        // A load round-trip guarantees the save ahead of it has finished
        handle.load("Theme").unwrap();
        assert!(matches!(receipt.poll(), Some(Ok(()))));
    }

    #[test]
    fn remove_clears_key() {
        let view = MemoryStore::with_entry("TodoApp", "[]");
        let handle = spawn(&view);
        handle.remove("TodoApp").wait().unwrap();
        assert_eq!(handle.load("TodoApp").unwrap(), None);
    }

    #[test]
    fn dropping_last_handle_flushes_queue() {
        let view = MemoryStore::new();
        let handle = spawn(&view);
        let other = handle.clone();
        drop(handle.save("TodoApp", "first".into()));
        drop(other.save("TodoApp", "second".into()));
        drop(handle);
        drop(other);
        assert_eq!(view.get("TodoApp").as_deref(), Some("second"));
    }
}

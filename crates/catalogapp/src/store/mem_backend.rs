use super::backend::StorageBackend;
use super::Database;
use crate::error::EngineError;
use async_trait::async_trait;
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Default)]
struct MemState {
    db: Option<Database>,
    fail_reads: bool,
    fail_writes: bool,
    commits: usize,
}

/// In-memory storage backend for testing.
///
/// Clones share the same state, so a test can keep one handle to flip the
/// failure switches after moving another into a store.
#[derive(Clone, Default)]
pub struct MemBackend {
    state: Arc<Mutex<MemState>>,
}

impl MemBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// A backend that already holds `db`, as if created by an earlier run.
    pub fn with_database(db: Database) -> Self {
        let backend = Self::new();
        backend.lock().db = Some(db);
        backend
    }

    /// Make every subsequent load fail.
    pub fn set_simulate_read_error(&self, simulate: bool) {
        self.lock().fail_reads = simulate;
    }

    /// Make every subsequent commit fail.
    pub fn set_simulate_write_error(&self, simulate: bool) {
        self.lock().fail_writes = simulate;
    }

    /// Snapshot of the stored document.
    pub fn snapshot(&self) -> Option<Database> {
        self.lock().db.clone()
    }

    /// Number of successful commits so far.
    pub fn commit_count(&self) -> usize {
        self.lock().commits
    }

    fn lock(&self) -> MutexGuard<'_, MemState> {
        // A poisoned lock only means another test thread panicked; the data is still usable.
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl StorageBackend for MemBackend {
    async fn load(&self) -> Result<Option<Database>, EngineError> {
        let state = self.lock();
        if state.fail_reads {
            return Err(EngineError::Unavailable("Simulated read error".to_string()));
        }
        Ok(state.db.clone())
    }

    async fn commit(&self, db: &Database) -> Result<(), EngineError> {
        let mut state = self.lock();
        if state.fail_writes {
            return Err(EngineError::Unavailable("Simulated write error".to_string()));
        }
        state.db = Some(db.clone());
        state.commits += 1;
        Ok(())
    }

    fn location(&self) -> String {
        "memory://".to_string()
    }
}

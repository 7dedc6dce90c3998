//! Process-local winner store.

use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use tokio::sync::broadcast;

use crate::error::StoreError;

use super::{StoreChange, Winner, WinnerStore, change_channel, sort_recent_first};

/// Winner store backed by a `Vec`. Contents vanish with the process.
#[derive(Debug)]
pub struct MemoryWinnerStore {
    records: Mutex<Vec<Winner>>,
    changes: broadcast::Sender<StoreChange>,
}

impl Default for MemoryWinnerStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryWinnerStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            records: Mutex::new(Vec::new()),
            changes: change_channel(),
        }
    }

    fn records(&self) -> std::sync::MutexGuard<'_, Vec<Winner>> {
        self.records.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl WinnerStore for MemoryWinnerStore {
    async fn fetch_all(&self) -> Result<Vec<Winner>, StoreError> {
        let mut winners = self.records().clone();
        sort_recent_first(&mut winners);
        Ok(winners)
    }

    async fn insert_many(&self, winners: &[Winner]) -> Result<(), StoreError> {
        if winners.is_empty() {
            return Ok(());
        }
        self.records().extend_from_slice(winners);
        let _ = self.changes.send(StoreChange::Inserted {
            count: winners.len(),
        });
        Ok(())
    }

    async fn purge_all(&self) -> Result<usize, StoreError> {
        let count = std::mem::take(&mut *self.records()).len();
        if count > 0 {
            let _ = self.changes.send(StoreChange::Purged { count });
        }
        Ok(count)
    }

    fn subscribe(&self) -> broadcast::Receiver<StoreChange> {
        self.changes.subscribe()
    }
}

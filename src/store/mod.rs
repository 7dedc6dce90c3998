//! Winner persistence
//!
//! The reveal never reads from the store; once a run completes, its
//! winners are converted to [`Winner`] records and inserted. Store
//! failures are reported by the caller after the animation is over.
//!
//! - [`WinnerStore`]: fetch, insert, purge, change notifications
//! - [`MemoryWinnerStore`]: process-local store
//! - [`JsonlWinnerStore`]: one JSON record per line in a file

pub mod jsonl;
pub mod memory;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::draw::{Candidate, DrawResult};
use crate::error::StoreError;

pub use jsonl::JsonlWinnerStore;
pub use memory::MemoryWinnerStore;

/// Capacity of the change-notification channel.
const CHANGE_CHANNEL_CAPACITY: usize = 64;

/// A persisted winner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Winner {
    /// Record id
    pub id: Uuid,
    /// Id of the winning candidate
    pub candidate_id: String,
    /// Display name at the time of the draw
    pub name: String,
    /// Ticket count at the time of the draw
    pub tickets: u64,
    /// When the draw completed
    pub won_at: DateTime<Utc>,
}

impl Winner {
    /// Converts a drawn candidate into a new record.
    #[must_use]
    pub fn from_candidate(candidate: &Candidate, won_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            candidate_id: candidate.id.clone(),
            name: candidate.name.clone(),
            tickets: candidate.weight,
            won_at,
        }
    }
}

/// Converts a whole draw result, keeping draw order.
#[must_use]
pub fn winners_from_result(result: &DrawResult, won_at: DateTime<Utc>) -> Vec<Winner> {
    result
        .iter()
        .map(|c| Winner::from_candidate(c, won_at))
        .collect()
}

/// Change notification published by a store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreChange {
    /// Records were added.
    Inserted {
        /// Number of records added
        count: usize,
    },
    /// All records were removed.
    Purged {
        /// Number of records removed
        count: usize,
    },
}

/// Persistence collaborator for winner records.
#[async_trait]
pub trait WinnerStore: Send + Sync {
    /// All records, most recent `won_at` first.
    async fn fetch_all(&self) -> Result<Vec<Winner>, StoreError>;

    /// Appends records. Inserting nothing is a no-op without notification.
    async fn insert_many(&self, winners: &[Winner]) -> Result<(), StoreError>;

    /// Removes every record and returns how many were removed.
    ///
    /// Purging an empty store is a no-op without notification.
    async fn purge_all(&self) -> Result<usize, StoreError>;

    /// Subscribes to change notifications.
    fn subscribe(&self) -> broadcast::Receiver<StoreChange>;
}

/// Orders records most recent first; ties keep insertion order.
fn sort_recent_first(winners: &mut [Winner]) {
    winners.sort_by(|a, b| b.won_at.cmp(&a.won_at));
}

fn change_channel() -> broadcast::Sender<StoreChange> {
    broadcast::channel(CHANGE_CHANNEL_CAPACITY).0
}

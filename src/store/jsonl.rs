//! File-backed winner store.
//!
//! Records are appended as one JSON object per line. A missing file reads
//! as an empty store; the file is created on first insert.

use std::io::SeekFrom;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs::{self, OpenOptions};
use tokio::io::{AsyncReadExt, AsyncSeekExt, AsyncWriteExt};
use tokio::sync::{Mutex, broadcast};
use tracing::debug;

use crate::error::StoreError;

use super::{StoreChange, Winner, WinnerStore, change_channel, sort_recent_first};

/// Winner store backed by a JSONL file.
#[derive(Debug)]
pub struct JsonlWinnerStore {
    path: PathBuf,
    // serializes read-modify-write sequences within this process
    lock: Mutex<()>,
    changes: broadcast::Sender<StoreChange>,
}

impl JsonlWinnerStore {
    /// Opens a store at `path`. The file need not exist yet.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
            changes: change_channel(),
        }
    }

    /// Path of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_content(&self) -> Result<String, StoreError> {
        match fs::read_to_string(&self.path).await {
            Ok(content) => Ok(content),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(String::new()),
            Err(e) => Err(e.into()),
        }
    }

    async fn read_records(&self) -> Result<Vec<Winner>, StoreError> {
        self.read_content()
            .await?
            .lines()
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty())
            .map(|(idx, line)| {
                serde_json::from_str(line).map_err(|e| StoreError::Corrupt {
                    line: idx + 1,
                    message: e.to_string(),
                })
            })
            .collect()
    }
}

#[async_trait]
impl WinnerStore for JsonlWinnerStore {
    async fn fetch_all(&self) -> Result<Vec<Winner>, StoreError> {
        let _guard = self.lock.lock().await;
        let mut winners = self.read_records().await?;
        sort_recent_first(&mut winners);
        Ok(winners)
    }

    async fn insert_many(&self, winners: &[Winner]) -> Result<(), StoreError> {
        if winners.is_empty() {
            return Ok(());
        }

        let mut buf = String::new();
        let _guard = self.lock.lock().await;
        let mut file = OpenOptions::new()
            .create(true)
            .read(true)
            .append(true)
            .open(&self.path)
            .await?;

        // a hand-edited file may lack its final newline
        if file.metadata().await?.len() > 0 {
            file.seek(SeekFrom::End(-1)).await?;
            if file.read_u8().await? != b'\n' {
                buf.push('\n');
            }
        }

        for winner in winners {
            buf.push_str(&serde_json::to_string(winner)?);
            buf.push('\n');
        }
        file.write_all(buf.as_bytes()).await?;
        file.flush().await?;

        debug!(path = %self.path.display(), count = winners.len(), "winners appended");
        let _ = self.changes.send(StoreChange::Inserted {
            count: winners.len(),
        });
        Ok(())
    }

    async fn purge_all(&self) -> Result<usize, StoreError> {
        let _guard = self.lock.lock().await;
        // counted without parsing so a corrupt file can still be cleared
        let count = self
            .read_content()
            .await?
            .lines()
            .filter(|line| !line.trim().is_empty())
            .count();
        if count == 0 {
            return Ok(0);
        }

        fs::write(&self.path, b"").await?;
        debug!(path = %self.path.display(), count, "winners purged");
        let _ = self.changes.send(StoreChange::Purged { count });
        Ok(count)
    }

    fn subscribe(&self) -> broadcast::Receiver<StoreChange> {
        self.changes.subscribe()
    }
}

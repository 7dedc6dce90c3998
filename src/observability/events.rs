//! Structured event stream for `slotdraw`.
//!
//! Discrete, typed events emitted while a draw runs. Events are serialized
//! as newline-delimited JSON (JSONL) with a monotonically increasing
//! sequence number.

use std::io::{BufWriter, Write};
use std::path::Path;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::reveal::Phase;

// ---------------------------------------------------------------------------
// Event variants
// ---------------------------------------------------------------------------

/// A discrete event emitted during a draw.
///
/// Tagged with `"type"` when serialized so consumers can dispatch on it.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type")]
pub enum Event {
    /// A run was started (or restarted).
    DrawStarted {
        /// When the run started.
        timestamp: DateTime<Utc>,
        /// Id of the run.
        run_id: u64,
        /// Pool size.
        candidates: usize,
        /// Requested winner count.
        winner_count: usize,
    },

    /// The reveal entered a new phase.
    PhaseEntered {
        /// When the phase was entered.
        timestamp: DateTime<Utc>,
        /// Id of the run.
        run_id: u64,
        /// Phase that was entered.
        phase: Phase,
    },

    /// A run was torn down before completing.
    DrawCancelled {
        /// When the run was cancelled.
        timestamp: DateTime<Utc>,
        /// Id of the run.
        run_id: u64,
        /// Phase the run was in.
        phase: Phase,
    },

    /// A run completed and its winners were drawn.
    DrawCompleted {
        /// When the draw happened.
        timestamp: DateTime<Utc>,
        /// Id of the run.
        run_id: u64,
        /// Winner candidate ids, in draw order.
        winners: Vec<String>,
    },

    /// Winners were written to the store.
    WinnersRecorded {
        /// When the insert finished.
        timestamp: DateTime<Utc>,
        /// Number of records written.
        count: usize,
    },

    /// The store was purged.
    WinnersPurged {
        /// When the purge finished.
        timestamp: DateTime<Utc>,
        /// Number of records removed.
        count: usize,
    },
}

// ---------------------------------------------------------------------------
// Envelope (adds sequence number via serde flatten)
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct EventEnvelope {
    sequence: u64,
    #[serde(flatten)]
    event: Event,
}

// ---------------------------------------------------------------------------
// Emitter
// ---------------------------------------------------------------------------

/// Thread-safe, buffered JSONL event writer.
///
/// Serialization or I/O failures are dropped: the event stream must never
/// disturb a draw in progress.
pub struct EventEmitter {
    writer: Mutex<BufWriter<Box<dyn Write + Send>>>,
    sequence: AtomicU64,
}

// Box<dyn Write> is not Debug
impl std::fmt::Debug for EventEmitter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventEmitter")
            .field("sequence", &self.sequence.load(Ordering::Relaxed))
            .finish_non_exhaustive()
    }
}

impl EventEmitter {
    /// Creates an emitter that writes to the given writer.
    #[must_use]
    pub fn new(writer: Box<dyn Write + Send>) -> Self {
        Self {
            writer: Mutex::new(BufWriter::new(writer)),
            sequence: AtomicU64::new(0),
        }
    }

    /// Creates an emitter that silently discards all events.
    #[must_use]
    pub fn noop() -> Self {
        Self::new(Box::new(std::io::sink()))
    }

    /// Creates an emitter that writes to a file at `path`.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the file cannot be created.
    pub fn from_file(path: &Path) -> std::io::Result<Self> {
        let file = std::fs::File::create(path)?;
        Ok(Self::new(Box::new(file)))
    }

    /// Emits an event as a single JSONL line.
    pub fn emit(&self, event: Event) {
        let seq = self.sequence.fetch_add(1, Ordering::SeqCst);
        let envelope = EventEnvelope {
            sequence: seq,
            event,
        };

        if let Ok(mut w) = self.writer.lock() {
            if let Ok(line) = serde_json::to_string(&envelope) {
                let _ = writeln!(w, "{line}");
                let _ = w.flush();
            }
        }
    }

    /// Returns the number of events emitted so far.
    #[must_use]
    pub fn event_count(&self) -> u64 {
        self.sequence.load(Ordering::Relaxed)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

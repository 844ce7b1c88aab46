//! Batch submission progress events.
//!
//! [`ProgressBus`] is an in-process fan-out hub backed by a
//! `tokio::sync::broadcast` channel. The submitter publishes one event
//! per lifecycle step; CLI output, logging sinks, or embedding
//! applications subscribe independently.

use serde::Serialize;
use tokio::sync::broadcast;

use chequeflow_core::report::BatchOutcome;
use chequeflow_core::types::RowId;

/// A lifecycle event of one bulk submission run.
#[derive(Debug, Clone, Serialize)]
pub enum ProgressEvent {
    /// Submission started; `total` rows will be attempted in display
    /// order.
    BatchStarted { total: usize },

    /// One row was accepted by the back office.
    RowSubmitted {
        row_id: RowId,
        /// 1-based position at run start.
        display_index: usize,
        /// Bill number, or `"Row N"` when blank.
        label: String,
    },

    /// One row was rejected or failed validation.
    RowFailed {
        row_id: RowId,
        display_index: usize,
        label: String,
        /// User-facing message, already run through the preference
        /// chain.
        message: String,
    },

    /// The run finished; every row was attempted.
    BatchCompleted {
        outcome: BatchOutcome,
        succeeded: usize,
        failed: usize,
    },

    /// The run was stopped between rows.
    BatchCancelled {
        /// Rows attempted before the stop.
        attempted: usize,
        total: usize,
    },
}

/// Default buffer capacity for the broadcast channel.
const DEFAULT_CAPACITY: usize = 256;

/// In-process fan-out for [`ProgressEvent`]s.
pub struct ProgressBus {
    sender: broadcast::Sender<ProgressEvent>,
}

impl ProgressBus {
    /// Create a bus with a specific channel capacity.
    ///
    /// When the buffer is full the oldest un-consumed events are
    /// dropped and slow receivers observe a `RecvError::Lagged`.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish an event to all current subscribers.
    ///
    /// With zero subscribers the event is silently dropped.
    pub fn publish(&self, event: ProgressEvent) {
        // Ignore the SendError — it only means there are no receivers.
        let _ = self.sender.send(event);
    }

    /// Subscribe to all events published on this bus.
    pub fn subscribe(&self) -> broadcast::Receiver<ProgressEvent> {
        self.sender.subscribe()
    }
}

impl Default for ProgressBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

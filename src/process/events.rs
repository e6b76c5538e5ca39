// src/process/events.rs

use serde::Serialize;
use tracing::{debug, info, warn};

/// Something worth knowing that happened while converting a file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum IngestEvent {
    /// A data row had more fields than the header and was dropped.
    RowSkipped {
        line: u64,
        fields: usize,
        expected: usize,
    },
    /// Exact duplicate rows removed from one batch.
    DuplicatesRemoved { batch: usize, count: usize },
    BatchWritten { batch: usize, rows: usize },
}

/// Receives conversion events.
pub trait EventSink {
    fn emit(&mut self, event: IngestEvent);
}

/// Forwards every event to `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl EventSink for LogSink {
    fn emit(&mut self, event: IngestEvent) {
        match event {
            IngestEvent::RowSkipped {
                line,
                fields,
                expected,
            } => warn!(line, fields, expected, "skipped malformed row"),
            IngestEvent::DuplicatesRemoved { batch, count } => {
                info!(batch, count, "removed duplicate rows")
            }
            IngestEvent::BatchWritten { batch, rows } => debug!(batch, rows, "wrote batch"),
        }
    }
}

/// Collects events in order.
impl EventSink for Vec<IngestEvent> {
    fn emit(&mut self, event: IngestEvent) {
        self.push(event);
    }
}

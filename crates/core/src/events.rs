//! Structured run events
//!
//! Components never print. They receive an [`EventSink`] and report what
//! they are doing as [`SnapshotEvent`]s (phase, subject, outcome). The
//! default [`TracingSink`] forwards events to `tracing`; [`MemorySink`]
//! keeps them for inspection.

use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

/// Phase of a backup or restore run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Opening the adapter
    Connect,
    /// Reading schema or rows from the source
    Extract,
    /// Writing artifacts to the snapshot directory
    Write,
    /// Choosing the snapshot version to restore
    Resolve,
    /// Listing artifact files
    Scan,
    /// Tagging files as DDL / DML / DCL / combined
    Classify,
    /// Executing a combined artifact
    ApplySingle,
    /// Executing schema definitions
    ApplyDdl,
    /// Executing row data
    ApplyDml,
    /// Executing privilege statements
    ApplyDcl,
    /// Run finished
    Done,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Connect => "connect",
            Phase::Extract => "extract",
            Phase::Write => "write",
            Phase::Resolve => "resolve",
            Phase::Scan => "scan",
            Phase::Classify => "classify",
            Phase::ApplySingle => "apply_single",
            Phase::ApplyDdl => "apply_ddl",
            Phase::ApplyDml => "apply_dml",
            Phase::ApplyDcl => "apply_dcl",
            Phase::Done => "done",
        };
        f.write_str(name)
    }
}

/// Result of the step an event describes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Step completed
    Ok,
    /// Step failed but the run continues
    Skipped(String),
    /// Step failed and the run aborts
    Failed(String),
}

/// One structured event
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotEvent {
    /// Phase the event belongs to
    pub phase: Phase,
    /// File, table or database the event is about
    pub subject: String,
    /// Outcome of the step
    pub outcome: Outcome,
}

impl SnapshotEvent {
    /// Successful step
    pub fn ok(phase: Phase, subject: impl Into<String>) -> Self {
        SnapshotEvent {
            phase,
            subject: subject.into(),
            outcome: Outcome::Ok,
        }
    }

    /// Recoverable failure
    pub fn skipped(phase: Phase, subject: impl Into<String>, reason: impl ToString) -> Self {
        SnapshotEvent {
            phase,
            subject: subject.into(),
            outcome: Outcome::Skipped(reason.to_string()),
        }
    }

    /// Fatal failure
    pub fn failed(phase: Phase, subject: impl Into<String>, reason: impl ToString) -> Self {
        SnapshotEvent {
            phase,
            subject: subject.into(),
            outcome: Outcome::Failed(reason.to_string()),
        }
    }
}

/// Receiver of run events
pub trait EventSink: Send + Sync {
    /// Record one event
    fn emit(&self, event: SnapshotEvent);
}

/// Forwards events to `tracing`
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl EventSink for TracingSink {
    fn emit(&self, event: SnapshotEvent) {
        let phase = event.phase.to_string();
        match &event.outcome {
            Outcome::Ok => tracing::debug!(phase = %phase, subject = %event.subject, "ok"),
            Outcome::Skipped(reason) => {
                tracing::warn!(
                    phase = %phase,
                    subject = %event.subject,
                    reason = %reason,
                    "skipped"
                )
            }
            Outcome::Failed(reason) => {
                tracing::error!(
                    phase = %phase,
                    subject = %event.subject,
                    reason = %reason,
                    "failed"
                )
            }
        }
    }
}

/// Keeps every event in memory
#[derive(Debug, Default)]
pub struct MemorySink {
    events: Mutex<Vec<SnapshotEvent>>,
}

impl MemorySink {
    /// Create an empty sink
    pub fn new() -> Self {
        MemorySink::default()
    }

    /// Copy of all events recorded so far
    pub fn events(&self) -> Vec<SnapshotEvent> {
        self.events.lock().clone()
    }

    /// Events of one phase
    pub fn in_phase(&self, phase: Phase) -> Vec<SnapshotEvent> {
        self.events
            .lock()
            .iter()
            .filter(|e| e.phase == phase)
            .cloned()
            .collect()
    }
}

impl EventSink for MemorySink {
    fn emit(&self, event: SnapshotEvent) {
        self.events.lock().push(event);
    }
}

/// The sink used when the caller does not inject one
pub fn default_sink() -> Arc<dyn EventSink> {
    Arc::new(TracingSink)
}

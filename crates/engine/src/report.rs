//! Run reports and result messages

use std::path::PathBuf;

use serde::Serialize;
use sqlsnap_core::Phase;
use sqlsnap_durability::{BackupKind, RestoreKind};

/// Outcome of a backup run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BackupReport {
    /// Human-readable summary
    pub message: String,
    /// Version label of the snapshot
    pub label: String,
    /// Version directory
    pub dir: PathBuf,
    /// Artifact files, in write order
    pub files: Vec<PathBuf>,
    /// Tables captured, in catalog order
    pub tables: Vec<String>,
}

/// One statement that did not apply during a restore
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatementFailure {
    /// Phase the statement ran in
    pub phase: Phase,
    /// Artifact file the statement came from
    pub file: String,
    /// Statement text
    pub statement: String,
    /// Error reported by the target
    pub cause: String,
}

/// Outcome of a restore run
///
/// A run with failures still succeeded: every failure here was logged and
/// skipped.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RestoreReport {
    /// Human-readable summary
    pub message: String,
    /// Version label that was restored
    pub label: String,
    /// Artifact files read
    pub files: usize,
    /// Statements that executed successfully
    pub applied: usize,
    /// DDL passes actually run
    pub ddl_passes: usize,
    /// Statements that never applied
    pub failures: Vec<StatementFailure>,
}

impl RestoreReport {
    /// Whether every statement applied
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }

    /// Failures recorded in one phase
    pub fn failures_in(&self, phase: Phase) -> Vec<&StatementFailure> {
        self.failures.iter().filter(|f| f.phase == phase).collect()
    }
}

/// Summary of a backup run
pub fn backup_message(database: &str, table: Option<&str>, kind: BackupKind) -> String {
    match (table, kind) {
        (None, BackupKind::Full) => format!("Successfully backed up {}!", database),
        (None, BackupKind::Structure) => {
            format!("Successfully backed up {}'s structure!", database)
        }
        (None, BackupKind::Data) => format!("Successfully backed up {}'s data!", database),
        (Some(t), BackupKind::Full) => format!("Successfully backed up {} from {}!", t, database),
        (Some(t), BackupKind::Structure) => {
            format!("Successfully backed up {}'s structure from {}!", t, database)
        }
        (Some(t), BackupKind::Data) => {
            format!("Successfully backed up {}'s data from {}!", t, database)
        }
    }
}

/// Summary of a restore run
pub fn restore_message(database: &str, table: Option<&str>, kind: Option<RestoreKind>) -> String {
    let base = match table {
        Some(t) => format!("Restored {} table from {} database", t, database),
        None => format!("Restored {} database", database),
    };
    match kind {
        Some(RestoreKind::Structure) => format!("{} structure", base),
        Some(RestoreKind::Data) => format!("{} data", base),
        None => base,
    }
}

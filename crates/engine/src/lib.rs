//! Snapshot engine for sqlsnap
//!
//! This crate ties adapters and snapshot persistence together:
//! - Serializer: Schema and rows to SQL text
//! - Backup: Extract a scope and publish it as a snapshot version
//! - Restore: Replay a snapshot version with bounded DDL retries
//! - BackupReport / RestoreReport: What a run did

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod backup;
pub mod report;
pub mod restore;
pub mod serializer;

pub use backup::Backup;
pub use report::{backup_message, restore_message, BackupReport, RestoreReport, StatementFailure};
pub use restore::{Restore, RestoreState};
pub use serializer::{format_float, format_row, format_value, quote_text, Serializer};

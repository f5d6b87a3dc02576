//! Error types for sqlsnap
//!
//! This module defines the error taxonomy shared by every crate in the
//! workspace. We use `thiserror` for automatic `Display` and `Error` trait
//! implementations.
//!
//! Only [`Error::Statement`] is recoverable: the restore executor logs it,
//! records it and moves on. Every other variant aborts the run.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for sqlsnap operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for backup and restore runs
#[derive(Debug, Error)]
pub enum Error {
    /// The target database could not be opened or validated
    #[error("Connection error ({dialect}): {reason}")]
    Connection {
        /// Dialect tag of the profile that failed
        dialect: String,
        /// Driver-level description of the failure
        reason: String,
    },

    /// No adapter is registered for the requested dialect tag
    #[error("Unknown dialect: {0}")]
    UnknownDialect(String),

    /// Extraction or artifact writing failed during a backup run
    #[error("Backup error: {0}")]
    Backup(String),

    /// A snapshot version directory or artifact does not exist
    #[error("Not found: {}", path.display())]
    NotFound {
        /// Path that was looked up
        path: PathBuf,
    },

    /// The snapshot root holds no snapshot to restore
    #[error("No snapshot found under {}", root.display())]
    NoSnapshot {
        /// Snapshot root that was scanned
        root: PathBuf,
    },

    /// A single statement failed in the target database
    #[error("Statement failed: {cause} (statement: {text})")]
    Statement {
        /// Statement text, as submitted
        text: String,
        /// Driver-level cause
        cause: String,
    },

    /// Invalid backup or restore configuration
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// I/O error (file operations)
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl Error {
    /// Create a connection error for a dialect
    pub fn connection(dialect: impl Into<String>, reason: impl ToString) -> Self {
        Error::Connection {
            dialect: dialect.into(),
            reason: reason.to_string(),
        }
    }

    /// Create a statement error
    pub fn statement(text: impl Into<String>, cause: impl ToString) -> Self {
        Error::Statement {
            text: text.into(),
            cause: cause.to_string(),
        }
    }

    /// Create a backup error
    pub fn backup(msg: impl Into<String>) -> Self {
        Error::Backup(msg.into())
    }

    /// Whether the restore executor may skip this error and continue
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Error::Statement { .. })
    }
}

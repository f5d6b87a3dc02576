//! Snapshot persistence for sqlsnap
//!
//! This crate provides:
//! - SnapshotPaths: Snapshot root layout and version labels
//! - SnapshotWriter: Crash-safe publication of a snapshot directory
//! - resolve_version: Choice of the version a restore reads
//! - RestorePlan: Scan and classification of a version's artifacts
//! - split_statements: Quote- and comment-aware statement splitting
//! - BackupConfig / RestoreConfig: Run configuration

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod paths;
pub mod plan;
pub mod resolver;
pub mod splitter;
pub mod writer;

pub use config::{
    BackupConfig, BackupKind, BackupScope, ConfigError, Layout, RestoreConfig, RestoreKind,
    DEFAULT_DDL_PASSES,
};
pub use paths::{default_root, format_label, parse_label, SnapshotPaths, LABEL_WIDTH};
pub use plan::{ArtifactClass, PlannedFile, RestorePlan};
pub use resolver::{list_versions, resolve_version, ResolvedVersion};
pub use splitter::split_statements;
pub use writer::{SnapshotInfo, SnapshotWriter};

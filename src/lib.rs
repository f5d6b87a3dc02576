//! sqlsnap - Versioned SQL snapshots of relational databases
//!
//! sqlsnap extracts a database's schema and rows into portable SQL text,
//! stores each run as a timestamped snapshot directory, and replays a
//! snapshot into a (possibly empty) target database. Replay tolerates
//! statements whose prerequisites do not exist yet by retrying schema
//! statements over a bounded number of passes.
//!
//! # Quick Start
//!
//! ```ignore
//! use sqlsnap::{Backup, BackupConfig, ConnectionProfile, Restore, RestoreConfig};
//!
//! let source = ConnectionProfile::new("sqlite", "/var/data", "shop.db");
//! let backup = Backup::new(source, BackupConfig::database()).run()?;
//! println!("{}", backup.message); // Successfully backed up shop.db!
//!
//! let target = ConnectionProfile::new("sqlite", "/var/restore", "shop.db");
//! let report = Restore::new(target, RestoreConfig::default()).run()?;
//! println!("{}", report.message); // Restored shop.db database
//! ```
//!
//! # Architecture
//!
//! - `sqlsnap-core`: errors, profiles, descriptors, values, artifacts, events
//! - `sqlsnap-dialect`: adapter trait, SQLite adapter, dialect registry
//! - `sqlsnap-durability`: snapshot layout, writer, resolver, restore plan, config
//! - `sqlsnap-engine`: serializer, backup runner, restore executor

pub use sqlsnap_core::{
    default_sink, Artifact, ArtifactKind, ArtifactScope, ColumnDescriptor, ConnectionProfile,
    Credentials, Error, EventSink, MemorySink, Outcome, Phase, Result, SnapshotEvent, SplitNaming,
    SqlValue, TableDescriptor, TracingSink,
};
pub use sqlsnap_dialect::{
    DialectAdapter, DialectRegistry, OpenMode, SqlDialect, SqliteAdapter, SqliteDialect,
};
pub use sqlsnap_durability::{
    list_versions, resolve_version, BackupConfig, BackupKind, BackupScope, ConfigError, Layout,
    RestoreConfig, RestoreKind,
};
pub use sqlsnap_engine::{
    Backup, BackupReport, Restore, RestoreReport, RestoreState, Serializer, StatementFailure,
};

/// Testing utilities (scripted adapter)
pub mod testing {
    pub use sqlsnap_dialect::testing::*;
}

//! Shared test utilities for all integration test suites.
//!
//! Import via `#[path = "../common/mod.rs"] mod common;` from any test's main.rs.

#![allow(dead_code)]
#![allow(unused_imports)]

use std::path::{Path, PathBuf};
use std::sync::{Arc, Once};

use rusqlite::Connection;
pub use sqlsnap::{
    Backup, BackupConfig, ConnectionProfile, DialectAdapter, DialectRegistry, MemorySink,
    OpenMode, Phase, Restore, RestoreConfig, SqlValue,
};
use tempfile::TempDir;

// ============================================================================
// Initialization
// ============================================================================

static INIT_TRACING: Once = Once::new();

/// Install a test-writer subscriber once per test binary
pub fn init_tracing() {
    INIT_TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_test_writer()
            .with_max_level(tracing::Level::DEBUG)
            .try_init();
    });
}

// ============================================================================
// Sandbox - a scratch "server" directory with a snapshot root
// ============================================================================

/// Scratch directory holding SQLite databases and a snapshot root
pub struct Sandbox {
    pub dir: TempDir,
}

impl Sandbox {
    pub fn new() -> Self {
        init_tracing();
        Sandbox {
            dir: TempDir::new().unwrap(),
        }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Snapshot root inside the sandbox
    pub fn root(&self) -> PathBuf {
        self.dir.path().join("snapshots")
    }

    /// Profile of a SQLite database in the sandbox
    pub fn profile(&self, database: &str) -> ConnectionProfile {
        ConnectionProfile::new("sqlite", self.dir.path().to_str().unwrap(), database)
    }

    /// Create a database from a script and return its profile
    pub fn seed(&self, database: &str, script: &str) -> ConnectionProfile {
        let conn = Connection::open(self.dir.path().join(database)).unwrap();
        conn.execute_batch(script).unwrap();
        self.profile(database)
    }

    /// Backup config rooted in the sandbox
    pub fn backup_config(&self) -> BackupConfig {
        BackupConfig::database().with_root(self.root())
    }

    /// Restore config rooted in the sandbox
    pub fn restore_config(&self) -> RestoreConfig {
        RestoreConfig::default().with_root(self.root())
    }
}

// ============================================================================
// Inspection
// ============================================================================

/// Tables of a database, in catalog order
pub fn tables(profile: &ConnectionProfile) -> Vec<String> {
    DialectRegistry::builtin()
        .open(profile, OpenMode::Backup)
        .unwrap()
        .list_tables()
        .unwrap()
}

/// Every row of a table
pub fn rows(profile: &ConnectionProfile, table: &str) -> Vec<Vec<SqlValue>> {
    let adapter = DialectRegistry::builtin()
        .open(profile, OpenMode::Backup)
        .unwrap();
    let mut rows = Vec::new();
    adapter
        .fetch_rows(table, &mut |row| {
            rows.push(row);
            Ok(())
        })
        .unwrap();
    rows
}

/// Names of the files in a directory, sorted
pub fn file_names(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
        .collect();
    names.sort();
    names
}

/// A shop schema whose foreign keys point forward in catalog order
pub const SHOP: &str = "
    CREATE TABLE orders (
        id INTEGER PRIMARY KEY,
        customer_id INTEGER REFERENCES customers(id),
        placed_at DATETIME,
        total REAL
    );
    CREATE TABLE customers (id INTEGER PRIMARY KEY, name TEXT NOT NULL);
    CREATE TABLE audit (id INTEGER PRIMARY KEY, payload BLOB, flag BOOLEAN);
    CREATE INDEX idx_orders_placed ON orders(placed_at);
    INSERT INTO customers VALUES (1, 'O''Brien'), (2, 'Zoë');
    INSERT INTO orders VALUES (1, 1, '2024-05-06 07:08:09', 19.99), (2, 2, NULL, NULL);
";

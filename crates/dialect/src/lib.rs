//! Database dialect adapters for sqlsnap
//!
//! This crate provides:
//! - DialectAdapter: Extraction and execution capabilities of one connection
//! - SqlDialect: Literal and identifier conventions of one SQL product
//! - SqliteAdapter: The SQLite implementation, built on rusqlite
//! - DialectRegistry: Dialect tag to adapter lookup
//! - ScriptedAdapter: In-memory adapter for tests

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod adapter;
pub mod dialect;
pub mod registry;
pub mod sqlite;
pub mod testing;

pub use adapter::{DialectAdapter, OpenMode, RowVisitor};
pub use dialect::{hex_upper, SqlDialect, SqliteDialect};
pub use registry::{AdapterOpener, DialectRegistry};
pub use sqlite::{SqliteAdapter, SQLITE_DIALECT};
pub use testing::{Attempt, ScriptLog, ScriptedAdapter, ScriptedTable};

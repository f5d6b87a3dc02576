//! Dialect adapter capability trait
//!
//! A [`DialectAdapter`] is one open connection to one database product. It
//! answers the extraction queries a backup needs and executes the statements
//! a restore replays. The engine only ever talks to this trait; which type
//! sits behind it is decided once, by the registry, from the profile's
//! dialect tag.

use sqlsnap_core::{Result, SqlValue, TableDescriptor};

use crate::dialect::SqlDialect;

/// Purpose an adapter is opened for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenMode {
    /// Read-only extraction; a missing database is a connection error
    Backup,
    /// Replay; a missing database is created before connecting
    Restore,
}

/// Visitor receiving one row at a time from [`DialectAdapter::fetch_rows`]
pub type RowVisitor<'a> = dyn FnMut(Vec<SqlValue>) -> Result<()> + 'a;

/// Extraction and execution capabilities of one database connection
///
/// # Ordering
///
/// `list_tables` must return the same order on every call within one
/// connection. Snapshot file names and restore order derive from it.
pub trait DialectAdapter: Send {
    /// Text conventions of this dialect
    fn sql_dialect(&self) -> &dyn SqlDialect;

    /// Name of the connected database
    fn database(&self) -> &str;

    /// Base tables (no views, no internal catalog tables) in catalog order
    fn list_tables(&self) -> Result<Vec<String>>;

    /// Columns of a table
    fn describe_table(&self, table: &str) -> Result<TableDescriptor>;

    /// The dialect's own statements for recreating a table, `;`-terminated
    fn fetch_create_statement(&self, table: &str) -> Result<String>;

    /// Stream every row of a table to `visit`, returning the column names
    ///
    /// Rows are delivered in a single pass. To read them again, call again.
    fn fetch_rows(&self, table: &str, visit: &mut RowVisitor<'_>) -> Result<Vec<String>>;

    /// Privilege statements scoped to a database
    ///
    /// Returns an empty string when the dialect or connection cannot
    /// introspect privileges. That is not an error.
    fn fetch_grants(&self, database: &str) -> Result<String>;

    /// Execute one statement
    ///
    /// Fails with [`sqlsnap_core::Error::Statement`]; the caller decides
    /// whether that is fatal.
    fn execute(&mut self, statement: &str) -> Result<()>;
}

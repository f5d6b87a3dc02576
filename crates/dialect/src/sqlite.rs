//! SQLite dialect adapter
//!
//! Maps the adapter capabilities onto a `rusqlite` connection:
//!
//! | Capability | Source |
//! |---|---|
//! | `list_tables` | `sqlite_master` rows of type `table`, creation order |
//! | `describe_table` | `pragma_table_xinfo`, generated columns left out |
//! | `fetch_create_statement` | stored `sql` of the table and its indexes |
//! | `fetch_rows` | described columns selected by name, streamed row by row |
//! | `fetch_grants` | always empty (SQLite has no privileges) |
//! | `execute` | `execute_batch` of one statement |
//!
//! The profile's host is the directory that plays the role of the server and
//! its database name is the file inside that directory.

use std::path::{Path, PathBuf};

use rusqlite::types::ValueRef;
use rusqlite::{Connection, OpenFlags, OptionalExtension};
use sqlsnap_core::{ColumnDescriptor, ConnectionProfile, Error, Result, SqlValue, TableDescriptor};
use tracing::{debug, info, warn};

use crate::adapter::{DialectAdapter, OpenMode, RowVisitor};
use crate::dialect::{SqlDialect, SqliteDialect};

/// Dialect tag of this adapter
pub const SQLITE_DIALECT: &str = "sqlite";

/// Adapter over one SQLite database file
pub struct SqliteAdapter {
    conn: Connection,
    path: PathBuf,
    database: String,
    dialect: SqliteDialect,
}

impl std::fmt::Debug for SqliteAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteAdapter")
            .field("path", &self.path)
            .field("database", &self.database)
            .finish()
    }
}

impl SqliteAdapter {
    /// Open the database named by `profile`
    ///
    /// In [`OpenMode::Backup`] the file must already exist and is opened
    /// read-only. In [`OpenMode::Restore`] a missing file is created, provided
    /// its directory exists.
    pub fn open(profile: &ConnectionProfile, mode: OpenMode) -> Result<Self> {
        let host = Path::new(profile.host());
        let path = host.join(profile.database());

        if profile.credentials().is_some() {
            debug!(path = %path.display(), "SQLite ignores credentials");
        }

        let conn = match mode {
            OpenMode::Backup => open_existing(&path, OpenFlags::SQLITE_OPEN_READ_ONLY)?,
            OpenMode::Restore => match open_existing(&path, OpenFlags::SQLITE_OPEN_READ_WRITE) {
                Ok(conn) => conn,
                Err(err) if !path.exists() => {
                    if !host.is_dir() {
                        return Err(err);
                    }
                    warn!(path = %path.display(), "Database does not exist, creating it");
                    open_existing(
                        &path,
                        OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_CREATE,
                    )?
                }
                Err(err) => return Err(err),
            },
        };

        info!(path = %path.display(), ?mode, "Opened SQLite database");
        Ok(SqliteAdapter {
            conn,
            path,
            database: profile.database().to_string(),
            dialect: SqliteDialect,
        })
    }

    /// Path of the database file
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn quoted(&self, ident: &str) -> String {
        self.dialect.quote_identifier(ident)
    }
}

/// Open a connection and prove the file is a readable SQLite database
fn open_existing(path: &Path, flags: OpenFlags) -> Result<Connection> {
    let flags = flags | OpenFlags::SQLITE_OPEN_NO_MUTEX | OpenFlags::SQLITE_OPEN_URI;
    let conn = Connection::open_with_flags(path, flags)
        .map_err(|e| Error::connection(SQLITE_DIALECT, format!("{}: {}", path.display(), e)))?;
    conn.query_row("SELECT count(*) FROM sqlite_master", [], |row| {
        row.get::<_, i64>(0)
    })
    .map_err(|e| Error::connection(SQLITE_DIALECT, format!("{}: {}", path.display(), e)))?;
    Ok(conn)
}

fn extraction_error(context: impl std::fmt::Display, err: rusqlite::Error) -> Error {
    Error::backup(format!("{}: {}", context, err))
}

impl DialectAdapter for SqliteAdapter {
    fn sql_dialect(&self) -> &dyn SqlDialect {
        &self.dialect
    }

    fn database(&self) -> &str {
        &self.database
    }

    fn list_tables(&self) -> Result<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT name FROM sqlite_master \
                 WHERE type = 'table' AND name NOT LIKE 'sqlite\\_%' ESCAPE '\\' \
                 ORDER BY rowid",
            )
            .map_err(|e| extraction_error("listing tables", e))?;
        let tables = stmt
            .query_map([], |row| row.get::<_, String>(0))
            .and_then(|rows| rows.collect::<rusqlite::Result<Vec<_>>>())
            .map_err(|e| extraction_error("listing tables", e))?;
        debug!(count = tables.len(), "Listed tables");
        Ok(tables)
    }

    fn describe_table(&self, table: &str) -> Result<TableDescriptor> {
        let context = || format!("describing table '{}'", table);
        let mut stmt = self
            .conn
            .prepare(
                "SELECT name, type, \"notnull\", dflt_value, pk \
                 FROM pragma_table_xinfo(?1) WHERE hidden NOT IN (2, 3) ORDER BY cid",
            )
            .map_err(|e| extraction_error(context(), e))?;
        let columns = stmt
            .query_map([table], |row| {
                let mut column = ColumnDescriptor::new(
                    row.get::<_, String>(0)?,
                    row.get::<_, Option<String>>(1)?.unwrap_or_default(),
                );
                column.nullable = row.get::<_, i64>(2)? == 0;
                column.default = row.get::<_, Option<String>>(3)?;
                column.primary_key = row.get::<_, i64>(4)? > 0;
                Ok(column)
            })
            .and_then(|rows| rows.collect::<rusqlite::Result<Vec<_>>>())
            .map_err(|e| extraction_error(context(), e))?;

        if columns.is_empty() {
            return Err(Error::backup(format!("table '{}' does not exist", table)));
        }
        Ok(TableDescriptor::new(table, columns))
    }

    fn fetch_create_statement(&self, table: &str) -> Result<String> {
        let context = || format!("reading definition of '{}'", table);
        let create: Option<String> = self
            .conn
            .query_row(
                "SELECT sql FROM sqlite_master WHERE type = 'table' AND name = ?1",
                [table],
                |row| row.get(0),
            )
            .optional()
            .map_err(|e| extraction_error(context(), e))?;
        let create =
            create.ok_or_else(|| Error::backup(format!("table '{}' does not exist", table)))?;

        let mut text = format!("{};\n", create.trim_end().trim_end_matches(';'));

        // Automatic indexes (PRIMARY KEY / UNIQUE) have no stored sql
        let mut stmt = self
            .conn
            .prepare(
                "SELECT sql FROM sqlite_master \
                 WHERE type = 'index' AND tbl_name = ?1 AND sql IS NOT NULL \
                 ORDER BY rowid",
            )
            .map_err(|e| extraction_error(context(), e))?;
        let indexes = stmt
            .query_map([table], |row| row.get::<_, String>(0))
            .and_then(|rows| rows.collect::<rusqlite::Result<Vec<_>>>())
            .map_err(|e| extraction_error(context(), e))?;
        for index in indexes {
            text.push_str(index.trim_end().trim_end_matches(';'));
            text.push_str(";\n");
        }
        Ok(text)
    }

    fn fetch_rows(&self, table: &str, visit: &mut RowVisitor<'_>) -> Result<Vec<String>> {
        let descriptor = self.describe_table(table)?;
        let context = || format!("reading rows of '{}'", table);

        // Generated columns are recomputed by the target and cannot be inserted
        let columns: Vec<String> = descriptor.columns.iter().map(|c| c.name.clone()).collect();
        let temporal: Vec<bool> = descriptor
            .columns
            .iter()
            .map(ColumnDescriptor::is_temporal)
            .collect();
        let select: Vec<String> = columns.iter().map(|c| self.quoted(c)).collect();

        let sql = format!("SELECT {} FROM {}", select.join(", "), self.quoted(table));
        let mut stmt = self
            .conn
            .prepare(&sql)
            .map_err(|e| extraction_error(context(), e))?;

        let mut rows = stmt.query([]).map_err(|e| extraction_error(context(), e))?;
        let mut count = 0usize;
        while let Some(row) = rows.next().map_err(|e| extraction_error(context(), e))? {
            let mut values = Vec::with_capacity(columns.len());
            for (i, is_temporal) in temporal.iter().enumerate() {
                let value = row.get_ref(i).map_err(|e| extraction_error(context(), e))?;
                values.push(to_sql_value(value, *is_temporal));
            }
            visit(values)?;
            count += 1;
        }
        debug!(table, rows = count, "Fetched rows");
        Ok(columns)
    }

    fn fetch_grants(&self, _database: &str) -> Result<String> {
        Ok(String::new())
    }

    fn execute(&mut self, statement: &str) -> Result<()> {
        self.conn
            .execute_batch(statement)
            .map_err(|e| Error::statement(statement, e))
    }
}

fn to_sql_value(value: ValueRef<'_>, temporal: bool) -> SqlValue {
    match value {
        ValueRef::Null => SqlValue::Null,
        ValueRef::Integer(i) => SqlValue::Int(i),
        ValueRef::Real(f) => SqlValue::Float(f),
        ValueRef::Text(bytes) => match std::str::from_utf8(bytes) {
            Ok(text) => match temporal
                .then(|| SqlValue::parse_canonical_timestamp(text))
                .flatten()
            {
                Some(ts) => SqlValue::Timestamp(ts),
                None => SqlValue::Text(text.to_string()),
            },
            Err(_) => SqlValue::RawText(bytes.to_vec()),
        },
        ValueRef::Blob(bytes) => SqlValue::Bytes(bytes.to_vec()),
    }
}

//! Testing utilities for adapters
//!
//! [`ScriptedAdapter`] is an in-memory [`DialectAdapter`]:
//!
//! - **Extraction**: serves tables, create statements, rows and grants that
//!   the test registered up front.
//! - **Execution**: keeps a catalog of created tables and enforces
//!   dependencies that SQLite itself does not enforce at DDL time. A
//!   `CREATE TABLE a (... REFERENCES b ...)` fails until `b` exists, and an
//!   `INSERT INTO a` fails until `a` exists.
//!
//! Every `execute` call is recorded in a shared [`ScriptLog`] that stays
//! readable after the adapter has been boxed and handed to the engine.
//!
//! # Example
//!
//! ```ignore
//! let mut adapter = ScriptedAdapter::new("shop");
//! let log = adapter.log();
//! restore.run_with(&mut adapter)?;
//! assert_eq!(log.applied().len(), 3);
//! ```

use std::collections::HashSet;
use std::sync::Arc;

use parking_lot::Mutex;
use sqlsnap_core::{ColumnDescriptor, Error, Result, SqlValue, TableDescriptor};

use crate::adapter::{DialectAdapter, RowVisitor};
use crate::dialect::{SqlDialect, SqliteDialect};

/// One canned table
#[derive(Debug, Clone)]
pub struct ScriptedTable {
    /// Table columns
    pub descriptor: TableDescriptor,
    /// Create text returned by `fetch_create_statement`
    pub create: String,
    /// Rows returned by `fetch_rows`
    pub rows: Vec<Vec<SqlValue>>,
}

/// Outcome of one `execute` call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attempt {
    /// Statement as submitted
    pub statement: String,
    /// Whether it succeeded
    pub ok: bool,
}

#[derive(Debug, Default)]
struct LogState {
    attempts: Vec<Attempt>,
    created: Vec<String>,
}

/// Shared record of statements executed by a [`ScriptedAdapter`]
#[derive(Debug, Clone, Default)]
pub struct ScriptLog {
    state: Arc<Mutex<LogState>>,
}

impl ScriptLog {
    /// Every attempt, in order
    pub fn attempts(&self) -> Vec<Attempt> {
        self.state.lock().attempts.clone()
    }

    /// Statements that succeeded, in order
    pub fn applied(&self) -> Vec<String> {
        self.state
            .lock()
            .attempts
            .iter()
            .filter(|a| a.ok)
            .map(|a| a.statement.clone())
            .collect()
    }

    /// Statements that failed, in order
    pub fn failed(&self) -> Vec<String> {
        self.state
            .lock()
            .attempts
            .iter()
            .filter(|a| !a.ok)
            .map(|a| a.statement.clone())
            .collect()
    }

    /// Tables created through `execute`, in creation order
    pub fn created_tables(&self) -> Vec<String> {
        self.state.lock().created.clone()
    }
}

/// In-memory adapter with scripted extraction results and dependency checks
#[derive(Debug)]
pub struct ScriptedAdapter {
    database: String,
    tables: Vec<ScriptedTable>,
    grants: String,
    always_fail: Vec<String>,
    dialect: SqliteDialect,
    log: ScriptLog,
}

impl ScriptedAdapter {
    /// Empty adapter for a database
    pub fn new(database: impl Into<String>) -> Self {
        ScriptedAdapter {
            database: database.into(),
            tables: Vec::new(),
            grants: String::new(),
            always_fail: Vec::new(),
            dialect: SqliteDialect,
            log: ScriptLog::default(),
        }
    }

    /// Add a canned table; `create` defaults to a `CREATE TABLE` built from the columns
    pub fn with_table(
        mut self,
        descriptor: TableDescriptor,
        create: Option<&str>,
        rows: Vec<Vec<SqlValue>>,
    ) -> Self {
        let create = match create {
            Some(text) => text.to_string(),
            None => default_create(&descriptor),
        };
        self.tables.push(ScriptedTable {
            descriptor,
            create,
            rows,
        });
        self
    }

    /// Set the grants text
    pub fn with_grants(mut self, grants: impl Into<String>) -> Self {
        self.grants = grants.into();
        self
    }

    /// Make every statement containing `needle` fail
    pub fn failing_on(mut self, needle: impl Into<String>) -> Self {
        self.always_fail.push(needle.into());
        self
    }

    /// Mark tables as already existing in the target
    pub fn with_existing(self, tables: &[&str]) -> Self {
        self.log
            .state
            .lock()
            .created
            .extend(tables.iter().map(|t| t.to_string()));
        self
    }

    /// Handle to the execution log
    pub fn log(&self) -> ScriptLog {
        self.log.clone()
    }

    fn table(&self, name: &str) -> Result<&ScriptedTable> {
        self.tables
            .iter()
            .find(|t| t.descriptor.name == name)
            .ok_or_else(|| Error::backup(format!("table '{}' does not exist", name)))
    }

    fn check(
        &self,
        statement: &str,
        created: &[String],
    ) -> std::result::Result<Option<String>, String> {
        if let Some(needle) = self.always_fail.iter().find(|n| statement.contains(n.as_str())) {
            return Err(format!("scripted failure on '{}'", needle));
        }

        let tokens = tokenize(statement);
        let keyword = |i: usize, word: &str| {
            tokens
                .get(i)
                .map(|t| t.eq_ignore_ascii_case(word))
                .unwrap_or(false)
        };
        let exists = |name: &str| created.iter().any(|c| c == name);

        if keyword(0, "CREATE") && keyword(1, "TABLE") {
            let mut at = 2;
            if keyword(2, "IF") && keyword(3, "NOT") && keyword(4, "EXISTS") {
                at = 5;
            }
            let name = tokens
                .get(at)
                .map(|t| unquote(t))
                .ok_or_else(|| "incomplete CREATE TABLE".to_string())?;
            if exists(&name) {
                return Err(format!("table {} already exists", name));
            }
            for (i, token) in tokens.iter().enumerate() {
                if token.eq_ignore_ascii_case("REFERENCES") {
                    if let Some(target) = tokens.get(i + 1).map(|t| unquote(t)) {
                        if target != name && !exists(&target) {
                            return Err(format!("no such table: {}", target));
                        }
                    }
                }
            }
            return Ok(Some(name));
        }

        if keyword(0, "INSERT") && keyword(1, "INTO") {
            if let Some(name) = tokens.get(2).map(|t| unquote(t)) {
                if !exists(&name) {
                    return Err(format!("no such table: {}", name));
                }
            }
        }
        Ok(None)
    }
}

impl DialectAdapter for ScriptedAdapter {
    fn sql_dialect(&self) -> &dyn SqlDialect {
        &self.dialect
    }

    fn database(&self) -> &str {
        &self.database
    }

    fn list_tables(&self) -> Result<Vec<String>> {
        Ok(self
            .tables
            .iter()
            .map(|t| t.descriptor.name.clone())
            .collect())
    }

    fn describe_table(&self, table: &str) -> Result<TableDescriptor> {
        Ok(self.table(table)?.descriptor.clone())
    }

    fn fetch_create_statement(&self, table: &str) -> Result<String> {
        Ok(self.table(table)?.create.clone())
    }

    fn fetch_rows(&self, table: &str, visit: &mut RowVisitor<'_>) -> Result<Vec<String>> {
        let table = self.table(table)?;
        for row in &table.rows {
            visit(row.clone())?;
        }
        Ok(table
            .descriptor
            .column_names()
            .into_iter()
            .map(String::from)
            .collect())
    }

    fn fetch_grants(&self, _database: &str) -> Result<String> {
        Ok(self.grants.clone())
    }

    fn execute(&mut self, statement: &str) -> Result<()> {
        let created = self.log.state.lock().created.clone();
        let outcome = self.check(statement, &created);

        let mut state = self.log.state.lock();
        state.attempts.push(Attempt {
            statement: statement.to_string(),
            ok: outcome.is_ok(),
        });
        match outcome {
            Ok(Some(name)) => {
                state.created.push(name);
                Ok(())
            }
            Ok(None) => Ok(()),
            Err(cause) => Err(Error::statement(statement, cause)),
        }
    }
}

fn default_create(descriptor: &TableDescriptor) -> String {
    let dialect = SqliteDialect;
    let columns: Vec<String> = descriptor
        .columns
        .iter()
        .map(|c: &ColumnDescriptor| {
            let mut def = format!("{} {}", dialect.quote_identifier(&c.name), c.declared_type);
            if c.primary_key {
                def.push_str(" PRIMARY KEY");
            }
            if !c.nullable {
                def.push_str(" NOT NULL");
            }
            if let Some(default) = &c.default {
                def.push_str(" DEFAULT ");
                def.push_str(default);
            }
            def
        })
        .collect();
    format!(
        "CREATE TABLE {} ({});\n",
        dialect.quote_identifier(&descriptor.name),
        columns.join(", ")
    )
}

fn tokenize(statement: &str) -> Vec<&str> {
    statement
        .split(|c: char| c.is_whitespace() || matches!(c, '(' | ')' | ',' | ';'))
        .filter(|t| !t.is_empty())
        .collect()
}

fn unquote(token: &str) -> String {
    token
        .trim_matches(|c| matches!(c, '"' | '`' | '[' | ']'))
        .to_string()
}

//! SQL text generation
//!
//! Turns introspected tables and streamed rows into SQL text:
//!
//! - **Structure**: session preamble, one create text per table, optional
//!   grants, session postamble
//! - **Data**: per table, a begin marker, one multi-row `INSERT`, a commit
//!   marker; tables without rows contribute nothing
//!
//! Every function returns a fresh `String`. Nothing is accumulated across
//! calls, so the backup runner can assemble artifacts in any order.

use sqlsnap_core::{Result, SqlValue, TIMESTAMP_FORMAT};
use sqlsnap_dialect::{DialectAdapter, SqlDialect};
use tracing::debug;

/// Literal used for positive infinity
pub const POSITIVE_INFINITY: &str = "9e999";
/// Literal used for negative infinity
pub const NEGATIVE_INFINITY: &str = "-9e999";

/// Render one value as a SQL literal
pub fn format_value(dialect: &dyn SqlDialect, value: &SqlValue) -> String {
    match value {
        SqlValue::Null => "NULL".to_string(),
        SqlValue::Bool(true) => "TRUE".to_string(),
        SqlValue::Bool(false) => "FALSE".to_string(),
        SqlValue::Int(i) => i.to_string(),
        SqlValue::Float(f) => format_float(*f),
        SqlValue::Text(s) => quote_text(s),
        SqlValue::RawText(b) => dialect.raw_text_literal(b),
        SqlValue::Bytes(b) => dialect.hex_literal(b),
        SqlValue::Timestamp(ts) => format!("'{}'", ts.format(TIMESTAMP_FORMAT)),
    }
}

/// Shortest round-trip decimal that still reads back as a float
///
/// `1.0` stays `1.0`, `1e300` stays `1e300`. NaN has no literal and
/// becomes `NULL`.
pub fn format_float(f: f64) -> String {
    if f.is_nan() {
        "NULL".to_string()
    } else if f == f64::INFINITY {
        POSITIVE_INFINITY.to_string()
    } else if f == f64::NEG_INFINITY {
        NEGATIVE_INFINITY.to_string()
    } else {
        // Debug keeps a fractional part or exponent
        format!("{:?}", f)
    }
}

/// Single-quote text, doubling embedded quotes
pub fn quote_text(text: &str) -> String {
    format!("'{}'", text.replace('\'', "''"))
}

/// Render a row as a parenthesized tuple: `(1,NULL,'O''Brien',X'DEAD')`
pub fn format_row(dialect: &dyn SqlDialect, row: &[SqlValue]) -> String {
    let values: Vec<String> = row.iter().map(|v| format_value(dialect, v)).collect();
    format!("({})", values.join(","))
}

/// Multi-row insert, or `None` when there are no rows
pub fn insert_statement(
    dialect: &dyn SqlDialect,
    table: &str,
    columns: &[String],
    tuples: &[String],
) -> Option<String> {
    if tuples.is_empty() {
        return None;
    }
    let columns: Vec<String> = columns.iter().map(|c| dialect.quote_identifier(c)).collect();
    Some(format!(
        "INSERT INTO {} ({}) VALUES {};\n",
        dialect.quote_identifier(table),
        columns.join(","),
        tuples.join(",")
    ))
}

/// Serializer bound to one adapter
pub struct Serializer<'a> {
    adapter: &'a dyn DialectAdapter,
}

impl<'a> Serializer<'a> {
    /// Create a serializer reading through `adapter`
    pub fn new(adapter: &'a dyn DialectAdapter) -> Self {
        Serializer { adapter }
    }

    fn dialect(&self) -> &dyn SqlDialect {
        self.adapter.sql_dialect()
    }

    /// Create text of one table, `;`-terminated and newline-ended
    pub fn create_text(&self, table: &str) -> Result<String> {
        let mut text = self.adapter.fetch_create_statement(table)?;
        if !text.ends_with('\n') {
            text.push('\n');
        }
        Ok(text)
    }

    /// Begin marker, one insert, commit marker; empty for a table without rows
    pub fn insert_text(&self, table: &str) -> Result<String> {
        let dialect = self.dialect();
        let mut tuples = Vec::new();
        let columns = self.adapter.fetch_rows(table, &mut |row| {
            tuples.push(format_row(dialect, &row));
            Ok(())
        })?;
        debug!(table, rows = tuples.len(), "Serialized rows");

        Ok(match insert_statement(dialect, table, &columns, &tuples) {
            Some(insert) => format!(
                "{}{}{}",
                dialect.begin_marker(),
                insert,
                dialect.commit_marker()
            ),
            None => String::new(),
        })
    }

    /// Structure of one table, wrapped in the session preamble/postamble
    pub fn serialize_table(&self, table: &str) -> Result<String> {
        Ok(self.wrap(&self.create_text(table)?))
    }

    /// Data of one table, wrapped in the session preamble/postamble
    ///
    /// Empty when the table has no rows.
    pub fn serialize_table_data(&self, table: &str) -> Result<String> {
        let inserts = self.insert_text(table)?;
        if inserts.is_empty() {
            return Ok(inserts);
        }
        Ok(self.wrap(&inserts))
    }

    /// Structure of several tables plus optional grants
    pub fn serialize_structure(&self, tables: &[String], grants: &str) -> Result<String> {
        let mut body = String::new();
        for table in tables {
            body.push_str(&self.create_text(table)?);
        }
        body.push_str(grants);
        Ok(self.wrap(&body))
    }

    /// Data of several tables; empty when none of them has rows
    pub fn serialize_data(&self, tables: &[String]) -> Result<String> {
        let mut body = String::new();
        for table in tables {
            body.push_str(&self.insert_text(table)?);
        }
        if body.is_empty() {
            return Ok(body);
        }
        Ok(self.wrap(&body))
    }

    /// Structure, grants and data of several tables in one script
    pub fn serialize_combined(&self, tables: &[String], grants: &str) -> Result<String> {
        let mut body = String::new();
        for table in tables {
            body.push_str(&self.create_text(table)?);
        }
        body.push_str(grants);
        for table in tables {
            body.push_str(&self.insert_text(table)?);
        }
        Ok(self.wrap(&body))
    }

    /// Privilege statements of a database; empty when there are none
    pub fn serialize_grants(&self, database: &str) -> Result<String> {
        let grants = self.adapter.fetch_grants(database)?;
        let grants = grants.trim();
        if grants.is_empty() {
            return Ok(String::new());
        }
        Ok(format!("{}\n", grants))
    }

    fn wrap(&self, body: &str) -> String {
        let dialect = self.dialect();
        format!(
            "{}{}{}",
            dialect.session_preamble(),
            body,
            dialect.session_postamble()
        )
    }
}

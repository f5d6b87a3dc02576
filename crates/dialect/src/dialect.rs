//! SQL text conventions per dialect
//!
//! A [`SqlDialect`] knows how one database product spells identifiers,
//! binary literals and session settings. It has no connection; the
//! serializer uses it to turn values into literals.

/// Text conventions of one SQL dialect
///
/// # Thread Safety
///
/// Dialects are stateless and must be `Send + Sync`.
pub trait SqlDialect: Send + Sync {
    /// Dialect tag, as used in connection profiles
    fn name(&self) -> &str;

    /// Quote an identifier, escaping embedded quote characters
    fn quote_identifier(&self, ident: &str) -> String {
        format!("\"{}\"", ident.replace('"', "\"\""))
    }

    /// Hex literal for binary data
    fn hex_literal(&self, bytes: &[u8]) -> String {
        format!("X'{}'", hex_upper(bytes))
    }

    /// Text literal for character data that is not valid UTF-8
    fn raw_text_literal(&self, bytes: &[u8]) -> String {
        format!("CAST({} AS TEXT)", self.hex_literal(bytes))
    }

    /// Statements that relax referential checks for the duration of a script
    fn session_preamble(&self) -> &str;

    /// Statements that undo [`SqlDialect::session_preamble`]
    fn session_postamble(&self) -> &str;

    /// Statement opening the transaction around a table's inserts
    fn begin_marker(&self) -> &str;

    /// Statement committing a table's inserts
    fn commit_marker(&self) -> &str;
}

/// SQLite text conventions
#[derive(Debug, Default, Clone, Copy)]
pub struct SqliteDialect;

impl SqlDialect for SqliteDialect {
    fn name(&self) -> &str {
        "sqlite"
    }

    fn session_preamble(&self) -> &str {
        "PRAGMA foreign_keys=OFF;\n"
    }

    fn session_postamble(&self) -> &str {
        "PRAGMA foreign_keys=ON;\n"
    }

    fn begin_marker(&self) -> &str {
        "BEGIN TRANSACTION;\n"
    }

    fn commit_marker(&self) -> &str {
        "COMMIT;\n"
    }
}

/// Encode bytes as uppercase hex
pub fn hex_upper(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02X}", b)).collect()
}

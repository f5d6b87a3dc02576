//! Dialect registry
//!
//! Maps a dialect tag to the function that opens an adapter for it. The tag
//! is looked up once, when a run starts; after that the engine only sees a
//! `Box<dyn DialectAdapter>`.

use std::collections::HashMap;

use sqlsnap_core::{ConnectionProfile, Error, Result};

use crate::adapter::{DialectAdapter, OpenMode};
use crate::sqlite::{SqliteAdapter, SQLITE_DIALECT};

/// Function opening an adapter for a profile
pub type AdapterOpener = fn(&ConnectionProfile, OpenMode) -> Result<Box<dyn DialectAdapter>>;

/// Registry of adapter openers keyed by lowercase dialect tag
#[derive(Clone)]
pub struct DialectRegistry {
    openers: HashMap<String, AdapterOpener>,
}

impl std::fmt::Debug for DialectRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DialectRegistry")
            .field("dialects", &self.dialects())
            .finish()
    }
}

impl Default for DialectRegistry {
    fn default() -> Self {
        DialectRegistry::builtin()
    }
}

impl DialectRegistry {
    /// Registry with no dialects
    pub fn empty() -> Self {
        DialectRegistry {
            openers: HashMap::new(),
        }
    }

    /// Registry with every adapter shipped in this crate
    pub fn builtin() -> Self {
        let mut registry = DialectRegistry::empty();
        registry.register(SQLITE_DIALECT, open_sqlite);
        registry.register("sqlite3", open_sqlite);
        registry
    }

    /// Register (or replace) the opener for a tag
    pub fn register(&mut self, dialect: &str, opener: AdapterOpener) {
        self.openers.insert(dialect.to_ascii_lowercase(), opener);
    }

    /// Whether a tag is known
    pub fn supports(&self, dialect: &str) -> bool {
        self.openers.contains_key(&dialect.to_ascii_lowercase())
    }

    /// Known tags, sorted
    pub fn dialects(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.openers.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Open an adapter for the profile's dialect
    pub fn open(
        &self,
        profile: &ConnectionProfile,
        mode: OpenMode,
    ) -> Result<Box<dyn DialectAdapter>> {
        let opener = self
            .openers
            .get(&profile.dialect().to_ascii_lowercase())
            .ok_or_else(|| Error::UnknownDialect(profile.dialect().to_string()))?;
        opener(profile, mode)
    }
}

fn open_sqlite(profile: &ConnectionProfile, mode: OpenMode) -> Result<Box<dyn DialectAdapter>> {
    Ok(Box::new(SqliteAdapter::open(profile, mode)?))
}

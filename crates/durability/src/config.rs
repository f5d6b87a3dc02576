//! Backup and restore configuration
//!
//! Both configs are plain data with builder-style setters, a `validate()`
//! check, and JSON loading through serde. Nothing here touches a database.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use sqlsnap_core::{ConnectionProfile, SplitNaming};

use crate::paths::default_root;

/// Default number of DDL passes
pub const DEFAULT_DDL_PASSES: usize = 2;

/// What a backup covers
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackupScope {
    /// Every base table of the database
    #[default]
    Database,
    /// A single table
    Table(String),
}

/// Which content a backup captures
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackupKind {
    /// Structure and data
    #[default]
    Full,
    /// Schema definitions only
    Structure,
    /// Row data only
    Data,
}

/// How artifacts are grouped into files
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Layout {
    /// One file per run
    Combined,
    /// Structure and data in separate files
    #[default]
    Split,
    /// One DDL and one DML file per table, plus the database's DCL file
    Separate,
}

/// Which buckets a restore applies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RestoreKind {
    /// DDL artifacts only
    Structure,
    /// DML artifacts only
    Data,
}

/// Backup configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackupConfig {
    /// Snapshot root (default: `backup/<database>-<dialect>`)
    pub root: Option<PathBuf>,
    /// Database or single table
    pub scope: BackupScope,
    /// Structure, data or both
    pub kind: BackupKind,
    /// File grouping
    pub layout: Layout,
    /// Split file naming
    pub naming: SplitNaming,
}

impl BackupConfig {
    /// Full backup of the whole database
    pub fn database() -> Self {
        BackupConfig::default()
    }

    /// Full backup of one table
    pub fn table(name: impl Into<String>) -> Self {
        BackupConfig {
            scope: BackupScope::Table(name.into()),
            ..Default::default()
        }
    }

    /// Set the snapshot root
    pub fn with_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.root = Some(root.into());
        self
    }

    /// Set the content kind
    pub fn with_kind(mut self, kind: BackupKind) -> Self {
        self.kind = kind;
        self
    }

    /// Set the layout
    pub fn with_layout(mut self, layout: Layout) -> Self {
        self.layout = layout;
        self
    }

    /// Set split naming
    pub fn with_naming(mut self, naming: SplitNaming) -> Self {
        self.naming = naming;
        self
    }

    /// Snapshot root for a profile
    pub fn root_for(&self, profile: &ConnectionProfile) -> PathBuf {
        self.root.clone().unwrap_or_else(|| default_root(profile))
    }

    /// Layout actually used
    ///
    /// A single table has no per-table split to separate, so `Separate`
    /// falls back to `Split` for table scope.
    pub fn effective_layout(&self) -> Layout {
        match (&self.scope, self.layout) {
            (BackupScope::Table(_), Layout::Separate) => Layout::Split,
            (_, layout) => layout,
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let BackupScope::Table(name) = &self.scope {
            if name.trim().is_empty() {
                return Err(ConfigError::EmptyTableName);
            }
        }
        if let Some(root) = &self.root {
            validate_root(root)?;
        }
        Ok(())
    }

    /// Parse from JSON text
    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        let config: BackupConfig = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a JSON file
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path.as_ref()).map_err(|e| ConfigError::Read {
            path: path.as_ref().to_path_buf(),
            reason: e.to_string(),
        })?;
        BackupConfig::from_json_str(&text)
    }
}

/// Restore configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RestoreConfig {
    /// Snapshot root (default: `backup/<database>-<dialect>`)
    pub root: Option<PathBuf>,
    /// Version label (default: newest)
    pub version: Option<String>,
    /// Restore only files whose name contains this table name
    pub table: Option<String>,
    /// Restore only structure or only data
    pub kind: Option<RestoreKind>,
    /// Maximum passes over DDL statements
    pub ddl_passes: usize,
}

impl Default for RestoreConfig {
    fn default() -> Self {
        RestoreConfig {
            root: None,
            version: None,
            table: None,
            kind: None,
            ddl_passes: DEFAULT_DDL_PASSES,
        }
    }
}

impl RestoreConfig {
    /// Set the snapshot root
    pub fn with_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.root = Some(root.into());
        self
    }

    /// Pin a version label
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    /// Restrict to one table
    pub fn with_table(mut self, table: impl Into<String>) -> Self {
        self.table = Some(table.into());
        self
    }

    /// Restrict to structure or data
    pub fn with_kind(mut self, kind: RestoreKind) -> Self {
        self.kind = Some(kind);
        self
    }

    /// Set the DDL pass bound
    pub fn with_ddl_passes(mut self, passes: usize) -> Self {
        self.ddl_passes = passes;
        self
    }

    /// Snapshot root for a profile
    pub fn root_for(&self, profile: &ConnectionProfile) -> PathBuf {
        self.root.clone().unwrap_or_else(|| default_root(profile))
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.ddl_passes == 0 {
            return Err(ConfigError::InvalidDdlPasses(self.ddl_passes));
        }
        if matches!(&self.table, Some(t) if t.trim().is_empty()) {
            return Err(ConfigError::EmptyTableName);
        }
        if let Some(version) = &self.version {
            let is_separator = |c: char| c == '/' || c == '\\';
            if version.is_empty() || version.contains(is_separator) || version.starts_with('.') {
                return Err(ConfigError::InvalidVersion(version.clone()));
            }
        }
        if let Some(root) = &self.root {
            validate_root(root)?;
        }
        Ok(())
    }

    /// Parse from JSON text
    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        let config: RestoreConfig = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a JSON file
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path.as_ref()).map_err(|e| ConfigError::Read {
            path: path.as_ref().to_path_buf(),
            reason: e.to_string(),
        })?;
        RestoreConfig::from_json_str(&text)
    }
}

fn validate_root(root: &Path) -> Result<(), ConfigError> {
    if root.as_os_str().is_empty() {
        return Err(ConfigError::EmptyRoot);
    }
    if root.is_file() {
        return Err(ConfigError::RootIsFile(root.to_path_buf()));
    }
    Ok(())
}

/// Configuration validation errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Table scope or filter with a blank name
    #[error("Table name must not be empty")]
    EmptyTableName,

    /// Snapshot root is an empty path
    #[error("Snapshot root must not be empty")]
    EmptyRoot,

    /// Snapshot root points at a file
    #[error("Snapshot root is a file: {}", .0.display())]
    RootIsFile(PathBuf),

    /// DDL pass bound below one
    #[error("DDL passes must be at least 1, got {0}")]
    InvalidDdlPasses(usize),

    /// Version label that cannot name a directory under the root
    #[error("Invalid version label: {0:?}")]
    InvalidVersion(String),

    /// Malformed JSON
    #[error("Invalid JSON config: {0}")]
    Json(#[from] serde_json::Error),

    /// Config file could not be read
    #[error("Cannot read config {}: {reason}", path.display())]
    Read {
        /// Config file path
        path: PathBuf,
        /// I/O failure
        reason: String,
    },
}

impl From<ConfigError> for sqlsnap_core::Error {
    fn from(err: ConfigError) -> Self {
        sqlsnap_core::Error::Config(err.to_string())
    }
}

//! Artifacts: units of captured SQL text
//!
//! An [`Artifact`] is produced once by a backup run, written once by the
//! snapshot writer and only read afterwards. Its file name is derived from
//! its kind and scope; the markers embedded in the name (`DDL`, `DML`,
//! `DCL`) are what the restore planner classifies on.

use serde::{Deserialize, Serialize};

/// What an artifact contains
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ArtifactKind {
    /// Schema definitions for the whole scope
    Structure,
    /// Row data for the whole scope
    Data,
    /// Structure followed by data in one file
    Combined,
    /// Schema definition of a single table (separate layout)
    TableDdl,
    /// Row data of a single table (separate layout)
    TableDml,
    /// Privilege statements for the database
    Grants,
}

/// Which object an artifact was captured from
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ArtifactScope {
    /// The whole database
    Database(String),
    /// A single table
    Table(String),
}

impl ArtifactScope {
    /// Name of the database or table
    pub fn name(&self) -> &str {
        match self {
            ArtifactScope::Database(name) | ArtifactScope::Table(name) => name,
        }
    }
}

/// How split structure/data files are named
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SplitNaming {
    /// `<scope>.DDL.sql` / `<scope>.DML.sql`
    #[default]
    Marked,
    /// `<scope>-structure.sql` / `<scope>-data.sql`
    Descriptive,
}

/// Marker embedded in schema-definition file names
pub const DDL_MARKER: &str = "DDL";
/// Marker embedded in row-data file names
pub const DML_MARKER: &str = "DML";
/// Marker embedded in privilege file names
pub const DCL_MARKER: &str = "DCL";
/// Extension of every artifact file
pub const SQL_EXTENSION: &str = "sql";

/// A unit of captured SQL text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    kind: ArtifactKind,
    scope: ArtifactScope,
    content: String,
}

impl Artifact {
    /// Create an artifact
    pub fn new(kind: ArtifactKind, scope: ArtifactScope, content: impl Into<String>) -> Self {
        Artifact {
            kind,
            scope,
            content: content.into(),
        }
    }

    /// Artifact kind
    pub fn kind(&self) -> ArtifactKind {
        self.kind
    }

    /// Artifact scope
    pub fn scope(&self) -> &ArtifactScope {
        &self.scope
    }

    /// SQL text
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Raw bytes as written to disk
    pub fn as_bytes(&self) -> &[u8] {
        self.content.as_bytes()
    }

    /// Whether the artifact holds no text
    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    /// File name of this artifact inside a snapshot directory
    pub fn file_name(&self, naming: SplitNaming) -> String {
        let stem = file_stem(self.scope.name());
        match (self.kind, naming) {
            (ArtifactKind::Combined, _) => format!("{}.{}", stem, SQL_EXTENSION),
            (ArtifactKind::Structure, SplitNaming::Descriptive) => {
                format!("{}-structure.{}", stem, SQL_EXTENSION)
            }
            (ArtifactKind::Data, SplitNaming::Descriptive) => {
                format!("{}-data.{}", stem, SQL_EXTENSION)
            }
            (ArtifactKind::Structure, SplitNaming::Marked) | (ArtifactKind::TableDdl, _) => {
                format!("{}.{}.{}", stem, DDL_MARKER, SQL_EXTENSION)
            }
            (ArtifactKind::Data, SplitNaming::Marked) | (ArtifactKind::TableDml, _) => {
                format!("{}.{}.{}", stem, DML_MARKER, SQL_EXTENSION)
            }
            (ArtifactKind::Grants, _) => format!("{}.{}.{}", stem, DCL_MARKER, SQL_EXTENSION),
        }
    }
}

/// Make an object name safe to use as a file stem
///
/// Path separators and NUL become `_`; a leading dot becomes `_` so the file
/// is never hidden.
pub fn file_stem(name: &str) -> String {
    let mut stem: String = name
        .chars()
        .map(|c| match c {
            '/' | '\\' | '\0' => '_',
            c => c,
        })
        .collect();
    if stem.starts_with('.') {
        stem.replace_range(..1, "_");
    }
    stem
}

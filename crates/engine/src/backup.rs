//! Backup runner
//!
//! Opens a read-only adapter, extracts the configured scope into artifacts,
//! and publishes them as one snapshot version.
//!
//! # Artifacts per layout
//!
//! | Scope | Layout | Full | Structure | Data |
//! |---|---|---|---|---|
//! | database | combined | `<db>.sql` | `<db>.DDL.sql` | `<db>.DML.sql` |
//! | database | split | `<db>.DDL.sql` + `<db>.DML.sql` | `<db>.DDL.sql` | `<db>.DML.sql` |
//! | database | separate | per table DDL + DML, `<db>.DCL.sql` | per table DDL, `<db>.DCL.sql` | per table DML |
//! | table | combined | `<t>.sql` | `<t>.DDL.sql` | `<t>.DML.sql` |
//! | table | split | `<t>.DDL.sql` + `<t>.DML.sql` | `<t>.DDL.sql` | `<t>.DML.sql` |
//!
//! Split names follow the configured [`SplitNaming`](sqlsnap_core::SplitNaming).
//! Extraction errors abort the run before anything is written.

use std::sync::Arc;

use sqlsnap_core::{
    default_sink, Artifact, ArtifactKind, ArtifactScope, ConnectionProfile, Error, EventSink,
    Phase, Result, SnapshotEvent,
};
use sqlsnap_dialect::{DialectAdapter, DialectRegistry, OpenMode};
use sqlsnap_durability::{BackupConfig, BackupKind, BackupScope, Layout, SnapshotWriter};
use tracing::info;

use crate::report::{backup_message, BackupReport};
use crate::serializer::Serializer;

/// One backup run
pub struct Backup {
    profile: ConnectionProfile,
    config: BackupConfig,
    registry: DialectRegistry,
    sink: Arc<dyn EventSink>,
}

impl Backup {
    /// Backup of `profile` with `config`, using the builtin dialects
    pub fn new(profile: ConnectionProfile, config: BackupConfig) -> Self {
        Backup {
            profile,
            config,
            registry: DialectRegistry::builtin(),
            sink: default_sink(),
        }
    }

    /// Use a different dialect registry
    pub fn with_registry(mut self, registry: DialectRegistry) -> Self {
        self.registry = registry;
        self
    }

    /// Send run events to `sink`
    pub fn with_sink(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Configuration of this run
    pub fn config(&self) -> &BackupConfig {
        &self.config
    }

    /// Open the source and run the backup
    ///
    /// # Errors
    ///
    /// - [`Error::Config`] for an invalid configuration
    /// - [`Error::UnknownDialect`] / [`Error::Connection`] when the source
    ///   cannot be opened
    /// - [`Error::Backup`] when extraction or writing fails
    pub fn run(&self) -> Result<BackupReport> {
        self.config.validate()?;
        let adapter = match self.registry.open(&self.profile, OpenMode::Backup) {
            Ok(adapter) => adapter,
            Err(err) => {
                self.sink.emit(SnapshotEvent::failed(
                    Phase::Connect,
                    self.profile.database(),
                    &err,
                ));
                return Err(err);
            }
        };
        self.sink
            .emit(SnapshotEvent::ok(Phase::Connect, self.profile.database()));
        self.run_with(adapter.as_ref())
    }

    /// Run the backup against an already open adapter
    pub fn run_with(&self, adapter: &dyn DialectAdapter) -> Result<BackupReport> {
        self.config.validate()?;
        let database = adapter.database().to_string();
        let (tables, artifacts) = self.extract(adapter)?;

        let root = self.config.root_for(&self.profile);
        let writer = SnapshotWriter::new(&root)?.with_naming(self.config.naming);
        let info = match writer.write_snapshot(&artifacts) {
            Ok(info) => info,
            Err(err) => {
                self.sink
                    .emit(SnapshotEvent::failed(Phase::Write, root.display().to_string(), &err));
                return Err(err);
            }
        };
        for file in &info.files {
            self.sink
                .emit(SnapshotEvent::ok(Phase::Write, file.display().to_string()));
        }

        let table = match &self.config.scope {
            BackupScope::Table(name) => Some(name.as_str()),
            BackupScope::Database => None,
        };
        let message = backup_message(&database, table, self.config.kind);
        self.sink.emit(SnapshotEvent::ok(Phase::Done, &message));
        info!(database = %database, label = %info.label, files = info.files.len(), "{}", message);

        Ok(BackupReport {
            message,
            label: info.label,
            dir: info.dir,
            files: info.files,
            tables,
        })
    }

    /// Extract the configured scope into artifacts without writing them
    ///
    /// Returns the captured tables and the artifacts in write order.
    pub fn extract(&self, adapter: &dyn DialectAdapter) -> Result<(Vec<String>, Vec<Artifact>)> {
        let database = adapter.database().to_string();
        let result = match &self.config.scope {
            BackupScope::Database => self.extract_database(adapter, &database),
            BackupScope::Table(table) => self.extract_table(adapter, &database, table),
        };
        if let Err(err) = &result {
            self.sink
                .emit(SnapshotEvent::failed(Phase::Extract, &database, err));
        }
        result
    }

    fn extract_database(
        &self,
        adapter: &dyn DialectAdapter,
        database: &str,
    ) -> Result<(Vec<String>, Vec<Artifact>)> {
        let serializer = Serializer::new(adapter);
        let tables = adapter.list_tables()?;
        let scope = ArtifactScope::Database(database.to_string());
        let kind = self.config.kind;
        let grants = if kind == BackupKind::Data {
            String::new()
        } else {
            serializer.serialize_grants(database)?
        };

        let mut artifacts = Vec::new();
        match (self.config.effective_layout(), kind) {
            (Layout::Combined, BackupKind::Full) => artifacts.push(Artifact::new(
                ArtifactKind::Combined,
                scope,
                serializer.serialize_combined(&tables, &grants)?,
            )),
            (Layout::Separate, _) => {
                for table in &tables {
                    let table_scope = ArtifactScope::Table(table.clone());
                    if kind != BackupKind::Data {
                        artifacts.push(Artifact::new(
                            ArtifactKind::TableDdl,
                            table_scope.clone(),
                            serializer.serialize_table(table)?,
                        ));
                    }
                    if kind != BackupKind::Structure {
                        artifacts.push(Artifact::new(
                            ArtifactKind::TableDml,
                            table_scope,
                            serializer.serialize_table_data(table)?,
                        ));
                    }
                    self.sink.emit(SnapshotEvent::ok(Phase::Extract, table));
                }
                if kind != BackupKind::Data {
                    artifacts.push(Artifact::new(ArtifactKind::Grants, scope, grants));
                }
            }
            (_, kind) => {
                if kind != BackupKind::Data {
                    artifacts.push(Artifact::new(
                        ArtifactKind::Structure,
                        scope.clone(),
                        serializer.serialize_structure(&tables, &grants)?,
                    ));
                }
                if kind != BackupKind::Structure {
                    artifacts.push(Artifact::new(
                        ArtifactKind::Data,
                        scope,
                        serializer.serialize_data(&tables)?,
                    ));
                }
            }
        }

        if self.config.effective_layout() != Layout::Separate {
            for table in &tables {
                self.sink.emit(SnapshotEvent::ok(Phase::Extract, table));
            }
        }
        Ok((tables, artifacts))
    }

    fn extract_table(
        &self,
        adapter: &dyn DialectAdapter,
        database: &str,
        table: &str,
    ) -> Result<(Vec<String>, Vec<Artifact>)> {
        if !adapter.list_tables()?.iter().any(|t| t == table) {
            return Err(Error::backup(format!(
                "table '{}' does not exist in {}",
                table, database
            )));
        }

        let serializer = Serializer::new(adapter);
        let scope = ArtifactScope::Table(table.to_string());
        let tables = vec![table.to_string()];
        let mut artifacts = Vec::new();
        match (self.config.effective_layout(), self.config.kind) {
            (Layout::Combined, BackupKind::Full) => artifacts.push(Artifact::new(
                ArtifactKind::Combined,
                scope,
                serializer.serialize_combined(&tables, "")?,
            )),
            (_, kind) => {
                if kind != BackupKind::Data {
                    artifacts.push(Artifact::new(
                        ArtifactKind::Structure,
                        scope.clone(),
                        serializer.serialize_table(table)?,
                    ));
                }
                if kind != BackupKind::Structure {
                    artifacts.push(Artifact::new(
                        ArtifactKind::Data,
                        scope,
                        serializer.serialize_table_data(table)?,
                    ));
                }
            }
        }
        self.sink.emit(SnapshotEvent::ok(Phase::Extract, table));
        Ok((tables, artifacts))
    }
}

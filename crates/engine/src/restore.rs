//! Restore executor
//!
//! Replays a snapshot version against a target database.
//!
//! # States
//!
//! ```text
//! Scanning -> Classifying -> ApplyingDdl -> ApplyingDml -> ApplyingDcl -> Done
//!                  |
//!                  +-> ApplyingSingle (combined artifacts, executed on sight)
//! ```
//!
//! # Failure Policy
//!
//! Resolution, scanning and connecting are fatal. Statement failures are
//! not: each one is logged, recorded in the [`RestoreReport`] and skipped.
//! DDL statements get up to `ddl_passes` attempts so that forward
//! references resolve once their target exists; DML and DCL get one.
//!
//! Statements run one at a time in autocommit mode, so a partially failed
//! restore leaves the target in whatever state the applied statements
//! produced.
//!
//! # Example
//!
//! ```ignore
//! let report = Restore::new(profile, RestoreConfig::default()).run()?;
//! println!("{} ({} skipped)", report.message, report.failures.len());
//! ```

use std::fmt;
use std::sync::Arc;

use sqlsnap_core::{
    default_sink, ConnectionProfile, Error, EventSink, Phase, Result, SnapshotEvent,
};
use sqlsnap_dialect::{DialectAdapter, DialectRegistry, OpenMode};
use sqlsnap_durability::{
    resolve_version, split_statements, PlannedFile, ResolvedVersion, RestoreConfig, RestoreKind,
    RestorePlan,
};
use tracing::{debug, info};

use crate::report::{restore_message, RestoreReport, StatementFailure};

/// State of a restore run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestoreState {
    /// Listing the version directory
    Scanning,
    /// Tagging files by marker
    Classifying,
    /// Executing a combined artifact
    ApplyingSingle,
    /// Executing schema definitions, with retry passes
    ApplyingDdl,
    /// Executing row data
    ApplyingDml,
    /// Executing privilege statements
    ApplyingDcl,
    /// Finished
    Done,
}

impl fmt::Display for RestoreState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RestoreState::Scanning => "scanning",
            RestoreState::Classifying => "classifying",
            RestoreState::ApplyingSingle => "applying_single",
            RestoreState::ApplyingDdl => "applying_ddl",
            RestoreState::ApplyingDml => "applying_dml",
            RestoreState::ApplyingDcl => "applying_dcl",
            RestoreState::Done => "done",
        };
        f.write_str(name)
    }
}

/// One restore run
pub struct Restore {
    profile: ConnectionProfile,
    config: RestoreConfig,
    registry: DialectRegistry,
    sink: Arc<dyn EventSink>,
}

impl Restore {
    /// Restore into `profile` with `config`, using the builtin dialects
    pub fn new(profile: ConnectionProfile, config: RestoreConfig) -> Self {
        Restore {
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
    pub fn config(&self) -> &RestoreConfig {
        &self.config
    }

    /// Resolve, scan, open the target and replay
    ///
    /// The target is opened only after the snapshot has been found, so a
    /// missing snapshot never creates an empty database.
    ///
    /// # Errors
    ///
    /// - [`Error::Config`] for an invalid configuration
    /// - [`Error::NoSnapshot`] / [`Error::NotFound`] when the snapshot is missing
    /// - [`Error::UnknownDialect`] / [`Error::Connection`] when the target
    ///   cannot be opened
    pub fn run(&self) -> Result<RestoreReport> {
        self.config.validate()?;
        let (version, plan) = self.prepare()?;

        let mut adapter = match self.registry.open(&self.profile, OpenMode::Restore) {
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
        self.apply(adapter.as_mut(), &version, &plan)
    }

    /// Resolve, scan and replay into an already open adapter
    pub fn run_with(&self, adapter: &mut dyn DialectAdapter) -> Result<RestoreReport> {
        self.config.validate()?;
        let (version, plan) = self.prepare()?;
        self.apply(adapter, &version, &plan)
    }

    /// Scanning: resolve the version and classify its files
    fn prepare(&self) -> Result<(ResolvedVersion, RestorePlan)> {
        let root = self.config.root_for(&self.profile);
        let version = match resolve_version(&root, self.config.version.as_deref()) {
            Ok(version) => version,
            Err(err) => {
                self.sink
                    .emit(SnapshotEvent::failed(Phase::Resolve, root.display().to_string(), &err));
                return Err(err);
            }
        };
        self.sink.emit(SnapshotEvent::ok(Phase::Resolve, &version.label));

        debug!(state = %RestoreState::Scanning, dir = %version.dir.display(), "Restore state");
        let plan = match RestorePlan::scan(&version.dir, self.config.table.as_deref()) {
            Ok(plan) => plan,
            Err(err) => {
                self.sink
                    .emit(SnapshotEvent::failed(Phase::Scan, &version.label, &err));
                return Err(err);
            }
        };
        self.sink.emit(SnapshotEvent::ok(Phase::Scan, &version.label));
        Ok((version, plan))
    }

    fn apply(
        &self,
        adapter: &mut dyn DialectAdapter,
        version: &ResolvedVersion,
        plan: &RestorePlan,
    ) -> Result<RestoreReport> {
        let database = adapter.database().to_string();
        info!(database = %database, label = %version.label, files = plan.len(), "Starting restore");

        let mut executor = Executor {
            adapter,
            sink: self.sink.as_ref(),
            state: RestoreState::Scanning,
            report: RestoreReport {
                label: version.label.clone(),
                ..Default::default()
            },
        };

        executor.enter(RestoreState::Classifying);
        for file in &plan.immediate {
            self.sink.emit(SnapshotEvent::ok(Phase::Classify, &file.name));
            executor.enter(RestoreState::ApplyingSingle);
            executor.apply_once(Phase::ApplySingle, file)?;
            executor.enter(RestoreState::Classifying);
        }
        for file in plan.ddl.iter().chain(&plan.dml).chain(&plan.dcl) {
            self.sink.emit(SnapshotEvent::ok(Phase::Classify, &file.name));
        }

        let (ddl, dml, dcl) = match self.config.kind {
            Some(RestoreKind::Structure) => (true, false, false),
            Some(RestoreKind::Data) => (false, true, false),
            None => (true, true, true),
        };
        if ddl {
            executor.enter(RestoreState::ApplyingDdl);
            executor.apply_ddl(&plan.ddl, self.config.ddl_passes)?;
        }
        if dml {
            executor.enter(RestoreState::ApplyingDml);
            for file in &plan.dml {
                executor.apply_once(Phase::ApplyDml, file)?;
            }
        }
        if dcl {
            executor.enter(RestoreState::ApplyingDcl);
            for file in &plan.dcl {
                executor.apply_once(Phase::ApplyDcl, file)?;
            }
        }
        executor.enter(RestoreState::Done);

        let mut report = executor.report;
        report.message = restore_message(&database, self.config.table.as_deref(), self.config.kind);
        self.sink.emit(SnapshotEvent::ok(Phase::Done, &report.message));
        info!(
            database = %database,
            applied = report.applied,
            failed = report.failures.len(),
            "{}",
            report.message
        );
        Ok(report)
    }
}

/// Mutable state of one replay
struct Executor<'a, 's> {
    adapter: &'a mut dyn DialectAdapter,
    sink: &'s dyn EventSink,
    state: RestoreState,
    report: RestoreReport,
}

impl Executor<'_, '_> {
    fn enter(&mut self, state: RestoreState) {
        if self.state != state {
            debug!(from = %self.state, to = %state, "Restore state");
            self.state = state;
        }
    }

    fn read(&mut self, file: &PlannedFile) -> Result<Vec<String>> {
        let statements = split_statements(&file.read()?);
        self.report.files += 1;
        debug!(file = %file.name, statements = statements.len(), "Read artifact");
        Ok(statements)
    }

    /// Execute one statement; only statement errors are absorbed
    fn try_execute(&mut self, statement: &str) -> Result<std::result::Result<(), String>> {
        match self.adapter.execute(statement) {
            Ok(()) => {
                self.report.applied += 1;
                Ok(Ok(()))
            }
            Err(err) if err.is_recoverable() => Ok(Err(match err {
                Error::Statement { cause, .. } => cause,
                other => other.to_string(),
            })),
            Err(err) => Err(err),
        }
    }

    fn record(&mut self, phase: Phase, file: &str, statement: &str, cause: String) {
        // The sink reports the skip; this is only the statement detail
        debug!(phase = %phase, file, statement, cause = %cause, "Statement skipped");
        self.sink.emit(SnapshotEvent::skipped(phase, file, &cause));
        self.report.failures.push(StatementFailure {
            phase,
            file: file.to_string(),
            statement: statement.to_string(),
            cause,
        });
    }

    /// One pass over a file; failures are recorded and skipped
    fn apply_once(&mut self, phase: Phase, file: &PlannedFile) -> Result<()> {
        let statements = self.read(file)?;
        let mut failed = 0;
        for statement in &statements {
            if let Err(cause) = self.try_execute(statement)? {
                self.record(phase, &file.name, statement, cause);
                failed += 1;
            }
        }
        if failed == 0 {
            self.sink.emit(SnapshotEvent::ok(phase, &file.name));
        }
        Ok(())
    }

    /// Bounded passes over every DDL statement
    ///
    /// Pass 1 runs every statement of every file in order. Each later pass
    /// retries only the statements that failed, in the same relative order.
    /// Whatever still fails after the last pass is recorded.
    fn apply_ddl(&mut self, files: &[PlannedFile], passes: usize) -> Result<()> {
        let mut pending: Vec<(String, String)> = Vec::new();
        for file in files {
            for statement in self.read(file)? {
                pending.push((file.name.clone(), statement));
            }
        }

        let passes = passes.max(1);
        let mut last_causes = Vec::new();
        for pass in 1..=passes {
            if pending.is_empty() {
                break;
            }
            self.report.ddl_passes = pass;
            let mut retry = Vec::new();
            last_causes.clear();
            for (file, statement) in pending {
                match self.try_execute(&statement)? {
                    Ok(()) => {}
                    Err(cause) => {
                        debug!(pass, file = %file, cause = %cause, "DDL statement deferred");
                        last_causes.push(cause);
                        retry.push((file, statement));
                    }
                }
            }
            debug!(pass, deferred = retry.len(), "DDL pass complete");
            pending = retry;
        }

        for ((file, statement), cause) in pending.into_iter().zip(last_causes) {
            self.record(Phase::ApplyDdl, &file, &statement, cause);
        }
        for file in files {
            if !self.report.failures.iter().any(|f| f.file == file.name) {
                self.sink.emit(SnapshotEvent::ok(Phase::ApplyDdl, &file.name));
            }
        }
        Ok(())
    }
}

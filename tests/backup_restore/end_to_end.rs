//! Full backup then restore into fresh targets

use std::sync::Arc;

use sqlsnap::{BackupKind, Outcome, RestoreKind};

use crate::common::*;

#[test]
fn test_full_round_trip_reproduces_every_table() {
    let sandbox = Sandbox::new();
    let source = sandbox.seed("shop.db", SHOP);

    let backup = Backup::new(source.clone(), sandbox.backup_config())
        .run()
        .unwrap();
    assert_eq!(backup.message, "Successfully backed up shop.db!");
    assert_eq!(backup.tables, tables(&source));

    let target = sandbox.profile("restored.db");
    let report = Restore::new(target.clone(), sandbox.restore_config())
        .run()
        .unwrap();
    assert!(report.is_clean(), "{:?}", report.failures);
    assert_eq!(report.message, "Restored restored.db database");

    assert_eq!(tables(&target), tables(&source));
    for table in tables(&source) {
        assert_eq!(rows(&target, &table), rows(&source, &table), "table {}", table);
    }
}

#[test]
fn test_text_with_quotes_and_unicode_survives() {
    let sandbox = Sandbox::new();
    let source = sandbox.seed("shop.db", SHOP);
    Backup::new(source, sandbox.backup_config()).run().unwrap();

    let target = sandbox.profile("restored.db");
    Restore::new(target.clone(), sandbox.restore_config())
        .run()
        .unwrap();

    let names: Vec<SqlValue> = rows(&target, "customers")
        .into_iter()
        .map(|row| row[1].clone())
        .collect();
    assert_eq!(
        names,
        vec![
            SqlValue::Text("O'Brien".to_string()),
            SqlValue::Text("Zoë".to_string()),
        ]
    );
}

#[test]
fn test_structure_then_data_in_separate_runs() {
    let sandbox = Sandbox::new();
    let source = sandbox.seed("shop.db", SHOP);
    Backup::new(source.clone(), sandbox.backup_config())
        .run()
        .unwrap();

    let target = sandbox.profile("staged.db");
    let structure = Restore::new(
        target.clone(),
        sandbox.restore_config().with_kind(RestoreKind::Structure),
    )
    .run()
    .unwrap();
    assert_eq!(structure.message, "Restored staged.db database structure");
    assert_eq!(tables(&target), tables(&source));
    assert!(rows(&target, "customers").is_empty());

    let data = Restore::new(
        target.clone(),
        sandbox.restore_config().with_kind(RestoreKind::Data),
    )
    .run()
    .unwrap();
    assert_eq!(data.message, "Restored staged.db database data");
    assert_eq!(rows(&target, "orders"), rows(&source, "orders"));
}

#[test]
fn test_structure_only_backup_restores_empty_tables() {
    let sandbox = Sandbox::new();
    let source = sandbox.seed("shop.db", SHOP);
    let backup = Backup::new(
        source.clone(),
        sandbox.backup_config().with_kind(BackupKind::Structure),
    )
    .run()
    .unwrap();
    assert_eq!(backup.message, "Successfully backed up shop.db's structure!");
    assert_eq!(backup.files.len(), 1);

    let target = sandbox.profile("empty.db");
    Restore::new(target.clone(), sandbox.restore_config())
        .run()
        .unwrap();
    assert_eq!(tables(&target), tables(&source));
    assert!(rows(&target, "orders").is_empty());
}

#[test]
fn test_restore_into_existing_tables_records_failures() {
    let sandbox = Sandbox::new();
    let source = sandbox.seed("shop.db", SHOP);
    Backup::new(source.clone(), sandbox.backup_config())
        .run()
        .unwrap();

    // Replaying into the source itself: tables exist and primary keys collide
    let sink = Arc::new(MemorySink::new());
    let report = Restore::new(source.clone(), sandbox.restore_config())
        .with_sink(sink.clone())
        .run()
        .unwrap();

    assert!(!report.is_clean());
    assert!(!report.failures_in(Phase::ApplyDdl).is_empty());
    assert!(!report.failures_in(Phase::ApplyDml).is_empty());
    assert!(sink
        .events()
        .iter()
        .any(|e| matches!(e.outcome, Outcome::Skipped(_))));
    assert_eq!(rows(&source, "customers").len(), 2);
}

#[test]
fn test_missing_source_is_a_connection_error() {
    let sandbox = Sandbox::new();
    let err = Backup::new(sandbox.profile("absent.db"), sandbox.backup_config())
        .run()
        .unwrap_err();
    assert!(matches!(err, sqlsnap::Error::Connection { .. }));
    assert!(!sandbox.root().exists());
}

#[test]
fn test_unknown_dialect_is_rejected() {
    let sandbox = Sandbox::new();
    let profile = ConnectionProfile::new("oracle", sandbox.path().to_str().unwrap(), "x");
    let err = Backup::new(profile, sandbox.backup_config())
        .run()
        .unwrap_err();
    assert!(matches!(err, sqlsnap::Error::UnknownDialect(_)));
}

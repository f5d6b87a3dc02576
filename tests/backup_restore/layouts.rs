//! Each layout produces a snapshot the restore path can replay

use sqlsnap::{BackupKind, Layout, RestoreKind, SplitNaming};

use crate::common::*;

fn round_trip(sandbox: &Sandbox, config: BackupConfig) -> (Vec<String>, ConnectionProfile) {
    let source = sandbox.seed("shop.db", SHOP);
    let backup = Backup::new(source, config).run().unwrap();
    let names = file_names(&backup.dir);

    let target = sandbox.profile("restored.db");
    let report = Restore::new(target.clone(), sandbox.restore_config())
        .run()
        .unwrap();
    assert!(report.is_clean(), "{:?}", report.failures);
    (names, target)
}

// ============================================================================
// Database scope
// ============================================================================

#[test]
fn test_combined_layout_is_one_file() {
    let sandbox = Sandbox::new();
    let (names, target) = round_trip(
        &sandbox,
        sandbox.backup_config().with_layout(Layout::Combined),
    );
    assert_eq!(names, vec!["shop.db.sql"]);
    assert_eq!(rows(&target, "orders").len(), 2);
}

#[test]
fn test_split_layout_marks_structure_and_data() {
    let sandbox = Sandbox::new();
    let (names, target) = round_trip(&sandbox, sandbox.backup_config());
    assert_eq!(names, vec!["shop.db.DDL.sql", "shop.db.DML.sql"]);
    assert_eq!(rows(&target, "customers").len(), 2);
}

#[test]
fn test_descriptive_naming_restores_structure_first() {
    let sandbox = Sandbox::new();
    let (names, target) = round_trip(
        &sandbox,
        sandbox
            .backup_config()
            .with_naming(SplitNaming::Descriptive),
    );
    assert_eq!(names, vec!["shop.db-data.sql", "shop.db-structure.sql"]);
    assert_eq!(rows(&target, "orders").len(), 2);
}

#[test]
fn test_separate_layout_writes_per_table_files() {
    let sandbox = Sandbox::new();
    let (names, target) = round_trip(
        &sandbox,
        sandbox.backup_config().with_layout(Layout::Separate),
    );
    assert_eq!(
        names,
        vec![
            "audit.DDL.sql",
            "audit.DML.sql",
            "customers.DDL.sql",
            "customers.DML.sql",
            "orders.DDL.sql",
            "orders.DML.sql",
            "shop.db.DCL.sql",
        ]
    );
    assert_eq!(tables(&target).len(), 3);
    assert!(rows(&target, "audit").is_empty());
}

#[test]
fn test_data_only_backup_has_no_structure_file() {
    let sandbox = Sandbox::new();
    let source = sandbox.seed("shop.db", SHOP);
    let backup = Backup::new(
        source,
        sandbox
            .backup_config()
            .with_layout(Layout::Separate)
            .with_kind(BackupKind::Data),
    )
    .run()
    .unwrap();
    assert_eq!(backup.message, "Successfully backed up shop.db's data!");
    assert!(file_names(&backup.dir)
        .iter()
        .all(|name| name.ends_with(".DML.sql")));
}

// ============================================================================
// Table scope
// ============================================================================

#[test]
fn test_single_table_backup() {
    let sandbox = Sandbox::new();
    let source = sandbox.seed("shop.db", SHOP);
    let backup = Backup::new(
        source,
        BackupConfig::table("orders").with_root(sandbox.root()),
    )
    .run()
    .unwrap();
    assert_eq!(backup.message, "Successfully backed up orders from shop.db!");
    assert_eq!(backup.tables, vec!["orders"]);
    assert_eq!(
        file_names(&backup.dir),
        vec!["orders.DDL.sql", "orders.DML.sql"]
    );

    let target = sandbox.profile("orders.db");
    let report = Restore::new(target.clone(), sandbox.restore_config().with_table("orders"))
        .run()
        .unwrap();
    assert_eq!(report.message, "Restored orders table from orders.db database");
    assert_eq!(tables(&target), vec!["orders"]);
}

#[test]
fn test_missing_table_fails_without_snapshot() {
    let sandbox = Sandbox::new();
    let source = sandbox.seed("shop.db", SHOP);
    let err = Backup::new(
        source,
        BackupConfig::table("invoices").with_root(sandbox.root()),
    )
    .run()
    .unwrap_err();
    assert!(matches!(err, sqlsnap::Error::Backup(_)));
    assert!(sqlsnap::list_versions(&sandbox.root()).unwrap().is_empty());
}

// ============================================================================
// Names that contain a marker
// ============================================================================

const HISTORY: &str = "
    CREATE TABLE DDL_history (id INTEGER PRIMARY KEY, note TEXT);
    INSERT INTO DDL_history VALUES (1, 'a'), (2, 'b'), (3, 'c');
";

#[test]
fn test_marker_in_table_name_keeps_data_out_of_structure_restore() {
    let sandbox = Sandbox::new();
    let source = sandbox.seed("shop.db", HISTORY);
    let backup = Backup::new(
        source,
        sandbox.backup_config().with_layout(Layout::Separate),
    )
    .run()
    .unwrap();
    assert!(file_names(&backup.dir).contains(&"DDL_history.DML.sql".to_string()));

    let target = sandbox.profile("history.db");
    let report = Restore::new(
        target.clone(),
        sandbox.restore_config().with_kind(RestoreKind::Structure),
    )
    .run()
    .unwrap();
    assert!(report.is_clean(), "{:?}", report.failures);
    assert_eq!(tables(&target), vec!["DDL_history"]);
    assert!(rows(&target, "DDL_history").is_empty());

    let report = Restore::new(
        target.clone(),
        sandbox.restore_config().with_kind(RestoreKind::Data),
    )
    .run()
    .unwrap();
    assert!(report.is_clean(), "{:?}", report.failures);
    assert_eq!(rows(&target, "DDL_history").len(), 3);
}

#[test]
fn test_marker_in_database_name_keeps_data_out_of_structure_restore() {
    let sandbox = Sandbox::new();
    let source = sandbox.seed("DDLtest.db", HISTORY);
    let backup = Backup::new(source, sandbox.backup_config()).run().unwrap();
    assert_eq!(
        file_names(&backup.dir),
        vec!["DDLtest.db.DDL.sql", "DDLtest.db.DML.sql"]
    );

    let target = sandbox.profile("copy.db");
    let report = Restore::new(
        target.clone(),
        sandbox.restore_config().with_kind(RestoreKind::Structure),
    )
    .run()
    .unwrap();
    assert!(report.is_clean(), "{:?}", report.failures);
    assert!(rows(&target, "DDL_history").is_empty());
}

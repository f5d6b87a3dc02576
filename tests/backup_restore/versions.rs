//! Version labels and their selection at restore time

use rusqlite::Connection;
use sqlsnap::{list_versions, resolve_version};

use crate::common::*;

fn add_customer(sandbox: &Sandbox, id: i64, name: &str) {
    let conn = Connection::open(sandbox.path().join("shop.db")).unwrap();
    conn.execute(
        "INSERT INTO customers VALUES (?1, ?2)",
        rusqlite::params![id, name],
    )
    .unwrap();
}

#[test]
fn test_newest_version_is_restored_by_default() {
    let sandbox = Sandbox::new();
    let source = sandbox.seed("shop.db", SHOP);
    let first = Backup::new(source.clone(), sandbox.backup_config())
        .run()
        .unwrap();
    add_customer(&sandbox, 3, "Ada");
    let second = Backup::new(source, sandbox.backup_config())
        .run()
        .unwrap();

    assert!(second.label > first.label);
    assert_eq!(
        list_versions(&sandbox.root()).unwrap(),
        vec![first.label.clone(), second.label.clone()]
    );
    assert_eq!(
        resolve_version(&sandbox.root(), None).unwrap().label,
        second.label
    );

    let latest = sandbox.profile("latest.db");
    let report = Restore::new(latest.clone(), sandbox.restore_config())
        .run()
        .unwrap();
    assert_eq!(report.label, second.label);
    assert_eq!(rows(&latest, "customers").len(), 3);
}

#[test]
fn test_pinned_version_is_restored() {
    let sandbox = Sandbox::new();
    let source = sandbox.seed("shop.db", SHOP);
    let first = Backup::new(source.clone(), sandbox.backup_config())
        .run()
        .unwrap();
    add_customer(&sandbox, 3, "Ada");
    Backup::new(source, sandbox.backup_config()).run().unwrap();

    let pinned = sandbox.profile("pinned.db");
    let report = Restore::new(
        pinned.clone(),
        sandbox.restore_config().with_version(first.label.clone()),
    )
    .run()
    .unwrap();
    assert_eq!(report.label, first.label);
    assert_eq!(rows(&pinned, "customers").len(), 2);
}

#[test]
fn test_unknown_version_is_not_found() {
    let sandbox = Sandbox::new();
    let source = sandbox.seed("shop.db", SHOP);
    Backup::new(source, sandbox.backup_config()).run().unwrap();

    let err = Restore::new(
        sandbox.profile("target.db"),
        sandbox.restore_config().with_version("0000000001"),
    )
    .run()
    .unwrap_err();
    assert!(matches!(err, sqlsnap::Error::NotFound { .. }));
    assert!(!sandbox.path().join("target.db").exists());
}

#[test]
fn test_empty_root_has_no_snapshot() {
    let sandbox = Sandbox::new();
    let err = Restore::new(sandbox.profile("target.db"), sandbox.restore_config())
        .run()
        .unwrap_err();
    assert!(matches!(err, sqlsnap::Error::NoSnapshot { .. }));
    assert!(!sandbox.path().join("target.db").exists());
}

#[test]
fn test_interrupted_write_is_invisible() {
    let sandbox = Sandbox::new();
    let source = sandbox.seed("shop.db", SHOP);
    let done = Backup::new(source, sandbox.backup_config())
        .run()
        .unwrap();

    // A crashed writer leaves only a hidden temp directory behind
    let temp = sandbox.root().join(".9999999999.tmp");
    std::fs::create_dir_all(&temp).unwrap();
    std::fs::write(temp.join("shop.db.DDL.sql"), "CREATE TABLE partial (x);").unwrap();

    assert_eq!(list_versions(&sandbox.root()).unwrap(), vec![done.label.clone()]);
    let report = Restore::new(sandbox.profile("target.db"), sandbox.restore_config())
        .run()
        .unwrap();
    assert_eq!(report.label, done.label);
}

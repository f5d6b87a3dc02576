//! JSON configuration drives the same runs as the builders

use sqlsnap::{BackupKind, BackupScope, ConfigError, Layout, RestoreKind};

use crate::common::*;

#[test]
fn test_backup_config_from_json_file() {
    let sandbox = Sandbox::new();
    let path = sandbox.path().join("backup.json");
    let root = sandbox.root();
    std::fs::write(
        &path,
        format!(
            r#"{{"root": {:?}, "scope": {{"table": "customers"}}, "kind": "data", "layout": "combined"}}"#,
            root.to_str().unwrap()
        ),
    )
    .unwrap();

    let config = BackupConfig::from_json_file(&path).unwrap();
    assert_eq!(config.scope, BackupScope::Table("customers".to_string()));
    assert_eq!(config.kind, BackupKind::Data);
    assert_eq!(config.layout, Layout::Combined);

    let source = sandbox.seed("shop.db", SHOP);
    let backup = Backup::new(source, config).run().unwrap();
    assert_eq!(backup.message, "Successfully backed up customers's data from shop.db!");
    assert_eq!(file_names(&backup.dir), vec!["customers.DML.sql"]);
}

#[test]
fn test_restore_config_from_json() {
    let config = RestoreConfig::from_json_str(
        r#"{"version": "1700000000", "kind": "structure", "ddl_passes": 4}"#,
    )
    .unwrap();
    assert_eq!(config.version.as_deref(), Some("1700000000"));
    assert_eq!(config.kind, Some(RestoreKind::Structure));
    assert_eq!(config.ddl_passes, 4);
    assert_eq!(config.table, None);
}

#[test]
fn test_invalid_config_is_rejected_before_connecting() {
    let sandbox = Sandbox::new();
    assert!(matches!(
        RestoreConfig::from_json_str(r#"{"ddl_passes": 0}"#),
        Err(ConfigError::InvalidDdlPasses(0))
    ));

    let err = Restore::new(
        sandbox.profile("target.db"),
        sandbox.restore_config().with_ddl_passes(0),
    )
    .run()
    .unwrap_err();
    assert!(matches!(err, sqlsnap::Error::Config(_)));
    assert!(!sandbox.path().join("target.db").exists());
}

#[test]
fn test_unreadable_config_file() {
    let sandbox = Sandbox::new();
    let err = BackupConfig::from_json_file(sandbox.path().join("missing.json")).unwrap_err();
    assert!(matches!(err, ConfigError::Read { .. }));
}

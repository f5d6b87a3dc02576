//! Snapshot directory structure
//!
//! A snapshot root holds one directory per backup run:
//!
//! ```text
//! backup/shop-sqlite/
//! ├── 1700000000/          # version label (Unix seconds, 10 digits)
//! │   ├── shop.DDL.sql
//! │   └── shop.DML.sql
//! ├── 1700000050/
//! │   └── shop.sql
//! └── .1700000099.tmp/     # in-flight or crashed run, ignored
//! ```
//!
//! Labels are fixed width, so lexicographic order is chronological order.

use std::path::{Path, PathBuf};

use sqlsnap_core::ConnectionProfile;

/// Directory that holds every snapshot root by default
pub const DEFAULT_BACKUP_DIR: &str = "backup";

/// Width of a version label
pub const LABEL_WIDTH: usize = 10;

/// Format Unix seconds as a version label
pub fn format_label(unix_secs: u64) -> String {
    format!("{:0width$}", unix_secs, width = LABEL_WIDTH)
}

/// Parse a version label back into Unix seconds
pub fn parse_label(label: &str) -> Option<u64> {
    if label.is_empty() || !label.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    label.parse().ok()
}

/// Whether a directory entry name can be a snapshot version
///
/// Hidden entries (`.`-prefixed) are temporary directories or foreign files.
pub fn is_version_name(name: &str) -> bool {
    !name.is_empty() && !name.starts_with('.')
}

/// Snapshot root paths
#[derive(Debug, Clone)]
pub struct SnapshotPaths {
    root: PathBuf,
}

impl SnapshotPaths {
    /// Create paths from a root directory
    pub fn from_root(root: impl AsRef<Path>) -> Self {
        SnapshotPaths {
            root: root.as_ref().to_path_buf(),
        }
    }

    /// Default root for a profile: `backup/<database>-<dialect>`
    pub fn default_for(profile: &ConnectionProfile) -> Self {
        SnapshotPaths::from_root(default_root(profile))
    }

    /// Root directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Final directory of a version
    pub fn version_dir(&self, label: &str) -> PathBuf {
        self.root.join(label)
    }

    /// Temporary directory a version is written into before publication
    pub fn temp_dir(&self, label: &str) -> PathBuf {
        self.root.join(format!(".{}.tmp", label))
    }

    /// Whether the root exists
    pub fn exists(&self) -> bool {
        self.root.is_dir()
    }
}

/// `backup/<database>-<dialect>`
pub fn default_root(profile: &ConnectionProfile) -> PathBuf {
    let database = sqlsnap_core::file_stem(profile.database());
    Path::new(DEFAULT_BACKUP_DIR).join(format!("{}-{}", database, profile.dialect()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_is_fixed_width() {
        assert_eq!(format_label(1_700_000_000), "1700000000");
        assert_eq!(format_label(42), "0000000042");
        assert_eq!(format_label(0).len(), LABEL_WIDTH);
    }

    #[test]
    fn test_labels_sort_chronologically() {
        let mut labels = vec![format_label(100), format_label(9), format_label(1_000)];
        labels.sort();
        assert_eq!(labels, vec![format_label(9), format_label(100), format_label(1_000)]);
    }

    #[test]
    fn test_parse_label() {
        assert_eq!(parse_label("1700000050"), Some(1_700_000_050));
        assert_eq!(parse_label("0000000042"), Some(42));
        assert_eq!(parse_label("v1"), None);
        assert_eq!(parse_label(""), None);
    }

    #[test]
    fn test_is_version_name() {
        assert!(is_version_name("1700000000"));
        assert!(is_version_name("manual"));
        assert!(!is_version_name(".1700000000.tmp"));
        assert!(!is_version_name(""));
    }

    #[test]
    fn test_paths_layout() {
        let paths = SnapshotPaths::from_root("/snapshots");
        assert_eq!(paths.version_dir("1700000000"), Path::new("/snapshots/1700000000"));
        assert_eq!(paths.temp_dir("1700000000"), Path::new("/snapshots/.1700000000.tmp"));
    }

    #[test]
    fn test_default_root() {
        let profile = ConnectionProfile::new("sqlite", "/data", "shop.db");
        assert_eq!(default_root(&profile), Path::new("backup/shop.db-sqlite"));
        assert_eq!(
            SnapshotPaths::default_for(&profile).root(),
            Path::new("backup/shop.db-sqlite")
        );
    }
}

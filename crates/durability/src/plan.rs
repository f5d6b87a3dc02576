//! Restore planning
//!
//! Scans a snapshot version directory and classifies its artifact files by
//! the markers in their names:
//!
//! | File name | Class | Applied |
//! |---|---|---|
//! | `<stem>.DDL.sql`, `<stem>-structure.sql` | [`ArtifactClass::Ddl`] | bounded retry passes |
//! | `<stem>.DML.sql`, `<stem>-data.sql` | [`ArtifactClass::Dml`] | one pass |
//! | `<stem>.DCL.sql` | [`ArtifactClass::Dcl`] | one pass |
//! | anything else | [`ArtifactClass::Combined`] | immediately |
//!
//! The suffix decides, so a table or database whose own name contains a
//! marker (`DDL_history.DML.sql`) is classified by what was written for it.
//! Names without a known suffix fall back to a marker appearing as a whole
//! `.`, `-` or `_` separated word anywhere in the stem.
//!
//! Files are scanned in name order so that plans are deterministic.

use std::fs;
use std::path::{Path, PathBuf};

use sqlsnap_core::{Error, Result, DCL_MARKER, DDL_MARKER, DML_MARKER, SQL_EXTENSION};
use tracing::debug;

const STRUCTURE_SUFFIX: &str = "-structure";
const DATA_SUFFIX: &str = "-data";

/// Class of an artifact file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArtifactClass {
    /// Whole-scope artifact executed as soon as it is classified
    Combined,
    /// Schema definitions
    Ddl,
    /// Row data
    Dml,
    /// Privilege statements
    Dcl,
}

impl ArtifactClass {
    /// Classify a file name by its markers
    ///
    /// The last `.` component of the stem wins, then the descriptive
    /// suffixes. Otherwise words are checked in `DDL`, `DML`, `DCL` order.
    pub fn of(file_name: &str) -> Self {
        let stem = file_name
            .strip_suffix(SQL_EXTENSION)
            .and_then(|s| s.strip_suffix('.'))
            .unwrap_or(file_name);

        if let Some(class) = stem.rsplit_once('.').and_then(|(_, last)| Self::marker(last)) {
            return class;
        }
        if stem.ends_with(STRUCTURE_SUFFIX) {
            return ArtifactClass::Ddl;
        }
        if stem.ends_with(DATA_SUFFIX) {
            return ArtifactClass::Dml;
        }

        let words: Vec<&str> = stem.split(['.', '-', '_']).collect();
        [DDL_MARKER, DML_MARKER, DCL_MARKER]
            .into_iter()
            .find(|marker| words.contains(marker))
            .and_then(Self::marker)
            .unwrap_or(ArtifactClass::Combined)
    }

    fn marker(word: &str) -> Option<Self> {
        match word {
            DDL_MARKER => Some(ArtifactClass::Ddl),
            DML_MARKER => Some(ArtifactClass::Dml),
            DCL_MARKER => Some(ArtifactClass::Dcl),
            _ => None,
        }
    }
}

/// One artifact file of a plan
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedFile {
    /// File name inside the version directory
    pub name: String,
    /// Full path
    pub path: PathBuf,
    /// Class derived from the name
    pub class: ArtifactClass,
}

impl PlannedFile {
    /// Read the file's SQL text
    pub fn read(&self) -> Result<String> {
        fs::read_to_string(&self.path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => Error::NotFound {
                path: self.path.clone(),
            },
            _ => Error::Io(e),
        })
    }
}

/// Classified artifacts of one snapshot version
#[derive(Debug, Clone, Default)]
pub struct RestorePlan {
    /// Combined artifacts, in scan order
    pub immediate: Vec<PlannedFile>,
    /// Schema-definition artifacts, in scan order
    pub ddl: Vec<PlannedFile>,
    /// Row-data artifacts, in scan order
    pub dml: Vec<PlannedFile>,
    /// Privilege artifacts, in scan order
    pub dcl: Vec<PlannedFile>,
}

impl RestorePlan {
    /// Scan and classify a version directory
    ///
    /// With a `table` filter only files whose name contains it are kept.
    /// Hidden files, subdirectories and non-`.sql` files are skipped.
    ///
    /// # Errors
    ///
    /// [`Error::NotFound`] when `version_dir` is not a directory.
    pub fn scan(version_dir: &Path, table: Option<&str>) -> Result<Self> {
        let names = scan_names(version_dir, table)?;
        let mut plan = RestorePlan::default();
        for name in names {
            let class = ArtifactClass::of(&name);
            debug!(file = %name, ?class, "Classified artifact");
            let file = PlannedFile {
                path: version_dir.join(&name),
                name,
                class,
            };
            match class {
                ArtifactClass::Combined => plan.immediate.push(file),
                ArtifactClass::Ddl => plan.ddl.push(file),
                ArtifactClass::Dml => plan.dml.push(file),
                ArtifactClass::Dcl => plan.dcl.push(file),
            }
        }
        Ok(plan)
    }

    /// Total number of files
    pub fn len(&self) -> usize {
        self.immediate.len() + self.ddl.len() + self.dml.len() + self.dcl.len()
    }

    /// Whether the plan holds no files
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Sorted artifact file names of a version directory
pub fn scan_names(version_dir: &Path, table: Option<&str>) -> Result<Vec<String>> {
    if !version_dir.is_dir() {
        return Err(Error::NotFound {
            path: version_dir.to_path_buf(),
        });
    }

    let mut names = Vec::new();
    for entry in fs::read_dir(version_dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().to_string();
        let is_sql = Path::new(&name)
            .extension()
            .map(|ext| ext == SQL_EXTENSION)
            .unwrap_or(false);
        if name.starts_with('.') || !is_sql {
            continue;
        }
        if let Some(table) = table {
            if !name.contains(table) {
                continue;
            }
        }
        names.push(name);
    }
    names.sort();
    Ok(names)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn version_with(files: &[&str]) -> TempDir {
        let dir = TempDir::new().unwrap();
        for file in files {
            fs::write(dir.path().join(file), "SELECT 1;").unwrap();
        }
        dir
    }

    fn names(files: &[PlannedFile]) -> Vec<&str> {
        files.iter().map(|f| f.name.as_str()).collect()
    }

    #[test]
    fn test_classify_by_marker() {
        assert_eq!(ArtifactClass::of("t1.DDL.sql"), ArtifactClass::Ddl);
        assert_eq!(ArtifactClass::of("t1.DML.sql"), ArtifactClass::Dml);
        assert_eq!(ArtifactClass::of("db.DCL.sql"), ArtifactClass::Dcl);
        assert_eq!(ArtifactClass::of("legacy.sql"), ArtifactClass::Combined);
        assert_eq!(ArtifactClass::of("shop-structure.sql"), ArtifactClass::Ddl);
        assert_eq!(ArtifactClass::of("shop-data.sql"), ArtifactClass::Dml);
        assert_eq!(ArtifactClass::of("metadata.sql"), ArtifactClass::Combined);
    }

    #[test]
    fn test_marker_in_object_name_does_not_win() {
        assert_eq!(ArtifactClass::of("DDL_history.DML.sql"), ArtifactClass::Dml);
        assert_eq!(ArtifactClass::of("DDL_history.DDL.sql"), ArtifactClass::Ddl);
        assert_eq!(ArtifactClass::of("DDLtest.db.DML.sql"), ArtifactClass::Dml);
        assert_eq!(ArtifactClass::of("DDLtest.db.DCL.sql"), ArtifactClass::Dcl);
        assert_eq!(ArtifactClass::of("DDLtest.db.sql"), ArtifactClass::Combined);
        assert_eq!(ArtifactClass::of("DMLog-structure.sql"), ArtifactClass::Ddl);
        assert_eq!(ArtifactClass::of("DDLog-data.sql"), ArtifactClass::Dml);
    }

    #[test]
    fn test_legacy_marker_words() {
        assert_eq!(ArtifactClass::of("test_db-structure.DDL.sql"), ArtifactClass::Ddl);
        assert_eq!(ArtifactClass::of("shop_DML.sql"), ArtifactClass::Dml);
        assert_eq!(ArtifactClass::of("DCL-shop.sql"), ArtifactClass::Dcl);
        assert_eq!(ArtifactClass::of("DDL_DML.sql"), ArtifactClass::Ddl);
    }

    #[test]
    fn test_scan_buckets_files() {
        let dir = version_with(&["t1.DDL.sql", "t1.DML.sql", "db.DCL.sql", "legacy.sql"]);
        let plan = RestorePlan::scan(dir.path(), None).unwrap();

        assert_eq!(names(&plan.immediate), vec!["legacy.sql"]);
        assert_eq!(names(&plan.ddl), vec!["t1.DDL.sql"]);
        assert_eq!(names(&plan.dml), vec!["t1.DML.sql"]);
        assert_eq!(names(&plan.dcl), vec!["db.DCL.sql"]);
        assert_eq!(plan.len(), 4);
    }

    #[test]
    fn test_scan_is_sorted() {
        let dir = version_with(&["c.DDL.sql", "a.DDL.sql", "b.DDL.sql"]);
        let plan = RestorePlan::scan(dir.path(), None).unwrap();
        assert_eq!(names(&plan.ddl), vec!["a.DDL.sql", "b.DDL.sql", "c.DDL.sql"]);
    }

    #[test]
    fn test_table_filter_is_substring() {
        let dir = version_with(&[
            "users.DDL.sql",
            "users.DML.sql",
            "orders.DDL.sql",
            "shop.DCL.sql",
        ]);
        let plan = RestorePlan::scan(dir.path(), Some("users")).unwrap();
        assert_eq!(names(&plan.ddl), vec!["users.DDL.sql"]);
        assert_eq!(names(&plan.dml), vec!["users.DML.sql"]);
        assert!(plan.dcl.is_empty());
    }

    #[test]
    fn test_skips_hidden_and_foreign_entries() {
        let dir = version_with(&["a.DDL.sql", ".hidden.sql", "notes.txt"]);
        fs::create_dir(dir.path().join("nested.sql")).unwrap();
        let plan = RestorePlan::scan(dir.path(), None).unwrap();
        assert_eq!(plan.len(), 1);
    }

    #[test]
    fn test_missing_version_dir() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("1700000000");
        let err = RestorePlan::scan(&missing, None).unwrap_err();
        assert!(matches!(err, Error::NotFound { path } if path == missing));
    }

    #[test]
    fn test_read_planned_file() {
        let dir = version_with(&["a.DDL.sql"]);
        let plan = RestorePlan::scan(dir.path(), None).unwrap();
        assert_eq!(plan.ddl[0].read().unwrap(), "SELECT 1;");

        fs::remove_file(dir.path().join("a.DDL.sql")).unwrap();
        assert!(matches!(plan.ddl[0].read(), Err(Error::NotFound { .. })));
    }

    #[test]
    fn test_empty_dir_is_empty_plan() {
        let dir = TempDir::new().unwrap();
        assert!(RestorePlan::scan(dir.path(), None).unwrap().is_empty());
    }
}

//! Crash-safe snapshot writer
//!
//! Uses a write-fsync-rename pattern at directory granularity.
//!
//! # Crash Safety
//!
//! A snapshot is published in these steps:
//! 1. Create the hidden temporary directory (`.<label>.tmp`)
//! 2. Write and fsync every artifact file inside it
//! 3. fsync the temporary directory
//! 4. Atomic rename to the final directory (`<label>`)
//! 5. fsync the snapshot root
//!
//! Either the complete version directory exists or it doesn't. A reader
//! never sees a partially written snapshot, and the resolver ignores hidden
//! entries, so a crashed run leaves nothing restorable behind.

use std::collections::HashSet;
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use sqlsnap_core::{Artifact, Error, Result, SplitNaming};
use tracing::{debug, info, warn};

use crate::paths::{format_label, is_version_name, parse_label, SnapshotPaths};

/// Snapshot writer with crash-safe semantics
#[derive(Debug, Clone)]
pub struct SnapshotWriter {
    paths: SnapshotPaths,
    naming: SplitNaming,
}

impl SnapshotWriter {
    /// Create a writer for a snapshot root
    ///
    /// Creates the root directory if it doesn't exist.
    pub fn new(root: impl AsRef<Path>) -> Result<Self> {
        let paths = SnapshotPaths::from_root(root);
        fs::create_dir_all(paths.root()).map_err(|e| {
            Error::backup(format!(
                "cannot create snapshot root {}: {}",
                paths.root().display(),
                e
            ))
        })?;
        Ok(SnapshotWriter {
            paths,
            naming: SplitNaming::default(),
        })
    }

    /// Set how split artifacts are named
    pub fn with_naming(mut self, naming: SplitNaming) -> Self {
        self.naming = naming;
        self
    }

    /// Snapshot root
    pub fn root(&self) -> &Path {
        self.paths.root()
    }

    /// Naming convention used for split artifacts
    pub fn naming(&self) -> SplitNaming {
        self.naming
    }

    /// Write a snapshot labelled with the current time
    pub fn write_snapshot(&self, artifacts: &[Artifact]) -> Result<SnapshotInfo> {
        let now = u64::try_from(chrono::Utc::now().timestamp()).unwrap_or(0);
        self.write_snapshot_at(now, artifacts)
    }

    /// Write a snapshot captured at `unix_secs`
    ///
    /// Returns the published version directory and its files.
    pub fn write_snapshot_at(
        &self,
        unix_secs: u64,
        artifacts: &[Artifact],
    ) -> Result<SnapshotInfo> {
        let label = self.next_label(unix_secs)?;
        let temp_dir = self.paths.temp_dir(&label);
        let final_dir = self.paths.version_dir(&label);

        // Step 1: Create temporary directory
        fs::create_dir(&temp_dir).map_err(|e| write_error(&temp_dir, e))?;

        match self.fill(&temp_dir, artifacts) {
            Ok((names, bytes)) => {
                // Step 4: Atomic rename
                if let Err(e) = fs::rename(&temp_dir, &final_dir) {
                    remove_temp_dir(&temp_dir);
                    return Err(write_error(&final_dir, e));
                }

                // Step 5: fsync the root
                sync_dir(self.paths.root()).map_err(|e| write_error(self.paths.root(), e))?;

                let files = names.iter().map(|n| final_dir.join(n)).collect();
                info!(
                    label = %label,
                    files = names.len(),
                    bytes,
                    dir = %final_dir.display(),
                    "Published snapshot"
                );
                Ok(SnapshotInfo {
                    label,
                    dir: final_dir,
                    files,
                    bytes,
                })
            }
            Err(err) => {
                warn!(label = %label, error = %err, "Snapshot write failed, discarding");
                remove_temp_dir(&temp_dir);
                Err(err)
            }
        }
    }

    /// Steps 2 and 3: write artifacts into the temporary directory
    fn fill(&self, dir: &Path, artifacts: &[Artifact]) -> Result<(Vec<String>, u64)> {
        let mut seen = HashSet::new();
        let mut names = Vec::with_capacity(artifacts.len());
        let mut bytes = 0u64;

        for artifact in artifacts {
            let name = artifact.file_name(self.naming);
            if !seen.insert(name.clone()) {
                return Err(Error::backup(format!(
                    "two artifacts map to the same file name '{}'",
                    name
                )));
            }

            let path = dir.join(&name);
            let mut file = OpenOptions::new()
                .create_new(true)
                .write(true)
                .open(&path)
                .map_err(|e| write_error(&path, e))?;
            file.write_all(artifact.as_bytes())
                .and_then(|_| file.sync_all())
                .map_err(|e| write_error(&path, e))?;

            debug!(file = %name, bytes = artifact.as_bytes().len(), "Wrote artifact");
            bytes += artifact.as_bytes().len() as u64;
            names.push(name);
        }

        sync_dir(dir).map_err(|e| write_error(dir, e))?;
        Ok((names, bytes))
    }

    /// Label for a run captured at `unix_secs`
    ///
    /// The plain timestamp label unless it would not sort after every
    /// existing numeric label, in which case it is bumped past the newest.
    pub fn next_label(&self, unix_secs: u64) -> Result<String> {
        let newest = self.newest_numeric_label()?;
        let secs = match newest {
            Some(newest) if unix_secs <= newest => newest + 1,
            _ => unix_secs,
        };
        let label = format_label(secs);
        if secs != unix_secs {
            debug!(requested = unix_secs, label = %label, "Bumped snapshot label");
        }
        Ok(label)
    }

    fn newest_numeric_label(&self) -> Result<Option<u64>> {
        let mut newest = None;
        for entry in fs::read_dir(self.paths.root())? {
            let entry = entry?;
            let name = entry.file_name().to_string_lossy().to_string();
            // Temporary directories reserve their label too
            let label = name
                .strip_prefix('.')
                .and_then(|n| n.strip_suffix(".tmp"))
                .unwrap_or(&name);
            if let Some(secs) = parse_label(label) {
                newest = newest.max(Some(secs));
            }
        }
        Ok(newest)
    }

    /// Remove temporary directories left behind by crashed runs
    ///
    /// Returns the number of directories removed.
    pub fn cleanup_temp_dirs(&self) -> Result<usize> {
        let mut count = 0;

        if !self.paths.exists() {
            return Ok(0);
        }

        for entry in fs::read_dir(self.paths.root())? {
            let entry = entry?;
            let name = entry.file_name().to_string_lossy().to_string();
            if !is_version_name(&name) && name.ends_with(".tmp") && entry.path().is_dir() {
                fs::remove_dir_all(entry.path())?;
                count += 1;
            }
        }

        if count > 0 {
            info!(count, root = %self.paths.root().display(), "Removed stale temporary snapshots");
        }
        Ok(count)
    }
}

/// Information about a published snapshot
#[derive(Debug, Clone)]
pub struct SnapshotInfo {
    /// Version label
    pub label: String,
    /// Version directory
    pub dir: PathBuf,
    /// Artifact files, in write order
    pub files: Vec<PathBuf>,
    /// Total bytes written
    pub bytes: u64,
}

fn write_error(path: &Path, err: std::io::Error) -> Error {
    Error::backup(format!("cannot write {}: {}", path.display(), err))
}

fn sync_dir(dir: &Path) -> std::io::Result<()> {
    File::open(dir)?.sync_all()
}

fn remove_temp_dir(dir: &Path) {
    if let Err(e) = fs::remove_dir_all(dir) {
        warn!(dir = %dir.display(), error = %e, "Could not remove temporary snapshot");
    }
}

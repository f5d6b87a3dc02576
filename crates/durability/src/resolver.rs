//! Version resolution
//!
//! Picks the snapshot directory a restore reads from. An explicit version is
//! taken verbatim; otherwise the newest label under the root wins.

use std::fs;
use std::path::{Path, PathBuf};

use sqlsnap_core::{Error, Result};
use tracing::debug;

use crate::paths::is_version_name;

/// Resolved snapshot version
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedVersion {
    /// Version label
    pub label: String,
    /// Version directory (may not exist for an explicit label)
    pub dir: PathBuf,
}

/// Resolve the version to restore under `root`
///
/// An explicit label is not checked here; a missing directory surfaces as
/// [`Error::NotFound`] when the restore scans it.
///
/// # Errors
///
/// [`Error::NoSnapshot`] when no label is given and the root is missing or
/// holds no version directories.
pub fn resolve_version(root: &Path, explicit: Option<&str>) -> Result<ResolvedVersion> {
    if let Some(label) = explicit {
        debug!(label, "Using explicit snapshot version");
        return Ok(ResolvedVersion {
            label: label.to_string(),
            dir: root.join(label),
        });
    }

    let label = list_versions(root)?
        .pop()
        .ok_or_else(|| Error::NoSnapshot {
            root: root.to_path_buf(),
        })?;
    debug!(label = %label, root = %root.display(), "Resolved newest snapshot version");
    Ok(ResolvedVersion {
        dir: root.join(&label),
        label,
    })
}

/// Every version label under `root`, oldest first
///
/// Hidden entries and plain files are ignored. A missing root has no
/// versions.
pub fn list_versions(root: &Path) -> Result<Vec<String>> {
    if !root.is_dir() {
        return Ok(Vec::new());
    }

    let mut labels = Vec::new();
    for entry in fs::read_dir(root)? {
        let entry = entry?;
        if !entry.file_type()?.is_dir() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().to_string();
        if is_version_name(&name) {
            labels.push(name);
        }
    }
    labels.sort();
    Ok(labels)
}

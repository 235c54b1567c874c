//! Recursive expansion of directory arguments (-r / -D)

use std::collections::BTreeSet;
use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};

use tracing::debug;
use walkdir::WalkDir;

use crate::error::{Result, RrError};

/// How directory arguments are replaced before batching
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExpandMode {
    /// Directories are ordinary arguments
    #[default]
    None,
    /// Every non-directory descendant
    Files,
    /// Every descendant directory without subdirectories
    LeafDirs,
}

/// Expand `path` according to `mode`.
///
/// Non-directories, and everything in `ExpandMode::None`, pass through
/// unchanged. The starting directory itself is never part of the result.
pub fn expand(path: &OsStr, mode: ExpandMode) -> Result<Vec<OsString>> {
    let root = Path::new(path);
    if !root.is_dir() {
        return Ok(vec![path.to_os_string()]);
    }

    let found = match mode {
        ExpandMode::None => return Ok(vec![path.to_os_string()]),
        ExpandMode::Files => files(root)?,
        ExpandMode::LeafDirs => leaf_dirs(root)?,
    };
    debug!("expanded {} into {} entries", root.display(), found.len());

    Ok(found.into_iter().map(PathBuf::into_os_string).collect())
}

fn walk(root: &Path) -> impl Iterator<Item = Result<walkdir::DirEntry>> + '_ {
    WalkDir::new(root)
        .min_depth(1)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .map(move |entry| {
            entry.map_err(|source| RrError::Walk {
                path: root.to_path_buf(),
                source,
            })
        })
}

fn files(root: &Path) -> Result<Vec<PathBuf>> {
    let mut out = Vec::new();
    for entry in walk(root) {
        let entry = entry?;
        // a symlink to a directory counts as a directory
        if !entry.path().is_dir() {
            out.push(entry.into_path());
        }
    }
    Ok(out)
}

fn leaf_dirs(root: &Path) -> Result<Vec<PathBuf>> {
    // walk order is pre-order, so a child always evicts an already seen parent
    let mut seen = BTreeSet::new();
    for entry in walk(root) {
        let entry = entry?;
        if entry.path().is_dir() {
            if let Some(parent) = entry.path().parent() {
                seen.remove(parent);
            }
            seen.insert(entry.into_path());
        }
    }
    Ok(seen.into_iter().collect())
}

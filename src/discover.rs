// src/discover.rs

//! Trigger script discovery.
//!
//! Walks a directory tree and collects every directory that directly contains
//! a file with the configured trigger script name. Those are the directories
//! the watcher registers; the set is computed once at startup and never
//! refreshed.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use tracing::{debug, trace};

use crate::errors::{OnchangeError, Result};
use crate::fs::FileSystem;

/// Result of a discovery walk.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Discovery {
    dirs: BTreeSet<PathBuf>,
}

impl Discovery {
    /// True if at least one reactive directory was found.
    pub fn found(&self) -> bool {
        !self.dirs.is_empty()
    }

    pub fn dirs(&self) -> impl Iterator<Item = &Path> {
        self.dirs.iter().map(PathBuf::as_path)
    }

    pub fn len(&self) -> usize {
        self.dirs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dirs.is_empty()
    }

    pub fn contains(&self, dir: &Path) -> bool {
        self.dirs.contains(dir)
    }

    pub fn into_dirs(self) -> BTreeSet<PathBuf> {
        self.dirs
    }
}

/// Walk `root` and return every directory that directly contains a regular
/// file named `script_name`.
///
/// - The root itself is a candidate.
/// - A failure to list any directory aborts the walk with
///   [`OnchangeError::Walk`]; a partial watch set is never returned.
/// - Symlinked directories are candidates but are not descended into, so a
///   link cycle cannot make the walk loop.
/// - A root that is a regular file holds no directories and yields an empty
///   result; a missing root is still a walk error.
pub fn discover(fs: &dyn FileSystem, root: &Path, script_name: &str) -> Result<Discovery> {
    if fs.is_file(root) {
        debug!(root = ?root, "root is a file; nothing to watch");
        return Ok(Discovery::default());
    }

    let mut dirs = BTreeSet::new();
    let mut pending = vec![root.to_path_buf()];

    while let Some(dir) = pending.pop() {
        if has_trigger_script(fs, &dir, script_name) {
            debug!(dir = ?dir, script = %script_name, "found trigger script");
            dirs.insert(dir.clone());
        }

        let entries = fs.read_dir(&dir).map_err(|source| OnchangeError::Walk {
            path: dir.clone(),
            source,
        })?;

        for entry in entries {
            if !fs.is_dir(&entry) {
                continue;
            }
            if fs.is_symlink(&entry) {
                trace!(dir = ?entry, "not descending into symlinked directory");
                if has_trigger_script(fs, &entry, script_name) {
                    dirs.insert(entry);
                }
                continue;
            }
            pending.push(entry);
        }
    }

    Ok(Discovery { dirs })
}

fn has_trigger_script(fs: &dyn FileSystem, dir: &Path, script_name: &str) -> bool {
    fs.is_file(&dir.join(script_name))
}

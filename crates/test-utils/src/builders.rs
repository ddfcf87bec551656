#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

/// Builder for throwaway directory trees on the real filesystem.
pub struct TreeBuilder {
    dir: TempDir,
}

impl TreeBuilder {
    pub fn new() -> Self {
        Self {
            dir: tempfile::tempdir().expect("Failed to create temp dir"),
        }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn dir(self, rel: &str) -> Self {
        fs::create_dir_all(self.dir.path().join(rel)).expect("Failed to create dir");
        self
    }

    pub fn file(self, rel: &str, contents: &str) -> Self {
        let path = self.dir.path().join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("Failed to create parent dir");
        }
        fs::write(&path, contents).expect("Failed to write file");
        self
    }

    /// Write an executable script at `rel`.
    pub fn script(self, rel: &str, body: &str) -> Self {
        let this = self.file(rel, body);
        make_executable(&this.dir.path().join(rel));
        this
    }

    pub fn build(self) -> TempDir {
        self.dir
    }
}

impl Default for TreeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(unix)]
pub fn make_executable(path: &Path) {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(0o755))
        .expect("Failed to chmod script");
}

#[cfg(not(unix))]
pub fn make_executable(_path: &Path) {}

/// Canonical path of `rel` under `root`, matching what the driver watches.
pub fn canonical(root: &Path, rel: &str) -> PathBuf {
    let root = root.canonicalize().expect("Failed to canonicalize root");
    if rel.is_empty() { root } else { root.join(rel) }
}

// src/config/model.rs

use std::path::PathBuf;

/// Trigger script name used when `--script` is not given.
pub const DEFAULT_SCRIPT_NAME: &str = ".onchange";

/// Walk root used when `--root` is not given.
pub const DEFAULT_ROOT: &str = ".";

/// Validated runtime settings.
///
/// Construct via `Settings::try_from(CliArgs)` so the script name is known to
/// be a bare file name. Logging flags are consumed by `main` before this is
/// built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// File name looked up directly inside every directory.
    pub script_name: String,
    /// Starting point of the recursive walk.
    pub root: PathBuf,
}

impl Settings {
    pub(crate) fn new_unchecked(script_name: String, root: PathBuf) -> Self {
        Self { script_name, root }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self::new_unchecked(DEFAULT_SCRIPT_NAME.to_string(), PathBuf::from(DEFAULT_ROOT))
    }
}

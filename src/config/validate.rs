// src/config/validate.rs

use std::path::{Component, Path, PathBuf};

use crate::cli::CliArgs;
use crate::config::model::Settings;
use crate::errors::{OnchangeError, Result};

impl TryFrom<CliArgs> for Settings {
    type Error = OnchangeError;

    fn try_from(args: CliArgs) -> std::result::Result<Self, Self::Error> {
        validate_script_name(&args.script)?;
        validate_root(&args.root)?;
        Ok(Settings::new_unchecked(args.script, PathBuf::from(args.root)))
    }
}

/// The trigger script is looked up *directly* inside each directory, so the
/// name must be a single normal path component.
pub fn validate_script_name(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(OnchangeError::Config(
            "--script must not be empty".to_string(),
        ));
    }

    let mut components = Path::new(name).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(_)), None) if !name.contains(['/', '\\']) => Ok(()),
        _ => Err(OnchangeError::Config(format!(
            "--script must be a bare file name, got '{}'",
            name
        ))),
    }
}

fn validate_root(root: &str) -> Result<()> {
    if root.trim().is_empty() {
        return Err(OnchangeError::Config(
            "--root must not be empty".to_string(),
        ));
    }
    Ok(())
}

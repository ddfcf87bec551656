// src/config/mod.rs

//! Runtime settings.
//!
//! `onchange` has no configuration file; everything comes from the command
//! line. [`Settings`] is the validated form of [`crate::cli::CliArgs`] that
//! the rest of the crate consumes.

pub mod model;
pub mod validate;

pub use model::{DEFAULT_ROOT, DEFAULT_SCRIPT_NAME, Settings};

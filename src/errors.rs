// src/errors.rs

//! Crate-wide error type and result alias.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum OnchangeError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("failed to read directory {path:?} while discovering scripts")]
    Walk {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to create file watcher")]
    WatcherInit(#[source] notify::Error),

    #[error("failed to watch directory {path:?}")]
    Watch {
        path: PathBuf,
        #[source]
        source: notify::Error,
    },

    #[error("driver has already been started")]
    AlreadyStarted,

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, OnchangeError>;

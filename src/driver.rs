// src/driver.rs

//! Lifecycle glue: discovery -> watch registration -> dispatcher task.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::anyhow;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::discover::{Discovery, discover};
use crate::dispatch::{DispatchReport, EventDispatcher, ScriptRunner};
use crate::errors::{OnchangeError, Result};
use crate::fs::{FileSystem, RealFileSystem};
use crate::watch::WatchRegistry;

/// Composes discovery, the watch registry and the event dispatcher.
///
/// The watch set is computed once in [`Driver::start`]; directories created
/// afterwards are never added, and the registry watches each directory
/// non-recursively.
pub struct Driver<W: WatchRegistry, R: ScriptRunner> {
    registry: W,
    runner: Option<R>,
    fs: Arc<dyn FileSystem>,
    root: Option<PathBuf>,
    discovery: Option<Discovery>,
    dispatcher: Option<JoinHandle<DispatchReport>>,
}

impl<W: WatchRegistry, R: ScriptRunner> std::fmt::Debug for Driver<W, R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Driver")
            .field("root", &self.root)
            .field("discovery", &self.discovery)
            .field("started", &self.dispatcher.is_some())
            .finish_non_exhaustive()
    }
}

impl<W: WatchRegistry, R: ScriptRunner> Driver<W, R> {
    pub fn new(registry: W, runner: R) -> Self {
        Self {
            registry,
            runner: Some(runner),
            fs: Arc::new(RealFileSystem),
            root: None,
            discovery: None,
            dispatcher: None,
        }
    }

    /// Use a different filesystem for discovery (tests use the mock).
    pub fn with_file_system(mut self, fs: Arc<dyn FileSystem>) -> Self {
        self.fs = fs;
        self
    }

    /// Discover reactive directories under `root`, watch all of them and
    /// spawn the dispatcher task.
    ///
    /// Returns whether any reactive directory was found. Any walk or
    /// registration failure aborts startup. Must be called from within a
    /// Tokio runtime.
    pub fn start(&mut self, script_name: &str, root: &Path) -> Result<bool> {
        if self.dispatcher.is_some() || self.runner.is_none() {
            return Err(OnchangeError::AlreadyStarted);
        }

        // Canonicalize once so we have a stable base path.
        let root = self
            .fs
            .canonicalize(root)
            .unwrap_or_else(|_| root.to_path_buf());
        debug!(root = ?root, script = %script_name, "discovering trigger scripts");

        let discovery = discover(self.fs.as_ref(), &root, script_name)?;
        for dir in discovery.dirs() {
            self.registry.register(dir)?;
        }

        let events = self
            .registry
            .take_events()
            .ok_or_else(|| OnchangeError::Other(anyhow!("watch event stream already taken")))?;
        let runner = self.runner.take().ok_or(OnchangeError::AlreadyStarted)?;
        self.dispatcher = Some(EventDispatcher::new(script_name, runner).spawn(events));

        let found = discovery.found();
        info!(
            root = %root.display(),
            watched = discovery.len(),
            "watch setup complete"
        );

        self.root = Some(root);
        self.discovery = Some(discovery);
        Ok(found)
    }

    /// Release the OS watches. The dispatcher finishes once it has consumed
    /// whatever was already delivered; use [`Driver::join`] to wait for it.
    pub fn stop(&mut self) {
        self.registry.close();
    }

    /// Wait for the dispatcher task and return its counters.
    ///
    /// Returns an empty report if the driver was never started.
    pub async fn join(mut self) -> Result<DispatchReport> {
        match self.dispatcher.take() {
            Some(handle) => handle
                .await
                .map_err(|err| OnchangeError::Other(anyhow!("dispatcher task failed: {err}"))),
            None => Ok(DispatchReport::default()),
        }
    }

    /// Canonical root used by the last successful [`Driver::start`].
    pub fn root(&self) -> Option<&Path> {
        self.root.as_deref()
    }

    pub fn discovery(&self) -> Option<&Discovery> {
        self.discovery.as_ref()
    }
}

// src/watch/registry.rs

use std::path::{Path, PathBuf};

use anyhow::anyhow;
use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::errors::{OnchangeError, Result};
use crate::watch::event::ChangeEvent;

/// Single ordered stream of change events from every registered directory.
pub type EventStream = mpsc::UnboundedReceiver<ChangeEvent>;

/// Trait abstracting the OS change-notification facility.
///
/// Production code uses [`NotifyRegistry`]; tests can provide an
/// implementation that hands out a stream they feed by hand.
pub trait WatchRegistry: Send {
    /// Start watching `dir` (non-recursively).
    fn register(&mut self, dir: &Path) -> Result<()>;

    /// Hand out the merged event stream. Returns `None` after the first call.
    fn take_events(&mut self) -> Option<EventStream>;

    /// Release all watch handles. The event stream ends once buffered events
    /// have been consumed.
    fn close(&mut self);
}

/// [`WatchRegistry`] backed by `notify::RecommendedWatcher`.
///
/// The notify callback runs on notify's own thread and forwards normalised
/// events into an unbounded channel, so delivery never blocks on the
/// consumer.
pub struct NotifyRegistry {
    watcher: Option<RecommendedWatcher>,
    events: Option<EventStream>,
    watched: Vec<PathBuf>,
}

impl std::fmt::Debug for NotifyRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NotifyRegistry")
            .field("open", &self.watcher.is_some())
            .field("watched", &self.watched)
            .finish()
    }
}

impl NotifyRegistry {
    pub fn new() -> Result<Self> {
        let (event_tx, event_rx) = mpsc::unbounded_channel::<ChangeEvent>();

        // Closure called synchronously by notify whenever an event arrives.
        let watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event) => {
                    for change in ChangeEvent::from_notify(event) {
                        if event_tx.send(change).is_err() {
                            // Consumer is gone; nothing left to deliver to.
                            return;
                        }
                    }
                }
                Err(err) => {
                    warn!(error = %err, "file watch error");
                }
            },
            Config::default(),
        )
        .map_err(OnchangeError::WatcherInit)?;

        Ok(Self {
            watcher: Some(watcher),
            events: Some(event_rx),
            watched: Vec::new(),
        })
    }

    /// Directories registered so far, in registration order.
    pub fn watched(&self) -> &[PathBuf] {
        &self.watched
    }
}

impl WatchRegistry for NotifyRegistry {
    fn register(&mut self, dir: &Path) -> Result<()> {
        let watcher = self
            .watcher
            .as_mut()
            .ok_or_else(|| OnchangeError::Other(anyhow!("watch registry is closed")))?;

        watcher
            .watch(dir, RecursiveMode::NonRecursive)
            .map_err(|source| OnchangeError::Watch {
                path: dir.to_path_buf(),
                source,
            })?;

        info!("Watching {}", dir.display());
        self.watched.push(dir.to_path_buf());
        Ok(())
    }

    fn take_events(&mut self) -> Option<EventStream> {
        self.events.take()
    }

    fn close(&mut self) {
        if self.watcher.take().is_some() {
            debug!(dirs = self.watched.len(), "file watcher closed");
        }
    }
}

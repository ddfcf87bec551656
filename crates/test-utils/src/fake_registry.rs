use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use onchange::errors::{OnchangeError, Result};
use onchange::watch::{ChangeEvent, ChangeKind, EventStream, WatchRegistry};
use tokio::sync::mpsc;

/// A fake watch registry whose event stream is fed by the test through a
/// [`RegistryHandle`].
pub struct ChannelRegistry {
    shared: RegistryHandle,
    events: Option<EventStream>,
    fail_on: Option<PathBuf>,
}

/// Test-side view of a [`ChannelRegistry`].
#[derive(Clone)]
pub struct RegistryHandle {
    registered: Arc<Mutex<Vec<PathBuf>>>,
    sender: Arc<Mutex<Option<mpsc::UnboundedSender<ChangeEvent>>>>,
}

impl ChannelRegistry {
    pub fn new() -> (Self, RegistryHandle) {
        let (tx, rx) = mpsc::unbounded_channel();
        let handle = RegistryHandle {
            registered: Arc::new(Mutex::new(Vec::new())),
            sender: Arc::new(Mutex::new(Some(tx))),
        };
        let registry = Self {
            shared: handle.clone(),
            events: Some(rx),
            fail_on: None,
        };
        (registry, handle)
    }

    /// Make `register(path)` fail like an OS watch would.
    pub fn fail_on(mut self, path: impl Into<PathBuf>) -> Self {
        self.fail_on = Some(path.into());
        self
    }
}

impl WatchRegistry for ChannelRegistry {
    fn register(&mut self, dir: &Path) -> Result<()> {
        if self.fail_on.as_deref() == Some(dir) {
            return Err(OnchangeError::Watch {
                path: dir.to_path_buf(),
                source: notify::Error::path_not_found().add_path(dir.to_path_buf()),
            });
        }
        self.shared.registered.lock().unwrap().push(dir.to_path_buf());
        Ok(())
    }

    fn take_events(&mut self) -> Option<EventStream> {
        self.events.take()
    }

    fn close(&mut self) {
        self.shared.sender.lock().unwrap().take();
    }
}

impl RegistryHandle {
    /// Directories registered so far, in order.
    pub fn registered(&self) -> Vec<PathBuf> {
        self.registered.lock().unwrap().clone()
    }

    /// Deliver an event as if the OS reported it. Returns false once closed.
    pub fn send(&self, event: ChangeEvent) -> bool {
        match self.sender.lock().unwrap().as_ref() {
            Some(tx) => tx.send(event).is_ok(),
            None => false,
        }
    }

    pub fn create(&self, path: impl Into<PathBuf>) -> bool {
        self.send(ChangeEvent::new(path, ChangeKind::Create))
    }

    pub fn modify(&self, path: impl Into<PathBuf>) -> bool {
        self.send(ChangeEvent::new(path, ChangeKind::Modify))
    }
}

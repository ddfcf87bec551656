// src/watch/mod.rs

//! File watching.
//!
//! This module is responsible for:
//! - Normalising raw `notify` events into [`ChangeEvent`]s.
//! - Registering directories with a non-recursive OS watcher and merging all
//!   of them into one [`EventStream`].
//!
//! It does **not** know about trigger scripts; it only turns filesystem
//! changes into a stream of events.

pub mod event;
pub mod registry;

pub use event::{ChangeEvent, ChangeKind};
pub use registry::{EventStream, NotifyRegistry, WatchRegistry};

// src/watch/event.rs

//! Normalised filesystem change events.

use std::fmt;
use std::path::PathBuf;

use notify::event::ModifyKind;
use notify::{Event, EventKind};

/// Kind of change observed on a path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    Create,
    Modify,
    Delete,
    Rename,
}

impl fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ChangeKind::Create => "create",
            ChangeKind::Modify => "modify",
            ChangeKind::Delete => "delete",
            ChangeKind::Rename => "rename",
        };
        f.write_str(s)
    }
}

/// A single change to a single path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeEvent {
    pub path: PathBuf,
    pub kind: ChangeKind,
}

impl ChangeEvent {
    pub fn new(path: impl Into<PathBuf>, kind: ChangeKind) -> Self {
        Self {
            path: path.into(),
            kind,
        }
    }

    /// Map a raw `notify` event onto zero or more change events.
    ///
    /// One event is produced per path (renames reported with both paths
    /// yield two). Access notifications are dropped: running a script opens
    /// it, and that must not count as a change.
    pub fn from_notify(event: Event) -> Vec<ChangeEvent> {
        let Some(kind) = classify(&event.kind) else {
            return Vec::new();
        };
        event
            .paths
            .into_iter()
            .map(|path| ChangeEvent { path, kind })
            .collect()
    }
}

fn classify(kind: &EventKind) -> Option<ChangeKind> {
    match kind {
        EventKind::Create(_) => Some(ChangeKind::Create),
        EventKind::Modify(ModifyKind::Name(_)) => Some(ChangeKind::Rename),
        EventKind::Modify(_) | EventKind::Any => Some(ChangeKind::Modify),
        EventKind::Remove(_) => Some(ChangeKind::Delete),
        EventKind::Access(_) | EventKind::Other => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use notify::event::{
        AccessKind, AccessMode, CreateKind, DataChange, MetadataKind, RemoveKind,
        RenameMode,
    };

    fn raw(kind: EventKind, paths: &[&str]) -> Event {
        paths
            .iter()
            .fold(Event::new(kind), |ev, p| ev.add_path(PathBuf::from(p)))
    }

    #[test]
    fn maps_basic_kinds() {
        let cases = [
            (EventKind::Create(CreateKind::File), ChangeKind::Create),
            (
                EventKind::Modify(ModifyKind::Data(DataChange::Content)),
                ChangeKind::Modify,
            ),
            (
                EventKind::Modify(ModifyKind::Metadata(MetadataKind::Any)),
                ChangeKind::Modify,
            ),
            (EventKind::Remove(RemoveKind::File), ChangeKind::Delete),
            (
                EventKind::Modify(ModifyKind::Name(RenameMode::To)),
                ChangeKind::Rename,
            ),
            (EventKind::Any, ChangeKind::Modify),
        ];

        for (kind, expected) in cases {
            let out = ChangeEvent::from_notify(raw(kind, &["/proj/a.txt"]));
            assert_eq!(out, vec![ChangeEvent::new("/proj/a.txt", expected)]);
        }
    }

    #[test]
    fn rename_with_both_paths_yields_two_events() {
        let out = ChangeEvent::from_notify(raw(
            EventKind::Modify(ModifyKind::Name(RenameMode::Both)),
            &["/proj/old.txt", "/proj/new.txt"],
        ));
        assert_eq!(
            out,
            vec![
                ChangeEvent::new("/proj/old.txt", ChangeKind::Rename),
                ChangeEvent::new("/proj/new.txt", ChangeKind::Rename),
            ]
        );
    }

    #[test]
    fn access_and_other_are_discarded() {
        let open = raw(
            EventKind::Access(AccessKind::Open(AccessMode::Execute)),
            &["/proj/.onchange"],
        );
        assert!(ChangeEvent::from_notify(open).is_empty());
        assert!(ChangeEvent::from_notify(raw(EventKind::Other, &["/proj/x"])).is_empty());
    }
}

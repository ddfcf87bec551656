// src/dispatch/mod.rs

//! Change-event dispatch.
//!
//! Turns [`ChangeEvent`]s into script runs:
//! - [`ScriptInvocation`] resolves which script to run for a changed path.
//! - [`ExecutionState`] is the single-flight `busy` flag.
//! - [`runner`] holds the `ScriptRunner` trait and the `tokio::process`
//!   implementation used in production.
//! - [`dispatcher`] owns the event loop.
//!
//! [`ChangeEvent`]: crate::watch::ChangeEvent

use std::fmt;
use std::path::{Path, PathBuf};

use crate::watch::ChangeEvent;

pub mod dispatcher;
pub mod runner;

pub use dispatcher::EventDispatcher;
pub use runner::{ProcessRunner, RunFuture, ScriptRunner};

/// One script run: `<script> <target>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptInvocation {
    /// Trigger script inside the changed file's own directory.
    pub script: PathBuf,
    /// The changed path, passed as the only argument.
    pub target: PathBuf,
}

impl ScriptInvocation {
    /// Resolve the script for a changed path.
    ///
    /// The script always lives next to the changed file, whichever watched
    /// directory the event came through. A bare file name resolves against
    /// `.` so the script is never looked up on `PATH`.
    pub fn for_path(path: &Path, script_name: &str) -> Self {
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        Self {
            script: dir.join(script_name),
            target: path.to_path_buf(),
        }
    }

    pub fn for_event(event: &ChangeEvent, script_name: &str) -> Self {
        Self::for_path(&event.path, script_name)
    }
}

impl fmt::Display for ScriptInvocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.script.display(), self.target.display())
    }
}

/// Outcome of a single script run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptOutcome {
    Success,
    /// Non-zero exit; `-1` when the process was killed by a signal.
    Failed(i32),
    /// The script could not be started or waited on.
    Error(String),
}

/// Single-flight guard.
///
/// Owned by the dispatcher task and only touched from it, so a plain `bool`
/// suffices. Running several dispatch workers would need this to become a
/// semaphore of size one instead.
#[derive(Debug, Default)]
pub struct ExecutionState {
    busy: bool,
}

impl ExecutionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_busy(&self) -> bool {
        self.busy
    }

    /// Mark a run as started. Returns `false` if one is already in flight.
    pub fn try_begin(&mut self) -> bool {
        if self.busy {
            return false;
        }
        self.busy = true;
        true
    }

    pub fn finish(&mut self) {
        self.busy = false;
    }
}

/// Counters returned when the dispatcher stops.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchReport {
    /// Script runs started.
    pub started: usize,
    /// Events dropped because a run was in flight.
    pub dropped: usize,
    /// Runs that exited non-zero or failed to start.
    pub failed: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::watch::ChangeKind;

    #[test]
    fn script_comes_from_the_changed_files_directory() {
        let ev = ChangeEvent::new("/proj/sub/a.txt", ChangeKind::Create);
        let inv = ScriptInvocation::for_event(&ev, ".onchange");
        assert_eq!(inv.script, PathBuf::from("/proj/sub/.onchange"));
        assert_eq!(inv.target, PathBuf::from("/proj/sub/a.txt"));
        assert_eq!(inv.to_string(), "/proj/sub/.onchange /proj/sub/a.txt");
    }

    #[test]
    fn bare_file_name_resolves_against_current_dir() {
        let inv = ScriptInvocation::for_path(Path::new("x.txt"), "build.sh");
        assert_eq!(inv.script, PathBuf::from("./build.sh"));
        assert_eq!(inv.target, PathBuf::from("x.txt"));
    }

    #[test]
    fn relative_paths_keep_their_directory() {
        let inv = ScriptInvocation::for_path(Path::new("./sub/y.txt"), ".onchange");
        assert_eq!(inv.script, PathBuf::from("./sub/.onchange"));
    }

    #[test]
    fn execution_state_is_single_flight() {
        let mut state = ExecutionState::new();
        assert!(!state.is_busy());
        assert!(state.try_begin());
        assert!(state.is_busy());
        assert!(!state.try_begin());
        state.finish();
        assert!(!state.is_busy());
        assert!(state.try_begin());
    }
}

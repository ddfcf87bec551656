// src/dispatch/dispatcher.rs

//! Main dispatch loop that turns change events into script runs.

use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::dispatch::runner::ScriptRunner;
use crate::dispatch::{DispatchReport, ExecutionState, ScriptInvocation, ScriptOutcome};
use crate::watch::{ChangeEvent, EventStream};

/// Internal handle for the script run currently in flight.
struct InFlight {
    invocation: ScriptInvocation,
    handle: JoinHandle<ScriptOutcome>,
}

/// Consumes the merged event stream and runs trigger scripts, **at most one
/// at a time across all directories**:
///
/// - If nothing is running, the event's script is started.
/// - If a script is running, the event is dropped. It is not queued and not
///   retried, so edits made during a run are lost.
///
/// The loop keeps reading events while a script runs, which is what makes
/// the drop happen at arrival time instead of after the run.
///
/// There is no execution timeout: a script that never exits keeps the
/// dispatcher busy, and every later event is dropped.
pub struct EventDispatcher<R: ScriptRunner> {
    script_name: String,
    runner: R,
    state: ExecutionState,
    report: DispatchReport,
}

impl<R: ScriptRunner> std::fmt::Debug for EventDispatcher<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventDispatcher")
            .field("script_name", &self.script_name)
            .field("state", &self.state)
            .field("report", &self.report)
            .finish_non_exhaustive()
    }
}

impl<R: ScriptRunner> EventDispatcher<R> {
    pub fn new(script_name: impl Into<String>, runner: R) -> Self {
        Self {
            script_name: script_name.into(),
            runner,
            state: ExecutionState::new(),
            report: DispatchReport::default(),
        }
    }

    /// Spawn the dispatch loop on its own Tokio task.
    pub fn spawn(self, events: EventStream) -> JoinHandle<DispatchReport> {
        tokio::spawn(self.run(events))
    }

    /// Main event loop.
    ///
    /// Returns once `events` is closed and any in-flight run has finished.
    pub async fn run(mut self, mut events: EventStream) -> DispatchReport {
        info!(script = %self.script_name, "event dispatcher started");

        let mut in_flight: Option<InFlight> = None;

        loop {
            tokio::select! {
                // Events are drained in arrival order. A finished run is
                // picked up here or in `handle_event`, whichever sees it first.
                biased;

                maybe_event = events.recv() => {
                    match maybe_event {
                        Some(event) => self.handle_event(event, &mut in_flight).await,
                        None => {
                            debug!("event stream closed");
                            break;
                        }
                    }
                }

                outcome = wait_for(&mut in_flight) => {
                    if let Some(run) = in_flight.take() {
                        self.complete(run.invocation, outcome);
                    }
                }
            }
        }

        if let Some(run) = in_flight.take() {
            info!(script = ?run.invocation.script, "waiting for running script before exit");
            let outcome = join_outcome(run.handle).await;
            self.complete(run.invocation, outcome);
        }

        info!(
            started = self.report.started,
            dropped = self.report.dropped,
            failed = self.report.failed,
            "event dispatcher finished"
        );
        self.report
    }

    async fn handle_event(&mut self, event: ChangeEvent, in_flight: &mut Option<InFlight>) {
        let invocation = ScriptInvocation::for_event(&event, &self.script_name);

        // A run may have exited without the loop having observed it yet.
        if in_flight.as_ref().is_some_and(|run| run.handle.is_finished()) {
            if let Some(run) = in_flight.take() {
                let outcome = join_outcome(run.handle).await;
                self.complete(run.invocation, outcome);
            }
        }

        if !self.state.try_begin() {
            self.report.dropped += 1;
            info!(
                path = %event.path.display(),
                kind = %event.kind,
                "Skipping: a script is already running"
            );
            return;
        }

        self.report.started += 1;
        info!("{}", invocation);
        debug!(kind = %event.kind, script = ?invocation.script, "starting script");

        let handle = tokio::spawn(self.runner.run(invocation.clone()));
        *in_flight = Some(InFlight { invocation, handle });
    }

    fn complete(&mut self, invocation: ScriptInvocation, outcome: ScriptOutcome) {
        self.state.finish();

        match outcome {
            ScriptOutcome::Success => {
                debug!(script = ?invocation.script, target = ?invocation.target, "script finished");
            }
            ScriptOutcome::Failed(code) => {
                self.report.failed += 1;
                warn!(
                    script = ?invocation.script,
                    target = ?invocation.target,
                    exit_code = code,
                    "script exited with non-zero status"
                );
            }
            ScriptOutcome::Error(err) => {
                self.report.failed += 1;
                error!(
                    script = ?invocation.script,
                    target = ?invocation.target,
                    error = %err,
                    "script execution error"
                );
            }
        }
    }
}

/// Resolve when the in-flight run finishes; never resolves if idle.
async fn wait_for(in_flight: &mut Option<InFlight>) -> ScriptOutcome {
    match in_flight {
        Some(run) => join_outcome_ref(&mut run.handle).await,
        None => std::future::pending().await,
    }
}

async fn join_outcome(mut handle: JoinHandle<ScriptOutcome>) -> ScriptOutcome {
    join_outcome_ref(&mut handle).await
}

async fn join_outcome_ref(handle: &mut JoinHandle<ScriptOutcome>) -> ScriptOutcome {
    match handle.await {
        Ok(outcome) => outcome,
        Err(err) => ScriptOutcome::Error(format!("script task failed: {err}")),
    }
}

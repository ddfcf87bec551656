// src/dispatch/runner.rs

//! Pluggable script runner abstraction.
//!
//! The dispatcher talks to a `ScriptRunner` instead of spawning processes
//! itself. Production code uses [`ProcessRunner`]; tests can provide their
//! own implementation that records invocations and reports scripted
//! outcomes without touching the OS.

use std::future::Future;
use std::pin::Pin;
use std::process::Stdio;

use anyhow::{Context, Result};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::process::Command;
use tracing::{debug, trace, warn};

use super::{ScriptInvocation, ScriptOutcome};

/// Future returned by [`ScriptRunner::run`]. Owns everything it needs so it
/// can be moved onto its own task.
pub type RunFuture = Pin<Box<dyn Future<Output = ScriptOutcome> + Send + 'static>>;

/// Trait abstracting how a script invocation is executed.
pub trait ScriptRunner: Send + Sync + 'static {
    /// Run the script to completion and report how it ended.
    ///
    /// Implementations must not fail: every error is folded into
    /// [`ScriptOutcome::Error`].
    fn run(&self, invocation: ScriptInvocation) -> RunFuture;
}

/// Runs scripts as child processes.
///
/// stdin is closed; stdout and stderr are piped and copied through to this
/// process's stdout and stderr as the script produces them.
#[derive(Debug, Clone, Default)]
pub struct ProcessRunner;

impl ProcessRunner {
    pub fn new() -> Self {
        Self
    }
}

impl ScriptRunner for ProcessRunner {
    fn run(&self, invocation: ScriptInvocation) -> RunFuture {
        Box::pin(async move {
            match run_process(&invocation).await {
                Ok(outcome) => outcome,
                Err(err) => ScriptOutcome::Error(format!("{err:#}")),
            }
        })
    }
}

async fn run_process(invocation: &ScriptInvocation) -> Result<ScriptOutcome> {
    let mut cmd = Command::new(&invocation.script);
    cmd.arg(&invocation.target)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());

    let mut child = cmd
        .spawn()
        .with_context(|| format!("spawning script {:?}", invocation.script))?;

    debug!(script = ?invocation.script, pid = ?child.id(), "script process started");

    let stdout = child
        .stdout
        .take()
        .map(|out| tokio::spawn(forward(out, tokio::io::stdout(), "stdout")));
    let stderr = child
        .stderr
        .take()
        .map(|err| tokio::spawn(forward(err, tokio::io::stderr(), "stderr")));

    let status = child
        .wait()
        .await
        .with_context(|| format!("waiting for script {:?}", invocation.script))?;

    // Make sure everything the script printed has been passed on before we
    // report completion.
    for handle in [stdout, stderr].into_iter().flatten() {
        if let Err(err) = handle.await {
            warn!(error = %err, "output forwarder task failed");
        }
    }

    if status.success() {
        Ok(ScriptOutcome::Success)
    } else {
        Ok(ScriptOutcome::Failed(status.code().unwrap_or(-1)))
    }
}

async fn forward<R, W>(mut from: R, mut to: W, stream: &'static str)
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    match tokio::io::copy(&mut from, &mut to).await {
        Ok(bytes) => trace!(stream, bytes, "script output forwarded"),
        Err(err) => warn!(stream, error = %err, "failed to forward script output"),
    }
}

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use onchange::dispatch::{RunFuture, ScriptInvocation, ScriptOutcome, ScriptRunner};
use tokio::sync::Semaphore;

/// A fake script runner that:
/// - records every invocation at the moment the dispatcher starts it
/// - reports scripted outcomes (default `Success`)
/// - optionally holds each run until the test calls [`FakeRunner::release`].
#[derive(Clone, Default)]
pub struct FakeRunner {
    invocations: Arc<Mutex<Vec<ScriptInvocation>>>,
    finished: Arc<Mutex<usize>>,
    outcomes: Arc<Mutex<VecDeque<ScriptOutcome>>>,
    gate: Option<Arc<Semaphore>>,
}

impl FakeRunner {
    /// Runs complete immediately.
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs block until released, one permit per run.
    pub fn gated() -> Self {
        Self {
            gate: Some(Arc::new(Semaphore::new(0))),
            ..Self::default()
        }
    }

    /// Outcomes handed out in order; once exhausted runs succeed.
    pub fn with_outcomes(self, outcomes: impl IntoIterator<Item = ScriptOutcome>) -> Self {
        self.outcomes.lock().unwrap().extend(outcomes);
        self
    }

    /// Let `n` held runs finish.
    pub fn release(&self, n: usize) {
        if let Some(gate) = &self.gate {
            gate.add_permits(n);
        }
    }

    pub fn invocations(&self) -> Vec<ScriptInvocation> {
        self.invocations.lock().unwrap().clone()
    }

    pub fn started(&self) -> usize {
        self.invocations.lock().unwrap().len()
    }

    pub fn finished(&self) -> usize {
        *self.finished.lock().unwrap()
    }
}

impl ScriptRunner for FakeRunner {
    fn run(&self, invocation: ScriptInvocation) -> RunFuture {
        self.invocations.lock().unwrap().push(invocation);
        let outcome = self
            .outcomes
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(ScriptOutcome::Success);
        let gate = self.gate.clone();
        let finished = Arc::clone(&self.finished);

        Box::pin(async move {
            if let Some(gate) = gate {
                gate.acquire().await.expect("gate closed").forget();
            }
            *finished.lock().unwrap() += 1;
            outcome
        })
    }
}

//! Sequential runner
//!
//! Executes steps strictly in order against a [`Transport`], storing every
//! successful result in the [`RunContext`] for later steps to read. Rendering
//! is left to a [`RunObserver`]; the runner itself only produces a
//! [`RunReport`].

use std::fmt;
use std::time::Duration;

use crate::common::config::SettlementConfig;
use crate::common::Error;
use crate::http::{self, Request, StepResult, Transport};

use super::step::{RunContext, Step};

/// Where a run currently is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    NotStarted,
    CheckingServer,
    CreatingOrder,
    CreatingPayment,
    ProcessingPayment,
    WaitingForSettlement,
    PollingStatus,
    Done,
    Aborted,
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RunState::NotStarted => "not started",
            RunState::CheckingServer => "checking server",
            RunState::CreatingOrder => "creating order",
            RunState::CreatingPayment => "creating payment",
            RunState::ProcessingPayment => "processing payment",
            RunState::WaitingForSettlement => "waiting for settlement",
            RunState::PollingStatus => "polling status",
            RunState::Done => "done",
            RunState::Aborted => "aborted",
        };
        f.write_str(name)
    }
}

/// How a run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Every step succeeded
    Completed,
    /// Reached the end, but at least one non-fatal step failed
    CompletedWithWarnings,
    /// A fatal step (or the connection) failed
    Aborted,
}

/// What happened to one step
#[derive(Debug)]
pub struct StepRecord {
    pub name: &'static str,
    pub title: String,
    pub fatal: bool,
    /// Requests issued; more than one only when re-polling a pending result
    pub attempts: u32,
    /// The last request sent, absent when it could not be built
    pub request: Option<Request>,
    pub outcome: Result<StepResult, Error>,
}

impl StepRecord {
    pub fn is_success(&self) -> bool {
        self.outcome.is_ok()
    }

    pub fn error(&self) -> Option<&Error> {
        self.outcome.as_ref().err()
    }
}

/// Structured result of a run
#[derive(Debug)]
pub struct RunReport {
    /// Records for every executed step, in order
    pub records: Vec<StepRecord>,
    /// Every state the run passed through, starting at `NotStarted`
    pub states: Vec<RunState>,
    pub outcome: Outcome,
}

impl RunReport {
    pub fn final_state(&self) -> RunState {
        self.states.last().copied().unwrap_or(RunState::NotStarted)
    }

    pub fn record(&self, step: &str) -> Option<&StepRecord> {
        self.records.iter().find(|r| r.name == step)
    }

    /// Successful result of a step
    pub fn result(&self, step: &str) -> Option<&StepResult> {
        self.record(step).and_then(|r| r.outcome.as_ref().ok())
    }

    /// The record that aborted the run
    pub fn abort_cause(&self) -> Option<&StepRecord> {
        match self.outcome {
            Outcome::Aborted => self.records.last(),
            _ => None,
        }
    }

    pub fn exit_code(&self) -> i32 {
        match self.outcome {
            Outcome::Aborted => 1,
            Outcome::Completed | Outcome::CompletedWithWarnings => 0,
        }
    }
}

/// Receives progress as a run executes
///
/// All methods default to doing nothing.
pub trait RunObserver {
    fn state_changed(&mut self, _state: RunState) {}
    fn waiting(&mut self, _delay: Duration, _attempt: u32) {}
    fn step_started(&mut self, _index: usize, _step: &Step, _attempt: u32) {}
    fn step_finished(&mut self, _index: usize, _step: &Step, _record: &StepRecord) {}
}

/// Observer that ignores everything
pub struct Silent;

impl RunObserver for Silent {}

/// Runs a list of dependent steps
pub struct Runner<'a> {
    transport: &'a dyn Transport,
    settlement: SettlementConfig,
}

impl<'a> Runner<'a> {
    pub fn new(transport: &'a dyn Transport, settlement: SettlementConfig) -> Self {
        Self {
            transport,
            settlement,
        }
    }

    pub async fn run(&self, steps: &[Step], observer: &mut dyn RunObserver) -> RunReport {
        let mut ctx = RunContext::new();
        let mut states = vec![RunState::NotStarted];
        let mut records = Vec::with_capacity(steps.len());
        let mut warned = false;

        for (index, step) in steps.iter().enumerate() {
            let record = self.execute(index, step, &ctx, &mut states, observer).await;
            observer.step_finished(index, step, &record);

            match &record.outcome {
                Ok(result) => {
                    tracing::debug!(step = step.name, status = result.status, "Step succeeded");
                    ctx.insert(step.name, result.clone());
                }
                Err(e) if step.fatal || e.is_connection() => {
                    tracing::error!(
                        step = step.name,
                        kind = e.kind(),
                        error = %e,
                        "Step failed, aborting run"
                    );
                    records.push(record);
                    transition(&mut states, observer, RunState::Aborted);
                    return RunReport {
                        records,
                        states,
                        outcome: Outcome::Aborted,
                    };
                }
                Err(e) => {
                    tracing::warn!(
                        step = step.name,
                        kind = e.kind(),
                        error = %e,
                        "Non-fatal step failed, continuing"
                    );
                    warned = true;
                }
            }
            records.push(record);
        }

        transition(&mut states, observer, RunState::Done);
        RunReport {
            records,
            states,
            outcome: if warned {
                Outcome::CompletedWithWarnings
            } else {
                Outcome::Completed
            },
        }
    }

    async fn execute(
        &self,
        index: usize,
        step: &Step,
        ctx: &RunContext,
        states: &mut Vec<RunState>,
        observer: &mut dyn RunObserver,
    ) -> StepRecord {
        let mut attempts = 0;

        loop {
            if step.settle {
                let delay = self.settlement.delay_for(attempts);
                transition(states, observer, RunState::WaitingForSettlement);
                observer.waiting(delay, attempts + 1);
                tracing::debug!(
                    step = step.name,
                    delay_ms = delay.as_millis() as u64,
                    "Waiting for settlement"
                );
                tokio::time::sleep(delay).await;
            }

            transition(states, observer, step.phase);
            observer.step_started(index, step, attempts + 1);

            let request = match step.request(ctx) {
                Ok(request) => request,
                Err(e) => {
                    return StepRecord {
                        name: step.name,
                        title: step.title.clone(),
                        fatal: step.fatal,
                        attempts,
                        request: None,
                        outcome: Err(e),
                    }
                }
            };

            let outcome = http::call(self.transport, &request).await;
            attempts += 1;

            let still_pending = match (&outcome, step.pending) {
                (Ok(result), Some(pending)) => pending(result),
                _ => false,
            };
            if step.settle && still_pending && attempts < self.settlement.poll_attempts {
                tracing::info!(step = step.name, attempts, "Result still pending, polling again");
                continue;
            }

            return StepRecord {
                name: step.name,
                title: step.title.clone(),
                fatal: step.fatal,
                attempts,
                request: Some(request),
                outcome,
            };
        }
    }
}

fn transition(states: &mut Vec<RunState>, observer: &mut dyn RunObserver, state: RunState) {
    if states.last() != Some(&state) {
        states.push(state);
        observer.state_changed(state);
    }
}

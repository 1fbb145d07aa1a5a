//! Step definitions and the per-run context
//!
//! A step's path is a template such as `/pagamentos/{payment.id}/status`:
//! each `{step.field}` placeholder is filled from the body of an earlier,
//! successful step. Request bodies are produced by closures over the same
//! context, so a step cannot be built until everything it reads exists.

use std::collections::HashMap;
use std::fmt;

use reqwest::Method;
use serde_json::Value;

use crate::common::{Error, Result};
use crate::http::{Request, StepResult};

use super::runner::RunState;

/// Builds a request body from earlier results
pub type BodyProducer = Box<dyn Fn(&RunContext) -> Result<Value> + Send + Sync>;

/// Decides whether a polled result is still waiting on settlement
pub type PendingCheck = fn(&StepResult) -> bool;

/// One HTTP call in a run
pub struct Step {
    /// Key under which the result is stored in the context
    pub name: &'static str,
    /// Label shown in the transcript
    pub title: String,
    /// State the run is in while this step executes
    pub phase: RunState,
    pub method: Method,
    pub path: String,
    pub body: Option<BodyProducer>,
    /// Abort the whole run when this step fails
    pub fatal: bool,
    /// Wait for provider settlement before issuing this step
    pub settle: bool,
    /// With `settle`, re-poll while this returns true (bounded by poll attempts)
    pub pending: Option<PendingCheck>,
    /// Response fields worth showing in the transcript
    pub display: &'static [&'static str],
}

impl Step {
    pub fn new(
        name: &'static str,
        phase: RunState,
        method: Method,
        path: impl Into<String>,
    ) -> Self {
        Self {
            name,
            title: name.to_string(),
            phase,
            method,
            path: path.into(),
            body: None,
            fatal: true,
            settle: false,
            pending: None,
            display: &[],
        }
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_body<F>(mut self, producer: F) -> Self
    where
        F: Fn(&RunContext) -> Result<Value> + Send + Sync + 'static,
    {
        self.body = Some(Box::new(producer));
        self
    }

    pub fn non_fatal(mut self) -> Self {
        self.fatal = false;
        self
    }

    pub fn after_settlement(mut self, pending: PendingCheck) -> Self {
        self.settle = true;
        self.pending = Some(pending);
        self
    }

    pub fn display(mut self, fields: &'static [&'static str]) -> Self {
        self.display = fields;
        self
    }

    /// Build the concrete request from the current context
    pub fn request(&self, ctx: &RunContext) -> Result<Request> {
        let path = ctx.render(&self.path)?;
        let body = self.body.as_ref().map(|produce| produce(ctx)).transpose()?;
        Ok(Request {
            method: self.method.clone(),
            path,
            body,
        })
    }
}

impl fmt::Debug for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Step")
            .field("name", &self.name)
            .field("phase", &self.phase)
            .field("method", &self.method)
            .field("path", &self.path)
            .field("fatal", &self.fatal)
            .field("settle", &self.settle)
            .finish_non_exhaustive()
    }
}

/// Successful results of the current run, keyed by step name
#[derive(Debug, Default)]
pub struct RunContext {
    results: HashMap<String, StepResult>,
}

impl RunContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, step: &str, result: StepResult) {
        self.results.insert(step.to_string(), result);
    }

    pub fn get(&self, step: &str) -> Option<&StepResult> {
        self.results.get(step)
    }

    /// Field of an earlier step's body; absent or null is an error
    pub fn require(&self, step: &str, field: &str) -> Result<&Value> {
        self.get(step)
            .and_then(|result| result.body.field(field))
            .filter(|value| !value.is_null())
            .ok_or_else(|| Error::missing_field(step, field))
    }

    /// Fill `{step.field}` placeholders in a path template
    pub fn render(&self, template: &str) -> Result<String> {
        let mut out = String::with_capacity(template.len());
        let mut rest = template;

        while let Some(open) = rest.find('{') {
            out.push_str(&rest[..open]);
            let after = &rest[open + 1..];
            let close = after.find('}').ok_or_else(|| Error::PathTemplate {
                template: template.to_string(),
                reason: "unclosed '{'".to_string(),
            })?;

            let reference = &after[..close];
            let (step, field) = reference.split_once('.').ok_or_else(|| Error::PathTemplate {
                template: template.to_string(),
                reason: format!("placeholder '{}' is not of the form step.field", reference),
            })?;

            match self.require(step, field)? {
                Value::String(s) => out.push_str(s),
                Value::Number(n) => out.push_str(&n.to_string()),
                other => {
                    return Err(Error::PathTemplate {
                        template: template.to_string(),
                        reason: format!("'{}' is not a scalar: {}", reference, other),
                    })
                }
            }

            rest = &after[close + 1..];
        }

        out.push_str(rest);
        Ok(out)
    }
}

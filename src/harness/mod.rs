//! Checkout harness
//!
//! Runs a chain of dependent HTTP steps against the backend and judges the
//! result from structured data. Console output is an observer on top of the
//! runner, never the source of truth.

pub mod checkout;
pub mod console;
pub mod runner;
pub mod scenario;
pub mod step;

pub use checkout::{checkout_plan, ping_plan, PaymentStatus, Verdict};
pub use runner::{Outcome, RunObserver, RunReport, RunState, Runner, Silent, StepRecord};
pub use scenario::Scenario;
pub use step::{RunContext, Step};

//! pixcheck - end-to-end PIX checkout harness
//!
//! This library runs a chain of dependent HTTP calls against a backend,
//! classifying each response and exposing the whole run as structured data.

pub mod cli;
pub mod commands;
pub mod common;
pub mod harness;
pub mod http;

// Re-export commonly used types for tests
pub use common::{Error, Result};
pub use harness::{RunReport, Runner, Verdict};

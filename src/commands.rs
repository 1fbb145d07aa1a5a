//! CLI command definitions
//!
//! Defines the clap commands for the checkout harness.

use clap::{Args, Subcommand};
use std::path::PathBuf;

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the full PIX checkout flow (default when no command is given)
    Run(RunArgs),

    /// Only check that the server answers on its root path
    Ping(ServerArgs),
}

/// Options for reaching the server
#[derive(Args, Debug, Clone, Default)]
pub struct ServerArgs {
    /// Base URL of the backend (default: http://localhost:3000)
    #[arg(long, env = "PIXCHECK_BASE_URL")]
    pub base_url: Option<String>,

    /// Per-request timeout in seconds (default: 10)
    #[arg(long)]
    pub timeout_secs: Option<u64>,

    /// Print requests and debug logs
    #[arg(long, short)]
    pub verbose: bool,
}

/// Options for a checkout run
#[derive(Args, Debug, Clone, Default)]
pub struct RunArgs {
    #[command(flatten)]
    pub server: ServerArgs,

    /// Wait before polling the payment status, in milliseconds (default: 2000)
    #[arg(long)]
    pub settle_ms: Option<u64>,

    /// Poll the status up to this many times while it is still pending (default: 1)
    #[arg(long)]
    pub poll_attempts: Option<u32>,

    /// YAML scenario with order overrides and an expected final status
    #[arg(long)]
    pub scenario: Option<PathBuf>,
}

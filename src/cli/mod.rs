//! CLI command handling
//!
//! Resolves settings from the config file, environment and flags, runs the
//! requested plan and renders the transcript. Returns the process exit code.

use colored::Colorize;

use crate::commands::{Commands, RunArgs, ServerArgs};
use crate::common::config::Config;
use crate::common::Result;
use crate::harness::console::{self, Console};
use crate::harness::{checkout_plan, ping_plan, Runner, Scenario, Verdict};
use crate::http::HttpTransport;

/// Dispatch a CLI command
pub async fn dispatch(command: Commands) -> Result<i32> {
    match command {
        Commands::Run(args) => run(args).await,
        Commands::Ping(args) => ping(args).await,
    }
}

/// Apply server flags on top of the loaded configuration
fn apply_server_args(config: &mut Config, args: &ServerArgs) {
    if let Some(base_url) = &args.base_url {
        config.server.base_url = base_url.clone();
    }
    if let Some(secs) = args.timeout_secs {
        config.server.timeout_secs = secs;
    }
}

/// Resolve the effective configuration for a checkout run
pub fn resolve_config(base: Config, args: &RunArgs) -> Result<Config> {
    let mut config = base;
    apply_server_args(&mut config, &args.server);
    if let Some(ms) = args.settle_ms {
        config.settlement.delay_ms = ms;
    }
    if let Some(attempts) = args.poll_attempts {
        config.settlement.poll_attempts = attempts;
    }
    config.validate()?;
    Ok(config)
}

async fn run(args: RunArgs) -> Result<i32> {
    let config = resolve_config(Config::load()?, &args)?;
    let scenario = args.scenario.as_deref().map(Scenario::load).transpose()?;
    let order = match &scenario {
        Some(scenario) => scenario.order(&config.order),
        None => config.order.clone(),
    };

    let transport = HttpTransport::new(config.server.base_url.clone(), config.request_timeout())?;

    let name = scenario
        .as_ref()
        .map(|s| s.name.as_str())
        .unwrap_or("PIX checkout");
    println!("\n{} {}", "Running:".blue().bold(), name.white().bold());
    if let Some(desc) = scenario.as_ref().and_then(|s| s.description.as_deref()) {
        println!("  {}", desc.dimmed());
    }
    println!("  {}", transport.base_url().dimmed());

    let mut observer = Console::new(args.server.verbose);
    let report = Runner::new(&transport, config.settlement.clone())
        .run(&checkout_plan(&order), &mut observer)
        .await;

    let verdict = Verdict::from_report(&report);
    let mismatch = scenario.as_ref().and_then(|s| s.check(&verdict));
    console::print_summary(&report, &verdict, mismatch.as_deref());

    tracing::info!(outcome = ?report.outcome, %verdict, "Checkout run finished");

    Ok(if mismatch.is_some() {
        1
    } else {
        report.exit_code()
    })
}

async fn ping(args: ServerArgs) -> Result<i32> {
    let mut config = Config::load()?;
    apply_server_args(&mut config, &args);
    config.validate()?;

    let transport = HttpTransport::new(config.server.base_url.clone(), config.request_timeout())?;
    println!("\n{} {}", "Pinging:".blue().bold(), transport.base_url().white().bold());

    let mut observer = Console::new(args.verbose);
    let report = Runner::new(&transport, config.settlement.clone())
        .run(&ping_plan(), &mut observer)
        .await;

    if let Some(cause) = report.abort_cause() {
        println!();
        if let Some(hint) = crate::harness::checkout::hint(cause) {
            println!("  {} {}", "hint:".yellow(), hint);
        }
    }
    println!();

    Ok(report.exit_code())
}

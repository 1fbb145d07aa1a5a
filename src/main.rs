//! pixcheck - end-to-end PIX checkout harness
//!
//! Drives a running backend through order creation, PIX payment creation,
//! processing and a status poll, and reports where the flow breaks.

use clap::Parser;
use pixcheck::commands::{Commands, RunArgs};
use pixcheck::{cli, common::logging};

#[derive(Parser)]
#[command(name = "pixcheck", about = "End-to-end PIX checkout harness")]
#[command(version, long_about = None, args_conflicts_with_subcommands = true)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    #[command(flatten)]
    run: RunArgs,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let command = cli.command.unwrap_or(Commands::Run(cli.run));

    let verbose = match &command {
        Commands::Run(args) => args.server.verbose,
        Commands::Ping(args) => args.verbose,
    };
    logging::init_cli(verbose);

    match cli::dispatch(command).await {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    }
}

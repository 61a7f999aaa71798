//! Execution conformance CLI
//!
//! Runs a code-generation test executable and checks the blocks it prints.

use clap::Parser;
use conformance::common::logging;
use conformance::{cli, commands::Commands};

#[derive(Parser)]
#[command(name = "conformance", about = "Execution conformance test harness")]
#[command(version, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() {
    logging::init_cli();

    let cli = Cli::parse();

    if let Err(e) = cli::dispatch(cli.command).await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

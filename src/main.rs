//! Flex testbed CLI
//!
//! Runs the flex integration against YAML fixture suites and reports which
//! payloads do not match their recorded shape.

use std::path::PathBuf;

use clap::Parser;
use commands::Commands;
use flex_testbed::common::config::Config;
use flex_testbed::common::logging;
use flex_testbed::{cli, commands};

#[derive(Parser)]
#[command(name = "flex-testbed", about = "End-to-end test harness for the flex integration")]
#[command(version, long_about = None)]
struct Cli {
    /// Configuration file (default: platform config dir)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Show debug logs, staged paths and spawned commands
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    logging::init_cli(cli.verbose);

    let config = match &cli.config {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    };

    let result = match config {
        Ok(config) => cli::dispatch(cli.command, config, cli.verbose).await,
        Err(e) => Err(e),
    };

    match result {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    }
}

//! CLI command definitions
//!
//! Defines the clap commands for the testbed CLI.

use clap::Subcommand;
use std::path::PathBuf;

#[derive(Subcommand)]
pub enum Commands {
    /// Run fixture suites against the integration binary
    Run {
        /// YAML fixture suite files
        #[arg(required = true)]
        fixtures: Vec<PathBuf>,

        /// Integration binary (default from config: /bin/nri-flex)
        #[arg(long)]
        bin: Option<PathBuf>,

        /// Only run fixtures whose name contains this text
        #[arg(long)]
        filter: Option<String>,

        /// Also require event totals to match
        #[arg(long)]
        check_events: bool,

        /// Keep staged configuration and data files
        #[arg(long)]
        keep_artifacts: bool,
    },

    /// Validate a recorded payload against an expected one
    Validate {
        /// File with the expected stdout
        #[arg(long)]
        expected: PathBuf,

        /// File with the actual stdout
        #[arg(long)]
        actual: PathBuf,

        /// File with the actual stderr
        #[arg(long)]
        stderr: Option<PathBuf>,

        /// Also require event totals to match
        #[arg(long)]
        check_events: bool,
    },

    /// List the fixtures in suite files
    #[command(alias = "ls")]
    List {
        /// YAML fixture suite files
        #[arg(required = true)]
        fixtures: Vec<PathBuf>,
    },
}

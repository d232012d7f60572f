//! CLI command handling
//!
//! Dispatches CLI commands to the testbed and formats output.

use std::path::Path;

use colored::Colorize;

use crate::commands::Commands;
use crate::common::config::Config;
use crate::common::{Error, Result};
use crate::testbed::{
    print_result, print_summary, run_suite_file, CannedFlexRunner, FixtureSuite, MetricValidator,
    ScenarioOptions, TestCase,
};

/// Dispatch a CLI command
///
/// Returns `Ok(false)` when the command ran but some test failed.
pub async fn dispatch(command: Commands, config: Config, verbose: bool) -> Result<bool> {
    match command {
        Commands::Run {
            fixtures,
            bin,
            filter,
            check_events,
            keep_artifacts,
        } => {
            let binary = match bin {
                Some(bin) => bin,
                None => config.runner.resolve_binary()?,
            };
            tracing::debug!(binary = %binary.display(), "Using integration binary");

            let mut options = ScenarioOptions::from_config(&config, binary);
            options.check_events |= check_events;
            options.keep_artifacts |= keep_artifacts;
            options.verbose = verbose;

            let mut results = Vec::new();
            for path in &fixtures {
                results.extend(run_suite_file(path, &options, filter.as_deref()).await?);
            }

            if results.is_empty() {
                println!("No fixtures matched");
                return Ok(true);
            }

            Ok(print_summary(&results))
        }

        Commands::Validate {
            expected,
            actual,
            stderr,
            check_events,
        } => {
            let expected_stdout = read(&expected)?;
            let actual_stdout = read(&actual)?;
            let actual_stderr = match stderr {
                Some(path) => read(&path)?,
                None => String::new(),
            };

            let validator = MetricValidator::new(&expected_stdout, "")?
                .check_events(check_events || config.validator.check_events);
            let runner = CannedFlexRunner::new(actual_stdout, actual_stderr);

            let name = actual.display().to_string();
            let mut tc = TestCase::new(name, Box::new(runner), Box::new(validator));
            let result = tc.run_test().await;

            print_result(&result);
            Ok(result.passed)
        }

        Commands::List { fixtures } => {
            for path in &fixtures {
                let suite = FixtureSuite::load(path)?;
                println!("{} {}", suite.name.white().bold(), path.display().to_string().dimmed());
                for fixture in &suite.fixtures {
                    println!("  [{}] {}", fixture.kind().to_string().cyan(), fixture.name);
                }
            }
            Ok(true)
        }
    }
}

fn read(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|e| Error::file_read(path, e))
}

//! Fixture driver
//!
//! Stages a fixture on disk (and on the network for URL fixtures), runs the
//! integration binary against it through a [`TestCase`], and prints the
//! outcome.

use std::io::Write;
use std::path::{Path, PathBuf};

use colored::Colorize;
use tempfile::NamedTempFile;
use tracing::{debug, info};

use crate::common::config::Config;
use crate::common::{Error, Result};

use super::fixture::{Fixture, FixtureSuite};
use super::http::FixtureServer;
use super::runner::{ChildFlexRunner, RunConfiguration, CONFIG_FLAG};
use super::test_case::{Stage, TestCase, TestResult};
use super::validator::MetricValidator;

/// How fixtures are staged and run
#[derive(Debug, Clone)]
pub struct ScenarioOptions {
    /// Integration executable
    pub binary: PathBuf,
    /// Flag naming the configuration path
    pub config_flag: String,
    /// Token in a fixture's config replaced by the staged file path
    pub placeholder: String,
    /// Assert event totals as well as metric totals
    pub check_events: bool,
    /// Keep staged files after the run
    pub keep_artifacts: bool,
    /// Print staged paths and captured output
    pub verbose: bool,
}

impl ScenarioOptions {
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
            config_flag: CONFIG_FLAG.to_string(),
            placeholder: "FILE_PATH".to_string(),
            check_events: false,
            keep_artifacts: false,
            verbose: false,
        }
    }

    /// Options from the configuration file, with the binary already resolved
    pub fn from_config(config: &Config, binary: PathBuf) -> Self {
        Self {
            binary,
            config_flag: config.runner.config_flag.clone(),
            placeholder: config.fixtures.placeholder.clone(),
            check_events: config.validator.check_events,
            keep_artifacts: config.fixtures.keep_artifacts,
            verbose: false,
        }
    }
}

/// Files written for one fixture run
struct StagedFixture {
    config: NamedTempFile,
    data: Option<NamedTempFile>,
}

impl StagedFixture {
    fn stage(fixture: &Fixture, placeholder: &str) -> Result<Self> {
        let data = match &fixture.file_content {
            Some(content) => Some(write_temp("flex-data-", ".json", content)?),
            None => None,
        };

        let config_text = match &data {
            Some(file) => {
                let path = file.path().to_string_lossy();
                fixture.config.replacen(placeholder, &path, 1)
            }
            None => fixture.config.clone(),
        };

        let config = write_temp("flex-config-", ".yml", &config_text)?;
        Ok(Self { config, data })
    }

    fn config_path(&self) -> &Path {
        self.config.path()
    }

    /// Remove the staged files, or persist them when `keep` is set
    fn finish(self, keep: bool) {
        if !keep {
            return;
        }
        for file in std::iter::once(self.config).chain(self.data) {
            match file.keep() {
                Ok((_, path)) => println!("  {} {}", "kept".dimmed(), path.display()),
                Err(e) => println!("  {} {}", "could not keep staged file:".yellow(), e),
            }
        }
    }
}

fn write_temp(prefix: &str, suffix: &str, content: &str) -> Result<NamedTempFile> {
    let mut file = tempfile::Builder::new()
        .prefix(prefix)
        .suffix(suffix)
        .tempfile()
        .map_err(|e| Error::Setup(format!("Failed to create temporary file: {}", e)))?;
    file.write_all(content.as_bytes())
        .and_then(|_| file.flush())
        .map_err(|e| Error::Setup(format!("Failed to write '{}': {}", file.path().display(), e)))?;
    Ok(file)
}

/// Run a single fixture against the integration binary
pub async fn run_fixture(fixture: &Fixture, options: &ScenarioOptions) -> TestResult {
    let staged = match StagedFixture::stage(fixture, &options.placeholder) {
        Ok(staged) => staged,
        Err(e) => return TestResult::failed(&fixture.name, Stage::Setup, e),
    };

    if options.verbose {
        println!(
            "  {} {}",
            "config:".dimmed(),
            staged.config_path().display().to_string().dimmed()
        );
    }

    let validator = match MetricValidator::new(&fixture.expected_stdout, &fixture.expected_stderr)
    {
        Ok(v) => v.check_events(options.check_events),
        Err(e) => return TestResult::failed(&fixture.name, Stage::Setup, e),
    };

    let server = match &fixture.http {
        Some(http) => match FixtureServer::start(http).await {
            Ok(server) => Some(server),
            Err(e) => return TestResult::failed(&fixture.name, Stage::Setup, e),
        },
        None => None,
    };

    let run_config = RunConfiguration::new(&options.binary, staged.config_path())
        .with_config_flag(options.config_flag.clone());
    let runner = ChildFlexRunner::new(run_config);

    let mut tc = TestCase::new(fixture.name.clone(), Box::new(runner), Box::new(validator));
    let result = tc.run_test().await;

    if let Some(server) = server {
        server.shutdown().await;
    }
    staged.finish(options.keep_artifacts);

    result
}

/// Run the fixtures of a suite whose name contains `filter`
pub async fn run_suite(
    suite: &FixtureSuite,
    options: &ScenarioOptions,
    filter: Option<&str>,
) -> Vec<TestResult> {
    println!(
        "\n{} {}",
        "Running Suite:".blue().bold(),
        suite.name.white().bold()
    );
    if let Some(desc) = &suite.description {
        println!("  {}", desc.dimmed());
    }

    let mut results = Vec::new();
    for fixture in suite.select(filter) {
        debug!(fixture = %fixture.name, kind = %fixture.kind(), "Running fixture");
        let result = run_fixture(fixture, options).await;
        print_result(&result);
        results.push(result);
    }

    info!(
        suite = %suite.name,
        total = results.len(),
        failed = results.iter().filter(|r| !r.passed).count(),
        "Suite finished"
    );

    results
}

/// Load a suite file and run it
pub async fn run_suite_file(
    path: &Path,
    options: &ScenarioOptions,
    filter: Option<&str>,
) -> Result<Vec<TestResult>> {
    let suite = FixtureSuite::load(path)?;
    Ok(run_suite(&suite, options, filter).await)
}

/// Print one test result
pub fn print_result(result: &TestResult) {
    if result.passed {
        let detail = result
            .summary
            .as_ref()
            .map(|s| format!("({} entities, {} metric sets)", s.entities, s.actual_metrics))
            .unwrap_or_default();
        println!("  {} {} {}", "✓".green(), result.name, detail.dimmed());
        return;
    }

    let stage = result.stage.map(|s| s.to_string()).unwrap_or_default();
    println!("  {} {} [{}]", "✗".red(), result.name, stage.yellow());

    match &result.error {
        Some(e) if e.is_assertion() => {
            for mismatch in e.mismatches() {
                println!("      {}", mismatch.red());
            }
        }
        Some(e) => println!("      {}", e.to_string().red()),
        None => {}
    }
}

/// Print totals and return whether everything passed
pub fn print_summary(results: &[TestResult]) -> bool {
    let failed: Vec<_> = results.iter().filter(|r| !r.passed).collect();
    let passed = results.len() - failed.len();

    if failed.is_empty() {
        println!(
            "\n{} {}\n",
            "✓".green().bold(),
            format!("{} passed", passed).green().bold()
        );
        return true;
    }

    println!(
        "\n{} {}",
        "✗".red().bold(),
        format!("{} passed, {} failed", passed, failed.len()).red().bold()
    );
    for result in failed {
        let stage = result.stage.map(|s| s.to_string()).unwrap_or_default();
        println!("  - {} [{}]", result.name, stage);
    }
    println!();
    false
}

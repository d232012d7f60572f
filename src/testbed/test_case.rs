//! Test case orchestration
//!
//! Run, fetch results, validate. The first stage that fails ends the test
//! case and is named in its result.

use std::fmt;

use tracing::{debug, info};

use crate::common::Error;

use super::runner::FlexRunner;
use super::validator::{ExecutionValidator, ValidationSummary};

/// Pipeline stage a test case failed in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Staging fixture files or services before the run
    Setup,
    /// Running the integration
    Run,
    /// Retrieving the captured output
    Results,
    /// Comparing output against the expectation
    Validate,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Setup => "setup",
            Stage::Run => "run",
            Stage::Results => "results",
            Stage::Validate => "validate",
        };
        f.write_str(name)
    }
}

/// Result of a test run
#[derive(Debug)]
pub struct TestResult {
    pub name: String,
    pub passed: bool,
    /// Stage that failed, if any
    pub stage: Option<Stage>,
    pub error: Option<Error>,
    /// Totals from a completed validation
    pub summary: Option<ValidationSummary>,
}

impl TestResult {
    pub fn passed(name: impl Into<String>, summary: ValidationSummary) -> Self {
        Self {
            name: name.into(),
            passed: true,
            stage: None,
            error: None,
            summary: Some(summary),
        }
    }

    pub fn failed(name: impl Into<String>, stage: Stage, error: Error) -> Self {
        Self {
            name: name.into(),
            passed: false,
            stage: Some(stage),
            error: Some(error),
            summary: None,
        }
    }

    /// Panic with the failing stage and error, for use inside `#[test]`s
    pub fn assert_passed(&self) {
        if let (Some(stage), Some(error)) = (self.stage, &self.error) {
            panic!("{}: {} stage failed: {}", self.name, stage, error);
        }
    }
}

/// A runner and a validator composed into one test
pub struct TestCase {
    name: String,
    flex: Box<dyn FlexRunner>,
    validator: Box<dyn ExecutionValidator>,
}

impl TestCase {
    pub fn new(
        name: impl Into<String>,
        flex: Box<dyn FlexRunner>,
        validator: Box<dyn ExecutionValidator>,
    ) -> Self {
        Self {
            name: name.into(),
            flex,
            validator,
        }
    }

    /// Run the integration and validate its output
    pub async fn run_test(&mut self) -> TestResult {
        debug!(test = %self.name, "Running test case");

        if let Err(e) = self.flex.run().await {
            return self.fail(Stage::Run, e);
        }

        let result = match self.flex.results() {
            Ok(result) => result,
            Err(e) => return self.fail(Stage::Results, e),
        };

        match self.validator.validate(&result.stdout, &result.stderr) {
            Ok(summary) => {
                info!(
                    test = %self.name,
                    entities = summary.entities,
                    metrics = summary.actual_metrics,
                    "Test case passed"
                );
                TestResult::passed(self.name.clone(), summary)
            }
            Err(e) => self.fail(Stage::Validate, e),
        }
    }

    fn fail(&self, stage: Stage, error: Error) -> TestResult {
        info!(test = %self.name, %stage, "Test case failed: {}", error);
        TestResult::failed(self.name.clone(), stage, error)
    }
}

//! Flex testbed - end-to-end tests for the flex integration
//!
//! This library runs the integration binary against configuration fixtures
//! and validates the shape of the JSON payload it prints.

pub mod cli;
pub mod commands;
pub mod common;
pub mod testbed;

// Re-export commonly used types for tests
pub use common::{Error, Result};
pub use testbed::{ChildFlexRunner, MetricValidator, TestCase, TestResult};

//! Flex testbed
//!
//! Runs the flex integration binary against configuration fixtures and
//! checks the JSON payload it prints. Payloads are compared by shape (name,
//! protocol version, entity and metric counts) rather than by value, since
//! real payloads carry hostnames and timings that change on every run.

mod fixture;
mod http;
mod payload;
mod runner;
mod scenario;
mod test_case;
mod validator;

pub use fixture::*;
pub use http::FixtureServer;
pub use payload::*;
pub use runner::*;
pub use scenario::{
    print_result, print_summary, run_fixture, run_suite, run_suite_file, ScenarioOptions,
};
pub use test_case::*;
pub use validator::*;

//! Error types for the flex testbed
//!
//! Each variant names the stage that failed so a test report can point at
//! the run, the result retrieval, or the validation step directly.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the testbed
#[derive(Error, Debug)]
pub enum Error {
    // === Process Errors ===
    #[error("Failed to start '{}': {source}", .path.display())]
    ProcessSpawn {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Integration exited with {status}: {stderr}")]
    ProcessExit { status: String, stderr: String },

    #[error("No integration results available, the process has not finished or failed to start")]
    NoResults,

    // === Payload Errors ===
    #[error("Expected output is not a valid integration payload: {0}")]
    MalformedExpectedOutput(#[source] serde_json::Error),

    #[error("Integration output is not a valid integration payload: {0}")]
    Parse(#[source] serde_json::Error),

    #[error("Outputs do not match:\n{}", .0.join("\n"))]
    AssertionFailed(Vec<String>),

    // === Fixture Errors ===
    #[error("Fixture setup failed: {0}")]
    Setup(String),

    #[error("Invalid fixture suite '{path}': {error}")]
    FixtureParse { path: String, error: String },

    // === Configuration Errors ===
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid configuration file: {0}")]
    ConfigParse(String),

    // === IO Errors ===
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Failed to read file '{path}': {error}")]
    FileRead { path: String, error: String },
}

impl Error {
    /// Create a file read error for the given path
    pub fn file_read(path: &std::path::Path, error: impl std::fmt::Display) -> Self {
        Self::FileRead {
            path: path.display().to_string(),
            error: error.to_string(),
        }
    }

    /// Whether this error comes from a comparison rather than from running or parsing
    pub fn is_assertion(&self) -> bool {
        matches!(self, Self::AssertionFailed(_))
    }

    /// The individual mismatches of an assertion failure
    pub fn mismatches(&self) -> &[String] {
        match self {
            Self::AssertionFailed(mismatches) => mismatches,
            _ => &[],
        }
    }
}

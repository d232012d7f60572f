//! Fixture suite configuration types
//!
//! Defines the data structures for deserializing YAML fixture suites.

use serde::Deserialize;
use std::fmt;
use std::path::Path;

use crate::common::{Error, Result};

/// A named collection of fixtures loaded from one YAML file
#[derive(Deserialize, Debug)]
pub struct FixtureSuite {
    /// Name of the suite (e.g. "Command API")
    pub name: String,
    /// Optional description of what the suite covers
    pub description: Option<String>,
    /// The fixtures, run in order
    pub fixtures: Vec<Fixture>,
}

/// One scenario: a configuration and the payload it should produce
#[derive(Deserialize, Debug, Clone)]
pub struct Fixture {
    /// Human-readable name
    pub name: String,
    /// Integration configuration (YAML text passed through untouched)
    pub config: String,
    /// Expected integration stdout
    pub expected_stdout: String,
    /// Expected integration stderr (not asserted)
    #[serde(default)]
    pub expected_stderr: String,
    /// Content staged to a temporary file whose path replaces the
    /// placeholder in `config`
    pub file_content: Option<String>,
    /// Local HTTP endpoint served while the integration runs
    pub http: Option<HttpFixture>,
}

/// Endpoint served for URL fixtures
#[derive(Deserialize, Debug, Clone)]
pub struct HttpFixture {
    /// Path segment that selects the payload (e.g. "ecstask")
    pub endpoint: String,
    /// Port to listen on at 127.0.0.1
    pub port: u16,
    /// Response body for matching requests
    pub payload: String,
}

/// Fixture family, derived from the optional fields present
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FixtureKind {
    Command,
    File,
    Http,
}

impl fmt::Display for FixtureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FixtureKind::Command => "command",
            FixtureKind::File => "file",
            FixtureKind::Http => "http",
        };
        f.write_str(name)
    }
}

impl Fixture {
    pub fn kind(&self) -> FixtureKind {
        if self.http.is_some() {
            FixtureKind::Http
        } else if self.file_content.is_some() {
            FixtureKind::File
        } else {
            FixtureKind::Command
        }
    }
}

impl FixtureSuite {
    /// Load and parse a suite from a YAML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| Error::file_read(path, e))?;
        Self::parse(&content).map_err(|e| match e {
            Error::FixtureParse { error, .. } => Error::FixtureParse {
                path: path.display().to_string(),
                error,
            },
            other => other,
        })
    }

    /// Parse a suite from YAML text
    pub fn parse(content: &str) -> Result<Self> {
        serde_yaml::from_str(content).map_err(|e| Error::FixtureParse {
            path: "<inline>".to_string(),
            error: e.to_string(),
        })
    }

    /// Fixtures whose name contains `filter` (all when `None`)
    pub fn select<'a>(&'a self, filter: Option<&'a str>) -> impl Iterator<Item = &'a Fixture> {
        self.fixtures
            .iter()
            .filter(move |f| filter.map_or(true, |needle| f.name.contains(needle)))
    }
}

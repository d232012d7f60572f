//! Integration process runners
//!
//! A runner executes the integration once and keeps what it wrote to stdout
//! and stderr. Results only exist after the process has exited.

use std::path::{Path, PathBuf};
use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command as TokioCommand;
use tracing::{debug, error};

use crate::common::{Error, Result};

/// Default flag naming the configuration file
pub const CONFIG_FLAG: &str = "-config_path";

/// Executes the integration and exposes its captured output
#[async_trait]
pub trait FlexRunner: Send {
    /// Run the integration to completion
    async fn run(&mut self) -> Result<()>;

    /// Output of the finished run
    fn results(&self) -> Result<&RunResult>;
}

/// Captured output of a finished run
///
/// `stdout` and `stderr` are decoded as UTF-8, with invalid sequences
/// replaced; `raw_stdout` and `raw_stderr` hold the exact bytes written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunResult {
    pub stdout: String,
    pub stderr: String,
    pub raw_stdout: Vec<u8>,
    pub raw_stderr: Vec<u8>,
    pub success: bool,
    /// Exit code, `None` when the process was killed by a signal
    pub code: Option<i32>,
}

/// What to run: the executable and the configuration it is pointed at
#[derive(Debug, Clone)]
pub struct RunConfiguration {
    pub binary: PathBuf,
    pub config_path: PathBuf,
    pub config_flag: String,
}

impl RunConfiguration {
    pub fn new(binary: impl Into<PathBuf>, config_path: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
            config_path: config_path.into(),
            config_flag: CONFIG_FLAG.to_string(),
        }
    }

    /// Use a different flag for the configuration path
    pub fn with_config_flag(mut self, flag: impl Into<String>) -> Self {
        self.config_flag = flag.into();
        self
    }
}

/// Runs the integration as a child process on the same machine
#[derive(Debug)]
pub struct ChildFlexRunner {
    config: RunConfiguration,
    result: Option<RunResult>,
}

impl ChildFlexRunner {
    pub fn new(config: RunConfiguration) -> Self {
        Self {
            config,
            result: None,
        }
    }

    /// Runner for `binary -config_path config_path`
    pub fn from_paths(binary: &Path, config_path: &Path) -> Self {
        Self::new(RunConfiguration::new(binary, config_path))
    }
}

#[async_trait]
impl FlexRunner for ChildFlexRunner {
    async fn run(&mut self) -> Result<()> {
        self.result = None;

        let binary = &self.config.binary;
        debug!(
            binary = %binary.display(),
            flag = %self.config.config_flag,
            config = %self.config.config_path.display(),
            "Starting integration"
        );

        let output = TokioCommand::new(binary)
            .arg(&self.config.config_flag)
            .arg(&self.config.config_path)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|source| {
                error!(binary = %binary.display(), "Error running integration: {}", source);
                Error::ProcessSpawn {
                    path: binary.clone(),
                    source,
                }
            })?;

        let result = RunResult {
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            raw_stdout: output.stdout,
            raw_stderr: output.stderr,
            success: output.status.success(),
            code: output.status.code(),
        };

        debug!(
            code = ?result.code,
            stdout_bytes = result.raw_stdout.len(),
            stderr_bytes = result.raw_stderr.len(),
            "Integration finished"
        );

        let stderr = result.stderr.clone();
        self.result = Some(result);

        if !output.status.success() {
            error!(status = %output.status, stderr = %stderr, "Integration run failed");
            return Err(Error::ProcessExit {
                status: output.status.to_string(),
                stderr,
            });
        }

        Ok(())
    }

    fn results(&self) -> Result<&RunResult> {
        self.result.as_ref().ok_or(Error::NoResults)
    }
}

/// Replays recorded output without spawning a process
///
/// Used to validate stored payloads and to exercise the orchestrator in unit
/// tests.
#[derive(Debug, Clone)]
pub struct CannedFlexRunner {
    stdout: String,
    stderr: String,
    code: i32,
    result: Option<RunResult>,
}

impl CannedFlexRunner {
    pub fn new(stdout: impl Into<String>, stderr: impl Into<String>) -> Self {
        Self {
            stdout: stdout.into(),
            stderr: stderr.into(),
            code: 0,
            result: None,
        }
    }

    /// Pretend the process exited with the given code
    pub fn exit_code(mut self, code: i32) -> Self {
        self.code = code;
        self
    }
}

#[async_trait]
impl FlexRunner for CannedFlexRunner {
    async fn run(&mut self) -> Result<()> {
        let result = RunResult {
            stdout: self.stdout.clone(),
            stderr: self.stderr.clone(),
            raw_stdout: self.stdout.clone().into_bytes(),
            raw_stderr: self.stderr.clone().into_bytes(),
            success: self.code == 0,
            code: Some(self.code),
        };
        self.result = Some(result);

        if self.code != 0 {
            return Err(Error::ProcessExit {
                status: format!("exit status: {}", self.code),
                stderr: self.stderr.clone(),
            });
        }
        Ok(())
    }

    fn results(&self) -> Result<&RunResult> {
        self.result.as_ref().ok_or(Error::NoResults)
    }
}

//! Process-pipeline source
//!
//! Runs the recognizer, feeds its stdout to the JSON filter, and parses the
//! filter's stdout. Each process is bounded by the configured timeout and is
//! killed if the timeout expires or the request is dropped.

use async_trait::async_trait;
use muzak_common::config::{PipelineConfig, SourceKind};
use muzak_common::{normalize, Error, Limit, Record, Result};
use std::fmt;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, warn};

use super::DataSource;

/// Program name plus arguments
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
}

impl CommandSpec {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    /// Run to completion, optionally feeding `input` on stdin
    ///
    /// Returns captured stdout. Non-zero exit, spawn failure and timeout
    /// are all errors; the child never outlives this call.
    pub async fn run(&self, input: Option<Vec<u8>>, timeout: Duration) -> Result<Vec<u8>> {
        let mut command = Command::new(&self.program);
        command
            .args(&self.args)
            .stdin(if input.is_some() {
                Stdio::piped()
            } else {
                Stdio::null()
            })
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        debug!(command = %self, "Spawning upstream process");

        let mut child = command.spawn().map_err(|e| {
            Error::UpstreamProcess(format!("failed to start `{}`: {}", self, e))
        })?;

        let stdin = child.stdin.take();
        let feed = async move {
            if let (Some(mut stdin), Some(input)) = (stdin, input) {
                stdin.write_all(&input).await?;
                // stdin dropped here, closing the pipe
            }
            Ok::<(), std::io::Error>(())
        };

        // Stdin is written while stdout is drained so neither side can block
        // on a full pipe.
        let completion = async move { tokio::join!(feed, child.wait_with_output()) };

        let (fed, output) = match tokio::time::timeout(timeout, completion).await {
            Ok(result) => result,
            Err(_) => {
                warn!(command = %self, ?timeout, "Upstream process timed out");
                return Err(Error::UpstreamTimeout {
                    command: self.to_string(),
                    timeout,
                });
            }
        };

        let output = output.map_err(|e| {
            Error::UpstreamProcess(format!("failed to collect output of `{}`: {}", self, e))
        })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            warn!(command = %self, status = %output.status, "Upstream process failed");
            return Err(Error::UpstreamProcess(format!(
                "`{}` exited with {}: {}",
                self,
                output.status,
                stderr.trim()
            )));
        }

        // A filter that stops reading early is fine as long as it succeeded
        if let Err(e) = fed {
            if e.kind() != ErrorKind::BrokenPipe {
                return Err(Error::UpstreamProcess(format!(
                    "failed to write to `{}`: {}",
                    self, e
                )));
            }
        }

        Ok(output.stdout)
    }

    /// Resolve the program the way a shell would: paths as given, bare
    /// names through `PATH`
    pub fn locate(&self) -> Option<PathBuf> {
        let program = Path::new(&self.program);
        if program.components().count() > 1 {
            return program.is_file().then(|| program.to_path_buf());
        }

        let search = std::env::var_os("PATH")?;
        std::env::split_paths(&search)
            .map(|dir| dir.join(program))
            .find(|candidate| candidate.is_file())
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

/// Recognizer | filter pipeline
#[derive(Debug, Clone)]
pub struct PipelineSource {
    recognizer: CommandSpec,
    filter: CommandSpec,
    timeout: Duration,
}

impl PipelineSource {
    pub fn new(recognizer: CommandSpec, filter: CommandSpec, timeout: Duration) -> Self {
        Self {
            recognizer,
            filter,
            timeout,
        }
    }

    pub fn from_config(config: &PipelineConfig) -> Self {
        Self::new(
            CommandSpec::new(&config.recognizer, config.recognizer_args.clone()),
            CommandSpec::new(&config.filter, config.filter_args.clone()),
            config.timeout(),
        )
    }
}

/// Parse filter output into records
///
/// Empty (whitespace-only) output means "no detections".
pub fn parse_output(stdout: &[u8], producer: &CommandSpec) -> Result<Vec<Record>> {
    if stdout.iter().all(u8::is_ascii_whitespace) {
        return Ok(Vec::new());
    }

    let value: serde_json::Value = serde_json::from_slice(stdout).map_err(|e| {
        Error::UpstreamProcess(format!("`{}` produced invalid JSON: {}", producer, e))
    })?;

    Ok(normalize(value))
}

#[async_trait]
impl DataSource for PipelineSource {
    fn kind(&self) -> SourceKind {
        SourceKind::Pipeline
    }

    fn check_ready(&self) -> Result<()> {
        for command in [&self.recognizer, &self.filter] {
            if command.locate().is_none() {
                return Err(Error::UpstreamProcess(format!(
                    "`{}` not found",
                    command.program
                )));
            }
        }
        Ok(())
    }

    async fn fetch(&self, limit: Limit) -> Result<Vec<Record>> {
        let raw = self.recognizer.run(None, self.timeout).await?;
        let filtered = self.filter.run(Some(raw), self.timeout).await?;

        let mut records = parse_output(&filtered, &self.filter)?;
        // The tools have no notion of a limit, so it is applied here
        records.truncate(limit.as_usize());

        debug!(count = records.len(), %limit, "Fetched records from pipeline");
        Ok(records)
    }
}

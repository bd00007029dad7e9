//! Builder for invocations of the external transfer program
//!
//! Remote sources are fetched by an external program following the `go-getter` command line
//! convention (`<program> <source> <destination>`). This module wraps `tokio::process` with a
//! small builder that adds a timeout and debug logging with credentials redacted.

use anyhow::{Context, Result};
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tokio::time::timeout;

use super::credentials::redact;
use crate::constants::FETCH_TIMEOUT;

/// Builder for one run of the transfer program.
///
/// # Examples
///
/// ```rust,no_run
/// use inflator_cli::fetch::command_builder::FetchCommand;
/// use std::path::Path;
///
/// # async fn example() -> anyhow::Result<()> {
/// FetchCommand::transfer(
///     "go-getter",
///     "github.com/example/charts//nginx?ref=v1.2.0",
///     Path::new("/tmp/inflator-cache/nginx-v1.2.0"),
/// )
/// .execute()
/// .await?;
/// # Ok(())
/// # }
/// ```
///
/// Commands time out after [`FETCH_TIMEOUT`]. Both output streams are captured and logged at
/// debug level.
pub struct FetchCommand {
    program: String,
    args: Vec<String>,
    timeout_duration: Duration,
}

impl FetchCommand {
    /// Create a command running `program`.
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            timeout_duration: FETCH_TIMEOUT,
        }
    }

    /// Build the canonical `<program> <source> <destination>` transfer.
    pub fn transfer(program: impl Into<String>, source: &str, destination: &Path) -> Self {
        Self::new(program).arg(source).arg(destination.display().to_string())
    }

    /// Add a single argument.
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    fn display_line(&self) -> String {
        let args: Vec<String> = self.args.iter().map(|a| redact(a)).collect();
        format!("{} {}", self.program, args.join(" "))
    }

    /// Execute the command.
    ///
    /// A non-zero exit status, a spawn failure or a timeout is an error whose message
    /// carries the program's stderr (or stdout when stderr is empty).
    pub async fn execute(self) -> Result<()> {
        let start = std::time::Instant::now();
        let line = self.display_line();

        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args).stdout(Stdio::piped()).stderr(Stdio::piped()).kill_on_drop(true);

        tracing::debug!(target: "fetch", "Executing command: {}", line);

        let output = match timeout(self.timeout_duration, cmd.output()).await {
            Ok(result) => result.with_context(|| format!("Failed to execute {line}"))?,
            Err(_) => {
                let seconds = self.timeout_duration.as_secs();
                tracing::warn!(target: "fetch", "Command timed out after {} seconds: {}", seconds, line);
                anyhow::bail!(
                    "Transfer timed out after {} seconds. This may indicate network \
                     problems or an authentication prompt waiting for input: {}",
                    seconds,
                    line
                );
            }
        };

        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);

        if !output.status.success() {
            tracing::debug!(target: "fetch", "Command failed with exit code: {:?}", output.status.code());
            let detail = if stderr.trim().is_empty() {
                stdout.trim()
            } else {
                stderr.trim()
            };
            anyhow::bail!("{} exited with {}: {}", self.program, output.status, redact(detail));
        }

        if !stdout.trim().is_empty() {
            tracing::debug!(target: "fetch", "{}", redact(stdout.trim()));
        }
        if !stderr.trim().is_empty() {
            tracing::debug!(target: "fetch", "{}", redact(stderr.trim()));
        }

        let elapsed = start.elapsed();
        if elapsed.as_secs() > 1 {
            tracing::info!(target: "fetch::perf", "Transfer took {:.2}s", elapsed.as_secs_f64());
        }

        Ok(())
    }
}

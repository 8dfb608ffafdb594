//! Process execution layer.
//!
//! Every remote operation goes through a [`ProcessExecutor`]: a program name,
//! an argument vector, and [`ExecOptions`] (timeout, cancellation, working
//! directory) in; stdout, stderr and an exit code out. Arguments are passed
//! as literal argv elements, never through a local shell.
//!
//! [`SystemExecutor`] is the production implementation on top of
//! `tokio::process`. Tests substitute a recording double.
//!
//! # Examples
//!
//! ```no_run
//! use tether::shell::{ExecOptions, ProcessExecutor, SystemExecutor};
//!
//! # async fn example() -> tether::error::TetherResult<()> {
//! let executor = SystemExecutor::new();
//! let output = executor
//!     .exec("ssh", &["user@server".to_string(), "uname -a".to_string()], ExecOptions::default())
//!     .await?;
//! println!("{}", output.stdout);
//! # Ok(())
//! # }
//! ```

use async_trait::async_trait;
use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::error::{TetherError, TetherResult};

/// Configuration for the local platform shell.
///
/// Used by the local bash tool when no remote target is configured.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use]
pub struct ShellConfig {
    /// The shell executable (e.g., "sh" or "cmd.exe").
    pub command: String,
    /// Arguments to pass before the command string (e.g., ["-c"] or ["/C"]).
    pub args: Vec<String>,
}

#[cfg(unix)]
impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            command: "sh".to_string(),
            args: vec!["-c".to_string()],
        }
    }
}

#[cfg(windows)]
impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            command: "cmd.exe".to_string(),
            args: vec!["/C".to_string()],
        }
    }
}

impl ShellConfig {
    /// Returns the argv that runs `script` through this shell.
    #[must_use]
    pub fn argv(&self, script: &str) -> Vec<String> {
        let mut args = self.args.clone();
        args.push(script.to_string());
        args
    }
}

/// Options for a single process invocation.
#[derive(Debug, Clone, Default)]
pub struct ExecOptions {
    /// Kill the process after this long. `None` is unbounded.
    pub timeout: Option<Duration>,
    /// Cancellation signal from the caller.
    pub cancel: Option<CancellationToken>,
    /// Local working directory for the spawned process.
    pub cwd: Option<PathBuf>,
}

impl ExecOptions {
    /// Sets the timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the cancellation token.
    #[must_use]
    pub fn with_cancel(mut self, cancel: Option<CancellationToken>) -> Self {
        self.cancel = cancel;
        self
    }

    /// Sets the working directory.
    #[must_use]
    pub fn with_cwd(mut self, cwd: impl Into<PathBuf>) -> Self {
        self.cwd = Some(cwd.into());
        self
    }
}

/// Output from a process execution.
///
/// # Examples
///
/// ```
/// use tether::shell::ExecOutput;
///
/// let output = ExecOutput {
///     exit_code: 0,
///     stdout: "hello\n".to_string(),
///     stderr: String::new(),
///     stdout_lossy: false,
/// };
/// assert!(output.success());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecOutput {
    /// The exit code of the process (-1 when killed by a signal).
    pub exit_code: i32,
    /// Standard output captured from the process.
    pub stdout: String,
    /// Standard error captured from the process.
    pub stderr: String,
    /// Stdout was not valid UTF-8; invalid bytes became U+FFFD.
    pub stdout_lossy: bool,
}

impl ExecOutput {
    /// Returns `true` if the command exited successfully (exit code 0).
    #[must_use]
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }

    /// Returns stdout followed by stderr.
    #[must_use]
    pub fn combined(&self) -> String {
        match (self.stdout.is_empty(), self.stderr.is_empty()) {
            (_, true) => self.stdout.clone(),
            (true, false) => self.stderr.clone(),
            (false, false) => {
                let sep = if self.stdout.ends_with('\n') { "" } else { "\n" };
                format!("{}{}{}", self.stdout, sep, self.stderr)
            }
        }
    }
}

/// Host-provided process execution primitive.
#[async_trait]
pub trait ProcessExecutor: Send + Sync {
    /// Runs `program` with literal `args` and collects its output.
    ///
    /// # Errors
    ///
    /// Returns [`TetherError::Exec`] if the process cannot be spawned, times
    /// out, or is cancelled. A non-zero exit is *not* an error.
    async fn exec(
        &self,
        program: &str,
        args: &[String],
        options: ExecOptions,
    ) -> TetherResult<ExecOutput>;
}

/// Executes processes with `tokio::process`.
#[derive(Debug, Clone, Default)]
pub struct SystemExecutor;

impl SystemExecutor {
    /// Creates a new system executor.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ProcessExecutor for SystemExecutor {
    async fn exec(
        &self,
        program: &str,
        args: &[String],
        options: ExecOptions,
    ) -> TetherResult<ExecOutput> {
        debug!(program = %program, argc = args.len(), "Spawning process");

        let mut command = Command::new(program);
        command
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            // Dropping the wait future on timeout or cancel kills the child.
            .kill_on_drop(true);
        if let Some(cwd) = &options.cwd {
            command.current_dir(cwd);
        }

        let child = command
            .spawn()
            .map_err(|e| TetherError::exec(format!("Failed to start {program}: {e}")))?;

        let cancel = options.cancel.unwrap_or_default();
        let wait = child.wait_with_output();

        let output = tokio::select! {
            result = wait_with_timeout(wait, options.timeout) => result?,
            () = cancel.cancelled() => {
                warn!(program = %program, "Process cancelled");
                return Err(TetherError::exec("Command aborted"));
            }
        };

        let (stdout, stdout_lossy) = match String::from_utf8(output.stdout) {
            Ok(text) => (text, false),
            Err(e) => (String::from_utf8_lossy(e.as_bytes()).into_owned(), true),
        };
        Ok(ExecOutput {
            exit_code: output.status.code().unwrap_or(-1),
            stdout,
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            stdout_lossy,
        })
    }
}

async fn wait_with_timeout<F>(wait: F, timeout: Option<Duration>) -> TetherResult<std::process::Output>
where
    F: std::future::Future<Output = std::io::Result<std::process::Output>>,
{
    let result = match timeout {
        Some(limit) => match tokio::time::timeout(limit, wait).await {
            Ok(result) => result,
            Err(_) => {
                warn!(timeout_secs = limit.as_secs(), "Process timed out and was killed");
                return Err(TetherError::exec(format!(
                    "Command timed out after {}s",
                    limit.as_secs()
                )));
            }
        },
        None => wait.await,
    };
    result.map_err(|e| TetherError::exec(format!("Failed to collect process output: {e}")))
}

//! Common test utilities and fixtures for Tether.
//!
//! - [`RecordingExecutor`] - a `ProcessExecutor` double that records every
//!   invocation and replays queued outputs
//! - [`RecordingLocal`] - a `LocalToolProvider` double
//! - [`TestContext`] - temp directory plus helpers for wiring `RemoteTools`

#![allow(dead_code)]

use async_trait::async_trait;
use serde_json::Value;
use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use tether::error::{TetherError, TetherResult};
use tether::remote::RemoteState;
use tether::shell::{ExecOptions, ExecOutput, ProcessExecutor};
use tether::tools::{LocalToolProvider, RemoteTools, ToolKind};
use tether::types::config::RemoteTargetConfig;
use tether::types::content::ToolResult;

/// One recorded process invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCall {
    pub program: String,
    pub args: Vec<String>,
    pub timeout: Option<Duration>,
}

impl RecordedCall {
    /// The remote command line (last argument of an ssh invocation).
    pub fn command(&self) -> &str {
        self.args.last().map(String::as_str).unwrap_or_default()
    }
}

/// Records invocations and replays queued results in order.
///
/// When the queue is empty every call succeeds with empty output.
#[derive(Debug, Default)]
pub struct RecordingExecutor {
    calls: Mutex<Vec<RecordedCall>>,
    queue: Mutex<VecDeque<Result<ExecOutput, String>>>,
}

impl RecordingExecutor {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Queues a completed process with the given stdout and exit code.
    pub fn push_output(&self, stdout: &str, exit_code: i32) {
        self.push(Ok(ExecOutput {
            exit_code,
            stdout: stdout.to_string(),
            stderr: String::new(),
            stdout_lossy: false,
        }));
    }

    /// Queues a successful process whose stdout had undecodable bytes.
    pub fn push_lossy(&self, stdout: &str) {
        self.push(Ok(ExecOutput {
            exit_code: 0,
            stdout: stdout.to_string(),
            stderr: String::new(),
            stdout_lossy: true,
        }));
    }

    /// Queues a completed process that wrote to stderr.
    pub fn push_stderr(&self, stderr: &str, exit_code: i32) {
        self.push(Ok(ExecOutput {
            exit_code,
            stdout: String::new(),
            stderr: stderr.to_string(),
            stdout_lossy: false,
        }));
    }

    /// Queues an execution failure (spawn error, timeout, cancellation).
    pub fn push_error(&self, message: &str) {
        self.push(Err(message.to_string()));
    }

    fn push(&self, result: Result<ExecOutput, String>) {
        self.queue.lock().unwrap().push_back(result);
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Remote command lines of every recorded call.
    pub fn commands(&self) -> Vec<String> {
        self.calls().iter().map(|c| c.command().to_string()).collect()
    }
}

#[async_trait]
impl ProcessExecutor for RecordingExecutor {
    async fn exec(&self, program: &str, args: &[String], options: ExecOptions) -> TetherResult<ExecOutput> {
        self.calls.lock().unwrap().push(RecordedCall {
            program: program.to_string(),
            args: args.to_vec(),
            timeout: options.timeout,
        });
        // Lets concurrent callers interleave the way real processes do.
        tokio::task::yield_now().await;
        match self.queue.lock().unwrap().pop_front() {
            Some(Ok(output)) => Ok(output),
            Some(Err(message)) => Err(TetherError::exec(message)),
            None => Ok(ExecOutput::default()),
        }
    }
}

/// Local provider that answers `local <tool>` and records the calls.
#[derive(Debug, Default)]
pub struct RecordingLocal {
    calls: Mutex<Vec<(ToolKind, Value)>>,
}

impl RecordingLocal {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn calls(&self) -> Vec<(ToolKind, Value)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl LocalToolProvider for RecordingLocal {
    async fn execute(&self, kind: ToolKind, input: &Value, _cancel: Option<CancellationToken>) -> ToolResult {
        self.calls.lock().unwrap().push((kind, input.clone()));
        ToolResult::text(format!("local {kind}"))
    }
}

/// Test context providing common setup for integration tests.
pub struct TestContext {
    /// Temporary directory for test file operations.
    pub temp_dir: tempfile::TempDir,
    pub executor: Arc<RecordingExecutor>,
    pub local: Arc<RecordingLocal>,
}

impl TestContext {
    /// # Panics
    ///
    /// Panics if the temporary directory cannot be created.
    #[must_use]
    pub fn new() -> Self {
        Self {
            temp_dir: tempfile::tempdir().expect("failed to create temp dir"),
            executor: RecordingExecutor::new(),
            local: RecordingLocal::new(),
        }
    }

    #[must_use]
    pub fn path(&self) -> PathBuf {
        self.temp_dir.path().to_path_buf()
    }

    /// Dispatcher over `config` using the recording doubles.
    pub fn tools(&self, config: RemoteTargetConfig) -> RemoteTools {
        RemoteTools::new(
            RemoteState::with_config(config),
            self.executor.clone(),
            self.local.clone(),
        )
    }

    /// Dispatcher targeting `host` with no other settings.
    pub fn remote(&self, host: &str) -> RemoteTools {
        self.tools(RemoteTargetConfig::with_host(host))
    }
}

impl Default for TestContext {
    fn default() -> Self {
        Self::new()
    }
}

//! Tool adapters.
//!
//! Every tool the assistant sees (`bash`, `read`, `write`, `edit`, `grep`,
//! `find`, `ls`) goes through [`RemoteTools`]. When no host is configured the
//! call is handed to the injected [`LocalToolProvider`]; otherwise the adapter
//! for that tool builds a remote shell command and runs it over ssh, with the
//! result tagged `remote: true` and the host name.
//!
//! Adapters never fail the caller: every error becomes a [`ToolResult`] with
//! `isError` set.

pub mod bash;
pub mod definitions;
pub mod edit;
pub mod find;
pub mod grep;
pub mod local;
pub mod ls;
pub mod read;
pub mod render;
pub mod truncate;
pub mod write;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::error::{TetherError, TetherResult};
use crate::remote::{build_invocation, detect, Capabilities, RemoteState};
use crate::shell::{ExecOptions, ExecOutput, ProcessExecutor};
use crate::types::config::RemoteTargetConfig;
use crate::types::content::ToolResult;

pub use local::{LocalToolProvider, LocalTools};
pub use truncate::TruncationLimits;

/// The tools that can be redirected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolKind {
    Bash,
    Read,
    Write,
    Edit,
    Grep,
    Find,
    Ls,
}

impl ToolKind {
    /// All tool kinds in registration order.
    pub const ALL: [ToolKind; 7] = [
        ToolKind::Bash,
        ToolKind::Read,
        ToolKind::Write,
        ToolKind::Edit,
        ToolKind::Grep,
        ToolKind::Find,
        ToolKind::Ls,
    ];

    /// Returns the tool name as registered with the host.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Bash => "bash",
            Self::Read => "read",
            Self::Write => "write",
            Self::Edit => "edit",
            Self::Grep => "grep",
            Self::Find => "find",
            Self::Ls => "ls",
        }
    }

    /// Looks a tool up by its registered name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.name() == name)
    }
}

impl fmt::Display for ToolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A tool invocation from the host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    pub name: String,
    #[serde(default)]
    pub input: Value,
}

impl ToolCall {
    pub fn new(name: impl Into<String>, input: Value) -> Self {
        Self {
            name: name.into(),
            input,
        }
    }
}

/// Deserializes tool arguments into the adapter's input type.
pub(crate) fn parse_input<T: DeserializeOwned>(kind: ToolKind, input: &Value) -> TetherResult<T> {
    let input = if input.is_null() {
        Value::Object(serde_json::Map::new())
    } else {
        input.clone()
    };
    serde_json::from_value(input).map_err(|e| TetherError::invalid_input(kind.name(), e.to_string()))
}

/// Converts an adapter error into the error result shown to the assistant.
///
/// Domain errors (edit mismatches, failed remote reads) carry their own
/// phrasing; everything else is prefixed with `Error:`.
#[must_use]
pub fn error_result(err: &TetherError) -> ToolResult {
    match err {
        TetherError::EditNotFound { .. }
        | TetherError::EditAmbiguous { .. }
        | TetherError::RemoteFailure { .. } => ToolResult::error(err.to_string()),
        _ => ToolResult::error(format!("Error: {err}")),
    }
}

/// Everything one remote tool invocation needs.
///
/// Holds a config snapshot taken when the call started, so a concurrent
/// `/ssh` change does not alter a call already in flight.
pub struct RemoteContext<'a> {
    config: RemoteTargetConfig,
    host: String,
    state: &'a RemoteState,
    executor: &'a dyn ProcessExecutor,
    cancel: Option<CancellationToken>,
}

impl<'a> RemoteContext<'a> {
    /// Host the call runs against.
    #[must_use]
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Config snapshot for this call.
    #[must_use]
    pub fn config(&self) -> &RemoteTargetConfig {
        &self.config
    }

    /// Runs `command` on the remote host.
    ///
    /// `timeout` is the per-call override in seconds; without it the
    /// configured default applies.
    ///
    /// # Errors
    ///
    /// Returns an error if the ssh command line cannot be built or the
    /// process fails to start, times out, or is cancelled.
    pub async fn run(&self, command: &str, timeout: Option<u64>) -> TetherResult<ExecOutput> {
        let invocation = build_invocation(&self.config, command)?;
        debug!(
            host = %self.host,
            program = %invocation.program,
            command = %invocation.remote_command(),
            "Running remote command"
        );
        let options = ExecOptions::default()
            .with_timeout(self.config.effective_timeout(timeout))
            .with_cancel(self.cancel.clone());
        self.executor
            .exec(&invocation.program, &invocation.args, options)
            .await
    }

    /// Returns the host's `rg`/`fd` availability, probing on first use.
    pub async fn capabilities(&self) -> Capabilities {
        detect(self.state, self.executor, self.cancel.clone()).await
    }
}

/// Dispatches tool calls to the remote host or the local provider.
#[derive(Clone)]
pub struct RemoteTools {
    state: RemoteState,
    executor: Arc<dyn ProcessExecutor>,
    local: Arc<dyn LocalToolProvider>,
    limits: TruncationLimits,
}

impl fmt::Debug for RemoteTools {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RemoteTools")
            .field("state", &self.state)
            .field("limits", &self.limits)
            .finish_non_exhaustive()
    }
}

impl RemoteTools {
    pub fn new(
        state: RemoteState,
        executor: Arc<dyn ProcessExecutor>,
        local: Arc<dyn LocalToolProvider>,
    ) -> Self {
        Self {
            state,
            executor,
            local,
            limits: TruncationLimits::default(),
        }
    }

    #[must_use]
    pub fn with_limits(mut self, limits: TruncationLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Shared state handle.
    #[must_use]
    pub fn state(&self) -> &RemoteState {
        &self.state
    }

    /// Executes a tool call by name.
    pub async fn execute(&self, call: &ToolCall, cancel: Option<CancellationToken>) -> ToolResult {
        match ToolKind::from_name(&call.name) {
            Some(kind) => self.execute_kind(kind, &call.input, cancel).await,
            None => ToolResult::error(format!("Error: Unknown tool: {}", call.name)),
        }
    }

    /// Executes one tool, remotely when a host is configured.
    pub async fn execute_kind(
        &self,
        kind: ToolKind,
        input: &Value,
        cancel: Option<CancellationToken>,
    ) -> ToolResult {
        let config = self.state.snapshot().await;
        let Some(host) = config.host.clone().filter(|h| !h.is_empty()) else {
            debug!(tool = %kind, "No SSH host configured, running locally");
            return self.local.execute(kind, input, cancel).await.with_origin(None);
        };

        let ctx = RemoteContext {
            config,
            host,
            state: &self.state,
            executor: self.executor.as_ref(),
            cancel,
        };

        let outcome = match kind {
            ToolKind::Bash => bash::execute_remote(&ctx, input, self.limits).await,
            ToolKind::Read => read::execute_remote(&ctx, input, self.limits).await,
            ToolKind::Write => write::execute_remote(&ctx, input).await,
            ToolKind::Edit => edit::execute_remote(&ctx, input).await,
            ToolKind::Grep => grep::execute_remote(&ctx, input, self.limits).await,
            ToolKind::Find => find::execute_remote(&ctx, input, self.limits).await,
            ToolKind::Ls => ls::execute_remote(&ctx, input, self.limits).await,
        };

        let result = outcome.unwrap_or_else(|err| {
            warn!(tool = %kind, host = %ctx.host, error = %err, "Remote tool failed");
            error_result(&err)
        });
        result.with_origin(Some(&ctx.host))
    }
}

/// Adds `probeError` to a search result when the capability probe failed.
pub(crate) fn with_probe_error(result: ToolResult, caps: &Capabilities) -> ToolResult {
    match &caps.probe_error {
        Some(err) => result.with_detail("probeError", Value::String(err.clone())),
        None => result,
    }
}

/// Appends a limit notice when `count` reached `limit`.
pub(crate) fn limit_notice(text: &mut String, count: usize, limit: usize, noun: &str) {
    if count >= limit {
        text.push_str(&format!(
            "\n\n[{limit} {noun} limit reached. Use limit={} for more, or refine the pattern]",
            limit * 2
        ));
    }
}

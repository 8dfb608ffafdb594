//! Remote tool capability probing.
//!
//! Search and find prefer `rg` and `fd` when the remote host has them. The
//! probe runs once per host: a single remote command checks for both tools
//! and prints one marker line per tool found. The result is cached in
//! [`RemoteState`] until the host changes.
//!
//! A failed probe never blocks the caller. It caches "no enhanced tools" so
//! the adapters fall back to `grep`/`find`, and reports the failure in
//! [`Capabilities::probe_error`] so it is still visible in the tool result.

use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use super::command::build_invocation;
use super::state::RemoteState;
use crate::shell::{ExecOptions, ProcessExecutor};

const RG_MARKER: &str = "HAS_RG";
const FD_MARKER: &str = "HAS_FD";

/// Remote command that prints a marker line for each available tool.
pub const PROBE_COMMAND: &str = "command -v rg >/dev/null 2>&1 && echo HAS_RG; \
                                 command -v fd >/dev/null 2>&1 && echo HAS_FD; true";

/// Memoized probe result for one host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteToolsCache {
    /// Host the probe ran against.
    pub host: String,
    /// `rg` is available.
    pub has_rg: bool,
    /// `fd` is available.
    pub has_fd: bool,
}

impl RemoteToolsCache {
    /// Creates a cache entry.
    #[must_use]
    pub fn new(host: impl Into<String>, has_rg: bool, has_fd: bool) -> Self {
        Self {
            host: host.into(),
            has_rg,
            has_fd,
        }
    }
}

/// What the adapters need to know about the remote host.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Capabilities {
    /// Use `rg` for content search.
    pub has_rg: bool,
    /// Use `fd` for name search.
    pub has_fd: bool,
    /// Why the probe failed, when it ran and failed.
    pub probe_error: Option<String>,
}

impl From<&RemoteToolsCache> for Capabilities {
    fn from(cache: &RemoteToolsCache) -> Self {
        Self {
            has_rg: cache.has_rg,
            has_fd: cache.has_fd,
            probe_error: None,
        }
    }
}

/// Parses probe stdout into `(has_rg, has_fd)`.
#[must_use]
pub fn parse_probe_output(stdout: &str) -> (bool, bool) {
    let mut has_rg = false;
    let mut has_fd = false;
    for line in stdout.lines().map(str::trim) {
        match line {
            RG_MARKER => has_rg = true,
            FD_MARKER => has_fd = true,
            _ => {}
        }
    }
    (has_rg, has_fd)
}

/// Detects enhanced search tools on the configured host.
///
/// Returns all-false without executing anything when no host is configured,
/// and the cached value when the current host was already probed.
pub async fn detect(
    state: &RemoteState,
    executor: &dyn ProcessExecutor,
    cancel: Option<CancellationToken>,
) -> Capabilities {
    let (host, cached) = state.cached_capabilities().await;
    let Some(host) = host else {
        return Capabilities::default();
    };
    if let Some(cache) = cached {
        debug!(host = %host, "Capability cache hit");
        return Capabilities::from(&cache);
    }

    // Concurrent callers wait here and reuse the first probe's result.
    let _detecting = state.lock_detection().await;
    let (host, cached) = state.cached_capabilities().await;
    let Some(host) = host else {
        return Capabilities::default();
    };
    if let Some(cache) = cached {
        debug!(host = %host, "Capability probed by a concurrent call");
        return Capabilities::from(&cache);
    }

    let config = state.snapshot().await;
    let outcome = match build_invocation(&config, PROBE_COMMAND) {
        Ok(invocation) => executor
            .exec(
                &invocation.program,
                &invocation.args,
                ExecOptions::default()
                    .with_timeout(config.default_timeout())
                    .with_cancel(cancel),
            )
            .await
            .map_err(|e| e.to_string())
            .and_then(|output| {
                if output.success() {
                    Ok(parse_probe_output(&output.stdout))
                } else {
                    Err(format!(
                        "probe exited with code {}: {}",
                        output.exit_code,
                        output.stderr.trim()
                    ))
                }
            }),
        Err(e) => Err(e.to_string()),
    };

    let (has_rg, has_fd, probe_error) = match outcome {
        Ok((rg, fd)) => {
            debug!(host = %host, has_rg = rg, has_fd = fd, "Probed remote tools");
            (rg, fd, None)
        }
        Err(message) => {
            warn!(host = %host, error = %message, "Remote tool probe failed, using fallbacks");
            (false, false, Some(message))
        }
    };

    state
        .store_capabilities(RemoteToolsCache::new(host, has_rg, has_fd))
        .await;

    Capabilities {
        has_rg,
        has_fd,
        probe_error,
    }
}

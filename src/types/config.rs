//! Configuration types for Tether.
//!
//! [`RemoteTargetConfig`] is the active remote-execution target. It is the
//! unit that gets persisted to the session log, so its serialized field names
//! are stable (`remoteCwd` in particular).
//!
//! [`LaunchOptions`] carries the values derived from CLI flags at startup.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::{TetherError, TetherResult};

/// The currently configured remote target.
///
/// All fields are optional: an empty config means every tool runs locally.
///
/// # Examples
///
/// ```
/// use tether::types::config::RemoteTargetConfig;
///
/// let config = RemoteTargetConfig::with_host("user@server");
/// assert!(config.is_remote());
/// assert_eq!(config.port, None);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteTargetConfig {
    /// `user@hostname`, or `None` when remote execution is disabled.
    #[serde(default)]
    pub host: Option<String>,

    /// SSH port. `None` uses the client's default.
    #[serde(default)]
    pub port: Option<u16>,

    /// Override for the ssh invocation (e.g. a bastion-aware wrapper).
    #[serde(default)]
    pub command: Option<String>,

    /// Directory to `cd` into before every remote command.
    #[serde(default)]
    pub remote_cwd: Option<String>,

    /// Default per-command timeout in seconds.
    #[serde(default)]
    pub timeout: Option<u64>,
}

impl RemoteTargetConfig {
    /// Creates a config targeting `host` with every other field unset.
    #[must_use]
    pub fn with_host(host: impl Into<String>) -> Self {
        Self {
            host: Some(host.into()),
            ..Self::default()
        }
    }

    /// Returns `true` when a remote host is configured.
    #[must_use]
    pub fn is_remote(&self) -> bool {
        self.host.as_deref().is_some_and(|h| !h.is_empty())
    }

    /// Returns the configured default timeout as a `Duration`.
    #[must_use]
    pub fn default_timeout(&self) -> Option<Duration> {
        self.timeout.map(Duration::from_secs)
    }

    /// Resolves the timeout for a single call.
    ///
    /// An explicit per-call timeout wins over the configured default; with
    /// neither, the call is unbounded.
    #[must_use]
    pub fn effective_timeout(&self, per_call_secs: Option<u64>) -> Option<Duration> {
        per_call_secs
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
            .or_else(|| self.default_timeout())
    }
}

/// Parses and validates a port argument.
///
/// # Errors
///
/// Returns [`TetherError::InvalidPort`] for non-numeric values and values
/// outside 1-65535.
pub fn parse_port(value: &str) -> TetherResult<u16> {
    let trimmed = value.trim();
    match trimmed.parse::<u32>() {
        Ok(port) if (1..=65535).contains(&port) => Ok(port as u16),
        _ => Err(TetherError::invalid_port(trimmed)),
    }
}

/// Parses and validates a timeout argument in seconds.
///
/// # Errors
///
/// Returns [`TetherError::InvalidTimeout`] unless the value is a positive
/// integer.
pub fn parse_timeout(value: &str) -> TetherResult<u64> {
    let trimmed = value.trim();
    match trimmed.parse::<u64>() {
        Ok(secs) if secs > 0 => Ok(secs),
        _ => Err(TetherError::invalid_timeout(trimmed)),
    }
}

/// Rejects a host that ssh would read as an option.
///
/// # Errors
///
/// Returns [`TetherError::InvalidHost`] when `host` starts with `-`.
///
/// # Examples
///
/// ```
/// use tether::types::config::validate_host;
///
/// assert!(validate_host("dev@box").is_ok());
/// assert!(validate_host("-oProxyCommand=touch /tmp/x").is_err());
/// ```
pub fn validate_host(host: &str) -> TetherResult<&str> {
    if host.starts_with('-') {
        return Err(TetherError::invalid_host(host));
    }
    Ok(host)
}

/// Startup options derived from CLI flags.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LaunchOptions {
    /// `--ssh` host.
    pub host: Option<String>,
    /// `--ssh-cwd`.
    pub remote_cwd: Option<String>,
    /// `--ssh-port`.
    pub port: Option<u16>,
    /// `--ssh-command`.
    pub command: Option<String>,
    /// `--ssh-timeout`.
    pub timeout: Option<u64>,
    /// `--ssh-no-mount`: skip the sshfs auto-mount.
    pub no_mount: bool,
    /// `--ssh-strict-host-key`: do not auto-accept new host keys when mounting.
    pub strict_host_key: bool,
}

impl LaunchOptions {
    /// Builds the config implied by the CLI flags, if a host was given.
    #[must_use]
    pub fn cli_config(&self) -> Option<RemoteTargetConfig> {
        let host = self.host.as_deref().filter(|h| !h.is_empty())?;
        Some(RemoteTargetConfig {
            host: Some(host.to_string()),
            port: self.port,
            command: self.command.clone(),
            remote_cwd: self.remote_cwd.clone(),
            timeout: self.timeout,
        })
    }
}

//! Shared remote-target state.
//!
//! [`RemoteState`] owns the active [`RemoteTargetConfig`] and the capability
//! cache behind a single async mutex. It is created by the extension entry
//! point and cloned into every adapter, so configuration changes and tool
//! executions never race on half-updated state.
//!
//! The state lock is never held across a remote call. A separate detection
//! lock serializes capability checks so each host is probed once.

use std::sync::Arc;
use tokio::sync::{Mutex, MutexGuard};
use tracing::{info, warn};

use super::capabilities::RemoteToolsCache;
use crate::error::TetherResult;
use crate::session::{SessionEntry, SessionLog};
use crate::types::config::{validate_host, RemoteTargetConfig};

/// Custom entry type under which config snapshots are persisted.
pub const CONFIG_ENTRY_TYPE: &str = "ssh-config";

#[derive(Debug, Default)]
struct Inner {
    config: RemoteTargetConfig,
    cache: Option<RemoteToolsCache>,
}

/// Cloneable handle to the shared remote state.
#[derive(Debug, Clone, Default)]
pub struct RemoteState {
    inner: Arc<Mutex<Inner>>,
    detecting: Arc<Mutex<()>>,
}

impl RemoteState {
    /// Creates an empty state (all fields unset).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a state pre-populated with `config`.
    #[must_use]
    pub fn with_config(config: RemoteTargetConfig) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner {
                config,
                cache: None,
            })),
            detecting: Arc::default(),
        }
    }

    /// Returns a copy of the current config.
    pub async fn snapshot(&self) -> RemoteTargetConfig {
        self.inner.lock().await.config.clone()
    }

    /// Returns the configured host.
    pub async fn host(&self) -> Option<String> {
        self.inner.lock().await.config.host.clone()
    }

    /// Returns the configured port.
    pub async fn port(&self) -> Option<u16> {
        self.inner.lock().await.config.port
    }

    /// Returns the configured custom ssh command.
    pub async fn command(&self) -> Option<String> {
        self.inner.lock().await.config.command.clone()
    }

    /// Returns the configured remote working directory.
    pub async fn remote_cwd(&self) -> Option<String> {
        self.inner.lock().await.config.remote_cwd.clone()
    }

    /// Returns the configured default timeout in seconds.
    pub async fn timeout(&self) -> Option<u64> {
        self.inner.lock().await.config.timeout
    }

    /// Sets the host. Any host change discards the capability cache.
    pub async fn set_host(&self, host: Option<String>) {
        let mut inner = self.inner.lock().await;
        inner.config.host = host.filter(|h| !h.is_empty());
        inner.cache = None;
    }

    /// Sets the port.
    pub async fn set_port(&self, port: Option<u16>) {
        self.inner.lock().await.config.port = port;
    }

    /// Sets the custom ssh command.
    pub async fn set_command(&self, command: Option<String>) {
        self.inner.lock().await.config.command = command.filter(|c| !c.trim().is_empty());
    }

    /// Sets the remote working directory.
    pub async fn set_remote_cwd(&self, cwd: Option<String>) {
        self.inner.lock().await.config.remote_cwd = cwd.filter(|c| !c.is_empty());
    }

    /// Sets the default timeout.
    pub async fn set_timeout(&self, timeout: Option<u64>) {
        self.inner.lock().await.config.timeout = timeout;
    }

    /// Replaces the whole config, clearing the cache.
    pub async fn replace(&self, config: RemoteTargetConfig) {
        let mut inner = self.inner.lock().await;
        inner.config = config;
        inner.cache = None;
    }

    /// Resets every field to unset.
    pub async fn clear(&self) {
        self.replace(RemoteTargetConfig::default()).await;
    }

    /// Returns the cached capabilities if they belong to the current host.
    pub(crate) async fn cached_capabilities(&self) -> (Option<String>, Option<RemoteToolsCache>) {
        let inner = self.inner.lock().await;
        let host = inner.config.host.clone();
        let cache = inner
            .cache
            .clone()
            .filter(|c| Some(c.host.as_str()) == host.as_deref());
        (host, cache)
    }

    /// Waits for any in-flight capability probe on this state.
    pub(crate) async fn lock_detection(&self) -> MutexGuard<'_, ()> {
        self.detecting.lock().await
    }

    /// Stores a probe result unless the host changed while probing.
    pub(crate) async fn store_capabilities(&self, cache: RemoteToolsCache) -> bool {
        let mut inner = self.inner.lock().await;
        if inner.config.host.as_deref() == Some(cache.host.as_str()) {
            inner.cache = Some(cache);
            true
        } else {
            false
        }
    }

    /// Appends a snapshot of the current config to the session log.
    ///
    /// # Errors
    ///
    /// Returns an error if the log cannot be written.
    pub async fn persist(&self, log: &dyn SessionLog) -> TetherResult<()> {
        let config = self.snapshot().await;
        let data = serde_json::to_value(&config)?;
        log.append(SessionEntry::custom(CONFIG_ENTRY_TYPE, data)).await?;
        info!(host = ?config.host, "Persisted SSH config");
        Ok(())
    }

    /// Adopts the most recent config snapshot found in `entries`.
    ///
    /// Returns `true` if a snapshot was found.
    pub async fn restore_from_branch(&self, entries: &[SessionEntry]) -> bool {
        let Some(config) = latest_snapshot(entries) else {
            return false;
        };
        info!(host = ?config.host, "Restored SSH config from session");
        self.replace(config).await;
        true
    }

    /// Renders the status line, or `None` when no host is configured.
    pub async fn render_status_line(&self) -> Option<String> {
        render_status_line(&self.snapshot().await)
    }
}

/// Finds the last parsable config snapshot in session order.
fn latest_snapshot(entries: &[SessionEntry]) -> Option<RemoteTargetConfig> {
    entries
        .iter()
        .rev()
        .filter(|e| e.is_custom(CONFIG_ENTRY_TYPE))
        .find_map(|e| match serde_json::from_value::<RemoteTargetConfig>(e.data.clone()) {
            Ok(config) => Some(sanitize(config)),
            Err(err) => {
                warn!(error = %err, "Skipping unreadable SSH config entry");
                None
            }
        })
}

/// Drops restored fields that `/ssh` would have refused.
fn sanitize(mut config: RemoteTargetConfig) -> RemoteTargetConfig {
    if config.port == Some(0) {
        warn!("Ignoring restored SSH port 0");
        config.port = None;
    }
    if config.timeout == Some(0) {
        warn!("Ignoring restored SSH timeout 0");
        config.timeout = None;
    }
    if let Some(host) = config.host.as_deref() {
        if let Err(e) = validate_host(host) {
            warn!(error = %e, "Ignoring restored SSH host");
            config.host = None;
        }
    }
    config
}

/// Renders a one-line summary of `config`.
///
/// # Examples
///
/// ```
/// use tether::remote::state::render_status_line;
/// use tether::types::config::RemoteTargetConfig;
///
/// let mut config = RemoteTargetConfig::with_host("user@server");
/// config.port = Some(2222);
/// config.remote_cwd = Some("/srv/app".to_string());
/// assert_eq!(
///     render_status_line(&config).as_deref(),
///     Some("SSH: user@server:2222 [/srv/app]")
/// );
/// ```
#[must_use]
pub fn render_status_line(config: &RemoteTargetConfig) -> Option<String> {
    let host = config.host.as_deref().filter(|h| !h.is_empty())?;
    let mut line = format!("SSH: {host}");
    if let Some(port) = config.port {
        line.push_str(&format!(":{port}"));
    }
    if let Some(cwd) = &config.remote_cwd {
        line.push_str(&format!(" [{cwd}]"));
    }
    if let Some(command) = &config.command {
        line.push_str(&format!(" (cmd: {command})"));
    }
    if let Some(timeout) = config.timeout {
        line.push_str(&format!(" timeout {timeout}s"));
    }
    Some(line)
}

/// Renders the multi-line description shown by `/ssh` with no arguments.
#[must_use]
pub fn describe_config(config: &RemoteTargetConfig) -> String {
    let Some(host) = config.host.as_deref() else {
        return "SSH: disabled (all tools run locally)".to_string();
    };
    let unset = || "(default)".to_string();
    [
        format!("Host: {host}"),
        format!("Port: {}", config.port.map_or_else(unset, |p| p.to_string())),
        format!("Remote cwd: {}", config.remote_cwd.clone().unwrap_or_else(unset)),
        format!("Command: {}", config.command.clone().unwrap_or_else(unset)),
        format!(
            "Timeout: {}",
            config.timeout.map_or_else(|| "(none)".to_string(), |t| format!("{t}s"))
        ),
    ]
    .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::MemorySessionLog;
    use serde_json::json;

    #[tokio::test]
    async fn test_set_host_clears_cache() {
        let state = RemoteState::with_config(RemoteTargetConfig::with_host("a"));
        assert!(state.store_capabilities(RemoteToolsCache::new("a", true, true)).await);
        assert!(state.cached_capabilities().await.1.is_some());

        state.set_host(Some("b".to_string())).await;
        assert!(state.cached_capabilities().await.1.is_none());
    }

    #[tokio::test]
    async fn test_store_rejects_stale_host() {
        let state = RemoteState::with_config(RemoteTargetConfig::with_host("a"));
        assert!(!state.store_capabilities(RemoteToolsCache::new("b", true, false)).await);
    }

    #[tokio::test]
    async fn test_persist_then_restore() {
        let log = MemorySessionLog::new();
        let state = RemoteState::with_config(RemoteTargetConfig {
            port: Some(2200),
            ..RemoteTargetConfig::with_host("user@box")
        });
        state.persist(&log).await.unwrap();

        let restored = RemoteState::new();
        assert!(restored.restore_from_branch(&log.entries().await.unwrap()).await);
        assert_eq!(restored.port().await, Some(2200));
        assert_eq!(restored.host().await.as_deref(), Some("user@box"));
    }

    #[tokio::test]
    async fn test_restore_uses_last_snapshot() {
        let entries = vec![
            SessionEntry::custom(CONFIG_ENTRY_TYPE, json!({"host": "first"})),
            SessionEntry::custom("other", json!({"host": "ignored"})),
            SessionEntry::custom(CONFIG_ENTRY_TYPE, json!({"host": "second", "remoteCwd": "/w"})),
        ];
        let state = RemoteState::new();
        assert!(state.restore_from_branch(&entries).await);
        assert_eq!(state.host().await.as_deref(), Some("second"));
        assert_eq!(state.remote_cwd().await.as_deref(), Some("/w"));
    }

    #[tokio::test]
    async fn test_restore_without_snapshot() {
        let state = RemoteState::new();
        assert!(!state.restore_from_branch(&[]).await);
        assert!(state.host().await.is_none());
    }

    #[test]
    fn test_status_line_none_without_host() {
        assert!(render_status_line(&RemoteTargetConfig::default()).is_none());
    }

    #[test]
    fn test_status_line_all_fields() {
        let config = RemoteTargetConfig {
            host: Some("h".to_string()),
            port: Some(22),
            command: Some("tsh ssh".to_string()),
            remote_cwd: Some("/w".to_string()),
            timeout: Some(30),
        };
        assert_eq!(
            render_status_line(&config).unwrap(),
            "SSH: h:22 [/w] (cmd: tsh ssh) timeout 30s"
        );
    }

    #[test]
    fn test_describe_disabled() {
        assert!(describe_config(&RemoteTargetConfig::default()).contains("disabled"));
    }
}

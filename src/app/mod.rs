//! Extension entry point.
//!
//! [`Tether`] owns the shared [`RemoteState`] and wires it into the tool
//! dispatcher, the `/ssh` command and the mount lifecycle. A host drives it
//! through four calls: [`Tether::start_session`], [`Tether::execute_tool`],
//! [`Tether::handle_command`] and [`Tether::shutdown`].

pub mod protocol;

use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::commands::{apply_ssh_command, parse_ssh_command, split_slash_command, Notification, SSH_COMMAND};
use crate::mount::MountManager;
use crate::remote::RemoteState;
use crate::session::SessionLog;
use crate::shell::ProcessExecutor;
use crate::tools::definitions::{definitions, ToolDefinition};
use crate::tools::{LocalToolProvider, RemoteTools, ToolCall};
use crate::types::config::LaunchOptions;
use crate::types::content::ToolResult;

/// What the host should show after a lifecycle event or command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HostUpdate {
    pub notifications: Vec<Notification>,
    /// Current status line; `None` clears it.
    pub status_line: Option<String>,
}

/// The SSH tool-redirection extension.
pub struct Tether {
    options: LaunchOptions,
    state: RemoteState,
    tools: RemoteTools,
    session: Arc<dyn SessionLog>,
    mount: Option<MountManager>,
}

impl std::fmt::Debug for Tether {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Tether")
            .field("options", &self.options)
            .field("state", &self.state)
            .field("mount", &self.mount)
            .finish_non_exhaustive()
    }
}

impl Tether {
    /// Creates the extension. Mounting is enabled unless `--ssh-no-mount`
    /// was given.
    pub fn new(
        options: LaunchOptions,
        executor: Arc<dyn ProcessExecutor>,
        local: Arc<dyn LocalToolProvider>,
        session: Arc<dyn SessionLog>,
    ) -> Self {
        let state = RemoteState::new();
        let mount = (!options.no_mount)
            .then(|| MountManager::new(Arc::clone(&executor), options.strict_host_key));
        Self {
            tools: RemoteTools::new(state.clone(), executor, local),
            options,
            state,
            session,
            mount,
        }
    }

    /// Replaces the mount manager (or disables mounting with `None`).
    #[must_use]
    pub fn with_mount_manager(mut self, mount: Option<MountManager>) -> Self {
        self.mount = mount;
        self
    }

    #[must_use]
    pub fn state(&self) -> &RemoteState {
        &self.state
    }

    #[must_use]
    pub fn tools(&self) -> &RemoteTools {
        &self.tools
    }

    /// Definitions of the tools this extension overrides.
    #[must_use]
    pub fn tool_definitions(&self) -> Vec<ToolDefinition> {
        definitions()
    }

    /// Establishes the initial target.
    ///
    /// A host given on the command line wins and is persisted. Without one,
    /// the last snapshot on the session branch is restored and a command-line
    /// timeout still applies on top of it. With a host and mounting enabled,
    /// the remote directory is then mounted.
    pub async fn start_session(&self) -> HostUpdate {
        let mut update = HostUpdate::default();

        if let Some(config) = self.options.cli_config() {
            info!(host = ?config.host, "Using SSH target from command line");
            self.state.replace(config).await;
            self.persist(&mut update).await;
        } else {
            let entries = match self.session.entries().await {
                Ok(entries) => entries,
                Err(e) => {
                    warn!(error = %e, "Failed to read session log");
                    update
                        .notifications
                        .push(Notification::warning(format!("Could not read session: {e}")));
                    Vec::new()
                }
            };
            let restored = self.state.restore_from_branch(&entries).await;
            if let Some(timeout) = self.options.timeout {
                self.state.set_timeout(Some(timeout)).await;
                self.persist(&mut update).await;
            }
            if restored {
                if let Some(host) = self.state.host().await {
                    update
                        .notifications
                        .push(Notification::info(format!("Restored SSH target: {host}")));
                }
            }
        }

        let config = self.state.snapshot().await;
        if let (Some(mount), true) = (&self.mount, config.is_remote()) {
            match mount.mount(&config).await {
                Ok(path) => update.notifications.push(Notification::info(format!(
                    "Mounted {} at {}",
                    config.host.as_deref().unwrap_or_default(),
                    path.display()
                ))),
                Err(e) => {
                    warn!(error = %e, "sshfs mount failed");
                    update
                        .notifications
                        .push(Notification::warning(format!("sshfs mount failed: {e}")));
                }
            }
        }

        update.status_line = self.state.render_status_line().await;
        update
    }

    /// Runs a tool call. Never fails: errors become error results.
    pub async fn execute_tool(&self, call: &ToolCall, cancel: Option<CancellationToken>) -> ToolResult {
        self.tools.execute(call, cancel).await
    }

    /// Handles a slash command such as `/ssh port 2222`.
    pub async fn handle_command(&self, text: &str) -> HostUpdate {
        let mut update = HostUpdate::default();

        match split_slash_command(text) {
            Some((SSH_COMMAND, args)) => match parse_ssh_command(args) {
                Ok(command) => {
                    let reply = apply_ssh_command(command, &self.state).await;
                    update.notifications.push(reply.notification);
                    if reply.changed {
                        self.persist(&mut update).await;
                    }
                }
                Err(e) => update.notifications.push(Notification::error(e.to_string())),
            },
            Some((name, _)) => update
                .notifications
                .push(Notification::error(format!("Unknown command: /{name}"))),
            None => update
                .notifications
                .push(Notification::error(format!("Not a command: {text}"))),
        }

        update.status_line = self.state.render_status_line().await;
        update
    }

    /// Tears down the mount, restoring the original working directory.
    ///
    /// Safe to call more than once.
    pub async fn shutdown(&self) -> HostUpdate {
        let mut update = HostUpdate::default();
        if let Some(mount) = &self.mount {
            match mount.unmount().await {
                Ok(true) => update.notifications.push(Notification::info("Unmounted remote directory")),
                Ok(false) => {}
                Err(e) => {
                    warn!(error = %e, "Unmount failed");
                    update.notifications.push(Notification::warning(e.to_string()));
                }
            }
        }
        update
    }

    async fn persist(&self, update: &mut HostUpdate) {
        if let Err(e) = self.state.persist(self.session.as_ref()).await {
            warn!(error = %e, "Failed to persist SSH config");
            update
                .notifications
                .push(Notification::warning(format!("Could not save SSH config: {e}")));
        }
    }
}

//! sshfs auto-mount.
//!
//! When a host is configured at startup the remote working directory is
//! mounted with `sshfs` on a fresh temporary directory and the process
//! changes into it, so host features that read files directly see the remote
//! tree. Teardown restores the previous directory first, then unmounts with
//! the platform's command, falling back to plain `umount`.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::{TetherError, TetherResult};
use crate::shell::{ExecOptions, ProcessExecutor};
use crate::types::config::{validate_host, RemoteTargetConfig};

/// How long sshfs may take to establish the mount.
const MOUNT_TIMEOUT: Duration = Duration::from_secs(30);

/// One way of unmounting a FUSE mount.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnmountStrategy {
    /// Platform identifier as in `std::env::consts::OS`.
    pub platform: &'static str,
    pub program: &'static str,
    pub args: &'static [&'static str],
}

/// Platform-specific unmount commands.
pub const UNMOUNT_STRATEGIES: &[UnmountStrategy] = &[
    UnmountStrategy {
        platform: "macos",
        program: "umount",
        args: &[],
    },
    UnmountStrategy {
        platform: "linux",
        program: "fusermount",
        args: &["-u"],
    },
];

/// Used when the platform has no entry or its command fails.
pub const FALLBACK_UNMOUNT: UnmountStrategy = UnmountStrategy {
    platform: "*",
    program: "umount",
    args: &[],
};

/// Returns the strategies to try for `platform`, in order.
#[must_use]
pub fn unmount_plan(platform: &str) -> Vec<UnmountStrategy> {
    let mut plan: Vec<UnmountStrategy> = UNMOUNT_STRATEGIES
        .iter()
        .filter(|s| s.platform == platform)
        .copied()
        .collect();
    if !plan.iter().any(|s| s.program == FALLBACK_UNMOUNT.program && s.args.is_empty()) {
        plan.push(FALLBACK_UNMOUNT);
    }
    plan
}

/// Builds the sshfs argv (without the program name).
///
/// # Errors
///
/// Returns an error if no host is configured.
pub fn build_sshfs_args(
    config: &RemoteTargetConfig,
    mount_point: &Path,
    strict_host_key: bool,
) -> TetherResult<Vec<String>> {
    let host = config
        .host
        .as_deref()
        .filter(|h| !h.is_empty())
        .ok_or_else(|| TetherError::mount("no SSH host configured"))?;
    let host = validate_host(host)?;

    let mut options = vec!["reconnect".to_string(), "ServerAliveInterval=15".to_string()];
    if !strict_host_key {
        options.push("StrictHostKeyChecking=accept-new".to_string());
    }

    let mut args = vec![
        format!("{host}:{}", config.remote_cwd.as_deref().unwrap_or_default()),
        mount_point.to_string_lossy().to_string(),
        "-o".to_string(),
        options.join(","),
    ];
    if let Some(port) = config.port {
        args.push("-p".to_string());
        args.push(port.to_string());
    }
    if let Some(command) = config.command.as_deref().filter(|c| !c.trim().is_empty()) {
        args.push("-o".to_string());
        args.push(format!("ssh_command={command}"));
    }
    Ok(args)
}

#[derive(Debug)]
struct ActiveMount {
    mount_point: PathBuf,
    previous_cwd: PathBuf,
}

/// Owns the lifetime of at most one sshfs mount.
pub struct MountManager {
    executor: Arc<dyn ProcessExecutor>,
    strict_host_key: bool,
    platform: String,
    temp_root: PathBuf,
    active: Mutex<Option<ActiveMount>>,
}

impl std::fmt::Debug for MountManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MountManager")
            .field("platform", &self.platform)
            .field("strict_host_key", &self.strict_host_key)
            .field("temp_root", &self.temp_root)
            .finish_non_exhaustive()
    }
}

impl MountManager {
    pub fn new(executor: Arc<dyn ProcessExecutor>, strict_host_key: bool) -> Self {
        Self {
            executor,
            strict_host_key,
            platform: std::env::consts::OS.to_string(),
            temp_root: std::env::temp_dir(),
            active: Mutex::new(None),
        }
    }

    #[must_use]
    pub fn with_platform(mut self, platform: impl Into<String>) -> Self {
        self.platform = platform.into();
        self
    }

    /// Directory under which mount points are created.
    #[must_use]
    pub fn with_temp_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.temp_root = root.into();
        self
    }

    /// Returns the active mount point.
    pub async fn mount_point(&self) -> Option<PathBuf> {
        self.active.lock().await.as_ref().map(|m| m.mount_point.clone())
    }

    /// Mounts the configured remote directory and changes into it.
    ///
    /// Mounting when already mounted returns the existing mount point.
    ///
    /// # Errors
    ///
    /// Returns [`TetherError::Mount`] if sshfs fails. The mount point is
    /// removed and the working directory is left unchanged.
    pub async fn mount(&self, config: &RemoteTargetConfig) -> TetherResult<PathBuf> {
        let mut active = self.active.lock().await;
        if let Some(existing) = active.as_ref() {
            return Ok(existing.mount_point.clone());
        }

        let mount_point = self.temp_root.join(format!("tether-{}", Uuid::new_v4()));
        let args = build_sshfs_args(config, &mount_point, self.strict_host_key)?;
        let previous_cwd = std::env::current_dir()?;
        tokio::fs::create_dir_all(&mount_point)
            .await
            .map_err(|e| TetherError::mount(format!("failed to create mount point: {e}")))?;

        let options = ExecOptions::default().with_timeout(Some(MOUNT_TIMEOUT));
        let failure = match self.executor.exec("sshfs", &args, options).await {
            Ok(output) if output.success() => None,
            Ok(output) => Some(format!(
                "sshfs exited with code {}: {}",
                output.exit_code,
                output.stderr.trim()
            )),
            Err(e) => Some(e.to_string()),
        };
        if let Some(message) = failure {
            remove_mount_point(&mount_point).await;
            return Err(TetherError::mount(message));
        }

        if let Err(e) = std::env::set_current_dir(&mount_point) {
            self.run_unmount(&mount_point).await;
            remove_mount_point(&mount_point).await;
            return Err(TetherError::mount(format!("failed to enter mount point: {e}")));
        }

        info!(
            mount_point = %mount_point.display(),
            host = ?config.host,
            "Mounted remote directory"
        );
        *active = Some(ActiveMount {
            mount_point: mount_point.clone(),
            previous_cwd,
        });
        Ok(mount_point)
    }

    /// Restores the previous working directory and unmounts.
    ///
    /// Returns `false` when nothing was mounted.
    ///
    /// # Errors
    ///
    /// Returns [`TetherError::Mount`] if every unmount strategy failed.
    pub async fn unmount(&self) -> TetherResult<bool> {
        let Some(mount) = self.active.lock().await.take() else {
            return Ok(false);
        };

        if let Err(e) = std::env::set_current_dir(&mount.previous_cwd) {
            warn!(
                path = %mount.previous_cwd.display(),
                error = %e,
                "Failed to restore working directory"
            );
        }

        let unmounted = self.run_unmount(&mount.mount_point).await;
        remove_mount_point(&mount.mount_point).await;
        if !unmounted {
            return Err(TetherError::mount(format!(
                "failed to unmount {}",
                mount.mount_point.display()
            )));
        }
        info!(mount_point = %mount.mount_point.display(), "Unmounted remote directory");
        Ok(true)
    }

    /// Tries each unmount strategy until one succeeds.
    async fn run_unmount(&self, mount_point: &Path) -> bool {
        let target = mount_point.to_string_lossy().to_string();
        for strategy in unmount_plan(&self.platform) {
            let mut args: Vec<String> = strategy.args.iter().map(|a| (*a).to_string()).collect();
            args.push(target.clone());
            match self
                .executor
                .exec(strategy.program, &args, ExecOptions::default().with_timeout(Some(MOUNT_TIMEOUT)))
                .await
            {
                Ok(output) if output.success() => return true,
                Ok(output) => warn!(
                    program = strategy.program,
                    exit_code = output.exit_code,
                    stderr = %output.stderr.trim(),
                    "Unmount command failed"
                ),
                Err(e) => warn!(program = strategy.program, error = %e, "Unmount command failed"),
            }
        }
        false
    }
}

async fn remove_mount_point(path: &Path) {
    if let Err(e) = tokio::fs::remove_dir(path).await {
        warn!(path = %path.display(), error = %e, "Failed to remove mount point");
    }
}

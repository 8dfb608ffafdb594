//! `/ssh` command parsing and application.
//!
//! ```text
//! /ssh                      show the current target
//! /ssh off | disable        run every tool locally
//! /ssh <host> [cwd]         set the host (and remote working directory)
//! /ssh port [n|clear]       query or set the port
//! /ssh command [text|clear] query or set a custom ssh invocation
//! /ssh timeout [s|clear]    query or set the default timeout
//! /ssh cwd [path|clear]     query or set the remote working directory
//! ```

use tracing::info;

use super::Notification;
use crate::error::TetherResult;
use crate::remote::build_remote_invocation;
use crate::remote::state::{describe_config, RemoteState};
use crate::types::config::{parse_port, parse_timeout, validate_host};

/// Keyword that resets a setting to its default.
const CLEAR: &str = "clear";

/// Argument to a settable field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SetValue<T> {
    /// No value given: report the current one.
    Query,
    /// Reset to the default.
    Clear,
    /// New value.
    Set(T),
}

/// A parsed `/ssh` invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SshCommand {
    Show,
    Disable,
    SetHost { host: String, cwd: Option<String> },
    Port(SetValue<u16>),
    Command(SetValue<String>),
    Timeout(SetValue<u64>),
    Cwd(SetValue<String>),
}

fn settable<T>(
    rest: &str,
    parse: impl FnOnce(&str) -> TetherResult<T>,
) -> TetherResult<SetValue<T>> {
    match rest {
        "" => Ok(SetValue::Query),
        CLEAR => Ok(SetValue::Clear),
        value => parse(value).map(SetValue::Set),
    }
}

/// Parses the argument text of `/ssh`.
///
/// # Errors
///
/// Returns a configuration error for an invalid port, timeout, or host.
///
/// # Examples
///
/// ```
/// use tether::commands::{parse_ssh_command, SetValue, SshCommand};
///
/// assert_eq!(parse_ssh_command("port 2222").unwrap(), SshCommand::Port(SetValue::Set(2222)));
/// assert!(parse_ssh_command("port 0").is_err());
/// ```
pub fn parse_ssh_command(args: &str) -> TetherResult<SshCommand> {
    let trimmed = args.trim();
    let (head, rest) = trimmed
        .split_once(char::is_whitespace)
        .map_or((trimmed, ""), |(h, r)| (h, r.trim()));

    match head {
        "" | "show" | "status" => Ok(SshCommand::Show),
        "off" | "disable" => Ok(SshCommand::Disable),
        "port" => settable(rest, parse_port).map(SshCommand::Port),
        "timeout" => settable(rest, parse_timeout).map(SshCommand::Timeout),
        "command" => settable(rest, |v| Ok(v.to_string())).map(SshCommand::Command),
        "cwd" => settable(rest, |v| Ok(v.to_string())).map(SshCommand::Cwd),
        host => Ok(SshCommand::SetHost {
            host: validate_host(host)?.to_string(),
            cwd: Some(rest).filter(|r| !r.is_empty()).map(str::to_string),
        }),
    }
}

/// Outcome of applying a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandReply {
    pub notification: Notification,
    /// The config changed and should be persisted.
    pub changed: bool,
}

impl CommandReply {
    fn query(message: impl Into<String>) -> Self {
        Self {
            notification: Notification::info(message),
            changed: false,
        }
    }

    fn changed(message: impl Into<String>) -> Self {
        Self {
            notification: Notification::info(message),
            changed: true,
        }
    }

    fn rejected(message: impl Into<String>) -> Self {
        Self {
            notification: Notification::error(message),
            changed: false,
        }
    }
}

fn or_default<T: ToString>(value: Option<T>) -> String {
    value.map_or_else(|| "(default)".to_string(), |v| v.to_string())
}

/// Applies a parsed command to `state`.
pub async fn apply_ssh_command(command: SshCommand, state: &RemoteState) -> CommandReply {
    match command {
        SshCommand::Show => CommandReply::query(describe_config(&state.snapshot().await)),
        SshCommand::Disable => {
            state.clear().await;
            info!("SSH disabled");
            CommandReply::changed("SSH disabled. Tools run locally.")
        }
        SshCommand::SetHost { host, cwd } => {
            state.set_host(Some(host.clone())).await;
            state.set_remote_cwd(cwd.clone()).await;
            info!(host = %host, cwd = ?cwd, "SSH host set");
            let suffix = cwd.map(|c| format!(" [{c}]")).unwrap_or_default();
            CommandReply::changed(format!("SSH enabled: {host}{suffix}"))
        }
        SshCommand::Port(value) => match value {
            SetValue::Query => CommandReply::query(format!("SSH port: {}", or_default(state.port().await))),
            SetValue::Clear => {
                state.set_port(None).await;
                CommandReply::changed("SSH port reset to default")
            }
            SetValue::Set(port) => {
                state.set_port(Some(port)).await;
                CommandReply::changed(format!("SSH port set to {port}"))
            }
        },
        SshCommand::Command(value) => match value {
            SetValue::Query => {
                CommandReply::query(format!("SSH command: {}", or_default(state.command().await)))
            }
            SetValue::Clear => {
                state.set_command(None).await;
                CommandReply::changed("SSH command reset to ssh")
            }
            SetValue::Set(command) => {
                let mut candidate = state.snapshot().await;
                candidate.command = Some(command.clone());
                if candidate.host.is_none() {
                    candidate.host = Some("host".to_string());
                }
                if let Err(err) = build_remote_invocation(&candidate) {
                    return CommandReply::rejected(err.to_string());
                }
                state.set_command(Some(command.clone())).await;
                CommandReply::changed(format!("SSH command set to: {command}"))
            }
        },
        SshCommand::Timeout(value) => match value {
            SetValue::Query => CommandReply::query(format!(
                "SSH timeout: {}",
                state.timeout().await.map_or_else(|| "(none)".to_string(), |t| format!("{t}s"))
            )),
            SetValue::Clear => {
                state.set_timeout(None).await;
                CommandReply::changed("SSH timeout cleared")
            }
            SetValue::Set(secs) => {
                state.set_timeout(Some(secs)).await;
                CommandReply::changed(format!("SSH timeout set to {secs}s"))
            }
        },
        SshCommand::Cwd(value) => match value {
            SetValue::Query => {
                CommandReply::query(format!("Remote cwd: {}", or_default(state.remote_cwd().await)))
            }
            SetValue::Clear => {
                state.set_remote_cwd(None).await;
                CommandReply::changed("Remote cwd cleared")
            }
            SetValue::Set(cwd) => {
                state.set_remote_cwd(Some(cwd.clone())).await;
                CommandReply::changed(format!("Remote cwd set to {cwd}"))
            }
        },
    }
}

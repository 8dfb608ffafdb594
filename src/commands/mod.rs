//! Slash commands.
//!
//! Tether registers a single command, `/ssh`, that inspects and changes the
//! remote target at runtime. Parsing lives in [`ssh`]; the extension entry
//! point applies the parsed command, persists the new config and refreshes
//! the status line.

pub mod ssh;

use serde::{Deserialize, Serialize};

pub use ssh::{apply_ssh_command, parse_ssh_command, CommandReply, SetValue, SshCommand};

/// Name the command is registered under.
pub const SSH_COMMAND: &str = "ssh";

/// Severity of a user-facing notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotifyLevel {
    Info,
    Warning,
    Error,
}

/// A message for the host to show the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub level: NotifyLevel,
    pub message: String,
}

impl Notification {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: NotifyLevel::Info,
            message: message.into(),
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            level: NotifyLevel::Warning,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NotifyLevel::Error,
            message: message.into(),
        }
    }
}

/// Splits `/name rest` into the command name and its raw argument text.
///
/// Returns `None` when `input` is not a slash command.
#[must_use]
pub fn split_slash_command(input: &str) -> Option<(&str, &str)> {
    let rest = input.trim().strip_prefix('/')?;
    let (name, args) = rest.split_once(char::is_whitespace).unwrap_or((rest, ""));
    if name.is_empty() {
        return None;
    }
    Some((name, args.trim()))
}

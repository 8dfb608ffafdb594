//! Remote command construction.
//!
//! Turns a [`RemoteTargetConfig`] into the argv for the ssh client and a
//! user command into the single remote command line ssh will hand to the
//! remote shell.

use tracing::debug;

use super::quote::quote;
use crate::error::{TetherError, TetherResult};
use crate::types::config::{validate_host, RemoteTargetConfig};

/// Default remote-login client.
pub const DEFAULT_SSH_PROGRAM: &str = "ssh";

/// Example shown when a custom command contains a shell operator.
const OPERATOR_SUGGESTION: &str = r#"--ssh-command 'ssh -o "ProxyCommand ssh -W %h:%p bastion"'"#;

/// Control operators, longest first so `||` wins over `|`.
const CONTROL_OPERATORS: &[&str] = &[
    "&&", "||", ";;", ">>", "<<", "|", "&", ";", ">", "<", "(", ")",
];

/// A fully resolved process invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteInvocation {
    /// Program to execute (usually `ssh`).
    pub program: String,
    /// Literal arguments, ending with the host and then the remote command.
    pub args: Vec<String>,
}

impl RemoteInvocation {
    /// Returns the remote command line (the final argument).
    #[must_use]
    pub fn remote_command(&self) -> &str {
        self.args.last().map(String::as_str).unwrap_or_default()
    }
}

/// Builds the argv that invokes the ssh client for `config`.
///
/// The first element is the program. A custom `command` is tokenized with
/// shell quoting rules, so `ssh -o "ProxyCommand ssh -W %h:%p bastion"`
/// yields four tokens. `-p <port>` and the host are appended last.
///
/// # Errors
///
/// - [`TetherError::DisallowedOperator`] if the custom command contains an
///   unquoted shell control operator
/// - [`TetherError::InvalidCommand`] if it has unbalanced quotes or no host
/// - [`TetherError::InvalidHost`] if the host would be read as an option
///   is configured
///
/// # Examples
///
/// ```
/// use tether::remote::command::build_remote_invocation;
/// use tether::types::config::RemoteTargetConfig;
///
/// let mut config = RemoteTargetConfig::with_host("user@server");
/// config.port = Some(2222);
/// let argv = build_remote_invocation(&config).unwrap();
/// assert_eq!(argv, ["ssh", "-p", "2222", "user@server"]);
/// ```
pub fn build_remote_invocation(config: &RemoteTargetConfig) -> TetherResult<Vec<String>> {
    let host = config
        .host
        .as_deref()
        .filter(|h| !h.is_empty())
        .ok_or_else(|| TetherError::invalid_command("", "no SSH host configured"))?;
    let host = validate_host(host)?;

    let mut argv = match config.command.as_deref().map(str::trim) {
        Some(raw) if !raw.is_empty() => tokenize_command(raw)?,
        _ => Vec::new(),
    };
    if argv.is_empty() {
        argv.push(DEFAULT_SSH_PROGRAM.to_string());
    }

    if let Some(port) = config.port {
        argv.push("-p".to_string());
        argv.push(port.to_string());
    }
    argv.push(host.to_string());

    Ok(argv)
}

/// Renders the remote command line, prefixed with `cd <cwd> &&` when a
/// remote working directory is configured.
///
/// # Examples
///
/// ```
/// use tether::remote::command::build_remote_command_line;
/// use tether::types::config::RemoteTargetConfig;
///
/// let mut config = RemoteTargetConfig::with_host("user@server");
/// assert_eq!(build_remote_command_line(&config, "pwd"), "pwd");
///
/// config.remote_cwd = Some("/home/user/project".to_string());
/// assert_eq!(
///     build_remote_command_line(&config, "pwd"),
///     "cd '/home/user/project' && pwd"
/// );
/// ```
#[must_use]
pub fn build_remote_command_line(config: &RemoteTargetConfig, user_command: &str) -> String {
    match config.remote_cwd.as_deref().filter(|c| !c.is_empty()) {
        Some(cwd) => format!("cd {} && {}", quote(cwd), user_command),
        None => user_command.to_string(),
    }
}

/// Builds the complete invocation that runs `user_command` on the target.
///
/// # Errors
///
/// See [`build_remote_invocation`].
pub fn build_invocation(
    config: &RemoteTargetConfig,
    user_command: &str,
) -> TetherResult<RemoteInvocation> {
    let mut argv = build_remote_invocation(config)?;
    let program = argv.remove(0);
    argv.push(build_remote_command_line(config, user_command));
    debug!(program = %program, args = ?argv, "Built remote invocation");
    Ok(RemoteInvocation {
        program,
        args: argv,
    })
}

fn tokenize_command(raw: &str) -> TetherResult<Vec<String>> {
    if let Some(operator) = find_unquoted_operator(raw) {
        return Err(TetherError::disallowed_operator(operator, OPERATOR_SUGGESTION));
    }
    shell_words::split(raw).map_err(|e| TetherError::invalid_command(raw, e.to_string()))
}

/// Returns the first shell control operator outside of quotes.
fn find_unquoted_operator(raw: &str) -> Option<&'static str> {
    let mut in_single = false;
    let mut in_double = false;
    let mut escaped = false;

    for (idx, ch) in raw.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match ch {
            '\\' if !in_single => escaped = true,
            '\'' if !in_double => in_single = !in_single,
            '"' if !in_single => in_double = !in_double,
            _ if in_single || in_double => {}
            _ => {
                let rest = &raw[idx..];
                if let Some(op) = CONTROL_OPERATORS.iter().find(|op| rest.starts_with(**op)) {
                    return Some(*op);
                }
            }
        }
    }
    None
}

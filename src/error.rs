//! Centralized error types for Tether.
//!
//! Every fallible operation in the library returns [`TetherResult`]. Tool
//! adapters never let these escape to the host: they are converted into an
//! error-tagged [`ToolResult`](crate::types::ToolResult) at the adapter
//! boundary. The one exception is command construction, which surfaces
//! [`TetherError::DisallowedOperator`] directly so a bad `--ssh-command` is
//! reported loudly.
//!
//! # Example
//!
//! ```
//! use tether::error::{TetherError, TetherResult};
//!
//! fn parse_port(value: &str) -> TetherResult<u16> {
//!     value
//!         .parse::<u16>()
//!         .ok()
//!         .filter(|p| *p != 0)
//!         .ok_or_else(|| TetherError::invalid_port(value))
//! }
//!
//! let err = parse_port("70000").unwrap_err();
//! assert!(err.is_configuration());
//! ```

use thiserror::Error;

/// Result type alias using `TetherError`.
pub type TetherResult<T> = Result<T, TetherError>;

/// Centralized error type for Tether.
#[derive(Debug, Error)]
pub enum TetherError {
    // ============== Configuration Errors ==============
    /// Port outside 1-65535 or not a number.
    #[error("Invalid port '{value}': must be an integer between 1 and 65535")]
    InvalidPort {
        /// The rejected value.
        value: String,
    },

    /// Timeout that is not a positive integer.
    #[error("Invalid timeout '{value}': must be a positive number of seconds")]
    InvalidTimeout {
        /// The rejected value.
        value: String,
    },

    /// Host that ssh would parse as an option.
    #[error("Invalid SSH host '{host}': must not start with '-'")]
    InvalidHost {
        /// The rejected host.
        host: String,
    },

    // ============== Command Construction Errors ==============
    /// A custom ssh command contained a shell control operator.
    #[error(
        "Shell operator '{operator}' is not allowed in the SSH command: it would be passed to ssh \
         as a literal argument. Quote it as part of an option instead, e.g. {suggestion}"
    )]
    DisallowedOperator {
        /// The offending operator.
        operator: String,
        /// A corrected invocation example.
        suggestion: String,
    },

    /// A custom ssh command that cannot be tokenized.
    #[error("Invalid SSH command '{command}': {reason}")]
    InvalidCommand {
        /// The raw command text.
        command: String,
        /// Why tokenizing failed.
        reason: String,
    },

    /// A path that cannot be represented safely on a shell command line.
    #[error("Unsafe path: {reason}")]
    UnsafePath {
        /// Description of the rejected character.
        reason: String,
    },

    // ============== Execution Errors ==============
    /// The process failed to start, timed out, or was cancelled.
    #[error("{message}")]
    Exec {
        /// Description of the failure.
        message: String,
    },

    /// A remote command exited non-zero where success was required.
    #[error("{message}")]
    RemoteFailure {
        /// Exit code reported by ssh.
        exit_code: i32,
        /// Human-readable message, usually derived from stderr.
        message: String,
    },

    // ============== Tool Errors ==============
    /// Tool arguments that do not match the tool's schema.
    #[error("Invalid input for {tool}: {message}")]
    InvalidInput {
        /// Tool name.
        tool: String,
        /// Deserialization failure.
        message: String,
    },

    /// The search text of an edit does not occur in the file.
    #[error(
        "oldText not found in {path}. The text must match exactly, including whitespace and newlines."
    )]
    EditNotFound {
        /// Path of the edited file.
        path: String,
    },

    /// The search text of an edit occurs more than once.
    #[error(
        "oldText appears {count} times in {path}. Provide more surrounding context so the match is unique."
    )]
    EditAmbiguous {
        /// Path of the edited file.
        path: String,
        /// Number of occurrences found.
        count: usize,
    },

    // ============== Session & Mount Errors ==============
    /// Session log could not be read or written.
    #[error("session: {message}")]
    Session {
        /// Description of the failure.
        message: String,
    },

    /// sshfs mount or unmount failed.
    #[error("mount: {message}")]
    Mount {
        /// Description of the failure.
        message: String,
    },

    // ============== Wrapped Errors ==============
    /// Local I/O error.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization error.
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

// ============== Constructor Methods ==============

impl TetherError {
    /// Creates an invalid port error.
    #[must_use]
    pub fn invalid_port(value: impl Into<String>) -> Self {
        Self::InvalidPort {
            value: value.into(),
        }
    }

    /// Creates an invalid timeout error.
    #[must_use]
    pub fn invalid_timeout(value: impl Into<String>) -> Self {
        Self::InvalidTimeout {
            value: value.into(),
        }
    }

    /// Creates an invalid host error.
    #[must_use]
    pub fn invalid_host(host: impl Into<String>) -> Self {
        Self::InvalidHost { host: host.into() }
    }

    /// Creates a disallowed operator error.
    #[must_use]
    pub fn disallowed_operator(operator: impl Into<String>, suggestion: impl Into<String>) -> Self {
        Self::DisallowedOperator {
            operator: operator.into(),
            suggestion: suggestion.into(),
        }
    }

    /// Creates an invalid command error.
    #[must_use]
    pub fn invalid_command(command: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidCommand {
            command: command.into(),
            reason: reason.into(),
        }
    }

    /// Creates an unsafe path error.
    #[must_use]
    pub fn unsafe_path(reason: impl Into<String>) -> Self {
        Self::UnsafePath {
            reason: reason.into(),
        }
    }

    /// Creates an execution error.
    #[must_use]
    pub fn exec(message: impl Into<String>) -> Self {
        Self::Exec {
            message: message.into(),
        }
    }

    /// Creates a remote failure error.
    #[must_use]
    pub fn remote_failure(exit_code: i32, message: impl Into<String>) -> Self {
        Self::RemoteFailure {
            exit_code,
            message: message.into(),
        }
    }

    /// Creates an invalid tool input error.
    #[must_use]
    pub fn invalid_input(tool: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidInput {
            tool: tool.into(),
            message: message.into(),
        }
    }

    /// Creates a session error.
    #[must_use]
    pub fn session(message: impl Into<String>) -> Self {
        Self::Session {
            message: message.into(),
        }
    }

    /// Creates a mount error.
    #[must_use]
    pub fn mount(message: impl Into<String>) -> Self {
        Self::Mount {
            message: message.into(),
        }
    }
}

// ============== Category Methods ==============

impl TetherError {
    /// Returns `true` for errors caused by user-supplied configuration.
    #[must_use]
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::InvalidPort { .. }
                | Self::InvalidTimeout { .. }
                | Self::InvalidHost { .. }
                | Self::DisallowedOperator { .. }
                | Self::InvalidCommand { .. }
        )
    }

    /// Returns the module name where this error originated.
    #[must_use]
    pub fn module(&self) -> &'static str {
        match self {
            Self::InvalidPort { .. } | Self::InvalidTimeout { .. } | Self::InvalidHost { .. } => {
                "config"
            }
            Self::DisallowedOperator { .. }
            | Self::InvalidCommand { .. }
            | Self::UnsafePath { .. } => "remote",
            Self::Exec { .. } | Self::RemoteFailure { .. } => "exec",
            Self::InvalidInput { .. } | Self::EditNotFound { .. } | Self::EditAmbiguous { .. } => {
                "tools"
            }
            Self::Session { .. } => "session",
            Self::Mount { .. } => "mount",
            Self::Io(_) | Self::Json(_) => "io",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disallowed_operator_names_operator_and_suggestion() {
        let err = TetherError::disallowed_operator("|", "ssh -o \"ProxyCommand ssh -W %h:%p bastion\"");
        let msg = err.to_string();
        assert!(msg.contains("'|'"));
        assert!(msg.contains("ProxyCommand"));
    }

    #[test]
    fn test_edit_ambiguous_reports_count() {
        let err = TetherError::EditAmbiguous {
            path: "a.txt".to_string(),
            count: 3,
        };
        assert!(err.to_string().contains("appears 3 times"));
    }

    #[test]
    fn test_is_configuration() {
        assert!(TetherError::invalid_port("0").is_configuration());
        assert!(TetherError::invalid_timeout("-1").is_configuration());
        assert!(TetherError::invalid_host("-oProxyCommand=x").is_configuration());
        assert!(!TetherError::exec("boom").is_configuration());
    }

    #[test]
    fn test_module() {
        assert_eq!(TetherError::invalid_port("x").module(), "config");
        assert_eq!(TetherError::unsafe_path("nul").module(), "remote");
        assert_eq!(TetherError::mount("busy").module(), "mount");
    }

    #[test]
    fn test_from_io() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: TetherError = io.into();
        assert_eq!(err.module(), "io");
    }
}

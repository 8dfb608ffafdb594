//! Tether - remote tool redirection over SSH
//!
//! Redirects an assistant's `bash`, `read`, `write`, `edit`, `grep`, `find`
//! and `ls` tools to a remote host through the system `ssh` client, with an
//! optional `sshfs` mount of the remote working directory.
//!
//! This library exposes the building blocks for embedding in a host and for
//! testing: the shared [`remote::RemoteState`], the [`tools::RemoteTools`]
//! dispatcher and the [`app::Tether`] entry point.

pub mod app;
pub mod commands;
pub mod error;
pub mod mount;
pub mod remote;
pub mod session;
pub mod shell;
pub mod tools;
pub mod types;
pub mod util;

// Re-export core types for convenient access
pub use app::Tether;
pub use error::{TetherError, TetherResult};
pub use types::{RemoteTargetConfig, ToolResult};

//! Remote execution core.
//!
//! - [`quote`] - the canonical shell quoting primitive and path validation
//! - [`command`] - ssh argv and remote command line construction
//! - [`capabilities`] - one-time-per-host probe for `rg`/`fd`
//! - [`state`] - the shared, mutex-guarded target configuration

pub mod capabilities;
pub mod command;
pub mod quote;
pub mod state;

pub use capabilities::{detect, Capabilities, RemoteToolsCache};
pub use command::{build_invocation, build_remote_command_line, build_remote_invocation, RemoteInvocation};
pub use quote::{quote, quote_path, validate_path_safety};
pub use state::{render_status_line, RemoteState, CONFIG_ENTRY_TYPE};

//! Core type definitions for Tether.
//!
//! - [`config`] - Remote target configuration and launch options
//! - [`content`] - Tool result types returned to the host
//!
//! ```
//! use tether::types::{RemoteTargetConfig, ToolResult};
//! ```

pub mod config;
pub mod content;

pub use config::{LaunchOptions, RemoteTargetConfig};
pub use content::{ContentBlock, ToolResult};

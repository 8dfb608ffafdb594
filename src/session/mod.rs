//! Session log for Tether.
//!
//! The host keeps an append-only, ordered log of entries for the active
//! session branch. Tether writes one custom entry per configuration change
//! and scans the branch at session start to restore the last one.
//!
//! Two implementations are provided:
//!
//! - [`FileSessionLog`] - JSON lines on disk, one checksummed entry per line
//! - [`MemorySessionLog`] - in-process, for embedding and tests
//!
//! # Example
//!
//! ```no_run
//! use tether::session::{FileSessionLog, SessionEntry, SessionLog};
//! use serde_json::json;
//!
//! # async fn example() -> tether::error::TetherResult<()> {
//! let log = FileSessionLog::new("/tmp/tether-session.jsonl");
//! log.append(SessionEntry::custom("ssh-config", json!({"host": "user@server"}))).await?;
//! let entries = log.entries().await?;
//! assert_eq!(entries.len(), 1);
//! # Ok(())
//! # }
//! ```

mod persistence;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::PathBuf;
use std::time::SystemTime;
use tokio::sync::Mutex;

use crate::error::{TetherError, TetherResult};

pub use persistence::FileSessionLog;

/// Entry type used for extension-defined entries.
pub const CUSTOM_ENTRY: &str = "custom";

/// One entry on the session branch.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SessionEntry {
    /// Kind of entry (`custom` for extension entries).
    #[serde(rename = "type")]
    pub entry_type: String,

    /// Extension-defined tag for custom entries.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_type: Option<String>,

    /// Opaque payload.
    #[serde(default)]
    pub data: Value,

    /// RFC 3339 time the entry was appended.
    pub timestamp: String,
}

impl SessionEntry {
    /// Creates a custom entry tagged with `custom_type`.
    #[must_use]
    pub fn custom(custom_type: impl Into<String>, data: Value) -> Self {
        Self {
            entry_type: CUSTOM_ENTRY.to_string(),
            custom_type: Some(custom_type.into()),
            data,
            timestamp: humantime::format_rfc3339_millis(SystemTime::now()).to_string(),
        }
    }

    /// Returns `true` if this is a custom entry with the given tag.
    #[must_use]
    pub fn is_custom(&self, custom_type: &str) -> bool {
        self.entry_type == CUSTOM_ENTRY && self.custom_type.as_deref() == Some(custom_type)
    }
}

/// Host-provided append-only session log.
#[async_trait]
pub trait SessionLog: Send + Sync {
    /// Appends an entry to the active branch.
    ///
    /// # Errors
    ///
    /// Returns [`TetherError::Session`] if the entry cannot be stored.
    async fn append(&self, entry: SessionEntry) -> TetherResult<()>;

    /// Returns the entries of the active branch in order.
    ///
    /// # Errors
    ///
    /// Returns [`TetherError::Session`] if the log cannot be read.
    async fn entries(&self) -> TetherResult<Vec<SessionEntry>>;
}

/// In-memory session log.
#[derive(Debug, Default)]
pub struct MemorySessionLog {
    entries: Mutex<Vec<SessionEntry>>,
}

impl MemorySessionLog {
    /// Creates an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a log pre-populated with `entries`.
    #[must_use]
    pub fn with_entries(entries: Vec<SessionEntry>) -> Self {
        Self {
            entries: Mutex::new(entries),
        }
    }
}

#[async_trait]
impl SessionLog for MemorySessionLog {
    async fn append(&self, entry: SessionEntry) -> TetherResult<()> {
        self.entries.lock().await.push(entry);
        Ok(())
    }

    async fn entries(&self) -> TetherResult<Vec<SessionEntry>> {
        Ok(self.entries.lock().await.clone())
    }
}

/// Returns the default session log path under the user's data directory.
///
/// # Errors
///
/// Returns an error if the data directory cannot be determined.
pub fn default_session_path() -> TetherResult<PathBuf> {
    crate::util::get_data_dir()
        .map(|dir| dir.join("sessions").join("default.jsonl"))
        .ok_or_else(|| TetherError::session("could not determine data directory"))
}

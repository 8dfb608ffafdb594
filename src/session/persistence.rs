//! File-backed session log.
//!
//! Each line holds one entry wrapped with a SHA-256 checksum of its JSON.
//! Lines that fail to parse or verify are skipped on read, so a torn write
//! at the end of the file loses at most the entry being written.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::{error, warn};

use super::{SessionEntry, SessionLog};
use crate::error::{TetherError, TetherResult};

/// Static key mixed into entry checksums.
const INTEGRITY_KEY: &[u8] = b"tether-session-integrity-v1";

/// One line of the session file.
#[derive(Debug, Serialize, Deserialize)]
struct EntryLine {
    entry: SessionEntry,
    checksum: String,
}

impl EntryLine {
    fn new(entry: SessionEntry) -> TetherResult<Self> {
        let json = serde_json::to_string(&entry)?;
        Ok(Self {
            checksum: compute_checksum(&json),
            entry,
        })
    }

    fn verify(self) -> TetherResult<SessionEntry> {
        let json = serde_json::to_string(&self.entry)?;
        if self.checksum != compute_checksum(&json) {
            return Err(TetherError::session("checksum mismatch"));
        }
        Ok(self.entry)
    }
}

fn compute_checksum(data: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(INTEGRITY_KEY);
    hasher.update(data.as_bytes());
    hex::encode(hasher.finalize())
}

/// Session log stored as JSON lines.
#[derive(Debug)]
pub struct FileSessionLog {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FileSessionLog {
    /// Creates a log at `path`. The file is created on first append.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    /// Returns the log file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl SessionLog for FileSessionLog {
    async fn append(&self, entry: SessionEntry) -> TetherResult<()> {
        let mut line = serde_json::to_string(&EntryLine::new(entry)?)?;
        line.push('\n');

        let _guard = self.write_lock.lock().await;
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| TetherError::session(format!("failed to create session dir: {e}")))?;
        }
        let mut file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await
            .map_err(|e| TetherError::session(format!("failed to open session log: {e}")))?;
        file.write_all(line.as_bytes())
            .await
            .map_err(|e| TetherError::session(format!("failed to append session entry: {e}")))?;
        file.flush()
            .await
            .map_err(|e| TetherError::session(format!("failed to flush session log: {e}")))?;
        Ok(())
    }

    async fn entries(&self) -> TetherResult<Vec<SessionEntry>> {
        let contents = match fs::read_to_string(&self.path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(TetherError::session(format!("failed to read session log: {e}")));
            }
        };

        let mut entries = Vec::new();
        for (idx, line) in contents.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<EntryLine>(line) {
                Ok(wrapped) => match wrapped.verify() {
                    Ok(entry) => entries.push(entry),
                    Err(_) => {
                        error!(
                            path = %self.path.display(),
                            line = idx + 1,
                            "Security: session entry integrity check failed - possible tampering detected"
                        );
                    }
                },
                Err(e) => {
                    warn!(path = %self.path.display(), line = idx + 1, error = %e, "Skipping malformed session entry");
                }
            }
        }
        Ok(entries)
    }
}

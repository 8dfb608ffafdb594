//! `write` adapter.
//!
//! Content travels base64-encoded inside the remote command line, so it
//! survives any bytes the file holds. Large files are split into fixed-size
//! chunks of encoded text: the first chunk truncates the target with `>`,
//! later chunks append with `>>`. The directory is created by the first
//! command, so a small write is exactly one remote call.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;

use super::{parse_input, RemoteContext, ToolKind};
use crate::error::{TetherError, TetherResult};
use crate::remote::{quote, quote_path};
use crate::types::content::ToolResult;

/// Encoded bytes per remote command.
pub const CHUNK_SIZE: usize = 64 * 1024;

#[derive(Debug, Clone, Deserialize)]
pub struct WriteInput {
    pub path: String,
    pub content: String,
}

/// Returns the parent directory of a remote path, if it has one.
fn parent_dir(path: &str) -> Option<&str> {
    match path.trim_end_matches('/').rfind('/') {
        Some(0) | None => None,
        Some(idx) => Some(&path[..idx]),
    }
}

/// Builds the remote commands that write `content` to `path`.
///
/// # Errors
///
/// Returns an error if the path contains a null byte or line break.
pub fn build_write_commands(path: &str, content: &str) -> TetherResult<Vec<String>> {
    let target = quote_path(path)?;
    let mkdir = match parent_dir(path) {
        Some(dir) => format!("mkdir -p {} && ", quote_path(dir)?),
        None => String::new(),
    };

    if content.is_empty() {
        return Ok(vec![format!("{mkdir}: > {target}")]);
    }

    let encoded = STANDARD.encode(content.as_bytes());
    // Base64 output is ASCII, so byte chunks are valid UTF-8.
    let commands = encoded
        .as_bytes()
        .chunks(CHUNK_SIZE)
        .enumerate()
        .map(|(idx, chunk)| {
            let chunk = String::from_utf8_lossy(chunk);
            let (prefix, redirect) = if idx == 0 {
                (mkdir.as_str(), ">")
            } else {
                ("", ">>")
            };
            format!("{prefix}printf '%s' {} | base64 -d {redirect} {target}", quote(&chunk))
        })
        .collect();
    Ok(commands)
}

/// Writes `content` to `path` on the remote host.
pub(crate) async fn write_remote(ctx: &RemoteContext<'_>, path: &str, content: &str) -> TetherResult<()> {
    let commands = build_write_commands(path, content)?;
    debug!(path = %path, bytes = content.len(), chunks = commands.len(), "Writing remote file");
    for command in commands {
        let output = ctx.run(&command, None).await?;
        if !output.success() {
            return Err(TetherError::remote_failure(
                output.exit_code,
                format!("Error writing {path}: {}", output.stderr.trim()),
            ));
        }
    }
    Ok(())
}

pub(crate) async fn execute_remote(ctx: &RemoteContext<'_>, input: &Value) -> TetherResult<ToolResult> {
    let input: WriteInput = parse_input(ToolKind::Write, input)?;
    write_remote(ctx, &input.path, &input.content).await?;
    Ok(written(&input.path, input.content.len()))
}

/// Result reported after a successful write.
#[must_use]
pub fn written(path: &str, bytes: usize) -> ToolResult {
    ToolResult::text(format!("Successfully wrote {bytes} bytes to {path}")).with_detail("bytes", json!(bytes))
}

//! `ls` adapter.
//!
//! Lists one entry per line with dotfiles included and directories suffixed
//! with `/`. The listing is capped locally so a missing directory still
//! yields `ls`'s own exit status.

use serde::Deserialize;
use serde_json::{json, Value};

use super::truncate::{truncate_tail, TruncationLimits};
use super::{limit_notice, parse_input, RemoteContext, ToolKind};
use crate::error::{TetherError, TetherResult};
use crate::remote::quote_path;
use crate::types::content::ToolResult;

/// Default number of entries.
pub const DEFAULT_LIMIT: usize = 500;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LsInput {
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default)]
    pub limit: Option<usize>,
}

impl LsInput {
    #[must_use]
    pub fn effective_limit(&self) -> usize {
        self.limit.filter(|l| *l > 0).unwrap_or(DEFAULT_LIMIT)
    }

    #[must_use]
    pub fn dir(&self) -> &str {
        self.path.as_deref().filter(|p| !p.is_empty()).unwrap_or(".")
    }
}

/// Builds the remote listing command.
///
/// # Errors
///
/// Returns an error if the path contains a null byte or line break.
pub fn build_command(path: &str) -> TetherResult<String> {
    Ok(format!("ls -1Ap -- {}", quote_path(path)?))
}

/// Builds the `ls` result from one entry name per element.
#[must_use]
pub fn format_entries(entries: &[&str], limit: usize, limits: TruncationLimits) -> ToolResult {
    if entries.is_empty() {
        return ToolResult::text("(empty directory)").with_detail("entries", json!(0));
    }

    let shown = &entries[..entries.len().min(limit)];
    let truncation = truncate_tail(&shown.join("\n"), limits);
    let mut text = truncation.content.clone();
    if entries.len() > limit {
        limit_notice(&mut text, entries.len(), limit, "entries");
    }

    let mut result = ToolResult::text(text).with_detail("entries", json!(shown.len()));
    if truncation.truncated {
        result = result.with_detail("truncation", json!(truncation));
    }
    result
}

pub(crate) async fn execute_remote(
    ctx: &RemoteContext<'_>,
    input: &Value,
    limits: TruncationLimits,
) -> TetherResult<ToolResult> {
    let input: LsInput = parse_input(ToolKind::Ls, input)?;
    let output = ctx.run(&build_command(input.dir())?, None).await?;

    if !output.success() {
        let stderr = output.stderr.trim();
        let message = if stderr.contains("No such file") {
            format!("Directory not found: {}", input.dir())
        } else {
            format!("Error listing {}: {stderr}", input.dir())
        };
        return Err(TetherError::remote_failure(output.exit_code, message));
    }

    let entries: Vec<&str> = output.stdout.lines().filter(|l| !l.is_empty()).collect();
    Ok(format_entries(&entries, input.effective_limit(), limits))
}

//! `read` adapter.

use serde::Deserialize;
use serde_json::{json, Value};

use super::truncate::{truncate_tail, TruncationLimits};
use super::{parse_input, RemoteContext, ToolKind};
use crate::error::{TetherError, TetherResult};
use crate::remote::quote_path;
use crate::types::content::ToolResult;

#[derive(Debug, Clone, Deserialize)]
pub struct ReadInput {
    pub path: String,
    /// First line to read (1-based).
    #[serde(default)]
    pub offset: Option<usize>,
    /// Maximum number of lines.
    #[serde(default)]
    pub limit: Option<usize>,
}

/// Builds the remote command that prints the requested line range.
///
/// # Errors
///
/// Returns an error if the path contains a null byte or line break.
///
/// # Examples
///
/// ```
/// use tether::tools::read::build_command;
///
/// assert_eq!(build_command("a.txt", Some(10), Some(3)).unwrap(), "sed -n '10,12p' 'a.txt'");
/// assert_eq!(build_command("a.txt", None, None).unwrap(), "cat 'a.txt'");
/// ```
pub fn build_command(path: &str, offset: Option<usize>, limit: Option<usize>) -> TetherResult<String> {
    let quoted = quote_path(path)?;
    let command = match (offset.filter(|o| *o > 0), limit.filter(|l| *l > 0)) {
        (None, None) => format!("cat {quoted}"),
        (Some(offset), None) => format!("tail -n +{offset} {quoted}"),
        (Some(offset), Some(limit)) => {
            format!("sed -n '{offset},{}p' {quoted}", offset.saturating_add(limit - 1))
        }
        (None, Some(limit)) => format!("head -n {limit} {quoted}"),
    };
    Ok(command)
}

pub(crate) async fn execute_remote(
    ctx: &RemoteContext<'_>,
    input: &Value,
    limits: TruncationLimits,
) -> TetherResult<ToolResult> {
    let input: ReadInput = parse_input(ToolKind::Read, input)?;
    let command = build_command(&input.path, input.offset, input.limit)?;
    let output = ctx.run(&command, None).await?;
    if !output.success() {
        return Err(TetherError::remote_failure(
            output.exit_code,
            format!("Error reading {}: {}", input.path, output.stderr.trim()),
        ));
    }
    Ok(format_content(&output.stdout, input.offset, limits))
}

/// Builds the `read` result from the selected text.
///
/// Oversized text keeps its last lines. `offset` is the line number the
/// text starts at, so the notice can name the absolute range shown.
#[must_use]
pub fn format_content(text: &str, offset: Option<usize>, limits: TruncationLimits) -> ToolResult {
    let truncation = truncate_tail(text, limits);
    let mut out = truncation.content.clone();
    let lines = truncation.output_lines;

    if truncation.truncated {
        let base = offset.filter(|o| *o > 0).unwrap_or(1);
        let start = base.saturating_add(truncation.first_kept_line() - 1);
        let end = base.saturating_add(truncation.total_lines.saturating_sub(1));
        if !out.ends_with('\n') {
            out.push('\n');
        }
        out.push_str(&format!(
            "\n[Showing lines {start}-{end} of {end}. Use offset/limit to read earlier lines or specific ranges]"
        ));
    }

    let mut result = ToolResult::text(out).with_detail("lines", json!(lines));
    if truncation.truncated {
        result = result.with_detail("truncation", json!(truncation));
    }
    result
}

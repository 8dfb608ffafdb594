//! `bash` adapter.
//!
//! The user command runs on the remote host as-is (prefixed with `cd` when a
//! remote cwd is configured). A non-zero exit is reported in the text but is
//! not an error: ad hoc commands routinely exit non-zero on purpose.

use serde::Deserialize;
use serde_json::{json, Value};

use super::truncate::{truncate_tail, TruncationLimits};
use super::{parse_input, RemoteContext, ToolKind};
use crate::error::TetherResult;
use crate::shell::ExecOutput;
use crate::types::content::ToolResult;
use crate::util::format_size;

#[derive(Debug, Clone, Deserialize)]
pub struct BashInput {
    pub command: String,
    /// Per-call timeout in seconds.
    #[serde(default)]
    pub timeout: Option<u64>,
}

pub(crate) async fn execute_remote(
    ctx: &RemoteContext<'_>,
    input: &Value,
    limits: TruncationLimits,
) -> TetherResult<ToolResult> {
    let input: BashInput = parse_input(ToolKind::Bash, input)?;
    let output = ctx.run(&input.command, input.timeout).await?;
    Ok(format_output(&output, limits))
}

/// Builds the `bash` result from collected process output.
///
/// Shared by the remote adapter and the local provider so both render the
/// same way.
#[must_use]
pub fn format_output(output: &ExecOutput, limits: TruncationLimits) -> ToolResult {
    let combined = output.combined();
    let truncation = truncate_tail(&combined, limits);

    let mut text = if truncation.content.is_empty() {
        "(no output)".to_string()
    } else {
        truncation.content.clone()
    };

    if truncation.truncated {
        let end = truncation.total_lines;
        text.push_str(&format!(
            "\n\n[Showing lines {}-{} of {}. Full output: {}]",
            truncation.first_kept_line(),
            end,
            end,
            format_size(truncation.total_bytes)
        ));
    }

    if output.exit_code != 0 {
        text.push_str(&format!("\n\nCommand exited with code {}", output.exit_code));
    }

    let mut result = ToolResult::text(text).with_detail("exitCode", json!(output.exit_code));
    if truncation.truncated {
        result = result.with_detail("truncation", json!(truncation));
    }
    result
}

//! `find` adapter: name search with `fd`, falling back to POSIX `find`.

use serde::Deserialize;
use serde_json::{json, Value};

use super::truncate::{truncate_tail, TruncationLimits};
use super::{limit_notice, parse_input, with_probe_error, RemoteContext, ToolKind};
use crate::error::{TetherError, TetherResult};
use crate::remote::{quote, quote_path};
use crate::types::content::ToolResult;

/// Default number of results.
pub const DEFAULT_LIMIT: usize = 1000;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FindInput {
    /// Glob matched against file names, or paths when it contains `/`.
    pub pattern: String,
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default)]
    pub limit: Option<usize>,
}

impl FindInput {
    #[must_use]
    pub fn effective_limit(&self) -> usize {
        self.limit.filter(|l| *l > 0).unwrap_or(DEFAULT_LIMIT)
    }

    #[must_use]
    pub fn search_path(&self) -> &str {
        self.path.as_deref().filter(|p| !p.is_empty()).unwrap_or(".")
    }
}

/// Builds the remote name-search command.
///
/// # Errors
///
/// Returns an error if the search path contains a null byte or line break.
pub fn build_command(input: &FindInput, has_fd: bool) -> TetherResult<String> {
    let path = quote_path(input.search_path())?;
    let limit = input.effective_limit();
    let matches_path = input.pattern.contains('/');

    let command = if has_fd {
        let full_path = if matches_path { " --full-path" } else { "" };
        format!(
            "fd --glob --color=never --hidden --exclude .git{full_path} -- {} {path}",
            quote(&input.pattern)
        )
    } else if matches_path {
        let pattern = if input.pattern.starts_with('*') {
            input.pattern.clone()
        } else {
            format!("*/{}", input.pattern)
        };
        format!(
            "find {path} -path {} -not -path '*/.git/*'",
            quote(&pattern)
        )
    } else {
        format!(
            "find {path} -name {} -not -path '*/.git/*'",
            quote(&input.pattern)
        )
    };
    Ok(format!("{command} | head -n {limit}"))
}

/// Builds the `find` result from newline-separated paths.
#[must_use]
pub fn format_paths(stdout: &str, limit: usize, limits: TruncationLimits) -> ToolResult {
    let count = stdout.lines().filter(|l| !l.is_empty()).count();
    if count == 0 {
        return ToolResult::text("No files found matching pattern").with_detail("files", json!(0));
    }

    let truncation = truncate_tail(stdout.trim_end_matches('\n'), limits);
    let mut text = truncation.content.clone();
    limit_notice(&mut text, count, limit, "results");

    let mut result = ToolResult::text(text).with_detail("files", json!(count));
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
    let input: FindInput = parse_input(ToolKind::Find, input)?;
    let caps = ctx.capabilities().await;
    let command = build_command(&input, caps.has_fd)?;
    let output = ctx.run(&command, None).await?;

    if output.stdout.trim().is_empty() && !output.stderr.trim().is_empty() {
        let code = if output.exit_code == 0 { 1 } else { output.exit_code };
        return Err(TetherError::remote_failure(
            code,
            format!("Error finding files in {}: {}", input.search_path(), output.stderr.trim()),
        ));
    }

    let result = format_paths(&output.stdout, input.effective_limit(), limits)
        .with_detail("tool", json!(if caps.has_fd { "fd" } else { "find" }));
    Ok(with_probe_error(result, &caps))
}

//! `grep` adapter.
//!
//! Uses `rg` when the host has it and POSIX `grep -rn` otherwise. Output is
//! capped remotely with `head`, so the exit status seen locally belongs to
//! `head`; "no matches" is detected from empty output instead.

use serde::Deserialize;
use serde_json::{json, Value};

use super::truncate::{truncate_tail, TruncationLimits};
use super::{limit_notice, parse_input, with_probe_error, RemoteContext, ToolKind};
use crate::error::{TetherError, TetherResult};
use crate::remote::{quote, quote_path};
use crate::types::content::ToolResult;

/// Default number of output lines.
pub const DEFAULT_LIMIT: usize = 100;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GrepInput {
    pub pattern: String,
    #[serde(default)]
    pub path: Option<String>,
    /// File name filter such as `*.rs`.
    #[serde(default)]
    pub glob: Option<String>,
    #[serde(default)]
    pub ignore_case: bool,
    /// Treat the pattern as a fixed string.
    #[serde(default)]
    pub literal: bool,
    /// Lines of context around each match.
    #[serde(default)]
    pub context: Option<usize>,
    #[serde(default)]
    pub limit: Option<usize>,
}

impl GrepInput {
    #[must_use]
    pub fn effective_limit(&self) -> usize {
        self.limit.filter(|l| *l > 0).unwrap_or(DEFAULT_LIMIT)
    }

    #[must_use]
    pub fn search_path(&self) -> &str {
        self.path.as_deref().filter(|p| !p.is_empty()).unwrap_or(".")
    }
}

/// Builds the remote search command.
///
/// # Errors
///
/// Returns an error if the search path contains a null byte or line break.
pub fn build_command(input: &GrepInput, has_rg: bool) -> TetherResult<String> {
    let path = quote_path(input.search_path())?;
    let limit = input.effective_limit();
    let mut args: Vec<String> = Vec::new();

    if has_rg {
        args.extend(["rg", "--line-number", "--color=never", "--no-heading"].map(String::from));
        if input.ignore_case {
            args.push("-i".to_string());
        }
        if input.literal {
            args.push("-F".to_string());
        }
        if let Some(context) = input.context.filter(|c| *c > 0) {
            args.push(format!("-C {context}"));
        }
        if let Some(glob) = &input.glob {
            args.push(format!("--glob {}", quote(glob)));
        }
        args.push(format!("-m {limit}"));
    } else {
        args.extend(["grep", "-rn"].map(String::from));
        if input.ignore_case {
            args.push("-i".to_string());
        }
        args.push(if input.literal { "-F" } else { "-E" }.to_string());
        if let Some(context) = input.context.filter(|c| *c > 0) {
            args.push(format!("-C {context}"));
        }
        if let Some(glob) = &input.glob {
            args.push(format!("--include={}", quote(glob)));
        }
    }

    args.push("--".to_string());
    args.push(quote(&input.pattern));
    args.push(path);
    Ok(format!("{} | head -n {limit}", args.join(" ")))
}

/// Builds the `grep` result from raw match output.
#[must_use]
pub fn format_matches(stdout: &str, limit: usize, limits: TruncationLimits) -> ToolResult {
    let count = stdout.lines().count();
    if count == 0 {
        return ToolResult::text("No matches found").with_detail("matches", json!(0));
    }

    let truncation = truncate_tail(stdout.trim_end_matches('\n'), limits);
    let mut text = truncation.content.clone();
    limit_notice(&mut text, count, limit, "matches");

    let mut result = ToolResult::text(text).with_detail("matches", json!(count));
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
    let input: GrepInput = parse_input(ToolKind::Grep, input)?;
    let caps = ctx.capabilities().await;
    let command = build_command(&input, caps.has_rg)?;
    let output = ctx.run(&command, None).await?;

    if output.stdout.trim().is_empty() && !output.stderr.trim().is_empty() {
        let code = if output.exit_code == 0 { 2 } else { output.exit_code };
        return Err(TetherError::remote_failure(
            code,
            format!("Error searching {}: {}", input.search_path(), output.stderr.trim()),
        ));
    }

    let result = format_matches(&output.stdout, input.effective_limit(), limits)
        .with_detail("tool", json!(if caps.has_rg { "rg" } else { "grep" }));
    Ok(with_probe_error(result, &caps))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn input(pattern: &str) -> GrepInput {
        GrepInput {
            pattern: pattern.to_string(),
            ..GrepInput::default()
        }
    }

    #[test]
    fn test_rg_command_defaults() {
        assert_eq!(
            build_command(&input("fn main"), true).unwrap(),
            "rg --line-number --color=never --no-heading -m 100 -- 'fn main' '.' | head -n 100"
        );
    }

    #[test]
    fn test_rg_command_all_flags() {
        let input = GrepInput {
            path: Some("src".to_string()),
            glob: Some("*.rs".to_string()),
            ignore_case: true,
            literal: true,
            context: Some(2),
            limit: Some(5),
            ..input("a.b")
        };
        assert_eq!(
            build_command(&input, true).unwrap(),
            "rg --line-number --color=never --no-heading -i -F -C 2 --glob '*.rs' -m 5 -- 'a.b' 'src' | head -n 5"
        );
    }

    #[test]
    fn test_grep_fallback_translates_flags() {
        let input = GrepInput {
            glob: Some("*.rs".to_string()),
            ignore_case: true,
            ..input("todo")
        };
        assert_eq!(
            build_command(&input, false).unwrap(),
            "grep -rn -i -E --include='*.rs' -- 'todo' '.' | head -n 100"
        );
    }

    #[test]
    fn test_pattern_with_quote_is_escaped() {
        let command = build_command(&input("it's"), false).unwrap();
        assert!(command.contains(r"-- 'it'\''s'"));
    }

    #[test]
    fn test_no_matches() {
        let result = format_matches("", 100, TruncationLimits::default());
        assert_eq!(result.text_content(), "No matches found");
        assert!(!result.is_error);
    }

    #[test]
    fn test_matches_hit_limit() {
        let result = format_matches("a:1:x\nb:2:y\n", 2, TruncationLimits::default());
        assert!(result.text_content().starts_with("a:1:x\nb:2:y"));
        assert!(result.text_content().contains("[2 matches limit reached"));
        assert_eq!(result.details["matches"], 2);
    }
}

//! One-line summaries of tool calls and results for display.

use serde_json::Value;

use super::ToolKind;
use crate::types::content::ToolResult;
use crate::util::ansi;
use crate::util::text::truncate_to_width;

fn str_field<'a>(input: &'a Value, key: &str) -> Option<&'a str> {
    input.get(key).and_then(Value::as_str)
}

fn num_field(input: &Value, key: &str) -> Option<u64> {
    input.get(key).and_then(Value::as_u64)
}

/// Renders a tool call, prefixed with `[host]` when it runs remotely.
///
/// # Examples
///
/// ```
/// use serde_json::json;
/// use tether::tools::render::render_call;
/// use tether::tools::ToolKind;
///
/// let line = render_call(ToolKind::Read, &json!({"path": "src/main.rs", "offset": 10, "limit": 3}), None);
/// assert_eq!(line, "read src/main.rs:10-12");
/// ```
#[must_use]
pub fn render_call(kind: ToolKind, input: &Value, host: Option<&str>) -> String {
    let path = || str_field(input, "path").unwrap_or(".");
    let body = match kind {
        ToolKind::Bash => format!("$ {}", str_field(input, "command").unwrap_or_default()),
        ToolKind::Read => {
            let offset = num_field(input, "offset");
            let limit = num_field(input, "limit");
            match (offset, limit) {
                (Some(o), Some(l)) if l > 0 => format!("read {}:{o}-{}", path(), o + l - 1),
                (Some(o), _) => format!("read {}:{o}", path()),
                _ => format!("read {}", path()),
            }
        }
        ToolKind::Write => {
            let bytes = str_field(input, "content").map_or(0, str::len);
            format!("write {} ({bytes} bytes)", path())
        }
        ToolKind::Edit => format!("edit {}", path()),
        ToolKind::Grep => format!(
            "grep /{}/ in {}",
            str_field(input, "pattern").unwrap_or_default(),
            path()
        ),
        ToolKind::Find => format!(
            "find {} in {}",
            str_field(input, "pattern").unwrap_or_default(),
            path()
        ),
        ToolKind::Ls => format!("ls {}", path()),
    };
    match host {
        Some(host) => format!("[{host}] {body}"),
        None => body,
    }
}

/// Renders the first `max_lines` lines of a result, each cut to `width`
/// columns. Errors are shown in red.
#[must_use]
pub fn render_result(result: &ToolResult, max_lines: usize, width: usize) -> String {
    let text = result.text_content();
    let total = text.lines().count();
    let mut out: Vec<String> = text
        .lines()
        .take(max_lines)
        .map(|line| truncate_to_width(line, width))
        .collect();
    if total > max_lines {
        out.push(format!("{}... ({} more lines){}", ansi::DIM, total - max_lines, ansi::RESET));
    }
    let body = out.join("\n");
    if result.is_error {
        format!("{}{body}{}", ansi::RED, ansi::RESET)
    } else {
        body
    }
}

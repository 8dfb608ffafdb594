//! `edit` adapter.
//!
//! Reads the remote file, replaces exactly one occurrence of `oldText`, and
//! writes the result back with the chunked writer. Zero or multiple
//! occurrences are reported as distinct errors and nothing is written.

use serde::Deserialize;
use serde_json::{json, Value};

use super::write::write_remote;
use super::{parse_input, RemoteContext, ToolKind};
use crate::error::{TetherError, TetherResult};
use crate::remote::quote_path;
use crate::types::content::ToolResult;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditInput {
    pub path: String,
    pub old_text: String,
    pub new_text: String,
}

/// Replaces the single occurrence of `old_text` in `content`.
///
/// # Errors
///
/// Returns [`TetherError::EditNotFound`] when `old_text` is absent and
/// [`TetherError::EditAmbiguous`] when it occurs more than once.
pub fn apply_edit(path: &str, content: &str, old_text: &str, new_text: &str) -> TetherResult<String> {
    if old_text.is_empty() {
        return Err(TetherError::invalid_input(ToolKind::Edit.name(), "oldText must not be empty"));
    }
    match content.matches(old_text).count() {
        0 => Err(TetherError::EditNotFound {
            path: path.to_string(),
        }),
        1 => Ok(content.replacen(old_text, new_text, 1)),
        count => Err(TetherError::EditAmbiguous {
            path: path.to_string(),
            count,
        }),
    }
}

/// Renders a removed/added line summary of an edit.
#[must_use]
pub fn generate_diff(old: &str, new: &str) -> String {
    let mut diff = String::new();
    for line in old.lines() {
        diff.push_str(&format!("- {line}\n"));
    }
    for line in new.lines() {
        diff.push_str(&format!("+ {line}\n"));
    }
    if diff.is_empty() {
        format!("- {old}\n+ {new}\n")
    } else {
        diff
    }
}

/// Result reported after a successful edit.
#[must_use]
pub fn edited(path: &str, old_text: &str, new_text: &str) -> ToolResult {
    let diff = generate_diff(old_text, new_text);
    ToolResult::text(format!("Successfully replaced text in {path}.\n\n{diff}")).with_detail("diff", json!(diff))
}

pub(crate) async fn execute_remote(ctx: &RemoteContext<'_>, input: &Value) -> TetherResult<ToolResult> {
    let input: EditInput = parse_input(ToolKind::Edit, input)?;

    let output = ctx.run(&format!("cat {}", quote_path(&input.path)?), None).await?;
    if !output.success() {
        return Err(TetherError::remote_failure(
            output.exit_code,
            format!("Error reading {}: {}", input.path, output.stderr.trim()),
        ));
    }
    if output.stdout_lossy {
        return Err(TetherError::remote_failure(
            1,
            format!("Error editing {}: file is not valid UTF-8 and was left unchanged", input.path),
        ));
    }

    let updated = apply_edit(&input.path, &output.stdout, &input.old_text, &input.new_text)?;
    write_remote(ctx, &input.path, &updated).await?;
    Ok(edited(&input.path, &input.old_text, &input.new_text))
}

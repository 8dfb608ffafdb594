//! Tool definitions registered with the host.
//!
//! Names and input schemas match the host's built-in tools, so overriding
//! them is invisible to the assistant.
//!
//! # Example
//!
//! ```rust
//! use tether::tools::definitions::definitions;
//!
//! let tools = definitions();
//! assert_eq!(tools.len(), 7);
//! assert!(tools.iter().any(|t| t.name == "grep"));
//! ```

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::ToolKind;

/// Schema for one tool.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ToolDefinition {
    /// The unique name of the tool.
    pub name: String,

    /// Human-readable description shown to the assistant.
    pub description: String,

    /// JSON Schema for the parameters (`"type": "object"`).
    pub input_schema: Value,
}

impl ToolDefinition {
    #[must_use]
    pub fn new(name: impl Into<String>, description: impl Into<String>, input_schema: Value) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            input_schema,
        }
    }
}

/// Returns the definitions of all seven tools.
#[must_use]
pub fn definitions() -> Vec<ToolDefinition> {
    ToolKind::ALL.into_iter().map(definition).collect()
}

/// Returns the definition of one tool.
#[must_use]
pub fn definition(kind: ToolKind) -> ToolDefinition {
    match kind {
        ToolKind::Bash => ToolDefinition::new(
            "bash",
            "Execute a shell command. Runs on the SSH host when one is configured, \
             otherwise locally. Output is truncated to the last 2000 lines or 50KB.",
            json!({
                "type": "object",
                "properties": {
                    "command": {"type": "string", "description": "The command to execute"},
                    "timeout": {"type": "integer", "description": "Timeout in seconds"}
                },
                "required": ["command"]
            }),
        ),
        ToolKind::Read => ToolDefinition::new(
            "read",
            "Read a file. Use offset/limit for large files.",
            json!({
                "type": "object",
                "properties": {
                    "path": {"type": "string", "description": "Path to the file"},
                    "offset": {"type": "integer", "description": "Line number to start from (1-based)"},
                    "limit": {"type": "integer", "description": "Maximum number of lines to read"}
                },
                "required": ["path"]
            }),
        ),
        ToolKind::Write => ToolDefinition::new(
            "write",
            "Write content to a file, creating parent directories and overwriting any existing file.",
            json!({
                "type": "object",
                "properties": {
                    "path": {"type": "string", "description": "Path to the file"},
                    "content": {"type": "string", "description": "Content to write"}
                },
                "required": ["path", "content"]
            }),
        ),
        ToolKind::Edit => ToolDefinition::new(
            "edit",
            "Replace an exact, unique occurrence of oldText with newText in a file.",
            json!({
                "type": "object",
                "properties": {
                    "path": {"type": "string", "description": "Path to the file"},
                    "oldText": {"type": "string", "description": "Exact text to find (must match once)"},
                    "newText": {"type": "string", "description": "Replacement text"}
                },
                "required": ["path", "oldText", "newText"]
            }),
        ),
        ToolKind::Grep => ToolDefinition::new(
            "grep",
            "Search file contents for a pattern. Returns path:line:text matches.",
            json!({
                "type": "object",
                "properties": {
                    "pattern": {"type": "string", "description": "Regex (or literal string) to search for"},
                    "path": {"type": "string", "description": "Directory or file to search (default: .)"},
                    "glob": {"type": "string", "description": "Filter files by glob, e.g. *.rs"},
                    "ignoreCase": {"type": "boolean", "description": "Case-insensitive search"},
                    "literal": {"type": "boolean", "description": "Treat pattern as a literal string"},
                    "context": {"type": "integer", "description": "Lines of context around matches"},
                    "limit": {"type": "integer", "description": "Maximum output lines (default: 100)"}
                },
                "required": ["pattern"]
            }),
        ),
        ToolKind::Find => ToolDefinition::new(
            "find",
            "Find files by glob pattern.",
            json!({
                "type": "object",
                "properties": {
                    "pattern": {"type": "string", "description": "Glob such as *.rs or src/**/*.ts"},
                    "path": {"type": "string", "description": "Directory to search (default: .)"},
                    "limit": {"type": "integer", "description": "Maximum results (default: 1000)"}
                },
                "required": ["pattern"]
            }),
        ),
        ToolKind::Ls => ToolDefinition::new(
            "ls",
            "List directory contents, including dotfiles. Directories end with /.",
            json!({
                "type": "object",
                "properties": {
                    "path": {"type": "string", "description": "Directory to list (default: .)"},
                    "limit": {"type": "integer", "description": "Maximum entries (default: 500)"}
                }
            }),
        ),
    }
}

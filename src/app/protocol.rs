//! JSON-lines protocol spoken by the `tether` binary on stdin/stdout.
//!
//! Each line is one tagged JSON object:
//!
//! ```text
//! -> {"type":"tool","id":"1","name":"bash","input":{"command":"ls"}}
//! <- {"type":"tool_result","id":"1","result":{"content":[...],"details":{...}}}
//! -> {"type":"command","text":"/ssh port 2222"}
//! <- {"type":"notification","level":"info","message":"SSH port set to 2222"}
//! <- {"type":"status","line":"SSH: user@server:2222"}
//! ```

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::HostUpdate;
use crate::commands::Notification;
use crate::tools::definitions::ToolDefinition;
use crate::types::content::ToolResult;

/// A request read from stdin.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Request {
    /// Run a tool.
    Tool {
        id: String,
        name: String,
        #[serde(default)]
        input: Value,
    },
    /// Cancel an in-flight tool call.
    Cancel { id: String },
    /// Run a slash command.
    Command { text: String },
    /// Report the status line.
    Status,
    /// List tool definitions.
    Definitions,
    /// Tear down and exit.
    Shutdown,
}

/// A response written to stdout.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Response {
    ToolResult { id: String, result: ToolResult },
    Notification(Notification),
    Status { line: Option<String> },
    Definitions { tools: Vec<ToolDefinition> },
    /// A request line that could not be understood.
    Error { message: String },
}

/// Flattens a [`HostUpdate`] into notifications followed by the status line.
#[must_use]
pub fn update_responses(update: HostUpdate) -> Vec<Response> {
    let mut responses: Vec<Response> = update
        .notifications
        .into_iter()
        .map(Response::Notification)
        .collect();
    responses.push(Response::Status {
        line: update.status_line,
    });
    responses
}

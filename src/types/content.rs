//! Tool result types returned to the host.
//!
//! A [`ToolResult`] is built fresh for every tool invocation and handed back
//! to the host: an ordered list of content blocks, an open `details` bag of
//! execution metadata, and an `isError` flag for the host's renderer.
//!
//! # Example
//!
//! ```rust
//! use tether::types::content::ToolResult;
//! use serde_json::json;
//!
//! let result = ToolResult::text("hello\n")
//!     .with_detail("remote", json!(true))
//!     .with_detail("host", json!("user@server"));
//!
//! assert!(!result.is_error);
//! assert_eq!(result.details["host"], "user@server");
//! ```

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A typed content block inside a tool result.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentBlock {
    /// Plain text output.
    Text {
        /// The text content.
        text: String,
    },
}

impl ContentBlock {
    /// Creates a new text content block.
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }

    /// Returns the text if this is a text block.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text { text } => Some(text),
        }
    }
}

/// The structured outcome of a tool invocation.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ToolResult {
    /// Ordered content blocks.
    pub content: Vec<ContentBlock>,

    /// Execution metadata (exit code, remote flag, host, truncation, counts).
    #[serde(default)]
    pub details: Map<String, Value>,

    /// Signals failure to the host's rendering layer.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_error: bool,
}

impl ToolResult {
    /// Creates a successful result with a single text block.
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            content: vec![ContentBlock::text(text)],
            details: Map::new(),
            is_error: false,
        }
    }

    /// Creates an error result with a single text block.
    #[must_use]
    pub fn error(text: impl Into<String>) -> Self {
        Self {
            is_error: true,
            ..Self::text(text)
        }
    }

    /// Adds one detail entry.
    #[must_use]
    pub fn with_detail(mut self, key: impl Into<String>, value: Value) -> Self {
        self.details.insert(key.into(), value);
        self
    }

    /// Tags the result with where it ran.
    ///
    /// Remote results carry the host name; local results only `remote: false`.
    #[must_use]
    pub fn with_origin(self, host: Option<&str>) -> Self {
        match host {
            Some(host) => self
                .with_detail("remote", Value::Bool(true))
                .with_detail("host", Value::String(host.to_string())),
            None => self.with_detail("remote", Value::Bool(false)),
        }
    }

    /// Concatenates every text block.
    #[must_use]
    pub fn text_content(&self) -> String {
        self.content
            .iter()
            .filter_map(ContentBlock::as_text)
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Returns the `remote` detail, treating a missing entry as local.
    #[must_use]
    pub fn is_remote(&self) -> bool {
        self.details
            .get("remote")
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }
}

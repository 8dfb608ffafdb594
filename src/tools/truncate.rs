//! Output truncation.
//!
//! Tool output is bounded by both a line count and a byte count. The
//! *tail* (the most recent lines) is kept.

use serde::Serialize;

/// Default maximum number of lines kept.
pub const DEFAULT_MAX_LINES: usize = 2000;

/// Default maximum number of bytes kept.
pub const DEFAULT_MAX_BYTES: usize = 50 * 1024;

/// Line and byte bounds for tool output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TruncationLimits {
    /// Maximum lines kept.
    pub max_lines: usize,
    /// Maximum bytes kept.
    pub max_bytes: usize,
}

impl Default for TruncationLimits {
    fn default() -> Self {
        Self {
            max_lines: DEFAULT_MAX_LINES,
            max_bytes: DEFAULT_MAX_BYTES,
        }
    }
}

/// Which bound caused truncation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TruncatedBy {
    /// The line limit.
    Lines,
    /// The byte limit.
    Bytes,
}

/// Result of tail truncation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Truncation {
    /// The kept text.
    #[serde(skip)]
    pub content: String,
    /// Whether anything was dropped.
    pub truncated: bool,
    /// Bound that triggered truncation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub truncated_by: Option<TruncatedBy>,
    /// Lines in the original text.
    pub total_lines: usize,
    /// Bytes in the original text.
    pub total_bytes: usize,
    /// Lines kept.
    pub output_lines: usize,
    /// Bytes kept.
    pub output_bytes: usize,
}

impl Truncation {
    /// First kept line number (1-based) relative to the original text.
    #[must_use]
    pub fn first_kept_line(&self) -> usize {
        self.total_lines.saturating_sub(self.output_lines) + 1
    }
}

/// Keeps the last lines of `text` fitting within `limits`.
///
/// When even the final line exceeds the byte limit, its trailing bytes are
/// kept (cut on a character boundary).
///
/// # Examples
///
/// ```
/// use tether::tools::truncate::{truncate_tail, TruncationLimits};
///
/// let limits = TruncationLimits { max_lines: 2, max_bytes: 1024 };
/// let t = truncate_tail("a\nb\nc\n", limits);
/// assert_eq!(t.content, "b\nc\n");
/// assert!(t.truncated);
/// assert_eq!(t.first_kept_line(), 2);
/// ```
#[must_use]
pub fn truncate_tail(text: &str, limits: TruncationLimits) -> Truncation {
    let lines: Vec<&str> = text.split_inclusive('\n').collect();
    let total_lines = lines.len();
    let total_bytes = text.len();

    if total_lines <= limits.max_lines && total_bytes <= limits.max_bytes {
        return Truncation {
            content: text.to_string(),
            truncated: false,
            truncated_by: None,
            total_lines,
            total_bytes,
            output_lines: total_lines,
            output_bytes: total_bytes,
        };
    }

    let mut kept = 0usize;
    let mut bytes = 0usize;
    let mut truncated_by = TruncatedBy::Lines;
    for line in lines.iter().rev() {
        if kept >= limits.max_lines {
            truncated_by = TruncatedBy::Lines;
            break;
        }
        if bytes + line.len() > limits.max_bytes {
            truncated_by = TruncatedBy::Bytes;
            break;
        }
        bytes += line.len();
        kept += 1;
    }

    let content = if kept == 0 {
        // The last line alone is over the byte budget.
        let last = lines.last().copied().unwrap_or_default();
        let mut start = last.len().saturating_sub(limits.max_bytes);
        while !last.is_char_boundary(start) {
            start += 1;
        }
        kept = 1;
        last[start..].to_string()
    } else {
        lines[total_lines - kept..].concat()
    };

    Truncation {
        output_bytes: content.len(),
        content,
        truncated: true,
        truncated_by: Some(truncated_by),
        total_lines,
        total_bytes,
        output_lines: kept,
    }
}

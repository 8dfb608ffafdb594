//! Utility functions and helpers

use directories::ProjectDirs;
use std::path::PathBuf;

pub fn get_data_dir() -> Option<PathBuf> {
    ProjectDirs::from("dev", "tether", "tether").map(|dirs| dirs.data_dir().to_path_buf())
}

/// Formats a byte count the way truncation notices report sizes.
pub fn format_size(bytes: usize) -> String {
    const KB: usize = 1024;
    const MB: usize = KB * 1024;

    if bytes >= MB {
        format!("{:.1}MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1}KB", bytes as f64 / KB as f64)
    } else {
        format!("{}B", bytes)
    }
}

pub mod ansi {
    pub const RESET: &str = "\x1b[0m";
    pub const DIM: &str = "\x1b[2m";

    pub const RED: &str = "\x1b[31m";
}

pub mod text {
    use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

    pub fn visible_width(s: &str) -> usize {
        s.width()
    }

    /// Cuts `s` to at most `max_width` columns, appending `...` when cut.
    pub fn truncate_to_width(s: &str, max_width: usize) -> String {
        if visible_width(s) <= max_width {
            return s.to_string();
        }
        let budget = max_width.saturating_sub(3);
        let mut out = String::new();
        let mut width = 0;
        for ch in s.chars() {
            let w = ch.width().unwrap_or(0);
            if width + w > budget {
                break;
            }
            width += w;
            out.push(ch);
        }
        out.push_str("...");
        out
    }
}

//! POSIX shell quoting.
//!
//! [`quote`] is the one quoting primitive used for every value substituted
//! into a remote command line. [`validate_path_safety`] is a separate step
//! that rejects values no amount of quoting can make safe.

use crate::error::{TetherError, TetherResult};

/// Wraps `value` in single quotes, escaping embedded single quotes as `'\''`.
///
/// # Examples
///
/// ```
/// use tether::remote::quote::quote;
///
/// assert_eq!(quote("plain"), "'plain'");
/// assert_eq!(quote("it's"), r"'it'\''s'");
/// ```
#[must_use]
pub fn quote(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('\'');
    for ch in value.chars() {
        if ch == '\'' {
            out.push_str("'\\''");
        } else {
            out.push(ch);
        }
    }
    out.push('\'');
    out
}

/// Rejects values containing a null byte, carriage return or line feed.
///
/// A null byte cannot appear in a command line at all, and a line terminator
/// would end the remote command early. The value is returned unchanged when
/// it is safe.
///
/// # Errors
///
/// Returns [`TetherError::UnsafePath`] naming the offending character.
pub fn validate_path_safety(value: &str) -> TetherResult<&str> {
    if value.contains('\0') {
        return Err(TetherError::unsafe_path("path contains a null byte"));
    }
    if value.contains('\n') || value.contains('\r') {
        return Err(TetherError::unsafe_path("path contains a line break"));
    }
    Ok(value)
}

/// Validates and then quotes a path.
///
/// # Errors
///
/// See [`validate_path_safety`].
pub fn quote_path(value: &str) -> TetherResult<String> {
    validate_path_safety(value).map(quote)
}

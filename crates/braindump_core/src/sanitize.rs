//! Input sanitizer for classifier payloads.
//!
//! # Invariants
//! - Output never contains a backtick.
//! - Every double quote in the output is preceded by a backslash.
//! - Backslashes are escaped before quotes so quote escapes are not doubled.

/// Normalizes raw user text so it can be embedded inside a quoted request
/// field without breaking its framing.
pub fn sanitize(raw: &str) -> String {
    raw.replace('`', "'")
        .replace('\\', "\\\\")
        .replace('"', "\\\"")
        .trim()
        .to_string()
}

//! Cleanup for error messages stored in result records.
//!
//! Browser errors can embed raw protocol payloads or page-provided strings,
//! so messages are stripped of control characters and capped before they
//! reach a record.

use crate::config::MAX_ERROR_MESSAGE_LENGTH;

/// Removes control characters, keeping tab, newline and carriage return.
pub fn strip_control_chars(message: &str) -> String {
    message
        .chars()
        .filter(|c| !c.is_control() || matches!(c, '\t' | '\n' | '\r'))
        .collect()
}

/// Strips control characters and caps the message at
/// `MAX_ERROR_MESSAGE_LENGTH` characters.
///
/// Truncated messages end with a marker stating the original length, and the
/// result (marker included) never exceeds the cap.
pub fn sanitize_error_message(message: &str) -> String {
    let cleaned = strip_control_chars(message);
    let length = cleaned.chars().count();
    if length <= MAX_ERROR_MESSAGE_LENGTH {
        return cleaned;
    }

    let marker = format!("... (truncated, original length: {length} chars)");
    let keep = MAX_ERROR_MESSAGE_LENGTH.saturating_sub(marker.chars().count());
    let mut truncated: String = cleaned.chars().take(keep).collect();
    truncated.push_str(&marker);
    truncated
}

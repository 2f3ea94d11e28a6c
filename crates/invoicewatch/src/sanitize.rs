//! Helpers for cleaning values before they reach log events or span fields.
//!
//! Uploaded file names are client-controlled and may carry full local paths;
//! provider error bodies can be arbitrarily large.

/// Longest provider body kept in an error message.
pub const MAX_LOGGED_BODY: usize = 200;

/// Returns the last path component of a client-supplied file name, with
/// control characters removed. Both `/` and `\` count as separators.
pub fn display_name(file_name: &str) -> String {
    let base = file_name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(file_name);
    let cleaned: String = base.chars().filter(|c| !c.is_control()).collect();
    let cleaned = cleaned.trim();
    if cleaned.is_empty() {
        "<unnamed>".to_string()
    } else {
        cleaned.to_string()
    }
}

/// Truncates text to [`MAX_LOGGED_BODY`] characters on a char boundary.
pub fn truncate_for_log(text: &str) -> String {
    let text = text.trim();
    match text.char_indices().nth(MAX_LOGGED_BODY) {
        Some((cut, _)) => format!("{}…", &text[..cut]),
        None => text.to_string(),
    }
}

//! String helpers for untrusted text.

/// Trims `value` and converts a blank result to `None`.
///
/// # Examples
///
/// ```
/// use wrldkeep_domain::common::none_if_blank;
///
/// assert_eq!(none_if_blank("  Old Mill "), Some("Old Mill"));
/// assert_eq!(none_if_blank("   "), None);
/// ```
pub fn none_if_blank(value: &str) -> Option<&str> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed)
    }
}

/// Keeps at most `max_chars` characters, never splitting a code point.
///
/// # Examples
///
/// ```
/// use wrldkeep_domain::common::truncate_chars;
///
/// assert_eq!(truncate_chars("search the well", 6), "search");
/// assert_eq!(truncate_chars("古井旁的石碑", 2), "古井");
/// ```
pub fn truncate_chars(value: &str, max_chars: usize) -> &str {
    match value.char_indices().nth(max_chars) {
        Some((idx, _)) => &value[..idx],
        None => value,
    }
}

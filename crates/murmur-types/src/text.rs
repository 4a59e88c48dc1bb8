//! Pure text helpers shared by the API, share, and web crates.

/// Maximum preview length in characters. Content at or under this length
/// passes through unchanged.
pub const PREVIEW_MAX_CHARS: usize = 40;

/// Characters kept before the `..` marker when truncating.
const PREVIEW_CUT_CHARS: usize = 38;

/// Derive the preview snippet for a post: whitespace-collapsed content,
/// truncated on a word boundary with `..` appended when it exceeds
/// [`PREVIEW_MAX_CHARS`].
pub fn preview_text(content: &str) -> String {
    let flat = content.split_whitespace().collect::<Vec<_>>().join(" ");
    if flat.chars().count() <= PREVIEW_MAX_CHARS {
        return flat;
    }

    let window: String = flat.chars().take(PREVIEW_CUT_CHARS).collect();
    // Cut at the last word boundary inside the window; a single unbroken
    // word gets a hard cut instead.
    let cut = match window.rfind(' ') {
        Some(idx) if idx > 0 => &window[..idx],
        _ => window.as_str(),
    };
    format!("{}..", cut.trim_end())
}

/// Truncate a string to a maximum byte length on a char boundary,
/// appending `...` if anything was removed.
pub fn truncate(s: &str, max_len: usize) -> String {
    if s.len() <= max_len {
        return s.to_string();
    }
    let mut end = max_len;
    while !s.is_char_boundary(end) && end > 0 {
        end -= 1;
    }
    format!("{}...", &s[..end])
}

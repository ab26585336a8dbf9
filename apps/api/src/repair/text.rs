//! Locating the JSON object inside raw generator text.

/// Strips a markdown code fence, keeping only what is inside it.
///
/// Prose before the opening fence is dropped. A missing closing fence is
/// tolerated because truncated output usually loses it.
pub fn strip_fences(text: &str) -> &str {
    let text = text.trim();
    let Some(open) = text.find("```") else {
        return text;
    };
    let after = &text[open + 3..];

    // The remainder of the fence line is a language tag (`json`, `JSON`, empty).
    let body = match after.find('\n') {
        Some(nl) if is_fence_tag(&after[..nl]) => &after[nl + 1..],
        Some(_) => after,
        None => after.trim_start_matches(|c: char| c.is_ascii_alphanumeric()),
    };

    match body.find("```") {
        Some(close) => body[..close].trim(),
        None => body.trim(),
    }
}

fn is_fence_tag(line: &str) -> bool {
    line.trim().chars().all(|c| c.is_ascii_alphanumeric())
}

/// Returns the text from the first `{` to the end, or `None` without a brace.
pub fn from_first_brace(text: &str) -> Option<&str> {
    text.find('{').map(|start| text[start..].trim_end())
}

/// Cuts trailing prose after the last `}`.
pub fn to_last_brace(text: &str) -> &str {
    match text.rfind('}') {
        Some(end) => &text[..=end],
        None => text,
    }
}

//! Structural repairs: closing truncated documents and finding balanced spans.
//!
//! Every scan works on bytes. The structural characters are ASCII, so every
//! index taken here is a char boundary and slicing cannot panic.

/// Upper bound on cut-back attempts for one document.
const MAX_CUTBACKS: usize = 32;

/// Upper bound on `{` positions tried as the start of a balanced span.
const MAX_SPAN_STARTS: usize = 256;

/// Result of scanning a (possibly truncated) document.
#[derive(Debug, Default)]
struct Scan {
    /// Closers owed for every still-open container, innermost last.
    open: Vec<u8>,
    in_string: bool,
    /// A backslash was the last byte inside a string.
    dangling_escape: bool,
    /// Indices where the document may be cut back to a complete prefix.
    cut_points: Vec<usize>,
}

/// Scans `text`, which must start with an opener.
///
/// Returns `None` when the top level closes before the end of the text or a
/// closer does not match its opener: neither is truncation.
fn scan(text: &str) -> Option<Scan> {
    let bytes = text.as_bytes();
    let mut state = Scan::default();
    let mut escaped = false;

    for (i, &b) in bytes.iter().enumerate() {
        if state.in_string {
            if escaped {
                escaped = false;
            } else if b == b'\\' {
                escaped = true;
            } else if b == b'"' {
                state.in_string = false;
            }
            continue;
        }
        match b {
            b'"' => state.in_string = true,
            b'{' => {
                state.open.push(b'}');
                state.cut_points.push(i + 1);
            }
            b'[' => {
                state.open.push(b']');
                state.cut_points.push(i + 1);
            }
            b'}' | b']' => {
                if state.open.pop() != Some(b) {
                    return None;
                }
                if state.open.is_empty() && i + 1 < bytes.len() {
                    return None;
                }
            }
            b',' => state.cut_points.push(i),
            _ => {}
        }
    }
    state.dangling_escape = state.in_string && escaped;
    Some(state)
}

/// Appends the minimal closing sequence to `text`.
///
/// An open string is terminated, a trailing comma dropped and a dangling
/// key separator given a `null` value. Returns `None` if `text` is not
/// truncated (already balanced or malformed in a way closing cannot fix).
pub fn close(text: &str) -> Option<String> {
    let text = text.trim_end();
    let state = scan(text)?;
    if state.open.is_empty() {
        return None;
    }

    let mut closed = String::with_capacity(text.len() + state.open.len() + 2);
    if state.dangling_escape {
        closed.push_str(&text[..text.len() - 1]);
    } else {
        closed.push_str(text);
    }
    if state.in_string {
        closed.push('"');
    }

    let trimmed_len = closed.trim_end().len();
    closed.truncate(trimmed_len);
    if closed.ends_with(',') {
        closed.pop();
    } else if closed.ends_with(':') {
        closed.push_str("null");
    }

    closed.extend(state.open.iter().rev().map(|&b| b as char));
    Some(closed)
}

/// Closes `text`, cutting back to earlier complete elements while the
/// closed form still fails to parse. Loses the partial trailing element.
pub fn close_with_cutback<T>(text: &str, parse: impl Fn(&str) -> Option<T>) -> Option<T> {
    let text = text.trim_end();
    let state = scan(text)?;
    if state.open.is_empty() {
        return None;
    }
    if let Some(value) = close(text).and_then(|c| parse(&c)) {
        return Some(value);
    }

    state
        .cut_points
        .iter()
        .rev()
        .take(MAX_CUTBACKS)
        .filter(|&&cut| cut < text.len())
        .find_map(|&cut| close(&text[..cut]).and_then(|c| parse(&c)))
}

/// All balanced `{ ... }` spans in `text`, largest first.
pub fn balanced_spans(text: &str) -> Vec<&str> {
    let mut spans: Vec<&str> = text
        .bytes()
        .enumerate()
        .filter(|&(_, b)| b == b'{')
        .take(MAX_SPAN_STARTS)
        .filter_map(|(start, _)| matching_close(text, start).map(|end| &text[start..=end]))
        .collect();
    spans.sort_by(|a, b| b.len().cmp(&a.len()));
    spans.dedup();
    spans
}

/// Index of the `}` closing the object that opens at `start`.
fn matching_close(text: &str, start: usize) -> Option<usize> {
    let bytes = text.as_bytes();
    let mut stack: Vec<u8> = Vec::new();
    let mut in_string = false;
    let mut escaped = false;

    for (offset, &b) in bytes[start..].iter().enumerate() {
        if in_string {
            if escaped {
                escaped = false;
            } else if b == b'\\' {
                escaped = true;
            } else if b == b'"' {
                in_string = false;
            }
            continue;
        }
        match b {
            b'"' => in_string = true,
            b'{' => stack.push(b'}'),
            b'[' => stack.push(b']'),
            b'}' | b']' => {
                if stack.pop() != Some(b) {
                    return None;
                }
                if stack.is_empty() {
                    return Some(start + offset);
                }
            }
            _ => {}
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    fn parse(text: &str) -> Option<Value> {
        serde_json::from_str(text).ok()
    }

    #[test]
    fn test_close_unclosed_list_and_object() {
        assert_eq!(
            close(r#"{"key": "value", "list": [1, 2, 3"#).unwrap(),
            r#"{"key": "value", "list": [1, 2, 3]}"#
        );
    }

    #[test]
    fn test_close_array_of_objects() {
        assert_eq!(close(r#"[{"id": 1}, {"id": 2"#).unwrap(), r#"[{"id": 1}, {"id": 2}]"#);
    }

    #[test]
    fn test_close_nested() {
        assert_eq!(
            close(r#"{"a": {"b": {"c": [1, 2"#).unwrap(),
            r#"{"a": {"b": {"c": [1, 2]}}}"#
        );
    }

    #[test]
    fn test_close_open_string() {
        assert_eq!(close(r#"{"name": "Ilnar"#).unwrap(), r#"{"name": "Ilnar"}"#);
    }

    #[test]
    fn test_close_drops_trailing_comma_and_fills_value() {
        assert_eq!(close(r#"{"a": 1,"#).unwrap(), r#"{"a": 1}"#);
        assert_eq!(close(r#"{"a":"#).unwrap(), r#"{"a":null}"#);
    }

    #[test]
    fn test_close_drops_dangling_escape() {
        assert_eq!(close(r#"{"a": "line\"#).unwrap(), r#"{"a": "line"}"#);
    }

    #[test]
    fn test_close_ignores_brackets_inside_strings() {
        assert_eq!(close(r#"{"a": "x } ] {", "b": [1"#).unwrap(), r#"{"a": "x } ] {", "b": [1]}"#);
    }

    #[test]
    fn test_close_refuses_balanced_or_mismatched_text() {
        assert!(close(r#"{"a": 1}"#).is_none());
        assert!(close(r#"{"a": [1}"#).is_none());
        assert!(close(r#"{"a": 1} trailing {"b": 2"#).is_none());
    }

    #[test]
    fn test_cutback_drops_partial_key() {
        let value = close_with_cutback(r#"{"a": "b", "c"#, parse).unwrap();
        assert_eq!(value, serde_json::json!({"a": "b"}));
    }

    #[test]
    fn test_cutback_drops_partial_literal() {
        let value = close_with_cutback(r#"{"a": 1, "b": tru"#, parse).unwrap();
        assert_eq!(value, serde_json::json!({"a": 1}));
    }

    #[test]
    fn test_balanced_spans_largest_first() {
        let spans = balanced_spans(r#"noise {"a": {"b": 1}} more {"c": 2"#);
        assert_eq!(spans[0], r#"{"a": {"b": 1}}"#);
        assert_eq!(spans[1], r#"{"b": 1}"#);
        assert_eq!(spans.len(), 2);
    }
}

//! Token-level fixes for JSON that is complete but not well-formed.

use std::fmt::Write;

/// Rewrites the common generator formatting defects in one string-aware pass:
///
/// - single-quoted strings become double-quoted
/// - raw control characters inside strings are escaped
/// - `//` and `/* */` comments outside strings are removed
/// - trailing commas before `}` or `]` are dropped
/// - `\'` escapes (invalid in JSON) become plain apostrophes
pub fn fix(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len());
    let mut quote: Option<char> = None;
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];

        if let Some(q) = quote {
            match c {
                '\\' => match chars.get(i + 1) {
                    Some('\'') => {
                        out.push('\'');
                        i += 1;
                    }
                    Some(&next) => {
                        out.push('\\');
                        out.push(next);
                        i += 1;
                    }
                    None => {}
                },
                c if c == q => {
                    out.push('"');
                    quote = None;
                }
                '"' => out.push_str("\\\""),
                '\n' => out.push_str("\\n"),
                '\r' => out.push_str("\\r"),
                '\t' => out.push_str("\\t"),
                c if (c as u32) < 0x20 => {
                    let _ = write!(out, "\\u{:04x}", c as u32);
                }
                c => out.push(c),
            }
            i += 1;
            continue;
        }

        match c {
            '"' | '\'' => {
                quote = Some(c);
                out.push('"');
            }
            '/' if chars.get(i + 1) == Some(&'/') => {
                while i < chars.len() && chars[i] != '\n' {
                    i += 1;
                }
                continue;
            }
            '/' if chars.get(i + 1) == Some(&'*') => {
                i += 2;
                while i < chars.len() && !(chars[i] == '*' && chars.get(i + 1) == Some(&'/')) {
                    i += 1;
                }
                i += 2;
                continue;
            }
            ',' if closes_next(&chars[i + 1..]) => {}
            c => out.push(c),
        }
        i += 1;
    }
    out
}

fn closes_next(rest: &[char]) -> bool {
    matches!(
        rest.iter().find(|c| !c.is_whitespace()),
        Some('}') | Some(']')
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn fixed(text: &str) -> Value {
        serde_json::from_str(&fix(text)).unwrap()
    }

    #[test]
    fn test_trailing_commas_removed() {
        assert_eq!(fixed(r#"{"a": [1, 2,], "b": 3,}"#), json!({"a": [1, 2], "b": 3}));
    }

    #[test]
    fn test_trailing_comma_inside_string_kept() {
        assert_eq!(fixed(r#"{"a": "x,]"}"#), json!({"a": "x,]"}));
    }

    #[test]
    fn test_single_quotes_converted() {
        assert_eq!(
            fixed(r#"{'name': 'Jane "JD" Doe', 'note': 'it\'s'}"#),
            json!({"name": "Jane \"JD\" Doe", "note": "it's"})
        );
    }

    #[test]
    fn test_apostrophe_inside_double_quotes_untouched() {
        assert_eq!(fixed(r#"{"a": "O'Brien"}"#), json!({"a": "O'Brien"}));
    }

    #[test]
    fn test_raw_control_characters_escaped() {
        let value = fixed("{\"a\": \"line one\nline two\tend\"}");
        assert_eq!(value["a"], "line one\nline two\tend");
    }

    #[test]
    fn test_comments_removed() {
        let value = fixed("{\n  // contact\n  \"a\": 1, /* inline */ \"b\": \"http://x\"\n}");
        assert_eq!(value, json!({"a": 1, "b": "http://x"}));
    }
}

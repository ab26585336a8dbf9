//! Tolerant serde helpers for generator output.
//!
//! The generator is asked for a strict schema but routinely returns `null` for
//! strings or a single comma-separated string where a list was requested.
//! These helpers accept those shapes so that a structurally sound answer is not
//! discarded over a cosmetic type mismatch.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Accepts a string, `null`, a number or a bool. Anything else decodes as empty.
pub fn string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.map(scalar_to_string).unwrap_or_default())
}

/// Accepts a list of scalars, a single separated string, or `null`.
pub fn string_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Array(items)) => items
            .into_iter()
            .map(scalar_to_string)
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect(),
        Some(Value::String(s)) => split_list(&s),
        _ => Vec::new(),
    })
}

/// Accepts a list or `null` for a list of structured items.
pub fn vec_or_null<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

/// Accepts a structured value or `null`, which decodes as the default.
pub fn or_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Splits a free-text list on commas, semicolons and newlines.
pub fn split_list(text: &str) -> Vec<String> {
    text.split([',', ';', '\n'])
        .map(|s| s.trim().trim_start_matches(['-', '•', '*']).trim())
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

fn scalar_to_string(value: Value) -> String {
    match value {
        Value::String(s) => s,
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    struct Probe {
        #[serde(default, deserialize_with = "string")]
        name: String,
        #[serde(default, deserialize_with = "string_list")]
        items: Vec<String>,
    }

    #[test]
    fn test_null_string_decodes_empty() {
        let p: Probe = serde_json::from_str(r#"{"name": null, "items": []}"#).unwrap();
        assert_eq!(p.name, "");
    }

    #[test]
    fn test_number_string_is_stringified() {
        let p: Probe = serde_json::from_str(r#"{"name": 2021}"#).unwrap();
        assert_eq!(p.name, "2021");
    }

    #[test]
    fn test_comma_separated_string_becomes_list() {
        let p: Probe = serde_json::from_str(r#"{"items": "Python, Go; Rust"}"#).unwrap();
        assert_eq!(p.items, vec!["Python", "Go", "Rust"]);
    }

    #[test]
    fn test_blank_list_entries_are_dropped() {
        let p: Probe = serde_json::from_str(r#"{"items": ["Python", " ", null]}"#).unwrap();
        assert_eq!(p.items, vec!["Python"]);
    }

    #[test]
    fn test_missing_fields_default() {
        let p: Probe = serde_json::from_str("{}").unwrap();
        assert!(p.name.is_empty());
        assert!(p.items.is_empty());
    }

    #[test]
    fn test_split_list_strips_bullets() {
        assert_eq!(split_list("- Docker\n• Kubernetes"), vec!["Docker", "Kubernetes"]);
    }
}

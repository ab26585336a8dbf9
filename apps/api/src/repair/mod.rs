//! Structured Repair Engine.
//!
//! Recovers one JSON object from raw generator text that may be fenced,
//! wrapped in prose, truncated by the output-token ceiling, or carry
//! formatting defects. Strategies run in order of increasing cost; each one
//! either yields a parsed object or passes to the next. Everything here is a
//! pure function over text.

mod closing;
mod formatting;
mod text;

use std::fmt;

use serde_json::{Map, Value};
use thiserror::Error;

use crate::models::profile::{GeneratedProfile, Profile};

/// Longest prefix of offending text quoted in an error.
const MAX_SNIPPET_CHARS: usize = 120;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RepairError {
    /// Nothing usable was produced (blank output, empty fence, `{}` or `null`).
    /// Callers treat this as an empty profile and let validation flag it.
    #[error("generator returned an empty document")]
    RecoverableEmpty,

    /// No strategy could recover an object.
    #[error("generator output could not be parsed: {reason}")]
    Unparseable { reason: String },
}

impl RepairError {
    fn unparseable(reason: impl Into<String>) -> Self {
        Self::Unparseable {
            reason: reason.into(),
        }
    }
}

/// Which strategy produced the object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepairStrategy {
    Direct,
    CloseTruncated,
    FixFormatting,
    CutBack,
    BalancedSubstring,
}

impl RepairStrategy {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Direct => "direct",
            Self::CloseTruncated => "close_truncated",
            Self::FixFormatting => "fix_formatting",
            Self::CutBack => "cut_back",
            Self::BalancedSubstring => "balanced_substring",
        }
    }

    /// True for strategies that may drop a trailing partial element.
    pub fn is_lossy(self) -> bool {
        matches!(self, Self::CutBack | Self::BalancedSubstring)
    }
}

impl fmt::Display for RepairStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A recovered object and how it was recovered.
#[derive(Debug, Clone, PartialEq)]
pub struct Repaired {
    pub object: Map<String, Value>,
    pub strategy: RepairStrategy,
}

type StrategyFn = fn(&str) -> Option<Value>;

const CHAIN: [(RepairStrategy, StrategyFn); 5] = [
    (RepairStrategy::Direct, parse_direct),
    (RepairStrategy::CloseTruncated, close_truncated),
    (RepairStrategy::FixFormatting, fix_formatting),
    (RepairStrategy::CutBack, cut_back),
    (RepairStrategy::BalancedSubstring, balanced_substring),
];

/// Runs the strategy chain over `raw`.
///
/// An empty object from one strategy does not end the chain: a later, more
/// expensive strategy may still recover content (e.g. a single-quoted
/// document that closing alone can only reduce to `{}`).
pub fn repair(raw: &str) -> Result<Repaired, RepairError> {
    let stripped = text::strip_fences(raw);
    if is_blank(stripped) {
        return Err(RepairError::RecoverableEmpty);
    }

    let body = text::from_first_brace(stripped)
        .or_else(|| text::from_first_brace(raw))
        .ok_or_else(|| {
            RepairError::unparseable(format!("no JSON object found in: {}", snippet(stripped)))
        })?;

    let mut saw_empty = false;
    for (strategy, run) in CHAIN {
        match run(body) {
            Some(Value::Object(object)) if object.is_empty() => saw_empty = true,
            Some(Value::Object(object)) => return Ok(Repaired { object, strategy }),
            Some(Value::Null) => saw_empty = true,
            _ => {}
        }
    }

    if saw_empty {
        Err(RepairError::RecoverableEmpty)
    } else {
        Err(RepairError::unparseable(format!(
            "no strategy recovered an object from: {}",
            snippet(body)
        )))
    }
}

/// Repairs `raw` and decodes it as a profile.
pub fn repair_profile(raw: &str) -> Result<(GeneratedProfile, RepairStrategy), RepairError> {
    let repaired = repair(raw)?;
    let object = unwrap_envelope(repaired.object);
    let profile: Profile = serde_json::from_value(Value::Object(object))
        .map_err(|e| RepairError::unparseable(format!("object does not match the profile shape: {e}")))?;
    Ok((GeneratedProfile::new(profile), repaired.strategy))
}

/// Generators sometimes wrap the answer in a single `{"cv": {...}}` envelope.
fn unwrap_envelope(object: Map<String, Value>) -> Map<String, Value> {
    const ENVELOPES: [&str; 4] = ["cv", "resume", "profile", "optimized_cv"];
    if object.len() == 1 {
        if let Some((key, Value::Object(inner))) = object.iter().next() {
            if ENVELOPES.contains(&key.as_str()) {
                return inner.clone();
            }
        }
    }
    object
}

// ────────────────────────────────────────────────────────────────────────────
// Strategies
// ────────────────────────────────────────────────────────────────────────────

fn parse(text: &str) -> Option<Value> {
    serde_json::from_str(text).ok()
}

fn parse_direct(body: &str) -> Option<Value> {
    parse(text::to_last_brace(body))
}

fn close_truncated(body: &str) -> Option<Value> {
    closing::close(body).and_then(|closed| parse(&closed))
}

fn fix_formatting(body: &str) -> Option<Value> {
    let fixed = formatting::fix(body);
    parse(text::to_last_brace(&fixed)).or_else(|| close_truncated(&fixed))
}

fn cut_back(body: &str) -> Option<Value> {
    closing::close_with_cutback(body, parse)
        .or_else(|| closing::close_with_cutback(&formatting::fix(body), parse))
}

fn balanced_substring(body: &str) -> Option<Value> {
    closing::balanced_spans(body)
        .into_iter()
        .find_map(|span| {
            parse(span)
                .or_else(|| parse(&formatting::fix(span)))
                .filter(Value::is_object)
        })
}

fn is_blank(text: &str) -> bool {
    let text = text.trim();
    text.is_empty() || text == "null" || text == "{}"
}

fn snippet(text: &str) -> String {
    match text.char_indices().nth(MAX_SNIPPET_CHARS) {
        Some((idx, _)) => format!("{}…", &text[..idx]),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const FULL_CV: &str = r#"{
        "contact": {"name": "Jane Doe", "email": "jane@example.com", "phone": "+1 555-0100"},
        "headline": "Backend Engineer",
        "experience": [
            {"title": "Senior Engineer", "organization": "Tech Corp", "start_date": "01/2020", "end_date": "Present",
             "bullets": ["Built scalable APIs", "Led a team of 5 — mentoring, reviews"]}
        ],
        "skills": {"hard": ["Python", "Docker"], "soft": ["Leadership", "Communication"]},
        "languages": [{"name": "English", "proficiency": "Native"}]
    }"#;

    #[test]
    fn test_valid_json_parses_directly() {
        let repaired = repair(r#"{"a": 1}"#).unwrap();
        assert_eq!(repaired.strategy, RepairStrategy::Direct);
        assert_eq!(Value::Object(repaired.object), json!({"a": 1}));
    }

    #[test]
    fn test_fenced_json_with_prose() {
        let raw = "Here is your optimized CV:\n```json\n{\"headline\": \"Engineer\"}\n```\nGood luck!";
        let repaired = repair(raw).unwrap();
        assert_eq!(repaired.strategy, RepairStrategy::Direct);
        assert_eq!(repaired.object["headline"], "Engineer");
    }

    #[test]
    fn test_truncated_after_complete_skills_array() {
        let raw = r#"{"contact": {"name": "Jane Doe", "email": "a@x.com"}, "skills": ["Python", "Docker"]"#;
        let (profile, strategy) = repair_profile(raw).unwrap();
        assert_eq!(strategy, RepairStrategy::CloseTruncated);
        assert_eq!(profile.contact.email, "a@x.com");
        assert_eq!(profile.skills.hard, vec!["Python", "Docker"]);
    }

    #[test]
    fn test_truncated_mid_soft_skill_string() {
        let raw = r#"{
            "contact": {"name": "Ilnar", "email": "ilnar@example.com"},
            "skills": {"hard": ["Rust"], "soft": ["Leadership", "Commun"#;
        let (profile, _) = repair_profile(raw).unwrap();
        assert_eq!(profile.contact.name, "Ilnar");
        assert_eq!(profile.skills.soft, vec!["Leadership", "Commun"]);
    }

    #[test]
    fn test_truncated_inside_key_cuts_back() {
        let raw = r#"{"contact": {"name": "Jane"}, "headline": "Engineer", "summ"#;
        let repaired = repair(raw).unwrap();
        assert_eq!(repaired.strategy, RepairStrategy::CutBack);
        assert_eq!(repaired.object["headline"], "Engineer");
        assert!(!repaired.object.contains_key("summ"));
    }

    #[test]
    fn test_formatting_defects_fixed() {
        let raw = "{'contact': {'name': 'Jane',}, 'summary': 'Line one\nLine two',}";
        let repaired = repair(raw).unwrap();
        assert_eq!(repaired.strategy, RepairStrategy::FixFormatting);
        assert_eq!(repaired.object["contact"]["name"], "Jane");
        assert_eq!(repaired.object["summary"], "Line one\nLine two");
    }

    #[test]
    fn test_trailing_comma_is_not_mistaken_for_truncation() {
        let raw = r#"{"skills": ["a", "b",], "headline": "Engineer"}"#;
        let repaired = repair(raw).unwrap();
        assert_eq!(repaired.strategy, RepairStrategy::FixFormatting);
        assert_eq!(repaired.object["headline"], "Engineer");
    }

    #[test]
    fn test_largest_balanced_substring() {
        let raw = r#"{"draft": true} } {"contact": {"name": "Jane"}, "headline": "Engineer"} trailing }"#;
        let repaired = repair(raw).unwrap();
        assert_eq!(repaired.strategy, RepairStrategy::BalancedSubstring);
        assert_eq!(repaired.object["headline"], "Engineer");
    }

    #[test]
    fn test_blank_and_empty_documents_are_recoverable() {
        for raw in ["", "   ", "```json\n```", "{}", "null", "```\n{}\n```"] {
            assert_eq!(repair(raw), Err(RepairError::RecoverableEmpty), "input: {raw:?}");
        }
    }

    #[test]
    fn test_prose_without_object_is_unparseable() {
        let err = repair("I'm sorry, I cannot help with that.").unwrap_err();
        assert!(matches!(err, RepairError::Unparseable { .. }));
    }

    #[test]
    fn test_profile_shape_mismatch_is_unparseable() {
        let err = repair_profile(r#"{"contact": "Jane Doe"}"#).unwrap_err();
        assert!(matches!(err, RepairError::Unparseable { .. }));
    }

    #[test]
    fn test_envelope_is_unwrapped() {
        let (profile, _) = repair_profile(r#"{"cv": {"headline": "Engineer"}}"#).unwrap();
        assert_eq!(profile.headline, "Engineer");
    }

    #[test]
    fn test_every_truncation_point_is_classified() {
        // Every prefix must either parse or classify; none may panic.
        for (idx, _) in FULL_CV.char_indices() {
            let prefix = &FULL_CV[..idx];
            match repair(prefix) {
                Ok(_) | Err(RepairError::RecoverableEmpty) => {}
                Err(RepairError::Unparseable { reason }) => {
                    panic!("prefix of {idx} bytes was unparseable: {reason}")
                }
            }
        }
        assert_eq!(repair(FULL_CV).unwrap().strategy, RepairStrategy::Direct);
    }

    #[test]
    fn test_snippet_is_bounded() {
        let long = "é".repeat(500);
        assert_eq!(snippet(&long).chars().count(), MAX_SNIPPET_CHARS + 1);
    }
}
